//! Global constants for the dmmap core

/// Multiplicative step applied by a single zoom-in or zoom-out.
pub const ZOOM_STEP: f32 = 1.2;

/// How far past the fit-to-viewport zoom the user may zoom in.
pub const MAX_ZOOM_MULTIPLIER: f32 = 4.0;

/// Zoom used before any viewport/content size is known.
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Default file name offered when saving a map document.
pub const DEFAULT_DOCUMENT_FILENAME: &str = "map_data.json";

/// Extension of persisted map documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// MIME type assumed for images whose type cannot be determined.
pub const FALLBACK_IMAGE_MIME: &str = "application/octet-stream";

/// Deepest allowed sub-map level; the master map is level 0.
///
/// Each level nests three JSON values in a saved document, and the loader
/// refuses input nested deeper than 128. 32 levels keep every document this
/// crate writes loadable, components included.
pub const MAX_SUB_MAP_DEPTH: usize = 32;
