//! Map document import/export.
//!
//! The whole annotation tree is persisted as a single JSON document. This
//! module holds the document schema and codec ([`encode`]/[`decode`]) and a
//! small trait-based format system so older file layouts keep loading.
//!
//! ## Supported Formats
//!
//! - **Map JSON**: Native format with full fidelity (sub-maps, images, components)
//! - **Marker list**: Legacy bare array of master-map markers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dmmap::format::{FormatRegistry, MapFormat};
//!
//! let registry = FormatRegistry::new();
//! registry.native().export(&tree, Path::new("map_data.json"))?;
//! let restored = registry.import_path(Path::new("map_data.json"))?;
//! ```

mod document;
mod error;
pub mod formats;
mod registry;
mod traits;

pub use document::{ComponentEntry, MapDocument, MarkerEntry, NodeEntry, decode, encode};
pub use error::FormatError;
pub use registry::FormatRegistry;
pub use traits::MapFormat;

use std::path::Path;

use crate::tree::MapTree;

/// Serialize a tree to pretty-printed native JSON.
pub fn to_json(tree: &MapTree) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&encode(tree))?)
}

/// Parse native or legacy JSON into a tree.
pub fn from_json(json: &str) -> Result<MapTree, FormatError> {
    FormatRegistry::new().import_bytes(json.as_bytes())
}

/// Save a tree to `path` in the native format.
pub fn save_to_path(tree: &MapTree, path: &Path) -> Result<(), FormatError> {
    formats::MapJsonFormat.export(tree, path)
}

/// Load a tree from `path`, accepting native and legacy documents.
pub fn load_from_path(path: &Path) -> Result<MapTree, FormatError> {
    FormatRegistry::new().import_path(path)
}
