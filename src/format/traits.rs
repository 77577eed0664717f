//! Trait definitions for map document formats.

use std::path::Path;

use crate::format::error::FormatError;
use crate::tree::MapTree;

/// Trait for map document import/export implementations.
///
/// Each format converts between a whole [`MapTree`] and the bytes of a
/// single file.
pub trait MapFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "dmmap", "markers").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extensions this format uses.
    fn extensions(&self) -> &[&'static str];

    /// Whether sub-maps survive an export in this format.
    fn supports_sub_maps(&self) -> bool;

    /// Whether background images survive an export in this format.
    fn supports_images(&self) -> bool;

    /// Whether a parsed JSON value looks like this format.
    fn can_import(&self, value: &serde_json::Value) -> bool;

    /// Export a tree to bytes.
    fn export_to_bytes(&self, tree: &MapTree) -> Result<Vec<u8>, FormatError>;

    /// Import a tree from an already parsed JSON value.
    fn import_from_value(&self, value: serde_json::Value) -> Result<MapTree, FormatError>;

    /// Import a tree from bytes.
    fn import_from_bytes(&self, bytes: &[u8]) -> Result<MapTree, FormatError> {
        self.import_from_value(parse_json(bytes)?)
    }

    /// Export a tree to a file.
    fn export(&self, tree: &MapTree, path: &Path) -> Result<(), FormatError> {
        log::info!("Saving {} to {:?}", self.display_name(), path);
        let bytes = self.export_to_bytes(tree)?;
        std::fs::write(path, &bytes)?;
        log::info!(
            "Saved {} markers in {} map(s) ({} bytes)",
            tree.marker_count(),
            tree.node_count(),
            bytes.len()
        );
        Ok(())
    }
}

/// Parse bytes as JSON, reporting syntax errors as malformed documents.
pub(crate) fn parse_json(bytes: &[u8]) -> Result<serde_json::Value, FormatError> {
    serde_json::from_slice(bytes).map_err(|e| FormatError::malformed(format!("invalid JSON: {e}")))
}
