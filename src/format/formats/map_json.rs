//! Native map JSON format.
//!
//! The whole tree in one pretty-printed JSON file: the master node at the
//! top level, sub-maps nested inside their markers, images inlined as data
//! URIs. See [`MapDocument`] for versioning.

use crate::constants::DOCUMENT_EXTENSION;
use crate::format::document::{MapDocument, decode, encode};
use crate::format::error::FormatError;
use crate::format::traits::MapFormat;
use crate::tree::MapTree;

/// Native map JSON format with full fidelity.
pub struct MapJsonFormat;

impl MapFormat for MapJsonFormat {
    fn id(&self) -> &'static str {
        "dmmap"
    }

    fn display_name(&self) -> &'static str {
        "Map Document (JSON)"
    }

    fn extensions(&self) -> &[&'static str] {
        &[DOCUMENT_EXTENSION]
    }

    fn supports_sub_maps(&self) -> bool {
        true
    }

    fn supports_images(&self) -> bool {
        true
    }

    fn can_import(&self, value: &serde_json::Value) -> bool {
        value.get("markers").is_some()
    }

    fn export_to_bytes(&self, tree: &MapTree) -> Result<Vec<u8>, FormatError> {
        let document = encode(tree);
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    fn import_from_value(&self, value: serde_json::Value) -> Result<MapTree, FormatError> {
        let document: MapDocument = serde_json::from_value(value)
            .map_err(|e| FormatError::malformed(e.to_string()))?;
        decode(&document)
    }
}
