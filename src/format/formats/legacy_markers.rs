//! Legacy marker-list format.
//!
//! Early saves were a bare JSON array of master-map markers, each with a
//! `characters` list instead of `components`, and no images or sub-maps.
//! Import is lossless; export drops images and sub-maps with a warning.

use serde::Serialize;

use crate::constants::DOCUMENT_EXTENSION;
use crate::format::document::{ComponentEntry, MapDocument, MarkerEntry, NodeEntry, decode};
use crate::format::error::FormatError;
use crate::format::traits::MapFormat;
use crate::tree::MapTree;

/// Bare marker array, as written by the first version of the tool.
pub struct LegacyMarkersFormat;

/// Marker shape as the legacy format writes it.
#[derive(Serialize)]
struct LegacyMarker<'a> {
    x: f64,
    y: f64,
    name: &'a str,
    description: &'a str,
    characters: Vec<ComponentEntry>,
}

impl MapFormat for LegacyMarkersFormat {
    fn id(&self) -> &'static str {
        "markers"
    }

    fn display_name(&self) -> &'static str {
        "Marker List (legacy JSON)"
    }

    fn extensions(&self) -> &[&'static str] {
        &[DOCUMENT_EXTENSION]
    }

    fn supports_sub_maps(&self) -> bool {
        false
    }

    fn supports_images(&self) -> bool {
        false
    }

    fn can_import(&self, value: &serde_json::Value) -> bool {
        value.is_array()
    }

    fn export_to_bytes(&self, tree: &MapTree) -> Result<Vec<u8>, FormatError> {
        let root = tree.root();
        let dropped = root.markers.iter().filter(|m| m.has_sub_map()).count();
        if dropped > 0 || root.background.is_some() {
            log::warn!(
                "Legacy export drops the master image and {} sub-map(s)",
                dropped
            );
        }

        let markers: Vec<LegacyMarker<'_>> = root
            .markers
            .iter()
            .map(|m| LegacyMarker {
                x: m.x,
                y: m.y,
                name: &m.name,
                description: &m.description,
                characters: m
                    .components
                    .iter()
                    .map(ComponentEntry::from_component)
                    .collect(),
            })
            .collect();
        Ok(serde_json::to_vec(&markers)?)
    }

    fn import_from_value(&self, value: serde_json::Value) -> Result<MapTree, FormatError> {
        let markers: Vec<MarkerEntry> = serde_json::from_value(value)
            .map_err(|e| FormatError::malformed(e.to_string()))?;
        log::info!("Importing {} markers from legacy marker list", markers.len());

        let document = MapDocument {
            version: None,
            root: NodeEntry {
                background_image: None,
                markers,
            },
        };
        decode(&document)
    }
}
