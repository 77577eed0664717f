//! Persisted document structures and the tree codec.
//!
//! A [`MapDocument`] is the self-contained, serializable form of a
//! [`MapTree`]: the master node with every sub-map nested inside the marker
//! that owns it, and every image inlined as a base64 data URI. Ids are not
//! persisted; decoding assigns fresh ones. Marker coordinates are written
//! as JSON doubles and kept at `f64` precision through a load and save.
//! Sub-maps nest at most [`MAX_SUB_MAP_DEPTH`] levels deep; deeper documents
//! are rejected as malformed.
//!
//! [`MAX_SUB_MAP_DEPTH`]: crate::constants::MAX_SUB_MAP_DEPTH
//!
//! # Versioning
//!
//! Documents carry an optional semantic version (MAJOR.MINOR.PATCH). Files
//! without one are read as the current version. Version 0.x.x is unstable:
//! any 0.x file is readable, but a different minor version logs a warning.

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::model::{Component, ImageRef, MapNode, MapNodeId, Marker};
use crate::tree::{MapTree, check_depth};
use crate::zoom_math::Point;

/// Complete map document for save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    /// Format version for compatibility checking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The master map node.
    #[serde(flatten)]
    pub root: NodeEntry,
}

impl MapDocument {
    /// Current version of the document format.
    pub const CURRENT_VERSION: &'static str = "0.1.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 1;

    /// Parse a version string into (major, minor, patch) components.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        let major = parts[0].parse().ok()?;
        let minor = parts[1].parse().ok()?;
        let patch = parts[2].parse().ok()?;
        Some((major, minor, patch))
    }

    /// Check if a version is fully compatible with the current version.
    ///
    /// For version 0.x.x (unstable), only exact minor version matches are compatible.
    pub fn is_version_compatible(file_version: &str) -> bool {
        let Some((file_major, file_minor, _)) = Self::parse_version(file_version) else {
            return false;
        };

        if Self::VERSION_MAJOR == 0 {
            file_major == 0 && file_minor == Self::VERSION_MINOR
        } else {
            file_major == Self::VERSION_MAJOR
        }
    }

    /// Check if we can attempt to read a file at this version.
    pub fn is_version_readable(file_version: &str) -> bool {
        let Some((file_major, _, _)) = Self::parse_version(file_version) else {
            return false;
        };
        file_major == 0 || file_major == Self::VERSION_MAJOR
    }

    /// Total number of markers at every depth.
    pub fn total_markers(&self) -> usize {
        self.root.total_markers()
    }

    /// Number of sub-maps at every depth.
    pub fn total_sub_maps(&self) -> usize {
        self.root.total_sub_maps()
    }
}

/// One map node: background plus markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntry {
    /// Background as a `data:` URI; `null` for a master map without image.
    #[serde(default)]
    pub background_image: Option<String>,

    /// Markers in display order.
    pub markers: Vec<MarkerEntry>,
}

impl NodeEntry {
    fn total_markers(&self) -> usize {
        self.markers
            .iter()
            .map(|m| 1 + m.sub_map.as_ref().map_or(0, NodeEntry::total_markers))
            .sum()
    }

    fn total_sub_maps(&self) -> usize {
        self.markers
            .iter()
            .filter_map(|m| m.sub_map.as_ref())
            .map(|sub| 1 + sub.total_sub_maps())
            .sum()
    }
}

/// A marker with its components and optional nested sub-map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerEntry {
    pub x: f64,
    pub y: f64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Older files call these "characters".
    #[serde(default, alias = "characters")]
    pub components: Vec<ComponentEntry>,

    #[serde(default)]
    pub sub_map: Option<NodeEntry>,
}

/// A component note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

impl ComponentEntry {
    /// Create from an internal Component.
    pub fn from_component(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            description: component.description.clone(),
            link: component.link.clone(),
        }
    }

    /// Convert to an internal Component.
    pub fn to_component(&self) -> Component {
        Component::new(&self.name, &self.description, &self.link)
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Encode a tree into a self-contained document.
pub fn encode(tree: &MapTree) -> MapDocument {
    let document = MapDocument {
        version: Some(MapDocument::CURRENT_VERSION.to_string()),
        root: encode_node(tree, tree.root()),
    };
    log::debug!(
        "Encoded map: {} markers, {} sub-maps",
        document.total_markers(),
        document.total_sub_maps()
    );
    document
}

fn encode_node(tree: &MapTree, node: &MapNode) -> NodeEntry {
    NodeEntry {
        background_image: node.background.as_ref().map(ImageRef::to_data_uri),
        markers: node
            .markers
            .iter()
            .map(|marker| MarkerEntry {
                x: marker.x,
                y: marker.y,
                name: marker.name.clone(),
                description: marker.description.clone(),
                components: marker
                    .components
                    .iter()
                    .map(ComponentEntry::from_component)
                    .collect(),
                sub_map: marker
                    .sub_map
                    .and_then(|id| tree.node(id))
                    .map(|sub| encode_node(tree, sub)),
            })
            .collect(),
    }
}

/// Rebuild a tree from a document, validating it on the way.
pub fn decode(document: &MapDocument) -> Result<MapTree, FormatError> {
    match document.version.as_deref() {
        Some(version) if !MapDocument::is_version_readable(version) => {
            return Err(FormatError::VersionMismatch {
                expected: MapDocument::CURRENT_VERSION.to_string(),
                found: version.to_string(),
            });
        }
        Some(version) if !MapDocument::is_version_compatible(version) => {
            log::warn!(
                "Map version {} may not be fully compatible with current version {} \
                 (version 0.x.x is unstable - format may have changed)",
                version,
                MapDocument::CURRENT_VERSION
            );
        }
        Some(_) => {}
        None => log::debug!("Map document has no version, reading as current"),
    }

    let master = decode_image(document.root.background_image.as_deref(), "master")?;
    let mut tree = MapTree::with_master_image(master);
    let root = tree.root_id();
    decode_markers(&mut tree, root, &document.root.markers, "master", 0)?;

    log::debug!(
        "Decoded map: {} nodes, {} markers",
        tree.node_count(),
        tree.marker_count()
    );
    Ok(tree)
}

fn decode_image(uri: Option<&str>, location: &str) -> Result<Option<ImageRef>, FormatError> {
    uri.map(|uri| ImageRef::from_data_uri(uri).map_err(|e| FormatError::bad_image(location, e)))
        .transpose()
}

fn decode_markers(
    tree: &mut MapTree,
    node: MapNodeId,
    entries: &[MarkerEntry],
    location: &str,
    depth: usize,
) -> Result<(), FormatError> {
    for (index, entry) in entries.iter().enumerate() {
        let here = format!("{location}.markers[{index}]");
        if !entry.x.is_finite() || !entry.y.is_finite() {
            return Err(FormatError::malformed(format!(
                "{here}: position ({}, {}) is not finite",
                entry.x, entry.y
            )));
        }

        let id = tree.alloc_marker_id();
        let mut marker = Marker::new(
            id,
            Point::origin(),
            entry.name.as_str(),
            entry.description.as_str(),
        );
        marker.x = entry.x;
        marker.y = entry.y;
        marker.components = entry
            .components
            .iter()
            .map(ComponentEntry::to_component)
            .collect();

        if let Some(sub) = &entry.sub_map {
            let sub_location = format!("{here}.subMap");
            check_depth(depth + 1)
                .map_err(|e| FormatError::malformed(format!("{sub_location}: {e}")))?;
            let image = decode_image(sub.background_image.as_deref(), &sub_location)?
                .ok_or_else(|| {
                    FormatError::malformed(format!("{sub_location}: sub-map has no backgroundImage"))
                })?;
            let sub_id = tree.alloc_node(Some(image));
            decode_markers(tree, sub_id, &sub.markers, &sub_location, depth + 1)?;
            marker.sub_map = Some(sub_id);
        }

        tree.node_mut(node)?.markers.push(marker);
    }
    Ok(())
}
