//! Map nodes: one background image plus its directly owned markers.

use std::fmt;

use super::{ImageRef, Marker, MarkerId};

/// Identifier of a map node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapNodeId(pub(crate) u64);

impl fmt::Display for MapNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One map: a raster background and the markers placed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub id: MapNodeId,
    /// Always set for sub-maps; the master map may not have one yet.
    pub background: Option<ImageRef>,
    /// Markers in creation order. A marker's index is its position here.
    pub markers: Vec<Marker>,
}

impl MapNode {
    pub(crate) fn new(id: MapNodeId, background: Option<ImageRef>) -> Self {
        Self {
            id,
            background,
            markers: Vec::new(),
        }
    }

    pub fn marker(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Find a marker by id, returning its current index.
    pub fn find_marker(&self, id: MarkerId) -> Option<(usize, &Marker)> {
        self.markers.iter().enumerate().find(|(_, m)| m.id == id)
    }

    /// First marker with the given display name.
    pub fn find_marker_by_name(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
