//! Error types for tree repository operations.

use std::fmt;

use thiserror::Error;

use super::NavigationPath;
use crate::model::{MapNodeId, MarkerId};

/// Which list an out-of-range index referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Marker,
    Component,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Marker => write!(f, "Marker"),
            IndexKind::Component => write!(f, "Component"),
        }
    }
}

/// Errors that can occur when reading or mutating a map tree.
///
/// A failed operation never changes the tree it was called on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A path segment did not match a marker with a sub-map
    #[error("Path {path} not found (segment {depth} does not resolve)")]
    PathNotFound {
        /// The path that failed to resolve
        path: NavigationPath,
        /// Index of the first segment that failed
        depth: usize,
    },

    /// A marker or component index is stale or invalid
    #[error("{kind} index {index} out of range ({len} present)")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    /// No marker with this id lives in the addressed node
    #[error("Marker {0} not found")]
    MarkerNotFound(MarkerId),

    /// A node id is not present in the arena
    #[error("Map node {0} not found")]
    NodeNotFound(MapNodeId),

    /// The change would nest a sub-map deeper than the allowed maximum
    #[error("Sub-map depth {depth} exceeds the maximum of {max}")]
    DepthLimitExceeded { depth: usize, max: usize },

    /// Moving the marker would place a map inside its own subtree
    #[error("Cannot move marker {marker} into map {target}, which it owns")]
    CyclicAttachment { marker: MarkerId, target: MapNodeId },
}

impl TreeError {
    pub(crate) fn marker_index(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Marker,
            index,
            len,
        }
    }

    pub(crate) fn component_index(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: IndexKind::Component,
            index,
            len,
        }
    }
}
