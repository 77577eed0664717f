//! Data models for the map annotation tree.

mod image_ref;
mod map_node;
mod marker;

pub use image_ref::{ImageRef, ImageRefError};
pub use map_node::{MapNode, MapNodeId};
pub use marker::{Component, ComponentPatch, Marker, MarkerId, MarkerPatch};
