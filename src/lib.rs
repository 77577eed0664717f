//! dmmap - hierarchical map annotation core
//!
//! Stacked raster maps annotated with markers. A marker can carry structured
//! notes (components) and own a nested sub-map, so a world map can lead to a
//! town map, which leads to a tavern floor plan, and so on.
//!
//! The crate holds the data model and its operations, the zoom/coordinate
//! math used to place markers, navigation through the map stack, and the JSON
//! document format. Rendering and input handling are left to the caller,
//! which drives a [`MapSession`].

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod io;
pub mod model;
pub mod navigation;
pub mod session;
pub mod tree;
pub mod zoom_math;

#[cfg(test)]
mod test_image;

pub use config::MapConfig;
pub use error::MapError;
pub use navigation::{ActiveView, Navigator};
pub use session::{MapSession, MarkerDraft};
pub use tree::{MapTree, NavigationPath};
