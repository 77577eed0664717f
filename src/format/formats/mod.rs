//! Map document format implementations.

mod legacy_markers;
mod map_json;

#[cfg(test)]
mod tests;

pub use legacy_markers::LegacyMarkersFormat;
pub use map_json::MapJsonFormat;
