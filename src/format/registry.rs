//! Format registry for discovering and accessing map document formats.

use std::path::Path;

use crate::format::error::FormatError;
use crate::format::formats::{LegacyMarkersFormat, MapJsonFormat};
use crate::format::traits::{MapFormat, parse_json};
use crate::tree::MapTree;

/// Registry of available map formats.
///
/// Formats are kept in registration order; detection tries them in that
/// order, so the native format wins over the legacy one.
pub struct FormatRegistry {
    formats: Vec<Box<dyn MapFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: Vec::new(),
        };

        registry.register(Box::new(MapJsonFormat));
        registry.register(Box::new(LegacyMarkersFormat));

        registry
    }

    /// Register a format implementation, replacing one with the same ID.
    pub fn register(&mut self, format: Box<dyn MapFormat>) {
        self.formats.retain(|f| f.id() != format.id());
        self.formats.push(format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn MapFormat> {
        self.formats
            .iter()
            .find(|f| f.id() == id)
            .map(|f| f.as_ref())
    }

    /// Get all registered formats.
    pub fn all(&self) -> Vec<&dyn MapFormat> {
        self.formats.iter().map(|f| f.as_ref()).collect()
    }

    /// Get all format IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.id()).collect()
    }

    /// Get the native map format.
    pub fn native(&self) -> &dyn MapFormat {
        self.get("dmmap")
            .expect("Native format should always be registered")
    }

    /// Decode bytes in whichever registered format recognizes them.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<MapTree, FormatError> {
        let value = parse_json(bytes)?;
        let format = self
            .formats
            .iter()
            .find(|f| f.can_import(&value))
            .ok_or_else(|| {
                FormatError::malformed("expected a map object with \"markers\" or a marker array")
            })?;
        log::debug!("Detected format '{}'", format.id());
        format.import_from_value(value)
    }

    /// Load a file in whichever registered format recognizes it.
    pub fn import_path(&self, path: &Path) -> Result<MapTree, FormatError> {
        log::info!("Loading map from {:?}", path);
        let bytes = std::fs::read(path)?;
        self.import_bytes(&bytes)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
