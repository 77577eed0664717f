//! Single-shot background file reads with a staleness guard.
//!
//! Loading a document or attaching an image reads a file off the owning
//! thread. Each read carries a [`ReadTicket`] stamped with the generation it
//! was started in; the owner bumps the generation whenever a newer read
//! starts or the tree is replaced wholesale, and completions from an older
//! generation are dropped instead of being applied.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use thiserror::Error;

use crate::model::MarkerId;
use crate::tree::NavigationPath;

/// Errors from background reads.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The read was superseded by a newer read or a tree replacement
    #[error("Read from generation {ticket} superseded by generation {current}")]
    StaleRead {
        /// Generation the read was started in
        ticket: u64,
        /// Generation at completion time
        current: u64,
    },

    /// The file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reader thread could not be started
    #[error("Failed to spawn reader thread: {0}")]
    Spawn(std::io::Error),
}

impl ReadError {
    /// Whether this is a discarded stale completion rather than a failure.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleRead { .. })
    }
}

/// What a read's bytes are for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPurpose {
    /// Replace the whole tree with a decoded document
    LoadMap,
    /// Attach the bytes as the sub-map image of `marker`, which lives in
    /// the node at `path`
    AttachImage {
        path: NavigationPath,
        marker: MarkerId,
    },
}

/// Handle for one in-flight read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTicket {
    generation: u64,
    purpose: ReadPurpose,
}

impl ReadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn purpose(&self) -> &ReadPurpose {
        &self.purpose
    }
}

/// Generation counter owned by whoever applies read results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadTracker {
    generation: u64,
}

impl ReadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new read, superseding every earlier ticket.
    pub fn begin(&mut self, purpose: ReadPurpose) -> ReadTicket {
        self.generation += 1;
        log::debug!("Started read {} for {:?}", self.generation, purpose);
        ReadTicket {
            generation: self.generation,
            purpose,
        }
    }

    /// Supersede every outstanding ticket without starting a read.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Check that `ticket` is still the latest read.
    pub fn check(&self, ticket: &ReadTicket) -> Result<(), ReadError> {
        if ticket.generation == self.generation {
            Ok(())
        } else {
            log::debug!(
                "Discarding stale read {} (current {})",
                ticket.generation,
                self.generation
            );
            Err(ReadError::StaleRead {
                ticket: ticket.generation,
                current: self.generation,
            })
        }
    }
}

/// Result of a background read, delivered back to the owning thread.
#[derive(Debug)]
pub struct ReadCompletion {
    pub ticket: ReadTicket,
    pub path: PathBuf,
    pub result: Result<Vec<u8>, ReadError>,
}

/// Read `path` on a background thread.
///
/// The returned receiver yields exactly one [`ReadCompletion`]. Applying it
/// (and the staleness check) is left to the receiving side.
pub fn spawn_file_read(
    ticket: ReadTicket,
    path: impl AsRef<Path>,
) -> Result<Receiver<ReadCompletion>, ReadError> {
    let path = path.as_ref().to_path_buf();
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("map-file-read".to_string())
        .spawn(move || {
            log::debug!("Reading {:?} for read {}", path, ticket.generation);
            let result = std::fs::read(&path).map_err(|source| ReadError::Io {
                path: path.clone(),
                source,
            });
            if let Ok(bytes) = &result {
                log::debug!("Read {} bytes from {:?}", bytes.len(), path);
            }
            if tx.send(ReadCompletion { ticket, path, result }).is_err() {
                log::debug!("Read receiver dropped before completion");
            }
        })
        .map_err(ReadError::Spawn)?;

    Ok(rx)
}
