//! Crate-level error type returned by [`MapSession`](crate::session::MapSession).

use thiserror::Error;

use crate::config::ConfigError;
use crate::format::FormatError;
use crate::io::ReadError;
use crate::navigation::NavigationError;
use crate::tree::TreeError;
use crate::zoom_math::TransformError;

/// Any failure of a session operation.
///
/// Every variant is recoverable: the failing operation leaves the session
/// exactly as it was.
#[derive(Error, Debug)]
pub enum MapError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An edit needs a selected marker and none is selected
    #[error("No marker selected")]
    NoSelection,

    /// A read completion was handed to the wrong completion method
    #[error("Read completion does not match its purpose")]
    UnexpectedRead,
}

impl MapError {
    /// Whether this is a discarded stale read, which callers should not
    /// present to the user.
    pub fn is_stale_read(&self) -> bool {
        matches!(self, Self::Read(e) if e.is_stale())
    }
}
