//! Navigation paths from the master map to a descendant sub-map.

use std::fmt;

use crate::model::MarkerId;

/// Ordered marker ids leading from the root to a map node.
///
/// The empty path addresses the master map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NavigationPath(Vec<MarkerId>);

impl NavigationPath {
    /// The path of the master map.
    pub fn master() -> Self {
        Self::default()
    }

    pub fn is_master(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[MarkerId] {
        &self.0
    }

    /// The marker whose sub-map this path ends in.
    pub fn last(&self) -> Option<MarkerId> {
        self.0.last().copied()
    }

    /// This path extended by one marker.
    pub fn child(&self, marker: MarkerId) -> Self {
        let mut segments = self.0.clone();
        segments.push(marker);
        Self(segments)
    }

    /// This path with the last segment removed, or `None` at the master map.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }
}

impl FromIterator<MarkerId> for NavigationPath {
    fn from_iter<I: IntoIterator<Item = MarkerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for NavigationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
