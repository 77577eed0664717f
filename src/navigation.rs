//! Navigation controller: which map node is currently on screen.
//!
//! The controller is a single-state machine `AtNode(path)`. It starts at the
//! master map, can descend into any marker that owns a sub-map, and jumps
//! straight back to the master map. After every transition and every tree
//! change the owner recomputes an [`ActiveView`] for the renderer.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{ImageRef, MapNode, MapNodeId, Marker, MarkerId};
use crate::tree::{MapTree, NavigationPath, TreeError};

/// Errors from navigation transitions. The state is unchanged on error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// The marker is missing from the current map or has no sub-map yet
    #[error("Marker '{marker}' has no sub-map")]
    NoSubMap {
        /// Marker id or name that was requested
        marker: String,
    },

    /// The current path itself no longer resolves
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Tracks the path of the map node being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    path: NavigationPath,
}

impl Navigator {
    /// Start at the master map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    pub fn is_at_master(&self) -> bool {
        self.path.is_master()
    }

    /// Descend into the sub-map owned by `marker` on the current map.
    pub fn enter_sub_map(&mut self, tree: &MapTree, marker: MarkerId) -> Result<(), NavigationError> {
        let node = tree.resolve_node(&self.path)?;
        match node.find_marker(marker) {
            Some((_, m)) if m.has_sub_map() => {
                self.path = self.path.child(marker);
                log::debug!("Entered sub-map, now at {}", self.path);
                Ok(())
            }
            _ => Err(NavigationError::NoSubMap {
                marker: marker.to_string(),
            }),
        }
    }

    /// Descend into the sub-map of the first marker named `name`.
    pub fn enter_sub_map_by_name(
        &mut self,
        tree: &MapTree,
        name: &str,
    ) -> Result<MarkerId, NavigationError> {
        let node = tree.resolve_node(&self.path)?;
        let Some(marker) = node.find_marker_by_name(name).filter(|m| m.has_sub_map()) else {
            return Err(NavigationError::NoSubMap {
                marker: name.to_string(),
            });
        };
        let id = marker.id;
        self.enter_sub_map(tree, id)?;
        Ok(id)
    }

    /// Jump back to the master map from any depth.
    pub fn go_to_master(&mut self) {
        if !self.path.is_master() {
            log::debug!("Returning to master map from {}", self.path);
        }
        self.path = NavigationPath::master();
    }

    /// Go up one level. Returns false when already at the master map.
    pub fn go_back(&mut self) -> bool {
        match self.path.parent() {
            Some(parent) => {
                self.path = parent;
                true
            }
            None => false,
        }
    }

    /// Marker names along the current path, outermost first.
    ///
    /// Stops at the first segment that no longer resolves.
    pub fn breadcrumbs(&self, tree: &MapTree) -> Vec<String> {
        let mut names = Vec::with_capacity(self.path.depth());
        let mut node = Some(tree.root());
        for segment in self.path.segments() {
            let Some((_, marker)) = node.and_then(|n| n.find_marker(*segment)) else {
                break;
            };
            names.push(marker.name.clone());
            node = marker.sub_map.and_then(|id| tree.node(id));
        }
        names
    }

    /// Compute the view for the current path.
    pub fn view(&self, tree: &MapTree) -> ActiveView {
        ActiveView::compute(tree, &self.path)
    }
}

/// What the renderer draws: one background and the markers on it.
#[derive(Debug, Clone)]
pub struct ActiveView {
    path: NavigationPath,
    node: Option<Arc<MapNode>>,
    background: Option<ImageRef>,
}

impl ActiveView {
    /// Resolve `path` in `tree`.
    ///
    /// If the path does not resolve, the master image is shown with no
    /// markers and [`ActiveView::is_resolved`] reports false.
    pub fn compute(tree: &MapTree, path: &NavigationPath) -> Self {
        match tree.resolve_node_id(path) {
            Ok(id) => {
                let node = tree.node_snapshot(id);
                let background = node.as_ref().and_then(|n| n.background.clone());
                Self {
                    path: path.clone(),
                    node,
                    background,
                }
            }
            Err(e) => {
                log::warn!("View path {} unresolved, showing master image: {}", path, e);
                Self {
                    path: path.clone(),
                    node: None,
                    background: tree.master_image().cloned(),
                }
            }
        }
    }

    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    pub fn node_id(&self) -> Option<MapNodeId> {
        self.node.as_ref().map(|n| n.id)
    }

    pub fn background(&self) -> Option<&ImageRef> {
        self.background.as_ref()
    }

    /// Markers to draw, in index order.
    pub fn markers(&self) -> &[Marker] {
        self.node.as_deref().map(|n| n.markers.as_slice()).unwrap_or(&[])
    }

    pub fn is_resolved(&self) -> bool {
        self.node.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom_math::Point;

    fn image(tag: u8) -> ImageRef {
        ImageRef::new("image/png", vec![tag; 4])
    }

    /// Master -> "Tavern" (sub-map) -> "Cellar" (sub-map); "Mill" without one.
    fn sample() -> (MapTree, MarkerId, MarkerId, MarkerId) {
        let master = NavigationPath::master();
        let tree = MapTree::with_master_image(Some(image(0)));
        let (tree, tavern) = tree.add_marker(&master, Point::origin(), "Tavern", "").unwrap();
        let (tree, mill) = tree.add_marker(&master, Point::origin(), "Mill", "").unwrap();
        let tree = tree.attach_sub_map_image(&master, 0, image(1)).unwrap();
        let inner = master.child(tavern);
        let (tree, cellar) = tree.add_marker(&inner, Point::origin(), "Cellar", "").unwrap();
        let tree = tree.attach_sub_map_image(&inner, 0, image(2)).unwrap();
        (tree, tavern, cellar, mill)
    }

    #[test]
    fn test_starts_at_master() {
        let (tree, ..) = sample();
        let nav = Navigator::new();
        assert!(nav.is_at_master());
        let view = nav.view(&tree);
        assert!(view.is_resolved());
        assert_eq!(view.markers().len(), 2);
        assert_eq!(view.background(), Some(&image(0)));
    }

    #[test]
    fn test_enter_and_view() {
        let (tree, tavern, cellar, _) = sample();
        let mut nav = Navigator::new();
        nav.enter_sub_map(&tree, tavern).unwrap();
        nav.enter_sub_map(&tree, cellar).unwrap();

        assert_eq!(nav.path().segments(), &[tavern, cellar]);
        let view = nav.view(&tree);
        assert_eq!(view.background(), Some(&image(2)));
        assert!(view.markers().is_empty());
        assert_eq!(nav.breadcrumbs(&tree), vec!["Tavern", "Cellar"]);
    }

    #[test]
    fn test_enter_without_sub_map_is_noop() {
        let (tree, _, cellar, mill) = sample();
        let mut nav = Navigator::new();

        let err = nav.enter_sub_map(&tree, mill).unwrap_err();
        assert!(matches!(err, NavigationError::NoSubMap { .. }));
        assert!(nav.is_at_master());

        // Cellar has a sub-map, but it is not on the master map
        assert!(nav.enter_sub_map(&tree, cellar).is_err());
        assert!(nav.is_at_master());
    }

    #[test]
    fn test_enter_by_name() {
        let (tree, tavern, ..) = sample();
        let mut nav = Navigator::new();
        assert_eq!(nav.enter_sub_map_by_name(&tree, "Tavern").unwrap(), tavern);
        assert_eq!(
            nav.enter_sub_map_by_name(&tree, "Nowhere"),
            Err(NavigationError::NoSubMap {
                marker: "Nowhere".to_string()
            })
        );
        assert_eq!(nav.path().depth(), 1);
    }

    #[test]
    fn test_go_to_master_from_any_depth() {
        let (tree, tavern, cellar, _) = sample();
        for depth in 0..=2 {
            let mut nav = Navigator::new();
            if depth >= 1 {
                nav.enter_sub_map(&tree, tavern).unwrap();
            }
            if depth >= 2 {
                nav.enter_sub_map(&tree, cellar).unwrap();
            }
            nav.go_to_master();
            assert_eq!(nav, Navigator::new());
        }
    }

    #[test]
    fn test_go_back_one_level() {
        let (tree, tavern, cellar, _) = sample();
        let mut nav = Navigator::new();
        nav.enter_sub_map(&tree, tavern).unwrap();
        nav.enter_sub_map(&tree, cellar).unwrap();

        assert!(nav.go_back());
        assert_eq!(nav.path().segments(), &[tavern]);
        assert!(nav.go_back());
        assert!(!nav.go_back());
        assert!(nav.is_at_master());
    }

    #[test]
    fn test_view_falls_back_when_path_breaks() {
        let (tree, tavern, ..) = sample();
        let mut nav = Navigator::new();
        nav.enter_sub_map(&tree, tavern).unwrap();

        let tree = tree.delete_marker(&NavigationPath::master(), 0).unwrap();
        let view = nav.view(&tree);
        assert!(!view.is_resolved());
        assert!(view.markers().is_empty());
        assert_eq!(view.background(), Some(&image(0)));
        assert!(nav.breadcrumbs(&tree).is_empty());
    }

    #[test]
    fn test_view_is_a_snapshot() {
        let (tree, ..) = sample();
        let view = Navigator::new().view(&tree);
        let next = tree
            .add_marker(&NavigationPath::master(), Point::origin(), "New", "")
            .unwrap()
            .0;
        assert_eq!(view.markers().len(), 2);
        assert_eq!(Navigator::new().view(&next).markers().len(), 3);
    }
}
