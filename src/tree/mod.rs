//! Tree repository: the arena of map nodes and every operation on it.
//!
//! A [`MapTree`] owns all map nodes of one document. The master map is the
//! root; every other node is owned by exactly one marker through
//! [`Marker::sub_map`]. Mutating operations take `&self` and return a new
//! tree, leaving the receiver untouched. Nodes are shared behind `Arc`, so a
//! new tree only copies the nodes it actually changed.

mod error;
mod path;

pub use error::{IndexKind, TreeError};
pub use path::NavigationPath;

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::MAX_SUB_MAP_DEPTH;
use crate::model::{
    Component, ComponentPatch, ImageRef, MapNode, MapNodeId, Marker, MarkerId, MarkerPatch,
};
use crate::zoom_math::Point;

/// The complete annotation tree of one map document.
#[derive(Debug, Clone)]
pub struct MapTree {
    root: MapNodeId,
    nodes: HashMap<MapNodeId, Arc<MapNode>>,
    next_node_id: u64,
    next_marker_id: u64,
}

impl MapTree {
    /// An empty tree: a master map with no image and no markers.
    pub fn new() -> Self {
        Self::with_master_image(None)
    }

    /// An empty tree whose master map shows `image`.
    pub fn with_master_image(image: Option<ImageRef>) -> Self {
        let mut tree = Self {
            root: MapNodeId(0),
            nodes: HashMap::new(),
            next_node_id: 0,
            next_marker_id: 0,
        };
        tree.root = tree.alloc_node(image);
        tree
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn root_id(&self) -> MapNodeId {
        self.root
    }

    /// The master map node.
    pub fn root(&self) -> &MapNode {
        self.nodes
            .get(&self.root)
            .expect("Root node should always be present")
    }

    pub fn master_image(&self) -> Option<&ImageRef> {
        self.root().background.as_ref()
    }

    pub fn node(&self, id: MapNodeId) -> Option<&MapNode> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    /// Shared handle to a node, for snapshots that outlive a borrow.
    pub(crate) fn node_snapshot(&self, id: MapNodeId) -> Option<Arc<MapNode>> {
        self.nodes.get(&id).cloned()
    }

    /// Number of map nodes, master included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of markers across all nodes.
    pub fn marker_count(&self) -> usize {
        self.nodes.values().map(|n| n.markers.len()).sum()
    }

    /// Resolve a path to the id of the node it addresses.
    pub fn resolve_node_id(&self, path: &NavigationPath) -> Result<MapNodeId, TreeError> {
        let mut current = self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            let not_found = || TreeError::PathNotFound {
                path: path.clone(),
                depth,
            };
            let node = self.node(current).ok_or_else(not_found)?;
            let (_, marker) = node.find_marker(*segment).ok_or_else(not_found)?;
            current = marker.sub_map.ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// Resolve a path to the node it addresses.
    pub fn resolve_node(&self, path: &NavigationPath) -> Result<&MapNode, TreeError> {
        let id = self.resolve_node_id(path)?;
        self.node(id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Build a path by following marker names from the master map.
    ///
    /// When siblings share a name the first one wins.
    pub fn resolve_path_by_names<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<NavigationPath, TreeError> {
        let mut path = NavigationPath::master();
        let mut node = self.root();
        for (depth, name) in names.iter().enumerate() {
            let not_found = |path: &NavigationPath| TreeError::PathNotFound {
                path: path.clone(),
                depth,
            };
            let marker = node
                .find_marker_by_name(name.as_ref())
                .ok_or_else(|| not_found(&path))?;
            let sub_map = marker
                .sub_map
                .and_then(|id| self.node(id))
                .ok_or_else(|| not_found(&path))?;
            path = path.child(marker.id);
            node = sub_map;
        }
        Ok(path)
    }

    /// Current index of the marker `id` inside the node at `path`.
    pub fn marker_index(&self, path: &NavigationPath, id: MarkerId) -> Result<usize, TreeError> {
        self.resolve_node(path)?
            .find_marker(id)
            .map(|(index, _)| index)
            .ok_or(TreeError::MarkerNotFound(id))
    }

    /// Ids of `top` and every node below it.
    pub fn subtree_ids(&self, top: MapNodeId) -> Vec<MapNodeId> {
        let mut found = Vec::new();
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            found.push(id);
            stack.extend(node.markers.iter().filter_map(|m| m.sub_map));
        }
        found
    }

    /// Number of sub-map levels below `top`; 0 when none of its markers
    /// owns a sub-map.
    pub fn sub_map_height(&self, top: MapNodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(top, 0)];
        while let Some((id, level)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            height = height.max(level);
            stack.extend(
                node.markers
                    .iter()
                    .filter_map(|m| m.sub_map)
                    .map(|child| (child, level + 1)),
            );
        }
        height
    }

    /// Whether `node` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, ancestor: MapNodeId, node: MapNodeId) -> bool {
        self.subtree_ids(ancestor).contains(&node)
    }

    // ========================================================================
    // Marker operations
    // ========================================================================

    /// Append a marker to the node at `path`.
    pub fn add_marker(
        &self,
        path: &NavigationPath,
        position: Point,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(MapTree, MarkerId), TreeError> {
        let id = MarkerId(self.next_marker_id);
        let marker = Marker::new(id, position, name, description);
        let (mut tree, ()) = self.edit_node(path, |node| {
            node.markers.push(marker);
            Ok(())
        })?;
        tree.next_marker_id += 1;
        log::debug!("Added marker {} at {} ({:.1}, {:.1})", id, path, position.x, position.y);
        Ok((tree, id))
    }

    /// Replace the text fields set in `patch` on the marker at `index`.
    pub fn update_marker(
        &self,
        path: &NavigationPath,
        index: usize,
        patch: &MarkerPatch,
    ) -> Result<MapTree, TreeError> {
        let (tree, ()) = self.edit_node(path, |node| {
            patch.apply(marker_at(node, index)?);
            Ok(())
        })?;
        Ok(tree)
    }

    /// Move the marker at `index` to a new logical position.
    pub fn move_marker_to(
        &self,
        path: &NavigationPath,
        index: usize,
        position: Point,
    ) -> Result<MapTree, TreeError> {
        let (tree, ()) = self.edit_node(path, |node| {
            let marker = marker_at(node, index)?;
            marker.x = f64::from(position.x);
            marker.y = f64::from(position.y);
            Ok(())
        })?;
        Ok(tree)
    }

    /// Remove the marker at `index` together with its whole sub-map subtree.
    ///
    /// Later siblings shift down by one index.
    pub fn delete_marker(&self, path: &NavigationPath, index: usize) -> Result<MapTree, TreeError> {
        let (mut tree, removed) = self.edit_node(path, |node| {
            let len = node.markers.len();
            if index >= len {
                return Err(TreeError::marker_index(index, len));
            }
            Ok(node.markers.remove(index))
        })?;

        if let Some(sub_map) = removed.sub_map {
            let dropped = tree.subtree_ids(sub_map);
            for id in &dropped {
                tree.nodes.remove(id);
            }
            log::debug!(
                "Deleted marker {} and {} sub-map node(s)",
                removed.id,
                dropped.len()
            );
        } else {
            log::debug!("Deleted marker {}", removed.id);
        }
        Ok(tree)
    }

    /// Give the marker at `index` a sub-map showing `image`.
    ///
    /// Creates an empty sub-map on first attach; afterwards only the
    /// background is replaced and existing markers are kept.
    pub fn attach_sub_map_image(
        &self,
        path: &NavigationPath,
        index: usize,
        image: ImageRef,
    ) -> Result<MapTree, TreeError> {
        let node_id = self.resolve_node_id(path)?;
        let node = self.node(node_id).ok_or(TreeError::NodeNotFound(node_id))?;
        let marker = node
            .marker(index)
            .ok_or_else(|| TreeError::marker_index(index, node.markers.len()))?;

        if marker.sub_map.is_none() {
            check_depth(path.depth() + 1)?;
        }

        let mut tree = self.clone();
        match marker.sub_map {
            Some(sub_map) => {
                tree.node_mut(sub_map)?.background = Some(image);
                log::debug!("Replaced sub-map image of marker {}", marker.id);
            }
            None => {
                let sub_map = tree.alloc_node(Some(image));
                marker_at(tree.node_mut(node_id)?, index)?.sub_map = Some(sub_map);
                log::debug!("Created sub-map {} for marker {}", sub_map, marker.id);
            }
        }
        Ok(tree)
    }

    /// Replace (or clear) the master map's background.
    pub fn set_master_image(&self, image: Option<ImageRef>) -> MapTree {
        let mut tree = self.clone();
        let root = tree.root;
        if let Some(slot) = tree.nodes.get_mut(&root) {
            Arc::make_mut(slot).background = image;
        }
        tree
    }

    /// Move the marker at `index` of `from` (with its sub-map) into `to`.
    ///
    /// The marker keeps its logical position and is appended at the end of
    /// the target's markers. Fails with [`TreeError::CyclicAttachment`] if
    /// `to` is the marker's own sub-map or lies inside it.
    pub fn reparent_marker(
        &self,
        from: &NavigationPath,
        index: usize,
        to: &NavigationPath,
    ) -> Result<MapTree, TreeError> {
        let from_id = self.resolve_node_id(from)?;
        let to_id = self.resolve_node_id(to)?;
        let source = self.node(from_id).ok_or(TreeError::NodeNotFound(from_id))?;
        let marker = source
            .marker(index)
            .ok_or_else(|| TreeError::marker_index(index, source.markers.len()))?;

        if let Some(sub_map) = marker.sub_map {
            if self.is_within(sub_map, to_id) {
                return Err(TreeError::CyclicAttachment {
                    marker: marker.id,
                    target: to_id,
                });
            }
            check_depth(to.depth() + 1 + self.sub_map_height(sub_map))?;
        }

        let mut tree = self.clone();
        let moved = tree.node_mut(from_id)?.markers.remove(index);
        log::debug!("Moved marker {} from {} to {}", moved.id, from, to);
        tree.node_mut(to_id)?.markers.push(moved);
        Ok(tree)
    }

    // ========================================================================
    // Component operations
    // ========================================================================

    /// Append a component to the marker at `marker_index`.
    pub fn add_component(
        &self,
        path: &NavigationPath,
        marker_index: usize,
        component: Component,
    ) -> Result<MapTree, TreeError> {
        let (tree, ()) = self.edit_node(path, |node| {
            marker_at(node, marker_index)?.components.push(component);
            Ok(())
        })?;
        Ok(tree)
    }

    /// Replace the fields set in `patch` on one component.
    pub fn update_component(
        &self,
        path: &NavigationPath,
        marker_index: usize,
        component_index: usize,
        patch: &ComponentPatch,
    ) -> Result<MapTree, TreeError> {
        let (tree, ()) = self.edit_node(path, |node| {
            let components = &mut marker_at(node, marker_index)?.components;
            let len = components.len();
            let component = components
                .get_mut(component_index)
                .ok_or_else(|| TreeError::component_index(component_index, len))?;
            patch.apply(component);
            Ok(())
        })?;
        Ok(tree)
    }

    /// Remove one component; later components shift down by one.
    pub fn delete_component(
        &self,
        path: &NavigationPath,
        marker_index: usize,
        component_index: usize,
    ) -> Result<MapTree, TreeError> {
        let (tree, ()) = self.edit_node(path, |node| {
            let components = &mut marker_at(node, marker_index)?.components;
            if component_index >= components.len() {
                return Err(TreeError::component_index(component_index, components.len()));
            }
            components.remove(component_index);
            Ok(())
        })?;
        Ok(tree)
    }

    // ========================================================================
    // Arena internals
    // ========================================================================

    /// Clone the tree and run `edit` on the node at `path` in the clone.
    ///
    /// If `edit` fails the clone is dropped, so the receiver is never changed.
    fn edit_node<T>(
        &self,
        path: &NavigationPath,
        edit: impl FnOnce(&mut MapNode) -> Result<T, TreeError>,
    ) -> Result<(MapTree, T), TreeError> {
        let node_id = self.resolve_node_id(path)?;
        let mut tree = self.clone();
        let value = edit(tree.node_mut(node_id)?)?;
        Ok((tree, value))
    }

    /// Copy-on-write access to one node.
    pub(crate) fn node_mut(&mut self, id: MapNodeId) -> Result<&mut MapNode, TreeError> {
        self.nodes
            .get_mut(&id)
            .map(Arc::make_mut)
            .ok_or(TreeError::NodeNotFound(id))
    }

    /// Insert a fresh, empty node and return its id.
    pub(crate) fn alloc_node(&mut self, background: Option<ImageRef>) -> MapNodeId {
        let id = MapNodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Arc::new(MapNode::new(id, background)));
        id
    }

    /// Reserve a marker id without inserting a marker.
    pub(crate) fn alloc_marker_id(&mut self) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        id
    }

    /// Structural comparison of two subtrees, ignoring ids.
    fn node_eq(&self, a: MapNodeId, other: &MapTree, b: MapNodeId) -> bool {
        let (Some(a), Some(b)) = (self.node(a), other.node(b)) else {
            return false;
        };
        a.background == b.background
            && a.markers.len() == b.markers.len()
            && a.markers.iter().zip(&b.markers).all(|(ma, mb)| {
                ma.x == mb.x
                    && ma.y == mb.y
                    && ma.name == mb.name
                    && ma.description == mb.description
                    && ma.components == mb.components
                    && match (ma.sub_map, mb.sub_map) {
                        (None, None) => true,
                        (Some(sa), Some(sb)) => self.node_eq(sa, other, sb),
                        _ => false,
                    }
            })
    }
}

/// Reject a sub-map that would sit at `depth`.
pub(crate) fn check_depth(depth: usize) -> Result<(), TreeError> {
    if depth > MAX_SUB_MAP_DEPTH {
        return Err(TreeError::DepthLimitExceeded {
            depth,
            max: MAX_SUB_MAP_DEPTH,
        });
    }
    Ok(())
}

/// Mutable access to a marker by index, with a range error.
fn marker_at(node: &mut MapNode, index: usize) -> Result<&mut Marker, TreeError> {
    let len = node.markers.len();
    node.markers
        .get_mut(index)
        .ok_or_else(|| TreeError::marker_index(index, len))
}

impl Default for MapTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: same images, markers and components in the same
/// order, at every depth. Marker and node ids are not compared.
impl PartialEq for MapTree {
    fn eq(&self, other: &Self) -> bool {
        self.node_eq(self.root, other, other.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: u8) -> ImageRef {
        ImageRef::new("image/png", vec![tag; 8])
    }

    fn master() -> NavigationPath {
        NavigationPath::master()
    }

    /// Master with "Tavern" (with a sub-map holding "Cellar") and "Mill".
    fn sample_tree() -> (MapTree, MarkerId, MarkerId) {
        let tree = MapTree::with_master_image(Some(image(0)));
        let (tree, tavern) = tree
            .add_marker(&master(), Point::new(200.0, 200.0), "Tavern", "")
            .unwrap();
        let (tree, _mill) = tree
            .add_marker(&master(), Point::new(50.0, 75.0), "Mill", "Windy")
            .unwrap();
        let tree = tree.attach_sub_map_image(&master(), 0, image(1)).unwrap();
        let (tree, cellar) = tree
            .add_marker(&master().child(tavern), Point::new(1.0, 2.0), "Cellar", "")
            .unwrap();
        (tree, tavern, cellar)
    }

    #[test]
    fn test_new_tree_has_empty_master() {
        let tree = MapTree::new();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.root().is_empty());
        assert!(tree.master_image().is_none());
        assert_eq!(tree.resolve_node_id(&master()).unwrap(), tree.root_id());
    }

    #[test]
    fn test_add_marker_leaves_original_untouched() {
        let tree = MapTree::new();
        let (next, id) = tree
            .add_marker(&master(), Point::new(200.0, 200.0), "Tavern", "Ale")
            .unwrap();

        assert!(tree.root().markers.is_empty());
        let marker = &next.root().markers[0];
        assert_eq!(marker.id, id);
        assert_eq!(marker.position(), Point::new(200.0, 200.0));
        assert!(marker.components.is_empty());
        assert!(marker.sub_map.is_none());
    }

    #[test]
    fn test_marker_ids_are_unique() {
        let tree = MapTree::new();
        let (tree, a) = tree.add_marker(&master(), Point::origin(), "a", "").unwrap();
        let tree = tree.delete_marker(&master(), 0).unwrap();
        let (_, b) = tree.add_marker(&master(), Point::origin(), "b", "").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_marker() {
        let (tree, _, _) = sample_tree();
        let next = tree
            .update_marker(&master(), 1, &MarkerPatch::new().description("Calm"))
            .unwrap();
        assert_eq!(next.root().markers[1].name, "Mill");
        assert_eq!(next.root().markers[1].description, "Calm");
        assert_eq!(tree.root().markers[1].description, "Windy");
    }

    #[test]
    fn test_update_marker_out_of_range() {
        let (tree, _, _) = sample_tree();
        let err = tree
            .update_marker(&master(), 2, &MarkerPatch::new().name("x"))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::IndexOutOfRange {
                kind: IndexKind::Marker,
                index: 2,
                len: 2
            }
        );
    }

    #[test]
    fn test_move_marker() {
        let (tree, _, _) = sample_tree();
        let next = tree.move_marker_to(&master(), 1, Point::new(9.0, 8.0)).unwrap();
        assert_eq!(next.root().markers[1].position(), Point::new(9.0, 8.0));
    }

    #[test]
    fn test_resolve_nested_path() {
        let (tree, tavern, cellar) = sample_tree();
        let node = tree.resolve_node(&master().child(tavern)).unwrap();
        assert_eq!(node.markers.len(), 1);
        assert_eq!(node.markers[0].id, cellar);
        assert_eq!(node.background, Some(image(1)));
    }

    #[test]
    fn test_resolve_fails_without_sub_map() {
        let (tree, tavern, cellar) = sample_tree();
        let path = master().child(tavern).child(cellar);
        assert_eq!(
            tree.resolve_node(&path).unwrap_err(),
            TreeError::PathNotFound { path, depth: 1 }
        );
    }

    #[test]
    fn test_resolve_fails_for_unknown_marker() {
        let (tree, _, cellar) = sample_tree();
        // Cellar exists, but not on the master map
        let path = master().child(cellar);
        assert!(matches!(
            tree.resolve_node(&path),
            Err(TreeError::PathNotFound { depth: 0, .. })
        ));
    }

    #[test]
    fn test_resolve_by_names() {
        let (tree, tavern, _) = sample_tree();
        let path = tree.resolve_path_by_names(&["Tavern"]).unwrap();
        assert_eq!(path, master().child(tavern));

        assert!(tree.resolve_path_by_names(&["Mill"]).is_err());
        assert!(tree.resolve_path_by_names(&["Nowhere"]).is_err());
        assert_eq!(
            tree.resolve_path_by_names::<&str>(&[]).unwrap(),
            NavigationPath::master()
        );
    }

    #[test]
    fn test_delete_shifts_later_markers() {
        let mut tree = MapTree::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let (next, id) = tree.add_marker(&master(), Point::origin(), name, "").unwrap();
            tree = next;
            ids.push(id);
        }

        let next = tree.delete_marker(&master(), 1).unwrap();
        let remaining: Vec<_> = next.root().markers.iter().map(|m| m.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(next.marker_index(&master(), ids[3]).unwrap(), 2);
        assert_eq!(tree.marker_index(&master(), ids[3]).unwrap(), 3);
    }

    #[test]
    fn test_delete_drops_whole_subtree() {
        let (tree, tavern, cellar) = sample_tree();
        // Give Cellar its own sub-map to get depth 2
        let cellar_path = master().child(tavern);
        let tree = tree.attach_sub_map_image(&cellar_path, 0, image(2)).unwrap();
        assert_eq!(tree.node_count(), 3);

        let next = tree.delete_marker(&master(), 0).unwrap();
        assert_eq!(next.node_count(), 1);
        assert_eq!(next.root().markers.len(), 1);
        assert!(next.resolve_node(&master().child(tavern)).is_err());
        assert!(next.resolve_node(&cellar_path.child(cellar)).is_err());
        // The original still has everything
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_delete_out_of_range() {
        let (tree, _, _) = sample_tree();
        assert!(matches!(
            tree.delete_marker(&master(), 5),
            Err(TreeError::IndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_attach_creates_then_replaces_image() {
        let tree = MapTree::new();
        let (tree, id) = tree.add_marker(&master(), Point::origin(), "Tavern", "").unwrap();
        let tree = tree.attach_sub_map_image(&master(), 0, image(1)).unwrap();
        let sub_path = master().child(id);
        let (tree, _) = tree.add_marker(&sub_path, Point::origin(), "Bar", "").unwrap();

        let next = tree.attach_sub_map_image(&master(), 0, image(9)).unwrap();
        let sub = next.resolve_node(&sub_path).unwrap();
        assert_eq!(sub.background, Some(image(9)));
        assert_eq!(sub.markers.len(), 1);
        assert_eq!(next.node_count(), 2);

        // Old tree still sees the old image
        let old = tree.resolve_node(&sub_path).unwrap();
        assert_eq!(old.background, Some(image(1)));
    }

    #[test]
    fn test_set_master_image() {
        let tree = MapTree::new();
        let next = tree.set_master_image(Some(image(4)));
        assert_eq!(next.master_image(), Some(&image(4)));
        assert!(tree.master_image().is_none());
    }

    #[test]
    fn test_reparent_into_sibling_sub_map() {
        let (tree, tavern, _) = sample_tree();
        // Move "Mill" into the Tavern sub-map
        let next = tree.reparent_marker(&master(), 1, &master().child(tavern)).unwrap();
        assert_eq!(next.root().markers.len(), 1);
        let sub = next.resolve_node(&master().child(tavern)).unwrap();
        assert_eq!(sub.markers.len(), 2);
        assert_eq!(sub.markers[1].name, "Mill");
    }

    #[test]
    fn test_reparent_into_own_sub_map_is_cyclic() {
        let (tree, tavern, _) = sample_tree();
        let target = master().child(tavern);
        let err = tree.reparent_marker(&master(), 0, &target).unwrap_err();
        assert!(matches!(err, TreeError::CyclicAttachment { marker, .. } if marker == tavern));
    }

    #[test]
    fn test_reparent_into_deeper_descendant_is_cyclic() {
        let (tree, tavern, cellar) = sample_tree();
        let tavern_path = master().child(tavern);
        let tree = tree.attach_sub_map_image(&tavern_path, 0, image(2)).unwrap();
        let deep = tavern_path.child(cellar);
        assert!(matches!(
            tree.reparent_marker(&master(), 0, &deep),
            Err(TreeError::CyclicAttachment { .. })
        ));
    }

    /// Master plus a chain of `depth` nested sub-maps, one marker per level.
    /// Returns the path of the deepest node.
    fn chain(depth: usize) -> (MapTree, NavigationPath) {
        let mut tree = MapTree::with_master_image(Some(image(0)));
        let mut path = master();
        for level in 0..depth {
            let (next, id) = tree
                .add_marker(&path, Point::origin(), format!("Level {level}"), "")
                .unwrap();
            tree = next.attach_sub_map_image(&path, 0, image(1)).unwrap();
            path = path.child(id);
        }
        (tree, path)
    }

    #[test]
    fn test_sub_map_height() {
        let (tree, _) = chain(3);
        assert_eq!(tree.sub_map_height(tree.root_id()), 3);
        let (tree, _) = chain(0);
        assert_eq!(tree.sub_map_height(tree.root_id()), 0);
    }

    #[test]
    fn test_attach_stops_at_max_depth() {
        let (tree, deepest) = chain(MAX_SUB_MAP_DEPTH);
        assert_eq!(deepest.depth(), MAX_SUB_MAP_DEPTH);

        let (tree, _) = tree.add_marker(&deepest, Point::origin(), "Too deep", "").unwrap();
        let err = tree.attach_sub_map_image(&deepest, 0, image(2)).unwrap_err();
        assert_eq!(
            err,
            TreeError::DepthLimitExceeded {
                depth: MAX_SUB_MAP_DEPTH + 1,
                max: MAX_SUB_MAP_DEPTH
            }
        );

        // Replacing an existing sub-map image does not add depth.
        let parent = deepest.parent().unwrap();
        assert!(tree.attach_sub_map_image(&parent, 0, image(3)).is_ok());
    }

    #[test]
    fn test_reparent_respects_max_depth() {
        let (tree, deepest) = chain(MAX_SUB_MAP_DEPTH);
        // "Tower" owns a sub-map that itself holds a sub-map: height 1 below it.
        let (tree, tower) = tree.add_marker(&master(), Point::origin(), "Tower", "").unwrap();
        let tower_index = tree.marker_index(&master(), tower).unwrap();
        let tree = tree.attach_sub_map_image(&master(), tower_index, image(4)).unwrap();
        let tower_path = master().child(tower);
        let (tree, _) = tree.add_marker(&tower_path, Point::origin(), "Attic", "").unwrap();
        let tree = tree.attach_sub_map_image(&tower_path, 0, image(5)).unwrap();

        let too_deep = deepest.parent().unwrap();
        let err = tree
            .reparent_marker(&master(), tower_index, &too_deep)
            .unwrap_err();
        assert!(matches!(err, TreeError::DepthLimitExceeded { depth, .. } if depth == MAX_SUB_MAP_DEPTH + 1));

        let fits = too_deep.parent().unwrap();
        assert!(tree.reparent_marker(&master(), tower_index, &fits).is_ok());
    }

    #[test]
    fn test_component_crud() {
        let (tree, _, _) = sample_tree();
        let tree = tree
            .add_component(&master(), 0, Component::new("Goblin", "Small", "http://a"))
            .unwrap();
        let tree = tree
            .add_component(&master(), 0, Component::new("Orc", "Big", "http://b"))
            .unwrap();
        assert_eq!(tree.root().markers[0].components.len(), 2);
        assert_eq!(tree.root().markers[0].components[1].name, "Orc");

        let tree = tree
            .update_component(&master(), 0, 0, &ComponentPatch::new().description("Sneaky"))
            .unwrap();
        assert_eq!(tree.root().markers[0].components[0].description, "Sneaky");

        let tree = tree.delete_component(&master(), 0, 0).unwrap();
        let components = &tree.root().markers[0].components;
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "Orc");
    }

    #[test]
    fn test_component_index_errors() {
        let (tree, _, _) = sample_tree();
        assert!(matches!(
            tree.delete_component(&master(), 0, 0),
            Err(TreeError::IndexOutOfRange {
                kind: IndexKind::Component,
                ..
            })
        ));
        assert!(matches!(
            tree.add_component(&master(), 7, Component::default()),
            Err(TreeError::IndexOutOfRange {
                kind: IndexKind::Marker,
                ..
            })
        ));
    }

    #[test]
    fn test_structural_equality_ignores_ids() {
        let (a, _, _) = sample_tree();
        // Same structure built after an extra throwaway marker shifts ids
        let tree = MapTree::with_master_image(Some(image(0)));
        let (tree, _) = tree.add_marker(&master(), Point::origin(), "tmp", "").unwrap();
        let tree = tree.delete_marker(&master(), 0).unwrap();
        let (tree, tavern) = tree
            .add_marker(&master(), Point::new(200.0, 200.0), "Tavern", "")
            .unwrap();
        let (tree, _) = tree
            .add_marker(&master(), Point::new(50.0, 75.0), "Mill", "Windy")
            .unwrap();
        let tree = tree.attach_sub_map_image(&master(), 0, image(1)).unwrap();
        let (b, _) = tree
            .add_marker(&master().child(tavern), Point::new(1.0, 2.0), "Cellar", "")
            .unwrap();

        assert_eq!(a, b);
        let c = b.update_marker(&master(), 1, &MarkerPatch::new().name("Mill2")).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_untouched_nodes_are_shared() {
        let (tree, tavern, _) = sample_tree();
        let next = tree.update_marker(&master(), 1, &MarkerPatch::new().name("x")).unwrap();
        let sub_id = tree.resolve_node_id(&master().child(tavern)).unwrap();
        assert!(Arc::ptr_eq(&tree.nodes[&sub_id], &next.nodes[&sub_id]));
        assert!(!Arc::ptr_eq(&tree.nodes[&tree.root], &next.nodes[&next.root]));
    }
}
