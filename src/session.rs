//! Editing session: the single owner of a map document's state.
//!
//! A [`MapSession`] holds the tree, the navigation path, the viewport, the
//! marker selection and the read generation. UI events call one method
//! each; every tree change goes through one commit point that swaps the tree,
//! recomputes the [`ActiveView`] and re-fits zoom when the background changed.
//! Failed operations return an error and leave the session untouched.

use std::path::Path;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::format::{self, MapDocument};
use crate::io::{ReadCompletion, ReadPurpose, ReadTicket, ReadTracker};
use crate::model::{Component, ComponentPatch, ImageRef, Marker, MarkerId, MarkerPatch};
use crate::navigation::{ActiveView, Navigator};
use crate::tree::{MapTree, NavigationPath, TreeError};
use crate::zoom_math::{Point, Size, Viewport};

/// Ephemeral edit buffer for a marker's text fields.
///
/// Created from the selected marker and written back only through
/// [`MapSession::commit_draft`]. The draft addresses its marker by id, so
/// edits to siblings in between do not redirect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDraft {
    marker: MarkerId,
    pub name: String,
    pub description: String,
}

impl MarkerDraft {
    pub fn marker(&self) -> MarkerId {
        self.marker
    }

    fn patch(&self) -> MarkerPatch {
        MarkerPatch::new()
            .name(self.name.as_str())
            .description(self.description.as_str())
    }
}

/// One open map document and everything needed to edit and display it.
#[derive(Debug)]
pub struct MapSession {
    tree: MapTree,
    navigator: Navigator,
    viewport: Viewport,
    /// Index into the current node's markers.
    selection: Option<usize>,
    reads: ReadTracker,
    view: ActiveView,
}

impl MapSession {
    /// Empty session using the zoom settings from `config`.
    pub fn new(config: &MapConfig) -> Self {
        Self::with_tree(MapTree::new(), config)
    }

    /// Session over an existing tree, starting at the master map.
    pub fn with_tree(tree: MapTree, config: &MapConfig) -> Self {
        let navigator = Navigator::new();
        let view = navigator.view(&tree);
        let mut session = Self {
            tree,
            navigator,
            viewport: config.viewport(),
            selection: None,
            reads: ReadTracker::new(),
            view,
        };
        session.refit();
        session
    }

    // ========================================================================
    // State access
    // ========================================================================

    pub fn tree(&self) -> &MapTree {
        &self.tree
    }

    pub fn path(&self) -> &NavigationPath {
        self.navigator.path()
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.zoom
    }

    pub fn is_at_master(&self) -> bool {
        self.navigator.is_at_master()
    }

    /// Marker names from the master map down to the current node.
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.navigator.breadcrumbs(&self.tree)
    }

    // ========================================================================
    // Commit point
    // ========================================================================

    /// Install `tree` as the current tree and refresh derived state.
    fn commit(&mut self, tree: MapTree) {
        self.tree = tree;
        self.refresh_view();
    }

    /// Replace the whole tree, e.g. after loading a document.
    ///
    /// Resets navigation to the master map, clears the selection and
    /// supersedes every outstanding read.
    pub fn replace_tree(&mut self, tree: MapTree) {
        log::info!(
            "Replacing map: {} markers in {} map(s)",
            tree.marker_count(),
            tree.node_count()
        );
        self.reads.invalidate();
        self.navigator.go_to_master();
        self.selection = None;
        self.commit(tree);
    }

    fn refresh_view(&mut self) {
        let view = self.navigator.view(&self.tree);
        let background_changed = view.background() != self.view.background();
        self.view = view;
        if background_changed {
            self.refit();
        }
    }

    /// Fit zoom to the current background.
    fn refit(&mut self) {
        let content = match self.view.background().map(ImageRef::dimensions) {
            Some(Ok(dims)) => Some(Size::from(dims)),
            Some(Err(e)) => {
                log::warn!("Cannot read background dimensions, keeping zoom: {}", e);
                None
            }
            None => None,
        };
        if let Err(e) = self.viewport.set_content(content) {
            log::warn!("Background size unusable for zoom: {}", e);
        }
    }

    // ========================================================================
    // Markers
    // ========================================================================

    /// Add a marker where the user clicked on the current map.
    pub fn add_marker_at_screen(
        &mut self,
        pointer: Point,
        container_origin: Point,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<MarkerId, MapError> {
        let logical = self.viewport.to_logical(pointer, container_origin);
        let (tree, id) = self
            .tree
            .add_marker(self.navigator.path(), logical, name, description)?;
        self.commit(tree);
        Ok(id)
    }

    pub fn update_marker(&mut self, index: usize, patch: &MarkerPatch) -> Result<(), MapError> {
        let tree = self.tree.update_marker(self.navigator.path(), index, patch)?;
        self.commit(tree);
        Ok(())
    }

    /// Move a marker to where the pointer is.
    pub fn move_marker_to_screen(
        &mut self,
        index: usize,
        pointer: Point,
        container_origin: Point,
    ) -> Result<(), MapError> {
        let logical = self.viewport.to_logical(pointer, container_origin);
        let tree = self
            .tree
            .move_marker_to(self.navigator.path(), index, logical)?;
        self.commit(tree);
        Ok(())
    }

    /// Delete a marker and its sub-maps. Always clears the selection.
    pub fn delete_marker(&mut self, index: usize) -> Result<(), MapError> {
        let tree = self.tree.delete_marker(self.navigator.path(), index)?;
        self.selection = None;
        self.commit(tree);
        Ok(())
    }

    /// Attach (or replace) the sub-map image of a marker on the current map.
    pub fn attach_image(&mut self, index: usize, image: ImageRef) -> Result<(), MapError> {
        let tree = self
            .tree
            .attach_sub_map_image(self.navigator.path(), index, image)?;
        self.commit(tree);
        Ok(())
    }

    /// Move a marker from the current map into the node at `to`.
    pub fn reparent_marker(&mut self, index: usize, to: &NavigationPath) -> Result<(), MapError> {
        let tree = self
            .tree
            .reparent_marker(self.navigator.path(), index, to)?;
        self.selection = None;
        self.commit(tree);
        Ok(())
    }

    pub fn set_master_image(&mut self, image: Option<ImageRef>) {
        let tree = self.tree.set_master_image(image);
        self.commit(tree);
    }

    /// Where marker `index` of the current map is drawn, in scaled content
    /// coordinates.
    pub fn marker_screen_position(&self, index: usize) -> Option<Point> {
        self.view
            .markers()
            .get(index)
            .map(|m| self.viewport.to_screen(m.position()))
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_component(
        &mut self,
        marker_index: usize,
        component: Component,
    ) -> Result<(), MapError> {
        let tree = self
            .tree
            .add_component(self.navigator.path(), marker_index, component)?;
        self.commit(tree);
        Ok(())
    }

    pub fn update_component(
        &mut self,
        marker_index: usize,
        component_index: usize,
        patch: &ComponentPatch,
    ) -> Result<(), MapError> {
        let tree = self.tree.update_component(
            self.navigator.path(),
            marker_index,
            component_index,
            patch,
        )?;
        self.commit(tree);
        Ok(())
    }

    pub fn delete_component(
        &mut self,
        marker_index: usize,
        component_index: usize,
    ) -> Result<(), MapError> {
        let tree =
            self.tree
                .delete_component(self.navigator.path(), marker_index, component_index)?;
        self.commit(tree);
        Ok(())
    }

    // ========================================================================
    // Selection and drafts
    // ========================================================================

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// The selected marker, if the selection still points at one.
    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selection.and_then(|i| self.view.markers().get(i))
    }

    pub fn select_marker(&mut self, index: usize) -> Result<(), MapError> {
        let len = self.view.markers().len();
        if index >= len {
            return Err(TreeError::marker_index(index, len).into());
        }
        self.selection = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Start editing the selected marker's text.
    pub fn begin_draft(&self) -> Result<MarkerDraft, MapError> {
        let marker = self.selected_marker().ok_or(MapError::NoSelection)?;
        Ok(MarkerDraft {
            marker: marker.id,
            name: marker.name.clone(),
            description: marker.description.clone(),
        })
    }

    /// Write a draft back to its marker on the current map.
    pub fn commit_draft(&mut self, draft: &MarkerDraft) -> Result<(), MapError> {
        let index = self.tree.marker_index(self.navigator.path(), draft.marker)?;
        self.update_marker(index, &draft.patch())
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    pub fn set_viewport_size(&mut self, width: f32, height: f32) -> Result<(), MapError> {
        self.viewport.set_size(Size::new(width, height))?;
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan_by(delta);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn enter_sub_map(&mut self, marker: MarkerId) -> Result<(), MapError> {
        self.navigator.enter_sub_map(&self.tree, marker)?;
        self.after_navigation();
        Ok(())
    }

    pub fn enter_sub_map_by_name(&mut self, name: &str) -> Result<MarkerId, MapError> {
        let id = self.navigator.enter_sub_map_by_name(&self.tree, name)?;
        self.after_navigation();
        Ok(id)
    }

    pub fn go_to_master(&mut self) {
        self.navigator.go_to_master();
        self.after_navigation();
    }

    /// Go up one level. Returns false when already at the master map.
    pub fn go_back(&mut self) -> bool {
        let moved = self.navigator.go_back();
        if moved {
            self.after_navigation();
        }
        moved
    }

    fn after_navigation(&mut self) {
        self.selection = None;
        self.refresh_view();
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn encode_document(&self) -> MapDocument {
        format::encode(&self.tree)
    }

    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(format::to_json(&self.tree)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), MapError> {
        format::save_to_path(&self.tree, path)?;
        Ok(())
    }

    /// Load a document synchronously, superseding any outstanding read.
    pub fn load_from_path(&mut self, path: &Path) -> Result<(), MapError> {
        let tree = format::load_from_path(path)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Start a background read; only the newest ticket will be applied.
    pub fn begin_read(&mut self, purpose: ReadPurpose) -> ReadTicket {
        self.reads.begin(purpose)
    }

    /// Start a read whose bytes become the sub-map image of marker `index`
    /// on the current map.
    pub fn begin_image_read(&mut self, index: usize) -> Result<ReadTicket, MapError> {
        let markers = self.view.markers();
        let marker = markers
            .get(index)
            .ok_or_else(|| TreeError::marker_index(index, markers.len()))?;
        let purpose = ReadPurpose::AttachImage {
            path: self.navigator.path().clone(),
            marker: marker.id,
        };
        Ok(self.reads.begin(purpose))
    }

    /// Apply the bytes of a finished document read.
    pub fn complete_load(&mut self, ticket: &ReadTicket, bytes: &[u8]) -> Result<(), MapError> {
        self.reads.check(ticket)?;
        if *ticket.purpose() != ReadPurpose::LoadMap {
            return Err(MapError::UnexpectedRead);
        }
        let tree = format::FormatRegistry::new().import_bytes(bytes)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Apply the bytes of a finished image read.
    ///
    /// `mime` is what the upload surface reported; without one the type is
    /// sniffed from the bytes.
    pub fn complete_image_read(
        &mut self,
        ticket: &ReadTicket,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Result<(), MapError> {
        self.reads.check(ticket)?;
        let ReadPurpose::AttachImage { path, marker } = ticket.purpose() else {
            return Err(MapError::UnexpectedRead);
        };
        let image = match mime {
            Some(mime) => ImageRef::new(mime, bytes),
            None => ImageRef::from_bytes(bytes),
        };
        let index = self.tree.marker_index(path, *marker)?;
        let tree = self.tree.attach_sub_map_image(path, index, image)?;
        self.reads.invalidate();
        self.commit(tree);
        Ok(())
    }

    /// Apply a completion from [`spawn_file_read`](crate::io::spawn_file_read).
    pub fn apply_read(&mut self, completion: ReadCompletion) -> Result<(), MapError> {
        self.reads.check(&completion.ticket)?;
        let bytes = completion.result?;
        match completion.ticket.purpose() {
            ReadPurpose::LoadMap => self.complete_load(&completion.ticket, &bytes),
            ReadPurpose::AttachImage { .. } => {
                self.complete_image_read(&completion.ticket, bytes, None)
            }
        }
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(&MapConfig::default())
    }
}
