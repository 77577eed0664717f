//! Markers and the structured notes attached to them.

use std::fmt;

use super::MapNodeId;
use crate::zoom_math::Point;

/// Stable identifier for a marker, unique within one tree.
///
/// Assigned at creation and never reused, so navigation state keeps pointing
/// at the right marker across renames and sibling deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub(crate) u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A structured note attached to a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub description: String,
    /// External reference, e.g. a monster sheet URL.
    pub link: String,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            link: link.into(),
        }
    }
}

/// A point annotation on a map node.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    /// Logical X in the owning node's unscaled pixel space.
    ///
    /// Stored at double precision so positions loaded from a document are
    /// written back unchanged; screen math runs in `f32`.
    pub x: f64,
    /// Logical Y in the owning node's unscaled pixel space.
    pub y: f64,
    pub name: String,
    pub description: String,
    /// Notes in display order.
    pub components: Vec<Component>,
    /// Owned child map, created when an image is first attached.
    pub sub_map: Option<MapNodeId>,
}

impl Marker {
    pub(crate) fn new(
        id: MarkerId,
        position: Point,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            x: f64::from(position.x),
            y: f64::from(position.y),
            name: name.into(),
            description: description.into(),
            components: Vec::new(),
            sub_map: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    pub fn has_sub_map(&self) -> bool {
        self.sub_map.is_some()
    }
}

/// Partial update of a marker's editable text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MarkerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub(crate) fn apply(&self, marker: &mut Marker) {
        if let Some(name) = &self.name {
            marker.name = name.clone();
        }
        if let Some(description) = &self.description {
            marker.description = description.clone();
        }
    }
}

/// Partial update of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl ComponentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub(crate) fn apply(&self, component: &mut Component) {
        if let Some(name) = &self.name {
            component.name = name.clone();
        }
        if let Some(description) = &self.description {
            component.description = description.clone();
        }
        if let Some(link) = &self.link {
            component.link = link.clone();
        }
    }
}

impl From<Component> for ComponentPatch {
    /// A patch that overwrites every field.
    fn from(component: Component) -> Self {
        Self {
            name: Some(component.name),
            description: Some(component.description),
            link: Some(component.link),
        }
    }
}
