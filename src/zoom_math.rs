//! Zoom and pan mathematics.
//!
//! Pure functions mapping between screen-space pointer coordinates and
//! logical map coordinates, plus the stateful [`Viewport`] the session keeps
//! for the map currently on screen.

use thiserror::Error;

use crate::constants::{DEFAULT_ZOOM, MAX_ZOOM_MULTIPLIER, ZOOM_STEP};

/// Errors produced by the coordinate transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// A viewport or content dimension was zero, negative or not finite.
    #[error("Invalid {what} dimension: {width}x{height}")]
    InvalidDimension {
        /// Which size was rejected ("viewport" or "content")
        what: &'static str,
        width: f32,
        height: f32,
    },

    /// The zoom multiplier must allow at least the fit-to-viewport zoom.
    #[error("Invalid zoom multiplier: {0}")]
    InvalidMultiplier(f32),
}

/// A 2D point, either in screen space or in logical map space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions by `factor`.
    pub fn scaled(&self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    fn validate(&self, what: &'static str) -> Result<(), TransformError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(TransformError::InvalidDimension {
                what,
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size::new(width as f32, height as f32)
    }
}

/// Allowed zoom range for one piece of content in one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    /// Smallest zoom at which the content still covers the viewport.
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_ZOOM,
            max_zoom: DEFAULT_ZOOM,
        }
    }
}

/// Direction of a discrete zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Compute the zoom range using the default multiplier.
pub fn compute_zoom_bounds(viewport: Size, content: Size) -> Result<ZoomBounds, TransformError> {
    compute_zoom_bounds_with(viewport, content, MAX_ZOOM_MULTIPLIER)
}

/// Compute the zoom range for `content` shown inside `viewport`.
///
/// `min_zoom` is the smallest zoom for which the scaled content covers the
/// viewport on both axes; `max_zoom` is `min_zoom * multiplier`.
pub fn compute_zoom_bounds_with(
    viewport: Size,
    content: Size,
    multiplier: f32,
) -> Result<ZoomBounds, TransformError> {
    viewport.validate("viewport")?;
    content.validate("content")?;
    if !multiplier.is_finite() || multiplier < 1.0 {
        return Err(TransformError::InvalidMultiplier(multiplier));
    }

    let min_zoom = (viewport.width / content.width).max(viewport.height / content.height);
    Ok(ZoomBounds {
        min_zoom,
        max_zoom: min_zoom * multiplier,
    })
}

/// Clamp `zoom` into `bounds`.
pub fn clamp_zoom(zoom: f32, bounds: ZoomBounds) -> f32 {
    zoom.clamp(bounds.min_zoom, bounds.max_zoom)
}

/// Convert a pointer position to logical map coordinates.
pub fn screen_to_logical(pointer: Point, container_origin: Point, zoom: f32) -> Point {
    Point::new(
        (pointer.x - container_origin.x) / zoom,
        (pointer.y - container_origin.y) / zoom,
    )
}

/// Convert logical map coordinates to a position inside the scaled content.
pub fn logical_to_screen(logical: Point, zoom: f32) -> Point {
    Point::new(logical.x * zoom, logical.y * zoom)
}

/// Multiply or divide `zoom` by `factor`, clamped to `bounds`.
pub fn step_zoom(zoom: f32, direction: ZoomDirection, factor: f32, bounds: ZoomBounds) -> f32 {
    let next = match direction {
        ZoomDirection::In => zoom * factor,
        ZoomDirection::Out => zoom / factor,
    };
    clamp_zoom(next, bounds)
}

/// The "fit to viewport" zoom.
pub fn reset_zoom(bounds: ZoomBounds) -> f32 {
    bounds.min_zoom
}

/// New scroll offset after dragging by `delta`.
///
/// `content` is the scaled (on-screen) content size; the offset stays within
/// `[0, content - viewport]` on each axis.
pub fn pan_scroll(scroll: Point, delta: Point, content: Size, viewport: Size) -> Point {
    let max_x = (content.width - viewport.width).max(0.0);
    let max_y = (content.height - viewport.height).max(0.0);
    Point::new(
        (scroll.x - delta.x).clamp(0.0, max_x),
        (scroll.y - delta.y).clamp(0.0, max_y),
    )
}

/// Zoom and scroll state for the map currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub bounds: ZoomBounds,
    pub scroll: Point,
    /// Visible area size, once known.
    pub size: Option<Size>,
    /// Unscaled content size, once known.
    pub content: Option<Size>,
    step: f32,
    multiplier: f32,
}

impl Viewport {
    /// Create a viewport with the given step factor and max zoom multiplier.
    pub fn new(step: f32, multiplier: f32) -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            bounds: ZoomBounds::default(),
            scroll: Point::origin(),
            size: None,
            content: None,
            step,
            multiplier,
        }
    }

    /// Set the visible area size and re-fit.
    pub fn set_size(&mut self, size: Size) -> Result<(), TransformError> {
        size.validate("viewport")?;
        self.size = Some(size);
        self.refit()
    }

    /// Set the unscaled content size and re-fit.
    pub fn set_content(&mut self, content: Option<Size>) -> Result<(), TransformError> {
        if let Some(content) = content {
            content.validate("content")?;
        }
        self.content = content;
        self.refit()
    }

    /// Recompute bounds from the known sizes and reset to fit-to-viewport.
    ///
    /// Does nothing while either size is unknown.
    fn refit(&mut self) -> Result<(), TransformError> {
        let (Some(size), Some(content)) = (self.size, self.content) else {
            return Ok(());
        };
        self.bounds = compute_zoom_bounds_with(size, content, self.multiplier)?;
        self.zoom = reset_zoom(self.bounds);
        self.scroll = Point::origin();
        log::debug!(
            "Viewport fitted: zoom {:.4} in [{:.4}, {:.4}]",
            self.zoom,
            self.bounds.min_zoom,
            self.bounds.max_zoom
        );
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.zoom = step_zoom(self.zoom, ZoomDirection::In, self.step, self.bounds);
        self.clamp_scroll();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = step_zoom(self.zoom, ZoomDirection::Out, self.step, self.bounds);
        self.clamp_scroll();
    }

    pub fn reset(&mut self) {
        self.zoom = reset_zoom(self.bounds);
        self.clamp_scroll();
    }

    /// Apply a drag delta to the scroll offset.
    pub fn pan_by(&mut self, delta: Point) {
        if let (Some(size), Some(content)) = (self.size, self.content) {
            self.scroll = pan_scroll(self.scroll, delta, content.scaled(self.zoom), size);
        }
    }

    /// Convert a pointer position to logical coordinates at the current zoom.
    pub fn to_logical(&self, pointer: Point, container_origin: Point) -> Point {
        screen_to_logical(pointer, container_origin, self.zoom)
    }

    /// Convert logical coordinates to scaled content coordinates.
    pub fn to_screen(&self, logical: Point) -> Point {
        logical_to_screen(logical, self.zoom)
    }

    fn clamp_scroll(&mut self) {
        self.pan_by(Point::origin());
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZOOM_STEP, MAX_ZOOM_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_bounds_for_reference_viewport() {
        let bounds = compute_zoom_bounds(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0))
            .expect("valid sizes");

        assert!(approx_eq(bounds.min_zoom, 0.5));
        assert!(approx_eq(bounds.max_zoom, 2.0));
    }

    #[test]
    fn test_min_zoom_covers_viewport_and_is_minimal() {
        let cases = [
            (Size::new(800.0, 600.0), Size::new(1000.0, 2000.0)),
            (Size::new(1920.0, 1080.0), Size::new(640.0, 480.0)),
            (Size::new(300.0, 900.0), Size::new(3000.0, 100.0)),
            (Size::new(1.0, 1.0), Size::new(7.0, 3.0)),
        ];

        for (viewport, content) in cases {
            let bounds = compute_zoom_bounds(viewport, content).expect("valid sizes");
            let z = bounds.min_zoom;
            assert!(z * content.width >= viewport.width - EPSILON);
            assert!(z * content.height >= viewport.height - EPSILON);
            // At least one axis is exactly covered, so no smaller zoom works
            let tight_w = approx_eq(z * content.width, viewport.width);
            let tight_h = approx_eq(z * content.height, viewport.height);
            assert!(tight_w || tight_h);
        }
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = compute_zoom_bounds(Size::new(800.0, 600.0), Size::new(0.0, 1200.0));
        assert!(matches!(
            err,
            Err(TransformError::InvalidDimension { what: "content", .. })
        ));

        let err = compute_zoom_bounds(Size::new(800.0, -1.0), Size::new(10.0, 10.0));
        assert!(matches!(
            err,
            Err(TransformError::InvalidDimension { what: "viewport", .. })
        ));

        let err = compute_zoom_bounds(Size::new(f32::NAN, 1.0), Size::new(10.0, 10.0));
        assert!(err.is_err());
    }

    #[test]
    fn test_multiplier_below_one_rejected() {
        let err = compute_zoom_bounds_with(Size::new(1.0, 1.0), Size::new(1.0, 1.0), 0.5);
        assert_eq!(err, Err(TransformError::InvalidMultiplier(0.5)));
    }

    #[test]
    fn test_screen_logical_round_trip() {
        let bounds = ZoomBounds {
            min_zoom: 0.5,
            max_zoom: 2.0,
        };
        for zoom in [bounds.min_zoom, 0.75, 1.0, 1.44, bounds.max_zoom] {
            for pos in [
                Point::new(0.0, 0.0),
                Point::new(200.0, 200.0),
                Point::new(1599.5, 3.25),
            ] {
                let back = screen_to_logical(logical_to_screen(pos, zoom), Point::origin(), zoom);
                assert!(approx_eq(back.x, pos.x), "x at zoom {zoom}");
                assert!(approx_eq(back.y, pos.y), "y at zoom {zoom}");
            }
        }
    }

    #[test]
    fn test_screen_to_logical_subtracts_origin() {
        let p = screen_to_logical(Point::new(150.0, 90.0), Point::new(50.0, 10.0), 2.0);
        assert_eq!(p, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_step_zoom_in_out_inverse() {
        let bounds = ZoomBounds {
            min_zoom: 0.1,
            max_zoom: 10.0,
        };
        let start = 1.0;
        let mut zoom = start;
        for _ in 0..5 {
            zoom = step_zoom(zoom, ZoomDirection::In, ZOOM_STEP, bounds);
        }
        for _ in 0..5 {
            zoom = step_zoom(zoom, ZoomDirection::Out, ZOOM_STEP, bounds);
        }
        assert!(approx_eq(zoom, start));
    }

    #[test]
    fn test_step_zoom_clamps() {
        let bounds = ZoomBounds {
            min_zoom: 0.5,
            max_zoom: 2.0,
        };
        assert_eq!(step_zoom(1.9, ZoomDirection::In, ZOOM_STEP, bounds), 2.0);
        assert_eq!(step_zoom(0.55, ZoomDirection::Out, ZOOM_STEP, bounds), 0.5);
        assert_eq!(reset_zoom(bounds), 0.5);
        assert_eq!(clamp_zoom(5.0, bounds), 2.0);
    }

    #[test]
    fn test_pan_scroll_clamped() {
        let viewport = Size::new(800.0, 600.0);
        let content = Size::new(1600.0, 1200.0);

        let s = pan_scroll(Point::new(100.0, 100.0), Point::new(50.0, -30.0), content, viewport);
        assert_eq!(s, Point::new(50.0, 130.0));

        let s = pan_scroll(Point::new(10.0, 10.0), Point::new(100.0, 100.0), content, viewport);
        assert_eq!(s, Point::origin());

        let s = pan_scroll(Point::origin(), Point::new(-5000.0, -5000.0), content, viewport);
        assert_eq!(s, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_pan_scroll_content_smaller_than_viewport() {
        let s = pan_scroll(
            Point::origin(),
            Point::new(-20.0, -20.0),
            Size::new(100.0, 100.0),
            Size::new(800.0, 600.0),
        );
        assert_eq!(s, Point::origin());
    }

    #[test]
    fn test_viewport_fit_and_step() {
        let mut viewport = Viewport::default();
        viewport.set_size(Size::new(800.0, 600.0)).unwrap();
        assert_eq!(viewport.zoom, DEFAULT_ZOOM);

        viewport.set_content(Some(Size::new(1600.0, 1200.0))).unwrap();
        assert!(approx_eq(viewport.zoom, 0.5));

        viewport.zoom_in();
        assert!(approx_eq(viewport.zoom, 0.6));
        let screen = viewport.to_screen(Point::new(200.0, 200.0));
        assert!(approx_eq(screen.x, 120.0));
        assert!(approx_eq(screen.y, 120.0));

        viewport.reset();
        assert!(approx_eq(viewport.zoom, 0.5));
    }

    #[test]
    fn test_viewport_scroll_clamped_after_zoom_out() {
        let mut viewport = Viewport::default();
        viewport.set_size(Size::new(800.0, 600.0)).unwrap();
        viewport.set_content(Some(Size::new(1600.0, 1200.0))).unwrap();

        viewport.zoom_in();
        viewport.zoom_in();
        viewport.pan_by(Point::new(-10_000.0, -10_000.0));
        assert!(viewport.scroll.x > 0.0);

        viewport.reset();
        // Fitted content has no room to scroll
        assert_eq!(viewport.scroll, Point::origin());
    }
}
