use vantage_geometry::{Camera, Point, Size, Vector, Vector3};

use super::TextAlignment;

/// Where a label is attached.
///
/// The anchor supplies a world-space base position that the depth and
/// distance culling tests run against, and a screen-space offset that places
/// the label's top-left corner relative to the projected base.
pub trait LabelAnchor {
    fn base_position(&self, camera: &Camera) -> Vector3;
    fn offset(&self, camera: &Camera, size: Size) -> Vector;
    fn text_alignment(&self) -> TextAlignment {
        TextAlignment::Left
    }
}

/// Placement of a label relative to its projected anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Centered on the anchor point.
    #[default]
    Center,
    Above,
    Below,
    Left,
    Right,
}

/// A label attached to a world-space position.
#[derive(Debug, Clone, Copy)]
pub struct WorldAnchor {
    position: Vector3,
    placement: Placement,
    screen_offset: Vector,
}

impl WorldAnchor {
    pub fn new(position: Vector3) -> Self {
        Self {
            position,
            placement: Placement::default(),
            screen_offset: Vector::default(),
        }
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Additional screen-space displacement applied after placement.
    #[must_use]
    pub fn with_screen_offset(mut self, offset: Vector) -> Self {
        self.screen_offset = offset;
        self
    }
}

impl LabelAnchor for WorldAnchor {
    fn base_position(&self, _camera: &Camera) -> Vector3 {
        self.position
    }

    fn offset(&self, _camera: &Camera, size: Size) -> Vector {
        let centered = Vector::new(-size.width / 2.0, -size.height / 2.0);
        let placed = match self.placement {
            Placement::Center => centered,
            Placement::Above => Vector::new(centered.x, -size.height),
            Placement::Below => Vector::new(centered.x, 0.0),
            Placement::Left => Vector::new(-size.width, centered.y),
            Placement::Right => Vector::new(0.0, centered.y),
        };
        placed + self.screen_offset
    }

    fn text_alignment(&self) -> TextAlignment {
        TextAlignment::Center
    }
}

/// The viewport corner a [`ViewportAnchor`] pins to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A label pinned to a viewport corner.
///
/// The base position sits in front of the camera at a fixed distance so the
/// depth culling tests pass; the offset then drags the projected point into
/// the requested corner.
#[derive(Debug, Clone, Copy)]
pub struct ViewportAnchor {
    corner: ViewportCorner,
    inset: Vector,
    distance: f64,
}

impl ViewportAnchor {
    pub fn new(corner: ViewportCorner, inset: Vector) -> Self {
        Self {
            corner,
            inset,
            distance: 10.0,
        }
    }

    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    fn corner_target(&self, camera: &Camera, size: Size) -> Point {
        let viewport = camera.viewport();
        match self.corner {
            ViewportCorner::TopLeft => {
                Point::new(viewport.left + self.inset.x, viewport.top + self.inset.y)
            }
            ViewportCorner::TopRight => Point::new(
                viewport.right - self.inset.x - size.width,
                viewport.top + self.inset.y,
            ),
            ViewportCorner::BottomLeft => Point::new(
                viewport.left + self.inset.x,
                viewport.bottom - self.inset.y - size.height,
            ),
            ViewportCorner::BottomRight => Point::new(
                viewport.right - self.inset.x - size.width,
                viewport.bottom - self.inset.y - size.height,
            ),
        }
    }
}

impl LabelAnchor for ViewportAnchor {
    fn base_position(&self, camera: &Camera) -> Vector3 {
        camera.eye() + camera.direction() * self.distance
    }

    fn offset(&self, camera: &Camera, size: Size) -> Vector {
        let base = camera
            .project_to_viewport(self.base_position(camera))
            .unwrap_or_else(|| camera.viewport().center());
        self.corner_target(camera, size) - base
    }
}
