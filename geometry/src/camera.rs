use crate::{Matrix4, PerspectiveDivide, Point, Rect, Vector3, Vector4};

/// The kind of projection a camera applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective,
    /// Orthographic 2D view; `zoom` 1.0 means one world unit per pixel.
    Orthographic { zoom: f64 },
}

/// The camera input the renderer consumes: an opaque view-projection matrix,
/// the viewport it maps to, and a few derived queries.
///
/// Viewport coordinates are pixels with the origin at the top-left corner and
/// y growing downwards.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    eye: Vector3,
    direction: Vector3,
    view_projection: Matrix4,
    viewport: Rect,
    projection: Projection,
}

impl Camera {
    pub const DEFAULT_FOVY_DEGREES: f64 = 45.0;
    const NEAR: f64 = 1.0;
    const FAR: f64 = 65536.0;

    pub fn perspective(
        eye: Vector3,
        direction: Vector3,
        up: Vector3,
        fovy_degrees: f64,
        viewport: Rect,
    ) -> Self {
        debug_assert!(!viewport.is_empty(), "viewport must not be empty");
        let size = viewport.size();
        let direction = direction.normalize();
        let projection = Matrix4::perspective_rh(
            fovy_degrees.to_radians(),
            size.width / size.height,
            Self::NEAR,
            Self::FAR,
        );
        let view = Matrix4::look_at_rh(eye, eye + direction, up);
        Self {
            eye,
            direction,
            view_projection: projection * view,
            viewport,
            projection: Projection::Perspective,
        }
    }

    pub fn orthographic(
        eye: Vector3,
        direction: Vector3,
        up: Vector3,
        zoom: f64,
        viewport: Rect,
    ) -> Self {
        debug_assert!(!viewport.is_empty(), "viewport must not be empty");
        debug_assert!(zoom > 0.0, "zoom must be positive");
        let size = viewport.size();
        let direction = direction.normalize();
        let (half_width, half_height) = (
            size.width / (2.0 * zoom),
            size.height / (2.0 * zoom),
        );
        let projection = Matrix4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            Self::NEAR,
            Self::FAR,
        );
        let view = Matrix4::look_at_rh(eye, eye + direction, up);
        Self {
            eye,
            direction,
            view_projection: projection * view,
            viewport,
            projection: Projection::Orthographic { zoom },
        }
    }

    pub fn eye(&self) -> Vector3 {
        self.eye
    }

    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn view_projection(&self) -> Matrix4 {
        self.view_projection
    }

    pub fn zoom(&self) -> f64 {
        match self.projection {
            Projection::Perspective => 1.0,
            Projection::Orthographic { zoom } => zoom,
        }
    }

    /// Signed distance of a world position along the view direction.
    ///
    /// Zero or negative means the position is coincident with or behind the
    /// camera plane.
    pub fn perpendicular_distance(&self, position: Vector3) -> f64 {
        (position - self.eye).dot(self.direction)
    }

    /// Projects a world position to viewport pixel coordinates.
    ///
    /// Returns None for positions that project to a degenerate homogeneous w.
    pub fn project_to_viewport(&self, position: Vector3) -> Option<Point> {
        let clip = self.view_projection * Vector4::new(position.x, position.y, position.z, 1.0);
        let ndc = clip.perspective_divide()?;
        let size = self.viewport.size();
        Some(Point::new(
            self.viewport.left + (ndc.x + 1.0) * 0.5 * size.width,
            self.viewport.top + (1.0 - ndc.y) * 0.5 * size.height,
        ))
    }

    /// A fixed pixel-space orthographic transform covering the viewport,
    /// used to render screen-space overlays independent of the 3D camera.
    pub fn viewport_matrix(&self) -> Matrix4 {
        Matrix4::orthographic_rh(
            self.viewport.left,
            self.viewport.right,
            self.viewport.bottom,
            self.viewport.top,
            -1.0,
            1.0,
        )
    }
}
