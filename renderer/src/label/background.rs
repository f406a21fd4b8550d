//! Rounded-rectangle background geometry for labels.

use std::f64::consts::{FRAC_PI_2, PI};

use vantage_geometry::{Point, Rect, Vector};

/// Triangulates a rounded rectangle as a fan around the rectangle's center.
///
/// The corner radius is clamped to the rectangle's half extents; a radius of
/// zero or no corner segments degenerates to a plain quad. Returns triangle
/// vertices, three per triangle.
pub(crate) fn rounded_rect(rect: Rect, corner_radius: f64, segments: u32) -> Vec<Point> {
    if rect.is_empty() {
        return Vec::new();
    }

    let size = rect.size();
    let radius = corner_radius
        .min(size.width / 2.0)
        .min(size.height / 2.0)
        .max(0.0);

    let outline = if radius <= 0.0 || segments == 0 {
        rect.to_quad().to_vec()
    } else {
        // Corner arc centers and start angles, clockwise from the top-left.
        // Screen coordinates are y-down, so angles run clockwise as well.
        let corners = [
            (Point::new(rect.left + radius, rect.top + radius), PI),
            (
                Point::new(rect.right - radius, rect.top + radius),
                PI + FRAC_PI_2,
            ),
            (Point::new(rect.right - radius, rect.bottom - radius), 0.0),
            (
                Point::new(rect.left + radius, rect.bottom - radius),
                FRAC_PI_2,
            ),
        ];
        let step = FRAC_PI_2 / segments as f64;
        let mut outline = Vec::with_capacity(corners.len() * (segments as usize + 1));
        for (center, start) in corners {
            for i in 0..=segments {
                let angle = start + i as f64 * step;
                outline.push(center + Vector::new(angle.cos(), angle.sin()) * radius);
            }
        }
        outline
    };

    let center = rect.center();
    let mut triangles = Vec::with_capacity(outline.len() * 3);
    for i in 0..outline.len() {
        triangles.push(center);
        triangles.push(outline[i]);
        triangles.push(outline[(i + 1) % outline.len()]);
    }
    triangles
}

#[cfg(test)]
mod tests {
    use vantage_geometry::Contains;

    use super::*;

    #[test]
    fn empty_rect_produces_nothing() {
        assert!(rounded_rect(Rect::ZERO, 3.0, 3).is_empty());
    }

    #[test]
    fn zero_radius_degenerates_to_a_quad_fan() {
        let vertices = rounded_rect(Rect::from((0.0, 0.0, 10.0, 10.0)), 0.0, 3);
        // Four outline points, one fan triangle each.
        assert_eq!(vertices.len(), 12);
    }

    #[test]
    fn rounded_outline_has_one_arc_per_corner() {
        let segments = 3;
        let vertices = rounded_rect(Rect::from((0.0, 0.0, 20.0, 10.0)), 3.0, segments);
        let outline_points = 4 * (segments as usize + 1);
        assert_eq!(vertices.len(), outline_points * 3);
    }

    #[test]
    fn all_vertices_stay_within_the_rect() {
        let rect = Rect::from((5.0, 5.0, 45.0, 25.0));
        // An oversized radius clamps to the half extents.
        for point in rounded_rect(rect, 100.0, 4) {
            let slack = rect.with_outset(Vector::new(1e-9, 1e-9));
            assert!(slack.contains(&point), "{point:?} outside {rect:?}");
        }
    }
}
