//! Pure geometry for each drawing operation.
//!
//! Rectangles are given by their top-left corner in a y-down pixel space.
//! Quad corners are returned in the order the batch engine expects:
//! bottom-left, bottom-right, top-right, top-left.

use lyon::math::Transform;

use crate::types::{point, vector, Angle, Point, Size};

/// Corners of the axis-aligned rectangle at `origin` (top-left) with `size`.
#[must_use]
pub fn rect_corners(origin: Point, size: Size) -> [Point; 4] {
    let Point { x, y, .. } = origin;
    [
        point(x, y + size.height),
        point(x + size.width, y + size.height),
        point(x + size.width, y),
        point(x, y),
    ]
}

/// Corners of the rectangle at `origin` with `size`, rotated by `rotation`
/// about its own center. Positive angles turn clockwise on screen.
#[must_use]
pub fn rotated_rect_corners(origin: Point, size: Size, rotation: Angle) -> [Point; 4] {
    let center = origin + vector(size.width, size.height) / 2.0;
    let transform = Transform::translation(-center.x, -center.y)
        .then_rotate(rotation)
        .then_translate(center.to_vector());
    rect_corners(origin, size).map(|corner| transform.transform_point(corner))
}

/// Corners of a segment from `from` to `to` widened to `thickness`, centered
/// on the segment. A zero-length segment collapses to a degenerate quad.
#[must_use]
pub fn line_corners(from: Point, to: Point, thickness: f32) -> [Point; 4] {
    let direction = to - from;
    let length = direction.length();
    if length <= f32::EPSILON {
        return [from; 4];
    }
    let normal = vector(-direction.y, direction.x) * (thickness / 2.0 / length);
    [from + normal, to + normal, to - normal, from - normal]
}

/// Corners of a square point of side `size` centered on `at`.
#[must_use]
pub fn point_corners(at: Point, size: f32) -> [Point; 4] {
    let half = size / 2.0;
    rect_corners(point(at.x - half, at.y - half), Size::new(size, size))
}

/// Corners of the box bounding an ellipse with the given center and radii.
#[must_use]
pub fn ellipse_corners(center: Point, radii: Size) -> [Point; 4] {
    rect_corners(
        point(center.x - radii.width, center.y - radii.height),
        radii * 2.0,
    )
}

/// Triangle fan of a regular polygon with `sides` vertices on a circle of
/// `radius`, the first vertex at angle `rotation` from the +x axis.
///
/// Fewer than three sides yields no triangles.
#[must_use]
pub fn ngon_fan(center: Point, radius: f32, sides: u32, rotation: Angle) -> Vec<[Point; 3]> {
    if sides < 3 {
        return Vec::new();
    }

    // A polygon with 2^24+ sides is not drawable anyway.
    #[expect(clippy::cast_precision_loss)]
    let step = std::f32::consts::TAU / sides as f32;
    let rim: Vec<Point> = (0..sides)
        .map(|i| {
            #[expect(clippy::cast_precision_loss)]
            let angle = rotation.radians + step * i as f32;
            center + vector(angle.cos(), angle.sin()) * radius
        })
        .collect();

    (0..rim.len())
        .map(|i| [center, rim[i], rim[(i + 1) % rim.len()]])
        .collect()
}

/// Triangle fan over a convex polygon, anchored at its first point.
///
/// Fewer than three points yields no triangles.
#[must_use]
pub fn convex_fan(points: &[Point]) -> Vec<[Point; 3]> {
    match points {
        [anchor, rest @ ..] if rest.len() >= 2 => rest
            .windows(2)
            .map(|pair| [*anchor, pair[0], pair[1]])
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert!(
            (actual - expected).length() < 1e-4,
            "expected {expected:?}, got {actual:?}",
        );
    }

    fn assert_corners_eq(actual: [Point; 4], expected: [Point; 4]) {
        for (a, e) in actual.into_iter().zip(expected) {
            assert_point_eq(a, e);
        }
    }

    #[test]
    fn rect_corners_start_bottom_left() {
        assert_corners_eq(
            rect_corners(point(10.0, 20.0), Size::new(4.0, 2.0)),
            [
                point(10.0, 22.0),
                point(14.0, 22.0),
                point(14.0, 20.0),
                point(10.0, 20.0),
            ],
        );
    }

    #[test]
    fn zero_rotation_matches_plain_rect() {
        let origin = point(3.0, 5.0);
        let size = Size::new(8.0, 6.0);
        assert_corners_eq(
            rotated_rect_corners(origin, size, Angle::zero()),
            rect_corners(origin, size),
        );
    }

    #[test]
    fn quarter_turn_rotates_about_center() {
        // 4x2 rect centered on (2, 1) becomes a 2x4 rect centered on (2, 1).
        let corners =
            rotated_rect_corners(point(0.0, 0.0), Size::new(4.0, 2.0), Angle::frac_pi_2());
        assert_corners_eq(
            corners,
            [
                point(1.0, -1.0),
                point(1.0, 3.0),
                point(3.0, 3.0),
                point(3.0, -1.0),
            ],
        );
    }

    #[test]
    fn horizontal_line_is_offset_vertically() {
        assert_corners_eq(
            line_corners(point(0.0, 0.0), point(10.0, 0.0), 2.0),
            [
                point(0.0, 1.0),
                point(10.0, 1.0),
                point(10.0, -1.0),
                point(0.0, -1.0),
            ],
        );
    }

    #[test]
    fn zero_length_line_is_degenerate_not_nan() {
        let corners = line_corners(point(4.0, 4.0), point(4.0, 4.0), 3.0);
        assert!(corners.iter().all(|p| p.x == 4.0 && p.y == 4.0));
    }

    #[test]
    fn point_is_centered_square() {
        assert_corners_eq(
            point_corners(point(5.0, 5.0), 2.0),
            rect_corners(point(4.0, 4.0), Size::new(2.0, 2.0)),
        );
    }

    #[test]
    fn ellipse_box_spans_twice_the_radii() {
        assert_corners_eq(
            ellipse_corners(point(10.0, 10.0), Size::new(3.0, 1.0)),
            rect_corners(point(7.0, 9.0), Size::new(6.0, 2.0)),
        );
    }

    #[test]
    fn ngon_fan_has_one_triangle_per_side() {
        let fan = ngon_fan(point(0.0, 0.0), 1.0, 6, Angle::zero());
        assert_eq!(fan.len(), 6);
        assert_point_eq(fan[0][1], point(1.0, 0.0));
        // Closes back onto the first rim vertex.
        assert_point_eq(fan[5][2], fan[0][1]);
        assert!(fan.iter().all(|tri| tri[0] == point(0.0, 0.0)));
    }

    #[test]
    fn ngon_fan_rejects_fewer_than_three_sides() {
        assert!(ngon_fan(point(0.0, 0.0), 1.0, 2, Angle::zero()).is_empty());
    }

    #[test]
    fn convex_fan_anchors_on_first_point() {
        let square = [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(1.0, 1.0),
            point(0.0, 1.0),
        ];
        let fan = convex_fan(&square);
        assert_eq!(
            fan,
            vec![
                [square[0], square[1], square[2]],
                [square[0], square[2], square[3]],
            ]
        );
        assert!(convex_fan(&square[..2]).is_empty());
    }
}
