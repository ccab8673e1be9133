//! Geometric predicates in UV space.
//!
//! Pure functions with no allocation. All inputs are expected to be finite;
//! tolerances guard the divisions so degenerate triangles and segments never
//! produce NaN.

use nalgebra::Point2;

/// Default degeneracy tolerance.
///
/// For the barycentric test this bounds the squared sine of the triangle's
/// angle at `a`, so it does not depend on triangle size. Partitioning reuses
/// it as a UV edge length.
pub const DEFAULT_DEGENERACY_TOLERANCE: f64 = 1e-6;

/// Barycentric coordinates `(u, v)` of `p` relative to triangle `abc`.
///
/// `u` weights the `c - a` edge and `v` weights the `b - a` edge, so
/// `p = a + u * (c - a) + v * (b - a)`. Returns `None` when the triangle is
/// degenerate, i.e. `|dot00 * dot11 - dot01 * dot01| <= tolerance * dot00 * dot11`.
/// The denominator is `(2 * area)^2`, so it is compared against the edge
/// lengths rather than an absolute threshold.
pub fn barycentric(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tolerance: f64,
) -> Option<(f64, f64)> {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() <= tolerance * dot00 * dot11 {
        return None;
    }

    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;
    Some((u, v))
}

/// Inclusive point-in-triangle test using the default degeneracy tolerance.
///
/// # Example
/// ```
/// use nalgebra::Point2;
/// use uv_mask::geometry::is_point_in_triangle;
///
/// let a = Point2::new(0.0, 0.0);
/// let b = Point2::new(1.0, 0.0);
/// let c = Point2::new(0.0, 1.0);
/// assert!(is_point_in_triangle(&Point2::new(0.5, 0.5), &a, &b, &c)); // on the hypotenuse
/// assert!(!is_point_in_triangle(&Point2::new(0.5, 0.51), &a, &b, &c));
/// assert!(is_point_in_triangle(&a, &a, &b, &c));
/// ```
#[inline]
pub fn is_point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> bool {
    is_point_in_triangle_with_tolerance(p, a, b, c, DEFAULT_DEGENERACY_TOLERANCE)
}

/// Inclusive point-in-triangle test. Degenerate triangles contain nothing.
pub fn is_point_in_triangle_with_tolerance(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tolerance: f64,
) -> bool {
    match barycentric(p, a, b, c, tolerance) {
        Some((u, v)) => u >= 0.0 && v >= 0.0 && u + v <= 1.0,
        None => false,
    }
}

/// Distance from `p` to the closed segment `start..end`.
///
/// A zero-length segment degrades to the distance to `start`.
pub fn distance_point_to_segment(p: &Point2<f64>, start: &Point2<f64>, end: &Point2<f64>) -> f64 {
    let seg = end - start;
    let len_sq = seg.norm_squared();
    if len_sq <= f64::EPSILON * f64::EPSILON {
        return (p - start).norm();
    }
    let t = ((p - start).dot(&seg) / len_sq).clamp(0.0, 1.0);
    let projection = start + seg * t;
    (p - projection).norm()
}

/// Signed area of triangle `abc` (positive for counter-clockwise winding).
#[inline]
pub fn signed_triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    0.5 * (ab.x * ac.y - ab.y * ac.x)
}

/// Unsigned area of triangle `abc`.
#[inline]
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    signed_triangle_area(a, b, c).abs()
}

/// Centroid of triangle `abc`.
#[inline]
pub fn triangle_centroid(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Point2<f64> {
    Point2::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Absolute shoelace area of a point list treated as a closed polygon.
///
/// Only meaningful when the points describe a simple polygon in order.
pub fn shoelace_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x * q.y - q.x * p.y;
    }
    (twice_area * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_triangle() -> (Point2<f64>, Point2<f64>, Point2<f64>) {
        (
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        )
    }

    #[test]
    fn test_point_on_hypotenuse_is_inside() {
        let (a, b, c) = right_triangle();
        assert!(is_point_in_triangle(&Point2::new(0.5, 0.5), &a, &b, &c));
    }

    #[test]
    fn test_point_just_outside_hypotenuse() {
        let (a, b, c) = right_triangle();
        assert!(!is_point_in_triangle(&Point2::new(0.5, 0.51), &a, &b, &c));
    }

    #[test]
    fn test_vertices_are_inside() {
        let (a, b, c) = right_triangle();
        for p in [a, b, c] {
            assert!(is_point_in_triangle(&p, &a, &b, &c));
        }
    }

    #[test]
    fn test_winding_does_not_matter() {
        let (a, b, c) = right_triangle();
        let p = Point2::new(0.2, 0.2);
        assert!(is_point_in_triangle(&p, &a, &c, &b));
        assert!(!is_point_in_triangle(&Point2::new(-0.1, 0.2), &a, &c, &b));
    }

    #[test]
    fn test_degenerate_triangle_contains_nothing() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(0.5, 0.5);
        let c = Point2::new(1.0, 1.0);
        assert!(!is_point_in_triangle(&Point2::new(0.5, 0.5), &a, &b, &c));
        assert!(barycentric(&b, &a, &b, &c, DEFAULT_DEGENERACY_TOLERANCE).is_none());
    }

    #[test]
    fn test_tiny_triangles_are_not_degenerate() {
        // One cell of a 4096 x 4096 grid
        let h = 1.0 / 4096.0;
        let a = Point2::new(0.5, 0.5);
        let b = Point2::new(0.5 + h, 0.5);
        let c = Point2::new(0.5, 0.5 + h);
        assert!(is_point_in_triangle(&Point2::new(0.5 + h / 4.0, 0.5 + h / 4.0), &a, &b, &c));
        assert!(!is_point_in_triangle(&Point2::new(0.5 + h, 0.5 + h), &a, &b, &c));
    }

    #[test]
    fn test_sliver_is_degenerate_at_any_scale() {
        for scale in [1e-4, 1.0, 1e4] {
            let a = Point2::new(0.0, 0.0);
            let b = Point2::new(scale, 0.0);
            let c = Point2::new(2.0 * scale, scale * 1e-9);
            assert!(barycentric(&b, &a, &b, &c, DEFAULT_DEGENERACY_TOLERANCE).is_none());
        }
    }

    #[test]
    fn test_distance_to_segment() {
        let s = Point2::new(0.0, 0.0);
        let e = Point2::new(1.0, 0.0);
        assert!((distance_point_to_segment(&Point2::new(0.5, 0.3), &s, &e) - 0.3).abs() < 1e-12);
        // Clamped past the end
        assert!((distance_point_to_segment(&Point2::new(2.0, 0.0), &s, &e) - 1.0).abs() < 1e-12);
        // Degenerate segment
        let d = distance_point_to_segment(&Point2::new(3.0, 4.0), &s, &s);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_areas() {
        let (a, b, c) = right_triangle();
        assert!((signed_triangle_area(&a, &b, &c) - 0.5).abs() < 1e-12);
        assert!((signed_triangle_area(&a, &c, &b) + 0.5).abs() < 1e-12);
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!((shoelace_area(&square) - 1.0).abs() < 1e-12);
        assert_eq!(shoelace_area(&square[..2]), 0.0);
    }
}
