use std::f64::consts::TAU;

use crate::math::Point3;

use super::Polyline;

/// Samples `f` at `segments + 1` evenly spaced parameters over `[t0, t1]`.
///
/// A closed curve drops the final sample, which repeats the first.
pub fn parametric<F>(f: F, t0: f64, t1: f64, segments: usize, closed: bool) -> Polyline
where
    F: Fn(f64) -> Point3,
{
    let segments = segments.max(1);
    let count = if closed { segments } else { segments + 1 };
    let points = (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = t0 + (t1 - t0) * i as f64 / segments as f64;
            f(t)
        })
        .collect();
    Polyline { points, closed }
}

/// Circle of `radius` about the z axis at height `z`.
#[must_use]
pub fn circle(radius: f64, z: f64, segments: usize) -> Polyline {
    ellipse(radius, radius, z, segments)
}

/// Ellipse with semi-axes `a` (x) and `b` (y) at height `z`.
#[must_use]
pub fn ellipse(a: f64, b: f64, z: f64, segments: usize) -> Polyline {
    parametric(
        |t| Point3::new(a * t.cos(), b * t.sin(), z),
        0.0,
        TAU,
        segments,
        true,
    )
}

/// Straight segment.
#[must_use]
pub fn segment(from: Point3, to: Point3) -> Polyline {
    Polyline::open(vec![from, to])
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn circle_is_closed_and_on_radius() {
        let c = circle(2.0, 1.0, 24);
        assert!(c.closed);
        assert_eq!(c.len(), 24);
        for p in &c.points {
            assert_relative_eq!((p.x * p.x + p.y * p.y).sqrt(), 2.0, epsilon = 1e-12);
            assert_relative_eq!(p.z, 1.0);
        }
        assert!(c.length() < 4.0 * PI);
        assert_relative_eq!(c.length(), 4.0 * PI, max_relative = 1e-2);
    }

    #[test]
    fn open_parametric_hits_both_ends() {
        let line = parametric(|t| Point3::new(t, 0.0, 0.0), 0.0, 1.0, 4, false);
        assert_eq!(line.len(), 5);
        assert_relative_eq!(line.points[4].x, 1.0);
    }
}
