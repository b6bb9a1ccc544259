//! Angular sectors of the solids of revolution.
//!
//! A sector keeps the part of a solid between two half-planes bounded by
//! the z axis (an azimuthal range), or between two coaxial cones (a polar
//! range). The half-planes become the `start`/`stop` faces of the solid.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::math::{azimuth, Point3, Rotation3, Vector3, TOLERANCE};
use crate::placement::Placement;
use crate::tessellation::{parametric, Polyline};

use super::primitive::rho;

/// An angle interval `[start, start + delta]` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularRange {
    start: f64,
    delta: f64,
}

impl Default for AngularRange {
    fn default() -> Self {
        Self::full_turn()
    }
}

impl AngularRange {
    /// The whole azimuth, `[0, 2π]`.
    #[must_use]
    pub const fn full_turn() -> Self {
        Self { start: 0.0, delta: TAU }
    }

    /// The whole polar range, `[0, π]`.
    #[must_use]
    pub const fn half_turn() -> Self {
        Self { start: 0.0, delta: PI }
    }

    /// Validates `0 <= start < max`, `0 < delta` and `start + delta <= max`.
    pub(crate) fn checked(
        shape: &'static str,
        (start_key, delta_key): (&'static str, &'static str),
        max: f64,
        start: f64,
        delta: f64,
    ) -> std::result::Result<Self, ShapeError> {
        if !start.is_finite() || start < 0.0 || start >= max {
            return Err(ShapeError::InvalidParameter {
                shape,
                parameter: start_key,
                value: start,
            });
        }
        if !delta.is_finite() || delta <= 0.0 || start + delta > max + TOLERANCE {
            return Err(ShapeError::InvalidParameter {
                shape,
                parameter: delta_key,
                value: delta,
            });
        }
        Ok(Self {
            start,
            delta: delta.min(max - start),
        })
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[must_use]
    pub fn stop(&self) -> f64 {
        self.start + self.delta
    }

    /// Whether the range spans all of `[0, max]`.
    #[must_use]
    pub fn covers(&self, max: f64) -> bool {
        self.start <= 0.0 && self.delta >= max - TOLERANCE
    }

    /// Whether an azimuthal range cuts the solid.
    #[must_use]
    pub fn is_partial_turn(&self) -> bool {
        !self.covers(TAU)
    }

    /// `steps + 1` angles from start to stop, or `steps` when the range is a
    /// full turn and the last would repeat the first.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn angles(&self, steps: usize) -> Vec<f64> {
        let steps = steps.max(1);
        let count = if self.is_partial_turn() { steps + 1 } else { steps };
        (0..count)
            .map(|i| self.start + self.delta * i as f64 / steps as f64)
            .collect()
    }
}

/// Reads an optional `(start, delta)` pair.
///
/// A missing start defaults to 0 and a missing delta to the rest of
/// `[start, max]`. `None` when neither key is present.
pub(crate) fn read_range(
    properties: &Properties,
    shape: &'static str,
    keys: (&'static str, &'static str),
    max: f64,
) -> Result<Option<AngularRange>> {
    let start = properties.angle_opt(keys.0)?;
    let delta = properties.angle_opt(keys.1)?;
    if start.is_none() && delta.is_none() {
        return Ok(None);
    }
    let start = start.unwrap_or(0.0);
    let delta = delta.unwrap_or(max - start);
    Ok(Some(AngularRange::checked(shape, keys, max, start, delta)?))
}

/// Components of `p` along the half-plane at azimuth `c` and across it.
pub(crate) fn meridian(p: &Point3, c: f64) -> (f64, f64) {
    let (s, k) = c.sin_cos();
    (p.x * k + p.y * s, p.y * k - p.x * s)
}

/// Distance from `p` to the half-plane bounded by the z axis at azimuth `c`.
pub(crate) fn half_plane_distance(p: &Point3, c: f64) -> f64 {
    let (along, across) = meridian(p, c);
    if along >= 0.0 {
        across.abs()
    } else {
        rho(p)
    }
}

/// Signed distance to the azimuthal wedge, positive inside. Unbounded for a
/// full turn.
pub(crate) fn wedge_depth(range: &AngularRange, p: &Point3) -> f64 {
    if !range.is_partial_turn() {
        return f64::INFINITY;
    }
    let phi = azimuth(p.x, p.y);
    let d = half_plane_distance(p, range.start()).min(half_plane_distance(p, range.stop()));
    if phi >= range.start() && phi <= range.stop() {
        d
    } else {
        -d
    }
}

/// Distance outside a region of signed depth `depth`.
pub(crate) fn outside(depth: f64) -> f64 {
    (-depth).max(0.0)
}

/// Distance from `p` to the bounded side face at azimuth `c`, given the
/// signed depth of the solid's cross-section in its `(rho, z)` half-plane.
pub(crate) fn side_face_distance<F>(p: &Point3, c: f64, section: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let (along, _) = meridian(p, c);
    half_plane_distance(p, c).hypot(outside(section(along.max(0.0), p.z)))
}

/// Outward normal of the start (`stop == false`) or stop face at azimuth `c`.
pub(crate) fn side_normal(c: f64, stop: bool) -> Vector3 {
    let (s, k) = c.sin_cos();
    let n = Vector3::new(s, -k, 0.0);
    if stop {
        -n
    } else {
        n
    }
}

/// Ray hits on both side faces whose impact lies in the cross-section.
pub(crate) fn side_hits<F>(
    range: &AngularRange,
    from: &Point3,
    dir: &Vector3,
    bits: (u32, u32),
    tol: f64,
    section: F,
) -> Vec<(f64, u32)>
where
    F: Fn(f64, f64) -> f64,
{
    if !range.is_partial_turn() {
        return Vec::new();
    }
    let mut hits = Vec::new();
    for (c, bit) in [(range.start(), bits.0), (range.stop(), bits.1)] {
        let (s, k) = c.sin_cos();
        let n = Vector3::new(-s, k, 0.0);
        let denom = dir.dot(&n);
        if denom.abs() < TOLERANCE {
            continue;
        }
        let t = -from.coords.dot(&n) / denom;
        let q = from + dir * t;
        let (along, _) = meridian(&q, c);
        if along >= -tol && section(along.max(0.0), q.z) >= -tol {
            hits.push((t, bit));
        }
    }
    hits
}

/// Frame of the half-plane at azimuth `c`: local x radial, local y along z,
/// local z the start face's outward normal. The origin sits `offset` out
/// along the radial direction.
pub(crate) fn meridian_frame(c: f64, offset: f64) -> Placement {
    let (s, k) = c.sin_cos();
    let m = nalgebra::Matrix3::from_columns(&[
        Vector3::new(k, s, 0.0),
        Vector3::z(),
        Vector3::new(s, -k, 0.0),
    ]);
    let mut placement = Placement::identity();
    placement.set(Vector3::new(offset * k, offset * s, 0.0), Rotation3::from_matrix_unchecked(m));
    placement
}

/// Arc of `radius` about the z axis at height `z` over `range`.
pub(crate) fn arc(radius: f64, z: f64, range: &AngularRange, segments: usize) -> Polyline {
    let full = !range.is_partial_turn();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = if full {
        segments
    } else {
        ((segments as f64 * range.delta() / TAU).ceil() as usize).max(1)
    };
    parametric(
        |u| Point3::new(radius * u.cos(), radius * u.sin(), z),
        range.start(),
        range.stop(),
        segments,
        full,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    fn quarter() -> AngularRange {
        AngularRange::checked("test", ("start", "delta"), TAU, 0.0, FRAC_PI_2).unwrap()
    }

    #[test]
    fn range_validation() {
        let keys = ("start_phi", "delta_phi");
        assert!(AngularRange::checked("torus", keys, TAU, -0.1, 1.0).is_err());
        assert!(AngularRange::checked("torus", keys, TAU, TAU, 1.0).is_err());
        assert!(AngularRange::checked("torus", keys, TAU, 1.0, 0.0).is_err());
        assert!(matches!(
            AngularRange::checked("torus", keys, TAU, 4.0, 3.0),
            Err(ShapeError::InvalidParameter { parameter: "delta_phi", .. })
        ));
        assert!(!AngularRange::checked("torus", keys, TAU, 0.0, TAU).unwrap().is_partial_turn());
        assert!(quarter().is_partial_turn());
    }

    #[test]
    fn wedge_depth_signs() {
        let q = quarter();
        assert_relative_eq!(wedge_depth(&q, &Point3::new(2.0, 1.0, 5.0)), 1.0);
        assert_relative_eq!(wedge_depth(&q, &Point3::new(2.0, -0.5, 0.0)), -0.5);
        assert_relative_eq!(wedge_depth(&q, &Point3::new(-3.0, -4.0, 0.0)), -5.0);
        assert!(wedge_depth(&AngularRange::full_turn(), &Point3::origin()).is_infinite());
    }

    #[test]
    fn side_normals_point_out_of_the_wedge() {
        let q = quarter();
        assert_relative_eq!(side_normal(q.start(), false), -Vector3::y(), epsilon = 1e-15);
        assert_relative_eq!(side_normal(q.stop(), true), -Vector3::x(), epsilon = 1e-15);
    }

    #[test]
    fn meridian_frame_maps_local_axes() {
        let frame = meridian_frame(FRAC_PI_2, 2.0);
        let p = frame.child_to_mother(&Point3::new(1.0, 3.0, 0.0)).unwrap();
        assert_relative_eq!(p, Point3::new(0.0, 3.0, 3.0), epsilon = 1e-12);
        let n = frame.child_to_mother_direction(&Vector3::z()).unwrap();
        assert_relative_eq!(n, side_normal(FRAC_PI_2, false), epsilon = 1e-12);
    }

    #[test]
    fn side_hits_respect_the_section() {
        let q = quarter();
        let unit_square = |r: f64, z: f64| (1.0 - r).min(r).min(1.0 - z.abs());
        let hits = side_hits(&q, &Point3::new(0.5, -1.0, 0.0), &Vector3::y(), (1, 2), 1e-9, unit_square);
        assert_eq!(hits, vec![(1.0, 1)]);
        let none = side_hits(&q, &Point3::new(0.5, -1.0, 2.0), &Vector3::y(), (1, 2), 1e-9, unit_square);
        assert!(none.is_empty());
    }

    #[test]
    fn arcs_stay_in_range() {
        let q = quarter();
        let a = arc(2.0, 1.0, &q, 32);
        assert!(!a.closed);
        assert_eq!(a.points.len(), 9);
        assert_relative_eq!(a.points[8], Point3::new(0.0, 2.0, 1.0), epsilon = 1e-12);
        assert!(arc(2.0, 1.0, &AngularRange::full_turn(), 32).closed);
    }

    #[test]
    fn angles_include_both_edges_of_a_partial_range() {
        assert_eq!(quarter().angles(2).len(), 3);
        assert_eq!(AngularRange::full_turn().angles(4).len(), 4);
    }
}
