use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{self, Annulus, FaceInfo, FaceSurface};
use crate::math::roots::solve_quadratic;
use crate::math::{Point3, Vector3};
use crate::placement::{Axis, Placement};
use crate::tessellation::{circle, segment, Polyline, WireOptions};

use super::primitive::{
    annulus_distance, impl_solid_for_primitive, non_negative, positive, radial, rho, z_plane_hit, Primitive,
};
use super::MeasureOptions;

/// A thick-walled cylinder about the z axis, centred on the origin.
///
/// With `inner_r == 0` the tube is a plain cylinder without an inner face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tube {
    inner_r: f64,
    outer_r: f64,
    z: f64,
}

impl Tube {
    pub const FACE_OUTER_SIDE: u32 = 0x1;
    pub const FACE_BOTTOM: u32 = 0x2;
    pub const FACE_TOP: u32 = 0x4;
    pub const FACE_INNER_SIDE: u32 = 0x8;

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] for a negative inner radius,
    /// a non-positive height or `outer_r <= inner_r`.
    pub fn new(inner_r: f64, outer_r: f64, z: f64) -> std::result::Result<Self, ShapeError> {
        let inner_r = non_negative("tube", "inner_r", inner_r)?;
        let outer_r = positive("tube", "outer_r", outer_r)?;
        if outer_r <= inner_r {
            return Err(ShapeError::InvalidParameter {
                shape: "tube",
                parameter: "outer_r",
                value: outer_r,
            });
        }
        Ok(Self {
            inner_r,
            outer_r,
            z: positive("tube", "z", z)?,
        })
    }

    #[must_use]
    pub fn inner_r(&self) -> f64 {
        self.inner_r
    }

    #[must_use]
    pub fn outer_r(&self) -> f64 {
        self.outer_r
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    #[must_use]
    pub fn has_inner_face(&self) -> bool {
        self.inner_r > 0.0
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn set_radii(&mut self, inner_r: f64, outer_r: f64) -> std::result::Result<(), ShapeError> {
        let checked = Self::new(inner_r, outer_r, 1.0)?;
        self.inner_r = checked.inner_r;
        self.outer_r = checked.outer_r;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `z` is positive.
    pub fn set_z(&mut self, z: f64) -> std::result::Result<(), ShapeError> {
        self.z = positive("tube", "z", z)?;
        Ok(())
    }

    /// Reads `inner_r` (default 0), `outer_r` and `z`.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        *self = Self::new(
            properties.length_opt("inner_r")?.unwrap_or(0.0),
            properties.length("outer_r")?,
            properties.length("z")?,
        )?;
        Ok(())
    }

    fn half_z(&self) -> f64 {
        0.5 * self.z
    }
}

impl Primitive for Tube {
    const NAME: &'static str = "tube";

    fn is_configured(&self) -> bool {
        self.outer_r > self.inner_r && self.inner_r >= 0.0 && self.z > 0.0
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        let mut bits = vec![Self::FACE_OUTER_SIDE, Self::FACE_BOTTOM, Self::FACE_TOP];
        if self.has_inner_face() {
            bits.push(Self::FACE_INNER_SIDE);
        }
        bits
    }

    fn depth(&self, p: &Point3) -> f64 {
        let r = rho(p);
        let radial_depth = if self.has_inner_face() {
            (self.outer_r - r).min(r - self.inner_r)
        } else {
            self.outer_r - r
        };
        radial_depth.min(self.half_z() - p.z.abs())
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let h = self.half_z();
        let axial = (p.z.abs() - h).max(0.0);
        match bit {
            Self::FACE_OUTER_SIDE => (rho(p) - self.outer_r).hypot(axial),
            Self::FACE_INNER_SIDE => (rho(p) - self.inner_r).hypot(axial),
            Self::FACE_BOTTOM => annulus_distance(rho(p), p.z, -h, self.inner_r, self.outer_r),
            _ => annulus_distance(rho(p), p.z, h, self.inner_r, self.outer_r),
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        match bit {
            Self::FACE_OUTER_SIDE => radial(p),
            Self::FACE_INNER_SIDE => -radial(p),
            Self::FACE_BOTTOM => -Vector3::z(),
            _ => Vector3::z(),
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let h = self.half_z();
        let tol = 1e-9 * self.outer_r.max(h);
        let a = dir.x * dir.x + dir.y * dir.y;
        let b = 2.0 * (from.x * dir.x + from.y * dir.y);
        let c0 = from.x * from.x + from.y * from.y;

        let mut sides = vec![(self.outer_r, Self::FACE_OUTER_SIDE)];
        if self.has_inner_face() {
            sides.push((self.inner_r, Self::FACE_INNER_SIDE));
        }
        let mut hits = Vec::new();
        for (radius, bit) in sides {
            hits.extend(
                solve_quadratic(a, b, c0 - radius * radius)
                    .into_iter()
                    .filter(|t| (from.z + dir.z * t).abs() <= h + tol)
                    .map(|t| (t, bit)),
            );
        }
        for (z0, bit) in [(-h, Self::FACE_BOTTOM), (h, Self::FACE_TOP)] {
            if let Some(t) = z_plane_hit(from, dir, z0) {
                let r = rho(&(from + dir * t));
                if r <= self.outer_r + tol && r >= self.inner_r - tol {
                    hits.push((t, bit));
                }
            }
        }
        hits
    }

    fn enclosed_volume(&self) -> f64 {
        PI * (self.outer_r * self.outer_r - self.inner_r * self.inner_r) * self.z
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        Ok(match bit {
            Self::FACE_OUTER_SIDE => TAU * self.outer_r * self.z,
            Self::FACE_INNER_SIDE => TAU * self.inner_r * self.z,
            _ => PI * (self.outer_r * self.outer_r - self.inner_r * self.inner_r),
        })
    }

    fn aabb(&self) -> Aabb {
        Aabb::centered(Vector3::new(self.outer_r, self.outer_r, self.half_z()))
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let h = self.half_z();
        let cap = FaceSurface::Annulus(Annulus::new(self.inner_r, self.outer_r));
        let mut faces = vec![
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_OUTER_SIDE),
                Placement::identity(),
                FaceSurface::Cylinder(surface::Cylinder::new(self.outer_r, h)),
            ),
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_BOTTOM),
                Placement::from_axis_angle(Vector3::new(0.0, 0.0, -h), Axis::X, PI),
                cap.clone(),
            ),
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_TOP),
                Placement::from_translation(Vector3::new(0.0, 0.0, h)),
                cap,
            ),
        ];
        if self.has_inner_face() {
            faces.push(
                FaceInfo::new(
                    FaceIdentifier::from_bits(Self::FACE_INNER_SIDE),
                    Placement::identity(),
                    FaceSurface::Cylinder(surface::Cylinder::new(self.inner_r, h)),
                )
                .flipped(),
            );
        }
        faces
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let h = self.half_z();
        let segments = options.sampling.segments();
        let mut radii = vec![self.outer_r];
        if self.has_inner_face() {
            radii.push(self.inner_r);
        }
        let mut out = Vec::new();
        for &r in &radii {
            out.push(circle(r, -h, segments));
            out.push(circle(r, h, segments));
        }
        let lines = options.sampling.rings();
        for i in 0..lines {
            #[allow(clippy::cast_precision_loss)]
            let a = TAU * i as f64 / lines as f64;
            for &r in &radii {
                let (x, y) = (r * a.cos(), r * a.sin());
                out.push(segment(Point3::new(x, y, -h), Point3::new(x, y, h)));
            }
        }
        out
    }
}

impl_solid_for_primitive!(Tube);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::shapes::{Solid, WireRenderable};

    fn pipe() -> Tube {
        Tube::new(1.0, 2.0, 4.0).unwrap()
    }

    #[test]
    fn rejects_inverted_radii() {
        assert!(Tube::new(2.0, 1.0, 1.0).is_err());
        assert!(Tube::new(1.0, 1.0, 1.0).is_err());
        assert!(Tube::new(-0.5, 1.0, 1.0).is_err());
        assert!(Tube::new(0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn the_bore_is_outside() {
        let t = pipe();
        assert!(t.is_outside(&Point3::origin(), 1e-6).unwrap());
        assert!(t.is_inside(&Point3::new(1.5, 0.0, 0.0), 1e-6).unwrap());
        assert_eq!(
            t.on_surface(&Point3::new(0.0, 1.0, 0.5), &FaceIdentifier::any(), 1e-6).unwrap().bits(),
            Tube::FACE_INNER_SIDE
        );
        let n = t
            .normal_on_surface(&Point3::new(0.0, 1.0, 0.5), &FaceIdentifier::from_bits(Tube::FACE_INNER_SIDE))
            .unwrap();
        assert_relative_eq!(n, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn ray_across_the_wall_twice() {
        let hits = pipe().intercepts(&Point3::new(-3.0, 0.0, 0.0), &Vector3::x(), 1e-6).unwrap();
        let d: Vec<f64> = hits.iter().map(|h| h.distance).collect();
        assert_eq!(d.len(), 4);
        for (got, want) in d.iter().zip([1.0, 2.0, 4.0, 5.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_eq!(hits[1].face.bits(), Tube::FACE_INNER_SIDE);
    }

    #[test]
    fn axial_ray_through_the_bore_misses() {
        assert!(pipe()
            .find_intercept(&Point3::new(0.0, 0.0, -5.0), &Vector3::z(), 1e-6)
            .unwrap()
            .is_none());
    }

    #[test]
    fn solid_tube_has_no_inner_face() {
        let t = Tube::new(0.0, 1.0, 2.0).unwrap();
        assert_eq!(t.face_bits().len(), 3);
        let mut faces = Vec::new();
        assert_eq!(t.compute_faces(&mut faces).unwrap(), 3);
        assert!(t.is_inside(&Point3::origin(), 0.0).unwrap());
        assert!(t
            .normal_on_surface(&Point3::origin(), &FaceIdentifier::from_bits(Tube::FACE_INNER_SIDE))
            .is_err());
    }

    #[test]
    fn measures() {
        let t = pipe();
        assert_relative_eq!(t.volume().unwrap(), 12.0 * PI);
        let caps = t
            .surface(&FaceIdentifier::from_bits(Tube::FACE_TOP | Tube::FACE_BOTTOM))
            .unwrap();
        assert_relative_eq!(caps, 6.0 * PI);
        assert_relative_eq!(t.surface(&FaceIdentifier::any()).unwrap(), 6.0 * PI + 16.0 * PI + 8.0 * PI);
    }

    #[test]
    fn inner_patch_faces_the_axis() {
        let mut faces = Vec::new();
        pipe().compute_faces(&mut faces).unwrap();
        let inner = faces.iter().find(|f| f.id.bits() == Tube::FACE_INNER_SIDE).unwrap();
        assert_relative_eq!(inner.outward_normal(0.0, 0.0).unwrap(), -Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn wires_for_both_walls() {
        let mut out = Vec::new();
        pipe().generate_wires_self(&mut out, &WireOptions::default()).unwrap();
        assert_eq!(out.len(), 4 + 2 * 4);
    }

    #[test]
    fn configure_defaults_inner_radius() {
        let mut props = Properties::new();
        props.set_real("outer_r", 3.0).set_real("z", 1.0);
        let mut t = Tube::default();
        t.configure(&props).unwrap();
        assert!(!t.has_inner_face());
        props.set_real("inner_r", 4.0);
        assert!(t.configure(&props).is_err());
    }
}
