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

use super::primitive::{annulus_distance, impl_solid_for_primitive, positive, radial, rho, z_plane_hit, Primitive};
use super::MeasureOptions;

/// A right circular cylinder about the z axis, centred on the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    r: f64,
    z: f64,
}

impl Cylinder {
    pub const FACE_SIDE: u32 = 0x1;
    pub const FACE_BOTTOM: u32 = 0x2;
    pub const FACE_TOP: u32 = 0x4;

    const FACES: [u32; 3] = [Self::FACE_SIDE, Self::FACE_BOTTOM, Self::FACE_TOP];

    /// Creates a cylinder of radius `r` and full height `z`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless both are positive.
    pub fn new(r: f64, z: f64) -> std::result::Result<Self, ShapeError> {
        Ok(Self {
            r: positive("cylinder", "r", r)?,
            z: positive("cylinder", "z", z)?,
        })
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `r` is positive.
    pub fn set_r(&mut self, r: f64) -> std::result::Result<(), ShapeError> {
        self.r = positive("cylinder", "r", r)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `d` is positive.
    pub fn set_diameter(&mut self, d: f64) -> std::result::Result<(), ShapeError> {
        self.r = positive("cylinder", "diameter", d)? * 0.5;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `z` is positive.
    pub fn set_z(&mut self, z: f64) -> std::result::Result<(), ShapeError> {
        self.z = positive("cylinder", "z", z)?;
        Ok(())
    }

    #[must_use]
    pub fn r(&self) -> f64 {
        self.r
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        2.0 * self.r
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Reads `r` (or `diameter`) and `z`.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let mut shape = Self::default();
        match properties.length_opt("r")? {
            Some(r) => shape.set_r(r)?,
            None => shape.set_diameter(properties.length("diameter")?)?,
        }
        shape.set_z(properties.length("z")?)?;
        *self = shape;
        Ok(())
    }

    fn half_z(&self) -> f64 {
        0.5 * self.z
    }
}

impl Primitive for Cylinder {
    const NAME: &'static str = "cylinder";

    fn is_configured(&self) -> bool {
        self.r > 0.0 && self.z > 0.0
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        Self::FACES.to_vec()
    }

    fn depth(&self, p: &Point3) -> f64 {
        (self.r - rho(p)).min(self.half_z() - p.z.abs())
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let h = self.half_z();
        match bit {
            Self::FACE_SIDE => (rho(p) - self.r).hypot((p.z.abs() - h).max(0.0)),
            Self::FACE_BOTTOM => annulus_distance(rho(p), p.z, -h, 0.0, self.r),
            _ => annulus_distance(rho(p), p.z, h, 0.0, self.r),
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        match bit {
            Self::FACE_SIDE => radial(p),
            Self::FACE_BOTTOM => -Vector3::z(),
            _ => Vector3::z(),
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let h = self.half_z();
        let tol = 1e-9 * self.r.max(h);
        let mut hits: Vec<(f64, u32)> = solve_quadratic(
            dir.x * dir.x + dir.y * dir.y,
            2.0 * (from.x * dir.x + from.y * dir.y),
            from.x * from.x + from.y * from.y - self.r * self.r,
        )
        .into_iter()
        .filter(|t| (from.z + dir.z * t).abs() <= h + tol)
        .map(|t| (t, Self::FACE_SIDE))
        .collect();
        for (z0, bit) in [(-h, Self::FACE_BOTTOM), (h, Self::FACE_TOP)] {
            if let Some(t) = z_plane_hit(from, dir, z0) {
                if rho(&(from + dir * t)) <= self.r + tol {
                    hits.push((t, bit));
                }
            }
        }
        hits
    }

    fn enclosed_volume(&self) -> f64 {
        PI * self.r * self.r * self.z
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        Ok(match bit {
            Self::FACE_SIDE => TAU * self.r * self.z,
            _ => PI * self.r * self.r,
        })
    }

    fn aabb(&self) -> Aabb {
        Aabb::centered(Vector3::new(self.r, self.r, self.half_z()))
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let h = self.half_z();
        vec![
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_SIDE),
                Placement::identity(),
                FaceSurface::Cylinder(surface::Cylinder::new(self.r, h)),
            ),
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_BOTTOM),
                Placement::from_axis_angle(Vector3::new(0.0, 0.0, -h), Axis::X, PI),
                FaceSurface::Annulus(Annulus::disk(self.r)),
            ),
            FaceInfo::new(
                FaceIdentifier::from_bits(Self::FACE_TOP),
                Placement::from_translation(Vector3::new(0.0, 0.0, h)),
                FaceSurface::Annulus(Annulus::disk(self.r)),
            ),
        ]
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let h = self.half_z();
        let segments = options.sampling.segments();
        let mut out = vec![circle(self.r, -h, segments), circle(self.r, h, segments)];
        let lines = options.sampling.rings();
        for i in 0..lines {
            #[allow(clippy::cast_precision_loss)]
            let a = TAU * i as f64 / lines as f64;
            let (x, y) = (self.r * a.cos(), self.r * a.sin());
            out.push(segment(Point3::new(x, y, -h), Point3::new(x, y, h)));
        }
        out
    }
}

impl_solid_for_primitive!(Cylinder);
