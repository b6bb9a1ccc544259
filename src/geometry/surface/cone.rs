use std::f64::consts::TAU;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{unit_or_error, Surface, SurfaceDomain};

/// The side of a cone frustum about the z axis, centred on the origin.
///
/// The radius varies linearly from `bottom_radius` at `z = -half_height` to
/// `top_radius` at `z = +half_height`.
///
/// `P(u, v) = (r(v) cos u, r(v) sin u, v)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    bottom_radius: f64,
    top_radius: f64,
    half_height: f64,
}

impl Cone {
    #[must_use]
    pub fn new(bottom_radius: f64, top_radius: f64, half_height: f64) -> Self {
        Self {
            bottom_radius,
            top_radius,
            half_height,
        }
    }

    /// `dr/dz`.
    #[must_use]
    pub fn slope(&self) -> f64 {
        (self.top_radius - self.bottom_radius) / (2.0 * self.half_height)
    }

    /// Radius at height `z`.
    #[must_use]
    pub fn radius_at(&self, z: f64) -> f64 {
        self.bottom_radius + self.slope() * (z + self.half_height)
    }
}

impl Surface for Cone {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let r = self.radius_at(v);
        Ok(Point3::new(r * u.cos(), r * u.sin(), v))
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        unit_or_error(Vector3::new(u.cos(), u.sin(), -self.slope()))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -self.half_height, self.half_height)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        let k = self.slope();
        Ok(self.radius_at(v) * (1.0 + k * k).sqrt())
    }
}
