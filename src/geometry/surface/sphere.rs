use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// A sphere centred on the origin.
///
/// `P(u, v) = r (cos v cos u, cos v sin u, sin v)`, `u` the longitude,
/// `v` the latitude in `[-π/2, π/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Surface for Sphere {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let (cv, sv) = (v.cos(), v.sin());
        Ok(Point3::new(
            self.radius * cv * u.cos(),
            self.radius * cv * u.sin(),
            self.radius * sv,
        ))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let (cv, sv) = (v.cos(), v.sin());
        Ok(Vector3::new(cv * u.cos(), cv * u.sin(), sv))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -FRAC_PI_2, FRAC_PI_2)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        Ok(self.radius * self.radius * v.cos())
    }
}
