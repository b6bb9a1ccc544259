use std::f64::consts::TAU;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// A toroidal surface centred on the origin, symmetric about the z axis.
///
/// `P(u, v) = ((R + r cos v) cos u, (R + r cos v) sin u, r sin v)` where `R`
/// is the sweep radius (axis to tube centre) and `r` the tube radius.
///
/// Parameters: `u, v` in `[0, 2π)`. The normal points away from the tube
/// centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    sweep_radius: f64,
    tube_radius: f64,
}

impl Torus {
    #[must_use]
    pub fn new(sweep_radius: f64, tube_radius: f64) -> Self {
        Self {
            sweep_radius,
            tube_radius,
        }
    }

    #[must_use]
    pub fn sweep_radius(&self) -> f64 {
        self.sweep_radius
    }

    #[must_use]
    pub fn tube_radius(&self) -> f64 {
        self.tube_radius
    }
}

impl Surface for Torus {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let rho = self.sweep_radius + self.tube_radius * v.cos();
        Ok(Point3::new(
            rho * u.cos(),
            rho * u.sin(),
            self.tube_radius * v.sin(),
        ))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let cv = v.cos();
        Ok(Vector3::new(cv * u.cos(), cv * u.sin(), v.sin()))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, TAU)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        Ok(self.tube_radius * (self.sweep_radius + self.tube_radius * v.cos()))
    }
}
