use std::f64::consts::TAU;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// The side of a finite cylinder about the z axis, centred on the origin.
///
/// `P(u, v) = (r cos u, r sin u, v)` with `v` in `[-half_height, half_height]`.
///
/// The normal is radial, pointing away from the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    radius: f64,
    half_height: f64,
}

impl Cylinder {
    #[must_use]
    pub fn new(radius: f64, half_height: f64) -> Self {
        Self {
            radius,
            half_height,
        }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn half_height(&self) -> f64 {
        self.half_height
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(Point3::new(self.radius * u.cos(), self.radius * u.sin(), v))
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        Ok(Vector3::new(u.cos(), u.sin(), 0.0))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -self.half_height, self.half_height)
    }

    fn area_element(&self, _u: f64, _v: f64) -> Result<f64> {
        Ok(self.radius)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn evaluate_at_pi_over_2() {
        let c = Cylinder::new(2.0, 1.0);
        let p = c.evaluate(FRAC_PI_2, 0.5).unwrap();
        assert_relative_eq!(p, Point3::new(0.0, 2.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn normal_outward() {
        let c = Cylinder::new(1.0, 1.0);
        assert_relative_eq!(c.normal(0.0, 0.0).unwrap(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn lateral_area() {
        let c = Cylinder::new(1.0, 2.0);
        assert_relative_eq!(c.area(8).unwrap(), 8.0 * PI, epsilon = 1e-9);
    }
}
