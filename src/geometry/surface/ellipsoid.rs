use std::f64::consts::TAU;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{unit_or_error, Surface, SurfaceDomain};

/// An ellipsoid centred on the origin with semi-axes `a`, `b`, `c`, restricted
/// to a latitude band.
///
/// `P(u, v) = (a cos v cos u, b cos v sin u, c sin v)` with `v` in
/// `[v_min, v_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    b: f64,
    c: f64,
    v_min: f64,
    v_max: f64,
}

impl Ellipsoid {
    /// Band between the planes `z = z_min` and `z = z_max`.
    #[must_use]
    pub fn between(a: f64, b: f64, c: f64, z_min: f64, z_max: f64) -> Self {
        let lat = |z: f64| (z / c).clamp(-1.0, 1.0).asin();
        Self {
            a,
            b,
            c,
            v_min: lat(z_min),
            v_max: lat(z_max),
        }
    }
}

impl Surface for Ellipsoid {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let cv = v.cos();
        Ok(Point3::new(
            self.a * cv * u.cos(),
            self.b * cv * u.sin(),
            self.c * v.sin(),
        ))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let p = self.evaluate(u, v)?;
        unit_or_error(Vector3::new(
            p.x / (self.a * self.a),
            p.y / (self.b * self.b),
            p.z / (self.c * self.c),
        ))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, self.v_min, self.v_max)
    }
}
