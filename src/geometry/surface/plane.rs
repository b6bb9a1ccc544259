use std::f64::consts::TAU;

use crate::error::Result;
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// A rectangle in the `z = 0` plane, centred on the origin.
///
/// `P(u, v) = (u, v, 0)`, normal `+z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    half_x: f64,
    half_y: f64,
}

impl Rectangle {
    #[must_use]
    pub fn new(half_x: f64, half_y: f64) -> Self {
        Self { half_x, half_y }
    }

    #[must_use]
    pub fn half_x(&self) -> f64 {
        self.half_x
    }

    #[must_use]
    pub fn half_y(&self) -> f64 {
        self.half_y
    }
}

impl Surface for Rectangle {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(Point3::new(u, v, 0.0))
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(Vector3::z())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(-self.half_x, self.half_x, -self.half_y, self.half_y)
    }

    fn area_element(&self, _u: f64, _v: f64) -> Result<f64> {
        Ok(1.0)
    }
}

/// A disk or ring in the `z = 0` plane, centred on the origin.
///
/// `P(u, v) = (v cos u, v sin u, 0)` with `v` in `[inner, outer]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annulus {
    inner: f64,
    outer: f64,
}

impl Annulus {
    #[must_use]
    pub fn new(inner: f64, outer: f64) -> Self {
        Self { inner, outer }
    }

    /// A full disk.
    #[must_use]
    pub fn disk(radius: f64) -> Self {
        Self::new(0.0, radius)
    }

    #[must_use]
    pub fn inner(&self) -> f64 {
        self.inner
    }

    #[must_use]
    pub fn outer(&self) -> f64 {
        self.outer
    }
}

impl Surface for Annulus {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(Point3::new(v * u.cos(), v * u.sin(), 0.0))
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(Vector3::z())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, self.inner, self.outer)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        Ok(v)
    }
}

/// An elliptic disk in the `z = 0` plane with semi-axes `a` (x) and `b` (y).
///
/// `P(u, v) = (a v cos u, b v sin u, 0)` with `v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticDisk {
    a: f64,
    b: f64,
}

impl EllipticDisk {
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

impl Surface for EllipticDisk {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(Point3::new(self.a * v * u.cos(), self.b * v * u.sin(), 0.0))
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(Vector3::z())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, 1.0)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        Ok(self.a * self.b * v)
    }
}

/// A trapezoid in the `z = 0` plane spanning `v` in `[-half_height,
/// half_height]`, its x extent growing linearly from `[inner_bottom,
/// outer_bottom]` to `[inner_top, outer_top]`.
///
/// `P(u, v) = ((1 - u) x_in(v) + u x_out(v), v, 0)` with `u` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    inner_bottom: f64,
    inner_top: f64,
    outer_bottom: f64,
    outer_top: f64,
    half_height: f64,
}

impl Trapezoid {
    #[must_use]
    pub fn new(inner: (f64, f64), outer: (f64, f64), half_height: f64) -> Self {
        Self {
            inner_bottom: inner.0,
            inner_top: inner.1,
            outer_bottom: outer.0,
            outer_top: outer.1,
            half_height,
        }
    }

    fn bounds(&self, v: f64) -> (f64, f64) {
        let s = (v + self.half_height) / (2.0 * self.half_height);
        (
            self.inner_bottom + s * (self.inner_top - self.inner_bottom),
            self.outer_bottom + s * (self.outer_top - self.outer_bottom),
        )
    }
}

impl Surface for Trapezoid {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let (lo, hi) = self.bounds(v);
        Ok(Point3::new(lo + u * (hi - lo), v, 0.0))
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(Vector3::z())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, -self.half_height, self.half_height)
    }

    fn area_element(&self, _u: f64, v: f64) -> Result<f64> {
        let (lo, hi) = self.bounds(v);
        Ok(hi - lo)
    }
}
