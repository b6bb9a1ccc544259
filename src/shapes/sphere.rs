use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{self, Annulus, FaceInfo, FaceSurface, Surface, SurfaceDomain};
use crate::math::roots::solve_quadratic;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::placement::Placement;
use crate::tessellation::{parametric, Polyline, WireOptions};

use super::primitive::{impl_solid_for_primitive, non_negative, positive, radial, rho, z_plane_hit, Primitive};
use super::sector::{
    arc, meridian_frame, outside, read_range, side_face_distance, side_hits, side_normal, wedge_depth, AngularRange,
};
use super::MeasureOptions;

const PHI_KEYS: (&str, &str) = ("start_phi", "delta_phi");
const THETA_KEYS: (&str, &str) = ("start_theta", "delta_theta");

/// A sphere centred on the origin, optionally hollowed by a concentric
/// inner sphere of radius `r_min` and cut to an azimuthal range `phi` and a
/// polar range `theta` (measured from `+z`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    r: f64,
    r_min: f64,
    phi: AngularRange,
    theta: AngularRange,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            r: 0.0,
            r_min: 0.0,
            phi: AngularRange::full_turn(),
            theta: AngularRange::half_turn(),
        }
    }
}

impl Sphere {
    pub const FACE_OUTER_SIDE: u32 = 0x1;
    pub const FACE_INNER_SIDE: u32 = 0x2;
    pub const FACE_START_THETA: u32 = 0x4;
    pub const FACE_STOP_THETA: u32 = 0x8;
    pub const FACE_START_PHI: u32 = 0x10;
    pub const FACE_STOP_PHI: u32 = 0x20;

    /// A full ball of radius `r`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `r` is positive.
    pub fn new(r: f64) -> std::result::Result<Self, ShapeError> {
        Self::hollow(0.0, r)
    }

    /// A spherical shell between `r_min` and `r`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] for a negative `r_min` or
    /// `r <= r_min`.
    pub fn hollow(r_min: f64, r: f64) -> std::result::Result<Self, ShapeError> {
        let r_min = non_negative("sphere", "r_min", r_min)?;
        let r = positive("sphere", "r", r)?;
        if r <= r_min {
            return Err(ShapeError::InvalidParameter {
                shape: "sphere",
                parameter: "r",
                value: r,
            });
        }
        Ok(Self {
            r,
            r_min,
            ..Self::default()
        })
    }

    /// Keeps the azimuths in `[start, start + delta]`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `0 <= start < 2π` and
    /// `0 < delta <= 2π - start`.
    pub fn with_phi(mut self, start: f64, delta: f64) -> std::result::Result<Self, ShapeError> {
        self.phi = AngularRange::checked("sphere", PHI_KEYS, TAU, start, delta)?;
        Ok(self)
    }

    /// Keeps the polar angles in `[start, start + delta]`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `0 <= start < π` and
    /// `0 < delta <= π - start`.
    pub fn with_theta(mut self, start: f64, delta: f64) -> std::result::Result<Self, ShapeError> {
        self.theta = AngularRange::checked("sphere", THETA_KEYS, PI, start, delta)?;
        Ok(self)
    }

    #[must_use]
    pub fn r(&self) -> f64 {
        self.r
    }

    #[must_use]
    pub fn r_min(&self) -> f64 {
        self.r_min
    }

    #[must_use]
    pub fn phi(&self) -> &AngularRange {
        &self.phi
    }

    #[must_use]
    pub fn theta(&self) -> &AngularRange {
        &self.theta
    }

    #[must_use]
    pub fn has_inner_face(&self) -> bool {
        self.r_min > 0.0
    }

    /// Reads `r` (or `r_max`), the optional `r_min` and the optional
    /// `start_phi`/`delta_phi` and `start_theta`/`delta_theta` pairs.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let r = match properties.length_opt("r_max")? {
            Some(r) => r,
            None => properties.length("r")?,
        };
        let mut sphere = Self::hollow(properties.length_opt("r_min")?.unwrap_or(0.0), r)?;
        if let Some(phi) = read_range(properties, "sphere", PHI_KEYS, TAU)? {
            sphere.phi = phi;
        }
        if let Some(theta) = read_range(properties, "sphere", THETA_KEYS, PI)? {
            sphere.theta = theta;
        }
        *self = sphere;
        Ok(())
    }

    fn shells(&self) -> Vec<(f64, u32)> {
        let mut shells = vec![(self.r, Self::FACE_OUTER_SIDE)];
        if self.has_inner_face() {
            shells.push((self.r_min, Self::FACE_INNER_SIDE));
        }
        shells
    }

    /// Bounding cones with their polar angle.
    fn cones(&self) -> Vec<(f64, u32)> {
        let mut cones = Vec::new();
        if self.theta.start() > 0.0 {
            cones.push((self.theta.start(), Self::FACE_START_THETA));
        }
        if self.theta.stop() < PI - TOLERANCE {
            cones.push((self.theta.stop(), Self::FACE_STOP_THETA));
        }
        cones
    }

    /// Signed distance of `(r, z)` to the polar band, unbounded when uncut.
    fn polar_depth(&self, r: f64, z: f64) -> f64 {
        self.cones()
            .into_iter()
            .map(|(theta, bit)| {
                let offset = polar_offset(r, z, theta);
                if bit == Self::FACE_START_THETA {
                    offset
                } else {
                    -offset
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Signed depth of the cross-section in the `(rho, z)` half-plane.
    fn section_depth(&self, r: f64, z: f64) -> f64 {
        let d = r.hypot(z);
        let mut depth = (self.r - d).min(self.polar_depth(r, z));
        if self.has_inner_face() {
            depth = depth.min(d - self.r_min);
        }
        depth
    }

    fn angular_depth(&self, p: &Point3) -> f64 {
        self.polar_depth(rho(p), p.z).min(wedge_depth(&self.phi, p))
    }

    /// Parameters where the ray meets the bounded cone at polar angle `theta`.
    fn cone_hits(&self, from: &Point3, dir: &Vector3, theta: f64, tol: f64) -> Vec<f64> {
        let (s, c) = theta.sin_cos();
        let candidates: Vec<f64> = if c.abs() < 1e-12 {
            z_plane_hit(from, dir, 0.0).into_iter().collect()
        } else {
            let (c2, s2) = (c * c, s * s);
            solve_quadratic(
                c2 * (dir.x * dir.x + dir.y * dir.y) - s2 * dir.z * dir.z,
                2.0 * (c2 * (from.x * dir.x + from.y * dir.y) - s2 * from.z * dir.z),
                c2 * (from.x * from.x + from.y * from.y) - s2 * from.z * from.z,
            )
        };
        candidates
            .into_iter()
            .filter(|t| {
                let q = from + dir * *t;
                let d = q.coords.norm();
                q.z * c >= -tol
                    && d >= self.r_min - tol
                    && d <= self.r + tol
                    && wedge_depth(&self.phi, &q) >= -tol
            })
            .collect()
    }

    fn polar_angle(&self, bit: u32) -> f64 {
        if bit == Self::FACE_START_THETA {
            self.theta.start()
        } else {
            self.theta.stop()
        }
    }
}

/// Signed offset of `(r, z)` from the cone at polar angle `theta`, positive
/// towards larger polar angles.
fn polar_offset(r: f64, z: f64, theta: f64) -> f64 {
    let (s, c) = theta.sin_cos();
    let along = r * s + z * c;
    let across = r * c - z * s;
    if along >= 0.0 {
        across
    } else {
        r.hypot(z).copysign(across)
    }
}

/// Unit vector of increasing polar angle `theta` in the meridian of `p`.
fn polar_direction(p: &Point3, theta: f64) -> Vector3 {
    let (s, c) = theta.sin_cos();
    radial(p) * c - Vector3::z() * s
}

fn radial_dir(p: &Point3) -> Vector3 {
    let d = p.coords.norm();
    if d < TOLERANCE {
        Vector3::z()
    } else {
        p.coords / d
    }
}

impl Primitive for Sphere {
    const NAME: &'static str = "sphere";

    fn is_configured(&self) -> bool {
        self.r > self.r_min && self.r_min >= 0.0
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        let mut bits: Vec<u32> = self.shells().into_iter().map(|(_, bit)| bit).collect();
        bits.extend(self.cones().into_iter().map(|(_, bit)| bit));
        if self.phi.is_partial_turn() {
            bits.extend([Self::FACE_START_PHI, Self::FACE_STOP_PHI]);
        }
        bits
    }

    fn depth(&self, p: &Point3) -> f64 {
        self.section_depth(rho(p), p.z).min(wedge_depth(&self.phi, p))
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let d = p.coords.norm();
        match bit {
            Self::FACE_OUTER_SIDE => (d - self.r).abs().hypot(outside(self.angular_depth(p))),
            Self::FACE_INNER_SIDE => (d - self.r_min).abs().hypot(outside(self.angular_depth(p))),
            Self::FACE_START_THETA | Self::FACE_STOP_THETA => {
                let (s, c) = self.polar_angle(bit).sin_cos();
                let (r, z) = (rho(p), p.z);
                let along = r * s + z * c;
                let across = r * c - z * s;
                across
                    .hypot(along - along.clamp(self.r_min, self.r))
                    .hypot(outside(wedge_depth(&self.phi, p)))
            }
            Self::FACE_START_PHI => side_face_distance(p, self.phi.start(), |r, z| self.section_depth(r, z)),
            Self::FACE_STOP_PHI => side_face_distance(p, self.phi.stop(), |r, z| self.section_depth(r, z)),
            _ => f64::INFINITY,
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        match bit {
            Self::FACE_INNER_SIDE => -radial_dir(p),
            Self::FACE_START_THETA => -polar_direction(p, self.theta.start()),
            Self::FACE_STOP_THETA => polar_direction(p, self.theta.stop()),
            Self::FACE_START_PHI => side_normal(self.phi.start(), false),
            Self::FACE_STOP_PHI => side_normal(self.phi.stop(), true),
            _ => radial_dir(p),
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let tol = 1e-9 * self.r;
        let a = dir.norm_squared();
        let b = 2.0 * from.coords.dot(dir);
        let c0 = from.coords.norm_squared();
        let mut hits = Vec::new();
        for (radius, bit) in self.shells() {
            for t in solve_quadratic(a, b, c0 - radius * radius) {
                if self.angular_depth(&(from + dir * t)) >= -tol {
                    hits.push((t, bit));
                }
            }
        }
        for (theta, bit) in self.cones() {
            hits.extend(self.cone_hits(from, dir, theta, tol).into_iter().map(|t| (t, bit)));
        }
        hits.extend(side_hits(
            &self.phi,
            from,
            dir,
            (Self::FACE_START_PHI, Self::FACE_STOP_PHI),
            tol,
            |r, z| self.section_depth(r, z),
        ));
        hits
    }

    fn enclosed_volume(&self) -> f64 {
        let band = self.theta.start().cos() - self.theta.stop().cos();
        self.phi.delta() / 3.0 * band * (self.r.powi(3) - self.r_min.powi(3))
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        let ring = self.r * self.r - self.r_min * self.r_min;
        Ok(match bit {
            Self::FACE_OUTER_SIDE | Self::FACE_INNER_SIDE => {
                let radius = if bit == Self::FACE_INNER_SIDE { self.r_min } else { self.r };
                let band = self.theta.start().cos() - self.theta.stop().cos();
                radius * radius * self.phi.delta() * band
            }
            Self::FACE_START_THETA | Self::FACE_STOP_THETA => 0.5 * self.phi.delta() * self.polar_angle(bit).sin() * ring,
            _ => 0.5 * self.theta.delta() * ring,
        })
    }

    fn aabb(&self) -> Aabb {
        Aabb::centered(Vector3::repeat(self.r))
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let (t0, t1) = (self.theta.start(), self.theta.stop());
        let (p0, p1) = (self.phi.start(), self.phi.stop());
        let mut faces: Vec<FaceInfo> = self
            .shells()
            .into_iter()
            .map(|(radius, bit)| {
                let patch = FaceSurface::Sphere(surface::Sphere::new(radius))
                    .trimmed(SurfaceDomain::new(p0, p1, FRAC_PI_2 - t1, FRAC_PI_2 - t0));
                let face = FaceInfo::new(FaceIdentifier::from_bits(bit), Placement::identity(), patch);
                if bit == Self::FACE_INNER_SIDE {
                    face.flipped()
                } else {
                    face
                }
            })
            .collect();

        for (theta, bit) in self.cones() {
            let (s, c) = theta.sin_cos();
            // Whether the patch normal follows increasing polar angle.
            let (patch, placement, increasing) = if c.abs() < 1e-12 {
                (FaceSurface::Annulus(Annulus::new(self.r_min, self.r)), Placement::identity(), false)
            } else {
                let (near, far) = (self.r_min * s, self.r * s);
                let (bottom, top) = if c > 0.0 { (near, far) } else { (far, near) };
                (
                    FaceSurface::Cone(surface::Cone::new(bottom, top, 0.5 * (self.r - self.r_min) * c.abs())),
                    Placement::from_translation(Vector3::new(0.0, 0.0, 0.5 * (self.r + self.r_min) * c)),
                    c > 0.0,
                )
            };
            let domain = SurfaceDomain {
                u_min: p0,
                u_max: p1,
                ..patch.domain()
            };
            let face = FaceInfo::new(FaceIdentifier::from_bits(bit), placement, patch.trimmed(domain));
            faces.push(if (bit == Self::FACE_START_THETA) == increasing {
                face.flipped()
            } else {
                face
            });
        }

        if self.phi.is_partial_turn() {
            let section = SurfaceDomain::new(FRAC_PI_2 - t1, FRAC_PI_2 - t0, self.r_min, self.r);
            for (c, bit, stop) in [(p0, Self::FACE_START_PHI, false), (p1, Self::FACE_STOP_PHI, true)] {
                let face = FaceInfo::new(
                    FaceIdentifier::from_bits(bit),
                    meridian_frame(c, 0.0),
                    FaceSurface::Annulus(Annulus::new(self.r_min, self.r)).trimmed(section),
                );
                faces.push(if stop { face.flipped() } else { face });
            }
        }
        faces
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let segments = options.sampling.segments();
        let rings = options.sampling.rings();
        let (t0, t1) = (self.theta.start(), self.theta.stop());
        let mut out = Vec::new();
        for (radius, _) in self.shells() {
            for k in 1..=rings {
                #[allow(clippy::cast_precision_loss)]
                let theta = t0 + (t1 - t0) * k as f64 / (rings + 1) as f64;
                out.push(arc(radius * theta.sin(), radius * theta.cos(), &self.phi, segments));
            }
            for (theta, _) in self.cones() {
                out.push(arc(radius * theta.sin(), radius * theta.cos(), &self.phi, segments));
            }
            for lon in self.phi.angles(rings) {
                out.push(parametric(
                    |theta| {
                        Point3::new(
                            radius * theta.sin() * lon.cos(),
                            radius * theta.sin() * lon.sin(),
                            radius * theta.cos(),
                        )
                    },
                    t0,
                    t1,
                    segments / 2,
                    false,
                ));
            }
        }
        out
    }
}

impl_solid_for_primitive!(Sphere);
