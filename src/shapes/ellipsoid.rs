use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{self, EllipticDisk, FaceInfo, FaceSurface, Surface};
use crate::math::roots::solve_quadratic;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::placement::{Axis, Placement};
use crate::tessellation::{ellipse, parametric, Polyline, WireOptions};

use super::primitive::{impl_solid_for_primitive, non_negative, positive, z_plane_hit, Primitive};
use super::MeasureOptions;

/// An ellipsoid with semi-axes `a` (x), `b` (y), `c` (z) centred on the
/// origin, optionally truncated by horizontal cuts.
///
/// `bottom_cut` and `top_cut` are the depths removed from each end, so the
/// solid spans `z` in `[-(c - bottom_cut), c - top_cut]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    a: f64,
    b: f64,
    c: f64,
    bottom_cut: f64,
    top_cut: f64,
}

impl Ellipsoid {
    pub const FACE_SIDE: u32 = 0x1;
    pub const FACE_BOTTOM: u32 = 0x2;
    pub const FACE_TOP: u32 = 0x4;

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless every semi-axis is
    /// positive.
    pub fn new(a: f64, b: f64, c: f64) -> std::result::Result<Self, ShapeError> {
        Self::truncated(a, b, c, 0.0, 0.0)
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] for non-positive semi-axes,
    /// negative cuts, or cuts that remove the whole solid.
    pub fn truncated(
        a: f64,
        b: f64,
        c: f64,
        bottom_cut: f64,
        top_cut: f64,
    ) -> std::result::Result<Self, ShapeError> {
        let c = positive("ellipsoid", "z_radius", c)?;
        let bottom_cut = non_negative("ellipsoid", "bottom_z_cut", bottom_cut)?;
        let top_cut = non_negative("ellipsoid", "top_z_cut", top_cut)?;
        if bottom_cut + top_cut >= 2.0 * c {
            return Err(ShapeError::InvalidParameter {
                shape: "ellipsoid",
                parameter: "top_z_cut",
                value: top_cut,
            });
        }
        Ok(Self {
            a: positive("ellipsoid", "x_radius", a)?,
            b: positive("ellipsoid", "y_radius", b)?,
            c,
            bottom_cut,
            top_cut,
        })
    }

    #[must_use]
    pub fn x_radius(&self) -> f64 {
        self.a
    }

    #[must_use]
    pub fn y_radius(&self) -> f64 {
        self.b
    }

    #[must_use]
    pub fn z_radius(&self) -> f64 {
        self.c
    }

    #[must_use]
    pub fn bottom_z_cut(&self) -> f64 {
        self.bottom_cut
    }

    #[must_use]
    pub fn top_z_cut(&self) -> f64 {
        self.top_cut
    }

    /// Lowest `z` of the solid.
    #[must_use]
    pub fn z_min(&self) -> f64 {
        -(self.c - self.bottom_cut)
    }

    /// Highest `z` of the solid.
    #[must_use]
    pub fn z_max(&self) -> f64 {
        self.c - self.top_cut
    }

    /// Reads `{x,y,z}_radius` (or `{x,y,z}_diameter`) and the optional
    /// `bottom_z_cut` / `top_z_cut`.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let semi_axis = |axis: &str| -> Result<f64> {
            match properties.length_opt(&format!("{axis}_radius"))? {
                Some(r) => Ok(r),
                None => Ok(0.5 * properties.length(&format!("{axis}_diameter"))?),
            }
        };
        *self = Self::truncated(
            semi_axis("x")?,
            semi_axis("y")?,
            semi_axis("z")?,
            properties.length_opt("bottom_z_cut")?.unwrap_or(0.0),
            properties.length_opt("top_z_cut")?.unwrap_or(0.0),
        )?;
        Ok(())
    }

    /// Horizontal scale of the cross-section at height `z`.
    fn section_scale(&self, z: f64) -> f64 {
        (1.0 - (z / self.c).powi(2)).max(0.0).sqrt()
    }

    fn caps(&self) -> Vec<(f64, u32)> {
        let mut caps = Vec::new();
        if self.bottom_cut > 0.0 {
            caps.push((self.z_min(), Self::FACE_BOTTOM));
        }
        if self.top_cut > 0.0 {
            caps.push((self.z_max(), Self::FACE_TOP));
        }
        caps
    }

    /// Signed distance estimate to the full ellipsoid, positive inside.
    fn shell_depth(&self, p: &Point3) -> f64 {
        let q = Vector3::new(p.x / self.a, p.y / self.b, p.z / self.c);
        let s = q.norm();
        let g = Vector3::new(p.x / (self.a * self.a), p.y / (self.b * self.b), p.z / (self.c * self.c));
        let gn = g.norm();
        if s < TOLERANCE || gn < TOLERANCE {
            return self.a.min(self.b).min(self.c);
        }
        (1.0 - s) * s / gn
    }

    fn cap_distance(&self, p: &Point3, z0: f64) -> f64 {
        let scale = self.section_scale(z0);
        let (ca, cb) = (self.a * scale, self.b * scale);
        let q = ((p.x / ca).powi(2) + (p.y / cb).powi(2)).sqrt();
        let overflow = if q > 1.0 { p.x.hypot(p.y) * (q - 1.0) / q } else { 0.0 };
        overflow.hypot(p.z - z0)
    }
}

impl Primitive for Ellipsoid {
    const NAME: &'static str = "ellipsoid";

    fn is_configured(&self) -> bool {
        self.a > 0.0 && self.b > 0.0 && self.c > 0.0 && self.bottom_cut + self.top_cut < 2.0 * self.c
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        let mut bits = vec![Self::FACE_SIDE];
        bits.extend(self.caps().into_iter().map(|(_, bit)| bit));
        bits
    }

    fn depth(&self, p: &Point3) -> f64 {
        self.shell_depth(p).min(self.z_max() - p.z).min(p.z - self.z_min())
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        match bit {
            Self::FACE_SIDE => {
                let band = (p.z - self.z_max()).max(self.z_min() - p.z).max(0.0);
                self.shell_depth(p).abs().hypot(band)
            }
            Self::FACE_BOTTOM => self.cap_distance(p, self.z_min()),
            _ => self.cap_distance(p, self.z_max()),
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        match bit {
            Self::FACE_SIDE => {
                let g = Vector3::new(p.x / (self.a * self.a), p.y / (self.b * self.b), p.z / (self.c * self.c));
                g.try_normalize(TOLERANCE).unwrap_or_else(Vector3::z)
            }
            Self::FACE_BOTTOM => -Vector3::z(),
            _ => Vector3::z(),
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let inv = Vector3::new(1.0 / self.a, 1.0 / self.b, 1.0 / self.c);
        let f = from.coords.component_mul(&inv);
        let d = dir.component_mul(&inv);
        let tol = 1e-9 * self.c;
        let mut hits: Vec<(f64, u32)> = solve_quadratic(d.norm_squared(), 2.0 * f.dot(&d), f.norm_squared() - 1.0)
            .into_iter()
            .filter(|t| {
                let z = from.z + dir.z * t;
                z >= self.z_min() - tol && z <= self.z_max() + tol
            })
            .map(|t| (t, Self::FACE_SIDE))
            .collect();
        for (z0, bit) in self.caps() {
            if let Some(t) = z_plane_hit(from, dir, z0) {
                let p = from + dir * t;
                let scale = self.section_scale(z0);
                let q = (p.x / (self.a * scale)).powi(2) + (p.y / (self.b * scale)).powi(2);
                if q <= 1.0 + 1e-9 {
                    hits.push((t, bit));
                }
            }
        }
        hits
    }

    fn enclosed_volume(&self) -> f64 {
        let (zb, zt) = (self.z_min(), self.z_max());
        PI * self.a * self.b * ((zt - zb) - (zt.powi(3) - zb.powi(3)) / (3.0 * self.c * self.c))
    }

    fn face_area(&self, bit: u32, options: &MeasureOptions) -> Result<f64> {
        match bit {
            Self::FACE_SIDE => surface::Ellipsoid::between(self.a, self.b, self.c, self.z_min(), self.z_max())
                .area(options.face_samples),
            Self::FACE_BOTTOM => Ok(PI * self.a * self.b * self.section_scale(self.z_min()).powi(2)),
            _ => Ok(PI * self.a * self.b * self.section_scale(self.z_max()).powi(2)),
        }
    }

    fn aabb(&self) -> Aabb {
        let (zb, zt) = (self.z_min(), self.z_max());
        let widest = if zb <= 0.0 && zt >= 0.0 { 0.0 } else { zb.abs().min(zt.abs()) };
        let s = self.section_scale(widest);
        Aabb::new(
            Point3::new(-self.a * s, -self.b * s, zb),
            Point3::new(self.a * s, self.b * s, zt),
        )
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let mut faces = vec![FaceInfo::new(
            FaceIdentifier::from_bits(Self::FACE_SIDE),
            Placement::identity(),
            FaceSurface::Ellipsoid(surface::Ellipsoid::between(
                self.a,
                self.b,
                self.c,
                self.z_min(),
                self.z_max(),
            )),
        )];
        for (z0, bit) in self.caps() {
            let scale = self.section_scale(z0);
            let placement = if bit == Self::FACE_BOTTOM {
                Placement::from_axis_angle(Vector3::new(0.0, 0.0, z0), Axis::X, PI)
            } else {
                Placement::from_translation(Vector3::new(0.0, 0.0, z0))
            };
            faces.push(FaceInfo::new(
                FaceIdentifier::from_bits(bit),
                placement,
                FaceSurface::EllipticDisk(EllipticDisk::new(self.a * scale, self.b * scale)),
            ));
        }
        faces
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let segments = options.sampling.segments();
        let rings = options.sampling.rings();
        let (zb, zt) = (self.z_min(), self.z_max());
        let mut out: Vec<Polyline> = self
            .caps()
            .into_iter()
            .map(|(z0, _)| {
                let s = self.section_scale(z0);
                ellipse(self.a * s, self.b * s, z0, segments)
            })
            .collect();
        for k in 1..=rings {
            #[allow(clippy::cast_precision_loss)]
            let z = zb + (zt - zb) * k as f64 / (rings + 1) as f64;
            let s = self.section_scale(z);
            out.push(ellipse(self.a * s, self.b * s, z, segments));
        }
        let lat_min = (zb / self.c).clamp(-1.0, 1.0).asin();
        let lat_max = (zt / self.c).clamp(-1.0, 1.0).asin();
        for i in 0..rings {
            #[allow(clippy::cast_precision_loss)]
            let lon = TAU * i as f64 / rings as f64;
            out.push(parametric(
                |lat| {
                    Point3::new(
                        self.a * lat.cos() * lon.cos(),
                        self.b * lat.cos() * lon.sin(),
                        self.c * lat.sin(),
                    )
                },
                lat_min,
                lat_max,
                segments / 2,
                false,
            ));
        }
        out
    }
}

impl_solid_for_primitive!(Ellipsoid);
