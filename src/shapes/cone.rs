use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{self, Annulus, FaceInfo, FaceSurface, Surface, SurfaceDomain, Trapezoid};
use crate::math::roots::solve_quadratic;
use crate::math::{Point3, Vector3};
use crate::placement::{Axis, Placement};
use crate::tessellation::{segment, Polyline, WireOptions};

use super::primitive::{annulus_distance, impl_solid_for_primitive, non_negative, positive, radial, rho, z_plane_hit, Primitive};
use super::sector::{
    arc, meridian_frame, outside, read_range, side_face_distance, side_hits, side_normal, wedge_depth, AngularRange,
};
use super::MeasureOptions;

const ANGLE_KEYS: (&str, &str) = ("start_angle", "delta_angle");

/// A right circular cone frustum about the z axis, centred on the origin.
///
/// Either outer radius may be zero (a cone with its apex on that end), not
/// both. An optional inner frustum hollows it out and an angular range cuts
/// it to a wedge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConeFrustum {
    bottom_r: f64,
    top_r: f64,
    inner_bottom_r: f64,
    inner_top_r: f64,
    z: f64,
    angle: AngularRange,
}

impl ConeFrustum {
    pub const FACE_OUTER_SIDE: u32 = 0x1;
    pub const FACE_BOTTOM: u32 = 0x2;
    pub const FACE_TOP: u32 = 0x4;
    pub const FACE_INNER_SIDE: u32 = 0x8;
    pub const FACE_START_ANGLE: u32 = 0x10;
    pub const FACE_STOP_ANGLE: u32 = 0x20;

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] for negative radii, two zero
    /// radii or a non-positive height.
    pub fn new(bottom_r: f64, top_r: f64, z: f64) -> std::result::Result<Self, ShapeError> {
        let bottom_r = non_negative("cone", "outer_bottom_r", bottom_r)?;
        let top_r = non_negative("cone", "outer_top_r", top_r)?;
        if bottom_r == 0.0 && top_r == 0.0 {
            return Err(ShapeError::InvalidParameter {
                shape: "cone",
                parameter: "outer_top_r",
                value: top_r,
            });
        }
        Ok(Self {
            bottom_r,
            top_r,
            inner_bottom_r: 0.0,
            inner_top_r: 0.0,
            z: positive("cone", "z", z)?,
            angle: AngularRange::full_turn(),
        })
    }

    /// Hollows the frustum down to the inner radii.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] for a negative inner radius,
    /// one above its outer radius, or inner radii that leave no material.
    pub fn with_inner(mut self, inner_bottom_r: f64, inner_top_r: f64) -> std::result::Result<Self, ShapeError> {
        let inner_bottom_r = non_negative("cone", "inner_bottom_r", inner_bottom_r)?;
        let inner_top_r = non_negative("cone", "inner_top_r", inner_top_r)?;
        if inner_bottom_r > self.bottom_r {
            return Err(ShapeError::InvalidParameter {
                shape: "cone",
                parameter: "inner_bottom_r",
                value: inner_bottom_r,
            });
        }
        if inner_top_r > self.top_r || (inner_bottom_r >= self.bottom_r && inner_top_r >= self.top_r) {
            return Err(ShapeError::InvalidParameter {
                shape: "cone",
                parameter: "inner_top_r",
                value: inner_top_r,
            });
        }
        self.inner_bottom_r = inner_bottom_r;
        self.inner_top_r = inner_top_r;
        Ok(self)
    }

    /// Keeps the azimuths in `[start, start + delta]`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `0 <= start < 2π` and
    /// `0 < delta <= 2π - start`.
    pub fn with_angle(mut self, start: f64, delta: f64) -> std::result::Result<Self, ShapeError> {
        self.angle = AngularRange::checked("cone", ANGLE_KEYS, TAU, start, delta)?;
        Ok(self)
    }

    #[must_use]
    pub fn bottom_r(&self) -> f64 {
        self.bottom_r
    }

    #[must_use]
    pub fn top_r(&self) -> f64 {
        self.top_r
    }

    #[must_use]
    pub fn inner_bottom_r(&self) -> f64 {
        self.inner_bottom_r
    }

    #[must_use]
    pub fn inner_top_r(&self) -> f64 {
        self.inner_top_r
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    #[must_use]
    pub fn angle(&self) -> &AngularRange {
        &self.angle
    }

    #[must_use]
    pub fn has_inner_face(&self) -> bool {
        self.inner_bottom_r > 0.0 || self.inner_top_r > 0.0
    }

    /// Reads `outer_bottom_r`, `outer_top_r`, `z`, the optional
    /// `inner_bottom_r`/`inner_top_r` and `start_angle`/`delta_angle`.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let mut cone = Self::new(
            properties.length("outer_bottom_r")?,
            properties.length("outer_top_r")?,
            properties.length("z")?,
        )?;
        let inner_bottom = properties.length_opt("inner_bottom_r")?;
        let inner_top = properties.length_opt("inner_top_r")?;
        if inner_bottom.is_some() || inner_top.is_some() {
            cone = cone.with_inner(inner_bottom.unwrap_or(0.0), inner_top.unwrap_or(0.0))?;
        }
        if let Some(angle) = read_range(properties, "cone", ANGLE_KEYS, TAU)? {
            cone.angle = angle;
        }
        *self = cone;
        Ok(())
    }

    fn half_z(&self) -> f64 {
        0.5 * self.z
    }

    /// Radius at height `z` of the generatrix from `bottom` to `top`.
    fn radius_at(&self, (bottom, top): (f64, f64), z: f64) -> f64 {
        bottom + (top - bottom) / self.z * (z + self.half_z())
    }

    fn outer(&self) -> (f64, f64) {
        (self.bottom_r, self.top_r)
    }

    fn inner(&self) -> (f64, f64) {
        (self.inner_bottom_r, self.inner_top_r)
    }

    /// `(z, inner, outer, bit)` of each cap with material.
    fn caps(&self) -> Vec<(f64, f64, f64, u32)> {
        let h = self.half_z();
        [
            (-h, self.inner_bottom_r, self.bottom_r, Self::FACE_BOTTOM),
            (h, self.inner_top_r, self.top_r, Self::FACE_TOP),
        ]
        .into_iter()
        .filter(|(_, inner, outer, _)| outer > inner)
        .collect()
    }

    /// Signed distance from `(r, z)` to the side through `radii`, positive
    /// towards the axis.
    fn side_offset(&self, radii: (f64, f64), r: f64, z: f64) -> f64 {
        let k = (radii.1 - radii.0) / self.z;
        (self.radius_at(radii, z) - r) / (1.0 + k * k).sqrt()
    }

    /// Distance in the `(rho, z)` half-plane to the generatrix through `radii`.
    fn side_distance(&self, (bottom, top): (f64, f64), r: f64, z: f64) -> f64 {
        let h = self.half_z();
        let (ax, az) = (bottom, -h);
        let (ex, ez) = (top - bottom, self.z);
        let s = (((r - ax) * ex + (z - az) * ez) / (ex * ex + ez * ez)).clamp(0.0, 1.0);
        (r - ax - s * ex).hypot(z - az - s * ez)
    }

    fn lateral_normal(&self, (bottom, top): (f64, f64), p: &Point3) -> Vector3 {
        let k = (top - bottom) / self.z;
        (radial(p) - Vector3::z() * k).normalize()
    }

    fn section_depth(&self, r: f64, z: f64) -> f64 {
        let mut depth = self.side_offset(self.outer(), r, z).min(self.half_z() - z.abs());
        if self.has_inner_face() {
            depth = depth.min(-self.side_offset(self.inner(), r, z));
        }
        depth
    }

    /// Ray parameters on the lateral surface through `radii`.
    fn lateral_hits(&self, radii: (f64, f64), from: &Point3, dir: &Vector3, tol: f64) -> Vec<f64> {
        let h = self.half_z();
        let k = (radii.1 - radii.0) / self.z;
        let base = self.radius_at(radii, from.z);
        let kd = k * dir.z;
        solve_quadratic(
            dir.x * dir.x + dir.y * dir.y - kd * kd,
            2.0 * (from.x * dir.x + from.y * dir.y - base * kd),
            from.x * from.x + from.y * from.y - base * base,
        )
        .into_iter()
        .filter(|t| {
            let q = from + dir * *t;
            q.z.abs() <= h + tol && self.radius_at(radii, q.z) >= -tol && wedge_depth(&self.angle, &q) >= -tol
        })
        .collect()
    }

    /// Restricts a patch parametrised by azimuth to the angular range,
    /// mirrored when the patch frame is flipped.
    fn trim(&self, patch: FaceSurface, mirrored: bool) -> FaceSurface {
        if !self.angle.is_partial_turn() {
            return patch;
        }
        let (u_min, u_max) = if mirrored {
            (-self.angle.stop(), -self.angle.start())
        } else {
            (self.angle.start(), self.angle.stop())
        };
        let domain = SurfaceDomain {
            u_min,
            u_max,
            ..patch.domain()
        };
        patch.trimmed(domain)
    }
}

impl Primitive for ConeFrustum {
    const NAME: &'static str = "cone";

    fn is_configured(&self) -> bool {
        self.z > 0.0
            && self.bottom_r >= 0.0
            && self.top_r >= 0.0
            && (self.bottom_r > 0.0 || self.top_r > 0.0)
            && self.inner_bottom_r <= self.bottom_r
            && self.inner_top_r <= self.top_r
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        let mut bits = vec![Self::FACE_OUTER_SIDE];
        bits.extend(self.caps().into_iter().map(|(_, _, _, bit)| bit));
        if self.has_inner_face() {
            bits.push(Self::FACE_INNER_SIDE);
        }
        if self.angle.is_partial_turn() {
            bits.extend([Self::FACE_START_ANGLE, Self::FACE_STOP_ANGLE]);
        }
        bits
    }

    fn depth(&self, p: &Point3) -> f64 {
        self.section_depth(rho(p), p.z).min(wedge_depth(&self.angle, p))
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let h = self.half_z();
        let (r, z) = (rho(p), p.z);
        let wedge = outside(wedge_depth(&self.angle, p));
        match bit {
            Self::FACE_OUTER_SIDE => self.side_distance(self.outer(), r, z).hypot(wedge),
            Self::FACE_INNER_SIDE => self.side_distance(self.inner(), r, z).hypot(wedge),
            Self::FACE_BOTTOM => annulus_distance(r, z, -h, self.inner_bottom_r, self.bottom_r).hypot(wedge),
            Self::FACE_TOP => annulus_distance(r, z, h, self.inner_top_r, self.top_r).hypot(wedge),
            Self::FACE_START_ANGLE => side_face_distance(p, self.angle.start(), |r, z| self.section_depth(r, z)),
            Self::FACE_STOP_ANGLE => side_face_distance(p, self.angle.stop(), |r, z| self.section_depth(r, z)),
            _ => f64::INFINITY,
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        match bit {
            Self::FACE_INNER_SIDE => -self.lateral_normal(self.inner(), p),
            Self::FACE_BOTTOM => -Vector3::z(),
            Self::FACE_TOP => Vector3::z(),
            Self::FACE_START_ANGLE => side_normal(self.angle.start(), false),
            Self::FACE_STOP_ANGLE => side_normal(self.angle.stop(), true),
            _ => self.lateral_normal(self.outer(), p),
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let tol = 1e-9 * self.bottom_r.max(self.top_r).max(self.half_z());
        let mut hits: Vec<(f64, u32)> = self
            .lateral_hits(self.outer(), from, dir, tol)
            .into_iter()
            .map(|t| (t, Self::FACE_OUTER_SIDE))
            .collect();
        if self.has_inner_face() {
            hits.extend(
                self.lateral_hits(self.inner(), from, dir, tol)
                    .into_iter()
                    .map(|t| (t, Self::FACE_INNER_SIDE)),
            );
        }
        for (z0, inner, outer, bit) in self.caps() {
            if let Some(t) = z_plane_hit(from, dir, z0) {
                let q = from + dir * t;
                let r = rho(&q);
                if r <= outer + tol && r >= inner - tol && wedge_depth(&self.angle, &q) >= -tol {
                    hits.push((t, bit));
                }
            }
        }
        hits.extend(side_hits(
            &self.angle,
            from,
            dir,
            (Self::FACE_START_ANGLE, Self::FACE_STOP_ANGLE),
            tol,
            |r, z| self.section_depth(r, z),
        ));
        hits
    }

    fn enclosed_volume(&self) -> f64 {
        let frustum = |(a, b): (f64, f64)| a * a + a * b + b * b;
        self.angle.delta() * self.z / 6.0 * (frustum(self.outer()) - frustum(self.inner()))
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        let half = 0.5 * self.angle.delta();
        let lateral = |(a, b): (f64, f64)| half * (a + b) * (b - a).hypot(self.z);
        Ok(match bit {
            Self::FACE_OUTER_SIDE => lateral(self.outer()),
            Self::FACE_INNER_SIDE => lateral(self.inner()),
            Self::FACE_BOTTOM => half * (self.bottom_r.powi(2) - self.inner_bottom_r.powi(2)),
            Self::FACE_TOP => half * (self.top_r.powi(2) - self.inner_top_r.powi(2)),
            _ => 0.5 * self.z * (self.bottom_r + self.top_r - self.inner_bottom_r - self.inner_top_r),
        })
    }

    fn aabb(&self) -> Aabb {
        let r = self.bottom_r.max(self.top_r);
        Aabb::centered(Vector3::new(r, r, self.half_z()))
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let h = self.half_z();
        let mut faces = vec![FaceInfo::new(
            FaceIdentifier::from_bits(Self::FACE_OUTER_SIDE),
            Placement::identity(),
            self.trim(FaceSurface::Cone(surface::Cone::new(self.bottom_r, self.top_r, h)), false),
        )];
        for (z0, inner, outer, bit) in self.caps() {
            let bottom = bit == Self::FACE_BOTTOM;
            let placement = if bottom {
                Placement::from_axis_angle(Vector3::new(0.0, 0.0, z0), Axis::X, PI)
            } else {
                Placement::from_translation(Vector3::new(0.0, 0.0, z0))
            };
            faces.push(FaceInfo::new(
                FaceIdentifier::from_bits(bit),
                placement,
                self.trim(FaceSurface::Annulus(Annulus::new(inner, outer)), bottom),
            ));
        }
        if self.has_inner_face() {
            faces.push(
                FaceInfo::new(
                    FaceIdentifier::from_bits(Self::FACE_INNER_SIDE),
                    Placement::identity(),
                    self.trim(
                        FaceSurface::Cone(surface::Cone::new(self.inner_bottom_r, self.inner_top_r, h)),
                        false,
                    ),
                )
                .flipped(),
            );
        }
        if self.angle.is_partial_turn() {
            for (c, bit, stop) in [
                (self.angle.start(), Self::FACE_START_ANGLE, false),
                (self.angle.stop(), Self::FACE_STOP_ANGLE, true),
            ] {
                let face = FaceInfo::new(
                    FaceIdentifier::from_bits(bit),
                    meridian_frame(c, 0.0),
                    FaceSurface::Trapezoid(Trapezoid::new(self.inner(), self.outer(), h)),
                );
                faces.push(if stop { face.flipped() } else { face });
            }
        }
        faces
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let h = self.half_z();
        let segments = options.sampling.segments();
        let mut out = Vec::new();
        for (z0, inner, outer) in [(-h, self.inner_bottom_r, self.bottom_r), (h, self.inner_top_r, self.top_r)] {
            if outer > 0.0 {
                out.push(arc(outer, z0, &self.angle, segments));
            }
            if inner > 0.0 && inner < outer {
                out.push(arc(inner, z0, &self.angle, segments));
            }
        }
        let mut sides = vec![self.outer()];
        if self.has_inner_face() {
            sides.push(self.inner());
        }
        for a in self.angle.angles(options.sampling.rings()) {
            let (c, s) = (a.cos(), a.sin());
            for (bottom, top) in &sides {
                out.push(segment(
                    Point3::new(bottom * c, bottom * s, -h),
                    Point3::new(top * c, top * s, h),
                ));
            }
        }
        out
    }
}

impl_solid_for_primitive!(ConeFrustum);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::surface::Surface;
    use crate::shapes::{Solid, WireRenderable};

    fn frustum() -> ConeFrustum {
        ConeFrustum::new(2.0, 1.0, 2.0).unwrap()
    }

    fn apex_up() -> ConeFrustum {
        ConeFrustum::new(1.0, 0.0, 2.0).unwrap()
    }

    #[test]
    fn rejects_two_zero_radii() {
        assert!(ConeFrustum::new(0.0, 0.0, 1.0).is_err());
        assert!(ConeFrustum::new(-1.0, 1.0, 1.0).is_err());
        assert!(ConeFrustum::new(1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn classification_follows_the_slant() {
        let c = frustum();
        assert!(c.is_inside(&Point3::origin(), 0.0).unwrap());
        assert!(c.is_inside(&Point3::new(1.4, 0.0, 0.0), 1e-6).unwrap());
        assert!(c.is_outside(&Point3::new(1.4, 0.0, 0.9), 1e-6).unwrap());
        assert_eq!(
            c.on_surface(&Point3::new(0.0, 1.5, 0.0), &FaceIdentifier::any(), 1e-6).unwrap().bits(),
            ConeFrustum::FACE_OUTER_SIDE
        );
    }

    #[test]
    fn side_normal_tilts_up() {
        let c = frustum();
        let n = c
            .normal_on_surface(&Point3::new(1.5, 0.0, 0.0), &FaceIdentifier::from_bits(ConeFrustum::FACE_OUTER_SIDE))
            .unwrap();
        let expected = Vector3::new(1.0, 0.0, 0.5).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-12);
    }

    #[test]
    fn apex_cone_has_no_top() {
        let c = apex_up();
        assert_eq!(c.face_bits(), vec![ConeFrustum::FACE_OUTER_SIDE, ConeFrustum::FACE_BOTTOM]);
        let hits = c.intercepts(&Point3::new(0.0, 0.0, -5.0), &Vector3::z(), 1e-6).unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-9);
        assert_relative_eq!(hits[1].distance, 6.0, epsilon = 1e-6);
    }

    #[test]
    fn horizontal_ray_at_mid_height() {
        let hits = frustum().intercepts(&Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 1e-6).unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 3.5, epsilon = 1e-12);
        assert_relative_eq!(hits[1].distance, 6.5, epsilon = 1e-12);
    }

    #[test]
    fn ray_above_the_apex_misses_the_mirror_nappe() {
        let hits = apex_up().intercepts(&Point3::new(-5.0, 0.0, 1.5), &Vector3::x(), 1e-6).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn measures() {
        let c = frustum();
        assert_relative_eq!(c.volume().unwrap(), PI * 2.0 / 3.0 * 7.0);
        let side = PI * 3.0 * 5.0_f64.sqrt();
        assert_relative_eq!(
            c.surface(&FaceIdentifier::from_bits(ConeFrustum::FACE_OUTER_SIDE)).unwrap(),
            side
        );
        assert_relative_eq!(c.surface(&FaceIdentifier::any()).unwrap(), side + 5.0 * PI);
    }

    #[test]
    fn patches_agree_with_the_solid() {
        let c = frustum();
        let mut faces = Vec::new();
        assert_eq!(c.compute_faces(&mut faces).unwrap(), 3);
        for face in &faces {
            for (p, _) in face.samples(4).unwrap() {
                assert_eq!(c.on_surface(&p, &face.id, 1e-9).unwrap(), face.id);
            }
            let p = face.placement.child_to_mother(&face.surface.evaluate(0.7, 0.2).unwrap()).unwrap();
            assert_relative_eq!(
                face.outward_normal(0.7, 0.2).unwrap(),
                c.face_normal(&p, face.id.bits()),
                epsilon = 1e-9
            );
        }
    }

    fn hollow() -> ConeFrustum {
        frustum().with_inner(1.0, 0.5).unwrap()
    }

    #[test]
    fn rejects_inner_radii_without_material() {
        assert!(matches!(
            frustum().with_inner(2.5, 0.5),
            Err(ShapeError::InvalidParameter { parameter: "inner_bottom_r", .. })
        ));
        assert!(frustum().with_inner(2.0, 1.0).is_err());
        assert!(frustum().with_inner(-1.0, 0.0).is_err());
        assert!(frustum().with_inner(2.0, 0.0).is_ok());
    }

    #[test]
    fn hollow_frustum() {
        let c = hollow();
        assert!(c.is_outside(&Point3::origin(), 1e-6).unwrap());
        assert!(c.is_inside(&Point3::new(1.0, 0.0, 0.0), 1e-6).unwrap());
        assert_relative_eq!(c.volume().unwrap(), 3.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(
            c.surface(&FaceIdentifier::from_bits(ConeFrustum::FACE_INNER_SIDE)).unwrap(),
            1.5 * PI * 4.25_f64.sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(c.surface(&FaceIdentifier::from_bits(ConeFrustum::FACE_BOTTOM)).unwrap(), 3.0 * PI, epsilon = 1e-12);

        let hits = c.intercepts(&Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 1e-9).unwrap();
        let got: Vec<(f64, u32)> = hits.iter().map(|h| (h.distance, h.face.bits())).collect();
        let want = [
            (3.5, ConeFrustum::FACE_OUTER_SIDE),
            (4.25, ConeFrustum::FACE_INNER_SIDE),
            (5.75, ConeFrustum::FACE_INNER_SIDE),
            (6.5, ConeFrustum::FACE_OUTER_SIDE),
        ];
        assert_eq!(got.len(), want.len(), "{got:?}");
        for ((d, bit), (wd, wbit)) in got.iter().zip(want) {
            assert_relative_eq!(*d, wd, epsilon = 1e-9);
            assert_eq!(*bit, wbit);
        }
        let n = c
            .normal_on_surface(&Point3::new(0.75, 0.0, 0.0), &FaceIdentifier::from_bits(ConeFrustum::FACE_INNER_SIDE))
            .unwrap();
        assert_relative_eq!(n, -Vector3::new(1.0, 0.0, 0.25).normalize(), epsilon = 1e-12);
    }

    #[test]
    fn quarter_wedge() {
        let c = hollow().with_angle(0.0, PI / 2.0).unwrap();
        assert_eq!(c.face_bits().len(), 6);
        assert!(c.is_outside(&Point3::new(-1.0, 0.0, 0.0), 1e-6).unwrap());
        assert!(c.is_inside(&Point3::new(0.7, 0.7, 0.0), 1e-6).unwrap());
        assert_relative_eq!(c.volume().unwrap(), 3.5 * PI / 4.0, epsilon = 1e-12);
        assert_relative_eq!(
            c.surface(&FaceIdentifier::from_bits(ConeFrustum::FACE_START_ANGLE)).unwrap(),
            1.5,
            epsilon = 1e-12
        );
        let hits = c.intercepts(&Point3::new(1.2, -3.0, 0.0), &Vector3::y(), 1e-9).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        assert_eq!(hits[0].face.bits(), ConeFrustum::FACE_START_ANGLE);
        assert_relative_eq!(hits[0].distance, 3.0, epsilon = 1e-12);
        assert_eq!(hits[1].face.bits(), ConeFrustum::FACE_OUTER_SIDE);
        assert_relative_eq!(hits[1].distance, 3.9, epsilon = 1e-9);
    }

    #[test]
    fn wedge_patches_agree_with_the_solid() {
        let c = hollow().with_angle(0.4, 2.5).unwrap();
        let mut faces = Vec::new();
        assert_eq!(c.compute_faces(&mut faces).unwrap(), 6);
        for face in &faces {
            for (p, _) in face.samples(4).unwrap() {
                assert_eq!(c.on_surface(&p, &face.id, 1e-9).unwrap(), face.id, "{}", face.id);
            }
            let d = face.surface.domain();
            let (u, v) = (0.5 * (d.u_min + d.u_max), 0.5 * (d.v_min + d.v_max));
            let p = face.placement.child_to_mother(&face.surface.evaluate(u, v).unwrap()).unwrap();
            assert_relative_eq!(face.outward_normal(u, v).unwrap(), c.face_normal(&p, face.id.bits()), epsilon = 1e-9);
            let area: f64 = face.samples(8).unwrap().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(
                area,
                c.face_area(face.id.bits(), &MeasureOptions::default()).unwrap(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn wedge_wires_follow_both_sides() {
        let mut out = Vec::new();
        hollow()
            .with_angle(0.0, PI)
            .unwrap()
            .generate_wires_self(&mut out, &WireOptions::default())
            .unwrap();
        assert_eq!(out.len(), 4 + 5 * 2);
        assert!(out.iter().flat_map(|w| &w.points).all(|p| p.y >= -1e-12));
    }

    #[test]
    fn wires_skip_missing_caps() {
        let mut out = Vec::new();
        apex_up().generate_wires_self(&mut out, &WireOptions::default()).unwrap();
        assert_eq!(out.len(), 1 + 4);
    }

    #[test]
    fn configure_reads_outer_radii() {
        let mut props = Properties::new();
        props
            .set_real("outer_bottom_r", 2.0)
            .set_real("outer_top_r", 1.0)
            .set_real("z", 2.0);
        let mut c = ConeFrustum::default();
        c.configure(&props).unwrap();
        assert_eq!(c, frustum());

        props.set_real("inner_bottom_r", 1.0).set_real("delta_angle", 90.0);
        c.configure(&props).unwrap();
        assert_relative_eq!(c.inner_bottom_r(), 1.0);
        assert_relative_eq!(c.inner_top_r(), 0.0);
        assert_relative_eq!(c.angle().delta(), PI / 2.0, epsilon = 1e-12);
    }
}
