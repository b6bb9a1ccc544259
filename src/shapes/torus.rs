use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{self, Annulus, FaceInfo, FaceSurface, Surface, SurfaceDomain};
use crate::math::roots::{bracketed_roots, solve_quadratic};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::placement::Placement;
use crate::tessellation::{parametric, Polyline, WireOptions};

use super::primitive::{impl_solid_for_primitive, non_negative, positive, radial, rho, Primitive};
use super::sector::{
    arc, meridian_frame, outside, read_range, side_face_distance, side_hits, side_normal, wedge_depth, AngularRange,
};
use super::MeasureOptions;

/// Samples per ray when bracketing torus roots.
const ROOT_SAMPLES: usize = 128;

const PHI_KEYS: (&str, &str) = ("start_phi", "delta_phi");

/// A torus about the z axis: a tube of radius `outside_radius` swept along a
/// circle of radius `sweep_radius`, optionally hollowed down to
/// `inside_radius` and cut to the azimuths `phi`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    sweep_radius: f64,
    outside_radius: f64,
    inside_radius: f64,
    phi: AngularRange,
}

impl Torus {
    pub const FACE_OUTSIDE: u32 = 0x1;
    pub const FACE_INSIDE: u32 = 0x2;
    pub const FACE_START_PHI: u32 = 0x4;
    pub const FACE_STOP_PHI: u32 = 0x8;

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless
    /// `0 <= inside_radius < outside_radius < sweep_radius`.
    pub fn new(sweep_radius: f64, outside_radius: f64, inside_radius: f64) -> std::result::Result<Self, ShapeError> {
        let sweep_radius = positive("torus", "sweep_radius", sweep_radius)?;
        let outside_radius = positive("torus", "outside_radius", outside_radius)?;
        let inside_radius = non_negative("torus", "inside_radius", inside_radius)?;
        if outside_radius >= sweep_radius {
            return Err(ShapeError::InvalidParameter {
                shape: "torus",
                parameter: "outside_radius",
                value: outside_radius,
            });
        }
        if inside_radius >= outside_radius {
            return Err(ShapeError::InvalidParameter {
                shape: "torus",
                parameter: "inside_radius",
                value: inside_radius,
            });
        }
        Ok(Self {
            sweep_radius,
            outside_radius,
            inside_radius,
            phi: AngularRange::full_turn(),
        })
    }

    /// Keeps the azimuths in `[start, start + delta]`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `0 <= start < 2π` and
    /// `0 < delta <= 2π - start`.
    pub fn with_phi(mut self, start: f64, delta: f64) -> std::result::Result<Self, ShapeError> {
        self.phi = AngularRange::checked("torus", PHI_KEYS, TAU, start, delta)?;
        Ok(self)
    }

    #[must_use]
    pub fn sweep_radius(&self) -> f64 {
        self.sweep_radius
    }

    #[must_use]
    pub fn outside_radius(&self) -> f64 {
        self.outside_radius
    }

    #[must_use]
    pub fn inside_radius(&self) -> f64 {
        self.inside_radius
    }

    #[must_use]
    pub fn phi(&self) -> &AngularRange {
        &self.phi
    }

    #[must_use]
    pub fn has_inner_face(&self) -> bool {
        self.inside_radius > 0.0
    }

    /// Reads `sweep_radius`, `outside_radius`, the optional `inside_radius`
    /// and the optional `start_phi`/`delta_phi`.
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        let mut torus = Self::new(
            properties.length("sweep_radius")?,
            properties.length("outside_radius")?,
            properties.length_opt("inside_radius")?.unwrap_or(0.0),
        )?;
        if let Some(phi) = read_range(properties, "torus", PHI_KEYS, TAU)? {
            torus.phi = phi;
        }
        *self = torus;
        Ok(())
    }

    /// Distance from `p` to the tube centre circle.
    fn tube_distance(&self, p: &Point3) -> f64 {
        (rho(p) - self.sweep_radius).hypot(p.z)
    }

    fn tubes(&self) -> Vec<(f64, u32)> {
        let mut tubes = vec![(self.outside_radius, Self::FACE_OUTSIDE)];
        if self.has_inner_face() {
            tubes.push((self.inside_radius, Self::FACE_INSIDE));
        }
        tubes
    }

    /// Signed depth of the tube cross-section in the `(rho, z)` half-plane.
    fn section_depth(&self, r: f64, z: f64) -> f64 {
        let q = (r - self.sweep_radius).hypot(z);
        if self.has_inner_face() {
            (self.outside_radius - q).min(q - self.inside_radius)
        } else {
            self.outside_radius - q
        }
    }
}

impl Primitive for Torus {
    const NAME: &'static str = "torus";

    fn is_configured(&self) -> bool {
        self.sweep_radius > self.outside_radius && self.outside_radius > self.inside_radius && self.inside_radius >= 0.0
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        let mut bits: Vec<u32> = self.tubes().into_iter().map(|(_, bit)| bit).collect();
        if self.phi.is_partial_turn() {
            bits.extend([Self::FACE_START_PHI, Self::FACE_STOP_PHI]);
        }
        bits
    }

    fn depth(&self, p: &Point3) -> f64 {
        self.section_depth(rho(p), p.z).min(wedge_depth(&self.phi, p))
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let q = self.tube_distance(p);
        match bit {
            Self::FACE_OUTSIDE => (q - self.outside_radius).abs().hypot(outside(wedge_depth(&self.phi, p))),
            Self::FACE_INSIDE => (q - self.inside_radius).abs().hypot(outside(wedge_depth(&self.phi, p))),
            Self::FACE_START_PHI => side_face_distance(p, self.phi.start(), |r, z| self.section_depth(r, z)),
            Self::FACE_STOP_PHI => side_face_distance(p, self.phi.stop(), |r, z| self.section_depth(r, z)),
            _ => f64::INFINITY,
        }
    }

    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3 {
        let radial_dir = radial(p);
        let off = radial_dir * (rho(p) - self.sweep_radius) + Vector3::z() * p.z;
        let n = off.try_normalize(TOLERANCE).unwrap_or(radial_dir);
        match bit {
            Self::FACE_INSIDE => -n,
            Self::FACE_START_PHI => side_normal(self.phi.start(), false),
            Self::FACE_STOP_PHI => side_normal(self.phi.stop(), true),
            _ => n,
        }
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        // Only the stretch of the ray inside the bounding sphere can cross.
        let reach = self.sweep_radius + self.outside_radius;
        let span = solve_quadratic(
            dir.norm_squared(),
            2.0 * from.coords.dot(dir),
            from.coords.norm_squared() - reach * reach,
        );
        let (t0, t1) = match span.as_slice() {
            [t0, t1] => (*t0, *t1),
            _ => return Vec::new(),
        };
        // Tangent entry points sit exactly on the sphere; widen so they bracket.
        let pad = 1e-3 * (t1 - t0) + TOLERANCE;
        let (t0, t1) = (t0 - pad, t1 + pad);
        let tol = 1e-9 * self.sweep_radius;
        let mut hits = Vec::new();
        for (radius, bit) in self.tubes() {
            let g = |t: f64| self.tube_distance(&(from + dir * t)) - radius;
            hits.extend(
                bracketed_roots(g, t0, t1, ROOT_SAMPLES)
                    .into_iter()
                    .filter(|t| wedge_depth(&self.phi, &(from + dir * *t)) >= -tol)
                    .map(|t| (t, bit)),
            );
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
        self.phi.delta() * self.sweep_radius * PI * (self.outside_radius.powi(2) - self.inside_radius.powi(2))
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        Ok(match bit {
            Self::FACE_OUTSIDE => TAU * self.outside_radius * self.sweep_radius * self.phi.delta(),
            Self::FACE_INSIDE => TAU * self.inside_radius * self.sweep_radius * self.phi.delta(),
            _ => PI * (self.outside_radius.powi(2) - self.inside_radius.powi(2)),
        })
    }

    fn aabb(&self) -> Aabb {
        let reach = self.sweep_radius + self.outside_radius;
        Aabb::centered(Vector3::new(reach, reach, self.outside_radius))
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let mut faces: Vec<FaceInfo> = self
            .tubes()
            .into_iter()
            .map(|(radius, bit)| {
                let patch = FaceSurface::Torus(surface::Torus::new(self.sweep_radius, radius));
                let domain = SurfaceDomain {
                    u_min: self.phi.start(),
                    u_max: self.phi.stop(),
                    ..patch.domain()
                };
                let face = FaceInfo::new(FaceIdentifier::from_bits(bit), Placement::identity(), patch.trimmed(domain));
                if bit == Self::FACE_INSIDE {
                    face.flipped()
                } else {
                    face
                }
            })
            .collect();
        if self.phi.is_partial_turn() {
            for (c, bit, stop) in [
                (self.phi.start(), Self::FACE_START_PHI, false),
                (self.phi.stop(), Self::FACE_STOP_PHI, true),
            ] {
                let face = FaceInfo::new(
                    FaceIdentifier::from_bits(bit),
                    meridian_frame(c, self.sweep_radius),
                    FaceSurface::Annulus(Annulus::new(self.inside_radius, self.outside_radius)),
                );
                faces.push(if stop { face.flipped() } else { face });
            }
        }
        faces
    }

    fn wires(&self, options: &WireOptions) -> Vec<Polyline> {
        let segments = options.sampling.segments();
        let rings = options.sampling.rings();
        let sweep = self.sweep_radius;
        let mut out = Vec::new();
        for (radius, _) in self.tubes() {
            for k in 0..rings {
                #[allow(clippy::cast_precision_loss)]
                let v = TAU * k as f64 / rings as f64;
                out.push(arc(sweep + radius * v.cos(), radius * v.sin(), &self.phi, segments));
            }
            for u in self.phi.angles(rings) {
                out.push(parametric(
                    |v| {
                        let r = sweep + radius * v.cos();
                        Point3::new(r * u.cos(), r * u.sin(), radius * v.sin())
                    },
                    0.0,
                    TAU,
                    segments / 2,
                    true,
                ));
            }
        }
        out
    }
}

impl_solid_for_primitive!(Torus);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::shapes::{Solid, WireRenderable};

    fn ring() -> Torus {
        Torus::new(3.0, 1.0, 0.0).unwrap()
    }

    #[test]
    fn rejects_self_intersecting_tubes() {
        assert!(Torus::new(1.0, 1.0, 0.0).is_err());
        assert!(Torus::new(3.0, 1.0, 1.0).is_err());
        assert!(Torus::new(3.0, 1.0, -0.5).is_err());
    }

    #[test]
    fn the_hole_is_outside() {
        let t = ring();
        assert!(t.is_outside(&Point3::origin(), 1e-6).unwrap());
        assert!(t.is_inside(&Point3::new(3.0, 0.0, 0.0), 1e-6).unwrap());
        assert!(t.is_inside(&Point3::new(0.0, -3.5, 0.5), 1e-6).unwrap());
        assert!(t.is_outside(&Point3::new(3.0, 0.0, 1.2), 1e-6).unwrap());
    }

    #[test]
    fn ray_through_both_sides_of_the_ring() {
        let hits = ring().intercepts(&Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 1e-6).unwrap();
        let d: Vec<f64> = hits.iter().map(|h| h.distance).collect();
        assert_eq!(d.len(), 4);
        for (got, want) in d.iter().zip([1.0, 3.0, 7.0, 9.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-8);
        }
        assert!(hits.iter().all(|h| h.face.bits() == Torus::FACE_OUTSIDE));
    }

    #[test]
    fn vertical_ray_through_the_tube() {
        let hits = ring().intercepts(&Point3::new(3.0, 0.0, -5.0), &Vector3::z(), 1e-6).unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-8);
        assert_relative_eq!(hits[1].distance, 6.0, epsilon = 1e-8);
    }

    #[test]
    fn thin_tube_is_not_skipped() {
        let t = Torus::new(10.0, 0.05, 0.0).unwrap();
        let hits = t.intercepts(&Point3::new(-20.0, 0.0, 0.0), &Vector3::x(), 1e-9).unwrap();
        let d: Vec<f64> = hits.iter().map(|h| h.distance).collect();
        assert_eq!(d.len(), 4, "{d:?}");
        for (got, want) in d.iter().zip([9.95, 10.05, 29.95, 30.05]) {
            assert_relative_eq!(*got, want, epsilon = 1e-8);
        }
    }

    #[test]
    fn grazing_ray_keeps_both_crossings() {
        let t = ring();
        let z = 0.9999;
        let hits = t.intercepts(&Point3::new(-5.0, 0.0, z), &Vector3::x(), 1e-9).unwrap();
        let w = (1.0 - z * z).sqrt();
        let want = [2.0 - w, 2.0 + w, 8.0 - w, 8.0 + w];
        assert_eq!(hits.len(), 4, "{hits:?}");
        for (hit, want) in hits.iter().zip(want) {
            assert_relative_eq!(hit.distance, want, epsilon = 1e-6);
            assert!(t.face_distance(&hit.impact, Torus::FACE_OUTSIDE) < 1e-6);
        }
    }

    #[test]
    fn distance_follows_the_direction_length() {
        let hits = ring()
            .intercepts(&Point3::new(3.0, 0.0, -5.0), &Vector3::new(0.0, 0.0, 1e-4), 1e-9)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 4.0e4, max_relative = 1e-8);
        assert_relative_eq!(hits[1].distance, 6.0e4, max_relative = 1e-8);
        assert_relative_eq!(hits[1].impact, Point3::new(3.0, 0.0, 1.0), epsilon = 1e-8);
    }

    #[test]
    fn half_ring() {
        let t = Torus::new(3.0, 1.0, 0.5).unwrap().with_phi(0.0, PI).unwrap();
        assert_eq!(t.face_bits().len(), 4);
        assert!(t.is_inside(&Point3::new(0.0, 3.0, 0.75), 1e-6).unwrap());
        assert!(t.is_outside(&Point3::new(0.0, -3.0, 0.75), 1e-6).unwrap());
        assert_relative_eq!(t.volume().unwrap(), PI * PI * 3.0 * 0.75, max_relative = 1e-12);
        assert_relative_eq!(
            t.surface(&FaceIdentifier::from_bits(Torus::FACE_START_PHI)).unwrap(),
            PI * 0.75,
            max_relative = 1e-12
        );

        let hits = t.intercepts(&Point3::new(3.75, -2.0, 0.0), &Vector3::y(), 1e-9).unwrap();
        assert_eq!(hits.len(), 2, "{hits:?}");
        assert_eq!(hits[0].face.bits(), Torus::FACE_START_PHI);
        assert_relative_eq!(hits[0].distance, 2.0, epsilon = 1e-12);
        assert_eq!(hits[1].face.bits(), Torus::FACE_OUTSIDE);
        let n = t
            .normal_on_surface(&Point3::new(-3.75, 0.0, 0.0), &FaceIdentifier::from_bits(Torus::FACE_STOP_PHI))
            .unwrap();
        assert_relative_eq!(n, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn sector_patches_agree_with_the_solid() {
        let t = Torus::new(3.0, 1.0, 0.5).unwrap().with_phi(0.5, 2.0).unwrap();
        let mut faces = Vec::new();
        assert_eq!(t.compute_faces(&mut faces).unwrap(), 4);
        for face in &faces {
            for (p, _) in face.samples(4).unwrap() {
                assert_eq!(t.on_surface(&p, &face.id, 1e-9).unwrap(), face.id, "{}", face.id);
            }
            let d = face.surface.domain();
            let (u, v) = (0.5 * (d.u_min + d.u_max), 0.5 * (d.v_min + d.v_max));
            let p = face.placement.child_to_mother(&face.surface.evaluate(u, v).unwrap()).unwrap();
            assert_relative_eq!(face.outward_normal(u, v).unwrap(), t.face_normal(&p, face.id.bits()), epsilon = 1e-9);
            let area: f64 = face.samples(24).unwrap().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(
                area,
                t.face_area(face.id.bits(), &MeasureOptions::default()).unwrap(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn ray_missing_the_bounding_sphere() {
        assert!(ring().intercepts(&Point3::new(-5.0, 0.0, 10.0), &Vector3::x(), 1e-6).unwrap().is_empty());
    }

    #[test]
    fn normals() {
        let t = Torus::new(3.0, 1.0, 0.5).unwrap();
        let outer = FaceIdentifier::from_bits(Torus::FACE_OUTSIDE);
        let top = Point3::new(3.0, 0.0, 1.0);
        assert_relative_eq!(t.normal_on_surface(&top, &outer).unwrap(), Vector3::z(), epsilon = 1e-12);
        let inner = FaceIdentifier::from_bits(Torus::FACE_INSIDE);
        let p = Point3::new(3.5, 0.0, 0.0);
        assert_eq!(t.on_surface(&p, &FaceIdentifier::any(), 1e-6).unwrap(), inner);
        assert_relative_eq!(t.normal_on_surface(&p, &inner).unwrap(), -Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn measures() {
        let t = Torus::new(3.0, 1.0, 0.5).unwrap();
        assert_relative_eq!(t.volume().unwrap(), 2.0 * PI * PI * 3.0 * 0.75, max_relative = 1e-12);
        assert_relative_eq!(
            t.surface(&FaceIdentifier::any()).unwrap(),
            4.0 * PI * PI * 3.0 * 1.5,
            max_relative = 1e-12
        );
        let mut faces = Vec::new();
        assert_eq!(t.compute_faces(&mut faces).unwrap(), 2);
        for face in &faces {
            let area: f64 = face.samples(24).unwrap().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(area, t.face_area(face.id.bits(), &MeasureOptions::default()).unwrap(), max_relative = 1e-9);
        }
    }

    #[test]
    fn wires() {
        let mut out = Vec::new();
        ring().generate_wires_self(&mut out, &WireOptions::default()).unwrap();
        assert_eq!(out.len(), 8);
        assert!(out.iter().flat_map(|w| &w.points).all(|p| (ring().tube_distance(p) - 1.0).abs() < 1e-12));
    }

    #[test]
    fn configure_without_inside_radius() {
        let mut props = Properties::new();
        props.set_real("sweep_radius", 3.0).set_real("outside_radius", 1.0);
        let mut t = Torus::default();
        t.configure(&props).unwrap();
        assert_eq!(t, ring());

        props.set_real("start_phi", 90.0).set_real("delta_phi", 180.0);
        t.configure(&props).unwrap();
        assert_relative_eq!(t.phi().start(), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(t.phi().stop(), 1.5 * PI, epsilon = 1e-12);
    }
}
