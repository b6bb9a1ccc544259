use serde::{Deserialize, Serialize};

use crate::bounding::Aabb;
use crate::config::Properties;
use crate::error::{Result, ShapeError};
use crate::face::FaceIdentifier;
use crate::geometry::surface::{FaceInfo, FaceSurface, Rectangle};
use crate::math::{Point3, Vector3};
use crate::placement::{Axis, Placement};
use crate::tessellation::{Polyline, WireOptions};

use super::primitive::{impl_solid_for_primitive, positive, Primitive};
use super::MeasureOptions;

/// A rectangular box centred on the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    x: f64,
    y: f64,
    z: f64,
}

impl BoxShape {
    /// Face at `-x`.
    pub const FACE_BACK: u32 = 0x1;
    /// Face at `+x`.
    pub const FACE_FRONT: u32 = 0x2;
    /// Face at `-y`.
    pub const FACE_LEFT: u32 = 0x4;
    /// Face at `+y`.
    pub const FACE_RIGHT: u32 = 0x8;
    /// Face at `-z`.
    pub const FACE_BOTTOM: u32 = 0x10;
    /// Face at `+z`.
    pub const FACE_TOP: u32 = 0x20;

    const FACES: [u32; 6] = [
        Self::FACE_BACK,
        Self::FACE_FRONT,
        Self::FACE_LEFT,
        Self::FACE_RIGHT,
        Self::FACE_BOTTOM,
        Self::FACE_TOP,
    ];

    /// Creates a box with full edge lengths `x`, `y`, `z`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless every length is positive.
    pub fn new(x: f64, y: f64, z: f64) -> std::result::Result<Self, ShapeError> {
        Ok(Self {
            x: positive("box", "x", x)?,
            y: positive("box", "y", y)?,
            z: positive("box", "z", z)?,
        })
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `x` is positive.
    pub fn set_x(&mut self, x: f64) -> std::result::Result<(), ShapeError> {
        self.x = positive("box", "x", x)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `y` is positive.
    pub fn set_y(&mut self, y: f64) -> std::result::Result<(), ShapeError> {
        self.y = positive("box", "y", y)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidParameter`] unless `z` is positive.
    pub fn set_z(&mut self, z: f64) -> std::result::Result<(), ShapeError> {
        self.z = positive("box", "z", z)?;
        Ok(())
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    fn half(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z) * 0.5
    }

    /// Reads `x`, `y` and `z` (lengths, default unit from `length_unit`).
    ///
    /// # Errors
    ///
    /// Propagates missing keys, unit errors and invalid values.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        *self = Self::new(
            properties.length("x")?,
            properties.length("y")?,
            properties.length("z")?,
        )?;
        Ok(())
    }

    /// Axis index and sign of a face.
    fn face_axis(bit: u32) -> (usize, f64) {
        match bit {
            Self::FACE_BACK => (0, -1.0),
            Self::FACE_FRONT => (0, 1.0),
            Self::FACE_LEFT => (1, -1.0),
            Self::FACE_RIGHT => (1, 1.0),
            Self::FACE_BOTTOM => (2, -1.0),
            _ => (2, 1.0),
        }
    }

    /// Corners of face `bit`.
    fn face_loop(&self, bit: u32) -> Vec<Point3> {
        let h = self.half();
        let (axis, sign) = Self::face_axis(bit);
        let (a, b) = ((axis + 1) % 3, (axis + 2) % 3);
        [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .iter()
            .map(|(sa, sb)| {
                let mut p = Point3::origin();
                p[axis] = sign * h[axis];
                p[a] = sa * h[a];
                p[b] = sign * sb * h[b];
                p
            })
            .collect()
    }
}

impl Primitive for BoxShape {
    const NAME: &'static str = "box";

    fn is_configured(&self) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.z > 0.0
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn face_bits(&self) -> Vec<u32> {
        Self::FACES.to_vec()
    }

    fn depth(&self, p: &Point3) -> f64 {
        let h = self.half();
        (h.x - p.x.abs()).min(h.y - p.y.abs()).min(h.z - p.z.abs())
    }

    fn face_distance(&self, p: &Point3, bit: u32) -> f64 {
        let h = self.half();
        let (axis, sign) = Self::face_axis(bit);
        let mut d2 = (p[axis] - sign * h[axis]).powi(2);
        for other in (0..3).filter(|i| *i != axis) {
            let over = (p[other].abs() - h[other]).max(0.0);
            d2 += over * over;
        }
        d2.sqrt()
    }

    fn face_normal(&self, _p: &Point3, bit: u32) -> Vector3 {
        let (axis, sign) = Self::face_axis(bit);
        let mut n = Vector3::zeros();
        n[axis] = sign;
        n
    }

    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)> {
        let h = self.half();
        let tol = 1e-9 * h.max();
        Self::FACES
            .iter()
            .filter_map(|&bit| {
                let (axis, sign) = Self::face_axis(bit);
                if dir[axis] == 0.0 {
                    return None;
                }
                let t = (sign * h[axis] - from[axis]) / dir[axis];
                let p = from + dir * t;
                (0..3)
                    .filter(|i| *i != axis)
                    .all(|i| p[i].abs() <= h[i] + tol)
                    .then_some((t, bit))
            })
            .collect()
    }

    fn enclosed_volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    fn face_area(&self, bit: u32, _options: &MeasureOptions) -> Result<f64> {
        let (axis, _) = Self::face_axis(bit);
        Ok(match axis {
            0 => self.y * self.z,
            1 => self.x * self.z,
            _ => self.x * self.y,
        })
    }

    fn aabb(&self) -> Aabb {
        Aabb::centered(self.half())
    }

    fn faces(&self) -> Vec<FaceInfo> {
        let h = self.half();
        let quarter = std::f64::consts::FRAC_PI_2;
        // Each rectangle lies in z = 0 with normal +z; rotate it onto its face.
        let frames = [
            (Self::FACE_BACK, Placement::from_euler_zyz(Vector3::new(-h.x, 0.0, 0.0), 0.0, -quarter, 0.0), h.z, h.y),
            (Self::FACE_FRONT, Placement::from_euler_zyz(Vector3::new(h.x, 0.0, 0.0), 0.0, quarter, 0.0), h.z, h.y),
            (Self::FACE_LEFT, Placement::from_axis_angle(Vector3::new(0.0, -h.y, 0.0), Axis::X, quarter), h.x, h.z),
            (Self::FACE_RIGHT, Placement::from_axis_angle(Vector3::new(0.0, h.y, 0.0), Axis::X, -quarter), h.x, h.z),
            (Self::FACE_BOTTOM, Placement::from_axis_angle(Vector3::new(0.0, 0.0, -h.z), Axis::X, std::f64::consts::PI), h.x, h.y),
            (Self::FACE_TOP, Placement::from_translation(Vector3::new(0.0, 0.0, h.z)), h.x, h.y),
        ];
        frames
            .into_iter()
            .map(|(bit, placement, hu, hv)| {
                FaceInfo::new(
                    FaceIdentifier::from_bits(bit),
                    placement,
                    FaceSurface::Rectangle(Rectangle::new(hu, hv)),
                )
            })
            .collect()
    }

    fn wires(&self, _options: &WireOptions) -> Vec<Polyline> {
        Self::FACES
            .iter()
            .map(|&bit| Polyline::closed(self.face_loop(bit)))
            .collect()
    }
}

impl_solid_for_primitive!(BoxShape);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::face::EdgeProximity;
    use crate::geometry::surface::Surface;
    use crate::shapes::{Solid, WireRenderable};

    fn cube() -> BoxShape {
        BoxShape::new(2.0, 2.0, 2.0).unwrap()
    }

    #[test]
    fn rejects_non_positive_lengths() {
        assert!(matches!(
            BoxShape::new(0.0, 1.0, 1.0),
            Err(ShapeError::InvalidParameter { parameter: "x", .. })
        ));
        assert!(BoxShape::new(1.0, -1.0, 1.0).is_err());
        assert!(!BoxShape::default().is_valid());
    }

    #[test]
    fn inside_outside_with_skin() {
        let b = cube();
        assert!(b.is_inside(&Point3::origin(), 0.0).unwrap());
        assert!(b.is_inside(&Point3::new(1.0, 0.0, 0.0), 0.0).unwrap());
        assert!(!b.is_inside(&Point3::new(1.0, 0.0, 0.0), 0.1).unwrap());
        assert!(!b.is_outside(&Point3::new(1.0, 0.0, 0.0), 0.1).unwrap());
        assert!(b.is_outside(&Point3::new(1.2, 0.0, 0.0), 0.1).unwrap());
    }

    #[test]
    fn on_surface_identifies_faces() {
        let b = cube();
        let any = FaceIdentifier::any();
        assert_eq!(
            b.on_surface(&Point3::new(0.0, 0.0, 1.0), &any, 0.01).unwrap(),
            FaceIdentifier::from_bits(BoxShape::FACE_TOP)
        );
        assert_eq!(
            b.on_surface(&Point3::new(-1.0, 0.5, 0.2), &any, 0.01).unwrap(),
            FaceIdentifier::from_bits(BoxShape::FACE_BACK)
        );
        assert!(b.on_surface(&Point3::origin(), &any, 0.01).unwrap().is_none());
        let mask = FaceIdentifier::from_bits(BoxShape::FACE_BOTTOM);
        assert!(b.on_surface(&Point3::new(0.0, 0.0, 1.0), &mask, 0.01).unwrap().is_none());
    }

    #[test]
    fn normals_point_outward() {
        let b = cube();
        let n = b
            .normal_on_surface(&Point3::new(0.0, 1.0, 0.0), &FaceIdentifier::from_bits(BoxShape::FACE_RIGHT))
            .unwrap();
        assert_relative_eq!(n, Vector3::y());
        assert!(b.normal_on_surface(&Point3::origin(), &FaceIdentifier::from_bits(3)).is_err());
        assert!(b.normal_on_surface(&Point3::origin(), &FaceIdentifier::from_bits(0x40)).is_err());
    }

    #[test]
    fn ray_through_the_box() {
        let b = cube();
        let hits = b
            .intercepts(&Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 1e-6)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-12);
        assert_eq!(hits[0].face.bits(), BoxShape::FACE_BACK);
        assert_eq!(hits[1].face.bits(), BoxShape::FACE_FRONT);
        assert_eq!(hits[0].proximity, EdgeProximity::OnFace);
    }

    #[test]
    fn ray_through_an_edge() {
        let b = cube();
        let dir = Vector3::new(1.0, 1.0, 0.0);
        let hits = b.intercepts(&Point3::new(-3.0, -3.0, 0.0), &dir, 1e-6).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].proximity, EdgeProximity::OnEdge);
    }

    #[test]
    fn missing_ray() {
        let b = cube();
        assert!(b
            .find_intercept(&Point3::new(-5.0, 3.0, 0.0), &Vector3::x(), 0.0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn measures() {
        let b = BoxShape::new(1.0, 2.0, 3.0).unwrap();
        assert_relative_eq!(b.volume().unwrap(), 6.0);
        assert_relative_eq!(b.surface(&FaceIdentifier::any()).unwrap(), 22.0);
        assert_relative_eq!(
            b.surface(&FaceIdentifier::from_bits(BoxShape::FACE_TOP | BoxShape::FACE_BOTTOM)).unwrap(),
            4.0
        );
    }

    #[test]
    fn faces_sit_on_the_boundary() {
        let b = BoxShape::new(1.0, 2.0, 3.0).unwrap();
        let mut faces = Vec::new();
        assert_eq!(b.compute_faces(&mut faces).unwrap(), 6);
        for face in &faces {
            let area: f64 = face.samples(2).unwrap().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(area, b.face_area(face.id.bits(), &MeasureOptions::default()).unwrap(), epsilon = 1e-9);
            for (p, _) in face.samples(3).unwrap() {
                assert_eq!(b.on_surface(&p, &face.id, 1e-9).unwrap(), face.id);
            }
            let d = face.surface.domain();
            let n = face.outward_normal(d.u_min, d.v_min).unwrap();
            assert_relative_eq!(n, b.face_normal(&Point3::origin(), face.id.bits()), epsilon = 1e-12);
        }
    }

    #[test]
    fn wires_are_face_loops() {
        let mut out = Vec::new();
        cube().generate_wires_self(&mut out, &WireOptions::default()).unwrap();
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|w| w.closed && w.len() == 4));
    }

    #[test]
    fn configure_with_units() {
        let mut props = Properties::new();
        props.set_text("length_unit", "cm").set_real("x", 1.0).set_real("y", 2.0).set_length("z", 5.0);
        let mut b = BoxShape::default();
        b.configure(&props).unwrap();
        assert_relative_eq!(b.x(), 10.0);
        assert_relative_eq!(b.y(), 20.0);
        assert_relative_eq!(b.z(), 5.0);
    }
}
