//! Shared machinery for the primitive solids.
//!
//! Each primitive describes itself through [`Primitive`] (signed depth,
//! per-face distance, normals and ray roots) and gets its [`Solid`] and
//! [`WireRenderable`] implementations from [`impl_solid_for_primitive!`].
//!
//! [`Solid`]: super::Solid
//! [`WireRenderable`]: super::WireRenderable

use crate::bounding::Aabb;
use crate::error::{Result, ShapeError};
use crate::face::{EdgeProximity, FaceIdentifier, FaceInterceptInfo};
use crate::geometry::surface::FaceInfo;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::tessellation::{Polyline, WireOptions};

use super::MeasureOptions;

pub(crate) trait Primitive {
    /// Type identifier, also used in diagnostics.
    const NAME: &'static str;

    fn is_configured(&self) -> bool;

    fn clear(&mut self);

    /// Face bits this primitive currently has.
    fn face_bits(&self) -> Vec<u32>;

    /// Signed depth of `p`: positive inside, negative outside.
    fn depth(&self, p: &Point3) -> f64;

    /// Distance from `p` to the bounded face `bit`.
    fn face_distance(&self, p: &Point3, bit: u32) -> f64;

    /// Outward unit normal of face `bit` at (or near) `p`.
    fn face_normal(&self, p: &Point3, bit: u32) -> Vector3;

    /// Ray parameters where `from + t dir` crosses each face, any sign of `t`.
    fn face_hits(&self, from: &Point3, dir: &Vector3) -> Vec<(f64, u32)>;

    fn enclosed_volume(&self) -> f64;

    fn face_area(&self, bit: u32, options: &MeasureOptions) -> Result<f64>;

    fn aabb(&self) -> Aabb;

    fn faces(&self) -> Vec<FaceInfo>;

    fn wires(&self, options: &WireOptions) -> Vec<Polyline>;
}

pub(crate) fn ensure_valid<P: Primitive>(shape: &P) -> Result<()> {
    if shape.is_configured() {
        Ok(())
    } else {
        Err(ShapeError::InvalidShape(P::NAME).into())
    }
}

/// Half skin, never below [`TOLERANCE`] so exact boundary points register.
fn half_skin(skin: f64) -> f64 {
    (0.5 * skin).max(TOLERANCE)
}

pub(crate) fn is_inside<P: Primitive>(shape: &P, p: &Point3, skin: f64) -> Result<bool> {
    ensure_valid(shape)?;
    Ok(shape.depth(p) >= 0.5 * skin)
}

pub(crate) fn is_outside<P: Primitive>(shape: &P, p: &Point3, skin: f64) -> Result<bool> {
    ensure_valid(shape)?;
    Ok(shape.depth(p) < -0.5 * skin)
}

pub(crate) fn on_surface<P: Primitive>(
    shape: &P,
    p: &Point3,
    mask: &FaceIdentifier,
    skin: f64,
) -> Result<FaceIdentifier> {
    ensure_valid(shape)?;
    let tol = half_skin(skin);
    Ok(shape
        .face_bits()
        .into_iter()
        .map(FaceIdentifier::from_bits)
        .find(|id| mask.matches(id) && shape.face_distance(p, id.bits()) <= tol)
        .unwrap_or_else(FaceIdentifier::none))
}

pub(crate) fn normal_on_surface<P: Primitive>(
    shape: &P,
    p: &Point3,
    face: &FaceIdentifier,
) -> Result<Vector3> {
    ensure_valid(shape)?;
    if !face.is_unique() || !face.parts().is_empty() || !shape.face_bits().contains(&face.bits()) {
        return Err(ShapeError::InvalidFace {
            shape: P::NAME,
            face: face.to_string(),
        }
        .into());
    }
    Ok(shape.face_normal(p, face.bits()))
}

/// `dir` scaled to unit length, with its original length.
///
/// `None` for a zero, subnormal or non-finite direction.
pub(crate) fn unit_direction(dir: &Vector3) -> Option<(Vector3, f64)> {
    let speed = dir.norm();
    (speed.is_finite() && speed >= f64::MIN_POSITIVE).then(|| (dir / speed, speed))
}

pub(crate) fn intercepts<P: Primitive>(
    shape: &P,
    from: &Point3,
    dir: &Vector3,
    skin: f64,
) -> Result<Vec<FaceInterceptInfo>> {
    ensure_valid(shape)?;
    let Some((unit, speed)) = unit_direction(dir) else {
        tracing::trace!(shape = P::NAME, "zero-length ray direction");
        return Ok(Vec::new());
    };

    // Roots are solved along the unit direction and reported in units of `dir`.
    let mut hits: Vec<(f64, u32)> = shape
        .face_hits(from, &unit)
        .into_iter()
        .filter(|(s, _)| s.is_finite() && *s >= 0.0)
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));

    let merge = skin.max(TOLERANCE);
    let tol = half_skin(skin).max(1e-9);
    let bits = shape.face_bits();
    let mut last: Option<f64> = None;
    let mut out: Vec<FaceInterceptInfo> = Vec::with_capacity(hits.len());
    for (s, bit) in hits {
        if last.is_some_and(|prev| s - prev <= merge) {
            continue;
        }
        last = Some(s);
        let impact = from + unit * s;
        let count = bits
            .iter()
            .filter(|b| shape.face_distance(&impact, **b) <= tol)
            .count();
        out.push(FaceInterceptInfo::new(
            impact,
            s / speed,
            FaceIdentifier::from_bits(bit),
            EdgeProximity::from_face_count(count),
        ));
    }
    Ok(out)
}

pub(crate) fn surface<P: Primitive>(
    shape: &P,
    mask: &FaceIdentifier,
    options: &MeasureOptions,
) -> Result<f64> {
    ensure_valid(shape)?;
    let mut total = 0.0;
    for bit in shape.face_bits() {
        if mask.matches(&FaceIdentifier::from_bits(bit)) {
            total += shape.face_area(bit, options)?;
        }
    }
    Ok(total)
}

/// Validates a strictly positive length parameter.
pub(crate) fn positive(shape: &'static str, parameter: &'static str, value: f64) -> std::result::Result<f64, ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidParameter {
            shape,
            parameter,
            value,
        })
    }
}

/// Validates a non-negative length parameter.
pub(crate) fn non_negative(shape: &'static str, parameter: &'static str, value: f64) -> std::result::Result<f64, ShapeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidParameter {
            shape,
            parameter,
            value,
        })
    }
}

/// Distance from `(rho, z)` to the disk `{rho <= radius, z = z0}` (annulus
/// when `inner > 0`), in cylindrical coordinates.
pub(crate) fn annulus_distance(rho: f64, z: f64, z0: f64, inner: f64, outer: f64) -> f64 {
    let radial = if rho > outer {
        rho - outer
    } else if rho < inner {
        inner - rho
    } else {
        0.0
    };
    radial.hypot(z - z0)
}

/// Hit of the ray with the plane `z = z0`, if the ray is not parallel to it.
pub(crate) fn z_plane_hit(from: &Point3, dir: &Vector3, z0: f64) -> Option<f64> {
    (dir.z.abs() > TOLERANCE).then(|| (z0 - from.z) / dir.z)
}

/// Radial distance of `p` from the z axis.
pub(crate) fn rho(p: &Point3) -> f64 {
    p.x.hypot(p.y)
}

/// Outward radial unit vector at `p`, `+x` on the axis.
pub(crate) fn radial(p: &Point3) -> Vector3 {
    let r = rho(p);
    if r < TOLERANCE {
        Vector3::x()
    } else {
        Vector3::new(p.x / r, p.y / r, 0.0)
    }
}

/// Generates the [`Solid`](super::Solid) and
/// [`WireRenderable`](super::WireRenderable) impls of a primitive.
macro_rules! impl_solid_for_primitive {
    ($ty:ty) => {
        impl $crate::shapes::Solid for $ty {
            fn shape_name(&self) -> &'static str {
                <$ty as $crate::shapes::primitive::Primitive>::NAME
            }

            fn is_valid(&self) -> bool {
                $crate::shapes::primitive::Primitive::is_configured(self)
            }

            fn reset(&mut self) {
                $crate::shapes::primitive::Primitive::clear(self);
            }

            fn volume_with(&self, _options: &$crate::shapes::MeasureOptions) -> $crate::error::Result<f64> {
                $crate::shapes::primitive::ensure_valid(self)?;
                Ok($crate::shapes::primitive::Primitive::enclosed_volume(self))
            }

            fn surface_with(
                &self,
                mask: &$crate::face::FaceIdentifier,
                options: &$crate::shapes::MeasureOptions,
            ) -> $crate::error::Result<f64> {
                $crate::shapes::primitive::surface(self, mask, options)
            }

            fn is_inside(&self, p: &$crate::math::Point3, skin: f64) -> $crate::error::Result<bool> {
                $crate::shapes::primitive::is_inside(self, p, skin)
            }

            fn is_outside(&self, p: &$crate::math::Point3, skin: f64) -> $crate::error::Result<bool> {
                $crate::shapes::primitive::is_outside(self, p, skin)
            }

            fn on_surface(
                &self,
                p: &$crate::math::Point3,
                mask: &$crate::face::FaceIdentifier,
                skin: f64,
            ) -> $crate::error::Result<$crate::face::FaceIdentifier> {
                $crate::shapes::primitive::on_surface(self, p, mask, skin)
            }

            fn normal_on_surface(
                &self,
                p: &$crate::math::Point3,
                face: &$crate::face::FaceIdentifier,
            ) -> $crate::error::Result<$crate::math::Vector3> {
                $crate::shapes::primitive::normal_on_surface(self, p, face)
            }

            fn intercepts(
                &self,
                from: &$crate::math::Point3,
                dir: &$crate::math::Vector3,
                skin: f64,
            ) -> $crate::error::Result<Vec<$crate::face::FaceInterceptInfo>> {
                $crate::shapes::primitive::intercepts(self, from, dir, skin)
            }

            fn compute_faces(
                &self,
                out: &mut Vec<$crate::geometry::surface::FaceInfo>,
            ) -> $crate::error::Result<usize> {
                $crate::shapes::primitive::ensure_valid(self)?;
                let faces = $crate::shapes::primitive::Primitive::faces(self);
                let count = faces.len();
                out.extend(faces);
                Ok(count)
            }

            fn build_bounding_data(&self) -> $crate::error::Result<$crate::bounding::BoundingData> {
                $crate::shapes::primitive::ensure_valid(self)?;
                Ok($crate::bounding::BoundingData::Aabb(
                    $crate::shapes::primitive::Primitive::aabb(self),
                ))
            }
        }

        impl $crate::shapes::WireRenderable for $ty {
            fn generate_wires_self(
                &self,
                out: &mut Vec<$crate::tessellation::Polyline>,
                options: &$crate::tessellation::WireOptions,
            ) -> $crate::error::Result<()> {
                $crate::shapes::primitive::ensure_valid(self)?;
                out.extend($crate::shapes::primitive::Primitive::wires(self, options));
                Ok(())
            }
        }
    };
}

pub(crate) use impl_solid_for_primitive;
