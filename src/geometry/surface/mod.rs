//! Bounded surface patches describing the faces of solids.
//!
//! Every patch lives in a canonical frame (centred on the origin, symmetric
//! about the z axis). [`FaceInfo`] places a patch inside the frame of the
//! solid it belongs to.

mod cone;
mod cylinder;
mod ellipsoid;
mod plane;
mod sphere;
mod torus;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use plane::{Annulus, EllipticDisk, Rectangle, Trapezoid};
pub use sphere::Sphere;
pub use torus::Torus;

use crate::error::{GeometryError, Result};
use crate::face::FaceIdentifier;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::placement::Placement;

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Whether `(u, v)` lies inside the domain.
    #[must_use]
    pub fn contains(&self, u: f64, v: f64) -> bool {
        u >= self.u_min - TOLERANCE
            && u <= self.u_max + TOLERANCE
            && v >= self.v_min - TOLERANCE
            && v <= self.v_max + TOLERANCE
    }
}

/// Trait for bounded parametric surfaces.
pub trait Surface {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Computes the unit normal at parameters `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or the normal is degenerate.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Area element `|∂P/∂u × ∂P/∂v|` at `(u, v)`.
    ///
    /// The default uses central differences.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    fn area_element(&self, u: f64, v: f64) -> Result<f64> {
        let d = self.domain();
        let hu = 1e-6 * (d.u_max - d.u_min).max(TOLERANCE);
        let hv = 1e-6 * (d.v_max - d.v_min).max(TOLERANCE);
        let pu = (self.evaluate(u + hu, v)? - self.evaluate(u - hu, v)?) / (2.0 * hu);
        let pv = (self.evaluate(u, v + hv)? - self.evaluate(u, v - hv)?) / (2.0 * hv);
        Ok(pu.cross(&pv).norm())
    }

    /// Midpoint quadrature of the patch on an `n × n` parameter grid.
    ///
    /// Returns `(point, weight)` pairs whose weights sum to the area.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] for an unbounded domain.
    fn samples(&self, n: usize) -> Result<Vec<(Point3, f64)>> {
        let d = self.domain();
        if [d.u_min, d.u_max, d.v_min, d.v_max].iter().any(|x| !x.is_finite()) {
            return Err(GeometryError::ParameterOutOfRange("unbounded surface domain".into()).into());
        }
        let n = n.max(1);
        #[allow(clippy::cast_precision_loss)]
        let (du, dv) = ((d.u_max - d.u_min) / n as f64, (d.v_max - d.v_min) / n as f64);
        let mut out = Vec::with_capacity(n * n);
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let u = d.u_min + (i as f64 + 0.5) * du;
            for j in 0..n {
                #[allow(clippy::cast_precision_loss)]
                let v = d.v_min + (j as f64 + 0.5) * dv;
                out.push((self.evaluate(u, v)?, self.area_element(u, v)? * du * dv));
            }
        }
        Ok(out)
    }

    /// Area by midpoint quadrature.
    ///
    /// # Errors
    ///
    /// See [`samples`](Self::samples).
    fn area(&self, n: usize) -> Result<f64> {
        Ok(self.samples(n)?.iter().map(|(_, w)| w).sum())
    }
}

/// The closed set of patches used by the primitive solids.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSurface {
    Rectangle(Rectangle),
    Annulus(Annulus),
    EllipticDisk(EllipticDisk),
    Trapezoid(Trapezoid),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Ellipsoid(Ellipsoid),
    Torus(Torus),
    Trimmed(Trimmed),
}

impl FaceSurface {
    fn as_surface(&self) -> &dyn Surface {
        match self {
            FaceSurface::Rectangle(s) => s,
            FaceSurface::Annulus(s) => s,
            FaceSurface::EllipticDisk(s) => s,
            FaceSurface::Trapezoid(s) => s,
            FaceSurface::Cylinder(s) => s,
            FaceSurface::Cone(s) => s,
            FaceSurface::Sphere(s) => s,
            FaceSurface::Ellipsoid(s) => s,
            FaceSurface::Torus(s) => s,
            FaceSurface::Trimmed(s) => s,
        }
    }

    /// The patch restricted to `domain`, or unchanged when `domain` is its
    /// own.
    #[must_use]
    pub fn trimmed(self, domain: SurfaceDomain) -> Self {
        if self.domain() == domain {
            self
        } else {
            FaceSurface::Trimmed(Trimmed::new(self, domain))
        }
    }
}

/// A patch evaluated over a sub-domain of its parametrisation, such as the
/// angular sector of a surface of revolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Trimmed {
    base: Box<FaceSurface>,
    domain: SurfaceDomain,
}

impl Trimmed {
    #[must_use]
    pub fn new(base: FaceSurface, domain: SurfaceDomain) -> Self {
        Self {
            base: Box::new(base),
            domain,
        }
    }

    #[must_use]
    pub fn base(&self) -> &FaceSurface {
        &self.base
    }
}

impl Surface for Trimmed {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.base.evaluate(u, v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        self.base.normal(u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        self.domain
    }

    fn area_element(&self, u: f64, v: f64) -> Result<f64> {
        self.base.area_element(u, v)
    }
}

impl Surface for FaceSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.as_surface().evaluate(u, v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        self.as_surface().normal(u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        self.as_surface().domain()
    }

    fn area_element(&self, u: f64, v: f64) -> Result<f64> {
        self.as_surface().area_element(u, v)
    }
}

/// One face of a solid: its identifier, where its patch sits in the solid
/// frame, and the patch itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceInfo {
    pub id: FaceIdentifier,
    pub placement: Placement,
    pub surface: FaceSurface,
    /// The patch normal points into the solid.
    pub reversed: bool,
}

impl FaceInfo {
    #[must_use]
    pub fn new(id: FaceIdentifier, placement: Placement, surface: FaceSurface) -> Self {
        Self {
            id,
            placement,
            surface,
            reversed: false,
        }
    }

    /// Marks the patch normal as pointing into the solid.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    /// Outward normal at `(u, v)` in the solid frame.
    ///
    /// # Errors
    ///
    /// Propagates patch and placement errors.
    pub fn outward_normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let n = self
            .placement
            .child_to_mother_direction(&self.surface.normal(u, v)?)?;
        Ok(if self.reversed { -n } else { n })
    }

    /// Quadrature samples in the solid frame.
    ///
    /// # Errors
    ///
    /// Propagates patch and placement errors.
    pub fn samples(&self, n: usize) -> Result<Vec<(Point3, f64)>> {
        self.surface
            .samples(n)?
            .into_iter()
            .map(|(p, w)| Ok((self.placement.child_to_mother(&p)?, w)))
            .collect()
    }

    /// Re-expresses the face for a parent solid.
    ///
    /// # Errors
    ///
    /// Returns an error if either placement is invalid.
    pub fn into_parent(self, part: u32, placement: &Placement) -> Result<Self> {
        Ok(Self {
            id: FaceIdentifier::nested(part, self.id),
            placement: placement.compose(&self.placement)?,
            surface: self.surface,
            reversed: self.reversed,
        })
    }
}

pub(crate) fn unit_or_error(n: Vector3) -> Result<Vector3> {
    let len = n.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(n / len)
}
