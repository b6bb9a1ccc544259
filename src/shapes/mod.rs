//! The solid interface, the primitive catalogue and the [`Shape`] node.

pub(crate) mod primitive;

mod box_shape;
mod cone;
mod cylinder;
mod ellipsoid;
mod sector;
mod sphere;
mod torus;
mod tube;

pub use box_shape::BoxShape;
pub use cone::ConeFrustum;
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use sector::AngularRange;
pub use sphere::Sphere;
pub use torus::Torus;
pub use tube::Tube;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::bounding::BoundingData;
use crate::config::Properties;
use crate::csg::Composite;
use crate::error::Result;
use crate::face::{FaceIdentifier, FaceInterceptInfo};
use crate::geometry::surface::FaceInfo;
use crate::math::{Point3, Vector3};
use crate::placement::Placement;
use crate::tessellation::{Polyline, WireOptions};

/// Numerical effort used by volume and surface measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureOptions {
    /// Cells per axis of the midpoint grid used for composite volumes.
    pub grid: usize,
    /// Samples per parameter axis used for face quadrature.
    pub face_samples: usize,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            grid: 48,
            face_samples: 32,
        }
    }
}

/// Queries every solid answers.
///
/// Every query fails with [`ShapeError::InvalidShape`](crate::error::ShapeError::InvalidShape)
/// while the solid is not configured.
pub trait Solid {
    /// Type identifier of the solid.
    fn shape_name(&self) -> &'static str;

    fn is_valid(&self) -> bool;

    /// Returns the solid to its unconfigured state.
    fn reset(&mut self);

    /// Enclosed volume.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn volume_with(&self, options: &MeasureOptions) -> Result<f64>;

    /// Enclosed volume with default measurement options.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn volume(&self) -> Result<f64> {
        self.volume_with(&MeasureOptions::default())
    }

    /// Total area of the faces matched by `mask`.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn surface_with(&self, mask: &FaceIdentifier, options: &MeasureOptions) -> Result<f64>;

    /// Total area of the faces matched by `mask`, default options.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn surface(&self, mask: &FaceIdentifier) -> Result<f64> {
        self.surface_with(mask, &MeasureOptions::default())
    }

    /// Whether `p` lies at least `skin / 2` inside the solid.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn is_inside(&self, p: &Point3, skin: f64) -> Result<bool>;

    /// Whether `p` lies more than `skin / 2` outside the solid.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn is_outside(&self, p: &Point3, skin: f64) -> Result<bool>;

    /// The face matched by `mask` that `p` lies on (within `skin / 2`), NONE
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn on_surface(&self, p: &Point3, mask: &FaceIdentifier, skin: f64) -> Result<FaceIdentifier>;

    /// Outward unit normal of `face` at `p`.
    ///
    /// # Errors
    ///
    /// Fails with [`ShapeError::InvalidFace`](crate::error::ShapeError::InvalidFace)
    /// when `face` does not name exactly one face of this solid.
    fn normal_on_surface(&self, p: &Point3, face: &FaceIdentifier) -> Result<Vector3>;

    /// Every boundary crossing along the ray `from + t dir`, `t >= 0`, sorted by
    /// distance and de-duplicated within `skin`.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn intercepts(&self, from: &Point3, dir: &Vector3, skin: f64) -> Result<Vec<FaceInterceptInfo>>;

    /// The nearest boundary crossing along the ray, if any.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn find_intercept(&self, from: &Point3, dir: &Vector3, skin: f64) -> Result<Option<FaceInterceptInfo>> {
        Ok(self.intercepts(from, dir, skin)?.into_iter().next())
    }

    /// Appends the faces of the solid to `out`, returning how many were added.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn compute_faces(&self, out: &mut Vec<FaceInfo>) -> Result<usize>;

    /// Computes the bounding data from scratch.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn build_bounding_data(&self) -> Result<BoundingData>;
}

/// Solids that can draw themselves as wires.
pub trait WireRenderable {
    /// Wires in the solid's own frame.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    fn generate_wires_self(&self, out: &mut Vec<Polyline>, options: &WireOptions) -> Result<()>;

    /// Wires mapped into a mother frame through `placement`.
    ///
    /// # Errors
    ///
    /// Fails when the solid or the placement is invalid.
    fn generate_wires(&self, out: &mut Vec<Polyline>, placement: &Placement, options: &WireOptions) -> Result<()> {
        let mut local = Vec::new();
        self.generate_wires_self(&mut local, options)?;
        for wire in &local {
            out.push(wire.transformed(placement)?);
        }
        Ok(())
    }
}

/// Resolves shape names while configuring composites.
pub trait ShapeLookup {
    fn find_shape(&self, name: &str) -> Option<&Shape>;
}

impl ShapeLookup for HashMap<String, Shape> {
    fn find_shape(&self, name: &str) -> Option<&Shape> {
        self.get(name)
    }
}

/// The closed set of solids.
#[derive(Debug, Clone)]
pub enum ShapeKind {
    Box(BoxShape),
    Cylinder(Cylinder),
    Tube(Tube),
    Sphere(Sphere),
    Cone(ConeFrustum),
    Ellipsoid(Ellipsoid),
    Torus(Torus),
    Composite(Composite),
}

impl ShapeKind {
    fn as_solid(&self) -> &dyn Solid {
        match self {
            ShapeKind::Box(s) => s,
            ShapeKind::Cylinder(s) => s,
            ShapeKind::Tube(s) => s,
            ShapeKind::Sphere(s) => s,
            ShapeKind::Cone(s) => s,
            ShapeKind::Ellipsoid(s) => s,
            ShapeKind::Torus(s) => s,
            ShapeKind::Composite(s) => s,
        }
    }

    fn as_solid_mut(&mut self) -> &mut dyn Solid {
        match self {
            ShapeKind::Box(s) => s,
            ShapeKind::Cylinder(s) => s,
            ShapeKind::Tube(s) => s,
            ShapeKind::Sphere(s) => s,
            ShapeKind::Cone(s) => s,
            ShapeKind::Ellipsoid(s) => s,
            ShapeKind::Torus(s) => s,
            ShapeKind::Composite(s) => s,
        }
    }

    fn as_wires(&self) -> &dyn WireRenderable {
        match self {
            ShapeKind::Box(s) => s,
            ShapeKind::Cylinder(s) => s,
            ShapeKind::Tube(s) => s,
            ShapeKind::Sphere(s) => s,
            ShapeKind::Cone(s) => s,
            ShapeKind::Ellipsoid(s) => s,
            ShapeKind::Torus(s) => s,
            ShapeKind::Composite(s) => s,
        }
    }
}

/// A solid node with lazily cached bounding data.
///
/// Mutation goes through [`kind_mut`](Self::kind_mut), [`configure`](Self::configure)
/// or [`Solid::reset`], all of which drop the cache.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeKind,
    bounding: OnceLock<BoundingData>,
}

impl From<ShapeKind> for Shape {
    fn from(kind: ShapeKind) -> Self {
        Self::new(kind)
    }
}

macro_rules! shape_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Shape {
            fn from(s: $ty) -> Self {
                Self::new(ShapeKind::$variant(s))
            }
        })*
    };
}

shape_from!(
    Box(BoxShape),
    Cylinder(Cylinder),
    Tube(Tube),
    Sphere(Sphere),
    Cone(ConeFrustum),
    Ellipsoid(Ellipsoid),
    Torus(Torus),
    Composite(Composite),
);

impl Shape {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            bounding: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Mutable access to the solid; drops the cached bounding data.
    pub fn kind_mut(&mut self) -> &mut ShapeKind {
        self.bounding = OnceLock::new();
        &mut self.kind
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ShapeKind::Composite(_))
    }

    /// Cached bounding data, computed on first use.
    ///
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    pub fn bounding_data(&self) -> Result<&BoundingData> {
        if let Some(b) = self.bounding.get() {
            return Ok(b);
        }
        let built = self.kind.as_solid().build_bounding_data()?;
        Ok(self.bounding.get_or_init(|| built))
    }

    /// Names of the shapes `properties` would make this solid refer to.
    ///
    /// # Errors
    ///
    /// Fails when a composite reference key is missing or not a string.
    pub fn referenced_names(&self, properties: &Properties) -> Result<Vec<String>> {
        match &self.kind {
            ShapeKind::Composite(_) => Composite::referenced_names(properties),
            _ => Ok(Vec::new()),
        }
    }

    /// Configures the solid from `properties`; composites resolve their
    /// children through `shapes`.
    ///
    /// # Errors
    ///
    /// Propagates property, unit and parameter errors.
    pub fn configure(&mut self, properties: &Properties, shapes: &dyn ShapeLookup) -> Result<()> {
        match self.kind_mut() {
            ShapeKind::Box(s) => s.configure(properties),
            ShapeKind::Cylinder(s) => s.configure(properties),
            ShapeKind::Tube(s) => s.configure(properties),
            ShapeKind::Sphere(s) => s.configure(properties),
            ShapeKind::Cone(s) => s.configure(properties),
            ShapeKind::Ellipsoid(s) => s.configure(properties),
            ShapeKind::Torus(s) => s.configure(properties),
            ShapeKind::Composite(s) => s.configure(properties, shapes),
        }
    }
}

impl Solid for Shape {
    fn shape_name(&self) -> &'static str {
        self.kind.as_solid().shape_name()
    }

    fn is_valid(&self) -> bool {
        self.kind.as_solid().is_valid()
    }

    fn reset(&mut self) {
        self.kind_mut().as_solid_mut().reset();
    }

    fn volume_with(&self, options: &MeasureOptions) -> Result<f64> {
        self.kind.as_solid().volume_with(options)
    }

    fn surface_with(&self, mask: &FaceIdentifier, options: &MeasureOptions) -> Result<f64> {
        self.kind.as_solid().surface_with(mask, options)
    }

    fn is_inside(&self, p: &Point3, skin: f64) -> Result<bool> {
        self.kind.as_solid().is_inside(p, skin)
    }

    fn is_outside(&self, p: &Point3, skin: f64) -> Result<bool> {
        self.kind.as_solid().is_outside(p, skin)
    }

    fn on_surface(&self, p: &Point3, mask: &FaceIdentifier, skin: f64) -> Result<FaceIdentifier> {
        self.kind.as_solid().on_surface(p, mask, skin)
    }

    fn normal_on_surface(&self, p: &Point3, face: &FaceIdentifier) -> Result<Vector3> {
        self.kind.as_solid().normal_on_surface(p, face)
    }

    fn intercepts(&self, from: &Point3, dir: &Vector3, skin: f64) -> Result<Vec<FaceInterceptInfo>> {
        self.kind.as_solid().intercepts(from, dir, skin)
    }

    fn compute_faces(&self, out: &mut Vec<FaceInfo>) -> Result<usize> {
        self.kind.as_solid().compute_faces(out)
    }

    fn build_bounding_data(&self) -> Result<BoundingData> {
        self.bounding_data().copied()
    }
}

impl WireRenderable for Shape {
    fn generate_wires_self(&self, out: &mut Vec<Polyline>, options: &WireOptions) -> Result<()> {
        self.kind.as_wires().generate_wires_self(out, options)
    }
}
