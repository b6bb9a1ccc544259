//! Boolean composite solids.
//!
//! A [`Composite`] owns two child shapes. The first child lives in the
//! composite frame; the second is located in it by a relative [`Placement`].
//! Every query classifies the point (or ray) against both children and
//! combines the answers with the operation's truth table.

mod intercept;
mod measure;
mod select;
mod wires;

pub use select::{combine, should_keep, BooleanOp, KeepDecision, Operand, PointClassification};

use crate::bounding::BoundingData;
use crate::config::Properties;
use crate::error::{FactoryError, PlacementError, Result, ShapeError};
use crate::face::{FaceIdentifier, FaceInterceptInfo, Part};
use crate::geometry::surface::FaceInfo;
use crate::math::{Point3, Vector3};
use crate::placement::Placement;
use crate::shapes::{MeasureOptions, Shape, ShapeLookup, Solid, WireRenderable};
use crate::tessellation::{Polyline, WireOptions};

/// Property naming the first child.
pub const FIRST_SHAPE_NAME_KEY: &str = "first_shape.name";

/// Property naming the second child.
pub const SECOND_SHAPE_NAME_KEY: &str = "second_shape.name";

/// Property holding the placement text of the second child.
pub const SECOND_SHAPE_PLACEMENT_KEY: &str = "second_shape.placement";

/// Union, subtraction or intersection of two shapes.
#[derive(Debug, Clone)]
pub struct Composite {
    op: BooleanOp,
    first: Option<Box<Shape>>,
    second: Option<Box<Shape>>,
    placement: Placement,
}

impl Composite {
    /// Combines `first` and `second`, the latter located by `placement` in
    /// the frame of the former.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidShape`] if either child is invalid and
    /// [`PlacementError::NotInitialized`] if the placement is.
    pub fn new(op: BooleanOp, first: Shape, second: Shape, placement: Placement) -> Result<Self> {
        for child in [&first, &second] {
            if !child.is_valid() {
                return Err(ShapeError::InvalidShape(child.shape_name()).into());
            }
        }
        if !placement.is_valid() {
            return Err(PlacementError::NotInitialized.into());
        }
        Ok(Self {
            op,
            first: Some(Box::new(first)),
            second: Some(Box::new(second)),
            placement,
        })
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn union(first: Shape, second: Shape, placement: Placement) -> Result<Self> {
        Self::new(BooleanOp::Union, first, second, placement)
    }

    /// `first` minus `second`.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn subtraction(first: Shape, second: Shape, placement: Placement) -> Result<Self> {
        Self::new(BooleanOp::Subtraction, first, second, placement)
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn intersection(first: Shape, second: Shape, placement: Placement) -> Result<Self> {
        Self::new(BooleanOp::Intersection, first, second, placement)
    }

    /// An unconfigured composite, as created by the registry.
    #[must_use]
    pub fn empty(op: BooleanOp) -> Self {
        Self {
            op,
            first: None,
            second: None,
            placement: Placement::identity(),
        }
    }

    #[must_use]
    pub fn op(&self) -> BooleanOp {
        self.op
    }

    #[must_use]
    pub fn first(&self) -> Option<&Shape> {
        self.first.as_deref()
    }

    #[must_use]
    pub fn second(&self) -> Option<&Shape> {
        self.second.as_deref()
    }

    /// Placement of the second child in the composite frame.
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Both children, or [`ShapeError::InvalidShape`] while unconfigured.
    pub(crate) fn children(&self) -> Result<(&Shape, &Shape)> {
        match (self.first.as_deref(), self.second.as_deref()) {
            (Some(a), Some(b)) if self.is_valid() => Ok((a, b)),
            _ => Err(ShapeError::InvalidShape(self.op.type_id()).into()),
        }
    }

    /// Names of the two children declared in `properties`.
    ///
    /// # Errors
    ///
    /// Fails when either name key is missing or not a string.
    pub fn referenced_names(properties: &Properties) -> Result<Vec<String>> {
        Ok(vec![
            properties.fetch_text(FIRST_SHAPE_NAME_KEY)?.to_string(),
            properties.fetch_text(SECOND_SHAPE_NAME_KEY)?.to_string(),
        ])
    }

    /// Clones the named children out of `shapes` and reads the optional
    /// placement of the second one (identity when absent).
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::UnknownShape`] for a name `shapes` cannot
    /// resolve, and propagates property, placement and validity errors.
    pub fn configure(&mut self, properties: &Properties, shapes: &dyn ShapeLookup) -> Result<()> {
        let resolve = |key: &str| -> Result<Shape> {
            let name = properties.fetch_text(key)?;
            shapes
                .find_shape(name)
                .cloned()
                .ok_or_else(|| FactoryError::UnknownShape(name.to_string()).into())
        };
        let first = resolve(FIRST_SHAPE_NAME_KEY)?;
        let second = resolve(SECOND_SHAPE_NAME_KEY)?;
        let placement = if properties.has(SECOND_SHAPE_PLACEMENT_KEY) {
            properties.fetch_text(SECOND_SHAPE_PLACEMENT_KEY)?.parse::<Placement>()?
        } else {
            Placement::identity()
        };
        *self = Self::new(self.op, first, second, placement)?;
        Ok(())
    }

    /// Classification of `p` (composite frame) against one child.
    pub(crate) fn classify_in(&self, operand: Operand, p: &Point3, skin: f64) -> Result<PointClassification> {
        let (a, b) = self.children()?;
        match operand {
            Operand::First => PointClassification::of(a, p, skin),
            Operand::Second => PointClassification::of(b, &self.placement.mother_to_child(p)?, skin),
        }
    }

    fn classify(&self, p: &Point3, skin: f64) -> Result<PointClassification> {
        Ok(combine(
            self.op,
            self.classify_in(Operand::First, p, skin)?,
            self.classify_in(Operand::Second, p, skin)?,
        ))
    }

    /// Whether the boundary point `p` of `source` is also on the composite
    /// boundary.
    pub(crate) fn keeps(&self, source: Operand, p: &Point3, skin: f64) -> Result<bool> {
        let other = match source {
            Operand::First => Operand::Second,
            Operand::Second => Operand::First,
        };
        Ok(should_keep(source, self.classify_in(other, p, skin)?, self.op).is_kept())
    }

    fn invalid_face(&self, face: &FaceIdentifier) -> crate::error::GeosolidError {
        ShapeError::InvalidFace {
            shape: self.op.type_id(),
            face: face.to_string(),
        }
        .into()
    }
}

impl Solid for Composite {
    fn shape_name(&self) -> &'static str {
        self.op.type_id()
    }

    fn is_valid(&self) -> bool {
        self.placement.is_valid()
            && self.first.as_ref().is_some_and(|s| s.is_valid())
            && self.second.as_ref().is_some_and(|s| s.is_valid())
    }

    fn reset(&mut self) {
        *self = Self::empty(self.op);
    }

    fn volume_with(&self, options: &MeasureOptions) -> Result<f64> {
        measure::volume(self, options)
    }

    fn surface_with(&self, mask: &FaceIdentifier, options: &MeasureOptions) -> Result<f64> {
        measure::surface(self, mask, options)
    }

    fn is_inside(&self, p: &Point3, skin: f64) -> Result<bool> {
        Ok(self.classify(p, skin)? == PointClassification::Inside)
    }

    fn is_outside(&self, p: &Point3, skin: f64) -> Result<bool> {
        Ok(self.classify(p, skin)? == PointClassification::Outside)
    }

    fn on_surface(&self, p: &Point3, mask: &FaceIdentifier, skin: f64) -> Result<FaceIdentifier> {
        let (a, b) = self.children()?;
        if let Some(m) = mask.child_mask(Operand::First.part()) {
            let id = a.on_surface(p, &m, skin)?;
            if !id.is_none() && self.keeps(Operand::First, p, skin)? {
                return Ok(FaceIdentifier::nested(Operand::First.part(), id));
            }
        }
        if let Some(m) = mask.child_mask(Operand::Second.part()) {
            let id = b.on_surface(&self.placement.mother_to_child(p)?, &m, skin)?;
            if !id.is_none() && self.keeps(Operand::Second, p, skin)? {
                return Ok(FaceIdentifier::nested(Operand::Second.part(), id));
            }
        }
        Ok(FaceIdentifier::none())
    }

    fn normal_on_surface(&self, p: &Point3, face: &FaceIdentifier) -> Result<Vector3> {
        let (a, b) = self.children()?;
        if !face.is_unique() {
            return Err(self.invalid_face(face));
        }
        match face.split_first() {
            Some((Part::Index(0), rest)) => a.normal_on_surface(p, &rest),
            Some((Part::Index(1), rest)) => {
                let local = self.placement.mother_to_child(p)?;
                let n = self
                    .placement
                    .child_to_mother_direction(&b.normal_on_surface(&local, &rest)?)?;
                Ok(if self.op == BooleanOp::Subtraction { -n } else { n })
            }
            _ => Err(self.invalid_face(face)),
        }
    }

    fn intercepts(&self, from: &Point3, dir: &Vector3, skin: f64) -> Result<Vec<FaceInterceptInfo>> {
        intercept::intercepts(self, from, dir, skin)
    }

    fn compute_faces(&self, out: &mut Vec<FaceInfo>) -> Result<usize> {
        let (a, b) = self.children()?;
        let mut first = Vec::new();
        a.compute_faces(&mut first)?;
        let mut second = Vec::new();
        b.compute_faces(&mut second)?;

        let before = out.len();
        let identity = Placement::identity();
        for face in first {
            out.push(face.into_parent(Operand::First.part(), &identity)?);
        }
        for face in second {
            let face = face.into_parent(Operand::Second.part(), &self.placement)?;
            out.push(if self.op == BooleanOp::Subtraction {
                face.flipped()
            } else {
                face
            });
        }
        Ok(out.len() - before)
    }

    fn build_bounding_data(&self) -> Result<BoundingData> {
        let (a, b) = self.children()?;
        let first = *a.bounding_data()?;
        let second = b.bounding_data()?.transformed(&self.placement)?;
        Ok(match self.op {
            BooleanOp::Union => first.union(&second),
            BooleanOp::Subtraction => first,
            BooleanOp::Intersection => {
                let overlap = first.intersection(&second);
                if overlap.is_empty() {
                    tracing::debug!(
                        first = a.shape_name(),
                        second = b.shape_name(),
                        "intersection of disjoint bounding boxes is empty"
                    );
                }
                overlap
            }
        })
    }
}

impl WireRenderable for Composite {
    fn generate_wires_self(&self, out: &mut Vec<Polyline>, options: &WireOptions) -> Result<()> {
        wires::generate(self, out, options)
    }
}
