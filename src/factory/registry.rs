use std::collections::BTreeMap;

use crate::csg::{BooleanOp, Composite};
use crate::error::{FactoryError, Result};
use crate::shapes::{BoxShape, ConeFrustum, Cylinder, Ellipsoid, Shape, Sphere, Torus, Tube};

/// Builds an unconfigured shape of one registered type.
pub type ShapeConstructor = fn() -> Shape;

/// Maps type identifiers to shape constructors.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    constructors: BTreeMap<String, ShapeConstructor>,
}

impl ShapeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing every primitive and the three boolean composites.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry
            .register_type("box", || Shape::from(BoxShape::default()))
            .register_type("cylinder", || Shape::from(Cylinder::default()))
            .register_type("tube", || Shape::from(Tube::default()))
            .register_type("sphere", || Shape::from(Sphere::default()))
            .register_type("cone", || Shape::from(ConeFrustum::default()))
            .register_type("ellipsoid", || Shape::from(Ellipsoid::default()))
            .register_type("torus", || Shape::from(Torus::default()))
            .register_type(BooleanOp::Union.type_id(), || {
                Shape::from(Composite::empty(BooleanOp::Union))
            })
            .register_type(BooleanOp::Subtraction.type_id(), || {
                Shape::from(Composite::empty(BooleanOp::Subtraction))
            })
            .register_type(BooleanOp::Intersection.type_id(), || {
                Shape::from(Composite::empty(BooleanOp::Intersection))
            });
        registry
    }

    /// Registers (or replaces) the constructor of `type_id`.
    pub fn register_type(&mut self, type_id: impl Into<String>, constructor: ShapeConstructor) -> &mut Self {
        self.constructors.insert(type_id.into(), constructor);
        self
    }

    #[must_use]
    pub fn has(&self, type_id: &str) -> bool {
        self.constructors.contains_key(type_id)
    }

    /// Registered type identifiers, sorted.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// A fresh, unconfigured shape of type `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::UnregisteredType`] for an unknown type.
    pub fn create(&self, type_id: &str) -> Result<Shape> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| FactoryError::UnregisteredType(type_id.to_string()))?;
        Ok(constructor())
    }
}
