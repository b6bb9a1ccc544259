use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Point3;
use crate::shapes::Solid;

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Subtraction,
    Intersection,
}

impl BooleanOp {
    pub const ALL: [BooleanOp; 3] = [BooleanOp::Union, BooleanOp::Subtraction, BooleanOp::Intersection];

    /// Registry type identifier of the composite.
    #[must_use]
    pub fn type_id(self) -> &'static str {
        match self {
            BooleanOp::Union => "union_3d",
            BooleanOp::Subtraction => "subtraction_3d",
            BooleanOp::Intersection => "intersection_3d",
        }
    }

    #[must_use]
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.type_id() == type_id)
    }
}

/// Classification of a point relative to a solid, at a given skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

impl PointClassification {
    /// # Errors
    ///
    /// Fails when the solid is invalid.
    pub fn of(solid: &dyn Solid, p: &Point3, skin: f64) -> Result<Self> {
        Ok(if solid.is_inside(p, skin)? {
            PointClassification::Inside
        } else if solid.is_outside(p, skin)? {
            PointClassification::Outside
        } else {
            PointClassification::OnBoundary
        })
    }
}

/// Which operand a face or wire comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl Operand {
    /// Child selector used in composite face identifiers.
    #[must_use]
    pub fn part(self) -> u32 {
        match self {
            Operand::First => 0,
            Operand::Second => 1,
        }
    }
}

/// Decision about whether a piece of an operand's boundary belongs to the
/// composite boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    KeepFlipped,
    Discard,
}

impl KeepDecision {
    #[must_use]
    pub fn is_kept(self) -> bool {
        self != KeepDecision::Discard
    }
}

/// Whether a boundary point of `source` lies on the composite boundary, given
/// its classification against the other operand.
///
/// | Source | vs other   | Union   | Subtraction (A-B) | Intersection |
/// |--------|------------|---------|-------------------|--------------|
/// | A      | OUTSIDE B  | keep    | keep              | discard      |
/// | A      | ON B       | keep    | keep              | keep         |
/// | A      | INSIDE B   | discard | discard           | keep         |
/// | B      | OUTSIDE A  | keep    | discard           | discard      |
/// | B      | ON A       | keep    | keep (flip)       | keep         |
/// | B      | INSIDE A   | discard | keep (flip)       | keep         |
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn should_keep(source: Operand, classification: PointClassification, op: BooleanOp) -> KeepDecision {
    use KeepDecision::{Discard, Keep, KeepFlipped};
    use PointClassification::{Inside, OnBoundary, Outside};

    match (op, source, classification) {
        (BooleanOp::Union, _, Inside) => Discard,
        (BooleanOp::Union, _, Outside | OnBoundary) => Keep,

        (BooleanOp::Subtraction, Operand::First, Inside) => Discard,
        (BooleanOp::Subtraction, Operand::First, Outside | OnBoundary) => Keep,
        (BooleanOp::Subtraction, Operand::Second, Outside) => Discard,
        (BooleanOp::Subtraction, Operand::Second, Inside | OnBoundary) => KeepFlipped,

        (BooleanOp::Intersection, _, Outside) => Discard,
        (BooleanOp::Intersection, _, Inside | OnBoundary) => Keep,
    }
}

/// Containment of a point in the composite from its containment in each
/// operand (the second already evaluated in its own frame).
#[must_use]
pub fn combine(op: BooleanOp, first: PointClassification, second: PointClassification) -> PointClassification {
    use PointClassification::{Inside, OnBoundary, Outside};

    let (in1, out1) = (first == Inside, first == Outside);
    let (in2, out2) = (second == Inside, second == Outside);
    let (inside, outside) = match op {
        BooleanOp::Union => (in1 || in2, out1 && out2),
        BooleanOp::Subtraction => (in1 && out2, out1 || in2),
        BooleanOp::Intersection => (in1 && in2, out1 || out2),
    };
    if inside {
        Inside
    } else if outside {
        Outside
    } else {
        OnBoundary
    }
}
