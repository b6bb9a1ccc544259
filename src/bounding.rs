use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::math::{Point3, Vector3};
use crate::placement::Placement;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners, in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// A box centred on the origin with the given half extents.
    #[must_use]
    pub fn centered(half: Vector3) -> Self {
        Self {
            min: Point3::from(-half),
            max: Point3::from(half),
        }
    }

    /// Smallest box enclosing `points`, or `None` when there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Whether `p` lies in the box grown by `margin` on every side.
    #[must_use]
    pub fn contains(&self, p: &Point3, margin: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - margin && p[i] <= self.max[i] + margin)
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Overlap of two boxes, or `None` when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.sup(&other.min);
        let max = self.max.inf(&other.max);
        (0..3).all(|i| min[i] < max[i]).then_some(Aabb { min, max })
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box once mapped into the mother frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn transformed(&self, placement: &Placement) -> Result<Aabb, PlacementError> {
        let corners = self
            .corners()
            .iter()
            .map(|c| placement.child_to_mother(c))
            .collect::<Result<Vec<_>, _>>()?;
        // Eight corners, never empty.
        Ok(Aabb::from_points(&corners).unwrap_or(*self))
    }
}

/// Bounding volume of a solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundingData {
    /// The solid encloses no volume.
    Empty,
    Aabb(Aabb),
}

impl BoundingData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, BoundingData::Empty)
    }

    #[must_use]
    pub fn aabb(&self) -> Option<&Aabb> {
        match self {
            BoundingData::Empty => None,
            BoundingData::Aabb(b) => Some(b),
        }
    }

    #[must_use]
    pub fn contains(&self, p: &Point3, margin: f64) -> bool {
        self.aabb().is_some_and(|b| b.contains(p, margin))
    }

    #[must_use]
    pub fn union(&self, other: &BoundingData) -> BoundingData {
        match (self, other) {
            (BoundingData::Empty, x) | (x, BoundingData::Empty) => *x,
            (BoundingData::Aabb(a), BoundingData::Aabb(b)) => BoundingData::Aabb(a.union(b)),
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &BoundingData) -> BoundingData {
        match (self, other) {
            (BoundingData::Aabb(a), BoundingData::Aabb(b)) => {
                a.intersection(b).map_or(BoundingData::Empty, BoundingData::Aabb)
            }
            _ => BoundingData::Empty,
        }
    }

    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn transformed(&self, placement: &Placement) -> Result<BoundingData, PlacementError> {
        match self {
            BoundingData::Empty => Ok(BoundingData::Empty),
            BoundingData::Aabb(b) => Ok(BoundingData::Aabb(b.transformed(placement)?)),
        }
    }

    /// Largest extent, zero when empty.
    #[must_use]
    pub fn max_dimension(&self) -> f64 {
        self.aabb().map_or(0.0, |b| b.size().max())
    }

    /// Smallest extent, zero when empty.
    #[must_use]
    pub fn min_dimension(&self) -> f64 {
        self.aabb().map_or(0.0, |b| b.size().min())
    }
}
