use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::math::Point3;
use crate::placement::Placement;

use super::FaceIdentifier;

/// How close an impact lies to the edges of the face it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeProximity {
    /// Strictly inside the face.
    #[default]
    OnFace,
    /// On the boundary shared by two faces.
    OnEdge,
    /// Where three or more faces meet.
    OnVertex,
}

impl EdgeProximity {
    /// Classifies a point from the number of faces it lies on.
    #[must_use]
    pub fn from_face_count(count: usize) -> Self {
        match count {
            0 | 1 => EdgeProximity::OnFace,
            2 => EdgeProximity::OnEdge,
            _ => EdgeProximity::OnVertex,
        }
    }
}

/// A boundary crossing found along a ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceInterceptInfo {
    /// Impact point in the frame of the queried solid.
    pub impact: Point3,
    /// Parametric distance from the ray origin (in units of the direction length).
    pub distance: f64,
    pub face: FaceIdentifier,
    pub proximity: EdgeProximity,
}

impl FaceInterceptInfo {
    #[must_use]
    pub fn new(impact: Point3, distance: f64, face: FaceIdentifier, proximity: EdgeProximity) -> Self {
        Self {
            impact,
            distance,
            face,
            proximity,
        }
    }

    /// Re-expresses the intercept for a parent solid: the impact is moved to
    /// the mother frame and the face gets the child selector `part`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn into_parent(self, part: u32, placement: &Placement) -> Result<Self, PlacementError> {
        Ok(Self {
            impact: placement.child_to_mother(&self.impact)?,
            distance: self.distance,
            face: FaceIdentifier::nested(part, self.face),
            proximity: self.proximity,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn proximity_from_count() {
        assert_eq!(EdgeProximity::from_face_count(1), EdgeProximity::OnFace);
        assert_eq!(EdgeProximity::from_face_count(2), EdgeProximity::OnEdge);
        assert_eq!(EdgeProximity::from_face_count(3), EdgeProximity::OnVertex);
    }

    #[test]
    fn into_parent_prefixes_face() {
        let hit = FaceInterceptInfo::new(
            Point3::new(1.0, 0.0, 0.0),
            2.0,
            FaceIdentifier::from_bits(2),
            EdgeProximity::OnFace,
        );
        let pl = Placement::from_translation(Vector3::new(0.0, 0.0, 5.0));
        let up = hit.into_parent(1, &pl).unwrap();
        assert_eq!(up.impact, Point3::new(1.0, 0.0, 5.0));
        assert_eq!(up.face, FaceIdentifier::nested(1, FaceIdentifier::from_bits(2)));
        assert!((up.distance - 2.0).abs() < 1e-15);
    }
}
