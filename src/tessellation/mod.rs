//! Wireframe output: polylines and the options that control their density.

mod curves;

pub use curves::{circle, ellipse, parametric, segment};

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::math::Point3;
use crate::placement::Placement;

/// Wire sampling density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sampling {
    Low,
    #[default]
    Normal,
    High,
    VeryHigh,
}

impl Sampling {
    /// Number of segments used to approximate a full circle.
    #[must_use]
    pub fn segments(self) -> usize {
        match self {
            Sampling::Low => 12,
            Sampling::Normal => 36,
            Sampling::High => 72,
            Sampling::VeryHigh => 144,
        }
    }

    /// Number of parallel wires drawn across curved faces.
    #[must_use]
    pub fn rings(self) -> usize {
        match self {
            Sampling::Low => 2,
            Sampling::Normal => 4,
            Sampling::High => 8,
            Sampling::VeryHigh => 16,
        }
    }
}

/// Parameters controlling wire generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOptions {
    pub sampling: Sampling,
    /// Keep only the parts of child wires lying on a composite boundary.
    pub trim_composites: bool,
}

impl Default for WireOptions {
    fn default() -> Self {
        Self {
            sampling: Sampling::Normal,
            trim_composites: true,
        }
    }
}

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
    /// The last vertex connects back to the first.
    pub closed: bool,
}

impl Polyline {
    #[must_use]
    pub fn open(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    #[must_use]
    pub fn closed(points: Vec<Point3>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length, including the closing segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        let open: f64 = self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + (first - last).norm(),
            _ => open,
        }
    }

    /// Maps every vertex into the mother frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn transformed(&self, placement: &Placement) -> Result<Polyline, PlacementError> {
        Ok(Polyline {
            points: self
                .points
                .iter()
                .map(|p| placement.child_to_mother(p))
                .collect::<Result<_, _>>()?,
            closed: self.closed,
        })
    }

    /// Inserts vertices so that no segment is longer than `max_step`.
    ///
    /// A closed polyline is returned open, ending on its first vertex.
    #[must_use]
    pub fn subdivided(&self, max_step: f64) -> Polyline {
        let mut points: Vec<Point3> = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                points.push(*first);
            }
        }
        let Some(first) = points.first() else {
            return Polyline::default();
        };
        let mut out = vec![*first];
        for w in points.windows(2) {
            let len = (w[1] - w[0]).norm();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let steps = if max_step > 0.0 {
                ((len / max_step).ceil() as usize).max(1)
            } else {
                1
            };
            for k in 1..=steps {
                #[allow(clippy::cast_precision_loss)]
                let t = k as f64 / steps as f64;
                out.push(w[0] + (w[1] - w[0]) * t);
            }
        }
        Polyline::open(out)
    }
}
