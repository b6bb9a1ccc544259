mod parse;

use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::math::{Point3, Rotation3, Vector3, TOLERANCE};

/// Principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along the axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Lower-case label, as used in placement text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Parses `x`, `y` or `z` (either case).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

/// A rigid transform locating a child frame inside its mother frame.
///
/// `child_to_mother(p) = R p + t` and `mother_to_child(p) = Rᵀ (p - t)`.
/// An invalidated placement rejects every query with
/// [`PlacementError::NotInitialized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    translation: Vector3,
    rotation: Rotation3,
    valid: bool,
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Placement {
    /// The identity placement.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Rotation3::identity(),
            valid: true,
        }
    }

    /// An invalid placement, usable only after [`set`](Self::set).
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            valid: false,
            ..Self::identity()
        }
    }

    /// Pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Translation followed by a rotation of `angle` radians about a principal axis.
    #[must_use]
    pub fn from_axis_angle(translation: Vector3, axis: Axis, angle: f64) -> Self {
        let axis = nalgebra::Unit::new_unchecked(axis.unit());
        Self {
            translation,
            rotation: Rotation3::from_axis_angle(&axis, angle),
            valid: true,
        }
    }

    /// Translation plus a rotation given by ZYZ Euler angles (radians).
    ///
    /// `R = Rz(phi) · Ry(theta) · Rz(delta)`.
    #[must_use]
    pub fn from_euler_zyz(translation: Vector3, phi: f64, theta: f64, delta: f64) -> Self {
        let rz = |a: f64| Rotation3::from_axis_angle(&Vector3::z_axis(), a);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), theta);
        Self {
            translation,
            rotation: rz(phi) * ry * rz(delta),
            valid: true,
        }
    }

    /// Translation plus an arbitrary rotation matrix.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotOrthonormal`] unless `matrix` is a proper
    /// rotation (orthonormal with determinant +1) within `1e-9`.
    pub fn new(translation: Vector3, matrix: nalgebra::Matrix3<f64>) -> Result<Self, PlacementError> {
        let determinant = matrix.determinant();
        let gram = matrix.transpose() * matrix;
        if (determinant - 1.0).abs() > 1e-9
            || (gram - nalgebra::Matrix3::identity()).abs().max() > 1e-9
        {
            return Err(PlacementError::NotOrthonormal { determinant });
        }
        Ok(Self {
            translation,
            rotation: Rotation3::from_matrix_unchecked(matrix),
            valid: true,
        })
    }

    /// Replaces the transform and marks the placement valid.
    pub fn set(&mut self, translation: Vector3, rotation: Rotation3) {
        self.translation = translation;
        self.rotation = rotation;
        self.valid = true;
    }

    /// Marks the placement unusable.
    pub fn invalidate(&mut self) {
        self.translation = Vector3::zeros();
        self.rotation = Rotation3::identity();
        self.valid = false;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn translation(&self) -> &Vector3 {
        &self.translation
    }

    #[must_use]
    pub fn rotation(&self) -> &Rotation3 {
        &self.rotation
    }

    /// Whether the rotation part is the identity.
    #[must_use]
    pub fn is_pure_translation(&self) -> bool {
        (self.rotation.matrix() - nalgebra::Matrix3::identity()).abs().max() < TOLERANCE
    }

    fn check(&self) -> Result<(), PlacementError> {
        if self.valid {
            Ok(())
        } else {
            Err(PlacementError::NotInitialized)
        }
    }

    /// Maps a point expressed in the mother frame into the child frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn mother_to_child(&self, point: &Point3) -> Result<Point3, PlacementError> {
        self.check()?;
        Ok(Point3::from(
            self.rotation.inverse_transform_vector(&(point.coords - self.translation)),
        ))
    }

    /// Maps a point expressed in the child frame into the mother frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn child_to_mother(&self, point: &Point3) -> Result<Point3, PlacementError> {
        self.check()?;
        Ok(Point3::from(self.rotation * point.coords + self.translation))
    }

    /// Maps a direction from the mother frame into the child frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn mother_to_child_direction(&self, vec: &Vector3) -> Result<Vector3, PlacementError> {
        self.check()?;
        Ok(self.rotation.inverse_transform_vector(vec))
    }

    /// Maps a direction from the child frame into the mother frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn child_to_mother_direction(&self, vec: &Vector3) -> Result<Vector3, PlacementError> {
        self.check()?;
        Ok(self.rotation * vec)
    }

    /// The placement of the mother frame inside the child frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if the placement is invalid.
    pub fn inverse(&self) -> Result<Self, PlacementError> {
        self.check()?;
        let rotation = self.rotation.inverse();
        Ok(Self {
            translation: -(rotation * self.translation),
            rotation,
            valid: true,
        })
    }

    /// The placement of a grand-child (placed by `inner` in this child frame)
    /// expressed in the mother frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotInitialized`] if either placement is invalid.
    pub fn compose(&self, inner: &Placement) -> Result<Self, PlacementError> {
        self.check()?;
        inner.check()?;
        Ok(Self {
            translation: self.rotation * inner.translation + self.translation,
            rotation: self.rotation * inner.rotation,
            valid: true,
        })
    }

    /// ZYZ Euler angles `(phi, theta, delta)` in radians, `theta` in `[0, π]`.
    #[must_use]
    pub fn euler_zyz(&self) -> (f64, f64, f64) {
        let m = self.rotation.matrix();
        let theta = m[(2, 2)].clamp(-1.0, 1.0).acos();
        if theta.sin().abs() < 1e-9 {
            // Gimbal lock: only phi ± delta is defined, fold it all into phi.
            let phi = if m[(2, 2)] > 0.0 {
                m[(1, 0)].atan2(m[(0, 0)])
            } else {
                (-m[(1, 0)]).atan2(-m[(0, 0)])
            };
            return (phi, theta, 0.0);
        }
        let phi = m[(1, 2)].atan2(m[(0, 2)]);
        let delta = m[(2, 1)].atan2(-m[(2, 0)]);
        (phi, theta, delta)
    }

    /// The principal axis and angle when the rotation is about a single axis.
    #[must_use]
    pub fn principal_rotation(&self) -> Option<(Axis, f64)> {
        let m = self.rotation.matrix();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        if close(m[(2, 2)], 1.0) {
            Some((Axis::Z, m[(1, 0)].atan2(m[(0, 0)])))
        } else if close(m[(0, 0)], 1.0) {
            Some((Axis::X, m[(2, 1)].atan2(m[(1, 1)])))
        } else if close(m[(1, 1)], 1.0) {
            Some((Axis::Y, m[(0, 2)].atan2(m[(0, 0)])))
        } else {
            None
        }
    }
}
