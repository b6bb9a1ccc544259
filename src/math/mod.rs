pub mod roots;
pub mod units;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 rotation type.
pub type Rotation3 = nalgebra::Rotation3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Skin used when a caller has no better tolerance at hand (lengths in mm).
pub const DEFAULT_SKIN: f64 = 1e-6;

/// Returns the step used to sample either side of a boundary point.
///
/// Never smaller than [`DEFAULT_SKIN`] so that a zero skin still moves off the
/// boundary.
#[must_use]
pub fn neighbour_step(skin: f64) -> f64 {
    skin.max(DEFAULT_SKIN)
}

/// Azimuth of `(x, y)` in `[0, 2π)`.
#[must_use]
pub fn azimuth(x: f64, y: f64) -> f64 {
    let phi = y.atan2(x);
    if phi < 0.0 {
        phi + std::f64::consts::TAU
    } else {
        phi
    }
}
