//! Unit symbols for lengths and angles.
//!
//! Internal units are millimetres and radians.

use crate::error::ConfigError;

/// Physical dimension of a unit symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum UnitKind {
    Length,
    Angle,
}

impl UnitKind {
    /// Name used in diagnostics and in the `as <kind>` definition syntax.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Length => "length",
            UnitKind::Angle => "angle",
        }
    }

    /// Parses `length` or `angle`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "length" => Some(UnitKind::Length),
            "angle" => Some(UnitKind::Angle),
            _ => None,
        }
    }

    /// Default symbol when none is given.
    #[must_use]
    pub fn default_symbol(self) -> &'static str {
        match self {
            UnitKind::Length => "mm",
            UnitKind::Angle => "degree",
        }
    }
}

fn lookup_length(word: &str) -> Option<f64> {
    let v = match word {
        "fm" | "fermi" => 1e-12,
        "angstrom" => 1e-7,
        "nm" | "nanometer" => 1e-6,
        "um" | "micrometer" => 1e-3,
        "mm" | "millimeter" => 1.0,
        "cm" | "centimeter" => 10.0,
        "m" | "meter" => 1000.0,
        "km" | "kilometer" => 1e6,
        "in" | "inch" => 25.4,
        _ => return None,
    };
    Some(v)
}

fn lookup_angle(word: &str) -> Option<f64> {
    let v = match word {
        "rad" | "radian" => 1.0,
        "mrad" | "milliradian" => 1e-3,
        "deg" | "degree" => std::f64::consts::PI / 180.0,
        _ => return None,
    };
    Some(v)
}

/// Returns the value of a length unit symbol in millimetres.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownUnit`] when the symbol is not a length unit.
pub fn length_unit(word: &str) -> Result<f64, ConfigError> {
    lookup_length(word).ok_or_else(|| ConfigError::UnknownUnit {
        kind: UnitKind::Length.label(),
        unit: word.to_string(),
    })
}

/// Returns the value of an angle unit symbol in radians.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownUnit`] when the symbol is not an angle unit.
pub fn angle_unit(word: &str) -> Result<f64, ConfigError> {
    lookup_angle(word).ok_or_else(|| ConfigError::UnknownUnit {
        kind: UnitKind::Angle.label(),
        unit: word.to_string(),
    })
}

/// Returns the value of `word` for the given dimension.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownUnit`] when the symbol does not belong to `kind`.
pub fn unit_value(kind: UnitKind, word: &str) -> Result<f64, ConfigError> {
    match kind {
        UnitKind::Length => length_unit(word),
        UnitKind::Angle => angle_unit(word),
    }
}

/// Guesses the dimension of a bare unit symbol.
#[must_use]
pub fn kind_of(word: &str) -> Option<UnitKind> {
    if lookup_length(word).is_some() {
        Some(UnitKind::Length)
    } else if lookup_angle(word).is_some() {
        Some(UnitKind::Angle)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn length_symbols() {
        assert!((length_unit("mm").unwrap() - 1.0).abs() < 1e-15);
        assert!((length_unit("cm").unwrap() - 10.0).abs() < 1e-15);
        assert!((length_unit("m").unwrap() - 1000.0).abs() < 1e-12);
        assert!((length_unit("inch").unwrap() - 25.4).abs() < 1e-12);
    }

    #[test]
    fn angle_symbols() {
        assert!((angle_unit("degree").unwrap() - std::f64::consts::PI / 180.0).abs() < 1e-15);
        assert!((angle_unit("rad").unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn unknown_symbol_is_reported_with_kind() {
        let err = length_unit("furlong").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownUnit {
                kind: "length",
                unit: "furlong".into()
            }
        );
        assert!(angle_unit("mm").is_err());
    }

    #[test]
    fn kind_guess() {
        assert_eq!(kind_of("cm"), Some(UnitKind::Length));
        assert_eq!(kind_of("deg"), Some(UnitKind::Angle));
        assert_eq!(kind_of("kg"), None);
    }
}
