//! Configuration property sets and the shape definition text format.

mod parse;

pub use parse::{parse_definitions, Declaration};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::units::{angle_unit, length_unit, UnitKind};

/// Key holding the default length unit of a property set.
pub const LENGTH_UNIT_KEY: &str = "length_unit";

/// Key holding the default angle unit of a property set.
pub const ANGLE_UNIT_KEY: &str = "angle_unit";

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    /// A real number. When `unit` is set the value is already expressed in
    /// internal units (mm, radian); otherwise the reader's default unit
    /// applies.
    Real {
        value: f64,
        unit: Option<UnitKind>,
    },
    Text(String),
    TextList(Vec<String>),
}

/// An ordered set of named properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    entries: BTreeMap<String, Value>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// A real without unit.
    pub fn set_real(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.insert(key, Value::Real { value, unit: None })
    }

    /// A length already expressed in mm.
    pub fn set_length(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.insert(
            key,
            Value::Real {
                value,
                unit: Some(UnitKind::Length),
            },
        )
    }

    /// An angle already expressed in radians.
    pub fn set_angle(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.insert(
            key,
            Value::Real {
                value,
                unit: Some(UnitKind::Angle),
            },
        )
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.insert(key, Value::Text(value.into()))
    }

    pub fn set_boolean(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.insert(key, Value::Boolean(value))
    }

    pub fn set_integer(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.insert(key, Value::Integer(value))
    }

    pub fn set_text_list(&mut self, key: impl Into<String>, values: Vec<String>) -> &mut Self {
        self.insert(key, Value::TextList(values))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fetch(&self, key: &str) -> Result<&Value, ConfigError> {
        self.entries
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    fn wrong_type(key: &str, expected: &'static str) -> ConfigError {
        ConfigError::WrongType {
            key: key.to_string(),
            expected,
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_boolean(&self, key: &str) -> Result<bool, ConfigError> {
        match self.fetch(key)? {
            Value::Boolean(b) => Ok(*b),
            _ => Err(Self::wrong_type(key, "boolean")),
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_integer(&self, key: &str) -> Result<i64, ConfigError> {
        match self.fetch(key)? {
            Value::Integer(i) => Ok(*i),
            _ => Err(Self::wrong_type(key, "integer")),
        }
    }

    /// A real value as stored, ignoring units. Integers are widened.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_real(&self, key: &str) -> Result<f64, ConfigError> {
        match self.fetch(key)? {
            Value::Real { value, .. } => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(Self::wrong_type(key, "real")),
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_text(&self, key: &str) -> Result<&str, ConfigError> {
        match self.fetch(key)? {
            Value::Text(s) => Ok(s),
            _ => Err(Self::wrong_type(key, "string")),
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_text_list(&self, key: &str) -> Result<&[String], ConfigError> {
        match self.fetch(key)? {
            Value::TextList(v) => Ok(v),
            _ => Err(Self::wrong_type(key, "string[]")),
        }
    }

    fn fetch_dimensioned(&self, key: &str, kind: UnitKind, default_unit: f64) -> Result<f64, ConfigError> {
        match self.fetch(key)? {
            Value::Real { value, unit: None } => Ok(value * default_unit),
            Value::Real {
                value,
                unit: Some(k),
            } if *k == kind => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(*i as f64 * default_unit),
            _ => Err(Self::wrong_type(key, kind.label())),
        }
    }

    /// A length in mm. Values without an explicit unit are scaled by
    /// `default_unit`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingKey`], or [`ConfigError::WrongType`] when the value
    /// is not a real or carries an angle unit.
    pub fn fetch_length(&self, key: &str, default_unit: f64) -> Result<f64, ConfigError> {
        self.fetch_dimensioned(key, UnitKind::Length, default_unit)
    }

    /// An angle in radians. Values without an explicit unit are scaled by
    /// `default_unit`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingKey`] or [`ConfigError::WrongType`].
    pub fn fetch_angle(&self, key: &str, default_unit: f64) -> Result<f64, ConfigError> {
        self.fetch_dimensioned(key, UnitKind::Angle, default_unit)
    }

    /// Default length unit declared by `length_unit`, mm when absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownUnit`] or [`ConfigError::WrongType`].
    pub fn length_unit(&self) -> Result<f64, ConfigError> {
        if self.has(LENGTH_UNIT_KEY) {
            length_unit(self.fetch_text(LENGTH_UNIT_KEY)?)
        } else {
            Ok(1.0)
        }
    }

    /// Default angle unit declared by `angle_unit`, degree when absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownUnit`] or [`ConfigError::WrongType`].
    pub fn angle_unit(&self) -> Result<f64, ConfigError> {
        angle_unit(if self.has(ANGLE_UNIT_KEY) {
            self.fetch_text(ANGLE_UNIT_KEY)?
        } else {
            UnitKind::Angle.default_symbol()
        })
    }

    /// Reads a length using the set's own default unit.
    ///
    /// # Errors
    ///
    /// See [`fetch_length`](Self::fetch_length) and [`length_unit`](Self::length_unit).
    pub fn length(&self, key: &str) -> Result<f64, ConfigError> {
        self.fetch_length(key, self.length_unit()?)
    }

    /// Reads an optional length using the set's own default unit.
    ///
    /// # Errors
    ///
    /// See [`length`](Self::length).
    pub fn length_opt(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        if self.has(key) {
            self.length(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads an optional angle using the set's own default unit.
    ///
    /// # Errors
    ///
    /// See [`fetch_angle`](Self::fetch_angle) and [`angle_unit`](Self::angle_unit).
    pub fn angle_opt(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        if self.has(key) {
            self.fetch_angle(key, self.angle_unit()?).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Properties whose key starts with `prefix.`, with the prefix removed.
    #[must_use]
    pub fn subset(&self, prefix: &str) -> Properties {
        let entries = self
            .entries
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect();
        Properties { entries }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn typed_fetch() {
        let mut p = Properties::new();
        p.set_boolean("flag", true)
            .set_integer("n", 3)
            .set_text("name", "b0")
            .set_real("x", 2.0);
        assert!(p.fetch_boolean("flag").unwrap());
        assert_eq!(p.fetch_integer("n").unwrap(), 3);
        assert_eq!(p.fetch_text("name").unwrap(), "b0");
        assert_relative_eq!(p.fetch_real("x").unwrap(), 2.0);
        assert_relative_eq!(p.fetch_real("n").unwrap(), 3.0);
    }

    #[test]
    fn missing_and_wrong_type() {
        let mut p = Properties::new();
        p.set_text("name", "b0");
        assert_eq!(p.fetch_real("x"), Err(ConfigError::MissingKey("x".into())));
        assert_eq!(
            p.fetch_real("name"),
            Err(ConfigError::WrongType {
                key: "name".into(),
                expected: "real"
            })
        );
    }

    #[test]
    fn default_length_unit_applies_to_bare_reals() {
        let mut p = Properties::new();
        p.set_text(LENGTH_UNIT_KEY, "cm").set_real("x", 2.0).set_length("y", 5.0);
        assert_relative_eq!(p.length("x").unwrap(), 20.0);
        assert_relative_eq!(p.length("y").unwrap(), 5.0);
        assert!(p.length_opt("z").unwrap().is_none());
    }

    #[test]
    fn angle_defaults_to_degree() {
        let mut p = Properties::new();
        p.set_real("a", 180.0);
        assert_relative_eq!(p.fetch_angle("a", p.angle_unit().unwrap()).unwrap(), std::f64::consts::PI);
    }

    #[test]
    fn optional_angle_follows_the_angle_unit() {
        let mut p = Properties::new();
        p.set_text(ANGLE_UNIT_KEY, "rad").set_real("a", 0.5).set_angle("b", 2.0);
        assert_relative_eq!(p.angle_opt("a").unwrap().unwrap(), 0.5);
        assert_relative_eq!(p.angle_opt("b").unwrap().unwrap(), 2.0);
        assert!(p.angle_opt("c").unwrap().is_none());
    }

    #[test]
    fn angle_unit_value_rejected_as_length() {
        let mut p = Properties::new();
        p.set_angle("a", 1.0);
        assert!(matches!(p.length("a"), Err(ConfigError::WrongType { .. })));
    }

    #[test]
    fn unknown_default_unit() {
        let mut p = Properties::new();
        p.set_text(LENGTH_UNIT_KEY, "parsec-ish").set_real("x", 1.0);
        assert!(matches!(p.length("x"), Err(ConfigError::UnknownUnit { .. })));
    }

    #[test]
    fn subset_strips_prefix() {
        let mut p = Properties::new();
        p.set_text("first_shape.name", "a")
            .set_text("second_shape.name", "b")
            .set_text("second_shape.placement", "0 0 1");
        let second = p.subset("second_shape");
        assert_eq!(second.len(), 2);
        assert_eq!(second.fetch_text("placement").unwrap(), "0 0 1");
    }
}
