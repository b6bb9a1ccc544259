use thiserror::Error;

/// Top-level error type for the geosolid kernel.
#[derive(Debug, Error)]
pub enum GeosolidError {
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Face(#[from] FaceError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Errors raised by rigid placements.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    #[error("placement not initialized")]
    NotInitialized,

    #[error("rotation matrix is not orthonormal (det = {determinant})")]
    NotOrthonormal { determinant: f64 },

    #[error("cannot parse placement '{input}': {reason}")]
    Parse { input: String, reason: String },
}

/// Errors raised while decoding or using face identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaceError {
    #[error("cannot parse face identifier '{input}': {reason}")]
    Parse { input: String, reason: String },
}

/// Errors related to geometric computations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,

    #[error("parameter out of range: {0}")]
    ParameterOutOfRange(String),
}

/// Errors raised by solids.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("invalid {shape} parameter {parameter} = {value}")]
    InvalidParameter {
        shape: &'static str,
        parameter: &'static str,
        value: f64,
    },

    #[error("invalid {0} shape")]
    InvalidShape(&'static str),

    #[error("{shape} has no face matching {face}")]
    InvalidFace { shape: &'static str, face: String },
}

/// Errors raised while reading configuration properties or definition text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing property '{0}'")]
    MissingKey(String),

    #[error("property '{key}' is not of type {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("unknown {kind} unit '{unit}'")]
    UnknownUnit { kind: &'static str, unit: String },

    #[error("syntax error at line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("cannot read '{path}': {reason}")]
    Io { path: String, reason: String },
}

/// Errors raised by the shape registry and factory.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unregistered shape type '{0}'")]
    UnregisteredType(String),

    #[error("shape '{name}' of type '{type_id}' references undeclared shape '{reference}'")]
    UnresolvedReference {
        name: String,
        type_id: String,
        reference: String,
    },

    #[error("cyclic shape graph: {}", .cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    #[error("shape '{0}' already exists")]
    DuplicateName(String),

    #[error("no shape named '{0}'")]
    UnknownShape(String),

    #[error("cannot build shape '{name}' of type '{type_id}': {source}")]
    Build {
        name: String,
        type_id: String,
        #[source]
        source: Box<GeosolidError>,
    },
}

/// Convenience type alias for results using [`GeosolidError`].
pub type Result<T> = std::result::Result<T, GeosolidError>;
