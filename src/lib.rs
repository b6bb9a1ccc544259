pub mod bounding;
pub mod config;
pub mod csg;
pub mod error;
pub mod face;
pub mod factory;
pub mod geometry;
pub mod math;
pub mod placement;
pub mod shapes;
pub mod tessellation;

pub use error::{GeosolidError, Result};
pub use face::{FaceIdentifier, FaceInterceptInfo};
pub use factory::{ShapeFactory, ShapeRegistry};
pub use placement::Placement;
pub use shapes::{Shape, ShapeKind, Solid, WireRenderable};
