pub mod surface;

pub use surface::{FaceInfo, FaceSurface, Surface, SurfaceDomain};
