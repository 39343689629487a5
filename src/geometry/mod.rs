pub mod mesh;
pub mod section;

pub use mesh::{Aabb, MeshError, TriangleMesh};
pub use section::{Section2D, Section3D};
