//! Geometry kernel abstraction

mod memory;
mod traits;

pub use memory::{MemoryKernel, ShapeKind};
pub use traits::{
    Aabb, BooleanType, EdgeId, EdgeInfo, GeometryKernel, KernelError, KernelResult, NullKernel,
    Profile, Shape, default_kernel,
};
