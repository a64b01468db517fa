//! Geometry Kernel Boundary
//!
//! This crate provides:
//! - The `GeometryKernel` trait consumed by part construction code
//! - Opaque `Shape` handles and kernel errors
//! - A `NullKernel` and an in-memory bookkeeping kernel

pub mod kernel;

// Re-exports for convenience
pub use kernel::{
    Aabb, BooleanType, EdgeId, EdgeInfo, GeometryKernel, KernelError, KernelResult, MemoryKernel,
    NullKernel, Profile, Shape, ShapeKind, default_kernel,
};
