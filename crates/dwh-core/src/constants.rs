//! Global constants for dwh-core

/// Default tolerance for comparing lengths and dot products
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Default manufacturing clearance added to holes (mm)
pub const DEFAULT_CLEARANCE: f32 = 0.4;

/// Above this |cos|, a canonical axis is too close to a given axis to derive a perpendicular from
pub const PARALLEL_THRESHOLD: f32 = 0.9;

/// Default color for parts (gray, RGBA)
pub const DEFAULT_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];
