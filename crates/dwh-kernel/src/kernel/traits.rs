//! Geometry kernel trait definitions
//!
//! These traits define the interface every geometry kernel backend implements.
//! Shapes are opaque handles: the frame and placement code only passes them
//! between kernel calls and never looks inside.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque handle to a shape owned by a kernel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier of the kernel-side data
    pub id: Uuid,
}

impl Shape {
    /// Create a handle for the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// Unique identifier for an edge within a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    /// ID of the shape this edge belongs to
    pub shape_id: Uuid,
    /// Index of the edge within the shape
    pub index: u32,
}

impl EdgeId {
    /// Create a new edge ID
    pub fn new(shape_id: Uuid, index: u32) -> Self {
        Self { shape_id, index }
    }
}

/// Information about a straight edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Start point of the edge
    pub start: Vec3,
    /// End point of the edge
    pub end: Vec3,
    /// Midpoint of the edge
    pub midpoint: Vec3,
    /// Length of the edge
    pub length: f32,
}

impl EdgeInfo {
    /// Create a new edge info
    pub fn new(id: EdgeId, start: Vec3, end: Vec3) -> Self {
        let midpoint = (start + end) * 0.5;
        let length = (end - start).length();
        Self {
            id,
            start,
            end,
            midpoint,
            length,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all the points, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self { min, max })
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlap of both boxes, `None` if they are disjoint
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmple(max).all() {
            Some(Aabb { min, max })
        } else {
            None
        }
    }

    /// The eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Error type for geometry kernel operations
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Unknown shape: {0}")]
    UnknownShape(Uuid),

    #[error("Edge {index} does not belong to shape {shape_id}")]
    UnknownEdge { shape_id: Uuid, index: u32 },

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// A closed planar polygon used as an extrusion profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Points defining the outline (in order, implicitly closed)
    pub points: Vec<Vec2>,
}

impl Profile {
    /// Create a profile from points
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Create a rectangle profile
    pub fn rectangle(center: Vec2, width: f32, height: f32) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(vec![
            center + Vec2::new(-hw, -hh),
            center + Vec2::new(hw, -hh),
            center + Vec2::new(hw, hh),
            center + Vec2::new(-hw, hh),
        ])
    }

    /// Create a regular polygon (approximated circle when `segments` is large)
    pub fn regular(center: Vec2, radius: f32, segments: u32) -> Self {
        let points: Vec<Vec2> = (0..segments)
            .map(|i| {
                let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
                center + Vec2::new(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        Self::new(points)
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (fuse)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// The geometry kernel trait
///
/// Every call either returns a new shape handle or fails; inputs are never
/// modified.
pub trait GeometryKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Create a box (parallelepiped)
    ///
    /// # Arguments
    /// * `corner` - The corner all three edges start from
    /// * `edges` - Edge vectors along the box's length, width and height
    fn make_box(&self, corner: Vec3, edges: [Vec3; 3]) -> KernelResult<Shape>;

    /// Create a cylinder
    ///
    /// # Arguments
    /// * `base_center` - Center of the base disc
    /// * `axis` - Vector from the base center to the top center
    /// * `radius` - Cylinder radius
    fn make_cylinder(&self, base_center: Vec3, axis: Vec3, radius: f32) -> KernelResult<Shape>;

    /// Extrude a planar profile
    ///
    /// # Arguments
    /// * `profile` - The closed 2D outline
    /// * `origin` - Where the profile's (0, 0) lies in 3D
    /// * `u` - 3D direction of the profile's x coordinate
    /// * `v` - 3D direction of the profile's y coordinate
    /// * `direction` - Extrusion vector (its length is the extrusion distance)
    fn extrude(
        &self,
        profile: &Profile,
        origin: Vec3,
        u: Vec3,
        v: Vec3,
        direction: Vec3,
    ) -> KernelResult<Shape>;

    /// Perform a boolean operation on two shapes
    fn boolean(&self, a: &Shape, b: &Shape, op: BooleanType) -> KernelResult<Shape>;

    /// Subtract `tool` from `base`
    fn cut(&self, base: &Shape, tool: &Shape) -> KernelResult<Shape> {
        self.boolean(base, tool, BooleanType::Subtract)
    }

    /// Fuse two shapes
    fn fuse(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.boolean(a, b, BooleanType::Union)
    }

    /// Fuse any number of shapes into one
    fn multi_fuse(&self, shapes: &[Shape]) -> KernelResult<Shape> {
        let (first, rest) = shapes
            .split_first()
            .ok_or_else(|| KernelError::BooleanFailed("Nothing to fuse".into()))?;
        let mut result = first.clone();
        for shape in rest {
            result = self.fuse(&result, shape)?;
        }
        Ok(result)
    }

    /// Collect shapes into a compound without fusing them
    fn compound(&self, shapes: &[Shape]) -> KernelResult<Shape>;

    /// Get all straight edges of a shape
    fn edges(&self, shape: &Shape) -> KernelResult<Vec<EdgeInfo>>;

    /// Apply fillet (rounded edge) to selected edges
    fn fillet(&self, shape: &Shape, edges: &[EdgeId], radius: f32) -> KernelResult<Shape>;

    /// Apply chamfer (beveled edge) to selected edges
    fn chamfer(&self, shape: &Shape, edges: &[EdgeId], distance: f32) -> KernelResult<Shape>;

    /// Copy of a shape moved by a rotation about the world origin followed by a translation
    fn transformed(&self, shape: &Shape, rotation: Quat, translation: Vec3)
    -> KernelResult<Shape>;

    /// Axis-aligned bounds of a shape
    fn bounding_box(&self, shape: &Shape) -> KernelResult<Aabb>;
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

fn unavailable<T>() -> KernelResult<T> {
    Err(KernelError::KernelNotAvailable(
        "No geometry kernel available".into(),
    ))
}

impl GeometryKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn make_box(&self, _corner: Vec3, _edges: [Vec3; 3]) -> KernelResult<Shape> {
        unavailable()
    }

    fn make_cylinder(&self, _base_center: Vec3, _axis: Vec3, _radius: f32) -> KernelResult<Shape> {
        unavailable()
    }

    fn extrude(
        &self,
        _profile: &Profile,
        _origin: Vec3,
        _u: Vec3,
        _v: Vec3,
        _direction: Vec3,
    ) -> KernelResult<Shape> {
        unavailable()
    }

    fn boolean(&self, _a: &Shape, _b: &Shape, _op: BooleanType) -> KernelResult<Shape> {
        unavailable()
    }

    fn compound(&self, _shapes: &[Shape]) -> KernelResult<Shape> {
        unavailable()
    }

    fn edges(&self, _shape: &Shape) -> KernelResult<Vec<EdgeInfo>> {
        unavailable()
    }

    fn fillet(&self, _shape: &Shape, _edges: &[EdgeId], _radius: f32) -> KernelResult<Shape> {
        unavailable()
    }

    fn chamfer(&self, _shape: &Shape, _edges: &[EdgeId], _distance: f32) -> KernelResult<Shape> {
        unavailable()
    }

    fn transformed(
        &self,
        _shape: &Shape,
        _rotation: Quat,
        _translation: Vec3,
    ) -> KernelResult<Shape> {
        unavailable()
    }

    fn bounding_box(&self, _shape: &Shape) -> KernelResult<Aabb> {
        unavailable()
    }
}

/// Get the default kernel
pub fn default_kernel() -> Box<dyn GeometryKernel> {
    Box::new(super::MemoryKernel::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_union_and_intersection() {
        let a = Aabb {
            min: Vec3::ZERO,
            max: Vec3::splat(2.0),
        };
        let b = Aabb {
            min: Vec3::splat(1.0),
            max: Vec3::splat(3.0),
        };
        assert_eq!(a.union(&b).max, Vec3::splat(3.0));
        assert_eq!(a.intersection(&b).map(|i| i.min), Some(Vec3::splat(1.0)));

        let far = Aabb {
            min: Vec3::splat(5.0),
            max: Vec3::splat(6.0),
        };
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_null_kernel_is_unavailable() {
        let kernel = NullKernel;
        assert!(!kernel.is_available());
        assert!(matches!(
            kernel.make_box(Vec3::ZERO, [Vec3::X, Vec3::Y, Vec3::Z]),
            Err(KernelError::KernelNotAvailable(_))
        ));
    }

    #[test]
    fn test_profile_rectangle() {
        let rect = Profile::rectangle(Vec2::ZERO, 4.0, 2.0);
        assert_eq!(rect.points.len(), 4);
        assert_eq!(rect.points[2], Vec2::new(2.0, 1.0));
    }
}
