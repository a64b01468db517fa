//! In-memory kernel backend
//!
//! Keeps a record per shape (what produced it, its bounds and its straight
//! edges) without any B-Rep evaluation. Enough to drive part construction,
//! read back built dimensions and catch degenerate inputs.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{
    Aabb, BooleanType, EdgeId, EdgeInfo, GeometryKernel, KernelError, KernelResult, Profile, Shape,
};

/// Smallest length accepted for primitive dimensions
const MIN_LENGTH: f32 = 1e-6;

/// How a shape was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Cylinder,
    Extrusion,
    Boolean(BooleanType),
    Compound,
    Fillet,
    Chamfer,
    Transformed,
}

#[derive(Debug, Clone)]
struct ShapeRecord {
    kind: ShapeKind,
    bounds: Aabb,
    /// Straight edges as (start, end)
    edges: Vec<(Vec3, Vec3)>,
}

/// Bookkeeping kernel that stores shape records in memory
pub struct MemoryKernel {
    /// Storage for shape records (keyed by UUID)
    shapes: Mutex<HashMap<Uuid, ShapeRecord>>,
}

impl MemoryKernel {
    /// Create a new, empty kernel
    pub fn new() -> Self {
        Self {
            shapes: Mutex::new(HashMap::new()),
        }
    }

    /// Number of shapes created so far
    pub fn shape_count(&self) -> usize {
        self.shapes.lock().len()
    }

    /// How a shape was produced, `None` for unknown handles
    pub fn kind(&self, shape: &Shape) -> Option<ShapeKind> {
        self.shapes.lock().get(&shape.id).map(|r| r.kind)
    }

    fn store(&self, record: ShapeRecord) -> Shape {
        let id = Uuid::new_v4();
        tracing::debug!(
            "memory kernel: {:?} {} [{:?} .. {:?}]",
            record.kind,
            id,
            record.bounds.min,
            record.bounds.max
        );
        self.shapes.lock().insert(id, record);
        Shape::new(id)
    }

    fn record(&self, shape: &Shape) -> KernelResult<ShapeRecord> {
        self.shapes
            .lock()
            .get(&shape.id)
            .cloned()
            .ok_or(KernelError::UnknownShape(shape.id))
    }

    fn check_edges(&self, shape: &Shape, record: &ShapeRecord, edges: &[EdgeId]) -> KernelResult<f32> {
        if edges.is_empty() {
            return Err(KernelError::OperationFailed("No edges selected".into()));
        }
        let mut shortest = f32::INFINITY;
        for edge in edges {
            let segment = record
                .edges
                .get(edge.index as usize)
                .filter(|_| edge.shape_id == shape.id)
                .ok_or(KernelError::UnknownEdge {
                    shape_id: shape.id,
                    index: edge.index,
                })?;
            shortest = shortest.min((segment.1 - segment.0).length());
        }
        Ok(shortest)
    }

    fn modified(
        &self,
        shape: &Shape,
        edges: &[EdgeId],
        size: f32,
        kind: ShapeKind,
    ) -> KernelResult<Shape> {
        let record = self.record(shape)?;
        let shortest = self.check_edges(shape, &record, edges)?;
        if size <= 0.0 || size * 2.0 >= shortest {
            return Err(KernelError::OperationFailed(format!(
                "{:?} size {} does not fit edges of length {}",
                kind, size, shortest
            )));
        }
        Ok(self.store(ShapeRecord { kind, ..record }))
    }
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn bounds_of(points: &[Vec3]) -> KernelResult<Aabb> {
    Aabb::from_points(points).ok_or_else(|| KernelError::InvalidPrimitive("No points".into()))
}

impl GeometryKernel for MemoryKernel {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn make_box(&self, corner: Vec3, edges: [Vec3; 3]) -> KernelResult<Shape> {
        let [a, b, c] = edges;
        if edges.iter().any(|e| e.length() < MIN_LENGTH) {
            return Err(KernelError::InvalidPrimitive(format!(
                "Box edge too short: {:?}",
                edges
            )));
        }
        if a.cross(b).dot(c).abs() < MIN_LENGTH {
            return Err(KernelError::InvalidPrimitive("Box has no volume".into()));
        }

        let p = |i: f32, j: f32, k: f32| corner + a * i + b * j + c * k;
        let corners = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(0.0, 1.0, 1.0),
            p(1.0, 1.0, 1.0),
        ];
        let pairs = [
            (0, 1),
            (2, 3),
            (4, 5),
            (6, 7),
            (0, 2),
            (1, 3),
            (4, 6),
            (5, 7),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Box,
            bounds: bounds_of(&corners)?,
            edges: pairs.iter().map(|&(i, j)| (corners[i], corners[j])).collect(),
        }))
    }

    fn make_cylinder(&self, base_center: Vec3, axis: Vec3, radius: f32) -> KernelResult<Shape> {
        if radius < MIN_LENGTH {
            return Err(KernelError::InvalidPrimitive(format!(
                "Cylinder radius must be positive, got {}",
                radius
            )));
        }
        let dir = axis.try_normalize().ok_or_else(|| {
            KernelError::InvalidPrimitive("Cylinder axis has zero length".into())
        })?;

        // A disc of radius r normal to `dir` reaches r * sqrt(1 - dir_i^2) along axis i
        let reach = Vec3::new(
            (1.0 - dir.x * dir.x).max(0.0).sqrt(),
            (1.0 - dir.y * dir.y).max(0.0).sqrt(),
            (1.0 - dir.z * dir.z).max(0.0).sqrt(),
        ) * radius;
        let top = base_center + axis;
        let bounds = Aabb {
            min: base_center.min(top) - reach,
            max: base_center.max(top) + reach,
        };
        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Cylinder,
            bounds,
            edges: Vec::new(),
        }))
    }

    fn extrude(
        &self,
        profile: &Profile,
        origin: Vec3,
        u: Vec3,
        v: Vec3,
        direction: Vec3,
    ) -> KernelResult<Shape> {
        if profile.points.len() < 3 {
            return Err(KernelError::InvalidPrimitive(
                "Profile needs at least 3 points".into(),
            ));
        }
        if direction.length() < MIN_LENGTH || u.cross(v).length() < MIN_LENGTH {
            return Err(KernelError::InvalidPrimitive(
                "Degenerate extrusion plane or direction".into(),
            ));
        }

        let base: Vec<Vec3> = profile
            .points
            .iter()
            .map(|p| origin + u * p.x + v * p.y)
            .collect();
        let top: Vec<Vec3> = base.iter().map(|p| *p + direction).collect();

        let n = base.len();
        let mut edges = Vec::with_capacity(n * 3);
        for i in 0..n {
            let j = (i + 1) % n;
            edges.push((base[i], base[j]));
            edges.push((top[i], top[j]));
            edges.push((base[i], top[i]));
        }

        let all: Vec<Vec3> = base.iter().chain(top.iter()).copied().collect();
        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Extrusion,
            bounds: bounds_of(&all)?,
            edges,
        }))
    }

    fn boolean(&self, a: &Shape, b: &Shape, op: BooleanType) -> KernelResult<Shape> {
        let ra = self.record(a)?;
        let rb = self.record(b)?;

        let (bounds, edges) = match op {
            BooleanType::Union => {
                let mut edges = ra.edges;
                edges.extend(rb.edges);
                (ra.bounds.union(&rb.bounds), edges)
            }
            BooleanType::Subtract => (ra.bounds, ra.edges),
            BooleanType::Intersect => {
                let bounds = ra.bounds.intersection(&rb.bounds).ok_or_else(|| {
                    KernelError::BooleanFailed("Intersection of disjoint shapes is empty".into())
                })?;
                (bounds, Vec::new())
            }
        };

        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Boolean(op),
            bounds,
            edges,
        }))
    }

    fn compound(&self, shapes: &[Shape]) -> KernelResult<Shape> {
        let mut records = Vec::with_capacity(shapes.len());
        for shape in shapes {
            records.push(self.record(shape)?);
        }
        let (first, rest) = records
            .split_first()
            .ok_or_else(|| KernelError::OperationFailed("Empty compound".into()))?;

        let mut bounds = first.bounds;
        let mut edges = first.edges.clone();
        for r in rest {
            bounds = bounds.union(&r.bounds);
            edges.extend(r.edges.iter().copied());
        }
        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Compound,
            bounds,
            edges,
        }))
    }

    fn edges(&self, shape: &Shape) -> KernelResult<Vec<EdgeInfo>> {
        let record = self.record(shape)?;
        Ok(record
            .edges
            .iter()
            .enumerate()
            .map(|(i, (start, end))| EdgeInfo::new(EdgeId::new(shape.id, i as u32), *start, *end))
            .collect())
    }

    fn fillet(&self, shape: &Shape, edges: &[EdgeId], radius: f32) -> KernelResult<Shape> {
        self.modified(shape, edges, radius, ShapeKind::Fillet)
    }

    fn chamfer(&self, shape: &Shape, edges: &[EdgeId], distance: f32) -> KernelResult<Shape> {
        self.modified(shape, edges, distance, ShapeKind::Chamfer)
    }

    fn transformed(
        &self,
        shape: &Shape,
        rotation: Quat,
        translation: Vec3,
    ) -> KernelResult<Shape> {
        let record = self.record(shape)?;
        let map = |p: Vec3| rotation * p + translation;
        let corners = record.bounds.corners().map(map);
        Ok(self.store(ShapeRecord {
            kind: ShapeKind::Transformed,
            bounds: bounds_of(&corners)?,
            edges: record.edges.iter().map(|(s, e)| (map(*s), map(*e))).collect(),
        }))
    }

    fn bounding_box(&self, shape: &Shape) -> KernelResult<Aabb> {
        Ok(self.record(shape)?.bounds)
    }
}
