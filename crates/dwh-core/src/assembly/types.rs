//! Child bookkeeping for assemblies

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::frame::{Axis, DwhIndex};
use crate::part::{Part, PartError, PartResult};
use crate::placement::Placement;

/// Index of a child in its assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChildId(pub(crate) usize);

impl std::fmt::Display for ChildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a child contributes when the assembly is merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChildRole {
    /// Fused into the result
    #[default]
    Solid,
    /// Subtracted from the fused solids
    Cutter,
}

type DeferredOffset = Box<dyn FnOnce(&Siblings<'_>) -> PartResult<Vec3>>;

/// Offset of a child from the assembly origin
pub enum Offset {
    Fixed(Vec3),
    /// Computed once every sibling is built
    Deferred(DeferredOffset),
}

impl Offset {
    /// Offset computed from the siblings' built dimensions
    pub fn deferred<F>(compute: F) -> Self
    where
        F: FnOnce(&Siblings<'_>) -> PartResult<Vec3> + 'static,
    {
        Offset::Deferred(Box::new(compute))
    }
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Fixed(Vec3::ZERO)
    }
}

impl std::fmt::Debug for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Offset::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Offset::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Vec3> for Offset {
    fn from(v: Vec3) -> Self {
        Offset::Fixed(v)
    }
}

/// A registered child and its pending offset
#[derive(Debug)]
pub(crate) struct ChildSlot {
    pub part: Part,
    pub role: ChildRole,
    pub offset: Offset,
}

/// Read-only view of an assembly's children while offsets are computed
///
/// Points are returned relative to the assembly origin, with each child's
/// resolved offset applied.
pub struct Siblings<'a> {
    slots: &'a [ChildSlot],
    resolved: &'a [Option<Vec3>],
}

impl<'a> Siblings<'a> {
    pub(crate) fn new(slots: &'a [ChildSlot], resolved: &'a [Option<Vec3>]) -> Self {
        Self { slots, resolved }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn part(&self, id: ChildId) -> PartResult<&'a Part> {
        self.slots
            .get(id.0)
            .map(|slot| &slot.part)
            .ok_or(PartError::ChildNotFound(id))
    }

    /// Resolved offset of a sibling
    pub fn offset(&self, id: ChildId) -> PartResult<Vec3> {
        self.part(id)?;
        self.resolved
            .get(id.0)
            .copied()
            .flatten()
            .ok_or(PartError::PlacementPending(id))
    }

    /// Where the sibling will sit, relative to the assembly origin
    pub fn placement(&self, id: ChildId) -> PartResult<Placement> {
        let rotation = self.part(id)?.placement().rotation;
        Ok(Placement::place_at(rotation, self.offset(id)?))
    }

    pub fn point(&self, id: ChildId, d: i32, w: i32, h: i32) -> PartResult<Vec3> {
        self.point_at(id, DwhIndex::new(d, w, h))
    }

    pub fn point_at(&self, id: ChildId, index: DwhIndex) -> PartResult<Vec3> {
        let local = self.part(id)?.point_at(index)?;
        Ok(self.placement(id)?.apply(local))
    }

    pub fn axis_point(&self, id: ChildId, axis: Axis, index: i32) -> PartResult<Vec3> {
        let local = self.part(id)?.axis_point(axis, index)?;
        Ok(self.placement(id)?.apply(local))
    }
}
