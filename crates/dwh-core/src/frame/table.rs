//! Reference point tables
//!
//! Per-axis maps from integer index to an offset from the part's local
//! origin. Index 0 always exists. On a centered axis, negative indices mirror
//! the positive ones and are never stored.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{Axis, AxisTriple, DwhIndex, FrameError, FrameResult};
use crate::constants::DEFAULT_TOLERANCE;

/// What index 0 of an axis stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisAnchor {
    /// Index 0 is the symmetry center; `-i` mirrors `i`
    Centered,
    /// Index 0 is an edge; indices follow the direction of travel
    #[default]
    Edge,
}

/// Reference points along one axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTable {
    axis: Axis,
    unit: Vec3,
    anchor: AxisAnchor,
    offsets: BTreeMap<i32, Vec3>,
}

impl AxisTable {
    fn new(axis: Axis, unit: Vec3) -> Self {
        Self {
            axis,
            unit,
            anchor: AxisAnchor::Edge,
            offsets: BTreeMap::from([(0, Vec3::ZERO)]),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Unit vector the scalar offsets are measured along
    pub fn unit(&self) -> Vec3 {
        self.unit
    }

    pub fn anchor(&self) -> AxisAnchor {
        self.anchor
    }

    /// Offset of `index` from the local origin
    pub fn lookup(&self, index: i32) -> FrameResult<Vec3> {
        if let Some(offset) = self.offsets.get(&index) {
            return Ok(*offset);
        }
        if self.anchor == AxisAnchor::Centered && index < 0 {
            if let Some(offset) = index.checked_neg().and_then(|i| self.offsets.get(&i)) {
                return Ok(-*offset);
            }
        }
        Err(FrameError::UndefinedReferencePoint {
            axis: self.axis,
            index,
        })
    }

    pub fn contains(&self, index: i32) -> bool {
        self.lookup(index).is_ok()
    }

    /// All queryable indices in ascending order, mirrored ones included
    pub fn indices(&self) -> Vec<i32> {
        let mut indices: Vec<i32> = self.offsets.keys().copied().collect();
        if self.anchor == AxisAnchor::Centered {
            indices.extend(self.offsets.keys().filter(|i| **i > 0).map(|i| -i));
            indices.sort_unstable();
        }
        indices
    }
}

/// Reference points of a part along d, w and h
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    d: AxisTable,
    w: AxisTable,
    h: AxisTable,
}

impl ReferenceTable {
    /// Start a table for the given axes; every axis begins edge-anchored with only index 0
    pub fn builder(axes: &AxisTriple) -> ReferenceTableBuilder {
        ReferenceTableBuilder::new(axes)
    }

    pub fn axis(&self, axis: Axis) -> &AxisTable {
        match axis {
            Axis::D => &self.d,
            Axis::W => &self.w,
            Axis::H => &self.h,
        }
    }

    pub fn lookup(&self, axis: Axis, index: i32) -> FrameResult<Vec3> {
        self.axis(axis).lookup(index)
    }

    /// Sum of the three offsets selected by a dwh index
    pub fn lookup_dwh(&self, index: DwhIndex) -> FrameResult<Vec3> {
        Ok(self.d.lookup(index.d)? + self.w.lookup(index.w)? + self.h.lookup(index.h)?)
    }

    pub fn anchor(&self, axis: Axis) -> AxisAnchor {
        self.axis(axis).anchor
    }

    /// Fail if the caller's assumption about an axis' symmetry is wrong
    pub fn require_anchor(&self, axis: Axis, assumed: AxisAnchor) -> FrameResult<()> {
        let declared = self.anchor(axis);
        if declared == assumed {
            Ok(())
        } else {
            Err(FrameError::InconsistentSymmetryFlag {
                axis,
                declared,
                assumed,
            })
        }
    }

    pub fn contains(&self, axis: Axis, index: i32) -> bool {
        self.axis(axis).contains(index)
    }

    pub fn indices(&self, axis: Axis) -> Vec<i32> {
        self.axis(axis).indices()
    }
}

/// Builder enforcing the table invariants while a part declares its points
#[derive(Debug, Clone)]
pub struct ReferenceTableBuilder {
    table: ReferenceTable,
    tolerance: f32,
}

impl ReferenceTableBuilder {
    fn new(axes: &AxisTriple) -> Self {
        Self {
            table: ReferenceTable {
                d: AxisTable::new(Axis::D, axes.d()),
                w: AxisTable::new(Axis::W, axes.w()),
                h: AxisTable::new(Axis::H, axes.h()),
            },
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Tolerance for the "centered index 0 is zero" check
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisTable {
        match axis {
            Axis::D => &mut self.table.d,
            Axis::W => &mut self.table.w,
            Axis::H => &mut self.table.h,
        }
    }

    /// Declare index 0 of `axis` as the symmetry center
    pub fn centered(&mut self, axis: Axis) -> FrameResult<&mut Self> {
        self.anchor(axis, AxisAnchor::Centered)
    }

    /// Declare index 0 of `axis` as an edge
    pub fn edge(&mut self, axis: Axis) -> FrameResult<&mut Self> {
        self.anchor(axis, AxisAnchor::Edge)
    }

    /// Declare the anchor of an axis, checking entries already set
    pub fn anchor(&mut self, axis: Axis, anchor: AxisAnchor) -> FrameResult<&mut Self> {
        let tolerance = self.tolerance;
        let table = self.axis_mut(axis);
        if anchor == AxisAnchor::Centered {
            let conflicting = table.offsets.range(..0).next().is_some()
                || table
                    .offsets
                    .get(&0)
                    .is_some_and(|o| !o.abs_diff_eq(Vec3::ZERO, tolerance));
            if conflicting {
                return Err(FrameError::InconsistentSymmetryFlag {
                    axis,
                    declared: AxisAnchor::Edge,
                    assumed: AxisAnchor::Centered,
                });
            }
        }
        table.anchor = anchor;
        Ok(self)
    }

    /// Store `scalar * unit(axis)` at `index`
    pub fn set(&mut self, axis: Axis, index: i32, scalar: f32) -> FrameResult<&mut Self> {
        let offset = self.table.axis(axis).unit * scalar;
        self.set_vec(axis, index, offset)
    }

    /// Store a raw offset at `index`
    pub fn set_vec(&mut self, axis: Axis, index: i32, offset: Vec3) -> FrameResult<&mut Self> {
        let tolerance = self.tolerance;
        let table = self.axis_mut(axis);
        if table.anchor == AxisAnchor::Centered
            && (index < 0 || (index == 0 && !offset.abs_diff_eq(Vec3::ZERO, tolerance)))
        {
            return Err(FrameError::InconsistentSymmetryFlag {
                axis,
                declared: AxisAnchor::Centered,
                assumed: AxisAnchor::Edge,
            });
        }
        table.offsets.insert(index, offset);
        Ok(self)
    }

    /// Lookup against the entries declared so far
    pub fn lookup(&self, axis: Axis, index: i32) -> FrameResult<Vec3> {
        self.table.lookup(axis, index)
    }

    /// Copy of the table as declared so far
    pub fn snapshot(&self) -> ReferenceTable {
        self.table.clone()
    }

    /// Freeze the table
    pub fn build(self) -> ReferenceTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ReferenceTableBuilder {
        ReferenceTable::builder(&AxisTriple::CANONICAL)
    }

    #[test]
    fn test_index_zero_always_present() {
        let table = builder().build();
        for axis in Axis::ALL {
            assert_eq!(table.lookup(axis, 0), Ok(Vec3::ZERO));
        }
    }

    #[test]
    fn test_centered_axis_mirrors() {
        let mut b = builder();
        b.centered(Axis::W).unwrap().set(Axis::W, 1, -3.0).unwrap();
        b.set(Axis::W, 2, 7.0).unwrap();
        let table = b.build();

        assert_eq!(table.lookup(Axis::W, 1), Ok(Vec3::new(0.0, -3.0, 0.0)));
        assert_eq!(table.lookup(Axis::W, -1), Ok(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(table.lookup(Axis::W, -2), Ok(Vec3::new(0.0, -7.0, 0.0)));
        assert_eq!(table.indices(Axis::W), vec![-2, -1, 0, 1, 2]);
    }

    #[test]
    fn test_edge_axis_does_not_mirror() {
        let mut b = builder();
        b.set(Axis::H, 1, 10.0).unwrap();
        let table = b.build();
        assert_eq!(
            table.lookup(Axis::H, -1),
            Err(FrameError::UndefinedReferencePoint {
                axis: Axis::H,
                index: -1
            })
        );
    }

    #[test]
    fn test_centered_lookup_of_min_index() {
        let mut b = builder();
        b.centered(Axis::W).unwrap().set(Axis::W, 1, 2.0).unwrap();
        let table = b.build();
        assert_eq!(
            table.lookup(Axis::W, i32::MIN),
            Err(FrameError::UndefinedReferencePoint {
                axis: Axis::W,
                index: i32::MIN
            })
        );
        assert!(!table.contains(Axis::W, i32::MIN));
    }

    #[test]
    fn test_edge_axis_accepts_explicit_negative() {
        let mut b = builder();
        b.set(Axis::D, -1, -4.0).unwrap();
        assert_eq!(b.lookup(Axis::D, -1), Ok(Vec3::new(-4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_centered_rejects_explicit_negative_and_shifted_zero() {
        let mut b = builder();
        b.centered(Axis::D).unwrap();
        assert!(matches!(
            b.set(Axis::D, -1, 2.0),
            Err(FrameError::InconsistentSymmetryFlag { .. })
        ));
        assert!(matches!(
            b.set(Axis::D, 0, 2.0),
            Err(FrameError::InconsistentSymmetryFlag { .. })
        ));
    }

    #[test]
    fn test_centering_after_negative_entry_fails() {
        let mut b = builder();
        b.set(Axis::H, -1, -2.0).unwrap();
        assert!(b.centered(Axis::H).is_err());
    }

    #[test]
    fn test_require_anchor() {
        let mut b = builder();
        b.centered(Axis::W).unwrap();
        let table = b.build();
        assert!(table.require_anchor(Axis::W, AxisAnchor::Centered).is_ok());
        assert_eq!(
            table.require_anchor(Axis::H, AxisAnchor::Centered),
            Err(FrameError::InconsistentSymmetryFlag {
                axis: Axis::H,
                declared: AxisAnchor::Edge,
                assumed: AxisAnchor::Centered,
            })
        );
    }

    #[test]
    fn test_scalar_follows_axis_direction() {
        let axes = AxisTriple::builder()
            .d(Vec3::Y)
            .w(Vec3::NEG_X)
            .build()
            .unwrap();
        let mut b = ReferenceTable::builder(&axes);
        b.set(Axis::W, 1, 5.0).unwrap();
        assert!(b.lookup(Axis::W, 1).unwrap().abs_diff_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-6));
    }
}
