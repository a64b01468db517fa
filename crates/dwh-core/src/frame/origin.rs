//! Origin resolution

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{Axis, FrameResult, ReferenceTable};

/// Index triple selecting one reference point per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DwhIndex {
    pub d: i32,
    pub w: i32,
    pub h: i32,
}

impl DwhIndex {
    /// (0, 0, 0)
    pub const ORIGIN: Self = Self { d: 0, w: 0, h: 0 };

    pub const fn new(d: i32, w: i32, h: i32) -> Self {
        Self { d, w, h }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::D => self.d,
            Axis::W => self.w,
            Axis::H => self.h,
        }
    }
}

impl From<(i32, i32, i32)> for DwhIndex {
    fn from((d, w, h): (i32, i32, i32)) -> Self {
        Self { d, w, h }
    }
}

impl std::fmt::Display for DwhIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.d, self.w, self.h)
    }
}

/// "Put reference point `index` at `pos`"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginRequest {
    /// Point in parent (or world) coordinates
    pub pos: Vec3,
    /// Reference point that must land on `pos`
    pub index: DwhIndex,
}

impl OriginRequest {
    pub fn new(pos: Vec3, index: impl Into<DwhIndex>) -> Self {
        Self {
            pos,
            index: index.into(),
        }
    }

    /// Local origin placed directly at `pos`
    pub fn at_origin(pos: Vec3) -> Self {
        Self::new(pos, DwhIndex::ORIGIN)
    }
}

impl Default for OriginRequest {
    fn default() -> Self {
        Self::at_origin(Vec3::ZERO)
    }
}

/// A part's resolved local origin (`pos_o`) and the request it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    request: OriginRequest,
    pos_o: Vec3,
}

impl Origin {
    /// `pos_o = pos - (d[pos_d] + w[pos_w] + h[pos_h])`
    ///
    /// Every index must exist in the table; a missing one is an error, never zero.
    pub fn resolve(request: OriginRequest, table: &ReferenceTable) -> FrameResult<Self> {
        let pos_o = request.pos - table.lookup_dwh(request.index)?;
        tracing::debug!(
            "origin: {:?} at {} -> pos_o {:?}",
            request.pos,
            request.index,
            pos_o
        );
        Ok(Self { request, pos_o })
    }

    /// Re-derive `pos_o` from the same request against a completed table
    ///
    /// Returns how far the origin moved. Used by assemblies whose own table is
    /// only complete after their children are built.
    pub fn adjust(&mut self, table: &ReferenceTable) -> FrameResult<Vec3> {
        let resolved = Self::resolve(self.request, table)?;
        let shift = resolved.pos_o - self.pos_o;
        if shift != Vec3::ZERO {
            tracing::debug!("origin adjusted by {:?}", shift);
        }
        *self = resolved;
        Ok(shift)
    }

    /// The resolved local origin
    pub fn pos_o(&self) -> Vec3 {
        self.pos_o
    }

    pub fn request(&self) -> OriginRequest {
        self.request
    }

    /// Same origin moved by `delta`, request included
    pub(crate) fn shifted(self, delta: Vec3) -> Self {
        Self {
            request: OriginRequest {
                pos: self.request.pos + delta,
                index: self.request.index,
            },
            pos_o: self.pos_o + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{AxisTriple, FrameError};

    #[test]
    fn test_edge_anchored_height() {
        let mut b = ReferenceTable::builder(&AxisTriple::CANONICAL);
        b.set(Axis::H, 1, 10.0).unwrap();
        let table = b.build();

        let origin = Origin::resolve(
            OriginRequest::new(Vec3::splat(5.0), (0, 0, 1)),
            &table,
        )
        .unwrap();
        assert_eq!(origin.pos_o(), Vec3::new(5.0, 5.0, -5.0));
    }

    #[test]
    fn test_missing_index_fails() {
        let table = ReferenceTable::builder(&AxisTriple::CANONICAL).build();
        let result = Origin::resolve(OriginRequest::new(Vec3::ZERO, (0, 3, 0)), &table);
        assert_eq!(
            result,
            Err(FrameError::UndefinedReferencePoint {
                axis: Axis::W,
                index: 3
            })
        );
    }

    #[test]
    fn test_adjust_against_completed_table() {
        let mut b = ReferenceTable::builder(&AxisTriple::CANONICAL);
        b.set(Axis::H, 1, 4.0).unwrap();
        let request = OriginRequest::new(Vec3::new(0.0, 0.0, 20.0), (0, 0, 1));
        let mut origin = Origin::resolve(request, &b.snapshot()).unwrap();
        assert_eq!(origin.pos_o(), Vec3::new(0.0, 0.0, 16.0));

        b.set(Axis::H, 1, 12.0).unwrap();
        let shift = origin.adjust(&b.build()).unwrap();
        assert_eq!(origin.pos_o(), Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(shift, Vec3::new(0.0, 0.0, -8.0));
    }
}
