//! Point queries against a located frame

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{
    Axis, AxisTriple, DwhIndex, FrameResult, Origin, OriginRequest, ReferenceTable,
};

/// Axes, reference points and resolved origin of one part
///
/// All queries are read-only. Points are returned in the coordinates the
/// origin was resolved in (the parent's, or world for top-level parts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    axes: AxisTriple,
    table: ReferenceTable,
    origin: Origin,
}

impl Frame {
    /// Resolve the origin of `table` from `request`
    pub fn locate(
        axes: AxisTriple,
        table: ReferenceTable,
        request: OriginRequest,
    ) -> FrameResult<Self> {
        let origin = Origin::resolve(request, &table)?;
        Ok(Self {
            axes,
            table,
            origin,
        })
    }

    pub(crate) fn from_parts(axes: AxisTriple, table: ReferenceTable, origin: Origin) -> Self {
        Self {
            axes,
            table,
            origin,
        }
    }

    pub fn axes(&self) -> &AxisTriple {
        &self.axes
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The resolved local origin
    pub fn pos_o(&self) -> Vec3 {
        self.origin.pos_o()
    }

    /// `pos_o + table[axis][index]`
    pub fn axis_point(&self, axis: Axis, index: i32) -> FrameResult<Vec3> {
        Ok(self.pos_o() + self.table.lookup(axis, index)?)
    }

    pub fn pos_d(&self, index: i32) -> FrameResult<Vec3> {
        self.axis_point(Axis::D, index)
    }

    pub fn pos_w(&self, index: i32) -> FrameResult<Vec3> {
        self.axis_point(Axis::W, index)
    }

    pub fn pos_h(&self, index: i32) -> FrameResult<Vec3> {
        self.axis_point(Axis::H, index)
    }

    /// `pos_o + d[d] + w[w] + h[h]`
    pub fn point(&self, d: i32, w: i32, h: i32) -> FrameResult<Vec3> {
        self.point_at(DwhIndex::new(d, w, h))
    }

    pub fn point_at(&self, index: DwhIndex) -> FrameResult<Vec3> {
        Ok(self.pos_o() + self.table.lookup_dwh(index)?)
    }

    /// Offset of a reference point from the local origin
    pub fn offset(&self, axis: Axis, index: i32) -> FrameResult<Vec3> {
        self.table.lookup(axis, index)
    }

    /// Signed distance from reference point `from` to `to`, measured along the axis
    pub fn distance(&self, axis: Axis, from: i32, to: i32) -> FrameResult<f32> {
        let delta = self.table.lookup(axis, to)? - self.table.lookup(axis, from)?;
        Ok(delta.dot(self.axes.axis(axis)))
    }

    /// `scalar * unit(axis)`
    pub fn vec(&self, axis: Axis, scalar: f32) -> Vec3 {
        self.axes.scale(axis, scalar)
    }

    /// Same frame with the origin moved by `delta`
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            axes: self.axes,
            table: self.table.clone(),
            origin: self.origin.shifted(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameError;
    use approx::assert_relative_eq;

    fn block_frame(request: OriginRequest) -> Frame {
        let axes = AxisTriple::CANONICAL;
        let mut b = ReferenceTable::builder(&axes);
        b.centered(Axis::D).unwrap().set(Axis::D, 1, 5.0).unwrap();
        b.centered(Axis::W).unwrap().set(Axis::W, 1, -3.0).unwrap();
        b.set(Axis::H, 1, 2.0).unwrap();
        Frame::locate(axes, b.build(), request).unwrap()
    }

    #[test]
    fn test_point_at_origin_index() {
        let frame = block_frame(OriginRequest::at_origin(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(frame.point(0, 0, 0).unwrap(), frame.pos_o());
    }

    #[test]
    fn test_point_round_trip() {
        let target = Vec3::new(10.0, -4.0, 7.5);
        for index in [(1, 1, 1), (-1, 0, 1), (0, -1, 0), (1, -1, 0)] {
            let frame = block_frame(OriginRequest::new(target, index));
            let back = frame.point_at(index.into()).unwrap();
            assert!(back.abs_diff_eq(target, 1e-5), "{:?} != {:?}", back, target);
        }
    }

    #[test]
    fn test_axis_points_and_distance() {
        let frame = block_frame(OriginRequest::at_origin(Vec3::ZERO));
        assert_eq!(frame.pos_d(-1).unwrap(), Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(frame.pos_h(1).unwrap(), Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(frame.distance(Axis::D, -1, 1).unwrap(), 10.0);
        assert_relative_eq!(frame.distance(Axis::W, 1, -1).unwrap(), 6.0);
    }

    #[test]
    fn test_undefined_point_is_error() {
        let frame = block_frame(OriginRequest::at_origin(Vec3::ZERO));
        assert_eq!(
            frame.point(0, 0, 5),
            Err(FrameError::UndefinedReferencePoint {
                axis: Axis::H,
                index: 5
            })
        );
    }

    #[test]
    fn test_translated_keeps_table() {
        let frame = block_frame(OriginRequest::at_origin(Vec3::ZERO));
        let moved = frame.translated(Vec3::X * 3.0);
        assert_eq!(moved.pos_o(), Vec3::X * 3.0);
        assert_eq!(moved.offset(Axis::D, 1), frame.offset(Axis::D, 1));
        assert_eq!(moved.origin().request().pos, Vec3::X * 3.0);
    }
}
