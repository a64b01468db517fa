//! Rectangular block

use glam::Vec3;
use serde::{Deserialize, Serialize};

use dwh_kernel::GeometryKernel;

use super::{PartRecipe, declare_length, low_end, require_positive};
use crate::config::BuildConfig;
use crate::frame::{Axis, AxisAnchor, AxisTripleBuilder, DwhIndex, OriginRequest};
use crate::part::{Part, PartBuilder, PartResult};

/// Box with independently anchored axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub name: String,
    pub depth: f32,
    pub width: f32,
    pub height: f32,
    /// Anchors of d, w and h
    pub anchors: [AxisAnchor; 3],
    pub axis_d: Option<Vec3>,
    pub axis_h: Option<Vec3>,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            name: "block".into(),
            depth: 20.0,
            width: 10.0,
            height: 5.0,
            anchors: [AxisAnchor::Centered, AxisAnchor::Centered, AxisAnchor::Edge],
            axis_d: None,
            axis_h: None,
        }
    }
}

impl Block {
    pub fn new(depth: f32, width: f32, height: f32) -> Self {
        Self {
            depth,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn anchored(mut self, axis: Axis, anchor: AxisAnchor) -> Self {
        self.anchors[axis as usize] = anchor;
        self
    }

    fn length(&self, axis: Axis) -> f32 {
        match axis {
            Axis::D => self.depth,
            Axis::W => self.width,
            Axis::H => self.height,
        }
    }
}

impl PartRecipe for Block {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        request: OriginRequest,
        kernel: &dyn GeometryKernel,
        config: &BuildConfig,
    ) -> PartResult<Part> {
        for axis in Axis::ALL {
            require_positive(axis.label(), self.length(axis))?;
        }
        let mut axes = AxisTripleBuilder::configured(config).h(self.axis_h.unwrap_or(Vec3::Z));
        if let Some(d) = self.axis_d {
            axes = axes.d(d);
        }

        PartBuilder::configured(&self.name, axes.build()?, config)
            .tabulate(|t| {
                for axis in Axis::ALL {
                    declare_length(t, axis, self.length(axis), self.anchors[axis as usize])?;
                }
                Ok(())
            })?
            .locate_request(request)?
            .shape(kernel, |frame, kernel| {
                let corner = frame.point_at(DwhIndex::new(
                    low_end(frame, Axis::D, self.anchors[0])?,
                    low_end(frame, Axis::W, self.anchors[1])?,
                    low_end(frame, Axis::H, self.anchors[2])?,
                ))?;
                Ok(kernel.make_box(
                    corner,
                    [
                        frame.vec(Axis::D, self.depth),
                        frame.vec(Axis::W, self.width),
                        frame.vec(Axis::H, self.height),
                    ],
                )?)
            })
    }
}
