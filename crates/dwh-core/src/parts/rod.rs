//! Cylindrical rod along its h axis

use glam::Vec3;
use serde::{Deserialize, Serialize};

use dwh_kernel::GeometryKernel;

use super::{PartRecipe, declare_length, low_end, require_positive};
use crate::config::BuildConfig;
use crate::frame::{Axis, AxisAnchor, AxisTripleBuilder, OriginRequest};
use crate::part::{Part, PartBuilder, PartResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rod {
    pub name: String,
    pub diameter: f32,
    pub length: f32,
    pub axis_h: Vec3,
    pub axis_d: Option<Vec3>,
    /// Whether h index 0 is the middle of the rod or its base
    pub h_anchor: AxisAnchor,
}

impl Default for Rod {
    fn default() -> Self {
        Self {
            name: "rod".into(),
            diameter: 8.0,
            length: 100.0,
            axis_h: Vec3::Z,
            axis_d: None,
            h_anchor: AxisAnchor::Edge,
        }
    }
}

impl Rod {
    pub fn new(diameter: f32, length: f32) -> Self {
        Self {
            diameter,
            length,
            ..Self::default()
        }
    }
}

impl PartRecipe for Rod {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        request: OriginRequest,
        kernel: &dyn GeometryKernel,
        config: &BuildConfig,
    ) -> PartResult<Part> {
        require_positive("diameter", self.diameter)?;
        require_positive("length", self.length)?;
        let mut axes = AxisTripleBuilder::configured(config).h(self.axis_h);
        if let Some(d) = self.axis_d {
            axes = axes.d(d);
        }

        PartBuilder::configured(&self.name, axes.build()?, config)
            .tabulate(|t| {
                declare_length(t, Axis::D, self.diameter, AxisAnchor::Centered)?;
                declare_length(t, Axis::W, self.diameter, AxisAnchor::Centered)?;
                declare_length(t, Axis::H, self.length, self.h_anchor)
            })?
            .locate_request(request)?
            .shape(kernel, |frame, kernel| {
                let base = frame.point(0, 0, low_end(frame, Axis::H, self.h_anchor)?)?;
                Ok(kernel.make_cylinder(
                    base,
                    frame.vec(Axis::H, self.length),
                    self.diameter / 2.0,
                )?)
            })
    }
}
