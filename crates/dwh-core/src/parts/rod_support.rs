//! Rod standing on a bolt plate

use serde::{Deserialize, Serialize};

use dwh_kernel::GeometryKernel;

use super::{BoltPlate, PartRecipe, Rod, require_positive};
use crate::assembly::{AssemblyBuilder, Offset};
use crate::config::BuildConfig;
use crate::frame::{Axis, AxisAnchor, AxisTripleBuilder, OriginRequest};
use crate::part::{Part, PartResult};

/// Two-part assembly
///
/// d and w follow the plate (index 1 is the plate side). Along h, index 1 is
/// the plate's top face and index 2 the rod's top, known only once both
/// children are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RodSupport {
    pub name: String,
    pub plate: BoltPlate,
    pub rod_diameter: f32,
    pub rod_length: f32,
}

impl Default for RodSupport {
    fn default() -> Self {
        Self {
            name: "rod_support".into(),
            plate: BoltPlate::default(),
            rod_diameter: 8.0,
            rod_length: 80.0,
        }
    }
}

impl PartRecipe for RodSupport {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        request: OriginRequest,
        kernel: &dyn GeometryKernel,
        config: &BuildConfig,
    ) -> PartResult<Part> {
        require_positive("rod_diameter", self.rod_diameter)?;
        require_positive("rod_length", self.rod_length)?;
        let mut axes = AxisTripleBuilder::configured(config).h(self.plate.axis_h);
        if let Some(d) = self.plate.axis_d {
            axes = axes.d(d);
        }
        let axes = axes.build()?;

        let mut asm = AssemblyBuilder::configured(&self.name, axes, request, config);
        asm.table_mut().centered(Axis::D)?.centered(Axis::W)?;

        // children are authored around the assembly origin
        let plate = asm.append_child(self.plate.build(OriginRequest::default(), kernel, config)?)?;
        asm.reuse_child_point(Axis::D, 1, plate, 2)?;
        asm.reuse_child_point(Axis::W, 1, plate, 2)?;
        asm.reuse_child_point(Axis::H, 1, plate, 1)?;

        // the rod's top is not declared yet
        if request.index.h < 2 {
            asm.provisional_origin()?;
        }

        let rod = Rod {
            name: format!("{}_rod", self.name),
            diameter: self.rod_diameter,
            length: self.rod_length,
            axis_h: axes.h(),
            axis_d: Some(axes.d()),
            h_anchor: AxisAnchor::Edge,
        };
        let rod = asm.append_child(rod.build(OriginRequest::default(), kernel, config)?)?;
        asm.place_child(rod, Offset::deferred(move |s| s.point(plate, 0, 0, 1)))?;

        let height = asm.child(plate)?.frame().distance(Axis::H, 0, 1)?
            + asm.child(rod)?.frame().distance(Axis::H, 0, 2)?;
        asm.set_point(Axis::H, 2, height)?;

        asm.resolve_all_placements()?
            .finalize(config.finalize_mode, kernel)
    }
}
