//! Plate with a rectangular pattern of four bolt holes

use glam::Vec3;
use serde::{Deserialize, Serialize};

use dwh_kernel::GeometryKernel;

use super::{PartRecipe, require_positive};
use crate::config::BuildConfig;
use crate::frame::{Axis, AxisAnchor, AxisTripleBuilder, OriginRequest};
use crate::part::{Part, PartBuilder, PartError, PartResult};

/// Centered on d and w, standing on h
///
/// | axis | index 1 | index 2 |
/// |------|---------|---------|
/// | d | half the bolt separation | plate end |
/// | w | half the bolt separation | plate side |
/// | h | top face | |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoltPlate {
    pub name: String,
    pub depth: f32,
    pub width: f32,
    pub thickness: f32,
    pub bolt_sep_d: f32,
    pub bolt_sep_w: f32,
    /// Nominal bolt diameter; holes add the configured clearance
    pub bolt_diameter: f32,
    pub axis_d: Option<Vec3>,
    pub axis_h: Vec3,
}

impl Default for BoltPlate {
    fn default() -> Self {
        Self {
            name: "bolt_plate".into(),
            depth: 60.0,
            width: 40.0,
            thickness: 6.0,
            bolt_sep_d: 44.0,
            bolt_sep_w: 24.0,
            bolt_diameter: 4.0,
            axis_d: None,
            axis_h: Vec3::Z,
        }
    }
}

/// Hole positions as (d, w) indices
const HOLES: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

impl BoltPlate {
    pub fn hole_diameter(&self, config: &BuildConfig) -> f32 {
        self.bolt_diameter + config.clearance
    }

    fn check(&self, config: &BuildConfig) -> PartResult<()> {
        require_positive("depth", self.depth)?;
        require_positive("width", self.width)?;
        require_positive("thickness", self.thickness)?;
        require_positive("bolt_diameter", self.bolt_diameter)?;
        let hole = self.hole_diameter(config);
        for (label, sep, side) in [
            ("depth", self.bolt_sep_d, self.depth),
            ("width", self.bolt_sep_w, self.width),
        ] {
            require_positive("bolt separation", sep)?;
            if sep + hole >= side {
                return Err(PartError::InvalidParameter(format!(
                    "holes {} apart (diameter {}) do not fit in {} {}",
                    sep, hole, label, side
                )));
            }
        }
        Ok(())
    }
}

impl PartRecipe for BoltPlate {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        request: OriginRequest,
        kernel: &dyn GeometryKernel,
        config: &BuildConfig,
    ) -> PartResult<Part> {
        self.check(config)?;
        let mut axes = AxisTripleBuilder::configured(config).h(self.axis_h);
        if let Some(d) = self.axis_d {
            axes = axes.d(d);
        }

        PartBuilder::configured(&self.name, axes.build()?, config)
            .tabulate(|t| {
                t.centered(Axis::D)?
                    .set(Axis::D, 1, self.bolt_sep_d / 2.0)?
                    .set(Axis::D, 2, self.depth / 2.0)?;
                t.centered(Axis::W)?
                    .set(Axis::W, 1, self.bolt_sep_w / 2.0)?
                    .set(Axis::W, 2, self.width / 2.0)?;
                t.edge(Axis::H)?.set(Axis::H, 1, self.thickness)?;
                Ok(())
            })?
            .locate_request(request)?
            .shape(kernel, |frame, kernel| {
                // holes and corners are addressed by mirrored indices
                frame.table().require_anchor(Axis::D, AxisAnchor::Centered)?;
                frame.table().require_anchor(Axis::W, AxisAnchor::Centered)?;
                let plate = kernel.make_box(
                    frame.point(-2, -2, 0)?,
                    [
                        frame.vec(Axis::D, self.depth),
                        frame.vec(Axis::W, self.width),
                        frame.vec(Axis::H, self.thickness),
                    ],
                )?;

                // holes run 1 mm past both faces
                let radius = self.hole_diameter(config) / 2.0;
                let mut holes = Vec::with_capacity(HOLES.len());
                for (d, w) in HOLES {
                    let base = frame.point(d, w, 0)? - frame.vec(Axis::H, 1.0);
                    holes.push(kernel.make_cylinder(
                        base,
                        frame.vec(Axis::H, self.thickness + 2.0),
                        radius,
                    )?);
                }
                let holes = kernel.multi_fuse(&holes)?;
                Ok(kernel.cut(&plate, &holes)?)
            })
    }
}
