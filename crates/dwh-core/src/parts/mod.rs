//! Reference parts built on the frame system
//!
//! Each part is a typed configuration struct; building it declares the
//! reference table from the configured dimensions, resolves the origin from
//! the caller's request and positions every feature through point queries.
//!
//! Index conventions shared by all parts along one axis of length `L`:
//! - centered axis: `0` is the middle, `1` is `L / 2` (so `-1` is the other end)
//! - edge axis: `0` is the start, `1` is `L / 2`, `2` is `L`

mod block;
mod bolt_plate;
mod rod;
mod rod_support;

use dwh_kernel::GeometryKernel;

use crate::config::BuildConfig;
use crate::frame::{
    Axis, AxisAnchor, Frame, FrameResult, OriginRequest, ReferenceTableBuilder,
};
use crate::part::{Part, PartError, PartResult};

pub use block::Block;
pub use bolt_plate::BoltPlate;
pub use rod::Rod;
pub use rod_support::RodSupport;

/// A parametric part that can be built at a requested position
pub trait PartRecipe {
    /// Name given to the built part
    fn name(&self) -> &str;

    fn build(
        &self,
        request: OriginRequest,
        kernel: &dyn GeometryKernel,
        config: &BuildConfig,
    ) -> PartResult<Part>;
}

/// Declare the standard points of an axis of the given length
pub(crate) fn declare_length(
    table: &mut ReferenceTableBuilder,
    axis: Axis,
    length: f32,
    anchor: AxisAnchor,
) -> FrameResult<()> {
    match anchor {
        AxisAnchor::Centered => {
            table.centered(axis)?.set(axis, 1, length / 2.0)?;
        }
        AxisAnchor::Edge => {
            table
                .edge(axis)?
                .set(axis, 1, length / 2.0)?
                .set(axis, 2, length)?;
        }
    }
    Ok(())
}

/// Index of the low end of an axis declared by [`declare_length`]
///
/// Fails if the frame's table was declared with a different anchor.
pub(crate) fn low_end(frame: &Frame, axis: Axis, assumed: AxisAnchor) -> FrameResult<i32> {
    frame.table().require_anchor(axis, assumed)?;
    Ok(match assumed {
        AxisAnchor::Centered => -1,
        AxisAnchor::Edge => 0,
    })
}

pub(crate) fn require_positive(name: &str, value: f32) -> PartResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PartError::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}
