//! Local frames and reference points
//!
//! Every part is authored in its own (d, w, h) frame. Anchor points along
//! each axis are named by integer indices, the part's origin is resolved from
//! a world point given at some index triple, and internal features are then
//! positioned by querying index triples instead of raw coordinates.

mod axes;
mod origin;
mod query;
mod table;

use serde::{Deserialize, Serialize};

pub use axes::{AxisTriple, AxisTripleBuilder};
pub use origin::{DwhIndex, Origin, OriginRequest};
pub use query::Frame;
pub use table::{AxisAnchor, AxisTable, ReferenceTable, ReferenceTableBuilder};

/// One of the three local axes of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Depth
    D,
    /// Width
    W,
    /// Height
    H,
}

impl Axis {
    /// All axes in (d, w, h) order
    pub const ALL: [Axis; 3] = [Axis::D, Axis::W, Axis::H];

    /// Lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            Axis::D => "d",
            Axis::W => "w",
            Axis::H => "h",
        }
    }

    /// The axis following this one in the d → w → h → d cycle
    pub fn next(&self) -> Axis {
        match self {
            Axis::D => Axis::W,
            Axis::W => Axis::H,
            Axis::H => Axis::D,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Frame-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("Invalid axis specification: {0}")]
    InvalidAxisSpecification(String),
    #[error("Undefined reference point: axis {axis} has no index {index}")]
    UndefinedReferencePoint { axis: Axis, index: i32 },
    #[error("Inconsistent symmetry on axis {axis}: table is {declared:?}, caller assumed {assumed:?}")]
    InconsistentSymmetryFlag {
        axis: Axis,
        declared: AxisAnchor,
        assumed: AxisAnchor,
    },
}

/// Result type for frame operations
pub type FrameResult<T> = Result<T, FrameError>;
