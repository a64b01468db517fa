//! Core library for dwh
//!
//! Local (d, w, h) frames, reference point tables, origin resolution,
//! placement and assembly composition for parametric parts.

pub mod assembly;
pub mod config;
pub mod constants;
pub mod document;
pub mod frame;
pub mod part;
pub mod parts;
pub mod placement;
pub mod report;

pub use assembly::{AssemblyBuilder, ChildId, ChildRole, Offset, ResolvedAssembly, Siblings};
pub use config::{BuildConfig, ConfigError, FinalizeMode};
pub use document::{Document, DocumentError, DocumentObject, MemoryDocument, ObjectHandle};
pub use frame::{
    Axis, AxisAnchor, AxisTable, AxisTriple, AxisTripleBuilder, DwhIndex, Frame, FrameError,
    FrameResult, Origin, OriginRequest, ReferenceTable, ReferenceTableBuilder,
};
pub use part::{Color, LocatedPart, Part, PartBuilder, PartError, PartResult, PartState};
pub use parts::{Block, BoltPlate, PartRecipe, Rod, RodSupport};
pub use placement::Placement;
pub use report::{PartReport, PointReport, ReportError, ReportFormat};
