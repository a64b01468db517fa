//! Parts and their build lifecycle
//!
//! A part is built in stages: the axes are declared, the reference table is
//! filled from the part's own dimensions, the origin is resolved from the
//! caller's request, and only then is the shape built against the resolved
//! origin. Each stage has its own type so the order cannot be skipped:
//!
//! ```text
//! PartBuilder --tabulate--> PartBuilder --locate--> LocatedPart --shape--> Part
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dwh_kernel::{Aabb, GeometryKernel, KernelError, Shape};

use crate::assembly::ChildId;
use crate::config::BuildConfig;
use crate::constants::{DEFAULT_COLOR, DEFAULT_TOLERANCE};
use crate::document::{Document, DocumentError, ObjectHandle};
use crate::frame::{
    Axis, AxisTriple, DwhIndex, Frame, FrameError, OriginRequest, ReferenceTable,
    ReferenceTableBuilder,
};
use crate::placement::Placement;

/// Build stage of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartState {
    /// Axes known, table empty
    Declared,
    /// Reference points declared
    Tabulated,
    /// Origin resolved
    Originated,
    /// Shape built and frozen
    Shaped,
    /// Placement assigned
    Placed,
    /// Owned by a finalized group
    Grouped,
    /// Handed to a document
    Realized,
}

impl PartState {
    /// Forward moves only, plus re-placing and `Grouped -> Placed` for reparenting
    pub fn can_transition_to(self, next: PartState) -> bool {
        match (self, next) {
            (PartState::Realized, _) => false,
            (PartState::Grouped, PartState::Placed) => true,
            (PartState::Placed, PartState::Placed) => true,
            (from, to) => to > from,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PartState::Declared => "Declared",
            PartState::Tabulated => "Tabulated",
            PartState::Originated => "Originated",
            PartState::Shaped => "Shaped",
            PartState::Placed => "Placed",
            PartState::Grouped => "Grouped",
            PartState::Realized => "Realized",
        }
    }
}

impl std::fmt::Display for PartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Display color (RGBA, 0..=1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR)
    }
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    pub fn rgba(&self) -> [f32; 4] {
        self.0
    }
}

impl From<[f32; 4]> for Color {
    fn from(rgba: [f32; 4]) -> Self {
        Self(rgba)
    }
}

/// Part construction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PartError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    GeometryKernelFailure(#[from] KernelError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Part '{name}' cannot move from {from} to {to}")]
    InvalidTransition {
        name: String,
        from: PartState,
        to: PartState,
    },
    #[error("Child not found: {0}")]
    ChildNotFound(ChildId),
    #[error("Placement of child {0} is not resolved yet")]
    PlacementPending(ChildId),
    #[error("Assembly '{0}' has no children to finalize")]
    NoChildren(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for part operations
pub type PartResult<T> = Result<T, PartError>;

/// A part in the `Declared` or `Tabulated` stage
#[derive(Debug, Clone)]
pub struct PartBuilder {
    name: String,
    axes: AxisTriple,
    table: ReferenceTableBuilder,
    state: PartState,
    color: Color,
}

impl PartBuilder {
    pub fn new(name: impl Into<String>, axes: AxisTriple) -> Self {
        Self {
            name: name.into(),
            axes,
            table: ReferenceTable::builder(&axes).with_tolerance(DEFAULT_TOLERANCE),
            state: PartState::Declared,
            color: Color::default(),
        }
    }

    /// Builder taking tolerance and color from a build configuration
    pub fn configured(name: impl Into<String>, axes: AxisTriple, config: &BuildConfig) -> Self {
        Self {
            table: ReferenceTable::builder(&axes).with_tolerance(config.tolerance),
            color: Color(config.default_color),
            ..Self::new(name, axes)
        }
    }

    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axes(&self) -> &AxisTriple {
        &self.axes
    }

    pub fn state(&self) -> PartState {
        self.state
    }

    /// Declare reference points
    pub fn tabulate<F>(mut self, declare: F) -> PartResult<Self>
    where
        F: FnOnce(&mut ReferenceTableBuilder) -> Result<(), FrameError>,
    {
        declare(&mut self.table)?;
        self.state = PartState::Tabulated;
        Ok(self)
    }

    /// Resolve the origin so that reference point `index` lands on `pos`
    pub fn locate(self, pos: Vec3, index: impl Into<DwhIndex>) -> PartResult<LocatedPart> {
        self.locate_request(OriginRequest::new(pos, index))
    }

    pub fn locate_request(self, request: OriginRequest) -> PartResult<LocatedPart> {
        let frame = Frame::locate(self.axes, self.table.build(), request)?;
        tracing::debug!("part '{}' originated at {:?}", self.name, frame.pos_o());
        Ok(LocatedPart {
            name: self.name,
            frame,
            color: self.color,
        })
    }
}

/// A part in the `Originated` stage: the frame is fixed, the shape is not built yet
#[derive(Debug, Clone)]
pub struct LocatedPart {
    name: String,
    frame: Frame,
    color: Color,
}

impl LocatedPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn state(&self) -> PartState {
        PartState::Originated
    }

    /// Build the shape against the resolved frame
    ///
    /// `build` positions every feature through frame queries. A kernel
    /// failure aborts the part; nothing partial is returned.
    pub fn shape<F>(self, kernel: &dyn GeometryKernel, build: F) -> PartResult<Part>
    where
        F: FnOnce(&Frame, &dyn GeometryKernel) -> PartResult<Shape>,
    {
        let shape = build(&self.frame, kernel)?;
        let bounds = kernel.bounding_box(&shape)?;
        tracing::debug!("part '{}' shaped, bounds {:?}", self.name, bounds);
        Ok(Part::from_parts(
            self.name,
            self.frame,
            shape,
            bounds,
            self.color,
            Vec::new(),
        ))
    }
}

/// A built part: frozen shape, frame, and a movable placement
#[derive(Debug, Clone)]
pub struct Part {
    id: Uuid,
    name: String,
    frame: Frame,
    shape: Shape,
    /// Shape bounds in authoring coordinates
    bounds: Aabb,
    placement: Placement,
    state: PartState,
    color: Color,
    children: Vec<Part>,
}

impl Part {
    pub(crate) fn from_parts(
        name: String,
        frame: Frame,
        shape: Shape,
        bounds: Aabb,
        color: Color,
        children: Vec<Part>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            frame,
            shape,
            bounds,
            placement: Placement::IDENTITY,
            state: PartState::Shaped,
            color,
            children,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn state(&self) -> PartState {
        self.state
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Children of a grouped assembly, in registration order
    pub fn children(&self) -> &[Part] {
        &self.children
    }

    pub fn is_assembly(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn axes(&self) -> &AxisTriple {
        self.frame.axes()
    }

    pub fn table(&self) -> &ReferenceTable {
        self.frame.table()
    }

    // ============== Frame Queries (authoring coordinates) ==============

    pub fn pos_o(&self) -> Vec3 {
        self.frame.pos_o()
    }

    pub fn axis_point(&self, axis: Axis, index: i32) -> PartResult<Vec3> {
        Ok(self.frame.axis_point(axis, index)?)
    }

    pub fn point(&self, d: i32, w: i32, h: i32) -> PartResult<Vec3> {
        Ok(self.frame.point(d, w, h)?)
    }

    pub fn point_at(&self, index: DwhIndex) -> PartResult<Vec3> {
        Ok(self.frame.point_at(index)?)
    }

    // ============== World Queries ==============

    /// Local origin after placement
    pub fn world_pos_o(&self) -> Vec3 {
        self.placement.apply(self.frame.pos_o())
    }

    pub fn world_axis_point(&self, axis: Axis, index: i32) -> PartResult<Vec3> {
        Ok(self.placement.apply(self.frame.axis_point(axis, index)?))
    }

    pub fn world_point(&self, d: i32, w: i32, h: i32) -> PartResult<Vec3> {
        Ok(self.placement.apply(self.frame.point(d, w, h)?))
    }

    /// Axis unit vector after placement
    pub fn world_axis(&self, axis: Axis) -> Vec3 {
        self.placement.apply_vector(self.frame.axes().axis(axis))
    }

    // ============== Lifecycle ==============

    /// Move to `next`, enforcing the lifecycle order
    pub fn transition(&mut self, next: PartState) -> PartResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(PartError::InvalidTransition {
                name: self.name.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Move the finished part so reference point `index` lands on `pos`
    ///
    /// The current rotation is kept; the shape is never rebuilt.
    pub fn place(&mut self, pos: Vec3, index: impl Into<DwhIndex>) -> PartResult<()> {
        let anchor = self.frame.point_at(index.into())?;
        self.transition(PartState::Placed)?;
        let rotation = self.placement.rotation;
        self.placement.reset();
        self.placement = self
            .placement
            .rotated(rotation)
            .translated(pos - rotation * anchor);
        tracing::debug!(
            "part '{}' placed: translation {:?}",
            self.name,
            self.placement.translation
        );
        Ok(())
    }

    /// Rotate about the part's pre-translation position
    pub fn rotate(&mut self, rotation: Quat) -> PartResult<()> {
        self.transition(PartState::Placed)?;
        self.placement = self.placement.rotated(rotation);
        Ok(())
    }

    /// Assign a placement computed by an enclosing assembly
    pub(crate) fn assign_placement(&mut self, placement: Placement) -> PartResult<()> {
        self.transition(PartState::Placed)?;
        self.placement = placement;
        Ok(())
    }

    /// Dissolve a group into its children
    ///
    /// Each child absorbs the group's placement, so it stays where it was in
    /// the world. The children come back `Placed`, ready to be placed again or
    /// appended to another assembly.
    pub fn ungroup(self) -> PartResult<Vec<Part>> {
        if !self.is_assembly() {
            return Err(PartError::NoChildren(self.name));
        }
        let outer = self.placement;
        let mut children = self.children;
        for child in &mut children {
            child.transition(PartState::Placed)?;
            child.placement = child.placement.within(&outer);
        }
        tracing::debug!("group '{}' dissolved into {} parts", self.name, children.len());
        Ok(children)
    }

    /// Register the part (and the children of a group) with a document
    ///
    /// Every part of the tree is checked first; nothing reaches the document
    /// unless the whole tree can be realized.
    pub fn realize(&mut self, document: &mut dyn Document) -> PartResult<ObjectHandle> {
        self.check_realizable()?;
        let handle = self.realize_within(document, &Placement::IDENTITY)?;
        tracing::info!(
            "realized '{}' ({} children)",
            self.name,
            self.children.len()
        );
        Ok(handle)
    }

    fn check_realizable(&self) -> PartResult<()> {
        if !self.state.can_transition_to(PartState::Realized) {
            return Err(PartError::InvalidTransition {
                name: self.name.clone(),
                from: self.state,
                to: PartState::Realized,
            });
        }
        self.children.iter().try_for_each(Part::check_realizable)
    }

    fn realize_within(
        &mut self,
        document: &mut dyn Document,
        outer: &Placement,
    ) -> PartResult<ObjectHandle> {
        let placement = self.placement.within(outer);
        let handle = if !self.is_assembly() {
            let handle = document.add_object(&self.name, &self.shape, self.color)?;
            document.set_placement(handle, placement)?;
            handle
        } else {
            let mut members = Vec::with_capacity(self.children.len());
            for child in &mut self.children {
                members.push(child.realize_within(document, &placement)?);
            }
            document.add_group(&self.name, &members)?
        };
        self.state = PartState::Realized;
        Ok(handle)
    }
}
