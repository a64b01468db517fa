//! Assemblies of placed parts
//!
//! An assembly is a part whose shape comes from its children. Children are
//! authored relative to the assembly origin and registered with an offset
//! from it; offsets may depend on other children's built dimensions, so no
//! placement is applied until [`AssemblyBuilder::resolve_all_placements`].
//! The assembly's own table stays open while children are added, and its
//! origin is re-derived once the table is complete.

mod types;

use glam::Vec3;

use dwh_kernel::{GeometryKernel, Shape};

use crate::config::{BuildConfig, FinalizeMode};
use crate::constants::DEFAULT_TOLERANCE;
use crate::frame::{
    Axis, AxisTriple, DwhIndex, Frame, Origin, OriginRequest, ReferenceTable,
    ReferenceTableBuilder,
};
use crate::part::{Color, Part, PartError, PartResult, PartState};
use crate::placement::Placement;

pub use types::{ChildId, ChildRole, Offset, Siblings};

use types::ChildSlot;

/// An assembly whose children are still being added
#[derive(Debug)]
pub struct AssemblyBuilder {
    name: String,
    axes: AxisTriple,
    table: ReferenceTableBuilder,
    request: OriginRequest,
    /// Origin resolved against a partial table, adjusted later
    provisional: Option<Origin>,
    children: Vec<ChildSlot>,
    color: Color,
}

impl AssemblyBuilder {
    pub fn new(name: impl Into<String>, axes: AxisTriple, request: OriginRequest) -> Self {
        Self {
            name: name.into(),
            axes,
            table: ReferenceTable::builder(&axes).with_tolerance(DEFAULT_TOLERANCE),
            request,
            provisional: None,
            children: Vec::new(),
            color: Color::default(),
        }
    }

    pub fn configured(
        name: impl Into<String>,
        axes: AxisTriple,
        request: OriginRequest,
        config: &BuildConfig,
    ) -> Self {
        Self {
            table: ReferenceTable::builder(&axes).with_tolerance(config.tolerance),
            color: Color(config.default_color),
            ..Self::new(name, axes, request)
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

    pub fn request(&self) -> OriginRequest {
        self.request
    }

    /// The assembly's own reference table, open until placements are resolved
    pub fn table_mut(&mut self) -> &mut ReferenceTableBuilder {
        &mut self.table
    }

    /// Declare an assembly point from a scalar, e.g. a sum of children's dimensions
    pub fn set_point(&mut self, axis: Axis, key: i32, scalar: f32) -> PartResult<()> {
        self.table.set(axis, key, scalar)?;
        Ok(())
    }

    /// Copy a child's table entry verbatim into the assembly's table
    ///
    /// The assembly's point then equals
    /// `pos_o + (child.axis_point(axis, child_key) - child.pos_o)`.
    pub fn reuse_child_point(
        &mut self,
        axis: Axis,
        key: i32,
        child: ChildId,
        child_key: i32,
    ) -> PartResult<()> {
        let offset = self.child(child)?.table().lookup(axis, child_key)?;
        self.table.set_vec(axis, key, offset)?;
        Ok(())
    }

    /// Resolve the origin against the entries declared so far
    ///
    /// The result is kept and adjusted once the table is complete.
    pub fn provisional_origin(&mut self) -> PartResult<Vec3> {
        let origin = Origin::resolve(self.request, &self.table.snapshot())?;
        self.provisional = Some(origin);
        Ok(origin.pos_o())
    }

    /// Register a child fused into the assembly
    pub fn append_child(&mut self, part: Part) -> PartResult<ChildId> {
        self.append_child_with_role(part, ChildRole::Solid)
    }

    pub fn append_child_with_role(&mut self, part: Part, role: ChildRole) -> PartResult<ChildId> {
        if !part.state().can_transition_to(PartState::Placed) {
            return Err(PartError::InvalidTransition {
                name: part.name().to_string(),
                from: part.state(),
                to: PartState::Placed,
            });
        }
        let id = ChildId(self.children.len());
        tracing::debug!("assembly '{}': child {} is '{}'", self.name, id, part.name());
        self.children.push(ChildSlot {
            part,
            role,
            offset: Offset::default(),
        });
        Ok(id)
    }

    /// Record the child's offset from the assembly origin; applied on resolve
    pub fn place_child(&mut self, id: ChildId, offset: impl Into<Offset>) -> PartResult<()> {
        let slot = self
            .children
            .get_mut(id.0)
            .ok_or(PartError::ChildNotFound(id))?;
        slot.offset = offset.into();
        Ok(())
    }

    pub fn child(&self, id: ChildId) -> PartResult<&Part> {
        self.children
            .get(id.0)
            .map(|slot| &slot.part)
            .ok_or(PartError::ChildNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Freeze the table, settle the origin, then place every child
    ///
    /// Fixed offsets are known up front; deferred ones run afterwards in
    /// registration order and may query any sibling resolved before them.
    pub fn resolve_all_placements(self) -> PartResult<ResolvedAssembly> {
        let AssemblyBuilder {
            name,
            axes,
            table,
            request,
            provisional,
            mut children,
            color,
        } = self;

        let table = table.build();
        let origin = match provisional {
            Some(mut origin) => {
                let shift = origin.adjust(&table)?;
                tracing::debug!("assembly '{}': origin adjusted by {:?}", name, shift);
                origin
            }
            None => Origin::resolve(request, &table)?,
        };
        let frame = Frame::from_parts(axes, table, origin);

        let offsets: Vec<Offset> = children
            .iter_mut()
            .map(|slot| std::mem::take(&mut slot.offset))
            .collect();
        let mut resolved: Vec<Option<Vec3>> = vec![None; children.len()];
        let mut deferred = Vec::new();
        for (i, offset) in offsets.into_iter().enumerate() {
            match offset {
                Offset::Fixed(v) => resolved[i] = Some(v),
                Offset::Deferred(compute) => deferred.push((i, compute)),
            }
        }
        for (i, compute) in deferred {
            let value = compute(&Siblings::new(&children, &resolved))?;
            resolved[i] = Some(value);
        }

        for (i, (slot, offset)) in children.iter_mut().zip(resolved).enumerate() {
            let offset = offset.ok_or(PartError::PlacementPending(ChildId(i)))?;
            // reset, then translate; the child's own rotation is kept
            let rotation = slot.part.placement().rotation;
            let placement = Placement::place_at(rotation, frame.pos_o() + offset);
            slot.part.assign_placement(placement)?;
            tracing::debug!(
                "assembly '{}': placed '{}' at {:?}",
                name,
                slot.part.name(),
                placement.translation
            );
        }

        Ok(ResolvedAssembly {
            name,
            frame,
            children,
            color,
        })
    }
}

/// An assembly whose children all have their final placements
#[derive(Debug)]
pub struct ResolvedAssembly {
    name: String,
    frame: Frame,
    children: Vec<ChildSlot>,
    color: Color,
}

impl ResolvedAssembly {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn pos_o(&self) -> Vec3 {
        self.frame.pos_o()
    }

    pub fn point(&self, d: i32, w: i32, h: i32) -> PartResult<Vec3> {
        Ok(self.frame.point(d, w, h)?)
    }

    pub fn child(&self, id: ChildId) -> PartResult<&Part> {
        self.children
            .get(id.0)
            .map(|slot| &slot.part)
            .ok_or(PartError::ChildNotFound(id))
    }

    /// A child's reference point in the assembly's parent coordinates
    pub fn child_point(&self, id: ChildId, index: impl Into<DwhIndex>) -> PartResult<Vec3> {
        let child = self.child(id)?;
        Ok(child.placement().apply(child.point_at(index.into())?))
    }

    pub fn children(&self) -> impl Iterator<Item = &Part> {
        self.children.iter().map(|slot| &slot.part)
    }

    /// Build the assembly's shape from its placed children
    pub fn finalize(self, mode: FinalizeMode, kernel: &dyn GeometryKernel) -> PartResult<Part> {
        if self.children.is_empty() {
            return Err(PartError::NoChildren(self.name));
        }

        let mut moved: Vec<(ChildRole, Shape)> = Vec::with_capacity(self.children.len());
        for slot in &self.children {
            let placement = slot.part.placement();
            let shape =
                kernel.transformed(slot.part.shape(), placement.rotation, placement.translation)?;
            moved.push((slot.role, shape));
        }

        let (shape, children) = match mode {
            FinalizeMode::Group => {
                let shapes: Vec<Shape> = moved.into_iter().map(|(_, shape)| shape).collect();
                let shape = kernel.compound(&shapes)?;
                let mut parts: Vec<Part> =
                    self.children.into_iter().map(|slot| slot.part).collect();
                for part in &mut parts {
                    part.transition(PartState::Grouped)?;
                }
                (shape, parts)
            }
            FinalizeMode::Merge => {
                let (solids, cutters): (Vec<_>, Vec<_>) = moved
                    .into_iter()
                    .partition(|(role, _)| *role == ChildRole::Solid);
                if solids.is_empty() {
                    return Err(PartError::NoChildren(self.name));
                }
                let solids: Vec<Shape> = solids.into_iter().map(|(_, shape)| shape).collect();
                let mut shape = kernel.multi_fuse(&solids)?;
                for (_, cutter) in &cutters {
                    shape = kernel.cut(&shape, cutter)?;
                }
                (shape, Vec::new())
            }
        };

        let bounds = kernel.bounding_box(&shape)?;
        tracing::info!(
            "assembly '{}' finalized as {:?} ({} children)",
            self.name,
            mode,
            children.len()
        );
        Ok(Part::from_parts(
            self.name,
            self.frame,
            shape,
            bounds,
            self.color,
            children,
        ))
    }
}
