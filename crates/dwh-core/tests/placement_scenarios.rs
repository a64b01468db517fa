use approx::assert_relative_eq;
use glam::Vec3;

use dwh_core::{
    AssemblyBuilder, Axis, AxisTriple, FinalizeMode, FrameError, MemoryDocument, Offset, Origin,
    OriginRequest, Part, PartBuilder, PartError, PartReport, PartState, ReferenceTable,
};
use dwh_kernel::MemoryKernel;

fn block(kernel: &MemoryKernel, name: &str, depth: f32, width: f32, height: f32) -> Part {
    PartBuilder::new(name, AxisTriple::CANONICAL)
        .tabulate(|t| {
            t.centered(Axis::D)?.set(Axis::D, 1, depth / 2.0)?;
            t.centered(Axis::W)?.set(Axis::W, 1, width / 2.0)?;
            t.set(Axis::H, 1, height)?;
            Ok(())
        })
        .unwrap()
        .locate(Vec3::ZERO, (0, 0, 0))
        .unwrap()
        .shape(kernel, |frame, kernel| {
            Ok(kernel.make_box(
                frame.point(-1, -1, 0)?,
                [
                    frame.vec(Axis::D, depth),
                    frame.vec(Axis::W, width),
                    frame.vec(Axis::H, height),
                ],
            )?)
        })
        .unwrap()
}

#[test]
fn derived_axis_is_unit_and_perpendicular() {
    let pairs = [
        (Vec3::X, Vec3::Y),
        (Vec3::new(1.0, 1.0, 0.0).normalize(), Vec3::new(-1.0, 1.0, 0.0).normalize()),
        (Vec3::new(0.0, 0.6, 0.8), Vec3::X),
    ];
    for (d, w) in pairs {
        let axes = AxisTriple::builder().d(d).w(w).build().unwrap();
        assert_relative_eq!(axes.h().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(axes.h().dot(d), 0.0, epsilon = 1e-5);
        assert_relative_eq!(axes.h().dot(w), 0.0, epsilon = 1e-5);
    }
}

#[test]
fn point_zero_is_origin() {
    let kernel = MemoryKernel::new();
    let mut part = block(&kernel, "b", 4.0, 6.0, 8.0);
    assert_eq!(part.point(0, 0, 0).unwrap(), part.pos_o());
    part.place(Vec3::new(3.0, -2.0, 1.0), (0, 0, 0)).unwrap();
    assert_eq!(part.world_point(0, 0, 0).unwrap(), part.world_pos_o());
}

#[test]
fn origin_round_trip() {
    let axes = AxisTriple::builder()
        .d(Vec3::new(1.0, 1.0, 0.0))
        .h(Vec3::Z)
        .build()
        .unwrap();
    let targets = [Vec3::ZERO, Vec3::new(12.5, -3.0, 40.0), Vec3::splat(-7.25)];
    let indices = [(0, 0, 0), (1, -1, 1), (-1, 1, 0), (1, 1, 1)];
    for target in targets {
        for index in indices {
            let located = PartBuilder::new("r", axes)
                .tabulate(|t| {
                    t.centered(Axis::D)?.set(Axis::D, 1, 7.0)?;
                    t.centered(Axis::W)?.set(Axis::W, 1, 2.5)?;
                    t.set(Axis::H, 1, 11.0)?;
                    Ok(())
                })
                .unwrap()
                .locate(target, index)
                .unwrap();
            let back = located.frame().point_at(index.into()).unwrap();
            assert!(back.abs_diff_eq(target, 1e-4), "{:?} at {:?}", target, index);
        }
    }
}

#[test]
fn centered_axis_is_symmetric() {
    let kernel = MemoryKernel::new();
    let part = block(&kernel, "s", 10.0, 6.0, 2.0);
    for axis in [Axis::D, Axis::W] {
        for i in part.table().indices(axis) {
            let plus = part.axis_point(axis, i).unwrap() - part.pos_o();
            let minus = part.axis_point(axis, -i).unwrap() - part.pos_o();
            assert_eq!(plus, -minus);
        }
    }
}

#[test]
fn reused_point_matches_child() {
    let kernel = MemoryKernel::new();
    let mut asm = AssemblyBuilder::new(
        "holder",
        AxisTriple::CANONICAL,
        OriginRequest::at_origin(Vec3::new(5.0, 5.0, 5.0)),
    );
    let child = asm.append_child(block(&kernel, "c", 2.0, 2.0, 9.0)).unwrap();
    asm.reuse_child_point(Axis::H, 3, child, 1).unwrap();
    asm.reuse_child_point(Axis::D, 1, child, 1).unwrap();

    let resolved = asm.resolve_all_placements().unwrap();
    let c = resolved.child(child).unwrap();
    for (axis, key, child_key) in [(Axis::H, 3, 1), (Axis::D, 1, 1)] {
        let expected = resolved.pos_o() + (c.axis_point(axis, child_key).unwrap() - c.pos_o());
        assert_eq!(resolved.frame().axis_point(axis, key).unwrap(), expected);
    }
}

#[test]
fn scenario_a_edge_anchored_height() {
    let mut t = ReferenceTable::builder(&AxisTriple::CANONICAL);
    t.set(Axis::H, 1, 10.0).unwrap();
    let origin = Origin::resolve(
        OriginRequest::new(Vec3::new(5.0, 5.0, 5.0), (0, 0, 1)),
        &t.build(),
    )
    .unwrap();
    assert_eq!(origin.pos_o(), Vec3::new(5.0, 5.0, -5.0));
}

#[test]
fn scenario_b_center_versus_edge() {
    let mut t = ReferenceTable::builder(&AxisTriple::CANONICAL);
    t.centered(Axis::W).unwrap().set(Axis::W, 1, -3.0).unwrap();
    let table = t.build();
    assert_eq!(table.lookup(Axis::W, 1), Ok(Vec3::new(0.0, -3.0, 0.0)));

    let pos = Vec3::new(1.0, 2.0, 3.0);
    let center = Origin::resolve(OriginRequest::new(pos, (0, 0, 0)), &table).unwrap();
    let edge = Origin::resolve(OriginRequest::new(pos, (0, 1, 0)), &table).unwrap();
    let diff = edge.pos_o() - center.pos_o();
    assert_relative_eq!(diff.length(), 3.0, epsilon = 1e-6);
    assert_relative_eq!(diff.dot(Vec3::Y).abs(), 3.0, epsilon = 1e-6);
}

#[test]
fn scenario_c_absent_index_is_an_error() {
    let kernel = MemoryKernel::new();
    let part = block(&kernel, "c", 1.0, 1.0, 1.0);
    assert!(matches!(
        part.point(0, 0, 7),
        Err(PartError::Frame(FrameError::UndefinedReferencePoint {
            axis: Axis::H,
            index: 7
        }))
    ));
    assert!(matches!(
        PartBuilder::new("x", AxisTriple::CANONICAL).locate(Vec3::ZERO, (2, 0, 0)),
        Err(PartError::Frame(FrameError::UndefinedReferencePoint { .. }))
    ));
}

/// Child B sits on top of child A, whose height is only known once A is built
#[test]
fn scenario_d_deferred_placement() {
    let kernel = MemoryKernel::new();
    let computed_height = 3.0 * 4.5;

    // naive ordering: B's offset is fixed before A exists, from the height known then
    let unknown_height = 0.0;
    let mut naive = AssemblyBuilder::new("naive", AxisTriple::CANONICAL, OriginRequest::default());
    let b = naive.append_child(block(&kernel, "b", 1.0, 1.0, 1.0)).unwrap();
    naive
        .place_child(b, Vec3::new(0.0, 0.0, unknown_height))
        .unwrap();
    naive
        .append_child(block(&kernel, "a", 4.0, 4.0, computed_height))
        .unwrap();
    let naive = naive.resolve_all_placements().unwrap();
    let naive_b = naive.child(b).unwrap().world_pos_o();
    assert_ne!(naive_b.z, computed_height);

    // deferred ordering: B's offset is computed from A's built table
    let mut asm = AssemblyBuilder::new("stack", AxisTriple::CANONICAL, OriginRequest::default());
    let b = asm.append_child(block(&kernel, "b", 1.0, 1.0, 1.0)).unwrap();
    let a = asm
        .append_child(block(&kernel, "a", 4.0, 4.0, computed_height))
        .unwrap();
    asm.place_child(b, Offset::deferred(move |s| s.point(a, 0, 0, 1)))
        .unwrap();
    let resolved = asm.resolve_all_placements().unwrap();
    assert_relative_eq!(resolved.child(b).unwrap().world_pos_o().z, computed_height);

    let part = resolved.finalize(FinalizeMode::Group, &kernel).unwrap();
    let report = PartReport::from_part(&part).unwrap();
    assert_relative_eq!(report.children[0].pos_o.z, computed_height);
}

#[test]
fn realized_group_keeps_world_placements() {
    let kernel = MemoryKernel::new();
    let mut asm = AssemblyBuilder::new(
        "pair",
        AxisTriple::CANONICAL,
        OriginRequest::at_origin(Vec3::new(0.0, 0.0, 10.0)),
    );
    asm.append_child(block(&kernel, "left", 1.0, 1.0, 1.0)).unwrap();
    let right = asm.append_child(block(&kernel, "right", 1.0, 1.0, 1.0)).unwrap();
    asm.place_child(right, Vec3::new(3.0, 0.0, 0.0)).unwrap();
    let mut part = asm
        .resolve_all_placements()
        .unwrap()
        .finalize(FinalizeMode::Group, &kernel)
        .unwrap();
    part.place(Vec3::new(100.0, 0.0, 0.0), (0, 0, 0)).unwrap();

    let mut document = MemoryDocument::new();
    let group = part.realize(&mut document).unwrap();
    assert_eq!(document.len(), 3);
    let group = document.get(group).unwrap();
    assert!(group.is_group());

    let right = document.find("right").unwrap();
    let placement = right.placement.unwrap();
    assert!(placement.translation.abs_diff_eq(Vec3::new(103.0, 0.0, 0.0), 1e-5));
}

#[test]
fn ungrouped_child_moves_to_another_assembly() {
    let kernel = MemoryKernel::new();
    let mut pair = AssemblyBuilder::new(
        "pair",
        AxisTriple::CANONICAL,
        OriginRequest::at_origin(Vec3::new(0.0, 0.0, 10.0)),
    );
    pair.append_child(block(&kernel, "left", 1.0, 1.0, 1.0)).unwrap();
    let right = pair.append_child(block(&kernel, "right", 1.0, 1.0, 1.0)).unwrap();
    pair.place_child(right, Vec3::new(3.0, 0.0, 0.0)).unwrap();
    let mut pair = pair
        .resolve_all_placements()
        .unwrap()
        .finalize(FinalizeMode::Group, &kernel)
        .unwrap();
    pair.place(Vec3::new(100.0, 0.0, 0.0), (0, 0, 0)).unwrap();

    let mut parts = pair.ungroup().unwrap();
    let right = parts.pop().unwrap();
    assert_eq!(right.name(), "right");
    assert_eq!(right.state(), PartState::Placed);
    assert!(right.world_pos_o().abs_diff_eq(Vec3::new(103.0, 0.0, 0.0), 1e-5));

    let mut shelf = AssemblyBuilder::new(
        "shelf",
        AxisTriple::CANONICAL,
        OriginRequest::at_origin(Vec3::new(0.0, 0.0, 50.0)),
    );
    shelf.append_child(block(&kernel, "board", 20.0, 5.0, 1.0)).unwrap();
    let moved = shelf.append_child(right).unwrap();
    shelf.place_child(moved, Vec3::new(0.0, 0.0, 1.0)).unwrap();
    let mut shelf = shelf
        .resolve_all_placements()
        .unwrap()
        .finalize(FinalizeMode::Group, &kernel)
        .unwrap();
    assert_eq!(shelf.children()[1].state(), PartState::Grouped);

    let mut document = MemoryDocument::new();
    shelf.realize(&mut document).unwrap();
    let placed = document.find("right").unwrap().placement.unwrap();
    assert!(placed.translation.abs_diff_eq(Vec3::new(0.0, 0.0, 51.0), 1e-5));
}
