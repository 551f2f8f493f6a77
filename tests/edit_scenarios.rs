//! End-to-end edits driven through `EditSession`

use std::f32::consts::FRAC_PI_2;

use handlekit::{
    ActiveTool, CheckpointLog, EditFace, EditSession, EditableMesh, HandleOrientation, InputSample,
    MeshHandle, MeshId, MeshScene, MeshTransform, PivotPoint, RotationPivot, Selection, SelectionState,
    TransformConfig,
};
use handlekit::math::{Quat, Vec2, Vec3};

const EPS: f32 = 0.0001;

fn world_positions(scene: &MeshScene, id: MeshId) -> Vec<Vec3> {
    let mesh = scene.get(id).unwrap();
    let l2w = mesh.local_to_world();
    mesh.positions().iter().map(|&p| l2w.transform_point3(p)).collect()
}

fn square(id: u64) -> EditableMesh {
    EditableMesh::new(
        MeshId(id),
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![],
        vec![EditFace::quad(0, 3, 2, 1)],
    )
}

/// Start an edit at the handle frame, then feed `samples` (each marked changed)
fn drive(
    session: &mut EditSession,
    scene: &mut MeshScene,
    provider: &SelectionState,
    samples: &[fn(InputSample) -> InputSample],
) -> CheckpointLog {
    let mut undo = CheckpointLog::new();
    let frame = session.handle_frame(provider, &*scene).unwrap();
    let origin = InputSample::from_frame(frame);
    session.update(&origin, provider, scene, &mut undo);
    for make in samples {
        session.update(&make(origin), provider, scene, &mut undo);
    }
    undo
}

#[test]
fn test_translate_model_center() {
    let mut scene = MeshScene::new();
    scene.insert(square(1));
    let config = TransformConfig::default().with_pivot(PivotPoint::ModelBoundingBoxCenter);
    let provider = SelectionState::new(Selection::new().with(MeshId(1), &[0, 1, 2, 3]), config);

    let mut session = EditSession::new(ActiveTool::translate());
    let undo = drive(&mut session, &mut scene, &provider, &[|o| {
        o.translated(o.handle_position + Vec3::new(2.0, 0.0, 0.0))
    }]);
    session.finish(&mut scene);

    let after = world_positions(&scene, MeshId(1));
    let expected = [
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(3.0, 1.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
    ];
    for (a, e) in after.iter().zip(expected) {
        assert!((*a - e).length() < EPS, "got {:?}, expected {:?}", a, e);
    }
    assert_eq!(undo.len(), 1);
}

#[test]
fn test_rotation_keeps_welded_pair_together() {
    let positions = vec![
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
    ];
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::new(MeshId(1), positions, vec![], vec![]));

    // Selecting 3 pulls in 7; 0 widens the bounds so the pivot is the origin
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 3]),
        TransformConfig::default(),
    );
    let mut session = EditSession::new(ActiveTool::rotate(RotationPivot::GroupBasis));
    drive(&mut session, &mut scene, &provider, &[|o| o.rotated(Quat::from_rotation_y(FRAC_PI_2))]);

    let after = world_positions(&scene, MeshId(1));
    assert!((after[3] - after[7]).length() < EPS);
    assert!((after[3] - Vec3::new(1.0, 1.0, -1.0)).length() < EPS, "{:?}", after[3]);
    // Unselected vertices stay put
    assert!((after[5] - Vec3::new(1.0, -1.0, 1.0)).length() < EPS);
}

#[test]
fn test_zero_scale_collapses_axis() {
    let mut scene = MeshScene::new();
    scene.insert(square(1));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1, 2, 3]),
        TransformConfig::default(),
    );

    let mut session = EditSession::new(ActiveTool::scale());
    drive(&mut session, &mut scene, &provider, &[|o| o.scaled(Vec3::new(0.0, 1.0, 1.0))]);
    assert!(session.is_editing());

    for p in world_positions(&scene, MeshId(1)) {
        assert!((p.x - 0.5).abs() < EPS);
        assert!(p.is_finite());
    }
}

#[test]
fn test_uv_drag_up_moves_texture_down() {
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::plane(MeshId(1), 1.0).with_transform(MeshTransform {
        scale: Vec3::splat(2.0),
        ..MeshTransform::default()
    }));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[3]),
        TransformConfig::default(),
    );

    let mut session = EditSession::new(ActiveTool::texture_translate());
    drive(&mut session, &mut scene, &provider, &[|o| {
        o.translated(o.handle_position + Vec3::new(0.0, 1.0, 0.0))
    }]);

    let uvs = scene.get(MeshId(1)).unwrap().uvs().to_vec();
    // (0, 1) moved by (0, -1) / scale 2
    assert!((uvs[3] - Vec2::new(0.0, 0.5)).length() < EPS, "{:?}", uvs[3]);
    // UV edits never pull in other vertices
    assert!((uvs[2] - Vec2::new(1.0, 1.0)).length() < EPS);
}

#[test]
fn test_welds_hold_for_every_policy() {
    for pivot in [
        PivotPoint::WorldBoundingBoxCenter,
        PivotPoint::ModelBoundingBoxCenter,
        PivotPoint::IndividualOrigins,
    ] {
        let mut scene = MeshScene::new();
        scene.insert(EditableMesh::cube(MeshId(1), 2.0));
        let provider = SelectionState::new(
            Selection::new().with(MeshId(1), &[0, 2]),
            TransformConfig::default().with_pivot(pivot),
        );

        let mut session = EditSession::new(ActiveTool::rotate(RotationPivot::Handle));
        drive(&mut session, &mut scene, &provider, &[|o| o.rotated(Quat::from_rotation_x(0.8))]);

        let after = world_positions(&scene, MeshId(1));
        let cube = scene.get(MeshId(1)).unwrap();
        for cluster in cube.coincident().clusters() {
            for &i in &cluster[1..] {
                assert!(
                    (after[i] - after[cluster[0]]).length() < EPS,
                    "{:?}: {} and {} split",
                    pivot,
                    i,
                    cluster[0]
                );
            }
        }
    }
}

#[test]
fn test_recompute_matches_fresh_edit() {
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1, 2, 3]),
        TransformConfig::default().with_orientation(HandleOrientation::Local),
    );
    let rotated = || {
        square(1).with_transform(MeshTransform {
            rotation: Quat::from_rotation_z(0.4),
            ..MeshTransform::default()
        })
    };

    let mut scene = MeshScene::new();
    scene.insert(rotated());
    let mut session = EditSession::new(ActiveTool::translate());
    drive(&mut session, &mut scene, &provider, &[
        |o| o.translated(o.handle_position + Vec3::new(4.0, 0.0, 0.0)),
        |o| o.translated(o.handle_position + Vec3::new(0.0, -3.0, 1.0)),
        |o| o.translated(o.handle_position + Vec3::new(0.5, 0.5, 0.0)),
        |o| o.translated(o.handle_position + Vec3::new(0.5, 0.5, 0.0)),
    ]);
    let repeated = world_positions(&scene, MeshId(1));

    let mut fresh = MeshScene::new();
    fresh.insert(rotated());
    let mut session = EditSession::new(ActiveTool::translate());
    drive(&mut session, &mut fresh, &provider, &[|o| {
        o.translated(o.handle_position + Vec3::new(0.5, 0.5, 0.0))
    }]);

    for (a, b) in repeated.iter().zip(world_positions(&fresh, MeshId(1))) {
        assert!((*a - b).length() < EPS);
    }
}

#[test]
fn test_translation_independent_of_orientation() {
    let v = Vec3::new(0.3, -0.2, 0.5);
    let mut results = Vec::new();

    for orientation in [HandleOrientation::Global, HandleOrientation::Local, HandleOrientation::Normal] {
        let mut scene = MeshScene::new();
        scene.insert(EditableMesh::cube(MeshId(1), 2.0).with_transform(MeshTransform {
            rotation: Quat::from_rotation_y(0.6) * Quat::from_rotation_x(0.2),
            ..MeshTransform::default()
        }));
        let provider = SelectionState::new(
            Selection::new().with(MeshId(1), &[0]),
            TransformConfig::default()
                .with_pivot(PivotPoint::IndividualOrigins)
                .with_orientation(orientation),
        );
        let before = world_positions(&scene, MeshId(1))[0];

        let mut session = EditSession::new(ActiveTool::translate());
        drive(&mut session, &mut scene, &provider, &[|o| {
            o.translated(o.handle_position + Vec3::new(0.3, -0.2, 0.5))
        }]);

        let after = world_positions(&scene, MeshId(1))[0];
        assert!((after - (before + v)).length() < EPS, "{:?}: {:?}", orientation, after - before);
        results.push(after);
    }

    assert!((results[0] - results[1]).length() < EPS);
    assert!((results[0] - results[2]).length() < EPS);
}

#[test]
fn test_mesh_removed_mid_edit() {
    let mut scene = MeshScene::new();
    scene.insert(square(1));
    scene.insert(square(2).with_transform(MeshTransform::from_translation(Vec3::new(3.0, 0.0, 0.0))));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1, 2, 3]).with(MeshId(2), &[0, 1, 2, 3]),
        TransformConfig::default(),
    );

    let mut session = EditSession::new(ActiveTool::translate());
    let mut undo = CheckpointLog::new();
    let origin = InputSample::from_frame(session.handle_frame(&provider, &scene).unwrap());
    session.update(&origin, &provider, &mut scene, &mut undo);

    let first = session.update(&origin.translated(Vec3::new(2.0, 0.5, 0.0)), &provider, &mut scene, &mut undo);
    assert_eq!(first.report.unwrap().meshes_updated, 2);

    scene.remove(MeshId(2));
    let second = session.update(&origin.translated(Vec3::new(2.0, 1.5, 0.0)), &provider, &mut scene, &mut undo);
    let report = second.report.unwrap();
    assert!(second.changed);
    assert_eq!(report.meshes_updated, 1);
    assert_eq!(report.meshes_skipped, 1);
    assert!(session.finish(&mut scene));

    // Pivot was (2, 0.5, 0); the handle ended at (2, 1.5, 0)
    let after = world_positions(&scene, MeshId(1));
    assert!((after[0] - Vec3::new(0.0, 1.0, 0.0)).length() < EPS);
}

#[test]
fn test_config_file_drives_groups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("handles.ron");
    TransformConfig::default()
        .with_pivot(PivotPoint::IndividualOrigins)
        .save(&path)
        .unwrap();
    let config = TransformConfig::load(&path).unwrap();

    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::cube(MeshId(1), 2.0));
    let provider = SelectionState::new(Selection::new().with(MeshId(1), &[0, 2]), config);

    let mut session = EditSession::default();
    let groups = session.groups(&provider, &scene);
    assert_eq!(groups[0].groups.len(), 2);
}

#[test]
fn test_texture_rotate_turns_uvs_about_center() {
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::plane(MeshId(1), 1.0));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1, 2, 3]),
        TransformConfig::default(),
    );

    let mut session = EditSession::new(ActiveTool::texture_rotate());
    drive(&mut session, &mut scene, &provider, &[|o| o.rotated(Quat::from_rotation_z(FRAC_PI_2))]);
    assert!(session.finish(&mut scene));

    // A quarter turn of the handle turns the texture the other way around (0.5, 0.5)
    let uvs = scene.get(MeshId(1)).unwrap().uvs().to_vec();
    assert!((uvs[0] - Vec2::new(0.0, 1.0)).length() < EPS, "{:?}", uvs[0]);
    assert!((uvs[1] - Vec2::new(0.0, 0.0)).length() < EPS, "{:?}", uvs[1]);
    assert!((uvs[2] - Vec2::new(1.0, 0.0)).length() < EPS, "{:?}", uvs[2]);
}

#[test]
fn test_texture_scale_ignores_depth() {
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::plane(MeshId(1), 1.0));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1, 2, 3]),
        TransformConfig::default(),
    );

    let mut session = EditSession::new(ActiveTool::texture_scale());
    drive(&mut session, &mut scene, &provider, &[|o| o.scaled(Vec3::new(2.0, 0.5, 7.0))]);

    let uvs = scene.get(MeshId(1)).unwrap().uvs().to_vec();
    assert!((uvs[0] - Vec2::new(-0.5, 0.25)).length() < EPS, "{:?}", uvs[0]);
    assert!((uvs[2] - Vec2::new(1.5, 0.75)).length() < EPS, "{:?}", uvs[2]);
    // Positions are untouched by UV tools
    assert!((world_positions(&scene, MeshId(1))[0] - Vec3::new(-0.5, 0.0, -0.5)).length() < EPS);
}

#[test]
fn test_vertex_snap_along_single_axis() {
    let mut scene = MeshScene::new();
    scene.insert(square(1));
    let mut config = TransformConfig::default();
    config.vertex_snap = true;
    let provider = SelectionState::new(Selection::new().with(MeshId(1), &[1]), config);

    let mut session = EditSession::new(ActiveTool::translate());
    drive(&mut session, &mut scene, &provider, &[|o| InputSample {
        snap_target: Some(Vec3::new(3.0, 7.0, 2.0)),
        ..o.translated(o.handle_position + Vec3::new(0.3, 0.0, 0.0))
    }]);

    // The target projects onto the X axis through the handle
    let after = world_positions(&scene, MeshId(1));
    assert!((after[1] - Vec3::new(3.0, 0.0, 0.0)).length() < EPS, "{:?}", after[1]);
    assert!((after[0] - Vec3::ZERO).length() < EPS);
    assert!((after[2] - Vec3::new(1.0, 1.0, 0.0)).length() < EPS);
}

#[test]
fn test_non_finite_origin_skips_only_its_group() {
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::new(
        MeshId(1),
        vec![Vec3::ZERO, Vec3::new(f32::INFINITY, 0.0, 0.0)],
        vec![],
        vec![],
    ));
    let provider = SelectionState::new(
        Selection::new().with(MeshId(1), &[0, 1]),
        TransformConfig::default().with_pivot(PivotPoint::IndividualOrigins),
    );

    let mut session = EditSession::new(ActiveTool::translate());
    let mut undo = CheckpointLog::new();
    session.update(&InputSample::at(Vec3::ZERO, Quat::IDENTITY), &provider, &mut scene, &mut undo);
    let update = session.update(&InputSample::moved_to(Vec3::X), &provider, &mut scene, &mut undo);

    let report = update.report.unwrap();
    assert!(update.changed);
    assert_eq!(report.groups_skipped, 1);
    assert_eq!(report.elements_written, 1);

    let after = scene.get(MeshId(1)).unwrap().positions().to_vec();
    assert!((after[0] - Vec3::X).length() < EPS);
    assert!(!after[1].is_finite());
}

#[test]
fn test_configured_weld_tolerance_joins_near_vertices() {
    let mut scene = MeshScene::new();
    scene.insert(EditableMesh::new(
        MeshId(1),
        vec![Vec3::ZERO, Vec3::new(0.01, 0.0, 0.0), Vec3::X],
        vec![],
        vec![],
    ));
    let mut config = TransformConfig::default();
    config.coincident_epsilon = 0.1;
    scene.reweld(&config);
    let provider = SelectionState::new(Selection::new().with(MeshId(1), &[0]), config);

    let mut session = EditSession::default();
    let groups = session.groups(&provider, &scene);
    let mut indices = groups[0].groups[0].indices.clone();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1]);
}
