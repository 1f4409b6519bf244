mod common;

use h5stl_core::error::EmptyMeshError;
use h5stl_core::geom::Vec3;
use h5stl_core::mesh::{DisplayTransform, MeshBuilder, MeshConfig};
use h5stl_core::model::{Triangle, TriangleMesh};
use h5stl_core::stl::{decode, encode};

#[test]
fn solid_has_one_face_per_decoded_triangle() {
    for n in [1usize, 2, 12, 257] {
        let bytes = encode(&common::strip(n), "strip");
        let mesh = decode(&bytes).expect("valid");
        let model = MeshBuilder::default().build(&mesh).expect("non-empty");
        assert_eq!(n, model.solid.triangle_count());
        assert_eq!(n * 3, model.solid.normals.len());
    }
}

#[test]
fn empty_mesh_is_rejected() {
    let err = MeshBuilder::default()
        .build(&TriangleMesh::default())
        .unwrap_err();
    assert_eq!(EmptyMeshError, err);
}

#[test]
fn cube_outline_keeps_the_twelve_box_edges() {
    let model = MeshBuilder::default().build(&common::cube()).expect("cube");
    assert_eq!(12, model.edges.segment_count());

    // Face diagonals run between opposite corners of a face; none may survive.
    for [a, b] in &model.edges.segments {
        let d = *b - *a;
        let axes = [d.x, d.y, d.z].iter().filter(|c| c.abs() > 1e-6).count();
        assert_eq!(1, axes, "diagonal {a:?} -> {b:?} kept");
    }
}

#[test]
fn single_triangle_outline_is_its_boundary() {
    let model = MeshBuilder::default().build(&common::strip(1)).expect("triangle");
    assert_eq!(3, model.edges.segment_count());
}

#[test]
fn coplanar_neighbours_share_no_outline() {
    let p = |x: f32, y: f32| Vec3::new(x, y, 0.0);
    let n = Vec3::new(0.0, 0.0, 1.0);
    let quad = TriangleMesh::new(vec![
        Triangle::new(n, [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]),
        Triangle::new(n, [p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]),
    ]);
    let model = MeshBuilder::default().build(&quad).expect("quad");
    assert_eq!(4, model.edges.segment_count());
}

#[test]
fn threshold_is_tunable() {
    // Two faces folded by 30 degrees along the Y axis.
    let fold = 30f32.to_radians();
    let tip = Vec3::new(-fold.cos(), 0.5, fold.sin());
    let mesh = TriangleMesh::new(vec![
        Triangle::new(
            Vec3::ZERO,
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.0), Vec3::new(0.0, 1.0, 0.0)],
        ),
        Triangle::new(Vec3::ZERO, [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), tip]),
    ]);

    let sharp = MeshBuilder::default().build(&mesh).expect("fold");
    assert_eq!(5, sharp.edges.segment_count());

    let lenient = MeshBuilder::new(MeshConfig {
        edge_threshold_deg: 45.0,
        ..MeshConfig::default()
    })
    .build(&mesh)
    .expect("fold");
    assert_eq!(4, lenient.edges.segment_count());
}

#[test]
fn vertex_normals_average_adjacent_faces() {
    let model = MeshBuilder::default().build(&common::cube()).expect("cube");
    let origin = Vec3::ZERO;
    let expected = Vec3::new(-1.0, -1.0, -1.0).normalized_or_zero();
    let mut seen = 0;
    for (pos, normal) in model.solid.positions.iter().zip(&model.solid.normals) {
        if pos.approx_eq(origin, 1e-6) {
            assert!(normal.approx_eq(expected, 1e-5), "{normal:?}");
            seen += 1;
        }
    }
    assert_eq!(6, seen);
}

#[test]
fn degenerate_triangle_gets_zero_normals() {
    let v = Vec3::new(1.0, 1.0, 1.0);
    let mesh = TriangleMesh::new(vec![Triangle::new(Vec3::ZERO, [v, v, v])]);
    let model = MeshBuilder::default().build(&mesh).expect("one triangle");
    assert_eq!(1, model.solid.triangle_count());
    assert!(model.solid.normals.iter().all(|n| *n == Vec3::ZERO));
    assert_eq!(0, model.edges.segment_count());
}

#[test]
fn solid_and_edges_share_the_display_transform() {
    let model = MeshBuilder::default().build(&common::cube()).expect("cube");
    assert_eq!(DisplayTransform::standard(), model.transform);

    // -90 degrees about X maps +Z to +Y.
    let up = model.transform.apply_vector(Vec3::new(0.0, 0.0, 1.0));
    assert!(up.approx_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6), "{up:?}");
    let origin = model.transform.apply_point(Vec3::ZERO);
    assert!(origin.approx_eq(Vec3::ZERO, 1e-6));

    let world = model.world_bounds();
    assert!(world.min.approx_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5), "{world:?}");
    assert!(world.max.approx_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5), "{world:?}");
}

#[test]
fn every_build_gets_a_fresh_id() {
    let builder = MeshBuilder::default();
    let a = builder.build(&common::strip(1)).expect("a");
    let b = builder.build(&common::strip(1)).expect("b");
    assert_ne!(a.id, b.id);
}
