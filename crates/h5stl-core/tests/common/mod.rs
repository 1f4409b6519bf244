#![allow(dead_code)]

use h5stl_core::geom::Vec3;
use h5stl_core::model::{Triangle, TriangleMesh};

pub fn cube() -> TriangleMesh {
    let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
    let faces: [(Vec3, [Vec3; 3], [Vec3; 3]); 6] = [
        (
            p(0.0, 0.0, -1.0),
            [p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)],
            [p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0)],
        ),
        (
            p(0.0, 0.0, 1.0),
            [p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0)],
            [p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)],
        ),
        (
            p(0.0, -1.0, 0.0),
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)],
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)],
        ),
        (
            p(0.0, 1.0, 0.0),
            [p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0)],
            [p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)],
        ),
        (
            p(-1.0, 0.0, 0.0),
            [p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0)],
            [p(0.0, 0.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0)],
        ),
        (
            p(1.0, 0.0, 0.0),
            [p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0)],
            [p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)],
        ),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (normal, a, b) in faces {
        triangles.push(Triangle::new(normal, a));
        triangles.push(Triangle::new(normal, b));
    }
    TriangleMesh::new(triangles)
}

pub fn strip(n: usize) -> TriangleMesh {
    let triangles = (0..n)
        .map(|i| {
            let x = i as f32;
            Triangle::new(
                Vec3::new(0.0, 0.0, 1.0),
                [
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 0.5, 0.0, 0.0),
                    Vec3::new(x, 0.5, 0.0),
                ],
            )
        })
        .collect();
    TriangleMesh::new(triangles)
}
