use crate::geom::{BBox3, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Face normal as stored in the payload. May be zero or stale.
    pub normal: Vec3,
    pub vertices: [Vec3; 3],
}

impl Triangle {
    pub fn new(normal: Vec3, vertices: [Vec3; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Normal from the vertex winding (right-hand rule); zero when degenerate.
    pub fn winding_normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a).normalized_or_zero()
    }

    pub fn area(&self) -> f32 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a).length() * 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn extents(&self) -> Option<BBox3> {
        if self.triangles.is_empty() {
            return None;
        }
        Some(
            self.triangles
                .iter()
                .flat_map(|t| t.vertices.iter().copied())
                .collect(),
        )
    }
}
