use crate::geom::BBox3;
use crate::mesh::RenderableModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub source: String,
    pub triangles: usize,
    pub edge_segments: usize,
    pub bounds: BBox3,
    pub display_bounds: BBox3,
}

impl ModelReport {
    pub fn new(source: impl Into<String>, model: &RenderableModel) -> Self {
        Self {
            source: source.into(),
            triangles: model.solid.triangle_count(),
            edge_segments: model.edges.segment_count(),
            bounds: model.bounds,
            display_bounds: model.world_bounds(),
        }
    }
}
