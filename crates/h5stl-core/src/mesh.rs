use crate::error::EmptyMeshError;
use crate::geom::{BBox3, Vec3};
use crate::model::{Triangle, TriangleMesh};
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Adjacent faces whose normals differ by more than this angle produce a
    /// visible edge.
    pub edge_threshold_deg: f32,
    /// Grid size used to weld coincident vertices.
    pub weld_quantum: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            edge_threshold_deg: 1.0,
            weld_quantum: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u64);

/// Placement shared by the solid and edge geometry of one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform(pub Isometry3<f32>);

impl DisplayTransform {
    /// Z-up payloads shown Y-up: -90° about X, at the origin.
    pub fn standard() -> Self {
        Self(Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f32::consts::FRAC_PI_2),
        ))
    }

    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        let q = self.0.transform_point(&Point3::new(p.x, p.y, p.z));
        Vec3::new(q.x, q.y, q.z)
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        let q = self.0.transform_vector(&Vector3::new(v.x, v.y, v.z));
        Vec3::new(q.x, q.y, q.z)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        self.0.to_homogeneous()
    }
}

/// Non-indexed triangle list: three positions/normals per rendered face.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolidGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl SolidGeometry {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeGeometry {
    pub segments: Vec<[Vec3; 2]>,
}

impl EdgeGeometry {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Debug, Clone)]
pub struct RenderableModel {
    pub id: ModelId,
    pub solid: Arc<SolidGeometry>,
    pub edges: Arc<EdgeGeometry>,
    pub transform: DisplayTransform,
    /// Bounds in model space, before the display transform.
    pub bounds: BBox3,
}

impl RenderableModel {
    pub fn world_bounds(&self) -> BBox3 {
        let (lo, hi) = (self.bounds.min, self.bounds.max);
        let mut out = BBox3::empty();
        for x in [lo.x, hi.x] {
            for y in [lo.y, hi.y] {
                for z in [lo.z, hi.z] {
                    out.include_point(self.transform.apply_point(Vec3::new(x, y, z)));
                }
            }
        }
        out
    }
}

pub struct MeshBuilder {
    cfg: MeshConfig,
}

impl MeshBuilder {
    pub fn new(cfg: MeshConfig) -> Self {
        Self { cfg }
    }

    pub fn build(&self, mesh: &TriangleMesh) -> Result<RenderableModel, EmptyMeshError> {
        let Some(bounds) = mesh.extents() else {
            return Err(EmptyMeshError);
        };

        let face_normals: Vec<Vec3> = mesh.triangles.iter().map(Triangle::winding_normal).collect();

        let mut welder = Welder::new(self.cfg.weld_quantum);
        let mut corner_ids = Vec::with_capacity(mesh.len() * 3);
        let mut accum: Vec<Vec3> = Vec::new();
        for (tri, n) in mesh.triangles.iter().zip(&face_normals) {
            for v in tri.vertices {
                let id = welder.id(v);
                if id == accum.len() {
                    accum.push(Vec3::ZERO);
                }
                accum[id] += *n;
                corner_ids.push(id);
            }
        }

        let solid = SolidGeometry {
            positions: mesh.triangles.iter().flat_map(|t| t.vertices).collect(),
            normals: corner_ids
                .iter()
                .map(|&id| accum[id].normalized_or_zero())
                .collect(),
        };

        let cos_threshold = self.cfg.edge_threshold_deg.to_radians().cos();
        let edges = feature_edges(mesh, &corner_ids, &face_normals, cos_threshold);

        debug!(
            triangles = solid.triangle_count(),
            welded_vertices = accum.len(),
            edge_segments = edges.segment_count(),
            "built renderable model"
        );

        Ok(RenderableModel {
            id: ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed)),
            solid: Arc::new(solid),
            edges: Arc::new(edges),
            transform: DisplayTransform::standard(),
            bounds,
        })
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(MeshConfig::default())
    }
}

struct Welder {
    inv_quantum: f32,
    ids: HashMap<(i64, i64, i64), usize>,
}

impl Welder {
    fn new(quantum: f32) -> Self {
        Self {
            inv_quantum: 1.0 / quantum.max(f32::EPSILON),
            ids: HashMap::new(),
        }
    }

    fn id(&mut self, v: Vec3) -> usize {
        let key = (
            (v.x * self.inv_quantum).round() as i64,
            (v.y * self.inv_quantum).round() as i64,
            (v.z * self.inv_quantum).round() as i64,
        );
        let next = self.ids.len();
        *self.ids.entry(key).or_insert(next)
    }
}

struct OpenEdge {
    normal: Vec3,
    segment: [Vec3; 2],
}

// First face carrying the reverse directed edge is the neighbour.
fn feature_edges(
    mesh: &TriangleMesh,
    corner_ids: &[usize],
    face_normals: &[Vec3],
    cos_threshold: f32,
) -> EdgeGeometry {
    let mut keys: HashMap<(usize, usize), usize> = HashMap::new();
    let mut pending: Vec<Option<OpenEdge>> = Vec::new();
    let mut segments = Vec::new();

    for (t, tri) in mesh.triangles.iter().enumerate() {
        let ids = [corner_ids[t * 3], corner_ids[t * 3 + 1], corner_ids[t * 3 + 2]];
        if ids[0] == ids[1] || ids[1] == ids[2] || ids[2] == ids[0] {
            continue;
        }
        let normal = face_normals[t];

        for j in 0..3 {
            let k = (j + 1) % 3;
            let (a, b) = (ids[j], ids[k]);
            let segment = [tri.vertices[j], tri.vertices[k]];

            let matched = keys.get(&(b, a)).and_then(|&slot| pending[slot].take());
            if let Some(open) = matched {
                if normal.dot(open.normal) <= cos_threshold {
                    segments.push(segment);
                }
            } else if !keys.contains_key(&(a, b)) {
                keys.insert((a, b), pending.len());
                pending.push(Some(OpenEdge { normal, segment }));
            }
        }
    }

    segments.extend(pending.into_iter().flatten().map(|open| open.segment));
    EdgeGeometry { segments }
}
