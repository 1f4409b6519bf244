//! Scene drawn with the egui painter, orthographic and back to front.

use eframe::egui;
use h5stl_core::geom::{BBox3, Vec3};
use h5stl_core::scene::{ObjectId, Scene, SceneObject};
use nalgebra::{UnitQuaternion, Vector3};
use std::collections::BTreeMap;

const SOLID_RGB: [f32; 3] = [0.55, 0.62, 0.72];
const AMBIENT: f32 = 0.35;

#[derive(Debug, Default)]
pub struct PaintScene {
    next_id: u64,
    objects: BTreeMap<ObjectId, SceneObject>,
}

impl PaintScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn world_bounds(&self) -> BBox3 {
        let mut out = BBox3::empty();
        for obj in self.objects.values() {
            let transform = obj.transform();
            match obj {
                SceneObject::Solid { geometry, .. } => {
                    for p in &geometry.positions {
                        out.include_point(transform.apply_point(*p));
                    }
                }
                SceneObject::Edges { geometry, .. } => {
                    for [a, b] in &geometry.segments {
                        out.include_point(transform.apply_point(*a));
                        out.include_point(transform.apply_point(*b));
                    }
                }
            }
        }
        out
    }
}

impl Scene for PaintScene {
    fn add(&mut self, object: SceneObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(id, object);
        id
    }

    fn remove(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.45,
            zoom: 1.0,
        }
    }
}

impl OrbitCamera {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
    }
}

struct Projector {
    rotation: UnitQuaternion<f32>,
    center: Vec3,
    origin: egui::Pos2,
    scale: f32,
}

impl Projector {
    fn new(rect: egui::Rect, bounds: BBox3, camera: &OrbitCamera) -> Self {
        let extent = bounds.diag().max(1e-6);
        let scale = rect.width().min(rect.height()) / extent * 0.9 * camera.zoom;
        Self {
            rotation: camera.rotation(),
            center: bounds.center(),
            origin: rect.center(),
            scale,
        }
    }

    // +z faces the viewer.
    fn eye(&self, p: Vec3) -> Vector3<f32> {
        let d = p - self.center;
        self.rotation * Vector3::new(d.x, d.y, d.z)
    }

    fn screen(&self, v: &Vector3<f32>) -> egui::Pos2 {
        egui::pos2(
            self.origin.x + v.x * self.scale,
            self.origin.y - v.y * self.scale,
        )
    }

    fn shade(&self, n: Vec3) -> egui::Color32 {
        let n = self.rotation * Vector3::new(n.x, n.y, n.z);
        let light = AMBIENT + (1.0 - AMBIENT) * n.z.abs();
        let [r, g, b] = SOLID_RGB.map(|c| (c * light * 255.0).clamp(0.0, 255.0) as u8);
        egui::Color32::from_rgb(r, g, b)
    }
}

/// Draws the scene into the remaining space and handles orbit and zoom.
pub fn show(ui: &mut egui::Ui, scene: &PaintScene, camera: &mut OrbitCamera) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, egui::CornerRadius::same(0), egui::Color32::from_gray(245));

    if response.dragged() {
        let delta = response.drag_delta();
        camera.yaw += delta.x * 0.01;
        camera.pitch = (camera.pitch + delta.y * 0.01).clamp(-1.55, 1.55);
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.0 {
            let factor = (scroll / 200.0).exp();
            camera.zoom = (camera.zoom * factor).clamp(0.05, 50.0);
        }
    }

    let bounds = scene.world_bounds();
    if bounds.is_empty() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Upload an STL or convert an h5 file.",
            egui::FontId::proportional(14.0),
            egui::Color32::from_gray(120),
        );
        return;
    }
    let proj = Projector::new(rect, bounds, camera);

    for obj in scene.objects.values() {
        if let SceneObject::Solid {
            geometry,
            transform,
            ..
        } = obj
        {
            let mut faces: Vec<(f32, [egui::Pos2; 3], egui::Color32)> = geometry
                .positions
                .chunks_exact(3)
                .zip(geometry.normals.chunks_exact(3))
                .map(|(tri, normals)| {
                    let eye = [0, 1, 2].map(|i| proj.eye(transform.apply_point(tri[i])));
                    let depth = (eye[0].z + eye[1].z + eye[2].z) / 3.0;
                    let normal = normals
                        .iter()
                        .fold(Vec3::ZERO, |acc, n| acc + transform.apply_vector(*n));
                    (
                        depth,
                        eye.map(|v| proj.screen(&v)),
                        proj.shade(normal.normalized_or_zero()),
                    )
                })
                .collect();
            faces.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut mesh = egui::Mesh::default();
            for (_, pts, color) in faces {
                let base = mesh.vertices.len() as u32;
                for p in pts {
                    mesh.colored_vertex(p, color);
                }
                mesh.add_triangle(base, base + 1, base + 2);
            }
            painter.add(egui::Shape::mesh(mesh));
        }
    }

    let stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    for obj in scene.objects.values() {
        if let SceneObject::Edges {
            geometry,
            transform,
            ..
        } = obj
        {
            for [a, b] in &geometry.segments {
                let a = proj.screen(&proj.eye(transform.apply_point(*a)));
                let b = proj.screen(&proj.eye(transform.apply_point(*b)));
                painter.line_segment([a, b], stroke);
            }
        }
    }
}
