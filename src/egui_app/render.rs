#![cfg(feature = "egui")]

use egui::{Color32, Pos2, Rect, Shape};
use glam::{Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::model::Material;
use crate::scene::SceneGraph;

const AMBIENT: f32 = 0.3;

struct ProjectedTriangle {
    points: [Pos2; 3],
    depth: f32,
    color: Color32,
}

pub(crate) fn material_color32(m: &Material, lambert: f32) -> Color32 {
    let light = AMBIENT + (1.0 - AMBIENT) * lambert.clamp(0.0, 1.0);
    let emitted = m.emitted();
    let channel = |i: usize| ((m.color[i] * light + emitted[i]).clamp(0.0, 1.0) * 255.0) as u8;
    let alpha = if m.transparent { m.opacity.clamp(0.0, 1.0) } else { 1.0 };
    Color32::from_rgba_unmultiplied(channel(0), channel(1), channel(2), (alpha * 255.0) as u8)
}

/// Draw every mesh of `scene` into `rect` with flat shading.
///
/// Triangles are projected on the CPU and painted back to front, which is
/// enough for the ghosted (semi-transparent) parts to blend over the rest.
/// Returns the number of triangles painted.
pub fn paint_scene(
    painter: &egui::Painter,
    rect: Rect,
    scene: &SceneGraph,
    camera: &OrbitCamera,
) -> usize {
    let viewport = Vec2::new(rect.width(), rect.height());
    if viewport.x < 1.0 || viewport.y < 1.0 {
        return 0;
    }
    let view_proj = camera.view_projection(viewport.x / viewport.y);
    let light = Vec3::new(0.4, 1.0, 0.6).normalize();

    let mut triangles = Vec::new();
    for id in scene.mesh_nodes() {
        let Some(mesh) = scene.node(id).and_then(|n| n.mesh.as_ref()) else {
            continue;
        };
        let world = scene.world_transform(id);
        for [a, b, c] in mesh.geometry.triangles() {
            let wa = world.transform_point3(a);
            let wb = world.transform_point3(b);
            let wc = world.transform_point3(c);
            let (Some((pa, da)), Some((pb, db)), Some((pc, dc))) = (
                camera.project(&view_proj, wa, viewport),
                camera.project(&view_proj, wb, viewport),
                camera.project(&view_proj, wc, viewport),
            ) else {
                continue;
            };
            let normal = (wb - wa).cross(wc - wa).normalize_or_zero();
            let to_pos = |p: Vec2| Pos2::new(rect.min.x + p.x, rect.min.y + p.y);
            triangles.push(ProjectedTriangle {
                points: [to_pos(pa), to_pos(pb), to_pos(pc)],
                depth: (da + db + dc) / 3.0,
                color: material_color32(&mesh.material, normal.dot(light).abs()),
            });
        }
    }
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let mut out = egui::Mesh::default();
    for t in &triangles {
        let base = out.vertices.len() as u32;
        for p in t.points {
            out.colored_vertex(p, t.color);
        }
        out.add_triangle(base, base + 1, base + 2);
    }
    let painted = triangles.len();
    painter.with_clip_rect(rect).add(Shape::mesh(out));
    painted
}
