use std::collections::HashMap;

use glam::{Mat4, Vec3};
use obj::{Group, ObjData, ObjMaterial, Object, SimplePolygon};
use serde_json::Value;

use super::LoadError;
use crate::model::Material;
use crate::scene::{Geometry, MeshInstance, SceneGraph};

const DEFAULT_COLOR: u32 = 0x9aa5b1;

/// Polygons that end up in one scene node.
struct Section<'a> {
    name: String,
    groups: Vec<&'a Group>,
}

impl Section<'_> {
    fn polygons(&self) -> impl Iterator<Item = &SimplePolygon> + '_ {
        self.groups.iter().flat_map(|g| g.polys.iter())
    }
}

/// Decode a Wavefront OBJ file. Each object (`o`) becomes a node; a file
/// with a single unnamed object is split by its groups (`g`) instead.
/// Unnamed content is named after the file.
pub(crate) fn decode(bytes: &[u8], fallback_name: &str) -> Result<SceneGraph, LoadError> {
    let data = ObjData::load_buf(bytes).map_err(|e| LoadError::Obj {
        message: e.to_string(),
    })?;
    let positions: Vec<Vec3> = data.position.iter().copied().map(Vec3::from_array).collect();

    let mut scene = SceneGraph::new();
    for section in collect_sections(&data.objects, fallback_name) {
        let geometry = build_geometry(section.polygons(), &positions);
        if geometry.triangle_count() == 0 {
            continue;
        }
        let id = scene.add_node(None, section.name.clone(), Mat4::IDENTITY);
        if let Some(node) = scene.node_mut(id) {
            let groups = distinct(
                section
                    .groups
                    .iter()
                    .map(|g| g.name.as_str())
                    .filter(|n| !is_unnamed(n)),
            );
            let materials = distinct(
                section
                    .groups
                    .iter()
                    .filter_map(|g| g.material.as_ref())
                    .map(material_name),
            );
            node.metadata
                .insert("polygon_count".to_string(), Value::from(section.polygons().count()));
            if !groups.is_empty() {
                node.metadata.insert("obj_groups".to_string(), Value::from(groups));
            }
            if !materials.is_empty() {
                node.metadata
                    .insert("obj_materials".to_string(), Value::from(materials));
            }
            node.mesh = Some(MeshInstance::new(geometry, Material::from_hex(DEFAULT_COLOR)));
        }
    }
    Ok(scene)
}

/// The parser names content without `o`/`g` "default".
fn is_unnamed(name: &str) -> bool {
    name.is_empty() || name == "default"
}

fn material_name(m: &ObjMaterial) -> &str {
    match m {
        ObjMaterial::Ref(name) => name,
        ObjMaterial::Mtl(mtl) => &mtl.name,
    }
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for n in names {
        if !out.iter().any(|o| o == n) {
            out.push(n.to_string());
        }
    }
    out
}

fn collect_sections<'a>(objects: &'a [Object], fallback_name: &str) -> Vec<Section<'a>> {
    let resolve = |name: &str| {
        if is_unnamed(name) {
            fallback_name.to_string()
        } else {
            name.to_string()
        }
    };
    let filled: Vec<&Object> = objects
        .iter()
        .filter(|o| o.groups.iter().any(|g| !g.polys.is_empty()))
        .collect();

    match filled.as_slice() {
        &[only] if is_unnamed(&only.name) => {
            // Groups sharing a name (split by `usemtl`) stay together.
            let mut sections: Vec<Section<'a>> = Vec::new();
            for group in only.groups.iter().filter(|g| !g.polys.is_empty()) {
                let name = resolve(&group.name);
                match sections.iter_mut().find(|s| s.name == name) {
                    Some(section) => section.groups.push(group),
                    None => sections.push(Section {
                        name,
                        groups: vec![group],
                    }),
                }
            }
            sections
        }
        objects => objects
            .iter()
            .map(|&o| Section {
                name: resolve(&o.name),
                groups: o.groups.iter().filter(|g| !g.polys.is_empty()).collect(),
            })
            .collect(),
    }
}

fn build_geometry<'a>(
    polygons: impl Iterator<Item = &'a SimplePolygon>,
    positions: &[Vec3],
) -> Geometry {
    let mut geometry = Geometry::default();
    let mut remap: HashMap<usize, u32> = HashMap::new();
    for SimplePolygon(corners) in polygons {
        if corners.len() < 3 || corners.iter().any(|c| c.0 >= positions.len()) {
            continue;
        }
        let local: Vec<u32> = corners
            .iter()
            .map(|c| {
                *remap.entry(c.0).or_insert_with(|| {
                    geometry.positions.push(positions[c.0]);
                    (geometry.positions.len() - 1) as u32
                })
            })
            .collect();
        // Fan triangulation.
        for i in 1..local.len() - 1 {
            geometry
                .indices
                .extend_from_slice(&[local[0], local[i], local[i + 1]]);
        }
    }
    geometry.ensure_normals();
    geometry
}
