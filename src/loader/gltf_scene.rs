use std::collections::HashSet;
use std::path::Path;

use glam::{Mat4, Vec3};
use gltf::mesh::Mode;
use serde_json::Value;

use super::LoadError;
use crate::model::{Material, NodeId};
use crate::scene::{Geometry, MeshInstance, SceneGraph};

/// Decode a `.glb` container or `.gltf` document into a scene graph.
///
/// Every glTF node becomes one scene node. The node handle assigned here is
/// the part identifier; the original glTF index and any `extras` written by the
/// author are kept as metadata.
pub(crate) fn decode(bytes: &[u8], base: Option<&Path>) -> Result<SceneGraph, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;

    let mut scene = SceneGraph::new();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(s) => {
            for node in s.nodes() {
                add_node(&mut scene, None, &node, &buffers);
            }
        }
        None => {
            // No scene declared: treat every node nobody references as a root.
            let children: HashSet<usize> = document
                .nodes()
                .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
                .collect();
            for node in document.nodes().filter(|n| !children.contains(&n.index())) {
                add_node(&mut scene, None, &node, &buffers);
            }
        }
    }
    Ok(scene)
}

fn add_node(
    scene: &mut SceneGraph,
    parent: Option<NodeId>,
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
) {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node-{}", node.index()));
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let id = scene.add_node(parent, name, transform);

    if let Some(out) = scene.node_mut(id) {
        out.metadata
            .insert("gltf_index".to_string(), Value::from(node.index()));
        if let Some(raw) = node.extras() {
            match serde_json::from_str::<Value>(raw.get()) {
                Ok(Value::Object(map)) => out.metadata.extend(map),
                Ok(other) => {
                    out.metadata.insert("extras".to_string(), other);
                }
                Err(e) => log::warn!("ignoring unreadable extras on node {}: {}", node.index(), e),
            }
        }
        if let Some(mesh) = node.mesh() {
            if let Some(mesh_name) = mesh.name() {
                out.metadata
                    .insert("mesh".to_string(), Value::from(mesh_name));
            }
            let (geometry, material) = read_mesh(&mesh, buffers);
            if geometry.triangle_count() > 0 {
                out.mesh = Some(MeshInstance::new(geometry, material));
            }
        }
    }

    for child in node.children() {
        add_node(scene, Some(id), &child, buffers);
    }
}

/// Merge all triangle primitives of `mesh`; the first primitive's material wins.
fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> (Geometry, Material) {
    let mut geometry = Geometry::default();
    let mut material = None;
    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let base = geometry.positions.len() as u32;
        let positions: Vec<Vec3> = positions.map(Vec3::from_array).collect();
        let count = positions.len();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_else(|| (0..count as u32).collect());

        geometry.positions.extend(positions);
        if normals.len() == count {
            geometry.normals.extend(normals);
        } else {
            geometry.normals.clear();
        }
        geometry.indices.extend(indices.into_iter().map(|i| i + base));
        if material.is_none() {
            material = Some(convert_material(&primitive.material()));
        }
    }
    if geometry.normals.len() != geometry.positions.len() {
        geometry.normals.clear();
        geometry.ensure_normals();
    }
    (geometry, material.unwrap_or_default())
}

fn convert_material(m: &gltf::Material) -> Material {
    let pbr = m.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let emissive = m.emissive_factor();
    Material {
        color: [r, g, b],
        emissive,
        emissive_intensity: if emissive.iter().any(|c| *c > 0.0) { 1.0 } else { 0.0 },
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        opacity: a,
        transparent: m.alpha_mode() == gltf::material::AlphaMode::Blend,
        depth_write: true,
    }
}
