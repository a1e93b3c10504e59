//! Arena-backed scene graph shared by procedural and file-loaded content.
//!
//! Nodes live in a flat `Vec` and refer to each other through [`NodeId`]
//! handles, which keeps traversal free of cycles and lets side tables (such as
//! the highlight routine's original-material cache) key on plain integers.

pub mod shapes;

use std::sync::Arc;

use glam::{Mat4, Vec3};
use indexmap::IndexMap;

use crate::model::{Material, NodeId, PartId, PartInfo};

/// Indexed triangle list in node-local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as position triples, skipping out-of-range indices.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|t| {
            Some([
                *self.positions.get(t[0] as usize)?,
                *self.positions.get(t[1] as usize)?,
                *self.positions.get(t[2] as usize)?,
            ])
        })
    }

    /// Fill `normals` with area-weighted vertex normals when missing.
    pub fn ensure_normals(&mut self) {
        if self.normals.len() == self.positions.len() {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for t in self.indices.chunks_exact(3) {
            let (a, b, c) = (t[0] as usize, t[1] as usize, t[2] as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let n = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// Geometry plus the material currently used to draw it.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
}

impl MeshInstance {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material: Arc::new(material),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub part_id: PartId,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub mesh: Option<MeshInstance>,
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl SceneNode {
    pub fn info(&self) -> PartInfo {
        PartInfo {
            id: self.part_id.clone(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as a new root). The node's part id
    /// defaults to its arena handle.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        transform: Mat4,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            id,
            name: name.into(),
            part_id: PartId::Node(id),
            transform,
            parent,
            children: Vec::new(),
            mesh: None,
            metadata: IndexMap::new(),
        });
        match parent.and_then(|p| self.nodes.get_mut(p.0 as usize)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(root).is_none() {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.node(id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// All nodes carrying a mesh, in traversal order from every root.
    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|r| self.descendants(*r))
            .filter(|id| self.node(*id).is_some_and(|n| n.mesh.is_some()))
            .collect()
    }

    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cur = self.node(id);
        while let Some(n) = cur {
            m = n.transform * m;
            cur = n.parent.and_then(|p| self.node(p));
        }
        m
    }

    pub fn find_part(&self, part: &PartId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.mesh.is_some() && &n.part_id == part)
            .map(|n| n.id)
    }

    pub fn part_info(&self, id: NodeId) -> Option<PartInfo> {
        self.node(id).map(SceneNode::info)
    }

    /// Every mesh node as a part, in traversal order.
    pub fn parts(&self) -> Vec<PartInfo> {
        self.mesh_nodes()
            .into_iter()
            .filter_map(|id| self.part_info(id))
            .collect()
    }

    /// World-space bounds of all meshes, `None` for an empty scene.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for id in self.mesh_nodes() {
            let Some(mesh) = self.node(id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            let world = self.world_transform(id);
            for p in &mesh.geometry.positions {
                let wp = world.transform_point3(*p);
                match bounds.as_mut() {
                    Some(b) => b.include(wp),
                    None => bounds = Some(Aabb { min: wp, max: wp }),
                }
            }
        }
        bounds
    }

    /// Cast a world-space ray and return the nearest mesh node hit together
    /// with the hit distance along `dir`.
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<(NodeId, f32)> {
        let dir = dir.try_normalize()?;
        let mut best: Option<(NodeId, f32)> = None;
        for id in self.mesh_nodes() {
            let Some(mesh) = self.node(id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            let world = self.world_transform(id);
            for [a, b, c] in mesh.geometry.triangles() {
                let (a, b, c) = (
                    world.transform_point3(a),
                    world.transform_point3(b),
                    world.transform_point3(c),
                );
                if let Some(t) = ray_triangle(origin, dir, a, b, c) {
                    if best.is_none_or(|(_, bt)| t < bt) {
                        best = Some((id, t));
                    }
                }
            }
        }
        best
    }
}

/// Möller–Trumbore intersection; `dir` must be normalized.
pub fn ray_triangle(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t > 1e-6).then_some(t)
}
