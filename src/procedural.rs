//! Canned demo assemblies built from primitive shapes.
//!
//! Each assembly is a fixed, ordered table. Tags other than the known ones
//! fall back to the control unit table.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

use crate::model::{Material, PartId};
use crate::scene::{Geometry, MeshInstance, SceneGraph, shapes};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeKind {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl ShapeKind {
    pub fn geometry(&self) -> Geometry {
        match *self {
            ShapeKind::Box { width, height, depth } => shapes::box_geometry(width, height, depth),
            ShapeKind::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => shapes::cylinder_geometry(radius_top, radius_bottom, height, segments),
            ShapeKind::Cone { radius, height, segments } => {
                shapes::cone_geometry(radius, height, segments)
            }
            ShapeKind::Sphere {
                radius,
                width_segments,
                height_segments,
            } => shapes::sphere_geometry(radius, width_segments, height_segments),
            ShapeKind::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => shapes::torus_geometry(radius, tube, radial_segments, tubular_segments),
        }
    }
}

/// One row of an assembly table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartDescriptor {
    pub name: &'static str,
    #[serde(flatten)]
    pub shape: ShapeKind,
    pub position: [f32; 3],
    /// Euler angles (XYZ order) in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    /// `0xRRGGBB`
    pub color: u32,
}

impl PartDescriptor {
    pub fn transform(&self) -> Mat4 {
        let [rx, ry, rz] = self.rotation.unwrap_or([0.0; 3]);
        Mat4::from_rotation_translation(
            Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            Vec3::from_array(self.position),
        )
    }
}

const fn cylinder(radius: f32, height: f32, segments: u32) -> ShapeKind {
    ShapeKind::Cylinder {
        radius_top: radius,
        radius_bottom: radius,
        height,
        segments,
    }
}

const fn piston(name: &'static str, x: f32) -> PartDescriptor {
    PartDescriptor {
        name,
        shape: cylinder(0.3, 1.5, 32),
        position: [x, 1.5, 0.0],
        rotation: None,
        color: 0x718096,
    }
}

const ENGINE: &[PartDescriptor] = &[
    PartDescriptor {
        name: "Engine-Housing",
        shape: ShapeKind::Box { width: 4.0, height: 2.0, depth: 2.0 },
        position: [0.0, 0.0, 0.0],
        rotation: None,
        color: 0x4a5568,
    },
    piston("Piston-001", -1.5),
    piston("Piston-002", -0.5),
    piston("Piston-003", 0.5),
    piston("Piston-004", 1.5),
    PartDescriptor {
        name: "Gear-Drive-Main",
        shape: ShapeKind::Torus {
            radius: 0.8,
            tube: 0.2,
            radial_segments: 16,
            tubular_segments: 32,
        },
        position: [2.8, 0.0, 0.0],
        rotation: Some([0.0, FRAC_PI_2, 0.0]),
        color: 0xd69e2e,
    },
    PartDescriptor {
        name: "Shaft-Coupling",
        shape: cylinder(0.15, 6.0, 16),
        position: [0.0, -0.5, 0.0],
        rotation: Some([0.0, 0.0, FRAC_PI_2]),
        color: 0xa0aec0,
    },
];

const PUMP: &[PartDescriptor] = &[
    PartDescriptor {
        name: "Pump-Body",
        shape: cylinder(1.2, 2.5, 32),
        position: [0.0, 0.0, 0.0],
        rotation: None,
        color: 0x2b6cb0,
    },
    PartDescriptor {
        name: "Impeller-Main",
        shape: ShapeKind::Torus {
            radius: 0.7,
            tube: 0.15,
            radial_segments: 12,
            tubular_segments: 24,
        },
        position: [0.0, 0.0, 0.0],
        rotation: Some([FRAC_PI_2, 0.0, 0.0]),
        color: 0xed8936,
    },
    PartDescriptor {
        name: "Inlet-Pipe",
        shape: cylinder(0.3, 2.0, 16),
        position: [-2.0, 0.0, 0.0],
        rotation: Some([0.0, 0.0, FRAC_PI_2]),
        color: 0x718096,
    },
    PartDescriptor {
        name: "Outlet-Pipe",
        shape: cylinder(0.25, 1.5, 16),
        position: [0.0, 2.0, 0.0],
        rotation: None,
        color: 0x718096,
    },
    PartDescriptor {
        name: "Motor-Housing",
        shape: ShapeKind::Box { width: 1.5, height: 1.5, depth: 1.5 },
        position: [2.2, 0.0, 0.0],
        rotation: None,
        color: 0x2d3748,
    },
    PartDescriptor {
        name: "Pressure-Valve",
        shape: ShapeKind::Sphere {
            radius: 0.35,
            width_segments: 16,
            height_segments: 12,
        },
        position: [0.0, 2.9, 0.0],
        rotation: None,
        color: 0xe53e3e,
    },
];

const fn capacitor(name: &'static str, x: f32) -> PartDescriptor {
    PartDescriptor {
        name,
        shape: cylinder(0.15, 0.5, 16),
        position: [x, 0.35, 0.8],
        rotation: None,
        color: 0x3182ce,
    }
}

const CONTROL: &[PartDescriptor] = &[
    PartDescriptor {
        name: "Circuit-Board",
        shape: ShapeKind::Box { width: 4.0, height: 0.1, depth: 3.0 },
        position: [0.0, 0.0, 0.0],
        rotation: None,
        color: 0x276749,
    },
    PartDescriptor {
        name: "Processor-Chip",
        shape: ShapeKind::Box { width: 0.8, height: 0.15, depth: 0.8 },
        position: [0.0, 0.125, 0.0],
        rotation: None,
        color: 0x1a202c,
    },
    capacitor("Capacitor-001", -1.2),
    capacitor("Capacitor-002", -0.8),
    capacitor("Capacitor-003", -0.4),
    PartDescriptor {
        name: "Heat-Sink",
        shape: ShapeKind::Box { width: 1.0, height: 0.6, depth: 1.0 },
        position: [0.0, 0.5, 0.0],
        rotation: None,
        color: 0xa0aec0,
    },
    PartDescriptor {
        name: "Connector-Port",
        shape: ShapeKind::Cone { radius: 0.25, height: 0.5, segments: 12 },
        position: [1.6, 0.3, -1.1],
        rotation: None,
        color: 0xb7791f,
    },
];

/// Tags with a dedicated table. Anything else resolves to the last one.
pub const KINDS: [&str; 3] = ["engine", "pump", "control"];

pub fn parts_for(kind: &str) -> &'static [PartDescriptor] {
    match kind {
        "engine" => ENGINE,
        "pump" => PUMP,
        _ => CONTROL,
    }
}

/// Build a flat scene with one root node per table row.
pub fn build_scene(kind: &str) -> SceneGraph {
    let mut scene = SceneGraph::new();
    for part in parts_for(kind) {
        let id = scene.add_node(None, part.name, part.transform());
        let Some(node) = scene.node_mut(id) else {
            continue;
        };
        node.part_id = PartId::named(part.name);
        node.mesh = Some(MeshInstance::new(
            part.shape.geometry(),
            Material::from_hex(part.color),
        ));
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(part) {
            node.metadata.extend(map);
        }
    }
    log::debug!("built procedural '{}' with {} parts", kind, scene.len());
    scene
}
