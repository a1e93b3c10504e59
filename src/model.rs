use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ────────────────────────────────────────────────────────────────────────────
// Systems
// ────────────────────────────────────────────────────────────────────────────

/// One selectable 3D content set shown in the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: SystemContent,
}

/// Where the parts of a system come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemContent {
    /// Canned primitive assembly, see [`crate::procedural`]. `kind` is the tag.
    Procedural { kind: String },
    /// External model file decoded by [`crate::loader`].
    Asset { path: Utf8PathBuf },
}

impl SystemDescriptor {
    pub fn procedural(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            content: SystemContent::Procedural { kind: kind.into() },
        }
    }

    pub fn asset(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            content: SystemContent::Asset { path: path.into() },
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self.content, SystemContent::Asset { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parts
// ────────────────────────────────────────────────────────────────────────────

/// Handle of a node inside a [`crate::scene::SceneGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier of a part.
///
/// File-loaded content is identified by the scene node handle assigned when
/// the file was decoded. Procedural parts have no separate identifier, so the
/// part name is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartId {
    Node(NodeId),
    Named(String),
}

impl PartId {
    pub fn named(name: impl Into<String>) -> Self {
        PartId::Named(name.into())
    }

    /// An empty name does not identify anything.
    pub fn is_empty(&self) -> bool {
        matches!(self, PartId::Named(n) if n.is_empty())
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartId::Node(n) => write!(f, "node {}", n),
            PartId::Named(s) => f.write_str(s),
        }
    }
}

/// Bundle reported when a part is clicked: identifier, name and whatever
/// key/value metadata the author attached to the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInfo {
    pub id: PartId,
    pub name: String,
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Materials
// ────────────────────────────────────────────────────────────────────────────

/// Linear RGB colour, components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Convert a `0xRRGGBB` literal into an [`Rgb`] triple.
pub fn rgb_from_hex(hex: u32) -> Rgb {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Surface description of a mesh, roughly a metal/roughness standard material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self::standard([0.8, 0.8, 0.8])
    }
}

impl Material {
    pub fn standard(color: Rgb) -> Self {
        Self {
            color,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            metalness: 0.6,
            roughness: 0.4,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
        }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::standard(rgb_from_hex(hex))
    }

    /// Colour the surface emits regardless of lighting.
    pub fn emitted(&self) -> Rgb {
        [
            self.emissive[0] * self.emissive_intensity,
            self.emissive[1] * self.emissive_intensity,
            self.emissive[2] * self.emissive_intensity,
        ]
    }
}
