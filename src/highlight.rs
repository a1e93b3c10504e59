//! Search/selection highlighting of scene meshes.
//!
//! Every mesh gets one of four presets per pass. Priority is
//! selected > search match > ghost; when neither a search nor a selection is
//! active the mesh gets its original material back (the very same `Arc`).
//!
//! Originals are snapshotted lazily into a side table keyed by [`NodeId`] the
//! first time a mesh is visited and are never overwritten or mutated.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Material, NodeId, PartId, Rgb, rgb_from_hex};
use crate::scene::SceneGraph;

pub const SELECTED_ACCENT: u32 = 0x3b82f6;
pub const SEARCH_ACCENT: u32 = 0xf59e0b;
pub const GHOST_OPACITY: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialPreset {
    Original,
    Selected,
    SearchMatch,
    Ghost,
}

impl MaterialPreset {
    /// Derive the preset material from an original. `Original` returns an
    /// unchanged copy.
    pub fn apply_to(self, original: &Material) -> Material {
        let mut m = original.clone();
        match self {
            MaterialPreset::Original => {}
            MaterialPreset::Selected => {
                m.emissive = rgb_from_hex(SELECTED_ACCENT);
                m.emissive_intensity = 0.6;
                m.opacity = 1.0;
                m.transparent = false;
                m.depth_write = true;
            }
            MaterialPreset::SearchMatch => {
                m.emissive = rgb_from_hex(SEARCH_ACCENT);
                m.emissive_intensity = 0.4;
                m.opacity = 1.0;
                m.transparent = false;
                m.depth_write = true;
            }
            MaterialPreset::Ghost => {
                m.color = desaturate(m.color, 0.8);
                m.emissive = [0.0; 3];
                m.emissive_intensity = 0.0;
                m.opacity = GHOST_OPACITY;
                m.transparent = true;
                m.depth_write = false;
            }
        }
        m
    }
}

fn desaturate(c: Rgb, amount: f32) -> Rgb {
    let l = 0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2];
    [
        c[0] + (l - c[0]) * amount,
        c[1] + (l - c[1]) * amount,
        c[2] + (l - c[2]) * amount,
    ]
}

/// Normalized search text and selection for one highlight pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightQuery {
    needle: String,
    selected: Option<PartId>,
}

impl HighlightQuery {
    pub fn new(search: &str, selected: Option<&PartId>) -> Self {
        Self {
            needle: search.trim().to_lowercase(),
            selected: selected.filter(|p| !p.is_empty()).cloned(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.needle.is_empty() && self.selected.is_none()
    }

    pub fn is_selected(&self, part: &PartId) -> bool {
        self.selected.as_ref() == Some(part)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        !self.needle.is_empty() && name.to_lowercase().contains(&self.needle)
    }

    pub fn classify(&self, name: &str, part: &PartId) -> MaterialPreset {
        if self.is_idle() {
            MaterialPreset::Original
        } else if self.is_selected(part) {
            MaterialPreset::Selected
        } else if self.matches_name(name) {
            MaterialPreset::SearchMatch
        } else {
            MaterialPreset::Ghost
        }
    }
}

/// Preset a part named `name` gets for the given search text and selection.
pub fn classify(name: &str, part: &PartId, search: &str, selected: Option<&PartId>) -> MaterialPreset {
    HighlightQuery::new(search, selected).classify(name, part)
}

/// Side table of pre-highlight materials.
#[derive(Debug, Clone, Default)]
pub struct OriginalMaterials {
    by_node: HashMap<NodeId, Arc<Material>>,
}

impl OriginalMaterials {
    /// Snapshot `current` for `node` unless one is already cached; returns the cached original.
    pub fn capture(&mut self, node: NodeId, current: &Arc<Material>) -> Arc<Material> {
        self.by_node
            .entry(node)
            .or_insert_with(|| Arc::clone(current))
            .clone()
    }

    pub fn get(&self, node: NodeId) -> Option<&Arc<Material>> {
        self.by_node.get(&node)
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_node.clear();
    }
}

/// Counts produced by one highlight pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightStats {
    pub original: usize,
    pub selected: usize,
    pub matched: usize,
    pub ghosted: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    originals: OriginalMaterials,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn originals(&self) -> &OriginalMaterials {
        &self.originals
    }

    /// Highlight every mesh reachable from the scene roots. A missing scene is a no-op.
    pub fn apply(
        &mut self,
        scene: Option<&mut SceneGraph>,
        search: &str,
        selected: Option<&PartId>,
    ) -> HighlightStats {
        let Some(scene) = scene else {
            return HighlightStats::default();
        };
        let query = HighlightQuery::new(search, selected);
        let mut stats = HighlightStats::default();
        let roots = scene.roots().to_vec();
        for root in roots {
            self.walk(scene, root, &query, &mut stats);
        }
        log::debug!("highlight pass: {:?}", stats);
        stats
    }

    /// Highlight the meshes below `root` only.
    pub fn apply_from(
        &mut self,
        scene: Option<&mut SceneGraph>,
        root: NodeId,
        search: &str,
        selected: Option<&PartId>,
    ) -> HighlightStats {
        let Some(scene) = scene else {
            return HighlightStats::default();
        };
        let query = HighlightQuery::new(search, selected);
        let mut stats = HighlightStats::default();
        self.walk(scene, root, &query, &mut stats);
        stats
    }

    fn walk(
        &mut self,
        scene: &mut SceneGraph,
        root: NodeId,
        query: &HighlightQuery,
        stats: &mut HighlightStats,
    ) {
        for id in scene.descendants(root) {
            let Some(node) = scene.node_mut(id) else {
                continue;
            };
            let Some(mesh) = node.mesh.as_mut() else {
                continue;
            };
            let original = self.originals.capture(id, &mesh.material);
            match query.classify(&node.name, &node.part_id) {
                MaterialPreset::Original => {
                    mesh.material = original;
                    stats.original += 1;
                }
                preset => {
                    mesh.material = Arc::new(preset.apply_to(&original));
                    match preset {
                        MaterialPreset::Selected => stats.selected += 1,
                        MaterialPreset::SearchMatch => stats.matched += 1,
                        _ => stats.ghosted += 1,
                    }
                }
            }
        }
    }
}
