use std::sync::Arc;

use glam::Mat4;
use partview::highlight::{GHOST_OPACITY, Highlighter, MaterialPreset, classify};
use partview::model::{Material, PartId};
use partview::procedural::build_scene;
use partview::scene::{MeshInstance, SceneGraph, shapes};

fn preset_of(scene: &SceneGraph, hl: &Highlighter, name: &str) -> MaterialPreset {
    let node = scene.nodes().iter().find(|n| n.name == name).unwrap();
    let original = hl.originals().get(node.id).unwrap();
    let current = &node.mesh.as_ref().unwrap().material;
    if Arc::ptr_eq(original, current) {
        return MaterialPreset::Original;
    }
    for p in [MaterialPreset::Selected, MaterialPreset::SearchMatch, MaterialPreset::Ghost] {
        if **current == p.apply_to(original) {
            return p;
        }
    }
    panic!("material of {} matches no preset", name);
}

#[test]
fn idle_query_restores_the_cached_original_arc() {
    let mut scene = build_scene("engine");
    let before: Vec<Arc<Material>> = scene
        .mesh_nodes()
        .iter()
        .map(|id| scene.node(*id).unwrap().mesh.as_ref().unwrap().material.clone())
        .collect();
    let mut hl = Highlighter::new();
    hl.apply(Some(&mut scene), "piston", None);
    hl.apply(Some(&mut scene), "  ", None);
    for (id, orig) in scene.mesh_nodes().iter().zip(&before) {
        let current = &scene.node(*id).unwrap().mesh.as_ref().unwrap().material;
        assert!(Arc::ptr_eq(current, orig));
    }
}

#[test]
fn piston_search_matches_four_and_ghosts_three() {
    let mut scene = build_scene("engine");
    let mut hl = Highlighter::new();
    let stats = hl.apply(Some(&mut scene), "piston", None);
    assert_eq!(stats.matched, 4);
    assert_eq!(stats.ghosted, 3);
    assert_eq!(stats.selected, 0);
    for name in ["Piston-001", "Piston-002", "Piston-003", "Piston-004"] {
        assert_eq!(preset_of(&scene, &hl, name), MaterialPreset::SearchMatch);
    }
    for name in ["Engine-Housing", "Gear-Drive-Main", "Shaft-Coupling"] {
        assert_eq!(preset_of(&scene, &hl, name), MaterialPreset::Ghost);
    }
}

#[test]
fn selection_outranks_search_match() {
    let mut scene = build_scene("engine");
    let mut hl = Highlighter::new();
    let sel = PartId::named("Piston-002");
    let stats = hl.apply(Some(&mut scene), "piston", Some(&sel));
    assert_eq!(stats.selected, 1);
    assert_eq!(stats.matched, 3);
    assert_eq!(preset_of(&scene, &hl, "Piston-002"), MaterialPreset::Selected);
    assert_eq!(preset_of(&scene, &hl, "Piston-001"), MaterialPreset::SearchMatch);
}

#[test]
fn selection_without_search_ghosts_everything_else() {
    let mut scene = build_scene("engine");
    let mut hl = Highlighter::new();
    let sel = PartId::named("Gear-Drive-Main");
    let stats = hl.apply(Some(&mut scene), "", Some(&sel));
    assert_eq!(stats.selected, 1);
    assert_eq!(stats.ghosted, 6);
}

#[test]
fn repeated_pass_gives_equal_materials() {
    let mut scene = build_scene("pump");
    let mut hl = Highlighter::new();
    let sel = PartId::named("Inlet-Pipe");
    hl.apply(Some(&mut scene), "pipe", Some(&sel));
    let first: Vec<Material> = scene
        .mesh_nodes()
        .iter()
        .map(|id| (*scene.node(*id).unwrap().mesh.as_ref().unwrap().material).clone())
        .collect();
    hl.apply(Some(&mut scene), "pipe", Some(&sel));
    let second: Vec<Material> = scene
        .mesh_nodes()
        .iter()
        .map(|id| (*scene.node(*id).unwrap().mesh.as_ref().unwrap().material).clone())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn cached_original_is_never_mutated() {
    let mut scene = build_scene("engine");
    let id = scene.find_part(&PartId::named("Engine-Housing")).unwrap();
    let pristine = (*scene.node(id).unwrap().mesh.as_ref().unwrap().material).clone();
    let mut hl = Highlighter::new();
    hl.apply(Some(&mut scene), "gear", None);
    hl.apply(Some(&mut scene), "", Some(&PartId::named("Engine-Housing")));
    hl.apply(Some(&mut scene), "", None);
    assert_eq!(**hl.originals().get(id).unwrap(), pristine);
    assert_eq!(*scene.node(id).unwrap().mesh.as_ref().unwrap().material, pristine);
}

#[test]
fn ghost_preset_is_transparent_and_desaturated() {
    let original = Material::from_hex(0xff0000);
    let ghost = MaterialPreset::Ghost.apply_to(&original);
    assert!(ghost.transparent);
    assert_eq!(ghost.opacity, GHOST_OPACITY);
    assert!(!ghost.depth_write);
    assert!(ghost.color[0] < original.color[0]);
    assert!(ghost.color[1] > original.color[1]);
}

#[test]
fn case_insensitive_substring_match() {
    let gear = PartId::named("Gear-Drive-Main");
    let shaft = PartId::named("Shaft-Coupling");
    assert_eq!(classify("Gear-Drive-Main", &gear, "gear", None), MaterialPreset::SearchMatch);
    assert_eq!(classify("Shaft-Coupling", &shaft, "gear", None), MaterialPreset::Ghost);
    assert_eq!(classify("Gear-Drive-Main", &gear, " GEAR ", None), MaterialPreset::SearchMatch);
    assert_eq!(classify("Gear-Drive-Main", &gear, "", None), MaterialPreset::Original);
}

#[test]
fn empty_named_selection_counts_as_none() {
    let part = PartId::named("");
    assert_eq!(classify("", &part, "", Some(&part)), MaterialPreset::Original);
}

#[test]
fn missing_scene_is_a_no_op() {
    let mut hl = Highlighter::new();
    let stats = hl.apply(None, "piston", None);
    assert_eq!(stats, Default::default());
    assert!(hl.originals().is_empty());
}

#[test]
fn nested_meshes_are_walked_from_the_given_root() {
    let mut scene = SceneGraph::new();
    let root = scene.add_node(None, "Assembly", Mat4::IDENTITY);
    let child = scene.add_node(Some(root), "Bolt-A", Mat4::IDENTITY);
    let grandchild = scene.add_node(Some(child), "Bolt-B", Mat4::IDENTITY);
    let other = scene.add_node(None, "Bolt-C", Mat4::IDENTITY);
    for id in [child, grandchild, other] {
        scene.node_mut(id).unwrap().mesh = Some(MeshInstance::new(
            shapes::box_geometry(1.0, 1.0, 1.0),
            Material::default(),
        ));
    }
    let mut hl = Highlighter::new();
    let stats = hl.apply_from(Some(&mut scene), root, "bolt", None);
    assert_eq!(stats.matched, 2);
    assert_eq!(hl.originals().len(), 2);
    assert!(hl.originals().get(other).is_none());
}
