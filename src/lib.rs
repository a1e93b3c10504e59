//! Interactive viewer for 3D assemblies.
//!
//! This crate provides the pieces of a small model viewer: a catalog of
//! systems (procedural demo assemblies or glTF/OBJ files), an arena scene
//! graph, a search/selection highlighter and the viewer state machine that
//! ties them together.
//!
//! The binary `partview` opens the viewer window, or prints catalog and part
//! data as JSON.

pub mod camera;
pub mod catalog;
pub mod highlight;
pub mod loader;
pub mod model;
pub mod procedural;
pub mod scene;
pub mod viewer;

// Optional GUI/egui functionality lives behind the `egui` feature flag.
#[cfg(feature = "egui")]
pub mod egui_app;
