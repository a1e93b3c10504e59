//! Egui-based interactive viewer window (feature = "egui").
//!
//! The window is split into a shell navigation bar, a sidebar (system list or
//! part detail) and a canvas that paints the active scene. All state lives in
//! [`crate::viewer::ViewerState`]; this module only lays it out and turns
//! input into [`ViewerAction`]s.

#![cfg(feature = "egui")]

mod render;
mod state;
mod text;
mod ui;

pub use render::paint_scene;
pub use state::{Shell, ShellPanel, ViewerAction, ViewerApp};
pub use text::highlight_query_job;

/// Open the viewer window and block until it is closed.
pub fn run(catalog: crate::catalog::Catalog, initial_system: Option<String>) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("partview"),
        ..Default::default()
    };
    eframe::run_native(
        "partview",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ViewerApp::with_context(
                catalog,
                initial_system.as_deref(),
                &cc.egui_ctx,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
