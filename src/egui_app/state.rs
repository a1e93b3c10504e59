#![cfg(feature = "egui")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::camera::OrbitCamera;
use crate::catalog::Catalog;
use crate::model::PartId;
use crate::viewer::{ViewerEvent, ViewerState};

/// Top-level panels reachable from the shell navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellPanel {
    Overview,
    Viewer,
    Reports,
    Settings,
}

impl ShellPanel {
    pub const ALL: [ShellPanel; 4] = [
        ShellPanel::Overview,
        ShellPanel::Viewer,
        ShellPanel::Reports,
        ShellPanel::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShellPanel::Overview => "Overview",
            ShellPanel::Viewer => "3D Viewer",
            ShellPanel::Reports => "Reports",
            ShellPanel::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shell {
    pub active: ShellPanel,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            active: ShellPanel::Viewer,
        }
    }
}

/// Something the user asked for while the UI was being laid out; applied
/// after the frame's widgets are done borrowing the app.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    ShowPanel(ShellPanel),
    SelectSystem(usize),
    SelectPart(PartId),
    ClearSelection,
    Search(String),
    ClearSearch,
    ResetView,
    ToggleAutoRotate,
    CancelLoad,
}

/// Interactive window: shell navigation, viewer sidebar and 3D canvas.
pub struct ViewerApp {
    pub shell: Shell,
    pub viewer: ViewerState,
    pub camera: OrbitCamera,
    /// Content generation the camera was last framed for.
    pub framed_generation: u64,
    /// Last notable viewer event, shown in the status bar.
    pub status: Rc<RefCell<String>>,
}

impl ViewerApp {
    pub fn new(mut viewer: ViewerState) -> Self {
        let status = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&status);
        viewer.subscribe(move |event| {
            let text = match event {
                ViewerEvent::SystemChanged { id, .. } => format!("Showing {}", id),
                ViewerEvent::SelectionChanged(Some(info)) => format!("Selected {}", info.name),
                ViewerEvent::SelectionChanged(None) => "Selection cleared".to_string(),
                ViewerEvent::SearchChanged { text, matches } if !text.trim().is_empty() => {
                    format!("{} part(s) match \"{}\"", matches, text.trim())
                }
                ViewerEvent::ContentReady { parts } => format!("Loaded {} part(s)", parts),
                ViewerEvent::LoadFailed(message) => format!("Load failed: {}", message),
                ViewerEvent::LoadCancelled => "Load cancelled".to_string(),
                _ => return,
            };
            *sink.borrow_mut() = text;
        });
        Self {
            shell: Shell::default(),
            viewer,
            camera: OrbitCamera::default(),
            framed_generation: 0,
            status,
        }
    }

    /// Build the viewer for `catalog`, waking `ctx` whenever a background load reports.
    pub fn with_context(catalog: Catalog, initial_system: Option<&str>, ctx: &egui::Context) -> Self {
        let repaint = ctx.clone();
        let waker: crate::loader::task::Waker = Arc::new(move || repaint.request_repaint());
        let mut viewer = ViewerState::with_source(
            catalog,
            Box::new(|| Box::new(crate::loader::FsSource)),
            Some(waker),
        );
        if let Some(id) = initial_system {
            viewer.set_active_system_by_id(id);
        }
        Self::new(viewer)
    }

    pub fn apply(&mut self, action: ViewerAction) {
        match action {
            ViewerAction::ShowPanel(p) => self.shell.active = p,
            ViewerAction::SelectSystem(i) => {
                self.viewer.set_active_system(i);
            }
            ViewerAction::SelectPart(id) => {
                self.viewer.select_part(id);
            }
            ViewerAction::ClearSelection => self.viewer.clear_selection(),
            ViewerAction::Search(text) => self.viewer.set_search(text),
            ViewerAction::ClearSearch => self.viewer.clear_search(),
            ViewerAction::ResetView => self.viewer.request_reset_view(),
            ViewerAction::ToggleAutoRotate => {
                self.viewer.toggle_auto_rotate();
            }
            ViewerAction::CancelLoad => {
                self.viewer.cancel_load();
            }
        }
    }

    /// Per-frame camera bookkeeping: frame new content, honour reset requests,
    /// advance auto-rotation by `dt` seconds.
    pub fn sync_camera(&mut self, dt: f32) {
        if self.viewer.content_generation() != self.framed_generation {
            if let Some(bounds) = self.viewer.scene().and_then(|s| s.bounds()) {
                self.camera.frame(bounds);
            }
            self.framed_generation = self.viewer.content_generation();
        }
        if self.viewer.take_reset_view() {
            self.camera.reset();
        }
        if self.viewer.auto_rotate() {
            self.camera.orbit(dt * 0.5, 0.0);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        super::ui::update(self, ctx);
    }
}
