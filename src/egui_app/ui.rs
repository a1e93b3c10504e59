#![cfg(feature = "egui")]

use egui::{Align2, Color32, PointerButton, RichText, Sense};
use glam::Vec2;

use super::render::paint_scene;
use super::state::{ShellPanel, ViewerAction, ViewerApp};
use super::text::highlight_query_job;
use crate::model::PartInfo;
use crate::viewer::Content;

fn show_system_list(app: &ViewerApp, ui: &mut egui::Ui, actions: &mut Vec<ViewerAction>) {
    ui.heading("Systems");
    for (i, system) in app.viewer.catalog().systems.iter().enumerate() {
        let active = i == app.viewer.active_index();
        let resp = ui.selectable_label(active, RichText::new(&system.name).strong());
        if resp.clicked() {
            actions.push(ViewerAction::SelectSystem(i));
        }
        if !system.description.is_empty() {
            ui.label(RichText::new(&system.description).small().weak());
        }
        ui.add_space(4.0);
    }
    ui.separator();

    let mut query = app.viewer.search().to_string();
    ui.horizontal(|ui| {
        let resp = ui.add(
            egui::TextEdit::singleline(&mut query)
                .hint_text("Search parts by name…")
                .desired_width(ui.available_width() - 28.0),
        );
        if resp.changed() {
            actions.push(ViewerAction::Search(query.clone()));
        }
        let clear = ui.add_enabled(!app.viewer.search().is_empty(), egui::Button::new("✖"));
        if clear.on_hover_text("Clear search").clicked() {
            actions.push(ViewerAction::ClearSearch);
        }
    });

    let parts = app.viewer.parts();
    let search = app.viewer.search();
    let shown: Vec<PartInfo> = if search.trim().is_empty() {
        parts.clone()
    } else {
        app.viewer.search_matches()
    };
    if !search.trim().is_empty() {
        ui.label(
            RichText::new(format!("{} of {} parts match", shown.len(), parts.len())).weak(),
        );
    }
    egui::ScrollArea::vertical().id_salt("parts").show(ui, |ui| {
        for part in &shown {
            let job = highlight_query_job(&part.name, search);
            let resp = ui.add(egui::Label::new(job).sense(Sense::click()));
            if resp.on_hover_text(part.id.to_string()).clicked() {
                actions.push(ViewerAction::SelectPart(part.id.clone()));
            }
        }
    });
}

fn show_part_detail(info: &PartInfo, ui: &mut egui::Ui, actions: &mut Vec<ViewerAction>) {
    if ui.button("⬅ Back").clicked() {
        actions.push(ViewerAction::ClearSelection);
    }
    ui.separator();
    ui.heading(&info.name);
    ui.label(format!("Id: {}", info.id));
    ui.separator();
    egui::CollapsingHeader::new("Attributes")
        .default_open(true)
        .show(ui, |ui| {
            if info.metadata.is_empty() {
                ui.label("<none>");
            }
            for (k, v) in &info.metadata {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new(k).strong());
                    ui.label(v.to_string());
                });
            }
        });
    egui::CollapsingHeader::new("Raw data")
        .default_open(false)
        .show(ui, |ui| {
            let mut raw = serde_json::to_string_pretty(info).unwrap_or_default();
            ui.add(
                egui::TextEdit::multiline(&mut raw)
                    .code_editor()
                    .interactive(false)
                    .desired_width(f32::INFINITY),
            );
        });
}

fn show_canvas(app: &mut ViewerApp, ui: &mut egui::Ui, actions: &mut Vec<ViewerAction>) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 28, 36));
    let viewport = Vec2::new(rect.width(), rect.height());

    let delta = response.drag_delta();
    if response.dragged_by(PointerButton::Primary) {
        app.camera.orbit(-delta.x * 0.01, delta.y * 0.01);
    } else if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
        app.camera.pan(Vec2::new(delta.x, delta.y) / rect.height().max(1.0));
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            app.camera.zoom((-scroll * 0.002).exp());
        }
    }

    match app.viewer.content() {
        Content::Ready(scene) => {
            paint_scene(&painter, rect, &scene.graph, &app.camera);
        }
        Content::Loading(progress) => {
            let center = rect.center();
            let bar = egui::Rect::from_center_size(center, egui::vec2(240.0, 20.0));
            let widget = match progress.fraction() {
                Some(f) => egui::ProgressBar::new(f).show_percentage(),
                None => egui::ProgressBar::new(0.0).animate(true),
            };
            ui.put(bar, widget);
            let button = egui::Rect::from_center_size(center + egui::vec2(0.0, 60.0), egui::vec2(80.0, 22.0));
            if ui.put(button, egui::Button::new("Cancel")).clicked() {
                actions.push(ViewerAction::CancelLoad);
            }
            painter.text(
                center + egui::vec2(0.0, 24.0),
                Align2::CENTER_TOP,
                format!("Loading… {} KiB", progress.loaded / 1024),
                egui::FontId::proportional(13.0),
                Color32::LIGHT_GRAY,
            );
        }
        Content::Failed(message) => {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("Could not load model\n{}", message),
                egui::FontId::proportional(15.0),
                Color32::from_rgb(240, 110, 110),
            );
        }
        Content::Empty => {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No system selected",
                egui::FontId::proportional(15.0),
                Color32::GRAY,
            );
        }
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - rect.min;
            if let Some((origin, dir)) = app.camera.ray(Vec2::new(local.x, local.y), viewport) {
                app.viewer.click(origin, dir);
            }
        }
    }
}

fn show_placeholder(panel: ShellPanel, ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading(panel.label());
        ui.label(RichText::new("Nothing here yet.").weak());
    });
}

pub fn update(app: &mut ViewerApp, ctx: &egui::Context) {
    let mut actions: Vec<ViewerAction> = Vec::new();
    app.viewer.poll_load();

    egui::TopBottomPanel::top("shell").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new("partview").strong());
            ui.separator();
            for panel in ShellPanel::ALL {
                if ui.selectable_label(app.shell.active == panel, panel.label()).clicked() {
                    actions.push(ViewerAction::ShowPanel(panel));
                }
            }
        });
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.label(RichText::new(app.status.borrow().as_str()).small());
    });

    if app.shell.active != ShellPanel::Viewer {
        egui::CentralPanel::default().show(ctx, |ui| show_placeholder(app.shell.active, ui));
    } else {
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("⟲ Reset view").clicked() {
                        actions.push(ViewerAction::ResetView);
                    }
                    let rotating = app.viewer.auto_rotate();
                    if ui.selectable_label(rotating, "⟳ Auto-rotate").clicked() {
                        actions.push(ViewerAction::ToggleAutoRotate);
                    }
                });
                ui.separator();
                match app.viewer.selected_info() {
                    Some(info) => show_part_detail(&info, ui, &mut actions),
                    None => show_system_list(app, ui, &mut actions),
                }
            });

        let dt = ctx.input(|i| i.stable_dt);
        app.sync_camera(dt);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| show_canvas(app, ui, &mut actions));
        if app.viewer.auto_rotate() {
            ctx.request_repaint();
        } else if app.viewer.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    for action in actions {
        app.apply(action);
    }
}
