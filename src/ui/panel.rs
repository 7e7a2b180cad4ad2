//! Overlay panels of the showroom
//!
//! Panels only read the viewer. Whatever the user clicked comes back as a
//! [`UiAction`] for the app to dispatch after the frame is built.

use crate::viewer::{
    lifecycle::LoadState,
    ui_shell::{UiAction, MATERIAL_NAME, PROGRESS_CONTAINER, PROGRESS_TEXT, ROTATE_TOGGLE},
    Viewer,
};

/// Draws the loading overlay and the material panel
pub fn viewer_panel(ui: &imgui::Ui, viewer: &Viewer) -> Option<UiAction> {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return None;
    }

    if viewer.ui().is_visible(PROGRESS_CONTAINER) {
        render_progress_overlay(ui, viewer, display_size);
    }

    let panel_width = (display_size[0] * 0.25).clamp(260.0, 380.0);

    ui.window("Materials")
        .size([panel_width, 0.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(true)
        .build(|| {
            let mut action = render_material_controls(ui, viewer);
            ui.separator();
            action = action.or(render_material_list(ui, viewer));
            ui.separator();
            action.or(render_view_controls(ui, viewer))
        })
        .flatten()
}

fn render_progress_overlay(ui: &imgui::Ui, viewer: &Viewer, display_size: [f32; 2]) {
    let width = 320.0_f32.min(display_size[0]);
    let text = viewer.ui().text(PROGRESS_TEXT).unwrap_or_default();

    ui.window("##progress")
        .position(
            [display_size[0] * 0.5, display_size[1] * 0.5],
            imgui::Condition::Always,
        )
        .position_pivot([0.5, 0.5])
        .size([width, 0.0], imgui::Condition::Always)
        .title_bar(false)
        .resizable(false)
        .movable(false)
        .collapsible(false)
        .build(|| {
            if let LoadState::Failed(_) = viewer.state() {
                ui.text_colored([1.0, 0.4, 0.4, 1.0], text);
            } else {
                imgui::ProgressBar::new(viewer.progress())
                    .size([-1.0, 0.0])
                    .overlay_text(text)
                    .build(ui);
            }
        });
}

fn render_material_controls(ui: &imgui::Ui, viewer: &Viewer) -> Option<UiAction> {
    let name = viewer
        .ui()
        .text(MATERIAL_NAME)
        .filter(|name| !name.is_empty())
        .unwrap_or(viewer.current_preset().name.as_str());

    ui.text(format!(
        "{} ({}/{})",
        name,
        viewer.cursor() + 1,
        viewer.catalog().len()
    ));
    ui.spacing();

    let mut action = None;
    if ui.button("< Previous") {
        action = Some(UiAction::Previous);
    }
    ui.same_line();
    if ui.button("Random") {
        action = Some(UiAction::Randomize);
    }
    ui.same_line();
    if ui.button("Next >") {
        action = Some(UiAction::Next);
    }
    action
}

fn render_material_list(ui: &imgui::Ui, viewer: &Viewer) -> Option<UiAction> {
    let mut action = None;

    ui.child_window("material_list")
        .size([0.0, 180.0])
        .border(true)
        .build(|| {
            for (i, preset) in viewer.catalog().iter().enumerate() {
                if ui
                    .selectable_config(&preset.name)
                    .selected(i == viewer.cursor())
                    .build()
                {
                    action = Some(UiAction::Select(i));
                }
            }
        });

    action
}

fn render_view_controls(ui: &imgui::Ui, viewer: &Viewer) -> Option<UiAction> {
    let mut action = None;

    let label = viewer
        .ui()
        .text(ROTATE_TOGGLE)
        .filter(|label| !label.is_empty())
        .unwrap_or(if viewer.auto_rotate() {
            "Stop Rotation"
        } else {
            "Start Rotation"
        });
    if ui.button(label) {
        action = Some(UiAction::ToggleRotation);
    }
    ui.same_line();
    if ui.button("Reset Camera") {
        action = Some(UiAction::ResetCamera);
    }

    if let Some(model) = viewer.model() {
        ui.text_disabled(format!(
            "{} surfaces, {} triangles",
            model.surface_count(),
            model.triangle_count()
        ));
    }
    ui.text_disabled("Keys: Left/Right, R, T, C");

    action
}
