use egui::{menu, RichText, Ui};

use crate::chart::Gantt;
use crate::scale::ViewMode;
use crate::ui::theme;

/// File actions the host resolves (dialogs and io live with the app).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    OpenJson,
    ImportCsv,
}

/// Render the top menu bar: file loading plus the view-mode switcher.
pub fn show_toolbar(gantt: &mut Gantt, ui: &mut Ui) -> Option<ToolbarAction> {
    let mut action = None;

    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui
                .button(format!("{}  Open Tasks (JSON)...", egui_phosphor::regular::FOLDER_OPEN))
                .clicked()
            {
                action = Some(ToolbarAction::OpenJson);
                ui.close_menu();
            }
            if ui
                .button(format!("{}  Import CSV...", egui_phosphor::regular::FILE_CSV))
                .clicked()
            {
                action = Some(ToolbarAction::ImportCsv);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Timescale").small().weak());
            let current = gantt.config().view_mode;
            for mode in ViewMode::ALL {
                if gantt.config().column_spec(mode).is_none() {
                    continue;
                }
                if ui.radio(current == mode, mode.label()).clicked() {
                    gantt.change_view_mode(mode);
                    ui.close_menu();
                }
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new("Drag bars to move · Drag edges to resize · Click a connector to link")
                    .font(theme::font_small())
                    .color(theme::TEXT_DIM),
            );
        });
    });

    action
}
