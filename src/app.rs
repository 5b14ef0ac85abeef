use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AdmitScopeApp {
    pub state: AppState,
}

impl AdmitScopeApp {
    /// Start with the fixed source already loaded when it exists.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Default for AdmitScopeApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl eframe::App for AdmitScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: filtered count + CSV export ----
        egui::TopBottomPanel::bottom("export_bar").show(ctx, |ui| {
            panels::export_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and dataset info ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tab bar + active tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.title());
                }
            });
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    charts::show_tab(ui, &self.state);
                });
        });
    }
}
