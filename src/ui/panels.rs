use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::outcome_rate;
use crate::data::export::to_csv_bytes;
use crate::data::loader;
use crate::data::model::Outcome;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and dataset info
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the category indices so the criteria can be mutated in the loop.
    let colors = crate::color::OutcomeColors::for_dataset(table.dataset());
    let outcomes = table.dataset().outcomes.clone();
    let aid_values = table.dataset().financial_aid_values.clone();
    let level_values = table.dataset().english_level_values.clone();
    let total = table.len();
    let acceptance = outcome_rate(table, &(0..total).collect::<Vec<_>>(), &Outcome::Accepted);

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Outcome multi-select ----
            ui.strong("Outcome Status");
            for outcome in &outcomes {
                let mut checked = state.criteria.outcomes.contains(outcome);
                let text = RichText::new(outcome.label()).color(colors.get(outcome));
                if ui.checkbox(&mut checked, text).changed() {
                    if checked {
                        state.criteria.outcomes.insert(outcome.clone());
                    } else {
                        state.criteria.outcomes.remove(outcome);
                    }
                    changed = true;
                }
            }
            ui.separator();

            // ---- Exact-match combo boxes ("All" = no constraint) ----
            changed |= constraint_combo(
                ui,
                "Financial Aid",
                &aid_values,
                &mut state.criteria.financial_aid,
            );
            changed |= constraint_combo(
                ui,
                "English Level",
                &level_values,
                &mut state.criteria.english_level,
            );
            ui.separator();

            // ---- GPA range (inclusive bounds) ----
            ui.strong("GPA Range");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut state.criteria.gpa_range.lo)
                            .range(0.0..=4.0)
                            .speed(0.1)
                            .prefix("from "),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut state.criteria.gpa_range.hi)
                            .range(0.0..=4.0)
                            .speed(0.1)
                            .prefix("to "),
                    )
                    .changed();
            });
            ui.separator();

            // ---- Dataset info: whole dataset, independent of the filter ----
            ui.strong("Dataset Info");
            ui.label(format!("Total Students: {total}"));
            match acceptance {
                Some(rate) => ui.label(format!("Acceptance Rate: {:.1}%", rate * 100.0)),
                None => ui.label("Acceptance Rate: –"),
            };
        });

    if changed {
        state.refilter();
    }
}

/// An "All"-plus-values combo box backed by an `Option<String>` constraint.
/// Returns true when the selection changed.
fn constraint_combo(
    ui: &mut Ui,
    label: &str,
    values: &[String],
    constraint: &mut Option<String>,
) -> bool {
    let mut changed = false;
    ui.strong(label);
    let selected_text = constraint.clone().unwrap_or_else(|| "All".to_string());
    egui::ComboBox::from_id_salt(label)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(constraint.is_none(), "All")
                .clicked()
            {
                *constraint = None;
                changed = true;
            }
            for value in values {
                let is_selected = constraint.as_deref() == Some(value.as_str());
                if ui.selectable_label(is_selected, value).clicked() {
                    *constraint = Some(value.clone());
                    changed = true;
                }
            }
        });
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                reload_default_source(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} students loaded, {} matching filters",
                table.len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom export bar
// ---------------------------------------------------------------------------

/// Row count of the current view plus the CSV download button.
pub fn export_bar(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Filtered records: {}", state.visible_rows.len()));
        if ui.button("Download CSV").clicked() {
            let bytes = to_csv_bytes(table, &state.visible_rows);
            save_csv_dialog(&bytes, &mut state.status_message);
        }
    });
}

fn save_csv_dialog(bytes: &[u8], status: &mut Option<String>) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("filtered_student_data.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                log::info!("exported filtered view to {}", path.display());
                *status = None;
            }
            Err(e) => {
                log::error!("export failed: {e}");
                *status = Some(format!("Error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs and loading
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open admissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into_state(state, &path);
    }
}

/// Re-read the fixed source location.
fn reload_default_source(state: &mut AppState) {
    load_into_state(state, std::path::Path::new(loader::DEFAULT_SOURCE));
}

/// Load `path`, derive metrics and swap the session table. A failed load
/// keeps the prior table and surfaces the error.
pub fn load_into_state(state: &mut AppState, path: &std::path::Path) {
    match loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "loaded {} students from {} (employment column: {})",
                dataset.len(),
                path.display(),
                dataset.has_employment
            );
            state.set_table(crate::data::derive::Table::derive(dataset));
        }
        Err(e) => {
            log::error!("failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
