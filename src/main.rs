use std::path::Path;

use admitscope::app::AdmitScopeApp;
use admitscope::data::derive::Table;
use admitscope::data::loader::{self, DEFAULT_SOURCE};
use admitscope::state::AppState;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Load the fixed source up front. A malformed source aborts startup; a
    // missing one starts the app empty with File → Open available.
    let mut state = AppState::default();
    let source = Path::new(DEFAULT_SOURCE);
    if source.exists() {
        match loader::load_file(source) {
            Ok(dataset) => {
                log::info!("loaded {} students from {DEFAULT_SOURCE}", dataset.len());
                state.set_table(Table::derive(dataset));
            }
            Err(e) => {
                log::error!("cannot load {DEFAULT_SOURCE}: {e}");
                return Err(eframe::Error::AppCreation(Box::new(e)));
            }
        }
    } else {
        log::info!("{DEFAULT_SOURCE} not found, starting without data");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AdmitScope – Student Admissions Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(AdmitScopeApp::new(state)))),
    )
}
