//! Student admissions analytics: a typed derivation and filtering engine
//! (`data`) under an egui dashboard (`app`, `ui`).

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
