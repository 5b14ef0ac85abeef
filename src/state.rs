use crate::data::derive::Table;
use crate::data::filter::{filtered_indices, Criteria};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Performance,
    Demographics,
    Risk,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Performance,
        Tab::Demographics,
        Tab::Risk,
        Tab::Insights,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Performance => "Performance Analytics",
            Tab::Demographics => "Student Demographics",
            Tab::Risk => "Risk Analysis",
            Tab::Insights => "Key Insights",
        }
    }
}

/// The full UI state, independent of rendering.
///
/// Owns the derived table for the session; the visible view is recomputed
/// from the criteria on every change and is only ever a set of row indices.
pub struct AppState {
    /// Derived table (None until a source is loaded).
    pub table: Option<Table>,

    /// Current filter criteria. Meaningful only while a table is loaded;
    /// reset to "keep everything" on each load.
    pub criteria: Criteria,

    /// Indices of records passing the current criteria (cached).
    pub visible_rows: Vec<usize>,

    /// Active dashboard tab.
    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            criteria: Criteria {
                outcomes: Default::default(),
                financial_aid: None,
                english_level: None,
                gpa_range: crate::data::filter::GpaRange::FULL,
            },
            visible_rows: Vec::new(),
            tab: Tab::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly derived table and reset the criteria to keep
    /// everything.
    pub fn set_table(&mut self, table: Table) {
        self.criteria = Criteria::all_of(table.dataset());
        self.visible_rows = (0..table.len()).collect();
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_rows` after a criteria change. Invalid criteria
    /// are rejected: the prior view is kept and the error surfaced.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match filtered_indices(table, &self.criteria) {
            Ok(rows) => {
                self.visible_rows = rows;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("rejected filter criteria: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
