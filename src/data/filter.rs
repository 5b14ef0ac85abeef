use std::collections::BTreeSet;

use super::derive::Table;
use super::error::FilterError;
use super::model::{Dataset, Outcome};

// ---------------------------------------------------------------------------
// Criteria – the user-chosen combination of filter constraints
// ---------------------------------------------------------------------------

/// Inclusive closed GPA interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpaRange {
    pub lo: f64,
    pub hi: f64,
}

impl GpaRange {
    /// The nominal GPA domain, the widest constraint the UI offers.
    pub const FULL: GpaRange = GpaRange { lo: 0.0, hi: 4.0 };

    fn contains(&self, gpa: f64) -> bool {
        self.lo <= gpa && gpa <= self.hi
    }
}

/// Filter constraints, combined by conjunction.
///
/// `None` on the combo-box constraints means "no constraint"; the outcome set
/// is explicit, and an empty set keeps nothing (callers default to all
/// values, see [`Criteria::all_of`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    /// Outcomes to keep. An empty set yields an empty view.
    pub outcomes: BTreeSet<Outcome>,
    /// Exact financial-aid value, or no constraint.
    pub financial_aid: Option<String>,
    /// Exact english-level value, or no constraint.
    pub english_level: Option<String>,
    /// Inclusive GPA interval. A record with no GPA never satisfies it.
    pub gpa_range: GpaRange,
}

impl Criteria {
    /// The criteria matching every outcome present in `dataset`, with no
    /// other constraint. This is the collaborator-boundary default.
    pub fn all_of(dataset: &Dataset) -> Self {
        Criteria {
            outcomes: dataset.outcomes.iter().cloned().collect(),
            financial_aid: None,
            english_level: None,
            gpa_range: GpaRange::FULL,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of records that pass all criteria, in original row order.
///
/// A record passes when:
/// * its outcome is in `criteria.outcomes`, and
/// * each combo-box constraint is either `None` or an exact match, and
/// * its GPA is defined and inside `gpa_range`.
///
/// Idempotent and monotonic per dimension; an empty result is a valid
/// terminal state, not an error.
pub fn filtered_indices(table: &Table, criteria: &Criteria) -> Result<Vec<usize>, FilterError> {
    let GpaRange { lo, hi } = criteria.gpa_range;
    if lo > hi {
        return Err(FilterError::InvalidRange { lo, hi });
    }

    Ok(table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            criteria.outcomes.contains(&rec.outcome)
                && criteria
                    .financial_aid
                    .as_ref()
                    .is_none_or(|aid| rec.financial_aid == *aid)
                && criteria
                    .english_level
                    .as_ref()
                    .is_none_or(|level| rec.english_level == *level)
                && rec.gpa.is_some_and(|gpa| criteria.gpa_range.contains(gpa))
        })
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::StudentRecord;

    fn record(id: &str, outcome: &str, aid: &str, gpa: Option<f64>) -> StudentRecord {
        StudentRecord {
            student_id: id.to_string(),
            iq_score: Some(80.0),
            english_score: Some(80.0),
            technical_score: Some(80.0),
            soft_skills_score: Some(80.0),
            gpa,
            outcome: Outcome::from_label(outcome),
            financial_aid: aid.to_string(),
            english_level: "intermediate".to_string(),
            employment_status: None,
        }
    }

    fn fixture() -> Table {
        let rows = vec![
            record("S1", "Accepted", "none", Some(1.5)),
            record("S2", "Accepted", "full", Some(2.0)),
            record("S3", "pending", "none", Some(3.0)),
            record("S4", "drop out", "partial", Some(4.0)),
            record("S5", "drop out", "none", None),
        ];
        Table::derive(Dataset::from_records(rows, false))
    }

    fn ids(table: &Table, rows: &[usize]) -> Vec<String> {
        rows.iter()
            .map(|&i| table.records()[i].student_id.clone())
            .collect()
    }

    #[test]
    fn outcome_filter_keeps_matching_rows_in_order() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.outcomes = BTreeSet::from([Outcome::Accepted]);

        let rows = filtered_indices(&table, &criteria).unwrap();
        assert_eq!(ids(&table, &rows), vec!["S1", "S2"]);
    }

    #[test]
    fn empty_outcome_set_yields_empty_view() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.outcomes.clear();

        assert!(filtered_indices(&table, &criteria).unwrap().is_empty());
    }

    #[test]
    fn gpa_range_bounds_are_inclusive() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.gpa_range = GpaRange { lo: 2.0, hi: 4.0 };

        let rows = filtered_indices(&table, &criteria).unwrap();
        assert_eq!(ids(&table, &rows), vec!["S2", "S3", "S4"]);
    }

    #[test]
    fn undefined_gpa_never_satisfies_the_range() {
        let table = fixture();
        let criteria = Criteria::all_of(table.dataset());

        let rows = filtered_indices(&table, &criteria).unwrap();
        assert!(!ids(&table, &rows).contains(&"S5".to_string()));
    }

    #[test]
    fn combo_constraints_are_exact_matches() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.financial_aid = Some("none".to_string());

        let rows = filtered_indices(&table, &criteria).unwrap();
        assert_eq!(ids(&table, &rows), vec!["S1", "S3"]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.gpa_range = GpaRange { lo: 3.0, hi: 1.0 };

        assert!(matches!(
            filtered_indices(&table, &criteria),
            Err(FilterError::InvalidRange { lo, hi }) if lo == 3.0 && hi == 1.0
        ));
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = fixture();
        let mut criteria = Criteria::all_of(table.dataset());
        criteria.outcomes = BTreeSet::from([Outcome::Accepted, Outcome::Pending]);
        criteria.gpa_range = GpaRange { lo: 1.0, hi: 3.5 };

        let once = filtered_indices(&table, &criteria).unwrap();
        // Re-applying the same criteria to the surviving rows changes nothing.
        let twice: Vec<usize> = once
            .iter()
            .copied()
            .filter(|&i| {
                filtered_indices(&table, &criteria)
                    .unwrap()
                    .contains(&i)
            })
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn widening_the_gpa_range_is_monotonic() {
        let table = fixture();
        let mut narrow = Criteria::all_of(table.dataset());
        narrow.gpa_range = GpaRange { lo: 2.0, hi: 3.0 };
        let mut wide = narrow.clone();
        wide.gpa_range = GpaRange { lo: 1.0, hi: 4.0 };

        let narrow_rows = filtered_indices(&table, &narrow).unwrap();
        let wide_rows = filtered_indices(&table, &wide).unwrap();
        for row in &narrow_rows {
            assert!(wide_rows.contains(row));
        }
    }
}
