//! Pure aggregation helpers over a derived table and a filtered view.
//!
//! Every function takes `(&Table, &[usize])` — the immutable table plus the
//! row indices of the current view — and tolerates an empty view. Undefined
//! metric values are skipped, never treated as zero.

use super::derive::Table;
use super::model::{GroupKey, MetricColumn, Outcome};

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Per-group arithmetic means of `value_cols`, grouped by `group_key`.
///
/// Output follows `order`; groups absent from the view are omitted, never
/// fabricated. A group with no defined values for a column gets `None` for
/// that column.
pub fn group_means(
    table: &Table,
    rows: &[usize],
    group_key: GroupKey,
    value_cols: &[MetricColumn],
    order: &[String],
) -> Vec<(String, Vec<Option<f64>>)> {
    order
        .iter()
        .filter_map(|group| {
            let members: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|&i| group_key.label(&table.records()[i]) == Some(group.as_str()))
                .collect();
            if members.is_empty() {
                return None;
            }
            let means = value_cols
                .iter()
                .map(|&col| mean(table, &members, col))
                .collect();
            Some((group.clone(), means))
        })
        .collect()
}

/// Arithmetic mean of a column over the view, skipping undefined values.
pub fn mean(table: &Table, rows: &[usize], col: MetricColumn) -> Option<f64> {
    let defined: Vec<f64> = rows.iter().filter_map(|&i| table.value(i, col)).collect();
    if defined.is_empty() {
        return None;
    }
    Some(defined.iter().sum::<f64>() / defined.len() as f64)
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlations between `cols`, row-major `n × n`.
///
/// The diagonal is 1.0; an off-diagonal entry is NaN when either column has
/// zero variance or fewer than two paired observations in the view. An empty
/// view therefore yields a unit diagonal and NaN elsewhere, never a failure.
pub fn correlation_matrix(table: &Table, rows: &[usize], cols: &[MetricColumn]) -> Vec<f64> {
    let n = cols.len();
    let mut matrix = vec![f64::NAN; n * n];
    for i in 0..n {
        matrix[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(table, rows, cols[i], cols[j]);
            matrix[i * n + j] = r;
            matrix[j * n + i] = r;
        }
    }
    matrix
}

/// Pearson correlation over rows where both columns are defined.
fn pearson(table: &Table, rows: &[usize], a: MetricColumn, b: MetricColumn) -> f64 {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|&i| Some((table.value(i, a)?, table.value(i, b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}

// ---------------------------------------------------------------------------
// Top-N ranking
// ---------------------------------------------------------------------------

/// Up to `n` view rows with the largest (or smallest) `sort_key`.
///
/// Stable under ties: the sort preserves original row order. Rows whose key
/// is undefined are excluded — they cannot masquerade as low-risk rows.
pub fn top_n(
    table: &Table,
    rows: &[usize],
    n: usize,
    sort_key: MetricColumn,
    descending: bool,
) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = rows
        .iter()
        .filter_map(|&i| table.value(i, sort_key).map(|v| (i, v)))
        .collect();
    ranked.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    ranked.truncate(n);
    ranked.into_iter().map(|(i, _)| i).collect()
}

// ---------------------------------------------------------------------------
// Outcome summaries
// ---------------------------------------------------------------------------

/// Per-outcome row counts, in the dataset's display order.
pub fn outcome_counts(table: &Table, rows: &[usize]) -> Vec<(Outcome, usize)> {
    table
        .dataset()
        .outcomes
        .iter()
        .map(|outcome| {
            let count = rows
                .iter()
                .filter(|&&i| table.records()[i].outcome == *outcome)
                .count();
            (outcome.clone(), count)
        })
        .collect()
}

/// Share of view rows with the given outcome; `None` for an empty view.
pub fn outcome_rate(table: &Table, rows: &[usize], outcome: &Outcome) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let hits = rows
        .iter()
        .filter(|&&i| table.records()[i].outcome == *outcome)
        .count();
    Some(hits as f64 / rows.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, StudentRecord};
    use approx::assert_abs_diff_eq;

    fn record(id: &str, outcome: &str, technical: Option<f64>, gpa: Option<f64>) -> StudentRecord {
        StudentRecord {
            student_id: id.to_string(),
            iq_score: Some(100.0),
            english_score: Some(70.0),
            technical_score: technical,
            soft_skills_score: Some(60.0),
            gpa,
            outcome: Outcome::from_label(outcome),
            financial_aid: "none".to_string(),
            english_level: "intermediate".to_string(),
            employment_status: None,
        }
    }

    fn fixture() -> Table {
        let rows = vec![
            record("S1", "Accepted", Some(90.0), Some(3.5)),
            record("S2", "Accepted", Some(70.0), Some(3.0)),
            record("S3", "pending", Some(50.0), Some(2.5)),
            record("S4", "drop out", None, Some(1.5)),
            record("S5", "drop out", Some(30.0), None),
        ];
        Table::derive(Dataset::from_records(rows, false))
    }

    fn all_rows(table: &Table) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn group_means_follow_order_and_omit_absent_groups() {
        let table = fixture();
        let rows = all_rows(&table);
        let order: Vec<String> = ["drop out", "Accepted", "waitlisted"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let means = group_means(
            &table,
            &rows,
            GroupKey::Outcome,
            &[MetricColumn::TechnicalScore],
            &order,
        );

        assert_eq!(means.len(), 2);
        assert_eq!(means[0].0, "drop out");
        assert_eq!(means[1].0, "Accepted");
        // S4's undefined technical score is skipped, not averaged as zero.
        assert_abs_diff_eq!(means[0].1[0].unwrap(), 30.0);
        assert_abs_diff_eq!(means[1].1[0].unwrap(), 80.0);
    }

    #[test]
    fn group_with_no_defined_values_yields_undefined_mean() {
        let table = fixture();
        let means = group_means(
            &table,
            &[3], // S4 only
            GroupKey::Outcome,
            &[MetricColumn::TechnicalScore],
            &["drop out".to_string()],
        );
        assert_eq!(means[0].1[0], None);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let table = fixture();
        let rows = all_rows(&table);
        let cols = [
            MetricColumn::TechnicalScore,
            MetricColumn::Gpa,
            MetricColumn::IqScore,
        ];
        let m = correlation_matrix(&table, &rows, &cols);

        let n = cols.len();
        for i in 0..n {
            assert_abs_diff_eq!(m[i * n + i], 1.0);
            for j in 0..n {
                match (m[i * n + j].is_nan(), m[j * n + i].is_nan()) {
                    (true, true) => {}
                    _ => assert_abs_diff_eq!(m[i * n + j], m[j * n + i]),
                }
            }
        }
        // IQ is constant across the fixture, so its pairings are undefined.
        assert!(m[2].is_nan());
        // technical and gpa move together perfectly over the defined pairs:
        // (90,3.5), (70,3.0), (50,2.5).
        assert_abs_diff_eq!(m[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn top_n_ranks_descending_and_excludes_undefined_keys() {
        let table = fixture();
        let rows = all_rows(&table);

        // Higher risk = lower technical score; S4 has no risk score at all.
        let top = top_n(&table, &rows, 3, MetricColumn::RiskScore, true);
        let ids: Vec<&str> = top
            .iter()
            .map(|&i| table.records()[i].student_id.as_str())
            .collect();
        assert_eq!(ids, vec!["S5", "S3", "S2"]);
    }

    #[test]
    fn top_n_is_stable_under_ties_and_caps_at_table_size() {
        let rows = vec![
            record("A", "Accepted", Some(50.0), Some(3.0)),
            record("B", "Accepted", Some(50.0), Some(3.0)),
            record("C", "Accepted", Some(50.0), Some(3.0)),
        ];
        let table = Table::derive(Dataset::from_records(rows, false));
        let view = all_rows(&table);

        let top = top_n(&table, &view, 10, MetricColumn::RiskScore, true);
        assert_eq!(top, vec![0, 1, 2]);
    }

    #[test]
    fn outcome_counts_follow_display_order() {
        let table = fixture();
        let rows = all_rows(&table);
        let counts = outcome_counts(&table, &rows);
        assert_eq!(
            counts,
            vec![
                (Outcome::Accepted, 2),
                (Outcome::Pending, 1),
                (Outcome::DropOut, 2),
            ]
        );
    }

    #[test]
    fn outcome_rate_over_the_fixture() {
        let table = fixture();
        let rows = all_rows(&table);
        assert_abs_diff_eq!(
            outcome_rate(&table, &rows, &Outcome::Accepted).unwrap(),
            0.4
        );
    }

    #[test]
    fn empty_view_yields_empty_results_without_failing() {
        let table = fixture();
        let empty: Vec<usize> = Vec::new();

        assert!(group_means(
            &table,
            &empty,
            GroupKey::Outcome,
            &[MetricColumn::TotalScore],
            &["Accepted".to_string()],
        )
        .is_empty());

        let m = correlation_matrix(
            &table,
            &empty,
            &[MetricColumn::TechnicalScore, MetricColumn::Gpa],
        );
        assert_abs_diff_eq!(m[0], 1.0);
        assert!(m[1].is_nan());

        assert!(top_n(&table, &empty, 5, MetricColumn::RiskScore, true).is_empty());
        assert_eq!(outcome_rate(&table, &empty, &Outcome::Accepted), None);
        assert!(outcome_counts(&table, &empty).iter().all(|(_, c)| *c == 0));
    }
}
