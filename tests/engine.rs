//! End-to-end run of the engine: load a CSV source, derive metrics, filter,
//! aggregate, and export the filtered view.

use std::collections::BTreeSet;
use std::io::Write;

use approx::assert_abs_diff_eq;

use admitscope::data::aggregate::{group_means, outcome_rate, top_n};
use admitscope::data::derive::Table;
use admitscope::data::export::to_csv_bytes;
use admitscope::data::filter::{filtered_indices, Criteria, GpaRange};
use admitscope::data::loader::load_file;
use admitscope::data::model::{GroupKey, MetricColumn, Outcome};

const SOURCE: &str = "\
student_id,IQ_test_score,English_test_score,technical_test_score,Soft_skills_Score,gpa,Result,financial_aid,english_level,current_employment_status
S001,110,85,90,80,3.8,Accepted,none,advanced,full-time
S002,105,75,80,70,3.2,Accepted,partial,intermediate,part-time
S003,100,60,55,65,2.4,pending,full,intermediate,unemployed
S004,95,50,40,45,1.6,drop out,full,beginner,unemployed
S005,90,45,,50,1.2,drop out,none,beginner,student
";

fn load_fixture() -> Table {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SOURCE.as_bytes()).unwrap();

    let dataset = load_file(&path).unwrap();
    Table::derive(dataset)
}

#[test]
fn load_derive_filter_aggregate_export() {
    let table = load_fixture();
    assert_eq!(table.len(), 5);
    assert!(table.dataset().has_employment);

    // Derivation: S001 total is the plain mean; S005 has a missing score,
    // so both derived metrics stay undefined.
    assert_abs_diff_eq!(table.value(0, MetricColumn::TotalScore).unwrap(), 91.25);
    assert_eq!(table.value(4, MetricColumn::TotalScore), None);
    assert_eq!(table.value(4, MetricColumn::RiskScore), None);

    // Filter: accepted students with GPA in [3.0, 4.0].
    let mut criteria = Criteria::all_of(table.dataset());
    criteria.outcomes = BTreeSet::from([Outcome::Accepted]);
    criteria.gpa_range = GpaRange { lo: 3.0, hi: 4.0 };
    let rows = filtered_indices(&table, &criteria).unwrap();
    assert_eq!(rows, vec![0, 1]);

    // Aggregate over the view.
    let order = vec!["Accepted".to_string()];
    let means = group_means(
        &table,
        &rows,
        GroupKey::Outcome,
        &[MetricColumn::TechnicalScore],
        &order,
    );
    assert_eq!(means.len(), 1);
    assert_abs_diff_eq!(means[0].1[0].unwrap(), 85.0);

    let riskiest = top_n(&table, &rows, 1, MetricColumn::RiskScore, true);
    assert_eq!(table.records()[riskiest[0]].student_id, "S002");

    // Export the view and load it back through the same CSV loader.
    let bytes = to_csv_bytes(&table, &rows);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    std::fs::write(&path, &bytes).unwrap();

    let reloaded = load_file(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.records[0].student_id, "S001");
    assert_eq!(reloaded.records[1].outcome, Outcome::Accepted);
}

#[test]
fn whole_dataset_rates_are_independent_of_the_filter() {
    let table = load_fixture();
    let all_rows: Vec<usize> = (0..table.len()).collect();

    assert_abs_diff_eq!(
        outcome_rate(&table, &all_rows, &Outcome::Accepted).unwrap(),
        0.4
    );
    assert_abs_diff_eq!(
        outcome_rate(&table, &all_rows, &Outcome::DropOut).unwrap(),
        0.4
    );
}

#[test]
fn rows_with_undefined_metrics_never_rank() {
    let table = load_fixture();
    let all_rows: Vec<usize> = (0..table.len()).collect();

    // S005 would look maximally at-risk if its missing technical score were
    // treated as zero; instead it is excluded from the ranking entirely.
    let ranked = top_n(&table, &all_rows, 10, MetricColumn::RiskScore, true);
    assert_eq!(ranked.len(), 4);
    assert!(ranked.iter().all(|&r| table.records()[r].student_id != "S005"));
    // Ranking is descending by risk: S004 is the most at-risk.
    assert_eq!(table.records()[ranked[0]].student_id, "S004");
}

#[test]
fn empty_view_is_a_valid_terminal_state() {
    let table = load_fixture();
    let mut criteria = Criteria::all_of(table.dataset());
    criteria.financial_aid = Some("unheard-of".to_string());

    let rows = filtered_indices(&table, &criteria).unwrap();
    assert!(rows.is_empty());

    let bytes = to_csv_bytes(&table, &rows);
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 1, "header only");
}
