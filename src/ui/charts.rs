use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};
use egui_extras::{Column, TableBuilder};

use crate::color::{diverging_color, OutcomeColors};
use crate::data::aggregate::{
    correlation_matrix, group_means, outcome_counts, outcome_rate, top_n,
};
use crate::data::derive::Table;
use crate::data::model::{GroupKey, MetricColumn, Outcome};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Tab dispatch (central panel)
// ---------------------------------------------------------------------------

/// Render the active tab over the current filtered view.
pub fn show_tab(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to begin  (File → Open…)");
        });
        return;
    };
    let rows = &state.visible_rows;

    match state.tab {
        Tab::Overview => overview_tab(ui, table, rows),
        Tab::Performance => performance_tab(ui, table, rows),
        Tab::Demographics => demographics_tab(ui, table, rows),
        Tab::Risk => risk_tab(ui, table, rows),
        Tab::Insights => insights_tab(ui, table, rows),
    }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn overview_tab(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.heading("Student Performance Overview");

    ui.columns(2, |cols: &mut [Ui]| {
        outcome_distribution(&mut cols[0], table, rows);
        gpa_box_plot(&mut cols[0], table, rows);
        score_histogram(
            &mut cols[1],
            table,
            rows,
            MetricColumn::TotalScore,
            "Total Score Distribution",
        );
        category_outcome_bars(
            &mut cols[1],
            table,
            rows,
            GroupKey::FinancialAid,
            &table.dataset().financial_aid_values,
            "Outcomes by Financial Aid Status",
        );
    });
}

/// Per-outcome counts with percentage labels. Carries the same information
/// as a pie chart, as grouped bars.
fn outcome_distribution(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.strong("Outcome Distribution");
    let colors = OutcomeColors::for_dataset(table.dataset());
    let counts = outcome_counts(table, rows);
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let charts: Vec<BarChart> = counts
        .iter()
        .enumerate()
        .map(|(i, (outcome, count))| {
            let pct = if total > 0 {
                *count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let bar = Bar::new(i as f64, *count as f64)
                .width(0.7)
                .name(format!("{outcome} ({pct:.1}%)"));
            BarChart::new(vec![bar])
                .color(colors.get(outcome))
                .name(format!("{outcome} ({pct:.1}%)"))
        })
        .collect();

    Plot::new("outcome_distribution")
        .legend(Legend::default())
        .height(200.0)
        .show_x(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn gpa_box_plot(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.strong("GPA Distribution by Outcome");

    let colors = OutcomeColors::for_dataset(table.dataset());
    let mut elems = Vec::new();
    for (i, outcome) in table.dataset().outcomes.iter().enumerate() {
        let mut gpas: Vec<f64> = rows
            .iter()
            .filter(|&&r| table.records()[r].outcome == *outcome)
            .filter_map(|&r| table.records()[r].gpa)
            .collect();
        if gpas.is_empty() {
            continue;
        }
        gpas.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let spread = BoxSpread::new(
            gpas[0],
            percentile(&gpas, 0.25),
            percentile(&gpas, 0.5),
            percentile(&gpas, 0.75),
            gpas[gpas.len() - 1],
        );
        elems.push(
            BoxElem::new(i as f64, spread)
                .fill(colors.get(outcome))
                .name(outcome.label()),
        );
    }

    Plot::new("gpa_box_plot")
        .legend(Legend::default())
        .height(200.0)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems));
        });
}

/// Histogram of a metric column, stacked by outcome.
fn score_histogram(ui: &mut Ui, table: &Table, rows: &[usize], col: MetricColumn, title: &str) {
    ui.strong(title);

    let defined: Vec<f64> = rows.iter().filter_map(|&r| table.value(r, col)).collect();
    if defined.is_empty() {
        empty_plot(ui, title);
        return;
    }

    let min = defined.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = defined.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let bins = 20usize;
    let width = ((max - min) / bins as f64).max(f64::EPSILON);

    // Stack one bar chart per outcome on a shared base offset per bin.
    let colors = OutcomeColors::for_dataset(table.dataset());
    let mut base = vec![0.0f64; bins];
    let mut charts = Vec::new();
    for outcome in &table.dataset().outcomes {
        let mut counts = vec![0usize; bins];
        for &r in rows {
            if table.records()[r].outcome != *outcome {
                continue;
            }
            if let Some(v) = table.value(r, col) {
                let bin = (((v - min) / width) as usize).min(bins - 1);
                counts[bin] += 1;
            }
        }
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(bin, &c)| {
                let x = min + (bin as f64 + 0.5) * width;
                Bar::new(x, c as f64)
                    .width(width)
                    .base_offset(base[bin])
                    .name(outcome.label())
            })
            .collect();
        for (bin, &c) in counts.iter().enumerate() {
            base[bin] += c as f64;
        }
        if !bars.is_empty() {
            charts.push(
                BarChart::new(bars)
                    .color(colors.get(outcome))
                    .name(outcome.label()),
            );
        }
    }

    Plot::new(title)
        .legend(Legend::default())
        .height(200.0)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Grouped bars: per-category row counts split by outcome.
fn category_outcome_bars(
    ui: &mut Ui,
    table: &Table,
    rows: &[usize],
    key: GroupKey,
    categories: &[String],
    title: &str,
) {
    ui.strong(title);

    let outcomes = table.dataset().outcomes.clone();
    let colors = OutcomeColors::for_dataset(table.dataset());
    let cat_labels: Vec<String> = categories.to_vec();
    let group_width = 0.8;
    let bar_width = group_width / outcomes.len().max(1) as f64;

    let mut charts = Vec::new();
    for (oi, outcome) in outcomes.iter().enumerate() {
        let bars: Vec<Bar> = categories
            .iter()
            .enumerate()
            .map(|(ci, category)| {
                let count = rows
                    .iter()
                    .filter(|&&r| {
                        let rec = &table.records()[r];
                        rec.outcome == *outcome
                            && key.label(rec) == Some(category.as_str())
                    })
                    .count();
                let x = ci as f64 - group_width / 2.0 + (oi as f64 + 0.5) * bar_width;
                Bar::new(x, count as f64)
                    .width(bar_width)
                    .name(format!("{category} / {outcome}"))
            })
            .collect();
        charts.push(
            BarChart::new(bars)
                .color(colors.get(outcome))
                .name(outcome.label()),
        );
    }

    Plot::new(title)
        .legend(Legend::default())
        .height(200.0)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as usize;
            if (mark.value - i as f64).abs() < 1e-6 {
                cat_labels.get(i).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Performance Analytics
// ---------------------------------------------------------------------------

fn performance_tab(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.heading("Detailed Performance Analysis");

    mean_scores_by_outcome(ui, table, rows);
    ui.separator();
    ui.strong("Score Correlations");
    correlation_heatmap(ui, table, rows);
}

/// Grouped bars of average test scores, one group per test, one bar per
/// outcome.
fn mean_scores_by_outcome(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.strong("Average Test Scores by Outcome");

    let order: Vec<String> = table
        .dataset()
        .outcomes
        .iter()
        .map(|o| o.label().to_string())
        .collect();
    let means = group_means(table, rows, GroupKey::Outcome, &MetricColumn::SCORES, &order);

    let colors = OutcomeColors::for_dataset(table.dataset());
    let group_width = 0.8;
    let bar_width = group_width / means.len().max(1) as f64;

    let mut charts = Vec::new();
    for (oi, (label, col_means)) in means.iter().enumerate() {
        let outcome = Outcome::from_label(label);
        let bars: Vec<Bar> = col_means
            .iter()
            .enumerate()
            .filter_map(|(ci, mean)| mean.map(|m| (ci, m)))
            .map(|(ci, mean)| {
                let x = ci as f64 - group_width / 2.0 + (oi as f64 + 0.5) * bar_width;
                Bar::new(x, mean).width(bar_width).name(label)
            })
            .collect();
        charts.push(
            BarChart::new(bars)
                .color(colors.get(&outcome))
                .name(label),
        );
    }

    let score_names: Vec<String> = MetricColumn::SCORES
        .iter()
        .map(|c| c.header().to_string())
        .collect();

    Plot::new("mean_scores")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as usize;
            if (mark.value - i as f64).abs() < 1e-6 {
                score_names.get(i).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Pearson correlations over the four scores plus GPA, rendered as a grid
/// with a red–white–blue diverging background.
fn correlation_heatmap(ui: &mut Ui, table: &Table, rows: &[usize]) {
    let cols = [
        MetricColumn::IqScore,
        MetricColumn::EnglishScore,
        MetricColumn::TechnicalScore,
        MetricColumn::SoftSkillsScore,
        MetricColumn::Gpa,
    ];
    let matrix = correlation_matrix(table, rows, &cols);
    let n = cols.len();

    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &cols {
                ui.label(RichText::new(col.header()).small().strong());
            }
            ui.end_row();

            for i in 0..n {
                ui.label(RichText::new(cols[i].header()).small().strong());
                for j in 0..n {
                    let r = matrix[i * n + j];
                    let text = if r.is_nan() {
                        "–".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    ui.label(
                        RichText::new(text)
                            .monospace()
                            .background_color(diverging_color(r))
                            .color(egui::Color32::BLACK),
                    );
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Student Demographics
// ---------------------------------------------------------------------------

fn demographics_tab(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.heading("Student Demographic Analysis");

    category_outcome_bars(
        ui,
        table,
        rows,
        GroupKey::EnglishLevel,
        &table.dataset().english_level_values,
        "Outcomes by English Level",
    );

    // Only when the optional column came with the source.
    if table.dataset().has_employment {
        ui.separator();
        category_outcome_bars(
            ui,
            table,
            rows,
            GroupKey::EmploymentStatus,
            &table.dataset().employment_values,
            "Outcomes by Employment Status",
        );
    }
}

// ---------------------------------------------------------------------------
// Risk Analysis
// ---------------------------------------------------------------------------

fn risk_tab(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.heading("Student Risk Analysis");

    score_histogram(
        ui,
        table,
        rows,
        MetricColumn::RiskScore,
        "Risk Score Distribution",
    );

    ui.separator();
    ui.strong("Top 10 High-Risk Students");
    let colors = OutcomeColors::for_dataset(table.dataset());
    let ranked = top_n(table, rows, 10, MetricColumn::RiskScore, true);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["student_id", "gpa", "risk_score", "Result"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for &r in &ranked {
                let rec = &table.records()[r];
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&rec.student_id);
                    });
                    row.col(|ui| {
                        ui.label(
                            rec.gpa
                                .map(|g| format!("{g:.2}"))
                                .unwrap_or_else(|| "–".to_string()),
                        );
                    });
                    row.col(|ui| {
                        ui.label(
                            table
                                .value(r, MetricColumn::RiskScore)
                                .map(|v| format!("{v:.1}"))
                                .unwrap_or_else(|| "–".to_string()),
                        );
                    });
                    row.col(|ui| {
                        ui.label(
                            RichText::new(rec.outcome.label())
                                .color(colors.get(&rec.outcome)),
                        );
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Key Insights
// ---------------------------------------------------------------------------

fn insights_tab(ui: &mut Ui, table: &Table, rows: &[usize]) {
    ui.heading("Key Insights");

    // Whole-dataset rates, independent of the current filter selection.
    let all_rows: Vec<usize> = (0..table.len()).collect();
    let acceptance = outcome_rate(table, &all_rows, &Outcome::Accepted);
    let dropout = outcome_rate(table, &all_rows, &Outcome::DropOut);

    egui::CollapsingHeader::new("Executive Summary")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "Overall Acceptance Rate: {}",
                rate_text(acceptance)
            ));
            ui.label(format!("Dropout Rate: {}", rate_text(dropout)));
        });

    ui.separator();
    ui.strong("Technical vs English Scores by Outcome");
    technical_english_scatter(ui, table, rows);
}

fn rate_text(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "–".to_string())
}

fn technical_english_scatter(ui: &mut Ui, table: &Table, rows: &[usize]) {
    let outcomes = table.dataset().outcomes.clone();
    let colors = OutcomeColors::for_dataset(table.dataset());

    Plot::new("technical_english_scatter")
        .legend(Legend::default())
        .x_axis_label("technical_test_score")
        .y_axis_label("English_test_score")
        .height(300.0)
        .show(ui, |plot_ui| {
            for outcome in &outcomes {
                let points: PlotPoints = rows
                    .iter()
                    .filter(|&&r| table.records()[r].outcome == *outcome)
                    .filter_map(|&r| {
                        let rec = &table.records()[r];
                        Some([rec.technical_score?, rec.english_score?])
                    })
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .color(colors.get(outcome))
                        .radius(3.0)
                        .name(outcome.label()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn empty_plot(ui: &mut Ui, id: &str) {
    Plot::new(id).height(200.0).show(ui, |_| {});
}

/// Linear-interpolated percentile over a sorted non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_points() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 0.5), 2.5);
        assert_eq!(percentile(&values, 1.0), 4.0);
    }
}
