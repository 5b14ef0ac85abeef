use super::model::{Dataset, MetricColumn, StudentRecord};

// ---------------------------------------------------------------------------
// Risk weights – fixed constants of the design, not configurable
// ---------------------------------------------------------------------------

/// Deficit weights for `risk_score`, in the order
/// (technical, soft skills, english, IQ). They sum to exactly 1.0.
pub const RISK_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

// ---------------------------------------------------------------------------
// Table – dataset plus derived metric columns
// ---------------------------------------------------------------------------

/// The loaded dataset with `total_score` and `risk_score` attached.
///
/// Derivation happens once per load; the table is immutable afterwards and is
/// passed explicitly through the call chain (no global cache). A row with any
/// undefined raw score gets undefined derived metrics, never zero.
#[derive(Debug, Clone)]
pub struct Table {
    dataset: Dataset,
    total_score: Vec<Option<f64>>,
    risk_score: Vec<Option<f64>>,
}

impl Table {
    /// Compute the derived columns row-wise over a freshly loaded dataset.
    pub fn derive(dataset: Dataset) -> Self {
        let total_score = dataset.records.iter().map(total_score).collect();
        let risk_score = dataset.records.iter().map(risk_score).collect();
        Table {
            dataset,
            total_score,
            risk_score,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.dataset.records
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Identity token of the underlying load; derived values are keyed on it.
    pub fn version(&self) -> u64 {
        self.dataset.version()
    }

    /// The value of a metric column for one row; `None` when undefined.
    pub fn value(&self, row: usize, col: MetricColumn) -> Option<f64> {
        let rec = &self.dataset.records[row];
        match col {
            MetricColumn::IqScore => rec.iq_score,
            MetricColumn::EnglishScore => rec.english_score,
            MetricColumn::TechnicalScore => rec.technical_score,
            MetricColumn::SoftSkillsScore => rec.soft_skills_score,
            MetricColumn::Gpa => rec.gpa,
            MetricColumn::TotalScore => self.total_score[row],
            MetricColumn::RiskScore => self.risk_score[row],
        }
    }
}

/// Unweighted mean of the four raw scores; undefined if any is undefined.
fn total_score(rec: &StudentRecord) -> Option<f64> {
    let (iq, english, technical, soft) = raw_scores(rec)?;
    Some((iq + english + technical + soft) / 4.0)
}

/// Weighted deficit score: higher = more at-risk. Undefined if any raw
/// score is undefined.
fn risk_score(rec: &StudentRecord) -> Option<f64> {
    let (iq, english, technical, soft) = raw_scores(rec)?;
    let [w_technical, w_soft, w_english, w_iq] = RISK_WEIGHTS;
    Some(
        (100.0 - technical) * w_technical
            + (100.0 - soft) * w_soft
            + (100.0 - english) * w_english
            + (100.0 - iq) * w_iq,
    )
}

fn raw_scores(rec: &StudentRecord) -> Option<(f64, f64, f64, f64)> {
    Some((
        rec.iq_score?,
        rec.english_score?,
        rec.technical_score?,
        rec.soft_skills_score?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Outcome;
    use approx::assert_abs_diff_eq;

    fn record(scores: [Option<f64>; 4]) -> StudentRecord {
        StudentRecord {
            student_id: "s".to_string(),
            iq_score: scores[0],
            english_score: scores[1],
            technical_score: scores[2],
            soft_skills_score: scores[3],
            gpa: Some(3.0),
            outcome: Outcome::Accepted,
            financial_aid: "none".to_string(),
            english_level: "advanced".to_string(),
            employment_status: None,
        }
    }

    fn table(rows: Vec<StudentRecord>) -> Table {
        Table::derive(Dataset::from_records(rows, false))
    }

    #[test]
    fn weights_sum_to_one() {
        assert_abs_diff_eq!(RISK_WEIGHTS.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn uniform_eighty_scores() {
        let t = table(vec![record([Some(80.0); 4])]);
        assert_abs_diff_eq!(t.value(0, MetricColumn::TotalScore).unwrap(), 80.0);
        assert_abs_diff_eq!(t.value(0, MetricColumn::RiskScore).unwrap(), 20.0);
    }

    #[test]
    fn total_score_is_the_mean_of_the_raw_scores() {
        let t = table(vec![record([
            Some(100.0),
            Some(70.0),
            Some(60.0),
            Some(50.0),
        ])]);
        assert_abs_diff_eq!(t.value(0, MetricColumn::TotalScore).unwrap(), 70.0);
        // 0.4*40 + 0.3*50 + 0.2*30 + 0.1*0 = 37
        assert_abs_diff_eq!(t.value(0, MetricColumn::RiskScore).unwrap(), 37.0);
    }

    #[test]
    fn any_missing_raw_score_leaves_metrics_undefined() {
        for missing in 0..4 {
            let mut scores = [Some(80.0); 4];
            scores[missing] = None;
            let t = table(vec![record(scores)]);
            assert_eq!(t.value(0, MetricColumn::TotalScore), None);
            assert_eq!(t.value(0, MetricColumn::RiskScore), None);
        }
    }

    #[test]
    fn risk_score_stays_in_range_for_in_range_inputs() {
        for scores in [[0.0; 4], [100.0; 4], [25.0, 50.0, 75.0, 100.0]] {
            let t = table(vec![record(scores.map(Some))]);
            let risk = t.value(0, MetricColumn::RiskScore).unwrap();
            assert!((0.0..=100.0).contains(&risk), "risk {risk} out of range");
        }
    }

    #[test]
    fn derivation_is_deterministic_per_dataset() {
        let rows = vec![record([Some(80.0); 4]), record([Some(40.0); 4])];
        let ds = Dataset::from_records(rows, false);
        let a = Table::derive(ds.clone());
        let b = Table::derive(ds);
        for row in 0..a.len() {
            assert_eq!(
                a.value(row, MetricColumn::RiskScore),
                b.value(row, MetricColumn::RiskScore)
            );
        }
    }
}
