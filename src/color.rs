use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Dataset, Outcome};

// ---------------------------------------------------------------------------
// Outcome colors – fixed mapping for the known categories
// ---------------------------------------------------------------------------

/// Color of an admission outcome. The three known categories keep their
/// fixed colors; unexpected categories fall back to gray (use
/// [`OutcomeColors`] to give them distinct colors per dataset).
pub fn outcome_color(outcome: &Outcome) -> Color32 {
    match outcome {
        Outcome::Accepted => Color32::from_rgb(0x2e, 0xcc, 0x71),
        Outcome::Pending => Color32::from_rgb(0xf3, 0x9c, 0x12),
        Outcome::DropOut => Color32::from_rgb(0xe7, 0x4c, 0x3c),
        Outcome::Other(_) => Color32::GRAY,
    }
}

/// Maps every outcome of a dataset to a color: the fixed colors for the
/// known categories, evenly spaced hues for any unexpected ones.
#[derive(Debug, Clone)]
pub struct OutcomeColors {
    mapping: BTreeMap<Outcome, Color32>,
}

impl OutcomeColors {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let n_other = dataset
            .outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Other(_)))
            .count();
        let mut extra = generate_palette(n_other).into_iter();

        let mapping = dataset
            .outcomes
            .iter()
            .map(|outcome| {
                let color = match outcome {
                    Outcome::Other(_) => extra.next().unwrap_or(Color32::GRAY),
                    known => outcome_color(known),
                };
                (outcome.clone(), color)
            })
            .collect();
        OutcomeColors { mapping }
    }

    /// Look up the color for an outcome; gray for one the dataset never saw.
    pub fn get(&self, outcome: &Outcome) -> Color32 {
        self.mapping.get(outcome).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Category palette – evenly spaced hues for arbitrary value sets
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colors using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale – red/white/blue for the correlation heatmap
// ---------------------------------------------------------------------------

/// Map a correlation in `[-1, 1]` onto a red–white–blue diverging scale.
/// NaN (undefined correlation) renders as dark gray.
pub fn diverging_color(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let t = value.clamp(-1.0, 1.0);
    let lerp = |a: f64, b: f64, t: f64| (a + (b - a) * t) as u8;
    if t < 0.0 {
        // red (#e74c3c) → white
        let t = t + 1.0;
        Color32::from_rgb(
            lerp(0xe7 as f64, 255.0, t),
            lerp(0x4c as f64, 255.0, t),
            lerp(0x3c as f64, 255.0, t),
        )
    } else {
        // white → blue (#3498db)
        Color32::from_rgb(
            lerp(255.0, 0x34 as f64, t),
            lerp(255.0, 0x98 as f64, t),
            lerp(255.0, 0xdb as f64, t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::StudentRecord;

    #[test]
    fn known_outcomes_have_fixed_colors() {
        assert_eq!(
            outcome_color(&Outcome::Accepted),
            Color32::from_rgb(0x2e, 0xcc, 0x71)
        );
        assert_eq!(
            outcome_color(&Outcome::Other("waitlisted".to_string())),
            Color32::GRAY
        );
    }

    #[test]
    fn unexpected_outcomes_get_distinct_palette_colors() {
        let record = |outcome: &str| StudentRecord {
            student_id: "s".to_string(),
            iq_score: Some(80.0),
            english_score: Some(80.0),
            technical_score: Some(80.0),
            soft_skills_score: Some(80.0),
            gpa: Some(3.0),
            outcome: Outcome::from_label(outcome),
            financial_aid: "none".to_string(),
            english_level: "advanced".to_string(),
            employment_status: None,
        };
        let ds = Dataset::from_records(
            vec![
                record("Accepted"),
                record("waitlisted"),
                record("deferred"),
            ],
            false,
        );
        let colors = OutcomeColors::for_dataset(&ds);

        assert_eq!(
            colors.get(&Outcome::Accepted),
            Color32::from_rgb(0x2e, 0xcc, 0x71)
        );
        let waitlisted = colors.get(&Outcome::Other("waitlisted".to_string()));
        let deferred = colors.get(&Outcome::Other("deferred".to_string()));
        assert_ne!(waitlisted, Color32::GRAY);
        assert_ne!(deferred, Color32::GRAY);
        assert_ne!(waitlisted, deferred);
        // An outcome the dataset never saw still gets the gray fallback.
        assert_eq!(
            colors.get(&Outcome::Other("unknown".to_string())),
            Color32::GRAY
        );
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(7).len(), 7);
    }

    #[test]
    fn diverging_scale_endpoints() {
        assert_eq!(diverging_color(1.0), Color32::from_rgb(0x34, 0x98, 0xdb));
        assert_eq!(diverging_color(-1.0), Color32::from_rgb(0xe7, 0x4c, 0x3c));
        assert_eq!(diverging_color(0.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(diverging_color(f64::NAN), Color32::DARK_GRAY);
    }
}
