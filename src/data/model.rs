use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Schema – exact column names of the source contract
// ---------------------------------------------------------------------------

/// Column names as they appear in the source table. These spellings are the
/// contract with whatever pipeline produced the file.
pub mod schema {
    pub const STUDENT_ID: &str = "student_id";
    pub const IQ_SCORE: &str = "IQ_test_score";
    pub const ENGLISH_SCORE: &str = "English_test_score";
    pub const TECHNICAL_SCORE: &str = "technical_test_score";
    pub const SOFT_SKILLS_SCORE: &str = "Soft_skills_Score";
    pub const GPA: &str = "gpa";
    pub const RESULT: &str = "Result";
    pub const FINANCIAL_AID: &str = "financial_aid";
    pub const ENGLISH_LEVEL: &str = "english_level";
    /// Optional column; a source without it is still valid.
    pub const EMPLOYMENT: &str = "current_employment_status";

    /// Columns every source must provide.
    pub const REQUIRED: [&str; 9] = [
        STUDENT_ID,
        IQ_SCORE,
        ENGLISH_SCORE,
        TECHNICAL_SCORE,
        SOFT_SKILLS_SCORE,
        GPA,
        RESULT,
        FINANCIAL_AID,
        ENGLISH_LEVEL,
    ];
}

// ---------------------------------------------------------------------------
// Outcome – the admission result category
// ---------------------------------------------------------------------------

/// Admission outcome of a student (the `Result` column).
///
/// The three known categories carry a fixed display order and color.
/// Any other label found in the source is tolerated as [`Outcome::Other`]
/// and sorts after the known three.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Accepted,
    Pending,
    DropOut,
    /// Unexpected category, kept verbatim from the source.
    Other(String),
}

impl Outcome {
    /// Fixed display order for the known categories.
    pub const DISPLAY_ORDER: [Outcome; 3] =
        [Outcome::Accepted, Outcome::Pending, Outcome::DropOut];

    /// Parse the exact source spelling; unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Accepted" => Outcome::Accepted,
            "pending" => Outcome::Pending,
            "drop out" => Outcome::DropOut,
            other => Outcome::Other(other.to_string()),
        }
    }

    /// The source spelling of this category.
    pub fn label(&self) -> &str {
        match self {
            Outcome::Accepted => "Accepted",
            Outcome::Pending => "pending",
            Outcome::DropOut => "drop out",
            Outcome::Other(s) => s,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Column selectors – typed handles used by filtering and aggregation
// ---------------------------------------------------------------------------

/// Numeric columns addressable by the aggregation helpers. The first five
/// live on the raw record; the last two are derived at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricColumn {
    IqScore,
    EnglishScore,
    TechnicalScore,
    SoftSkillsScore,
    Gpa,
    TotalScore,
    RiskScore,
}

impl MetricColumn {
    /// The four raw assessment scores, in schema order.
    pub const SCORES: [MetricColumn; 4] = [
        MetricColumn::IqScore,
        MetricColumn::EnglishScore,
        MetricColumn::TechnicalScore,
        MetricColumn::SoftSkillsScore,
    ];

    /// Exact source (or derived) column name.
    pub fn header(self) -> &'static str {
        match self {
            MetricColumn::IqScore => schema::IQ_SCORE,
            MetricColumn::EnglishScore => schema::ENGLISH_SCORE,
            MetricColumn::TechnicalScore => schema::TECHNICAL_SCORE,
            MetricColumn::SoftSkillsScore => schema::SOFT_SKILLS_SCORE,
            MetricColumn::Gpa => schema::GPA,
            MetricColumn::TotalScore => "total_score",
            MetricColumn::RiskScore => "risk_score",
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// Categorical columns a view can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Outcome,
    FinancialAid,
    EnglishLevel,
    EmploymentStatus,
}

impl GroupKey {
    /// The group label of a record under this key; `None` when the record
    /// carries no value for the column.
    pub fn label<'a>(self, record: &'a StudentRecord) -> Option<&'a str> {
        match self {
            GroupKey::Outcome => Some(record.outcome.label()),
            GroupKey::FinancialAid => Some(record.financial_aid.as_str()),
            GroupKey::EnglishLevel => Some(record.english_level.as_str()),
            GroupKey::EmploymentStatus => record.employment_status.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// StudentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single student admissions record (one row of the source table).
///
/// Numeric cells that are missing or non-numeric in the source are `None`;
/// they are never substituted with zero.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub student_id: String,
    /// Raw assessment scores, domain 0–100 (not validated).
    pub iq_score: Option<f64>,
    pub english_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub soft_skills_score: Option<f64>,
    /// Grade point average, nominal domain 0.0–4.0.
    pub gpa: Option<f64>,
    pub outcome: Outcome,
    pub financial_aid: String,
    pub english_level: String,
    /// Populated only when the optional employment column exists.
    pub employment_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// The full loaded record set with pre-computed category indices.
///
/// Immutable after construction; the version token identifies this load for
/// the lifetime of the process, so anything derived from the dataset can be
/// keyed on it.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records (rows), in source order.
    pub records: Vec<StudentRecord>,
    /// Whether the source carried the optional employment column.
    pub has_employment: bool,
    /// Distinct outcomes: known categories in display order, then others.
    pub outcomes: Vec<Outcome>,
    /// Sorted distinct financial-aid values.
    pub financial_aid_values: Vec<String>,
    /// Sorted distinct english-level values.
    pub english_level_values: Vec<String>,
    /// Sorted distinct employment values (empty when the column is absent).
    pub employment_values: Vec<String>,
    version: u64,
}

impl Dataset {
    /// Build the category indices from freshly loaded records.
    pub fn from_records(records: Vec<StudentRecord>, has_employment: bool) -> Self {
        let mut outcome_set: BTreeSet<Outcome> = BTreeSet::new();
        let mut financial_aid_values: BTreeSet<String> = BTreeSet::new();
        let mut english_level_values: BTreeSet<String> = BTreeSet::new();
        let mut employment_values: BTreeSet<String> = BTreeSet::new();

        for rec in &records {
            outcome_set.insert(rec.outcome.clone());
            financial_aid_values.insert(rec.financial_aid.clone());
            english_level_values.insert(rec.english_level.clone());
            if let Some(emp) = &rec.employment_status {
                employment_values.insert(emp.clone());
            }
        }

        // Known outcomes first in their fixed order, unexpected ones after.
        let mut outcomes: Vec<Outcome> = Outcome::DISPLAY_ORDER
            .iter()
            .filter(|o| outcome_set.contains(*o))
            .cloned()
            .collect();
        outcomes.extend(
            outcome_set
                .into_iter()
                .filter(|o| matches!(o, Outcome::Other(_))),
        );

        Dataset {
            records,
            has_employment,
            outcomes,
            financial_aid_values: financial_aid_values.into_iter().collect(),
            english_level_values: english_level_values.into_iter().collect(),
            employment_values: employment_values.into_iter().collect(),
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Process-unique identity token of this load.
    pub fn version(&self) -> u64 {
        self.version
    }
}
