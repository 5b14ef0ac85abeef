use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{schema, Dataset, Outcome, StudentRecord};

/// Default location of the admissions table, relative to the working
/// directory. Matches the file the upstream pipeline produces.
pub const DEFAULT_SOURCE: &str = "processed_student_data.csv";

// ---------------------------------------------------------------------------
// RecordStore – process-lifetime cache of the fixed source
// ---------------------------------------------------------------------------

/// Loads the source table once and hands out the cached copy afterwards.
///
/// The source is assumed not to change during a session; a failed load leaves
/// any previously cached dataset untouched.
pub struct RecordStore {
    path: PathBuf,
    cached: Option<Dataset>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordStore {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached table, loading it on first access.
    pub fn load(&mut self) -> Result<&Dataset, DataError> {
        if self.cached.is_none() {
            self.cached = Some(load_file(&self.path)?);
        }
        Ok(self.cached.as_ref().unwrap())
    }

    /// Drop the cache and re-read the source. On failure the previous
    /// dataset is kept and the error returned.
    pub fn reload(&mut self) -> Result<&Dataset, DataError> {
        let fresh = load_file(&self.path)?;
        self.cached = Some(fresh);
        Ok(self.cached.as_ref().unwrap())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an admissions table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names (primary format)
/// * `.json`    – records-oriented array of objects
/// * `.parquet` – flat scalar columns, one row per student
pub fn load_file(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string())),
    }
}

/// A numeric cell: empty, non-numeric or literal-NaN text stays undefined,
/// never zero. NaN would otherwise count as a defined value and leak into
/// means and rankings.
fn parse_score(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the exact source column names; one student
/// per row. `current_employment_status` may be absent from the header.
fn load_csv(path: &Path) -> Result<Dataset, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let col = |name: &str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                name: name.to_string(),
            })
    };

    let id_idx = col(schema::STUDENT_ID)?;
    let iq_idx = col(schema::IQ_SCORE)?;
    let english_idx = col(schema::ENGLISH_SCORE)?;
    let technical_idx = col(schema::TECHNICAL_SCORE)?;
    let soft_idx = col(schema::SOFT_SKILLS_SCORE)?;
    let gpa_idx = col(schema::GPA)?;
    let result_idx = col(schema::RESULT)?;
    let aid_idx = col(schema::FINANCIAL_AID)?;
    let level_idx = col(schema::ENGLISH_LEVEL)?;
    let employment_idx = headers.iter().position(|h| h == schema::EMPLOYMENT);

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let student_id = cell(id_idx).to_string();
        if student_id.is_empty() {
            return Err(DataError::MalformedRow {
                row: row_no,
                reason: "empty student_id".to_string(),
            });
        }

        records.push(StudentRecord {
            student_id,
            iq_score: parse_score(cell(iq_idx)),
            english_score: parse_score(cell(english_idx)),
            technical_score: parse_score(cell(technical_idx)),
            soft_skills_score: parse_score(cell(soft_idx)),
            gpa: parse_score(cell(gpa_idx)),
            outcome: Outcome::from_label(cell(result_idx)),
            financial_aid: cell(aid_idx).to_string(),
            english_level: cell(level_idx).to_string(),
            employment_status: employment_idx.map(|i| cell(i).to_string()),
        });
    }

    Ok(Dataset::from_records(records, employment_idx.is_some()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "student_id": "S0001",
///     "IQ_test_score": 104.0,
///     "English_test_score": 71.5,
///     "technical_test_score": 63.0,
///     "Soft_skills_Score": 58.0,
///     "gpa": 3.1,
///     "Result": "Accepted",
///     "financial_aid": "partial",
///     "english_level": "intermediate",
///     "current_employment_status": "unemployed"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, DataError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| DataError::MalformedRow {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    // The column contract is checked against the first record; the optional
    // employment column counts as present if any record carries it.
    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        for name in schema::REQUIRED {
            if !first.contains_key(name) {
                return Err(DataError::MissingColumn {
                    name: name.to_string(),
                });
            }
        }
    }
    let has_employment = rows
        .iter()
        .filter_map(|r| r.as_object())
        .any(|o| o.contains_key(schema::EMPLOYMENT));

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| DataError::MalformedRow {
            row: i,
            reason: "not a JSON object".to_string(),
        })?;

        let student_id = match obj.get(schema::STUDENT_ID) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => {
                return Err(DataError::MalformedRow {
                    row: i,
                    reason: format!("missing or invalid '{}'", schema::STUDENT_ID),
                })
            }
        };

        let number = |name: &str| obj.get(name).and_then(JsonValue::as_f64);
        let string = |name: &str| {
            obj.get(name)
                .and_then(JsonValue::as_str)
                .unwrap_or("")
                .to_string()
        };

        records.push(StudentRecord {
            student_id,
            iq_score: number(schema::IQ_SCORE),
            english_score: number(schema::ENGLISH_SCORE),
            technical_score: number(schema::TECHNICAL_SCORE),
            soft_skills_score: number(schema::SOFT_SKILLS_SCORE),
            gpa: number(schema::GPA),
            outcome: Outcome::from_label(&string(schema::RESULT)),
            financial_aid: string(schema::FINANCIAL_AID),
            english_level: string(schema::ENGLISH_LEVEL),
            employment_status: if has_employment {
                Some(string(schema::EMPLOYMENT))
            } else {
                None
            },
        });
    }

    Ok(Dataset::from_records(records, has_employment))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat scalar column per schema field.
///
/// Numeric columns may be Float64, Float32, Int64 or Int32; string columns
/// Utf8 or LargeUtf8. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, DataError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut has_employment = false;

    for batch_result in reader {
        let batch = batch_result?;
        let schema_ref = batch.schema();

        let col = |name: &str| -> Result<usize, DataError> {
            schema_ref
                .index_of(name)
                .map_err(|_| DataError::MissingColumn {
                    name: name.to_string(),
                })
        };

        let id_col = batch.column(col(schema::STUDENT_ID)?);
        let iq_col = batch.column(col(schema::IQ_SCORE)?);
        let english_col = batch.column(col(schema::ENGLISH_SCORE)?);
        let technical_col = batch.column(col(schema::TECHNICAL_SCORE)?);
        let soft_col = batch.column(col(schema::SOFT_SKILLS_SCORE)?);
        let gpa_col = batch.column(col(schema::GPA)?);
        let result_col = batch.column(col(schema::RESULT)?);
        let aid_col = batch.column(col(schema::FINANCIAL_AID)?);
        let level_col = batch.column(col(schema::ENGLISH_LEVEL)?);
        let employment_col = schema_ref
            .index_of(schema::EMPLOYMENT)
            .ok()
            .map(|i| batch.column(i));
        has_employment |= employment_col.is_some();

        for row in 0..batch.num_rows() {
            let student_id =
                scalar_string(id_col, row).ok_or_else(|| DataError::MalformedRow {
                    row,
                    reason: format!("missing or invalid '{}'", schema::STUDENT_ID),
                })?;

            records.push(StudentRecord {
                student_id,
                iq_score: scalar_f64(iq_col, row),
                english_score: scalar_f64(english_col, row),
                technical_score: scalar_f64(technical_col, row),
                soft_skills_score: scalar_f64(soft_col, row),
                gpa: scalar_f64(gpa_col, row),
                outcome: Outcome::from_label(
                    &scalar_string(result_col, row).unwrap_or_default(),
                ),
                financial_aid: scalar_string(aid_col, row).unwrap_or_default(),
                english_level: scalar_string(level_col, row).unwrap_or_default(),
                employment_status: employment_col.and_then(|c| scalar_string(c, row)),
            });
        }
    }

    Ok(Dataset::from_records(records, has_employment))
}

// -- Parquet / Arrow helpers --

/// Extract a scalar float from an Arrow column; nulls, NaN values and
/// non-numeric types stay undefined.
fn scalar_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        _ => None,
    };
    value.filter(|v| !v.is_nan())
}

/// Extract a scalar string from an Arrow column; integer ids are kept in
/// their textual form.
fn scalar_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            Some(s.value(row).to_string())
        }
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    }
}
