use super::derive::Table;
use super::model::{schema, MetricColumn};

/// Serialize a filtered view as UTF-8 CSV with a header row.
///
/// Columns follow the table's order: raw columns in schema order (the
/// optional employment column only when the source carried it), then the two
/// derived columns. Undefined values serialize as empty fields.
pub fn to_csv_bytes(table: &Table, rows: &[usize]) -> Vec<u8> {
    let has_employment = table.dataset().has_employment;

    let mut header: Vec<&str> = vec![
        schema::STUDENT_ID,
        schema::IQ_SCORE,
        schema::ENGLISH_SCORE,
        schema::TECHNICAL_SCORE,
        schema::SOFT_SKILLS_SCORE,
        schema::GPA,
        schema::RESULT,
        schema::FINANCIAL_AID,
        schema::ENGLISH_LEVEL,
    ];
    if has_employment {
        header.push(schema::EMPLOYMENT);
    }
    header.push(MetricColumn::TotalScore.header());
    header.push(MetricColumn::RiskScore.header());

    let mut writer = csv::Writer::from_writer(Vec::new());
    // Writing into a Vec cannot fail.
    writer.write_record(&header).expect("in-memory write");

    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    for &i in rows {
        let rec = &table.records()[i];
        let mut row: Vec<String> = vec![
            rec.student_id.clone(),
            cell(rec.iq_score),
            cell(rec.english_score),
            cell(rec.technical_score),
            cell(rec.soft_skills_score),
            cell(rec.gpa),
            rec.outcome.label().to_string(),
            rec.financial_aid.clone(),
            rec.english_level.clone(),
        ];
        if has_employment {
            row.push(rec.employment_status.clone().unwrap_or_default());
        }
        row.push(cell(table.value(i, MetricColumn::TotalScore)));
        row.push(cell(table.value(i, MetricColumn::RiskScore)));
        writer.write_record(&row).expect("in-memory write");
    }

    writer.into_inner().expect("in-memory flush")
}
