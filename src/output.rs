//! Persistence for analysis results.
//!
//! Everything is written as CSV except the JSON run summary and the markdown
//! contact report.

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{GradeBucket, OverallSummary, PassSummary};
use crate::records::{EnrichedRecord, MatchedCourseRecord};
use crate::table::Table;

/// Columns shown for each student in the markdown report.
const REPORT_CONTACT_COLUMNS: &[&str] = &["Name", "Email", "Student Mobile", "Parent Mobile"];

fn create_writer(path: &Path) -> Result<Writer<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    debug!(path = %path.display(), "Writing CSV");
    Writer::from_path(path).with_context(|| format!("Failed to create file: {}", path.display()))
}

/// Writes `rows` under `headers` to a CSV file, replacing any existing file.
pub fn write_rows<I, R, F>(path: &Path, headers: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = create_writer(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a table with its own headers.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    write_rows(path, &headers, &table.rows)
}

/// Writes a single-column CSV.
pub fn write_column(path: &Path, header: &str, values: &[String]) -> Result<()> {
    write_rows(path, &[header], values.iter().map(|v| [v]))
}

pub fn write_matched_records(path: &Path, records: &[MatchedCourseRecord]) -> Result<()> {
    let mut writer = create_writer(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    if records.is_empty() {
        writer.write_record(["roll_no", "course_code", "grade"])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes per-course or per-student summaries under the given headers
/// (key, total, passed, percentage).
pub fn write_summaries(path: &Path, headers: [&str; 4], summaries: &[PassSummary]) -> Result<()> {
    write_rows(
        path,
        &headers,
        summaries.iter().map(|s| {
            [
                s.key().to_string(),
                s.total().to_string(),
                s.passed().to_string(),
                format_percentage(s.pass_percentage()),
            ]
        }),
    )
}

/// Percentage cell text; whole numbers keep a trailing `.0`.
fn format_percentage(value: f64) -> String {
    format!("{value:?}")
}

pub fn write_overall_summary(path: &Path, overall: &OverallSummary) -> Result<()> {
    let rows = [
        ["Total Courses".to_string(), overall.total().to_string()],
        ["Passed Courses".to_string(), overall.passed().to_string()],
        ["Failed Courses".to_string(), overall.failed().to_string()],
        [
            "Pass Percentage".to_string(),
            format!("{:.2}%", overall.pass_percentage()),
        ],
    ];
    write_rows(path, &["metric", "value"], rows)
}

/// Serializes `value` as pretty JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

/// Header row for enriched records: matched fields then detail columns.
pub fn enriched_headers(detail_columns: &[String]) -> Vec<&str> {
    let mut headers = vec!["roll_no", "course_code", "grade"];
    headers.extend(detail_columns.iter().map(String::as_str));
    headers
}

pub fn write_enriched(path: &Path, headers: &[&str], records: &[EnrichedRecord]) -> Result<()> {
    write_rows(path, headers, records.iter().map(EnrichedRecord::to_row))
}

/// File name for a grade bucket, with path separators made safe.
pub fn bucket_file_name(grade: &str) -> String {
    let safe: String = grade
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}_grade_students.csv")
}

/// Writes one CSV per grade bucket into `dir` and returns the paths written.
pub fn write_buckets(
    dir: &Path,
    headers: &[&str],
    buckets: &[GradeBucket],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let path = dir.join(bucket_file_name(&bucket.grade));
        write_enriched(&path, headers, &bucket.records)?;
        written.push(path);
    }
    info!(buckets = written.len(), dir = %dir.display(), "Wrote grade bucket files");
    Ok(written)
}

/// Renders the markdown contact report, one section per bucket.
pub fn render_grade_report(buckets: &[GradeBucket]) -> String {
    let mut lines = vec!["# Grade Report for Feedback Contact\n".to_string()];
    for bucket in buckets {
        lines.push(format!("\n## Grade: {}\n", bucket.grade));
        for record in &bucket.records {
            let mut fields = vec![record.roll_no()];
            fields.extend(REPORT_CONTACT_COLUMNS.iter().map(|c| record.detail(c)));
            lines.push(format!("- {}", fields.join(" | ")));
        }
    }
    lines.join("\n")
}

pub fn write_grade_report(path: &Path, buckets: &[GradeBucket]) -> Result<()> {
    fs::write(path, render_grade_report(buckets))
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}
