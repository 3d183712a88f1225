//! Detail merge, grade ordering, and grade bucketing for the contact report.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::debug;

use crate::analyzers::grade::GradeScale;
use crate::analyzers::types::{GradeBucket, GradeGroups};
use crate::records::{EnrichedRecord, MatchedCourseRecord};
use crate::table::Table;

/// Detail column names attached to each enriched record: every column of the
/// detail table except its roll number key.
pub fn detail_columns(details: &Table, key_column: &str) -> Result<Vec<String>> {
    let key = details.column(key_column).context("Details table")?;
    Ok(details
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key)
        .map(|(_, h)| h.clone())
        .collect())
}

/// Joins matched records with demographic detail rows by roll number.
///
/// Records with no detail row get empty detail values. When the detail table
/// repeats a roll number the last row wins.
pub fn enrich(
    records: &[MatchedCourseRecord],
    details: &Table,
    key_column: &str,
) -> Result<Vec<EnrichedRecord>> {
    let key = details.column(key_column).context("Details table")?;
    let columns = detail_columns(details, key_column)?;

    let mut by_roll: HashMap<&str, &[String]> = HashMap::new();
    for row in &details.rows {
        by_roll.insert(Table::cell(row, key).trim(), row.as_slice());
    }

    let mut without_details = 0usize;
    let enriched = records
        .iter()
        .map(|record| {
            let row = by_roll.get(record.roll_no.as_str()).copied();
            if row.is_none() {
                without_details += 1;
            }
            let values = (0..details.headers.len())
                .filter(|i| *i != key)
                .map(|i| row.map(|r| Table::cell(r, i)).unwrap_or("").to_string());

            EnrichedRecord {
                record: record.clone(),
                details: columns.iter().cloned().zip(values).collect(),
            }
        })
        .collect();

    debug!(without_details, "Merged student details");
    Ok(enriched)
}

/// Stable sort of enriched records by grade rank, worst first.
pub fn sort_by_grade(records: &mut [EnrichedRecord], scale: &GradeScale) {
    scale.sort_by_rank(records, |r| r.grade());
}

/// Buckets records by exact grade label.
///
/// Buckets come out in rank order; labels missing from the scale follow in
/// first-encountered order. Records keep their input order inside a bucket.
pub fn group_by_grade(records: &[EnrichedRecord], scale: &GradeScale) -> Vec<GradeBucket> {
    let mut buckets: Vec<GradeBucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.grade()).or_insert_with(|| {
            buckets.push(GradeBucket {
                grade: record.grade().to_string(),
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].records.push(record.clone());
    }

    scale.sort_by_rank(&mut buckets, |b| b.grade.as_str());
    buckets
}

/// Union of the buckets for `grades`, one record per roll number.
///
/// A student keeps the position of their first appearance and the last
/// record seen for them.
pub fn high_achievers(buckets: &[GradeBucket], grades: &[String]) -> Vec<EnrichedRecord> {
    let mut students: Vec<EnrichedRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let selected = grades
        .iter()
        .filter_map(|grade| buckets.iter().find(|b| &b.grade == grade));

    for bucket in selected {
        for record in &bucket.records {
            match index.get(record.roll_no()) {
                Some(&slot) => students[slot] = record.clone(),
                None => {
                    index.insert(record.roll_no().to_string(), students.len());
                    students.push(record.clone());
                }
            }
        }
    }

    students
}

/// Groups records for the report and picks the high achievers.
pub fn group_for_report(
    records: &[EnrichedRecord],
    scale: &GradeScale,
    high_achiever_grades: &[String],
) -> GradeGroups {
    let buckets = group_by_grade(records, scale);
    let high_achievers = high_achievers(&buckets, high_achiever_grades);
    GradeGroups {
        buckets,
        high_achievers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    fn enriched(roll_no: &str, course_code: &str, grade: &str) -> EnrichedRecord {
        EnrichedRecord {
            record: MatchedCourseRecord {
                roll_no: roll_no.to_string(),
                course_code: course_code.to_string(),
                grade: grade.to_string(),
            },
            details: Vec::new(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn scale() -> GradeScale {
        AnalyzerConfig::default().grade_scale()
    }

    #[test]
    fn test_enrich_attaches_details() {
        let details = Table::new(
            strings(&["Registration no", "Name", "Email"]),
            vec![
                strings(&["R1", "Asha", "asha@example.edu"]),
                strings(&["R1", "Asha K", "asha.k@example.edu"]),
            ],
        );
        let records = vec![
            enriched("R1", "A1", "O").record,
            enriched("R2", "A1", "B").record,
        ];

        let merged = enrich(&records, &details, "Registration no").unwrap();

        assert_eq!(merged[0].detail("Name"), "Asha K");
        assert_eq!(merged[0].detail("Email"), "asha.k@example.edu");
        assert_eq!(
            merged[1].details,
            vec![
                ("Name".to_string(), String::new()),
                ("Email".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_enrich_missing_key_column_is_error() {
        let details = Table::new(strings(&["Name"]), Vec::new());
        assert!(enrich(&[], &details, "Registration no").is_err());
    }

    #[test]
    fn test_group_by_grade_order() {
        let records: Vec<_> = ["B", "O", "A+", "F", "O"]
            .iter()
            .enumerate()
            .map(|(i, g)| enriched(&format!("R{i}"), "A1", g))
            .collect();

        let buckets = group_by_grade(&records, &scale());

        let order: Vec<_> = buckets.iter().map(|b| b.grade.as_str()).collect();
        assert_eq!(order, vec!["F", "B", "A+", "O"]);
        let o_rolls: Vec<_> = buckets[3].records.iter().map(|r| r.roll_no()).collect();
        assert_eq!(o_rolls, vec!["R1", "R4"]);
    }

    #[test]
    fn test_unknown_grades_form_own_buckets_last() {
        let records = vec![
            enriched("R1", "A1", "Ab"),
            enriched("R2", "A1", "O"),
            enriched("R3", "A1", "D+"),
            enriched("R4", "A1", "Ab"),
            enriched("R5", "A1", "F"),
        ];

        let buckets = group_by_grade(&records, &scale());

        let order: Vec<_> = buckets
            .iter()
            .map(|b| (b.grade.as_str(), b.records.len()))
            .collect();
        assert_eq!(order, vec![("F", 1), ("O", 1), ("Ab", 2), ("D+", 1)]);
    }

    #[test]
    fn test_high_achievers_dedup_last_wins() {
        let records = vec![
            enriched("R1", "A1", "O"),
            enriched("R2", "A1", "A+"),
            enriched("R1", "B2", "A+"),
            enriched("R3", "A1", "O"),
            enriched("R4", "A1", "A"),
        ];
        let groups = group_for_report(&records, &scale(), &strings(&["O", "A+"]));

        let achievers: Vec<_> = groups
            .high_achievers
            .iter()
            .map(|r| (r.roll_no(), r.record.course_code.as_str()))
            .collect();
        assert_eq!(achievers, vec![("R1", "B2"), ("R3", "A1"), ("R2", "A1")]);
    }

    #[test]
    fn test_sort_by_grade_is_stable() {
        let mut records = vec![
            enriched("R1", "A1", "O"),
            enriched("R2", "A1", "F"),
            enriched("R3", "A1", "O"),
            enriched("R4", "A1", "F"),
        ];
        sort_by_grade(&mut records, &scale());

        let rolls: Vec<_> = records.iter().map(|r| r.roll_no()).collect();
        assert_eq!(rolls, vec!["R2", "R4", "R1", "R3"]);
    }
}
