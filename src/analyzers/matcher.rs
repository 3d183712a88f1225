use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::analyzers::types::MatchOutcome;
use crate::config::Columns;
use crate::parser::{parse_entitlements, parse_taken_courses};
use crate::records::{MatchedCourseRecord, TakenCourse};
use crate::table::Table;

/// Keeps the taken courses whose code is in `entitlements`, in taken order.
pub fn match_student(
    roll_no: &str,
    taken: &[TakenCourse],
    entitlements: &[String],
) -> Vec<MatchedCourseRecord> {
    if taken.is_empty() || entitlements.is_empty() {
        return Vec::new();
    }

    let entitled: HashSet<&str> = entitlements.iter().map(String::as_str).collect();

    taken
        .iter()
        .filter(|course| entitled.contains(course.course_code.as_str()))
        .map(|course| MatchedCourseRecord::new(roll_no, course))
        .collect()
}

/// Joins every authorization row against the results table by roll number.
///
/// Roll numbers missing from `results` are logged and skipped. When `results`
/// repeats a roll number the first row is used.
pub fn match_all(auth: &Table, results: &Table, columns: &Columns) -> Result<MatchOutcome> {
    let auth_roll = auth.column(&columns.auth_roll_no).context("Authorization table")?;
    let auth_courses = auth
        .column(&columns.auth_course_ids)
        .context("Authorization table")?;
    let results_roll = results
        .column(&columns.results_roll_no)
        .context("Results table")?;
    let results_courses = results
        .column(&columns.results_courses)
        .context("Results table")?;

    let mut by_roll: HashMap<&str, &[String]> = HashMap::new();
    for row in &results.rows {
        by_roll
            .entry(Table::cell(row, results_roll).trim())
            .or_insert(row.as_slice());
    }

    let mut outcome = MatchOutcome::default();

    for row in &auth.rows {
        let roll_no = Table::cell(row, auth_roll).trim();

        let Some(result_row) = by_roll.get(roll_no) else {
            warn!(roll_no, "Roll number not found in results table");
            outcome.missing_roll_numbers.push(roll_no.to_string());
            continue;
        };

        let taken = parse_taken_courses(Some(Table::cell(result_row, results_courses)));
        let entitlements = parse_entitlements(Some(Table::cell(row, auth_courses)));
        if entitlements.is_recovered() {
            debug!(roll_no, "Entitlement list was not valid JSON, used fallback split");
            outcome.recovered_entitlements += 1;
        }

        let matched = match_student(roll_no, &taken, entitlements.value());
        debug!(
            roll_no,
            taken = taken.len(),
            entitled = entitlements.value().len(),
            matched = matched.len(),
            "Student matched"
        );

        if !matched.is_empty() {
            outcome.students_with_matches += 1;
        }
        outcome.matched.extend(matched);
    }

    Ok(outcome)
}
