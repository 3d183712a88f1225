use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate_matches;
use crate::analyzers::grouper::{detail_columns, enrich, group_for_report, sort_by_grade};
use crate::analyzers::matcher::match_all;
use crate::analyzers::roster::{match_roster, matching_students};
use crate::analyzers::types::{GradeGroups, MatchOutcome, PassAnalysis, RosterMatch, RunSummary};
use crate::config::AnalyzerConfig;
use crate::output::{
    enriched_headers, write_buckets, write_column, write_enriched, write_grade_report, write_json,
    write_matched_records, write_overall_summary, write_summaries, write_table,
};
use crate::records::MatchedCourseRecord;
use crate::table::Table;

pub const MATCHING_STUDENTS_FILE: &str = "matching_students.csv";
pub const MISSING_ROLL_NUMBERS_FILE: &str = "missing_roll_numbers.csv";
pub const MATCHING_SUMMARY_FILE: &str = "matching_roll_numbers_summary.csv";
pub const MATCHED_COURSES_FILE: &str = "matched_courses_detailed.csv";
pub const COURSE_SUMMARY_FILE: &str = "course_pass_percentage_summary.csv";
pub const STUDENT_SUMMARY_FILE: &str = "student_pass_percentage_summary.csv";
pub const OVERALL_SUMMARY_FILE: &str = "overall_pass_percentage_summary.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";
pub const SORTED_DETAILS_FILE: &str = "sorted_courses_with_details.csv";
pub const GRADE_DIR: &str = "grade_filtered";
pub const HIGH_GRADE_FILE: &str = "high_grade_students.csv";
pub const GRADE_REPORT_FILE: &str = "grade_report.md";

/// Compares authorization roll numbers with the batch results file and writes
/// the matching batch rows plus the matching and missing roll number lists.
#[tracing::instrument(skip_all, fields(auth = %auth_path.display(), batch = %batch_path.display()))]
pub fn run_roster(
    config: &AnalyzerConfig,
    auth_path: &Path,
    batch_path: &Path,
    out_dir: &Path,
) -> Result<(RosterMatch, Table)> {
    let auth = Table::load(auth_path)?;
    let batch = Table::load(batch_path)?;
    info!(auth_rows = auth.len(), batch_rows = batch.len(), "Loaded roster inputs");

    let roster = match_roster(&auth, &batch, &config.columns)
        .with_context(|| format!("Roster match of {}", auth_path.display()))?;
    let matched = matching_students(&batch, &roster);

    write_table(&out_dir.join(MATCHING_STUDENTS_FILE), &matched)?;
    write_column(
        &out_dir.join(MISSING_ROLL_NUMBERS_FILE),
        "Missing Roll Numbers from Auth File",
        &roster.missing,
    )?;
    write_column(
        &out_dir.join(MATCHING_SUMMARY_FILE),
        "Matching Roll Numbers",
        &roster.matching,
    )?;

    for roll_no in &roster.missing {
        warn!(roll_no = %roll_no, "Authorized roll number missing from batch file");
    }
    info!(
        authorized = roster.authorized_count,
        batch = roster.batch_count,
        matching = roster.matching.len(),
        missing = roster.missing.len(),
        matched_rows = matched.len(),
        match_percentage = %format!("{:.2}", roster.match_percentage()),
        "Roster comparison complete"
    );

    Ok((roster, matched))
}

/// Matches entitled against taken courses and writes the pass statistics.
pub fn run_pass_analysis(
    config: &AnalyzerConfig,
    auth_path: &Path,
    results_path: &Path,
    out_dir: &Path,
) -> Result<(MatchOutcome, PassAnalysis)> {
    let auth = Table::load(auth_path)?;
    let results = Table::load(results_path)?;
    info!(auth_rows = auth.len(), results_rows = results.len(), "Loaded pass analysis inputs");

    analyze_tables(config, &auth, &results, out_dir)
}

/// Pass analysis over already loaded tables.
#[tracing::instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn analyze_tables(
    config: &AnalyzerConfig,
    auth: &Table,
    results: &Table,
    out_dir: &Path,
) -> Result<(MatchOutcome, PassAnalysis)> {
    let outcome = match_all(auth, results, &config.columns)?;
    let analysis = aggregate_matches(&outcome.matched, &config.pass_grades());

    if outcome.matched.is_empty() {
        warn!("No matching courses found");
    }

    write_matched_records(&out_dir.join(MATCHED_COURSES_FILE), &outcome.matched)?;
    write_summaries(
        &out_dir.join(COURSE_SUMMARY_FILE),
        ["course_code", "total_students", "passed_students", "pass_percentage"],
        analysis.courses(),
    )?;
    write_summaries(
        &out_dir.join(STUDENT_SUMMARY_FILE),
        ["roll_no", "total_courses", "passed_courses", "pass_percentage"],
        analysis.students(),
    )?;
    write_overall_summary(&out_dir.join(OVERALL_SUMMARY_FILE), analysis.overall())?;
    write_json(
        &out_dir.join(RUN_SUMMARY_FILE),
        &RunSummary {
            generated_at: Utc::now(),
            overall: analysis.overall(),
            course_count: analysis.courses().len(),
            student_count: analysis.students().len(),
            missing_roll_numbers: &outcome.missing_roll_numbers,
        },
    )?;

    log_analysis(&outcome, &analysis);
    Ok((outcome, analysis))
}

fn log_analysis(outcome: &MatchOutcome, analysis: &PassAnalysis) {
    let overall = analysis.overall();
    info!(
        students_with_matches = outcome.students_with_matches,
        missing = outcome.missing_roll_numbers.len(),
        recovered_entitlements = outcome.recovered_entitlements,
        total = overall.total(),
        passed = overall.passed(),
        failed = overall.failed(),
        pass_percentage = %format!("{:.2}", overall.pass_percentage()),
        "Pass analysis complete"
    );

    for course in analysis.courses() {
        info!(
            course_code = course.key(),
            passed = course.passed(),
            total = course.total(),
            pass_percentage = %format!("{:.1}", course.pass_percentage()),
            "Course"
        );
    }

    for (grade, count) in analysis.grade_distribution() {
        info!(grade = %grade, count, "Grade distribution");
    }
}

/// Loads matched records written by [`run_pass_analysis`].
pub fn load_matched_records(path: &Path) -> Result<Vec<MatchedCourseRecord>> {
    let table = Table::load(path)?;
    let columns = || format!("Matched records file: {}", path.display());
    let roll = table.column("roll_no").with_context(columns)?;
    let course = table.column("course_code").with_context(columns)?;
    let grade = table.column("grade").with_context(columns)?;

    Ok(table
        .rows
        .iter()
        .map(|row| MatchedCourseRecord {
            roll_no: Table::cell(row, roll).to_string(),
            course_code: Table::cell(row, course).to_string(),
            grade: Table::cell(row, grade).to_string(),
        })
        .collect())
}

/// Merges matched records with student details, sorts them by grade, and
/// writes the per-grade files, high achievers, and markdown report.
pub fn run_grade_report(
    config: &AnalyzerConfig,
    matched_path: &Path,
    details_path: &Path,
    out_dir: &Path,
) -> Result<GradeGroups> {
    let matched = load_matched_records(matched_path)?;
    let details = Table::load(details_path)?;
    info!(matched = matched.len(), details = details.len(), "Loaded grade report inputs");

    report_records(config, &matched, &details, out_dir)
}

/// Grade report over already loaded records.
#[tracing::instrument(skip_all, fields(out_dir = %out_dir.display(), records = matched.len()))]
pub fn report_records(
    config: &AnalyzerConfig,
    matched: &[MatchedCourseRecord],
    details: &Table,
    out_dir: &Path,
) -> Result<GradeGroups> {
    let key = &config.columns.details_roll_no;
    let scale = config.grade_scale();

    let mut records = enrich(matched, details, key)?;
    sort_by_grade(&mut records, &scale);

    let columns = detail_columns(details, key)?;
    let headers = enriched_headers(&columns);
    write_enriched(&out_dir.join(SORTED_DETAILS_FILE), &headers, &records)?;

    let groups = group_for_report(&records, &scale, &config.high_achiever_grades);
    let grade_dir: PathBuf = out_dir.join(GRADE_DIR);
    write_buckets(&grade_dir, &headers, &groups.buckets)?;
    write_enriched(&grade_dir.join(HIGH_GRADE_FILE), &headers, &groups.high_achievers)?;
    write_grade_report(&grade_dir.join(GRADE_REPORT_FILE), &groups.buckets)?;

    for bucket in &groups.buckets {
        if !scale.is_known(&bucket.grade) {
            warn!(grade = %bucket.grade, records = bucket.records.len(), "Grade not in rank table");
        }
    }
    info!(
        buckets = groups.buckets.len(),
        high_achievers = groups.high_achievers.len(),
        dir = %grade_dir.display(),
        "Grade report complete"
    );

    Ok(groups)
}

/// Runs roster matching, pass analysis, and the grade report in sequence.
pub fn run_all(
    config: &AnalyzerConfig,
    auth_path: &Path,
    batch_path: &Path,
    details_path: &Path,
    out_dir: &Path,
) -> Result<(PassAnalysis, GradeGroups)> {
    let (_, matching) = run_roster(config, auth_path, batch_path, out_dir)?;
    let auth = Table::load(auth_path)?;
    let (outcome, analysis) = analyze_tables(config, &auth, &matching, out_dir)?;

    let details = Table::load(details_path)?;
    let groups = report_records(config, &outcome.matched, &details, out_dir)?;

    Ok((analysis, groups))
}
