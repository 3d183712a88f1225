//! Data types produced by the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::records::{EnrichedRecord, MatchedCourseRecord};

/// Pass statistics for one course or one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassSummary {
    pub(crate) key: String,
    pub(crate) total: usize,
    pub(crate) passed: usize,
    pub(crate) pass_percentage: f64,
}

impl PassSummary {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn pass_percentage(&self) -> f64 {
        self.pass_percentage
    }
}

/// Totals across every matched course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub(crate) total: usize,
    pub(crate) passed: usize,
    pub(crate) failed: usize,
    pub(crate) pass_percentage: f64,
}

impl OverallSummary {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn pass_percentage(&self) -> f64 {
        self.pass_percentage
    }
}

/// Everything the aggregator derives from the matched records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassAnalysis {
    pub(crate) overall: OverallSummary,
    pub(crate) courses: Vec<PassSummary>,
    pub(crate) students: Vec<PassSummary>,
    /// `(grade, count)` sorted by grade label.
    pub(crate) grade_distribution: Vec<(String, usize)>,
}

impl PassAnalysis {
    pub fn overall(&self) -> &OverallSummary {
        &self.overall
    }

    pub fn courses(&self) -> &[PassSummary] {
        &self.courses
    }

    pub fn students(&self) -> &[PassSummary] {
        &self.students
    }

    pub fn grade_distribution(&self) -> &[(String, usize)] {
        &self.grade_distribution
    }
}

/// Result of joining every authorized student against the results table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: Vec<MatchedCourseRecord>,
    /// Authorized roll numbers with no results row, in encounter order.
    pub missing_roll_numbers: Vec<String>,
    pub students_with_matches: usize,
    /// Entitlement strings that needed the fallback decoder.
    pub recovered_entitlements: usize,
}

/// Comparison of roll numbers between the authorization and batch datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterMatch {
    pub authorized_count: usize,
    pub batch_count: usize,
    /// Sorted.
    pub matching: Vec<String>,
    /// Authorized but absent from the batch. Sorted.
    pub missing: Vec<String>,
    /// Indices of batch rows whose roll number matched, in input order.
    pub matching_rows: Vec<usize>,
}

impl RosterMatch {
    pub fn match_percentage(&self) -> f64 {
        crate::analyzers::utility::pct(self.matching.len(), self.authorized_count)
    }
}

/// Enriched records sharing one exact grade label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeBucket {
    pub grade: String,
    pub records: Vec<EnrichedRecord>,
}

/// Buckets in grade-rank order plus the deduplicated high achievers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeGroups {
    pub buckets: Vec<GradeBucket>,
    pub high_achievers: Vec<EnrichedRecord>,
}

/// JSON summary written at the end of a pass analysis.
#[derive(Serialize)]
pub struct RunSummary<'a> {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) overall: &'a OverallSummary,
    pub(crate) course_count: usize,
    pub(crate) student_count: usize,
    pub(crate) missing_roll_numbers: &'a [String],
}
