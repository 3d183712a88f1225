//! Run configuration: grade vocabularies and dataset column names.
//!
//! Stored as a JSON object on disk; every key is optional and falls back to
//! the defaults below:
//! ```json
//! {
//!   "grade_order": ["F", "R", "P", "C", "B", "B+", "A", "A+", "O"],
//!   "pass_grades": ["A+", "A", "B+", "B", "C+", "C", "D+", "D", "S", "O", "P"],
//!   "high_achiever_grades": ["O", "A+"],
//!   "columns": { "auth_roll_no": "rollNo" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzers::grade::{GradeScale, PassGrades};

/// Grade labels from worst to best, used for ranking and bucket order.
pub const DEFAULT_GRADE_ORDER: &[&str] = &["F", "R", "P", "C", "B", "B+", "A", "A+", "O"];

/// Labels counted as a pass. Deliberately not derived from the grade order.
pub const DEFAULT_PASS_GRADES: &[&str] = &["A+", "A", "B+", "B", "C+", "C", "D+", "D", "S", "O", "P"];

pub const DEFAULT_HIGH_ACHIEVER_GRADES: &[&str] = &["O", "A+"];

/// Column names of the three input datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub auth_roll_no: String,
    pub auth_course_ids: String,
    pub results_roll_no: String,
    pub results_courses: String,
    pub details_roll_no: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            auth_roll_no: "rollNo".to_string(),
            auth_course_ids: "courseIds".to_string(),
            results_roll_no: "Registration no".to_string(),
            results_courses: "sem4_courses".to_string(),
            details_roll_no: "Registration no".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub grade_order: Vec<String>,
    pub pass_grades: Vec<String>,
    pub high_achiever_grades: Vec<String>,
    pub columns: Columns,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            grade_order: to_strings(DEFAULT_GRADE_ORDER),
            pass_grades: to_strings(DEFAULT_PASS_GRADES),
            high_achiever_grades: to_strings(DEFAULT_HIGH_ACHIEVER_GRADES),
            columns: Columns::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AnalyzerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn grade_scale(&self) -> GradeScale {
        GradeScale::new(self.grade_order.clone())
    }

    pub fn pass_grades(&self) -> PassGrades {
        PassGrades::new(self.pass_grades.iter().cloned())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
