//! Decoders for the two semi-structured string columns.
//!
//! Results rows encode taken courses as `CODE:Name:Type:Credits:Grade:Month:Year`
//! segments joined by `;`. Authorization rows encode entitled course codes as a
//! JSON array of strings, which is occasionally malformed in the source data.

use serde_json::Value;

use crate::records::TakenCourse;

/// Minimum number of `:` separated fields a course segment must carry.
const MIN_SEGMENT_FIELDS: usize = 5;
const CODE_FIELD: usize = 0;
const GRADE_FIELD: usize = 4;

/// Outcome of a tolerant parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The structured decode succeeded.
    Clean(T),
    /// The structured decode failed and the value came from the fallback path.
    Recovered(T),
}

impl<T> Parsed<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Parsed::Recovered(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Parsed::Clean(v) | Parsed::Recovered(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Parsed::Clean(v) | Parsed::Recovered(v) => v,
        }
    }
}

/// Decodes a taken-courses string into `(course_code, grade)` pairs.
///
/// Segments with fewer than five fields are dropped. Order and duplicates
/// (retakes) are preserved.
pub fn parse_taken_courses(raw: Option<&str>) -> Vec<TakenCourse> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    raw.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let fields: Vec<&str> = segment.split(':').collect();
            if fields.len() < MIN_SEGMENT_FIELDS {
                return None;
            }
            Some(TakenCourse::new(
                fields[CODE_FIELD].trim(),
                fields[GRADE_FIELD].trim(),
            ))
        })
        .collect()
}

/// Decodes an entitled-course-codes string.
///
/// Tries a JSON array first. On any decode failure the brackets and double
/// quotes are stripped and the remainder is split on commas.
pub fn parse_entitlements(raw: Option<&str>) -> Parsed<Vec<String>> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Parsed::Clean(Vec::new());
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Parsed::Clean(
            items
                .iter()
                .map(|item| code_text(item).trim().to_string())
                .collect(),
        ),
        _ => Parsed::Recovered(split_entitlements(raw)),
    }
}

/// Text of one array item. Booleans and null read as `True`, `False`, `None`.
fn code_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn split_entitlements(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"'))
        .collect();

    cleaned
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
