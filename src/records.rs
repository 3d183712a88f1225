use serde::Serialize;

/// One course a student actually took, decoded from a results string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakenCourse {
    pub course_code: String,
    pub grade: String,
}

impl TakenCourse {
    pub fn new(course_code: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            grade: grade.into(),
        }
    }
}

/// A course that is both taken and entitled for a student.
///
/// The grade always comes from the results dataset; entitlements carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedCourseRecord {
    pub roll_no: String,
    pub course_code: String,
    pub grade: String,
}

impl MatchedCourseRecord {
    pub fn new(roll_no: &str, course: &TakenCourse) -> Self {
        Self {
            roll_no: roll_no.to_string(),
            course_code: course.course_code.clone(),
            grade: course.grade.clone(),
        }
    }
}

/// A matched record joined with the student's demographic detail columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub record: MatchedCourseRecord,
    /// `(column, value)` pairs in the detail table's header order.
    pub details: Vec<(String, String)>,
}

impl EnrichedRecord {
    pub fn grade(&self) -> &str {
        &self.record.grade
    }

    pub fn roll_no(&self) -> &str {
        &self.record.roll_no
    }

    /// Returns the detail value for `column`, or an empty string when absent.
    pub fn detail(&self, column: &str) -> &str {
        self.details
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Flattens the record into a CSV row: matched fields then detail values.
    pub fn to_row(&self) -> Vec<&str> {
        let mut row = vec![
            self.record.roll_no.as_str(),
            self.record.course_code.as_str(),
            self.record.grade.as_str(),
        ];
        row.extend(self.details.iter().map(|(_, value)| value.as_str()));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched() -> EnrichedRecord {
        EnrichedRecord {
            record: MatchedCourseRecord {
                roll_no: "R1".to_string(),
                course_code: "CSEN1101".to_string(),
                grade: "O".to_string(),
            },
            details: vec![
                ("Name".to_string(), "Asha".to_string()),
                ("Email".to_string(), "asha@example.edu".to_string()),
            ],
        }
    }

    #[test]
    fn test_matched_record_takes_grade_from_taken_course() {
        let course = TakenCourse::new("MATH2361", "B+");
        let record = MatchedCourseRecord::new("R9", &course);

        assert_eq!(record.roll_no, "R9");
        assert_eq!(record.course_code, "MATH2361");
        assert_eq!(record.grade, "B+");
    }

    #[test]
    fn test_detail_lookup_missing_column_is_empty() {
        let record = enriched();
        assert_eq!(record.detail("Name"), "Asha");
        assert_eq!(record.detail("Parent Mobile"), "");
    }

    #[test]
    fn test_to_row_appends_details_in_order() {
        let record = enriched();
        assert_eq!(
            record.to_row(),
            vec!["R1", "CSEN1101", "O", "Asha", "asha@example.edu"]
        );
    }
}
