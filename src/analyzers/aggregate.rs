use std::collections::{BTreeMap, HashMap};

use crate::analyzers::grade::PassGrades;
use crate::analyzers::types::{OverallSummary, PassAnalysis, PassSummary};
use crate::analyzers::utility::{pct, round2};
use crate::records::MatchedCourseRecord;

/// Aggregates matched records into overall, per-course, and per-student pass
/// statistics.
///
/// Groups keep the order in which their key first appears. Group percentages
/// are rounded to two decimals; the overall percentage is left unrounded.
pub fn aggregate_matches(records: &[MatchedCourseRecord], pass: &PassGrades) -> PassAnalysis {
    let total = records.len();
    let passed = records.iter().filter(|r| pass.is_pass(&r.grade)).count();

    PassAnalysis {
        overall: OverallSummary {
            total,
            passed,
            failed: total - passed,
            pass_percentage: pct(passed, total),
        },
        courses: summarize_by(records, pass, |r| &r.course_code),
        students: summarize_by(records, pass, |r| &r.roll_no),
        grade_distribution: grade_distribution(records),
    }
}

/// Groups records by `key_of` and computes a [`PassSummary`] for each group.
pub fn summarize_by(
    records: &[MatchedCourseRecord],
    pass: &PassGrades,
    key_of: impl Fn(&MatchedCourseRecord) -> &String,
) -> Vec<PassSummary> {
    let mut summaries: Vec<PassSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = key_of(record);
        let slot = *index.entry(key.as_str()).or_insert_with(|| {
            summaries.push(PassSummary {
                key: key.clone(),
                total: 0,
                passed: 0,
                pass_percentage: 0.0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.total += 1;
        if pass.is_pass(&record.grade) {
            summary.passed += 1;
        }
    }

    for summary in &mut summaries {
        summary.pass_percentage = round2(pct(summary.passed, summary.total));
    }

    summaries
}

/// Counts records per exact grade label, sorted by label.
pub fn grade_distribution(records: &[MatchedCourseRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.grade.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(grade, count)| (grade.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    fn record(roll_no: &str, course_code: &str, grade: &str) -> MatchedCourseRecord {
        MatchedCourseRecord {
            roll_no: roll_no.to_string(),
            course_code: course_code.to_string(),
            grade: grade.to_string(),
        }
    }

    fn pass() -> PassGrades {
        AnalyzerConfig::default().pass_grades()
    }

    #[test]
    fn test_empty_collection_is_zero() {
        let analysis = aggregate_matches(&[], &pass());

        assert_eq!(analysis.overall().total(), 0);
        assert_eq!(analysis.overall().passed(), 0);
        assert_eq!(analysis.overall().pass_percentage(), 0.0);
        assert!(analysis.courses().is_empty());
        assert!(analysis.students().is_empty());
        assert!(analysis.grade_distribution().is_empty());
    }

    #[test]
    fn test_overall_totals() {
        let records = vec![
            record("R1", "CSEN1101", "A+"),
            record("R1", "MATH2361", "F"),
            record("R2", "CSEN1101", "D+"),
        ];
        let overall = aggregate_matches(&records, &pass()).overall;

        assert_eq!(overall.total, 3);
        assert_eq!(overall.passed, 2);
        assert_eq!(overall.failed, 1);
        assert!((overall.pass_percentage - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_groups_keep_first_appearance_order_and_round() {
        let records = vec![
            record("R2", "MATH2361", "B"),
            record("R1", "CSEN1101", "A"),
            record("R1", "MATH2361", "F"),
            record("R3", "MATH2361", "O"),
            record("R3", "CSEN1101", "R"),
        ];
        let analysis = aggregate_matches(&records, &pass());

        let courses: Vec<_> = analysis
            .courses()
            .iter()
            .map(|c| (c.key(), c.total(), c.passed(), c.pass_percentage()))
            .collect();
        assert_eq!(
            courses,
            vec![("MATH2361", 3, 2, 66.67), ("CSEN1101", 2, 1, 50.0)]
        );

        let students: Vec<_> = analysis.students().iter().map(|s| s.key()).collect();
        assert_eq!(students, vec!["R2", "R1", "R3"]);
    }

    #[test]
    fn test_passed_never_exceeds_total() {
        let records = vec![
            record("R1", "A1", "O"),
            record("R1", "A1", "O"),
            record("R2", "A1", "S"),
        ];
        let analysis = aggregate_matches(&records, &pass());

        for summary in analysis.courses().iter().chain(analysis.students()) {
            assert!(summary.passed() <= summary.total());
            assert!(summary.total() > 0);
            assert_eq!(
                summary.pass_percentage(),
                round2(summary.passed() as f64 / summary.total() as f64 * 100.0)
            );
        }
        // Retakes are counted twice.
        assert_eq!(analysis.students()[0].total(), 2);
    }

    #[test]
    fn test_group_percentage_half_rounds_to_even() {
        let mut records = vec![record("R0", "CSEN1101", "O")];
        records.extend((1..32).map(|i| record(&format!("R{i}"), "CSEN1101", "F")));

        let analysis = aggregate_matches(&records, &pass());

        assert_eq!(analysis.courses()[0].total(), 32);
        assert_eq!(analysis.courses()[0].pass_percentage(), 3.12);
    }

    #[test]
    fn test_grade_distribution_sorted_by_label() {
        let records = vec![
            record("R1", "A1", "O"),
            record("R2", "A1", "B"),
            record("R3", "A1", "A+"),
            record("R4", "A1", "B"),
        ];

        assert_eq!(
            grade_distribution(&records),
            vec![
                ("A+".to_string(), 1),
                ("B".to_string(), 2),
                ("O".to_string(), 1),
            ]
        );
    }
}
