use std::collections::HashSet;

/// Ordered grade labels, worst first.
///
/// | Label     | Rank |
/// |-----------|------|
/// | F         | 0    |
/// | R         | 1    |
/// | P         | 2    |
/// | C         | 3    |
/// | B         | 4    |
/// | B+        | 5    |
/// | A         | 6    |
/// | A+        | 7    |
/// | O         | 8    |
/// | (unknown) | 9    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeScale {
    order: Vec<String>,
}

impl GradeScale {
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    /// Index of `grade` in the table, or the table length for unknown labels.
    pub fn rank(&self, grade: &str) -> usize {
        self.order
            .iter()
            .position(|g| g == grade)
            .unwrap_or(self.order.len())
    }

    pub fn is_known(&self, grade: &str) -> bool {
        self.order.iter().any(|g| g == grade)
    }

    /// Stable sort by rank; equal ranks keep their input order.
    pub fn sort_by_rank<T>(&self, items: &mut [T], grade_of: impl Fn(&T) -> &str) {
        items.sort_by_key(|item| self.rank(grade_of(item)));
    }
}

/// Grade labels counted as a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassGrades {
    grades: HashSet<String>,
}

impl PassGrades {
    pub fn new(grades: impl IntoIterator<Item = String>) -> Self {
        Self {
            grades: grades.into_iter().collect(),
        }
    }

    pub fn is_pass(&self, grade: &str) -> bool {
        self.grades.contains(grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    fn scale() -> GradeScale {
        AnalyzerConfig::default().grade_scale()
    }

    #[test]
    fn test_rank_boundaries() {
        let scale = scale();
        assert_eq!(scale.rank("F"), 0);
        assert_eq!(scale.rank("R"), 1);
        assert_eq!(scale.rank("B+"), 5);
        assert_eq!(scale.rank("O"), 8);
        assert_eq!(scale.rank("D+"), 9);
        assert_eq!(scale.rank(""), 9);
        assert_eq!(scale.rank("a+"), 9);
    }

    #[test]
    fn test_sort_is_stable() {
        let scale = scale();
        let mut rows = vec![
            ("B", 1),
            ("O", 2),
            ("A+", 3),
            ("F", 4),
            ("O", 5),
            ("X", 6),
            ("B", 7),
        ];
        scale.sort_by_rank(&mut rows, |r| r.0);

        assert_eq!(
            rows,
            vec![
                ("F", 4),
                ("B", 1),
                ("B", 7),
                ("A+", 3),
                ("O", 2),
                ("O", 5),
                ("X", 6),
            ]
        );
    }

    #[test]
    fn test_pass_grades() {
        let pass = AnalyzerConfig::default().pass_grades();

        for grade in ["A+", "A", "B+", "B", "C+", "C", "D+", "D", "S", "O", "P"] {
            assert!(pass.is_pass(grade), "{grade} should pass");
        }
        assert!(!pass.is_pass("F"));
        assert!(!pass.is_pass("R"));
        assert!(!pass.is_pass(""));
    }

    #[test]
    fn test_is_known() {
        let scale = scale();
        assert!(scale.is_known("A+"));
        assert!(!scale.is_known("S"));
    }
}
