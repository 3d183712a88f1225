//! In-memory CSV tables addressed by column name.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A CSV file loaded as its header row plus string rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Loads a CSV file with a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

        debug!(path = %path.display(), rows = table.len(), "Loaded table");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of `name` in the header row.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Missing required column '{name}'"))
    }

    /// Cell `col` of `row`; short rows read as an empty cell.
    pub fn cell(row: &[String], col: usize) -> &str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "rollNo,courseIds\nR1,\"[\"\"MATH2361\"\"]\"\nR2\n";

    #[test]
    fn test_from_reader_reads_headers_and_rows() {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["rollNo", "courseIds"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], r#"["MATH2361"]"#);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();

        assert_eq!(table.column("courseIds").unwrap(), 1);
        let err = table.column("Registration no").unwrap_err();
        assert!(err.to_string().contains("Registration no"));
    }

    #[test]
    fn test_short_row_reads_empty_cell() {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();
        let col = table.column("courseIds").unwrap();

        assert_eq!(Table::cell(&table.rows[1], col), "");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let path = std::env::temp_dir().join("course_pass_analyzer_no_such_file.csv");
        assert!(Table::load(&path).is_err());
    }
}
