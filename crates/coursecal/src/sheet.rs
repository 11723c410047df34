//! Reads the schedule export workbook into rows of named fields.
//!
//! Exports start with a few banner rows before the real header, so the header
//! is found by scanning for the row that contains [`HEADER_MARKER`].

use crate::error::{ConvertError, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Cell text that identifies the header row.
pub const HEADER_MARKER: &str = "Course Listing";

/// Columns every schedule sheet must have.
pub const REQUIRED_COLUMNS: [&str; 3] = [HEADER_MARKER, "Instructional Format", "Meeting Patterns"];

/// One data row of the schedule sheet, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    fields: HashMap<String, String>,
}

impl SheetRow {
    /// Creates a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of a column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Returns the trimmed value of a column, or `""` when absent.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).map(str::trim).unwrap_or_default()
    }
}

/// Reads the first worksheet of an `.xlsx` schedule export.
pub fn read_schedule(path: &Path) -> Result<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| {
        ConvertError::Workbook {
            message: format!("Failed to open XLSX: {e}: {}", path.display()),
        }
    })?;

    let sheet_names = workbook.sheet_names();
    let first = sheet_names.first().ok_or_else(|| ConvertError::Workbook {
        message: format!("Workbook has no sheets: {}", path.display()),
    })?;
    let range = workbook.worksheet_range(first)?;

    let rows = rows_from_grid(range_to_grid(&range))?;
    info!(
        path = %path.display(),
        sheet = %first,
        rows = rows.len(),
        "Read schedule sheet"
    );
    Ok(rows)
}

fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Turns a grid of cell text into named rows.
///
/// The first row containing a cell equal to [`HEADER_MARKER`] is the header;
/// every row after it becomes a [`SheetRow`]. Cells past the last header
/// column are ignored, and blank header cells name no column.
pub fn rows_from_grid(grid: Vec<Vec<String>>) -> Result<Vec<SheetRow>> {
    let header_idx = grid
        .iter()
        .position(|row| row.iter().any(|cell| cell.trim() == HEADER_MARKER))
        .ok_or_else(|| ConvertError::MissingHeader {
            marker: HEADER_MARKER.to_string(),
        })?;
    debug!(row = header_idx, "Found header row");

    let header: Vec<String> = grid[header_idx]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !header.iter().any(|name| name == column) {
            return Err(ConvertError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let rows = grid
        .into_iter()
        .skip(header_idx + 1)
        .map(|cells| {
            let mut fields = HashMap::new();
            for (name, value) in header.iter().zip(cells) {
                if !name.is_empty() {
                    fields.entry(name.clone()).or_insert(value);
                }
            }
            SheetRow { fields }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_found_after_banner_rows() {
        let rows = rows_from_grid(grid(&[
            &["My Enrolled Courses", "", ""],
            &["", "", ""],
            &["Course Listing", "Instructional Format", "Meeting Patterns", "Instructor"],
            &["CPSC 110 - Computation", "Lecture", "2024-09-03 - 2024-12-02 | Mon | 9:00 AM - 10:00 AM", "Ada"],
        ]))
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Course Listing"), Some("CPSC 110 - Computation"));
        assert_eq!(rows[0].text("Instructor"), "Ada");
        assert_eq!(rows[0].get("Section"), None);
        assert_eq!(rows[0].text("Section"), "");
    }

    #[test]
    fn test_short_rows_leave_fields_absent() {
        let rows = rows_from_grid(grid(&[
            &[" Course Listing ", "Instructional Format", "Meeting Patterns", "Section"],
            &["MATH 100 - Calculus", "Lecture"],
        ]))
        .unwrap();

        assert_eq!(rows[0].get("Meeting Patterns"), None);
        assert_eq!(rows[0].text("Instructional Format"), "Lecture");
    }

    #[test]
    fn test_missing_marker_is_fatal() {
        let err = rows_from_grid(grid(&[&["Course", "Format"], &["x", "y"]])).unwrap_err();
        assert!(matches!(err, ConvertError::MissingHeader { .. }));
        assert!(err.is_fatal_load());
    }

    #[test]
    fn test_missing_required_column() {
        let err = rows_from_grid(grid(&[&["Course Listing", "Meeting Patterns"]])).unwrap_err();
        assert!(
            matches!(err, ConvertError::MissingColumn { ref column } if column == "Instructional Format")
        );
    }

    #[test]
    fn test_read_schedule_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/schedule.xlsx");
        let rows = read_schedule(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("Course Listing"), "PHYS 118 - Introductory Physics");
        assert_eq!(rows[0].text("Meeting Patterns").lines().count(), 2);
        assert_eq!(rows[0].text("Credits"), "3");
        assert_eq!(rows[1].text("Credits"), "1.5");
        assert_eq!(rows[1].get("Meeting Patterns"), Some(""));
        assert_eq!(rows[1].get("Instructor"), Some(""));
    }

    #[test]
    fn test_read_schedule_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_schedule(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, ConvertError::Workbook { .. }));
    }
}
