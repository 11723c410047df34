//! Error types for the schedule conversion pipeline.

use thiserror::Error;

/// Errors that can occur while converting a schedule export into a calendar.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The reference address table could not be read or has a malformed row
    #[error("Address table error: {message}")]
    AddressTable { message: String },

    /// The schedule workbook could not be opened or read
    #[error("Workbook error: {message}")]
    Workbook { message: String },

    /// No row of the schedule sheet contains the header marker
    #[error("Could not find '{marker}' in the schedule sheet")]
    MissingHeader { marker: String },

    /// The header row lacks a required column
    #[error("Schedule header is missing the '{column}' column")]
    MissingColumn { column: String },

    /// The converter configuration is invalid
    #[error("Config error: {message}")]
    Config { message: String },

    /// Filesystem failure while reading inputs or writing the calendar
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A meeting pattern does not have date, day and time segments
    #[error("Invalid pattern format: {pattern}")]
    MalformedPattern { pattern: String },

    /// A clock time could not be parsed
    #[error("Could not parse time '{token}'")]
    TimeParse { token: String },

    /// A calendar date could not be parsed
    #[error("Could not parse date '{token}'")]
    DateParse { token: String },

    /// The date range ends before it starts
    #[error("Date range ends ({end}) before it starts ({start})")]
    InvalidDateRange { start: String, end: String },

    /// A pattern error attributed to the course row it came from
    #[error("Course '{course}': {source}")]
    Row {
        course: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Returns true if this error comes from loading inputs, before any
    /// meeting pattern was interpreted.
    pub fn is_fatal_load(&self) -> bool {
        matches!(
            self,
            ConvertError::AddressTable { .. }
                | ConvertError::Workbook { .. }
                | ConvertError::MissingHeader { .. }
                | ConvertError::MissingColumn { .. }
                | ConvertError::Config { .. }
                | ConvertError::Io { .. }
        )
    }

    /// Returns true if this error comes from an unparsable meeting pattern.
    pub fn is_pattern_error(&self) -> bool {
        match self {
            ConvertError::MalformedPattern { .. }
            | ConvertError::TimeParse { .. }
            | ConvertError::DateParse { .. }
            | ConvertError::InvalidDateRange { .. } => true,
            ConvertError::Row { source, .. } => source.is_pattern_error(),
            _ => false,
        }
    }

    /// Wraps this error with the course row it was raised for.
    pub fn in_row(self, course: &str) -> Self {
        ConvertError::Row {
            course: course.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ConvertError {
    fn from(err: csv::Error) -> Self {
        ConvertError::AddressTable {
            message: err.to_string(),
        }
    }
}

impl From<calamine::XlsxError> for ConvertError {
    fn from(err: calamine::XlsxError) -> Self {
        ConvertError::Workbook {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Config {
            message: err.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_wrapping_keeps_classification() {
        let err = ConvertError::TimeParse {
            token: "25:00 am".to_string(),
        }
        .in_row("CPSC 110 - Lecture");

        assert!(err.is_pattern_error());
        assert!(!err.is_fatal_load());
        assert_eq!(
            err.to_string(),
            "Course 'CPSC 110 - Lecture': Could not parse time '25:00 am'"
        );
    }

    #[test]
    fn test_load_errors_are_fatal() {
        let err = ConvertError::MissingHeader {
            marker: "Course Listing".to_string(),
        };
        assert!(err.is_fatal_load());
        assert!(!err.is_pattern_error());
    }
}
