//! Drives the conversion of schedule rows into calendar events.

use crate::address::AddressBook;
use crate::config::ConverterConfig;
use crate::error::Result;
use crate::event::{build_event, EventRecord};
use crate::location::LocationInterpreter;
use crate::meeting::{parse_meeting_pattern_with, CourseInfo};
use crate::sheet::{SheetRow, HEADER_MARKER};
use regex::Regex;
use tracing::{debug, info};

pub const INSTRUCTIONAL_FORMAT: &str = "Instructional Format";
pub const MEETING_PATTERNS: &str = "Meeting Patterns";
pub const INSTRUCTOR: &str = "Instructor";
pub const SECTION: &str = "Section";

/// Splits a "Meeting Patterns" cell into individual patterns.
///
/// A cell holds one pattern per meeting, separated by newlines. Patterns can
/// themselves wrap onto several lines, so a new pattern only starts at a line
/// whose beginning matches the boundary rule.
#[derive(Debug, Clone)]
pub struct PatternSplitter {
    boundary: Regex,
}

impl PatternSplitter {
    /// Creates a splitter from a boundary regex, which should be anchored
    /// with `^` (see [`ConverterConfig::boundary_regex`]).
    pub fn new(boundary: Regex) -> Self {
        Self { boundary }
    }

    /// Creates the splitter described by a configuration.
    pub fn from_config(config: &ConverterConfig) -> Result<Self> {
        Ok(Self::new(config.boundary_regex()?))
    }

    /// Splits a cell into patterns. Continuation lines stay attached to the
    /// pattern above them.
    pub fn split(&self, cell: &str) -> Vec<String> {
        let mut patterns = Vec::new();
        let mut current = String::new();

        for (idx, line) in cell.split('\n').enumerate() {
            if idx > 0 {
                if self.boundary.is_match(line) {
                    patterns.push(std::mem::take(&mut current));
                } else {
                    current.push('\n');
                }
            }
            current.push_str(line);
        }
        patterns.push(current);

        patterns
    }
}

/// Converts schedule rows into one event per meeting pattern.
pub struct ScheduleConverter<'a> {
    locations: LocationInterpreter<'a>,
    splitter: PatternSplitter,
    default_location: String,
}

impl<'a> ScheduleConverter<'a> {
    /// Creates a converter over a loaded address table.
    pub fn new(book: &'a AddressBook, config: &ConverterConfig) -> Result<Self> {
        Ok(Self {
            locations: LocationInterpreter::new(book),
            splitter: PatternSplitter::from_config(config)?,
            default_location: config.default_location.clone(),
        })
    }

    /// Converts every row, stopping at the first unparsable pattern.
    ///
    /// Rows with a blank "Meeting Patterns" field are skipped.
    pub fn convert(&self, rows: &[SheetRow]) -> Result<Vec<EventRecord>> {
        let mut events = Vec::new();
        for row in rows {
            events.extend(self.convert_row(row)?);
        }

        info!(
            rows = rows.len(),
            events = events.len(),
            "Converted schedule"
        );
        Ok(events)
    }

    /// Converts one row into its events.
    ///
    /// # Returns
    /// * `Ok(Vec<EventRecord>)` - One event per pattern, empty for rows without patterns
    /// * `Err(ConvertError::Row)` - A pattern failed to parse; names the course
    pub fn convert_row(&self, row: &SheetRow) -> Result<Vec<EventRecord>> {
        let cell = row.text(MEETING_PATTERNS);
        if cell.is_empty() {
            return Ok(Vec::new());
        }

        let course = course_info(row);
        let patterns = self.splitter.split(cell);
        debug!(
            course = %course.title,
            patterns = patterns.len(),
            "Converting course row"
        );

        patterns
            .iter()
            .map(|pattern| -> Result<EventRecord> {
                let meeting = parse_meeting_pattern_with(pattern, &self.default_location)
                    .map_err(|e| e.in_row(&course.title))?;
                Ok(build_event(&meeting, &course, &self.locations))
            })
            .collect()
    }
}

/// Collects the course-level fields of a row.
///
/// The title is the course code (the part of "Course Listing" before the
/// first `" - "`) followed by the instructional format.
pub fn course_info(row: &SheetRow) -> CourseInfo {
    let listing = row.text(HEADER_MARKER);
    let course_code = listing.split(" - ").next().unwrap_or_default().trim();

    CourseInfo {
        title: format!("{course_code} - {}", row.text(INSTRUCTIONAL_FORMAT)),
        instructor: row.text(INSTRUCTOR).to_string(),
        details: row.text(SECTION).to_string(),
    }
}
