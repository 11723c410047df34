/// Types for parsed meeting patterns
use chrono::{NaiveDate, NaiveTime};

/// One weekly meeting of a course section, as parsed from a pattern string
/// like `2024-09-03 - 2024-12-02 | Mon Wed Fri | 10:00 a.m. - 11:00 a.m. | ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDescriptor {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Weekday tokens in their original order, e.g. `["Mon", "Wed"]`
    pub days: Vec<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Raw location text (every segment after the time range)
    pub location_text: String,
    /// True when the section meets every second week
    pub alternating: bool,
}

/// Course-level fields shared by every meeting of a spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseInfo {
    /// Event title, e.g. `"CPSC 110 - Lecture"`
    pub title: String,
    pub instructor: String,
    /// Section text appended to the event description
    pub details: String,
}
