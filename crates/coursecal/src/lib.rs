//! Converts a course-schedule spreadsheet export into an iCalendar file with
//! one weekly recurring event per meeting pattern.
//!
//! The pipeline runs strictly forward:
//! schedule row -> meeting pattern -> location -> event -> calendar.

pub mod address;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod location;
pub mod meeting;
pub mod schedule;
pub mod sheet;

pub use address::{AddressBook, AddressEntry};
pub use calendar::CalendarSink;
pub use config::ConverterConfig;
pub use error::{ConvertError, Result};
pub use event::{build_event, EventRecord, Recurrence};
pub use location::{LocationInfo, LocationInterpreter};
pub use meeting::{parse_meeting_pattern, CourseInfo, MeetingDescriptor};
pub use schedule::ScheduleConverter;
