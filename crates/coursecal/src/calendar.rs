//! iCalendar output for built events.

use crate::config::{ConverterConfig, LocationProperty};
use crate::error::Result;
use crate::event::{EventRecord, CIVIL_ZONE};
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};
use std::fs;
use std::path::Path;
use tracing::info;

/// Observances of [`CIVIL_ZONE`] under the North American rules in force
/// since 2007.
const CIVIL_OBSERVANCES: [&str; 14] = [
    "BEGIN:DAYLIGHT",
    "TZOFFSETFROM:-0800",
    "TZOFFSETTO:-0700",
    "TZNAME:PDT",
    "DTSTART:19700308T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU",
    "END:DAYLIGHT",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:-0700",
    "TZOFFSETTO:-0800",
    "TZNAME:PST",
    "DTSTART:19701101T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU",
    "END:STANDARD",
];

/// Collects events into a calendar and writes it out.
pub struct CalendarSink {
    calendar: Calendar,
    location_property: LocationProperty,
    events: usize,
}

impl CalendarSink {
    /// Creates an empty calendar configured by `config`.
    pub fn new(config: &ConverterConfig) -> Self {
        let mut calendar = Calendar::new();
        if let Some(name) = &config.calendar_name {
            calendar.name(name);
        }
        Self {
            calendar,
            location_property: config.location_property,
            events: 0,
        }
    }

    /// Adds one event as a VEVENT with its weekly RRULE.
    pub fn push(&mut self, record: &EventRecord) {
        let location = match self.location_property {
            LocationProperty::Address => &record.address_block,
            LocationProperty::Raw => &record.location_text,
        };

        let event = Event::new()
            .uid(&event_uid(record, self.events))
            .summary(&record.title)
            .starts(zoned(&record.start))
            .ends(zoned(&record.end))
            .location(location)
            .description(&record.description)
            .add_property("RRULE", record.recurrence.to_rrule())
            .done();

        self.calendar.push(event);
        self.events += 1;
    }

    /// Adds every event in order.
    pub fn extend<'r>(&mut self, records: impl IntoIterator<Item = &'r EventRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of events added so far.
    pub fn len(&self) -> usize {
        self.events
    }

    /// Returns true if no events were added.
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Serializes the calendar to its byte representation.
    ///
    /// Event times reference [`CIVIL_ZONE`] by TZID, so its VTIMEZONE is
    /// written ahead of the first VEVENT.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ics = self.calendar.to_string();
        if let Some(at) = ics.find("\r\nBEGIN:VEVENT\r\n") {
            ics.insert_str(at + 2, &timezone_block());
        }
        ics.into_bytes()
    }

    /// Writes the calendar to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        info!(
            path = %path.display(),
            events = self.events,
            "Wrote calendar"
        );
        Ok(())
    }
}

fn zoned(dt: &chrono::DateTime<chrono_tz::Tz>) -> CalendarDateTime {
    CalendarDateTime::WithTimezone {
        date_time: dt.naive_local(),
        tzid: dt.timezone().name().to_string(),
    }
}

fn timezone_block() -> String {
    let mut block = format!("BEGIN:VTIMEZONE\r\nTZID:{}\r\n", CIVIL_ZONE.name());
    for line in CIVIL_OBSERVANCES {
        block.push_str(line);
        block.push_str("\r\n");
    }
    block.push_str("END:VTIMEZONE\r\n");
    block
}

/// UID built from the title, first start and position in the calendar.
fn event_uid(record: &EventRecord, index: usize) -> String {
    let slug: String = record
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!(
        "{slug}-{}-{index}@coursecal",
        record.start.format("%Y%m%dT%H%M%S")
    )
}
