//! Builds recurring calendar events from parsed meeting patterns.

use crate::location::LocationInterpreter;
use crate::meeting::{CourseInfo, MeetingDescriptor};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use tracing::debug;

/// The civil zone every wall-clock time in a schedule is read in.
pub const CIVIL_ZONE: Tz = chrono_tz::America::Vancouver;

/// Weekday abbreviations used in meeting patterns.
const WEEKDAY_TOKENS: [(&str, Weekday); 7] = [
    ("Mon", Weekday::Mon),
    ("Tue", Weekday::Tue),
    ("Wed", Weekday::Wed),
    ("Thu", Weekday::Thu),
    ("Fri", Weekday::Fri),
    ("Sat", Weekday::Sat),
    ("Sun", Weekday::Sun),
];

/// Recurrence frequency. Class meetings only ever repeat weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Weekly,
}

impl Frequency {
    fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "WEEKLY",
        }
    }
}

/// A weekly recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Distinct meeting weekdays, in the order they first appear
    pub by_day: Vec<Weekday>,
    /// 1 for every week, 2 for alternating weeks
    pub interval: u32,
    /// Last possible occurrence (end date at the meeting's end time)
    pub until: DateTime<Tz>,
}

impl Recurrence {
    /// Renders the rule as an RRULE value, e.g.
    /// `FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20241202T190000Z;INTERVAL=2`.
    ///
    /// UNTIL is written in UTC, as required when DTSTART carries a TZID.
    pub fn to_rrule(&self) -> String {
        let mut rule = format!("FREQ={}", self.frequency.as_str());
        if !self.by_day.is_empty() {
            let days: Vec<&str> = self.by_day.iter().map(|day| weekday_code(*day)).collect();
            rule.push_str(&format!(";BYDAY={}", days.join(",")));
        }
        rule.push_str(&format!(
            ";UNTIL={}",
            self.until.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ")
        ));
        if self.interval != 1 {
            rule.push_str(&format!(";INTERVAL={}", self.interval));
        }
        rule
    }
}

/// One recurring calendar event for a single meeting pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Location text as written in the meeting pattern
    pub location_text: String,
    pub address_block: String,
    pub description: String,
    pub recurrence: Recurrence,
}

/// Maps a weekday token like `"Mon"` to its weekday.
pub fn parse_weekday(token: &str) -> Option<Weekday> {
    WEEKDAY_TOKENS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, day)| *day)
}

/// Returns the two-letter recurrence code for a weekday.
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Interprets a wall-clock date and time in [`CIVIL_ZONE`].
///
/// An ambiguous time (the repeated hour in autumn) resolves to standard time.
/// A time inside the spring gap is read with the offset in effect before the
/// gap, which moves it forward by the skipped hour.
pub fn localize(date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = NaiveDateTime::new(date, time);
    match CIVIL_ZONE.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            let offset = CIVIL_ZONE
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            CIVIL_ZONE.from_utc_datetime(&(naive - offset))
        }
    }
}

/// Builds the recurring event for one meeting of a course.
///
/// The first instance is anchored on the pattern's start date, even when that
/// date is not one of the meeting weekdays; later instances come from the
/// recurrence rule. Weekday tokens outside Mon..Sun are dropped.
///
/// # Arguments
/// * `meeting` - Parsed meeting pattern
/// * `course` - Title, instructor and section details of the row
/// * `locations` - Interpreter over the loaded address table
pub fn build_event(
    meeting: &MeetingDescriptor,
    course: &CourseInfo,
    locations: &LocationInterpreter<'_>,
) -> EventRecord {
    let mut by_day = Vec::new();
    for token in &meeting.days {
        match parse_weekday(token) {
            Some(day) if !by_day.contains(&day) => by_day.push(day),
            Some(_) => {}
            None => debug!(token = %token, course = %course.title, "Dropping unknown weekday token"),
        }
    }

    let location = locations.interpret(&meeting.location_text);
    let description = format!(
        "Instructor: {}\n\n{}\n\n{}",
        course.instructor, location.display_name, course.details
    );

    EventRecord {
        title: course.title.clone(),
        start: localize(meeting.start_date, meeting.start_time),
        end: localize(meeting.start_date, meeting.end_time),
        location_text: meeting.location_text.clone(),
        address_block: location.address_block,
        description,
        recurrence: Recurrence {
            frequency: Frequency::Weekly,
            by_day,
            interval: if meeting.alternating { 2 } else { 1 },
            until: localize(meeting.end_date, meeting.end_time),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AddressBook, AddressEntry};
    use crate::meeting::parse_meeting_pattern;
    use std::collections::HashSet;

    fn book() -> AddressBook {
        AddressBook::from_entries([AddressEntry {
            code: "HENN".to_string(),
            name: "Hennings Building".to_string(),
            address: "6224 Agricultural Rd".to_string(),
        }])
    }

    fn course() -> CourseInfo {
        CourseInfo {
            title: "PHYS 118 - Lecture".to_string(),
            instructor: "Jane Doe".to_string(),
            details: "PHYS 118 101".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_build_from_parsed_pattern() {
        let book = book();
        let locations = LocationInterpreter::new(&book);
        let meeting = parse_meeting_pattern(
            "2024-09-03 - 2024-12-02 | Mon Wed Fri | 10:00 AM - 11:00 AM | UBC | Hennings Building (HENN) | Room: 200",
        )
        .unwrap();

        let event = build_event(&meeting, &course(), &locations);

        assert_eq!(event.title, "PHYS 118 - Lecture");
        assert_eq!(event.start.naive_local(), date(2024, 9, 3).and_time(time(10, 0)));
        assert_eq!(event.end.naive_local(), date(2024, 9, 3).and_time(time(11, 0)));
        assert_eq!(event.start.timezone(), CIVIL_ZONE);
        assert_eq!(event.address_block, "200-6224 Agricultural Rd\nVancouver BC\nCanada");
        assert_eq!(
            event.description,
            "Instructor: Jane Doe\n\n📍Hennings Building (HENN) - Room 200\n\nPHYS 118 101"
        );
        assert_eq!(event.recurrence.interval, 1);
        assert_eq!(
            event.recurrence.until,
            CIVIL_ZONE
                .with_ymd_and_hms(2024, 12, 2, 11, 0, 0)
                .single()
                .unwrap()
        );
    }

    #[test]
    fn test_by_day_drops_unknown_tokens() {
        let book = book();
        let locations = LocationInterpreter::new(&book);
        let meeting = parse_meeting_pattern(
            "2024-09-03 - 2024-12-02 | Thu Tue TBA Tue | 1:00 PM - 2:00 PM",
        )
        .unwrap();

        let event = build_event(&meeting, &course(), &locations);

        let expected: HashSet<Weekday> = [Weekday::Tue, Weekday::Thu].into_iter().collect();
        let actual: HashSet<Weekday> = event.recurrence.by_day.iter().copied().collect();
        assert_eq!(actual, expected);
        assert_eq!(event.recurrence.by_day.len(), 2);
        assert_eq!(event.address_block, crate::location::ONLINE_ADDRESS);
    }

    #[test]
    fn test_alternating_sets_interval() {
        let book = book();
        let locations = LocationInterpreter::new(&book);
        let meeting = parse_meeting_pattern(
            "2025-01-06 - 2025-04-07 | Mon (Alternate Weeks) | 9:00 AM - 11:50 AM | HENN - Room 302",
        )
        .unwrap();

        let event = build_event(&meeting, &course(), &locations);

        assert_eq!(event.recurrence.interval, 2);
        assert_eq!(
            event.recurrence.to_rrule(),
            "FREQ=WEEKLY;BYDAY=MO;UNTIL=20250407T185000Z;INTERVAL=2"
        );
    }

    #[test]
    fn test_rrule_in_standard_time() {
        let recurrence = Recurrence {
            frequency: Frequency::Weekly,
            by_day: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            interval: 1,
            until: localize(date(2024, 12, 2), time(11, 0)),
        };
        assert_eq!(
            recurrence.to_rrule(),
            "FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL=20241202T190000Z"
        );
    }

    #[test]
    fn test_localize_dst_edges() {
        // 2024-11-03 01:30 happens twice; standard time (-08:00) wins.
        let ambiguous = localize(date(2024, 11, 3), time(1, 30));
        assert_eq!(ambiguous.with_timezone(&Utc).naive_utc(), date(2024, 11, 3).and_time(time(9, 30)));

        // 2024-03-10 02:30 does not exist; it lands at 03:30 PDT.
        let gap = localize(date(2024, 3, 10), time(2, 30));
        assert_eq!(gap.naive_local(), date(2024, 3, 10).and_time(time(3, 30)));
    }

    #[test]
    fn test_weekday_table() {
        assert_eq!(parse_weekday("Sat"), Some(Weekday::Sat));
        assert_eq!(parse_weekday("mon"), None);
        assert_eq!(weekday_code(Weekday::Thu), "TH");
    }
}
