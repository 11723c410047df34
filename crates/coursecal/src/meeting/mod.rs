/// Meeting pattern parsing
mod types;

pub use types::*;

use crate::config::DEFAULT_LOCATION;
use crate::error::{ConvertError, Result};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Separator between the fields of a meeting pattern.
const SEGMENT_SEPARATOR: &str = " | ";
/// Separator inside the date and time ranges.
const RANGE_SEPARATOR: &str = " - ";

static ALTERNATING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)alternat(?:e|ing)\s+weeks").unwrap());
static ALTERNATING_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(\s*alternat(?:e|ing)\s+weeks\s*\)").unwrap());

/// Parses a meeting pattern, using `"Online"` when it has no location.
///
/// See [`parse_meeting_pattern_with`].
pub fn parse_meeting_pattern(pattern: &str) -> Result<MeetingDescriptor> {
    parse_meeting_pattern_with(pattern, DEFAULT_LOCATION)
}

/// Parses one meeting pattern into a [`MeetingDescriptor`].
///
/// The pattern is `dates | days | times [| location...]`. Everything after the
/// time range is joined back together as the location text.
///
/// # Arguments
/// * `pattern` - A single meeting pattern (already split out of its cell)
/// * `default_location` - Location used when the pattern has only three fields
///
/// # Returns
/// * `Ok(MeetingDescriptor)` - The parsed meeting
/// * `Err(ConvertError::MalformedPattern)` - Fewer than three fields
/// * `Err(ConvertError::TimeParse | DateParse | InvalidDateRange)` - Bad ranges
pub fn parse_meeting_pattern_with(
    pattern: &str,
    default_location: &str,
) -> Result<MeetingDescriptor> {
    let parts: Vec<&str> = pattern.trim().split(SEGMENT_SEPARATOR).collect();
    if parts.len() < 3 {
        return Err(ConvertError::MalformedPattern {
            pattern: pattern.to_string(),
        });
    }

    let dates = parts[0].trim();
    let mut days = parts[1].trim().to_string();
    let times = parts[2].trim();

    let location_text = if parts.len() >= 4 {
        parts[3..].join(SEGMENT_SEPARATOR).trim().to_string()
    } else {
        default_location.to_string()
    };

    let alternating = ALTERNATING_REGEX.is_match(&days);
    if alternating {
        days = ALTERNATING_MARKER_REGEX.replace_all(&days, "").trim().to_string();
    }

    let (start_time, end_time) = parse_time_range(times)?;
    let (start_date, end_date) = parse_date_range(dates)?;

    let meeting = MeetingDescriptor {
        start_date,
        end_date,
        days: days.split_whitespace().map(str::to_string).collect(),
        start_time,
        end_time,
        location_text,
        alternating,
    };

    debug!(
        start = %meeting.start_date,
        end = %meeting.end_date,
        days = ?meeting.days,
        alternating = meeting.alternating,
        "Parsed meeting pattern"
    );

    Ok(meeting)
}

/// Parses a 12-hour clock time such as `10:00 a.m.` or `2:30 PM`.
pub fn parse_time(token: &str) -> Result<NaiveTime> {
    let normalized = token.to_lowercase().replace(['.', '|'], "");
    NaiveTime::parse_from_str(normalized.trim(), "%I:%M %p").map_err(|_| {
        ConvertError::TimeParse {
            token: token.trim().to_string(),
        }
    })
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(token: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(token.trim(), "%Y-%m-%d").map_err(|_| ConvertError::DateParse {
        token: token.trim().to_string(),
    })
}

fn parse_time_range(times: &str) -> Result<(NaiveTime, NaiveTime)> {
    let (start, end) = times
        .split_once(RANGE_SEPARATOR)
        .ok_or_else(|| ConvertError::TimeParse {
            token: times.to_string(),
        })?;
    Ok((parse_time(start)?, parse_time(end)?))
}

fn parse_date_range(dates: &str) -> Result<(NaiveDate, NaiveDate)> {
    let (start, end) = dates
        .split_once(RANGE_SEPARATOR)
        .ok_or_else(|| ConvertError::DateParse {
            token: dates.to_string(),
        })?;
    let (start, end) = (parse_date(start)?, parse_date(end)?);

    if end < start {
        return Err(ConvertError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "2024-09-03 - 2024-12-02 | Mon Wed Fri | 10:00 AM - 11:00 AM | Hennings Building (HENN) | Room: 200";

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_full_pattern() {
        let meeting = parse_meeting_pattern(PATTERN).unwrap();

        assert_eq!(meeting.start_date, NaiveDate::from_ymd_opt(2024, 9, 3).unwrap());
        assert_eq!(meeting.end_date, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap());
        assert_eq!(meeting.days, vec!["Mon", "Wed", "Fri"]);
        assert_eq!(meeting.start_time, hm(10, 0));
        assert_eq!(meeting.end_time, hm(11, 0));
        assert_eq!(meeting.location_text, "Hennings Building (HENN) | Room: 200");
        assert!(!meeting.alternating);
    }

    #[test]
    fn test_parse_without_location_defaults_online() {
        let meeting = parse_meeting_pattern("2025-01-06 - 2025-04-08 | Tue Thu | 2:00 p.m. - 3:30 p.m.")
            .unwrap();

        assert_eq!(meeting.location_text, "Online");
        assert_eq!(meeting.start_time, hm(14, 0));
        assert_eq!(meeting.end_time, hm(15, 30));

        let meeting =
            parse_meeting_pattern_with("2025-01-06 - 2025-04-08 | Tue | 9:00 am - 10:00 am", "TBA")
                .unwrap();
        assert_eq!(meeting.location_text, "TBA");
    }

    #[test]
    fn test_alternating_marker_variants() {
        for days in [
            "Mon Wed (Alternate Weeks)",
            "Mon Wed (alternating weeks)",
            "Mon Wed  ( ALTERNATING   Weeks )",
            "Mon (alternate weeks) Wed",
        ] {
            let pattern = format!("2024-09-03 - 2024-12-02 | {days} | 10:00 AM - 11:00 AM");
            let meeting = parse_meeting_pattern(&pattern).unwrap();
            assert!(meeting.alternating, "{days}");
            assert_eq!(meeting.days, vec!["Mon", "Wed"], "{days}");
        }
    }

    #[test]
    fn test_days_keep_order_and_duplicates() {
        let meeting =
            parse_meeting_pattern("2024-09-03 - 2024-12-02 | Fri Mon Fri | 8:00 AM - 9:00 AM").unwrap();
        assert_eq!(meeting.days, vec!["Fri", "Mon", "Fri"]);
    }

    #[test]
    fn test_too_few_segments_is_malformed() {
        for pattern in ["2024-09-03 - 2024-12-02 | Mon Wed", "", "garbage"] {
            let err = parse_meeting_pattern(pattern).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedPattern { .. }), "{pattern}");
        }
    }

    #[test]
    fn test_bad_time_is_reported() {
        let err = parse_meeting_pattern("2024-09-03 - 2024-12-02 | Mon | 25:00 AM - 11:00 AM")
            .unwrap_err();
        assert!(matches!(err, ConvertError::TimeParse { ref token } if token == "25:00 AM"));

        let err = parse_meeting_pattern("2024-09-03 - 2024-12-02 | Mon | 10:00 AM").unwrap_err();
        assert!(matches!(err, ConvertError::TimeParse { .. }));
    }

    #[test]
    fn test_bad_dates_are_reported() {
        let err = parse_meeting_pattern("2024/09/03 - 2024-12-02 | Mon | 10:00 AM - 11:00 AM")
            .unwrap_err();
        assert!(matches!(err, ConvertError::DateParse { ref token } if token == "2024/09/03"));

        let err = parse_meeting_pattern("2024-12-02 - 2024-09-03 | Mon | 10:00 AM - 11:00 AM")
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_parse_time_normalization() {
        assert_eq!(parse_time("10:00 a.m.").unwrap(), hm(10, 0));
        assert_eq!(parse_time(" 12:30 P.M. |").unwrap(), hm(12, 30));
        assert_eq!(parse_time("12:00 am").unwrap(), hm(0, 0));
        assert!(parse_time("noon").is_err());
    }
}
