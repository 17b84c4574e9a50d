//! The `!!timestamp` codec.
//!
//! Accepted forms are the date-only `YYYY-MM-DD` and the extended
//! `YYYY-M-D[Tt ]h:mm:ss[.fraction][tz]`, where the time zone is `Z` or
//! `±h[h][:mm]` and may be preceded by spaces. A timestamp without a time
//! zone is taken to be UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone};

use crate::{SchemaError, TIMESTAMP_TAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Parts {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanosecond: u32,
    offset_seconds: i32,
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len < min {
            return None;
        }
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        digits.parse().ok()
    }

    fn eat(&mut self, ch: char) -> bool {
        if let Some(rest) = self.rest.strip_prefix(ch) {
            self.rest = rest;
            true
        } else {
            false
        }
    }

    fn eat_blanks(&mut self) -> bool {
        let trimmed = self.rest.trim_start_matches([' ', '\t']);
        let ate = trimmed.len() != self.rest.len();
        self.rest = trimmed;
        ate
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }
}

/// Split a timestamp into its fields without checking their ranges.
fn split(text: &str) -> Option<Parts> {
    let mut cursor = Cursor { rest: text };
    let year = cursor.digits(4, 4)?;
    if !cursor.eat('-') {
        return None;
    }

    // The date-only form demands two-digit months and days.
    if text.len() == 10 {
        let month = cursor.digits(2, 2)?;
        if !cursor.eat('-') {
            return None;
        }
        let day = cursor.digits(2, 2)?;
        return cursor.is_empty().then_some(Parts {
            year: year as i32,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
            offset_seconds: 0,
        });
    }

    let month = cursor.digits(1, 2)?;
    if !cursor.eat('-') {
        return None;
    }
    let day = cursor.digits(1, 2)?;
    if !(cursor.eat('T') || cursor.eat('t') || cursor.eat_blanks()) {
        return None;
    }
    let hour = cursor.digits(1, 2)?;
    if !cursor.eat(':') {
        return None;
    }
    let minute = cursor.digits(2, 2)?;
    if !cursor.eat(':') {
        return None;
    }
    let second = cursor.digits(2, 2)?;

    let mut nanosecond = 0;
    if cursor.eat('.') {
        let len = cursor
            .rest
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let (fraction, rest) = cursor.rest.split_at(len);
        cursor.rest = rest;
        for (i, digit) in fraction.bytes().take(9).enumerate() {
            nanosecond += u32::from(digit - b'0') * 10u32.pow(8 - i as u32);
        }
    }

    cursor.eat_blanks();
    let mut offset_seconds = 0;
    if !cursor.eat('Z') && cursor.rest.starts_with(['+', '-']) {
        let negative = cursor.eat('-');
        if !negative {
            cursor.eat('+');
        }
        let hours = cursor.digits(1, 2)?;
        let minutes = if cursor.eat(':') {
            cursor.digits(2, 2)?
        } else {
            0
        };
        let seconds = (hours * 3600 + minutes * 60) as i32;
        offset_seconds = if negative { -seconds } else { seconds };
    }

    cursor.is_empty().then_some(Parts {
        year: year as i32,
        month,
        day,
        hour,
        minute,
        second,
        nanosecond,
        offset_seconds,
    })
}

/// Does `text` have the shape of a timestamp?
pub fn is_timestamp(text: &str) -> bool {
    split(text).is_some()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, SchemaError> {
    let invalid = || SchemaError::InvalidValue {
        tag: String::from(TIMESTAMP_TAG),
        value: String::from(text),
    };
    let parts = split(text).ok_or_else(invalid)?;
    let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_nano_opt(parts.hour, parts.minute, parts.second, parts.nanosecond)
        .ok_or_else(invalid)?;
    let offset = FixedOffset::east_opt(parts.offset_seconds).ok_or_else(invalid)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(invalid)
}

/// Format a timestamp in RFC 3339 form, which reads back unchanged.
pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    #[test]
    fn date_only() {
        let timestamp = parse_timestamp("2002-12-14").unwrap();
        assert_eq!(
            (timestamp.year(), timestamp.month(), timestamp.day()),
            (2002, 12, 14)
        );
        assert_eq!(timestamp.offset().local_minus_utc(), 0);
        assert_eq!(format_timestamp(&timestamp), "2002-12-14T00:00:00Z");
    }

    #[test]
    fn canonical_and_spaced() {
        let canonical = parse_timestamp("2001-12-15T02:59:43.1Z").unwrap();
        assert_eq!(canonical.nanosecond(), 100_000_000);
        assert_eq!(format_timestamp(&canonical), "2001-12-15T02:59:43.100Z");

        let spaced = parse_timestamp("2001-12-14 21:59:43.10 -5").unwrap();
        assert_eq!(spaced.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(spaced, canonical);

        let iso = parse_timestamp("2001-12-14t21:59:43.10-05:00").unwrap();
        assert_eq!(iso, canonical);
    }

    #[test]
    fn no_time_zone_means_utc() {
        let timestamp = parse_timestamp("2001-1-2 3:04:05").unwrap();
        assert_eq!(format_timestamp(&timestamp), "2001-01-02T03:04:05Z");
    }

    #[test]
    fn shape_and_range() {
        assert!(is_timestamp("2001-13-45"));
        assert!(parse_timestamp("2001-13-45").is_err());
        assert!(!is_timestamp("2001-1-2"));
        assert!(!is_timestamp("20011-01-02"));
        assert!(!is_timestamp("2001-01-02T10:00"));
        assert!(!is_timestamp("2001-01-02 10:00:00 +"));
        assert!(!is_timestamp("not a date"));
    }
}
