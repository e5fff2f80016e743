//! Publication date interpretation.
//!
//! Government sites print dates in a handful of shapes, often surrounded
//! by labels ("Yayın Tarihi: 12.03.2024"). The text is searched rather than
//! matched whole.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref YEAR_FIRST: Regex = Regex::new(
        r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T\s]+(\d{1,2}):(\d{2})(?::(\d{2}))?)?"
    )
    .unwrap();
    static ref DAY_FIRST: Regex = Regex::new(
        r"(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?"
    )
    .unwrap();
}

/// Whether `text` contains something shaped like a date.
pub fn looks_like_date(text: &str) -> bool {
    YEAR_FIRST.is_match(text) || DAY_FIRST.is_match(text)
}

/// Interprets `raw` as a publication date. Dates without a zone are taken
/// to be in `offset`. Returns `None` when nothing sensible is found.
pub fn parse_published(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }

    let naive = YEAR_FIRST
        .captures(raw)
        .and_then(|caps| naive_from(&caps, 1, 2, 3))
        .or_else(|| {
            DAY_FIRST
                .captures(raw)
                .and_then(|caps| naive_from(&caps, 3, 2, 1))
        })?;

    offset.from_local_datetime(&naive).single()
}

fn naive_from(caps: &Captures, year: usize, month: usize, day: usize) -> Option<NaiveDateTime> {
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(number(year)? as i32, number(month)?, number(day)?)?;
    let time = match (number(4), number(5)) {
        (Some(h), Some(m)) => NaiveTime::from_hms_opt(h, m, number(6).unwrap_or(0))?,
        _ => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    Some(date.and_time(time))
}
