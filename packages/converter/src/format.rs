//! Value formatting: dates, times, amounts, durations.
//!
//! eForms dates carry their offset on the date itself (`2019-10-24+01:00`)
//! and times carry it separately (`12:00:00+01:00`). OCDS wants a single
//! RFC 3339 date-time.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::config::DAYS_PER_UNIT;

/// Date with optional offset: `2019-10-24`, `2019-10-24Z`, `2019-10-24+01:00`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{8})(Z|[+-]\d{2}:\d{2})?$").expect("valid regex")
});

/// Time with optional fraction and offset: `12:00`, `12:00:00.5+01:00`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}:\d{2}(?::\d{2})?)(?:\.\d+)?(Z|[+-]\d{2}:\d{2})?$").expect("valid regex")
});

/// Full date-time, already combined: `2019-10-24T12:00:00+01:00`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)T(.+)$").expect("valid regex"));

/// Amount with a decimal comma: `1250,5`, `-0,75`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DECIMAL_COMMA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+,\d{1,2}$").expect("valid regex"));

fn parse_offset(text: Option<&str>) -> Option<FixedOffset> {
    let text = match text {
        None | Some("Z") => return FixedOffset::east_opt(0),
        Some(text) => text,
    };
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = text.get(1..)?.split_once(':')?;
    let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(sign * seconds)
}

fn parse_date(text: &str) -> Option<(NaiveDate, Option<&str>)> {
    let caps = DATE_PATTERN.captures(text.trim())?;
    let date_text = caps.get(1)?.as_str();
    let date = if date_text.contains('-') {
        NaiveDate::parse_from_str(date_text, "%Y-%m-%d").ok()?
    } else {
        NaiveDate::parse_from_str(date_text, "%Y%m%d").ok()?
    };
    Some((date, caps.get(2).map(|m| m.as_str())))
}

fn parse_time(text: &str) -> Option<(NaiveTime, Option<&str>)> {
    let caps = TIME_PATTERN.captures(text.trim())?;
    let time_text = caps.get(1)?.as_str();
    let time = NaiveTime::parse_from_str(time_text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_text, "%H:%M"))
        .ok()?;
    Some((time, caps.get(2).map(|m| m.as_str())))
}

fn to_rfc3339(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<String> {
    let local = NaiveDateTime::new(date, time);
    let datetime: DateTime<FixedOffset> = local.and_local_timezone(offset).single()?;
    Some(datetime.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Format an eForms date as the start of that day.
///
/// # Examples
/// ```
/// use eforms_ocds::format::format_date;
///
/// assert_eq!(format_date("2019-10-24+01:00").as_deref(), Some("2019-10-24T00:00:00+01:00"));
/// assert_eq!(format_date("2019-10-24Z").as_deref(), Some("2019-10-24T00:00:00Z"));
/// assert_eq!(format_date("24/10/2019"), None);
/// ```
#[must_use]
pub fn format_date(text: &str) -> Option<String> {
    if let Some(caps) = DATE_TIME_PATTERN.captures(text.trim()) {
        return format_date_time(caps.get(1)?.as_str(), caps.get(2)?.as_str());
    }
    let (date, offset) = parse_date(text)?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    to_rfc3339(date, midnight, parse_offset(offset)?)
}

/// Format an eForms date as the end of that day.
///
/// # Examples
/// ```
/// use eforms_ocds::format::format_end_date;
///
/// assert_eq!(format_end_date("2020-03-31+02:00").as_deref(), Some("2020-03-31T23:59:59+02:00"));
/// ```
#[must_use]
pub fn format_end_date(text: &str) -> Option<String> {
    let (date, offset) = parse_date(text)?;
    let end = NaiveTime::from_hms_opt(23, 59, 59)?;
    to_rfc3339(date, end, parse_offset(offset)?)
}

/// Combine an eForms date and time into one date-time.
///
/// The time's offset wins over the date's; with neither, UTC is assumed.
///
/// # Examples
/// ```
/// use eforms_ocds::format::format_date_time;
///
/// assert_eq!(
///     format_date_time("2019-11-15+01:00", "14:00:00+01:00").as_deref(),
///     Some("2019-11-15T14:00:00+01:00")
/// );
/// assert_eq!(
///     format_date_time("2019-11-15", "10:00").as_deref(),
///     Some("2019-11-15T10:00:00Z")
/// );
/// ```
#[must_use]
pub fn format_date_time(date: &str, time: &str) -> Option<String> {
    let (date, date_offset) = parse_date(date)?;
    let (time, time_offset) = parse_time(time)?;
    let offset = parse_offset(time_offset.or(date_offset))?;
    to_rfc3339(date, time, offset)
}

/// Parse a monetary or other decimal amount.
///
/// Whitespace is ignored. A comma is read as the decimal separator only
/// when it is the sole separator and is followed by one or two digits;
/// grouped values such as `1,000` are rejected.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use eforms_ocds::format::parse_decimal;
///
/// assert_eq!(parse_decimal("1 250,50"), Some(Decimal::new(125050, 2)));
/// assert_eq!(parse_decimal("1,000"), None);
/// ```
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let mut cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.contains(',') {
        if cleaned.contains('.') || !DECIMAL_COMMA_PATTERN.is_match(&cleaned) {
            return None;
        }
        cleaned = cleaned.replace(',', ".");
    }
    cleaned.parse::<Decimal>().ok()
}

/// Write a decimal as a JSON number.
///
/// Integral values become JSON integers; other values are written from
/// their shortest decimal representation.
#[must_use]
pub fn decimal_number(value: Decimal) -> Option<Value> {
    let value = value.normalize();
    if value.scale() == 0 {
        if let Some(integer) = value.to_i64() {
            return Some(Value::Number(integer.into()));
        }
        if let Some(integer) = value.to_u64() {
            return Some(Value::Number(integer.into()));
        }
    }
    value
        .to_string()
        .parse::<Number>()
        .ok()
        .map(Value::Number)
}

/// Parse a monetary or other decimal amount into a JSON number.
///
/// Integers stay integers.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use eforms_ocds::format::parse_number;
///
/// assert_eq!(parse_number("250000"), Some(json!(250000)));
/// assert_eq!(parse_number("1 250,50"), Some(json!(1250.5)));
/// assert_eq!(parse_number("n/a"), None);
/// ```
#[must_use]
pub fn parse_number(text: &str) -> Option<Value> {
    parse_decimal(text).and_then(decimal_number)
}

/// Parse an integer count.
#[must_use]
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Parse an eForms indicator (`true`/`false`, `1`/`0`).
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Express a duration in days.
///
/// # Examples
/// ```
/// use eforms_ocds::format::duration_in_days;
///
/// assert_eq!(duration_in_days("3", "MONTH"), Some(90));
/// assert_eq!(duration_in_days("2", "WEEK"), Some(14));
/// assert_eq!(duration_in_days("2", "FORTNIGHT"), None);
/// ```
#[must_use]
pub fn duration_in_days(value: &str, unit: &str) -> Option<i64> {
    let amount = parse_integer(value)?;
    let days = DAYS_PER_UNIT
        .iter()
        .find(|(u, _)| u.eq_ignore_ascii_case(unit.trim()))
        .map(|(_, days)| *days)?;
    amount.checked_mul(days)
}
