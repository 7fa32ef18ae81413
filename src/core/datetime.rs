//! Date, time and duration parsing for command-line input.
//!
//! All functions take the reference date explicitly so they stay
//! deterministic under test.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};

use crate::error::StudyFlowError;

/// Parse a date expression relative to `today`.
///
/// Supports:
/// - `today`, `tomorrow`, `yesterday`
/// - `monday` .. `sunday` (next occurrence, never today)
/// - `in 3 days`, `in 2 weeks`
/// - `2024-12-15` (ISO format)
///
/// Results must fall in years 1 to 9999.
///
/// # Errors
///
/// Returns `StudyFlowError::Parse` if the input matches none of the above or
/// resolves to a date outside the supported range.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, StudyFlowError> {
    let input = input.trim().to_lowercase();

    let date = match input.as_str() {
        "today" | "tod" => Some(today),
        "tomorrow" | "tom" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        other => parse_relative(other, today)?,
    };

    let date = match date {
        Some(date) => date,
        None => NaiveDate::parse_from_str(&input, "%Y-%m-%d")
            .map_err(|_| StudyFlowError::Parse(format!("Unrecognized date '{input}'")))?,
    };
    supported(date, &input)
}

/// Weekday names and `in N days|weeks`. `Ok(None)` means "not this form".
fn parse_relative(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, StudyFlowError> {
    if let Some(weekday) = parse_weekday(input) {
        return Ok(Some(next_weekday(today, weekday)));
    }

    let Some(rest) = input.strip_prefix("in ") else {
        return Ok(None);
    };
    let mut parts = rest.split_whitespace();
    let amount = parts.next().and_then(|n| n.parse::<i64>().ok());
    let days = match (amount, parts.next().map(|u| u.trim_end_matches('s'))) {
        (Some(n), Some("day")) => Some(n),
        (Some(n), Some("week")) => n.checked_mul(7),
        _ => return Ok(None),
    };

    days.and_then(Duration::try_days)
        .and_then(|delta| today.checked_add_signed(delta))
        .map(Some)
        .ok_or_else(|| out_of_range(input))
}

fn supported(date: NaiveDate, input: &str) -> Result<NaiveDate, StudyFlowError> {
    if (1..=9999).contains(&date.year()) {
        Ok(date)
    } else {
        Err(out_of_range(input))
    }
}

fn out_of_range(input: &str) -> StudyFlowError {
    StudyFlowError::Parse(format!("Date '{input}' is out of range (years 1 to 9999)"))
}

/// Parse an instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` (interpreted as UTC) or any
/// [`parse_date`] expression, which resolves to `default_time` on that day.
///
/// # Errors
///
/// Returns `StudyFlowError::Parse` if the input cannot be parsed.
pub fn parse_datetime(
    input: &str,
    today: NaiveDate,
    default_time: NaiveTime,
) -> Result<DateTime<Utc>, StudyFlowError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        let dt = dt.with_timezone(&Utc);
        supported(dt.date_naive(), trimmed)?;
        return Ok(dt);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        supported(naive.date(), trimmed)?;
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let date = parse_date(trimmed, today)?;
    Ok(Utc.from_utc_datetime(&date.and_time(default_time)))
}

/// Parse a study duration like `45`, `25m`, `1h30m` into whole minutes.
///
/// A bare number means minutes. Seconds are not accepted.
///
/// # Errors
///
/// Returns `StudyFlowError::Parse` on an unknown unit or an empty duration.
pub fn parse_duration_minutes(input: &str) -> Result<u32, StudyFlowError> {
    let s = input.trim().to_lowercase();
    let invalid = || StudyFlowError::Parse(format!("Invalid duration '{input}'"));

    if let Ok(minutes) = s.parse::<u32>() {
        return Ok(minutes);
    }

    let mut total: u32 = 0;
    let mut current = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current.push(c);
            continue;
        }
        if current.is_empty() {
            return Err(invalid());
        }
        let n: u32 = current.parse().map_err(|_| invalid())?;
        current.clear();

        let add = match c {
            'h' => n.checked_mul(60),
            'm' => Some(n),
            _ => None,
        }
        .ok_or_else(invalid)?;
        total = total.checked_add(add).ok_or_else(invalid)?;
    }

    // Trailing number without unit
    if !current.is_empty() {
        let n: u32 = current.parse().map_err(|_| invalid())?;
        total = total.checked_add(n).ok_or_else(invalid)?;
    }

    if total == 0 {
        Err(invalid())
    } else {
        Ok(total)
    }
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_weekday(from: NaiveDate, target: Weekday) -> NaiveDate {
    let current = i64::from(from.weekday().num_days_from_monday());
    let wanted = i64::from(target.num_days_from_monday());
    let mut diff = wanted - current;
    if diff <= 0 {
        diff += 7;
    }
    from + Duration::days(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_relative_dates() {
        let today = d(2024, 3, 6); // Wednesday
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("Tomorrow", today).unwrap(), d(2024, 3, 7));
        assert_eq!(parse_date("yesterday", today).unwrap(), d(2024, 3, 5));
        assert_eq!(parse_date("in 3 days", today).unwrap(), d(2024, 3, 9));
        assert_eq!(parse_date("in 2 weeks", today).unwrap(), d(2024, 3, 20));
    }

    #[test]
    fn test_parse_weekday_is_next_occurrence() {
        let today = d(2024, 3, 6); // Wednesday
        assert_eq!(parse_date("friday", today).unwrap(), d(2024, 3, 8));
        assert_eq!(parse_date("wed", today).unwrap(), d(2024, 3, 13));
        assert_eq!(parse_date("monday", today).unwrap(), d(2024, 3, 11));
    }

    #[test]
    fn test_parse_iso_and_garbage() {
        let today = d(2024, 3, 6);
        assert_eq!(parse_date("2024-12-15", today).unwrap(), d(2024, 12, 15));
        assert!(matches!(parse_date("someday", today), Err(StudyFlowError::Parse(_))));
    }

    #[test]
    fn test_parse_huge_offsets_rejected() {
        let today = d(2024, 3, 6);
        for input in ["in 999999999 days", "in 999999999 weeks", "in -999999999 days", "in 9223372036854775807 weeks"] {
            assert!(
                matches!(parse_date(input, today), Err(StudyFlowError::Parse(_))),
                "{input} should be rejected"
            );
        }
        // Representable in chrono but past year 9999
        assert!(parse_date("in 3000000 days", today).is_err());
        assert!(parse_datetime("in 999999999 days", today, NaiveTime::MIN).is_err());
        assert!(parse_date("0000-06-01", today).is_err());
    }

    #[test]
    fn test_parse_old_dates_accepted() {
        let today = d(2024, 3, 6);
        assert_eq!(parse_date("1965-01-01", today).unwrap(), d(1965, 1, 1));
        assert_eq!(parse_date("in -2 days", today).unwrap(), d(2024, 3, 4));
    }

    #[test]
    fn test_parse_datetime_forms() {
        let today = d(2024, 3, 6);
        let eod = NaiveTime::from_hms_opt(23, 59, 0).unwrap();

        let rfc = parse_datetime("2024-03-10T08:30:00Z", today, eod).unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap());

        let spaced = parse_datetime("2024-03-10 14:15", today, eod).unwrap();
        assert_eq!(spaced, Utc.with_ymd_and_hms(2024, 3, 10, 14, 15, 0).unwrap());

        let date_only = parse_datetime("tomorrow", today, eod).unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap());
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration_minutes("45").unwrap(), 45);
        assert_eq!(parse_duration_minutes("25m").unwrap(), 25);
        assert_eq!(parse_duration_minutes("1h").unwrap(), 60);
        assert_eq!(parse_duration_minutes("1h30m").unwrap(), 90);
        assert_eq!(parse_duration_minutes("2h15").unwrap(), 135);
        assert!(parse_duration_minutes("").is_err());
        assert!(parse_duration_minutes("0").is_ok());
        assert!(parse_duration_minutes("10s").is_err());
        assert!(parse_duration_minutes("-5").is_err());
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(d(2024, 3, 6)), d(2024, 3, 4));
        assert_eq!(week_start(d(2024, 3, 4)), d(2024, 3, 4));
        assert_eq!(week_start(d(2024, 3, 10)), d(2024, 3, 4));
    }
}
