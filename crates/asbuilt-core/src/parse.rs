//! Tolerant value parsers
//!
//! Field values reach the report as loosely formatted text ("2h", "2,5 horas",
//! "85%", "15/01/2024"). None of these parsers fail: malformed input collapses
//! to zero or `None` and the record is still rendered.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a duration in hours.
///
/// Accepts a bare number or a number followed by `h`, `hora` or `horas`
/// (any case, surrounding whitespace allowed). A comma is accepted as the
/// decimal separator. Anything else yields `0.0`.
///
/// ```
/// use asbuilt_core::parse::parse_duration;
///
/// assert_eq!(parse_duration("2h"), 2.0);
/// assert_eq!(parse_duration(" 2.5 Hora "), 2.5);
/// assert_eq!(parse_duration("two hours"), 0.0);
/// ```
pub fn parse_duration(text: &str) -> f64 {
    let lowered = text.trim().to_lowercase();
    let number = lowered
        .strip_suffix("horas")
        .or_else(|| lowered.strip_suffix("hora"))
        .or_else(|| lowered.strip_suffix('h'))
        .unwrap_or(&lowered)
        .trim()
        .replace(',', ".");

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parse a percentage, truncating toward zero.
///
/// ```
/// use asbuilt_core::parse::parse_percentage;
///
/// assert_eq!(parse_percentage("85%"), 85);
/// assert_eq!(parse_percentage("99.9"), 99);
/// assert_eq!(parse_percentage(""), 0);
/// ```
pub fn parse_percentage(text: &str) -> i64 {
    let trimmed = text.trim();
    let number = trimmed
        .strip_suffix('%')
        .unwrap_or(trimmed)
        .trim()
        .replace(',', ".");

    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
        .unwrap_or(0)
}

/// Anything that can be turned into a report date.
///
/// Typed chrono values pass through unchanged; text goes through the
/// ISO-then-day-first fallback of [`parse_date`].
pub trait DateSource {
    fn to_report_date(&self) -> Option<NaiveDate>;
}

impl DateSource for NaiveDate {
    fn to_report_date(&self) -> Option<NaiveDate> {
        Some(*self)
    }
}

impl DateSource for NaiveDateTime {
    fn to_report_date(&self) -> Option<NaiveDate> {
        Some(self.date())
    }
}

impl DateSource for str {
    fn to_report_date(&self) -> Option<NaiveDate> {
        let head = date_head(self.trim());
        if head.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(head, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
            .ok()
    }
}

impl DateSource for String {
    fn to_report_date(&self) -> Option<NaiveDate> {
        self.as_str().to_report_date()
    }
}

impl<T: DateSource + ?Sized> DateSource for &T {
    fn to_report_date(&self) -> Option<NaiveDate> {
        (**self).to_report_date()
    }
}

/// Parse a date from a typed value or from text.
///
/// Text is matched against its first 10 characters, first as `YYYY-MM-DD`
/// and then as `DD/MM/YYYY`.
///
/// ```
/// use asbuilt_core::parse::parse_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
/// assert_eq!(parse_date("2024-01-15T08:30:00"), expected);
/// assert_eq!(parse_date("15/01/2024"), expected);
/// assert_eq!(parse_date("soon"), None);
/// ```
pub fn parse_date<D: DateSource + ?Sized>(value: &D) -> Option<NaiveDate> {
    value.to_report_date()
}

/// Parse a wall-clock time (`HH:MM` or `HH:MM:SS`).
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

/// Parse a date plus an optional time.
///
/// The time comes from `time` when it is non-empty, otherwise from whatever
/// follows the date inside `date` (`2024-01-15T08:30`, `15/01/2024 08:30`).
/// A date without any time resolves to midnight.
pub fn parse_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let day = parse_date(date)?;
    let explicit = parse_time(time);
    let embedded = || {
        let trimmed = date.trim();
        let rest = &trimmed[date_head(trimmed).len()..];
        let rest = rest.trim_start_matches(['T', ' ']);
        let rest = rest
            .split(['Z', '+', '-', '.'])
            .next()
            .unwrap_or_default();
        parse_time(rest)
    };

    match explicit.or_else(embedded) {
        Some(at) => Some(day.and_time(at)),
        None => day.and_hms_opt(0, 0, 0),
    }
}

/// First 10 characters of `text`, respecting char boundaries.
fn date_head(text: &str) -> &str {
    match text.char_indices().nth(10) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn duration_accepts_hour_suffixes() {
        assert_eq!(parse_duration("2h"), 2.0);
        assert_eq!(parse_duration("2H"), 2.0);
        assert_eq!(parse_duration("2.5"), 2.5);
        assert_eq!(parse_duration("  3 hora "), 3.0);
        assert_eq!(parse_duration("4 HORAS"), 4.0);
        assert_eq!(parse_duration("1,5h"), 1.5);
        assert_eq!(parse_duration("45h"), 45.0);
    }

    #[test]
    fn duration_malformed_is_zero() {
        assert_eq!(parse_duration(""), 0.0);
        assert_eq!(parse_duration("   "), 0.0);
        assert_eq!(parse_duration("h"), 0.0);
        assert_eq!(parse_duration("abc"), 0.0);
        assert_eq!(parse_duration("2 days"), 0.0);
        assert_eq!(parse_duration("inf"), 0.0);
        assert_eq!(parse_duration("NaN"), 0.0);
    }

    #[test]
    fn percentage_truncates() {
        assert_eq!(parse_percentage("85%"), 85);
        assert_eq!(parse_percentage("85.9%"), 85);
        assert_eq!(parse_percentage(" 100 % "), 100);
        assert_eq!(parse_percentage("42"), 42);
        assert_eq!(parse_percentage("-3.7"), -3);
    }

    #[test]
    fn percentage_malformed_is_zero() {
        assert_eq!(parse_percentage(""), 0);
        assert_eq!(parse_percentage("%"), 0);
        assert_eq!(parse_percentage("half"), 0);
    }

    #[test]
    fn date_iso_then_day_first() {
        assert_eq!(parse_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T10:00:00.000Z"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("15/01/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("15/01/2024 10:00"), Some(date(2024, 1, 15)));
    }

    #[test]
    fn date_failure_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("01-15-2024"), None);
        assert_eq!(parse_date("ontem"), None);
    }

    #[test]
    fn typed_dates_pass_unchanged() {
        let day = date(2024, 3, 1);
        assert_eq!(parse_date(&day), Some(day));
        let at = day.and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_date(&at), Some(day));
    }

    #[test]
    fn datetime_combines_explicit_time() {
        let parsed = parse_datetime("2024-01-15", "08:30").unwrap();
        assert_eq!(parsed, date(2024, 1, 15).and_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn datetime_reads_embedded_time() {
        let iso = parse_datetime("2024-01-15T16:45:10.000Z", "").unwrap();
        assert_eq!(iso, date(2024, 1, 15).and_hms_opt(16, 45, 10).unwrap());

        let day_first = parse_datetime("15/01/2024 07:05", "").unwrap();
        assert_eq!(day_first, date(2024, 1, 15).and_hms_opt(7, 5, 0).unwrap());
    }

    #[test]
    fn datetime_without_time_is_midnight() {
        let parsed = parse_datetime("15/01/2024", "não sei").unwrap();
        assert_eq!(parsed, date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_datetime("", "08:00"), None);
    }
}
