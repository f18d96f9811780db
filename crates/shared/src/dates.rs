use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

/// Weekday names indexed from Monday.
pub const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Format a date the way the digest shows it, e.g. "2026年2月23日 周一".
pub fn display_date(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    format!(
        "{}年{}月{}日 {}",
        date.year(),
        date.month(),
        date.day(),
        weekday
    )
}

/// Recover the calendar date from a display string. The weekday suffix is ignored.
pub fn parse_display_date(display: &str) -> Result<NaiveDate> {
    let head = display
        .split_whitespace()
        .next()
        .with_context(|| format!("Empty display date: {:?}", display))?;

    let (year, rest) = head
        .split_once('年')
        .with_context(|| format!("Missing year in display date: {:?}", display))?;
    let (month, rest) = rest
        .split_once('月')
        .with_context(|| format!("Missing month in display date: {:?}", display))?;
    let day = rest
        .strip_suffix('日')
        .with_context(|| format!("Missing day in display date: {:?}", display))?;

    let year: i32 = year.trim().parse().context("Invalid year")?;
    let month: u32 = month.trim().parse().context("Invalid month")?;
    let day: u32 = day.trim().parse().context("Invalid day")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("No such date: {}-{}-{}", year, month, day))
}

/// ISO form used for archive file names. Falls back to `today` when the
/// display string cannot be read.
pub fn archive_key(text: &str, today: NaiveDate) -> String {
    let date = match parse_display_date(text) {
        Ok(date) => date,
        Err(e) => {
            tracing::warn!(
                "Could not parse display date {:?} ({:#}); using {}",
                text,
                e,
                today
            );
            today
        }
    };
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_display_date_monday() {
        assert_eq!(display_date(date(2026, 2, 23)), "2026年2月23日 周一");
    }

    #[test]
    fn test_display_date_sunday_and_padding() {
        // No zero padding on month or day
        assert_eq!(display_date(date(2026, 3, 1)), "2026年3月1日 周日");
        assert_eq!(display_date(date(2025, 12, 31)), "2025年12月31日 周三");
    }

    #[test]
    fn test_parse_display_date() {
        assert_eq!(
            parse_display_date("2026年2月23日 周一").unwrap(),
            date(2026, 2, 23)
        );
        assert_eq!(parse_display_date("2026年02月03日").unwrap(), date(2026, 2, 3));
    }

    #[test]
    fn test_parse_display_date_rejects_garbage() {
        assert!(parse_display_date("").is_err());
        assert!(parse_display_date("Monday 23 Feb").is_err());
        assert!(parse_display_date("2026年2月30日 周一").is_err());
    }

    #[test]
    fn test_archive_key_falls_back_to_today() {
        let today = date(2026, 10, 15);
        assert_eq!(archive_key("2026年2月23日 周一", today), "2026-02-23");
        assert_eq!(archive_key("not a date", today), "2026-10-15");
    }
}
