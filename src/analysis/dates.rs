//! Document date parsing and timeline bucket keys.
//!
//! Sales notes carry their date as `D/M/YY` text. [`parse_doc_date`] is the
//! only place that interprets it; every date-dependent aggregation goes
//! through it.

use crate::models::Granularity;
use chrono::{Datelike, Days, NaiveDate};

/// Parse a `D/M/YY` document date (year is `2000 + YY`).
///
/// Each segment is read as a base-10 integer from its leading digits, so
/// `"05"`, `" 5"` and `"5x"` all read as 5. Day or month values past the end
/// of their unit roll over into the next month/year (`31/02/24` is
/// 2024-03-02). Returns `None` for empty input, anything that isn't exactly
/// three slash-separated parts, a zero or non-numeric day/month, or a
/// non-numeric year.
pub fn parse_doc_date(date_str: &str) -> Option<NaiveDate> {
    if date_str.is_empty() {
        return None;
    }

    let parts: Vec<&str> = date_str.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let day = parse_leading_int(parts[0]).filter(|d| *d != 0)?;
    let month = parse_leading_int(parts[1]).filter(|m| *m != 0)?;
    let year = parse_leading_int(parts[2])?;

    calendar_date(year.checked_add(2000)?, month, day)
}

/// Read an optionally signed integer from the start of `segment`.
fn parse_leading_int(segment: &str) -> Option<i64> {
    let trimmed = segment.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Build a date from possibly out-of-range month/day values by rolling over.
fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let month_index = month.checked_sub(1)?;
    let year = year.checked_add(month_index.div_euclid(12))?;
    let month = (month_index.rem_euclid(12) + 1) as u32;

    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, 1)?;
    let offset = day.checked_sub(1)?;

    if offset >= 0 {
        first.checked_add_days(Days::new(offset as u64))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

/// Timeline bucket label for a note date.
///
/// Week buckets restart with each month: days 1-7 are `W1`, 8-14 `W2`, and
/// so on, so the tail of one month never shares a bucket with the next.
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => date.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let week = (date.day() - 1) / 7 + 1;
            format!("{}-{}-W{}", date.year(), date.month(), week)
        }
        Granularity::Month => format!("{}-{}", date.year(), date.month()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_doc_date() {
        assert_eq!(parse_doc_date("15/03/24"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_doc_date("1/1/0"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_doc_date("7/12/99"), Some(ymd(2099, 12, 7)));
    }

    #[test]
    fn test_parse_doc_date_rejects() {
        assert_eq!(parse_doc_date(""), None);
        assert_eq!(parse_doc_date("bad"), None);
        assert_eq!(parse_doc_date("15/03"), None);
        assert_eq!(parse_doc_date("15/03/24/1"), None);
        assert_eq!(parse_doc_date("0/03/24"), None);
        assert_eq!(parse_doc_date("15/0/24"), None);
        assert_eq!(parse_doc_date("15/03/xx"), None);
        assert_eq!(parse_doc_date("aa/03/24"), None);
        assert_eq!(parse_doc_date("2024-03-15"), None);
    }

    #[test]
    fn test_parse_doc_date_is_permissive() {
        assert_eq!(parse_doc_date(" 5/ 3/24"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_doc_date("05x/03/24 "), Some(ymd(2024, 3, 5)));
        // rollover like a calendar constructor
        assert_eq!(parse_doc_date("31/02/24"), Some(ymd(2024, 3, 2)));
        assert_eq!(parse_doc_date("1/13/24"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_doc_date("-1/03/24"), Some(ymd(2024, 2, 28)));
    }

    #[test]
    fn test_bucket_keys() {
        let date = ymd(2024, 3, 15);
        assert_eq!(bucket_key(date, Granularity::Day), "2024-03-15");
        assert_eq!(bucket_key(date, Granularity::Week), "2024-3-W3");
        assert_eq!(bucket_key(date, Granularity::Month), "2024-3");

        assert_eq!(bucket_key(ymd(2024, 3, 7), Granularity::Week), "2024-3-W1");
        assert_eq!(bucket_key(ymd(2024, 3, 8), Granularity::Week), "2024-3-W2");
        assert_eq!(bucket_key(ymd(2024, 3, 31), Granularity::Week), "2024-3-W5");
        assert_eq!(bucket_key(ymd(2024, 4, 1), Granularity::Week), "2024-4-W1");
    }
}
