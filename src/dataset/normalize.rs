// src/dataset/normalize.rs

use chrono::{NaiveDate, SecondsFormat};
use thiserror::Error;

use super::record::Record;

/// Column shifted by the normalizer.
pub const DATE_COLUMN: &str = "date";

/// Accepted calendar-date layouts. `%m/%d/%Y` is what the aggregate dataset uses.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// How the shifted date is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    DateOnly,
    /// `YYYY-MM-DDT00:00:00.000Z`
    IsoInstant,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unparseable date {0:?}")]
pub struct DateFormatError(pub String);

/// Parse the calendar-date part of `raw`, ignoring any time-of-day suffix.
/// Dates are UTC calendar dates; no local timezone is involved.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let date_part = s.split(['T', ' ']).next().unwrap_or_default();
    if date_part.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Shift `raw` forward one calendar day and render it as `format`.
///
/// The upstream pipeline that produced the CSVs stamps every row one day early;
/// this is the correction for it.
pub fn shift_date(raw: &str, format: DateFormat) -> Result<String, DateFormatError> {
    let next = parse_calendar_date(raw)
        .and_then(|d| d.succ_opt())
        .ok_or_else(|| DateFormatError(raw.to_string()))?;

    Ok(match format {
        DateFormat::DateOnly => next.format("%Y-%m-%d").to_string(),
        DateFormat::IsoInstant => next
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DateFormatError(raw.to_string()))?
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Apply the one-day shift to the `date` column; every other field passes through.
pub fn normalize(mut record: Record, format: DateFormat) -> Result<Record, DateFormatError> {
    let raw = record
        .get(DATE_COLUMN)
        .ok_or_else(|| DateFormatError(String::new()))?;
    let shifted = shift_date(raw, format)?;
    record.set(DATE_COLUMN, shifted);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_rollover() {
        assert_eq!(
            shift_date("2023-01-31", DateFormat::DateOnly).unwrap(),
            "2023-02-01"
        );
        assert_eq!(
            shift_date("2023-01-31", DateFormat::IsoInstant).unwrap(),
            "2023-02-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_year_and_leap_boundaries() {
        assert_eq!(
            shift_date("2022-12-31", DateFormat::DateOnly).unwrap(),
            "2023-01-01"
        );
        assert_eq!(
            shift_date("2024-02-28", DateFormat::DateOnly).unwrap(),
            "2024-02-29"
        );
        assert_eq!(
            shift_date("2023-02-28", DateFormat::DateOnly).unwrap(),
            "2023-03-01"
        );
    }

    #[test]
    fn test_alternate_layouts() {
        assert_eq!(
            shift_date("1/31/2023", DateFormat::DateOnly).unwrap(),
            "2023-02-01"
        );
        assert_eq!(
            shift_date("2023/06/14", DateFormat::DateOnly).unwrap(),
            "2023-06-15"
        );
        assert_eq!(
            shift_date(" 2023-06-14T00:00:00.000Z ", DateFormat::DateOnly).unwrap(),
            "2023-06-15"
        );
        assert_eq!(
            shift_date("2023-06-14 23:59:59", DateFormat::IsoInstant).unwrap(),
            "2023-06-15T00:00:00.000Z"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "   ", "not-a-date", "2023-02-30", "2023-13-01"] {
            assert_eq!(
                shift_date(bad, DateFormat::DateOnly),
                Err(DateFormatError(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_passes_other_fields_through() {
        let rec = Record::from_row(
            ["date", "total", "ratio", "filter", "remove"],
            ["2023-01-31", "120", "0.25", " 30", "x"],
        );
        let out = normalize(rec, DateFormat::DateOnly).unwrap();
        assert_eq!(out.get("date"), Some("2023-02-01"));
        assert_eq!(out.get("total"), Some("120"));
        assert_eq!(out.get("filter"), Some(" 30"));
        assert_eq!(out.get("remove"), Some("x"));
    }

    #[test]
    fn test_normalize_without_date_column_fails() {
        let rec = Record::from_row(["total"], ["1"]);
        assert!(normalize(rec, DateFormat::IsoInstant).is_err());
    }
}
