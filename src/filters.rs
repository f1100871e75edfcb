// Date-window filters over dated records.
//
// The dashboard offers three time filters: the Thai "seven dangerous days"
// New Year window, a recent-years cutoff, and a free start/end date range.
// All three are stable filters: survivors keep their input order and the
// input collection is never mutated.
use crate::util::parse_date_safe;
use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt;

/// The dangerous-days window opens on December 20...
pub const DANGEROUS_DAYS_START: (u32, u32) = (12, 20);
/// ...and closes on January 7, inclusive.
pub const DANGEROUS_DAYS_END: (u32, u32) = (1, 7);
/// Cutoff year for the recent-years filter.
pub const RECENT_YEARS_MIN: i32 = 2022;

/// A record's date field, either already parsed or still raw CSV text.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Date(NaiveDate),
    Text(&'a str),
}

/// Access to a named date field on a record.
///
/// Cleaned records hand back an already-parsed `NaiveDate`; raw rows hand
/// back text that the filter parses (and rejects loudly if malformed).
pub trait DateSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A record's date field could not be resolved to a calendar date.
///
/// This is the only failure mode of the filters and it is surfaced to the
/// caller rather than silently dropping rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    MissingField { field: String },
    UnparseableDate { field: String, value: String },
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormatError::MissingField { field } => {
                write!(f, "record has no field named '{}'", field)
            }
            DataFormatError::UnparseableDate { field, value } => {
                write!(f, "field '{}' holds '{}', which is not a YYYY-MM-DD date", field, value)
            }
        }
    }
}

impl Error for DataFormatError {}

fn resolve_date<R: DateSource>(record: &R, field: &str) -> Result<NaiveDate, DataFormatError> {
    match record.field(field) {
        None => Err(DataFormatError::MissingField {
            field: field.to_string(),
        }),
        Some(FieldValue::Date(d)) => Ok(d),
        Some(FieldValue::Text(s)) => {
            parse_date_safe(Some(s)).ok_or_else(|| DataFormatError::UnparseableDate {
                field: field.to_string(),
                value: s.to_string(),
            })
        }
    }
}

fn retain_by_date<R, P>(records: &[R], field: &str, pred: P) -> Result<Vec<R>, DataFormatError>
where
    R: DateSource + Clone,
    P: Fn(NaiveDate) -> bool,
{
    let mut kept = Vec::new();
    for r in records {
        if pred(resolve_date(r, field)?) {
            kept.push(r.clone());
        }
    }
    Ok(kept)
}

/// True for dates inside the New Year dangerous-days window.
///
/// The window is static and spans the year boundary, so it matches late
/// December and early January of every year present in the data.
pub fn in_dangerous_days(date: NaiveDate) -> bool {
    let (m, d) = (date.month(), date.day());
    (m == DANGEROUS_DAYS_START.0 && d >= DANGEROUS_DAYS_START.1)
        || (m == DANGEROUS_DAYS_END.0 && d <= DANGEROUS_DAYS_END.1)
}

/// Keep only records dated within the dangerous-days window (Dec 20 - Jan 7).
pub fn filter_dangerous_days<R>(records: &[R], date_field: &str) -> Result<Vec<R>, DataFormatError>
where
    R: DateSource + Clone,
{
    retain_by_date(records, date_field, in_dangerous_days)
}

/// Keep only records dated 2022 or later.
pub fn filter_recent_years<R>(records: &[R], date_field: &str) -> Result<Vec<R>, DataFormatError>
where
    R: DateSource + Clone,
{
    retain_by_date(records, date_field, |d| d.year() >= RECENT_YEARS_MIN)
}

/// Keep only records dated within `start..=end`.
pub fn filter_date_range<R>(
    records: &[R],
    date_field: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<R>, DataFormatError>
where
    R: DateSource + Clone,
{
    retain_by_date(records, date_field, |d| d >= start && d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A raw row whose date field is still unparsed CSV text.
    #[derive(Debug, Clone)]
    struct RawRow {
        adate: Option<String>,
    }

    impl DateSource for RawRow {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "adate" => self.adate.as_deref().map(FieldValue::Text),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct DatedRow {
        adate: NaiveDate,
        label: &'static str,
    }

    impl DateSource for DatedRow {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            (name == "adate").then_some(FieldValue::Date(self.adate))
        }
    }

    fn row(y: i32, m: u32, d: u32, label: &'static str) -> DatedRow {
        DatedRow {
            adate: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            label,
        }
    }

    fn sample() -> Vec<DatedRow> {
        vec![
            row(2025, 12, 25, "christmas"),
            row(2025, 6, 15, "midyear"),
            row(2026, 1, 3, "new year"),
            row(2021, 12, 31, "old new year eve"),
        ]
    }

    #[test]
    fn dangerous_days_window_edges() {
        let cases: Vec<(bool, (i32, u32, u32))> = vec![
            (true, (2025, 12, 20)),
            (true, (2025, 12, 31)),
            (true, (2026, 1, 1)),
            (true, (2026, 1, 7)),
            (false, (2025, 12, 19)),
            (false, (2026, 1, 8)),
            (false, (2025, 6, 15)),
            // The window repeats in every year, not just one winter.
            (true, (1999, 12, 24)),
            (true, (2031, 1, 2)),
        ];
        for (expected, (y, m, d)) in cases {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            assert_eq!(in_dangerous_days(date), expected, "{date}");
        }
    }

    #[test]
    fn dangerous_days_keeps_order_and_subset() {
        let rows = sample();
        let kept = filter_dangerous_days(&rows, "adate").unwrap();
        let labels: Vec<_> = kept.iter().map(|r| r.label).collect();
        // Dec 31 of 2021 survives too: the window repeats every year.
        assert_eq!(labels, vec!["christmas", "new year", "old new year eve"]);
        for r in &kept {
            assert!(in_dangerous_days(r.adate));
        }
        for r in rows.iter().filter(|r| !kept.contains(*r)) {
            assert!(!in_dangerous_days(r.adate));
        }
    }

    #[test]
    fn dangerous_days_is_idempotent() {
        let rows = sample();
        let once = filter_dangerous_days(&rows, "adate").unwrap();
        let twice = filter_dangerous_days(&once, "adate").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn recent_years_cutoff() {
        let rows = sample();
        let kept = filter_recent_years(&rows, "adate").unwrap();
        let labels: Vec<_> = kept.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["christmas", "midyear", "new year"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let rows = sample();
        let start = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let kept = filter_date_range(&rows, "adate", start, end).unwrap();
        let labels: Vec<_> = kept.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["christmas", "midyear"]);
    }

    #[test]
    fn input_is_untouched() {
        let rows = sample();
        let before = rows.clone();
        let _ = filter_dangerous_days(&rows, "adate").unwrap();
        assert_eq!(rows, before);
    }

    #[test]
    fn text_dates_parse() {
        let rows = vec![
            RawRow { adate: Some("2025-12-29".into()) },
            RawRow { adate: Some("2025-11-03".into()) },
        ];
        let kept = filter_dangerous_days(&rows, "adate").unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].adate.as_deref(), Some("2025-12-29"));
    }

    #[test]
    fn missing_field_is_an_error() {
        let rows = sample();
        let err = filter_dangerous_days(&rows, "accident_date").unwrap_err();
        assert_eq!(
            err,
            DataFormatError::MissingField {
                field: "accident_date".to_string()
            }
        );
    }

    #[test]
    fn unparseable_date_is_an_error() {
        let rows = vec![RawRow { adate: Some("25/12/2025".into()) }];
        let err = filter_recent_years(&rows, "adate").unwrap_err();
        assert_eq!(
            err,
            DataFormatError::UnparseableDate {
                field: "adate".to_string(),
                value: "25/12/2025".to_string(),
            }
        );
    }
}
