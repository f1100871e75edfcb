// Utility helpers for parsing, code normalization, and basic statistics.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Sentinel district code for missing or unparseable values.
pub const UNKNOWN_DISTRICT: &str = "99";

/// Canonicalize a raw amphoe (district) code into a two-digit string.
///
/// The upstream forecast CSV carries district codes in whatever shape the
/// source system exported them: integers, floats (`"3.0"`), padded strings,
/// stray whitespace, and the occasional alphabetic junk code (`"LA"`).
/// Everything is mapped to a zero-padded decimal string:
///
/// - missing, empty, or whitespace-only values become `"99"`;
/// - numeric values are truncated toward zero and formatted to at least
///   two digits (codes >= 100 keep all their digits);
/// - anything that does not parse as a number becomes `"99"`.
///
/// Total by construction: never fails, always returns >= 2 characters.
pub fn normalize_district_code(raw: Option<&str>) -> String {
    let Some(s) = raw else {
        return UNKNOWN_DISTRICT.to_string();
    };
    let s = s.trim();
    if s.is_empty() {
        return UNKNOWN_DISTRICT.to_string();
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{:02}", v.trunc() as i64),
        _ => UNKNOWN_DISTRICT.to_string(),
    }
}

/// Zero-pad a numeric code to `width` digits, as the coordinate table keys
/// districts by a fixed four-digit `AM_ID`. Returns `None` when the value is
/// missing or not a number.
pub fn zero_pad_code(raw: Option<&str>, width: usize) -> Option<String> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(format!("{:0width$}", v.trunc() as i64, width = width))
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // CSV dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // Median of a list of numbers. We accept `Vec<f64>` by value so the
    // function can sort in-place without cloning at the call site.
    if v.is_empty() {
        return 0.0;
    }
    // Use `partial_cmp` to handle floating-point comparisons and fall back to
    // equality if either side is NaN.
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

pub fn std_dev(v: &[f64]) -> f64 {
    // Sample standard deviation (n - 1 denominator), matching how the
    // dashboard reported spread across district totals. Fewer than two
    // values have no spread.
    if v.len() < 2 {
        return 0.0;
    }
    let mean = average(v);
    let var: f64 = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
    var.sqrt()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_code_pads_small_numbers() {
        // (expected, raw input)
        let cases: Vec<(&str, &str)> = vec![
            ("01", "1"),
            ("07", "  7 "),
            ("03", "3.9"),
            ("00", "0"),
            ("42", "42"),
            ("99", "99"),
            ("105", "105"),
            ("-5", "-5"),
            ("-3", "-3.7"),
        ];
        for (expected, raw) in cases {
            assert_eq!(normalize_district_code(Some(raw)), expected, "raw: {raw:?}");
        }
    }

    #[test]
    fn district_code_falls_back_to_sentinel() {
        for raw in [Some("LA"), Some("MY"), Some(""), Some("   "), Some("1a"), None] {
            assert_eq!(normalize_district_code(raw), UNKNOWN_DISTRICT, "raw: {raw:?}");
        }
    }

    #[test]
    fn district_code_is_total() {
        // Anything at all maps to a string of at least two characters.
        for raw in ["", "x", "999999", "-0.0", "NaN", "๑๒", "12 34"] {
            let out = normalize_district_code(Some(raw));
            assert!(out.len() >= 2, "raw {raw:?} gave {out:?}");
        }
    }

    #[test]
    fn zero_pad_builds_join_keys() {
        assert_eq!(zero_pad_code(Some("101"), 4).as_deref(), Some("0101"));
        assert_eq!(zero_pad_code(Some("1101.0"), 4).as_deref(), Some("1101"));
        assert_eq!(zero_pad_code(Some(" 9 "), 4).as_deref(), Some("0009"));
        assert_eq!(zero_pad_code(Some("abc"), 4), None);
        assert_eq!(zero_pad_code(None, 4), None);
    }

    #[test]
    fn stats_helpers() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[2.0, 4.0]), 3.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(std_dev(&[5.0]), 0.0);
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138).abs() < 0.001);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.5, 1), "-42.5");
        assert_eq!(format_number(7.0, 0), "7");
        assert_eq!(format_int(9855), "9,855");
    }
}
