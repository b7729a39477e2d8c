//! Display formatting for cell values.
//!
//! Formatting never fails. A value that can't be read as a number shows up as
//! `NaN` in the output, and a value that can't be read as a date shows up as
//! `Invalid Date`. Nothing is validated at write time, so whatever the user
//! typed is what gets formatted here.
//!
//! Output follows en-US conventions: `,` grouping, `.` decimal point,
//! `M/D/YYYY` dates, USD currency.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

use crate::cell::FormatKind;

/// Shown for values that aren't dates.
pub const INVALID_DATE: &str = "Invalid Date";

/// Largest number of fraction digits the plain number format keeps.
const NUMBER_MAX_FRACTION: usize = 3;

/// Magnitude at which fixed-point percentages switch to exponential notation.
const FIXED_LIMIT: f64 = 1e21;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
];

/// Format a raw cell value for display.
pub fn format_value(value: &str, kind: FormatKind) -> String {
    if value.is_empty() {
        return String::new();
    }

    match kind {
        FormatKind::Number => format_number(to_number(value)),
        FormatKind::Currency => format_currency(to_number(value)),
        FormatKind::Percentage => format_percentage(to_number(value)),
        FormatKind::Date => match parse_date(value) {
            Some(date) => format_date(date),
            None => INVALID_DATE.to_string(),
        },
        FormatKind::Text => value.to_string(),
    }
}

/// Read a string as a number. Anything unreadable is NaN.
///
/// Surrounding whitespace is ignored and an all-whitespace string is zero.
/// Accepts signed decimal literals with optional fraction and exponent,
/// `0x`/`0o`/`0b` integers and `Infinity` with an optional sign.
pub fn to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }

    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(n) = parse_prefixed_integer(t) {
        return n;
    }

    if is_decimal_literal(t) {
        t.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// `0x1F`, `0o17`, `0b101`. Returns None when there's no radix prefix.
fn parse_prefixed_integer(t: &str) -> Option<f64> {
    let (radix, digits) = match t.get(..2) {
        Some("0x") | Some("0X") => (16, &t[2..]),
        Some("0o") | Some("0O") => (8, &t[2..]),
        Some("0b") | Some("0B") => (2, &t[2..]),
        _ => return None,
    };

    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let mut acc = 0.0f64;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => acc = acc * radix as f64 + d as f64,
            None => return Some(f64::NAN),
        }
    }
    Some(acc)
}

/// `[+-] digits [. digits] [(e|E) [+-] digits]`, with at least one mantissa digit.
fn is_decimal_literal(t: &str) -> bool {
    let bytes = t.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Insert `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round a plain decimal string (no sign, no exponent) to exactly `frac`
/// fraction digits, with halves going away from zero.
fn round_half_up(decimal: &str, frac: usize) -> String {
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal, ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(frac))
        .collect();

    if frac_part.as_bytes().get(frac).is_some_and(|d| *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - frac;
    let int_str: String = digits[..split].iter().map(|&b| b as char).collect();
    let frac_str: String = digits[split..].iter().map(|&b| b as char).collect();
    if frac == 0 {
        int_str
    } else {
        format!("{}.{}", int_str, frac_str)
    }
}

/// Whether `x` lies exactly halfway between two `frac`-digit decimals.
///
/// A binary double can only do that as an odd multiple of 2^-(frac+1), and
/// scaling by a power of two is exact.
fn is_exact_tie(x: f64, frac: i32) -> bool {
    let scaled = x.abs() * 2f64.powi(frac + 1);
    scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

/// Grouped decimal with up to three fraction digits: `1234.5` -> `1,234.5`.
///
/// Rounds the shortest decimal form of the value, halves away from zero,
/// so `0.0625` shows as `0.063`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    let sign = if n.is_sign_negative() { "-" } else { "" };
    if n.is_infinite() {
        return format!("{}∞", sign);
    }

    let fixed = round_half_up(&n.abs().to_string(), NUMBER_MAX_FRACTION);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

/// USD with two decimals: `-1234` -> `-$1,234.00`. Rounds like `format_number`.
pub fn format_currency(n: f64) -> String {
    if n.is_nan() {
        return "$NaN".to_string();
    }
    let sign = if n.is_sign_negative() { "-" } else { "" };
    if n.is_infinite() {
        return format!("{}$∞", sign);
    }

    let fixed = round_half_up(&n.abs().to_string(), 2);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

/// The value as a fraction, times 100, fixed to two places: `0.5` -> `50.00%`.
pub fn format_percentage(n: f64) -> String {
    format!("{}%", to_fixed_2(n * 100.0))
}

/// Fixed-point with two decimals. Non-finite and very large values use the
/// plain number-to-string form instead (`NaN`, `Infinity`, `1e+21`).
/// Rounding works on the exact binary value: `0.125` is a true half and goes
/// up to `0.13`, while `1.005` is slightly below its half and goes to `1.00`.
fn to_fixed_2(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if x.abs() >= FIXED_LIMIT {
        return exponential(x);
    }

    // Negative zero prints without a sign
    let sign = if x < 0.0 { "-" } else { "" };
    if is_exact_tie(x, 2) {
        // An exact half has a short, exact decimal form
        format!("{}{}", sign, round_half_up(&x.abs().to_string(), 2))
    } else {
        format!("{}{:.2}", sign, x.abs())
    }
}

/// Shortest round-trip exponential form with an explicit exponent sign.
fn exponential(x: f64) -> String {
    let s = format!("{:e}", x);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Read a string as a calendar date.
///
/// Timestamps with an offset are converted to the local date; everything
/// else is taken at face value with no time-zone shift.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(t, fmt) {
            return Some(date);
        }
    }

    parse_year_month(t)
}

/// `YYYY` (January 1) or `YYYY-MM` (first of the month).
fn parse_year_month(t: &str) -> Option<NaiveDate> {
    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    let (year, month) = match t.split_once('-') {
        Some((y, m)) if all_digits(y, 4) && all_digits(m, 2) => (y, m.parse().ok()?),
        None if all_digits(t, 4) => (t, 1),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

/// `M/D/YYYY` without zero padding.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_formats_to_empty() {
        for kind in FormatKind::ALL {
            assert_eq!(format_value("", kind), "");
        }
    }

    #[test]
    fn text_passes_through() {
        assert_eq!(format_value("hello", FormatKind::Text), "hello");
        assert_eq!(format_value("  1234  ", FormatKind::Text), "  1234  ");
    }

    #[test]
    fn number_groups_and_trims() {
        assert_eq!(format_value("1234.5", FormatKind::Number), "1,234.5");
        assert_eq!(format_value("1000000", FormatKind::Number), "1,000,000");
        assert_eq!(format_value("999", FormatKind::Number), "999");
        assert_eq!(format_value("0.1234", FormatKind::Number), "0.123");
        assert_eq!(format_value("-98765.4321", FormatKind::Number), "-98,765.432");
        assert_eq!(format_value("1e3", FormatKind::Number), "1,000");
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(format_value("0.0625", FormatKind::Number), "0.063");
        assert_eq!(format_value("-0.0625", FormatKind::Number), "-0.063");
        assert_eq!(format_value("2.0005", FormatKind::Number), "2.001");
        assert_eq!(format_value("999.9995", FormatKind::Number), "1,000");
        assert_eq!(format_value("0.125", FormatKind::Currency), "$0.13");
        assert_eq!(format_value("-2.675", FormatKind::Currency), "-$2.68");
        assert_eq!(format_value("0.00125", FormatKind::Percentage), "0.13%");
        assert_eq!(format_value("-0.00125", FormatKind::Percentage), "-0.13%");
    }

    #[test]
    fn percentage_rounds_binary_value() {
        // 1.005 is stored just below the half
        assert_eq!(to_fixed_2(1.005), "1.00");
        assert_eq!(to_fixed_2(0.375), "0.38");
        assert_eq!(to_fixed_2(0.5), "0.50");
    }

    #[test]
    fn round_half_up_carries() {
        assert_eq!(round_half_up("9.995", 2), "10.00");
        assert_eq!(round_half_up("0.994", 2), "0.99");
        assert_eq!(round_half_up("12", 2), "12.00");
        assert_eq!(round_half_up("0.5", 0), "1");
    }

    #[test]
    fn exact_ties() {
        assert!(is_exact_tie(0.125, 2));
        assert!(is_exact_tie(0.0625, 3));
        assert!(!is_exact_tie(0.5, 2));
        assert!(!is_exact_tie(1.005, 2));
    }

    #[test]
    fn number_garbage_is_nan() {
        assert_eq!(format_value("abc", FormatKind::Number), "NaN");
        assert_eq!(format_value("12abc", FormatKind::Number), "NaN");
        assert_eq!(format_value("1,000", FormatKind::Number), "NaN");
        assert_eq!(format_value("inf", FormatKind::Number), "NaN");
        assert_eq!(format_value("nan", FormatKind::Number), "NaN");
    }

    #[test]
    fn number_whitespace_only_is_zero() {
        assert_eq!(format_value("   ", FormatKind::Number), "0");
    }

    #[test]
    fn currency_usd() {
        let s = format_value("1234", FormatKind::Currency);
        assert!(s.contains('$'));
        assert_eq!(s, "$1,234.00");
        assert_eq!(format_value("-1234.567", FormatKind::Currency), "-$1,234.57");
        assert_eq!(format_value("0.5", FormatKind::Currency), "$0.50");
        assert_eq!(format_value("oops", FormatKind::Currency), "$NaN");
    }

    #[test]
    fn percentage_fixed_two() {
        assert_eq!(format_value("0.5", FormatKind::Percentage), "50.00%");
        assert_eq!(format_value("1", FormatKind::Percentage), "100.00%");
        assert_eq!(format_value("-0.125", FormatKind::Percentage), "-12.50%");
        assert_eq!(format_value("12.5", FormatKind::Percentage), "1250.00%");
        assert_eq!(format_value("half", FormatKind::Percentage), "NaN%");
        assert_eq!(format_value("-0", FormatKind::Percentage), "0.00%");
        assert_eq!(format_value("1e19", FormatKind::Percentage), "1e+21%");
        assert_eq!(format_value("Infinity", FormatKind::Percentage), "Infinity%");
    }

    #[test]
    fn date_calendar_formats() {
        assert_eq!(format_value("2024-03-05", FormatKind::Date), "3/5/2024");
        assert_eq!(format_value("2024/12/31", FormatKind::Date), "12/31/2024");
        assert_eq!(format_value("07/04/1999", FormatKind::Date), "7/4/1999");
        assert_eq!(format_value("March 5, 2024", FormatKind::Date), "3/5/2024");
        assert_eq!(format_value("Mar 5 2024", FormatKind::Date), "3/5/2024");
        assert_eq!(format_value("2024-03-05T23:30", FormatKind::Date), "3/5/2024");
    }

    #[test]
    fn date_year_and_month_only() {
        assert_eq!(format_value("2024", FormatKind::Date), "1/1/2024");
        assert_eq!(format_value("2024-03", FormatKind::Date), "3/1/2024");
        assert_eq!(format_value("2024-13", FormatKind::Date), INVALID_DATE);
        assert_eq!(format_value("2024-3", FormatKind::Date), INVALID_DATE);
        assert_eq!(format_value("24", FormatKind::Date), INVALID_DATE);
    }

    #[test]
    fn date_with_offset_is_valid() {
        let s = format_value("2024-03-05T12:00:00Z", FormatKind::Date);
        assert_ne!(s, INVALID_DATE);
        assert!(s.ends_with("/2024"));
    }

    #[test]
    fn date_garbage_is_invalid() {
        assert_eq!(format_value("not a date", FormatKind::Date), INVALID_DATE);
        assert_eq!(format_value("2024-13-45", FormatKind::Date), INVALID_DATE);
    }

    #[test]
    fn to_number_forms() {
        assert_eq!(to_number(" 42 "), 42.0);
        assert_eq!(to_number("+.5"), 0.5);
        assert_eq!(to_number("5."), 5.0);
        assert_eq!(to_number("0x1F"), 31.0);
        assert_eq!(to_number("0b101"), 5.0);
        assert_eq!(to_number("0o17"), 15.0);
        assert_eq!(to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(to_number("-0x10").is_nan());
        assert!(to_number("0x").is_nan());
        assert!(to_number(".").is_nan());
        assert!(to_number("1e").is_nan());
        assert!(to_number("infinity").is_nan());
    }

    #[test]
    fn grouping_boundaries() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn infinities() {
        assert_eq!(format_number(f64::INFINITY), "∞");
        assert_eq!(format_number(f64::NEG_INFINITY), "-∞");
        assert_eq!(format_currency(f64::NEG_INFINITY), "-$∞");
    }
}
