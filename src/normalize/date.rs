//! Date parsing (§4.1). Tried in order: Excel serial, ISO, US slash/dash, month-name. On any
//! parse failure the original string is returned unchanged — this normalizer never errors, it
//! degrades (§7 `NormalizerFailure`).

use chrono::{Datelike, Duration, NaiveDate};

use crate::pattern_cache::cached;
use crate::trace::ExtractionTrace;

const EXCEL_EPOCH_YEAR: i32 = 1899;
const EXCEL_EPOCH_MONTH: u32 = 12;
const EXCEL_EPOCH_DAY: u32 = 30;
const EXCEL_SERIAL_MIN: i64 = 1;
const EXCEL_SERIAL_MAX: i64 = 60_000;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_index(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower || m.starts_with(&lower[..lower.len().min(3)]) && lower.len() >= 3)
        .map(|i| i as u32 + 1)
}

fn fmt_m_d_yyyy(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Parses `input` per the §4.1 tier ladder. Always returns in well under the 1ms budget: every
/// tier is a single regex match plus cheap arithmetic, no allocation-heavy scanning.
pub fn parse_date(input: &str, trace: &mut ExtractionTrace) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(result) = parse_excel_serial(trimmed) {
        return result;
    }
    if let Some(result) = parse_iso(trimmed) {
        return result;
    }
    if let Some(result) = parse_us_slash_dash(trimmed) {
        return result;
    }
    if let Some(result) = parse_month_name(trimmed) {
        return result;
    }

    trace.record_normalizer_failure();
    input.to_string()
}

fn parse_excel_serial(input: &str) -> Option<String> {
    let re = cached(r"^\d+$");
    if !re.is_match(input) {
        return None;
    }
    let n: i64 = input.parse().ok()?;
    if n < EXCEL_SERIAL_MIN || n > EXCEL_SERIAL_MAX {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(EXCEL_EPOCH_YEAR, EXCEL_EPOCH_MONTH, EXCEL_EPOCH_DAY)?;
    let date = epoch + Duration::days(n);
    Some(fmt_m_d_yyyy(date))
}

fn parse_iso(input: &str) -> Option<String> {
    let re = cached(r"^(\d{4})-(\d{1,2})-(\d{1,2})$");
    let caps = re.captures(input)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(fmt_m_d_yyyy(date))
}

fn parse_us_slash_dash(input: &str) -> Option<String> {
    let re = cached(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2}|\d{4})$");
    let caps = re.captures(input)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year_token = &caps[3];
    let year: i32 = if year_token.len() == 2 {
        let two_digit: i32 = year_token.parse().ok()?;
        if two_digit <= 49 {
            2000 + two_digit
        } else {
            1900 + two_digit
        }
    } else {
        year_token.parse().ok()?
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(fmt_m_d_yyyy(date))
}

fn parse_month_name(input: &str) -> Option<String> {
    // "Jan 17, 2025" / "January 17, 2025"
    let re = cached(r"(?i)^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$");
    if let Some(caps) = re.captures(input) {
        let month = month_index(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(fmt_m_d_yyyy(date));
    }
    // "17 January 2025"
    let re = cached(r"(?i)^(\d{1,2})\s+([A-Za-z]+)\.?,?\s+(\d{4})$");
    if let Some(caps) = re.captures(input) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_index(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(fmt_m_d_yyyy(date));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> String {
        let mut trace = ExtractionTrace::new();
        parse_date(s, &mut trace)
    }

    #[test]
    fn excel_serial_known_values() {
        assert_eq!(p("45674"), "1/17/2025");
        assert_eq!(p("44927"), "1/1/2023");
    }

    #[test]
    fn excel_serial_round_trip_over_full_range() {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
        for n in [1_i64, 2, 100, 1000, 30000, 59999, 60000] {
            let expected = epoch + Duration::days(n);
            assert_eq!(p(&n.to_string()), fmt_m_d_yyyy(expected));
        }
    }

    #[test]
    fn excel_serial_out_of_range_falls_through_to_original() {
        // 60001 is out of the Excel-serial window; it has no other recognizable shape.
        assert_eq!(p("60001"), "60001");
        assert_eq!(p("0"), "0");
    }

    #[test]
    fn iso_form() {
        assert_eq!(p("2025-01-17"), "1/17/2025");
    }

    #[test]
    fn us_slash_and_dash_forms() {
        assert_eq!(p("1/17/2025"), "1/17/2025");
        assert_eq!(p("1-17-2025"), "1/17/2025");
        assert_eq!(p("1/17/25"), "1/17/2025");
        assert_eq!(p("1/17/49"), "1/17/2049");
        assert_eq!(p("1/17/50"), "1/17/1950");
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(p("Jan 17, 2025"), "1/17/2025");
        assert_eq!(p("17 January 2025"), "1/17/2025");
    }

    #[test]
    fn unparseable_returns_original() {
        assert_eq!(p("not a date"), "not a date");
        assert_eq!(p(""), "");
    }

    #[test]
    fn idempotent_on_every_output_and_on_garbage() {
        for input in [
            "45674",
            "2025-01-17",
            "1/17/2025",
            "Jan 17, 2025",
            "17 January 2025",
            "garbage",
            "",
        ] {
            let once = p(input);
            let twice = p(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}
