//! Primitive field normalizers: dates, times, strings, amounts, currency.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::warn;

use super::patterns::{
    COMMA_DECIMAL, DATE_DAY_MONTH_YEAR, DATE_DMY, DATE_MONTH_DAY_YEAR, DATE_YMD, MERIDIEM,
    TIME_PARTS,
};
use crate::models::document::RawScalar;

/// Fallback currency when nothing can be detected.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Currency symbols checked while normalizing amount text, in match order.
const CURRENCY_SYMBOLS: [(&str, &str); 4] = [
    ("₹", "INR"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
];

/// Currency names and symbols mapped to ISO 4217 codes, in match order.
const CURRENCY_NAMES: [(&str, &str); 21] = [
    ("dollar", "USD"),
    ("usd", "USD"),
    ("$", "USD"),
    ("rupee", "INR"),
    ("inr", "INR"),
    ("₹", "INR"),
    ("euro", "EUR"),
    ("eur", "EUR"),
    ("€", "EUR"),
    ("pound", "GBP"),
    ("gbp", "GBP"),
    ("£", "GBP"),
    ("yen", "JPY"),
    ("jpy", "JPY"),
    ("¥", "JPY"),
    ("franc", "CHF"),
    ("chf", "CHF"),
    ("australian dollar", "AUD"),
    ("aud", "AUD"),
    ("canadian dollar", "CAD"),
    ("cad", "CAD"),
];

/// Stateless normalizer for individual field values. Every method absorbs
/// unparseable input and returns `None` rather than an error.
pub struct FieldNormalizer;

impl FieldNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize any supported date format to `YYYY-MM-DD`.
    ///
    /// Accepts ISO dates (passthrough), day-month-year with `.`/`/`/`-`
    /// separators and 2- or 4-digit years, a month/day/year fallback when
    /// the day-first reading is not a valid calendar date, and English
    /// month-name forms ("Dec 29, 2025", "29 December 2025").
    pub fn normalize_date(&self, input: Option<&str>) -> Option<String> {
        let text = input.map(str::trim).filter(|s| !s.is_empty())?;

        if let Some(caps) = DATE_YMD.captures(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            return format_date(text, NaiveDate::from_ymd_opt(year, month, day));
        }

        if let Some(caps) = DATE_DMY.captures(text) {
            let first: u32 = caps[1].parse().unwrap_or(0);
            let second: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            // Day-first reading, falling back to month-first for US-style
            // inputs like 12/29/25
            let date = NaiveDate::from_ymd_opt(year, second, first)
                .or_else(|| NaiveDate::from_ymd_opt(year, first, second));
            return format_date(text, date);
        }

        if let Some(caps) = DATE_MONTH_DAY_YEAR.captures(text) {
            let month = month_name_to_number(&caps[1]);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            return format_date(text, NaiveDate::from_ymd_opt(year, month, day));
        }

        if let Some(caps) = DATE_DAY_MONTH_YEAR.captures(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_name_to_number(&caps[2]);
            let year: i32 = caps[3].parse().unwrap_or(0);
            return format_date(text, NaiveDate::from_ymd_opt(year, month, day));
        }

        warn!("could not parse date: {text}");
        None
    }

    /// Normalize a time value to `HH:MM:SS`.
    ///
    /// Case-insensitive am/pm markers are detected and stripped before
    /// parsing; `2:30 PM` becomes `14:30:00`.
    pub fn normalize_time(&self, input: Option<&str>) -> Option<String> {
        let text = input.map(str::trim).filter(|s| !s.is_empty())?;

        let meridiem = MERIDIEM
            .captures(text)
            .map(|caps| caps[1].to_lowercase());
        let stripped = MERIDIEM.replace_all(text, "");
        let stripped = stripped.trim();

        let Some(caps) = TIME_PARTS.captures(stripped) else {
            warn!("could not parse time: {text}");
            return None;
        };

        let mut hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps[2].parse().unwrap_or(99);
        let second: u32 = caps
            .get(3)
            .map(|m| m.as_str().parse().unwrap_or(99))
            .unwrap_or(0);

        match meridiem.as_deref() {
            Some("p") if hour < 12 => hour += 12,
            Some("a") if hour == 12 => hour = 0,
            _ => {}
        }

        match NaiveTime::from_hms_opt(hour, minute, second) {
            Some(time) => Some(time.format("%H:%M:%S").to_string()),
            None => {
                warn!("could not parse time: {text}");
                None
            }
        }
    }

    /// Collapse whitespace runs and trim; an empty result is `None`.
    pub fn clean_string(&self, input: Option<&str>) -> Option<String> {
        let text = input?;
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() { None } else { Some(cleaned) }
    }

    /// Normalize an amount value, detecting a currency symbol in text input.
    ///
    /// Numeric input is rounded to two decimals with no currency. Text
    /// input goes through symbol detection and separator disambiguation:
    /// with both comma and dot present the later one is the decimal
    /// separator; a lone comma is decimal only when followed by exactly two
    /// digits at the end; more than one dot means dots are thousands
    /// groupings and any comma is the decimal separator.
    pub fn normalize_amount(&self, value: &RawScalar) -> (Option<Decimal>, Option<String>) {
        match value {
            RawScalar::Number(number) => (
                Decimal::from_f64(*number).map(|amount| amount.round_dp(2)),
                None,
            ),
            RawScalar::Text(text) => self.normalize_amount_text(text),
            _ => (None, None),
        }
    }

    /// Normalize a textual amount. See [`normalize_amount`](Self::normalize_amount).
    pub fn normalize_amount_text(&self, text: &str) -> (Option<Decimal>, Option<String>) {
        let trimmed = text.trim();

        let detected = CURRENCY_SYMBOLS
            .iter()
            .find(|(symbol, _)| trimmed.contains(symbol))
            .map(|(_, code)| (*code).to_string());

        let mut cleaned: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
            .collect();

        let dots = cleaned.matches('.').count();
        let commas = cleaned.matches(',').count();

        if dots > 1 {
            // European thousands: 1.000.000,00
            cleaned.retain(|c| c != '.');
            cleaned = cleaned.replace(',', ".");
        } else if dots == 1 && commas >= 1 {
            if cleaned.rfind(',') > cleaned.rfind('.') {
                // European: 1.500,00
                cleaned.retain(|c| c != '.');
                cleaned = cleaned.replace(',', ".");
            } else {
                // US: 1,500.00
                cleaned.retain(|c| c != ',');
            }
        } else if commas >= 1 {
            if COMMA_DECIMAL.is_match(&cleaned) {
                // European decimal: 1200,50
                if let Some(position) = cleaned.rfind(',') {
                    let head: String = cleaned[..position]
                        .chars()
                        .filter(|c| *c != ',')
                        .collect();
                    cleaned = format!("{head}.{}", &cleaned[position + 1..]);
                }
            } else {
                // Thousands separator: 1,500
                cleaned.retain(|c| c != ',');
            }
        }

        match Decimal::from_str(&cleaned) {
            Ok(amount) => (Some(amount.round_dp(2)), detected),
            Err(_) => {
                warn!("could not normalize amount: {text}");
                (None, None)
            }
        }
    }

    /// Standardize a currency value to an ISO 4217 code.
    ///
    /// A 3-letter alphabetic value passes through uppercased; names and
    /// symbols go through the mapping table; anything else is `USD`.
    pub fn normalize_currency_code(&self, input: Option<&str>) -> String {
        let Some(text) = input.map(str::trim).filter(|s| !s.is_empty()) else {
            return DEFAULT_CURRENCY.to_string();
        };

        let upper = text.to_uppercase();
        if upper.chars().count() == 3 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
            return upper;
        }

        let lower = text.to_lowercase();
        CURRENCY_NAMES
            .iter()
            .find(|(name, _)| lower.contains(name))
            .map(|(_, code)| (*code).to_string())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
    }
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_date(text: &str, date: Option<NaiveDate>) -> Option<String> {
    match date {
        Some(date) => Some(date.format("%Y-%m-%d").to_string()),
        None => {
            warn!("could not parse date: {text}");
            None
        }
    }
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_name_to_number(name: &str) -> u32 {
    match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_date_dmy_slash_two_digit_year() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_date(Some("29/12/25")),
            Some("2025-12-29".to_string())
        );
    }

    #[test]
    fn test_normalize_date_month_name() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_date(Some("Dec 29, 2025")),
            Some("2025-12-29".to_string())
        );
        assert_eq!(
            normalizer.normalize_date(Some("29 December 2025")),
            Some("2025-12-29".to_string())
        );
    }

    #[test]
    fn test_normalize_date_iso_passthrough() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_date(Some("2025-12-29")),
            Some("2025-12-29".to_string())
        );
    }

    #[test]
    fn test_normalize_date_dmy_dashes_and_dots() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_date(Some("29-12-2025")),
            Some("2025-12-29".to_string())
        );
        assert_eq!(
            normalizer.normalize_date(Some("29.12.2025")),
            Some("2025-12-29".to_string())
        );
    }

    #[test]
    fn test_normalize_date_us_fallback() {
        let normalizer = FieldNormalizer::new();

        // 29 cannot be a month, so the month-first reading applies
        assert_eq!(
            normalizer.normalize_date(Some("12/29/25")),
            Some("2025-12-29".to_string())
        );
    }

    #[test]
    fn test_normalize_date_unparseable() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.normalize_date(Some("not a date")), None);
        assert_eq!(normalizer.normalize_date(Some("2025-13-45")), None);
        assert_eq!(normalizer.normalize_date(Some("")), None);
        assert_eq!(normalizer.normalize_date(None), None);
    }

    #[test]
    fn test_normalize_time_twelve_hour() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_time(Some("2:30 PM")),
            Some("14:30:00".to_string())
        );
        assert_eq!(
            normalizer.normalize_time(Some("2:30 am")),
            Some("02:30:00".to_string())
        );
        assert_eq!(
            normalizer.normalize_time(Some("12:15 AM")),
            Some("00:15:00".to_string())
        );
    }

    #[test]
    fn test_normalize_time_twenty_four_hour() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_time(Some("14:30")),
            Some("14:30:00".to_string())
        );
        assert_eq!(
            normalizer.normalize_time(Some("14:30:45")),
            Some("14:30:45".to_string())
        );
    }

    #[test]
    fn test_normalize_time_absent_and_invalid() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.normalize_time(None), None);
        assert_eq!(normalizer.normalize_time(Some("")), None);
        assert_eq!(normalizer.normalize_time(Some("25:00")), None);
        assert_eq!(normalizer.normalize_time(Some("soon")), None);
    }

    #[test]
    fn test_clean_string() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.clean_string(Some("  Acme   Corp \n Ltd  ")),
            Some("Acme Corp Ltd".to_string())
        );
        assert_eq!(normalizer.clean_string(Some("   ")), None);
        assert_eq!(normalizer.clean_string(None), None);
    }

    #[test]
    fn test_normalize_amount_us_format_with_symbol() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_amount_text("$1,500.00"),
            (Some(dec("1500.00")), Some("USD".to_string()))
        );
    }

    #[test]
    fn test_normalize_amount_european_format() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_amount_text("1.500,00"),
            (Some(dec("1500.00")), None)
        );
        assert_eq!(
            normalizer.normalize_amount_text("1.000.000,00"),
            (Some(dec("1000000.00")), None)
        );
    }

    #[test]
    fn test_normalize_amount_us_format_plain() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_amount_text("1,500.00"),
            (Some(dec("1500.00")), None)
        );
    }

    #[test]
    fn test_normalize_amount_lone_comma() {
        let normalizer = FieldNormalizer::new();

        // Comma followed by exactly two digits is a decimal separator
        assert_eq!(
            normalizer.normalize_amount_text("1200,50"),
            (Some(dec("1200.50")), None)
        );
        // Otherwise it is a thousands grouping
        assert_eq!(
            normalizer.normalize_amount_text("₹15,000"),
            (Some(dec("15000")), Some("INR".to_string()))
        );
    }

    #[test]
    fn test_normalize_amount_numeric_input() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(
            normalizer.normalize_amount(&RawScalar::Number(1500.005)),
            (Some(dec("1500.00")), None)
        );
    }

    #[test]
    fn test_normalize_amount_unparseable() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.normalize_amount_text("n/a"), (None, None));
        assert_eq!(
            normalizer.normalize_amount(&RawScalar::Bool(true)),
            (None, None)
        );
    }

    #[test]
    fn test_normalize_currency_code() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.normalize_currency_code(Some("inr")), "INR");
        assert_eq!(normalizer.normalize_currency_code(Some("dollar")), "USD");
        assert_eq!(normalizer.normalize_currency_code(Some("$")), "USD");
        assert_eq!(normalizer.normalize_currency_code(Some("rupee")), "INR");
        assert_eq!(normalizer.normalize_currency_code(Some("€")), "EUR");
        assert_eq!(normalizer.normalize_currency_code(Some("franc")), "CHF");
        assert_eq!(normalizer.normalize_currency_code(Some("yen")), "JPY");
    }

    #[test]
    fn test_normalize_currency_code_defaults_to_usd() {
        let normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.normalize_currency_code(None), "USD");
        assert_eq!(normalizer.normalize_currency_code(Some("")), "USD");
        assert_eq!(normalizer.normalize_currency_code(Some("doubloons")), "USD");
    }
}
