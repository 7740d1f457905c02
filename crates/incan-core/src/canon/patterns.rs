//! Regex tables for field normalization and strict format checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Accepted date shapes (anchored; inputs are single field values)
    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})$"
    ).unwrap();

    // Month-name forms: "Dec 29, 2025" / "December 29 2025"
    pub static ref DATE_MONTH_DAY_YEAR: Regex = Regex::new(
        r"^([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*,?\s*(\d{4})$"
    ).unwrap();

    // "29 Dec 2025" / "29th December, 2025"
    pub static ref DATE_DAY_MONTH_YEAR: Regex = Regex::new(
        r"^(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?\s*,?\s*(\d{4})$"
    ).unwrap();

    // Clock time, seconds optional
    pub static ref TIME_PARTS: Regex = Regex::new(
        r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$"
    ).unwrap();

    // am/pm markers, stripped before parsing
    pub static ref MERIDIEM: Regex = Regex::new(
        r"(?i)([ap])\.?m\.?"
    ).unwrap();

    // A trailing comma followed by exactly two digits marks a decimal
    // separator in amounts that use no dot
    pub static ref COMMA_DECIMAL: Regex = Regex::new(
        r",\d{2}$"
    ).unwrap();

    // Strict canonical formats used by the validator and scorer
    pub static ref DATE_STRICT: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}$"
    ).unwrap();

    pub static ref TIME_STRICT: Regex = Regex::new(
        r"^\d{2}:\d{2}:\d{2}$"
    ).unwrap();
}
