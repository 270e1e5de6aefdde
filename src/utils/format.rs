//! Fixed two-decimal money formatting and the lenient amount parser used by
//! table edits.

use chrono::NaiveDate;

pub const CURRENCY_PREFIX: &str = "R$";

/// Renders an amount as `R$ 1234.50`.
pub fn format_amount(amount: f64) -> String {
    format!("{} {:.2}", CURRENCY_PREFIX, amount)
}

/// Parses user-typed amounts such as `89,90`, `R$ 1.234,56` or `350.00`.
///
/// When a comma is present it is the decimal separator and dots are treated
/// as thousands separators; otherwise the text is read as a plain decimal.
pub fn parse_amount(input: &str) -> Option<f64> {
    let stripped = input.trim().trim_start_matches(CURRENCY_PREFIX);
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Day-first date label, `05/03/2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Accepts ISO `2025-03-05` or day-first `05/03/2025`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .ok()
}
