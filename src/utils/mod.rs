//! Formatting and date-parsing helpers shared by the CLI layer.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

/// Format a Decimal as Brazilian Reais: thousands separated by `.`,
/// decimals by `,`, e.g. `R$ 1.234,56`.
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_decimal_br(value))
}

/// Number-only Brazilian formatting: `1.234,56`.
pub fn format_decimal_br(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs().round_dp(2));
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut with_separators = String::new();
    let digits: Vec<char> = integer_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            with_separators.push('.');
        }
        with_separators.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    format!("{}{},{}", sign, with_separators, decimal_part)
}

/// Percentage with Brazilian decimal separator: `1,31%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2)).replace('.', ",")
}

/// Parse a flexible date argument: `YYYY-MM-DD` (exact), `YYYY-MM` (last
/// day of the month) or `YYYY` (December 31).
pub fn parse_flexible_date(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(first) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        let next_month = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        if let Some(nm) = next_month {
            if let Some(last_day) = nm.pred_opt() {
                return Ok(last_day);
            }
        }
    }

    if let Ok(year) = s.parse::<i32>() {
        if (1900..=2100).contains(&year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, 12, 31) {
                return Ok(date);
            }
        }
    }

    Err(LedgerError::ParseError(format!(
        "invalid date '{}'. Use YYYY-MM-DD, YYYY-MM, or YYYY",
        s
    ))
    .into())
}

/// Parse a strict `YYYY-MM-DD` date with a descriptive error.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| LedgerError::ParseError(format!("invalid date '{}': {}", s, e)).into())
}

/// Parse a decimal amount with a descriptive error.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| LedgerError::ParseError(format!("invalid number '{}': {}", s, e)).into())
}
