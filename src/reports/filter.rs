//! Dashboard-style position filters.

use chrono::NaiveDate;

use crate::db::Position;

/// Optional criteria combined with AND. Text fields match as
/// case-insensitive substrings; the instrument type matches exactly;
/// the period bounds are inclusive on the deposit date.
#[derive(Debug, Clone, Default)]
pub struct PositionFilter {
    pub company: Option<String>,
    pub bank: Option<String>,
    pub account_code: Option<String>,
    pub instrument_type: Option<String>,
    pub deposited_from: Option<NaiveDate>,
    pub deposited_to: Option<NaiveDate>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl PositionFilter {
    pub fn matches(&self, position: &Position) -> bool {
        if let Some(company) = &self.company {
            if !contains_ignore_case(&position.company, company) {
                return false;
            }
        }
        if let Some(bank) = &self.bank {
            if !contains_ignore_case(&position.bank, bank) {
                return false;
            }
        }
        if let Some(account_code) = &self.account_code {
            if !contains_ignore_case(&position.account_code, account_code) {
                return false;
            }
        }
        if let Some(instrument_type) = &self.instrument_type {
            if &position.instrument_type != instrument_type {
                return false;
            }
        }
        if let Some(from) = self.deposited_from {
            if position.deposit_date < from {
                return false;
            }
        }
        if let Some(to) = self.deposited_to {
            if position.deposit_date > to {
                return false;
            }
        }
        true
    }

    /// Keep only the matching positions, preserving order.
    pub fn apply(&self, positions: Vec<Position>) -> Vec<Position> {
        positions
            .into_iter()
            .filter(|position| self.matches(position))
            .collect()
    }
}
