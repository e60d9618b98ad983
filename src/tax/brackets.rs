//! Regressive withholding tables for fixed-income redemptions.
//!
//! Both tables are kept as ordered data rather than branching logic so the
//! tax-law mapping stays auditable: the IR table is a list of ascending
//! day thresholds, the IOF table an exact-day schedule for days 1-30.

use rust_decimal::Decimal;
use std::sync::OnceLock;

/// One IR bracket: applies when elapsed days <= `max_days`.
pub struct IrBracket {
    pub max_days: i64,
    pub rate: Decimal,
}

/// Regressive IR table for fixed income (excludes PGBL/VGBL).
pub fn ir_brackets() -> &'static [IrBracket] {
    static TABLE: OnceLock<Vec<IrBracket>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            IrBracket {
                max_days: 180,
                rate: Decimal::new(225, 3), // up to 180 days
            },
            IrBracket {
                max_days: 360,
                rate: Decimal::new(20, 2), // 181 to 360 days
            },
            IrBracket {
                max_days: 720,
                rate: Decimal::new(175, 3), // 361 to 720 days
            },
            IrBracket {
                max_days: i64::MAX,
                rate: Decimal::new(15, 2), // beyond 720 days
            },
        ]
    })
}

/// IR rate for a holding period. First matching ascending threshold wins.
pub fn ir_rate(elapsed_days: i64) -> Decimal {
    ir_brackets()
        .iter()
        .find(|bracket| elapsed_days <= bracket.max_days)
        .map(|bracket| bracket.rate)
        .unwrap_or_else(|| Decimal::new(15, 2))
}

/// Regressive IOF schedule on yield, for redemptions within 30 days.
/// Indexed by exact day count; day 30 onwards is zero.
pub fn iof_schedule() -> &'static [(i64, Decimal)] {
    static TABLE: OnceLock<Vec<(i64, Decimal)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            96i64, 93, 90, 86, 83, 80, 76, 73, 70, 66, 63, 60, 56, 53, 50, 46, 43, 40, 36, 33,
            30, 26, 23, 20, 16, 13, 10, 6, 3, 0,
        ]
        .iter()
        .enumerate()
        .map(|(i, &pct)| (i as i64 + 1, Decimal::new(pct, 2)))
        .collect()
    })
}

/// IOF rate for a holding period. Exact-day lookup; a day count not present
/// in the schedule (including day 0) carries no IOF.
pub fn iof_rate(elapsed_days: i64) -> Decimal {
    if elapsed_days >= 30 {
        return Decimal::ZERO;
    }
    iof_schedule()
        .iter()
        .find(|(day, _)| *day == elapsed_days)
        .map(|(_, rate)| *rate)
        .unwrap_or(Decimal::ZERO)
}
