//! Yield accrual and tax withholding for a single fixed-income position.
//!
//! `calculate_yield` is a pure, total function: whatever the input, the
//! caller always gets a usable `YieldCalculation` back. Invalid input
//! (non-positive principal, evaluation before deposit) degrades to a
//! zero-yield result instead of an error, so list/summary rendering never
//! halts on one bad record.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};

use super::brackets::{iof_rate, ir_rate};
use crate::db::models::InstrumentKind;

/// Simulated daily reference (CDI) rate: roughly 10.40% a.a. compounded
/// over 252 periods, (1 + 0.1040)^(1/252) - 1. The rate is a fixed
/// constant, not fetched.
pub fn simulated_daily_cdi() -> Decimal {
    Decimal::new(393, 6)
}

/// Everything derived from one position as of an evaluation date.
/// Recomputed on every query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldCalculation {
    pub gross_value: Decimal,
    pub net_value: Decimal,
    pub gross_yield: Decimal,
    pub net_yield: Decimal,
    pub ir: Decimal,
    pub iof: Decimal,
    pub gross_yield_pct: Decimal,
    pub net_yield_pct: Decimal,
    pub elapsed_days: i64,
}

impl YieldCalculation {
    /// Zero-yield result around a principal: used both for evaluations
    /// before the deposit date and as the degraded fallback.
    fn flat(principal: Decimal, elapsed_days: i64) -> Self {
        YieldCalculation {
            gross_value: principal,
            net_value: principal,
            gross_yield: Decimal::ZERO,
            net_yield: Decimal::ZERO,
            ir: Decimal::ZERO,
            iof: Decimal::ZERO,
            gross_yield_pct: Decimal::ZERO,
            net_yield_pct: Decimal::ZERO,
            elapsed_days,
        }
    }
}

/// Calendar days between deposit and evaluation, floored at zero.
/// Business-day calendars are out of scope.
pub fn elapsed_calendar_days(deposit_date: NaiveDate, evaluation_date: NaiveDate) -> i64 {
    (evaluation_date - deposit_date).num_days().max(0)
}

/// Effective daily rate for an instrument label.
///
/// "CDB" accrues the stated percentage of the reference rate; a missing
/// percentage means no accrual, not an error (creation-time validation is
/// the layer that insists on it). Labels starting with "Fundo" accrue 100%
/// of the reference rate. Anything else accrues nothing.
pub fn effective_daily_rate(instrument_type: &str, cdi_percentage: Option<Decimal>) -> Decimal {
    match InstrumentKind::classify(instrument_type) {
        InstrumentKind::Cdb => match cdi_percentage {
            Some(pct) => simulated_daily_cdi() * pct / Decimal::ONE_HUNDRED,
            None => Decimal::ZERO,
        },
        InstrumentKind::Fund => simulated_daily_cdi(),
        InstrumentKind::Other => Decimal::ZERO,
    }
}

/// Compute gross/net value, withheld IR/IOF and percentage yields for a
/// deposit as of an evaluation date.
///
/// IOF is assessed first, on the positive gross yield; IR is assessed on
/// the post-IOF base. That sequencing is mandated by the tax rules and
/// must not be reordered.
pub fn calculate_yield(
    principal: Decimal,
    instrument_type: &str,
    cdi_percentage: Option<Decimal>,
    deposit_date: NaiveDate,
    evaluation_date: NaiveDate,
) -> YieldCalculation {
    if principal <= Decimal::ZERO {
        return YieldCalculation::flat(principal, 0);
    }
    if evaluation_date < deposit_date {
        return YieldCalculation::flat(principal, 0);
    }

    let elapsed_days = elapsed_calendar_days(deposit_date, evaluation_date);
    let daily_rate = effective_daily_rate(instrument_type, cdi_percentage);

    // Daily-compounded growth: principal * (1 + rate)^days.
    let growth = match (Decimal::ONE + daily_rate).checked_powi(elapsed_days) {
        Some(factor) => factor,
        None => return YieldCalculation::flat(principal, elapsed_days),
    };
    let gross_value = match principal.checked_mul(growth) {
        Some(value) => value,
        None => return YieldCalculation::flat(principal, elapsed_days),
    };
    let gross_yield = gross_value - principal;

    let iof = if gross_yield > Decimal::ZERO {
        gross_yield * iof_rate(elapsed_days)
    } else {
        Decimal::ZERO
    };

    let ir_base = gross_yield - iof;
    let ir = if ir_base > Decimal::ZERO {
        ir_base * ir_rate(elapsed_days)
    } else {
        Decimal::ZERO
    };

    let net_yield = gross_yield - iof - ir;
    let net_value = principal + net_yield;

    let gross_yield_pct = gross_yield / principal * Decimal::ONE_HUNDRED;
    let net_yield_pct = net_yield / principal * Decimal::ONE_HUNDRED;

    YieldCalculation {
        gross_value,
        net_value,
        gross_yield,
        net_yield,
        ir,
        iof,
        gross_yield_pct,
        net_yield_pct,
        elapsed_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_elapsed_days_same_date_is_zero() {
        let d = date(2025, 1, 15);
        assert_eq!(elapsed_calendar_days(d, d), 0);
    }

    #[test]
    fn test_elapsed_days_calendar_count() {
        assert_eq!(
            elapsed_calendar_days(date(2025, 1, 1), date(2025, 1, 31)),
            30
        );
        assert_eq!(
            elapsed_calendar_days(date(2025, 1, 1), date(2025, 1, 5)),
            4
        );
    }

    #[test]
    fn test_evaluation_before_deposit_is_flat() {
        let result = calculate_yield(
            dec!(10000),
            "CDB",
            Some(dec!(110)),
            date(2025, 1, 15),
            date(2025, 1, 1),
        );
        assert_eq!(result.gross_value, dec!(10000));
        assert_eq!(result.net_value, dec!(10000));
        assert_eq!(result.gross_yield, Decimal::ZERO);
        assert_eq!(result.ir, Decimal::ZERO);
        assert_eq!(result.iof, Decimal::ZERO);
        assert_eq!(result.elapsed_days, 0);
    }

    #[test]
    fn test_non_positive_principal_is_flat() {
        let result = calculate_yield(
            Decimal::ZERO,
            "CDB",
            Some(dec!(110)),
            date(2025, 1, 1),
            date(2025, 6, 1),
        );
        assert_eq!(result.gross_value, Decimal::ZERO);
        assert_eq!(result.net_value, Decimal::ZERO);
        assert_eq!(result.net_yield_pct, Decimal::ZERO);

        let negative = calculate_yield(
            dec!(-500),
            "CDB",
            Some(dec!(110)),
            date(2025, 1, 1),
            date(2025, 6, 1),
        );
        assert_eq!(negative.gross_value, dec!(-500));
        assert_eq!(negative.net_value, dec!(-500));
        assert_eq!(negative.gross_yield, Decimal::ZERO);
    }

    #[test]
    fn test_cdb_thirty_days_scenario() {
        // 10,000 in a CDB at 110% of CDI, held 30 calendar days: IOF is
        // already zero (day 30) and IR sits in the 22.5% bracket.
        let result = calculate_yield(
            dec!(10000),
            "CDB",
            Some(dec!(110)),
            date(2025, 1, 1),
            date(2025, 1, 31),
        );
        assert_eq!(result.elapsed_days, 30);
        assert_eq!(result.iof, Decimal::ZERO);
        // 10000 * ((1 + 0.000393 * 1.10)^30 - 1)
        assert_eq!(result.gross_yield.round_dp(2), dec!(130.51));
        assert_eq!(result.ir.round_dp(2), dec!(29.36));
        // net = gross * (1 - 0.225) when IOF is zero
        assert_eq!(result.net_yield, result.gross_yield * dec!(0.775));
        assert_eq!(result.net_value.round_dp(2), dec!(10101.14));
        assert_eq!(result.gross_yield_pct.round_dp(2), dec!(1.31));
        assert_eq!(result.net_yield_pct.round_dp(2), dec!(1.01));
    }

    #[test]
    fn test_cdb_four_days_applies_iof_before_ir() {
        let result = calculate_yield(
            dec!(10000),
            "CDB",
            Some(dec!(110)),
            date(2025, 1, 1),
            date(2025, 1, 5),
        );
        assert_eq!(result.elapsed_days, 4);
        // Day 4 carries an 0.86 IOF rate on the gross yield.
        assert_eq!(result.iof, result.gross_yield * dec!(0.86));
        // IR applies to the post-IOF base, not the raw gross yield.
        assert_eq!(result.ir, (result.gross_yield - result.iof) * dec!(0.225));
        assert_eq!(
            result.net_yield,
            result.gross_yield - result.iof - result.ir
        );
        assert!(result.net_yield > Decimal::ZERO);
    }

    #[test]
    fn test_fund_prefix_accrues_full_reference_rate() {
        let fund = calculate_yield(
            dec!(5000),
            "Fundo DI Plus",
            None,
            date(2025, 1, 1),
            date(2025, 3, 1),
        );
        let cdb_at_100 = calculate_yield(
            dec!(5000),
            "CDB",
            Some(dec!(100)),
            date(2025, 1, 1),
            date(2025, 3, 1),
        );
        assert_eq!(fund.gross_value, cdb_at_100.gross_value);
        assert_eq!(fund.net_value, cdb_at_100.net_value);
    }

    #[test]
    fn test_unknown_instrument_accrues_nothing() {
        let result = calculate_yield(
            dec!(7500),
            "LCI",
            None,
            date(2025, 1, 1),
            date(2026, 1, 1),
        );
        assert_eq!(result.gross_value, dec!(7500));
        assert_eq!(result.net_value, dec!(7500));
        assert_eq!(result.gross_yield, Decimal::ZERO);
        assert_eq!(result.ir, Decimal::ZERO);
        assert_eq!(result.elapsed_days, 365);
    }

    #[test]
    fn test_cdb_without_percentage_accrues_nothing() {
        // The engine stays permissive; requiring the percentage is the
        // ledger's job at creation time.
        let result = calculate_yield(
            dec!(10000),
            "CDB",
            None,
            date(2025, 1, 1),
            date(2025, 6, 1),
        );
        assert_eq!(result.gross_value, dec!(10000));
        assert_eq!(result.net_yield, Decimal::ZERO);
    }

    #[test]
    fn test_net_never_exceeds_gross() {
        for days in [1i64, 4, 29, 30, 180, 181, 360, 361, 720, 721, 1500] {
            let evaluation = date(2024, 1, 1) + chrono::Duration::days(days);
            let result = calculate_yield(
                dec!(10000),
                "CDB",
                Some(dec!(110)),
                date(2024, 1, 1),
                evaluation,
            );
            assert!(result.net_value <= result.gross_value, "days={days}");
            assert!(result.net_value >= dec!(10000), "days={days}");
            assert!(result.iof >= Decimal::ZERO && result.ir >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_long_holding_uses_lowest_bracket() {
        let result = calculate_yield(
            dec!(10000),
            "CDB",
            Some(dec!(100)),
            date(2020, 1, 1),
            date(2023, 1, 1),
        );
        assert!(result.elapsed_days > 720);
        assert_eq!(result.iof, Decimal::ZERO);
        assert_eq!(result.ir, result.gross_yield * dec!(0.15));
    }
}
