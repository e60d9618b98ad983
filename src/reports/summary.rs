//! Aggregate dashboard figures across a set of positions.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::Position;
use crate::tax::calculate_yield;

/// Totals across the selected positions as of an evaluation date.
/// Every figure is recomputed through the engine on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub position_count: usize,
    pub total_invested: Decimal,
    pub gross_value: Decimal,
    pub net_value: Decimal,
    pub gross_yield: Decimal,
    pub net_yield: Decimal,
    pub total_ir: Decimal,
    pub total_iof: Decimal,
    pub total_withdrawn: Decimal,
}

/// Sum the engine's figures over the given positions.
pub fn build_summary(positions: &[Position], as_of: NaiveDate) -> SummaryReport {
    let mut report = SummaryReport {
        position_count: positions.len(),
        total_invested: Decimal::ZERO,
        gross_value: Decimal::ZERO,
        net_value: Decimal::ZERO,
        gross_yield: Decimal::ZERO,
        net_yield: Decimal::ZERO,
        total_ir: Decimal::ZERO,
        total_iof: Decimal::ZERO,
        total_withdrawn: Decimal::ZERO,
    };

    for position in positions {
        let calculation = calculate_yield(
            position.principal,
            &position.instrument_type,
            position.cdi_percentage,
            position.deposit_date,
            as_of,
        );

        report.total_invested += position.principal;
        report.gross_value += calculation.gross_value;
        report.net_value += calculation.net_value;
        report.gross_yield += calculation.gross_yield;
        report.net_yield += calculation.net_yield;
        report.total_ir += calculation.ir;
        report.total_iof += calculation.iof;
        report.total_withdrawn += position.total_withdrawn;
    }

    report
}
