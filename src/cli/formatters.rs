//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::db::{Position, Withdrawal};
use crate::reports::SummaryReport;
use crate::tax::YieldCalculation;
use crate::utils::{format_currency, format_percent};

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

#[derive(Serialize)]
struct JsonPosition {
    id: i64,
    company: String,
    bank: String,
    account_code: String,
    instrument_type: String,
    cdi_percentage: Option<String>,
    principal: String,
    deposit_date: String,
    total_withdrawn: String,
    gross_value: String,
    net_value: String,
    gross_yield: String,
    net_yield: String,
    ir: String,
    iof: String,
    gross_yield_pct: String,
    net_yield_pct: String,
    elapsed_days: i64,
}

impl JsonPosition {
    fn new(position: &Position, calculation: &YieldCalculation) -> Self {
        JsonPosition {
            id: position.id,
            company: position.company.clone(),
            bank: position.bank.clone(),
            account_code: position.account_code.clone(),
            instrument_type: position.instrument_type.clone(),
            cdi_percentage: position.cdi_percentage.map(|p| p.to_string()),
            principal: position.principal.to_string(),
            deposit_date: position.deposit_date.to_string(),
            total_withdrawn: position.total_withdrawn.to_string(),
            gross_value: calculation.gross_value.to_string(),
            net_value: calculation.net_value.to_string(),
            gross_yield: calculation.gross_yield.to_string(),
            net_yield: calculation.net_yield.to_string(),
            ir: calculation.ir.to_string(),
            iof: calculation.iof.to_string(),
            gross_yield_pct: calculation.gross_yield_pct.to_string(),
            net_yield_pct: calculation.net_yield_pct.to_string(),
            elapsed_days: calculation.elapsed_days,
        }
    }
}

/// Format the position list with computed figures as a terminal table.
pub fn format_positions_table(rows: &[(Position, YieldCalculation)], as_of: NaiveDate) -> String {
    if rows.is_empty() {
        return format!("\n{} No positions found\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct PositionRow {
        #[tabled(rename = "Id")]
        id: i64,
        #[tabled(rename = "Company")]
        company: String,
        #[tabled(rename = "Bank")]
        bank: String,
        #[tabled(rename = "Type")]
        instrument_type: String,
        #[tabled(rename = "Deposited")]
        deposit_date: String,
        #[tabled(rename = "Principal")]
        principal: String,
        #[tabled(rename = "Gross Value")]
        gross_value: String,
        #[tabled(rename = "Net Value")]
        net_value: String,
        #[tabled(rename = "Net Yield %")]
        net_yield_pct: String,
        #[tabled(rename = "Withdrawn")]
        withdrawn: String,
    }

    let table_rows: Vec<PositionRow> = rows
        .iter()
        .map(|(position, calculation)| PositionRow {
            id: position.id,
            company: position.company.clone(),
            bank: position.bank.clone(),
            instrument_type: position.instrument_type.clone(),
            deposit_date: position.deposit_date.format("%d/%m/%Y").to_string(),
            principal: format_currency(position.principal),
            gross_value: format_currency(calculation.gross_value),
            net_value: format_currency(calculation.net_value),
            net_yield_pct: format_percent(calculation.net_yield_pct),
            withdrawn: format_currency(position.total_withdrawn),
        })
        .collect();

    let table = Table::new(table_rows).with(Style::rounded()).to_string();
    format!(
        "\n{} Positions as of {}\n\n{}\n",
        "📈".cyan().bold(),
        as_of.format("%d/%m/%Y"),
        table
    )
}

pub fn format_positions_json(rows: &[(Position, YieldCalculation)]) -> String {
    let positions: Vec<JsonPosition> = rows
        .iter()
        .map(|(position, calculation)| JsonPosition::new(position, calculation))
        .collect();
    to_pretty_json(&positions)
}

/// Multi-line yield statement shared by `positions show` and `simulate`.
pub fn format_yield_statement(calculation: &YieldCalculation) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "  Elapsed days:     {}\n",
        calculation.elapsed_days
    ));
    output.push_str(&format!(
        "  Gross value:      {}\n",
        format_currency(calculation.gross_value)
    ));
    output.push_str(&format!(
        "  Gross yield:      {} ({})\n",
        format_currency(calculation.gross_yield),
        format_percent(calculation.gross_yield_pct)
    ));
    output.push_str(&format!(
        "  IOF withheld:     {}\n",
        format_currency(calculation.iof)
    ));
    output.push_str(&format!(
        "  IR withheld:      {}\n",
        format_currency(calculation.ir)
    ));
    output.push_str(&format!(
        "  Net yield:        {} ({})\n",
        format_currency(calculation.net_yield),
        format_percent(calculation.net_yield_pct)
    ));
    output.push_str(&format!(
        "  Net value:        {}\n",
        format_currency(calculation.net_value).green()
    ));
    output
}

/// Detailed view of a single position: header, statement, withdrawals.
pub fn format_position_detail(
    position: &Position,
    calculation: &YieldCalculation,
    withdrawals: &[Withdrawal],
    as_of: NaiveDate,
) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Position #{} - {} / {} ({})\n",
        "📄".cyan().bold(),
        position.id,
        position.company,
        position.bank,
        position.instrument_type
    ));
    if let Some(pct) = position.cdi_percentage {
        output.push_str(&format!("  Indexation:       {} of CDI\n", format_percent(pct)));
    }
    output.push_str(&format!("  Account:          {}\n", position.account_code));
    output.push_str(&format!(
        "  Deposited:        {} on {}\n",
        format_currency(position.principal),
        position.deposit_date.format("%d/%m/%Y")
    ));
    output.push_str(&format!(
        "\n  As of {}:\n",
        as_of.format("%d/%m/%Y")
    ));
    output.push_str(&format_yield_statement(calculation));
    output.push_str(&format!(
        "  Total withdrawn:  {}\n",
        format_currency(position.total_withdrawn)
    ));

    if withdrawals.is_empty() {
        output.push_str("\n  No withdrawals registered.\n");
    } else {
        output.push_str(&format!("\n{}", format_withdrawals_table(withdrawals)));
    }
    output
}

pub fn format_position_json(
    position: &Position,
    calculation: &YieldCalculation,
    withdrawals: &[Withdrawal],
) -> String {
    #[derive(Serialize)]
    struct JsonWithdrawalRow {
        id: i64,
        withdrawal_date: String,
        amount: String,
    }

    #[derive(Serialize)]
    struct JsonDetail {
        #[serde(flatten)]
        position: JsonPosition,
        withdrawals: Vec<JsonWithdrawalRow>,
    }

    let detail = JsonDetail {
        position: JsonPosition::new(position, calculation),
        withdrawals: withdrawals
            .iter()
            .map(|withdrawal| JsonWithdrawalRow {
                id: withdrawal.id,
                withdrawal_date: withdrawal.withdrawal_date.to_string(),
                amount: withdrawal.amount.to_string(),
            })
            .collect(),
    };
    to_pretty_json(&detail)
}

/// Format a withdrawal list as a terminal table.
pub fn format_withdrawals_table(withdrawals: &[Withdrawal]) -> String {
    if withdrawals.is_empty() {
        return format!("\n{} No withdrawals found\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct WithdrawalRow {
        #[tabled(rename = "Id")]
        id: i64,
        #[tabled(rename = "Position")]
        position_id: i64,
        #[tabled(rename = "Date")]
        withdrawal_date: String,
        #[tabled(rename = "Amount")]
        amount: String,
    }

    let rows: Vec<WithdrawalRow> = withdrawals
        .iter()
        .map(|withdrawal| WithdrawalRow {
            id: withdrawal.id,
            position_id: withdrawal.position_id,
            withdrawal_date: withdrawal.withdrawal_date.format("%d/%m/%Y").to_string(),
            amount: format_currency(withdrawal.amount),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!("{}\n", table)
}

pub fn format_withdrawals_json(withdrawals: &[Withdrawal]) -> String {
    #[derive(Serialize)]
    struct JsonWithdrawal {
        id: i64,
        position_id: i64,
        withdrawal_date: String,
        amount: String,
        created_at: String,
    }

    let rows: Vec<JsonWithdrawal> = withdrawals
        .iter()
        .map(|withdrawal| JsonWithdrawal {
            id: withdrawal.id,
            position_id: withdrawal.position_id,
            withdrawal_date: withdrawal.withdrawal_date.to_string(),
            amount: withdrawal.amount.to_string(),
            created_at: withdrawal.created_at.to_rfc3339(),
        })
        .collect();
    to_pretty_json(&rows)
}

/// Format the aggregate dashboard summary.
pub fn format_summary(report: &SummaryReport, as_of: NaiveDate) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Summary as of {} ({} positions)\n\n",
        "📊".cyan().bold(),
        as_of.format("%d/%m/%Y"),
        report.position_count
    ));
    output.push_str(&format!(
        "  Total invested:        {}\n",
        format_currency(report.total_invested)
    ));
    output.push_str(&format!(
        "  Current gross value:   {}\n",
        format_currency(report.gross_value)
    ));
    output.push_str(&format!(
        "  Current net value:     {}\n",
        format_currency(report.net_value).green()
    ));
    output.push_str(&format!(
        "  Gross yield:           {}\n",
        format_currency(report.gross_yield)
    ));
    output.push_str(&format!(
        "  Net yield:             {}\n",
        format_currency(report.net_yield).green()
    ));
    output.push_str(&format!(
        "  IR withheld (est.):    {}\n",
        format_currency(report.total_ir).red()
    ));
    output.push_str(&format!(
        "  IOF withheld (est.):   {}\n",
        format_currency(report.total_iof).red()
    ));
    output.push_str(&format!(
        "  Total withdrawn:       {}\n",
        format_currency(report.total_withdrawn)
    ));
    output
}

pub fn format_summary_json(report: &SummaryReport) -> String {
    #[derive(Serialize)]
    struct JsonSummary {
        position_count: usize,
        total_invested: String,
        gross_value: String,
        net_value: String,
        gross_yield: String,
        net_yield: String,
        total_ir: String,
        total_iof: String,
        total_withdrawn: String,
    }

    let json_report = JsonSummary {
        position_count: report.position_count,
        total_invested: report.total_invested.to_string(),
        gross_value: report.gross_value.to_string(),
        net_value: report.net_value.to_string(),
        gross_yield: report.gross_yield.to_string(),
        net_yield: report.net_yield.to_string(),
        total_ir: report.total_ir.to_string(),
        total_iof: report.total_iof.to_string(),
        total_withdrawn: report.total_withdrawn.to_string(),
    };
    to_pretty_json(&json_report)
}

pub fn format_yield_json(calculation: &YieldCalculation) -> String {
    #[derive(Serialize)]
    struct JsonYield {
        gross_value: String,
        net_value: String,
        gross_yield: String,
        net_yield: String,
        ir: String,
        iof: String,
        gross_yield_pct: String,
        net_yield_pct: String,
        elapsed_days: i64,
    }

    let json = JsonYield {
        gross_value: calculation.gross_value.to_string(),
        net_value: calculation.net_value.to_string(),
        gross_yield: calculation.gross_yield.to_string(),
        net_yield: calculation.net_yield.to_string(),
        ir: calculation.ir.to_string(),
        iof: calculation.iof.to_string(),
        gross_yield_pct: calculation.gross_yield_pct.to_string(),
        net_yield_pct: calculation.net_yield_pct.to_string(),
        elapsed_days: calculation.elapsed_days,
    };
    to_pretty_json(&json)
}
