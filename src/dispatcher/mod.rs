//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! Handlers own the unglamorous edges: opening the store, turning user
//! strings into dates and decimals with readable errors, and choosing
//! between table and JSON output.

mod positions;
mod withdrawals;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::info;

use crate::cli::{formatters, Commands, FilterArgs};
use crate::reports::{build_summary, PositionFilter};
use crate::tax::calculate_yield;
use crate::utils::{parse_decimal, parse_flexible_date, parse_iso_date};

/// Per-invocation options shared by every handler.
pub struct RunContext {
    pub db_path: Option<PathBuf>,
    pub json: bool,
}

/// Route a parsed command to its handler.
pub fn dispatch_command(command: Commands, ctx: &RunContext) -> Result<()> {
    match command {
        Commands::Positions { action } => positions::dispatch_positions(action, ctx),
        Commands::Withdrawals { action } => withdrawals::dispatch_withdrawals(action, ctx),
        Commands::Summary { filter, at } => dispatch_summary(&filter, at.as_deref(), ctx),
        Commands::Simulate {
            value,
            instrument_type,
            date,
            cdi,
            at,
        } => dispatch_simulate(&value, &instrument_type, &date, cdi.as_deref(), at.as_deref(), ctx),
    }
}

/// Today in the local timezone; evaluation dates default to it.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_evaluation_date(at: Option<&str>) -> Result<NaiveDate> {
    match at {
        Some(s) => parse_flexible_date(s),
        None => Ok(today()),
    }
}

/// Turn CLI filter flags into a report filter.
pub(crate) fn build_filter(args: &FilterArgs) -> Result<PositionFilter> {
    Ok(PositionFilter {
        company: args.company.clone(),
        bank: args.bank.clone(),
        account_code: args.account.clone(),
        instrument_type: args.instrument_type.clone(),
        deposited_from: args.from.as_deref().map(parse_iso_date).transpose()?,
        deposited_to: args.to.as_deref().map(parse_iso_date).transpose()?,
    })
}

fn dispatch_summary(filter_args: &FilterArgs, at: Option<&str>, ctx: &RunContext) -> Result<()> {
    info!("Building summary report");

    let as_of = parse_evaluation_date(at)?;
    let filter = build_filter(filter_args)?;

    let store = crate::db::Store::open(ctx.db_path.clone())?;
    let positions = filter.apply(store.list_positions()?);
    let report = build_summary(&positions, as_of);

    if ctx.json {
        println!("{}", formatters::format_summary_json(&report));
    } else {
        println!("{}", formatters::format_summary(&report, as_of));
    }
    Ok(())
}

fn dispatch_simulate(
    value: &str,
    instrument_type: &str,
    date: &str,
    cdi: Option<&str>,
    at: Option<&str>,
    ctx: &RunContext,
) -> Result<()> {
    let principal = parse_decimal(value)?;
    let deposit_date = parse_iso_date(date)?;
    let cdi_percentage = cdi.map(parse_decimal).transpose()?;
    let evaluation_date = parse_evaluation_date(at)?;

    let calculation = calculate_yield(
        principal,
        instrument_type,
        cdi_percentage,
        deposit_date,
        evaluation_date,
    );

    if ctx.json {
        println!("{}", formatters::format_yield_json(&calculation));
    } else {
        println!(
            "\nSimulation: {} in {} from {} to {}\n",
            crate::utils::format_currency(principal),
            instrument_type,
            deposit_date.format("%d/%m/%Y"),
            evaluation_date.format("%d/%m/%Y")
        );
        print!("{}", formatters::format_yield_statement(&calculation));
    }
    Ok(())
}
