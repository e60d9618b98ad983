use anyhow::Result;
use colored::Colorize;
use tracing::info;

use super::{build_filter, parse_evaluation_date, RunContext};
use crate::cli::{formatters, PositionCommands};
use crate::db::{NewPosition, PositionUpdate, Store};
use crate::ledger;
use crate::tax::calculate_yield;
use crate::utils::{format_currency, parse_decimal, parse_iso_date};

pub fn dispatch_positions(action: PositionCommands, ctx: &RunContext) -> Result<()> {
    match action {
        PositionCommands::Add {
            company,
            bank,
            account,
            instrument_type,
            value,
            date,
            cdi,
        } => {
            let new = NewPosition {
                company,
                bank,
                account_code: account,
                instrument_type,
                cdi_percentage: cdi.as_deref().map(parse_decimal).transpose()?,
                principal: parse_decimal(&value)?,
                deposit_date: parse_iso_date(&date)?,
            };

            let mut store = Store::open(ctx.db_path.clone())?;
            let position = ledger::create_position(&mut store, new)?;
            info!("Registered position {}", position.id);

            println!(
                "\n{} Position #{} registered: {} at {} ({})",
                "✓".green().bold(),
                position.id,
                format_currency(position.principal),
                position.bank,
                position.instrument_type
            );
            Ok(())
        }

        PositionCommands::List { filter, at } => {
            let as_of = parse_evaluation_date(at.as_deref())?;
            let filter = build_filter(&filter)?;

            let store = Store::open(ctx.db_path.clone())?;
            let positions = filter.apply(store.list_positions()?);

            let rows: Vec<_> = positions
                .into_iter()
                .map(|position| {
                    let calculation = calculate_yield(
                        position.principal,
                        &position.instrument_type,
                        position.cdi_percentage,
                        position.deposit_date,
                        as_of,
                    );
                    (position, calculation)
                })
                .collect();

            if ctx.json {
                println!("{}", formatters::format_positions_json(&rows));
            } else {
                println!("{}", formatters::format_positions_table(&rows, as_of));
            }
            Ok(())
        }

        PositionCommands::Show { id, at } => {
            let as_of = parse_evaluation_date(at.as_deref())?;

            let store = Store::open(ctx.db_path.clone())?;
            let Some(position) = store.get_position(id)? else {
                anyhow::bail!("position {} not found", id);
            };
            let withdrawals = store.withdrawals_for(id)?;
            let calculation = calculate_yield(
                position.principal,
                &position.instrument_type,
                position.cdi_percentage,
                position.deposit_date,
                as_of,
            );

            if ctx.json {
                println!(
                    "{}",
                    formatters::format_position_json(&position, &calculation, &withdrawals)
                );
            } else {
                println!(
                    "{}",
                    formatters::format_position_detail(&position, &calculation, &withdrawals, as_of)
                );
            }
            Ok(())
        }

        PositionCommands::Edit {
            id,
            company,
            bank,
            account,
            instrument_type,
            value,
            date,
            cdi,
        } => {
            let patch = PositionUpdate {
                company,
                bank,
                account_code: account,
                instrument_type,
                cdi_percentage: cdi.as_deref().map(parse_decimal).transpose()?.map(Some),
                principal: value.as_deref().map(parse_decimal).transpose()?,
                deposit_date: date.as_deref().map(parse_iso_date).transpose()?,
            };

            let mut store = Store::open(ctx.db_path.clone())?;
            let position = ledger::update_position(&mut store, id, &patch)?;
            info!("Updated position {}", position.id);

            println!("\n{} Position #{} updated", "✓".green().bold(), position.id);
            Ok(())
        }

        PositionCommands::Remove { id } => {
            let mut store = Store::open(ctx.db_path.clone())?;
            if !store.delete_position(id)? {
                anyhow::bail!("position {} not found", id);
            }
            info!("Removed position {}", id);

            println!(
                "\n{} Position #{} and its withdrawals removed",
                "✓".green().bold(),
                id
            );
            Ok(())
        }
    }
}
