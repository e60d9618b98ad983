use anyhow::Result;
use colored::Colorize;
use tracing::info;

use super::{today, RunContext};
use crate::cli::{formatters, WithdrawalCommands};
use crate::db::Store;
use crate::ledger;
use crate::utils::{format_currency, parse_decimal, parse_iso_date};

pub fn dispatch_withdrawals(action: WithdrawalCommands, ctx: &RunContext) -> Result<()> {
    match action {
        WithdrawalCommands::Add {
            position_id,
            amount,
            date,
        } => {
            let amount = parse_decimal(&amount)?;
            let withdrawal_date = match date.as_deref() {
                Some(s) => parse_iso_date(s)?,
                None => today(),
            };

            let mut store = Store::open(ctx.db_path.clone())?;
            let withdrawal =
                ledger::register_withdrawal(&mut store, position_id, withdrawal_date, amount)?;
            info!(
                "Registered withdrawal {} against position {}",
                withdrawal.id, position_id
            );

            let position = store
                .get_position(position_id)?
                .ok_or_else(|| anyhow::anyhow!("position {} not found", position_id))?;
            let remaining = ledger::available_balance(&position, withdrawal_date);

            println!(
                "\n{} Withdrawal #{} of {} registered against position #{}",
                "✓".green().bold(),
                withdrawal.id,
                format_currency(withdrawal.amount),
                position_id
            );
            println!(
                "  Remaining net balance on {}: {}",
                withdrawal_date.format("%d/%m/%Y"),
                format_currency(remaining)
            );
            Ok(())
        }

        WithdrawalCommands::List { position } => {
            let store = Store::open(ctx.db_path.clone())?;
            let withdrawals = match position {
                Some(position_id) => store.withdrawals_for(position_id)?,
                None => store.list_withdrawals()?,
            };

            if ctx.json {
                println!("{}", formatters::format_withdrawals_json(&withdrawals));
            } else {
                println!("{}", formatters::format_withdrawals_table(&withdrawals));
            }
            Ok(())
        }
    }
}
