//! Validated mutations on top of the raw store.
//!
//! The store itself is permissive plumbing; the business rules live here:
//! what makes a position registrable, and how much of a position can still
//! be withdrawn as of a given date. Handlers and tests go through these
//! functions, never through the raw store, when user input is involved.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::{
    InstrumentKind, NewPosition, NewWithdrawal, Position, PositionUpdate, Store, Withdrawal,
};
use crate::error::{LedgerError, Result};
use crate::tax::calculate_yield;
use crate::utils::format_currency;

fn validate_position_fields(
    company: &str,
    bank: &str,
    account_code: &str,
    instrument_type: &str,
    cdi_percentage: Option<Decimal>,
    principal: Decimal,
) -> Result<()> {
    if company.trim().is_empty() || bank.trim().is_empty() || account_code.trim().is_empty() {
        return Err(
            LedgerError::ValidationError("company, bank and account code are required".into())
                .into(),
        );
    }
    if principal <= Decimal::ZERO {
        return Err(
            LedgerError::ValidationError("deposited value must be positive".into()).into(),
        );
    }
    if InstrumentKind::classify(instrument_type) == InstrumentKind::Cdb {
        match cdi_percentage {
            Some(pct) if pct > Decimal::ZERO => {}
            _ => {
                return Err(LedgerError::ValidationError(
                    "a positive CDI percentage is required for CDB positions".into(),
                )
                .into());
            }
        }
    }
    Ok(())
}

/// Register a new position after validating the business rules.
pub fn create_position(store: &mut Store, new: NewPosition) -> Result<Position> {
    validate_position_fields(
        &new.company,
        &new.bank,
        &new.account_code,
        &new.instrument_type,
        new.cdi_percentage,
        new.principal,
    )?;
    store.create_position(new)
}

/// Apply a partial update; the merged record must still satisfy the same
/// rules a new position would.
pub fn update_position(store: &mut Store, id: i64, patch: &PositionUpdate) -> Result<Position> {
    if patch.is_empty() {
        return Err(LedgerError::ValidationError("nothing to update".into()).into());
    }

    let Some(current) = store.get_position(id)? else {
        anyhow::bail!("position {} not found", id);
    };

    let merged_company = patch.company.as_deref().unwrap_or(&current.company);
    let merged_bank = patch.bank.as_deref().unwrap_or(&current.bank);
    let merged_account = patch.account_code.as_deref().unwrap_or(&current.account_code);
    let merged_type = patch
        .instrument_type
        .as_deref()
        .unwrap_or(&current.instrument_type);
    let merged_cdi = patch.cdi_percentage.unwrap_or(current.cdi_percentage);
    let merged_principal = patch.principal.unwrap_or(current.principal);

    validate_position_fields(
        merged_company,
        merged_bank,
        merged_account,
        merged_type,
        merged_cdi,
        merged_principal,
    )?;

    store
        .update_position(id, patch)?
        .ok_or_else(|| anyhow::anyhow!("position {} not found", id))
}

/// Net balance still withdrawable from a position as of a date: the
/// engine's net value minus everything already withdrawn.
pub fn available_balance(position: &Position, as_of: NaiveDate) -> Decimal {
    let calculation = calculate_yield(
        position.principal,
        &position.instrument_type,
        position.cdi_percentage,
        position.deposit_date,
        as_of,
    );
    calculation.net_value - position.total_withdrawn
}

/// Register a withdrawal against a position.
///
/// The whole check-then-write sequence runs under one `&mut Store` borrow,
/// so no other mutation can interleave between the balance check and the
/// rollup increment.
pub fn register_withdrawal(
    store: &mut Store,
    position_id: i64,
    withdrawal_date: NaiveDate,
    amount: Decimal,
) -> Result<Withdrawal> {
    let Some(position) = store.get_position(position_id)? else {
        anyhow::bail!("position {} not found", position_id);
    };

    if amount <= Decimal::ZERO {
        return Err(
            LedgerError::ValidationError("withdrawal amount must be positive".into()).into(),
        );
    }
    if withdrawal_date < position.deposit_date {
        return Err(LedgerError::ValidationError(format!(
            "withdrawal date {} precedes the deposit date {}",
            withdrawal_date, position.deposit_date
        ))
        .into());
    }

    let balance = available_balance(&position, withdrawal_date);
    if amount > balance {
        return Err(LedgerError::ValidationError(format!(
            "withdrawal of {} exceeds the available net balance of {} on {}",
            format_currency(amount),
            format_currency(balance),
            withdrawal_date
        ))
        .into());
    }

    store.create_withdrawal(NewWithdrawal {
        position_id,
        withdrawal_date,
        amount,
    })
}
