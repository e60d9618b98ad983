use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Instrument classification derived from the stored label.
///
/// The label itself stays free-form in the record; only the yield rule
/// cares about the classification. Unrecognized labels are tracked but
/// accrue nothing (permissive by design, mirroring the product behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    /// CDI-indexed certificate of deposit; accrues a percentage of the
    /// reference rate.
    Cdb,
    /// Any label starting with "Fundo"; accrues 100% of the reference rate.
    Fund,
    /// Anything else; accrues nothing.
    Other,
}

impl InstrumentKind {
    /// Classify an instrument label: exactly "CDB", the "Fundo" prefix,
    /// or neither.
    pub fn classify(label: &str) -> Self {
        if label == "CDB" {
            InstrumentKind::Cdb
        } else if label.starts_with("Fundo") {
            InstrumentKind::Fund
        } else {
            InstrumentKind::Other
        }
    }
}

/// One fixed-income deposit being tracked (an "aplicação").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub id: i64,
    pub company: String,
    pub bank: String,
    pub account_code: String,
    pub instrument_type: String,
    /// Percentage of the reference rate, e.g. 110 for 110% of CDI.
    /// Present only for CDI-indexed instruments.
    pub cdi_percentage: Option<Decimal>,
    pub principal: Decimal,
    pub deposit_date: NaiveDate,
    /// Running sum of withdrawals against this position. Starts at zero,
    /// only ever incremented by withdrawal creation.
    pub total_withdrawn: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn kind(&self) -> InstrumentKind {
        InstrumentKind::classify(&self.instrument_type)
    }
}

/// Fields supplied when registering a new position; the store assigns the
/// id, stamps timestamps and zeroes the withdrawal rollup.
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub company: String,
    pub bank: String,
    pub account_code: String,
    pub instrument_type: String,
    pub cdi_percentage: Option<Decimal>,
    pub principal: Decimal,
    pub deposit_date: NaiveDate,
}

/// Partial update for a position. `None` fields are left untouched; the
/// id, withdrawal rollup and creation stamp are never editable.
#[derive(Debug, Clone, Default)]
pub struct PositionUpdate {
    pub company: Option<String>,
    pub bank: Option<String>,
    pub account_code: Option<String>,
    pub instrument_type: Option<String>,
    /// `Some(None)` clears the percentage, `Some(Some(p))` replaces it.
    pub cdi_percentage: Option<Option<Decimal>>,
    pub principal: Option<Decimal>,
    pub deposit_date: Option<NaiveDate>,
}

impl PositionUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.bank.is_none()
            && self.account_code.is_none()
            && self.instrument_type.is_none()
            && self.cdi_percentage.is_none()
            && self.principal.is_none()
            && self.deposit_date.is_none()
    }
}

/// One partial cash-out against a position (a "resgate"). Append-only:
/// withdrawals are never edited, only removed by the owning position's
/// cascading delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Withdrawal {
    pub id: i64,
    pub position_id: i64,
    pub withdrawal_date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when registering a withdrawal.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub position_id: i64,
    pub withdrawal_date: NaiveDate,
    pub amount: Decimal,
}
