// Database module - SQLite-backed key-value store for positions and withdrawals

pub mod models;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub use models::{
    InstrumentKind, NewPosition, NewWithdrawal, Position, PositionUpdate, Withdrawal,
};

const POSITIONS_KEY: &str = "positions";
const WITHDRAWALS_KEY: &str = "withdrawals";

/// Get the default database path (~/.rendimento/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let app_dir = PathBuf::from(home).join(".rendimento");

    std::fs::create_dir_all(&app_dir).context("Failed to create .rendimento directory")?;

    Ok(app_dir.join("data.db"))
}

/// Persistent store for the two record collections.
///
/// Reads take `&self`, mutations take `&mut self`: every read-modify-write
/// cycle is a single critical section by construction, so concurrent
/// writers cannot interleave within a process. `rusqlite::Connection` is
/// not `Sync`, so sharing a `Store` across threads requires an external
/// lock anyway.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (and initialize if needed) a store at the given path, or the
    /// default path when `None`.
    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let path = db_path.unwrap_or(get_default_db_path()?);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create store directory {:?}", parent))?;
        }

        let conn =
            Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;

        let schema_sql = include_str!("schema.sql");
        conn.execute_batch(schema_sql)
            .context("Failed to execute schema")?;

        Ok(Store { conn })
    }

    /// Read a collection. `None` means the key was never written (callers
    /// may seed); a corrupted value is discarded with a warning and comes
    /// back as an empty collection for this call.
    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(text) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                warn!("Discarding corrupted '{}' collection: {}", key, e);
                self.conn
                    .execute("DELETE FROM kv WHERE key = ?1", [key])
                    .context("Failed to discard corrupted collection")?;
                Ok(Some(Vec::new()))
            }
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let text = serde_json::to_string(items).context("Failed to serialize collection")?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, text],
        )?;
        Ok(())
    }

    /// All tracked positions. On first access with no persisted data the
    /// store seeds one example position, so a fresh install has something
    /// to show.
    pub fn list_positions(&self) -> Result<Vec<Position>> {
        match self.read_collection(POSITIONS_KEY)? {
            Some(positions) => Ok(positions),
            None => self.seed_example_position(),
        }
    }

    fn seed_example_position(&self) -> Result<Vec<Position>> {
        info!("No persisted positions found, seeding example position");
        let now = Utc::now();
        let positions = vec![Position {
            id: 1,
            company: "Empresa Exemplo".to_string(),
            bank: "Bradesco".to_string(),
            account_code: "12345".to_string(),
            instrument_type: "CDB".to_string(),
            cdi_percentage: Some(Decimal::from(110)),
            principal: Decimal::from(10000),
            deposit_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            total_withdrawn: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }];
        self.write_collection(POSITIONS_KEY, &positions)?;
        Ok(positions)
    }

    pub fn get_position(&self, id: i64) -> Result<Option<Position>> {
        Ok(self
            .list_positions()?
            .into_iter()
            .find(|position| position.id == id))
    }

    /// Register a position: next id is max existing + 1 (1 when empty),
    /// timestamps are stamped and the withdrawal rollup starts at zero.
    pub fn create_position(&mut self, new: NewPosition) -> Result<Position> {
        let mut positions = self.list_positions()?;
        let next_id = positions.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let now = Utc::now();

        let position = Position {
            id: next_id,
            company: new.company,
            bank: new.bank,
            account_code: new.account_code,
            instrument_type: new.instrument_type,
            cdi_percentage: new.cdi_percentage,
            principal: new.principal,
            deposit_date: new.deposit_date,
            total_withdrawn: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };

        positions.push(position.clone());
        self.write_collection(POSITIONS_KEY, &positions)?;
        Ok(position)
    }

    /// Merge the supplied fields into an existing position. The id, the
    /// withdrawal rollup and the creation stamp are preserved; the update
    /// stamp is refreshed. Returns `None` for an unknown id.
    pub fn update_position(&mut self, id: i64, patch: &PositionUpdate) -> Result<Option<Position>> {
        let mut positions = self.list_positions()?;
        let Some(position) = positions.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(company) = &patch.company {
            position.company = company.clone();
        }
        if let Some(bank) = &patch.bank {
            position.bank = bank.clone();
        }
        if let Some(account_code) = &patch.account_code {
            position.account_code = account_code.clone();
        }
        if let Some(instrument_type) = &patch.instrument_type {
            position.instrument_type = instrument_type.clone();
        }
        if let Some(cdi_percentage) = patch.cdi_percentage {
            position.cdi_percentage = cdi_percentage;
        }
        if let Some(principal) = patch.principal {
            position.principal = principal;
        }
        if let Some(deposit_date) = patch.deposit_date {
            position.deposit_date = deposit_date;
        }
        position.updated_at = Utc::now();

        let updated = position.clone();
        self.write_collection(POSITIONS_KEY, &positions)?;
        Ok(Some(updated))
    }

    /// Delete a position and cascade to its withdrawals. Returns whether
    /// anything was removed.
    pub fn delete_position(&mut self, id: i64) -> Result<bool> {
        let mut positions = self.list_positions()?;
        let before = positions.len();
        positions.retain(|position| position.id != id);
        if positions.len() == before {
            return Ok(false);
        }
        self.write_collection(POSITIONS_KEY, &positions)?;

        let mut withdrawals = self.list_withdrawals()?;
        withdrawals.retain(|withdrawal| withdrawal.position_id != id);
        self.write_collection(WITHDRAWALS_KEY, &withdrawals)?;

        Ok(true)
    }

    pub fn list_withdrawals(&self) -> Result<Vec<Withdrawal>> {
        Ok(self.read_collection(WITHDRAWALS_KEY)?.unwrap_or_default())
    }

    pub fn withdrawals_for(&self, position_id: i64) -> Result<Vec<Withdrawal>> {
        let mut withdrawals = self.list_withdrawals()?;
        withdrawals.retain(|withdrawal| withdrawal.position_id == position_id);
        Ok(withdrawals)
    }

    /// Append a withdrawal and bump the owning position's rollup in the
    /// same call. The owning position must exist; balance rules live one
    /// layer up, in the ledger.
    pub fn create_withdrawal(&mut self, new: NewWithdrawal) -> Result<Withdrawal> {
        let mut positions = self.list_positions()?;
        let Some(position) = positions.iter_mut().find(|p| p.id == new.position_id) else {
            anyhow::bail!("position {} not found", new.position_id);
        };

        let mut withdrawals = self.list_withdrawals()?;
        let next_id = withdrawals.iter().map(|w| w.id).max().unwrap_or(0) + 1;

        let withdrawal = Withdrawal {
            id: next_id,
            position_id: new.position_id,
            withdrawal_date: new.withdrawal_date,
            amount: new.amount,
            created_at: Utc::now(),
        };
        withdrawals.push(withdrawal.clone());

        position.total_withdrawn += new.amount;
        position.updated_at = Utc::now();

        self.write_collection(WITHDRAWALS_KEY, &withdrawals)?;
        self.write_collection(POSITIONS_KEY, &positions)?;

        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(Some(temp_dir.path().join("test.db"))).unwrap();
        (temp_dir, store)
    }

    fn sample_position(company: &str) -> NewPosition {
        NewPosition {
            company: company.to_string(),
            bank: "Itaú".to_string(),
            account_code: "998".to_string(),
            instrument_type: "CDB".to_string(),
            cdi_percentage: Some(dec!(105)),
            principal: dec!(2000),
            deposit_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        }
    }

    #[test]
    fn test_first_access_seeds_example_position() {
        let (_dir, store) = test_store();
        let positions = store.list_positions().unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].id, 1);
        assert_eq!(positions[0].company, "Empresa Exemplo");
        assert_eq!(positions[0].total_withdrawn, Decimal::ZERO);

        // The seed is persisted, not regenerated per call.
        let again = store.list_positions().unwrap();
        assert_eq!(again, positions);
    }

    #[test]
    fn test_create_assigns_max_plus_one() {
        let (_dir, mut store) = test_store();
        let a = store.create_position(sample_position("A")).unwrap();
        let b = store.create_position(sample_position("B")).unwrap();
        // Seeded example takes id 1.
        assert_eq!(a.id, 2);
        assert_eq!(b.id, 3);

        store.delete_position(a.id).unwrap();
        let c = store.create_position(sample_position("C")).unwrap();
        assert_eq!(c.id, 4);
    }

    #[test]
    fn test_update_merges_and_preserves_rollup() {
        let (_dir, mut store) = test_store();
        let position = store.create_position(sample_position("A")).unwrap();
        store
            .create_withdrawal(NewWithdrawal {
                position_id: position.id,
                withdrawal_date: position.deposit_date,
                amount: dec!(100),
            })
            .unwrap();

        let updated = store
            .update_position(
                position.id,
                &PositionUpdate {
                    bank: Some("Nubank".to_string()),
                    principal: Some(dec!(2500)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.bank, "Nubank");
        assert_eq!(updated.principal, dec!(2500));
        assert_eq!(updated.company, "A");
        assert_eq!(updated.total_withdrawn, dec!(100));
        assert_eq!(updated.created_at, position.created_at);
        assert!(updated.updated_at >= position.updated_at);

        assert!(store
            .update_position(999, &PositionUpdate::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_cascades_withdrawals() {
        let (_dir, mut store) = test_store();
        let keep = store.create_position(sample_position("keep")).unwrap();
        let gone = store.create_position(sample_position("gone")).unwrap();
        for position_id in [keep.id, gone.id] {
            store
                .create_withdrawal(NewWithdrawal {
                    position_id,
                    withdrawal_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    amount: dec!(50),
                })
                .unwrap();
        }

        assert!(store.delete_position(gone.id).unwrap());
        assert!(!store.delete_position(gone.id).unwrap());

        let remaining = store.list_withdrawals().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].position_id, keep.id);
    }

    #[test]
    fn test_withdrawal_increments_rollup() {
        let (_dir, mut store) = test_store();
        let position = store.create_position(sample_position("A")).unwrap();

        let first = store
            .create_withdrawal(NewWithdrawal {
                position_id: position.id,
                withdrawal_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                amount: dec!(300),
            })
            .unwrap();
        let second = store
            .create_withdrawal(NewWithdrawal {
                position_id: position.id,
                withdrawal_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                amount: dec!(200),
            })
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let reloaded = store.get_position(position.id).unwrap().unwrap();
        assert_eq!(reloaded.total_withdrawn, dec!(500));
    }

    #[test]
    fn test_withdrawal_for_missing_position_is_rejected() {
        let (_dir, mut store) = test_store();
        let result = store.create_withdrawal(NewWithdrawal {
            position_id: 42,
            withdrawal_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            amount: dec!(10),
        });
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_corrupted_collection_is_discarded() {
        let (_dir, mut store) = test_store();
        store.create_position(sample_position("A")).unwrap();

        store
            .conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES ('positions', 'not json at all')",
                [],
            )
            .unwrap();

        // Corruption recovers to empty for this call...
        assert!(store.list_positions().unwrap().is_empty());
        // ...and the key is gone, so the next read seeds again.
        let reseeded = store.list_positions().unwrap();
        assert_eq!(reseeded.len(), 1);
        assert_eq!(reseeded[0].company, "Empresa Exemplo");
    }

    #[test]
    fn test_reopen_persists_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("persist.db");

        let created = {
            let mut store = Store::open(Some(path.clone())).unwrap();
            store.create_position(sample_position("Durable")).unwrap()
        };

        let store = Store::open(Some(path)).unwrap();
        let positions = store.list_positions().unwrap();
        assert!(positions.iter().any(|p| p.id == created.id && p.company == "Durable"));
    }
}
