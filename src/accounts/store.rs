//! Durable per-account flags.
//!
//! # Responsibilities
//! - Load and validate every ledger row
//! - Rewrite the whole ledger atomically after each confirmed success
//!
//! # Design Decisions
//! - Whole-file replace through a same-directory temp file; a crash leaves
//!   either the old or the new ledger, never a torn one
//! - A process-local lock serializes read-modify-write; separate processes
//!   against one file are not coordinated

use rand::seq::SliceRandom;
use rand::RngCore;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

use crate::accounts::types::{Account, AccountId, AccountRecord, Flag, StoreError, StoreResult};
use crate::observability::metrics;

/// Storage for the account ledger.
pub trait AccountStore: Send + Sync {
    /// All accounts in ledger order.
    fn load_all(&self) -> StoreResult<Vec<Account>>;

    /// All accounts in random order.
    fn load_shuffled(&self, rng: &mut dyn RngCore) -> StoreResult<Vec<Account>> {
        let mut accounts = self.load_all()?;
        accounts.shuffle(rng);
        Ok(accounts)
    }

    /// Replace the stored ledger with `accounts`.
    fn persist(&self, accounts: &[Account]) -> StoreResult<()>;

    /// Clear one flag and persist. Returns the updated account.
    fn clear_flag(&self, id: AccountId, flag: Flag) -> StoreResult<Account>;
}

/// Apply `flag` clearing to `accounts` in place.
fn clear_in(accounts: &mut [Account], id: AccountId, flag: Flag) -> StoreResult<Account> {
    let account = accounts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(StoreError::UnknownAccount(id))?;
    account.clear(flag);
    Ok(account.clone())
}

fn sorted(accounts: &[Account]) -> Vec<Account> {
    let mut ordered = accounts.to_vec();
    ordered.sort_by_key(|a| a.id);
    ordered
}

/// Ledger kept as a JSON array of [`AccountRecord`]s.
#[derive(Debug)]
pub struct JsonAccountStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonAccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoreResult<Vec<Account>> {
        let content = std::fs::read_to_string(&self.path)?;
        // Rows are decoded one by one so a bad row is reported by position.
        let rows: Vec<serde_json::Value> = serde_json::from_str(&content)?;
        rows.into_iter()
            .enumerate()
            .map(|(row, value)| {
                let record: AccountRecord = serde_json::from_value(value).map_err(|e| {
                    StoreError::MalformedAccount {
                        row,
                        reason: e.to_string(),
                    }
                })?;
                Account::from_record(row, record)
            })
            .collect()
    }

    fn write(&self, accounts: &[Account]) -> StoreResult<()> {
        let records: Vec<AccountRecord> = sorted(accounts).iter().map(Account::to_record).collect();
        let data = serde_json::to_vec_pretty(&records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        metrics::record_persist();
        tracing::debug!(path = %self.path.display(), accounts = records.len(), "Ledger persisted");
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is (); a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AccountStore for JsonAccountStore {
    fn load_all(&self) -> StoreResult<Vec<Account>> {
        let _guard = self.guard();
        let accounts = self.read()?;
        tracing::info!(path = %self.path.display(), accounts = accounts.len(), "Loaded account ledger");
        Ok(accounts)
    }

    fn persist(&self, accounts: &[Account]) -> StoreResult<()> {
        let _guard = self.guard();
        self.write(accounts)
    }

    fn clear_flag(&self, id: AccountId, flag: Flag) -> StoreResult<Account> {
        let _guard = self.guard();
        let mut accounts = self.read()?;
        let updated = clear_in(&mut accounts, id, flag)?;
        self.write(&accounts)?;
        Ok(updated)
    }
}

/// In-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<Account>> {
        self.accounts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AccountStore for MemoryAccountStore {
    fn load_all(&self) -> StoreResult<Vec<Account>> {
        Ok(sorted(&self.guard()))
    }

    fn persist(&self, accounts: &[Account]) -> StoreResult<()> {
        *self.guard() = sorted(accounts);
        metrics::record_persist();
        Ok(())
    }

    fn clear_flag(&self, id: AccountId, flag: Flag) -> StoreResult<Account> {
        let mut accounts = self.guard();
        let updated = clear_in(&mut accounts, id, flag)?;
        metrics::record_persist();
        Ok(updated)
    }
}
