//! Input sources
//!
//! The engine never owns its data. Callers inject a read interface and the
//! engine pulls a fresh snapshot on every computation; when the underlying
//! data changes the caller simply invokes the engine again.

use crate::{ingest::LedgerSnapshot, roster::Roster, types::Transaction, Result};
use std::path::{Path, PathBuf};

/// Read access to the full transaction list
pub trait TransactionSource {
    /// All transactions, in insertion order
    fn transactions(&self) -> Result<Vec<Transaction>>;
}

/// Read access to the roster
pub trait RosterSource {
    /// Current roster
    fn roster(&self) -> Result<Roster>;
}

/// Snapshot held in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    roster: Roster,
    transactions: Vec<Transaction>,
}

impl InMemorySource {
    /// Create from a roster and transactions
    pub fn new(roster: Roster, transactions: Vec<Transaction>) -> Self {
        Self {
            roster,
            transactions,
        }
    }

    /// Replace the transaction list
    pub fn replace_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }
}

impl TransactionSource for InMemorySource {
    fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }
}

impl RosterSource for InMemorySource {
    fn roster(&self) -> Result<Roster> {
        Ok(self.roster.clone())
    }
}

/// JSON snapshot file, re-read on every call
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    /// Create for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LedgerSnapshot> {
        let content = std::fs::read_to_string(&self.path)?;
        LedgerSnapshot::from_json(&content)
    }
}

impl TransactionSource for JsonSnapshotSource {
    fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.load()?.transactions())
    }
}

impl RosterSource for JsonSnapshotSource {
    fn roster(&self) -> Result<Roster> {
        self.load()?.roster()
    }
}
