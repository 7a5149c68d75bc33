//! Shared-expense ledger core
//!
//! Folds group expenses and repayments into per-participant balances.
//!
//! # Architecture
//!
//! - **Snapshot in, sheet out**: every call recomputes from the full
//!   transaction list; there is no incremental state to go stale
//! - **Roster as source of truth**: references to unknown participants are
//!   ignored and reported, never fatal
//! - **Injected sources**: storage lives behind `TransactionSource` /
//!   `RosterSource`

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! # Invariants
//!
//! - Zero-sum: in the settled view Σ(net) == 0 up to decimal precision
//! - Repayment conservation: a repayment of A moves exactly A of net from
//!   receiver to sender
//! - Deterministic replay: same snapshot → same balances, logs and warnings

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod roster;
pub mod balance;
pub mod audit;
pub mod ingest;
pub mod source;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, ParticipantRole, Result, Warning};
pub use types::{
    checked_total, Balance, BalanceOptions, BalanceView, Group, GroupId, Participant,
    ParticipantId, Transaction, TransactionId, TransactionKind,
};
pub use roster::Roster;
pub use balance::{compute_balances, BalanceSheet};
pub use audit::{get_audit_log, AuditLog, AuditLogs, LogEntry};
pub use ingest::{LedgerSnapshot, TransactionRecord};
pub use source::{InMemorySource, JsonSnapshotSource, RosterSource, TransactionSource};
pub use config::Config;
