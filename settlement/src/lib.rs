//! Settlement Engine
//!
//! Aggregates shared-expense balances by family and suggests the transfers
//! that would zero them out.
//!
//! # Architecture

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
//!
//! Every run is a pure pipeline over one snapshot:
//!
//! 1. **Balances**: fold transactions into per-participant `{paid, share, net}`
//! 2. **Aggregation**: sum families into single nodes, keep individuals apart
//! 3. **Rounding**: round each node's net to whole units
//! 4. **Simplification**: greedy matching, lead payers repaid first
//!
//! # Example
//!
//! ```no_run
//! use settlement::{Config, SettlementEngine};
//!
//! fn main() -> settlement::Result<()> {
//!     let mut config = Config::default();
//!     config.ledger.snapshot_path = Some("trip.json".into());
//!     let engine = SettlementEngine::from_config(config)?;
//!
//!     let report = engine.settle()?;
//!     for suggestion in &report.plan.suggestions {
//!         println!("{}", suggestion);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod aggregate;
pub mod priority;
pub mod netting;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use aggregate::aggregate_by_group;
pub use priority::{CreditorPriority, PriorityRule};
pub use netting::{simplify_debts, DebtSimplifier};
pub use config::{Config, NettingConfig};
pub use engine::{EstimateReport, Explanation, SettlementEngine, SettlementReport};
