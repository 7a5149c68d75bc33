//! Error types for the ledger

use crate::types::{ParticipantId, TransactionId};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Roster failed validation
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    /// Participant not in the roster
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Sum outside the decimal range
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

/// Side of a transaction a participant reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Payer (or repayment sender)
    Payer,
    /// Beneficiary (or repayment receiver)
    Beneficiary,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Payer => write!(f, "payer"),
            ParticipantRole::Beneficiary => write!(f, "beneficiary"),
        }
    }
}

/// Non-fatal data-quality issue found while folding transactions
///
/// Warnings are collected alongside the result; a bad record never aborts
/// the computation for everyone else.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Reference to a participant missing from the roster; that side was ignored
    #[error("transaction {transaction_id}: unknown {role} {participant_id}")]
    UnknownParticipant {
        /// Offending transaction
        transaction_id: TransactionId,
        /// Unresolved participant
        participant_id: ParticipantId,
        /// Where the reference appeared
        role: ParticipantRole,
    },

    /// Repayment without exactly one receiver; transaction skipped
    #[error("transaction {transaction_id}: repayment has {beneficiary_count} receivers, expected 1")]
    MalformedRepayment {
        /// Offending transaction
        transaction_id: TransactionId,
        /// Number of beneficiaries found
        beneficiary_count: usize,
    },

    /// Repayment with no sender; transaction skipped
    #[error("transaction {transaction_id}: repayment has no sender")]
    RepaymentWithoutSender {
        /// Offending transaction
        transaction_id: TransactionId,
    },

    /// Applying the transaction would overflow a balance; transaction skipped
    #[error("transaction {transaction_id}: amount overflows a balance")]
    AmountOverflow {
        /// Offending transaction
        transaction_id: TransactionId,
    },

    /// Negative amount; transaction skipped
    #[error("transaction {transaction_id}: negative amount {amount}")]
    NegativeAmount {
        /// Offending transaction
        transaction_id: TransactionId,
        /// Amount found
        amount: Decimal,
    },
}

impl Warning {
    /// Transaction the warning refers to
    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            Warning::UnknownParticipant { transaction_id, .. }
            | Warning::MalformedRepayment { transaction_id, .. }
            | Warning::RepaymentWithoutSender { transaction_id }
            | Warning::AmountOverflow { transaction_id }
            | Warning::NegativeAmount { transaction_id, .. } => transaction_id,
        }
    }
}
