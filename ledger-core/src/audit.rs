//! Per-participant audit trail
//!
//! Answers "why is my balance this number": one entry per contributing
//! transaction, in transaction insertion order.

use crate::{
    types::{checked_total, ParticipantId, TransactionId, TransactionKind},
    Error, Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line item attributed to a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Source transaction
    pub transaction_id: TransactionId,

    /// Source transaction kind
    pub kind: TransactionKind,

    /// Transaction title
    pub title: String,

    /// Signed amount attributed to the participant
    pub amount: Decimal,

    /// Transaction date
    pub date: Option<NaiveDate>,
}

/// Contributions to one participant's balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Entries on the `paid` axis
    pub paid_items: Vec<LogEntry>,

    /// Entries on the `share` axis
    pub share_items: Vec<LogEntry>,
}

impl AuditLog {
    /// Sum of paid entries
    pub fn total_paid(&self) -> Result<Decimal> {
        checked_total(self.paid_items.iter().map(|e| e.amount))
            .ok_or_else(|| Error::AmountOverflow("total paid".to_string()))
    }

    /// Sum of share entries
    pub fn total_share(&self) -> Result<Decimal> {
        checked_total(self.share_items.iter().map(|e| e.amount))
            .ok_or_else(|| Error::AmountOverflow("total share".to_string()))
    }

    /// Whether nothing contributed to this balance
    pub fn is_empty(&self) -> bool {
        self.paid_items.is_empty() && self.share_items.is_empty()
    }
}

/// Audit logs keyed by participant
pub type AuditLogs = BTreeMap<ParticipantId, AuditLog>;

/// Look up one participant's audit log
pub fn get_audit_log<'a>(participant_id: &ParticipantId, logs: &'a AuditLogs) -> Result<&'a AuditLog> {
    logs.get(participant_id)
        .ok_or_else(|| Error::UnknownParticipant(participant_id.to_string()))
}
