//! Ingestion boundary
//!
//! Normalizes externally stored records into engine types. Collaborators have
//! written beneficiaries both as a single ID and as a list, and the payer as
//! absent, empty or the literal `NONE`; only typed values leave this module.
//! An unrecognized transaction kind rejects the record instead of guessing.

use crate::{
    roster::Roster,
    types::{Group, Participant, ParticipantId, Transaction, TransactionId, TransactionKind},
    Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Payer sentinel meaning "not yet paid by anyone"
pub const NO_PAYER: &str = "NONE";

const KINDS: &[&str] = &["expense", "repayment"];

fn kind_any_case<'de, D>(deserializer: D) -> std::result::Result<Option<TransactionKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|kind| match kind.trim() {
        k if k.eq_ignore_ascii_case("expense") => Ok(TransactionKind::Expense),
        k if k.eq_ignore_ascii_case("repayment") => Ok(TransactionKind::Repayment),
        other => Err(de::Error::unknown_variant(other, KINDS)),
    })
    .transpose()
}

/// Beneficiaries as found in stored records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeneficiaryField {
    /// Legacy single-ID form
    Single(String),
    /// List form
    Many(Vec<String>),
}

impl BeneficiaryField {
    fn into_set(self) -> BTreeSet<ParticipantId> {
        let ids = match self {
            BeneficiaryField::Single(id) => vec![id],
            BeneficiaryField::Many(ids) => ids,
        };
        ids.into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(ParticipantId::new)
            .collect()
    }
}

/// Transaction as stored by the editing side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction ID
    pub id: String,

    /// Amount, already converted to the home currency
    pub amount: Decimal,

    /// Payer ID, empty or `NONE` when unpaid
    #[serde(default)]
    pub payer_id: Option<String>,

    /// Beneficiaries in either stored shape
    #[serde(default)]
    pub beneficiaries: Option<BeneficiaryField>,

    /// `expense` or `repayment`, any case; absent means expense
    #[serde(default, deserialize_with = "kind_any_case")]
    pub kind: Option<TransactionKind>,

    /// Explicit settled flag
    #[serde(default)]
    pub is_settled: Option<bool>,

    /// Date
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Title
    #[serde(default)]
    pub title: String,

    /// Note
    #[serde(default)]
    pub note: Option<String>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let kind = record.kind.unwrap_or(TransactionKind::Expense);

        let payer_id = record
            .payer_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(NO_PAYER))
            .map(ParticipantId::new);

        let is_settled = record.is_settled.unwrap_or(match kind {
            TransactionKind::Repayment => true,
            TransactionKind::Expense => payer_id.is_some(),
        });

        Transaction {
            id: TransactionId::new(record.id),
            amount: record.amount,
            payer_id,
            beneficiaries: record
                .beneficiaries
                .map(BeneficiaryField::into_set)
                .unwrap_or_default(),
            kind,
            is_settled,
            date: record.date,
            title: record.title,
            note: record.note,
        }
    }
}

/// Full input document: roster plus transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// Participants
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Groups
    #[serde(default)]
    pub groups: Vec<Group>,

    /// Transactions in insertion order
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

impl LedgerSnapshot {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated roster
    pub fn roster(&self) -> Result<Roster> {
        Roster::new(self.participants.clone(), self.groups.clone())
    }

    /// Normalized transactions
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.iter().cloned().map(Transaction::from).collect()
    }
}
