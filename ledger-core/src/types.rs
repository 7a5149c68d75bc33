//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic recomputation (ordered collections, no clocks)
//! - Exact arithmetic (Decimal for money)
//! - Plain serde round-tripping at the ingestion boundary

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Participant identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Group (family) identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Create new group ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create new transaction ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person tracked by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub name: String,

    /// Group this participant belongs to, if any
    #[serde(default)]
    pub group_id: Option<GroupId>,

    /// Repaid before other creditors when settling as an individual
    #[serde(default)]
    pub lead_payer: bool,
}

impl Participant {
    /// Create new participant without a group
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            group_id: None,
            lead_payer: false,
        }
    }

    /// Assign to a group
    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(GroupId::new(group_id));
        self
    }

    /// Mark as lead payer
    pub fn as_lead_payer(mut self) -> Self {
        self.lead_payer = true;
        self
    }
}

/// A named collection of participants settled as one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group ID
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Members
    #[serde(default)]
    pub member_ids: BTreeSet<ParticipantId>,

    /// Display colour, unused by the engine
    #[serde(default)]
    pub color: Option<String>,

    /// Members of this group are settled one by one, never summed
    #[serde(default)]
    pub is_individuals_group: bool,

    /// Repaid before other creditors
    #[serde(default)]
    pub lead_payer: bool,
}

impl Group {
    /// Create new group with the given members
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: GroupId::new(id),
            name: name.into(),
            member_ids: members.into_iter().map(ParticipantId::new).collect(),
            color: None,
            is_individuals_group: false,
            lead_payer: false,
        }
    }

    /// Mark as the individuals group
    pub fn individuals(mut self) -> Self {
        self.is_individuals_group = true;
        self
    }

    /// Mark as lead payer
    pub fn as_lead_payer(mut self) -> Self {
        self.lead_payer = true;
        self
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money spent by one payer on behalf of the beneficiaries
    Expense,
    /// Direct transfer from the payer to the single beneficiary
    Repayment,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Expense => write!(f, "EXPENSE"),
            TransactionKind::Repayment => write!(f, "REPAYMENT"),
        }
    }
}

/// Money-movement record, the ledger's atomic unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction ID
    pub id: TransactionId,

    /// Amount in the home currency unit
    pub amount: Decimal,

    /// Payer (`None` = not yet paid by anyone)
    pub payer_id: Option<ParticipantId>,

    /// Participants the amount is divided among
    pub beneficiaries: BTreeSet<ParticipantId>,

    /// Kind
    pub kind: TransactionKind,

    /// Settled flag
    pub is_settled: bool,

    /// Date, display only
    pub date: Option<NaiveDate>,

    /// Title, display only
    pub title: String,

    /// Free-form note, display only
    pub note: Option<String>,
}

impl Transaction {
    /// Create an expense; settled iff a payer is present
    pub fn expense<I, S>(
        id: impl Into<String>,
        amount: Decimal,
        payer_id: Option<&str>,
        beneficiaries: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let payer_id = payer_id.map(ParticipantId::new);
        Self {
            id: TransactionId::new(id),
            amount,
            is_settled: payer_id.is_some(),
            payer_id,
            beneficiaries: beneficiaries.into_iter().map(ParticipantId::new).collect(),
            kind: TransactionKind::Expense,
            date: None,
            title: String::new(),
            note: None,
        }
    }

    /// Create a repayment from `sender` to `receiver`
    pub fn repayment(
        id: impl Into<String>,
        amount: Decimal,
        sender: &str,
        receiver: &str,
    ) -> Self {
        Self {
            id: TransactionId::new(id),
            amount,
            payer_id: Some(ParticipantId::new(sender)),
            beneficiaries: BTreeSet::from([ParticipantId::new(receiver)]),
            kind: TransactionKind::Repayment,
            is_settled: true,
            date: None,
            title: String::new(),
            note: None,
        }
    }

    /// Set title
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set date
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether an expense has no payer yet
    pub fn is_unpaid(&self) -> bool {
        self.kind == TransactionKind::Expense && self.payer_id.is_none()
    }
}

/// Per-participant balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Total paid (repayments move this axis)
    pub paid: Decimal,

    /// Total share of expenses
    pub share: Decimal,

    /// `paid - share`; positive = owed money, negative = owes money
    pub net: Decimal,
}

/// Sum amounts, or `None` if the total leaves the decimal range
pub fn checked_total<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// Which transactions a balance sheet was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceView {
    /// Unpaid expenses skipped; zero-sum
    #[default]
    Settled,
    /// Unpaid expenses counted as share only; not zero-sum
    Estimated,
}

impl fmt::Display for BalanceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceView::Settled => write!(f, "settled"),
            BalanceView::Estimated => write!(f, "estimated"),
        }
    }
}

/// Options for balance computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceOptions {
    /// Count unpaid expenses as share (estimated view)
    pub include_unpaid: bool,
}

impl BalanceOptions {
    /// Options for the given view
    pub fn for_view(view: BalanceView) -> Self {
        Self {
            include_unpaid: view == BalanceView::Estimated,
        }
    }

    /// View these options produce
    pub fn view(&self) -> BalanceView {
        if self.include_unpaid {
            BalanceView::Estimated
        } else {
            BalanceView::Settled
        }
    }
}
