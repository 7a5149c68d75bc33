//! Core types for settlement engine

use crate::{Error, Result};
use ledger_core::{checked_total, Balance, BalanceView, GroupId, ParticipantId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement node identifier: a whole group or a single participant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum NodeId {
    /// Group settled as one node
    Group(GroupId),
    /// Participant settled individually
    Participant(ParticipantId),
}

impl NodeId {
    /// Group node
    pub fn group(id: impl Into<String>) -> Self {
        NodeId::Group(GroupId::new(id))
    }

    /// Participant node
    pub fn participant(id: impl Into<String>) -> Self {
        NodeId::Participant(ParticipantId::new(id))
    }

    /// Underlying group or participant ID
    pub fn key(&self) -> &str {
        match self {
            NodeId::Group(id) => id.as_str(),
            NodeId::Participant(id) => id.as_str(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Group(id) => write!(f, "group:{}", id),
            NodeId::Participant(id) => write!(f, "participant:{}", id),
        }
    }
}

/// Round a net balance to the nearest whole currency unit
///
/// Midpoints round away from zero, so `-0.5` becomes `-1` and `0.5` becomes `1`.
pub fn round_to_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Aggregated balance of one settlement node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementNode {
    /// Node ID
    pub node_id: NodeId,

    /// Display label (group or participant name)
    pub label: String,

    /// Participants folded into this node
    pub member_ids: Vec<ParticipantId>,

    /// Sum of members' paid
    pub paid: Decimal,

    /// Sum of members' share
    pub share: Decimal,

    /// Sum of members' net, unrounded
    pub net: Decimal,

    /// Net rounded to whole units; drives classification
    pub rounded_net: Decimal,

    /// Marked as lead payer in the roster
    pub lead_payer: bool,
}

impl SettlementNode {
    /// Create node from an aggregated balance
    pub fn new(
        node_id: NodeId,
        label: impl Into<String>,
        member_ids: Vec<ParticipantId>,
        balance: Balance,
    ) -> Self {
        Self {
            node_id,
            label: label.into(),
            member_ids,
            paid: balance.paid,
            share: balance.share,
            net: balance.net,
            rounded_net: round_to_unit(balance.net),
            lead_payer: false,
        }
    }

    /// Create a node carrying only a net figure
    pub fn with_net(node_id: NodeId, label: impl Into<String>, net: Decimal) -> Self {
        Self::new(
            node_id,
            label,
            Vec::new(),
            Balance {
                paid: Decimal::ZERO,
                share: Decimal::ZERO,
                net,
            },
        )
    }

    /// Mark as lead payer
    pub fn as_lead_payer(mut self) -> Self {
        self.lead_payer = true;
        self
    }

    /// Owed money after rounding
    pub fn is_creditor(&self) -> bool {
        self.rounded_net > Decimal::ZERO
    }

    /// Owes money after rounding
    pub fn is_debtor(&self) -> bool {
        self.rounded_net < Decimal::ZERO
    }

    /// Absolute rounded net
    pub fn outstanding(&self) -> Decimal {
        self.rounded_net.abs()
    }
}

/// Flat list of settlement nodes, tagged with the view they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSet {
    view: BalanceView,
    nodes: Vec<SettlementNode>,
}

impl NodeSet {
    /// Create node set
    pub fn new(view: BalanceView, nodes: Vec<SettlementNode>) -> Self {
        Self { view, nodes }
    }

    /// View the balances were computed in
    pub fn view(&self) -> BalanceView {
        self.view
    }

    /// Nodes in roster order
    pub fn nodes(&self) -> &[SettlementNode] {
        &self.nodes
    }

    /// Iterate nodes
    pub fn iter(&self) -> std::slice::Iter<'_, SettlementNode> {
        self.nodes.iter()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node
    pub fn get(&self, node_id: &NodeId) -> Option<&SettlementNode> {
        self.nodes.iter().find(|n| &n.node_id == node_id)
    }

    /// Sum of rounded creditor balances
    pub fn total_credit(&self) -> Result<Decimal> {
        checked_total(
            self.nodes
                .iter()
                .filter(|n| n.is_creditor())
                .map(SettlementNode::outstanding),
        )
        .ok_or_else(|| Error::AmountOverflow("total credit".to_string()))
    }

    /// Sum of rounded debtor balances
    pub fn total_debit(&self) -> Result<Decimal> {
        checked_total(
            self.nodes
                .iter()
                .filter(|n| n.is_debtor())
                .map(SettlementNode::outstanding),
        )
        .ok_or_else(|| Error::AmountOverflow("total debit".to_string()))
    }

    /// Imbalance introduced by independent rounding
    pub fn rounding_gap(&self) -> Result<Decimal> {
        // Both totals are non-negative, so the difference always fits
        Ok((self.total_credit()? - self.total_debit()?).abs())
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a SettlementNode;
    type IntoIter = std::slice::Iter<'a, SettlementNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Suggested transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Paying node (debtor)
    pub from: NodeId,

    /// Receiving node (creditor)
    pub to: NodeId,

    /// Whole-unit amount
    pub amount: Decimal,

    /// Debtor label
    pub from_label: String,

    /// Creditor label
    pub to_label: String,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.from_label, self.to_label, self.amount)
    }
}

/// Netting statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NettingStats {
    /// Number of nodes considered
    pub node_count: usize,

    /// Number of creditor nodes
    pub creditor_count: usize,

    /// Number of debtor nodes
    pub debtor_count: usize,

    /// Σ rounded creditor balances
    pub total_credit: Decimal,

    /// Σ rounded debtor balances
    pub total_debit: Decimal,

    /// Σ suggested amounts
    pub transferred: Decimal,

    /// Credit left unmatched (rounding residual and dust)
    pub unmatched_credit: Decimal,

    /// Debt left unmatched (rounding residual and dust)
    pub unmatched_debit: Decimal,

    /// Number of suggestions
    pub suggestion_count: usize,
}

/// Suggestions plus statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPlan {
    /// Suggested transfers, in emission order
    pub suggestions: Vec<Suggestion>,

    /// Netting statistics
    pub stats: NettingStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_round_to_unit() {
        assert_eq!(round_to_unit(dec("33.3333")), dec("33"));
        assert_eq!(round_to_unit(dec("-66.6667")), dec("-67"));
        assert_eq!(round_to_unit(dec("0.5")), dec("1"));
        assert_eq!(round_to_unit(dec("-0.5")), dec("-1"));
        assert_eq!(round_to_unit(dec("0.4999")), Decimal::ZERO);
    }

    #[test]
    fn test_node_classification() {
        let creditor = SettlementNode::with_net(NodeId::group("F1"), "F1", dec("0.6"));
        assert!(creditor.is_creditor());
        assert_eq!(creditor.outstanding(), dec("1"));

        let dust = SettlementNode::with_net(NodeId::participant("A"), "A", dec("-0.3"));
        assert!(!dust.is_creditor());
        assert!(!dust.is_debtor());
    }

    #[test]
    fn test_node_set_totals() {
        let nodes = NodeSet::new(
            BalanceView::Settled,
            vec![
                SettlementNode::with_net(NodeId::group("F1"), "F1", dec("100.4")),
                SettlementNode::with_net(NodeId::group("F2"), "F2", dec("-50.4")),
                SettlementNode::with_net(NodeId::participant("C"), "C", dec("-50")),
            ],
        );
        assert_eq!(nodes.total_credit().unwrap(), dec("100"));
        assert_eq!(nodes.total_debit().unwrap(), dec("100"));
        assert_eq!(nodes.rounding_gap().unwrap(), Decimal::ZERO);
        assert!(nodes.get(&NodeId::participant("C")).is_some());
    }

    #[test]
    fn test_node_set_totals_overflow() {
        let huge = dec("50000000000000000000000000000");
        let nodes = NodeSet::new(
            BalanceView::Settled,
            vec![
                SettlementNode::with_net(NodeId::group("F1"), "F1", huge),
                SettlementNode::with_net(NodeId::group("F2"), "F2", huge),
                SettlementNode::with_net(NodeId::participant("C"), "C", -huge),
            ],
        );
        assert!(matches!(nodes.total_credit(), Err(Error::AmountOverflow(_))));
        assert_eq!(nodes.total_debit().unwrap(), huge);
        assert!(nodes.rounding_gap().is_err());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::group("F1").to_string(), "group:F1");
        assert_eq!(NodeId::participant("A").key(), "A");
    }
}
