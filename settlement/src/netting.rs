//! Debt simplification
//!
//! Greedy, priority-ordered matching of debtors to creditors.
//!
//! # Algorithm
//!
//! 1. Classify nodes by rounded net: creditors (> 0), debtors (< 0)
//! 2. Sort debtors by amount owed, largest first
//! 3. Split creditors into the priority tier and the rest, sort each tier
//!    largest first, then concatenate (priority tier first)
//! 4. Walk both lists with one cursor each, transferring
//!    `min(creditor, debtor)` and advancing whichever side falls below the
//!    dust threshold
//!
//! Not globally minimal in transfer count; deterministic and linear after
//! sorting. Lead payers are always repaid before anyone else.
//!
//! # Example
//!
//! ```text
//! Nodes:
//!   F1: +500 (lead payer)
//!   F2: +200
//!   D:  -500
//!
//! Transfers:
//!   D pays F1: 500
//!
//! F2 stays unmatched: D's debt is absorbed by the lead payer first.
//! ```

use crate::{
    priority::CreditorPriority,
    types::*,
    Error, Result,
};
use ledger_core::BalanceView;
use rust_decimal::Decimal;

/// Remaining balance below this many units is treated as settled
pub const DEFAULT_DUST_THRESHOLD: Decimal = Decimal::ONE;

/// Debt simplifier
#[derive(Debug, Clone)]
pub struct DebtSimplifier {
    /// Dust threshold
    dust_threshold: Decimal,
}

impl Default for DebtSimplifier {
    fn default() -> Self {
        Self {
            dust_threshold: DEFAULT_DUST_THRESHOLD,
        }
    }
}

/// Node with the amount still to be matched
#[derive(Debug)]
struct Position<'a> {
    node: &'a SettlementNode,
    remaining: Decimal,
}

impl DebtSimplifier {
    /// Create new simplifier
    pub fn new(dust_threshold: Decimal) -> Result<Self> {
        if dust_threshold <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "dust threshold must be positive, got {}",
                dust_threshold
            )));
        }
        Ok(Self { dust_threshold })
    }

    /// Dust threshold
    pub fn dust_threshold(&self) -> Decimal {
        self.dust_threshold
    }

    /// Compute suggested transfers with statistics
    pub fn simplify(
        &self,
        nodes: &NodeSet,
        priority: &dyn CreditorPriority,
    ) -> Result<SettlementPlan> {
        if nodes.view() != BalanceView::Settled {
            return Err(Error::EstimatedView(nodes.view()));
        }

        let mut debtors: Vec<Position<'_>> = nodes
            .iter()
            .filter(|n| n.is_debtor())
            .map(|node| Position {
                node,
                remaining: node.outstanding(),
            })
            .collect();
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut creditors = self.order_creditors(nodes, priority);

        let mut stats = NettingStats {
            node_count: nodes.len(),
            creditor_count: creditors.len(),
            debtor_count: debtors.len(),
            total_credit: nodes.total_credit()?,
            total_debit: nodes.total_debit()?,
            ..Default::default()
        };

        let mut suggestions = Vec::new();
        let (mut d, mut c) = (0, 0);

        while d < debtors.len() && c < creditors.len() {
            let debtor = &mut debtors[d];
            let creditor = &mut creditors[c];

            let amount = creditor.remaining.min(debtor.remaining);
            if amount > Decimal::ZERO {
                suggestions.push(Suggestion {
                    from: debtor.node.node_id.clone(),
                    to: creditor.node.node_id.clone(),
                    amount,
                    from_label: debtor.node.label.clone(),
                    to_label: creditor.node.label.clone(),
                });
                stats.transferred += amount;
            }

            debtor.remaining -= amount;
            creditor.remaining -= amount;

            if creditor.remaining < self.dust_threshold {
                c += 1;
            }
            if debtor.remaining < self.dust_threshold {
                d += 1;
            }
        }

        // Remainders never exceed the checked totals above
        stats.unmatched_credit = creditors.iter().map(|p| p.remaining).sum();
        stats.unmatched_debit = debtors.iter().map(|p| p.remaining).sum();
        stats.suggestion_count = suggestions.len();

        tracing::debug!(
            creditors = stats.creditor_count,
            debtors = stats.debtor_count,
            suggestions = stats.suggestion_count,
            unmatched_credit = %stats.unmatched_credit,
            unmatched_debit = %stats.unmatched_debit,
            "Debts simplified"
        );

        Ok(SettlementPlan { suggestions, stats })
    }

    /// Priority tier first, each tier largest first; ties keep roster order
    fn order_creditors<'a>(
        &self,
        nodes: &'a NodeSet,
        priority: &dyn CreditorPriority,
    ) -> Vec<Position<'a>> {
        let (mut first, mut rest): (Vec<_>, Vec<_>) = nodes
            .iter()
            .filter(|n| n.is_creditor())
            .map(|node| Position {
                node,
                remaining: node.outstanding(),
            })
            .partition(|p| priority.is_priority(p.node));

        first.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        rest.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        first.extend(rest);
        first
    }
}

/// Suggested transfers with the default dust threshold
pub fn simplify_debts(
    nodes: &NodeSet,
    priority: &dyn CreditorPriority,
) -> Result<Vec<Suggestion>> {
    Ok(DebtSimplifier::default()
        .simplify(nodes, priority)?
        .suggestions)
}
