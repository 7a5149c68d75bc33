//! Creditor priority
//!
//! Lead payers ("bankers") are repaid before every other creditor. Who counts
//! as a lead payer is data: an explicit node list, roster flags, or label
//! patterns from configuration, or any caller-supplied predicate.

use crate::types::SettlementNode;
use serde::{Deserialize, Serialize};

/// Decides whether a creditor belongs to the priority tier
pub trait CreditorPriority {
    /// True if `node` should be repaid first
    fn is_priority(&self, node: &SettlementNode) -> bool;
}

impl<F> CreditorPriority for F
where
    F: Fn(&SettlementNode) -> bool,
{
    fn is_priority(&self, node: &SettlementNode) -> bool {
        self(node)
    }
}

/// Configurable priority rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PriorityRule {
    /// No priority tier; creditors ordered by amount only
    None,

    /// Nodes flagged `leadPayer` in the roster
    #[default]
    LeadPayerFlag,

    /// Nodes whose group or participant ID is listed
    Nodes {
        /// Group or participant IDs
        ids: Vec<String>,
    },

    /// Nodes whose label contains any pattern (case-insensitive)
    LabelContains {
        /// Substrings to look for
        patterns: Vec<String>,
    },
}

impl CreditorPriority for PriorityRule {
    fn is_priority(&self, node: &SettlementNode) -> bool {
        match self {
            PriorityRule::None => false,
            PriorityRule::LeadPayerFlag => node.lead_payer,
            PriorityRule::Nodes { ids } => ids.iter().any(|id| id == node.node_id.key()),
            PriorityRule::LabelContains { patterns } => {
                let label = node.label.to_lowercase();
                patterns
                    .iter()
                    .filter(|p| !p.is_empty())
                    .any(|p| label.contains(&p.to_lowercase()))
            }
        }
    }
}
