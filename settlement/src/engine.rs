//! Main settlement engine
//!
//! Orchestrates balance computation, group aggregation and debt
//! simplification over a freshly pulled snapshot. The engine keeps no state
//! between calls: when the source changes, call it again.

use crate::{
    aggregate::aggregate_by_group,
    config::Config,
    netting::DebtSimplifier,
    priority::CreditorPriority,
    types::*,
    Error, Result,
};
use ledger_core::{
    compute_balances, AuditLog, Balance, BalanceOptions, BalanceSheet, BalanceView,
    JsonSnapshotSource, ParticipantId, Roster, RosterSource, TransactionSource,
};
use serde::Serialize;

/// Full settled-view result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// Per-participant balances, logs and warnings
    pub sheet: BalanceSheet,

    /// Aggregated settlement nodes
    pub nodes: NodeSet,

    /// Suggested transfers
    pub plan: SettlementPlan,
}

/// Estimated-view result; never carries suggestions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateReport {
    /// Per-participant balances, logs and warnings
    pub sheet: BalanceSheet,

    /// Aggregated nodes
    pub nodes: NodeSet,
}

/// Why a participant has the balance they have
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Participant
    pub participant_id: ParticipantId,

    /// Display name
    pub name: String,

    /// View the balance was computed in
    pub view: BalanceView,

    /// Resulting balance
    pub balance: Balance,

    /// Contributing line items
    pub log: AuditLog,
}

/// Settlement engine
pub struct SettlementEngine<S> {
    /// Transaction and roster source
    source: S,

    /// Debt simplifier
    simplifier: DebtSimplifier,

    /// Priority creditor rule
    priority: Box<dyn CreditorPriority + Send + Sync>,

    /// Configuration
    config: Config,
}

impl<S> std::fmt::Debug for SettlementEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("simplifier", &self.simplifier)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SettlementEngine<JsonSnapshotSource> {
    /// Create engine reading the configured snapshot file
    pub fn from_config(config: Config) -> Result<Self> {
        let path = config
            .ledger
            .snapshot_path
            .clone()
            .ok_or_else(|| Error::Config("ledger.snapshot_path is not set".to_string()))?;
        Self::new(config, JsonSnapshotSource::new(path))
    }
}

impl<S> SettlementEngine<S>
where
    S: TransactionSource + RosterSource,
{
    /// Create new settlement engine
    pub fn new(config: Config, source: S) -> Result<Self> {
        let simplifier = DebtSimplifier::new(config.netting.dust_threshold)?;
        let priority = Box::new(config.netting.priority.clone());

        Ok(Self {
            source,
            simplifier,
            priority,
            config,
        })
    }

    /// Replace the configured priority rule
    pub fn with_priority(mut self, priority: impl CreditorPriority + Send + Sync + 'static) -> Self {
        self.priority = Box::new(priority);
        self
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Per-participant balances in the given view
    pub fn balances(&self, view: BalanceView) -> Result<BalanceSheet> {
        let (sheet, _) = self.compute(view)?;
        Ok(sheet)
    }

    /// Per-participant balances in the configured default view
    pub fn default_balances(&self) -> Result<BalanceSheet> {
        self.balances(self.config.ledger.default_view())
    }

    /// Group and individual node balances in the given view
    pub fn group_balances(&self, view: BalanceView) -> Result<NodeSet> {
        let (sheet, roster) = self.compute(view)?;
        aggregate_by_group(&sheet, &roster)
    }

    /// Suggested transfers for a node set
    pub fn simplify(&self, nodes: &NodeSet) -> Result<SettlementPlan> {
        self.simplifier.simplify(nodes, self.priority.as_ref())
    }

    /// Run the full settled-view pipeline
    pub fn settle(&self) -> Result<SettlementReport> {
        let (sheet, roster) = self.compute(BalanceView::Settled)?;
        let nodes = aggregate_by_group(&sheet, &roster)?;
        let plan = self.simplify(&nodes)?;

        tracing::info!(
            participants = sheet.balances.len(),
            nodes = nodes.len(),
            suggestions = plan.suggestions.len(),
            warnings = sheet.warning_count(),
            "Settlement computed"
        );

        Ok(SettlementReport { sheet, nodes, plan })
    }

    /// Forward-looking balances including unpaid expenses
    pub fn estimate(&self) -> Result<EstimateReport> {
        let (sheet, roster) = self.compute(BalanceView::Estimated)?;
        let nodes = aggregate_by_group(&sheet, &roster)?;

        tracing::info!(
            participants = sheet.balances.len(),
            nodes = nodes.len(),
            warnings = sheet.warning_count(),
            "Estimate computed"
        );

        Ok(EstimateReport { sheet, nodes })
    }

    /// Audit trail behind one participant's balance
    pub fn explain(&self, participant_id: &ParticipantId, view: BalanceView) -> Result<Explanation> {
        let (mut sheet, roster) = self.compute(view)?;

        let balance = sheet
            .balance(participant_id)
            .copied()
            .ok_or_else(|| ledger_core::Error::UnknownParticipant(participant_id.to_string()))?;
        let log = sheet
            .logs
            .remove(participant_id)
            .ok_or_else(|| ledger_core::Error::UnknownParticipant(participant_id.to_string()))?;

        Ok(Explanation {
            participant_id: participant_id.clone(),
            name: roster.display_name(participant_id),
            view,
            balance,
            log,
        })
    }

    fn compute(&self, view: BalanceView) -> Result<(BalanceSheet, Roster)> {
        let roster = self.source.roster()?;
        let transactions = self.source.transactions()?;

        let sheet = compute_balances(
            &transactions,
            &roster.participant_ids(),
            BalanceOptions::for_view(view),
        );

        Ok((sheet, roster))
    }
}
