//! Balance calculator
//!
//! Folds a transaction snapshot into per-participant `{paid, share, net}`
//! records plus audit logs. Pure: the same snapshot always yields the same
//! sheet, and nothing is cached between calls.
//!
//! # Rules
//!
//! - Expense: payer's `paid += amount`; each beneficiary's
//!   `share += amount / |beneficiaries|`.
//! - Repayment: sender's `paid += amount`; receiver's `paid -= amount`.
//!   `share` is never touched, so the amount moves from the receiver's net
//!   to the sender's net.
//! - Unpaid expense: skipped in the settled view; in the estimated view it
//!   adds share without crediting anyone.
//! - A transaction that would push any figure out of the decimal range is
//!   skipped whole and reported as `AmountOverflow`.

use crate::{
    audit::{get_audit_log, AuditLog, AuditLogs, LogEntry},
    error::{ParticipantRole, Warning},
    types::{
        checked_total, Balance, BalanceOptions, BalanceView, ParticipantId, Transaction,
        TransactionKind,
    },
    Error, Result,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of folding a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// View the sheet was computed in
    pub view: BalanceView,

    /// Balance per roster participant
    pub balances: BTreeMap<ParticipantId, Balance>,

    /// Audit log per roster participant
    pub logs: AuditLogs,

    /// Non-fatal issues, in transaction order
    pub warnings: Vec<Warning>,
}

impl BalanceSheet {
    /// Balance of one participant
    pub fn balance(&self, id: &ParticipantId) -> Option<&Balance> {
        self.balances.get(id)
    }

    /// Audit log of one participant
    pub fn audit_log(&self, id: &ParticipantId) -> Result<&AuditLog> {
        get_audit_log(id, &self.logs)
    }

    /// Sum of all nets (zero in the settled view)
    pub fn total_net(&self) -> Result<Decimal> {
        checked_total(self.balances.values().map(|b| b.net))
            .ok_or_else(|| Error::AmountOverflow("total net".to_string()))
    }

    /// Number of warnings raised
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Compute balances over a full transaction snapshot
///
/// Every ID in `participant_ids` gets a balance and a log, even if no
/// transaction touches it. References to other IDs are ignored and reported
/// as warnings.
pub fn compute_balances(
    transactions: &[Transaction],
    participant_ids: &[ParticipantId],
    options: BalanceOptions,
) -> BalanceSheet {
    let mut folder = BalanceFolder::new(participant_ids, options);

    for tx in transactions {
        folder.apply(tx);
    }

    let sheet = folder.finish();

    tracing::debug!(
        view = %sheet.view,
        transactions = transactions.len(),
        participants = sheet.balances.len(),
        warnings = sheet.warnings.len(),
        "Balances computed"
    );

    sheet
}

struct BalanceFolder {
    options: BalanceOptions,
    balances: BTreeMap<ParticipantId, Balance>,
    logs: AuditLogs,
    warnings: Vec<Warning>,
}

/// Axis a posting lands on
#[derive(Debug, Clone, Copy)]
enum Axis {
    Paid,
    Share,
}

/// Effects of one transaction, committed only if every balance stays in range
#[derive(Debug, Default)]
struct Pending {
    postings: Vec<(ParticipantId, Axis, Decimal)>,
    warnings: Vec<Warning>,
}

impl BalanceFolder {
    fn new(participant_ids: &[ParticipantId], options: BalanceOptions) -> Self {
        Self {
            options,
            balances: participant_ids
                .iter()
                .map(|id| (id.clone(), Balance::default()))
                .collect(),
            logs: participant_ids
                .iter()
                .map(|id| (id.clone(), AuditLog::default()))
                .collect(),
            warnings: Vec::new(),
        }
    }

    fn apply(&mut self, tx: &Transaction) {
        if tx.amount < Decimal::ZERO {
            self.warn(Warning::NegativeAmount {
                transaction_id: tx.id.clone(),
                amount: tx.amount,
            });
            return;
        }

        let pending = match tx.kind {
            TransactionKind::Repayment => self.apply_repayment(tx),
            TransactionKind::Expense => self.apply_expense(tx),
        };

        if let Some(pending) = pending {
            self.commit(tx, pending);
        }
    }

    fn apply_repayment(&mut self, tx: &Transaction) -> Option<Pending> {
        let receiver = match (tx.beneficiaries.len(), tx.beneficiaries.iter().next()) {
            (1, Some(receiver)) => receiver,
            (count, _) => {
                self.warn(Warning::MalformedRepayment {
                    transaction_id: tx.id.clone(),
                    beneficiary_count: count,
                });
                return None;
            }
        };

        let Some(sender) = &tx.payer_id else {
            self.warn(Warning::RepaymentWithoutSender {
                transaction_id: tx.id.clone(),
            });
            return None;
        };

        let mut pending = Pending::default();
        self.post(&mut pending, tx, sender, Axis::Paid, tx.amount, ParticipantRole::Payer);
        self.post(
            &mut pending,
            tx,
            receiver,
            Axis::Paid,
            -tx.amount,
            ParticipantRole::Beneficiary,
        );
        Some(pending)
    }

    fn apply_expense(&mut self, tx: &Transaction) -> Option<Pending> {
        if tx.payer_id.is_none() && !self.options.include_unpaid {
            tracing::trace!(transaction = %tx.id, "Skipping unpaid expense in settled view");
            return None;
        }

        let mut pending = Pending::default();

        if let Some(payer) = &tx.payer_id {
            self.post(&mut pending, tx, payer, Axis::Paid, tx.amount, ParticipantRole::Payer);
        }

        if !tx.beneficiaries.is_empty() {
            let per_head = tx.amount / Decimal::from(tx.beneficiaries.len());
            for beneficiary in &tx.beneficiaries {
                self.post(
                    &mut pending,
                    tx,
                    beneficiary,
                    Axis::Share,
                    per_head,
                    ParticipantRole::Beneficiary,
                );
            }
        }

        Some(pending)
    }

    fn post(
        &self,
        pending: &mut Pending,
        tx: &Transaction,
        id: &ParticipantId,
        axis: Axis,
        amount: Decimal,
        role: ParticipantRole,
    ) {
        if self.balances.contains_key(id) {
            pending.postings.push((id.clone(), axis, amount));
        } else {
            pending.warnings.push(Warning::UnknownParticipant {
                transaction_id: tx.id.clone(),
                participant_id: id.clone(),
                role,
            });
        }
    }

    fn commit(&mut self, tx: &Transaction, pending: Pending) {
        for warning in pending.warnings {
            self.warn(warning);
        }

        // Stage every touched balance first; nothing lands if one overflows
        let mut staged: BTreeMap<&ParticipantId, Balance> = BTreeMap::new();
        for (id, axis, amount) in &pending.postings {
            let current = staged
                .get(id)
                .or_else(|| self.balances.get(id))
                .copied()
                .unwrap_or_default();

            match posted(current, *axis, *amount) {
                Some(next) => {
                    staged.insert(id, next);
                }
                None => {
                    self.warn(Warning::AmountOverflow {
                        transaction_id: tx.id.clone(),
                    });
                    return;
                }
            }
        }

        for (id, balance) in staged {
            self.balances.insert(id.clone(), balance);
        }

        for (id, axis, amount) in &pending.postings {
            if let Some(log) = self.logs.get_mut(id) {
                match axis {
                    Axis::Paid => log.paid_items.push(entry(tx, *amount)),
                    Axis::Share => log.share_items.push(entry(tx, *amount)),
                }
            }
        }
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "Ledger data-quality issue");
        self.warnings.push(warning);
    }

    fn finish(self) -> BalanceSheet {
        BalanceSheet {
            view: self.options.view(),
            balances: self.balances,
            logs: self.logs,
            warnings: self.warnings,
        }
    }
}

/// Balance after one posting, or `None` if any figure leaves the decimal range
fn posted(current: Balance, axis: Axis, amount: Decimal) -> Option<Balance> {
    let (paid, share) = match axis {
        Axis::Paid => (current.paid.checked_add(amount)?, current.share),
        Axis::Share => (current.paid, current.share.checked_add(amount)?),
    };
    let net = paid.checked_sub(share)?;
    Some(Balance { paid, share, net })
}

fn entry(tx: &Transaction, amount: Decimal) -> LogEntry {
    LogEntry {
        transaction_id: tx.id.clone(),
        kind: tx.kind,
        title: tx.title.clone(),
        amount,
        date: tx.date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ids(list: &[&str]) -> Vec<ParticipantId> {
        list.iter().map(|id| ParticipantId::new(*id)).collect()
    }

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn net(sheet: &BalanceSheet, id: &str) -> Decimal {
        sheet.balance(&ParticipantId::new(id)).unwrap().net
    }

    #[test]
    fn test_expense_split_evenly() {
        let txs = vec![Transaction::expense("t1", dec(300), Some("A"), ["A", "B", "C"])];
        let sheet = compute_balances(&txs, &ids(&["A", "B", "C"]), BalanceOptions::default());

        assert_eq!(net(&sheet, "A"), dec(200));
        assert_eq!(net(&sheet, "B"), dec(-100));
        assert_eq!(net(&sheet, "C"), dec(-100));
        assert_eq!(sheet.total_net().unwrap(), Decimal::ZERO);
        assert_eq!(sheet.warning_count(), 0);
    }

    #[test]
    fn test_repayment_moves_paid_axis() {
        // Sender's paid grows, receiver's paid goes negative; share is untouched.
        let txs = vec![
            Transaction::expense("t1", dec(300), Some("A"), ["A", "B", "C"]),
            Transaction::repayment("r1", dec(100), "A", "B"),
        ];
        let sheet = compute_balances(&txs, &ids(&["A", "B", "C"]), BalanceOptions::default());

        let a = sheet.balance(&ParticipantId::new("A")).unwrap();
        assert_eq!(a.paid, dec(400));
        assert_eq!(a.share, dec(100));
        assert_eq!(a.net, dec(300));

        let b = sheet.balance(&ParticipantId::new("B")).unwrap();
        assert_eq!(b.paid, dec(-100));
        assert_eq!(b.share, dec(100));
        assert_eq!(b.net, dec(-200));

        assert_eq!(net(&sheet, "C"), dec(-100));
    }

    #[test]
    fn test_unpaid_expense_views() {
        let txs = vec![Transaction::expense("t1", dec(90), None, ["A", "B", "C"])];
        let participants = ids(&["A", "B", "C"]);

        let settled = compute_balances(&txs, &participants, BalanceOptions::default());
        assert_eq!(settled.view, BalanceView::Settled);
        assert!(settled.balances.values().all(|b| *b == Balance::default()));
        assert!(settled.logs.values().all(AuditLog::is_empty));

        let estimated = compute_balances(
            &txs,
            &participants,
            BalanceOptions { include_unpaid: true },
        );
        assert_eq!(estimated.view, BalanceView::Estimated);
        for balance in estimated.balances.values() {
            assert_eq!(balance.paid, Decimal::ZERO);
            assert_eq!(balance.share, dec(30));
        }
        assert_eq!(estimated.total_net().unwrap(), dec(-90));
    }

    #[test]
    fn test_empty_beneficiaries_credit_payer_only() {
        let txs = vec![Transaction::expense("t1", dec(50), Some("A"), Vec::<String>::new())];
        let sheet = compute_balances(&txs, &ids(&["A", "B"]), BalanceOptions::default());

        assert_eq!(net(&sheet, "A"), dec(50));
        assert_eq!(net(&sheet, "B"), Decimal::ZERO);
        assert_eq!(sheet.total_net().unwrap(), dec(50));
    }

    #[test]
    fn test_unknown_participant_ignored_with_warning() {
        let txs = vec![Transaction::expense("t1", dec(100), Some("Z"), ["A", "Y"])];
        let sheet = compute_balances(&txs, &ids(&["A"]), BalanceOptions::default());

        // Divisor is the full beneficiary set; Y's half is dropped
        assert_eq!(net(&sheet, "A"), dec(-50));
        assert_eq!(sheet.warning_count(), 2);
        assert!(matches!(
            &sheet.warnings[0],
            Warning::UnknownParticipant { role: ParticipantRole::Payer, participant_id, .. }
                if participant_id.as_str() == "Z"
        ));
        assert!(matches!(
            &sheet.warnings[1],
            Warning::UnknownParticipant { role: ParticipantRole::Beneficiary, .. }
        ));
    }

    #[test]
    fn test_malformed_repayment_skipped() {
        let mut two_receivers = Transaction::repayment("r1", dec(100), "A", "B");
        two_receivers.beneficiaries = BTreeSet::from([ParticipantId::new("B"), ParticipantId::new("C")]);

        let mut no_sender = Transaction::repayment("r2", dec(40), "A", "B");
        no_sender.payer_id = None;

        let sheet = compute_balances(
            &[two_receivers, no_sender],
            &ids(&["A", "B", "C"]),
            BalanceOptions::default(),
        );

        assert!(sheet.balances.values().all(|b| *b == Balance::default()));
        assert_eq!(
            sheet.warnings,
            vec![
                Warning::MalformedRepayment {
                    transaction_id: crate::types::TransactionId::new("r1"),
                    beneficiary_count: 2,
                },
                Warning::RepaymentWithoutSender {
                    transaction_id: crate::types::TransactionId::new("r2"),
                },
            ]
        );
    }

    #[test]
    fn test_negative_amount_skipped() {
        let txs = vec![Transaction::expense("t1", dec(-10), Some("A"), ["A", "B"])];
        let sheet = compute_balances(&txs, &ids(&["A", "B"]), BalanceOptions::default());

        assert_eq!(sheet.warning_count(), 1);
        assert!(matches!(sheet.warnings[0], Warning::NegativeAmount { .. }));
        assert_eq!(sheet.total_net().unwrap(), Decimal::ZERO);
    }

    fn huge() -> Decimal {
        "50000000000000000000000000000".parse().unwrap()
    }

    #[test]
    fn test_overflowing_expense_skipped_whole() {
        let txs = vec![
            Transaction::expense("t1", huge(), Some("A"), ["B"]),
            Transaction::expense("t2", huge(), Some("A"), ["B"]),
            Transaction::expense("t3", dec(10), Some("B"), ["A"]),
        ];
        let sheet = compute_balances(&txs, &ids(&["A", "B"]), BalanceOptions::default());

        assert_eq!(
            sheet.warnings,
            vec![Warning::AmountOverflow {
                transaction_id: crate::types::TransactionId::new("t2"),
            }]
        );

        // Neither side of t2 landed; later transactions still apply
        let a = sheet.balance(&ParticipantId::new("A")).unwrap();
        assert_eq!(a.paid, huge());
        assert_eq!(a.share, dec(10));
        let b = sheet.balance(&ParticipantId::new("B")).unwrap();
        assert_eq!(b.share, huge());
        assert_eq!(b.paid, dec(10));

        let log = sheet.audit_log(&ParticipantId::new("B")).unwrap();
        assert_eq!(log.share_items.len(), 1);
        assert_eq!(sheet.total_net().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_net_skips_repayment() {
        // B's paid and share both fit, but net = paid - share does not
        let txs = vec![
            Transaction::expense("t1", huge(), Some("A"), ["B"]),
            Transaction::repayment("r1", huge(), "C", "B"),
        ];
        let sheet = compute_balances(&txs, &ids(&["A", "B", "C"]), BalanceOptions::default());

        assert_eq!(sheet.warning_count(), 1);
        assert!(matches!(sheet.warnings[0], Warning::AmountOverflow { .. }));
        assert_eq!(net(&sheet, "B"), -huge());
        assert_eq!(net(&sheet, "C"), Decimal::ZERO);
        assert!(sheet.audit_log(&ParticipantId::new("C")).unwrap().is_empty());
    }

    #[test]
    fn test_total_net_overflow_reported() {
        let txs = vec![
            Transaction::expense("t1", huge(), Some("A"), ["C"]),
            Transaction::expense("t2", huge(), Some("B"), ["D"]),
        ];
        let sheet = compute_balances(&txs, &ids(&["A", "B", "C", "D"]), BalanceOptions::default());

        assert_eq!(sheet.warning_count(), 0);
        assert!(matches!(sheet.total_net(), Err(Error::AmountOverflow(_))));
    }

    #[test]
    fn test_audit_log_keeps_insertion_order() {
        let txs = vec![
            Transaction::expense("t2", dec(60), Some("A"), ["A", "B"]).titled("Dinner"),
            Transaction::expense("t1", dec(30), Some("B"), ["A"]).titled("Taxi"),
            Transaction::repayment("r1", dec(10), "B", "A").titled("Cash back"),
        ];
        let sheet = compute_balances(&txs, &ids(&["A", "B"]), BalanceOptions::default());

        let a = sheet.audit_log(&ParticipantId::new("A")).unwrap();
        let paid: Vec<_> = a.paid_items.iter().map(|e| (e.title.as_str(), e.amount)).collect();
        assert_eq!(paid, vec![("Dinner", dec(60)), ("Cash back", dec(-10))]);
        let share: Vec<_> = a.share_items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(share, vec!["Dinner", "Taxi"]);

        assert_eq!(a.total_paid().unwrap() - a.total_share().unwrap(), net(&sheet, "A"));
    }

    #[test]
    fn test_empty_snapshot() {
        let sheet = compute_balances(&[], &ids(&["A", "B"]), BalanceOptions::default());
        assert_eq!(sheet.balances.len(), 2);
        assert!(sheet.balances.values().all(|b| *b == Balance::default()));
        assert_eq!(sheet.warning_count(), 0);
    }
}
