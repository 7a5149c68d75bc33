//! Group aggregation
//!
//! Turns per-participant balances into settlement nodes:
//!
//! - each ordinary group becomes one node summing its members
//! - each member of the individuals group becomes its own node
//! - participants in no group become their own node, after all groups
//!
//! Node order follows the roster, which makes later tie-breaking stable.
//! A group whose summed balance leaves the decimal range fails the whole
//! aggregation with `Error::AmountOverflow`.

use crate::{
    types::{NodeId, NodeSet, SettlementNode},
    Error, Result,
};
use ledger_core::{Balance, BalanceSheet, Group, Participant, ParticipantId, Roster};

/// Aggregate a balance sheet by roster group
pub fn aggregate_by_group(sheet: &BalanceSheet, roster: &Roster) -> Result<NodeSet> {
    let mut nodes = Vec::with_capacity(roster.groups().len());

    for group in roster.groups() {
        let members = members_in_roster_order(group, roster);

        if group.is_individuals_group {
            nodes.extend(members.into_iter().map(|p| individual_node(p, sheet)));
        } else {
            nodes.push(group_node(group, &members, sheet)?);
        }
    }

    nodes.extend(roster.ungrouped().map(|p| individual_node(p, sheet)));

    tracing::debug!(
        view = %sheet.view,
        nodes = nodes.len(),
        "Balances aggregated by group"
    );

    Ok(NodeSet::new(sheet.view, nodes))
}

fn members_in_roster_order<'a>(group: &Group, roster: &'a Roster) -> Vec<&'a Participant> {
    roster
        .participants()
        .iter()
        .filter(|p| group.member_ids.contains(&p.id))
        .collect()
}

fn balance_of(sheet: &BalanceSheet, id: &ParticipantId) -> Balance {
    sheet.balance(id).copied().unwrap_or_default()
}

fn individual_node(participant: &Participant, sheet: &BalanceSheet) -> SettlementNode {
    let mut node = SettlementNode::new(
        NodeId::Participant(participant.id.clone()),
        participant.name.clone(),
        vec![participant.id.clone()],
        balance_of(sheet, &participant.id),
    );
    node.lead_payer = participant.lead_payer;
    node
}

fn group_node(
    group: &Group,
    members: &[&Participant],
    sheet: &BalanceSheet,
) -> Result<SettlementNode> {
    let mut total = Balance::default();
    for member in members {
        let balance = balance_of(sheet, &member.id);
        total = add_balances(total, balance)
            .ok_or_else(|| Error::AmountOverflow(format!("group {}", group.id)))?;
    }

    let mut node = SettlementNode::new(
        NodeId::Group(group.id.clone()),
        group.name.clone(),
        members.iter().map(|p| p.id.clone()).collect(),
        total,
    );
    // A family that contains the lead payer is repaid as the lead payer
    node.lead_payer = group.lead_payer || members.iter().any(|p| p.lead_payer);
    Ok(node)
}

fn add_balances(a: Balance, b: Balance) -> Option<Balance> {
    Some(Balance {
        paid: a.paid.checked_add(b.paid)?,
        share: a.share.checked_add(b.share)?,
        net: a.net.checked_add(b.net)?,
    })
}
