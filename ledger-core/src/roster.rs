//! Participant and group reference data
//!
//! The roster is the source of truth for who exists. Group membership is the
//! union of each group's `member_ids` and every participant's `group_id`;
//! a participant may belong to at most one group.

use crate::{
    types::{Group, GroupId, Participant, ParticipantId},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Validated roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RosterParts", into = "RosterParts")]
pub struct Roster {
    participants: Vec<Participant>,
    groups: Vec<Group>,
    participant_index: HashMap<ParticipantId, usize>,
    membership: HashMap<ParticipantId, GroupId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterParts {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    groups: Vec<Group>,
}

impl TryFrom<RosterParts> for Roster {
    type Error = Error;

    fn try_from(parts: RosterParts) -> Result<Self> {
        Roster::new(parts.participants, parts.groups)
    }
}

impl From<Roster> for RosterParts {
    fn from(roster: Roster) -> Self {
        RosterParts {
            participants: roster.participants,
            groups: roster.groups,
        }
    }
}

impl Roster {
    /// Build and validate a roster
    pub fn new(participants: Vec<Participant>, mut groups: Vec<Group>) -> Result<Self> {
        let mut participant_index = HashMap::with_capacity(participants.len());
        for (idx, participant) in participants.iter().enumerate() {
            if participant_index.insert(participant.id.clone(), idx).is_some() {
                return Err(Error::InvalidRoster(format!(
                    "duplicate participant {}",
                    participant.id
                )));
            }
        }

        let individuals = groups.iter().filter(|g| g.is_individuals_group).count();
        if individuals > 1 {
            return Err(Error::InvalidRoster(format!(
                "{} groups flagged as individuals, at most one allowed",
                individuals
            )));
        }

        let mut group_ids = BTreeSet::new();
        for group in &groups {
            if !group_ids.insert(group.id.clone()) {
                return Err(Error::InvalidRoster(format!("duplicate group {}", group.id)));
            }
        }

        // Fold participant-side group references into the member lists
        for participant in &participants {
            if let Some(group_id) = &participant.group_id {
                let group = groups
                    .iter_mut()
                    .find(|g| &g.id == group_id)
                    .ok_or_else(|| {
                        Error::InvalidRoster(format!(
                            "participant {} references unknown group {}",
                            participant.id, group_id
                        ))
                    })?;
                group.member_ids.insert(participant.id.clone());
            }
        }

        let mut membership = HashMap::new();
        for group in &groups {
            for member in &group.member_ids {
                if !participant_index.contains_key(member) {
                    return Err(Error::InvalidRoster(format!(
                        "group {} lists unknown participant {}",
                        group.id, member
                    )));
                }
                if let Some(previous) = membership.insert(member.clone(), group.id.clone()) {
                    return Err(Error::InvalidRoster(format!(
                        "participant {} belongs to both {} and {}",
                        member, previous, group.id
                    )));
                }
            }
        }

        Ok(Self {
            participants,
            groups,
            participant_index,
            membership,
        })
    }

    /// Roster with no participants or groups
    pub fn empty() -> Self {
        Self {
            participants: Vec::new(),
            groups: Vec::new(),
            participant_index: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    /// Participants in roster order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Groups in roster order, with membership resolved
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Participant IDs in roster order
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// Look up a participant
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participant_index
            .get(id)
            .map(|&idx| &self.participants[idx])
    }

    /// Whether the participant exists
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participant_index.contains_key(id)
    }

    /// Group the participant belongs to
    pub fn group_of(&self, id: &ParticipantId) -> Option<&Group> {
        let group_id = self.membership.get(id)?;
        self.groups.iter().find(|g| &g.id == group_id)
    }

    /// The individuals group, if one is flagged
    pub fn individuals_group(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.is_individuals_group)
    }

    /// Participants that belong to no group, in roster order
    pub fn ungrouped(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants
            .iter()
            .filter(|p| !self.membership.contains_key(&p.id))
    }

    /// Display name, falling back to the ID
    pub fn display_name(&self, id: &ParticipantId) -> String {
        self.participant(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
