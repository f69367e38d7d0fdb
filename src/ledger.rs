use rust_decimal::Decimal;
use serde::ser::{Serialize, Serializer};

use crate::domain::{ParticipantId, Roster};

/// One amount per roster member, in roster order. Never missing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerParticipant {
    entries: Vec<(ParticipantId, Decimal)>,
}

impl PerParticipant {
    pub fn zeroed(roster: &Roster) -> Self {
        Self {
            entries: roster.ids().map(|id| (id.clone(), Decimal::ZERO)).collect(),
        }
    }

    /// Builds a mapping from a lookup; ids the lookup doesn't know get zero.
    pub fn from_fn(roster: &Roster, mut f: impl FnMut(&ParticipantId) -> Decimal) -> Self {
        Self {
            entries: roster.ids().map(|id| (id.clone(), f(id))).collect(),
        }
    }

    pub fn get(&self, id: &ParticipantId) -> Decimal {
        self.entries
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, v)| *v)
            .unwrap_or(Decimal::ZERO)
    }

    /// Adds to a member's entry, saturating at the `Decimal` limits. Returns
    /// false (and changes nothing) for ids outside the roster.
    pub fn add(&mut self, id: &ParticipantId, amount: Decimal) -> bool {
        match self.entries.iter_mut().find(|(p, _)| p == id) {
            Some((_, v)) => {
                *v = v.saturating_add(amount);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> {
        self.entries.iter().map(|(p, v)| (p, *v))
    }

    pub fn total(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, (_, v)| acc.saturating_add(*v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element-wise `self - other`, over this mapping's ids.
    pub fn minus(&self, other: &PerParticipant) -> PerParticipant {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(p, v)| (p.clone(), v.saturating_sub(other.get(p))))
                .collect(),
        }
    }
}

impl Serialize for PerParticipant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(p, v)| (p, v)))
    }
}
