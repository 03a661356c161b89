//! Legislative roles held by legislators and the party table used to scale
//! party-leader influence.

use crate::legislator::LegislatorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub legislator_id: LegislatorId,
    pub role_name: String,
    /// Where the role is exercised; for leaderships this is the party id.
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub acronym: String,
    pub members: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PartyTable {
    by_id: BTreeMap<String, Party>,
}

impl PartyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, party: Party) {
        self.by_id.insert(party.id.clone(), party);
    }

    pub fn get(&self, id: &str) -> Option<&Party> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Party> for PartyTable {
    fn from_iter<I: IntoIterator<Item = Party>>(iter: I) -> Self {
        let mut table = Self::new();
        for party in iter {
            table.insert(party);
        }
        table
    }
}
