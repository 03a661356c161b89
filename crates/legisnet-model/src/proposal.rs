//! Legislative proposals and the proposal → author relation.

use crate::legislator::LegislatorId;
use crate::tables::WeightTables;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type ProposalId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// Type acronym (`siglaTipo`), e.g. `PL` or `PEC`.
    pub type_code: String,
    /// Last known status (`ultimoStatus_idSituacao`); 0 when unknown.
    pub status_code: i64,
    pub status_description: String,
    /// Archived proposals have their collaboration weight discounted.
    #[serde(default)]
    pub archived: bool,
}

impl Proposal {
    pub fn new(id: ProposalId, type_code: impl Into<String>, status_code: i64) -> Self {
        Self {
            id,
            type_code: type_code.into(),
            status_code,
            status_description: String::new(),
            archived: false,
        }
    }
}

/// Outcome classification derived from the positive-status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Approved,
    PartiallyPositive,
    Unresolved,
}

impl Outcome {
    pub fn classify(proposal: &Proposal, tables: &WeightTables) -> Self {
        match tables.positive_status.get(&proposal.status_code) {
            Some(p) if *p >= 1.0 => Self::Approved,
            Some(p) if *p > 0.0 => Self::PartiallyPositive,
            _ => Self::Unresolved,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProposalTable {
    by_id: BTreeMap<ProposalId, Proposal>,
}

impl ProposalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, proposal: Proposal) {
        self.by_id.insert(proposal.id, proposal);
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: ProposalId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Proposal> for ProposalTable {
    fn from_iter<I: IntoIterator<Item = Proposal>>(iter: I) -> Self {
        let mut table = Self::new();
        for proposal in iter {
            table.insert(proposal);
        }
        table
    }
}

/// Raw author lists per proposal. Lists may contain non-legislator authors
/// and repeated ids.
#[derive(Debug, Clone, Default)]
pub struct AuthorshipRelation {
    authors: BTreeMap<ProposalId, Vec<LegislatorId>>,
}

impl AuthorshipRelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_author(&mut self, proposal: ProposalId, author: LegislatorId) {
        self.authors.entry(proposal).or_default().push(author);
    }

    pub fn authors_of(&self, proposal: ProposalId) -> Option<&[LegislatorId]> {
        self.authors.get(&proposal).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProposalId, &[LegislatorId])> {
        self.authors.iter().map(|(id, a)| (*id, a.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Author ids of the proposals present in `proposals`. Author lists of
    /// proposals outside the table (filtered type, other period) are ignored.
    pub fn authors_of_proposals(&self, proposals: &ProposalTable) -> BTreeSet<LegislatorId> {
        self.authors
            .iter()
            .filter(|(id, _)| proposals.contains(**id))
            .flat_map(|(_, authors)| authors.iter().copied())
            .collect()
    }

    /// Authors of `proposal` restricted to `universe`, deduplicated and sorted.
    pub fn qualifying_authors(
        &self,
        proposal: ProposalId,
        universe: &BTreeSet<LegislatorId>,
    ) -> Vec<LegislatorId> {
        let Some(raw) = self.authors.get(&proposal) else {
            return Vec::new();
        };
        raw.iter()
            .filter(|id| universe.contains(id))
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<(ProposalId, LegislatorId)> for AuthorshipRelation {
    fn from_iter<I: IntoIterator<Item = (ProposalId, LegislatorId)>>(iter: I) -> Self {
        let mut relation = Self::new();
        for (proposal, author) in iter {
            relation.add_author(proposal, author);
        }
        relation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifying_authors_filter_and_dedupe() {
        let relation: AuthorshipRelation =
            [(1, 30), (1, 10), (1, 30), (1, 999), (2, 10)].into_iter().collect();
        let universe: BTreeSet<_> = [10, 20, 30].into_iter().collect();

        assert_eq!(relation.qualifying_authors(1, &universe), vec![10, 30]);
        assert_eq!(relation.qualifying_authors(2, &universe), vec![10]);
        assert!(relation.qualifying_authors(3, &universe).is_empty());
    }

    #[test]
    fn authors_of_untabled_proposals_are_ignored() {
        let relation: AuthorshipRelation =
            [(1, 10), (1, 20), (9, 10), (9, 77)].into_iter().collect();
        let proposals: ProposalTable = [Proposal::new(1, "PL", 0)].into_iter().collect();

        let authors = relation.authors_of_proposals(&proposals);
        assert_eq!(authors.into_iter().collect::<Vec<_>>(), vec![10, 20]);
        assert!(relation.authors_of_proposals(&ProposalTable::new()).is_empty());
    }

    #[test]
    fn outcome_follows_positive_status_table() {
        let tables = WeightTables::default();
        let approved = Proposal::new(1, "PL", 1140);
        let pending = Proposal::new(2, "PL", 924);
        assert_eq!(Outcome::classify(&approved, &tables), Outcome::Approved);
        assert_eq!(Outcome::classify(&pending, &tables), Outcome::Unresolved);
        let absorbed = Proposal::new(3, "PL", 1150);
        assert_eq!(Outcome::classify(&absorbed, &tables), Outcome::PartiallyPositive);
    }
}
