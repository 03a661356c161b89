//! Divisive roll-call pre-filter.
//!
//! Near-unanimous votes say little about alignment between legislators, so
//! the co-voting network is built only from events with enough valid votes
//! and a winning side no larger than `division_threshold`.

use legisnet_model::{RawVoteTable, VoteSummary};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisiveFilter {
    /// Minimum Yes + No votes.
    pub min_total_votes: u32,
    /// Maximum share of the valid votes held by the winning side.
    pub division_threshold: f64,
}

impl Default for DivisiveFilter {
    fn default() -> Self {
        Self {
            min_total_votes: 20,
            division_threshold: 0.60,
        }
    }
}

impl DivisiveFilter {
    pub fn is_divisive(&self, summary: &VoteSummary) -> bool {
        match summary.winning_share() {
            Some(share) => {
                summary.valid_votes() >= u64::from(self.min_total_votes)
                    && share <= self.division_threshold
            }
            None => false,
        }
    }

    /// Ids of the divisive events.
    pub fn divisive_ids(&self, summaries: &[VoteSummary]) -> BTreeSet<String> {
        let ids: BTreeSet<String> = summaries
            .iter()
            .filter(|s| self.is_divisive(s))
            .map(|s| s.vote_id.trim().to_string())
            .collect();
        info!(
            events = summaries.len(),
            divisive = ids.len(),
            "divisive filter applied"
        );
        ids
    }

    /// Keep only the detail rows of divisive events.
    pub fn restrict(&self, details: &RawVoteTable, summaries: &[VoteSummary]) -> RawVoteTable {
        let ids = self.divisive_ids(summaries);
        RawVoteTable {
            columns: details.columns.clone(),
            rows: details
                .rows
                .iter()
                .filter(|r| ids.contains(r.vote_id.trim()))
                .cloned()
                .collect(),
        }
    }
}
