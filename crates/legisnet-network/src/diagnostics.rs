//! Data-quality counters returned alongside each graph.
//!
//! Nothing counted here is an error: the affected record was skipped or
//! handled through a fallback, and the build carried on.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorshipDiagnostics {
    /// Authors without a directory record, added with empty attributes.
    pub legacy_legislators: usize,
    /// Proposals skipped because their type has no weight.
    pub unknown_proposal_types: usize,
    /// Proposals in the proposal table with no author list.
    pub proposals_without_authors: usize,
    /// Author lists whose proposal is absent from the proposal table.
    pub authorships_without_proposal: usize,
    /// Proposals with fewer than two qualifying authors.
    pub single_author_proposals: usize,
    /// Collaborating proposals whose status counts as fully approved.
    pub approved_proposals: usize,
    /// Collaborating proposals with a partial positive outcome.
    pub partially_positive_proposals: usize,
    /// Collaborating proposals whose status has no positive pertinence.
    pub unscored_statuses: usize,
    /// Proposals with at least [`crate::coauthorship::LARGE_PROPOSAL_AUTHORS`] authors.
    pub large_proposals: usize,
    /// Role assignments without a weight (unknown role or party).
    pub unweighted_roles: usize,
    pub collaborating_proposals: usize,
}

impl CoauthorshipDiagnostics {
    pub fn log_summary(&self) {
        info!(
            legacy_legislators = self.legacy_legislators,
            unknown_proposal_types = self.unknown_proposal_types,
            proposals_without_authors = self.proposals_without_authors,
            authorships_without_proposal = self.authorships_without_proposal,
            single_author_proposals = self.single_author_proposals,
            approved_proposals = self.approved_proposals,
            partially_positive_proposals = self.partially_positive_proposals,
            unscored_statuses = self.unscored_statuses,
            large_proposals = self.large_proposals,
            unweighted_roles = self.unweighted_roles,
            collaborating_proposals = self.collaborating_proposals,
            "co-authorship diagnostics"
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovotingDiagnostics {
    /// Rows dropped because the legislator id is not an integer.
    pub unparseable_ids: usize,
    /// Rows whose vote value is outside the considered subset.
    pub ignored_vote_values: usize,
    /// Legislators without a directory record, resolved from inline fields.
    pub fallback_legislators: usize,
    /// Value groups (within one event) with fewer than two voters.
    pub degenerate_groups: usize,
    /// Pairs whose identical-vote count fell below the threshold.
    pub pairs_below_threshold: usize,
    pub vote_events: usize,
}

impl CovotingDiagnostics {
    pub fn log_summary(&self) {
        info!(
            unparseable_ids = self.unparseable_ids,
            ignored_vote_values = self.ignored_vote_values,
            fallback_legislators = self.fallback_legislators,
            degenerate_groups = self.degenerate_groups,
            pairs_below_threshold = self.pairs_below_threshold,
            vote_events = self.vote_events,
            "co-voting diagnostics"
        );
    }
}
