//! Data model for legisnet
//!
//! Typed views over the open-data snapshots the network builders consume:
//! - Legislators and the read-only [`LegislatorDirectory`]
//! - Derived attributes (age, age bracket, region)
//! - Proposals, authorship, roles and parties
//! - Roll-call vote records
//! - Configurable weight tables ([`WeightTables`])
//!
//! Everything here is immutable once loaded; builders borrow it.

pub mod attributes;
pub mod legislator;
pub mod proposal;
pub mod roles;
pub mod tables;
pub mod vote;

pub use attributes::{age_on, AgeBracket, Region};
pub use legislator::{
    parse_id, resolve, FallbackLabel, FallbackRow, KnownLegislator, Legislator,
    LegislatorDirectory, LegislatorId, LegislatorInfo,
};
pub use proposal::{AuthorshipRelation, Outcome, Proposal, ProposalId, ProposalTable};
pub use roles::{Party, PartyTable, RoleAssignment};
pub use tables::{lookup_or, WeightTables};
pub use vote::{fields, RawVoteRow, RawVoteTable, VoteRecord, VoteSummary, VoteValue};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid weight tables: {0}")]
    Tables(#[from] serde_json::Error),

    #[error("invalid weight table entry `{key}`: {message}")]
    TableEntry { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
