//! Roll-call votes.

use crate::legislator::{parse_id, FallbackRow, LegislatorId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single legislator's vote in one roll-call event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoteValue {
    Yes,
    No,
    Abstain,
    Absent,
    Obstruction,
    Other(String),
}

impl VoteValue {
    /// Parse a portal label (`Sim`, `Não`, `Abstenção`, ...) or its English name.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "sim" | "yes" => Self::Yes,
            "não" | "nao" | "no" => Self::No,
            "abstenção" | "abstencao" | "abstain" => Self::Abstain,
            "ausente" | "art. 17" | "absent" => Self::Absent,
            "obstrução" | "obstrucao" | "obstruction" => Self::Obstruction,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Yes => "Sim",
            Self::No => "Não",
            Self::Abstain => "Abstenção",
            Self::Absent => "Ausente",
            Self::Obstruction => "Obstrução",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub vote_id: String,
    pub legislator_id: LegislatorId,
    pub value: VoteValue,
    pub name: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
}

impl VoteRecord {
    pub fn new(vote_id: impl Into<String>, legislator_id: LegislatorId, value: VoteValue) -> Self {
        Self {
            vote_id: vote_id.into(),
            legislator_id,
            value,
            name: None,
            party: None,
            state: None,
        }
    }

    pub fn fallback_row(&self) -> FallbackRow {
        FallbackRow {
            name: self.name.clone(),
            party: self.party.clone(),
            state: self.state.clone(),
        }
    }
}

/// Logical field names of a roll-call table, after loader-side renaming.
pub mod fields {
    pub const VOTE_ID: &str = "vote_id";
    pub const LEGISLATOR_ID: &str = "legislator_id";
    pub const VOTE: &str = "vote";
    pub const LEGISLATOR_NAME: &str = "legislator_name";
    pub const LEGISLATOR_PARTY: &str = "legislator_party";
    pub const LEGISLATOR_STATE: &str = "legislator_state";

    pub const REQUIRED: [&str; 3] = [VOTE_ID, LEGISLATOR_ID, VOTE];
}

/// One roll-call row before id coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVoteRow {
    pub vote_id: String,
    pub legislator_id: String,
    pub vote: String,
    pub name: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
}

impl RawVoteRow {
    pub fn new(
        vote_id: impl Into<String>,
        legislator_id: impl Into<String>,
        vote: impl Into<String>,
    ) -> Self {
        Self {
            vote_id: vote_id.into(),
            legislator_id: legislator_id.into(),
            vote: vote.into(),
            ..Default::default()
        }
    }

    /// Coerce into a typed record; `None` when the legislator id is not an
    /// integer.
    pub fn parse(&self) -> Option<VoteRecord> {
        Some(VoteRecord {
            vote_id: self.vote_id.trim().to_string(),
            legislator_id: parse_id(&self.legislator_id)?,
            value: VoteValue::parse(&self.vote),
            name: self.name.clone(),
            party: self.party.clone(),
            state: self.state.clone(),
        })
    }
}

/// Roll-call rows plus the logical columns the loader managed to resolve.
#[derive(Debug, Clone, Default)]
pub struct RawVoteTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawVoteRow>,
}

impl RawVoteTable {
    /// A table exposing every logical field.
    pub fn with_rows(rows: Vec<RawVoteRow>) -> Self {
        Self {
            columns: [
                fields::VOTE_ID,
                fields::LEGISLATOR_ID,
                fields::VOTE,
                fields::LEGISLATOR_NAME,
                fields::LEGISLATOR_PARTY,
                fields::LEGISLATOR_STATE,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            rows,
        }
    }

    /// Required logical fields absent from `columns`.
    pub fn missing_required(&self) -> Vec<&'static str> {
        fields::REQUIRED
            .iter()
            .copied()
            .filter(|f| !self.columns.iter().any(|c| c == f))
            .collect()
    }
}

/// Aggregated tally of one roll-call event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub vote_id: String,
    pub yes: u32,
    pub no: u32,
    pub other: u32,
}

impl VoteSummary {
    /// Valid votes are Yes + No.
    pub fn valid_votes(&self) -> u64 {
        u64::from(self.yes) + u64::from(self.no)
    }

    /// Share of the valid votes held by the larger side; `None` without valid votes.
    pub fn winning_share(&self) -> Option<f64> {
        let total = self.valid_votes();
        if total == 0 {
            return None;
        }
        Some(f64::from(self.yes.max(self.no)) / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_labels_parse() {
        assert_eq!(VoteValue::parse(" Sim "), VoteValue::Yes);
        assert_eq!(VoteValue::parse("Não"), VoteValue::No);
        assert_eq!(VoteValue::parse("NAO"), VoteValue::No);
        assert_eq!(VoteValue::parse("Abstenção"), VoteValue::Abstain);
        assert_eq!(VoteValue::parse("Art. 17"), VoteValue::Absent);
        assert_eq!(VoteValue::parse("Obstrução"), VoteValue::Obstruction);
        assert_eq!(VoteValue::parse("Branco"), VoteValue::Other("Branco".into()));
    }

    #[test]
    fn raw_rows_coerce_integral_ids() {
        let row = RawVoteRow::new("v1", "204554.0", "Sim");
        assert_eq!(row.parse().map(|r| r.legislator_id), Some(204554));
        assert!(RawVoteRow::new("v1", "abc", "Sim").parse().is_none());
        assert!(RawVoteRow::new("v1", "12.5", "Sim").parse().is_none());
        assert!(RawVoteRow::new("v1", "", "Sim").parse().is_none());
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let table = RawVoteTable {
            columns: vec!["vote_id".into()],
            rows: vec![],
        };
        assert_eq!(table.missing_required(), vec!["legislator_id", "vote"]);
        assert!(RawVoteTable::with_rows(vec![]).missing_required().is_empty());
    }

    #[test]
    fn valid_votes_do_not_overflow() {
        let summary = VoteSummary {
            vote_id: "1".into(),
            yes: u32::MAX,
            no: u32::MAX,
            other: 0,
        };
        assert_eq!(summary.valid_votes(), 2 * u64::from(u32::MAX));
        assert_eq!(summary.winning_share(), Some(0.5));
    }

    #[test]
    fn winning_share_uses_valid_votes_only() {
        let summary = VoteSummary {
            vote_id: "1".into(),
            yes: 30,
            no: 20,
            other: 100,
        };
        assert_eq!(summary.valid_votes(), 50);
        assert_eq!(summary.winning_share(), Some(0.6));

        let empty = VoteSummary {
            vote_id: "2".into(),
            yes: 0,
            no: 0,
            other: 3,
        };
        assert_eq!(empty.winning_share(), None);
    }
}
