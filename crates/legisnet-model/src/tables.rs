//! Configurable weight tables.
//!
//! These are external constants, not derived from data. A JSON file with any
//! subset of the fields overrides the defaults.

use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// `table[key]`, or `default` when the key is absent.
pub fn lookup_or<Q, K, V>(table: &BTreeMap<K, V>, key: &Q, default: V) -> V
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
    V: Copy,
{
    table.get(key).copied().unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTables {
    /// Proposal type acronym → weight. Types not listed are skipped.
    pub proposal_types: BTreeMap<String, f64>,
    /// Role name → weight.
    pub roles: BTreeMap<String, f64>,
    /// Key into `roles` holding the base weight of a party leadership.
    pub party_leader_role: String,
    /// Substring identifying leadership roles not listed in `roles`.
    pub leader_marker: String,
    /// Status code → positive pertinence. Unlisted statuses count as 0.
    pub positive_status: BTreeMap<i64, f64>,
    /// Seats in the chamber; a leader's weight scales with `members / chamber_size`.
    pub chamber_size: f64,
    pub leader_scale: f64,
    /// Multiplier applied to the collaboration weight of archived proposals.
    pub archived_discount: f64,
    /// Node weight multipliers.
    pub individual_proposal_factor: f64,
    pub role_factor: f64,
}

impl Default for WeightTables {
    fn default() -> Self {
        let proposal_types = [
            ("PL", 1.0),
            ("PLP", 1.5),
            ("PEC", 2.0),
            ("PLN", 1.0),
            ("PLV", 1.0),
            ("PLC", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let roles = [
            ("Presidente", 3.0),
            ("Vice-Presidente", 2.0),
            ("Titular", 1.0),
            ("Suplente", 0.5),
            ("Relator", 1.0),
            ("Líder de partido", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        // 1140: transformed into law; 1150/1285: absorbed or archived after a vote.
        let positive_status = [(1140, 1.0), (1150, 0.5), (1285, 0.5)].into_iter().collect();

        Self {
            proposal_types,
            roles,
            party_leader_role: "Líder de partido".to_string(),
            leader_marker: "Líder".to_string(),
            positive_status,
            chamber_size: 513.0,
            leader_scale: 30.0,
            archived_discount: 0.5,
            individual_proposal_factor: 1.0,
            role_factor: 1.0,
        }
    }
}

impl WeightTables {
    pub fn from_json(text: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(text)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chamber_size.is_nan() || self.chamber_size <= 0.0 {
            return Err(ModelError::TableEntry {
                key: "chamber_size".into(),
                message: format!("must be positive, got {}", self.chamber_size),
            });
        }
        let negative = self
            .proposal_types
            .iter()
            .chain(self.roles.iter())
            .find(|(_, w)| !w.is_finite() || **w < 0.0);
        if let Some((key, w)) = negative {
            return Err(ModelError::TableEntry {
                key: key.clone(),
                message: format!("weight must be a non-negative number, got {w}"),
            });
        }
        Ok(())
    }

    pub fn proposal_weight(&self, type_code: &str) -> Option<f64> {
        self.proposal_types.get(type_code).copied()
    }

    pub fn status_pertinence(&self, status_code: i64) -> f64 {
        lookup_or(&self.positive_status, &status_code, 0.0)
    }

    /// Weight of a role. Leadership roles not listed in `roles` are scaled by
    /// the share of the chamber held by the led party; `None` when the role is
    /// unknown or the party size is unavailable.
    pub fn role_weight(&self, role_name: &str, party_members: Option<u32>) -> Option<f64> {
        if let Some(w) = self.roles.get(role_name) {
            return Some(*w);
        }
        if !role_name.contains(&self.leader_marker) {
            return None;
        }
        let base = self.roles.get(&self.party_leader_role)?;
        let members = f64::from(party_members?);
        Some(base * (members / self.chamber_size) * self.leader_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_overrides_only_the_listed_fields() {
        let tables = WeightTables::from_json(r#"{ "proposal_types": { "PL": 2.5 } }"#).unwrap();
        assert_eq!(tables.proposal_weight("PL"), Some(2.5));
        assert_eq!(tables.proposal_weight("PEC"), None);
        assert_eq!(tables.chamber_size, 513.0);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(WeightTables::from_json(r#"{ "chamber_size": 0 }"#).is_err());
        assert!(WeightTables::from_json(r#"{ "roles": { "X": -1.0 } }"#).is_err());
        assert!(WeightTables::from_json("not json").is_err());
    }

    #[test]
    fn unlisted_status_has_zero_pertinence() {
        let tables = WeightTables::default();
        assert_eq!(tables.status_pertinence(1140), 1.0);
        assert_eq!(tables.status_pertinence(42), 0.0);
    }

    #[test]
    fn leader_roles_scale_with_party_size() {
        let tables = WeightTables::default();
        let w = tables.role_weight("Líder do PT", Some(57)).unwrap();
        assert!((w - 57.0 / 513.0 * 30.0).abs() < 1e-12);
        assert_eq!(tables.role_weight("Líder do PT", None), None);
        assert_eq!(tables.role_weight("Presidente", None), Some(3.0));
        assert_eq!(tables.role_weight("Ouvidor", Some(10)), None);
    }
}
