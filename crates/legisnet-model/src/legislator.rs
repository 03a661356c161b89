//! Legislators, the read-only directory, and per-id attribute resolution.

use crate::attributes::{age_on, AgeBracket, Region};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type LegislatorId = i64;

/// Parse an id cell. Integral floats (`204554.0`, as spreadsheet exports
/// write them) are accepted.
pub fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range
            .filter(|f| {
                f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
            })
            .map(|f| f as i64)
    })
}

/// Biographical record as published by the chamber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legislator {
    pub id: LegislatorId,
    pub name: String,
    pub party: String,
    /// Two-letter federative unit (UF).
    pub state: String,
    pub sex: String,
    pub education: String,
    pub birthdate: Option<NaiveDate>,
    pub cpf: Option<String>,
}

impl Legislator {
    pub fn new(id: LegislatorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn region(&self) -> Option<Region> {
        Region::from_state(&self.state)
    }
}

/// Id-keyed legislator lookup, iterated in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct LegislatorDirectory {
    by_id: BTreeMap<LegislatorId, Legislator>,
}

impl LegislatorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a legislator; a later record for the same id replaces the earlier one.
    pub fn insert(&mut self, legislator: Legislator) {
        self.by_id.insert(legislator.id, legislator);
    }

    pub fn get(&self, id: LegislatorId) -> Option<&Legislator> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: LegislatorId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = LegislatorId> + '_ {
        self.by_id.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Legislator> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Legislator> for LegislatorDirectory {
    fn from_iter<I: IntoIterator<Item = Legislator>>(iter: I) -> Self {
        let mut directory = Self::new();
        for legislator in iter {
            directory.insert(legislator);
        }
        directory
    }
}

/// Inline legislator fields that some sources (roll-call rows) carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackRow {
    pub name: Option<String>,
    pub party: Option<String>,
    pub state: Option<String>,
}

/// A directory hit with its derived attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownLegislator {
    pub legislator: Legislator,
    pub region: Option<Region>,
    pub age: Option<u32>,
    pub age_bracket: Option<AgeBracket>,
}

/// What is known about an id that has no directory record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackLabel {
    pub label: String,
    pub party: String,
    pub state: String,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegislatorInfo {
    Known(KnownLegislator),
    Unknown(FallbackLabel),
}

impl LegislatorInfo {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Known(k) => &k.legislator.name,
            Self::Unknown(f) => &f.label,
        }
    }
}

/// Resolve everything the builders need to know about `id`.
///
/// Directory records win; otherwise the inline fallback row is used, with the
/// numeric id standing in for a missing name.
pub fn resolve(
    id: LegislatorId,
    directory: &LegislatorDirectory,
    fallback: Option<&FallbackRow>,
    reference_date: NaiveDate,
) -> LegislatorInfo {
    if let Some(legislator) = directory.get(id) {
        let age = legislator
            .birthdate
            .and_then(|born| age_on(born, reference_date));
        return LegislatorInfo::Known(KnownLegislator {
            region: legislator.region(),
            age,
            age_bracket: age.map(AgeBracket::from_age),
            legislator: legislator.clone(),
        });
    }

    let non_empty = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let row = fallback.cloned().unwrap_or_default();
    let state = non_empty(&row.state).unwrap_or_default();
    LegislatorInfo::Unknown(FallbackLabel {
        label: non_empty(&row.name).unwrap_or_else(|| id.to_string()),
        party: non_empty(&row.party).unwrap_or_default(),
        region: Region::from_state(&state),
        state,
    })
}
