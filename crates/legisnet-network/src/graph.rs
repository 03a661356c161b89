//! Undirected, simple, attributed graph over legislators.
//!
//! Node and edge maps are ordered (`BTreeMap`) so iteration, and therefore
//! every serialization, is sorted by id / id pair regardless of the order in
//! which the builders inserted things.

use crate::accumulator::PairKey;
use legisnet_model::LegislatorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Edge attribute holding the accumulated weight.
pub const WEIGHT: &str = "weight";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// No value. Exchange formats cannot carry this; see [`sanitize`].
    Missing,
}

/// Declared type of an attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Integer,
    Double,
    String,
}

impl AttrKind {
    pub fn gexf_name(self) -> &'static str {
        match self {
            Self::Integer => "long",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

impl AttrValue {
    pub fn kind(&self) -> Option<AttrKind> {
        match self {
            Self::Int(_) => Some(AttrKind::Integer),
            Self::Float(_) => Some(AttrKind::Double),
            Self::Text(_) => Some(AttrKind::String),
            Self::Missing => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn add(&self, other: &AttrValue) -> AttrValue {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a + b),
            (Self::Missing, v) | (v, Self::Missing) => v.clone(),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Self::Float(x + y),
                _ => b.clone(),
            },
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

pub type Attributes = BTreeMap<String, AttrValue>;

/// Build an attribute map from `(name, value)` pairs.
pub fn attrs<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributedGraph {
    nodes: BTreeMap<LegislatorId, Attributes>,
    edges: BTreeMap<PairKey, Attributes>,
}

impl AttributedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, merging attributes into an existing one.
    pub fn add_node(&mut self, id: LegislatorId, attributes: Attributes) {
        self.nodes.entry(id).or_default().extend(attributes);
    }

    /// Insert an edge, creating missing endpoints as bare nodes.
    ///
    /// A repeated pair is folded into the existing edge: its `weight` is the
    /// sum of both declarations, other attributes take the newer value.
    pub fn add_edge(&mut self, pair: PairKey, attributes: Attributes) {
        self.nodes.entry(pair.low()).or_default();
        self.nodes.entry(pair.high()).or_default();

        let edge = self.edges.entry(pair).or_default();
        for (name, value) in attributes {
            match edge.get(&name) {
                Some(existing) if name == WEIGHT => {
                    let summed = existing.add(&value);
                    edge.insert(name, summed);
                }
                _ => {
                    edge.insert(name, value);
                }
            }
        }
    }

    pub fn node(&self, id: LegislatorId) -> Option<&Attributes> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: LegislatorId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn edge(&self, a: LegislatorId, b: LegislatorId) -> Option<&Attributes> {
        PairKey::new(a, b).and_then(|k| self.edges.get(&k))
    }

    /// Numeric `weight` of the edge, 0 when absent.
    pub fn edge_weight(&self, a: LegislatorId, b: LegislatorId) -> f64 {
        self.edge(a, b)
            .and_then(|e| e.get(WEIGHT))
            .and_then(AttrValue::as_f64)
            .unwrap_or(0.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (LegislatorId, &Attributes)> {
        self.nodes.iter().map(|(id, a)| (*id, a))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = LegislatorId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (PairKey, &Attributes)> {
        self.edges.iter().map(|(k, a)| (*k, a))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of incident edge weights.
    pub fn weighted_degree(&self, id: LegislatorId) -> f64 {
        self.edges
            .iter()
            .filter(|(k, _)| k.contains(id))
            .filter_map(|(_, a)| a.get(WEIGHT).and_then(AttrValue::as_f64))
            .sum()
    }

    pub fn has_missing_attributes(&self) -> bool {
        self.nodes
            .values()
            .chain(self.edges.values())
            .flat_map(|a| a.values())
            .any(AttrValue::is_missing)
    }
}

/// What to do with [`AttrValue::Missing`] before handing a graph to an
/// exchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizePolicy {
    /// Replace with the empty string.
    EmptyString,
    /// Remove the attribute.
    Drop,
}

/// Copy of `graph` with every missing attribute value replaced or removed.
pub fn sanitize(graph: &AttributedGraph, policy: SanitizePolicy) -> AttributedGraph {
    let clean = |attributes: &Attributes| -> Attributes {
        attributes
            .iter()
            .filter_map(|(k, v)| match (v, policy) {
                (AttrValue::Missing, SanitizePolicy::Drop) => None,
                (AttrValue::Missing, SanitizePolicy::EmptyString) => {
                    Some((k.clone(), AttrValue::Text(String::new())))
                }
                _ => Some((k.clone(), v.clone())),
            })
            .collect()
    };

    AttributedGraph {
        nodes: graph.nodes.iter().map(|(id, a)| (*id, clean(a))).collect(),
        edges: graph.edges.iter().map(|(k, a)| (*k, clean(a))).collect(),
    }
}
