//! Combined-weight projection of the co-voting and co-authorship graphs.
//!
//! Each node gets a cost `c = 1 / (α·deg_vote + (1-α)·deg_auth + ε)` and a
//! fixed value `v = 1`; each edge gets `w_comb = γ·w_vote + (1-γ)·w_auth`.
//! Degrees are weighted degrees over the union edge set, an edge absent
//! from one graph contributing weight 0 there.

use crate::accumulator::PairKey;
use crate::graph::AttributedGraph;
use crate::{NetworkError, Result};
use legisnet_model::LegislatorId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Node-degree blend; 1 means co-voting only.
    pub alpha: f64,
    /// Edge-weight blend; 1 means co-voting only.
    pub gamma: f64,
    /// Keeps isolated nodes from dividing by zero.
    pub epsilon: f64,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            alpha: 0.035,
            gamma: 0.035,
            epsilon: 1e-6,
        }
    }
}

impl ProjectionParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("gamma", self.gamma)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NetworkError::InvalidParameter {
                    name,
                    message: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "epsilon",
                message: format!("{} must be a positive finite number", self.epsilon),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionNodeRow {
    pub id: LegislatorId,
    pub c: f64,
    pub v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionEdgeRow {
    pub u: LegislatorId,
    pub v: LegislatorId,
    pub w_vote: f64,
    pub w_auth: f64,
    pub w_comb: f64,
}

/// Node and edge rows, sorted by id and by id pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub nodes: Vec<ProjectionNodeRow>,
    pub edges: Vec<ProjectionEdgeRow>,
}

pub fn project(
    vote: &AttributedGraph,
    auth: &AttributedGraph,
    params: ProjectionParams,
) -> Result<Projection> {
    params.validate()?;

    let node_ids: BTreeSet<LegislatorId> = vote.node_ids().chain(auth.node_ids()).collect();
    let pairs: BTreeSet<PairKey> = vote
        .edges()
        .map(|(k, _)| k)
        .chain(auth.edges().map(|(k, _)| k))
        .collect();

    let mut deg_vote: BTreeMap<LegislatorId, f64> = BTreeMap::new();
    let mut deg_auth: BTreeMap<LegislatorId, f64> = BTreeMap::new();
    let mut edges = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let (u, v) = (pair.low(), pair.high());
        let w_vote = vote.edge_weight(u, v);
        let w_auth = auth.edge_weight(u, v);
        for id in [u, v] {
            *deg_vote.entry(id).or_default() += w_vote;
            *deg_auth.entry(id).or_default() += w_auth;
        }
        edges.push(ProjectionEdgeRow {
            u,
            v,
            w_vote,
            w_auth,
            w_comb: params.gamma * w_vote + (1.0 - params.gamma) * w_auth,
        });
    }

    let nodes = node_ids
        .into_iter()
        .map(|id| {
            let dv = deg_vote.get(&id).copied().unwrap_or(0.0);
            let da = deg_auth.get(&id).copied().unwrap_or(0.0);
            ProjectionNodeRow {
                id,
                c: 1.0 / (params.alpha * dv + (1.0 - params.alpha) * da + params.epsilon),
                v: 1.0,
            }
        })
        .collect::<Vec<_>>();

    debug!(nodes = nodes.len(), edges = edges.len(), "projection computed");
    Ok(Projection { nodes, edges })
}
