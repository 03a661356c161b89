//! Co-authorship network.
//!
//! Nodes are legislators; an edge joins two legislators who co-authored at
//! least one qualifying proposal. Each edge carries:
//! - `weight`: sum of the proposal-type weights of the shared proposals
//!   (archived proposals discounted), or `1` for unweighted networks;
//! - `success_pertinence`: sum of `type weight × status pertinence`.
//!
//! Node `weight` blends the legislator's individually authored proposals with
//! the influence of the roles they held.

use crate::accumulator::PairAccumulator;
use crate::diagnostics::CoauthorshipDiagnostics;
use crate::graph::{attrs, AttrValue, AttributedGraph, WEIGHT};
use chrono::NaiveDate;
use legisnet_model::{
    resolve, AuthorshipRelation, LegislatorDirectory, LegislatorId, LegislatorInfo, Outcome,
    PartyTable, Proposal, ProposalTable, RoleAssignment, WeightTables,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

pub const SUCCESS_PERTINENCE: &str = "success_pertinence";

/// Proposals with at least this many qualifying authors are reported.
pub const LARGE_PROPOSAL_AUTHORS: usize = 150;

/// Read-only inputs of a co-authorship build.
#[derive(Debug, Clone, Copy)]
pub struct CoauthorshipInputs<'a> {
    pub directory: &'a LegislatorDirectory,
    pub proposals: &'a ProposalTable,
    pub authorship: &'a AuthorshipRelation,
    pub roles: &'a [RoleAssignment],
    pub parties: &'a PartyTable,
    pub tables: &'a WeightTables,
}

#[derive(Debug, Clone)]
pub struct CoauthorshipOptions {
    /// `false` emits every edge with weight 1.
    pub weighted: bool,
    /// Date ages are computed against.
    pub reference_date: NaiveDate,
}

impl Default for CoauthorshipOptions {
    fn default() -> Self {
        Self {
            weighted: true,
            reference_date: chrono::Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoauthorshipNetwork {
    pub graph: AttributedGraph,
    pub diagnostics: CoauthorshipDiagnostics,
}

/// A proposal that survived author filtering and type lookup.
struct Qualifying<'p> {
    proposal: &'p Proposal,
    authors: Vec<LegislatorId>,
    type_weight: f64,
}

pub struct CoauthorshipBuilder<'a> {
    inputs: CoauthorshipInputs<'a>,
    options: CoauthorshipOptions,
    universe: BTreeSet<LegislatorId>,
    collaboration: PairAccumulator<f64>,
    pertinence: PairAccumulator<f64>,
    diagnostics: CoauthorshipDiagnostics,
}

impl<'a> CoauthorshipBuilder<'a> {
    /// The node universe is every directory id plus every id credited as an
    /// author of a proposal in the proposal table.
    pub fn new(inputs: CoauthorshipInputs<'a>, options: CoauthorshipOptions) -> Self {
        let directory_ids: BTreeSet<_> = inputs.directory.ids().collect();
        let author_ids = inputs.authorship.authors_of_proposals(inputs.proposals);
        let universe: BTreeSet<_> = directory_ids.union(&author_ids).copied().collect();

        info!(
            directory = directory_ids.len(),
            authors = author_ids.len(),
            universe = universe.len(),
            "co-authorship node universe"
        );

        Self {
            inputs,
            options,
            universe,
            collaboration: PairAccumulator::new(),
            pertinence: PairAccumulator::new(),
            diagnostics: CoauthorshipDiagnostics::default(),
        }
    }

    pub fn universe(&self) -> &BTreeSet<LegislatorId> {
        &self.universe
    }

    pub fn build(mut self) -> CoauthorshipNetwork {
        let qualifying = self.qualifying_proposals();
        self.accumulate_collaborations(&qualifying);
        self.accumulate_pertinence(&qualifying);

        let mut graph = AttributedGraph::new();
        self.add_nodes(&mut graph);
        self.add_edges(&mut graph);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "co-authorship network built"
        );
        self.diagnostics.log_summary();

        CoauthorshipNetwork {
            graph,
            diagnostics: self.diagnostics,
        }
    }

    /// Proposals contributing collaboration edges, in proposal-id order.
    fn qualifying_proposals(&mut self) -> Vec<Qualifying<'a>> {
        let inputs = self.inputs;
        let mut out = Vec::new();

        for proposal in inputs.proposals.iter() {
            if inputs.authorship.authors_of(proposal.id).is_none() {
                self.diagnostics.proposals_without_authors += 1;
                continue;
            }

            let authors = inputs
                .authorship
                .qualifying_authors(proposal.id, &self.universe);
            if authors.len() <= 1 {
                self.diagnostics.single_author_proposals += 1;
                continue;
            }

            let Some(type_weight) = inputs.tables.proposal_weight(&proposal.type_code) else {
                self.diagnostics.unknown_proposal_types += 1;
                debug!(proposal = proposal.id, type_code = %proposal.type_code, "unweighted proposal type");
                continue;
            };

            if authors.len() >= LARGE_PROPOSAL_AUTHORS {
                self.diagnostics.large_proposals += 1;
                warn!(
                    proposal = proposal.id,
                    authors = authors.len(),
                    type_code = %proposal.type_code,
                    "proposal with a very large author list"
                );
            }

            out.push(Qualifying {
                proposal,
                authors,
                type_weight,
            });
        }

        self.diagnostics.collaborating_proposals = out.len();
        out
    }

    fn accumulate_collaborations(&mut self, qualifying: &[Qualifying<'_>]) {
        for q in qualifying {
            let delta = if q.proposal.archived {
                q.type_weight * self.inputs.tables.archived_discount
            } else {
                q.type_weight
            };
            self.collaboration.accumulate_clique(&q.authors, delta);
        }
    }

    fn accumulate_pertinence(&mut self, qualifying: &[Qualifying<'_>]) {
        for q in qualifying {
            match Outcome::classify(q.proposal, self.inputs.tables) {
                Outcome::Approved => self.diagnostics.approved_proposals += 1,
                Outcome::PartiallyPositive => self.diagnostics.partially_positive_proposals += 1,
                Outcome::Unresolved => self.diagnostics.unscored_statuses += 1,
            }
            let status = self.inputs.tables.status_pertinence(q.proposal.status_code);
            self.pertinence
                .accumulate_clique(&q.authors, q.type_weight * status);
        }
    }

    /// Type weight of proposals whose only qualifying author is the legislator.
    fn individual_proposal_weights(&mut self) -> BTreeMap<LegislatorId, f64> {
        let inputs = self.inputs;
        let mut weights = BTreeMap::new();

        for (proposal_id, _) in inputs.authorship.iter() {
            let Some(proposal) = inputs.proposals.get(proposal_id) else {
                self.diagnostics.authorships_without_proposal += 1;
                continue;
            };
            let authors = inputs
                .authorship
                .qualifying_authors(proposal_id, &self.universe);
            let [author] = authors.as_slice() else {
                continue;
            };
            if let Some(w) = inputs.tables.proposal_weight(&proposal.type_code) {
                *weights.entry(*author).or_insert(0.0) += w;
            }
        }
        weights
    }

    fn role_relevance(&mut self) -> BTreeMap<LegislatorId, f64> {
        let inputs = self.inputs;
        let mut relevance = BTreeMap::new();

        for role in inputs.roles {
            if !self.universe.contains(&role.legislator_id) {
                continue;
            }
            let members = role
                .place_id
                .as_deref()
                .and_then(|party| inputs.parties.get(party))
                .map(|p| p.members);
            match inputs.tables.role_weight(&role.role_name, members) {
                Some(w) => *relevance.entry(role.legislator_id).or_insert(0.0) += w,
                None => {
                    self.diagnostics.unweighted_roles += 1;
                    debug!(legislator = role.legislator_id, role = %role.role_name, "role without weight");
                }
            }
        }
        relevance
    }

    fn add_nodes(&mut self, graph: &mut AttributedGraph) {
        let individual = self.individual_proposal_weights();
        let roles = self.role_relevance();
        let tables = self.inputs.tables;

        for &id in &self.universe {
            let info = resolve(id, self.inputs.directory, None, self.options.reference_date);
            let attributes = match info {
                LegislatorInfo::Known(known) => {
                    let individual_weight =
                        individual.get(&id).copied().unwrap_or(0.0) * tables.individual_proposal_factor;
                    let role_weight = roles.get(&id).copied().unwrap_or(0.0) * tables.role_factor;
                    let l = known.legislator;
                    attrs([
                        ("label", AttrValue::from(l.name)),
                        (WEIGHT, AttrValue::from(individual_weight + role_weight)),
                        ("individual_proposals_weight", individual_weight.into()),
                        ("role_relevance_weight", role_weight.into()),
                        ("party", l.party.into()),
                        ("uf", l.state.into()),
                        ("region", known.region.map(|r| r.to_string()).into()),
                        ("sex", l.sex.into()),
                        ("education", l.education.into()),
                        ("birthdate", l.birthdate.map(|d| d.to_string()).into()),
                        ("age", known.age.into()),
                        ("age_range", known.age_bracket.map(|b| b.to_string()).into()),
                    ])
                }
                LegislatorInfo::Unknown(fallback) => {
                    self.diagnostics.legacy_legislators += 1;
                    let empty = || AttrValue::from("");
                    attrs([
                        ("label", AttrValue::from(fallback.label)),
                        (WEIGHT, AttrValue::from(0.0)),
                        ("individual_proposals_weight", 0.0.into()),
                        ("role_relevance_weight", 0.0.into()),
                        ("party", empty()),
                        ("uf", empty()),
                        ("region", empty()),
                        ("sex", empty()),
                        ("education", empty()),
                        ("birthdate", empty()),
                        ("age", empty()),
                        ("age_range", empty()),
                    ])
                }
            };
            graph.add_node(id, attributes);
        }

        if self.diagnostics.legacy_legislators > 0 {
            info!(
                count = self.diagnostics.legacy_legislators,
                "authors without a directory record added as bare nodes"
            );
        }
    }

    fn add_edges(&mut self, graph: &mut AttributedGraph) {
        let collaboration = std::mem::take(&mut self.collaboration);
        for (pair, total) in collaboration.finalize() {
            let weight = if self.options.weighted {
                AttrValue::Float(total)
            } else {
                AttrValue::Int(1)
            };
            let pertinence = self.pertinence.get(&pair).unwrap_or(0.0);
            graph.add_edge(
                pair,
                attrs([(WEIGHT, weight), (SUCCESS_PERTINENCE, AttrValue::Float(pertinence))]),
            );
        }
    }

    /// Pair sets of both accumulators, for consistency checks.
    #[cfg(test)]
    fn accumulated_pairs(
        &self,
    ) -> (
        Vec<crate::accumulator::PairKey>,
        Vec<crate::accumulator::PairKey>,
    ) {
        (
            self.collaboration.pairs().copied().collect(),
            self.pertinence.pairs().copied().collect(),
        )
    }
}

/// Build a co-authorship network in one call.
pub fn build_coauthorship(
    inputs: CoauthorshipInputs<'_>,
    options: CoauthorshipOptions,
) -> CoauthorshipNetwork {
    CoauthorshipBuilder::new(inputs, options).build()
}
