//! Co-voting network.
//!
//! Two legislators are joined when they cast the same value (by default Yes
//! or No) in at least `min_common_votes` roll-call events; the edge weight is
//! the number of such events. The input is expected to be pre-filtered to
//! divisive events (see `legisnet_ingest::divisive`).

use crate::accumulator::PairAccumulator;
use crate::diagnostics::CovotingDiagnostics;
use crate::graph::{attrs, AttrValue, AttributedGraph, WEIGHT};
use crate::{NetworkError, Result};
use chrono::NaiveDate;
use legisnet_model::{
    resolve, LegislatorDirectory, LegislatorId, LegislatorInfo, RawVoteTable, VoteRecord,
    VoteValue,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Which legislators become nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeUniverse {
    /// Directory ids plus everyone who cast any vote, so legislators who
    /// never voted Yes/No still appear as isolated nodes.
    #[default]
    Broad,
    /// Only legislators who cast at least one considered value.
    VotersOnly,
}

#[derive(Debug, Clone)]
pub struct CovotingOptions {
    pub considered_values: BTreeSet<VoteValue>,
    /// Pairs agreeing in fewer events than this get no edge.
    pub min_common_votes: u32,
    pub node_universe: NodeUniverse,
    pub reference_date: NaiveDate,
}

impl Default for CovotingOptions {
    fn default() -> Self {
        Self {
            considered_values: [VoteValue::Yes, VoteValue::No].into_iter().collect(),
            min_common_votes: 1,
            node_universe: NodeUniverse::Broad,
            reference_date: chrono::Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CovotingNetwork {
    pub graph: AttributedGraph,
    pub diagnostics: CovotingDiagnostics,
}

pub struct CovotingBuilder<'a> {
    directory: &'a LegislatorDirectory,
    options: CovotingOptions,
    agreements: PairAccumulator<u32>,
    diagnostics: CovotingDiagnostics,
}

impl<'a> CovotingBuilder<'a> {
    pub fn new(directory: &'a LegislatorDirectory, options: CovotingOptions) -> Self {
        Self {
            directory,
            options,
            agreements: PairAccumulator::new(),
            diagnostics: CovotingDiagnostics::default(),
        }
    }

    /// Build the network from a roll-call table.
    ///
    /// Fails before doing any work when the table lacks a required logical
    /// field; malformed rows are dropped and counted.
    pub fn build(mut self, table: &RawVoteTable) -> Result<CovotingNetwork> {
        let missing = table.missing_required();
        if !missing.is_empty() {
            return Err(NetworkError::MissingColumns {
                missing: missing.into_iter().map(str::to_string).collect(),
                available: table.columns.clone(),
            });
        }

        let records = self.parse_rows(table);
        let considered: Vec<&VoteRecord> = records
            .iter()
            .filter(|r| self.options.considered_values.contains(&r.value))
            .collect();
        self.diagnostics.ignored_vote_values = records.len() - considered.len();
        debug!(
            rows = records.len(),
            considered = considered.len(),
            "roll-call rows after value filter"
        );

        let mut graph = AttributedGraph::new();
        self.add_nodes(&mut graph, &records, &considered);
        self.accumulate_agreements(&considered);
        self.add_edges(&mut graph);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "co-voting network built"
        );
        self.diagnostics.log_summary();

        Ok(CovotingNetwork {
            graph,
            diagnostics: self.diagnostics,
        })
    }

    fn parse_rows(&mut self, table: &RawVoteTable) -> Vec<VoteRecord> {
        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            match row.parse() {
                Some(record) => records.push(record),
                None => self.diagnostics.unparseable_ids += 1,
            }
        }
        if self.diagnostics.unparseable_ids > 0 {
            warn!(
                dropped = self.diagnostics.unparseable_ids,
                "roll-call rows with a non-integer legislator id dropped"
            );
        }
        records
    }

    fn add_nodes(
        &mut self,
        graph: &mut AttributedGraph,
        records: &[VoteRecord],
        considered: &[&VoteRecord],
    ) {
        // the row with the smallest (event id, inline fields) supplies the
        // fallback, so row order never changes node attributes
        let fallback_key = |r: &VoteRecord| {
            (
                r.vote_id.clone(),
                r.name.clone(),
                r.party.clone(),
                r.state.clone(),
            )
        };
        let mut first_row: BTreeMap<LegislatorId, &VoteRecord> = BTreeMap::new();
        for record in records {
            first_row
                .entry(record.legislator_id)
                .and_modify(|current| {
                    if fallback_key(record) < fallback_key(*current) {
                        *current = record;
                    }
                })
                .or_insert(record);
        }

        let universe: BTreeSet<LegislatorId> = match self.options.node_universe {
            NodeUniverse::Broad => self
                .directory
                .ids()
                .chain(first_row.keys().copied())
                .collect(),
            NodeUniverse::VotersOnly => considered.iter().map(|r| r.legislator_id).collect(),
        };

        for id in universe {
            let fallback = first_row.get(&id).map(|r| r.fallback_row());
            let info = resolve(
                id,
                self.directory,
                fallback.as_ref(),
                self.options.reference_date,
            );
            let attributes = match info {
                LegislatorInfo::Known(known) => {
                    let l = known.legislator;
                    attrs([
                        ("label", AttrValue::from(l.name)),
                        ("party", l.party.into()),
                        ("uf", l.state.into()),
                        ("region", known.region.map(|r| r.to_string()).into()),
                        ("sex", l.sex.into()),
                        ("education", l.education.into()),
                        ("age", known.age.into()),
                        ("age_range", known.age_bracket.map(|b| b.to_string()).into()),
                    ])
                }
                LegislatorInfo::Unknown(fallback) => {
                    self.diagnostics.fallback_legislators += 1;
                    attrs([
                        ("label", AttrValue::from(fallback.label)),
                        ("party", fallback.party.into()),
                        ("uf", fallback.state.into()),
                        ("region", fallback.region.map(|r| r.to_string()).unwrap_or_default().into()),
                        ("sex", "".into()),
                        ("education", "".into()),
                        ("age", AttrValue::Missing),
                        ("age_range", AttrValue::Missing),
                    ])
                }
            };
            graph.add_node(id, attributes);
        }
    }

    /// Within each event, every pair casting the same considered value gains one
    /// agreement. A legislator casts one vote per event, so a pair gains at most
    /// one increment per event.
    fn accumulate_agreements(&mut self, considered: &[&VoteRecord]) {
        let mut events: BTreeMap<&str, BTreeMap<&VoteValue, Vec<LegislatorId>>> = BTreeMap::new();
        for record in considered {
            events
                .entry(record.vote_id.as_str())
                .or_default()
                .entry(&record.value)
                .or_default()
                .push(record.legislator_id);
        }

        self.diagnostics.vote_events = events.len();
        for groups in events.values() {
            for voters in groups.values() {
                if self.agreements.accumulate_clique(voters, 1) == 0 {
                    self.diagnostics.degenerate_groups += 1;
                }
            }
        }
    }

    fn add_edges(&mut self, graph: &mut AttributedGraph) {
        let agreements = std::mem::take(&mut self.agreements);
        for (pair, count) in agreements.finalize() {
            if count < self.options.min_common_votes {
                self.diagnostics.pairs_below_threshold += 1;
                continue;
            }
            graph.add_edge(pair, attrs([(WEIGHT, i64::from(count))]));
        }
    }
}

/// Build a co-voting network in one call.
pub fn build_covoting(
    directory: &LegislatorDirectory,
    table: &RawVoteTable,
    options: CovotingOptions,
) -> Result<CovotingNetwork> {
    CovotingBuilder::new(directory, options).build(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use legisnet_model::{Legislator, RawVoteRow};

    fn options() -> CovotingOptions {
        CovotingOptions {
            reference_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            ..Default::default()
        }
    }

    fn table(rows: &[(&str, &str, &str)]) -> RawVoteTable {
        RawVoteTable::with_rows(
            rows.iter()
                .map(|(event, id, vote)| RawVoteRow::new(*event, *id, *vote))
                .collect(),
        )
    }

    fn weight(net: &CovotingNetwork, a: LegislatorId, b: LegislatorId) -> Option<i64> {
        net.graph.edge(a, b).map(|e| match e[WEIGHT] {
            AttrValue::Int(w) => w,
            ref other => panic!("unexpected weight {other:?}"),
        })
    }

    #[test]
    fn opposite_votes_do_not_connect() {
        let votes = table(&[
            ("100", "5", "Sim"),
            ("100", "7", "Não"),
            ("101", "5", "Sim"),
            ("101", "7", "Sim"),
        ]);
        let net = build_covoting(&LegislatorDirectory::new(), &votes, options()).unwrap();
        assert_eq!(weight(&net, 5, 7), Some(1));
        assert_eq!(net.graph.edge_count(), 1);
    }

    #[test]
    fn abstentions_add_nodes_but_no_edges() {
        let votes = table(&[
            ("1", "1", "Sim"),
            ("1", "2", "Abstenção"),
            ("1", "3", "Sim"),
            ("2", "2", "Obstrução"),
        ]);
        let net = build_covoting(&LegislatorDirectory::new(), &votes, options()).unwrap();
        assert!(net.graph.contains_node(2));
        assert_eq!(net.graph.weighted_degree(2), 0.0);
        assert_eq!(weight(&net, 1, 3), Some(1));
        assert_eq!(net.diagnostics.ignored_vote_values, 2);
    }

    #[test]
    fn threshold_filters_weak_pairs() {
        let votes = table(&[
            ("1", "1", "Sim"),
            ("1", "2", "Sim"),
            ("1", "3", "Sim"),
            ("2", "1", "Não"),
            ("2", "2", "Não"),
        ]);
        let net = build_covoting(
            &LegislatorDirectory::new(),
            &votes,
            CovotingOptions {
                min_common_votes: 2,
                ..options()
            },
        )
        .unwrap();
        assert_eq!(weight(&net, 1, 2), Some(2));
        assert_eq!(weight(&net, 1, 3), None);
        assert_eq!(weight(&net, 2, 3), None);
        assert_eq!(net.diagnostics.pairs_below_threshold, 2);
    }

    #[test]
    fn missing_columns_fail_before_building() {
        let votes = RawVoteTable {
            columns: vec!["vote_id".into(), "vote".into()],
            rows: vec![RawVoteRow::new("1", "1", "Sim")],
        };
        let err = build_covoting(&LegislatorDirectory::new(), &votes, options()).unwrap_err();
        match err {
            NetworkError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["legislator_id".to_string()]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn malformed_ids_are_dropped() {
        let votes = table(&[("1", "x", "Sim"), ("1", "2", "Sim"), ("1", "3.0", "Sim")]);
        let net = build_covoting(&LegislatorDirectory::new(), &votes, options()).unwrap();
        assert_eq!(net.diagnostics.unparseable_ids, 1);
        assert_eq!(net.graph.node_count(), 2);
        assert_eq!(weight(&net, 2, 3), Some(1));
    }

    #[test]
    fn directory_members_who_never_voted_are_isolated_nodes() {
        let directory: LegislatorDirectory =
            [Legislator::new(1, "Ana"), Legislator::new(50, "Bia")].into_iter().collect();
        let votes = table(&[("1", "1", "Sim"), ("1", "2", "Sim")]);

        let broad = build_covoting(&directory, &votes, options()).unwrap();
        assert_eq!(broad.graph.node_count(), 3);
        assert_eq!(broad.graph.node(50).unwrap()["label"], AttrValue::from("Bia"));

        let narrow = build_covoting(
            &directory,
            &votes,
            CovotingOptions {
                node_universe: NodeUniverse::VotersOnly,
                ..options()
            },
        )
        .unwrap();
        assert_eq!(narrow.graph.node_count(), 2);
    }

    #[test]
    fn unknown_voters_use_inline_fields() {
        let mut row = RawVoteRow::new("1", "9", "Sim");
        row.name = Some("Caio".into());
        row.party = Some("PSOL".into());
        row.state = Some("RJ".into());
        let votes = RawVoteTable::with_rows(vec![row]);

        let net = build_covoting(&LegislatorDirectory::new(), &votes, options()).unwrap();
        let node = net.graph.node(9).unwrap();
        assert_eq!(node["label"], AttrValue::from("Caio"));
        assert_eq!(node["region"], AttrValue::from("Sudeste"));
        assert!(node["age"].is_missing());
        assert_eq!(net.diagnostics.fallback_legislators, 1);
    }

    #[test]
    fn inline_fallback_ignores_row_order() {
        let row = |event: &str, party: &str| {
            let mut row = RawVoteRow::new(event, "9", "Sim");
            row.name = Some("Caio".into());
            row.party = Some(party.into());
            row.state = Some("RJ".into());
            row
        };
        let forward = RawVoteTable::with_rows(vec![row("10", "PSOL"), row("20", "PT")]);
        let backward = RawVoteTable::with_rows(vec![row("20", "PT"), row("10", "PSOL")]);

        let a = build_covoting(&LegislatorDirectory::new(), &forward, options()).unwrap();
        let b = build_covoting(&LegislatorDirectory::new(), &backward, options()).unwrap();
        assert_eq!(a.graph, b.graph);
        assert_eq!(a.graph.node(9).unwrap()["party"], AttrValue::from("PSOL"));
    }

    #[test]
    fn empty_table_builds_empty_graph() {
        let net = build_covoting(&LegislatorDirectory::new(), &table(&[]), options()).unwrap();
        assert_eq!(net.graph.node_count(), 0);
        assert_eq!(net.graph.edge_count(), 0);
    }
}
