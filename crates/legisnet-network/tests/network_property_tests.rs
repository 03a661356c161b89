use chrono::NaiveDate;
use legisnet_model::{
    AuthorshipRelation, Legislator, LegislatorDirectory, LegislatorId, PartyTable, Proposal,
    ProposalTable, RawVoteRow, RawVoteTable, WeightTables,
};
use legisnet_network::{
    build_coauthorship, build_covoting, unordered_pairs, CoauthorshipInputs, CoauthorshipOptions,
    CovotingOptions,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const MAX_ID: LegislatorId = 12;
const VOTES: [&str; 5] = ["Sim", "Não", "Abstenção", "Obstrução", "Art. 17"];

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

fn directory(ids: &BTreeSet<LegislatorId>) -> LegislatorDirectory {
    ids.iter()
        .map(|id| Legislator::new(*id, format!("Dep {id}")))
        .collect()
}

/// (event, legislator, vote label) with at most one row per (event, legislator).
fn roll_call_strategy() -> impl Strategy<Value = Vec<(u8, LegislatorId, usize)>> {
    prop::collection::btree_map((0u8..6, 0..MAX_ID), 0usize..VOTES.len(), 0..60).prop_map(|rows| {
        rows.into_iter()
            .map(|((event, id), vote)| (event, id, vote))
            .collect()
    })
}

fn vote_table(rows: &[(u8, LegislatorId, usize)]) -> RawVoteTable {
    RawVoteTable::with_rows(
        rows.iter()
            .map(|(event, id, vote)| RawVoteRow::new(event.to_string(), id.to_string(), VOTES[*vote]))
            .collect(),
    )
}

fn covoting_options() -> CovotingOptions {
    CovotingOptions {
        reference_date: reference_date(),
        ..Default::default()
    }
}

/// Proposal id -> (type index, authors).
fn authorship_strategy() -> impl Strategy<Value = Vec<(i64, usize, Vec<LegislatorId>)>> {
    prop::collection::vec(
        (0usize..4, prop::collection::vec(0..MAX_ID, 0..6)),
        0..15,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (kind, authors))| (i as i64, kind, authors))
            .collect()
    })
}

const TYPES: [&str; 4] = ["PL", "PEC", "PLP", "REQ"];

fn coauthorship_tables(
    items: &[(i64, usize, Vec<LegislatorId>)],
) -> (ProposalTable, AuthorshipRelation) {
    let proposals = items
        .iter()
        .map(|(id, kind, _)| Proposal::new(*id, TYPES[*kind], 1140))
        .collect();
    let authorship = items
        .iter()
        .flat_map(|(id, _, authors)| authors.iter().map(move |a| (*id, *a)))
        .collect();
    (proposals, authorship)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn covoting_is_independent_of_row_order(
        (rows, shuffled) in roll_call_strategy()
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    ) {
        let directory = directory(&(0..4).collect());
        let a = build_covoting(&directory, &vote_table(&rows), covoting_options()).unwrap();
        let b = build_covoting(&directory, &vote_table(&shuffled), covoting_options()).unwrap();
        prop_assert_eq!(a.graph, b.graph);
    }

    #[test]
    fn covoting_weights_count_identical_yes_no_votes(rows in roll_call_strategy()) {
        let net = build_covoting(&LegislatorDirectory::new(), &vote_table(&rows), covoting_options()).unwrap();

        let mut expected: BTreeMap<_, i64> = BTreeMap::new();
        let mut groups: BTreeMap<(u8, usize), Vec<LegislatorId>> = BTreeMap::new();
        for (event, id, vote) in &rows {
            if *vote < 2 {
                groups.entry((*event, *vote)).or_default().push(*id);
            }
        }
        for members in groups.values() {
            for pair in unordered_pairs(members) {
                *expected.entry(pair).or_default() += 1;
            }
        }

        prop_assert_eq!(net.graph.edge_count(), expected.len());
        for (pair, count) in expected {
            prop_assert_eq!(net.graph.edge_weight(pair.low(), pair.high()), count as f64);
            prop_assert_eq!(
                net.graph.edge_weight(pair.low(), pair.high()),
                net.graph.edge_weight(pair.high(), pair.low())
            );
        }
    }

    #[test]
    fn covoting_nodes_are_directory_plus_voters(rows in roll_call_strategy()) {
        let known: BTreeSet<LegislatorId> = (100..103).collect();
        let net = build_covoting(&directory(&known), &vote_table(&rows), covoting_options()).unwrap();
        let voters: BTreeSet<LegislatorId> = rows.iter().map(|(_, id, _)| *id).collect();
        prop_assert_eq!(net.graph.node_count(), known.union(&voters).count());
    }

    #[test]
    fn coauthorship_covers_every_qualifying_pair(items in authorship_strategy()) {
        let (proposals, authorship) = coauthorship_tables(&items);
        let directory = directory(&(0..MAX_ID).collect());
        let tables = WeightTables::default();
        let parties = PartyTable::new();
        let inputs = CoauthorshipInputs {
            directory: &directory,
            proposals: &proposals,
            authorship: &authorship,
            roles: &[],
            parties: &parties,
            tables: &tables,
        };
        let options = CoauthorshipOptions { weighted: true, reference_date: reference_date() };
        let net = build_coauthorship(inputs, options);

        let mut expected = BTreeSet::new();
        for (_, kind, authors) in &items {
            if TYPES[*kind] != "REQ" {
                expected.extend(unordered_pairs(authors));
            }
        }
        let actual: BTreeSet<_> = net.graph.edges().map(|(k, _)| k).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(net.graph.node_count(), directory.len());
    }

    #[test]
    fn coauthorship_is_deterministic(items in authorship_strategy()) {
        let (proposals, authorship) = coauthorship_tables(&items);
        let reversed: AuthorshipRelation = authorship
            .iter()
            .flat_map(|(p, authors)| authors.iter().rev().map(move |a| (p, *a)))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let directory = directory(&(0..MAX_ID).collect());
        let tables = WeightTables::default();
        let parties = PartyTable::new();
        let build = |authorship: &AuthorshipRelation| {
            let inputs = CoauthorshipInputs {
                directory: &directory,
                proposals: &proposals,
                authorship,
                roles: &[],
                parties: &parties,
                tables: &tables,
            };
            build_coauthorship(
                inputs,
                CoauthorshipOptions { weighted: true, reference_date: reference_date() },
            )
            .graph
        };
        prop_assert_eq!(build(&authorship), build(&reversed));
    }
}
