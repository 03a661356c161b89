use chrono::{Days, NaiveDate};
use legisnet_model::{age_on, AgeBracket, AuthorshipRelation, LegislatorId, WeightTables};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    // 1900-01-01 plus up to ~150 years
    (0u64..55_000).prop_map(|d| {
        NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(d))
            .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn qualifying_authors_are_sorted_unique_and_in_universe(
        authors in prop::collection::vec(0i64..30, 0..20),
        universe in prop::collection::btree_set(0i64..30, 0..30),
    ) {
        let relation: AuthorshipRelation = authors.iter().map(|a| (1, *a)).collect();
        let qualifying = relation.qualifying_authors(1, &universe);

        prop_assert!(qualifying.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(qualifying.iter().all(|a| universe.contains(a)));
        let expected: BTreeSet<LegislatorId> =
            authors.iter().copied().filter(|a| universe.contains(a)).collect();
        prop_assert_eq!(qualifying, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn age_never_decreases_with_the_reference_date(
        born in date_strategy(),
        a in date_strategy(),
        b in date_strategy(),
    ) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        match (age_on(born, early), age_on(born, late)) {
            (Some(x), Some(y)) => prop_assert!(x <= y),
            (Some(_), None) => prop_assert!(false, "age disappeared at a later date"),
            _ => {}
        }
    }

    #[test]
    fn age_brackets_are_monotone(x in 0u32..120, y in 0u32..120) {
        let (young, old) = if x <= y { (x, y) } else { (y, x) };
        prop_assert!(AgeBracket::from_age(young) <= AgeBracket::from_age(old));
    }

    #[test]
    fn leader_weight_scales_with_party_size(members in 0u32..513) {
        let tables = WeightTables::default();
        let small = tables.role_weight("Líder do Partido", Some(members)).unwrap();
        let large = tables.role_weight("Líder do Partido", Some(members + 1)).unwrap();
        prop_assert!(small < large);
    }
}
