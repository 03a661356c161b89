//! Canonical pair keys and the per-builder weight accumulator.

use legisnet_model::LegislatorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

/// Unordered pair of distinct legislators, stored smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: LegislatorId,
    high: LegislatorId,
}

impl PairKey {
    /// `None` for a self-pair.
    pub fn new(a: LegislatorId, b: LegislatorId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> LegislatorId {
        self.low
    }

    pub fn high(&self) -> LegislatorId {
        self.high
    }

    pub fn contains(&self, id: LegislatorId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Every unordered pair of distinct ids in `members`.
///
/// Repeated ids are ignored, so the result depends only on the member set.
pub fn unordered_pairs(members: &[LegislatorId]) -> Vec<PairKey> {
    let mut ids = members.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            pairs.extend(PairKey::new(a, b));
        }
    }
    pairs
}

/// Running totals per pair. Owned by exactly one builder.
#[derive(Debug, Clone)]
pub struct PairAccumulator<W> {
    totals: BTreeMap<PairKey, W>,
}

impl<W> Default for PairAccumulator<W> {
    fn default() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }
}

impl<W: Copy + Default + AddAssign> PairAccumulator<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, pair: PairKey, delta: W) {
        *self.totals.entry(pair).or_default() += delta;
    }

    /// Add `delta` to every pair drawn from `members`; returns the number of
    /// pairs touched.
    pub fn accumulate_clique(&mut self, members: &[LegislatorId], delta: W) -> usize {
        let pairs = unordered_pairs(members);
        for pair in &pairs {
            self.accumulate(*pair, delta);
        }
        pairs.len()
    }

    pub fn get(&self, pair: &PairKey) -> Option<W> {
        self.totals.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &PairKey> {
        self.totals.keys()
    }

    /// Totals sorted by pair.
    pub fn finalize(self) -> Vec<(PairKey, W)> {
        self.totals.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_keys_are_canonical() {
        assert_eq!(PairKey::new(7, 5), PairKey::new(5, 7));
        let key = PairKey::new(7, 5).unwrap();
        assert_eq!((key.low(), key.high()), (5, 7));
        assert!(PairKey::new(3, 3).is_none());
    }

    #[test]
    fn reversed_pairs_share_one_total() {
        let mut acc = PairAccumulator::<u32>::new();
        acc.accumulate(PairKey::new(1, 2).unwrap(), 1);
        acc.accumulate(PairKey::new(2, 1).unwrap(), 1);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get(&PairKey::new(1, 2).unwrap()), Some(2));
    }

    #[test]
    fn cliques_cover_every_pair_once() {
        let mut acc = PairAccumulator::<f64>::new();
        let touched = acc.accumulate_clique(&[3, 1, 2, 3], 0.5);
        assert_eq!(touched, 3);
        let pairs: Vec<_> = acc.finalize().into_iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(pairs, vec!["(1, 2)", "(1, 3)", "(2, 3)"]);
    }

    #[test]
    fn singletons_produce_no_pairs() {
        assert!(unordered_pairs(&[4]).is_empty());
        assert!(unordered_pairs(&[4, 4]).is_empty());
        assert!(unordered_pairs(&[]).is_empty());
    }
}
