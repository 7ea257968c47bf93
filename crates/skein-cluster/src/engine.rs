//! Clustering engine driving the multi-input heuristic.
//!
//! Consumes per-transaction input address groups, unions each group in
//! the disjoint-set store, and materializes the final root → members
//! mapping in a single finalize pass. Single-input transactions impose
//! no constraint and are skipped; a dataset with zero multi-input
//! transactions finalizes to all-singleton clusters, which is a valid
//! terminal state, not a degenerate one.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use skein_core::error::ClusterError;
use skein_core::types::{AddressId, TxId};

use crate::disjoint_set::DisjointSet;
use crate::stats::{ClusterMap, ClusterStats};

/// Batch clustering engine over a fixed transaction set.
///
/// Lifecycle: construct, ingest transaction input groups, `finalize`,
/// read clusters/statistics, discard. The engine rejects ingestion
/// after finalization — the structure is read-only from that point
/// until teardown.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    store: DisjointSet,
    /// Closed identifier space: ingestion referencing an id outside the
    /// pre-registered universe halts with `UnknownAddress` instead of
    /// registering it implicitly.
    strict: bool,
    /// Unions that actually merged two sets (effective merge edges).
    merges: u64,
    finalized: Option<ClusterMap>,
}

impl ClusterEngine {
    /// Engine over an open identifier space: address ids encountered
    /// for the first time during ingestion are registered implicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over a closed, pre-validated identifier space.
    ///
    /// Every id in `universe` is registered as a singleton up front.
    /// Ingestion referencing an id outside the universe fails with
    /// [`ClusterError::UnknownAddress`] — the engine halts rather than
    /// silently producing incomplete clusters.
    pub fn with_universe(universe: impl IntoIterator<Item = AddressId>) -> Self {
        let mut store = DisjointSet::new();
        for id in universe {
            store.make_set(id);
        }
        info!(addresses = store.len(), "registered address universe");
        Self {
            store,
            strict: true,
            merges: 0,
            finalized: None,
        }
    }

    /// Register `id` as a singleton set. Idempotent; returns whether
    /// the id was new.
    pub fn register(&mut self, id: AddressId) -> Result<bool, ClusterError> {
        if self.finalized.is_some() {
            return Err(ClusterError::AlreadyFinalized);
        }
        Ok(self.store.make_set(id))
    }

    /// Number of registered addresses.
    pub fn address_count(&self) -> usize {
        self.store.len()
    }

    /// Number of unions that merged two previously distinct sets.
    ///
    /// Duplicate addresses within a group and repeated co-spends never
    /// inflate this figure; only effective merges count.
    pub fn merge_count(&self) -> u64 {
        self.merges
    }

    /// Ingest one transaction's input address set.
    ///
    /// Duplicates are removed first (several inputs of one transaction
    /// may spend outputs of the same address). Groups with fewer than
    /// two distinct addresses — including empty groups — contribute no
    /// unions and are not an error. Returns whether the group drove any
    /// union operations.
    pub fn ingest_group(
        &mut self,
        tx: TxId,
        addresses: &[AddressId],
    ) -> Result<bool, ClusterError> {
        if self.finalized.is_some() {
            return Err(ClusterError::AlreadyFinalized);
        }

        let mut seen = HashSet::with_capacity(addresses.len());
        let mut distinct = Vec::with_capacity(addresses.len());
        for &id in addresses {
            if seen.insert(id) {
                distinct.push(id);
            }
        }

        for &id in &distinct {
            if self.strict {
                if !self.store.contains(id) {
                    return Err(ClusterError::UnknownAddress(id));
                }
            } else {
                self.store.make_set(id);
            }
        }

        if distinct.len() < 2 {
            return Ok(false);
        }

        // Chain-union the first distinct address with each subsequent
        // one; transitivity closes the whole group into one set.
        let first = distinct[0];
        for &other in &distinct[1..] {
            if self.store.union(first, other)? {
                self.merges += 1;
            }
        }
        debug!(%tx, inputs = distinct.len(), "unioned transaction input set");
        Ok(true)
    }

    /// Ingest a stream of `(transaction, address)` spender pairs,
    /// grouped by construction: all pairs of one transaction arrive as
    /// a consecutive run (the shape the ledger join produces).
    pub fn ingest_pairs(
        &mut self,
        pairs: impl IntoIterator<Item = (TxId, AddressId)>,
    ) -> Result<(), ClusterError> {
        let mut current: Option<TxId> = None;
        let mut group: Vec<AddressId> = Vec::new();
        for (tx, address) in pairs {
            if current != Some(tx) {
                if let Some(prev) = current {
                    self.ingest_group(prev, &group)?;
                }
                current = Some(tx);
                group.clear();
            }
            group.push(address);
        }
        if let Some(prev) = current {
            self.ingest_group(prev, &group)?;
        }
        Ok(())
    }

    /// Materialize the root → members mapping.
    ///
    /// One pass over every registered address in registration order:
    /// resolve its root (compression benefits later lookups) and append
    /// it to that root's member list, so member order is first-encounter
    /// order of this pass. Idempotent — a second call returns the map
    /// already built. No further ingestion is accepted afterwards.
    pub fn finalize(&mut self) -> Result<&ClusterMap, ClusterError> {
        if self.finalized.is_none() {
            let mut clusters: BTreeMap<AddressId, Vec<AddressId>> = BTreeMap::new();
            for slot in 0..self.store.len() {
                let id = self.store.address_at(slot);
                let root = self.store.find(id)?;
                clusters.entry(root).or_default().push(id);
            }
            info!(
                addresses = self.store.len(),
                clusters = clusters.len(),
                merges = self.merges,
                "finalized cluster map"
            );
            self.finalized = Some(ClusterMap::new(clusters));
        }
        self.clusters()
    }

    /// The finalized mapping, or [`ClusterError::NotFinalized`] before
    /// [`finalize`](Self::finalize) has run.
    pub fn clusters(&self) -> Result<&ClusterMap, ClusterError> {
        self.finalized.as_ref().ok_or(ClusterError::NotFinalized)
    }

    /// Size statistics over the finalized mapping, or
    /// [`ClusterError::NotFinalized`] before [`finalize`](Self::finalize).
    pub fn statistics(&self) -> Result<ClusterStats, ClusterError> {
        Ok(ClusterStats::from_map(self.clusters()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn addr(n: u32) -> AddressId {
        AddressId(n)
    }

    fn tx(n: u32) -> TxId {
        TxId(n)
    }

    fn group(raw: &[u32]) -> Vec<AddressId> {
        raw.iter().copied().map(addr).collect()
    }

    /// Partition as a set of member-sets, ignoring roots and ordering.
    fn partition(map: &ClusterMap) -> BTreeSet<BTreeSet<AddressId>> {
        map.iter()
            .map(|(_, members)| members.iter().copied().collect())
            .collect()
    }

    #[test]
    fn statistics_before_finalize_fails() {
        let engine = ClusterEngine::new();
        assert_eq!(engine.statistics(), Err(ClusterError::NotFinalized));
        assert_eq!(
            engine.clusters().unwrap_err(),
            ClusterError::NotFinalized
        );
    }

    #[test]
    fn ingest_after_finalize_fails() {
        let mut engine = ClusterEngine::new();
        engine.ingest_group(tx(1), &group(&[1, 2])).unwrap();
        engine.finalize().unwrap();
        assert_eq!(
            engine.ingest_group(tx(2), &group(&[2, 3])),
            Err(ClusterError::AlreadyFinalized)
        );
        assert_eq!(
            engine.register(addr(9)),
            Err(ClusterError::AlreadyFinalized)
        );
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut engine = ClusterEngine::new();
        engine.ingest_group(tx(1), &group(&[1, 2, 3])).unwrap();
        let first = engine.finalize().unwrap().clone();
        let second = engine.finalize().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn singleton_baseline_without_unions() {
        let mut engine = ClusterEngine::with_universe((0..5).map(addr));
        let map = engine.finalize().unwrap();
        assert_eq!(map.cluster_count(), 5);
        for i in 0..5 {
            assert_eq!(map.members(addr(i)), Some(&[addr(i)][..]));
        }
    }

    #[test]
    fn multi_input_scenario_from_three_transactions() {
        // T1 spends {1,2,3}, T2 spends {3,4}, T3 has the single
        // input {5}: one cluster {1,2,3,4} plus the singleton {5}.
        let mut engine = ClusterEngine::with_universe((1..=5).map(addr));
        engine.ingest_group(tx(1), &group(&[1, 2, 3])).unwrap();
        engine.ingest_group(tx(2), &group(&[3, 4])).unwrap();
        engine.ingest_group(tx(3), &group(&[5])).unwrap();

        let map = engine.finalize().unwrap();
        assert_eq!(map.cluster_count(), 2);
        let expected: BTreeSet<BTreeSet<AddressId>> = [
            group(&[1, 2, 3, 4]).into_iter().collect(),
            group(&[5]).into_iter().collect(),
        ]
        .into_iter()
        .collect();
        assert_eq!(partition(map), expected);

        let stats = engine.statistics().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_size, 2.5);
        assert_eq!(stats.min_size, 1);
        assert_eq!(stats.max_size, 4);
    }

    #[test]
    fn duplicate_inputs_union_once() {
        // A transaction spending {7,7,8} merges 7 and 8 exactly once:
        // no error, no double-counted merge edge.
        let mut engine = ClusterEngine::new();
        engine.ingest_group(tx(1), &group(&[7, 7, 8])).unwrap();
        assert_eq!(engine.merge_count(), 1);

        let map = engine.finalize().unwrap();
        assert_eq!(map.cluster_count(), 1);
        assert_eq!(
            partition(map),
            [group(&[7, 8]).into_iter().collect()].into_iter().collect()
        );
    }

    #[test]
    fn empty_group_contributes_no_unions() {
        let mut engine = ClusterEngine::new();
        assert!(!engine.ingest_group(tx(1), &[]).unwrap());
        assert_eq!(engine.address_count(), 0);
        assert_eq!(engine.merge_count(), 0);
    }

    #[test]
    fn single_address_group_registers_but_does_not_union() {
        let mut engine = ClusterEngine::new();
        assert!(!engine.ingest_group(tx(1), &group(&[4])).unwrap());
        assert_eq!(engine.address_count(), 1);
        assert_eq!(engine.merge_count(), 0);
    }

    #[test]
    fn strict_mode_halts_on_unknown_address() {
        let mut engine = ClusterEngine::with_universe(group(&[1, 2, 3]));
        assert_eq!(
            engine.ingest_group(tx(1), &group(&[2, 9])),
            Err(ClusterError::UnknownAddress(addr(9)))
        );
        // Nothing was merged before the halt surfaced.
        assert_eq!(engine.merge_count(), 0);
    }

    #[test]
    fn open_mode_registers_implicitly() {
        let mut engine = ClusterEngine::new();
        engine.ingest_group(tx(1), &group(&[10, 11])).unwrap();
        assert_eq!(engine.address_count(), 2);
        assert_eq!(engine.merge_count(), 1);
    }

    #[test]
    fn ingest_pairs_groups_consecutive_runs() {
        let mut engine = ClusterEngine::new();
        let pairs = [
            (tx(1), addr(1)),
            (tx(1), addr(2)),
            (tx(1), addr(3)),
            (tx(2), addr(3)),
            (tx(2), addr(4)),
            (tx(3), addr(5)),
        ];
        engine.ingest_pairs(pairs).unwrap();
        let map = engine.finalize().unwrap();
        assert_eq!(map.cluster_count(), 2);
        assert_eq!(engine.merge_count(), 3);
    }

    #[test]
    fn member_order_follows_finalize_pass_encounter_order() {
        let mut engine = ClusterEngine::new();
        // Registration order: 5, 1, 3. Union puts them in one set;
        // members must come out in registration order, whatever the
        // union order was.
        engine.ingest_group(tx(1), &group(&[5, 1])).unwrap();
        engine.ingest_group(tx(2), &group(&[1, 3])).unwrap();
        let map = engine.finalize().unwrap();
        let (_, members) = map.iter().next().unwrap();
        assert_eq!(members, &group(&[5, 1, 3])[..]);
    }

    #[test]
    fn repeated_group_ingestion_is_idempotent() {
        let mut once = ClusterEngine::new();
        once.ingest_group(tx(1), &group(&[1, 2])).unwrap();
        let mut twice = ClusterEngine::new();
        twice.ingest_group(tx(1), &group(&[1, 2])).unwrap();
        twice.ingest_group(tx(1), &group(&[1, 2])).unwrap();

        assert_eq!(once.merge_count(), twice.merge_count());
        assert_eq!(
            partition(once.finalize().unwrap()),
            partition(twice.finalize().unwrap())
        );
    }

    proptest! {
        /// After finalize, member lists are pairwise disjoint and cover
        /// every registered address exactly once.
        #[test]
        fn partition_invariant(
            groups in prop::collection::vec(
                prop::collection::vec(0u32..50, 0..6),
                0..30,
            ),
        ) {
            let mut engine = ClusterEngine::new();
            for (i, g) in groups.iter().enumerate() {
                let g: Vec<AddressId> = g.iter().copied().map(addr).collect();
                engine.ingest_group(tx(i as u32), &g).unwrap();
            }
            let registered = engine.address_count();
            let map = engine.finalize().unwrap();

            let mut all: Vec<AddressId> = Vec::new();
            for (_, members) in map.iter() {
                all.extend_from_slice(members);
            }
            let unique: BTreeSet<AddressId> = all.iter().copied().collect();
            prop_assert_eq!(all.len(), registered);
            prop_assert_eq!(unique.len(), registered);
        }

        /// The induced partition is invariant under group reordering.
        #[test]
        fn group_order_independence(
            groups in prop::collection::vec(
                prop::collection::vec(0u32..30, 2..5),
                1..15,
            ),
        ) {
            let universe: Vec<AddressId> = (0..30).map(addr).collect();

            let mut forward = ClusterEngine::with_universe(universe.clone());
            for (i, g) in groups.iter().enumerate() {
                let g: Vec<AddressId> = g.iter().copied().map(addr).collect();
                forward.ingest_group(tx(i as u32), &g).unwrap();
            }

            let mut reverse = ClusterEngine::with_universe(universe);
            for (i, g) in groups.iter().enumerate().rev() {
                let g: Vec<AddressId> = g.iter().copied().map(addr).collect();
                reverse.ingest_group(tx(i as u32), &g).unwrap();
            }

            prop_assert_eq!(
                partition(forward.finalize().unwrap()),
                partition(reverse.finalize().unwrap())
            );
        }

        /// Every root reported by the map resolves to itself, and each
        /// member list contains its own root.
        #[test]
        fn roots_are_members_of_their_clusters(
            groups in prop::collection::vec(
                prop::collection::vec(0u32..40, 2..6),
                0..20,
            ),
        ) {
            let mut engine = ClusterEngine::new();
            for (i, g) in groups.iter().enumerate() {
                let g: Vec<AddressId> = g.iter().copied().map(addr).collect();
                engine.ingest_group(tx(i as u32), &g).unwrap();
            }
            let map = engine.finalize().unwrap().clone();
            for (root, members) in map.iter() {
                prop_assert!(members.contains(&root));
            }
        }
    }
}
