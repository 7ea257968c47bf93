//! Shared test helpers for clustering and pipeline tests.

use std::collections::BTreeSet;

use skein_cluster::{ClusterEngine, ClusterMap};
use skein_core::types::{AddressId, TxId};

/// Shorthand address constructor.
pub fn addr(n: u32) -> AddressId {
    AddressId(n)
}

/// Shorthand transaction constructor.
pub fn tx(n: u32) -> TxId {
    TxId(n)
}

/// Build an engine and ingest the given `(tx, input addresses)` groups.
pub fn engine_with(groups: &[(u32, &[u32])]) -> ClusterEngine {
    let mut engine = ClusterEngine::new();
    for &(t, raw) in groups {
        let group: Vec<AddressId> = raw.iter().copied().map(addr).collect();
        engine.ingest_group(tx(t), &group).unwrap();
    }
    engine
}

/// The partition induced by a cluster map, as a set of member-sets —
/// root identity and member ordering erased.
pub fn partition(map: &ClusterMap) -> BTreeSet<BTreeSet<AddressId>> {
    map.iter()
        .map(|(_, members)| members.iter().copied().collect())
        .collect()
}

/// Member-set built from raw ids.
pub fn member_set(raw: &[u32]) -> BTreeSet<AddressId> {
    raw.iter().copied().map(addr).collect()
}
