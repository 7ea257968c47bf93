//! Finalized cluster mapping and derived size statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use skein_core::types::AddressId;

/// The finalized root → members mapping.
///
/// Covers every registered address exactly once across all clusters
/// (partition property). A cluster's root is whichever address the
/// union algorithm settled on as representative — a stable key for the
/// duration of one computation, nothing more. Member order follows
/// first-encounter order of the finalize pass; map iteration is
/// root-ascending and deterministic.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ClusterMap {
    clusters: BTreeMap<AddressId, Vec<AddressId>>,
}

impl ClusterMap {
    pub(crate) fn new(clusters: BTreeMap<AddressId, Vec<AddressId>>) -> Self {
        Self { clusters }
    }

    /// Number of clusters.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Total number of addresses across all clusters.
    pub fn address_count(&self) -> usize {
        self.clusters.values().map(Vec::len).sum()
    }

    /// Whether the map holds no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Members of the cluster rooted at `root`, if any.
    pub fn members(&self, root: AddressId) -> Option<&[AddressId]> {
        self.clusters.get(&root).map(Vec::as_slice)
    }

    /// Iterate `(root, members)` in root-ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressId, &[AddressId])> {
        self.clusters
            .iter()
            .map(|(&root, members)| (root, members.as_slice()))
    }

    /// The largest cluster as `(root, size)`, if any. Earliest root
    /// wins a size tie.
    pub fn largest(&self) -> Option<(AddressId, usize)> {
        self.iter()
            .map(|(root, members)| (root, members.len()))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    /// `(root, size)` pairs sorted by size descending (root ascending
    /// on ties). A consumer-side ranking convenience — the engine never
    /// ranks or filters clusters itself.
    pub fn sizes_descending(&self) -> Vec<(AddressId, usize)> {
        let mut sizes: Vec<(AddressId, usize)> = self
            .iter()
            .map(|(root, members)| (root, members.len()))
            .collect();
        sizes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        sizes
    }
}

/// Aggregate cluster size figures, derived purely from a [`ClusterMap`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ClusterStats {
    /// Number of clusters.
    pub count: usize,
    /// Mean cluster size.
    pub mean_size: f64,
    /// Smallest cluster size (0 for an empty map).
    pub min_size: usize,
    /// Largest cluster size (0 for an empty map).
    pub max_size: usize,
}

impl ClusterStats {
    /// Compute size statistics over a finalized map.
    pub fn from_map(map: &ClusterMap) -> Self {
        if map.is_empty() {
            return Self::default();
        }
        let mut min_size = usize::MAX;
        let mut max_size = 0usize;
        let mut total = 0usize;
        for (_, members) in map.iter() {
            min_size = min_size.min(members.len());
            max_size = max_size.max(members.len());
            total += members.len();
        }
        Self {
            count: map.cluster_count(),
            mean_size: total as f64 / map.cluster_count() as f64,
            min_size,
            max_size,
        }
    }
}
