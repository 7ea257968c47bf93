//! Disjoint-set forest (union-find) over address identifiers.
//!
//! Addresses intern into dense slots backed by parallel `parent`/`rank`
//! vectors rather than heap-allocated nodes, keeping the structure
//! cache-friendly at tens of millions of entries. Path compression and
//! union by rank together give amortized O(α(n)) per operation; either
//! one alone degrades to O(log n) amortized, so both are load-bearing.
//!
//! Not internally synchronized. Path compression rewrites shared parent
//! slots, so even `find` mutates; callers must serialize all access
//! during the union phase.

use std::collections::HashMap;

use skein_core::error::ClusterError;
use skein_core::types::AddressId;

/// Union-find forest with path compression and union by rank.
///
/// Created once per run, populated by [`make_set`](Self::make_set),
/// mutated monotonically by unions (sets only ever merge), and read out
/// via [`roots`](Self::roots) at the end of the batch.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    /// Parent slot per node. A slot that is its own parent is a root.
    parent: Vec<u32>,
    /// Height bound of the tree rooted at each slot. Meaningful for
    /// roots only, and bounds worst-case height — never cardinality.
    rank: Vec<u8>,
    /// Address → slot interning.
    slots: HashMap<AddressId, u32>,
    /// Slot → address, in registration order.
    addresses: Vec<AddressId>,
    /// Number of disjoint sets currently in the forest.
    set_count: usize,
}

impl DisjointSet {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty forest with capacity for `n` addresses.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            parent: Vec::with_capacity(n),
            rank: Vec::with_capacity(n),
            slots: HashMap::with_capacity(n),
            addresses: Vec::with_capacity(n),
            set_count: 0,
        }
    }

    /// Register `id` as a new singleton set.
    ///
    /// Idempotent: registering an existing id is a no-op. Returns
    /// whether the id was new. Every id must be registered before any
    /// `find`/`union` referencing it.
    pub fn make_set(&mut self, id: AddressId) -> bool {
        if self.slots.contains_key(&id) {
            return false;
        }
        let slot = self.parent.len() as u32;
        self.parent.push(slot);
        self.rank.push(0);
        self.slots.insert(id, slot);
        self.addresses.push(id);
        self.set_count += 1;
        true
    }

    /// Number of registered addresses.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether no addresses are registered.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Whether `id` has been registered.
    pub fn contains(&self, id: AddressId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of disjoint sets currently in the forest.
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    /// Address registered at dense slot `index` (registration order).
    /// Callers index within `0..len()`.
    pub(crate) fn address_at(&self, index: usize) -> AddressId {
        self.addresses[index]
    }

    /// Canonical representative of the set containing `id`.
    ///
    /// Performs full path compression: every node visited on the way to
    /// the root is re-pointed directly at it, so repeated finds over
    /// overlapping chains approach O(1).
    pub fn find(&mut self, id: AddressId) -> Result<AddressId, ClusterError> {
        let slot = self.slot_of(id)?;
        let root = self.find_slot(slot);
        Ok(self.addresses[root as usize])
    }

    /// Merge the sets containing `a` and `b`.
    ///
    /// Returns `true` iff a merge occurred (`false` when the roots were
    /// already equal), letting callers count effective merge edges.
    ///
    /// Union by rank: the root of lower rank attaches under the root of
    /// higher rank. On a rank tie the second operand's root attaches
    /// under the first operand's root and the surviving root's rank
    /// increments by one — fixed this way so fixtures reproduce.
    pub fn union(&mut self, a: AddressId, b: AddressId) -> Result<bool, ClusterError> {
        let slot_a = self.slot_of(a)?;
        let slot_b = self.slot_of(b)?;
        let root_a = self.find_slot(slot_a);
        let root_b = self.find_slot(slot_b);

        if root_a == root_b {
            return Ok(false);
        }

        let (ra, rb) = (root_a as usize, root_b as usize);
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = root_b;
        } else {
            self.parent[rb] = root_a;
            if self.rank[ra] == self.rank[rb] {
                self.rank[ra] += 1;
            }
        }
        self.set_count -= 1;
        Ok(true)
    }

    /// Iterate every address that is currently its own parent, in
    /// registration order. Used once, at the end, to enumerate clusters.
    pub fn roots(&self) -> impl Iterator<Item = AddressId> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|&(slot, &parent)| slot as u32 == parent)
            .map(|(slot, _)| self.addresses[slot])
    }

    fn slot_of(&self, id: AddressId) -> Result<u32, ClusterError> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(ClusterError::UnknownAddress(id))
    }

    /// Two-pass iterative find: walk to the root, then re-point every
    /// visited slot at it.
    fn find_slot(&mut self, slot: u32) -> u32 {
        let mut root = slot;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cursor = slot;
        while cursor != root {
            let next = self.parent[cursor as usize];
            self.parent[cursor as usize] = root;
            cursor = next;
        }
        root
    }
}
