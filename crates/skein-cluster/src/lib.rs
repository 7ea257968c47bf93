//! # skein-cluster — multi-input heuristic clustering engine.
//!
//! Groups pseudonymous address identifiers that are provably controlled
//! by the same actor: all addresses spent together as inputs of one
//! transaction are assumed co-owned, and the transitive closure of that
//! relation partitions the address space into clusters.
//!
//! - **Disjoint-set store**: index-based union-find arena with path
//!   compression and union by rank, amortized O(α(n)) per operation.
//! - **Clustering engine**: drives unions across each transaction's
//!   distinct input addresses, then materializes the final
//!   root → members mapping in one pass.
//! - **Statistics**: cluster count and size aggregates derived purely
//!   from the finalized mapping.
//!
//! The computation is a single-writer batch: sets only ever merge,
//! never split, and the store offers no internal locking. The caller
//! owns the serialization discipline; path compression makes even
//! `find` a write.

pub mod disjoint_set;
pub mod engine;
pub mod stats;

pub use disjoint_set::DisjointSet;
pub use engine::ClusterEngine;
pub use stats::{ClusterMap, ClusterStats};
