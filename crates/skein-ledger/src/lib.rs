//! # skein-ledger — dataset loading and cluster table export.
//!
//! Parses the headerless CSV ledger shape (transactions, inputs,
//! outputs, address mapping), joins each input to the previous output
//! it spends to resolve the spending address, and writes/reads the
//! root → members cluster table as JSON.
//!
//! All retry, skipping, and recovery policy lives here at the ingestion
//! boundary; the clustering engine itself never drops records.

pub mod error;
pub mod export;
pub mod loader;
pub mod records;

pub use error::LedgerError;
pub use export::{read_clusters, write_clusters};
pub use loader::{
    OutputIndex, load_address_universe, load_outputs, load_spender_pairs, load_transactions,
};
