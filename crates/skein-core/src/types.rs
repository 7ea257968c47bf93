//! Ledger identifier types.
//!
//! The dataset pre-assigns dense non-negative integer keys to addresses
//! and transactions; these newtypes keep the two id spaces from mixing.
//! Uniqueness and totality of the key space are upstream invariants —
//! every address referenced by any input or output appears as a key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque dense key for an address.
///
/// Carries no domain meaning beyond identity; the hash → id mapping
/// lives in the dataset's address mapping file.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AddressId(pub u32);

impl AddressId {
    /// Return the raw key.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AddressId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<AddressId> for u32 {
    fn from(id: AddressId) -> Self {
        id.0
    }
}

/// Opaque dense key for a transaction.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct TxId(pub u32);

impl TxId {
    /// Return the raw key.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TxId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<TxId> for u32 {
    fn from(id: TxId) -> Self {
        id.0
    }
}

/// Reference to a specific output of a transaction.
///
/// Inputs name the output they spend by `(previous tx, position)`;
/// resolving an input to its spending address goes through this key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputRef {
    /// Transaction that created the output.
    pub tx: TxId,
    /// Index of the output within that transaction.
    pub position: u16,
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx, self.position)
    }
}
