//! Error types for the Skein clustering engine.
//!
//! All failures propagate as typed conditions; nothing in the engine is
//! logged-and-continued, since a silently partial clustering corrupts
//! every downstream result derived from it.

use thiserror::Error;

use crate::types::AddressId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("unknown address id: {0}")]
    UnknownAddress(AddressId),
    #[error("cluster map not finalized")]
    NotFinalized,
    #[error("engine already finalized; no further ingestion accepted")]
    AlreadyFinalized,
}
