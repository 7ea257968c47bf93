//! Error types for ledger loading and export.

use thiserror::Error;

use skein_core::types::{OutputRef, TxId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    #[error("input of tx {tx} spends unknown outpoint {outpoint}")]
    UnknownOutpoint { tx: TxId, outpoint: OutputRef },
    #[error("cluster table: {0}")]
    Json(#[from] serde_json::Error),
}
