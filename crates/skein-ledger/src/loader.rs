//! Ledger file loading and the input → previous-output join.
//!
//! The dataset never stores an input's spending address directly; each
//! input names the output it spends as `(prevTxId, prevTxpos)`. Loading
//! therefore runs in two passes: index every output by its outpoint,
//! then stream the inputs and resolve each one through the index.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use skein_core::types::{AddressId, OutputRef, TxId};

use crate::error::LedgerError;
use crate::records::{AddressRecord, InputRecord, OutputRecord, TxRecord};

/// Outpoint → spending address index over every output of the dataset.
pub type OutputIndex = HashMap<OutputRef, AddressId>;

fn lines(path: &Path) -> Result<impl Iterator<Item = (u64, std::io::Result<String>)>, LedgerError> {
    let file = File::open(path)?;
    Ok(BufReader::new(file)
        .lines()
        .enumerate()
        .map(|(i, line)| (i as u64 + 1, line)))
}

/// Load `transactions.csv`. The rows are not needed for clustering
/// itself; callers use them for dataset summaries and sanity logging.
pub fn load_transactions(path: &Path) -> Result<Vec<TxRecord>, LedgerError> {
    let mut records = Vec::new();
    for (lineno, line) in lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(TxRecord::parse(&line, lineno)?);
    }
    info!(transactions = records.len(), path = %path.display(), "loaded transactions");
    Ok(records)
}

/// Index every output of `outputs.csv` by its `(tx, position)` outpoint.
pub fn load_outputs(path: &Path) -> Result<OutputIndex, LedgerError> {
    let mut index = OutputIndex::new();
    for (lineno, line) in lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec = OutputRecord::parse(&line, lineno)?;
        let outpoint = OutputRef {
            tx: rec.tx,
            position: rec.position,
        };
        if index.insert(outpoint, rec.address).is_some() {
            warn!(%outpoint, line = lineno, "duplicate outpoint in outputs file, keeping last");
        }
    }
    info!(outputs = index.len(), path = %path.display(), "indexed transaction outputs");
    Ok(index)
}

/// Stream `inputs.csv` and resolve each input to its spending address.
///
/// Produces `(spending tx, address)` pairs sorted by transaction id
/// (stable, so address order within one transaction follows file
/// order), which is exactly the grouped-by-construction shape
/// `ClusterEngine::ingest_pairs` expects. An input naming an outpoint
/// absent from the index is a hard error — dropping it would silently
/// truncate clusters.
pub fn load_spender_pairs(
    path: &Path,
    outputs: &OutputIndex,
) -> Result<Vec<(TxId, AddressId)>, LedgerError> {
    let mut pairs: Vec<(TxId, AddressId)> = Vec::new();
    for (lineno, line) in lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec = InputRecord::parse(&line, lineno)?;
        let outpoint = OutputRef {
            tx: rec.prev_tx,
            position: rec.prev_pos,
        };
        let address = outputs
            .get(&outpoint)
            .copied()
            .ok_or(LedgerError::UnknownOutpoint {
                tx: rec.tx,
                outpoint,
            })?;
        pairs.push((rec.tx, address));
    }
    pairs.sort_by_key(|&(tx, _)| tx);
    info!(inputs = pairs.len(), path = %path.display(), "resolved spender addresses");
    Ok(pairs)
}

/// Load the full address universe from the mapping file.
///
/// Feeds `ClusterEngine::with_universe` so that clustering runs over a
/// closed, pre-validated identifier space and singleton addresses that
/// never co-spend still appear in the final partition.
pub fn load_address_universe(path: &Path) -> Result<Vec<AddressId>, LedgerError> {
    let mut universe = Vec::new();
    for (lineno, line) in lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        universe.push(AddressRecord::parse(&line, lineno)?.address);
    }
    info!(addresses = universe.len(), path = %path.display(), "loaded address universe");
    Ok(universe)
}
