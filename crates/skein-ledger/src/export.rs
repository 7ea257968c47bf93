//! JSON export/import of the finalized cluster table.
//!
//! The table is a single JSON object keyed by root id, each value the
//! ordered member list — the same shape the original dataset tooling
//! consumed downstream. Re-loading an exported table and re-deriving
//! statistics reproduces identical aggregate figures.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use skein_cluster::ClusterMap;

use crate::error::LedgerError;

/// Write the cluster table to `path` as JSON.
pub fn write_clusters(path: &Path, map: &ClusterMap) -> Result<(), LedgerError> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), map)?;
    info!(clusters = map.cluster_count(), path = %path.display(), "wrote cluster table");
    Ok(())
}

/// Read a cluster table previously written by [`write_clusters`].
pub fn read_clusters(path: &Path) -> Result<ClusterMap, LedgerError> {
    let file = File::open(path)?;
    let map = serde_json::from_reader(BufReader::new(file))?;
    Ok(map)
}
