use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

use graph::CommitDag;

/// Save the full graph as an opaque blob between runs
pub fn save_graph<P: AsRef<Path>>(path: P, dag: &CommitDag) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), dag)
        .with_context(|| format!("Failed to serialize graph to {}", path.display()))?;
    info!(commits = dag.len(), path = %path.display(), "graph saved");
    Ok(())
}

/// Restore a saved graph. The blob is trusted verbatim; nothing is rebuilt
/// or re-validated.
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<CommitDag> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to deserialize graph from {}", path.display()))
}
