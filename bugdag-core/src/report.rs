use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use graph::CommitRecord;

/// Write the per-commit record table: a header row of field names, then one
/// row per record in history order. Parent hashes are space-joined so each
/// record stays on a single line.
pub fn write_records<W: Write>(mut out: W, records: &[CommitRecord]) -> Result<()> {
    writeln!(out, "{}", CommitRecord::FIELDS.join(","))?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            record.id,
            record.commit,
            record.build,
            record.build_test,
            record.execute_test,
            record.has_test_report,
            record.state,
            record.parents.join(" "),
        )?;
    }
    Ok(())
}

/// Write the record table to a file
pub fn save_records<P: AsRef<Path>>(path: P, records: &[CommitRecord]) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
    write_records(BufWriter::new(file), records)
}
