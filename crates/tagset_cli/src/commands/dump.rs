//! Dump command implementation.

use std::fmt::Write;
use std::path::Path;

use super::{read_file, split_records};
use crate::error::CliError;

/// Runs the dump command.
pub fn run(path: &Path, limit: Option<usize>) -> Result<(), CliError> {
    let bytes = read_file(path)?;
    print!("{}", render(&bytes, limit)?);
    Ok(())
}

/// Renders up to `limit` records from `bytes` as indented trees.
pub fn render(bytes: &[u8], limit: Option<usize>) -> Result<String, CliError> {
    let views = split_records(bytes)?;
    let shown = limit.unwrap_or(views.len()).min(views.len());

    // Writes to `out` cannot fail.
    let mut out = String::new();
    for (offset, view) in views.iter().take(shown) {
        let record = view
            .to_record()
            .map_err(|source| CliError::Codec {
                offset: *offset,
                source,
            })?;
        let _ = writeln!(out, "@{}", offset);
        out.push_str(&record.dump(0));
    }
    if shown < views.len() {
        let _ = writeln!(out, "... {} more record(s)", views.len() - shown);
    }
    Ok(out)
}
