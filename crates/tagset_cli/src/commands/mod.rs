//! CLI command implementations.

pub mod demo;
pub mod dump;
pub mod inspect;
pub mod verify;

use std::fs;
use std::path::Path;

use tagset_codec::RecordView;

use crate::error::CliError;

/// Reads a whole record file.
pub fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(CliError::io(path))
}

/// Splits a buffer of back-to-back records into views, with their offsets.
pub fn split_records(bytes: &[u8]) -> Result<Vec<(usize, RecordView<'_>)>, CliError> {
    let mut views = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let view = RecordView::parse_prefix(&bytes[offset..])
            .map_err(|source| CliError::Codec { offset, source })?;
        let len = view.as_bytes().len();
        views.push((offset, view));
        offset += len;
    }
    Ok(views)
}
