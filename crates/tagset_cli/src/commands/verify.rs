//! Verify command implementation.

use std::path::Path;

use tagset_codec::{to_wire, RecordDecoder};
use tracing::{debug, info};

use super::read_file;
use crate::error::CliError;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records checked.
    pub records_checked: usize,
    /// Number of records that decode, re-encode identically and carry
    /// consistent size totals.
    pub valid_records: usize,
    /// List of problems found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), CliError> {
    println!("Verifying records in {:?}", path);
    println!();

    let bytes = read_file(path)?;
    let result = verify(&bytes);

    println!("Records checked: {}", result.records_checked);
    println!("Valid records:   {}", result.valid_records);
    for error in &result.errors {
        println!("  - {}", error);
    }

    println!();
    if result.is_ok() {
        println!("✓ Verification passed");
        Ok(())
    } else {
        println!("✗ Verification failed");
        Err(CliError::VerificationFailed {
            problems: result.errors.len(),
        })
    }
}

/// Checks every record in `bytes`.
///
/// Each record must decode, report size totals matching a full recount, and
/// re-encode to exactly the bytes it was read from. Checking stops at the
/// first record that fails to decode, since its length is then unknown.
pub fn verify(bytes: &[u8]) -> VerifyResult {
    let mut result = VerifyResult::default();
    let mut decoder = RecordDecoder::new(bytes);

    while !decoder.is_empty() {
        let offset = bytes.len() - decoder.remaining();
        result.records_checked += 1;

        let record = match decoder.decode_next() {
            Ok(record) => record,
            Err(e) => {
                result
                    .errors
                    .push(format!("Record at offset {} failed to decode: {}", offset, e));
                break;
            }
        };
        let end = bytes.len() - decoder.remaining();
        let original = &bytes[offset..end];

        let mut problems = 0;
        let summary = record.recompute_sizes();
        if summary.header_bytes != record.header_bytes()
            || summary.data_bytes != record.data_bytes()
        {
            result.errors.push(format!(
                "Record at offset {}: tracked sizes {}/{} differ from recount {}/{}",
                offset,
                record.header_bytes(),
                record.data_bytes(),
                summary.header_bytes,
                summary.data_bytes
            ));
            problems += 1;
        }

        match to_wire(&record) {
            Ok(encoded) if encoded[..] == *original => {}
            Ok(encoded) => {
                result.errors.push(format!(
                    "Record at offset {}: re-encoded to {} bytes that differ from the {} read",
                    offset,
                    encoded.len(),
                    original.len()
                ));
                problems += 1;
            }
            Err(e) => {
                result
                    .errors
                    .push(format!("Record at offset {} failed to re-encode: {}", offset, e));
                problems += 1;
            }
        }

        if problems == 0 {
            debug!(offset, bytes = original.len(), "record verified");
            result.valid_records += 1;
        }
    }

    info!(
        checked = result.records_checked,
        valid = result.valid_records,
        "verification finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagset_testkit::{mixed_record, nested_record, scenario_record, TempRecordFile};

    #[test]
    fn verify_valid_file() {
        let mut bytes = to_wire(&scenario_record()).unwrap().to_vec();
        bytes.extend_from_slice(&to_wire(&mixed_record()).unwrap());
        bytes.extend_from_slice(&to_wire(&nested_record(4)).unwrap());

        let result = verify(&bytes);
        assert_eq!(result.records_checked, 3);
        assert_eq!(result.valid_records, 3);
        assert!(result.is_ok());
    }

    #[test]
    fn verify_reports_truncation() {
        let bytes = to_wire(&scenario_record()).unwrap();
        let result = verify(&bytes[..100]);
        assert_eq!(result.records_checked, 1);
        assert_eq!(result.valid_records, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("offset 0"));
    }

    #[test]
    fn run_fails_on_corrupt_file() {
        let mut bytes = to_wire(&scenario_record()).unwrap().to_vec();
        bytes[53] ^= 0xff;
        let file = TempRecordFile::from_bytes(&bytes);
        assert!(matches!(
            run(file.path()),
            Err(CliError::VerificationFailed { problems: 1 })
        ));

        let file = TempRecordFile::new(&scenario_record());
        assert!(run(file.path()).is_ok());
    }
}
