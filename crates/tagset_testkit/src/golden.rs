//! Checked-in golden records.
//!
//! A golden record named `n` is stored as two files: `n_wire.golden` holds
//! the serialized bytes and `n_dump.golden` the debug dump. Set
//! `UPDATE_GOLDEN` to rewrite both from the current output.

use std::fs;
use std::path::{Path, PathBuf};

use tagset_codec::{from_wire, to_wire, Record};

/// A record whose encoding and dump are pinned by files on disk.
pub struct GoldenRecord {
    name: String,
    dir: PathBuf,
}

impl GoldenRecord {
    /// Golden files under the testkit's `golden/` directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self::in_dir(name, Path::new(env!("CARGO_MANIFEST_DIR")).join("golden"))
    }

    /// Golden files under `dir`.
    pub fn in_dir(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// Path of the serialized form.
    pub fn wire_path(&self) -> PathBuf {
        self.dir.join(format!("{}_wire.golden", self.name))
    }

    /// Path of the dump.
    pub fn dump_path(&self) -> PathBuf {
        self.dir.join(format!("{}_dump.golden", self.name))
    }

    /// Checks `record` against both golden files.
    ///
    /// A wire mismatch reports the first differing offset and the dump of
    /// whatever the golden bytes decode to.
    pub fn assert_record(&self, record: &Record) {
        let wire = to_wire(record).unwrap_or_else(|e| panic!("{}: encode failed: {e}", self.name));
        let dump = record.to_string();

        if std::env::var_os("UPDATE_GOLDEN").is_some() {
            fs::create_dir_all(&self.dir).unwrap();
            fs::write(self.wire_path(), &wire).unwrap();
            fs::write(self.dump_path(), &dump).unwrap();
            return;
        }

        let expected = self.read(&self.wire_path());
        if expected != &wire[..] {
            let offset = expected
                .iter()
                .zip(wire.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(expected.len().min(wire.len()));
            let golden = match from_wire(&expected) {
                Ok(decoded) => decoded.to_string(),
                Err(err) => format!("<undecodable: {err}>"),
            };
            panic!(
                "golden record '{}' differs at byte {offset} ({} bytes expected, {} actual)\n\
                 --- golden ---\n{golden}\n--- actual ---\n{dump}",
                self.name,
                expected.len(),
                wire.len()
            );
        }

        let expected = String::from_utf8(self.read(&self.dump_path())).unwrap();
        assert_eq!(dump, expected, "golden dump '{}' changed", self.name);
    }

    fn read(&self, path: &Path) -> Vec<u8> {
        fs::read(path).unwrap_or_else(|e| {
            panic!(
                "{}: {e}; run with UPDATE_GOLDEN=1 to create it",
                path.display()
            )
        })
    }
}

/// Encodes bytes as a lowercase hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes a hexadecimal string to bytes, ignoring whitespace.
///
/// # Panics
///
/// On characters that are not hex digits.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).unwrap_or_default();
            u8::from_str_radix(text, 16).unwrap_or_else(|_| panic!("bad hex digits {text:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{nested_record, scenario_record};
    use tempfile::TempDir;

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_encode(&[0x00, 0x01, 0xff, 0xab]), "0001ffab");
        assert_eq!(hex_decode("00 01\nff"), vec![0x00, 0x01, 0xff]);
    }

    #[test]
    fn scenario_matches_golden() {
        let golden = GoldenRecord::new("scenario");
        golden.assert_record(&scenario_record());
        assert_eq!(fs::read(golden.wire_path()).unwrap().len(), 109);
    }

    #[test]
    fn changed_record_is_reported() {
        if std::env::var_os("UPDATE_GOLDEN").is_some() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let golden = GoldenRecord::in_dir("nested", dir.path());
        fs::write(golden.wire_path(), to_wire(&nested_record(1)).unwrap()).unwrap();
        fs::write(golden.dump_path(), nested_record(1).to_string()).unwrap();
        golden.assert_record(&nested_record(1));

        let result = std::panic::catch_unwind(|| golden.assert_record(&nested_record(2)));
        let message = *result.unwrap_err().downcast::<String>().unwrap();
        assert!(message.contains("golden record 'nested' differs at byte"), "{message}");
        assert!(message.contains("--- golden ---"), "{message}");
    }
}
