//! Sample records and temporary record files.

use std::fs;
use std::path::{Path, PathBuf};

use tagset_codec::{to_wire, Entity, Record};
use tempfile::TempDir;

/// The two-pair record used throughout the tests: `"x" => int32 10` and
/// `"name" => "abcd"`. It serializes to 109 bytes.
pub fn scenario_record() -> Record {
    let mut record = Record::new();
    record
        .put_named("x", Entity::item(10i32).expect("int32 item"))
        .expect("string key");
    record
        .put_named("name", Entity::string("abcd").expect("string item"))
        .expect("string key");
    record
}

/// A chain of struct fields `depth` records deep, with the scenario record at
/// the bottom. Depth 0 is the scenario record itself.
pub fn nested_record(depth: usize) -> Record {
    let mut record = scenario_record();
    for level in 0..depth {
        let mut outer = Record::new();
        outer
            .put_named("level", Entity::item(level as u32).expect("uint32 item"))
            .expect("string key");
        outer
            .put_named("child", Entity::record(record))
            .expect("string key");
        record = outer;
    }
    record
}

/// A record exercising every kind of value: scalars, arrays, blobs, a struct
/// field, a record array and a mixed entity array.
pub fn mixed_record() -> Record {
    let mut record = scenario_record();
    record
        .put_named("samples", Entity::array(&[1.5f64, -2.0, 3.25]).expect("array"))
        .expect("string key");
    record
        .put_named("flags", Entity::array(&[true, false, true]).expect("array"))
        .expect("string key");
    record
        .put_named("blob", Entity::bytes(&[0xde, 0xad, 0xbe, 0xef]).expect("blob"))
        .expect("string key");
    record
        .put(
            Entity::item(42u16).expect("uint16 item"),
            Entity::string("numeric key").expect("string item"),
        )
        .expect("primitive key");
    record
        .put_named("origin", Entity::record(scenario_record()))
        .expect("string key");
    record
        .put_named(
            "history",
            Entity::records(vec![scenario_record(), nested_record(1)]).expect("records"),
        )
        .expect("string key");
    record
        .put_named(
            "attributes",
            Entity::entities(vec![
                Entity::string("unit").expect("string item"),
                Entity::item(-7i64).expect("int64 item"),
                Entity::record(scenario_record()),
                Entity::nested(Entity::item(0.5f32).expect("float item")),
            ])
            .expect("entities"),
        )
        .expect("string key");
    record
}

/// A serialized record on disk, removed when dropped.
pub struct TempRecordFile {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TempRecordFile {
    /// Serializes `record` into a fresh temporary directory.
    pub fn new(record: &Record) -> Self {
        let bytes = to_wire(record).expect("Failed to encode record");
        Self::from_bytes(&bytes)
    }

    /// Writes raw bytes, valid or not, into a fresh temporary directory.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("record.tags");
        fs::write(&path, bytes).expect("Failed to write record file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Runs a test against a temporary file holding `record`.
///
/// # Example
///
/// ```rust,ignore
/// use tagset_testkit::{scenario_record, with_record_file};
///
/// with_record_file(&scenario_record(), |path| {
///     let bytes = std::fs::read(path).unwrap();
///     assert_eq!(bytes.len(), 109);
/// });
/// ```
pub fn with_record_file<F, R>(record: &Record, f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let file = TempRecordFile::new(record);
    f(file.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagset_codec::from_wire;

    #[test]
    fn scenario_sizes() {
        let record = scenario_record();
        assert_eq!(record.header_bytes(), 29);
        assert_eq!(record.data_bytes(), 40);
        assert_eq!(record.total_bytes(), 109);
    }

    #[test]
    fn nested_record_depth() {
        let mut record = nested_record(3);
        for _ in 0..3 {
            record = record
                .get_named("child")
                .and_then(Entity::as_record)
                .cloned()
                .unwrap();
        }
        assert_eq!(record, scenario_record());
    }

    #[test]
    fn record_file_roundtrip() {
        let record = mixed_record();
        with_record_file(&record, |path| {
            let bytes = fs::read(path).unwrap();
            assert_eq!(bytes.len() as u64, record.total_bytes());
            assert_eq!(from_wire(&bytes).unwrap(), record);
        });
    }
}
