//! Demo command implementation.

use std::fs;
use std::path::Path;

use tagset_codec::{to_wire, CodecResult, Entity, EntityType, Record};
use tracing::info;

use crate::error::CliError;

/// Runs the demo command, writing [`sample_record`] to `path`.
pub fn run(path: &Path) -> Result<(), CliError> {
    let record = sample_record()?;
    let bytes = to_wire(&record)?;
    fs::write(path, &bytes).map_err(CliError::io(path))?;

    info!(path = %path.display(), bytes = bytes.len(), "wrote sample record");
    println!("Wrote {} bytes to {:?}", bytes.len(), path);
    print!("{}", record.dump(0));
    Ok(())
}

/// A record describing an image, with a nested struct, a record array and
/// an entity array.
pub fn sample_record() -> CodecResult<Record> {
    let mut record = Record::new();
    record.put_named("x", Entity::item(10i32)?)?;
    record.put_named("name", Entity::string("abcd")?)?;

    let mut size = Record::new();
    size.put_named("width", Entity::item(640u32)?)?;
    size.put_named("height", Entity::item(480u32)?)?;
    record.put_named("size", Entity::record(size))?;

    record.put_named("histogram", Entity::array(&[3u16, 1, 4, 1, 5, 9, 2, 6])?)?;
    record.put_named("thumbnail", Entity::bytes(&[0x89, 0x50, 0x4e, 0x47])?)?;

    let mut regions = Entity::array_builder(EntityType::Record)?;
    for (label, score) in [("face", 0.93f32), ("tree", 0.41)] {
        let mut region = Record::new();
        region.put_named("label", Entity::string(label)?)?;
        region.put_named("score", Entity::item(score)?)?;
        regions.append(region)?;
    }
    record.put_named("regions", regions)?;

    record.put_named(
        "tags",
        Entity::entities(vec![
            Entity::string("outdoor")?,
            Entity::item(2024u16)?,
            Entity::item(true)?,
        ])?,
    )?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagset_codec::from_wire;
    use tempfile::TempDir;

    #[test]
    fn sample_record_roundtrips() {
        let record = sample_record().unwrap();
        assert_eq!(record.len(), 7);
        let bytes = to_wire(&record).unwrap();
        assert_eq!(bytes.len() as u64, record.total_bytes());
        assert_eq!(from_wire(&bytes).unwrap(), record);
    }

    #[test]
    fn demo_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.tags");
        run(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        let record = from_wire(&bytes).unwrap();
        assert_eq!(record.get_named("x").unwrap().as_scalar::<i32>(), Some(10));
        assert_eq!(
            record.get_named("regions").unwrap().as_records().map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn demo_reports_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("demo.tags");
        assert!(matches!(run(&path), Err(CliError::Io { .. })));
    }
}
