//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use tagset_codec::{EntityType, KeyView, RecordView, ValueView};

use super::{read_file, split_records};
use crate::error::CliError;
use crate::Format;

/// File inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Records found in the file, in order.
    pub records: Vec<RecordSummary>,
}

/// Envelope and pairs of one record.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    /// Byte offset of the record in the file.
    pub offset: usize,
    /// Header region length.
    pub header_bytes: u64,
    /// Data region length.
    pub data_bytes: u64,
    /// Serialized length including the envelope.
    pub total_bytes: u64,
    /// Pairs in serialized order.
    pub pairs: Vec<PairSummary>,
}

/// One key/value pair.
#[derive(Debug, Serialize)]
pub struct PairSummary {
    /// Key rendered as text.
    pub key: String,
    /// Key type name.
    pub key_type: String,
    /// Value class name.
    pub class: String,
    /// Value type name.
    pub value_type: String,
    /// Value payload size in bytes.
    pub size: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: Format) -> Result<(), CliError> {
    let bytes = read_file(path)?;
    let result = inspect(path, &bytes)?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Format::Text => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Summarizes every record in `bytes` without decoding payloads.
pub fn inspect(path: &Path, bytes: &[u8]) -> Result<InspectResult, CliError> {
    let records = split_records(bytes)?
        .into_iter()
        .map(|(offset, view)| summarize(offset, &view))
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: bytes.len() as u64,
        records,
    })
}

fn summarize(offset: usize, view: &RecordView<'_>) -> RecordSummary {
    RecordSummary {
        offset,
        header_bytes: view.header_bytes(),
        data_bytes: view.data_bytes(),
        total_bytes: view.as_bytes().len() as u64,
        pairs: view.iter().map(|(k, v)| pair_summary(k, v)).collect(),
    }
}

fn pair_summary(key: KeyView<'_>, value: ValueView<'_>) -> PairSummary {
    PairSummary {
        key: render_key(&key),
        key_type: key.entity_type().to_string(),
        class: value.class().to_string(),
        value_type: value.entity_type().to_string(),
        size: value.size(),
    }
}

fn render_key(key: &KeyView<'_>) -> String {
    if let Some(name) = key.as_str() {
        return name.to_string();
    }
    match key.to_entity() {
        Ok(entity) if key.entity_type() != EntityType::Bytes => {
            entity.to_string().trim_end().to_string()
        }
        _ => key.bytes().iter().map(|b| format!("{:02x}", b)).collect(),
    }
}

fn print_text_output(result: &InspectResult) {
    println!("Tagset Record Inspection");
    println!("========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {} bytes", result.file_size);
    println!("Records: {}", result.records.len());

    for record in &result.records {
        println!();
        println!("Record at offset {}:", record.offset);
        println!("  Header region: {} bytes", record.header_bytes);
        println!("  Data region:   {} bytes", record.data_bytes);
        println!("  Total:         {} bytes", record.total_bytes);
        println!("  Pairs:         {}", record.pairs.len());
        for pair in &record.pairs {
            println!(
                "    {} ({}) => {} {}, {} bytes",
                pair.key, pair.key_type, pair.value_type, pair.class, pair.size
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagset_codec::{to_wire, Entity, Record};
    use tagset_testkit::{mixed_record, scenario_record};

    #[test]
    fn inspect_scenario() {
        let bytes = to_wire(&scenario_record()).unwrap();
        let result = inspect(Path::new("scenario.tags"), &bytes).unwrap();

        assert_eq!(result.file_size, 109);
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.header_bytes, 29);
        assert_eq!(record.data_bytes, 40);
        assert_eq!(record.total_bytes, 109);
        assert_eq!(record.pairs[0].key, "x");
        assert_eq!(record.pairs[0].value_type, "int32");
        assert_eq!(record.pairs[1].key, "name");
        assert_eq!(record.pairs[1].size, 4);
    }

    #[test]
    fn inspect_renders_non_string_keys() {
        let mut record = Record::new();
        record
            .put(Entity::item(42u16).unwrap(), Entity::item(true).unwrap())
            .unwrap();
        let bytes = to_wire(&record).unwrap();
        let result = inspect(Path::new("k.tags"), &bytes).unwrap();
        let pair = &result.records[0].pairs[0];
        assert_eq!(pair.key, "uint16 item = 42");
        assert_eq!(pair.key_type, "uint16");
    }

    #[test]
    fn inspect_serializes_to_json() {
        let bytes = to_wire(&mixed_record()).unwrap();
        let result = inspect(Path::new("mixed.tags"), &bytes).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["records"][0]["total_bytes"], bytes.len() as u64);
        assert!(json["records"][0]["pairs"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["key"] == "history" && p["class"] == "array"));
    }
}
