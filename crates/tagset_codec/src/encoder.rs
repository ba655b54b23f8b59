//! Record encoder.
//!
//! Layout of one serialized record (all words little-endian):
//!
//! ```text
//! u64 header_bytes | u64 data_bytes | u64 num_keys
//! header region: { u32 key_type, u64 key_size, key bytes } * num_keys
//! u64 data_region_offset | u64 num_values
//! data region:   { u32 class, u32 type, u64 size, payload } * num_values
//! ```
//!
//! Struct-valued payloads are complete serialized records; entity-valued
//! payloads are `{ u32 class, u32 type, u64 size, payload }` frames.

use bytes::{BufMut, Bytes};
use tracing::debug;

use crate::config::CodecConfig;
use crate::entity::{Entity, Payload};
use crate::error::{CodecError, CodecResult};
use crate::record::Record;

/// Serialize a record into a standalone buffer.
///
/// # Errors
///
/// Returns an error if the record nests deeper than the default limit or a
/// primitive payload exceeds the default size limit.
pub fn to_wire(record: &Record) -> CodecResult<Bytes> {
    RecordEncoder::new().encode(record)
}

/// Serializes records under a [`CodecConfig`].
#[derive(Debug, Clone, Default)]
pub struct RecordEncoder {
    config: CodecConfig,
}

impl RecordEncoder {
    /// Create an encoder with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with the given limits.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Serialize `record` into a new buffer of exactly
    /// [`Record::total_bytes`] bytes.
    pub fn encode(&self, record: &Record) -> CodecResult<Bytes> {
        let mut buffer = Vec::new();
        self.encode_into(record, &mut buffer)?;
        debug!(
            pairs = record.len(),
            bytes = buffer.len(),
            "encoded record"
        );
        Ok(Bytes::from(buffer))
    }

    /// Append the serialized form of `record` to `out`.
    ///
    /// On error `out` is truncated back to its original length.
    pub fn encode_into(&self, record: &Record, out: &mut Vec<u8>) -> CodecResult<()> {
        let total = record.total_bytes();
        let len = usize::try_from(total).map_err(|_| CodecError::SizeLimitExceeded {
            claimed: total,
            max_allowed: usize::MAX as u64,
        })?;
        out.try_reserve_exact(len).map_err(CodecError::alloc(len))?;

        let start = out.len();
        if let Err(e) = self.write_record(out, record, 0) {
            out.truncate(start);
            return Err(e);
        }
        debug_assert_eq!((out.len() - start) as u64, total);
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> CodecResult<()> {
        if depth >= self.config.max_nesting_depth {
            return Err(CodecError::NestingTooDeep {
                max_depth: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn check_primitive_size(&self, size: u64) -> CodecResult<()> {
        if size > self.config.max_payload_size {
            return Err(CodecError::SizeLimitExceeded {
                claimed: size,
                max_allowed: self.config.max_payload_size,
            });
        }
        Ok(())
    }

    fn write_record(&self, out: &mut Vec<u8>, record: &Record, depth: usize) -> CodecResult<()> {
        self.check_depth(depth)?;
        let pairs = record.len() as u64;
        if pairs > self.config.max_pairs {
            return Err(CodecError::SizeLimitExceeded {
                claimed: pairs,
                max_allowed: self.config.max_pairs,
            });
        }

        let start = out.len();
        out.put_u64_le(record.header_bytes());
        out.put_u64_le(record.data_bytes());
        out.put_u64_le(pairs);

        for key in record.keys() {
            let bytes = key.as_raw().ok_or_else(|| {
                CodecError::invalid_argument("record keys must be primitive items")
            })?;
            self.check_primitive_size(key.size())?;
            out.put_u32_le(key.entity_type().code());
            out.put_u64_le(key.size());
            out.put_slice(bytes);
        }

        let data_region_offset = (out.len() - start) as u64;
        out.put_u64_le(data_region_offset);
        out.put_u64_le(pairs);

        for value in record.values() {
            self.write_framed(out, value, depth)?;
        }
        Ok(())
    }

    fn write_framed(&self, out: &mut Vec<u8>, entity: &Entity, depth: usize) -> CodecResult<()> {
        out.put_u32_le(entity.class().code());
        out.put_u32_le(entity.entity_type().code());
        out.put_u64_le(entity.size());
        self.write_payload(out, entity, depth)
    }

    fn write_payload(&self, out: &mut Vec<u8>, entity: &Entity, depth: usize) -> CodecResult<()> {
        match entity.payload() {
            Payload::Raw(bytes) => {
                self.check_primitive_size(entity.size())?;
                out.put_slice(bytes);
            }
            Payload::Record(record) => self.write_record(out, record, depth + 1)?,
            Payload::Records(records) => {
                for record in records {
                    self.write_record(out, record, depth + 1)?;
                }
            }
            Payload::Entity(child) => {
                self.check_depth(depth + 1)?;
                self.write_framed(out, child, depth + 1)?;
            }
            Payload::Entities(children) => {
                self.check_depth(depth + 1)?;
                for child in children {
                    self.write_framed(out, child, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Entity {
        Entity::string(name).unwrap()
    }

    fn scenario() -> Record {
        let mut record = Record::new();
        record.put(key("x"), Entity::item(10i32).unwrap()).unwrap();
        record
            .put(key("name"), Entity::string("abcd").unwrap())
            .unwrap();
        record
    }

    #[test]
    fn encode_empty_record() {
        let bytes = to_wire(&Record::new()).unwrap();
        let mut expected = vec![0u8; 40];
        // data region offset
        expected[24] = 24;
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn encode_scenario_layout() {
        let bytes = to_wire(&scenario()).unwrap();
        assert_eq!(bytes.len(), 109);

        let mut expected = Vec::new();
        expected.extend_from_slice(&29u64.to_le_bytes());
        expected.extend_from_slice(&40u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        // header region
        expected.extend_from_slice(&13u32.to_le_bytes());
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.extend_from_slice(b"x");
        expected.extend_from_slice(&13u32.to_le_bytes());
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(b"name");
        // self-check
        expected.extend_from_slice(&53u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        // data region
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(&10i32.to_le_bytes());
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&13u32.to_le_bytes());
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(b"abcd");

        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn struct_field_embeds_serialized_record() {
        let inner = scenario();
        let inner_bytes = to_wire(&inner).unwrap();

        let mut outer = Record::new();
        outer.put(key("s"), Entity::record(inner)).unwrap();
        let bytes = to_wire(&outer).unwrap();

        assert_eq!(bytes.len() as u64, outer.total_bytes());
        assert!(bytes.ends_with(&inner_bytes));
    }

    #[test]
    fn encode_into_appends() {
        let mut out = vec![0xaa, 0xbb];
        RecordEncoder::new()
            .encode_into(&scenario(), &mut out)
            .unwrap();
        assert_eq!(&out[..2], &[0xaa, 0xbb]);
        assert_eq!(out.len(), 2 + 109);
    }

    #[test]
    fn depth_limit_enforced() {
        let mut record = scenario();
        for _ in 0..3 {
            let mut outer = Record::new();
            outer.put(key("child"), Entity::record(record)).unwrap();
            record = outer;
        }

        let shallow = RecordEncoder::with_config(CodecConfig::new().max_nesting_depth(3));
        let mut out = vec![1, 2, 3];
        assert_eq!(
            shallow.encode_into(&record, &mut out),
            Err(CodecError::NestingTooDeep { max_depth: 3 })
        );
        assert_eq!(out, vec![1, 2, 3]);

        let enough = RecordEncoder::with_config(CodecConfig::new().max_nesting_depth(4));
        assert!(enough.encode(&record).is_ok());
    }

    #[test]
    fn payload_limit_enforced() {
        let mut record = Record::new();
        record
            .put(key("blob"), Entity::bytes(&[0u8; 64]).unwrap())
            .unwrap();
        let encoder = RecordEncoder::with_config(CodecConfig::new().max_payload_size(32));
        assert!(matches!(
            encoder.encode(&record),
            Err(CodecError::SizeLimitExceeded { claimed: 64, .. })
        ));
    }
}
