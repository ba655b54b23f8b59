//! Record decoder.
//!
//! The input is untrusted. Every length is checked against the bytes that
//! remain before anything is allocated, nesting is bounded by
//! [`CodecConfig::max_nesting_depth`], and no partially built record is
//! returned on failure.

use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::entity::{copy_bytes, Entity, Payload};
use crate::error::{CodecError, CodecResult};
use crate::record::{Record, ENVELOPE_FIXED_SIZE, KEY_OVERHEAD, VALUE_OVERHEAD};
use crate::types::{EntityClass, EntityType};

/// Decode a record from a buffer holding exactly one serialized record.
///
/// # Errors
///
/// - `TruncatedBuffer` if the buffer ends early or the regions do not add
///   up to the envelope's totals.
/// - `CorruptEnvelope` if the header length or the self-check fields
///   disagree with the content, or bytes follow the record.
/// - `UnsupportedType` for unknown class or type codes.
pub fn from_wire(bytes: &[u8]) -> CodecResult<Record> {
    RecordDecoder::new(bytes).decode()
}

/// Bounds-checked little-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub(crate) fn read_bytes(&mut self, len: u64) -> CodecResult<&'a [u8]> {
        let available = self.remaining() as u64;
        if len > available {
            return Err(CodecError::truncated(len, available));
        }
        // len <= remaining, so it fits in usize
        let len = len as usize;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    pub(crate) fn read_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    #[inline]
    pub(crate) fn read_u64(&mut self) -> CodecResult<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    pub(crate) fn read_type(&mut self) -> CodecResult<EntityType> {
        let code = self.read_u32()?;
        EntityType::from_code(code)
            .ok_or_else(|| CodecError::unsupported_type(format!("type code {code}")))
    }

    pub(crate) fn read_class(&mut self) -> CodecResult<EntityClass> {
        let code = self.read_u32()?;
        EntityClass::from_code(code)
            .ok_or_else(|| CodecError::unsupported_type(format!("class code {code}")))
    }
}

/// Bytes taken by the three leading envelope words.
const ENVELOPE_WORDS: u64 = 24;

/// Envelope words read at the start of a record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Envelope {
    pub(crate) header_bytes: u64,
    pub(crate) data_bytes: u64,
    pub(crate) num_keys: u64,
}

impl Envelope {
    pub(crate) fn read(reader: &mut Reader<'_>, config: &CodecConfig) -> CodecResult<Self> {
        let header_bytes = reader.read_u64()?;
        let data_bytes = reader.read_u64()?;
        let num_keys = reader.read_u64()?;
        if num_keys > config.max_pairs {
            return Err(CodecError::SizeLimitExceeded {
                claimed: num_keys,
                max_allowed: config.max_pairs,
            });
        }
        Ok(Self {
            header_bytes,
            data_bytes,
            num_keys,
        })
    }

    /// Total serialized length the envelope claims.
    pub(crate) fn expected_total(&self) -> CodecResult<u64> {
        self.header_bytes
            .checked_add(self.data_bytes)
            .and_then(|n| n.checked_add(ENVELOPE_FIXED_SIZE))
            .ok_or_else(|| CodecError::corrupt("region sizes overflow"))
    }

    /// Reads the self-check words that follow the header region.
    ///
    /// `reached` is the offset, relative to the record start, at which the
    /// header region ended. It must agree with the envelope's header length
    /// as well as with the embedded offset.
    pub(crate) fn check_data_region(
        &self,
        reader: &mut Reader<'_>,
        reached: u64,
    ) -> CodecResult<()> {
        let header_len = reached.saturating_sub(ENVELOPE_WORDS);
        if header_len != self.header_bytes {
            return Err(CodecError::corrupt(format!(
                "header region is {header_len} bytes, envelope claims {}",
                self.header_bytes
            )));
        }
        let offset = reader.read_u64()?;
        if offset != reached {
            return Err(CodecError::corrupt(format!(
                "data region offset {offset} does not match header end {reached}"
            )));
        }
        let num_values = reader.read_u64()?;
        if num_values != self.num_keys {
            return Err(CodecError::corrupt(format!(
                "{num_values} values for {} keys",
                self.num_keys
            )));
        }
        Ok(())
    }

    /// Verifies that the record consumed exactly what the envelope claims.
    ///
    /// Run after `check_data_region`, so a match also pins the data region
    /// to `data_bytes`.
    pub(crate) fn check_consumed(&self, consumed: u64) -> CodecResult<()> {
        let expected = self.expected_total()?;
        if consumed != expected {
            return Err(CodecError::truncated(expected, consumed));
        }
        Ok(())
    }
}

/// Decodes serialized records.
#[derive(Debug, Clone)]
pub struct RecordDecoder<'a> {
    reader: Reader<'a>,
    config: CodecConfig,
}

impl<'a> RecordDecoder<'a> {
    /// Create a decoder with default limits.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, CodecConfig::default())
    }

    /// Create a decoder with the given limits.
    pub fn with_config(data: &'a [u8], config: CodecConfig) -> Self {
        Self {
            reader: Reader::new(data),
            config,
        }
    }

    /// Decode one record that must span the rest of the input.
    pub fn decode(&mut self) -> CodecResult<Record> {
        let record = self.decode_next()?;
        if !self.reader.is_empty() {
            let err = CodecError::corrupt(format!(
                "{} trailing bytes after record",
                self.reader.remaining()
            ));
            warn!(error = %err, "rejected serialized record");
            return Err(err);
        }
        Ok(record)
    }

    /// Decode the next record, leaving any following bytes unread.
    ///
    /// Useful for buffers holding several concatenated records.
    pub fn decode_next(&mut self) -> CodecResult<Record> {
        let start = self.reader.position();
        match self.decode_record(0) {
            Ok(record) => {
                debug!(
                    pairs = record.len(),
                    bytes = self.reader.position() - start,
                    "decoded record"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, offset = start, "rejected serialized record");
                Err(err)
            }
        }
    }

    /// True if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Decodes `data` as the complete payload of one value.
    pub(crate) fn decode_payload(
        data: &'a [u8],
        class: EntityClass,
        ty: EntityType,
        config: CodecConfig,
    ) -> CodecResult<Entity> {
        let mut decoder = Self::with_config(data, config);
        decoder.decode_value(class, ty, data.len() as u64, 0)
    }

    fn nested(&self, data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
            config: self.config.clone(),
        }
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

    fn decode_record(&mut self, depth: usize) -> CodecResult<Record> {
        self.check_depth(depth)?;
        let start = self.reader.position();
        let envelope = Envelope::read(&mut self.reader, &self.config)?;

        // Never reserve more slots than the remaining input could describe.
        let plausible = self.reader.remaining() as u64 / (KEY_OVERHEAD + VALUE_OVERHEAD);
        let floor = envelope.num_keys.min(self.config.initial_capacity as u64);
        let capacity = envelope.num_keys.min(plausible).max(floor) as usize;

        let mut keys: Vec<Entity> = Vec::new();
        keys.try_reserve_exact(capacity)
            .map_err(CodecError::alloc(capacity))?;
        for _ in 0..envelope.num_keys {
            let key = self.decode_key()?;
            keys.try_reserve(1).map_err(CodecError::alloc(1))?;
            keys.push(key);
        }

        let reached = (self.reader.position() - start) as u64;
        envelope.check_data_region(&mut self.reader, reached)?;

        let mut record = Record::with_capacity(capacity)?;
        for key in keys {
            let class = self.reader.read_class()?;
            let ty = self.reader.read_type()?;
            let size = self.reader.read_u64()?;
            let value = self.decode_value(class, ty, size, depth)?;
            record.append(key, value)?;
        }

        envelope.check_consumed((self.reader.position() - start) as u64)?;
        Ok(record)
    }

    fn decode_key(&mut self) -> CodecResult<Entity> {
        let ty = self.reader.read_type()?;
        if ty.is_composite() {
            return Err(CodecError::corrupt(format!("{ty} key in header region")));
        }
        let size = self.reader.read_u64()?;
        self.check_primitive_size(size)?;
        let bytes = self.reader.read_bytes(size)?;
        primitive(EntityClass::Item, ty, bytes)
    }

    fn decode_frame(&mut self, depth: usize) -> CodecResult<Entity> {
        self.check_depth(depth)?;
        let class = self.reader.read_class()?;
        let ty = self.reader.read_type()?;
        let size = self.reader.read_u64()?;
        self.decode_value(class, ty, size, depth)
    }

    /// Decodes a payload of `size` bytes for a value at `depth`.
    fn decode_value(
        &mut self,
        class: EntityClass,
        ty: EntityType,
        size: u64,
        depth: usize,
    ) -> CodecResult<Entity> {
        if !ty.is_composite() {
            self.check_primitive_size(size)?;
        }
        let bytes = self.reader.read_bytes(size)?;
        if !ty.is_composite() {
            return primitive(class, ty, bytes);
        }

        let mut inner = self.nested(bytes);
        let payload = match (class, ty) {
            (EntityClass::Item, EntityType::Record) => {
                Payload::Record(Box::new(inner.decode_record(depth + 1)?))
            }
            (EntityClass::Array, EntityType::Record) => {
                let mut records = Vec::new();
                while !inner.reader.is_empty() {
                    let record = inner.decode_record(depth + 1)?;
                    records.try_reserve(1).map_err(CodecError::alloc(1))?;
                    records.push(record);
                }
                Payload::Records(records)
            }
            (EntityClass::Item, _) => Payload::Entity(Box::new(inner.decode_frame(depth + 1)?)),
            (EntityClass::Array, _) => {
                let mut entities = Vec::new();
                while !inner.reader.is_empty() {
                    let entity = inner.decode_frame(depth + 1)?;
                    entities.try_reserve(1).map_err(CodecError::alloc(1))?;
                    entities.push(entity);
                }
                Payload::Entities(entities)
            }
        };
        if !inner.reader.is_empty() {
            return Err(CodecError::corrupt(format!(
                "{} unused bytes in {class} of {ty}",
                inner.reader.remaining()
            )));
        }

        let count = match &payload {
            Payload::Records(records) => records.len() as u64,
            Payload::Entities(entities) => entities.len() as u64,
            _ => 1,
        };
        Ok(Entity::from_parts(class, ty, count, payload))
    }
}

/// Builds a primitive entity from wire bytes, deriving its count.
fn primitive(class: EntityClass, ty: EntityType, bytes: &[u8]) -> CodecResult<Entity> {
    let size = bytes.len() as u64;
    let count = match (ty.fixed_width(), class) {
        (Some(width), _) if size % width != 0 => {
            return Err(CodecError::corrupt(format!(
                "{size} bytes is not a whole number of {ty} values"
            )))
        }
        (Some(width), EntityClass::Item) if size != width => {
            return Err(CodecError::corrupt(format!(
                "{ty} item carries {size} bytes"
            )))
        }
        (Some(_), EntityClass::Array) if size == 0 => {
            return Err(CodecError::corrupt(format!("empty array of {ty}")))
        }
        (Some(width), _) => size / width,
        (None, EntityClass::Item) => 1,
        (None, EntityClass::Array) => {
            return Err(CodecError::unsupported_type(format!("{class} of {ty}")))
        }
    };
    Ok(Entity::from_parts(
        class,
        ty,
        count,
        Payload::Raw(copy_bytes(bytes)?),
    ))
}
