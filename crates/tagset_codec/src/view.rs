//! Borrowed, zero-copy view over a serialized record.
//!
//! A [`RecordView`] checks the framing of a buffer and then hands out
//! slices into it. Nothing is copied, so a view cannot outlive the buffer;
//! use [`RecordView::to_record`] or [`ValueView::to_entity`] for anything
//! that must persist.
//!
//! Parsing validates the envelope and every key/value frame but does not
//! descend into struct fields; payload contents are checked when they are
//! materialized.

use crate::config::CodecConfig;
use crate::decoder::{Envelope, RecordDecoder, Reader};
use crate::entity::Entity;
use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::types::{EntityClass, EntityType};

/// A key in the header region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyView<'a> {
    entity_type: EntityType,
    bytes: &'a [u8],
}

impl<'a> KeyView<'a> {
    /// Type of the key.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Raw key bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The key as text, if it is a UTF-8 string key.
    pub fn as_str(&self) -> Option<&'a str> {
        if self.entity_type != EntityType::String {
            return None;
        }
        std::str::from_utf8(self.bytes).ok()
    }

    /// Copies the key into an owned entity.
    pub fn to_entity(&self) -> CodecResult<Entity> {
        RecordDecoder::decode_payload(
            self.bytes,
            EntityClass::Item,
            self.entity_type,
            CodecConfig::default(),
        )
    }
}

/// A value in the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueView<'a> {
    class: EntityClass,
    entity_type: EntityType,
    bytes: &'a [u8],
}

impl<'a> ValueView<'a> {
    /// Class of the value.
    pub fn class(&self) -> EntityClass {
        self.class
    }

    /// Type of the value.
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Raw payload bytes, exactly as serialized.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload length.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The value as text, if it is a UTF-8 string item.
    pub fn as_str(&self) -> Option<&'a str> {
        if self.entity_type != EntityType::String {
            return None;
        }
        std::str::from_utf8(self.bytes).ok()
    }

    /// A view over a struct-valued item.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless this is a record item; framing errors of the
    /// nested record otherwise.
    pub fn as_record_view(&self) -> CodecResult<RecordView<'a>> {
        if self.class != EntityClass::Item || self.entity_type != EntityType::Record {
            return Err(CodecError::invalid_argument(format!(
                "{} of {} is not a struct field",
                self.class, self.entity_type
            )));
        }
        RecordView::parse(self.bytes)
    }

    /// Decodes the value into an owned entity.
    pub fn to_entity(&self) -> CodecResult<Entity> {
        RecordDecoder::decode_payload(
            self.bytes,
            self.class,
            self.entity_type,
            CodecConfig::default(),
        )
    }
}

/// A validated serialized record borrowed from a buffer.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    bytes: &'a [u8],
    header: &'a [u8],
    data: &'a [u8],
    num_keys: u64,
}

impl<'a> RecordView<'a> {
    /// Validates the framing of a buffer holding exactly one record.
    ///
    /// # Errors
    ///
    /// The same framing errors as [`crate::from_wire`].
    pub fn parse(bytes: &'a [u8]) -> CodecResult<Self> {
        let view = Self::parse_prefix(bytes)?;
        if view.bytes.len() != bytes.len() {
            return Err(CodecError::corrupt(format!(
                "{} trailing bytes after record",
                bytes.len() - view.bytes.len()
            )));
        }
        Ok(view)
    }

    /// Validates the record at the start of `bytes`, ignoring what follows.
    pub fn parse_prefix(bytes: &'a [u8]) -> CodecResult<Self> {
        let config = CodecConfig::default();
        let mut reader = Reader::new(bytes);
        let envelope = Envelope::read(&mut reader, &config)?;

        let header_start = reader.position();
        for _ in 0..envelope.num_keys {
            let ty = reader.read_type()?;
            if ty.is_composite() {
                return Err(CodecError::corrupt(format!("{ty} key in header region")));
            }
            let size = reader.read_u64()?;
            reader.read_bytes(size)?;
        }
        let header_end = reader.position();
        envelope.check_data_region(&mut reader, header_end as u64)?;

        let data_start = reader.position();
        for _ in 0..envelope.num_keys {
            reader.read_class()?;
            reader.read_type()?;
            let size = reader.read_u64()?;
            reader.read_bytes(size)?;
        }
        let end = reader.position();
        envelope.check_consumed(end as u64)?;

        Ok(Self {
            bytes: &bytes[..end],
            header: &bytes[header_start..header_end],
            data: &bytes[data_start..end],
            num_keys: envelope.num_keys,
        })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.num_keys as usize
    }

    /// True if the record has no pairs.
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// The serialized bytes of this record.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the header region.
    pub fn header_bytes(&self) -> u64 {
        self.header.len() as u64
    }

    /// Length of the data region.
    pub fn data_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Pairs in serialized order.
    pub fn iter(&self) -> ViewPairs<'a> {
        ViewPairs {
            header: Reader::new(self.header),
            data: Reader::new(self.data),
            remaining: self.num_keys,
        }
    }

    /// The first value whose key has type `ty` and bytes `key`.
    pub fn get_raw(&self, ty: EntityType, key: &[u8]) -> Option<ValueView<'a>> {
        self.iter()
            .find(|(k, _)| k.entity_type == ty && k.bytes == key)
            .map(|(_, v)| v)
    }

    /// The first value under the string key `name`.
    pub fn get_named(&self, name: &str) -> Option<ValueView<'a>> {
        self.get_raw(EntityType::String, name.as_bytes())
    }

    /// Decodes the whole record into owned storage.
    pub fn to_record(&self) -> CodecResult<Record> {
        RecordDecoder::new(self.bytes).decode()
    }
}

impl<'a> IntoIterator for &RecordView<'a> {
    type Item = (KeyView<'a>, ValueView<'a>);
    type IntoIter = ViewPairs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the pairs of a [`RecordView`].
#[derive(Debug, Clone)]
pub struct ViewPairs<'a> {
    header: Reader<'a>,
    data: Reader<'a>,
    remaining: u64,
}

impl<'a> ViewPairs<'a> {
    fn next_pair(&mut self) -> CodecResult<(KeyView<'a>, ValueView<'a>)> {
        let entity_type = self.header.read_type()?;
        let size = self.header.read_u64()?;
        let key = KeyView {
            entity_type,
            bytes: self.header.read_bytes(size)?,
        };

        let class = self.data.read_class()?;
        let entity_type = self.data.read_type()?;
        let size = self.data.read_u64()?;
        let value = ValueView {
            class,
            entity_type,
            bytes: self.data.read_bytes(size)?,
        };
        Ok((key, value))
    }
}

impl<'a> Iterator for ViewPairs<'a> {
    type Item = (KeyView<'a>, ValueView<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // Framing was validated by `RecordView::parse_prefix`.
        self.next_pair().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_wire;

    fn scenario() -> Record {
        let mut record = Record::new();
        record.put_named("x", Entity::item(10i32).unwrap()).unwrap();
        record
            .put_named("name", Entity::string("abcd").unwrap())
            .unwrap();
        record
    }

    #[test]
    fn view_walks_pairs_without_copying() {
        let bytes = to_wire(&scenario()).unwrap();
        let view = RecordView::parse(&bytes).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.header_bytes(), 29);
        assert_eq!(view.data_bytes(), 40);

        let pairs: Vec<_> = view.iter().collect();
        assert_eq!(pairs[0].0.as_str(), Some("x"));
        assert_eq!(pairs[0].1.bytes(), &10i32.to_le_bytes());
        assert_eq!(pairs[1].0.as_str(), Some("name"));
        assert_eq!(pairs[1].1.as_str(), Some("abcd"));

        let payload = view.get_named("name").unwrap().bytes();
        let range = bytes.as_ptr_range();
        assert!(range.contains(&payload.as_ptr()));
    }

    #[test]
    fn view_materializes_owned_values() {
        let bytes = to_wire(&scenario()).unwrap();
        let view = RecordView::parse(&bytes).unwrap();

        let x = view.get_named("x").unwrap().to_entity().unwrap();
        assert_eq!(x, Entity::item(10i32).unwrap());
        let (key, _) = view.iter().next().unwrap();
        assert_eq!(key.to_entity().unwrap(), Entity::string("x").unwrap());
        assert_eq!(view.to_record().unwrap(), scenario());
        assert!(view.get_named("missing").is_none());
    }

    #[test]
    fn view_descends_into_struct_fields() {
        let mut outer = Record::new();
        outer.put_named("inner", Entity::record(scenario())).unwrap();
        outer.put_named("n", Entity::item(1u8).unwrap()).unwrap();
        let bytes = to_wire(&outer).unwrap();

        let view = RecordView::parse(&bytes).unwrap();
        let inner = view
            .get_named("inner")
            .unwrap()
            .as_record_view()
            .unwrap();
        assert_eq!(inner.get_named("name").unwrap().as_str(), Some("abcd"));
        assert!(view.get_named("n").unwrap().as_record_view().is_err());
    }

    #[test]
    fn view_rejects_what_decoder_rejects() {
        let bytes = to_wire(&scenario()).unwrap();
        assert!(matches!(
            RecordView::parse(&bytes[..bytes.len() - 1]),
            Err(CodecError::TruncatedBuffer { .. })
        ));

        let mut corrupt = bytes.to_vec();
        corrupt[24 + 29] = 0;
        assert!(matches!(
            RecordView::parse(&corrupt),
            Err(CodecError::CorruptEnvelope { .. })
        ));

        let mut shifted = bytes.to_vec();
        shifted[0..8].copy_from_slice(&30u64.to_le_bytes());
        shifted[8..16].copy_from_slice(&39u64.to_le_bytes());
        assert!(matches!(
            RecordView::parse(&shifted),
            Err(CodecError::CorruptEnvelope { .. })
        ));

        let mut longer = bytes.to_vec();
        longer.extend_from_slice(&[1, 2, 3]);
        assert!(RecordView::parse(&longer).is_err());
        assert_eq!(RecordView::parse_prefix(&longer).unwrap().len(), 2);
    }
}
