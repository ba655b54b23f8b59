//! # Tagset Codec
//!
//! Self-describing key/value records with a compact binary wire format.
//!
//! A [`Record`] is an unordered collection of `(key, value)` pairs. Keys are
//! primitive [`Entity`] items (usually strings); values are any entity,
//! including nested records ("struct fields") and arrays of records or
//! entities. A record keeps running totals of its serialized size, so
//! [`Record::total_bytes`] is always the exact length [`to_wire`] produces.
//!
//! ## Wire format
//!
//! - Three little-endian `u64` words: header bytes, data bytes, key count
//! - Header region: one `{type, size, bytes}` frame per key
//! - Two `u64` self-check words: data region offset, value count
//! - Data region: one `{class, type, size, payload}` frame per value
//!
//! Decoding validates every length against the buffer and the envelope, so
//! a truncated or corrupted input is reported as an error, never read past.
//!
//! ## Usage
//!
//! ```
//! use tagset_codec::{from_wire, to_wire, Entity, Record};
//!
//! let mut record = Record::new();
//! record.put_named("x", Entity::item(10i32).unwrap()).unwrap();
//! record.put_named("name", Entity::string("abcd").unwrap()).unwrap();
//! assert_eq!(record.total_bytes(), 109);
//!
//! let bytes = to_wire(&record).unwrap();
//! let decoded = from_wire(&bytes).unwrap();
//! assert_eq!(decoded, record);
//! assert_eq!(decoded.get_named("x").unwrap().as_scalar::<i32>(), Some(10));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod decoder;
mod encoder;
mod entity;
mod error;
mod iter;
mod print;
mod record;
mod types;
mod view;

pub use bytes::Bytes;
pub use config::CodecConfig;
pub use decoder::{from_wire, RecordDecoder};
pub use encoder::{to_wire, RecordEncoder};
pub use entity::{Element, Entity, Payload, ENTITY_FRAME_SIZE};
pub use error::{CodecError, CodecResult};
pub use iter::{ElementFilter, ElementRef, Elements, Pairs};
pub use record::{Record, SizeSummary, ENVELOPE_FIXED_SIZE, KEY_OVERHEAD, VALUE_OVERHEAD};
pub use types::{EntityClass, EntityType, Scalar, StandardTypes, TypeMetadata};
pub use view::{KeyView, RecordView, ValueView, ViewPairs};

/// Types that serialize to the record wire format.
pub trait Encode {
    /// Serialize `self`.
    fn encode(&self) -> CodecResult<Bytes>;
}

/// Types that deserialize from the record wire format.
pub trait Decode: Sized {
    /// Deserialize a value occupying all of `bytes`.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for Record {
    fn encode(&self) -> CodecResult<Bytes> {
        to_wire(self)
    }
}

impl Decode for Record {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_wire(bytes)
    }
}
