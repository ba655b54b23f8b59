//! The tagged value unit.
//!
//! An [`Entity`] owns its payload. Primitive payloads are copied from the
//! caller at construction; composite payloads own the records or entities
//! they were built from. Equality is structural: two entities built from
//! different buffers with the same contents compare equal.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::types::{EntityClass, EntityType, Scalar, StandardTypes, TypeMetadata};

/// Framing overhead of an entity nested inside an `Entity`-typed payload:
/// class (4) + type (4) + size (8).
pub const ENTITY_FRAME_SIZE: u64 = 16;

/// Owned payload of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes of a primitive value or array.
    Raw(Vec<u8>),
    /// A single nested record (struct field).
    Record(Box<Record>),
    /// An array of records.
    Records(Vec<Record>),
    /// A single nested entity.
    Entity(Box<Entity>),
    /// An array of entities, possibly of mixed types.
    Entities(Vec<Entity>),
}

impl Payload {
    /// Encoded length of this payload in bytes.
    fn encoded_len(&self) -> u64 {
        match self {
            Self::Raw(bytes) => bytes.len() as u64,
            Self::Record(record) => record.total_bytes(),
            Self::Records(records) => records.iter().map(Record::total_bytes).sum(),
            Self::Entity(entity) => ENTITY_FRAME_SIZE + entity.size(),
            Self::Entities(entities) => entities
                .iter()
                .map(|e| ENTITY_FRAME_SIZE + e.size())
                .sum(),
        }
    }
}

/// A child accepted by [`Entity::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A record, for `Record`-typed arrays.
    Record(Record),
    /// An entity, for `Entity`-typed arrays.
    Entity(Entity),
}

impl From<Record> for Element {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Entity> for Element {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

/// A self-describing serializable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    class: EntityClass,
    ty: EntityType,
    count: u64,
    size: u64,
    payload: Payload,
}

/// Copies `src` into freshly reserved storage.
pub(crate) fn copy_bytes(src: &[u8]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(CodecError::alloc(src.len()))?;
    out.extend_from_slice(src);
    Ok(out)
}

impl Entity {
    /// Builds a primitive entity by copying `count` elements of `ty` from
    /// `payload`, sized by the built-in type table.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `count` is zero, an item has `count != 1`, or
    ///   `payload` is shorter than the required size.
    /// - `UnsupportedType` for composite types and for arrays of
    ///   variable-length types.
    pub fn new(
        payload: &[u8],
        count: u64,
        ty: EntityType,
        class: EntityClass,
    ) -> CodecResult<Self> {
        Self::with_metadata(&StandardTypes, payload, count, ty, class)
    }

    /// Like [`Entity::new`], sizing fixed-width types through `metadata`.
    pub fn with_metadata<M: TypeMetadata + ?Sized>(
        metadata: &M,
        payload: &[u8],
        count: u64,
        ty: EntityType,
        class: EntityClass,
    ) -> CodecResult<Self> {
        if count == 0 {
            return Err(CodecError::invalid_argument("entity count must be non-zero"));
        }
        if class == EntityClass::Item && count != 1 {
            return Err(CodecError::invalid_argument(format!(
                "item entity must have count 1, got {count}"
            )));
        }
        if ty.is_composite() {
            return Err(CodecError::unsupported_type(format!(
                "{ty} entities are built from records or entities, not raw bytes"
            )));
        }

        let size = if ty.is_variable() {
            if class == EntityClass::Array {
                return Err(CodecError::unsupported_type(format!("{class} of {ty}")));
            }
            payload.len() as u64
        } else {
            metadata
                .size_of(class, ty, count)
                .ok_or_else(|| CodecError::unsupported_type(format!("{class} of {ty}")))?
        };

        let len = usize::try_from(size).map_err(|_| CodecError::SizeLimitExceeded {
            claimed: size,
            max_allowed: usize::MAX as u64,
        })?;
        if payload.len() < len {
            return Err(CodecError::invalid_argument(format!(
                "payload holds {} bytes, {count} x {ty} needs {len}",
                payload.len()
            )));
        }

        Ok(Self {
            class,
            ty,
            count,
            size,
            payload: Payload::Raw(copy_bytes(&payload[..len])?),
        })
    }

    /// A single scalar value.
    pub fn item<T: Scalar>(value: T) -> CodecResult<Self> {
        Self::from_scalars(&[value], EntityClass::Item)
    }

    /// An array of scalar values.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `values` is empty.
    pub fn array<T: Scalar>(values: &[T]) -> CodecResult<Self> {
        if values.is_empty() {
            return Err(CodecError::invalid_argument("entity count must be non-zero"));
        }
        Self::from_scalars(values, EntityClass::Array)
    }

    fn from_scalars<T: Scalar>(values: &[T], class: EntityClass) -> CodecResult<Self> {
        let len = values
            .len()
            .checked_mul(T::WIDTH)
            .ok_or(CodecError::AllocationFailure {
                requested: usize::MAX,
            })?;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(CodecError::alloc(len))?;
        for value in values {
            value.write_le(&mut bytes);
        }
        Ok(Self {
            class,
            ty: T::TYPE,
            count: values.len() as u64,
            size: len as u64,
            payload: Payload::Raw(bytes),
        })
    }

    /// A UTF-8 string item.
    pub fn string(value: &str) -> CodecResult<Self> {
        Self::new(value.as_bytes(), 1, EntityType::String, EntityClass::Item)
    }

    /// An opaque byte blob item.
    pub fn bytes(value: &[u8]) -> CodecResult<Self> {
        Self::new(value, 1, EntityType::Bytes, EntityClass::Item)
    }

    /// Wraps a record as a struct-valued item.
    pub fn record(record: Record) -> Self {
        Self::from_parts(
            EntityClass::Item,
            EntityType::Record,
            1,
            Payload::Record(Box::new(record)),
        )
    }

    /// An array of records.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `records` is empty; use
    /// [`Entity::array_builder`] for an initially empty array.
    pub fn records(records: Vec<Record>) -> CodecResult<Self> {
        if records.is_empty() {
            return Err(CodecError::invalid_argument("entity count must be non-zero"));
        }
        let count = records.len() as u64;
        Ok(Self::from_parts(
            EntityClass::Array,
            EntityType::Record,
            count,
            Payload::Records(records),
        ))
    }

    /// Wraps another entity as an item.
    pub fn nested(entity: Entity) -> Self {
        Self::from_parts(
            EntityClass::Item,
            EntityType::Entity,
            1,
            Payload::Entity(Box::new(entity)),
        )
    }

    /// An array of entities, which may differ in type.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `entities` is empty.
    pub fn entities(entities: Vec<Entity>) -> CodecResult<Self> {
        if entities.is_empty() {
            return Err(CodecError::invalid_argument("entity count must be non-zero"));
        }
        let count = entities.len() as u64;
        Ok(Self::from_parts(
            EntityClass::Array,
            EntityType::Entity,
            count,
            Payload::Entities(entities),
        ))
    }

    /// An empty composite array to be filled with [`Entity::append`].
    ///
    /// # Errors
    ///
    /// `UnsupportedType` unless `ty` is `Record` or `Entity`.
    pub fn array_builder(ty: EntityType) -> CodecResult<Self> {
        let payload = match ty {
            EntityType::Record => Payload::Records(Vec::new()),
            EntityType::Entity => Payload::Entities(Vec::new()),
            other => {
                return Err(CodecError::unsupported_type(format!(
                    "array builder of {other}"
                )))
            }
        };
        Ok(Self::from_parts(EntityClass::Array, ty, 0, payload))
    }

    /// Assembles an entity, deriving `size` from the payload.
    pub(crate) fn from_parts(
        class: EntityClass,
        ty: EntityType,
        count: u64,
        payload: Payload,
    ) -> Self {
        let size = payload.encoded_len();
        Self {
            class,
            ty,
            count,
            size,
            payload,
        }
    }

    /// Appends a child to a composite array.
    ///
    /// On error the entity is left unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if this is not a composite array or the child
    ///   kind does not match the element type.
    /// - `AllocationFailure` if the backing array cannot grow.
    pub fn append(&mut self, child: impl Into<Element>) -> CodecResult<()> {
        if self.class != EntityClass::Array {
            return Err(CodecError::invalid_argument(
                "append requires an array entity",
            ));
        }
        match (&mut self.payload, child.into()) {
            (Payload::Records(records), Element::Record(record)) => {
                records.try_reserve(1).map_err(CodecError::alloc(1))?;
                self.size += record.total_bytes();
                records.push(record);
            }
            (Payload::Entities(entities), Element::Entity(entity)) => {
                entities.try_reserve(1).map_err(CodecError::alloc(1))?;
                self.size += ENTITY_FRAME_SIZE + entity.size();
                entities.push(entity);
            }
            _ => {
                return Err(CodecError::invalid_argument(format!(
                    "cannot append to an array of {}",
                    self.ty
                )))
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Shape of this entity.
    #[must_use]
    pub fn class(&self) -> EntityClass {
        self.class
    }

    /// Kind of value carried.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.ty
    }

    /// Number of elements: 1 for items.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Encoded payload length in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The owned payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Recomputes the payload size by walking the whole tree, ignoring
    /// every cached size along the way.
    #[must_use]
    pub fn recompute_size(&self) -> u64 {
        match &self.payload {
            Payload::Raw(bytes) => bytes.len() as u64,
            Payload::Record(record) => record.recompute_sizes().total_bytes,
            Payload::Records(records) => records
                .iter()
                .map(|r| r.recompute_sizes().total_bytes)
                .sum(),
            Payload::Entity(entity) => ENTITY_FRAME_SIZE + entity.recompute_size(),
            Payload::Entities(entities) => entities
                .iter()
                .map(|e| ENTITY_FRAME_SIZE + e.recompute_size())
                .sum(),
        }
    }

    /// True if this entity can serve as a record key.
    ///
    /// Keys travel without a class word, so only primitive items qualify.
    #[must_use]
    pub fn is_key_compatible(&self) -> bool {
        self.class == EntityClass::Item && !self.ty.is_composite()
    }

    /// Raw payload bytes of a primitive entity.
    #[must_use]
    pub fn as_raw(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The value of a scalar item of type `T`.
    #[must_use]
    pub fn as_scalar<T: Scalar>(&self) -> Option<T> {
        if self.ty != T::TYPE || self.class != EntityClass::Item {
            return None;
        }
        self.as_raw()
            .filter(|bytes| bytes.len() == T::WIDTH)
            .map(T::read_le)
    }

    /// All elements of a scalar entity of type `T`.
    #[must_use]
    pub fn to_vec<T: Scalar>(&self) -> Option<Vec<T>> {
        if self.ty != T::TYPE {
            return None;
        }
        self.as_raw()
            .map(|bytes| bytes.chunks_exact(T::WIDTH).map(T::read_le).collect())
    }

    /// The text of a string item, if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if self.ty != EntityType::String {
            return None;
        }
        self.as_raw().and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// The contents of an opaque bytes item.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.ty != EntityType::Bytes {
            return None;
        }
        self.as_raw()
    }

    /// The nested record of a struct-valued item.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match &self.payload {
            Payload::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The elements of a record array.
    #[must_use]
    pub fn as_records(&self) -> Option<&[Record]> {
        match &self.payload {
            Payload::Records(records) => Some(records),
            _ => None,
        }
    }

    /// The wrapped entity of an entity item.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match &self.payload {
            Payload::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// The elements of an entity array.
    #[must_use]
    pub fn as_entities(&self) -> Option<&[Entity]> {
        match &self.payload {
            Payload::Entities(entities) => Some(entities),
            _ => None,
        }
    }
}
