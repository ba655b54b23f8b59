//! Ordered key/value container of entities.
//!
//! Keys and values live in two index-aligned vectors. The record keeps
//! running totals of the bytes its header and data regions will occupy on
//! the wire, so `total_bytes` is known without encoding.
//!
//! Deleting swaps the last pair into the vacated slot: storage order is not
//! preserved across [`Record::delete`].

use tracing::trace;

use crate::entity::Entity;
use crate::error::{CodecError, CodecResult};
use crate::types::EntityType;

/// Fixed envelope words: header bytes, data bytes, key count,
/// data-region offset and value count.
pub const ENVELOPE_FIXED_SIZE: u64 = 40;

/// Per-key framing in the header region: type (4) + size (8).
pub const KEY_OVERHEAD: u64 = 12;

/// Per-value framing in the data region: class (4) + type (4) + size (8).
pub const VALUE_OVERHEAD: u64 = 16;

/// Smallest capacity a record grows to from empty.
const MIN_CAPACITY: usize = 4;

/// Byte accounting of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSummary {
    /// Bytes of the header region.
    pub header_bytes: u64,
    /// Bytes of the data region.
    pub data_bytes: u64,
    /// Bytes of the whole serialized record.
    pub total_bytes: u64,
}

/// A collection of `(key, value)` entity pairs.
#[derive(Debug)]
pub struct Record {
    keys: Vec<Entity>,
    values: Vec<Entity>,
    capacity: usize,
    header_bytes: u64,
    data_bytes: u64,
}

impl Record {
    /// Creates an empty record without allocating.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            capacity: 0,
            header_bytes: 0,
            data_bytes: 0,
        }
    }

    /// Creates an empty record with room for `capacity` pairs.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if the slots cannot be reserved.
    pub fn with_capacity(capacity: usize) -> CodecResult<Self> {
        let mut record = Self::new();
        record.reserve_slots(capacity)?;
        Ok(record)
    }

    fn reserve_slots(&mut self, capacity: usize) -> CodecResult<()> {
        let additional = capacity - self.keys.len();
        self.keys
            .try_reserve_exact(additional)
            .map_err(CodecError::alloc(capacity))?;
        self.values
            .try_reserve_exact(additional)
            .map_err(CodecError::alloc(capacity))?;
        self.capacity = capacity;
        Ok(())
    }

    fn grow(&mut self) -> CodecResult<()> {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(CodecError::AllocationFailure {
                requested: usize::MAX,
            })?
            .max(MIN_CAPACITY);
        trace!(from = self.capacity, to = new_capacity, "growing record");
        self.reserve_slots(new_capacity)
    }

    fn check_key(key: &Entity) -> CodecResult<()> {
        if key.is_key_compatible() {
            Ok(())
        } else {
            Err(CodecError::invalid_argument(format!(
                "record keys must be primitive items, got {} of {}",
                key.class(),
                key.entity_type()
            )))
        }
    }

    fn position(&self, key: &Entity) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn push_pair(&mut self, key: Entity, value: Entity) -> CodecResult<()> {
        if self.keys.len() == self.capacity {
            self.grow()?;
        }
        self.header_bytes += KEY_OVERHEAD + key.size();
        self.data_bytes += VALUE_OVERHEAD + value.size();
        self.keys.push(key);
        self.values.push(value);
        Ok(())
    }

    /// Inserts a pair, or replaces the value of an existing equal key.
    ///
    /// Returns the replaced value, if any.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `key` is not a primitive item.
    /// - `AllocationFailure` if growth fails; the record is unchanged.
    pub fn put(&mut self, key: Entity, value: Entity) -> CodecResult<Option<Entity>> {
        Self::check_key(&key)?;
        if let Some(index) = self.position(&key) {
            let new_size = value.size();
            let old = std::mem::replace(&mut self.values[index], value);
            self.data_bytes = self.data_bytes - old.size() + new_size;
            return Ok(Some(old));
        }
        self.push_pair(key, value)?;
        Ok(None)
    }

    /// Appends a pair without looking for an existing key.
    ///
    /// Duplicate keys are kept; [`Record::get`] returns the first match.
    pub fn append(&mut self, key: Entity, value: Entity) -> CodecResult<()> {
        Self::check_key(&key)?;
        self.push_pair(key, value)
    }

    /// Puts a value under a string key.
    pub fn put_named(&mut self, name: &str, value: Entity) -> CodecResult<Option<Entity>> {
        self.put(Entity::string(name)?, value)
    }

    /// Returns the value paired with `key`.
    #[must_use]
    pub fn get(&self, key: &Entity) -> Option<&Entity> {
        self.position(key).map(|index| &self.values[index])
    }

    /// Returns the value paired with `key`, or `KeyNotFound`.
    pub fn try_get(&self, key: &Entity) -> CodecResult<&Entity> {
        self.get(key).ok_or(CodecError::KeyNotFound)
    }

    /// Returns the value paired with the string key `name`.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Entity> {
        self.keys
            .iter()
            .position(|k| {
                k.entity_type() == EntityType::String && k.as_raw() == Some(name.as_bytes())
            })
            .map(|index| &self.values[index])
    }

    /// True if a key equal to `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &Entity) -> bool {
        self.position(key).is_some()
    }

    /// Removes the first pair whose key equals `key` and returns its value.
    ///
    /// The last pair moves into the vacated slot.
    pub fn delete(&mut self, key: &Entity) -> CodecResult<Entity> {
        let index = self.position(key).ok_or(CodecError::KeyNotFound)?;
        let key = self.keys.swap_remove(index);
        let value = self.values.swap_remove(index);
        self.header_bytes -= KEY_OVERHEAD + key.size();
        self.data_bytes -= VALUE_OVERHEAD + value.size();
        Ok(value)
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if the record has no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of pair slots reserved.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes the header region occupies when serialized.
    #[must_use]
    pub fn header_bytes(&self) -> u64 {
        self.header_bytes
    }

    /// Bytes the data region occupies when serialized.
    #[must_use]
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    /// Length of the serialized record.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.header_bytes + self.data_bytes + ENVELOPE_FIXED_SIZE
    }

    /// Keys in storage order.
    #[must_use]
    pub fn keys(&self) -> &[Entity] {
        &self.keys
    }

    /// Values in storage order, aligned with [`Record::keys`].
    #[must_use]
    pub fn values(&self) -> &[Entity] {
        &self.values
    }

    /// Recomputes the byte accounting from scratch, walking every entity.
    #[must_use]
    pub fn recompute_sizes(&self) -> SizeSummary {
        let header_bytes = self
            .keys
            .iter()
            .map(|k| KEY_OVERHEAD + k.recompute_size())
            .sum::<u64>();
        let data_bytes = self
            .values
            .iter()
            .map(|v| VALUE_OVERHEAD + v.recompute_size())
            .sum::<u64>();
        SizeSummary {
            header_bytes,
            data_bytes,
            total_bytes: header_bytes + data_bytes + ENVELOPE_FIXED_SIZE,
        }
    }

    /// Pairs each of our pairs with a distinct equal pair of `other`.
    fn matches_pairs_of(&self, other: &Self) -> bool {
        let mut used = vec![false; other.len()];
        self.iter().all(|(key, value)| {
            let found = other
                .iter()
                .zip(&used)
                .position(|((k, v), taken)| !*taken && k == key && v == value);
            match found {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}

impl Clone for Record {
    /// The clone keeps the full slot reservation, so later inserts grow
    /// through the fallible path.
    fn clone(&self) -> Self {
        let mut keys = Vec::with_capacity(self.capacity);
        keys.extend(self.keys.iter().cloned());
        let mut values = Vec::with_capacity(self.capacity);
        values.extend(self.values.iter().cloned());
        Self {
            keys,
            values,
            capacity: self.capacity,
            header_bytes: self.header_bytes,
            data_bytes: self.data_bytes,
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-independent: the same pairs with the same multiplicities.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.matches_pairs_of(other)
    }
}

impl Eq for Record {}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Entity {
        Entity::string(name).unwrap()
    }

    fn assert_sizes_consistent(record: &Record) {
        let summary = record.recompute_sizes();
        assert_eq!(record.header_bytes(), summary.header_bytes);
        assert_eq!(record.data_bytes(), summary.data_bytes);
        assert_eq!(record.total_bytes(), summary.total_bytes);
        assert!(record.len() <= record.capacity());
    }

    #[test]
    fn empty_record() {
        let record = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.capacity(), 0);
        assert_eq!(record.total_bytes(), ENVELOPE_FIXED_SIZE);

        let record = Record::with_capacity(16).unwrap();
        assert_eq!(record.capacity(), 16);
        assert_eq!(record.header_bytes(), 0);
        assert_eq!(record.data_bytes(), 0);
    }

    #[test]
    fn scenario_sizes() {
        let mut record = Record::new();
        record.put(key("x"), Entity::item(10i32).unwrap()).unwrap();
        record
            .put(key("name"), Entity::string("abcd").unwrap())
            .unwrap();

        assert_eq!(record.header_bytes(), (12 + 1) + (12 + 4));
        assert_eq!(record.data_bytes(), (16 + 4) + (16 + 4));
        assert_eq!(record.total_bytes(), 29 + 40 + 40);
        assert_sizes_consistent(&record);
    }

    #[test]
    fn put_then_get() {
        let mut record = Record::new();
        let value = Entity::item(3.25f64).unwrap();
        record.put(key("pi-ish"), value.clone()).unwrap();
        assert_eq!(record.get(&key("pi-ish")), Some(&value));
        assert_eq!(record.get_named("pi-ish"), Some(&value));
        assert_eq!(record.get(&key("missing")), None);
        assert_eq!(record.try_get(&key("missing")), Err(CodecError::KeyNotFound));
    }

    #[test]
    fn put_is_upsert() {
        let mut record = Record::new();
        assert_eq!(
            record.put(key("k"), Entity::item(1i32).unwrap()).unwrap(),
            None
        );
        let header = record.header_bytes();

        let old = record
            .put(key("k"), Entity::string("a longer value").unwrap())
            .unwrap();
        assert_eq!(old, Some(Entity::item(1i32).unwrap()));
        assert_eq!(record.len(), 1);
        assert_eq!(record.header_bytes(), header);
        assert_eq!(
            record.get(&key("k")).unwrap().as_str(),
            Some("a longer value")
        );
        assert_sizes_consistent(&record);
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut record = Record::new();
        record.append(key("k"), Entity::item(1u8).unwrap()).unwrap();
        record.append(key("k"), Entity::item(2u8).unwrap()).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(&key("k")).unwrap().as_scalar::<u8>(), Some(1));
        assert_sizes_consistent(&record);
    }

    #[test]
    fn delete_swaps_last_pair_in() {
        let mut record = Record::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            record.put(key(name), Entity::item(i as u32).unwrap()).unwrap();
        }

        let removed = record.delete(&key("b")).unwrap();
        assert_eq!(removed.as_scalar::<u32>(), Some(1));
        assert_eq!(record.len(), 3);
        assert_eq!(record.keys()[1], key("d"));
        assert_eq!(record.get(&key("b")), None);
        assert_eq!(record.delete(&key("b")), Err(CodecError::KeyNotFound));
        assert_sizes_consistent(&record);
    }

    #[test]
    fn capacity_doubles() {
        let mut record = Record::with_capacity(2).unwrap();
        let mut last = record.capacity();
        for i in 0..40u32 {
            record.put(Entity::item(i).unwrap(), Entity::item(i).unwrap()).unwrap();
            let cap = record.capacity();
            assert!(cap >= last);
            if cap != last {
                assert!(cap >= last * 2);
            }
            last = cap;
            assert_sizes_consistent(&record);
        }
        assert_eq!(record.len(), 40);
    }

    #[test]
    fn rejects_composite_keys() {
        let mut record = Record::new();
        let err = record
            .put(Entity::record(Record::new()), Entity::item(1i8).unwrap())
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument { .. }));
        assert!(record
            .append(Entity::array(&[1i8, 2]).unwrap(), Entity::item(1i8).unwrap())
            .is_err());
        assert!(record.is_empty());
    }

    #[test]
    fn equality_ignores_order_and_capacity() {
        let mut a = Record::with_capacity(32).unwrap();
        let mut b = Record::new();
        a.put(key("x"), Entity::item(1i16).unwrap()).unwrap();
        a.put(key("y"), Entity::item(2i16).unwrap()).unwrap();
        b.put(key("y"), Entity::item(2i16).unwrap()).unwrap();
        b.put(key("x"), Entity::item(1i16).unwrap()).unwrap();
        assert_eq!(a, b);

        b.put(key("x"), Entity::item(9i16).unwrap()).unwrap();
        assert_ne!(a, b);

        b.delete(&key("x")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn equality_counts_duplicate_pairs() {
        let k = || key("k");
        let j = || key("j");
        let mut a = Record::new();
        a.append(k(), Entity::item(1u8).unwrap()).unwrap();
        a.append(k(), Entity::item(1u8).unwrap()).unwrap();
        a.append(j(), Entity::item(2u8).unwrap()).unwrap();

        let mut b = Record::new();
        b.append(k(), Entity::item(1u8).unwrap()).unwrap();
        b.append(j(), Entity::item(2u8).unwrap()).unwrap();
        b.append(j(), Entity::item(2u8).unwrap()).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, a);

        let mut c = Record::new();
        c.append(j(), Entity::item(2u8).unwrap()).unwrap();
        c.append(k(), Entity::item(1u8).unwrap()).unwrap();
        c.append(k(), Entity::item(1u8).unwrap()).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn clone_keeps_reserved_slots() {
        let mut record = Record::new();
        for name in ["a", "b", "c"] {
            record.put(key(name), Entity::item(1u8).unwrap()).unwrap();
        }
        assert_eq!(record.capacity(), 4);

        let mut copy = record.clone();
        assert_eq!(copy, record);
        assert!(copy.keys.capacity() >= copy.capacity());
        assert!(copy.values.capacity() >= copy.capacity());

        for name in ["d", "e", "f"] {
            copy.put(key(name), Entity::item(2u8).unwrap()).unwrap();
        }
        assert_eq!(copy.len(), 6);
        assert_eq!(copy.capacity(), 8);
        assert!(copy.keys.capacity() >= 8);
        assert_sizes_consistent(&copy);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn struct_field_sizes_follow_nested_record() {
        let mut inner = Record::new();
        inner.put(key("depth"), Entity::item(2u8).unwrap()).unwrap();
        let inner_total = inner.total_bytes();

        let mut outer = Record::new();
        outer.put(key("child"), Entity::record(inner)).unwrap();
        assert_eq!(outer.data_bytes(), VALUE_OVERHEAD + inner_total);
        assert_sizes_consistent(&outer);
    }
}
