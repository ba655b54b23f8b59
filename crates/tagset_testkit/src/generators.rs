//! Property-based test generators using proptest.
//!
//! Every generated entity is valid, and every generated record nests no
//! deeper than the default codec limit.

use proptest::prelude::*;
use tagset_codec::{Entity, Record, Scalar};

fn item<T: Scalar>(value: T) -> Entity {
    Entity::item(value).expect("scalar items always build")
}

fn array<T: Scalar>(values: Vec<T>) -> Entity {
    Entity::array(&values).expect("non-empty scalar arrays always build")
}

/// Strategy for single scalar items of every fixed-width type.
pub fn scalar_item_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        any::<i8>().prop_map(item),
        any::<i16>().prop_map(item),
        any::<i32>().prop_map(item),
        any::<i64>().prop_map(item),
        any::<u8>().prop_map(item),
        any::<u16>().prop_map(item),
        any::<u32>().prop_map(item),
        any::<u64>().prop_map(item),
        any::<f32>().prop_map(item),
        any::<f64>().prop_map(item),
        any::<bool>().prop_map(item),
    ]
}

/// Strategy for short scalar arrays.
pub fn scalar_array_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        prop::collection::vec(any::<i16>(), 1..8).prop_map(array),
        prop::collection::vec(any::<u32>(), 1..8).prop_map(array),
        prop::collection::vec(any::<i64>(), 1..8).prop_map(array),
        prop::collection::vec(any::<f64>(), 1..8).prop_map(array),
        prop::collection::vec(any::<bool>(), 1..8).prop_map(array),
    ]
}

/// Strategy for string and byte-blob items.
pub fn blob_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        "[ -~]{0,24}".prop_map(|s| Entity::string(&s).expect("strings always build")),
        prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(|b| Entity::bytes(&b).expect("blobs always build")),
    ]
}

/// Strategy for any primitive entity.
pub fn primitive_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        3 => scalar_item_strategy(),
        1 => scalar_array_strategy(),
        2 => blob_strategy(),
    ]
}

/// Strategy for valid field names.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for record keys: mostly string names, sometimes integers.
pub fn key_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        4 => field_name_strategy().prop_map(|s| Entity::string(&s).expect("names always build")),
        1 => any::<u32>().prop_map(item),
    ]
}

/// Builds a record from pairs, letting later keys replace earlier ones.
pub fn build_record(pairs: Vec<(Entity, Entity)>) -> Record {
    let mut record = Record::new();
    for (key, value) in pairs {
        record.put(key, value).expect("generated keys are primitive items");
    }
    record
}

/// Strategy for records of primitive values only.
pub fn flat_record_strategy(max_pairs: usize) -> impl Strategy<Value = Record> {
    prop::collection::vec((key_strategy(), primitive_strategy()), 0..=max_pairs)
        .prop_map(build_record)
}

/// Strategy for records with struct fields and composite arrays, nesting up
/// to `levels` records deep.
///
/// Each level adds at most two to the codec depth, so `levels` up to 7 stays
/// within the default limit.
pub fn record_strategy(levels: u32) -> impl Strategy<Value = Record> {
    flat_record_strategy(4).prop_recursive(levels, 48, 4, |inner| {
        let value = prop_oneof![
            3 => primitive_strategy(),
            2 => inner.clone().prop_map(Entity::record),
            1 => primitive_strategy().prop_map(Entity::nested),
            1 => prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|records| Entity::records(records).expect("non-empty")),
            1 => prop::collection::vec(
                prop_oneof![
                    primitive_strategy(),
                    inner.clone().prop_map(Entity::record),
                ],
                1..4,
            )
            .prop_map(|entities| Entity::entities(entities).expect("non-empty")),
        ];
        prop::collection::vec((key_strategy(), value), 0..5).prop_map(build_record)
    })
}

/// A mutation applied to a record in property tests.
#[derive(Debug, Clone)]
pub enum RecordOperation {
    /// Insert or replace a value.
    Put {
        /// Field name.
        name: String,
        /// New value.
        value: Entity,
    },
    /// Append without replacing.
    Append {
        /// Field name.
        name: String,
        /// New value.
        value: Entity,
    },
    /// Remove a field.
    Delete {
        /// Field name.
        name: String,
    },
}

/// Strategy for record operations over a small name space, so puts, appends
/// and deletes collide often.
pub fn record_operation_strategy() -> impl Strategy<Value = RecordOperation> {
    let name = prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(String::from);
    prop_oneof![
        4 => (name.clone(), primitive_strategy())
            .prop_map(|(name, value)| RecordOperation::Put { name, value }),
        1 => (name.clone(), primitive_strategy())
            .prop_map(|(name, value)| RecordOperation::Append { name, value }),
        2 => name.prop_map(|name| RecordOperation::Delete { name }),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<RecordOperation>> {
    prop::collection::vec(record_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_of(record: &Record) -> usize {
        record
            .values()
            .iter()
            .map(|value| 1 + entity_depth(value))
            .max()
            .unwrap_or(0)
    }

    fn entity_depth(entity: &Entity) -> usize {
        let records = entity.as_records().unwrap_or_default();
        let entities = entity.as_entities().unwrap_or_default();
        let from_records = records.iter().map(depth_of);
        let from_entities = entities.iter().map(|e| 1 + entity_depth(e));
        let nested = entity.as_record().map(depth_of);
        let wrapped = entity.as_entity().map(|e| 1 + entity_depth(e));
        from_records
            .chain(from_entities)
            .chain(nested)
            .chain(wrapped)
            .max()
            .unwrap_or(0)
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn field_names_start_with_a_letter(name in field_name_strategy()) {
            let first = name.chars().next();
            prop_assert!(first.map_or(false, |c| c.is_ascii_lowercase()));
        }

        #[test]
        fn keys_are_key_compatible(key in key_strategy()) {
            prop_assert!(key.is_key_compatible());
        }

        #[test]
        fn records_stay_shallow(record in record_strategy(3)) {
            prop_assert!(depth_of(&record) < 16);
        }

        #[test]
        fn built_records_track_sizes(record in record_strategy(2)) {
            let summary = record.recompute_sizes();
            prop_assert_eq!(summary.header_bytes, record.header_bytes());
            prop_assert_eq!(summary.data_bytes, record.data_bytes());
        }
    }
}
