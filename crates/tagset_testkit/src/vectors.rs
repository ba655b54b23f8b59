//! Wire-format test vectors.
//!
//! Hex-encoded serialized records, valid and malformed, that any
//! implementation of the format must accept or reject the same way.

use serde::{Deserialize, Serialize};
use tagset_codec::CodecError;

/// A serialized record and the expected outcome of decoding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Serialized record (hex-encoded).
    pub input_hex: String,
    /// Expected error kind, as named by [`error_kind`], if decoding must fail.
    pub expected_error: Option<String>,
}

impl TestVector {
    fn valid(id: &str, description: &str, input_hex: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input_hex: input_hex.into(),
            expected_error: None,
        }
    }

    fn invalid(id: &str, description: &str, input_hex: &str, error: &str) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input_hex: input_hex.into(),
            expected_error: Some(error.into()),
        }
    }
}

/// Stable name of an error variant, used to match vectors.
pub fn error_kind(error: &CodecError) -> &'static str {
    match error {
        CodecError::InvalidArgument { .. } => "InvalidArgument",
        CodecError::UnsupportedType { .. } => "UnsupportedType",
        CodecError::KeyNotFound => "KeyNotFound",
        CodecError::CorruptEnvelope { .. } => "CorruptEnvelope",
        CodecError::TruncatedBuffer { .. } => "TruncatedBuffer",
        CodecError::AllocationFailure { .. } => "AllocationFailure",
        CodecError::NestingTooDeep { .. } => "NestingTooDeep",
        CodecError::SizeLimitExceeded { .. } => "SizeLimitExceeded",
    }
}

/// Hex of the scenario record (see [`crate::scenario_record`]).
pub const SCENARIO_HEX: &str = "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000000300000004000000000000000a000000010000000d000000040000000000000061626364";

/// Records that must decode and re-encode to the same bytes.
pub fn valid_record_vectors() -> Vec<TestVector> {
    vec![
        TestVector::valid(
            "empty",
            "Record with no pairs",
            "00000000000000000000000000000000000000000000000018000000000000000000000000000000",
        ),
        TestVector::valid(
            "scenario",
            "int32 x = 10, string name = abcd",
            SCENARIO_HEX,
        ),
        TestVector::valid(
            "struct_field",
            "uint32 level = 0, struct child = scenario",
            "2200000000000000910000000000000002000000000000000d00000005000000000000006c6576656c0d00000005000000000000006368696c643a0000000000000002000000000000000100000007000000040000000000000000000000010000000f0000006d000000000000001d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000000300000004000000000000000a000000010000000d000000040000000000000061626364",
        ),
        TestVector::valid(
            "array_and_numeric_key",
            "uint16 array v = [1, 2, 3], uint8 key 7 => bytes dead",
            "1a00000000000000280000000000000002000000000000000d000000010000000000000076050000000100000000000000073200000000000000020000000000000002000000060000000600000000000000010002000300010000000e0000000200000000000000dead",
        ),
        TestVector::valid(
            "entity_array",
            "entity array e = [bool true, string hi]",
            "0d00000000000000330000000000000001000000000000000d0000000100000000000000652500000000000000010000000000000002000000100000002300000000000000010000000c000000010000000000000001010000000d00000002000000000000006869",
        ),
    ]
}

/// Malformed records that must be rejected.
pub fn invalid_record_vectors() -> Vec<TestVector> {
    vec![
        TestVector::invalid(
            "truncated",
            "Scenario record missing its last byte",
            "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000000300000004000000000000000a000000010000000d0000000400000000000000616263",
            "TruncatedBuffer",
        ),
        TestVector::invalid(
            "short_envelope",
            "Fewer bytes than the fixed envelope",
            "1d000000000000002800",
            "TruncatedBuffer",
        ),
        TestVector::invalid(
            "bad_data_offset",
            "Data region offset off by one",
            "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6534000000000000000200000000000000010000000300000004000000000000000a000000010000000d000000040000000000000061626364",
            "CorruptEnvelope",
        ),
        TestVector::invalid(
            "shifted_region_sizes",
            "Envelope moves one byte from the data region to the header region",
            "1e00000000000000270000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000000300000004000000000000000a000000010000000d000000040000000000000061626364",
            "CorruptEnvelope",
        ),
        TestVector::invalid(
            "unknown_type",
            "Value type code 99",
            "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000006300000004000000000000000a000000010000000d000000040000000000000061626364",
            "UnsupportedType",
        ),
        TestVector::invalid(
            "unknown_class",
            "Value class code 3",
            "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000030000000300000004000000000000000a000000010000000d000000040000000000000061626364",
            "UnsupportedType",
        ),
        TestVector::invalid(
            "trailing_byte",
            "Scenario record followed by one extra byte",
            "1d00000000000000280000000000000002000000000000000d0000000100000000000000780d00000004000000000000006e616d6535000000000000000200000000000000010000000300000004000000000000000a000000010000000d00000004000000000000006162636400",
            "CorruptEnvelope",
        ),
    ]
}

/// All vectors as JSON for use by other implementations.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        valid: valid_record_vectors(),
        invalid: invalid_record_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    valid: Vec<TestVector>,
    invalid: Vec<TestVector>,
}
