//! Entity classes, type codes and the size-of collaborator.

use std::fmt;

/// Shape of an entity: a single value or a homogeneous sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EntityClass {
    /// Exactly one value.
    Item = 1,
    /// An ordered sequence of values of one type.
    Array = 2,
}

impl EntityClass {
    /// Converts a wire code to a class.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Item),
            2 => Some(Self::Array),
            _ => None,
        }
    }

    /// Converts the class to its wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Item => "item",
            Self::Array => "array",
        })
    }
}

/// Kind of value an entity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EntityType {
    /// Signed 8-bit integer.
    Int8 = 1,
    /// Signed 16-bit integer.
    Int16 = 2,
    /// Signed 32-bit integer.
    Int32 = 3,
    /// Signed 64-bit integer.
    Int64 = 4,
    /// Unsigned 8-bit integer.
    UInt8 = 5,
    /// Unsigned 16-bit integer.
    UInt16 = 6,
    /// Unsigned 32-bit integer.
    UInt32 = 7,
    /// Unsigned 64-bit integer.
    UInt64 = 8,
    /// IEEE 754 single precision.
    Float = 9,
    /// IEEE 754 double precision.
    Double = 10,
    /// Single byte character.
    Char = 11,
    /// Boolean stored as one byte.
    Bool = 12,
    /// UTF-8 text, variable length.
    String = 13,
    /// Opaque bytes, variable length.
    Bytes = 14,
    /// A nested record (struct field).
    Record = 15,
    /// A nested entity.
    Entity = 16,
}

impl EntityType {
    /// Converts a wire code to a type.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Int8,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Int64,
            5 => Self::UInt8,
            6 => Self::UInt16,
            7 => Self::UInt32,
            8 => Self::UInt64,
            9 => Self::Float,
            10 => Self::Double,
            11 => Self::Char,
            12 => Self::Bool,
            13 => Self::String,
            14 => Self::Bytes,
            15 => Self::Record,
            16 => Self::Entity,
            _ => return None,
        })
    }

    /// Converts the type to its wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Width in bytes of one element, for fixed-width primitives.
    #[must_use]
    pub const fn fixed_width(self) -> Option<u64> {
        match self {
            Self::Int8 | Self::UInt8 | Self::Char | Self::Bool => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float => Some(4),
            Self::Int64 | Self::UInt64 | Self::Double => Some(8),
            Self::String | Self::Bytes | Self::Record | Self::Entity => None,
        }
    }

    /// True for `Record` and `Entity`, whose payloads are other values.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Record | Self::Entity)
    }

    /// True for primitives whose size is the payload length.
    #[must_use]
    pub const fn is_variable(self) -> bool {
        matches!(self, Self::String | Self::Bytes)
    }

    /// Lowercase name used in dumps and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Record => "record",
            Self::Entity => "entity",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host type system lookup: byte size of `count` values of `ty`.
///
/// Returns `None` when the combination has no fixed size. Variable-length
/// and composite types are sized by the entity itself.
pub trait TypeMetadata {
    /// Byte size of `count` elements of `ty` in the given class.
    fn size_of(&self, class: EntityClass, ty: EntityType, count: u64) -> Option<u64>;
}

/// The built-in type table, using [`EntityType::fixed_width`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypes;

impl TypeMetadata for StandardTypes {
    fn size_of(&self, class: EntityClass, ty: EntityType, count: u64) -> Option<u64> {
        if class == EntityClass::Item && count != 1 {
            return None;
        }
        ty.fixed_width()?.checked_mul(count)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width Rust values that map onto a primitive [`EntityType`].
///
/// Values are stored little-endian regardless of host byte order.
pub trait Scalar: Copy + sealed::Sealed {
    /// The entity type this value encodes as.
    const TYPE: EntityType;
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Appends the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Reads a value from exactly [`Self::WIDTH`] bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Scalar for $t {
                const TYPE: EntityType = EntityType::$variant;
                const WIDTH: usize = std::mem::size_of::<$t>();

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_scalar! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
}

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const TYPE: EntityType = EntityType::Bool;
    const WIDTH: usize = 1;

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
