//! Human-readable dumps of records and entities.

use std::fmt::{self, Write};

use crate::entity::{Entity, Payload};
use crate::record::Record;
use crate::types::{EntityClass, EntityType, Scalar};

/// Elements shown per array before eliding the rest.
const MAX_SHOWN: usize = 16;

fn indent(out: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("  ")?;
    }
    Ok(())
}

fn write_list<T: fmt::Display>(
    out: &mut impl Write,
    items: impl ExactSizeIterator<Item = T>,
) -> fmt::Result {
    let total = items.len();
    out.write_char('[')?;
    for (i, item) in items.take(MAX_SHOWN).enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{item}")?;
    }
    if total > MAX_SHOWN {
        write!(out, ", ... {} more", total - MAX_SHOWN)?;
    }
    out.write_char(']')
}

fn write_scalars<T: Scalar + fmt::Display>(
    out: &mut impl Write,
    entity: &Entity,
    bytes: &[u8],
) -> fmt::Result {
    let mut values = bytes.chunks_exact(T::WIDTH).map(T::read_le);
    if entity.count() == 1 && entity.class() == EntityClass::Item {
        match values.next() {
            Some(value) => write!(out, "{value}"),
            None => Ok(()),
        }
    } else {
        write_list(out, values)
    }
}

/// Writes the value part of a primitive entity.
fn write_primitive(out: &mut impl Write, entity: &Entity, bytes: &[u8]) -> fmt::Result {
    match entity.entity_type() {
        EntityType::Int8 => write_scalars::<i8>(out, entity, bytes),
        EntityType::Int16 => write_scalars::<i16>(out, entity, bytes),
        EntityType::Int32 => write_scalars::<i32>(out, entity, bytes),
        EntityType::Int64 => write_scalars::<i64>(out, entity, bytes),
        EntityType::UInt8 => write_scalars::<u8>(out, entity, bytes),
        EntityType::UInt16 => write_scalars::<u16>(out, entity, bytes),
        EntityType::UInt32 => write_scalars::<u32>(out, entity, bytes),
        EntityType::UInt64 => write_scalars::<u64>(out, entity, bytes),
        EntityType::Float => write_scalars::<f32>(out, entity, bytes),
        EntityType::Double => write_scalars::<f64>(out, entity, bytes),
        EntityType::Bool => write_scalars::<bool>(out, entity, bytes),
        EntityType::Char | EntityType::String => {
            write!(out, "{:?}", String::from_utf8_lossy(bytes))
        }
        EntityType::Bytes | EntityType::Record | EntityType::Entity => {
            write!(out, "0x")?;
            for byte in bytes.iter().take(MAX_SHOWN * 2) {
                write!(out, "{byte:02x}")?;
            }
            if bytes.len() > MAX_SHOWN * 2 {
                write!(out, "...")?;
            }
            Ok(())
        }
    }
}

fn write_entity(out: &mut impl Write, entity: &Entity, depth: usize) -> fmt::Result {
    write!(out, "{} {}", entity.entity_type(), entity.class())?;
    match entity.payload() {
        Payload::Raw(bytes) => {
            out.write_str(" = ")?;
            write_primitive(out, entity, bytes)?;
            writeln!(out)
        }
        Payload::Record(record) => {
            writeln!(out)?;
            indent(out, depth + 1)?;
            write_record(out, record, depth + 2)
        }
        Payload::Records(records) => {
            writeln!(out, " ({} records)", records.len())?;
            for (i, record) in records.iter().enumerate() {
                indent(out, depth + 1)?;
                write!(out, "[{i}] ")?;
                write_record(out, record, depth + 2)?;
            }
            Ok(())
        }
        Payload::Entity(child) => {
            writeln!(out)?;
            indent(out, depth + 1)?;
            write_entity(out, child, depth + 1)
        }
        Payload::Entities(children) => {
            writeln!(out, " ({} entities)", children.len())?;
            for (i, child) in children.iter().enumerate() {
                indent(out, depth + 1)?;
                write!(out, "[{i}] ")?;
                write_entity(out, child, depth + 1)?;
            }
            Ok(())
        }
    }
}

fn write_record(out: &mut impl Write, record: &Record, depth: usize) -> fmt::Result {
    writeln!(
        out,
        "record ({} pairs, {} bytes)",
        record.len(),
        record.total_bytes()
    )?;
    for (key, value) in record {
        indent(out, depth)?;
        match key.as_raw() {
            Some(bytes) => write_primitive(out, key, bytes)?,
            None => out.write_str("?")?,
        }
        out.write_str(": ")?;
        write_entity(out, value, depth)?;
    }
    Ok(())
}

impl Entity {
    /// Renders this entity and everything below it, indented by `depth`
    /// levels.
    pub fn dump(&self, depth: usize) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = indent(&mut out, depth).and_then(|()| write_entity(&mut out, self, depth));
        out
    }
}

impl Record {
    /// Renders this record and everything below it, indented by `depth`
    /// levels.
    pub fn dump(&self, depth: usize) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = indent(&mut out, depth).and_then(|()| write_record(&mut out, self, depth + 1));
        out
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entity(f, self, 0)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, self, 1)
    }
}
