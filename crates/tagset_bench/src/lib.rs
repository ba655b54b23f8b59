//! Benchmark utilities.

use rand::Rng;
use tagset_codec::{CodecResult, Entity, Record};

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Field names `field_0` .. `field_{count-1}`.
pub fn field_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("field_{}", i)).collect()
}

/// A record of `pairs` random scalar values under [`field_names`].
pub fn flat_record(pairs: usize) -> CodecResult<Record> {
    let mut rng = rand::thread_rng();
    let mut record = Record::with_capacity(pairs)?;
    for (i, name) in field_names(pairs).iter().enumerate() {
        let value = match i % 4 {
            0 => Entity::item(rng.gen::<i32>())?,
            1 => Entity::item(rng.gen::<f64>())?,
            2 => Entity::string(&format!("value {}", rng.gen::<u16>()))?,
            _ => Entity::array(&[rng.gen::<u16>(), rng.gen(), rng.gen()])?,
        };
        record.put_named(name, value)?;
    }
    Ok(record)
}

/// A record `depth` struct fields deep, each level holding `width` scalars.
pub fn nested_record(depth: usize, width: usize) -> CodecResult<Record> {
    let mut record = flat_record(width)?;
    for _ in 0..depth {
        let mut outer = flat_record(width)?;
        outer.put_named("child", Entity::record(record))?;
        record = outer;
    }
    Ok(record)
}

/// A record holding one random byte blob of `size` bytes.
pub fn blob_record(size: usize) -> CodecResult<Record> {
    let mut record = Record::new();
    record.put_named("blob", Entity::bytes(&random_data(size))?)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_records_have_expected_shape() {
        let flat = flat_record(10).unwrap();
        assert_eq!(flat.len(), 10);
        assert!(flat.get_named("field_9").is_some());

        let nested = nested_record(3, 2).unwrap();
        assert_eq!(nested.len(), 3);
        assert!(nested.get_named("child").unwrap().as_record().is_some());

        assert_eq!(blob_record(100).unwrap().data_bytes(), 16 + 100);
    }
}
