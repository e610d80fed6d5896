use std::fmt::Display;

use bytelayout::{ByteOrder, Decode, Error, decode};
use csv::ReaderBuilder;

const PATH: &str = "fixtures/scalars.csv";

#[test]
fn decode_scalar_table() {
    let mut reader = ReaderBuilder::new().from_path(PATH).unwrap();

    for row in reader.records() {
        let row = row.unwrap();
        let (ty, order, hex, expected) = (&row[0], &row[1], &row[2], &row[3]);

        let order = match order {
            "big" => ByteOrder::Big,
            "little" => ByteOrder::Little,
            _ => panic!("unknown byte order `{order}`"),
        };

        let bytes: Vec<u8> = hex
            .split_whitespace()
            .map(|b| u8::from_str_radix(b, 16).unwrap())
            .collect();

        let found = match ty {
            "i8" => validate::<i8>(&bytes, order),
            "i16" => validate::<i16>(&bytes, order),
            "i32" => validate::<i32>(&bytes, order),
            "i64" => validate::<i64>(&bytes, order),
            "u8" => validate::<u8>(&bytes, order),
            "u16" => validate::<u16>(&bytes, order),
            "u32" => validate::<u32>(&bytes, order),
            "u64" => validate::<u64>(&bytes, order),
            "f32" => validate::<f32>(&bytes, order),
            "f64" => validate::<f64>(&bytes, order),
            _ => panic!("unknown type `{ty}`"),
        };

        assert_eq!(found, expected, "{ty} {order:?} {hex}");
    }
}

/// Decode a value from exactly its bytes, and check that one byte fewer
/// overruns the buffer.
fn validate<T: Decode + Default + Display>(bytes: &[u8], order: ByteOrder) -> String {
    let mut value = T::default();
    assert_eq!(decode(&mut value, bytes, order).unwrap(), bytes.len());

    let mut short = T::default();
    let err = decode(&mut short, &bytes[1..], order).unwrap_err();
    assert!(matches!(
        err,
        Error::BufferOverrun { offset: 0, needed, available }
            if needed == bytes.len() && available == bytes.len() - 1
    ));

    value.to_string()
}

#[test]
fn decode_is_deterministic() {
    let bytes = [0x12, 0x34, 0x56, 0x78];

    let mut first = 0u32;
    let mut second = 0u32;
    decode(&mut first, &bytes, ByteOrder::Little).unwrap();
    decode(&mut second, &bytes, ByteOrder::Little).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, 0x7856_3412);
}
