use burrow::{de, DeserializeErrorKind, Encoder, ErrorKind, Timestamp, Uuid};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, PartialEq, Debug)]
struct WorldHeader {
    version: i32,
    revision: u32,
    name: String,
    id: Uuid,
    created_on: Timestamp,
    hardcore: bool,
    seed: Option<String>,
    ore_tiers: Vec<i32>,
}

#[test]
fn test_deserialize_world_header() {
    let id: Uuid = "72ce90e3-eff3-4be4-9395-f1c3d33fd1c7".parse().unwrap();
    let created = Timestamp::from_unix_ticks(16_725_312_000_000_000);

    let mut encoder = Encoder::new();
    encoder.write_i32(279);
    encoder.write_u32(3);
    encoder.write_string("Gaia");
    encoder.write_uuid(id);
    encoder.write_datetime(created);
    encoder.write_bool(true);
    encoder.write_bool(true);
    encoder.write_string("worthy");
    encoder.write_varuint(4);
    for tier in [7i32, 6, 63, 686] {
        encoder.write_i32(tier);
    }

    let actual: WorldHeader = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(
        actual,
        WorldHeader {
            version: 279,
            revision: 3,
            name: String::from("Gaia"),
            id,
            created_on: created,
            hardcore: true,
            seed: Some(String::from("worthy")),
            ore_tiers: vec![7, 6, 63, 686],
        }
    );
}

#[test]
fn test_deserialize_none() {
    #[derive(Deserialize, PartialEq, Debug)]
    struct Pets {
        cat: Option<u8>,
    }

    let actual: Pets = de::from_slice(&[0x00]).unwrap();
    assert_eq!(actual, Pets { cat: None });
}

#[test]
fn test_deserialize_map() {
    let mut encoder = Encoder::new();
    encoder.write_varuint(2);
    encoder.write_string("slime");
    encoder.write_i32(812);
    encoder.write_string("zombie");
    encoder.write_i32(153);

    let actual: HashMap<String, i32> = de::from_slice(encoder.as_slice()).unwrap();
    let mut expected = HashMap::new();
    expected.insert(String::from("slime"), 812);
    expected.insert(String::from("zombie"), 153);
    assert_eq!(actual, expected);
}

#[derive(Deserialize, PartialEq, Debug)]
enum Liquid {
    None,
    Water(u8),
    Shimmer { depth: u8, glow: bool },
}

#[test]
fn test_deserialize_enum_variants() {
    let mut encoder = Encoder::new();
    encoder.write_varuint(0);
    let actual: Liquid = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(actual, Liquid::None);

    let mut encoder = Encoder::new();
    encoder.write_varuint(1);
    encoder.write_u8(255);
    let actual: Liquid = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(actual, Liquid::Water(255));

    let mut encoder = Encoder::new();
    encoder.write_varuint(2);
    encoder.write_u8(3);
    encoder.write_bool(true);
    let actual: Liquid = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(
        actual,
        Liquid::Shimmer {
            depth: 3,
            glow: true
        }
    );
}

#[test]
fn test_deserialize_nested() {
    #[derive(Deserialize, PartialEq, Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Deserialize, PartialEq, Debug)]
    struct Spawns {
        home: Point,
        dungeon: Point,
        others: Vec<Point>,
    }

    let mut encoder = Encoder::new();
    for val in [100i32, -3, 2100, 150] {
        encoder.write_i32(val);
    }
    encoder.write_varuint(1);
    encoder.write_i32(0);
    encoder.write_i32(0);

    let actual: Spawns = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(
        actual,
        Spawns {
            home: Point { x: 100, y: -3 },
            dungeon: Point { x: 2100, y: 150 },
            others: vec![Point { x: 0, y: 0 }],
        }
    );
}

#[test]
fn test_deserialize_tuple_and_chars() {
    let mut encoder = Encoder::new();
    encoder.write_u32(u32::from('@'));
    encoder.write_u16(7);
    let actual: (char, u16) = de::from_slice(encoder.as_slice()).unwrap();
    assert_eq!(actual, ('@', 7));
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut encoder = Encoder::new();
    encoder.write_u16(7);
    encoder.write_u8(0xff);

    let err = de::from_slice::<u16>(encoder.as_slice()).unwrap_err();
    match err.kind() {
        ErrorKind::Deserialize(e) => {
            assert!(matches!(e.kind(), DeserializeErrorKind::TrailingBytes(1)))
        }
        kind => panic!("unexpected error: {:?}", kind),
    }
}

#[test]
fn test_underrun_carries_offset() {
    let mut encoder = Encoder::new();
    encoder.write_u16(7);

    let err = de::from_slice::<(u16, u32)>(encoder.as_slice()).unwrap_err();
    assert_eq!(err.offset(), Some(2));
}

#[test]
fn test_self_describing_access_rejected() {
    let err = de::from_slice::<serde::de::IgnoredAny>(&[0x00; 4]).unwrap_err();
    match err.kind() {
        ErrorKind::Deserialize(e) => {
            assert!(matches!(e.kind(), DeserializeErrorKind::Unsupported(_)))
        }
        kind => panic!("unexpected error: {:?}", kind),
    }
}

#[test]
fn test_invalid_char_rejected() {
    let mut encoder = Encoder::new();
    encoder.write_u32(0xd800);

    let err = de::from_slice::<char>(encoder.as_slice()).unwrap_err();
    match err.kind() {
        ErrorKind::Deserialize(e) => {
            assert!(matches!(e.kind(), DeserializeErrorKind::InvalidChar(0xd800)))
        }
        kind => panic!("unexpected error: {:?}", kind),
    }
}
