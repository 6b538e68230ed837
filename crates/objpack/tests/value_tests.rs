//! Round-trip tests for every Value variant

use objpack::*;
use pretty_assertions::assert_eq;

fn round_trip(value: &Value) -> Value {
    let bytes = pack(value).unwrap();
    let (decoded, consumed) = unpack(&bytes).unwrap();
    assert_eq!(consumed, bytes.len());
    decoded
}

#[test]
fn test_core_values() {
    for value in [
        Value::Nil,
        Value::Bool(true),
        Value::Bool(false),
        Value::Int(0),
        Value::Int(-1),
        Value::Int(i64::MIN),
        Value::Int(i64::MAX),
        Value::UInt(u64::MAX),
        Value::Float(3.25),
        Value::Float(-0.0),
        Value::string(""),
        Value::string("héllo"),
        Value::bytes(vec![]),
        Value::bytes(vec![0, 1, 2, 255]),
    ] {
        assert_eq!(round_trip(&value), value);
    }
}

#[test]
fn test_nested_containers() {
    let value = Value::map(vec![
        (
            Value::string("numbers"),
            Value::array(vec![Value::Int(1), Value::Float(2.5), Value::Nil]),
        ),
        (
            Value::Int(7),
            Value::map(vec![(Value::Bool(true), Value::bytes(vec![9]))]),
        ),
    ]);
    assert_eq!(round_trip(&value), value);
}

#[test]
fn test_map_keeps_pair_order() {
    let value = Value::map(vec![
        (Value::string("b"), Value::Int(2)),
        (Value::string("a"), Value::Int(1)),
    ]);
    let decoded = round_trip(&value);
    let pairs = decoded.as_map().unwrap();
    assert_eq!(pairs[0].0, Value::string("b"));
    assert_eq!(pairs[1].0, Value::string("a"));
}

#[test]
fn test_extension_values() {
    for value in [
        Value::complex(1.5, -2.0),
        Value::byte_array(vec![]),
        Value::byte_array(b"buffer".to_vec()),
        Value::list(vec![]),
        Value::list(vec![Value::Int(1), Value::list(vec![Value::string("x")])]),
        Value::frozen_set(vec![Value::Int(1), Value::string("a")]),
        Value::Timestamp(Timestamp::new(1_700_000_000, 123).unwrap()),
    ] {
        assert_eq!(round_trip(&value), value);
    }
}

#[test]
fn test_set_round_trip_ignores_order() {
    let value = Value::set(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    let decoded = round_trip(&value);
    assert!(matches!(decoded, Value::Set(_)));
    assert_eq!(
        decoded,
        Value::set(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_list_and_tuple_stay_distinct() {
    let list = round_trip(&Value::list(vec![Value::Int(1)]));
    let tuple = round_trip(&Value::array(vec![Value::Int(1)]));
    assert!(matches!(list, Value::List(_)));
    assert!(matches!(tuple, Value::Array(_)));
    assert_ne!(list, tuple);
}

#[test]
fn test_bytes_and_bytearray_stay_distinct() {
    let bytes = round_trip(&Value::bytes(vec![1]));
    let buffer = round_trip(&Value::byte_array(vec![1]));
    assert!(matches!(bytes, Value::Bytes(_)));
    assert!(matches!(buffer, Value::ByteArray(_)));
}

#[test]
fn test_unpack_reports_bytes_consumed() {
    let mut bytes = pack(&Value::Int(1)).unwrap();
    bytes.extend(pack(&Value::string("next")).unwrap());

    let (first, used) = unpack(&bytes).unwrap();
    assert_eq!(first, Value::Int(1));
    assert_eq!(used, 1);

    let (second, used_after) = unpack(&bytes[used..]).unwrap();
    assert_eq!(second, Value::string("next"));
    assert_eq!(used + used_after, bytes.len());
}

#[test]
fn test_pack_with_min_alloc() {
    let config = CodecConfig::new().min_alloc(1);
    let value = Value::list(vec![Value::string("a".repeat(100))]);
    let bytes = pack_with(&value, &config).unwrap();
    assert_eq!(bytes, pack(&value).unwrap());
}

#[test]
fn test_encode_value_appends_to_sink() {
    let config = CodecConfig::default();
    let mut sink = wire::ByteSink::new();
    encode_value(&mut sink, &Value::Int(1), &config).unwrap();
    encode_value(&mut sink, &Value::Nil, &config).unwrap();
    assert_eq!(sink.into_vec(), vec![0x01, 0xc0]);
}
