// Coverage tests for malformed input, limits and error messages
use objpack::error::type_name;
use objpack::wire::format::*;
use objpack::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn decode(bytes: &[u8]) -> std::result::Result<Value, DecodeError> {
    unpack_with(bytes, &Registry::new(), &CodecConfig::default()).map(|(value, _)| value)
}

fn sample_values() -> Vec<Value> {
    vec![
        Value::Int(-70_000),
        Value::UInt(u64::MAX),
        Value::Float(1.25),
        Value::string("a".repeat(40)),
        Value::bytes(vec![1; 300]),
        Value::map(vec![(
            Value::string("k"),
            Value::array(vec![Value::Nil, Value::Bool(true)]),
        )]),
        Value::complex(1.0, 2.0),
        Value::list(vec![Value::Int(1), Value::string("x")]),
        Value::set(vec![Value::Int(1), Value::Int(2)]),
        Value::byte_array(vec![9; 20]),
        Value::Timestamp(Timestamp::new(1 << 40, 5).unwrap()),
        Value::ellipsis(),
    ]
}

// ═══════════════════════════════════════════════════════════════════════
// Truncation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_input() {
    assert!(matches!(
        decode(&[]),
        Err(DecodeError::UnexpectedEndOfInput {
            offset: 0,
            needed: 1
        })
    ));
}

#[test]
fn test_every_prefix_is_truncated() {
    for value in sample_values() {
        let bytes = pack(&value).unwrap();
        for cut in 0..bytes.len() {
            assert!(
                matches!(
                    decode(&bytes[..cut]),
                    Err(DecodeError::UnexpectedEndOfInput { .. })
                ),
                "{:?} cut at {}",
                value,
                cut
            );
        }
    }
}

proptest! {
    #[test]
    fn prop_truncated_string_never_decodes(s in ".{0,80}", cut in 0usize..100) {
        let bytes = pack(&Value::string(s)).unwrap();
        prop_assume!(cut < bytes.len());
        let is_truncated = matches!(
            decode(&bytes[..cut]),
            Err(DecodeError::UnexpectedEndOfInput { .. })
        );
        prop_assert!(is_truncated);
    }

    #[test]
    fn prop_truncated_int_list_never_decodes(
        items in proptest::collection::vec(any::<i64>(), 0..20),
        cut in 0usize..200,
    ) {
        let value = Value::list(items.into_iter().map(Value::Int).collect());
        let bytes = pack(&value).unwrap();
        prop_assume!(cut < bytes.len());
        let is_truncated = matches!(
            decode(&bytes[..cut]),
            Err(DecodeError::UnexpectedEndOfInput { .. })
        );
        prop_assert!(is_truncated);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode(&bytes);
    }
}

#[test]
fn test_huge_declared_length_fails_cleanly() {
    let bytes = [ARRAY32, 0xff, 0xff, 0xff, 0xff, 0x01];
    assert!(matches!(
        decode(&bytes),
        Err(DecodeError::UnexpectedEndOfInput { .. })
    ));

    let bytes = [EXT32, 0xff, 0xff, 0xff, 0xff, 0x02];
    assert!(matches!(
        decode(&bytes),
        Err(DecodeError::UnexpectedEndOfInput { offset: 6, .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Recursion limit
// ═══════════════════════════════════════════════════════════════════════

fn nested_arrays(depth: usize) -> Value {
    (0..depth).fold(Value::Nil, |inner, _| Value::array(vec![inner]))
}

fn nested_lists(depth: usize) -> Value {
    (0..depth).fold(Value::Nil, |inner, _| Value::list(vec![inner]))
}

#[test]
fn test_encode_depth_limit() {
    assert!(pack(&nested_arrays(1000)).is_ok());
    assert!(matches!(
        pack(&nested_arrays(1001)),
        Err(EncodeError::RecursionLimitExceeded { max: 1000 })
    ));
}

#[test]
fn test_decode_depth_limit() {
    let mut bytes = vec![FIXARRAY | 1; 1001];
    bytes.push(NIL);
    assert!(matches!(
        decode(&bytes),
        Err(DecodeError::RecursionLimitExceeded { max: 1000 })
    ));
    assert!(decode(&bytes[1..]).is_ok());
}

#[test]
fn test_encode_list_depth_limit() {
    assert!(pack(&nested_lists(1000)).is_ok());
    assert!(matches!(
        pack(&nested_lists(1001)),
        Err(EncodeError::RecursionLimitExceeded { max: 1000 })
    ));
}

#[test]
fn test_depth_counts_through_extensions() {
    let config = CodecConfig::with_max_depth(3);
    let value = Value::list(vec![Value::map(vec![(
        Value::Nil,
        Value::set(vec![Value::array(vec![])]),
    )])]);
    assert!(matches!(
        pack_with(&value, &config),
        Err(EncodeError::RecursionLimitExceeded { max: 3 })
    ));

    let bytes = pack(&value).unwrap();
    assert!(matches!(
        unpack_with(&bytes, &Registry::empty(), &config),
        Err(DecodeError::RecursionLimitExceeded { max: 3 })
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Error messages
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_decode_error_messages() {
    assert_eq!(
        decode(&[INVALID]).unwrap_err().to_string(),
        "invalid msgpack type: '0xc1'"
    );
    assert_eq!(
        decode(&[FIXEXT1, 0x42, 0]).unwrap_err().to_string(),
        "unknown extension type: '0x42'"
    );
    assert_eq!(
        decode(&[FIXEXT4, 0x01, 0, 0, 0, 0]).unwrap_err().to_string(),
        "invalid complex size: 4"
    );
    assert_eq!(
        decode(&[FIXSTR | 2]).unwrap_err().to_string(),
        "ran out of input: needed 2 byte(s) at offset 1"
    );
}

#[test]
fn test_umbrella_error_wraps_each_kind() {
    let err: Error = decode(&[INVALID]).unwrap_err().into();
    assert!(matches!(err, Error::Decode(_)));

    let err: Error = Timestamp::new(0, 1_000_000_000).unwrap_err().into();
    assert_eq!(
        err.to_string(),
        "argument 'nanoseconds' greater than maximum: 1000000000"
    );

    let err: Error = Registry::empty().register(&Value::Nil).unwrap_err().into();
    assert_eq!(err.to_string(), "cannot register 'nil' values");
}

#[test]
fn test_type_name_all_variants() {
    let class = Value::class(Class::new("m", "C"));
    let cases = [
        (Value::Nil, "nil"),
        (Value::Bool(true), "bool"),
        (Value::Int(1), "int"),
        (Value::UInt(u64::MAX), "int"),
        (Value::Float(1.0), "float"),
        (Value::bytes(vec![]), "bytes"),
        (Value::string(""), "str"),
        (Value::array(vec![]), "array"),
        (Value::map(vec![]), "map"),
        (Value::complex(0.0, 0.0), "complex"),
        (Value::byte_array(vec![]), "bytearray"),
        (Value::list(vec![]), "list"),
        (Value::set(vec![]), "set"),
        (Value::frozen_set(vec![]), "frozenset"),
        (class, "class"),
        (Value::ellipsis(), "Ellipsis"),
        (Value::Timestamp(Timestamp::from_secs(0)), "Timestamp"),
    ];
    for (value, expected) in cases {
        assert_eq!(type_name(&value), expected);
    }
}
