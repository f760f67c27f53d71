//! Property-based tests for the round-trip guarantees of both encodings.
//!
//! Binary must reproduce every value exactly, kind included. Text must reproduce the
//! logical value; with type suffixes on every non-default numeric kind it is kind-exact
//! too, except for strings that happen to look like binary literals, which the
//! generators avoid.

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_tdf::binary_reader::decode;
use serde_tdf::binary_writer::encode;
use serde_tdf::{from_slice, from_str, text_reader, text_writer};
use serde_tdf::{TdfMap, TextOptions, Value};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    let text_ok = match serde_tdf::to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    };
    let binary_ok = match serde_tdf::to_vec(value) {
        Ok(bytes) => from_slice::<T>(&bytes).map_or(false, |back| *value == back),
        Err(_) => false,
    };
    text_ok && binary_ok
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _'\\\\{}:#\\-]{0,12}"
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ :#'\\-]{1,8}"
}

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..10).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_text().prop_map(Value::String),
        any::<u8>().prop_map(Value::Byte),
        any::<i8>().prop_map(Value::SByte),
        any::<char>().prop_map(Value::Char),
        any::<i16>().prop_map(Value::Short),
        any::<u16>().prop_map(Value::UShort),
        any::<i32>().prop_map(Value::Int),
        any::<u32>().prop_map(Value::UInt),
        any::<i64>().prop_map(Value::Long),
        any::<u64>().prop_map(Value::ULong),
        any::<f32>()
            .prop_filter("NaN never compares equal", |f| !f.is_nan())
            .prop_map(Value::Float),
        any::<f64>()
            .prop_filter("NaN never compares equal", |f| !f.is_nan())
            .prop_map(Value::Double),
        arb_decimal().prop_map(Value::Decimal),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Binary),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<TdfMap>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_vec_i16(v in prop::collection::vec(any::<i16>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_u8(opt in proptest::option::of(any::<u8>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_u32_string(t in (any::<u32>(), "[a-z ]{0,10}")) {
        prop_assert!(roundtrip(&t));
    }

    #[test]
    fn prop_binary_is_exact(value in arb_value()) {
        let bytes = encode(&value).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn prop_text_is_exact(value in arb_value()) {
        let options = TextOptions::new().with_braced_root(true);
        let text = text_writer::write_string(&value, &options).unwrap();
        let back = text_reader::parse(&text);
        prop_assert!(back.is_ok(), "failed to read back:\n{}", text);
        prop_assert_eq!(back.unwrap(), value);
    }
}
