use serde_tdf::{reflect_record, tdf, Mapper, TdfMap, TypeInfo, Value};

#[test]
fn test_tdf_macro_null() {
    let value = tdf!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_tdf_macro_booleans() {
    assert_eq!(tdf!(true), Value::Bool(true));
    assert_eq!(tdf!(false), Value::Bool(false));
}

#[test]
fn test_tdf_macro_numbers_keep_their_kind() {
    assert_eq!(tdf!(42), Value::Int(42));
    assert_eq!(tdf!(-123), Value::Int(-123));
    assert_eq!(tdf!(3.5), Value::Double(3.5));
    assert_eq!(tdf!(3.5f32), Value::Float(3.5));
    assert_eq!(tdf!(255u8), Value::Byte(255));
    assert_eq!(tdf!(9u64), Value::ULong(9));
    assert_eq!(tdf!('x'), Value::Char('x'));
}

#[test]
fn test_tdf_macro_strings() {
    assert_eq!(tdf!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(tdf!(""), Value::String(String::new()));
}

#[test]
fn test_tdf_macro_arrays() {
    assert_eq!(tdf!([]), Value::Array(vec![]));
    assert_eq!(
        tdf!([1, "two", null, (-4i16)]),
        Value::Array(vec![
            Value::Int(1),
            Value::from("two"),
            Value::Null,
            Value::Short(-4),
        ])
    );
}

#[test]
fn test_tdf_macro_nested_objects() {
    let value = tdf!({
        "name": "Slime",
        "stats": { "health": (3u8), "speed": 1.5 },
        "loot": [{ "item": "gel" }],
    });

    let mut stats = TdfMap::new();
    stats.insert("health".to_string(), Value::Byte(3));
    stats.insert("speed".to_string(), Value::Double(1.5));

    let obj = value.as_object().unwrap();
    assert_eq!(obj["stats"], Value::Object(stats));
    assert_eq!(
        obj["loot"].as_array().unwrap()[0].as_object().unwrap()["item"],
        Value::from("gel")
    );
}

#[test]
fn test_tdf_macro_expression_values() {
    let bytes: &[u8] = &[1, 2];
    let name = String::from("dynamic");
    let value = tdf!({ "data": bytes, "name": (name.clone()), "maybe": (Some(2u16)) });

    let obj = value.as_object().unwrap();
    assert_eq!(obj["data"], Value::Binary(vec![1, 2]));
    assert_eq!(obj["name"], Value::String(name));
    assert_eq!(obj["maybe"], Value::UShort(2));
}

#[derive(Debug, Default, PartialEq)]
struct Waypoint {
    label: String,
    coords: [f32; 2],
}

reflect_record!(Waypoint { label: String, coords: [f32; 2] });

#[test]
fn test_reflect_record_from_another_crate() {
    let info = TypeInfo::of::<Waypoint>();
    assert_eq!(info.module, "macro_tests");
    assert_eq!(info.name, std::any::type_name::<Waypoint>());

    let waypoint = Waypoint {
        label: "camp".to_string(),
        coords: [1.0, -2.0],
    };
    let mapper = Mapper::new();
    let value = mapper.encode_as(&waypoint).unwrap();
    assert_eq!(value, tdf!({ "label": "camp", "coords": [(1.0f32), (-2.0f32)] }));
    assert_eq!(mapper.decode_as::<Waypoint>(&value).unwrap(), waypoint);
}
