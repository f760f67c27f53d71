use serde::{Deserialize, Serialize};
use serde_tdf::{
    from_slice, from_str, from_value, tdf, to_string, to_string_with_options, to_value, to_vec,
    TextOptions, Value,
};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
    note: Option<String>,
}

fn sample_order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
        note: None,
    }
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    assert_eq!(
        text,
        "id: 123I\nname: 'Alice'\nactive: true\ntags: [\n\t'admin'\n\t'developer'\n]"
    );

    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct_text() {
    let order = sample_order();
    let text = to_string(&order).unwrap();
    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_nested_struct_binary() {
    let order = sample_order();
    let bytes = to_vec(&order).unwrap();
    let order_back: Order = from_slice(&bytes).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_text_and_binary_agree() {
    let order = sample_order();
    let from_text = serde_tdf::text_reader::parse(&to_string(&order).unwrap()).unwrap();
    let from_binary = serde_tdf::binary_reader::decode(&to_vec(&order).unwrap()).unwrap();
    assert_eq!(from_text, from_binary);
    assert_eq!(from_text, to_value(&order).unwrap());
}

#[test]
fn test_every_numeric_kind_survives_text() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Numbers {
        a: u8,
        b: i8,
        c: i16,
        d: u16,
        e: i32,
        f: u32,
        g: i64,
        h: u64,
        i: f32,
        j: f64,
        k: char,
    }

    let numbers = Numbers {
        a: 255,
        b: -128,
        c: -300,
        d: 60000,
        e: -7,
        f: 4_000_000_000,
        g: i64::MIN,
        h: u64::MAX,
        i: 1.5,
        j: -0.25,
        k: 'λ',
    };

    let text = to_string(&numbers).unwrap();
    let value = serde_tdf::text_reader::parse(&text).unwrap();
    assert_eq!(value, to_value(&numbers).unwrap());

    let numbers_back: Numbers = from_str(&text).unwrap();
    assert_eq!(numbers, numbers_back);
}

#[test]
fn test_enums_are_externally_tagged() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Point,
        Circle(f64),
        Rect { w: u16, h: u16 },
    }

    let shapes = vec![Shape::Point, Shape::Circle(2.0), Shape::Rect { w: 3, h: 4 }];
    let value = to_value(&shapes).unwrap();
    assert_eq!(
        value,
        tdf!([
            "Point",
            { "Circle": 2.0 },
            { "Rect": { "w": (3u16), "h": (4u16) } }
        ])
    );

    let text = to_string(&shapes).unwrap();
    let shapes_back: Vec<Shape> = from_str(&text).unwrap();
    assert_eq!(shapes, shapes_back);
}

#[test]
fn test_numeric_map_keys() {
    let mut scores = HashMap::new();
    scores.insert(1u32, "one".to_string());
    scores.insert(20u32, "twenty".to_string());

    let text = to_string(&scores).unwrap();
    let back: HashMap<u32, String> = from_str(&text).unwrap();
    assert_eq!(scores, back);

    let back: HashMap<u32, String> = from_slice(&to_vec(&scores).unwrap()).unwrap();
    assert_eq!(scores, back);
}

#[test]
fn test_option_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Config {
        name: Option<String>,
        limit: Option<u16>,
    }

    let config = Config {
        name: None,
        limit: Some(10),
    };
    let text = to_string(&config).unwrap();
    assert_eq!(text, "name: null\nlimit: 10S");
    assert_eq!(from_str::<Config>(&text).unwrap(), config);

    // A key with no value reads as null
    let lenient: Config = from_str("name:\nlimit: 10").unwrap();
    assert_eq!(lenient, config);
}

#[test]
fn test_byte_buffers_are_binary() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Blob {
        #[serde(with = "serde_bytes_compat")]
        data: Vec<u8>,
    }

    mod serde_bytes_compat {
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(data)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
            struct BytesVisitor;

            impl<'de> serde::de::Visitor<'de> for BytesVisitor {
                type Value = Vec<u8>;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str("bytes")
                }

                fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
                    Ok(v)
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Vec<u8>, E> {
                    Ok(v.to_vec())
                }
            }

            deserializer.deserialize_byte_buf(BytesVisitor)
        }
    }

    let blob = Blob {
        data: vec![0, 1, 2, 254, 255],
    };
    let text = to_string(&blob).unwrap();
    assert_eq!(text, "data: *AAEC/v8=*");
    assert_eq!(from_str::<Blob>(&text).unwrap(), blob);
    assert_eq!(from_str::<Blob>("data: 'bin::AAEC/v8='").unwrap(), blob);
    assert_eq!(from_slice::<Blob>(&to_vec(&blob).unwrap()).unwrap(), blob);
}

#[test]
fn test_custom_options() {
    let options = TextOptions::new()
        .with_newline("\r\n")
        .with_indent("    ")
        .with_braced_root(true);

    let text = to_string_with_options(&sample_order().customer, &options).unwrap();
    assert_eq!(
        text,
        "{\r\n    id: 123I\r\n    name: 'Alice'\r\n    active: true\r\n    tags: [\r\n        'vip'\r\n    ]\r\n}"
    );
    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user_back, sample_order().customer);
}

#[test]
fn test_hand_written_text() {
    let text = r"
        # a monster
        name: 'Slime'   // quoted strings may hold 'escapes\'
        health: 3B
        drops: [gel, 'blue gel']
        position: { x: 1.5, y: -2.5 }
    ";

    #[derive(Deserialize, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Monster {
        name: String,
        health: u8,
        drops: Vec<String>,
        position: Position,
    }

    let monster: Monster = from_str(text).unwrap();
    assert_eq!(
        monster,
        Monster {
            name: "Slime".to_string(),
            health: 3,
            drops: vec!["gel".to_string(), "blue gel".to_string()],
            position: Position { x: 1.5, y: -2.5 },
        }
    );
}

#[test]
fn test_from_value_coerces_widths() {
    let value = tdf!({ "id": (5u8), "name": "Bob", "active": "true", "tags": [] });
    let user: User = from_value(value).unwrap();
    assert_eq!(user.id, 5);
    assert!(user.active);
}

#[test]
fn test_value_serializes_through_serde_json() {
    let value = tdf!({ "a": [1, (2u8)], "b": null });
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"a":[1,2],"b":null}"#);
}

#[test]
fn test_syntax_error_has_location() {
    let err = from_str::<User>("id: 1\n}").unwrap_err();
    assert!(matches!(err, serde_tdf::Error::Syntax { line: 2, .. }));
}

#[test]
fn test_empty_document_is_empty_object() {
    #[derive(Deserialize, Debug, PartialEq, Default)]
    struct Empty {}

    assert_eq!(from_str::<Empty>("").unwrap(), Empty {});
    assert_eq!(from_str::<HashMap<String, i32>>("  # nothing\n").unwrap(), HashMap::new());
    assert_eq!(serde_tdf::text_reader::parse("").unwrap(), Value::Object(Default::default()));
}
