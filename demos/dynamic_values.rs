//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use serde_tdf::{tdf, to_string, to_value, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build config dynamically with tdf! macro
    let config = tdf!({
        "host": "localhost",
        "port": (8080u16),
        "features": ["auth", "logging", "metrics"],
        "debug": true,
        "ratio": (0.75f32)
    });

    println!("Config as text:\n{}\n", to_string(&config)?);
    println!("Config on one line: {}\n", config);

    // Access values dynamically
    if let Value::Object(obj) = &config {
        if let Some(host) = obj.get("host").and_then(Value::as_str) {
            println!("Accessing field 'host': {}", host);
        }

        if let Some(port) = obj.get("port") {
            println!("Accessing field 'port': {} ({})", port.to_i64(), port.kind().name());
        }

        if let Some(Value::Array(features)) = obj.get("features") {
            println!("Accessing field 'features': {} items\n", features.len());
        }
    }

    // Convert existing struct to Value
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };

    let user_value = to_value(&user)?;
    println!("User as Value:\n{}\n", to_string(&user_value)?);

    // Runtime type checking
    println!("Type checks:");
    println!("  is_object: {}", user_value.is_object());
    println!("  is_array:  {}", user_value.is_array());
    println!("  is_string: {}", user_value.is_string());

    Ok(())
}
