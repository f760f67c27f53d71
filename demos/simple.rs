//! Basic serialization to text and back.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_tdf::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    level: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            level: 7,
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
            level: 2,
        },
    ];

    // Numeric kinds other than int and double carry a suffix: 42I, 7B
    let text = to_string(&users)?;
    println!("Text output:\n{}\n", text);

    let users_back: Vec<User> = from_str(&text)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    // Hand-written input is forgiving: comments, bare strings, no braces at the root
    let edited = "
        # tweaked by hand
        id: 44
        name: Carol
        email: carol@example.com
        level: 3
    ";
    let carol: User = from_str(edited)?;
    println!("Parsed hand-written user: {:?}", carol);

    Ok(())
}
