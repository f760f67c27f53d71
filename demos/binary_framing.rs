//! The binary encoding: length-prefixed containers that a reader can skip without parsing.
//!
//! Run with: cargo run --example binary_framing

use serde::{Deserialize, Serialize};
use serde_tdf::binary_reader::BinaryReader;
use serde_tdf::{from_slice, to_vec, Token, TokenRead, Value};
use std::error::Error;
use std::io::Cursor;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Save {
    world: Vec<Vec<u16>>,
    player: String,
    score: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let save = Save {
        world: (0..64).map(|row| (0..64).map(|col| row * col).collect()).collect(),
        player: "Ada".to_string(),
        score: 9001,
    };

    let bytes = to_vec(&save)?;
    println!("Encoded save: {} bytes", bytes.len());

    let back: Save = from_slice(&bytes)?;
    assert_eq!(save, back);
    println!("✓ Round-trip successful");

    // Pull only the player name, seeking past the world grid by its length field
    let mut reader = BinaryReader::new(Cursor::new(&bytes[..]))?;
    assert_eq!(reader.next_token()?, Some(Token::ObjectStart));

    while let Some(token) = reader.next_token()? {
        match token {
            Token::ObjectKey(key) if key == "player" => {
                let player = reader.read_value()?;
                println!("Player: {}", player.as_str().unwrap_or("?"));
            }
            Token::ObjectKey(key) => {
                let before = reader.offset();
                reader.skip_value()?;
                println!("Skipped '{}' ({} bytes)", key, reader.offset() - before);
            }
            Token::ObjectEnd => break,
            other => return Err(format!("unexpected {}", other.describe()).into()),
        }
    }

    let score: Value = serde_tdf::binary_reader::decode(&to_vec(&save.score)?)?;
    println!("A lone u64 encodes as kind {}", score.kind().name());

    Ok(())
}
