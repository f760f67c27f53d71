//! The reflective object mapper: records, polymorphic slots and schema drift.
//!
//! Run with: cargo run --example polymorphic_mapper

use serde_tdf::text_reader::parse;
use serde_tdf::text_writer::write_string;
use serde_tdf::{reflect_record, Mapper, Reflect, TextOptions, TypeInfo, TypeRegistry, Value};
use std::error::Error;

#[derive(Debug, Default)]
struct Slime {
    health: u8,
    name: String,
}

#[derive(Debug, Default)]
struct KingSlime {
    health: u8,
    name: String,
    crown: String,
}

#[derive(Default)]
struct Dungeon {
    title: String,
    // Every occupant is tagged with its concrete type
    rooms: Vec<Option<Box<dyn Reflect>>>,
}

reflect_record!(Slime in "game" { health: u8, name: String });
reflect_record!(KingSlime in "game" { health: u8, name: String, crown: String });
reflect_record!(Dungeon in "game" {
    title: String,
    rooms: Vec<Option<Box<dyn Reflect>>>,
});

fn main() -> Result<(), Box<dyn Error>> {
    let registry = TypeRegistry::new()
        .with::<Slime>()
        .with::<KingSlime>()
        .with::<Dungeon>();
    let mapper = Mapper::new()
        .with_type_resolver(registry)
        .with_unused_reporter(|ty: &TypeInfo, key: &str, value: &Value| {
            println!("  (ignored '{}' = {} on {})", key, value, ty.name);
        });

    let rooms: Vec<Option<Box<dyn Reflect>>> = vec![
        Some(Box::new(Slime {
            health: 3,
            name: "Slime".to_string(),
        })),
        None,
        Some(Box::new(KingSlime {
            health: 30,
            name: "King".to_string(),
            crown: "gold".to_string(),
        })),
    ];
    let dungeon = Dungeon {
        title: "Gel Caves".to_string(),
        rooms,
    };

    let value = mapper.encode_as(&dungeon)?;
    let text = write_string(&value, &TextOptions::default())?;
    println!("Encoded dungeon:\n{}\n", text);

    // An older save with a field the current types no longer have
    let drifted = text.replacen("health: 3B", "health: 3B\n\t\tmood: 'grumpy'", 1);
    println!("Decoding a drifted copy:");
    let back: Dungeon = mapper.decode_as(&parse(&drifted)?)?;

    for (index, room) in back.rooms.iter().enumerate() {
        match room {
            Some(monster) => {
                if let Some(king) = monster.downcast_ref::<KingSlime>() {
                    println!("Room {}: {:?}", index, king);
                } else if let Some(slime) = monster.downcast_ref::<Slime>() {
                    println!("Room {}: {:?}", index, slime);
                }
            }
            None => println!("Room {}: empty", index),
        }
    }

    Ok(())
}
