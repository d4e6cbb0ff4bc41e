//! Flat `section/key` maps, lists and header comments.
//!
//! Run with: cargo run --example unstructured

use lvmconf::{config_map, from_str, to_string_map_with_options, EncodeOptions, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let map = config_map! {
        "devices/filter" => vec!["a|^/dev/sd.*|", "r|.*|"],
        "devices/global_filter" => Vec::<String>::new(),
        "global/umask" => 63,
        "global/etc" => "/etc",
    };

    let options = EncodeOptions::new().with_header("Written by the unstructured demo");
    let text = to_string_map_with_options(&map, &options)?;
    println!("{}", text);

    let back = from_str(&text)?;
    for (key, value) in &back {
        match value {
            Value::List(items) => println!("{:<24} list of {}", key, items.len()),
            Value::EmptyList => println!("{:<24} empty list", key),
            other => println!("{:<24} {}", key, other),
        }
    }

    println!("\nAs JSON: {}", serde_json::to_string_pretty(&back)?);
    Ok(())
}
