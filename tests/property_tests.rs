//! Property-based tests for the round-trip and determinism guarantees.

use lvmconf::{from_str, from_str_into, lex_str, render, schema, to_string, to_string_map, ConfigMap, Value};
use proptest::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Lvm {
    config: Config,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Config {
    count: i64,
    path: String,
}

schema! { impl Schema for Lvm { "config" => config } }
schema! { impl Section for Config { "count" => count, "path" => path } }

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /|.*@_\\[\\]-]{0,24}"
}

/// Text a flat map can hold as a string: brackets would read back as a list.
fn scalar() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /|.*@_-]{0,24}"
}

fn element() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9/|.*@_-]{0,12}"
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int64),
        scalar().prop_map(Value::String),
        prop::collection::vec(element(), 0..5).prop_map(Value::from),
    ]
}

fn config_map() -> impl Strategy<Value = ConfigMap> {
    prop::collection::vec(((name(), name()), value()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .map(|((section, field), value)| (format!("{}/{}", section, field), value))
            .collect()
    })
}

/// A trailing comment as the renderer writes it: no space after a bare `#`.
fn comment(text: &str) -> String {
    match text.trim() {
        "" => " #".to_string(),
        text => format!(" # {}", text),
    }
}

/// A bare list as written in a file: `[ "a", "b" ]` or `[]`.
fn list() -> impl Strategy<Value = String> {
    prop::collection::vec(element(), 0..4).prop_map(|items| {
        if items.is_empty() {
            return "[]".to_string();
        }
        let quoted: Vec<String> = items.iter().map(|e| format!("\"{}\"", e)).collect();
        format!("[ {} ]", quoted.join(", "))
    })
}

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        text().prop_map(|t| format!("#{}", t)),
        (name(), any::<i64>()).prop_map(|(k, v)| format!("\t{} = {}", k, v)),
        (name(), text()).prop_map(|(k, v)| format!("\t{} = \"{}\"", k, v)),
        (name(), text(), text()).prop_map(|(k, v, c)| format!("\t{} = \"{}\"{}", k, v, comment(&c))),
        (name(), list()).prop_map(|(k, v)| format!("\t{} = {}", k, v)),
        (name(), list(), text()).prop_map(|(k, v, c)| format!("\t{} = {}{}", k, v, comment(&c))),
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec((name(), prop::collection::vec(line(), 0..6)), 0..4).prop_map(
        |sections| {
            let mut out = String::new();
            for (name, lines) in sections {
                out.push_str(&format!("{} {{\n", name));
                for line in lines {
                    if let Some(text) = line.strip_prefix('#') {
                        out.push('\t');
                        out.push_str(comment(text).trim_start());
                        out.push('\n');
                    } else {
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
                out.push_str("}\n");
            }
            out
        },
    )
}

proptest! {
    #[test]
    fn prop_render_lex_is_identity(doc in document()) {
        let tokens = lex_str(&doc).unwrap();
        prop_assert_eq!(render(&tokens).unwrap(), doc);
    }

    #[test]
    fn prop_structured_round_trip(count in any::<i64>(), path in text()) {
        let lvm = Lvm { config: Config { count, path } };
        let text = to_string(&lvm).unwrap();
        let mut back = Lvm::default();
        from_str_into(&text, &mut back).unwrap();
        prop_assert_eq!(back, lvm);
    }

    #[test]
    fn prop_unstructured_round_trip(map in config_map()) {
        let text = to_string_map(&map).unwrap();
        let back = from_str(&text).unwrap();
        prop_assert_eq!(back.len(), map.len());
        for (key, value) in &map {
            prop_assert_eq!(back.get(key), Some(value));
        }
    }

    #[test]
    fn prop_encode_is_deterministic(map in config_map()) {
        let first = to_string_map(&map).unwrap();
        for _ in 0..20 {
            prop_assert_eq!(&to_string_map(&map).unwrap(), &first);
        }
    }
}
