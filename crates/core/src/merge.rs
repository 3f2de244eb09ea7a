//! Key-path insertion shared by every way of writing into a map.
//!
//! `a.b = 1`, `a = { b = 1 }` and `..$spread` all go through
//! [`insert_at_path`], so dotted keys and literal nested maps produce the
//! same tree.

use crate::value::{Map, Value};

/// A map and a non-map met at the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConflict {
    /// Dotted path of the key that clashed.
    pub key: String,
    pub existing: &'static str,
    pub incoming: &'static str,
}

/// Insert `value` at `path` below `map`, creating intermediate maps.
///
/// An existing key keeps its position. Maps merge key by key, anything else
/// overwrites a non-map. Writing a map over a non-map (or the reverse) is a
/// conflict and leaves the target as it was at the conflicting key.
pub fn insert_at_path(map: &mut Map, path: &[String], value: Value) -> Result<(), MergeConflict> {
    insert_below(map, path, value, &mut Vec::new())
}

fn insert_below<'p>(
    map: &mut Map,
    path: &'p [String],
    value: Value,
    walked: &mut Vec<&'p str>,
) -> Result<(), MergeConflict> {
    let Some((head, rest)) = path.split_first() else {
        return Ok(());
    };
    walked.push(head);

    if rest.is_empty() {
        return match map.get_mut(head.as_str()) {
            Some(existing) => merge_into(existing, value, walked),
            None => {
                map.insert(head.clone(), value);
                Ok(())
            }
        };
    }

    let child = map
        .entry(head.clone())
        .or_insert_with(|| Value::Map(Map::new()));
    match child {
        Value::Map(inner) => insert_below(inner, rest, value, walked),
        other => Err(MergeConflict {
            key: walked.join("."),
            existing: other.type_name(),
            incoming: "a map",
        }),
    }
}

fn merge_into(
    existing: &mut Value,
    incoming: Value,
    walked: &mut Vec<&str>,
) -> Result<(), MergeConflict> {
    match (existing, incoming) {
        (Value::Map(target), Value::Map(source)) => {
            for (key, value) in source {
                merge_key(target, key, value, walked)?;
            }
            Ok(())
        }
        (existing, incoming) => {
            if matches!(existing, Value::Map(_)) || matches!(incoming, Value::Map(_)) {
                return Err(MergeConflict {
                    key: walked.join("."),
                    existing: existing.type_name(),
                    incoming: incoming.type_name(),
                });
            }
            *existing = incoming;
            Ok(())
        }
    }
}

fn merge_key(
    target: &mut Map,
    key: String,
    value: Value,
    walked: &mut Vec<&str>,
) -> Result<(), MergeConflict> {
    match target.get_mut(key.as_str()) {
        Some(existing) => {
            // `walked` borrows path segments; nested keys come from values,
            // so the conflict path is rebuilt here
            let mut nested: Vec<&str> = walked.clone();
            nested.push(&key);
            merge_into(existing, value, &mut nested)
        }
        None => {
            target.insert(key, value);
            Ok(())
        }
    }
}
