#![forbid(unsafe_code)]

//! Dotted path resolution and assignment.
//!
//! # Semantics
//!
//! - Object nodes are indexed by key, array nodes by a segment that parses
//!   as `usize`.
//! - [`get`] returns `None` as soon as a segment cannot be resolved.
//! - [`set`] walks the same way but materialises missing or `null`
//!   intermediates as empty objects. An array accepts `index < len`
//!   (replace) or `index == len` (append).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unresolved read | Missing key, scalar intermediate | `get` returns `None` |
//! | Malformed path | `""`, `".a"`, `"a."`, `"a..b"` | `EmptySegment` |
//! | Scalar in the way | `"foo.x"` where `foo` is `"bar"` | `NotAContainer` |
//! | Bad array segment | `"list.x"` | `InvalidIndex` |
//! | Sparse append | `"list.9"` on a 3-element array | `IndexOutOfBounds` |
//!
//! A failing [`set`] leaves any intermediates it already created in place.

use serde_json::{Map, Value};

use crate::KeyPathError;

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '.';

/// Split `path` into its segments.
pub fn segments(path: &str, sep: char) -> impl Iterator<Item = &str> {
    path.split(sep)
}

/// Build the child path `parent<sep>key`.
#[must_use]
pub fn join(parent: &str, key: &str, sep: char) -> String {
    let mut out = String::with_capacity(parent.len() + key.len() + sep.len_utf8());
    out.push_str(parent);
    out.push(sep);
    out.push_str(key);
    out
}

/// Resolve `path` against `root`.
#[must_use]
pub fn get<'a>(root: &'a Value, path: &str, sep: char) -> Option<&'a Value> {
    segments(path, sep).try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path`, creating intermediate objects as needed.
pub fn set(root: &mut Value, path: &str, sep: char, value: Value) -> Result<(), KeyPathError> {
    let parts: Vec<&str> = segments(path, sep).collect();
    if parts.iter().any(|s| s.is_empty()) {
        return Err(KeyPathError::EmptySegment {
            path: path.to_owned(),
        });
    }
    let Some((last, parents)) = parts.split_last() else {
        return Err(KeyPathError::EmptySegment {
            path: path.to_owned(),
        });
    };

    let mut node = root;
    for segment in parents {
        node = descend(node, path, segment)?;
    }
    assign(node, path, last, value)
}

fn descend<'a>(node: &'a mut Value, path: &str, segment: &str) -> Result<&'a mut Value, KeyPathError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => Ok(map.entry(segment.to_owned()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = parse_index(path, segment)?;
            let len = items.len();
            if index == len {
                items.push(Value::Null);
            }
            items
                .get_mut(index)
                .ok_or_else(|| KeyPathError::IndexOutOfBounds {
                    path: path.to_owned(),
                    index,
                    len,
                })
        }
        _ => Err(not_a_container(path, segment)),
    }
}

fn assign(node: &mut Value, path: &str, segment: &str, value: Value) -> Result<(), KeyPathError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            map.insert(segment.to_owned(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(path, segment)?;
            let len = items.len();
            match index.cmp(&len) {
                std::cmp::Ordering::Less => {
                    items[index] = value;
                    Ok(())
                }
                std::cmp::Ordering::Equal => {
                    items.push(value);
                    Ok(())
                }
                std::cmp::Ordering::Greater => Err(KeyPathError::IndexOutOfBounds {
                    path: path.to_owned(),
                    index,
                    len,
                }),
            }
        }
        _ => Err(not_a_container(path, segment)),
    }
}

fn parse_index(path: &str, segment: &str) -> Result<usize, KeyPathError> {
    segment.parse().map_err(|_| KeyPathError::InvalidIndex {
        path: path.to_owned(),
        segment: segment.to_owned(),
    })
}

fn not_a_container(path: &str, segment: &str) -> KeyPathError {
    KeyPathError::NotAContainer {
        path: path.to_owned(),
        segment: segment.to_owned(),
    }
}
