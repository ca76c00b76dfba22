#![forbid(unsafe_code)]

//! Key paths: dotted coordinates into a `serde_json::Value` graph.
//!
//! # Role in pathobs
//! `pathobs-keypath` is the collaborator layer. It knows how to resolve and
//! mutate a path such as `"baz.foo.foo"` against an arbitrary JSON graph, and
//! how to classify a value for decomposition. It has no notion of observers
//! or events; the `pathobs` crate builds change propagation on top of it.
//!
//! # Primary responsibilities
//! - **[`get`]**: live lookup, `None` for any unresolved segment.
//! - **[`set`]**: assignment that creates intermediate objects as needed.
//! - **[`Kind`]**: the `Scalar` / `Array` / `PlainObject` discriminator.
//! - **[`strict_eq`]**: identity-style equality used to suppress no-op writes.
//!
//! # Example
//!
//! ```
//! use pathobs_keypath::{Kind, get, set};
//! use serde_json::json;
//!
//! let mut root = json!({ "baz": { "foo": { "foo": "bar" } } });
//! assert_eq!(get(&root, "baz.foo.foo", '.'), Some(&json!("bar")));
//!
//! set(&mut root, "baz.qux", '.', json!(1)).unwrap();
//! assert_eq!(root["baz"]["qux"], json!(1));
//! assert_eq!(Kind::of(&root["baz"]), Kind::PlainObject);
//! ```

pub mod error;
pub mod kind;
pub mod path;

pub use error::KeyPathError;
pub use kind::{Kind, strict_eq};
pub use path::{DEFAULT_SEPARATOR, get, join, segments, set};
