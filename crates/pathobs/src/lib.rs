#![forbid(unsafe_code)]

//! Path-keyed change observation over a shared object graph.
//!
//! # Role in pathobs
//! `pathobs` turns a dotted key path into a live, observable slot of a
//! `serde_json::Value` graph. The graph is owned by the caller and shared
//! through `Rc<RefCell<Value>>`; observers never copy it.
//!
//! - [`Registry`]: per-root cache enforcing one [`PathObserver`] per path,
//!   plus a global change feed.
//! - [`PathObserver`]: live read, change-detecting write, subscriptions.
//! - [`Notifier`]: the ordered subscriber list both of them compose.
//! - [`Change`]: the `(value, previous)` payload, tagged with its path.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use serde_json::json;
//!
//! let root = Rc::new(RefCell::new(json!({ "foo": "bar" })));
//! let registry = pathobs::bind(Rc::clone(&root));
//!
//! let foo = registry.get_or_create("foo");
//! foo.change(|c| println!("{} -> {}", c.previous.as_ref().unwrap(), c.value))
//!     .unwrap();
//! foo.set(json!("baz")).unwrap();
//!
//! assert_eq!(root.borrow()["foo"], json!("baz"));
//! ```
//!
//! # Invariants
//!
//! 1. `get_or_create(p)` returns the identical observer until it is disposed.
//! 2. Writing a value strictly equal to the current scalar fires nothing.
//! 3. Arrays always count as changed: an owned value is a new reference.
//! 4. Writing a plain object decomposes into per-key writes; only leaves
//!    that actually change fire, each once, and each once more on the
//!    global feed.
//! 5. No upward propagation: a leaf write never fires ancestor observers.
//! 6. Every event is delivered before the `set` call returns; nothing is
//!    batched or deferred.

pub mod change;
pub mod config;
pub mod error;
pub mod notifier;
pub mod observer;
pub mod registry;

pub use change::Change;
pub use config::RegistryConfig;
pub use error::{ConfigError, ObserveError};
pub use notifier::{Notifier, SubscriberId};
pub use observer::{PathObserver, SubscriptionGuard, Unsubscribe};
pub use registry::{Registry, bind, bind_with_config};

pub use pathobs_keypath::{Kind, KeyPathError};
