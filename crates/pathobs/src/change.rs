#![forbid(unsafe_code)]

//! The payload delivered to change subscribers.

use serde_json::Value;

/// One actual mutation at one path.
///
/// Delivered to the observer's own subscribers and, unless disabled, to the
/// registry's global feed. A decomposed object write produces one `Change`
/// per leaf that actually changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Path of the observer that fired.
    pub path: String,
    /// The value now stored at `path`.
    pub value: Value,
    /// The value before the write; `None` if the path did not resolve.
    pub previous: Option<Value>,
}

impl Change {
    /// True if the path did not resolve before this write.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        self.previous.is_none()
    }
}
