#![forbid(unsafe_code)]

//! Errors raised while writing through a key path.
//!
//! Reads never fail: an unresolved path is simply `None`. Only [`set`]
//! reports errors, and only for paths that cannot name a slot in the graph.
//!
//! [`set`]: crate::set

use std::fmt;

/// Errors from key-path writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPathError {
    /// The path is empty, or has a leading, trailing or doubled separator.
    EmptySegment { path: String },
    /// A non-null scalar sits where an object or array is required.
    NotAContainer { path: String, segment: String },
    /// An array segment is not a non-negative integer.
    InvalidIndex { path: String, segment: String },
    /// An array index is past the end (only `index == len` may append).
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
}

impl KeyPathError {
    /// The full path of the failed operation.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::EmptySegment { path }
            | Self::NotAContainer { path, .. }
            | Self::InvalidIndex { path, .. }
            | Self::IndexOutOfBounds { path, .. } => path,
        }
    }
}

impl fmt::Display for KeyPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySegment { path } => write!(f, "empty segment in key path '{path}'"),
            Self::NotAContainer { path, segment } => {
                write!(
                    f,
                    "cannot set '{segment}' on a scalar value while writing '{path}'"
                )
            }
            Self::InvalidIndex { path, segment } => {
                write!(f, "invalid array index '{segment}' in key path '{path}'")
            }
            Self::IndexOutOfBounds { path, index, len } => write!(
                f,
                "array index {index} out of bounds (len {len}) in key path '{path}'"
            ),
        }
    }
}

impl std::error::Error for KeyPathError {}
