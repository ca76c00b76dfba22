#![forbid(unsafe_code)]

//! Errors from observer and registry operations.

use std::fmt;

use pathobs_keypath::KeyPathError;

/// Errors from [`PathObserver`](crate::PathObserver) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserveError {
    /// The observer was disposed; request a fresh one from the registry.
    Disposed { path: String },
    /// The registry that created the observer no longer exists.
    RegistryDropped { path: String },
    /// The key-path write failed.
    KeyPath(KeyPathError),
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposed { path } => write!(f, "observer disposed: '{path}'"),
            Self::RegistryDropped { path } => {
                write!(f, "registry dropped while observing '{path}'")
            }
            Self::KeyPath(err) => write!(f, "key path error: {err}"),
        }
    }
}

impl std::error::Error for ObserveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyPath(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KeyPathError> for ObserveError {
    fn from(err: KeyPathError) -> Self {
        Self::KeyPath(err)
    }
}

/// Errors from [`RegistryConfig::validate`](crate::RegistryConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Whitespace cannot separate path segments.
    WhitespaceSeparator(char),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhitespaceSeparator(c) => {
                write!(f, "invalid path separator {c:?}: whitespace is not allowed")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
