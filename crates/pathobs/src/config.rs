#![forbid(unsafe_code)]

//! Registry configuration.

use pathobs_keypath::DEFAULT_SEPARATOR;

use crate::ConfigError;

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Character separating path segments.
    pub separator: char,
    /// Whether observer changes are re-emitted on the registry's global feed.
    pub global_feed: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            global_feed: true,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    #[must_use]
    pub fn with_global_feed(mut self, enabled: bool) -> Self {
        self.global_feed = enabled;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.is_whitespace() {
            return Err(ConfigError::WhitespaceSeparator(self.separator));
        }
        Ok(())
    }
}
