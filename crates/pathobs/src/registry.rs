#![forbid(unsafe_code)]

//! Per-root cache of path observers and the global change feed.
//!
//! # Invariants
//!
//! 1. At most one live [`PathObserver`] exists per path string; repeated
//!    [`get_or_create`](Registry::get_or_create) calls return the identical
//!    instance.
//! 2. Paths are flat, independent entries. Ancestry (`"baz"` above
//!    `"baz.foo"`) is only derived when an object write is decomposed.
//! 3. [`dispose_all`](Registry::dispose_all) disposes every cached observer
//!    exactly once and drops all global listeners.
//!
//! # Ownership
//!
//! The registry owns its observers; each observer holds only a weak link
//! back. Callbacks that capture a `Registry` clone form a cycle that lives
//! until the callback is removed or the registry is disposed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::notifier::{Notifier, SubscriberId};
use crate::{Change, ConfigError, PathObserver, RegistryConfig};

/// Shared state behind a [`Registry`] handle.
pub(crate) struct RegistryInner {
    pub(crate) root: Rc<RefCell<Value>>,
    pub(crate) config: RegistryConfig,
    pub(crate) cache: RefCell<HashMap<String, PathObserver>>,
    pub(crate) global: Notifier<Change>,
}

/// Handle to the observer cache for one root object.
///
/// Cloning a `Registry` creates a new handle to the **same** cache.
#[derive(Clone)]
pub struct Registry {
    pub(crate) inner: Rc<RegistryInner>,
}

/// Bind a registry to `root` with the default configuration.
#[must_use]
pub fn bind(root: Rc<RefCell<Value>>) -> Registry {
    Registry::with_validated_config(root, RegistryConfig::default())
}

/// Bind a registry to `root` with `config`.
pub fn bind_with_config(
    root: Rc<RefCell<Value>>,
    config: RegistryConfig,
) -> Result<Registry, ConfigError> {
    config.validate()?;
    Ok(Registry::with_validated_config(root, config))
}

impl Registry {
    fn with_validated_config(root: Rc<RefCell<Value>>, config: RegistryConfig) -> Self {
        debug!(separator = %config.separator, global_feed = config.global_feed, "registry bound");
        Self {
            inner: Rc::new(RegistryInner {
                root,
                config,
                cache: RefCell::new(HashMap::new()),
                global: Notifier::new(),
            }),
        }
    }

    /// Return the observer for `path`, creating and caching it on first use.
    pub fn get_or_create(&self, path: &str) -> PathObserver {
        if let Some(existing) = self.inner.cache.borrow().get(path) {
            return existing.clone();
        }
        let observer = PathObserver::new(path.to_owned(), &self.inner);
        self.inner
            .cache
            .borrow_mut()
            .insert(path.to_owned(), observer.clone());
        debug!(path, "observer created");
        observer
    }

    /// Dispose every cached observer and drop all global listeners.
    pub fn dispose_all(&self) {
        let observers: Vec<PathObserver> = self
            .inner
            .cache
            .borrow_mut()
            .drain()
            .map(|(_, observer)| observer)
            .collect();
        for observer in &observers {
            observer.dispose();
        }
        self.inner.global.clear();
        debug!(count = observers.len(), "registry disposed");
    }

    /// Subscribe to every change fired by any observer of this registry.
    pub fn on_change(&self, callback: impl Fn(&Change) + 'static) -> SubscriberId {
        self.inner.global.subscribe(callback)
    }

    /// Remove a global listener. Returns `false` if it was already gone.
    pub fn off_change(&self, id: SubscriberId) -> bool {
        self.inner.global.unsubscribe(id)
    }

    /// Number of global listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.global.len()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.inner.cache.borrow().contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.cache.borrow().is_empty()
    }

    /// Cached paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.inner.cache.borrow().keys().cloned().collect();
        paths.sort_unstable();
        paths
    }

    /// The shared root object. Writes made through it directly bypass all
    /// observers.
    #[must_use]
    pub fn root(&self) -> &Rc<RefCell<Value>> {
        &self.inner.root
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// True if both handles share the same cache.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn from_inner(inner: Rc<RegistryInner>) -> Self {
        Self { inner }
    }

    /// Re-emit `change` on the global feed. Returns how many listeners ran.
    pub(crate) fn broadcast(&self, change: &Change) -> usize {
        if self.inner.config.global_feed {
            self.inner.global.emit(change)
        } else {
            0
        }
    }

    /// Evict `observer` if it is the cached entry for its path.
    pub(crate) fn evict(&self, observer: &PathObserver) {
        let removed = {
            let mut cache = self.inner.cache.borrow_mut();
            let cached = cache
                .get(observer.path())
                .is_some_and(|entry| PathObserver::ptr_eq(entry, observer));
            if cached {
                cache.remove(observer.path())
            } else {
                None
            }
        };
        drop(removed);
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("paths", &self.paths())
            .field("listener_count", &self.listener_count())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
