#![forbid(unsafe_code)]

//! A single path-keyed observer.
//!
//! # Design
//!
//! [`PathObserver`] is a cheap-clone handle (`Rc`) to one path string. It
//! never caches the value: every read resolves the path against the shared
//! root. Writes go through [`set`](PathObserver::set):
//!
//! 1. A plain-object value is decomposed: each key `k` is written through
//!    the observer for `path.k`, recursively. The parent path is never
//!    overwritten wholesale and never fires itself.
//! 2. Any other value is compared to the current one with
//!    [`strict_eq`]. Equal scalars are a no-op. Arrays always differ.
//! 3. Otherwise the value is written and a [`Change`] fires on this
//!    observer's subscribers, then on the registry's global feed.
//!
//! Ancestors are not notified when a descendant changes; descendants are not
//! notified when an ancestor is replaced by a non-object.
//!
//! # Failure Modes
//!
//! - **Disposed observer**: `set` and `change` return
//!   [`ObserveError::Disposed`].
//! - **Registry gone**: `set` returns [`ObserveError::RegistryDropped`].
//! - **Key-path failure**: surfaced unchanged as [`ObserveError::KeyPath`].
//!   A decomposed write stops at the first failing key; earlier keys stay
//!   written and their events have already fired.
//! - **Root borrowed**: calling `set` from inside
//!   [`with_value`](PathObserver::with_value) panics (RefCell borrow rules).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use pathobs_keypath::{Kind, join, strict_eq};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::notifier::{Notifier, SubscriberId};
use crate::registry::{Registry, RegistryInner};
use crate::{Change, ObserveError};

struct ObserverInner {
    path: String,
    separator: char,
    root: Rc<RefCell<Value>>,
    registry: Weak<RegistryInner>,
    notifier: Notifier<Change>,
    disposed: Cell<bool>,
}

/// Observer for the value at one path of a registry's root object.
///
/// Obtain one through [`Registry::get_or_create`]. Cloning yields another
/// handle to the **same** observer.
#[derive(Clone)]
pub struct PathObserver {
    inner: Rc<ObserverInner>,
}

impl PathObserver {
    pub(crate) fn new(path: String, registry: &Rc<RegistryInner>) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                path,
                separator: registry.config.separator,
                root: Rc::clone(&registry.root),
                registry: Rc::downgrade(registry),
                notifier: Notifier::new(),
                disposed: Cell::new(false),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Current value at the path, or `None` if it does not resolve.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.with_value(|value| value.cloned())
    }

    /// Inspect the current value without cloning it.
    ///
    /// The root is borrowed for the duration of `f`.
    pub fn with_value<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let root = self.inner.root.borrow();
        f(pathobs_keypath::get(&root, &self.inner.path, self.inner.separator))
    }

    /// Write `value` at the path, notifying subscribers of actual changes.
    pub fn set(&self, value: Value) -> Result<(), ObserveError> {
        self.ensure_live()?;
        let registry = self.registry()?;
        match value {
            Value::Object(entries) => self.decompose(&registry, entries),
            value => self.assign(&registry, value),
        }
    }

    /// Subscribe to changes at this path.
    pub fn change(
        &self,
        callback: impl Fn(&Change) + 'static,
    ) -> Result<Unsubscribe, ObserveError> {
        self.ensure_live()?;
        let id = self.inner.notifier.subscribe(callback);
        Ok(Unsubscribe {
            observer: Rc::downgrade(&self.inner),
            id,
        })
    }

    /// Drop all subscribers and evict this observer from its registry.
    ///
    /// Safe to call more than once. A later `get_or_create` for the same
    /// path yields a fresh observer.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let dropped = self.inner.notifier.len();
        self.inner.notifier.clear();
        if let Some(registry) = self.inner.registry.upgrade() {
            Registry::from_inner(registry).evict(self);
        }
        debug!(path = %self.inner.path, subscribers = dropped, "observer disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.notifier.len()
    }

    /// True if both handles refer to the same observer.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    fn ensure_live(&self) -> Result<(), ObserveError> {
        if self.is_disposed() {
            return Err(ObserveError::Disposed {
                path: self.inner.path.clone(),
            });
        }
        Ok(())
    }

    fn registry(&self) -> Result<Registry, ObserveError> {
        self.inner
            .registry
            .upgrade()
            .map(Registry::from_inner)
            .ok_or_else(|| ObserveError::RegistryDropped {
                path: self.inner.path.clone(),
            })
    }

    fn decompose(&self, registry: &Registry, entries: Map<String, Value>) -> Result<(), ObserveError> {
        trace!(path = %self.inner.path, keys = entries.len(), "decomposing object write");
        for (key, child) in entries {
            let child_path = join(&self.inner.path, &key, self.inner.separator);
            registry.get_or_create(&child_path).set(child)?;
        }
        Ok(())
    }

    fn assign(&self, registry: &Registry, value: Value) -> Result<(), ObserveError> {
        let previous = self.value();
        if previous
            .as_ref()
            .is_some_and(|current| strict_eq(current, &value))
        {
            trace!(path = %self.inner.path, "unchanged, skipping");
            return Ok(());
        }

        self.write(value.clone())?;

        let change = Change {
            path: self.inner.path.clone(),
            value,
            previous,
        };
        let local = self.inner.notifier.emit(&change);
        let global = registry.broadcast(&change);
        trace!(
            path = %self.inner.path,
            kind = Kind::of(&change.value).as_str(),
            local,
            global,
            "change emitted"
        );
        Ok(())
    }

    fn write(&self, value: Value) -> Result<(), ObserveError> {
        let mut root = self.inner.root.borrow_mut();
        pathobs_keypath::set(&mut root, &self.inner.path, self.inner.separator, value)?;
        Ok(())
    }
}

impl fmt::Debug for PathObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathObserver")
            .field("path", &self.inner.path)
            .field("subscriber_count", &self.inner.notifier.len())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

/// Removes exactly one callback registered with [`PathObserver::change`].
///
/// Dropping an `Unsubscribe` does nothing; the callback stays until
/// [`unsubscribe`](Unsubscribe::unsubscribe) is called or the observer is
/// disposed. Use [`into_guard`](Unsubscribe::into_guard) for drop-based
/// removal.
pub struct Unsubscribe {
    observer: Weak<ObserverInner>,
    id: SubscriberId,
}

impl Unsubscribe {
    /// Remove the callback. Returns `false` if it was already removed, the
    /// observer was disposed, or the observer no longer exists.
    pub fn unsubscribe(&self) -> bool {
        self.observer
            .upgrade()
            .is_some_and(|inner| inner.notifier.unsubscribe(self.id))
    }

    /// Convert into a guard that unsubscribes when dropped.
    #[must_use]
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { handle: self }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// RAII guard for a change callback.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    handle: Unsubscribe,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind;
    use serde_json::json;
    use tracing_test::traced_test;

    fn registry() -> Registry {
        bind(Rc::new(RefCell::new(json!({
            "foo": "bar",
            "bar": [1, 2, 3],
            "baz": { "foo": { "foo": "bar" } }
        }))))
    }

    fn counter(observer: &PathObserver) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        observer
            .change(move |_| c.set(c.get() + 1))
            .unwrap();
        count
    }

    #[test]
    fn reads_are_live() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        assert_eq!(foo.value(), Some(json!("bar")));

        reg.root().borrow_mut()["foo"] = json!("direct");
        assert_eq!(foo.value(), Some(json!("direct")));
    }

    #[test]
    fn with_value_borrows() {
        let reg = registry();
        let bar = reg.get_or_create("bar");
        let len = bar.with_value(|v| v.and_then(Value::as_array).map(Vec::len));
        assert_eq!(len, Some(3));
    }

    #[test]
    fn change_payload_carries_previous() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        foo.change(move |c| s.borrow_mut().push(c.clone())).unwrap();

        foo.set(json!("baz")).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![Change {
                path: "foo".into(),
                value: json!("baz"),
                previous: Some(json!("bar")),
            }]
        );
    }

    #[test]
    fn new_path_reports_insert() {
        let reg = registry();
        let fresh = reg.get_or_create("brand.new");
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        fresh.change(move |c| *s.borrow_mut() = Some(c.is_insert())).unwrap();

        fresh.set(json!(1)).unwrap();
        assert_eq!(*seen.borrow(), Some(true));
        assert_eq!(reg.root().borrow()["brand"]["new"], json!(1));
    }

    #[test]
    fn null_over_missing_fires() {
        let reg = registry();
        let missing = reg.get_or_create("missing");
        let count = counter(&missing);
        missing.set(Value::Null).unwrap();
        assert_eq!(count.get(), 1);
        missing.set(Value::Null).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn numeric_equality_is_by_value() {
        let root = Rc::new(RefCell::new(json!({ "n": 1 })));
        let reg = bind(root);
        let n = reg.get_or_create("n");
        let count = counter(&n);
        n.set(json!(1.0)).unwrap();
        assert_eq!(count.get(), 0);
        n.set(json!(2)).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_twice_is_harmless() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let kept = counter(&foo);
        let dropped = Rc::new(Cell::new(0u32));
        let d = Rc::clone(&dropped);
        let handle = foo.change(move |_| d.set(d.get() + 1)).unwrap();

        assert!(handle.unsubscribe());
        assert!(!handle.unsubscribe());

        foo.set(json!("baz")).unwrap();
        assert_eq!(dropped.get(), 0);
        assert_eq!(kept.get(), 1);
    }

    #[test]
    fn guard_unsubscribes_on_drop() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let guard = foo.change(move |_| h.set(h.get() + 1)).unwrap().into_guard();

        foo.set(json!(1)).unwrap();
        drop(guard);
        foo.set(json!(2)).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(foo.subscriber_count(), 0);
    }

    #[test]
    fn set_after_dispose_fails_fast() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        foo.dispose();

        assert_eq!(
            foo.set(json!("baz")),
            Err(ObserveError::Disposed { path: "foo".into() })
        );
        assert!(matches!(
            foo.change(|_| {}),
            Err(ObserveError::Disposed { .. })
        ));
        // Nothing was written, nothing was resurrected.
        assert_eq!(reg.root().borrow()["foo"], json!("bar"));
        assert!(!reg.contains("foo"));
    }

    #[test]
    fn dispose_twice_is_noop() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        foo.dispose();
        foo.dispose();
        assert!(foo.is_disposed());
    }

    #[test]
    fn stale_dispose_keeps_replacement() {
        let reg = registry();
        let old = reg.get_or_create("foo");
        old.dispose();
        let fresh = reg.get_or_create("foo");
        assert!(!PathObserver::ptr_eq(&old, &fresh));

        old.dispose();
        assert!(reg.contains("foo"));
        assert!(PathObserver::ptr_eq(&fresh, &reg.get_or_create("foo")));
    }

    #[test]
    fn fresh_observer_forgets_subscribers() {
        let reg = registry();
        let old = reg.get_or_create("foo");
        let count = counter(&old);
        old.dispose();

        let fresh = reg.get_or_create("foo");
        assert_eq!(fresh.subscriber_count(), 0);
        fresh.set(json!("baz")).unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn set_after_registry_dropped() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        drop(reg);
        assert_eq!(
            foo.set(json!(1)),
            Err(ObserveError::RegistryDropped { path: "foo".into() })
        );
        // Reads still work: the observer holds its own root handle.
        assert_eq!(foo.value(), Some(json!("bar")));
    }

    #[test]
    fn key_path_errors_surface() {
        let reg = registry();
        let bad = reg.get_or_create("foo.inner");
        let err = bad.set(json!(1)).unwrap_err();
        assert!(matches!(err, ObserveError::KeyPath(_)));

        let empty = reg.get_or_create("");
        assert!(matches!(
            empty.set(json!(1)),
            Err(ObserveError::KeyPath(pathobs_keypath::KeyPathError::EmptySegment { .. }))
        ));
    }

    #[test]
    fn reentrant_set_from_callback() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let mirror = reg.get_or_create("mirror");
        let mirrored = counter(&mirror);

        let target = mirror.clone();
        foo.change(move |c| {
            target.set(c.value.clone()).unwrap();
        })
        .unwrap();

        foo.set(json!("baz")).unwrap();
        assert_eq!(mirror.value(), Some(json!("baz")));
        assert_eq!(mirrored.get(), 1);
    }

    #[test]
    fn dispose_from_callback() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let me = foo.clone();
        foo.change(move |_| me.dispose()).unwrap();

        foo.set(json!("baz")).unwrap();
        assert!(foo.is_disposed());
        assert!(!reg.contains("foo"));
        assert_eq!(reg.root().borrow()["foo"], json!("baz"));
    }

    #[traced_test]
    #[test]
    fn lifecycle_is_logged() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        foo.set(json!("bar")).unwrap();
        foo.set(json!("baz")).unwrap();
        foo.dispose();

        assert!(logs_contain("observer created"));
        assert!(logs_contain("unchanged, skipping"));
        assert!(logs_contain("change emitted"));
        assert!(logs_contain("observer disposed"));
    }

    #[test]
    fn debug_format() {
        let reg = registry();
        let foo = reg.get_or_create("foo");
        let dbg = format!("{foo:?}");
        assert!(dbg.contains("PathObserver"));
        assert!(dbg.contains("\"foo\""));
        assert!(dbg.contains("disposed: false"));
    }
}
