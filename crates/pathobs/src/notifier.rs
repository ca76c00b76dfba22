#![forbid(unsafe_code)]

//! Ordered, re-entrancy safe subscriber list.
//!
//! [`Notifier<E>`] is the event capability shared by every observer and by
//! the registry's global feed. It is owned by composition rather than mixed
//! into the types that emit.
//!
//! # Invariants
//!
//! 1. Subscribers are called in registration order.
//! 2. [`emit`](Notifier::emit) snapshots the list first, so a callback may
//!    subscribe, unsubscribe, or emit again without a borrow panic.
//! 3. A subscriber added during an emit is not called by that emit.
//! 4. A subscriber removed during an emit is skipped if it has not run yet.
//! 5. Ids are never reused, so a stale id cannot remove a newer callback.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Callback<E> = Rc<dyn Fn(&E)>;

/// Handle identifying one subscription on one [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// A list of callbacks fired with a shared event payload.
pub struct Notifier<E> {
    subscribers: RefCell<Vec<(SubscriberId, Callback<E>)>>,
    next_id: Cell<u64>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriber_count", &self.len())
            .finish()
    }
}

impl<E> Notifier<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it stays until unsubscribed or cleared.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove the callback registered under `id`. Returns `false` if it was
    /// already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        match subs.iter().position(|(sid, _)| *sid == id) {
            Some(index) => {
                subs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every callback.
    pub fn clear(&self) {
        // Take the list out first: dropping a callback may drop captured
        // handles that reach back into this notifier.
        let removed = std::mem::take(&mut *self.subscribers.borrow_mut());
        drop(removed);
    }

    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.borrow().iter().any(|(sid, _)| *sid == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }

    /// Call every live subscriber with `event`. Returns how many ran.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(SubscriberId, Callback<E>)> = self.subscribers.borrow().clone();
        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.contains(id) {
                continue;
            }
            callback(event);
            delivered += 1;
        }
        delivered
    }
}
