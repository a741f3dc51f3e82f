//! Reduced-motion preference as a subscribable signal.
//!
//! The host owns one signal (fed from its `prefers-reduced-motion` query) and hands
//! clones to galleries. Each video controller subscribes on its own and drops its
//! [`Subscription`] on teardown.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

type Listener = Rc<dyn Fn(bool)>;

struct SignalInner {
    value: bool,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Clone)]
pub struct ReducedMotionSignal {
    inner: Rc<RefCell<SignalInner>>,
}

impl ReducedMotionSignal {
    pub fn new(initial: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value: initial,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> bool {
        self.inner.borrow().value
    }

    /// Updates the preference and notifies subscribers if it changed.
    ///
    /// Listeners run with no borrow held, so they may subscribe, unsubscribe or read the
    /// signal. A listener dropped by an earlier listener in the same round is skipped.
    pub fn set(&self, value: bool) {
        let snapshot: Vec<(u64, Listener)> = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.listeners.clone()
        };

        debug!(reduced = value, listeners = snapshot.len(), "Reduced-motion preference changed");
        for (id, listener) in snapshot {
            let still_registered = self
                .inner
                .borrow()
                .listeners
                .iter()
                .any(|(registered, _)| *registered == id);
            if still_registered {
                listener(value);
            }
        }
    }

    pub fn subscribe(&self, listener: impl Fn(bool) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let listener: Listener = Rc::new(listener);
        inner.listeners.push((id, listener));
        Subscription {
            id,
            signal: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl Default for ReducedMotionSignal {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ReducedMotionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReducedMotionSignal")
            .field("value", &inner.value)
            .field("subscribers", &inner.listeners.len())
            .finish()
    }
}

/// Unsubscribes its listener when dropped.
pub struct Subscription {
    id: u64,
    signal: Weak<RefCell<SignalInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner
                .borrow_mut()
                .listeners
                .retain(|(registered, _)| *registered != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
