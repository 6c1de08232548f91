//! Synchronous publish/subscribe channel.
//!
//! [`Subscribers`] fans a value out to every registered listener on the same
//! call stack as the mutation that produced it, so observers always see a
//! consistent snapshot. Listeners are detached through the [`Subscription`]
//! handle returned by [`Subscribers::subscribe`].
//!
//! The channel is single-threaded (`Rc`/`RefCell`). A listener may
//! unsubscribe itself or other listeners while a notification is running;
//! detached listeners are skipped for the rest of that round.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }

    fn remove(&mut self, id: u64) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Set of listeners notified synchronously with `&T`
pub struct Subscribers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Subscribers<T> {
    /// Create an empty subscriber set
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            let listener: Listener<T> = Rc::new(RefCell::new(listener));
            registry.listeners.push((id, listener));
            id
        };

        let registry: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `value` to every registered listener, in registration order
    ///
    /// A listener that is already running (re-entrant notification) is
    /// skipped rather than borrowed twice.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<(u64, Listener<T>)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in listeners {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (&mut *callback)(value);
            }
        }
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Returns `true` if nobody is listening
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.registry.borrow().listeners.len())
            .finish()
    }
}

/// Handle that keeps a listener registered
///
/// Dropping the handle unsubscribes the listener. Use [`Subscription::forget`]
/// to keep a listener for the lifetime of the channel.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Detach the listener now
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Keep the listener registered for as long as the channel lives
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
