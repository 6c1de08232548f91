//! # Tikiti Runtime
//!
//! Runtime implementation for the Tikiti reducer architecture.
//!
//! This crate provides the [`Store`] which drives a reducer:
//!
//! 1. Reduce the action into the state
//! 2. Execute the returned effects, in order
//! 3. Feed any actions produced by effects back into the reducer
//! 4. Notify subscribers with the resulting state
//!
//! All of this happens synchronously inside [`Store::send`]. There is no
//! background task, no queue that outlives the call and no locking: the
//! store lives on the thread of control that owns it.

use std::collections::VecDeque;

use tikiti_core::observer::{Subscribers, Subscription};
use tikiti_core::reducer::Reducer;

/// Upper bound on feedback actions processed by a single `send`
///
/// A reducer/effect pair that keeps feeding actions back forever is a bug;
/// the store logs it and stops instead of spinning.
pub const MAX_FEEDBACK_ACTIONS: usize = 64;

/// The Store - runtime coordinator for a reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let mut store = Store::new(CartState::default(), CartReducer::new(), env);
/// let _subscription = store.subscribe(|state| println!("{} lines", state.lines.len()));
/// store.send(CartAction::Clear);
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    subscribers: Subscribers<S>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            subscribers: Subscribers::new(),
        }
    }

    /// Send an action to the store
    ///
    /// Runs the reducer, executes its effects, processes feedback actions and
    /// finally notifies every subscriber once with the resulting state.
    /// Returns the number of actions reduced (the initial one included).
    pub fn send(&mut self, action: A) -> usize {
        let mut pending = VecDeque::from([action]);
        let mut processed = 0;

        while let Some(next) = pending.pop_front() {
            if processed > MAX_FEEDBACK_ACTIONS {
                tracing::error!(
                    dropped = pending.len() + 1,
                    "Feedback action limit reached, dropping remaining actions"
                );
                break;
            }

            let effects = self.reducer.reduce(&mut self.state, next, &self.environment);
            processed += 1;

            for effect in effects {
                pending.extend(effect.execute());
            }
        }

        tracing::trace!(processed, subscribers = self.subscribers.len(), "Store send complete");
        self.subscribers.notify(&self.state);
        processed
    }

    /// Read the current state through a closure
    pub fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state)
    }

    /// Borrow the injected environment
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Register a listener notified after every `send`
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&S) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
