//! # Tikiti Core
//!
//! Core traits and types shared by the Tikiti marketplace crates.
//!
//! The marketplace follows a small Reducer architecture:
//!
//! - **State**: Domain state for a feature (a cart, a tier wizard)
//! - **Action**: All possible inputs to a reducer
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions, executed by the runtime `Store`
//! - **Environment**: Injected dependencies (clock, key-value storage)
//!
//! Everything here is synchronous. A reducer runs inside a single UI turn, the
//! store executes the returned effects in order and then notifies its
//! subscribers before `send` returns.
//!
//! ## Example
//!
//! ```
//! use tikiti_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct CounterState {
//!     count: u32,
//! }
//!
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! CounterReducer.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.count, 1);
//! ```

pub mod observer;

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values returned from reducers, not executed by them.
pub mod effect {
    use std::fmt;

    /// A deferred synchronous side effect.
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer.
    pub type Task<Action> = Box<dyn FnOnce() -> Option<Action>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed by the reducer. The `Store` runs them, in
    /// order, right after the reducer returns.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run a synchronous task (storage write, hand-off to a port)
        Run(Task<Action>),
    }

    // Manual Debug implementation since closures don't implement Debug
    impl<Action> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Run(_) => write!(f, "Effect::Run(<task>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap a closure as an `Effect::Run`
        #[must_use]
        pub fn run<F>(task: F) -> Self
        where
            F: FnOnce() -> Option<Action> + 'static,
        {
            Effect::Run(Box::new(task))
        }

        /// Returns `true` if this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Execute the effect, returning the action it fed back, if any
        pub fn execute(self) -> Option<Action> {
            match self {
                Effect::None => None,
                Effect::Run(task) => task(),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Errors raised by a [`KeyValueStore`] implementation
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StorageError {
        /// The backing store rejected a write (quota, permissions)
        #[error("write to key '{key}' failed: {reason}")]
        WriteFailed {
            /// Key being written
            key: String,
            /// Store-specific reason
            reason: String,
        },

        /// The backing store is not reachable at all
        #[error("storage unavailable: {0}")]
        Unavailable(String),
    }

    /// Key-value persistence port (browser local storage in the web client)
    ///
    /// The store is an untrusted, externally mutable substrate: values read
    /// back may have been edited by someone else and must be validated by
    /// the caller.
    pub trait KeyValueStore: Send + Sync {
        /// Read the value stored under `key`
        fn get(&self, key: &str) -> Option<String>;

        /// Overwrite the value stored under `key`
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the backing store rejects the write.
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

        /// Remove `key` entirely
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the backing store rejects the removal.
        fn delete(&self, key: &str) -> Result<(), StorageError>;
    }
}
