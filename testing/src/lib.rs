//! # Tikiti Testing
//!
//! Testing utilities and helpers for the Tikiti marketplace.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use tikiti_testing::{mocks::InMemoryKeyValueStore, ReducerTest};
//!
//! ReducerTest::new(CartReducer::new())
//!     .with_env(CartEnvironment::new(Arc::new(InMemoryKeyValueStore::new()), "cart"))
//!     .given_state(CartState::default())
//!     .when_action(CartAction::Clear)
//!     .then_state(|state| assert!(state.is_empty()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tikiti_core::environment::Clock;

pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};
    use tikiti_core::environment::{KeyValueStore, StorageError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tikiti_testing::mocks::FixedClock;
    /// use tikiti_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory key-value store standing in for browser local storage
    ///
    /// Clones share the same data, so a test can keep a handle while the
    /// code under test owns another. Writes can be made to fail with
    /// [`InMemoryKeyValueStore::fail_writes`].
    ///
    /// # Example
    ///
    /// ```
    /// use tikiti_testing::mocks::InMemoryKeyValueStore;
    /// use tikiti_core::environment::KeyValueStore;
    ///
    /// let store = InMemoryKeyValueStore::new();
    /// store.set("cart", "[]").unwrap();
    /// assert_eq!(store.get("cart").as_deref(), Some("[]"));
    /// ```
    #[derive(Clone, Debug, Default)]
    pub struct InMemoryKeyValueStore {
        data: Arc<RwLock<HashMap<String, String>>>,
        failing: Arc<AtomicBool>,
        writes: Arc<AtomicUsize>,
    }

    #[allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
    impl InMemoryKeyValueStore {
        /// Create a new empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-populated with one entry
        #[must_use]
        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::new();
            store
                .data
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }

        /// Make every subsequent `set`/`delete` fail (or succeed again)
        pub fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Check whether a key is present
        #[must_use]
        pub fn contains(&self, key: &str) -> bool {
            self.data.read().unwrap().contains_key(key)
        }

        /// Number of successful `set`/`delete` calls so far
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
    impl KeyValueStore for InMemoryKeyValueStore {
        fn get(&self, key: &str) -> Option<String> {
            self.data.read().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::WriteFailed {
                    key: key.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.data
                .write()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::WriteFailed {
                    key: key.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.data.write().unwrap().remove(key);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, InMemoryKeyValueStore};
