//! Shopping cart aggregate.
//!
//! The cart holds at most one [`CartLine`] per `(event, ticket type)` and never
//! a line with quantity zero. Every mutation overwrites the whole persisted
//! record through the injected [`KeyValueStore`] and then notifies
//! subscribers with the new snapshot, all before the call returns.
//!
//! The persisted record is untrusted: anything that does not parse as a cart
//! is discarded and the cart starts empty.

use crate::types::{CartLine, EventId, Money, TicketType};
use std::sync::Arc;
use tikiti_core::{
    effect::Effect,
    environment::{KeyValueStore, StorageError},
    observer::Subscription,
    reducer::Reducer,
    smallvec, SmallVec,
};
use tikiti_runtime::Store;

// ============================================================================
// State
// ============================================================================

/// Current cart contents
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartState {
    lines: Vec<CartLine>,
    /// Last storage failure, cleared by the next mutation
    pub storage_error: Option<String>,
}

impl CartState {
    /// Creates an empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart by replaying `lines` as successive upserts
    ///
    /// Zero-quantity lines are dropped and a repeated key takes the later
    /// quantity, so the result always satisfies the cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut state = Self::new();
        for line in lines {
            state.upsert(line);
        }
        state
    }

    /// Restores a cart from its persisted JSON record
    ///
    /// A missing record gives an empty cart. So does a record that does not
    /// parse, which is logged and otherwise ignored.
    #[must_use]
    pub fn restore(key: &str, raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::new();
        };

        match serde_json::from_str::<Vec<CartLine>>(raw) {
            Ok(lines) => {
                let stored = lines.len();
                let state = Self::from_lines(lines);
                if state.lines.len() != stored {
                    tracing::debug!(key, stored, kept = state.lines.len(), "Normalised persisted cart");
                }
                state
            },
            Err(error) => {
                tracing::warn!(key, error = %error, "Persisted cart is unreadable, starting empty");
                Self::new()
            },
        }
    }

    /// Lines in insertion order
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for `(event_id, ticket_type)`
    #[must_use]
    pub fn line(&self, event_id: EventId, ticket_type: &TicketType) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(event_id, ticket_type))
    }

    /// Returns `true` if the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `Σ quantity` over all lines
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |total, line| total.saturating_add(line.quantity))
    }

    /// `Σ unit_price × quantity` over all lines
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines belonging to one event, in cart order
    #[must_use]
    pub fn lines_for_event(&self, event_id: EventId) -> Vec<CartLine> {
        self.lines
            .iter()
            .filter(|line| line.event_id == event_id)
            .cloned()
            .collect()
    }

    /// Distinct events in the cart, in order of first appearance
    #[must_use]
    pub fn event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = Vec::new();
        for line in &self.lines {
            if !ids.contains(&line.event_id) {
                ids.push(line.event_id);
            }
        }
        ids
    }

    fn position(&self, event_id: EventId, ticket_type: &TicketType) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.matches(event_id, ticket_type))
    }

    fn upsert(&mut self, line: CartLine) {
        match (self.position(line.event_id, &line.ticket_type), line.quantity) {
            (Some(index), 0) => {
                self.lines.remove(index);
            },
            (Some(index), quantity) => self.lines[index].quantity = quantity,
            (None, 0) => {},
            (None, _) => self.lines.push(line),
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to the cart reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartAction {
    /// Insert a line, or replace the quantity of the stored line with the
    /// same key
    ///
    /// The stored name and price are kept. A quantity of zero removes the line.
    AddOrUpdate(CartLine),

    /// Change the quantity of an existing line (0 removes it)
    UpdateQuantity {
        /// Event of the line
        event_id: EventId,
        /// Tier of the line
        ticket_type: TicketType,
        /// New quantity
        quantity: u32,
    },

    /// Remove a line if present
    Remove {
        /// Event of the line
        event_id: EventId,
        /// Tier of the line
        ticket_type: TicketType,
    },

    /// Empty the cart and delete the persisted record
    Clear,

    /// Fed back when the storage port rejected a write
    PersistFailed {
        /// Port error
        error: StorageError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the cart reducer
#[derive(Clone)]
pub struct CartEnvironment {
    /// Key-value port holding the persisted record
    pub storage: Arc<dyn KeyValueStore>,
    /// Key of the persisted record
    pub storage_key: String,
}

impl CartEnvironment {
    /// Creates a new `CartEnvironment`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
        }
    }
}

impl std::fmt::Debug for CartEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEnvironment")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the shopping cart
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect overwriting the persisted record with the current lines
    fn persist(state: &CartState, env: &CartEnvironment) -> Effect<CartAction> {
        let payload = match serde_json::to_string(&state.lines) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(key = %env.storage_key, error = %error, "Failed to serialize cart");
                return Effect::None;
            },
        };

        let storage = Arc::clone(&env.storage);
        let key = env.storage_key.clone();
        let lines = state.lines.len();
        Effect::run(move || match storage.set(&key, &payload) {
            Ok(()) => {
                tracing::trace!(key = %key, lines, "Cart persisted");
                None
            },
            Err(error) => Some(CartAction::PersistFailed { error }),
        })
    }

    /// Effect deleting the persisted record
    fn forget(env: &CartEnvironment) -> Effect<CartAction> {
        let storage = Arc::clone(&env.storage);
        let key = env.storage_key.clone();
        Effect::run(move || storage.delete(&key).err().map(|error| CartAction::PersistFailed { error }))
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CartAction::AddOrUpdate(line) => {
                tracing::debug!(
                    event_id = %line.event_id,
                    ticket_type = %line.ticket_type,
                    quantity = line.quantity,
                    "Cart line set"
                );
                state.storage_error = None;
                state.upsert(line);
                smallvec![Self::persist(state, env)]
            },

            CartAction::UpdateQuantity {
                event_id,
                ticket_type,
                quantity,
            } => {
                let Some(index) = state.position(event_id, &ticket_type) else {
                    tracing::debug!(event_id = %event_id, ticket_type = %ticket_type, "No cart line to update");
                    return SmallVec::new();
                };

                tracing::debug!(event_id = %event_id, ticket_type = %ticket_type, quantity, "Cart quantity updated");
                state.storage_error = None;
                if quantity == 0 {
                    state.lines.remove(index);
                } else {
                    state.lines[index].quantity = quantity;
                }
                smallvec![Self::persist(state, env)]
            },

            CartAction::Remove {
                event_id,
                ticket_type,
            } => {
                tracing::debug!(event_id = %event_id, ticket_type = %ticket_type, "Cart line removed");
                state.storage_error = None;
                state.lines.retain(|line| !line.matches(event_id, &ticket_type));
                smallvec![Self::persist(state, env)]
            },

            CartAction::Clear => {
                tracing::debug!(lines = state.lines.len(), "Cart cleared");
                state.storage_error = None;
                state.lines.clear();
                smallvec![Self::forget(env)]
            },

            CartAction::PersistFailed { error } => {
                tracing::warn!(key = %env.storage_key, error = %error, "Cart not persisted, keeping in-memory state");
                state.storage_error = Some(error.to_string());
                SmallVec::new()
            },
        }
    }
}

// ============================================================================
// Cart
// ============================================================================

/// Store-backed shopping cart
///
/// Owns the reducer store; callers construct one per session and pass it
/// to the views and services that need it.
pub struct Cart {
    store: Store<CartState, CartAction, CartEnvironment, CartReducer>,
}

impl Cart {
    /// Loads the cart from the environment's storage port
    #[must_use]
    pub fn load(environment: CartEnvironment) -> Self {
        let raw = environment.storage.get(&environment.storage_key);
        let state = CartState::restore(&environment.storage_key, raw.as_deref());
        Self {
            store: Store::new(state, CartReducer::new(), environment),
        }
    }

    /// Sends an action through the cart's store
    pub fn dispatch(&mut self, action: CartAction) {
        self.store.send(action);
    }

    /// Inserts `line` or replaces the quantity of the stored line with the same key
    pub fn add_or_update(&mut self, line: CartLine) {
        self.dispatch(CartAction::AddOrUpdate(line));
    }

    /// Changes the quantity of an existing line; 0 removes it
    pub fn update_quantity(&mut self, event_id: EventId, ticket_type: &TicketType, quantity: u32) {
        self.dispatch(CartAction::UpdateQuantity {
            event_id,
            ticket_type: ticket_type.clone(),
            quantity,
        });
    }

    /// Removes a line; absent lines are ignored
    pub fn remove(&mut self, event_id: EventId, ticket_type: &TicketType) {
        self.dispatch(CartAction::Remove {
            event_id,
            ticket_type: ticket_type.clone(),
        });
    }

    /// Empties the cart and deletes the persisted record
    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    /// Copy of the current lines
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.store.state(|state| state.lines.clone())
    }

    /// Total number of tickets
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.store.state(CartState::total_quantity)
    }

    /// Total price of all lines
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.store.state(CartState::total_price)
    }

    /// Lines for one event
    #[must_use]
    pub fn lines_for_event(&self, event_id: EventId) -> Vec<CartLine> {
        self.store.state(|state| state.lines_for_event(event_id))
    }

    /// Distinct events in the cart
    #[must_use]
    pub fn event_ids(&self) -> Vec<EventId> {
        self.store.state(CartState::event_ids)
    }

    /// Returns `true` if the cart is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.state(CartState::is_empty)
    }

    /// Last storage failure, if the most recent mutation was not persisted
    #[must_use]
    pub fn storage_error(&self) -> Option<String> {
        self.store.state(|state| state.storage_error.clone())
    }

    /// Registers a listener called with the new lines after every mutation
    pub fn subscribe<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(&[CartLine]) + 'static,
    {
        self.store.subscribe(move |state: &CartState| listener(state.lines()))
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.store
            .state(|state| f.debug_struct("Cart").field("lines", &state.lines).finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tikiti_testing::{assertions, InMemoryKeyValueStore, ReducerTest};

    const KEY: &str = "tikiti.cart";

    fn create_test_env(storage: &InMemoryKeyValueStore) -> CartEnvironment {
        CartEnvironment::new(Arc::new(storage.clone()), KEY)
    }

    fn line(event: u64, ticket_type: &str, quantity: u32, price: u64) -> CartLine {
        CartLine::new(
            EventId::new(event),
            format!("Event {event}"),
            ticket_type,
            quantity,
            Money::from_shillings(price),
        )
    }

    fn persisted(storage: &InMemoryKeyValueStore) -> Vec<CartLine> {
        serde_json::from_str(&storage.get(KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_add_line_returns_persist_effect() {
        let storage = InMemoryKeyValueStore::new();
        let handle = storage.clone();

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::new())
            .when_action(CartAction::AddOrUpdate(line(1, "VIP", 2, 5000)))
            .then_state(|state| {
                assert_eq!(state.lines().len(), 1);
                assert_eq!(state.total_quantity(), 2);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_run_effect(effects);
            })
            .then_feedback(move |feedback| {
                assert!(feedback.is_empty());
                assert_eq!(persisted(&handle), vec![line(1, "VIP", 2, 5000)]);
            })
            .run();
    }

    #[test]
    fn test_add_replaces_quantity_of_existing_line() {
        let storage = InMemoryKeyValueStore::new();

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::from_lines([line(1, "VIP", 2, 5000)]))
            .when_action(CartAction::AddOrUpdate(line(1, "VIP", 5, 5000)))
            .then_state(|state| {
                assert_eq!(state.lines().len(), 1);
                assert_eq!(state.total_quantity(), 5);
            })
            .run();
    }

    #[test]
    fn test_add_keeps_stored_name_and_price() {
        let storage = InMemoryKeyValueStore::new();

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::from_lines([line(1, "VIP", 2, 5000).with_name("Old")]))
            .when_action(CartAction::AddOrUpdate(line(1, "VIP", 3, 1).with_name("New")))
            .then_state(|state| {
                let stored = state.line(EventId::new(1), &TicketType::Vip).unwrap();
                assert_eq!(stored.quantity, 3);
                assert_eq!(stored.event_name, "Old");
                assert_eq!(stored.unit_price, Money::from_shillings(5000));
                assert_eq!(state.total_price(), Money::from_shillings(15000));
            })
            .run();
    }

    #[test]
    fn test_add_with_zero_quantity_removes_line() {
        let storage = InMemoryKeyValueStore::new();

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::from_lines([line(1, "VIP", 2, 5000), line(1, "ADVANCE", 1, 1500)]))
            .when_action(CartAction::AddOrUpdate(line(1, "VIP", 0, 5000)))
            .then_state(|state| {
                assert!(state.line(EventId::new(1), &TicketType::Vip).is_none());
                assert_eq!(state.lines().len(), 1);
            })
            .run();
    }

    #[test]
    fn test_update_quantity_of_missing_line_is_noop() {
        let storage = InMemoryKeyValueStore::new();

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::new())
            .when_action(CartAction::UpdateQuantity {
                event_id: EventId::new(1),
                ticket_type: TicketType::Vip,
                quantity: 3,
            })
            .then_state(|state| assert!(state.is_empty()))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn test_persist_failure_is_fed_back() {
        let storage = InMemoryKeyValueStore::new();
        storage.fail_writes(true);

        ReducerTest::new(CartReducer::new())
            .with_env(create_test_env(&storage))
            .given_state(CartState::new())
            .when_action(CartAction::AddOrUpdate(line(1, "VIP", 1, 100)))
            .then_feedback(|feedback| {
                assert!(matches!(feedback, [CartAction::PersistFailed { .. }]));
            })
            .run();
    }

    #[test]
    fn test_scenario_a_totals() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));

        cart.add_or_update(line(1, "VIP", 2, 5000));

        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total_price(), Money::from_shillings(10_000));
    }

    #[test]
    fn test_every_mutation_overwrites_persisted_record() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));

        cart.add_or_update(line(1, "VIP", 2, 5000));
        cart.add_or_update(line(1, "EARLY_BIRD", 4, 800));
        cart.update_quantity(EventId::new(1), &TicketType::Vip, 1);

        assert_eq!(
            persisted(&storage),
            vec![line(1, "VIP", 1, 5000), line(1, "EARLY_BIRD", 4, 800)]
        );
        assert_eq!(storage.write_count(), 3);
    }

    #[test]
    fn test_clear_deletes_persisted_key() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        cart.add_or_update(line(1, "VIP", 2, 5000));

        cart.clear();

        assert!(cart.is_empty());
        assert!(!storage.contains(KEY));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        cart.add_or_update(line(1, "VIP", 2, 5000));
        cart.add_or_update(line(2, "VIP", 1, 3000));

        cart.remove(EventId::new(1), &TicketType::Vip);
        let once = cart.snapshot();
        cart.remove(EventId::new(1), &TicketType::Vip);

        assert_eq!(cart.snapshot(), once);
        assert_eq!(once, vec![line(2, "VIP", 1, 3000)]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        cart.add_or_update(line(1, "VIP", 2, 5000));

        let mut snapshot = cart.snapshot();
        snapshot[0].quantity = 99;
        snapshot.clear();

        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_load_restores_persisted_cart() {
        let storage = InMemoryKeyValueStore::with_entry(
            KEY,
            r#"[{"eventId":7,"eventName":"Blankets & Wine","ticketType":"VIP","quantity":2,"price":4500.5}]"#,
        );

        let cart = Cart::load(create_test_env(&storage));

        let lines = cart.snapshot();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].event_name, "Blankets & Wine");
        assert_eq!(lines[0].ticket_type, TicketType::Vip);
        assert_eq!(cart.total_price().to_string(), "KSh 9001.00");
    }

    #[test]
    fn test_load_normalises_duplicates_and_zero_lines() {
        let storage = InMemoryKeyValueStore::with_entry(
            KEY,
            r#"[
                {"eventId":1,"eventName":"A","ticketType":"VIP","quantity":2,"price":100},
                {"eventId":1,"eventName":"A","ticketType":"ADVANCE","quantity":0,"price":50},
                {"eventId":1,"eventName":"A","ticketType":"vip","quantity":3,"price":100}
            ]"#,
        );

        let cart = Cart::load(create_test_env(&storage));

        assert_eq!(cart.snapshot(), vec![line(1, "VIP", 3, 100).with_name("A")]);
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        for raw in ["{not json", "{}", r#"[{"eventId":"x"}]"#] {
            let storage = InMemoryKeyValueStore::with_entry(KEY, raw);

            let cart = Cart::load(create_test_env(&storage));

            assert!(cart.is_empty());
            assert_eq!(cart.total_price(), Money::ZERO);
        }
    }

    #[test]
    fn test_write_failure_keeps_in_memory_mutation() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        storage.fail_writes(true);

        cart.add_or_update(line(1, "VIP", 2, 5000));

        assert_eq!(cart.total_quantity(), 2);
        assert!(cart.storage_error().unwrap().contains("quota exceeded"));

        storage.fail_writes(false);
        cart.add_or_update(line(1, "VIP", 3, 5000));
        assert!(cart.storage_error().is_none());
        assert_eq!(persisted(&storage), vec![line(1, "VIP", 3, 5000)]);
    }

    #[test]
    fn test_subscribers_receive_snapshot_synchronously() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let subscription = cart.subscribe(move |lines| {
            sink.borrow_mut().push(lines.iter().map(|line| line.quantity).sum::<u32>());
        });

        cart.add_or_update(line(1, "VIP", 2, 5000));
        cart.add_or_update(line(1, "ADVANCE", 1, 1500));
        assert_eq!(*seen.borrow(), vec![2, 3]);

        subscription.unsubscribe();
        cart.clear();
        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn test_lines_for_event_and_event_ids() {
        let storage = InMemoryKeyValueStore::new();
        let mut cart = Cart::load(create_test_env(&storage));
        cart.add_or_update(line(2, "VIP", 1, 100));
        cart.add_or_update(line(1, "VIP", 1, 100));
        cart.add_or_update(line(2, "ADVANCE", 1, 50));

        assert_eq!(cart.event_ids(), vec![EventId::new(2), EventId::new(1)]);
        assert_eq!(cart.lines_for_event(EventId::new(2)).len(), 2);
        assert!(cart.lines_for_event(EventId::new(9)).is_empty());
    }

    impl CartLine {
        fn with_name(mut self, name: &str) -> Self {
            self.event_name = name.to_string();
            self
        }
    }

    fn arb_action() -> impl Strategy<Value = CartAction> {
        let ticket_type = prop_oneof![Just("VIP"), Just("ADVANCE"), Just("EARLY_BIRD")];
        prop_oneof![
            (1_u64..3, ticket_type.clone(), 0_u32..4)
                .prop_map(|(event, kind, quantity)| CartAction::AddOrUpdate(line(event, kind, quantity, 100))),
            (1_u64..3, ticket_type.clone(), 0_u32..4).prop_map(|(event, kind, quantity)| {
                CartAction::UpdateQuantity {
                    event_id: EventId::new(event),
                    ticket_type: TicketType::parse(kind),
                    quantity,
                }
            }),
            (1_u64..3, ticket_type).prop_map(|(event, kind)| CartAction::Remove {
                event_id: EventId::new(event),
                ticket_type: TicketType::parse(kind),
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_cart_keys_stay_unique_and_non_zero(actions in prop::collection::vec(arb_action(), 0..30)) {
            let storage = InMemoryKeyValueStore::new();
            let mut cart = Cart::load(create_test_env(&storage));

            for action in actions {
                cart.dispatch(action);
                let lines = cart.snapshot();
                prop_assert!(lines.iter().all(|line| line.quantity > 0));
                for (index, line) in lines.iter().enumerate() {
                    prop_assert!(!lines[index + 1..].iter().any(|other| other.matches(line.event_id, &line.ticket_type)));
                }
                let stored: Vec<CartLine> = storage
                    .get(KEY)
                    .map(|raw| serde_json::from_str(&raw).unwrap())
                    .unwrap_or_default();
                prop_assert_eq!(stored, lines);
            }
        }
    }
}
