//! Tikiti marketplace core - cart, pricing, allocation and checkout
//!
//! Organizers describe an event and split its capacity into ticket tiers.
//! Buyers pick tickets into a persisted cart and check out with an M-Pesa
//! push payment. This crate holds the logic behind both flows; the HTTP
//! client, rendering and payment completion live elsewhere and are reached
//! through the ports in [`gateway`].
//!
//! # Architecture
//!
//! ```text
//! Organizer:
//!   TierWizardReducer ──► EventCreationRequest ──► EventPublisher ──► EventCatalog
//!        │
//!        └── CapacityAllocator, pricing (clamped quantities, live earnings)
//!
//! Buyer:
//!   TicketSelection ──► CartAction ──► Cart (Store + CartReducer) ──► KeyValueStore
//!                                          │
//!                                          ▼
//!                        PurchaseIntentBuilder ──► CheckoutService ──► PurchaseGateway
//! ```
//!
//! # Invariants
//!
//! - A cart never holds two lines for the same `(event, ticket type)` nor a
//!   line with quantity zero, and its persisted record always equals its
//!   snapshot after a successful write.
//! - The quantities of an event's tiers never sum above its capacity.
//! - An effective price is never negative.
//! - A purchase intent covers exactly one event and only positive quantities.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod allocation;
pub mod app;
pub mod checkout;
pub mod config;
pub mod gateway;
pub mod input;
pub mod pricing;
pub mod selection;
pub mod storage;
pub mod types;

pub use aggregates::{
    Cart, CartAction, CartEnvironment, CartReducer, CartState, TierWizardAction,
    TierWizardEnvironment, TierWizardReducer, TierWizardState, WizardError,
};
pub use allocation::{Allocation, AllocationError, CapacityAllocator, CapacityExceeded};
pub use app::{
    BuyerDetails, CheckoutError, CheckoutService, EventPublisher, PublishError, PublishedEvent,
};
pub use checkout::{PurchaseIntent, PurchaseIntentBuilder, ValidationFailure, Violation};
pub use config::Config;
pub use gateway::{EventCatalog, PurchaseGateway};
pub use pricing::effective_price;
pub use selection::{SelectionUpdate, TicketSelection};
pub use storage::{FileStore, MemoryStore};
pub use types::*;
