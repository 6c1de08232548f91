//! Reducer-driven aggregates of the marketplace.
//!
//! - Cart: the buyer's shopping cart, persisted to a key-value port
//! - Tier wizard: the organizer form configuring ticket tiers for an event

pub mod cart;
pub mod tier_wizard;

pub use cart::{Cart, CartAction, CartEnvironment, CartReducer, CartState};
pub use tier_wizard::{
    TierDraft, TierWizardAction, TierWizardEnvironment, TierWizardReducer, TierWizardState, WizardError,
};
