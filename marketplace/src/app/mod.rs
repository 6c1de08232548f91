//! Application layer - async flows over the synchronous core.
//!
//! - Checkout (cart → purchase intent → purchase gateway)
//! - Event publication (wizard request → event catalog)

mod services;

pub use services::{
    BuyerDetails, CheckoutError, CheckoutService, EventPublisher, PublishError, PublishedEvent,
};
