//! Application services - flows that cross the remote API boundary.
//!
//! Services tie the synchronous core to the async ports:
//! 1. Validate with the core (intent builder, wizard output)
//! 2. Call the port
//! 3. Apply the local consequence of success (clear the cart)
//! 4. Return the result, or propagate the failure unchanged

use crate::aggregates::cart::Cart;
use crate::aggregates::tier_wizard::WizardError;
use crate::checkout::{PurchaseIntentBuilder, ValidationFailure};
use crate::gateway::{
    CatalogError, CreatedTicket, EventCatalog, GatewayError, PurchaseGateway, PurchaseReceipt,
};
use crate::types::{CartLine, EventCreationRequest, EventId};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Checkout
// ============================================================================

/// Errors that can occur during checkout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The form failed validation; nothing was submitted
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// The gateway did not accept the purchase; the cart is untouched
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Contact details typed on the checkout form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerDetails {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Mobile number receiving the payment prompt
    pub phone: String,
}

impl BuyerDetails {
    /// Creates a new `BuyerDetails`
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Checkout service
///
/// Builds a purchase intent from the cart, submits it once and, on success,
/// takes the purchased lines out of the cart.
pub struct CheckoutService {
    builder: PurchaseIntentBuilder,
    gateway: Arc<dyn PurchaseGateway>,
}

impl CheckoutService {
    /// Create a new checkout service
    #[must_use]
    pub fn new(builder: PurchaseIntentBuilder, gateway: Arc<dyn PurchaseGateway>) -> Self {
        Self { builder, gateway }
    }

    /// Check out everything in the cart
    ///
    /// A cart holding several events fails validation with
    /// [`MixedEvents`](crate::checkout::Violation::MixedEvents).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for invalid input and
    /// [`CheckoutError::Gateway`] when the purchase is not accepted.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        buyer: &BuyerDetails,
    ) -> Result<PurchaseReceipt, CheckoutError> {
        let lines = cart.snapshot();
        self.submit(cart, &lines, buyer).await
    }

    /// Check out the lines of one event, leaving other events in the cart
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for invalid input and
    /// [`CheckoutError::Gateway`] when the purchase is not accepted.
    pub async fn checkout_event(
        &self,
        cart: &mut Cart,
        event_id: EventId,
        buyer: &BuyerDetails,
    ) -> Result<PurchaseReceipt, CheckoutError> {
        let lines = cart.lines_for_event(event_id);
        self.submit(cart, &lines, buyer).await
    }

    async fn submit(
        &self,
        cart: &mut Cart,
        lines: &[CartLine],
        buyer: &BuyerDetails,
    ) -> Result<PurchaseReceipt, CheckoutError> {
        let intent = self
            .builder
            .build(lines, &buyer.name, &buyer.email, &buyer.phone)?;
        let event_id = intent.event_id();

        let receipt = match self.gateway.submit_purchase(intent).await {
            Ok(receipt) => receipt,
            Err(error) => {
                tracing::warn!(event_id = %event_id, error = %error, "Purchase failed");
                return Err(error.into());
            },
        };

        if cart.event_ids() == [event_id] {
            cart.clear();
        } else {
            for line in lines {
                cart.remove(line.event_id, &line.ticket_type);
            }
        }

        tracing::info!(
            event_id = %event_id,
            reference = %receipt.reference,
            amount = %receipt.amount,
            "Purchase submitted"
        );
        Ok(receipt)
    }
}

// ============================================================================
// Event publication
// ============================================================================

/// Errors that can occur while publishing an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The request cannot be published as is
    #[error(transparent)]
    Invalid(#[from] WizardError),

    /// The event itself was not created
    #[error("Failed to create event: {0}")]
    EventCreation(CatalogError),

    /// The event exists but its tickets were not created
    #[error("Event {event_id} was created but its tickets were not: {source}")]
    TicketCreation {
        /// Event left without tickets
        event_id: EventId,
        /// Catalog failure
        source: CatalogError,
    },
}

/// Event and tickets as created remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    /// Remote event identifier
    pub event_id: EventId,
    /// Created tiers
    pub tickets: Vec<CreatedTicket>,
}

/// Event publication service
///
/// Creates the event, then its tickets. A failure in the second step is
/// reported with the event id and nothing is rolled back or retried.
pub struct EventPublisher {
    catalog: Arc<dyn EventCatalog>,
}

impl EventPublisher {
    /// Create a new event publisher
    #[must_use]
    pub fn new(catalog: Arc<dyn EventCatalog>) -> Self {
        Self { catalog }
    }

    /// Publish a finished wizard request
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] describing which step failed.
    pub async fn publish(&self, request: EventCreationRequest) -> Result<PublishedEvent, PublishError> {
        if request.tiers.is_empty() {
            return Err(WizardError::NoTickets.into());
        }

        let EventCreationRequest { event, tiers } = request;
        let name = event.name.clone();

        let event_id = self
            .catalog
            .create_event(event)
            .await
            .map_err(PublishError::EventCreation)?;
        tracing::debug!(event_id = %event_id, name = %name, "Event created");

        let tickets = match self.catalog.create_tickets(event_id, tiers).await {
            Ok(tickets) => tickets,
            Err(source) => {
                tracing::warn!(event_id = %event_id, error = %source, "Ticket creation failed after event creation");
                return Err(PublishError::TicketCreation { event_id, source });
            },
        };

        tracing::info!(event_id = %event_id, tickets = tickets.len(), "Event published");
        Ok(PublishedEvent { event_id, tickets })
    }
}
