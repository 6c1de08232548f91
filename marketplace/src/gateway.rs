//! Ports to the remote marketplace API.
//!
//! The HTTP client that talks to the purchase and catalog endpoints lives
//! outside this crate. These traits describe what the services need from it,
//! and the mocks stand in for it in tests and the demo.

use crate::checkout::PurchaseIntent;
use crate::types::{EventDraft, EventId, Money, TicketTierConfig, TicketType};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Purchase gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Catalog result
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Boxed future returned by the ports
pub type PortFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

// ============================================================================
// Purchases
// ============================================================================

/// Purchase submission failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The endpoint refused the purchase
    #[error("Purchase rejected: {message}")]
    Rejected {
        /// Server-provided reason
        message: String,
    },
    /// Missing or expired credentials
    #[error("Not signed in")]
    Unauthorized,
    /// No answer in time
    #[error("Purchase request timed out")]
    Timeout,
    /// Network or decoding failure
    #[error("Purchase request failed: {0}")]
    Transport(String),
}

/// Acknowledgement of an accepted purchase
///
/// The push-payment prompt is now on the buyer's phone; payment completion
/// is reported elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// Purchase reference assigned by the endpoint
    pub reference: String,
    /// Event purchased
    pub event_id: EventId,
    /// Amount the push payment requests
    pub amount: Money,
}

/// Purchase submission port
pub trait PurchaseGateway: Send + Sync {
    /// Submit a purchase and trigger the push payment
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the purchase is not accepted.
    fn submit_purchase(&self, intent: PurchaseIntent) -> PortFuture<GatewayResult<PurchaseReceipt>>;
}

/// Mock purchase gateway
///
/// Accepts every purchase unless built with [`MockPurchaseGateway::failing`].
/// Clones share the record of submitted intents.
#[derive(Clone, Debug, Default)]
pub struct MockPurchaseGateway {
    failure: Option<GatewayError>,
    submitted: Arc<Mutex<Vec<PurchaseIntent>>>,
}

impl MockPurchaseGateway {
    /// Creates a gateway that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway that rejects everything with `error`
    #[must_use]
    pub fn failing(error: GatewayError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PurchaseGateway> {
        Arc::new(Self::new())
    }

    /// Intents received so far, accepted or not
    #[must_use]
    pub fn submitted(&self) -> Vec<PurchaseIntent> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PurchaseGateway for MockPurchaseGateway {
    fn submit_purchase(&self, intent: PurchaseIntent) -> PortFuture<GatewayResult<PurchaseReceipt>> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(intent.clone());
        let failure = self.failure.clone();

        Box::pin(async move {
            if let Some(error) = failure {
                tracing::info!(event_id = %intent.event_id(), error = %error, "Mock purchase rejected");
                return Err(error);
            }

            let reference = format!("mock_purchase_{}", uuid::Uuid::new_v4());
            tracing::info!(
                event_id = %intent.event_id(),
                amount = %intent.total(),
                reference = %reference,
                "Mock purchase accepted"
            );

            Ok(PurchaseReceipt {
                reference,
                event_id: intent.event_id(),
                amount: intent.total(),
            })
        })
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Event or ticket creation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The endpoint refused the payload
    #[error("Rejected by catalog: {message}")]
    Rejected {
        /// Server-provided reason
        message: String,
    },
    /// Missing or expired credentials
    #[error("Not signed in")]
    Unauthorized,
    /// Network or decoding failure
    #[error("Catalog request failed: {0}")]
    Transport(String),
}

/// Ticket tier as created remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTicket {
    /// Remote ticket identifier
    pub id: u64,
    /// Tier category
    pub ticket_type: TicketType,
    /// Tickets issued
    pub quantity: u32,
}

/// Event and ticket creation port
pub trait EventCatalog: Send + Sync {
    /// Create an event and return its identifier
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the event is not created.
    fn create_event(&self, event: EventDraft) -> PortFuture<CatalogResult<EventId>>;

    /// Create the ticket tiers of an existing event
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the tickets are not created.
    fn create_tickets(
        &self,
        event_id: EventId,
        tiers: Vec<TicketTierConfig>,
    ) -> PortFuture<CatalogResult<Vec<CreatedTicket>>>;
}

/// In-memory catalog
///
/// Assigns sequential identifiers. Either creation step can be made to fail.
#[derive(Debug, Default)]
pub struct MockEventCatalog {
    next_id: AtomicU64,
    event_failure: Option<CatalogError>,
    ticket_failure: Option<CatalogError>,
    events: Mutex<Vec<(EventId, EventDraft)>>,
    tickets: Mutex<Vec<(EventId, CreatedTicket)>>,
}

impl MockEventCatalog {
    /// Creates a catalog that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes event creation fail with `error`
    #[must_use]
    pub fn failing_events(mut self, error: CatalogError) -> Self {
        self.event_failure = Some(error);
        self
    }

    /// Makes ticket creation fail with `error`
    #[must_use]
    pub fn failing_tickets(mut self, error: CatalogError) -> Self {
        self.ticket_failure = Some(error);
        self
    }

    /// Events created so far
    #[must_use]
    pub fn events(&self) -> Vec<(EventId, EventDraft)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tickets created for `event_id`
    #[must_use]
    pub fn tickets_for(&self, event_id: EventId) -> Vec<CreatedTicket> {
        self.tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(owner, _)| *owner == event_id)
            .map(|(_, ticket)| ticket.clone())
            .collect()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl EventCatalog for MockEventCatalog {
    fn create_event(&self, event: EventDraft) -> PortFuture<CatalogResult<EventId>> {
        let result = match &self.event_failure {
            Some(error) => Err(error.clone()),
            None => {
                let event_id = EventId::new(self.allocate_id());
                tracing::info!(event_id = %event_id, name = %event.name, "Mock event created");
                self.events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((event_id, event));
                Ok(event_id)
            },
        };
        Box::pin(async move { result })
    }

    fn create_tickets(
        &self,
        event_id: EventId,
        tiers: Vec<TicketTierConfig>,
    ) -> PortFuture<CatalogResult<Vec<CreatedTicket>>> {
        let result = match &self.ticket_failure {
            Some(error) => Err(error.clone()),
            None => {
                let created: Vec<CreatedTicket> = tiers
                    .into_iter()
                    .map(|tier| CreatedTicket {
                        id: self.allocate_id(),
                        ticket_type: tier.ticket_type,
                        quantity: tier.quantity,
                    })
                    .collect();
                tracing::info!(event_id = %event_id, tickets = created.len(), "Mock tickets created");
                self.tickets
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(created.iter().cloned().map(|ticket| (event_id, ticket)));
                Ok(created)
            },
        };
        Box::pin(async move { result })
    }
}
