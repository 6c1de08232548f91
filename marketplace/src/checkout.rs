//! Purchase intent construction.
//!
//! Turns the cart lines of one event plus the buyer's contact fields into an
//! immutable [`PurchaseIntent`]. Every rule is checked and all violations
//! are reported together so the buyer can fix the whole form at once.

use crate::config::CheckoutConfig;
use crate::types::{CartLine, EventId, Money, PaymentMethod, TicketType};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Violations
// ============================================================================

/// A single rule the checkout form broke
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Trimmed name shorter than the configured minimum
    #[error("Name must be at least {min} characters.")]
    NameTooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// Email without an `@`
    #[error("Enter a valid email address.")]
    InvalidEmail,

    /// Phone that is not a 9-digit mobile number
    #[error("Enter a valid mobile number, e.g. 0712345678.")]
    InvalidPhone,

    /// No ticket with a quantity above zero
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Lines from more than one event
    #[error("Tickets for different events must be bought separately.")]
    MixedEvents,
}

/// Aggregated checkout rejection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.violations))]
pub struct ValidationFailure {
    /// Every violated rule, in form order
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Returns `true` if `violation` is among the reported ones
    #[must_use]
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Purchase intent
// ============================================================================

/// One ticket entry of a purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicket {
    /// Tier bought
    #[serde(serialize_with = "serialize_wire_name")]
    pub ticket_type: TicketType,
    /// Number of tickets
    pub quantity: u32,
    /// Unit price
    pub price: Money,
}

fn serialize_wire_name<S: Serializer>(ticket_type: &TicketType, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ticket_type.wire_name())
}

/// Validated purchase request for one event
///
/// Serialises to the body of the purchase-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseIntent {
    event_id: EventId,
    #[serde(rename = "selectedTickets")]
    tickets: Vec<PurchaseTicket>,
    payment_method: PaymentMethod,
    #[serde(rename = "purchaseEmail")]
    buyer_email: String,
    #[serde(rename = "phoneNumber")]
    buyer_phone: String,
    #[serde(rename = "guestName")]
    buyer_name: String,
}

impl PurchaseIntent {
    /// Event being purchased
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Tickets in cart order, quantity > 0 only
    #[must_use]
    pub fn tickets(&self) -> &[PurchaseTicket] {
        &self.tickets
    }

    /// Payment channel
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Trimmed, lower-cased email
    #[must_use]
    pub fn buyer_email(&self) -> &str {
        &self.buyer_email
    }

    /// Phone as `<country code><9 digits>`
    #[must_use]
    pub fn buyer_phone(&self) -> &str {
        &self.buyer_phone
    }

    /// Trimmed name
    #[must_use]
    pub fn buyer_name(&self) -> &str {
        &self.buyer_name
    }

    /// Amount the push payment will request
    #[must_use]
    pub fn total(&self) -> Money {
        self.tickets
            .iter()
            .map(|ticket| ticket.price.multiply(ticket.quantity))
            .sum()
    }
}

impl fmt::Display for PurchaseIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticket(s) for event {} paid by {}",
            self.tickets.iter().map(|ticket| ticket.quantity).sum::<u32>(),
            self.event_id,
            self.payment_method
        )
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Validates checkout input and builds [`PurchaseIntent`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntentBuilder {
    country_code: String,
    min_name_length: usize,
}

impl Default for PurchaseIntentBuilder {
    fn default() -> Self {
        Self::new(&CheckoutConfig::default())
    }
}

impl PurchaseIntentBuilder {
    /// Local mobile numbers are this many digits long
    pub const SUBSCRIBER_DIGITS: usize = 9;

    /// Creates a builder from checkout configuration
    #[must_use]
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            country_code: config.country_code.clone(),
            min_name_length: config.min_name_length,
        }
    }

    /// Builds a purchase intent from one event's cart lines
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every violated rule.
    pub fn build(
        &self,
        lines: &[CartLine],
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<PurchaseIntent, ValidationFailure> {
        let mut violations = Vec::new();

        let buyer_name = name.trim();
        if buyer_name.chars().count() < self.min_name_length {
            violations.push(Violation::NameTooShort {
                min: self.min_name_length,
            });
        }

        let buyer_email = email.trim().to_lowercase();
        if !buyer_email.contains('@') {
            violations.push(Violation::InvalidEmail);
        }

        let buyer_phone = self.normalize_phone(phone);
        if buyer_phone.is_none() {
            violations.push(Violation::InvalidPhone);
        }

        let tickets: Vec<PurchaseTicket> = lines
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| PurchaseTicket {
                ticket_type: line.ticket_type.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();
        if tickets.is_empty() {
            violations.push(Violation::EmptyCart);
        }

        let event_id = lines.first().map(|line| line.event_id);
        if lines.iter().any(|line| Some(line.event_id) != event_id) {
            violations.push(Violation::MixedEvents);
        }

        match (event_id, buyer_phone) {
            (Some(event_id), Some(buyer_phone)) if violations.is_empty() => {
                tracing::debug!(event_id = %event_id, tickets = tickets.len(), "Purchase intent built");
                Ok(PurchaseIntent {
                    event_id,
                    tickets,
                    payment_method: PaymentMethod::Mpesa,
                    buyer_email,
                    buyer_phone,
                    buyer_name: buyer_name.to_string(),
                })
            },
            _ => {
                tracing::debug!(violations = violations.len(), "Purchase intent rejected");
                Err(ValidationFailure { violations })
            },
        }
    }

    /// Normalises a phone number to `<country code><9 digits>`
    ///
    /// Non-digits are dropped, then a leading country code or a single
    /// leading `0` is stripped. The remaining subscriber number must be nine
    /// digits starting with `7` or `1`.
    #[must_use]
    pub fn normalize_phone(&self, raw: &str) -> Option<String> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let subscriber = match digits.strip_prefix(self.country_code.as_str()) {
            Some(rest) if digits.len() > Self::SUBSCRIBER_DIGITS => rest,
            _ => digits.strip_prefix('0').unwrap_or(&digits),
        };

        let valid = subscriber.len() == Self::SUBSCRIBER_DIGITS
            && matches!(subscriber.as_bytes().first(), Some(b'7' | b'1'));
        valid.then(|| format!("{}{subscriber}", self.country_code))
    }
}
