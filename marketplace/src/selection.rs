//! Buyer-facing ticket selection.
//!
//! Tracks the quantity a buyer picked for each tier on an event page. Each
//! tier is bounded by its own remaining stock. Every edit returns the
//! [`CartAction`] that brings the cart in line with the new quantity, so the
//! view forwards it to [`Cart::dispatch`](crate::aggregates::cart::Cart::dispatch).

use crate::aggregates::cart::CartAction;
use crate::allocation::{clamp_to_bound, parse_quantity, AllocationError};
use crate::pricing::effective_price;
use crate::types::{CartLine, EventId, EventWithTickets, Money, TicketListing, TicketType};
use thiserror::Error;

/// Condition shown when a buyer asks for more than a tier has left
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Only {available} {ticket_type} tickets available.")]
pub struct StockLimit {
    /// Tier that ran out
    pub ticket_type: TicketType,
    /// Tickets left in the tier
    pub available: u32,
}

/// Result of a selection edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    /// Quantity now selected for the tier
    pub quantity: u32,
    /// Set when the request was clamped to the tier's stock
    pub condition: Option<StockLimit>,
    /// Cart change matching the new quantity
    pub action: CartAction,
}

/// Quantities picked on one event page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSelection {
    event_id: EventId,
    event_name: String,
    listings: Vec<TicketListing>,
    quantities: Vec<u32>,
}

impl TicketSelection {
    /// Starts an empty selection for an event page
    #[must_use]
    pub fn new(event: &EventWithTickets) -> Self {
        Self {
            event_id: event.id,
            event_name: event.name.clone(),
            listings: event.tickets.clone(),
            quantities: vec![0; event.tickets.len()],
        }
    }

    /// Starts a selection pre-filled from what the cart already holds
    ///
    /// Cart quantities above a tier's remaining stock are clamped.
    #[must_use]
    pub fn from_cart(event: &EventWithTickets, lines: &[CartLine]) -> Self {
        let mut selection = Self::new(event);
        for (listing, quantity) in selection.listings.iter().zip(selection.quantities.iter_mut()) {
            if let Some(line) = lines
                .iter()
                .find(|line| line.matches(event.id, &listing.ticket_type))
            {
                *quantity = clamp_to_bound(line.quantity, listing.remaining());
            }
        }
        selection
    }

    /// Event this selection belongs to
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Listed tiers
    #[must_use]
    pub fn listings(&self) -> &[TicketListing] {
        &self.listings
    }

    /// Quantity selected for tier `index`
    #[must_use]
    pub fn quantity(&self, index: usize) -> Option<u32> {
        self.quantities.get(index).copied()
    }

    /// Adds one ticket, up to the tier's remaining stock
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownTier`] if `index` is out of range.
    pub fn increment(&mut self, index: usize) -> Result<SelectionUpdate, AllocationError> {
        let current = self.current(index)?;
        self.apply(index, current.saturating_add(1))
    }

    /// Removes one ticket, stopping at zero
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownTier`] if `index` is out of range.
    pub fn decrement(&mut self, index: usize) -> Result<SelectionUpdate, AllocationError> {
        let current = self.current(index)?;
        self.apply(index, current.saturating_sub(1))
    }

    /// Sets the quantity from free-form input
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownTier`] if `index` is out of range.
    pub fn set_quantity(&mut self, index: usize, input: &str) -> Result<SelectionUpdate, AllocationError> {
        self.current(index)?;
        self.apply(index, parse_quantity(input))
    }

    /// Price of one ticket of tier `index`, discount applied
    #[must_use]
    pub fn unit_price(&self, index: usize) -> Option<Money> {
        self.listings
            .get(index)
            .map(|listing| effective_price(listing.price, listing.discount.as_ref()))
    }

    /// `Σ unit price × quantity` over the selected tiers
    #[must_use]
    pub fn subtotal(&self) -> Money {
        (0..self.listings.len())
            .filter_map(|index| Some(self.unit_price(index)?.multiply(self.quantities[index])))
            .sum()
    }

    fn current(&self, index: usize) -> Result<u32, AllocationError> {
        self.quantity(index).ok_or(AllocationError::UnknownTier {
            index,
            tiers: self.listings.len(),
        })
    }

    fn apply(&mut self, index: usize, requested: u32) -> Result<SelectionUpdate, AllocationError> {
        let listing = self.listings.get(index).ok_or(AllocationError::UnknownTier {
            index,
            tiers: self.listings.len(),
        })?;

        let available = listing.remaining();
        let quantity = clamp_to_bound(requested, available);
        let condition = (quantity < requested).then(|| StockLimit {
            ticket_type: listing.ticket_type.clone(),
            available,
        });

        let action = if quantity == 0 {
            CartAction::Remove {
                event_id: self.event_id,
                ticket_type: listing.ticket_type.clone(),
            }
        } else {
            CartAction::AddOrUpdate(CartLine::new(
                self.event_id,
                self.event_name.clone(),
                listing.ticket_type.clone(),
                quantity,
                effective_price(listing.price, listing.discount.as_ref()),
            ))
        };

        self.quantities[index] = quantity;
        tracing::debug!(
            event_id = %self.event_id,
            ticket_type = %listing.ticket_type,
            requested,
            quantity,
            "Ticket selection changed"
        );

        Ok(SelectionUpdate {
            quantity,
            condition,
            action,
        })
    }
}
