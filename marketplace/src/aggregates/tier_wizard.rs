//! Organizer ticket-tier wizard.
//!
//! Second step of event creation: the organizer has described the event and
//! now sets quantity, price, discount and sale window for each tier. Edits
//! are recovered locally (clamped, with a message in `last_error`); `Finish`
//! validates the whole form and produces the [`EventCreationRequest`] handed
//! to the catalog.

use crate::allocation::{parse_quantity, CapacityAllocator};
use crate::input::parse_amount;
use crate::pricing::{clamp_discount_input, effective_price, parse_price};
use crate::types::{
    Discount, DiscountKind, EventCreationRequest, EventDraft, EventDraftError, Money, SaleWindow,
    TicketTierConfig, TicketType,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tikiti_core::{effect::Effect, environment::Clock, reducer::Reducer, SmallVec};

/// Lowest price a tier with tickets may carry
const MIN_TIER_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

// ============================================================================
// Errors
// ============================================================================

/// Reasons the wizard refuses to finish
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Every tier has quantity zero
    #[error("Please set at least one ticket type.")]
    NoTickets,

    /// Tier quantities add up to more than the event capacity
    #[error("Total tickets exceed event capacity.")]
    OverCapacity,

    /// A tier with tickets is priced below 0.01
    #[error("All ticket types with quantity > 0 must have a price of at least Ksh 0.01.")]
    PriceTooLow,

    /// A tier with tickets has a missing or inverted sale window
    #[error("Sale dates and times must be valid and start before end.")]
    InvalidSaleWindow,

    /// The event descriptor itself is invalid
    #[error(transparent)]
    Event(#[from] EventDraftError),
}

// ============================================================================
// State
// ============================================================================

/// Editable tier row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierDraft {
    /// Tier category
    pub ticket_type: TicketType,
    /// Tickets offered
    pub quantity: u32,
    /// Price before discount
    pub price: Money,
    /// Sale opens
    pub sale_start: Option<NaiveDateTime>,
    /// Sale closes
    pub sale_end: Option<NaiveDateTime>,
    /// Whether the discount inputs are enabled
    pub has_discount: bool,
    /// Selected discount kind
    pub discount_kind: DiscountKind,
    /// Typed discount value, already clamped
    pub discount_value: Decimal,
}

impl TierDraft {
    /// Creates an empty tier selling between `sale_start` and `sale_end`
    #[must_use]
    pub fn new(ticket_type: TicketType, sale_start: NaiveDateTime, sale_end: NaiveDateTime) -> Self {
        Self {
            ticket_type,
            quantity: 0,
            price: Money::ZERO,
            sale_start: Some(sale_start),
            sale_end: Some(sale_end),
            has_discount: false,
            discount_kind: DiscountKind::Percentage,
            discount_value: Decimal::ZERO,
        }
    }

    /// Active discount rule, if any, bounded by the current price
    #[must_use]
    pub fn discount(&self) -> Option<Discount> {
        let value = clamp_discount_input(self.discount_kind, self.discount_value, self.price).value;
        (self.has_discount && value > Decimal::ZERO).then(|| match self.discount_kind {
            DiscountKind::Percentage => Discount::Percentage(value),
            DiscountKind::Fixed => Discount::Fixed(Money::clamped(value)),
        })
    }

    /// Price of one ticket after discount
    #[must_use]
    pub fn final_price(&self) -> Money {
        effective_price(self.price, self.discount().as_ref())
    }

    /// Revenue if the tier sells out
    #[must_use]
    pub fn revenue(&self) -> Money {
        self.final_price().multiply(self.quantity)
    }

    fn sale_window(&self) -> Option<SaleWindow> {
        SaleWindow::new(self.sale_start?, self.sale_end?)
    }
}

/// Wizard form state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierWizardState {
    /// Event described in the first step
    pub event: EventDraft,
    /// One row per tier, in display order
    pub tiers: Vec<TierDraft>,
    /// Message for the last rejected or clamped edit
    pub last_error: Option<String>,
    /// Set once `Finish` succeeded
    pub request: Option<EventCreationRequest>,
}

impl TierWizardState {
    /// Starts the wizard with the early bird, advance and VIP tiers
    ///
    /// Every tier sells from the event's start until its end.
    #[must_use]
    pub fn new(event: EventDraft) -> Self {
        let (start, end) = (event.starts_at(), event.ends_at());
        let tiers = [TicketType::EarlyBird, TicketType::Advance, TicketType::Vip]
            .into_iter()
            .map(|ticket_type| TierDraft::new(ticket_type, start, end))
            .collect();

        Self {
            event,
            tiers,
            last_error: None,
            request: None,
        }
    }

    /// `Σ quantity` over all tiers
    #[must_use]
    pub fn total_tickets(&self) -> u64 {
        self.tiers.iter().map(|tier| u64::from(tier.quantity)).sum()
    }

    /// `Σ revenue` over all tiers
    #[must_use]
    pub fn total_earnings(&self) -> Money {
        self.tiers.iter().map(TierDraft::revenue).sum()
    }

    /// Validates the form and builds the creation request
    ///
    /// # Errors
    ///
    /// Returns the first [`WizardError`] found, checking the event, then
    /// ticket count, capacity, prices and sale windows.
    pub fn finish(&self, today: chrono::NaiveDate) -> Result<EventCreationRequest, WizardError> {
        self.event.validate(today)?;

        let total = self.total_tickets();
        if total == 0 {
            return Err(WizardError::NoTickets);
        }
        if total > u64::from(self.event.capacity.value()) {
            return Err(WizardError::OverCapacity);
        }

        let selling: Vec<&TierDraft> = self.tiers.iter().filter(|tier| tier.quantity > 0).collect();
        if selling.iter().any(|tier| tier.price.amount() < MIN_TIER_PRICE) {
            return Err(WizardError::PriceTooLow);
        }

        let tiers = selling
            .into_iter()
            .map(|tier| {
                let sale_window = tier.sale_window().ok_or(WizardError::InvalidSaleWindow)?;
                Ok(TicketTierConfig {
                    ticket_type: tier.ticket_type.clone(),
                    quantity: tier.quantity,
                    base_price: tier.price,
                    sale_window,
                    discount: tier.discount(),
                })
            })
            .collect::<Result<Vec<_>, WizardError>>()?;

        Ok(EventCreationRequest {
            event: self.event.clone(),
            tiers,
        })
    }

    fn quantities(&self) -> Vec<u32> {
        self.tiers.iter().map(|tier| tier.quantity).collect()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to the wizard reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TierWizardAction {
    /// Quantity typed for a tier
    SetQuantity {
        /// Tier index
        index: usize,
        /// Raw input
        input: String,
    },
    /// Base price typed for a tier
    SetPrice {
        /// Tier index
        index: usize,
        /// Raw input
        input: String,
    },
    /// Discount checkbox toggled
    ToggleDiscount {
        /// Tier index
        index: usize,
        /// New checkbox state
        enabled: bool,
    },
    /// Discount kind switched
    SetDiscountKind {
        /// Tier index
        index: usize,
        /// New kind
        kind: DiscountKind,
    },
    /// Discount value typed for a tier
    SetDiscountValue {
        /// Tier index
        index: usize,
        /// Raw input
        input: String,
    },
    /// Sale start edited
    SetSaleStart {
        /// Tier index
        index: usize,
        /// Sale opens
        start: Option<NaiveDateTime>,
    },
    /// Sale end edited
    SetSaleEnd {
        /// Tier index
        index: usize,
        /// Sale closes
        end: Option<NaiveDateTime>,
    },
    /// Both ends of the sale window edited at once
    SetSaleWindow {
        /// Tier index
        index: usize,
        /// Sale opens
        start: Option<NaiveDateTime>,
        /// Sale closes
        end: Option<NaiveDateTime>,
    },
    /// Organizer submitted the form
    Finish,
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the wizard reducer
#[derive(Clone)]
pub struct TierWizardEnvironment {
    /// Clock deciding which event dates are still in the future
    pub clock: Arc<dyn Clock>,
}

impl TierWizardEnvironment {
    /// Creates a new `TierWizardEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the tier wizard
#[derive(Clone, Copy, Debug, Default)]
pub struct TierWizardReducer;

impl TierWizardReducer {
    /// Creates a new `TierWizardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn set_quantity(state: &mut TierWizardState, index: usize, input: &str) {
        let allocator = CapacityAllocator::new(state.event.capacity);
        match allocator.allocate(&state.quantities(), index, parse_quantity(input)) {
            Ok(allocation) => {
                state.tiers[index].quantity = allocation.granted;
                state.last_error = allocation.condition.map(|condition| condition.to_string());
            },
            Err(error) => {
                tracing::warn!(index, error = %error, "Quantity edit ignored");
            },
        }
    }

    fn set_price(tier: &mut TierDraft, input: &str) -> Option<String> {
        let parsed = parse_price(input, &tier.ticket_type);
        tier.price = parsed.price;
        let clamped = clamp_discount_input(tier.discount_kind, tier.discount_value, tier.price);
        tier.discount_value = clamped.value;
        parsed
            .condition
            .map(|condition| condition.to_string())
            .or_else(|| clamped.condition.map(|condition| condition.to_string()))
    }

    fn toggle_discount(tier: &mut TierDraft, enabled: bool) -> Option<String> {
        tier.has_discount = enabled;
        if !enabled {
            tier.discount_value = Decimal::ZERO;
            tier.discount_kind = DiscountKind::Percentage;
        }
        None
    }

    fn set_discount_kind(tier: &mut TierDraft, kind: DiscountKind) -> Option<String> {
        tier.discount_kind = kind;
        let clamped = clamp_discount_input(kind, tier.discount_value, tier.price);
        tier.discount_value = clamped.value;
        clamped.condition.map(|condition| condition.to_string())
    }

    fn set_discount_value(tier: &mut TierDraft, input: &str) -> Option<String> {
        let value = parse_amount(input).unwrap_or(Decimal::ZERO);
        let clamped = clamp_discount_input(tier.discount_kind, value, tier.price);
        tier.discount_value = clamped.value;
        clamped.condition.map(|condition| condition.to_string())
    }

    fn set_sale_start(tier: &mut TierDraft, start: Option<NaiveDateTime>) -> Option<String> {
        tier.sale_start = start;
        Self::inverted_sale_dates(tier)
            .then(|| "Sale start date must be before or equal to end date.".to_string())
    }

    fn set_sale_end(tier: &mut TierDraft, end: Option<NaiveDateTime>) -> Option<String> {
        tier.sale_end = end;
        Self::inverted_sale_dates(tier)
            .then(|| "Sale end date must be after or equal to start date.".to_string())
    }

    fn inverted_sale_dates(tier: &TierDraft) -> bool {
        matches!((tier.sale_start, tier.sale_end), (Some(start), Some(end)) if start.date() > end.date())
    }

    fn edit_tier(
        state: &mut TierWizardState,
        index: usize,
        edit: impl FnOnce(&mut TierDraft) -> Option<String>,
    ) {
        let tier_count = state.tiers.len();
        match state.tiers.get_mut(index) {
            Some(tier) => state.last_error = edit(tier),
            None => tracing::warn!(index, tiers = tier_count, "Edit for unknown tier ignored"),
        }
    }

    fn finish(state: &mut TierWizardState, env: &TierWizardEnvironment) {
        match state.finish(env.clock.now().date_naive()) {
            Ok(request) => {
                tracing::debug!(
                    event = %request.event.name,
                    tiers = request.tiers.len(),
                    "Tier wizard finished"
                );
                state.last_error = None;
                state.request = Some(request);
            },
            Err(error) => {
                tracing::debug!(error = %error, "Tier wizard rejected");
                state.last_error = Some(error.to_string());
                state.request = None;
            },
        }
    }
}

impl Reducer for TierWizardReducer {
    type State = TierWizardState;
    type Action = TierWizardAction;
    type Environment = TierWizardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TierWizardAction::SetQuantity { index, input } => Self::set_quantity(state, index, &input),
            TierWizardAction::SetPrice { index, input } => {
                Self::edit_tier(state, index, |tier| Self::set_price(tier, &input));
            },
            TierWizardAction::ToggleDiscount { index, enabled } => {
                Self::edit_tier(state, index, |tier| Self::toggle_discount(tier, enabled));
            },
            TierWizardAction::SetDiscountKind { index, kind } => {
                Self::edit_tier(state, index, |tier| Self::set_discount_kind(tier, kind));
            },
            TierWizardAction::SetDiscountValue { index, input } => {
                Self::edit_tier(state, index, |tier| Self::set_discount_value(tier, &input));
            },
            TierWizardAction::SetSaleStart { index, start } => {
                Self::edit_tier(state, index, |tier| Self::set_sale_start(tier, start));
            },
            TierWizardAction::SetSaleEnd { index, end } => {
                Self::edit_tier(state, index, |tier| Self::set_sale_end(tier, end));
            },
            TierWizardAction::SetSaleWindow { index, start, end } => {
                Self::edit_tier(state, index, |tier| {
                    tier.sale_end = end;
                    Self::set_sale_start(tier, start)
                });
            },
            TierWizardAction::Finish => Self::finish(state, env),
        }

        SmallVec::new()
    }
}
