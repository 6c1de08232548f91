//! Domain types for the Tikiti marketplace.
//!
//! Value objects (identifiers, money, capacity, ticket types, discounts) and
//! the records exchanged between the cart, the organizer wizard and the
//! external ports.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an event, as assigned by the remote catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Creates an `EventId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object
// ============================================================================

/// Non-negative amount of money in Kenyan shillings
///
/// Amounts keep full decimal precision. Rounding to two places happens only
/// at the display boundary ([`Money::rounded`], `Display`), so repeated
/// recalculation never compounds rounding error.
///
/// On the wire money is a JSON number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero shillings
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a `Money` value, rejecting negative amounts
    #[must_use]
    pub fn try_new(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            None
        } else {
            Some(Self(amount))
        }
    }

    /// Creates a `Money` value, clamping negative amounts to zero
    #[must_use]
    pub fn clamped(amount: Decimal) -> Self {
        Self::try_new(amount).unwrap_or(Self::ZERO)
    }

    /// Creates a `Money` value from whole shillings
    #[must_use]
    pub fn from_shillings(shillings: u64) -> Self {
        Self(Decimal::from(shillings))
    }

    /// Returns the exact amount
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, saturating at the largest representable value
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, flooring at zero
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Multiplies by a ticket quantity
    #[must_use]
    pub fn multiply(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Rounds half away from zero to two decimal places
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KSh {:.2}", self.rounded().0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::try_new(amount)
            .ok_or_else(|| serde::de::Error::custom(format!("negative amount: {amount}")))
    }
}

// ============================================================================
// Capacity
// ============================================================================

/// Maximum number of tickets an event may sell across all tiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capacity(pub u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ticket types
// ============================================================================

/// Sellable tier category
///
/// The remote API speaks `EARLY_BIRD`, `ADVANCE` and `VIP`; the organizer
/// form historically used `earlybird`, `advanced` and `VIP`. Both spellings
/// parse to the same variant. Anything else is kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketType {
    /// Discounted tier sold well ahead of the event
    EarlyBird,
    /// Regular advance sales
    Advance,
    /// Premium tier
    Vip,
    /// Organizer-defined tier
    Other(String),
}

impl TicketType {
    /// Parses a ticket type, accepting the API and form spellings
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "earlybird" => Self::EarlyBird,
            "advance" | "advanced" => Self::Advance,
            "vip" => Self::Vip,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Returns the canonical name stored in the cart
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EarlyBird => "EARLY_BIRD",
            Self::Advance => "ADVANCE",
            Self::Vip => "VIP",
            Self::Other(name) => name,
        }
    }

    /// Returns the upper-case name the purchase endpoint expects
    #[must_use]
    pub fn wire_name(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl From<String> for TicketType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for TicketType {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<TicketType> for String {
    fn from(ticket_type: TicketType) -> Self {
        match ticket_type {
            TicketType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Discounts and sale windows
// ============================================================================

/// Kind of discount an organizer can attach to a tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Percentage off the base price (0–100)
    #[default]
    Percentage,
    /// Fixed amount off the base price (0–base price)
    Fixed,
}

/// Discount rule applied on top of a tier's base price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// Percentage off, clamped to [0, 100] when applied
    Percentage(#[serde(with = "rust_decimal::serde::float")] Decimal),
    /// Fixed amount off, clamped to [0, base price] when applied
    Fixed(Money),
}

impl Discount {
    /// Returns the kind of this discount
    #[must_use]
    pub const fn kind(&self) -> DiscountKind {
        match self {
            Self::Percentage(_) => DiscountKind::Percentage,
            Self::Fixed(_) => DiscountKind::Fixed,
        }
    }

    /// Returns the raw discount value
    #[must_use]
    pub const fn value(&self) -> Decimal {
        match self {
            Self::Percentage(percent) => *percent,
            Self::Fixed(amount) => amount.amount(),
        }
    }
}

/// Period during which a tier is on sale (`start < end`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl SaleWindow {
    /// Creates a sale window, returning `None` unless `start < end`
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// When sales open
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// When sales close
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Checks whether `at` falls inside the window (end exclusive)
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

// ============================================================================
// Organizer records
// ============================================================================

/// Organizer-authored, validated template for a sellable tier
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTierConfig {
    /// Tier category
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    /// Number of tickets offered in this tier
    pub quantity: u32,
    /// Price before discount
    #[serde(rename = "price")]
    pub base_price: Money,
    /// When the tier is on sale
    pub sale_window: SaleWindow,
    /// Optional discount
    pub discount: Option<Discount>,
}

/// Event descriptor captured in the first step of the organizer wizard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event name
    pub name: String,
    /// Venue or location
    pub location: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Category label
    #[serde(rename = "eventCategory", default)]
    pub category: Option<String>,
    /// Total tickets the event may sell
    #[serde(rename = "eventCapacity")]
    pub capacity: Capacity,
    /// Day the event starts
    #[serde(rename = "eventStartDate")]
    pub start_date: NaiveDate,
    /// Start time, midnight when not given
    #[serde(rename = "eventStartTime", default)]
    pub start_time: Option<NaiveTime>,
    /// Day the event ends
    #[serde(rename = "eventEndDate")]
    pub end_date: NaiveDate,
    /// End time, 23:59 when not given
    #[serde(rename = "eventEndTime", default)]
    pub end_time: Option<NaiveTime>,
}

impl EventDraft {
    /// When the event starts
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_date
            .and_time(self.start_time.unwrap_or(NaiveTime::MIN))
    }

    /// When the event ends
    #[must_use]
    pub fn ends_at(&self) -> NaiveDateTime {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        self.end_date.and_time(self.end_time.unwrap_or(end_of_day))
    }

    /// Checks the descriptor before any tier is configured
    ///
    /// Events are scheduled at least one day ahead, so `start_date` must be
    /// after `today`.
    ///
    /// # Errors
    ///
    /// Returns the first [`EventDraftError`] found.
    pub fn validate(&self, today: NaiveDate) -> Result<(), EventDraftError> {
        if self.name.trim().is_empty() {
            return Err(EventDraftError::MissingName);
        }
        if self.starts_at() >= self.ends_at() {
            return Err(EventDraftError::EndsBeforeStart);
        }
        if self.capacity.value() == 0 {
            return Err(EventDraftError::ZeroCapacity);
        }
        if self.start_date <= today {
            return Err(EventDraftError::StartsTooSoon {
                earliest: today.succ_opt().unwrap_or(today),
            });
        }
        Ok(())
    }
}

/// Reasons an [`EventDraft`] is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventDraftError {
    /// Blank event name
    #[error("Event name is required.")]
    MissingName,
    /// End not after start
    #[error("End date and time must be after start date and time.")]
    EndsBeforeStart,
    /// Capacity of zero
    #[error("Capacity must be greater than zero.")]
    ZeroCapacity,
    /// Start date not in the future
    #[error("Event must start on or after {earliest}.")]
    StartsTooSoon {
        /// First acceptable start date
        earliest: NaiveDate,
    },
}

/// Event plus its validated tiers, ready for the two remote creations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreationRequest {
    /// Event descriptor
    pub event: EventDraft,
    /// Tiers with a quantity above zero
    pub tiers: Vec<TicketTierConfig>,
}

// ============================================================================
// Buyer records
// ============================================================================

/// A tier as listed on the public event page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListing {
    /// Tier category
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    /// Tickets issued for this tier
    pub quantity: u32,
    /// Tickets already sold
    #[serde(default)]
    pub quantity_sold: u32,
    /// Price before discount
    pub price: Money,
    /// Discount applied client side, if any
    #[serde(default)]
    pub discount: Option<Discount>,
}

impl TicketListing {
    /// Tickets still available in this tier
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.quantity_sold)
    }
}

/// Public event page: an event and its purchasable tiers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithTickets {
    /// Event identifier
    pub id: EventId,
    /// Display name
    pub name: String,
    /// Listed tiers, in display order
    pub tickets: Vec<TicketListing>,
}

/// One purchasable selection held in the cart
///
/// Persisted as `{eventId, eventName, ticketType, quantity, price}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Event the tickets belong to
    pub event_id: EventId,
    /// Event display name
    pub event_name: String,
    /// Tier key, unique per event within the cart
    pub ticket_type: TicketType,
    /// Number of tickets
    pub quantity: u32,
    /// Price of one ticket
    #[serde(rename = "price")]
    pub unit_price: Money,
}

impl CartLine {
    /// Creates a new `CartLine`
    #[must_use]
    pub fn new(
        event_id: EventId,
        event_name: impl Into<String>,
        ticket_type: impl Into<TicketType>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            event_id,
            event_name: event_name.into(),
            ticket_type: ticket_type.into(),
            quantity,
            unit_price,
        }
    }

    /// Checks whether this line is keyed by `(event_id, ticket_type)`
    #[must_use]
    pub fn matches(&self, event_id: EventId, ticket_type: &TicketType) -> bool {
        self.event_id == event_id && self.ticket_type == *ticket_type
    }

    /// `unit_price × quantity`
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Payment channel for purchases (mobile-money push payment only)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// M-Pesa STK push
    #[default]
    #[serde(rename = "MPESA")]
    Mpesa,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpesa => f.write_str("MPESA"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticket_type_aliases() {
        assert_eq!(TicketType::parse("earlybird"), TicketType::EarlyBird);
        assert_eq!(TicketType::parse("EARLY_BIRD"), TicketType::EarlyBird);
        assert_eq!(TicketType::parse("advanced"), TicketType::Advance);
        assert_eq!(TicketType::parse("ADVANCE"), TicketType::Advance);
        assert_eq!(TicketType::parse("VIP"), TicketType::Vip);
        assert_eq!(TicketType::parse("vip"), TicketType::Vip);
        assert_eq!(
            TicketType::parse(" Balcony "),
            TicketType::Other("Balcony".to_string())
        );
    }

    #[test]
    fn test_ticket_type_wire_name() {
        assert_eq!(TicketType::EarlyBird.wire_name(), "EARLY_BIRD");
        assert_eq!(TicketType::Other("Balcony".to_string()).wire_name(), "BALCONY");
        assert_eq!(TicketType::Other("Balcony".to_string()).as_str(), "Balcony");
    }

    #[test]
    fn test_money_rejects_negative() {
        assert!(Money::try_new(dec!(-0.01)).is_none());
        assert_eq!(Money::try_new(dec!(0)), Some(Money::ZERO));
        assert_eq!(Money::clamped(dec!(-5)), Money::ZERO);
    }

    #[test]
    fn test_money_arithmetic() {
        let price = Money::try_new(dec!(12.5)).unwrap();
        assert_eq!(price.multiply(3).amount(), dec!(37.5));
        assert_eq!(price.saturating_sub(Money::from_shillings(20)), Money::ZERO);
        assert_eq!(
            vec![price, price].into_iter().sum::<Money>().amount(),
            dec!(25.0)
        );
    }

    #[test]
    fn test_money_display_rounds_half_away_from_zero() {
        let amount = Money::try_new(dec!(10.005)).unwrap();
        assert_eq!(amount.to_string(), "KSh 10.01");
        assert_eq!(Money::from_shillings(5000).to_string(), "KSh 5000.00");
    }

    #[test]
    fn test_cart_line_wire_shape() {
        let line = CartLine::new(EventId::new(1), "Sauti Sol Live", "VIP", 2, Money::from_shillings(5000));

        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "eventId": 1,
                "eventName": "Sauti Sol Live",
                "ticketType": "VIP",
                "quantity": 2,
                "price": 5000.0
            })
        );
    }

    #[test]
    fn test_cart_line_rejects_negative_price() {
        let raw = r#"{"eventId":1,"eventName":"x","ticketType":"VIP","quantity":1,"price":-3}"#;
        assert!(serde_json::from_str::<CartLine>(raw).is_err());
    }

    #[test]
    fn test_sale_window_requires_start_before_end() {
        let start = NaiveDateTime::parse_from_str("2025-06-01 10:00", "%Y-%m-%d %H:%M").unwrap();
        let end = NaiveDateTime::parse_from_str("2025-06-02 10:00", "%Y-%m-%d %H:%M").unwrap();

        assert!(SaleWindow::new(start, end).is_some());
        assert!(SaleWindow::new(end, start).is_none());
        assert!(SaleWindow::new(start, start).is_none());
        assert!(SaleWindow::new(start, end).unwrap().contains(start));
    }

    fn draft() -> EventDraft {
        EventDraft {
            name: "Koroga Festival".to_string(),
            location: "Nairobi".to_string(),
            description: None,
            category: Some("Music".to_string()),
            capacity: Capacity::new(500),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: None,
            end_date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            end_time: None,
        }
    }

    #[test]
    fn test_event_draft_default_times() {
        let draft = draft();
        assert_eq!(draft.starts_at().to_string(), "2025-03-01 00:00:00");
        assert_eq!(draft.ends_at().to_string(), "2025-03-02 23:59:00");
    }

    #[test]
    fn test_event_draft_validation() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(draft().validate(today), Ok(()));

        let mut zero = draft();
        zero.capacity = Capacity::new(0);
        assert_eq!(zero.validate(today), Err(EventDraftError::ZeroCapacity));

        let mut backwards = draft();
        backwards.end_date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(backwards.validate(today), Err(EventDraftError::EndsBeforeStart));

        let start_day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            draft().validate(start_day).unwrap_err().to_string(),
            "Event must start on or after 2025-03-02."
        );
    }

    #[test]
    fn test_listing_remaining() {
        let listing = TicketListing {
            ticket_type: TicketType::Vip,
            quantity: 10,
            quantity_sold: 4,
            price: Money::from_shillings(100),
            discount: None,
        };
        assert_eq!(listing.remaining(), 6);
    }
}
