//! Discount-adjusted pricing.
//!
//! All calculations keep full decimal precision. Rounding happens only when a
//! price crosses the form boundary ([`parse_price`]) or is displayed.

use crate::input::parse_amount;
use crate::types::{Discount, DiscountKind, Money, TicketTierConfig, TicketType};
use rust_decimal::Decimal;
use thiserror::Error;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// ============================================================================
// Effective price
// ============================================================================

/// Applies an optional discount to a base price
///
/// - no discount, or a discount value ≤ 0: `base`
/// - percentage: `base × (1 − clamp(v, 0, 100) / 100)`
/// - fixed: `max(0, base − clamp(v, 0, base))`
///
/// The result is never negative and never above `base`.
#[must_use]
pub fn effective_price(base: Money, discount: Option<&Discount>) -> Money {
    let Some(discount) = discount else {
        return base;
    };
    if discount.value() <= Decimal::ZERO {
        return base;
    }

    match discount {
        Discount::Percentage(percent) => {
            let percent = (*percent).min(HUNDRED);
            Money::clamped(base.amount() * (Decimal::ONE - percent / HUNDRED))
        },
        Discount::Fixed(amount) => base.saturating_sub((*amount).min(base)),
    }
}

/// Revenue of one tier if it sells out: `quantity × effective price`
#[must_use]
pub fn tier_revenue(tier: &TicketTierConfig) -> Money {
    effective_price(tier.base_price, tier.discount.as_ref()).multiply(tier.quantity)
}

/// Sum of [`tier_revenue`] over every tier of an event
#[must_use]
pub fn total_earnings(tiers: &[TicketTierConfig]) -> Money {
    tiers.iter().map(tier_revenue).sum()
}

// ============================================================================
// Form input
// ============================================================================

/// Condition raised while clamping a discount typed by an organizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountCondition {
    /// Percentage above 100
    #[error("Discount percentage cannot exceed 100%.")]
    PercentageTooHigh,

    /// Fixed amount above the tier's base price
    #[error("Fixed discount cannot exceed ticket price ({base}).")]
    FixedExceedsPrice {
        /// Base price the discount was clamped to
        base: Money,
    },
}

/// Discount value after clamping, with the condition to display if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClampedDiscount {
    /// Value to store in the form
    pub value: Decimal,
    /// Why the value was changed, if it was clamped down
    pub condition: Option<DiscountCondition>,
}

impl ClampedDiscount {
    /// Builds the discount rule for this value
    #[must_use]
    pub fn into_discount(self, kind: DiscountKind) -> Discount {
        match kind {
            DiscountKind::Percentage => Discount::Percentage(self.value),
            DiscountKind::Fixed => Discount::Fixed(Money::clamped(self.value)),
        }
    }
}

/// Clamps a discount value typed by an organizer
///
/// Negative values become 0 silently. A percentage above 100 becomes 100 and
/// a fixed amount above `base` becomes `base`, each with a condition.
#[must_use]
pub fn clamp_discount_input(kind: DiscountKind, value: Decimal, base: Money) -> ClampedDiscount {
    let value = value.max(Decimal::ZERO);

    match kind {
        DiscountKind::Percentage if value > HUNDRED => ClampedDiscount {
            value: HUNDRED,
            condition: Some(DiscountCondition::PercentageTooHigh),
        },
        DiscountKind::Fixed if value > base.amount() => ClampedDiscount {
            value: base.amount(),
            condition: Some(DiscountCondition::FixedExceedsPrice { base }),
        },
        _ => ClampedDiscount { value, condition: None },
    }
}

/// Condition raised while parsing a price typed by an organizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceCondition {
    /// The typed price was negative
    #[error("Price for {ticket_type} must be at least KSh 1.")]
    Negative {
        /// Tier the price was typed for
        ticket_type: TicketType,
    },
}

/// Price after parsing, with the condition to display if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInput {
    /// Parsed price, rounded to two decimal places
    pub price: Money,
    /// Why the value was changed, if it was rejected
    pub condition: Option<PriceCondition>,
}

/// Parses a free-form base price
///
/// Non-numeric input gives 0. A negative price gives 0 with a condition.
#[must_use]
pub fn parse_price(input: &str, ticket_type: &TicketType) -> PriceInput {
    let amount = parse_amount(input).unwrap_or(Decimal::ZERO);

    match Money::try_new(amount) {
        Some(price) => PriceInput {
            price: price.rounded(),
            condition: None,
        },
        None => PriceInput {
            price: Money::ZERO,
            condition: Some(PriceCondition::Negative {
                ticket_type: ticket_type.clone(),
            }),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SaleWindow;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn money(amount: Decimal) -> Money {
        Money::try_new(amount).unwrap()
    }

    fn tier(ticket_type: TicketType, quantity: u32, price: Decimal, discount: Option<Discount>) -> TicketTierConfig {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        TicketTierConfig {
            ticket_type,
            quantity,
            base_price: money(price),
            sale_window: SaleWindow::new(
                day.and_hms_opt(0, 0, 0).unwrap(),
                day.and_hms_opt(23, 59, 0).unwrap(),
            )
            .unwrap(),
            discount,
        }
    }

    #[test]
    fn test_no_discount_returns_base() {
        let base = money(dec!(1500));
        assert_eq!(effective_price(base, None), base);
        assert_eq!(effective_price(base, Some(&Discount::Percentage(dec!(0)))), base);
        assert_eq!(effective_price(base, Some(&Discount::Percentage(dec!(-10)))), base);
        assert_eq!(effective_price(base, Some(&Discount::Fixed(Money::ZERO))), base);
    }

    #[test]
    fn test_percentage_discount() {
        let base = money(dec!(2000));
        assert_eq!(effective_price(base, Some(&Discount::Percentage(dec!(25)))).amount(), dec!(1500));
        assert_eq!(effective_price(base, Some(&Discount::Percentage(dec!(150)))), Money::ZERO);
    }

    #[test]
    fn test_fixed_discount_is_floored_at_zero() {
        let base = money(dec!(300));
        assert_eq!(effective_price(base, Some(&Discount::Fixed(money(dec!(120))))).amount(), dec!(180));
        assert_eq!(effective_price(base, Some(&Discount::Fixed(money(dec!(900))))), Money::ZERO);
    }

    #[test]
    fn test_no_rounding_inside_calculator() {
        let base = money(dec!(10));
        let price = effective_price(base, Some(&Discount::Percentage(dec!(33.333))));
        assert_eq!(price.amount(), dec!(6.6667));
        assert_eq!(price.to_string(), "KSh 6.67");
    }

    #[test]
    fn test_total_earnings() {
        let tiers = vec![
            tier(TicketType::EarlyBird, 50, dec!(1000), Some(Discount::Percentage(dec!(10)))),
            tier(TicketType::Vip, 10, dec!(5000), Some(Discount::Fixed(money(dec!(500))))),
            tier(TicketType::Advance, 0, dec!(1500), None),
        ];

        assert_eq!(tier_revenue(&tiers[0]).amount(), dec!(45000));
        assert_eq!(total_earnings(&tiers).amount(), dec!(90000));
    }

    #[test]
    fn test_clamp_discount_input() {
        let base = money(dec!(5000));

        let clamped = clamp_discount_input(DiscountKind::Percentage, dec!(120), base);
        assert_eq!(clamped.value, dec!(100));
        assert_eq!(
            clamped.condition.unwrap().to_string(),
            "Discount percentage cannot exceed 100%."
        );

        let clamped = clamp_discount_input(DiscountKind::Fixed, dec!(6000), base);
        assert_eq!(clamped.value, dec!(5000));
        assert_eq!(
            clamped.condition.unwrap().to_string(),
            "Fixed discount cannot exceed ticket price (KSh 5000.00)."
        );

        let clamped = clamp_discount_input(DiscountKind::Fixed, dec!(-4), base);
        assert_eq!(clamped.value, Decimal::ZERO);
        assert!(clamped.condition.is_none());
    }

    #[test]
    fn test_parse_price() {
        let parsed = parse_price("1499.999", &TicketType::Vip);
        assert_eq!(parsed.price.amount(), dec!(1500.00));
        assert!(parsed.condition.is_none());

        let parsed = parse_price("free", &TicketType::Vip);
        assert_eq!(parsed.price, Money::ZERO);
        assert!(parsed.condition.is_none());

        let parsed = parse_price("-5", &TicketType::EarlyBird);
        assert_eq!(parsed.price, Money::ZERO);
        assert_eq!(
            parsed.condition.unwrap().to_string(),
            "Price for EARLY_BIRD must be at least KSh 1."
        );
    }

    fn base_price() -> impl Strategy<Value = Money> {
        (0_i64..100_000_000).prop_map(|cents| Money::clamped(Decimal::new(cents, 2)))
    }

    proptest! {
        #[test]
        fn prop_undiscounted_price_is_base(base in base_price()) {
            prop_assert_eq!(effective_price(base, None), base);
        }

        #[test]
        fn prop_percentage_within_bounds(base in base_price(), tenths in -2_000_i64..3_000) {
            let percent = Decimal::new(tenths, 1);
            let price = effective_price(base, Some(&Discount::Percentage(percent)));

            let clamped = percent.max(Decimal::ZERO).min(HUNDRED);
            let expected = base.amount() * (Decimal::ONE - clamped / HUNDRED);
            prop_assert_eq!(price.amount(), expected);
            prop_assert!(price >= Money::ZERO);
            prop_assert!(price <= base);
        }

        #[test]
        fn prop_fixed_within_bounds(base in base_price(), off in base_price()) {
            let price = effective_price(base, Some(&Discount::Fixed(off)));

            let expected = (base.amount() - off.amount().min(base.amount())).max(Decimal::ZERO);
            prop_assert_eq!(price.amount(), expected);
            prop_assert!(price <= base);
        }
    }
}
