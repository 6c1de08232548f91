//! Capacity-constrained quantity allocation.
//!
//! Organizers edit one tier at a time. The allocator grants the requested
//! quantity when the event still has room and otherwise clamps it to what is
//! left, pairing the clamp with a displayable condition.

use crate::types::Capacity;
use thiserror::Error;

pub use crate::input::parse_quantity;

/// Capacity condition shown next to a clamped tier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Total tickets cannot exceed event capacity ({capacity}). Max for this type: {max_for_tier}.")]
pub struct CapacityExceeded {
    /// Event-wide capacity
    pub capacity: Capacity,
    /// Largest quantity the edited tier may hold
    pub max_for_tier: u32,
}

/// Errors raised by the allocator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The edit addressed a tier that does not exist
    #[error("tier index {index} out of range ({tiers} tiers)")]
    UnknownTier {
        /// Requested index
        index: usize,
        /// Number of tiers
        tiers: usize,
    },
}

/// Outcome of a single quantity edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Quantity the edited tier ends up with
    pub granted: u32,
    /// Set when `granted` is lower than what was requested
    pub condition: Option<CapacityExceeded>,
}

impl Allocation {
    /// Returns `true` if the request was clamped
    #[must_use]
    pub const fn was_clamped(&self) -> bool {
        self.condition.is_some()
    }
}

/// Keeps the tiers of one event within the event's capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityAllocator {
    capacity: Capacity,
}

impl CapacityAllocator {
    /// Creates an allocator for an event with the given capacity
    #[must_use]
    pub const fn new(capacity: Capacity) -> Self {
        Self { capacity }
    }

    /// Event-wide capacity
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Computes the quantity granted to tier `index`
    ///
    /// The other tiers' total is taken from `current` before the edit, with
    /// the edited tier excluded.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownTier`] if `index` is out of range.
    pub fn allocate(
        &self,
        current: &[u32],
        index: usize,
        requested: u32,
    ) -> Result<Allocation, AllocationError> {
        if index >= current.len() {
            return Err(AllocationError::UnknownTier {
                index,
                tiers: current.len(),
            });
        }

        let other_total: u64 = current
            .iter()
            .enumerate()
            .filter(|(tier, _)| *tier != index)
            .map(|(_, quantity)| u64::from(*quantity))
            .sum();
        let capacity = u64::from(self.capacity.value());

        if other_total + u64::from(requested) > capacity {
            let max_for_tier = u32::try_from(capacity.saturating_sub(other_total)).unwrap_or(0);
            tracing::warn!(
                index,
                requested,
                granted = max_for_tier,
                capacity = self.capacity.value(),
                "Tier quantity clamped to remaining capacity"
            );
            return Ok(Allocation {
                granted: max_for_tier,
                condition: Some(CapacityExceeded {
                    capacity: self.capacity,
                    max_for_tier,
                }),
            });
        }

        Ok(Allocation {
            granted: requested,
            condition: None,
        })
    }

    /// Allocates and writes the granted quantity back into `quantities`
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::UnknownTier`] if `index` is out of range.
    pub fn apply(
        &self,
        quantities: &mut [u32],
        index: usize,
        requested: u32,
    ) -> Result<Allocation, AllocationError> {
        let allocation = self.allocate(quantities, index, requested)?;
        quantities[index] = allocation.granted;
        Ok(allocation)
    }
}

/// Clamps a buyer's requested quantity to a tier's own remaining stock
#[must_use]
pub const fn clamp_to_bound(requested: u32, bound: u32) -> u32 {
    if requested > bound { bound } else { requested }
}
