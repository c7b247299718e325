//! Resource Deposits
//!
//! Flux mines. Born once, then only their remaining-rounds counter changes.
//! A deposit at zero rounds is left in place; how to show it is up to the renderer.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::location::MapLocation;

/// Simulator-assigned deposit id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepositId(pub u32);

impl fmt::Display for DepositId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a resource deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    /// Unique deposit id
    pub id: DepositId,

    /// Cell the deposit occupies
    pub location: MapLocation,

    /// Rounds of harvesting left
    pub rounds_remaining: u32,
}

impl ResourceDeposit {
    /// Create a new deposit.
    pub fn new(id: DepositId, location: MapLocation, rounds_remaining: u32) -> Self {
        Self { id, location, rounds_remaining }
    }

    /// Has the deposit run dry?
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.rounds_remaining == 0
    }

    /// Hash this deposit's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_location(self.location);
        hasher.update_u32(self.rounds_remaining);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depletion() {
        let mut deposit = ResourceDeposit::new(DepositId(1), MapLocation::new(4, 4), 2);
        assert!(!deposit.is_depleted());
        deposit.rounds_remaining = 0;
        assert!(deposit.is_depleted());
    }
}
