use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ledger::{ResourceDelta, ResourceLedger},
    models::ResourceAmounts,
};

use super::registry::BuildingKind;

/// Rejection raised by the affordability gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// At least one resource is below the scaled cost; nothing was spent.
    #[error("insufficient resources to build {kind} level {next_level}")]
    InsufficientResources {
        /// Building that was requested.
        kind: BuildingKind,
        /// Level the purchase would have reached.
        next_level: u32,
        /// Full cost of that level.
        required: ResourceAmounts,
        /// Per-kind amount missing from the ledger.
        shortfall: ResourceAmounts,
    },
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionReceipt {
    /// Building that was upgraded.
    pub kind: BuildingKind,
    /// Level after the upgrade.
    pub new_level: u32,
    /// Resources debited.
    pub cost: ResourceAmounts,
    /// Population after the upgrade.
    pub population: u64,
}

/// Cost of raising `kind` from `current_level` to the next level.
///
/// The Nth build (1-indexed) costs `base_cost × N`.
pub fn scaled_cost(kind: BuildingKind, current_level: u32) -> ResourceAmounts {
    kind.definition()
        .base_cost
        .scaled(u64::from(current_level) + 1)
}

/// Check the ledger against the next-level cost and produce the debit to apply.
///
/// Pure: the caller applies the returned delta. Either every kind is covered
/// or the whole purchase is refused.
pub fn price(
    ledger: &ResourceLedger,
    kind: BuildingKind,
    current_level: u32,
) -> Result<(ResourceAmounts, ResourceDelta), ConstructionError> {
    let cost = scaled_cost(kind, current_level);
    if !ledger.covers(&cost) {
        return Err(ConstructionError::InsufficientResources {
            kind,
            next_level: current_level.saturating_add(1),
            required: cost,
            shortfall: ledger.shortfall(&cost),
        });
    }
    Ok((cost, ResourceDelta::debit(&cost)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_scales_with_level() {
        assert_eq!(
            scaled_cost(BuildingKind::Woodcutter, 0),
            ResourceAmounts::new(40, 60, 30, 10)
        );
        assert_eq!(
            scaled_cost(BuildingKind::Woodcutter, 1),
            ResourceAmounts::new(80, 120, 60, 20)
        );
        assert_eq!(
            scaled_cost(BuildingKind::Wall, 4),
            ResourceAmounts::new(1000, 1500, 750, 250)
        );
    }

    #[test]
    fn price_refuses_partial_coverage() {
        let ledger = ResourceLedger::new(ResourceAmounts::new(500, 500, 500, 5));
        let err = price(&ledger, BuildingKind::TownHall, 0).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::InsufficientResources {
                kind: BuildingKind::TownHall,
                next_level: 1,
                required: ResourceAmounts::new(100, 80, 50, 30),
                shortfall: ResourceAmounts::new(0, 0, 0, 25),
            }
        );
    }

    #[test]
    fn price_returns_matching_debit() {
        let ledger = ResourceLedger::new(ResourceAmounts::uniform(500));
        let (cost, delta) = price(&ledger, BuildingKind::Cropland, 2).unwrap();
        assert_eq!(cost, ResourceAmounts::new(90, 120, 60, 30));
        assert_eq!(delta, ResourceDelta::debit(&cost));
    }
}
