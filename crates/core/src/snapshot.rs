//! Read-only views handed to frontends.

use crate::{
    building::{scaled_cost, BuildingDefinition, BuildingKind},
    ledger::ResourceLedger,
    models::{ResourceAmounts, ResourceKind},
    message::TransientMessage,
    production,
    state::BuildingLevels,
};

/// Copy of the controller state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VillageSnapshot {
    /// Resource holdings.
    pub resources: ResourceAmounts,
    /// Current population.
    pub population: u64,
    /// Building levels.
    pub levels: BuildingLevels,
    /// Status message, if one is showing.
    pub message: Option<TransientMessage>,
    /// Production firings applied so far.
    pub ticks: u64,
    /// Whether the production ticker is running.
    pub running: bool,
}

/// Everything a building card displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingCard {
    /// Catalog entry.
    pub definition: &'static BuildingDefinition,
    /// Current level.
    pub level: u32,
    /// Cost of the next level.
    pub next_cost: ResourceAmounts,
    /// Whether the ledger covers `next_cost` right now.
    pub affordable: bool,
    /// Per-tick output at the current level.
    pub current_rate: Option<(ResourceKind, u64)>,
    /// Per-tick output after the next upgrade.
    pub next_rate: Option<(ResourceKind, u64)>,
}

impl VillageSnapshot {
    /// Level of `kind`.
    pub fn level(&self, kind: BuildingKind) -> u32 {
        self.levels.level(kind)
    }

    /// Card for one building kind.
    pub fn card(&self, kind: BuildingKind) -> BuildingCard {
        let level = self.level(kind);
        let next_cost = scaled_cost(kind, level);
        let affordable = ResourceLedger::new(self.resources).covers(&next_cost);
        BuildingCard {
            definition: kind.definition(),
            level,
            next_cost,
            affordable,
            current_rate: production::rate_at(kind, level),
            next_rate: production::rate_at(kind, level.saturating_add(1)),
        }
    }

    /// Cards for the whole catalog, in catalog order.
    pub fn cards(&self) -> Vec<BuildingCard> {
        BuildingKind::ALL
            .into_iter()
            .map(|kind| self.card(kind))
            .collect()
    }

    /// Combined per-tick output of the village.
    pub fn income(&self) -> ResourceAmounts {
        let delta = production::tick_yield(&self.levels);
        let mut income = ResourceAmounts::default();
        for kind in ResourceKind::ALL {
            income[kind] = delta.get(kind).max(0).unsigned_abs();
        }
        income
    }
}
