//! Simulation state and its single mutation entry point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    building::{construction, BuildingKind, ConstructionError, ConstructionReceipt},
    config::SimulationConfig,
    ledger::{ResourceDelta, ResourceLedger},
    production,
};

/// Level per building kind; unbuilt kinds read as level 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingLevels {
    levels: BTreeMap<BuildingKind, u32>,
}

impl BuildingLevels {
    /// Current level of `kind`.
    pub fn level(&self, kind: BuildingKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    /// Raise `kind` by one level and return the new level.
    fn increment(&mut self, kind: BuildingKind) -> u32 {
        let level = self.levels.entry(kind).or_insert(0);
        *level = level.saturating_add(1);
        *level
    }

    /// Built kinds with their levels, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildingKind, u32)> + '_ {
        self.levels
            .iter()
            .filter(|(_, level)| **level > 0)
            .map(|(kind, level)| (*kind, *level))
    }

    /// Sum of every building level.
    pub fn total(&self) -> u64 {
        self.levels.values().map(|level| u64::from(*level)).sum()
    }
}

/// A change requested of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// One production ticker firing.
    Produce,
    /// One construction attempt.
    Construct(BuildingKind),
}

/// What a successfully applied mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Production credited the ledger by this delta.
    Produced(ResourceDelta),
    /// A building was upgraded.
    Constructed(ConstructionReceipt),
}

/// Resources, building levels and population of one village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    ledger: ResourceLedger,
    levels: BuildingLevels,
    population: u64,
    population_per_build: u64,
    ticks: u64,
}

impl SimulationState {
    /// Fresh village seeded from configuration.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            ledger: ResourceLedger::new(config.initial_resources),
            levels: BuildingLevels::default(),
            population: config.initial_population,
            population_per_build: config.population_per_build,
            ticks: 0,
        }
    }

    /// Current resource holdings.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Current building levels.
    pub fn levels(&self) -> &BuildingLevels {
        &self.levels
    }

    /// Current population.
    pub fn population(&self) -> u64 {
        self.population
    }

    /// Number of production firings applied so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply one mutation.
    ///
    /// Every change goes through here. Each mutation derives its delta from
    /// `self` at the moment it is applied, so a credit and a debit queued for
    /// the same instant compose instead of overwriting each other.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Applied, ConstructionError> {
        match mutation {
            Mutation::Produce => Ok(Applied::Produced(self.produce())),
            Mutation::Construct(kind) => self.construct(kind).map(Applied::Constructed),
        }
    }

    /// Credit one production tick and return the delta.
    pub(crate) fn produce(&mut self) -> ResourceDelta {
        let delta = production::tick_yield(&self.levels);
        self.ledger.apply(&delta);
        self.ticks = self.ticks.saturating_add(1);
        debug!(tick = self.ticks, ?delta, "Production applied");
        delta
    }

    /// Upgrade `kind` by one level if the ledger covers the cost.
    pub(crate) fn construct(
        &mut self,
        kind: BuildingKind,
    ) -> Result<ConstructionReceipt, ConstructionError> {
        let current = self.levels.level(kind);
        let (cost, debit) = construction::price(&self.ledger, kind, current)?;

        self.ledger.apply(&debit);
        let new_level = self.levels.increment(kind);
        self.population = self.population.saturating_add(self.population_per_build);

        info!(building = %kind, level = new_level, population = self.population, "Building constructed");
        Ok(ConstructionReceipt {
            kind,
            new_level,
            cost,
            population: self.population,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceAmounts, ResourceKind};

    fn state_with(resources: ResourceAmounts) -> SimulationState {
        let config = SimulationConfig {
            initial_resources: resources,
            ..SimulationConfig::default()
        };
        SimulationState::new(&config)
    }

    #[test]
    fn woodcutter_scenario() {
        let mut state = SimulationState::new(&SimulationConfig::default());
        assert_eq!(state.population(), 50);

        let first = state
            .apply(Mutation::Construct(BuildingKind::Woodcutter))
            .unwrap();
        assert!(matches!(first, Applied::Constructed(receipt) if receipt.new_level == 1));
        assert_eq!(state.ledger().get(ResourceKind::Wood), 460);
        assert_eq!(state.levels().level(BuildingKind::Woodcutter), 1);
        assert_eq!(state.population(), 60);

        state
            .apply(Mutation::Construct(BuildingKind::Woodcutter))
            .unwrap();
        assert_eq!(state.ledger().get(ResourceKind::Wood), 380);
        assert_eq!(state.levels().level(BuildingKind::Woodcutter), 2);
        assert_eq!(state.population(), 70);

        let produced = state.apply(Mutation::Produce).unwrap();
        assert!(
            matches!(produced, Applied::Produced(delta) if delta.get(ResourceKind::Wood) == 10)
        );
        assert_eq!(state.ledger().get(ResourceKind::Wood), 390);
        assert_eq!(state.ticks(), 1);
    }

    #[test]
    fn rejected_construction_changes_nothing() {
        let mut state = state_with(ResourceAmounts::uniform(10));
        let before = state.clone();

        let err = state
            .apply(Mutation::Construct(BuildingKind::Granary))
            .unwrap_err();
        let ConstructionError::InsufficientResources { required, .. } = err;
        assert_eq!(required.wood, 60);
        assert_eq!(state, before);
        assert_eq!(state.levels().level(BuildingKind::Granary), 0);
    }

    #[test]
    fn successful_construction_debits_exact_cost() {
        let mut state = SimulationState::new(&SimulationConfig::default());
        let before = state.ledger().amounts();
        let Applied::Constructed(receipt) = state
            .apply(Mutation::Construct(BuildingKind::Marketplace))
            .unwrap()
        else {
            panic!("expected construction");
        };
        for kind in ResourceKind::ALL {
            assert_eq!(state.ledger().get(kind), before[kind] - receipt.cost[kind]);
        }
        assert_eq!(receipt.population, 60);
    }

    #[test]
    fn production_and_construction_compose() {
        let mut state = SimulationState::new(&SimulationConfig::default());
        state
            .apply(Mutation::Construct(BuildingKind::ClayPit))
            .unwrap();
        let clay_after_build = state.ledger().get(ResourceKind::Clay);

        state.apply(Mutation::Produce).unwrap();
        state
            .apply(Mutation::Construct(BuildingKind::Cropland))
            .unwrap();
        state.apply(Mutation::Produce).unwrap();

        // Two ticks of clay pit level 1, minus the cropland's clay cost.
        assert_eq!(
            state.ledger().get(ResourceKind::Clay),
            clay_after_build + 5 + 5 - 40
        );
    }

    #[test]
    fn ledger_balances_across_mixed_sequence() {
        let mut state = state_with(ResourceAmounts::uniform(1_000));
        let mut expected = [1_000_i64; 4];
        for round in 0..50 {
            let kind = BuildingKind::ALL[round % BuildingKind::ALL.len()];
            let outcome = state.apply(Mutation::Construct(kind));
            if let Ok(Applied::Constructed(receipt)) = outcome {
                for (idx, resource) in ResourceKind::ALL.iter().enumerate() {
                    expected[idx] -= receipt.cost[*resource] as i64;
                }
            }
            if round % 3 == 0 {
                if let Ok(Applied::Produced(delta)) = state.apply(Mutation::Produce) {
                    for (idx, resource) in ResourceKind::ALL.iter().enumerate() {
                        expected[idx] += delta.get(*resource);
                    }
                }
            }
        }

        for (idx, resource) in ResourceKind::ALL.iter().enumerate() {
            assert!(expected[idx] >= 0);
            assert_eq!(state.ledger().get(*resource) as i64, expected[idx]);
        }
        assert_eq!(state.population(), 50 + 10 * state.levels().total());
    }
}
