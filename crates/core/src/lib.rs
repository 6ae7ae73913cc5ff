#![warn(clippy::all, missing_docs)]

//! Core simulation for the village builder.
//!
//! This crate hosts the resource ledger, the building catalog, construction
//! and production rules, and the controller that runs the production ticker.
//! Frontends only read [`VillageSnapshot`]s and forward construction attempts.

pub mod building;
pub mod config;
pub mod controller;
pub mod ledger;
pub mod message;
pub mod models;
pub mod production;
pub mod snapshot;
pub mod state;

pub use building::{BuildingDefinition, BuildingKind, ConstructionError, ConstructionReceipt};
pub use crate::config::{AppConfig, SimulationConfig};
pub use controller::{VillageController, VillageEvent};
pub use ledger::{ResourceDelta, ResourceLedger};
pub use message::{MessageKind, TransientMessage};
pub use models::{Locale, ResourceAmounts, ResourceKind};
pub use snapshot::{BuildingCard, VillageSnapshot};
pub use state::{BuildingLevels, SimulationState};
