//! Building catalog and construction rules.

/// Cost scaling and the affordability gate.
pub mod construction;
/// Static building definitions.
pub mod registry;

pub use construction::{scaled_cost, ConstructionError, ConstructionReceipt};
pub use registry::{catalog, BuildingDefinition, BuildingKind, RegistryError};
