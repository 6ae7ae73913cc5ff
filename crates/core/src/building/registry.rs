use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Locale, ResourceAmounts, ResourceKind};

/// Closed set of constructible buildings, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    /// Village administration.
    TownHall,
    /// Troop training.
    Barracks,
    /// Storage for wood, clay and iron.
    Warehouse,
    /// Storage for crop.
    Granary,
    /// Produces wood.
    Woodcutter,
    /// Produces clay.
    ClayPit,
    /// Produces iron.
    IronMine,
    /// Produces crop.
    Cropland,
    /// Village defences.
    Wall,
    /// Trading post.
    Marketplace,
}

/// Static description of a building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingDefinition {
    /// Kind this entry describes.
    pub kind: BuildingKind,
    /// Stable identifier, matching the serde name.
    pub id: &'static str,
    /// English display name.
    pub name_en: &'static str,
    /// Arabic display name.
    pub name_ar: &'static str,
    /// Glyph shown on building cards.
    pub icon: &'static str,
    /// Cost of the first level; later levels multiply it.
    pub base_cost: ResourceAmounts,
    /// Per-level, per-tick yield. `None` for non-producing buildings.
    pub production: Option<(ResourceKind, u64)>,
}

impl BuildingDefinition {
    /// Display name in the requested locale.
    pub fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::English => self.name_en,
            Locale::Arabic => self.name_ar,
        }
    }

    /// Whether levels of this building feed the production ticker.
    pub fn produces(&self) -> bool {
        self.production.is_some()
    }
}

/// Lookup failure for textual building identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No catalog entry carries the given identifier.
    #[error("unknown building id `{0}`")]
    UnknownBuilding(String),
}

static CATALOG: [BuildingDefinition; 10] = [
    BuildingDefinition {
        kind: BuildingKind::TownHall,
        id: "townHall",
        name_en: "Town Hall",
        name_ar: "قاعة المدينة",
        icon: "🏛️",
        base_cost: ResourceAmounts::new(100, 80, 50, 30),
        production: None,
    },
    BuildingDefinition {
        kind: BuildingKind::Barracks,
        id: "barracks",
        name_en: "Barracks",
        name_ar: "الثكنات",
        icon: "⚔️",
        base_cost: ResourceAmounts::new(150, 120, 100, 50),
        production: None,
    },
    BuildingDefinition {
        kind: BuildingKind::Warehouse,
        id: "warehouse",
        name_en: "Warehouse",
        name_ar: "المستودع",
        icon: "📦",
        base_cost: ResourceAmounts::new(80, 100, 30, 20),
        production: None,
    },
    BuildingDefinition {
        kind: BuildingKind::Granary,
        id: "granary",
        name_en: "Granary",
        name_ar: "صومعة الحبوب",
        icon: "🌾",
        base_cost: ResourceAmounts::new(60, 70, 40, 20),
        production: None,
    },
    BuildingDefinition {
        kind: BuildingKind::Woodcutter,
        id: "woodcutter",
        name_en: "Woodcutter",
        name_ar: "حطاب",
        icon: "🪵",
        base_cost: ResourceAmounts::new(40, 60, 30, 10),
        production: Some((ResourceKind::Wood, 5)),
    },
    BuildingDefinition {
        kind: BuildingKind::ClayPit,
        id: "clayPit",
        name_en: "Clay Pit",
        name_ar: "منجم الطين",
        icon: "🧱",
        base_cost: ResourceAmounts::new(60, 40, 30, 10),
        production: Some((ResourceKind::Clay, 5)),
    },
    BuildingDefinition {
        kind: BuildingKind::IronMine,
        id: "ironMine",
        name_en: "Iron Mine",
        name_ar: "منجم الحديد",
        icon: "⛏️",
        base_cost: ResourceAmounts::new(80, 70, 40, 20),
        production: Some((ResourceKind::Iron, 5)),
    },
    BuildingDefinition {
        kind: BuildingKind::Cropland,
        id: "cropland",
        name_en: "Cropland",
        name_ar: "حقل المحاصيل",
        icon: "🌿",
        base_cost: ResourceAmounts::new(30, 40, 20, 10),
        production: Some((ResourceKind::Crop, 5)),
    },
    BuildingDefinition {
        kind: BuildingKind::Wall,
        id: "wall",
        name_en: "Wall",
        name_ar: "السور",
        icon: "🏰",
        base_cost: ResourceAmounts::new(200, 300, 150, 50),
        production: None,
    },
    BuildingDefinition {
        kind: BuildingKind::Marketplace,
        id: "marketplace",
        name_en: "Marketplace",
        name_ar: "السوق",
        icon: "🏪",
        base_cost: ResourceAmounts::new(120, 150, 80, 40),
        production: None,
    },
];

impl BuildingKind {
    /// Every building kind in catalog order.
    pub const ALL: [BuildingKind; 10] = [
        BuildingKind::TownHall,
        BuildingKind::Barracks,
        BuildingKind::Warehouse,
        BuildingKind::Granary,
        BuildingKind::Woodcutter,
        BuildingKind::ClayPit,
        BuildingKind::IronMine,
        BuildingKind::Cropland,
        BuildingKind::Wall,
        BuildingKind::Marketplace,
    ];

    /// Catalog entry for this kind.
    pub fn definition(self) -> &'static BuildingDefinition {
        &CATALOG[self as usize]
    }

    /// Parse a stable identifier such as `clayPit`.
    pub fn from_id(id: &str) -> Result<Self, RegistryError> {
        CATALOG
            .iter()
            .find(|definition| definition.id == id)
            .map(|definition| definition.kind)
            .ok_or_else(|| RegistryError::UnknownBuilding(id.to_string()))
    }
}

impl FromStr for BuildingKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim())
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.definition().name_en)
    }
}

/// The full, read-only building catalog.
pub fn catalog() -> &'static [BuildingDefinition] {
    &CATALOG
}
