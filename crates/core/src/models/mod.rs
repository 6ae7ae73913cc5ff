//! Shared domain models.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

/// One of the four resources a village accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Lumber from woodcutters.
    Wood,
    /// Clay from clay pits.
    Clay,
    /// Iron from iron mines.
    Iron,
    /// Crop from croplands.
    Crop,
}

impl ResourceKind {
    /// Every resource kind in display order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Clay,
        ResourceKind::Iron,
        ResourceKind::Crop,
    ];

    /// Single-glyph icon used by frontends.
    pub fn icon(self) -> &'static str {
        match self {
            ResourceKind::Wood => "🪵",
            ResourceKind::Clay => "🧱",
            ResourceKind::Iron => "⛏️",
            ResourceKind::Crop => "🌾",
        }
    }

    /// Localised label for the resource.
    pub fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::English, ResourceKind::Wood) => "Wood",
            (Locale::English, ResourceKind::Clay) => "Clay",
            (Locale::English, ResourceKind::Iron) => "Iron",
            (Locale::English, ResourceKind::Crop) => "Crop",
            (Locale::Arabic, ResourceKind::Wood) => "خشب",
            (Locale::Arabic, ResourceKind::Clay) => "طين",
            (Locale::Arabic, ResourceKind::Iron) => "حديد",
            (Locale::Arabic, ResourceKind::Crop) => "محاصيل",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::English))
    }
}

/// Language used for names and player-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// English labels.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Arabic labels.
    #[serde(rename = "ar")]
    Arabic,
}

impl Locale {
    /// Switch to the other supported locale.
    pub fn toggled(self) -> Self {
        match self {
            Locale::English => Locale::Arabic,
            Locale::Arabic => Locale::English,
        }
    }
}

/// One unsigned quantity per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceAmounts {
    /// Wood quantity.
    #[serde(default)]
    pub wood: u64,
    /// Clay quantity.
    #[serde(default)]
    pub clay: u64,
    /// Iron quantity.
    #[serde(default)]
    pub iron: u64,
    /// Crop quantity.
    #[serde(default)]
    pub crop: u64,
}

impl ResourceAmounts {
    /// Construct from explicit per-kind values.
    pub const fn new(wood: u64, clay: u64, iron: u64, crop: u64) -> Self {
        Self {
            wood,
            clay,
            iron,
            crop,
        }
    }

    /// The same quantity for every kind.
    pub const fn uniform(amount: u64) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    /// Multiply every quantity by `factor`, saturating on overflow.
    pub fn scaled(&self, factor: u64) -> Self {
        Self::new(
            self.wood.saturating_mul(factor),
            self.clay.saturating_mul(factor),
            self.iron.saturating_mul(factor),
            self.crop.saturating_mul(factor),
        )
    }

    /// Iterate over `(kind, quantity)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u64)> + '_ {
        ResourceKind::ALL.into_iter().map(move |kind| (kind, self[kind]))
    }

    /// True when every quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, amount)| amount == 0)
    }
}

impl Index<ResourceKind> for ResourceAmounts {
    type Output = u64;

    fn index(&self, kind: ResourceKind) -> &Self::Output {
        match kind {
            ResourceKind::Wood => &self.wood,
            ResourceKind::Clay => &self.clay,
            ResourceKind::Iron => &self.iron,
            ResourceKind::Crop => &self.crop,
        }
    }
}

impl IndexMut<ResourceKind> for ResourceAmounts {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut Self::Output {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Clay => &mut self.clay,
            ResourceKind::Iron => &mut self.iron,
            ResourceKind::Crop => &mut self.crop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_multiplies_every_kind() {
        let base = ResourceAmounts::new(40, 60, 30, 10);
        assert_eq!(base.scaled(2), ResourceAmounts::new(80, 120, 60, 20));
        assert_eq!(base.scaled(0), ResourceAmounts::default());
    }

    #[test]
    fn index_follows_kind() {
        let mut amounts = ResourceAmounts::uniform(5);
        amounts[ResourceKind::Iron] = 9;
        assert_eq!(amounts.iron, 9);
        assert_eq!(
            amounts.iter().collect::<Vec<_>>(),
            vec![
                (ResourceKind::Wood, 5),
                (ResourceKind::Clay, 5),
                (ResourceKind::Iron, 9),
                (ResourceKind::Crop, 5),
            ]
        );
    }

    #[test]
    fn locale_toggles_back_and_forth() {
        assert_eq!(Locale::default(), Locale::English);
        assert_eq!(Locale::English.toggled(), Locale::Arabic);
        assert_eq!(Locale::Arabic.toggled().toggled(), Locale::Arabic);
        assert_eq!(ResourceKind::Crop.label(Locale::Arabic), "محاصيل");
    }
}
