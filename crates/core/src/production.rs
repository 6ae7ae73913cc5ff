//! Per-tick production yields.

use crate::{
    building::BuildingKind,
    ledger::ResourceDelta,
    models::ResourceKind,
    state::BuildingLevels,
};

/// Output of one `kind` building at `level` for a single tick.
pub fn rate_at(kind: BuildingKind, level: u32) -> Option<(ResourceKind, u64)> {
    kind.definition()
        .production
        .map(|(resource, per_level)| (resource, per_level.saturating_mul(u64::from(level))))
}

/// Combined credit produced by every built building in one tick.
pub fn tick_yield(levels: &BuildingLevels) -> ResourceDelta {
    let mut delta = ResourceDelta::default();
    for (kind, level) in levels.iter() {
        if let Some((resource, amount)) = rate_at(kind, level) {
            delta.adjust(resource, i64::try_from(amount).unwrap_or(i64::MAX));
        }
    }
    delta
}
