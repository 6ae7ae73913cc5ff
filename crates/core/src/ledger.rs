//! Resource ledger and signed deltas applied to it.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::models::{ResourceAmounts, ResourceKind};

/// Signed change to apply to a ledger, one entry per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceDelta {
    wood: i64,
    clay: i64,
    iron: i64,
    crop: i64,
}

impl ResourceDelta {
    /// Positive delta adding `amounts`.
    pub fn credit(amounts: &ResourceAmounts) -> Self {
        let mut delta = Self::default();
        for (kind, amount) in amounts.iter() {
            delta.adjust(kind, clamp_signed(amount));
        }
        delta
    }

    /// Negative delta removing `amounts`.
    pub fn debit(amounts: &ResourceAmounts) -> Self {
        let mut delta = Self::default();
        for (kind, amount) in amounts.iter() {
            delta.adjust(kind, -clamp_signed(amount));
        }
        delta
    }

    /// Signed amount for one kind.
    pub fn get(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Clay => self.clay,
            ResourceKind::Iron => self.iron,
            ResourceKind::Crop => self.crop,
        }
    }

    /// Accumulate `amount` into the entry for `kind`.
    pub fn adjust(&mut self, kind: ResourceKind, amount: i64) {
        let slot = match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Clay => &mut self.clay,
            ResourceKind::Iron => &mut self.iron,
            ResourceKind::Crop => &mut self.crop,
        };
        *slot = slot.saturating_add(amount);
    }

    /// True when applying the delta changes nothing.
    pub fn is_zero(&self) -> bool {
        ResourceKind::ALL.iter().all(|kind| self.get(*kind) == 0)
    }
}

impl Add for ResourceDelta {
    type Output = ResourceDelta;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for ResourceDelta {
    fn add_assign(&mut self, rhs: Self) {
        for kind in ResourceKind::ALL {
            self.adjust(kind, rhs.get(kind));
        }
    }
}

fn clamp_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// Current holdings of every resource kind.
///
/// The ledger does no validation of its own: spending code must check
/// [`ResourceLedger::covers`] before applying a debit. Quantities are integers
/// because every cost and yield in the catalog is integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: ResourceAmounts,
}

impl ResourceLedger {
    /// Ledger seeded with the given holdings.
    pub fn new(amounts: ResourceAmounts) -> Self {
        Self { amounts }
    }

    /// Quantity held for `kind`.
    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.amounts[kind]
    }

    /// Snapshot of all holdings.
    pub fn amounts(&self) -> ResourceAmounts {
        self.amounts
    }

    /// Add each entry of `delta` to the matching holding.
    pub fn apply(&mut self, delta: &ResourceDelta) {
        for kind in ResourceKind::ALL {
            let change = delta.get(kind);
            let slot = &mut self.amounts[kind];
            *slot = if change >= 0 {
                slot.saturating_add(change.unsigned_abs())
            } else {
                slot.saturating_sub(change.unsigned_abs())
            };
        }
    }

    /// True when every holding is at least the requested amount.
    pub fn covers(&self, cost: &ResourceAmounts) -> bool {
        cost.iter().all(|(kind, amount)| self.get(kind) >= amount)
    }

    /// Amount still missing per kind to pay `cost`; zero where already covered.
    pub fn shortfall(&self, cost: &ResourceAmounts) -> ResourceAmounts {
        let mut missing = ResourceAmounts::default();
        for (kind, amount) in cost.iter() {
            missing[kind] = amount.saturating_sub(self.get(kind));
        }
        missing
    }
}
