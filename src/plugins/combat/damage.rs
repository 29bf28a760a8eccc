//! Damage resolution.
//!
//! Stateless: `resolve` turns a base amount plus the target's resistances into the integer
//! amount actually subtracted from health.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

use crate::common::rng::RandomSource;

/// Open-ended damage category key (`"physical"`, `"laser"`, `"plasma"`, `"fisico"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DamageType(String);

impl DamageType {
    pub const PHYSICAL: &'static str = "physical";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DamageType {
    fn default() -> Self {
        Self::new(Self::PHYSICAL)
    }
}

impl From<&str> for DamageType {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-type multipliers. Missing entries mean 1.0.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct Resistances(HashMap<DamageType, f32>);

impl Resistances {
    pub fn multiplier(&self, damage_type: &DamageType) -> f32 {
        self.0.get(damage_type).copied().unwrap_or(1.0)
    }

    pub fn with(mut self, damage_type: impl Into<DamageType>, multiplier: f32) -> Self {
        self.0.insert(damage_type.into(), multiplier);
        self
    }
}

impl FromIterator<(DamageType, f32)> for Resistances {
    fn from_iter<I: IntoIterator<Item = (DamageType, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What hit us. Attached to projectiles; also built for contact damage.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageSource {
    pub damage: f32,
    pub damage_type: DamageType,
}

impl DamageSource {
    pub fn new(damage: f32, damage_type: impl Into<DamageType>) -> Self {
        Self {
            damage,
            damage_type: damage_type.into(),
        }
    }

    /// A missing source counts as `{ damage: 0, type: physical }`.
    pub fn or_default(source: Option<&DamageSource>) -> DamageSource {
        source.cloned().unwrap_or_default()
    }
}

impl Default for DamageSource {
    fn default() -> Self {
        Self::new(0.0, DamageType::default())
    }
}

/// Result of one resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageEvent {
    pub amount: u32,
    pub is_critical: bool,
    pub damage_type: DamageType,
    pub multiplier_applied: f32,
}

/// `floor(max(0, base) * multiplier * (crit ? 2 : 1))`, critical when a `[0, 100)` roll
/// lands under `luck / 2`.
///
/// The crit roll is always drawn so a seeded source yields the same sequence regardless of
/// the target.
pub fn resolve(
    base_damage: f32,
    damage_type: &DamageType,
    resistances: &Resistances,
    luck: f32,
    rng: &mut impl RandomSource,
) -> DamageEvent {
    let base = base_damage.max(0.0);
    let multiplier = resistances.multiplier(damage_type);
    let is_critical = rng.chance(luck * 0.5);

    let mut total = base * multiplier;
    if is_critical {
        total *= 2.0;
    }

    DamageEvent {
        // NaN and negatives saturate to 0
        amount: total.floor().max(0.0) as u32,
        is_critical,
        damage_type: damage_type.clone(),
        multiplier_applied: multiplier,
    }
}
