//! Health and shield pools.

use bevy::prelude::*;

use crate::common::rng::RandomSource;
use crate::plugins::combat::damage::{DamageEvent, DamageSource, Resistances, resolve};

/// Incoming damage never crit-rolls with the attacker's luck; every target resolves at 0.
pub const ENTITY_LUCK: f32 = 0.0;

/// `0 <= hp <= max_hp`. Once `is_dead` is set it only clears through [`Health::revive`].
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    hp: u32,
    max_hp: u32,
    is_dead: bool,
}

impl Health {
    pub fn new(max_hp: u32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            is_dead: false,
        }
    }

    pub fn with_hp(max_hp: u32, hp: u32) -> Self {
        let mut health = Self::new(max_hp);
        health.hp = hp.min(health.max_hp);
        health
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.hp == 0
    }

    pub fn fraction(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }

    /// Returns `true` when this brought hp to zero.
    pub fn subtract(&mut self, amount: u32) -> bool {
        self.hp = self.hp.saturating_sub(amount);
        self.hp == 0
    }

    /// No effect on the dead.
    pub fn heal(&mut self, amount: u32) {
        if self.is_dead {
            return;
        }
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Idempotent: returns `true` only for the call that actually killed.
    pub fn die(&mut self) -> bool {
        if self.is_dead {
            return false;
        }
        self.is_dead = true;
        true
    }

    pub fn revive(&mut self) {
        self.hp = self.max_hp;
        self.is_dead = false;
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shield {
    shield: u32,
    max_shield: u32,
}

/// Split of an incoming hit between shield and hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub absorbed: u32,
    pub remainder: f32,
}

impl Shield {
    pub fn new(max_shield: u32) -> Self {
        Self {
            shield: max_shield,
            max_shield,
        }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.shield
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max_shield
    }

    /// Shield takes whole points (rounded up) before anything reaches the hull.
    pub fn absorb(&mut self, incoming: f32) -> Absorption {
        let incoming = incoming.max(0.0);
        let absorbed = (incoming.ceil() as u32).min(self.shield);
        self.shield -= absorbed;
        Absorption {
            absorbed,
            remainder: (incoming - absorbed as f32).max(0.0),
        }
    }

    /// Adds `amount`, clamped to `max_shield`.
    pub fn recover(&mut self, amount: u32) {
        self.shield = self.shield.saturating_add(amount).min(self.max_shield);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DamageOutcome {
    /// Target was dead or not accepting damage; nothing changed.
    Ignored,
    Applied { event: DamageEvent, killed: bool },
}

impl DamageOutcome {
    pub fn event(&self) -> Option<&DamageEvent> {
        match self {
            Self::Applied { event, .. } => Some(event),
            Self::Ignored => None,
        }
    }

    pub fn killed(&self) -> bool {
        matches!(self, Self::Applied { killed: true, .. })
    }
}

/// Hull-only resolution. Does not run the death transition.
pub fn damage_hull(
    health: &mut Health,
    resistances: &Resistances,
    source: &DamageSource,
    rng: &mut impl RandomSource,
) -> DamageEvent {
    let event = resolve(
        source.damage,
        &source.damage_type,
        resistances,
        ENTITY_LUCK,
        rng,
    );
    health.subtract(event.amount);
    event
}

/// Generic entity damage path.
///
/// `accepting` is false for targets that are temporarily immune (an entering boss).
/// Reaching zero hp runs [`Health::die`].
pub fn apply_damage(
    health: &mut Health,
    resistances: &Resistances,
    source: Option<&DamageSource>,
    accepting: bool,
    rng: &mut impl RandomSource,
) -> DamageOutcome {
    if health.is_dead() || !accepting {
        return DamageOutcome::Ignored;
    }

    let source = DamageSource::or_default(source);
    let event = damage_hull(health, resistances, &source, rng);
    let killed = health.is_depleted() && health.die();
    DamageOutcome::Applied { event, killed }
}
