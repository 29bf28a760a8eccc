//! Internal request messages.
//!
//! Unlike [`CombatSignal`](crate::common::signals::CombatSignal), these are consumed by core
//! systems: one plugin asks, another acts.

use bevy::prelude::*;

use crate::config::{BossStats, EnemyStats};
use crate::plugins::combat::damage::DamageSource;

/// Ask the spawner side to materialize an actor.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum SpawnRequest {
    Enemy {
        actor_id: String,
        y: f32,
        stats: EnemyStats,
    },
    Boss {
        actor_id: String,
        stats: BossStats,
    },
    PowerUp {
        key: String,
        position: Vec2,
    },
}

/// Spawn one projectile for `weapon_id` at `origin`.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct FireRequest {
    pub weapon_id: String,
    pub origin: Vec2,
    pub from_player: bool,
}

/// Gameplay fact: `target` was struck.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum HitRequest {
    /// Route through the target's damage path (resistances, shields, vulnerability).
    Damage { target: Entity, source: DamageSource },
    /// Kill outright, skipping damage resolution. Used for ramming contacts.
    Destroy { target: Entity },
}

/// A boss finished its death sequence. Resumes level progression.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct BossResolved {
    pub boss: Entity,
    pub name: String,
}

/// The player touched a powerup.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct PowerUpCollected {
    pub player: Entity,
    pub power_up: Entity,
}
