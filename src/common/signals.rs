//! Outward gameplay signals.
//!
//! The core publishes these for presentation, audio, and UI layers. They are one-way: no core
//! system reads `CombatSignal` back to make a decision.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::config::PowerUpKind;
use crate::plugins::combat::damage::DamageEvent;

#[derive(Message, Clone, Debug, PartialEq)]
pub enum CombatSignal {
    DamageDealt { target: Entity, event: DamageEvent },
    EnemyDestroyed { x: f32, y: f32, is_boss: bool },
    BossDamaged { name: String, hp: u32, max_hp: u32, percent: f32 },
    BossDefeated { name: String },
    ScoreChange { points: u32 },
    LifeChange { lives: u32 },
    LevelFinished { level: String },
    GameOver,
    WeaponChange { weapon_id: String },
    PlayerHit { hp: u32, max_hp: u32 },
    PlayerShield { shield: u32, max_shield: u32 },
    PlayerHealed { hp: u32, max_hp: u32 },
    PowerUpActivated { key: String, kind: PowerUpKind, duration_ms: u32 },
}

/// Anything the pure core functions can publish signals into.
pub trait SignalSink {
    fn publish(&mut self, signal: CombatSignal);
}

impl SignalSink for Vec<CombatSignal> {
    fn publish(&mut self, signal: CombatSignal) {
        self.push(signal);
    }
}

impl SignalSink for MessageWriter<'_, CombatSignal> {
    fn publish(&mut self, signal: CombatSignal) {
        self.write(signal);
    }
}
