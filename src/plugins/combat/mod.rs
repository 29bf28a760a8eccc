//! Combat plugin: turns hits into health changes.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) Contacts are FACTS, not decisions:
//!    - `contacts::classify_contacts` (FixedPostUpdate, after avian emits `CollisionStart`)
//!      only decides *who hit whom* and writes `HitRequest` / `PowerUpCollected`.
//!
//! 2) One writer for hit resolution:
//!    - `resolve_hits` (FixedUpdate, Resolve phase) is the only system that applies damage.
//!      It routes each target through its own path: shield-first for the player,
//!      vulnerability-gated for bosses, the generic path for everything else.
//!
//! 3) Death is observed, not triggered:
//!    - resolution only leaves `Health` depleted/dead; each actor's Lifecycle system reacts.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::messages::HitRequest;
use crate::common::rng::GameRng;
use crate::common::signals::CombatSignal;
use crate::common::state::GameState;
use crate::plugins::boss::Boss;
use crate::plugins::core::CoreSet;
use crate::plugins::player::Player;
use crate::plugins::player::lifecycle::take_damage;

pub mod cadence;
pub mod contacts;
pub mod damage;
pub mod health;

use damage::Resistances;
use health::{DamageOutcome, Health, Shield, apply_damage};

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, resolve_hits.in_set(CoreSet::Resolve));
    app.add_systems(
        FixedPostUpdate,
        contacts::classify_contacts
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::Playing)),
    );
}

/// Apply every pending hit to its target.
pub(crate) fn resolve_hits(
    mut requests: MessageReader<HitRequest>,
    mut rng: ResMut<GameRng>,
    mut players: Query<(&Player, &mut Health, &mut Shield, &Resistances), Without<Boss>>,
    mut bosses: Query<(&Boss, &mut Health, &Resistances), Without<Player>>,
    mut others: Query<(&mut Health, &Resistances), (Without<Player>, Without<Boss>)>,
    mut signals: MessageWriter<CombatSignal>,
) {
    for request in requests.read() {
        match request {
            HitRequest::Damage { target, source } => {
                let target = *target;

                if let Ok((player, mut health, mut shield, resist)) = players.get_mut(target) {
                    let hit = take_damage(
                        player,
                        &mut health,
                        &mut shield,
                        resist,
                        Some(source),
                        &mut *rng,
                        &mut signals,
                    );
                    if let Some(event) = hit.and_then(|h| h.hull) {
                        signals.write(CombatSignal::DamageDealt { target, event });
                    }
                } else if let Ok((boss, mut health, resist)) = bosses.get_mut(target) {
                    let outcome = apply_damage(
                        &mut health,
                        resist,
                        Some(source),
                        boss.is_vulnerable(),
                        &mut *rng,
                    );
                    if let DamageOutcome::Applied { event, .. } = outcome {
                        signals.write(CombatSignal::DamageDealt { target, event });
                        signals.write(CombatSignal::BossDamaged {
                            name: boss.name().to_string(),
                            hp: health.hp(),
                            max_hp: health.max_hp(),
                            percent: health.fraction() * 100.0,
                        });
                    }
                } else if let Ok((mut health, resist)) = others.get_mut(target) {
                    let outcome = apply_damage(&mut health, resist, Some(source), true, &mut *rng);
                    if let DamageOutcome::Applied { event, .. } = outcome {
                        signals.write(CombatSignal::DamageDealt { target, event });
                    }
                } else {
                    debug!("hit on {target:?} has no damageable target");
                }
            }
            HitRequest::Destroy { target } => {
                if let Ok((mut health, _)) = others.get_mut(*target) {
                    health.die();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
