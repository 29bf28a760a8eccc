//! Contact classification: avian `CollisionStart` -> gameplay requests.
//!
//! Each pair resolves to at most one rule:
//! - player shot x enemy/boss: damage the target, retire the shot
//! - hostile shot x player: damage the player, retire the shot
//! - player x enemy body: ram damage to the player, enemy destroyed
//! - player x boss body: ram damage to the player
//! - player x powerup: collect
//!
//! A dead player has no role: its wreck is inert until respawn.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::{Layer, non_interacting};
use crate::common::messages::{HitRequest, PowerUpCollected};
use crate::common::tunables::Tunables;
use crate::plugins::boss::Boss;
use crate::plugins::combat::damage::DamageSource;
use crate::plugins::combat::health::Health;
use crate::plugins::core::PendingDespawn;
use crate::plugins::enemies::Enemy;
use crate::plugins::player::Player;
use crate::plugins::powerups::PowerUp;
use crate::plugins::projectiles::Projectile;

/// What an entity in a contact pair is, gameplay-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Player,
    Enemy,
    Boss,
    PowerUp,
    Shot { from_player: bool },
}

#[inline]
fn gameplay_owner(collider: Entity, body: Option<Entity>) -> Entity {
    body.unwrap_or(collider)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn classify_contacts(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    tunables: Res<Tunables>,
    q_shots: Query<&Projectile, Without<PendingDespawn>>,
    q_players: Query<&Health, With<Player>>,
    q_enemies: Query<(), With<Enemy>>,
    q_bosses: Query<(), With<Boss>>,
    q_power_ups: Query<(), (With<PowerUp>, Without<PendingDespawn>)>,
    mut hits: MessageWriter<HitRequest>,
    mut collected: MessageWriter<PowerUpCollected>,
    // per-step dedupe: a shot or pickup resolves once
    mut spent: Local<HashSet<Entity>>,
) {
    spent.clear();

    let role = |e: Entity| -> Option<Role> {
        if let Ok(shot) = q_shots.get(e) {
            Some(Role::Shot {
                from_player: shot.from_player,
            })
        } else if let Ok(health) = q_players.get(e) {
            (!health.is_dead()).then_some(Role::Player)
        } else if q_bosses.contains(e) {
            Some(Role::Boss)
        } else if q_enemies.contains(e) {
            Some(Role::Enemy)
        } else if q_power_ups.contains(e) {
            Some(Role::PowerUp)
        } else {
            None
        }
    };

    let ram = |damage: f32| DamageSource::new(damage, tunables.contact_damage_type.as_str());

    for ev in started.read() {
        let a = gameplay_owner(ev.collider1, ev.body1);
        let b = gameplay_owner(ev.collider2, ev.body2);
        let (Some(ra), Some(rb)) = (role(a), role(b)) else {
            continue;
        };

        // order the pair so each rule is written once
        let ((first, r1), (second, r2)) = if rank(ra) <= rank(rb) {
            ((a, ra), (b, rb))
        } else {
            ((b, rb), (a, ra))
        };

        match (r1, r2) {
            (Role::Shot { from_player: true }, Role::Enemy | Role::Boss)
            | (Role::Shot { from_player: false }, Role::Player) => {
                if !spent.insert(first) {
                    continue;
                }
                let Ok(shot) = q_shots.get(first) else {
                    continue;
                };
                hits.write(HitRequest::Damage {
                    target: second,
                    source: shot.source.clone(),
                });
                let membership = if shot.from_player {
                    Layer::PlayerShot
                } else {
                    Layer::HostileShot
                };
                commands
                    .entity(first)
                    .insert((PendingDespawn, non_interacting(membership)));
            }
            (Role::Player, Role::Enemy) => {
                hits.write(HitRequest::Damage {
                    target: first,
                    source: ram(tunables.enemy_contact_damage),
                });
                hits.write(HitRequest::Destroy { target: second });
            }
            (Role::Player, Role::Boss) => {
                hits.write(HitRequest::Damage {
                    target: first,
                    source: ram(tunables.boss_contact_damage),
                });
            }
            (Role::Player, Role::PowerUp) => {
                if spent.insert(second) {
                    collected.write(PowerUpCollected {
                        player: first,
                        power_up: second,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Shots sort first, then the player, so every rule sees `(shot|player, other)`.
#[inline]
fn rank(role: Role) -> u8 {
    match role {
        Role::Shot { .. } => 0,
        Role::Player => 1,
        Role::Boss => 2,
        Role::Enemy => 3,
        Role::PowerUp => 4,
    }
}
