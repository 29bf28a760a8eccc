//! Powerups: drops from destroyed enemies, drift left, and apply an effect on pickup.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::FrameClock;
use crate::common::diagnostics::Diagnostics;
use crate::common::layers::power_up_layers;
use crate::common::messages::{PowerUpCollected, SpawnRequest};
use crate::common::rng::{GameRng, RandomSource};
use crate::common::signals::{CombatSignal, SignalSink};
use crate::common::state::GameState;
use crate::common::timers::{TimerAction, TimerQueue, TimerService};
use crate::common::tunables::Tunables;
use crate::config::{GameData, PowerUpDef, PowerUpKind};
use crate::plugins::combat::health::Shield;
use crate::plugins::core::{CoreSet, PendingDespawn};
use crate::plugins::player::lifecycle::{LifecycleCtx, add_life};
use crate::plugins::player::{Player, PlayerLives};

const PICKUP_RADIUS: f32 = 12.0;
/// Vertical drift range, either way.
const DRIFT_Y: i32 = 30;

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PowerUp {
    pub key: String,
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, spawn_power_ups.in_set(CoreSet::Spawn));
    app.add_systems(FixedUpdate, collect_power_ups.in_set(CoreSet::Resolve));
    app.add_systems(FixedUpdate, cull_power_ups.in_set(CoreSet::Lifecycle));
}

/// Drop check for a kill: a `1..=100` roll at or under `luck` picks a random definition.
pub fn roll_drop(luck: f32, data: &GameData, rng: &mut impl RandomSource) -> Option<String> {
    if data.powerups.is_empty() {
        return None;
    }
    let roll = rng.range_i32(1, 100);
    if roll as f32 > luck {
        return None;
    }
    let index = rng.pick_index(data.powerups.len());
    data.powerups.keys().nth(index).cloned()
}

/// Apply one pickup to the player and announce it.
///
/// Timed stat mods schedule their own revert; everything else is permanent.
pub fn apply_power_up<T: TimerService, S: SignalSink>(
    def: &PowerUpDef,
    player: &mut Player,
    shield: &mut Shield,
    ctx: &mut LifecycleCtx<'_, T, S>,
) {
    match def.kind {
        PowerUpKind::Shield => {
            shield.recover(def.value.max(0.0).round() as u32);
            ctx.signals.publish(CombatSignal::PlayerShield {
                shield: shield.value(),
                max_shield: shield.max(),
            });
        }
        PowerUpKind::StatMod => {
            let Some(stat) = def.stat else {
                warn!("stat mod '{}' names no stat; ignored", def.key);
                return;
            };
            player.apply_stat_mod(stat, def.value);
            if let Some(duration) = def.duration_ms {
                ctx.timers.schedule_once(
                    ctx.now_ms,
                    f64::from(duration),
                    TimerAction::RevertStatMod {
                        stat,
                        value: def.value,
                    },
                );
            }
        }
        PowerUpKind::Weapon => {
            let Some(weapon_id) = def.weapon_id.as_deref() else {
                warn!("weapon powerup '{}' names no weapon; ignored", def.key);
                return;
            };
            player.equip_weapon(weapon_id);
            ctx.signals.publish(CombatSignal::WeaponChange {
                weapon_id: weapon_id.to_string(),
            });
        }
        PowerUpKind::Life => {
            let amount = if def.value >= 1.0 { def.value as u32 } else { 1 };
            add_life(ctx.lives, amount, ctx.tunables, &mut *ctx.signals);
        }
    }

    ctx.signals.publish(CombatSignal::PowerUpActivated {
        key: def.key.clone(),
        kind: def.kind,
        duration_ms: def
            .duration_ms
            .unwrap_or(ctx.tunables.power_up_default_duration_ms),
    });
}

pub(crate) fn spawn_power_ups(
    mut commands: Commands,
    mut requests: MessageReader<SpawnRequest>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut rng: ResMut<GameRng>,
) {
    for request in requests.read() {
        let SpawnRequest::PowerUp { key, position } = request else {
            continue;
        };
        if data.power_up(key).is_none() {
            warn!("unknown powerup '{key}'; drop skipped");
            diagnostics.note("powerups", &format!("unknown powerup '{key}'"));
            continue;
        }
        let drift = Vec2::new(
            -tunables.power_up_drift_speed,
            rng.range_i32(-DRIFT_Y, DRIFT_Y) as f32,
        );

        commands.spawn((
            Name::new(format!("PowerUp:{key}")),
            PowerUp { key: key.clone() },
            Transform::from_translation(position.extend(1.0)),
            RigidBody::Kinematic,
            Collider::circle(PICKUP_RADIUS),
            Sensor,
            power_up_layers(),
            LinearVelocity(drift),
            DespawnOnExit(GameState::Playing),
        ));
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn collect_power_ups(
    mut commands: Commands,
    mut collected: MessageReader<PowerUpCollected>,
    data: Res<GameData>,
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut lives: ResMut<PlayerLives>,
    mut timers: ResMut<TimerQueue>,
    power_ups: Query<&PowerUp, Without<PendingDespawn>>,
    mut players: Query<(&mut Player, &mut Shield)>,
    mut signals: MessageWriter<CombatSignal>,
) {
    let mut taken = HashSet::new();

    for PowerUpCollected { player, power_up } in collected.read() {
        if !taken.insert(*power_up) {
            continue;
        }
        let Ok(pickup) = power_ups.get(*power_up) else {
            continue;
        };
        let Ok((mut p, mut shield)) = players.get_mut(*player) else {
            continue;
        };
        commands.entity(*power_up).insert(PendingDespawn);

        let Some(def) = data.power_up(&pickup.key) else {
            warn!("collected unknown powerup '{}'", pickup.key);
            diagnostics.note("powerups", &format!("collected unknown powerup '{}'", pickup.key));
            continue;
        };
        debug!("powerup '{}' collected", def.key);

        let mut ctx = LifecycleCtx {
            now_ms: clock.now_ms,
            lives: &mut *lives,
            timers: &mut *timers,
            signals: &mut signals,
            tunables: &tunables,
        };
        apply_power_up(def, &mut p, &mut shield, &mut ctx);
    }
}

pub(crate) fn cull_power_ups(
    mut commands: Commands,
    tunables: Res<Tunables>,
    q: Query<(Entity, &Transform), (With<PowerUp>, Without<PendingDespawn>)>,
) {
    for (e, tf) in &q {
        if tf.translation.x < -tunables.projectile_margin {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
