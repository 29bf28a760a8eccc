//! Player plugin: the ship, its lives, and the death/respawn loop.
//!
//! Pipeline (all `FixedUpdate`, gated on `GameState::Playing`):
//! - Reactions: respawn, invulnerability expiry, and stat-mod reverts from `TimerFired`
//! - Behaviour: apply `PlayerIntent` (movement + fire requests)
//! - Lifecycle: depleted hull -> `handle_death` behind the failure boundary
//!
//! Input sampling is the host's job. It writes [`PlayerIntent`]; nothing here reads devices.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::FrameClock;
use crate::common::diagnostics::Diagnostics;
use crate::common::layers::{Layer, non_interacting, player_layers};
use crate::common::messages::FireRequest;
use crate::common::signals::{CombatSignal, SignalSink};
use crate::common::state::GameState;
use crate::common::timers::{TimerAction, TimerFired, TimerId, TimerQueue};
use crate::common::tunables::Tunables;
use crate::config::{GameData, PlayerStat, PlayerStats, ShipStats};
use crate::plugins::combat::health::{Health, Shield};
use crate::plugins::core::CoreSet;

pub mod lifecycle;

use lifecycle::{
    DeathOutcome, LifecycleCtx, LifecycleError, clear_invulnerability, guarded, handle_death,
    respawn, trigger_game_over,
};

const PLAYER_RADIUS: f32 = 13.0;

// ---- Components ----

#[derive(Component, Debug, Clone)]
pub struct Player {
    /// Current stats, including active stat mods.
    pub stats: ShipStats,
    pub weapon_id: String,
    pub spawn_point: Vec2,
    pub can_act: bool,
    pub invulnerable: bool,
    pub respawn_timer: Option<TimerId>,
    pub invulnerability_timer: Option<TimerId>,
    next_fire_ms: f64,
}

impl Player {
    pub fn from_stats(stats: &PlayerStats) -> Self {
        Self {
            stats: stats.stats,
            weapon_id: stats.starting_weapon.clone(),
            spawn_point: stats.spawn,
            can_act: true,
            invulnerable: false,
            respawn_timer: None,
            invulnerability_timer: None,
            next_fire_ms: 0.0,
        }
    }

    /// Rate-limited by the current `fire_rate` stat. Returns whether a shot goes out.
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if !self.can_act || now_ms <= self.next_fire_ms {
            return false;
        }
        self.next_fire_ms = now_ms + f64::from(self.stats.fire_rate_ms.max(0.0));
        true
    }

    pub fn equip_weapon(&mut self, weapon_id: impl Into<String>) {
        self.weapon_id = weapon_id.into();
    }

    pub fn apply_stat_mod(&mut self, stat: PlayerStat, value: f32) {
        self.stats.add(stat, value);
    }

    /// Undo a timed stat mod. Unconditional: overlapping mods of the same stat stack and
    /// unwind independently.
    pub fn revert_stat_mod(&mut self, stat: PlayerStat, value: f32) {
        self.stats.add(stat, -value);
    }
}

// ---- Resources ----

/// Lives for the whole run. `None` until first read, so the starting count is applied once
/// and then survives respawns and level changes.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerLives(Option<u32>);

impl PlayerLives {
    pub fn get(&self) -> Option<u32> {
        self.0
    }

    pub fn get_or_init(&mut self, starting: u32) -> u32 {
        *self.0.get_or_insert(starting)
    }

    pub fn set(&mut self, lives: u32) {
        self.0 = Some(lives);
    }

    /// New game.
    pub fn reset(&mut self) {
        self.0 = None;
    }
}

/// What the host wants the ship to do this step.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Direction; normalized before scaling by the speed stat.
    pub movement: Vec2,
    pub fire: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerLives>()
        .init_resource::<PlayerIntent>()
        .add_systems(OnEnter(GameState::Playing), spawn_player)
        .add_systems(OnExit(GameState::GameOver), reset_lives)
        .add_systems(
            FixedUpdate,
            (
                handle_player_timers.in_set(CoreSet::Reactions),
                apply_intent.in_set(CoreSet::Behaviour),
                player_death_trigger.in_set(CoreSet::Lifecycle),
            ),
        );
}

pub(crate) fn spawn_player(
    mut commands: Commands,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    mut lives: ResMut<PlayerLives>,
    mut signals: MessageWriter<CombatSignal>,
) {
    let stats = &data.player;
    let player = Player::from_stats(stats);
    let health = Health::with_hp(stats.max_hp, stats.hp);
    let shield = Shield::new(stats.base_shields);

    // initial HUD state
    signals.publish(CombatSignal::LifeChange {
        lives: lives.get_or_init(tunables.starting_lives),
    });
    signals.publish(CombatSignal::PlayerHit {
        hp: health.hp(),
        max_hp: health.max_hp(),
    });
    signals.publish(CombatSignal::PlayerShield {
        shield: shield.value(),
        max_shield: shield.max(),
    });
    signals.publish(CombatSignal::WeaponChange {
        weapon_id: player.weapon_id.clone(),
    });

    commands.spawn((
        Name::new("Player"),
        Transform::from_translation(stats.spawn.extend(1.0)),
        player,
        health,
        shield,
        stats.resistances.clone(),
        RigidBody::Kinematic,
        Collider::circle(PLAYER_RADIUS * stats.visual_scale),
        CollisionEventsEnabled,
        player_layers(),
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::Playing),
    ));
}

fn reset_lives(mut lives: ResMut<PlayerLives>) {
    lives.reset();
}

pub(crate) fn apply_intent(
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
    intent: Res<PlayerIntent>,
    mut q_player: Query<(&mut Player, &Health, &Transform, &mut LinearVelocity)>,
    mut fire: MessageWriter<FireRequest>,
) {
    let Ok((mut player, health, tf, mut velocity)) = q_player.single_mut() else {
        return;
    };

    if !player.can_act || health.is_dead() {
        velocity.0 = Vec2::ZERO;
        return;
    }
    velocity.0 = intent.movement.normalize_or_zero() * player.stats.speed;

    if intent.fire && player.try_fire(clock.now_ms) {
        fire.write(FireRequest {
            weapon_id: player.weapon_id.clone(),
            origin: tf.translation.truncate() + Vec2::new(tunables.player_muzzle_offset, 0.0),
            from_player: true,
        });
    }
}

/// Depleted hull -> death handler, once.
#[allow(clippy::too_many_arguments)]
pub(crate) fn player_death_trigger(
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut lives: ResMut<PlayerLives>,
    mut timers: ResMut<TimerQueue>,
    mut next_state: ResMut<NextState<GameState>>,
    mut q_player: Query<(
        &mut Player,
        &mut Health,
        &mut LinearVelocity,
        &mut CollisionLayers,
    )>,
    mut signals: MessageWriter<CombatSignal>,
) {
    let Ok((mut player, mut health, mut velocity, mut layers)) = q_player.single_mut() else {
        return;
    };
    if !health.is_depleted() || health.is_dead() {
        return;
    }
    // the wreck neither rams, collects, nor soaks shots until respawn
    velocity.0 = Vec2::ZERO;
    *layers = non_interacting(Layer::Player);

    let mut ctx = LifecycleCtx {
        now_ms: clock.now_ms,
        lives: &mut *lives,
        timers: &mut *timers,
        signals: &mut signals,
        tunables: &tunables,
    };
    let outcome = guarded("player death", &diagnostics, || {
        Ok(handle_death(&mut player, &mut health, &mut ctx))
    });

    match outcome {
        Ok(DeathOutcome::GameOver) => next_state.set(GameState::GameOver),
        Ok(_) => {}
        Err(_) => {
            health.die();
            trigger_game_over(&mut player, &mut ctx);
            next_state.set(GameState::GameOver);
        }
    }
}

/// Player-owned timer actions: respawn, invulnerability expiry, stat-mod reverts.
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_player_timers(
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut lives: ResMut<PlayerLives>,
    mut timers: ResMut<TimerQueue>,
    mut next_state: ResMut<NextState<GameState>>,
    mut fired: MessageReader<TimerFired>,
    mut player: Query<(
        &mut Player,
        &mut Health,
        &Shield,
        &mut Transform,
        &mut LinearVelocity,
        &mut CollisionLayers,
    )>,
    mut signals: MessageWriter<CombatSignal>,
) {
    for TimerFired { id, action } in fired.read() {
        match action {
            TimerAction::RespawnPlayer => {
                let mut ctx = LifecycleCtx {
                    now_ms: clock.now_ms,
                    lives: &mut *lives,
                    timers: &mut *timers,
                    signals: &mut signals,
                    tunables: &tunables,
                };
                let found = player.single_mut().ok();
                let result = guarded("player respawn", &diagnostics, || {
                    let Some((mut p, mut health, shield, mut tf, mut velocity, mut layers)) = found
                    else {
                        return Err(LifecycleError::PlayerMissing { action: "respawn" });
                    };
                    respawn(&mut p, &mut health, shield, &mut ctx)?;
                    tf.translation = p.spawn_point.extend(tf.translation.z);
                    velocity.0 = Vec2::ZERO;
                    *layers = player_layers();
                    Ok(())
                });

                if result.is_err() {
                    if let Ok((mut p, mut health, ..)) = player.single_mut() {
                        health.die();
                        trigger_game_over(&mut p, &mut ctx);
                    } else {
                        ctx.signals.publish(CombatSignal::GameOver);
                    }
                    next_state.set(GameState::GameOver);
                }
            }
            TimerAction::ClearInvulnerability => {
                if let Ok((mut p, ..)) = player.single_mut()
                    && clear_invulnerability(&mut p, *id)
                {
                    debug!("player invulnerability expired");
                }
            }
            TimerAction::RevertStatMod { stat, value } => {
                if let Ok((mut p, ..)) = player.single_mut() {
                    p.revert_stat_mod(*stat, *value);
                    debug!("stat mod on {stat:?} expired");
                }
            }
            _ => {}
        }
    }
}
