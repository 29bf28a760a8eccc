//! Enemies plugin: regular enemies that fly in from the right, shoot, and die.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) FACTS live in components:
//!    - `Enemy` holds the behaviour config and fire cadence.
//!    - `Health` is gameplay truth; combat resolution (elsewhere) mutates it.
//!    - `EnemyLifeState` says whether the enemy still participates.
//!
//! 2) RULES mutate facts in predictable places:
//!    - `steer_enemies` picks velocity + fires + culls (Behaviour phase).
//!    - `enemy_death_trigger` reads `Health` after resolution and transitions life state (Lifecycle phase).
//!
//! 3) STRUCTURAL changes are deferred:
//!    - dead or culled enemies get `PendingDespawn` and are removed in `PostUpdate`.
//!    - until then they stay in the world with non-interacting collision layers.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::FrameClock;
use crate::common::layers::{Layer, enemy_layers, non_interacting};
use crate::common::messages::{FireRequest, SpawnRequest};
use crate::common::rng::{GameRng, RandomSource};
use crate::common::signals::{CombatSignal, SignalSink};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::config::{EnemyStats, GameData, MovementPattern};
use crate::plugins::combat::cadence::FireCadence;
use crate::plugins::combat::health::Health;
use crate::plugins::core::{CoreSet, PendingDespawn};
use crate::plugins::player::Player;
use crate::plugins::powerups::roll_drop;

pub mod movement;

use movement::enemy_velocity;

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub actor_id: String,
    pub movement: MovementPattern,
    pub speed: f32,
    pub weapon_id: String,
    pub fire_rate_ms: u32,
    pub born_ms: f64,
    pub cadence: FireCadence,
}

/// Enemy lifecycle.
///
/// - Alive: normal gameplay.
/// - Destroyed: killed by the player; score and drops were handed out.
/// - Culled: left the play area; removed without any reward.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyLifeState {
    Alive,
    Destroyed,
    Culled,
}

/// What one step of an enemy asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStep {
    pub velocity: Vec2,
    pub fire_origin: Option<Vec2>,
    pub leave_play: bool,
}

impl Enemy {
    pub fn from_stats(actor_id: impl Into<String>, stats: &EnemyStats, now_ms: f64) -> Self {
        Self {
            actor_id: actor_id.into(),
            movement: stats.movement,
            speed: stats.speed,
            weapon_id: stats.weapon_id.clone(),
            fire_rate_ms: stats.fire_rate_ms,
            born_ms: now_ms,
            cadence: FireCadence::default(),
        }
    }

    /// Movement, fire cadence, and offscreen check for one step.
    ///
    /// Fires only while on screen; the next shot is jittered so waves don't fire in unison.
    pub fn step(
        &mut self,
        now_ms: f64,
        position: Vec2,
        target: Option<Vec2>,
        tunables: &Tunables,
        rng: &mut impl RandomSource,
    ) -> EnemyStep {
        let velocity = enemy_velocity(
            self.movement,
            now_ms - self.born_ms,
            self.speed,
            position,
            target,
        );

        let mut fire_origin = None;
        if self.cadence.ready(now_ms) && position.x < tunables.screen_width {
            fire_origin = Some(position - Vec2::new(tunables.enemy_muzzle_offset, 0.0));
            let jitter = rng.range_i32(-tunables.enemy_fire_jitter_ms, tunables.enemy_fire_jitter_ms);
            self.cadence.arm(now_ms, self.fire_rate_ms, jitter);
        }

        EnemyStep {
            velocity,
            fire_origin,
            leave_play: position.x < tunables.enemy_cull_x,
        }
    }
}

/// Rewards for a kill: score, the destroyed signal, and maybe a powerup drop.
pub fn on_enemy_destroyed(
    position: Vec2,
    luck: f32,
    data: &GameData,
    tunables: &Tunables,
    rng: &mut impl RandomSource,
    signals: &mut impl SignalSink,
) -> Option<SpawnRequest> {
    signals.publish(CombatSignal::ScoreChange {
        points: tunables.enemy_score,
    });
    signals.publish(CombatSignal::EnemyDestroyed {
        x: position.x,
        y: position.y,
        is_boss: false,
    });

    roll_drop(luck, data, rng).map(|key| SpawnRequest::PowerUp { key, position })
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, spawn_enemies.in_set(CoreSet::Spawn));
    app.add_systems(FixedUpdate, steer_enemies.in_set(CoreSet::Behaviour));
    app.add_systems(FixedUpdate, enemy_death_trigger.in_set(CoreSet::Lifecycle));
}

pub(crate) fn spawn_enemies(
    mut commands: Commands,
    mut requests: MessageReader<SpawnRequest>,
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
) {
    for request in requests.read() {
        let SpawnRequest::Enemy { actor_id, y, stats } = request else {
            continue;
        };
        let x = tunables.screen_width + tunables.enemy_spawn_offset_x;
        let enemy = Enemy::from_stats(actor_id.clone(), stats, clock.now_ms);
        let velocity = Vec2::new(-stats.speed, 0.0);

        commands.spawn((
            Name::new(format!("Enemy:{actor_id}")),
            enemy,
            EnemyLifeState::Alive,
            Health::new(stats.hp),
            stats.resistances.clone(),
            Transform::from_xyz(x, *y, 1.0),
            RigidBody::Kinematic,
            Collider::circle(16.0 * stats.visual_scale),
            CollisionEventsEnabled,
            enemy_layers(),
            LinearVelocity(velocity),
            DespawnOnExit(GameState::Playing),
        ));
    }
}

/// Steer, fire, and cull living enemies.
pub(crate) fn steer_enemies(
    mut commands: Commands,
    clock: Res<FrameClock>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut q: Query<
        (
            Entity,
            &mut Enemy,
            &mut EnemyLifeState,
            &mut Health,
            &Transform,
            &mut LinearVelocity,
            &mut CollisionLayers,
        ),
        Without<PendingDespawn>,
    >,
    player: Query<(&Transform, &Health), (With<Player>, Without<Enemy>)>,
    mut fire: MessageWriter<FireRequest>,
) {
    let target = player
        .iter()
        .find(|(_, health)| !health.is_dead())
        .map(|(tf, _)| tf.translation.truncate());

    for (e, mut enemy, mut life, mut health, tf, mut velocity, mut layers) in &mut q {
        if *life != EnemyLifeState::Alive || health.is_dead() {
            continue;
        }

        let step = enemy.step(
            clock.now_ms,
            tf.translation.truncate(),
            target,
            &tunables,
            &mut *rng,
        );
        velocity.0 = step.velocity;

        if let Some(origin) = step.fire_origin {
            fire.write(FireRequest {
                weapon_id: enemy.weapon_id.clone(),
                origin,
                from_player: false,
            });
        }

        if step.leave_play {
            // silent removal: no score, no signal
            health.die();
            *life = EnemyLifeState::Culled;
            *layers = non_interacting(Layer::Enemy);
            velocity.0 = Vec2::ZERO;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

/// Transition Alive -> Destroyed when health reports death.
///
/// This system does not despawn; it hands out rewards, stops interaction, and marks the entity.
pub(crate) fn enemy_death_trigger(
    mut commands: Commands,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut q: Query<
        (
            Entity,
            &Health,
            &mut EnemyLifeState,
            &Transform,
            &mut CollisionLayers,
            &mut LinearVelocity,
        ),
        (With<Enemy>, Without<PendingDespawn>),
    >,
    player: Query<&Player>,
    mut signals: MessageWriter<CombatSignal>,
    mut spawns: MessageWriter<SpawnRequest>,
) {
    let luck = player
        .iter()
        .next()
        .map_or(tunables.power_up_default_luck, |p| p.stats.luck);

    for (e, health, mut life, tf, mut layers, mut velocity) in &mut q {
        if *life != EnemyLifeState::Alive || !health.is_dead() {
            continue;
        }
        *life = EnemyLifeState::Destroyed;
        *layers = non_interacting(Layer::Enemy);
        velocity.0 = Vec2::ZERO;
        commands.entity(e).insert(PendingDespawn);

        let position = tf.translation.truncate();
        if let Some(drop) =
            on_enemy_destroyed(position, luck, &data, &tunables, &mut *rng, &mut signals)
        {
            spawns.write(drop);
        }
    }
}

/// Enemies still in play. Progression waits for this to reach zero.
pub fn count_active(q: &Query<&EnemyLifeState, With<Enemy>>) -> usize {
    q.iter()
        .filter(|life| **life == EnemyLifeState::Alive)
        .count()
}
