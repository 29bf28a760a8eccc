//! Projectiles plugin: one kinematic sensor per shot.
//!
//! # Data flow
//! ```text
//!   FixedUpdate
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ Behaviour (previous step): player / enemies / bosses         │
//!   │     - write FireRequest { weapon_id, origin, from_player }   │
//!   │                                                              │
//!   │ Spawn: spawn_projectiles                                     │
//!   │     - resolves WeaponStats from GameData                     │
//!   │     - aimed hostile shots head for the player                │
//!   │                                                              │
//!   │ Lifecycle: cull_projectiles                                  │
//!   │     - shots past the play area get PendingDespawn            │
//!   └──────────────────────────────────────────────────────────────┘
//!   FixedPostUpdate: combat::contacts turns shot contacts into HitRequest
//! ```
//!
//! Producers never spawn shots themselves; they only enqueue intent. Unknown weapon ids are a
//! configuration miss: logged and skipped.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::diagnostics::Diagnostics;
use crate::common::layers::shot_layers;
use crate::common::messages::FireRequest;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::config::{GameData, WeaponStats};
use crate::plugins::combat::damage::DamageSource;
use crate::plugins::combat::health::Health;
use crate::plugins::core::{CoreSet, PendingDespawn};
use crate::plugins::player::Player;

const SHOT_RADIUS: f32 = 4.0;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub source: DamageSource,
    pub from_player: bool,
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, spawn_projectiles.in_set(CoreSet::Spawn));
    app.add_systems(FixedUpdate, cull_projectiles.in_set(CoreSet::Lifecycle));
}

/// Player shots fly right, hostile shots left. Aimed hostile shots head for `target` instead.
pub fn projectile_velocity(
    weapon: &WeaponStats,
    origin: Vec2,
    from_player: bool,
    target: Option<Vec2>,
    default_speed: f32,
) -> Vec2 {
    let speed = if weapon.speed > 0.0 {
        weapon.speed
    } else {
        default_speed
    };

    if weapon.aimed
        && !from_player
        && let Some(target) = target
    {
        let dir = (target - origin).normalize_or_zero();
        if dir != Vec2::ZERO {
            return dir * speed;
        }
    }

    if from_player {
        Vec2::new(speed, 0.0)
    } else {
        Vec2::new(-speed, 0.0)
    }
}

/// Outside `[-margin, width + margin]` on x.
#[inline]
pub fn out_of_play(x: f32, tunables: &Tunables) -> bool {
    x > tunables.screen_width + tunables.projectile_margin || x < -tunables.projectile_margin
}

pub(crate) fn spawn_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<FireRequest>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    player: Query<(&Transform, &Health), With<Player>>,
) {
    let target = player
        .iter()
        .find(|(_, health)| !health.is_dead())
        .map(|(tf, _)| tf.translation.truncate());

    for request in requests.read() {
        let Some(weapon) = data.weapon(&request.weapon_id) else {
            warn!("unknown weapon '{}'; shot skipped", request.weapon_id);
            diagnostics.note("projectiles", &format!("unknown weapon '{}'", request.weapon_id));
            continue;
        };
        let velocity = projectile_velocity(
            weapon,
            request.origin,
            request.from_player,
            target,
            tunables.projectile_default_speed,
        );

        commands.spawn((
            Name::new("Projectile"),
            Projectile {
                source: DamageSource::new(weapon.damage, weapon.damage_type.clone()),
                from_player: request.from_player,
            },
            Transform::from_translation(request.origin.extend(2.0)),
            RigidBody::Kinematic,
            Collider::circle(SHOT_RADIUS),
            Sensor,
            // Avian only emits CollisionStart when one side opts in.
            CollisionEventsEnabled,
            shot_layers(request.from_player),
            LinearVelocity(velocity),
            DespawnOnExit(GameState::Playing),
        ));
    }
}

pub(crate) fn cull_projectiles(
    mut commands: Commands,
    tunables: Res<Tunables>,
    q: Query<(Entity, &Transform), (With<Projectile>, Without<PendingDespawn>)>,
) {
    for (e, tf) in &q {
        if out_of_play(tf.translation.x, &tunables) {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
