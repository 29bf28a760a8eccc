//! Core plugin: shared resources, message registration, and fixed-step ordering.

use bevy::prelude::*;

use crate::common::clock::{FrameClock, sync_from_fixed_time};
use crate::common::diagnostics::Diagnostics;
use crate::common::messages::{BossResolved, FireRequest, HitRequest, PowerUpCollected, SpawnRequest};
use crate::common::rng::GameRng;
use crate::common::signals::CombatSignal;
use crate::common::state::GameState;
use crate::common::timers::{TimerFired, TimerQueue, dispatch_due_timers};
use crate::common::tunables::Tunables;

/// Fixed-step phases, in order.
///
/// Requests written in one phase are read by a later phase of the same step; anything written
/// by `Progression` is picked up by `Spawn` on the next step.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreSet {
    /// Drain due timers into `TimerFired`.
    Timers,
    /// React to fired timers (respawn, stat reverts, minions, level advance).
    Reactions,
    /// Materialize requested actors and projectiles.
    Spawn,
    /// Movement, firing, and boss stage updates.
    Behaviour,
    /// Apply hits to health and shields.
    Resolve,
    /// Death and despawn transitions.
    Lifecycle,
    /// Level scheduler tick.
    Progression,
}

/// Marker: entity should be removed from the world.
///
/// Entities are never despawned inside the fixed step; they are marked and removed in `PostUpdate`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

pub fn plugin(app: &mut App) {
    // `init_resource` keeps anything the composition root already inserted.
    app.init_resource::<Tunables>()
        .init_resource::<FrameClock>()
        .init_resource::<TimerQueue>()
        .init_resource::<GameRng>()
        .init_resource::<Diagnostics>();

    app.add_message::<CombatSignal>()
        .add_message::<SpawnRequest>()
        .add_message::<FireRequest>()
        .add_message::<HitRequest>()
        .add_message::<BossResolved>()
        .add_message::<PowerUpCollected>()
        .add_message::<TimerFired>();

    app.configure_sets(
        FixedUpdate,
        (
            CoreSet::Timers,
            CoreSet::Reactions,
            CoreSet::Spawn,
            CoreSet::Behaviour,
            CoreSet::Resolve,
            CoreSet::Lifecycle,
            CoreSet::Progression,
        )
            .chain()
            .run_if(in_state(GameState::Playing)),
    );

    app.add_systems(FixedFirst, sync_from_fixed_time);
    app.add_systems(FixedUpdate, dispatch_due_timers.in_set(CoreSet::Timers));
    app.add_systems(PostUpdate, despawn_marked);
}

/// Structural cleanup after fixed-step work is done.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
