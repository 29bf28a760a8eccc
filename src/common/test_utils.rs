//! Test helpers.
//!
//! `World::run_system_once` executes a single system without building a schedule.
//! Systems that use `Commands` only enqueue structural changes, so we flush before returning.

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Drain every message of type `M` currently buffered in the world.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    world
        .resource_mut::<Messages<M>>()
        .drain()
        .collect()
}
