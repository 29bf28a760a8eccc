//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the ECS runtime, `StatesPlugin` the game state machine.
//! - `AssetPlugin` + `ScenePlugin` are required by avian's collider plumbing.
//! - time advances by exactly one fixed step per `app.update()`, so tests count steps.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use shmup_core::common::signals::CombatSignal;
use shmup_core::config::GameData;

pub const STEP_HZ: f64 = 64.0;

/// Every `CombatSignal` seen so far, in publish order.
#[derive(Resource, Default, Debug)]
pub struct SignalLog(pub Vec<CombatSignal>);

fn record_signals(mut reader: MessageReader<CombatSignal>, mut log: ResMut<SignalLog>) {
    log.0.extend(reader.read().cloned());
}

fn base_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(Time::<Fixed>::from_hz(STEP_HZ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / STEP_HZ,
    )));
    app.init_resource::<SignalLog>();
    app.add_systems(Last, record_signals);
    app
}

/// Run plugin `finish`/`cleanup` hooks the way `App::run` would; tests drive
/// `app.update()` directly, and avian registers its diagnostics resources in `finish`.
fn finish(app: &mut App) {
    app.finish();
    app.cleanup();
}

/// The shipped campaign.
pub fn app_headless() -> App {
    let mut app = base_app();
    shmup_core::game::configure_headless(&mut app);
    finish(&mut app);
    app
}

/// Caller-supplied data; an empty `GameData` gives a player and an idle scheduler.
pub fn app_with_data(data: GameData) -> App {
    let mut app = base_app();
    shmup_core::game::configure_with_data(&mut app, data);
    finish(&mut app);
    app
}

pub fn step(app: &mut App, steps: usize) {
    for _ in 0..steps {
        app.update();
    }
}

/// Step roughly `ms` of game time.
pub fn step_ms(app: &mut App, ms: f64) {
    let steps = (ms / 1000.0 * STEP_HZ).ceil() as usize;
    step(app, steps);
}

/// Step until `done` holds, failing after `max_steps`.
pub fn step_until(app: &mut App, max_steps: usize, mut done: impl FnMut(&mut App) -> bool) {
    for _ in 0..max_steps {
        app.update();
        if done(app) {
            return;
        }
    }
    panic!("condition not reached within {max_steps} steps");
}

pub fn signals(app: &App) -> &[CombatSignal] {
    &app.world().resource::<SignalLog>().0
}

pub fn single<C: Component>(app: &mut App) -> Option<Entity> {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .iter(app.world())
        .next()
}
