mod common;

use bevy::prelude::*;
use shmup_core::common::signals::CombatSignal;
use shmup_core::common::state::GameState;
use shmup_core::plugins::combat::health::Health;
use shmup_core::plugins::player::{Player, PlayerLives};
use shmup_core::plugins::progression::LevelScheduler;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    common::step(&mut app, 3);
}

#[test]
fn campaign_starts_in_play_with_a_player() {
    let mut app = common::app_headless();
    common::step(&mut app, 2);

    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Playing
    );
    let player = common::single::<Player>(&mut app).expect("player spawned");
    assert!(app.world().get::<Health>(player).is_some_and(|h| !h.is_dead()));
    assert_eq!(app.world().resource::<PlayerLives>().get(), Some(3));
    assert!(app.world().resource::<LevelScheduler>().is_running());

    assert!(common::signals(&app).contains(&CombatSignal::LifeChange { lives: 3 }));
}

#[test]
fn campaign_runs_for_a_while_without_panicking() {
    let mut app = common::app_headless();
    // 20 seconds of play: enemies spawn, fire, and leave the screen
    common::step_ms(&mut app, 20_000.0);
    assert!(app.world().resource::<LevelScheduler>().elapsed_ms() > 0.0);
}
