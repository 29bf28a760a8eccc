//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_headless`: the embedded campaign, seeded from its own `seed`.
//! - `configure_with_data`: caller-supplied `GameData` (tests, alternate campaigns).
//!
//! Neither adds a window or renderer. The host adds `MinimalPlugins` + `StatesPlugin`
//! (or `DefaultPlugins` plus its own presentation layer) before calling in.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::config::GameData;
use crate::plugins;

/// Install the core with the embedded campaign.
///
/// A campaign that fails validation is logged and replaced by empty data, so the app still
/// boots (idle scheduler, default player).
pub fn configure_headless(app: &mut App) {
    let data = GameData::campaign().unwrap_or_else(|err| {
        error!("embedded campaign rejected: {err}");
        GameData::default()
    });
    configure_with_data(app, data);
}

/// Install the core with caller-supplied configuration.
///
/// The RNG is seeded from `data.seed` unless the caller already inserted a `GameRng`.
pub fn configure_with_data(app: &mut App, data: GameData) {
    if !app.world().contains_resource::<GameRng>() {
        app.insert_resource(GameRng::seeded(data.seed));
    }
    app.insert_resource(data);
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
