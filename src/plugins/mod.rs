//! Feature plugins.
//!
//! Registration order matters only for resource defaults: `core` initializes the shared
//! resources that `physics` reads while building.

use bevy::prelude::*;

pub mod boss;
pub mod combat;
pub mod core;
pub mod enemies;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod progression;
pub mod projectiles;

/// Register every gameplay plugin. None of them need a window or renderer.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    combat::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    boss::plugin(app);
    projectiles::plugin(app);
    powerups::plugin(app);
    progression::plugin(app);
}
