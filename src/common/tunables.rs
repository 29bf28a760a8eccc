//! Tunable gameplay constants.
//!
//! Values tied to a specific actor live in the game data (`config`); these are the fixed rules
//! every session shares. Times are milliseconds, distances are world pixels.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub screen_width: f32,
    pub screen_height: f32,

    // progression
    pub quiescence_ms: f64,
    pub minion_period_ms: f64,
    pub minion_actor_id: String,
    pub minion_y_min: i32,
    pub minion_y_max: i32,
    pub level_advance_delay_ms: f64,

    // player
    pub starting_lives: u32,
    pub respawn_delay_ms: f64,
    pub invulnerability_ms: f64,
    pub player_muzzle_offset: f32,

    // enemies
    pub enemy_score: u32,
    pub enemy_spawn_offset_x: f32,
    pub enemy_fire_jitter_ms: i32,
    pub enemy_muzzle_offset: f32,
    pub enemy_cull_x: f32,
    pub enemy_contact_damage: f32,
    pub boss_contact_damage: f32,
    pub contact_damage_type: String,

    // boss
    pub boss_spawn_offset_x: f32,
    pub boss_entry_x: f32,
    pub boss_entry_ms: f64,
    pub boss_death_delay_ms: f64,
    pub boss_score: u32,
    pub boss_muzzle_offset: f32,

    // projectiles + powerups
    pub projectile_default_speed: f32,
    pub projectile_margin: f32,
    pub power_up_default_duration_ms: u32,
    pub power_up_drift_speed: f32,
    pub power_up_default_luck: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            screen_width: 800.0,
            screen_height: 600.0,

            quiescence_ms: 3000.0,
            minion_period_ms: 5000.0,
            minion_actor_id: "interceptor_alpha".to_string(),
            minion_y_min: 100,
            minion_y_max: 500,
            level_advance_delay_ms: 2000.0,

            starting_lives: 3,
            respawn_delay_ms: 2000.0,
            invulnerability_ms: 3000.0,
            player_muzzle_offset: 30.0,

            enemy_score: 100,
            enemy_spawn_offset_x: 50.0,
            enemy_fire_jitter_ms: 300,
            enemy_muzzle_offset: 20.0,
            enemy_cull_x: -100.0,
            enemy_contact_damage: 20.0,
            boss_contact_damage: 30.0,
            contact_damage_type: "fisico".to_string(),

            boss_spawn_offset_x: 300.0,
            boss_entry_x: 600.0,
            boss_entry_ms: 2500.0,
            boss_death_delay_ms: 1500.0,
            boss_score: 5000,
            boss_muzzle_offset: 60.0,

            projectile_default_speed: 400.0,
            projectile_margin: 50.0,
            power_up_default_duration_ms: 5000,
            power_up_drift_speed: 80.0,
            power_up_default_luck: 15.0,
        }
    }
}
