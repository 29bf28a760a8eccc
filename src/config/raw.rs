//! Serialized shapes of the game data file.
//!
//! Every field is optional and tolerant of the legacy spellings; validation into the typed
//! records in the parent module happens once, at load time.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawGameData {
    pub seed: Option<u64>,
    pub start_level: Option<String>,
    pub player: RawPlayer,
    pub enemies: HashMap<String, RawEnemy>,
    pub bosses: HashMap<String, RawBoss>,
    pub weapons: HashMap<String, RawWeapon>,
    pub powerups: HashMap<String, RawPowerUp>,
    pub levels: HashMap<String, RawLevel>,
    pub blocks: HashMap<String, Vec<RawSpawnEvent>>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawPlayer {
    #[serde(alias = "health")]
    pub hp: Option<u32>,
    pub max_hp: Option<u32>,
    pub speed: Option<f32>,
    pub fire_rate: Option<u32>,
    pub luck: Option<f32>,
    pub base_shields: Option<u32>,
    pub starting_weapon: Option<String>,
    pub spawn_position: Option<RawPoint>,
    pub visual_scale: Option<f32>,
    pub resistances: HashMap<String, f32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawEnemy {
    #[serde(alias = "health")]
    pub hp: Option<u32>,
    #[serde(alias = "pattern")]
    pub movement: Option<String>,
    pub speed: Option<f32>,
    pub weapon: Option<String>,
    pub fire_rate: Option<u32>,
    pub visual_scale: Option<f32>,
    pub resistances: HashMap<String, f32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawBoss {
    pub name: Option<String>,
    #[serde(alias = "health")]
    pub hp: Option<u32>,
    pub speed: Option<f32>,
    pub visual_scale: Option<f32>,
    pub behavior: Option<String>,
    pub resistances: HashMap<String, f32>,
    pub phases: Vec<RawBossPhase>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawBossPhase {
    pub hp_threshold: Option<f32>,
    pub weapon: Option<String>,
    pub fire_rate: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawWeapon {
    pub damage: Option<f32>,
    #[serde(rename = "type")]
    pub damage_type: Option<String>,
    pub speed: Option<f32>,
    pub aimed: bool,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawPowerUp {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(alias = "amount")]
    pub value: Option<f32>,
    pub stat: Option<String>,
    pub duration: Option<u32>,
    pub weapon_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawLevel {
    pub sequence: Vec<String>,
    pub next_level: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RawSpawnEvent {
    pub time: u32,
    pub is_boss: bool,
    pub enemy_id: Option<String>,
    pub boss_id: Option<String>,
    pub y: Option<f32>,
}
