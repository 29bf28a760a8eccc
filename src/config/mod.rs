//! Game data: load once, validate once.
//!
//! The data file is authored in RON and deserialized into the tolerant shapes in [`raw`].
//! [`GameData::from_raw`] resolves every default and legacy alias up front, so gameplay code
//! only ever sees fully-populated typed records. Runtime lookups return `Option`; a miss is a
//! content bug that callers log and skip.

use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;
use thiserror::Error;

use crate::plugins::combat::damage::{DamageType, Resistances};

pub mod raw;

use raw::{RawBoss, RawEnemy, RawGameData, RawPlayer, RawPowerUp, RawSpawnEvent, RawWeapon};

/// Embedded default campaign.
pub const CAMPAIGN_RON: &str = include_str!("../../assets/data/campaign.ron");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{section} '{key}': missing field `{field}`")]
    MissingField {
        section: &'static str,
        key: String,
        field: &'static str,
    },
    #[error("{section} '{key}': {reason}")]
    InvalidValue {
        section: &'static str,
        key: String,
        reason: String,
    },
    #[error("{section} '{key}' references unknown {kind} '{target}'")]
    UnknownReference {
        section: &'static str,
        key: String,
        kind: &'static str,
        target: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementPattern {
    Linear,
    SineWave,
    Zigzag,
    Pursuit,
    BurstSpeed,
    Circular,
    WaveComplex,
}

impl MovementPattern {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "linear" => Self::Linear,
            "sine" | "sine_wave" => Self::SineWave,
            "zigzag" => Self::Zigzag,
            "pursuit" => Self::Pursuit,
            "burst_speed" => Self::BurstSpeed,
            "circular" => Self::Circular,
            "wave_complex" => Self::WaveComplex,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossBehavior {
    VerticalBounce,
    FigureEight,
    HorizontalDrift,
    AggressivePursuit,
    ChaosPattern,
    /// Unknown or absent behavior: the boss holds position once it has entered.
    Hold,
}

impl BossBehavior {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "vertical_bounce" => Self::VerticalBounce,
            "figure_eight" => Self::FigureEight,
            "horizontal_drift" => Self::HorizontalDrift,
            "aggressive_pursuit" => Self::AggressivePursuit,
            "chaos_pattern" => Self::ChaosPattern,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerStat {
    Speed,
    FireRate,
    Luck,
}

impl PlayerStat {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "speed" => Self::Speed,
            "fire_rate" | "fireRate" => Self::FireRate,
            "luck" => Self::Luck,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// `"shield"` and `"heal"` both restore shield points.
    Shield,
    StatMod,
    Weapon,
    Life,
}

impl PowerUpKind {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "shield" | "heal" => Self::Shield,
            "stat_mod" | "stat_boost" => Self::StatMod,
            "weapon" => Self::Weapon,
            "life" => Self::Life,
            _ => return None,
        })
    }
}

/// Mutable ship stats; power-ups adjust these on top of the configured base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipStats {
    pub speed: f32,
    pub fire_rate_ms: f32,
    pub luck: f32,
}

impl ShipStats {
    pub fn get(&self, stat: PlayerStat) -> f32 {
        match stat {
            PlayerStat::Speed => self.speed,
            PlayerStat::FireRate => self.fire_rate_ms,
            PlayerStat::Luck => self.luck,
        }
    }

    pub fn add(&mut self, stat: PlayerStat, delta: f32) {
        match stat {
            PlayerStat::Speed => self.speed += delta,
            PlayerStat::FireRate => self.fire_rate_ms += delta,
            PlayerStat::Luck => self.luck += delta,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStats {
    pub max_hp: u32,
    pub hp: u32,
    pub base_shields: u32,
    pub stats: ShipStats,
    pub starting_weapon: String,
    pub spawn: Vec2,
    pub visual_scale: f32,
    pub resistances: Resistances,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            hp: 100,
            base_shields: 0,
            stats: ShipStats {
                speed: 300.0,
                fire_rate_ms: 250.0,
                luck: 15.0,
            },
            starting_weapon: "basic_cannon".to_string(),
            spawn: Vec2::new(100.0, 300.0),
            visual_scale: 1.0,
            resistances: Resistances::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyStats {
    pub hp: u32,
    pub resistances: Resistances,
    pub movement: MovementPattern,
    pub speed: f32,
    pub weapon_id: String,
    pub fire_rate_ms: u32,
    pub visual_scale: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            hp: 20,
            resistances: Resistances::default(),
            movement: MovementPattern::Linear,
            speed: 150.0,
            weapon_id: "enemy_laser".to_string(),
            fire_rate_ms: 2000,
            visual_scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossPhase {
    /// Phase applies while `hp / max_hp <= hp_threshold`.
    pub hp_threshold: f32,
    pub weapon_id: String,
    pub fire_rate_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossStats {
    pub name: String,
    pub hp: u32,
    pub speed: f32,
    pub visual_scale: f32,
    pub behavior: BossBehavior,
    pub resistances: Resistances,
    pub phases: Vec<BossPhase>,
}

/// Projectile stats for one weapon.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    pub damage_type: DamageType,
    pub speed: f32,
    pub aimed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUpDef {
    pub key: String,
    pub kind: PowerUpKind,
    pub value: f32,
    pub stat: Option<PlayerStat>,
    pub duration_ms: Option<u32>,
    pub weapon_id: Option<String>,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnEvent {
    pub time_ms: u32,
    pub is_boss: bool,
    pub actor_id: String,
    pub y: f32,
}

/// Ordered spawn events of one block, as authored.
pub type Block = Vec<SpawnEvent>;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct LevelScript {
    pub sequence: Vec<String>,
    pub next_level: Option<String>,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct GameData {
    pub seed: u64,
    pub start_level: String,
    pub player: PlayerStats,
    pub enemies: HashMap<String, EnemyStats>,
    pub bosses: HashMap<String, BossStats>,
    pub weapons: HashMap<String, WeaponStats>,
    /// Ordered so a seeded drop pick is reproducible.
    pub powerups: BTreeMap<String, PowerUpDef>,
    pub levels: HashMap<String, LevelScript>,
    pub blocks: HashMap<String, Block>,
}

impl GameData {
    /// The campaign shipped with the crate.
    pub fn campaign() -> Result<Self, ConfigError> {
        Self::from_ron_str(CAMPAIGN_RON)
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawGameData = ron::from_str(source)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawGameData) -> Result<Self, ConfigError> {
        let player = player_stats(raw.player);

        let enemies = raw
            .enemies
            .into_iter()
            .map(|(key, enemy)| {
                let stats = enemy_stats(&key, enemy);
                (key, stats)
            })
            .collect();

        let bosses = raw
            .bosses
            .into_iter()
            .map(|(key, boss)| boss_stats(&key, boss).map(|stats| (key, stats)))
            .collect::<Result<_, _>>()?;

        let weapons = raw
            .weapons
            .into_iter()
            .map(|(key, weapon)| (key, weapon_stats(weapon)))
            .collect();

        let powerups = raw
            .powerups
            .into_iter()
            .map(|(key, def)| power_up_def(key.clone(), def).map(|def| (key, def)))
            .collect::<Result<_, _>>()?;

        let blocks = raw
            .blocks
            .into_iter()
            .map(|(key, events)| block(&key, events).map(|b| (key, b)))
            .collect::<Result<_, _>>()?;

        let levels: HashMap<String, LevelScript> = raw
            .levels
            .into_iter()
            .map(|(key, level)| {
                (
                    key,
                    LevelScript {
                        sequence: level.sequence,
                        next_level: level.next_level,
                    },
                )
            })
            .collect();

        for (key, level) in &levels {
            if let Some(next) = &level.next_level
                && !levels.contains_key(next)
            {
                return Err(ConfigError::UnknownReference {
                    section: "level",
                    key: key.clone(),
                    kind: "level",
                    target: next.clone(),
                });
            }
        }

        let start_level = raw.start_level.unwrap_or_else(|| "level_1".to_string());
        if !levels.is_empty() && !levels.contains_key(&start_level) {
            return Err(ConfigError::UnknownReference {
                section: "campaign",
                key: "start_level".to_string(),
                kind: "level",
                target: start_level,
            });
        }

        Ok(Self {
            seed: raw.seed.unwrap_or_default(),
            start_level,
            player,
            enemies,
            bosses,
            weapons,
            powerups,
            levels,
            blocks,
        })
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyStats> {
        self.enemies.get(id)
    }

    pub fn boss(&self, id: &str) -> Option<&BossStats> {
        self.bosses.get(id)
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponStats> {
        self.weapons.get(id)
    }

    pub fn power_up(&self, key: &str) -> Option<&PowerUpDef> {
        self.powerups.get(key)
    }

    pub fn level(&self, key: &str) -> Option<&LevelScript> {
        self.levels.get(key)
    }

    pub fn block(&self, key: &str) -> Option<&Block> {
        self.blocks.get(key)
    }
}

fn resistances(raw: HashMap<String, f32>) -> Resistances {
    raw.into_iter()
        .map(|(key, mult)| (DamageType::new(key), mult))
        .collect()
}

fn player_stats(raw: RawPlayer) -> PlayerStats {
    let defaults = PlayerStats::default();
    let max_hp = raw
        .max_hp
        .or(raw.hp)
        .filter(|&v| v > 0)
        .unwrap_or(defaults.max_hp);
    let hp = raw.hp.filter(|&v| v > 0).unwrap_or(max_hp).min(max_hp);

    PlayerStats {
        max_hp,
        hp,
        base_shields: raw.base_shields.unwrap_or(defaults.base_shields),
        stats: ShipStats {
            speed: raw
                .speed
                .filter(|&v| v > 0.0)
                .unwrap_or(defaults.stats.speed),
            fire_rate_ms: raw
                .fire_rate
                .filter(|&v| v > 0)
                .map_or(defaults.stats.fire_rate_ms, |v| v as f32),
            luck: raw.luck.unwrap_or(defaults.stats.luck),
        },
        starting_weapon: raw.starting_weapon.unwrap_or(defaults.starting_weapon),
        spawn: raw
            .spawn_position
            .map_or(defaults.spawn, |p| Vec2::new(p.x, p.y)),
        visual_scale: raw.visual_scale.unwrap_or(defaults.visual_scale),
        resistances: resistances(raw.resistances),
    }
}

fn enemy_stats(key: &str, raw: RawEnemy) -> EnemyStats {
    let defaults = EnemyStats::default();
    let movement = match raw.movement.as_deref() {
        None => defaults.movement,
        Some(name) => MovementPattern::parse(name).unwrap_or_else(|| {
            warn!("enemy '{key}': unknown movement '{name}', using linear");
            MovementPattern::Linear
        }),
    };

    EnemyStats {
        hp: raw.hp.filter(|&v| v > 0).unwrap_or(defaults.hp),
        resistances: resistances(raw.resistances),
        movement,
        speed: raw.speed.filter(|&v| v > 0.0).unwrap_or(defaults.speed),
        weapon_id: raw.weapon.unwrap_or(defaults.weapon_id),
        fire_rate_ms: raw
            .fire_rate
            .filter(|&v| v > 0)
            .unwrap_or(defaults.fire_rate_ms),
        visual_scale: raw.visual_scale.unwrap_or(defaults.visual_scale),
    }
}

fn boss_stats(key: &str, raw: RawBoss) -> Result<BossStats, ConfigError> {
    let hp = raw.hp.filter(|&v| v > 0).ok_or(ConfigError::MissingField {
        section: "boss",
        key: key.to_string(),
        field: "hp",
    })?;

    let behavior = match raw.behavior.as_deref() {
        None => BossBehavior::Hold,
        Some(name) => BossBehavior::parse(name).unwrap_or_else(|| {
            warn!("boss '{key}': unknown behavior '{name}', boss will hold position");
            BossBehavior::Hold
        }),
    };

    let phases = raw
        .phases
        .into_iter()
        .enumerate()
        .map(|(idx, phase)| {
            let hp_threshold = phase.hp_threshold.unwrap_or(1.0);
            if !(0.0..=1.0).contains(&hp_threshold) {
                return Err(ConfigError::InvalidValue {
                    section: "boss",
                    key: key.to_string(),
                    reason: format!("phase {idx} hp_threshold {hp_threshold} outside [0, 1]"),
                });
            }
            let weapon_id = phase.weapon.ok_or(ConfigError::MissingField {
                section: "boss",
                key: key.to_string(),
                field: "phases.weapon",
            })?;
            Ok(BossPhase {
                hp_threshold,
                weapon_id,
                fire_rate_ms: phase.fire_rate.filter(|&v| v > 0).unwrap_or(1000),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BossStats {
        name: raw.name.unwrap_or_else(|| key.to_string()),
        hp,
        speed: raw.speed.filter(|&v| v > 0.0).unwrap_or(100.0),
        visual_scale: raw.visual_scale.unwrap_or(1.0),
        behavior,
        resistances: resistances(raw.resistances),
        phases,
    })
}

fn weapon_stats(raw: RawWeapon) -> WeaponStats {
    WeaponStats {
        damage: raw.damage.unwrap_or(0.0),
        damage_type: raw
            .damage_type
            .map_or_else(DamageType::default, DamageType::new),
        speed: raw.speed.filter(|&v| v > 0.0).unwrap_or(400.0),
        aimed: raw.aimed,
    }
}

fn power_up_def(key: String, raw: RawPowerUp) -> Result<PowerUpDef, ConfigError> {
    let kind_name = raw.kind.ok_or(ConfigError::MissingField {
        section: "powerup",
        key: key.clone(),
        field: "type",
    })?;
    let kind = PowerUpKind::parse(&kind_name).ok_or_else(|| ConfigError::InvalidValue {
        section: "powerup",
        key: key.clone(),
        reason: format!("unknown type '{kind_name}'"),
    })?;

    let stat = match raw.stat.as_deref() {
        Some(name) => Some(PlayerStat::parse(name).ok_or_else(|| ConfigError::InvalidValue {
            section: "powerup",
            key: key.clone(),
            reason: format!("unknown stat '{name}'"),
        })?),
        None => None,
    };

    if kind == PowerUpKind::StatMod && stat.is_none() {
        return Err(ConfigError::MissingField {
            section: "powerup",
            key,
            field: "stat",
        });
    }
    if kind == PowerUpKind::Weapon && raw.weapon_id.is_none() {
        return Err(ConfigError::MissingField {
            section: "powerup",
            key,
            field: "weapon_id",
        });
    }

    Ok(PowerUpDef {
        display_name: raw.display_name.unwrap_or_else(|| key.clone()),
        key,
        kind,
        value: raw.value.unwrap_or(0.0),
        stat,
        duration_ms: raw.duration,
        weapon_id: raw.weapon_id,
    })
}

fn block(key: &str, events: Vec<RawSpawnEvent>) -> Result<Block, ConfigError> {
    events
        .into_iter()
        .map(|event| {
            let id = if event.is_boss {
                event.boss_id
            } else {
                event.enemy_id
            };
            let actor_id = id.ok_or(ConfigError::MissingField {
                section: "block",
                key: key.to_string(),
                field: if event.is_boss { "boss_id" } else { "enemy_id" },
            })?;
            Ok(SpawnEvent {
                time_ms: event.time,
                is_boss: event.is_boss,
                actor_id,
                y: event.y.unwrap_or(300.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
