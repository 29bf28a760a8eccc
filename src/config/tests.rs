use super::*;

fn load(body: &str) -> Result<GameData, ConfigError> {
    GameData::from_ron_str(&format!("#![enable(implicit_some)]\n{body}"))
}

#[test]
fn embedded_campaign_loads() {
    let data = GameData::campaign().expect("campaign should validate");

    assert_eq!(data.start_level, "level_1");
    assert!(data.level("level_1").is_some());
    assert!(data.enemy("interceptor_alpha").is_some());
    assert!(data.weapon(&data.player.starting_weapon).is_some());

    // every referenced id should resolve in the shipped content
    for level in data.levels.values() {
        for block_key in &level.sequence {
            let block = data.block(block_key).expect("sequenced block exists");
            for event in block {
                if event.is_boss {
                    assert!(data.boss(&event.actor_id).is_some(), "{}", event.actor_id);
                } else {
                    assert!(data.enemy(&event.actor_id).is_some(), "{}", event.actor_id);
                }
            }
        }
    }
}

#[test]
fn empty_document_resolves_defaults() {
    let data = load("()").unwrap();
    let player = &data.player;

    assert_eq!(player.max_hp, 100);
    assert_eq!(player.hp, 100);
    assert_eq!(player.stats.speed, 300.0);
    assert_eq!(player.stats.fire_rate_ms, 250.0);
    assert_eq!(player.stats.luck, 15.0);
    assert_eq!(player.spawn, Vec2::new(100.0, 300.0));
    assert_eq!(player.starting_weapon, "basic_cannon");
    assert_eq!(player.base_shields, 0);
}

#[test]
fn enemy_defaults_and_aliases() {
    let data = load(
        r#"(
            enemies: {
                "bare": (),
                "legacy": (health: 55, pattern: "sine"),
                "zero": (hp: 0, speed: 0.0, fire_rate: 0),
            },
        )"#,
    )
    .unwrap();

    let bare = data.enemy("bare").unwrap();
    assert_eq!(bare.hp, 20);
    assert_eq!(bare.speed, 150.0);
    assert_eq!(bare.fire_rate_ms, 2000);
    assert_eq!(bare.weapon_id, "enemy_laser");
    assert_eq!(bare.movement, MovementPattern::Linear);

    let legacy = data.enemy("legacy").unwrap();
    assert_eq!(legacy.hp, 55);
    assert_eq!(legacy.movement, MovementPattern::SineWave);

    // falsy values fall back the same way missing ones do
    let zero = data.enemy("zero").unwrap();
    assert_eq!(zero.hp, 20);
    assert_eq!(zero.speed, 150.0);
    assert_eq!(zero.fire_rate_ms, 2000);
}

#[test]
fn unknown_movement_falls_back_to_linear() {
    let data = load(r#"(enemies: { "odd": (movement: "spiral") })"#).unwrap();
    assert_eq!(data.enemy("odd").unwrap().movement, MovementPattern::Linear);
}

#[test]
fn boss_phase_threshold_is_validated() {
    let err = load(
        r#"(bosses: { "b": (hp: 100, phases: [(hp_threshold: 1.5, weapon: "w")]) })"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { section: "boss", .. }));
}

#[test]
fn boss_without_hp_is_rejected() {
    let err = load(r#"(bosses: { "b": (name: "Nameless") })"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "hp", .. }));
}

#[test]
fn boss_defaults() {
    let data = load(r#"(bosses: { "b": (hp: 300, behavior: "unheard_of") })"#).unwrap();
    let boss = data.boss("b").unwrap();

    assert_eq!(boss.name, "b");
    assert_eq!(boss.speed, 100.0);
    assert_eq!(boss.behavior, BossBehavior::Hold);
    assert!(boss.phases.is_empty());
}

#[test]
fn weapon_type_defaults_to_physical() {
    let data = load(r#"(weapons: { "w": (damage: 7.0) })"#).unwrap();
    let weapon = data.weapon("w").unwrap();

    assert_eq!(weapon.damage_type.as_str(), "physical");
    assert_eq!(weapon.speed, 400.0);
    assert!(!weapon.aimed);
}

#[test]
fn powerup_kinds_and_required_fields() {
    let data = load(
        r#"(powerups: {
            "h": (type: "heal", amount: 10.0),
            "s": (type: "stat_boost", stat: "fireRate", value: -50.0, duration: 4000),
        })"#,
    )
    .unwrap();

    assert_eq!(data.power_up("h").unwrap().kind, PowerUpKind::Shield);
    assert_eq!(data.power_up("h").unwrap().value, 10.0);
    let stat = data.power_up("s").unwrap();
    assert_eq!(stat.kind, PowerUpKind::StatMod);
    assert_eq!(stat.stat, Some(PlayerStat::FireRate));
    assert_eq!(stat.duration_ms, Some(4000));

    let err = load(r#"(powerups: { "w": (type: "weapon") })"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "weapon_id", .. }));

    let err = load(r#"(powerups: { "x": (type: "confetti") })"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn spawn_event_needs_an_actor_id() {
    let err = load(r#"(blocks: { "b": [(time: 100, is_boss: true, enemy_id: "oops")] })"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "boss_id", .. }));
}

#[test]
fn level_references_are_checked() {
    let err = load(
        r#"(start_level: "a", levels: { "a": (sequence: [], next_level: "missing") })"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownReference { kind: "level", .. }));

    let err = load(r#"(start_level: "nope", levels: { "a": (sequence: []) })"#).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownReference { .. }));
}

#[test]
fn malformed_document_is_a_parse_error() {
    let err = GameData::from_ron_str("(enemies: {").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
