//! Combat tests.
//!
//! Resolution properties are checked with a tiny xorshift generator; contact handling is
//! tested by injecting `CollisionStart` messages directly instead of running the physics step.

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::contacts::classify_contacts;
use super::damage::{DamageSource, DamageType, resolve};
use super::*;
use crate::common::messages::PowerUpCollected;
use crate::common::rng::ScriptedRng;
use crate::common::test_utils::{drain_messages, run_system_once};
use crate::common::tunables::Tunables;
use crate::config::{BossBehavior, BossStats, EnemyStats, PlayerStats};
use crate::plugins::boss::BossStage;
use crate::plugins::core::PendingDespawn;
use crate::plugins::enemies::{Enemy, EnemyLifeState};
use crate::plugins::powerups::PowerUp;
use crate::plugins::projectiles::Projectile;

/// Deterministic xorshift64*; enough for property-style sweeps.
struct TestRng(u64);

impl TestRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn f32_in(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        lo + unit * (hi - lo)
    }

    fn u32_below(&mut self, n: u32) -> u32 {
        (self.next_u64() % u64::from(n.max(1))) as u32
    }
}

fn never_crit() -> ScriptedRng {
    ScriptedRng::constant(99.9)
}

fn always_crit() -> ScriptedRng {
    ScriptedRng::constant(0.0)
}

// ---- Damage resolution ----

#[test]
fn non_critical_amount_is_floor_of_resisted_base() {
    let mut rng = TestRng(0x9E37_79B9_7F4A_7C15);
    for _ in 0..500 {
        let base = rng.f32_in(0.0, 500.0);
        let mult = rng.f32_in(0.0, 2.5);
        let resist = Resistances::default().with("laser", mult);

        let event = resolve(base, &DamageType::new("laser"), &resist, 10.0, &mut never_crit());

        assert!(!event.is_critical);
        assert_eq!(event.amount, (base * mult).floor() as u32, "base {base} mult {mult}");
        assert_eq!(event.multiplier_applied, mult);
    }
}

#[test]
fn unlisted_type_is_neutral() {
    let resist = Resistances::default().with("laser", 0.1);
    let event = resolve(37.9, &DamageType::new("plasma"), &resist, 0.0, &mut never_crit());
    assert_eq!(event.amount, 37);
    assert_eq!(event.multiplier_applied, 1.0);
}

#[test]
fn non_positive_base_deals_nothing() {
    for base in [0.0, -1.0, -250.0, f32::NEG_INFINITY] {
        let event = resolve(base, &DamageType::default(), &Resistances::default(), 100.0, &mut always_crit());
        assert_eq!(event.amount, 0, "base {base}");
    }
}

#[test]
fn crit_doubles_the_resisted_amount() {
    let resist = Resistances::default().with("laser", 0.5);
    let event = resolve(100.0, &DamageType::new("laser"), &resist, 100.0, &mut always_crit());
    assert!(event.is_critical);
    assert_eq!(event.amount, 100);
}

#[test]
fn crit_threshold_is_half_of_luck() {
    let ty = DamageType::default();
    let resist = Resistances::default();
    // luck 10 => crit when the roll is under 5
    assert!(resolve(10.0, &ty, &resist, 10.0, &mut ScriptedRng::constant(4.99)).is_critical);
    assert!(!resolve(10.0, &ty, &resist, 10.0, &mut ScriptedRng::constant(5.0)).is_critical);
    // zero luck never crits
    assert!(!resolve(10.0, &ty, &resist, 0.0, &mut always_crit()).is_critical);
}

// ---- Health ----

#[test]
fn hp_stays_within_bounds_under_random_traffic() {
    let mut rng = TestRng(42);
    for _ in 0..50 {
        let max = 1 + rng.u32_below(300);
        let mut health = Health::new(max);
        for _ in 0..100 {
            if rng.u32_below(3) == 0 {
                health.heal(rng.u32_below(120));
            } else {
                let source = DamageSource::new(rng.f32_in(-20.0, 150.0), "physical");
                apply_damage(&mut health, &Resistances::default(), Some(&source), true, &mut never_crit());
            }
            assert!(health.hp() <= health.max_hp());
            if health.is_dead() {
                assert_eq!(health.hp(), 0);
            }
        }
    }
}

#[test]
fn dead_or_gated_targets_are_untouched() {
    let source = DamageSource::new(10.0, "laser");

    let mut gated = Health::new(50);
    let outcome = apply_damage(&mut gated, &Resistances::default(), Some(&source), false, &mut never_crit());
    assert_eq!(outcome, DamageOutcome::Ignored);
    assert_eq!(gated.hp(), 50);

    let mut dead = Health::with_hp(50, 20);
    dead.die();
    let outcome = apply_damage(&mut dead, &Resistances::default(), Some(&source), true, &mut never_crit());
    assert_eq!(outcome, DamageOutcome::Ignored);
    assert_eq!(dead.hp(), 20);
}

#[test]
fn lethal_hit_kills_exactly_once() {
    let mut health = Health::new(30);
    let source = DamageSource::new(45.0, "laser");

    let first = apply_damage(&mut health, &Resistances::default(), Some(&source), true, &mut never_crit());
    assert!(first.killed());
    assert_eq!(health.hp(), 0);

    let second = apply_damage(&mut health, &Resistances::default(), Some(&source), true, &mut never_crit());
    assert_eq!(second, DamageOutcome::Ignored);
    assert!(!health.die());
}

#[test]
fn missing_source_defaults_to_zero_physical() {
    let mut health = Health::new(10);
    let outcome = apply_damage(&mut health, &Resistances::default(), None, true, &mut never_crit());
    let event = outcome.event().expect("applied");
    assert_eq!(event.amount, 0);
    assert_eq!(event.damage_type, DamageType::default());
    assert_eq!(health.hp(), 10);
}

#[test]
fn shield_split_matches_example() {
    let mut shield = Shield::new(30);
    let split = shield.absorb(50.0);
    assert_eq!(split.absorbed, 30);
    assert_eq!(split.remainder, 20.0);
    assert_eq!(shield.value(), 0);
}

#[test]
fn shield_charges_fractional_damage_as_a_whole_point() {
    let mut shield = Shield::new(20);
    let split = shield.absorb(10.5);
    assert_eq!(split.absorbed, 11);
    assert_eq!(split.remainder, 0.0);
    assert_eq!(shield.value(), 9);

    // once the shield runs dry the exact leftover reaches the hull
    let split = shield.absorb(10.5);
    assert_eq!(split.absorbed, 9);
    assert_eq!(split.remainder, 1.5);
    assert_eq!(shield.value(), 0);
}

#[test]
fn heal_and_recover_clamp_to_max() {
    let mut health = Health::with_hp(100, 90);
    health.heal(50);
    assert_eq!(health.hp(), 100);

    let mut shield = Shield::new(40);
    shield.absorb(35.0);
    shield.recover(100);
    assert_eq!(shield.value(), 40);
}

// ---- Hit routing ----

fn world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(GameRng::seeded(1));
    world.init_resource::<Messages<HitRequest>>();
    world.init_resource::<Messages<CombatSignal>>();
    world.init_resource::<Messages<PowerUpCollected>>();
    world.init_resource::<Messages<CollisionStart>>();
    world
}

fn spawn_player(world: &mut World, shield: u32) -> Entity {
    world
        .spawn((
            Player::from_stats(&PlayerStats::default()),
            Health::new(100),
            Shield::new(shield),
            Resistances::default(),
        ))
        .id()
}

fn spawn_enemy(world: &mut World) -> Entity {
    world
        .spawn((
            Enemy::from_stats("grunt", &EnemyStats::default(), 0.0),
            EnemyLifeState::Alive,
            Health::new(20),
            Resistances::default(),
        ))
        .id()
}

fn spawn_boss(world: &mut World, stage_time_ms: Option<f64>) -> Entity {
    let tunables = Tunables::default();
    let stats = BossStats {
        name: "Testbed".into(),
        hp: 200,
        speed: 100.0,
        visual_scale: 1.0,
        behavior: BossBehavior::Hold,
        resistances: Resistances::default(),
        phases: Vec::new(),
    };
    let mut boss = Boss::new("testbed", &stats, Vec2::new(1100.0, 300.0), &tunables);
    if let Some(t) = stage_time_ms {
        boss.step(t, t, Vec2::new(600.0, 300.0), None, 1.0);
        assert_eq!(boss.stage(), BossStage::Active);
    }
    world
        .spawn((boss, Health::new(stats.hp), Resistances::default()))
        .id()
}

fn hit(world: &mut World, target: Entity, damage: f32) {
    world.write_message(HitRequest::Damage {
        target,
        source: DamageSource::new(damage, "laser"),
    });
}

#[test]
fn player_hits_go_through_the_shield() {
    let mut world = world();
    let player = spawn_player(&mut world, 30);
    hit(&mut world, player, 50.0);

    run_system_once(&mut world, resolve_hits);

    assert_eq!(world.get::<Shield>(player).map(|s| s.value()), Some(0));
    assert_eq!(world.get::<Health>(player).map(|h| h.hp()), Some(80));
    let signals = drain_messages::<CombatSignal>(&mut world);
    assert!(signals.iter().any(|s| matches!(s, CombatSignal::DamageDealt { event, .. } if event.amount == 20)));
}

#[test]
fn entering_boss_shrugs_off_hits() {
    let mut world = world();
    let boss = spawn_boss(&mut world, None);
    hit(&mut world, boss, 50.0);

    run_system_once(&mut world, resolve_hits);

    assert_eq!(world.get::<Health>(boss).map(|h| h.hp()), Some(200));
    assert!(drain_messages::<CombatSignal>(&mut world).is_empty());
}

#[test]
fn active_boss_reports_damage() {
    let mut world = world();
    let tunables = Tunables::default();
    let boss = spawn_boss(&mut world, Some(tunables.boss_entry_ms + 1.0));
    hit(&mut world, boss, 50.0);

    run_system_once(&mut world, resolve_hits);

    assert_eq!(world.get::<Health>(boss).map(|h| h.hp()), Some(150));
    let signals = drain_messages::<CombatSignal>(&mut world);
    assert!(signals.contains(&CombatSignal::BossDamaged {
        name: "Testbed".into(),
        hp: 150,
        max_hp: 200,
        percent: 75.0,
    }));
}

#[test]
fn enemies_die_through_the_generic_path() {
    let mut world = world();
    let enemy = spawn_enemy(&mut world);
    hit(&mut world, enemy, 25.0);

    run_system_once(&mut world, resolve_hits);

    let health = world.get::<Health>(enemy).expect("health");
    assert!(health.is_dead());
    assert_eq!(health.hp(), 0);
}

#[test]
fn destroy_request_kills_without_resolution() {
    let mut world = world();
    let enemy = spawn_enemy(&mut world);
    world.write_message(HitRequest::Destroy { target: enemy });

    run_system_once(&mut world, resolve_hits);

    assert!(world.get::<Health>(enemy).is_some_and(Health::is_dead));
    assert!(drain_messages::<CombatSignal>(&mut world).is_empty());
}

// ---- Contacts ----

fn contact(world: &mut World, a: Entity, b: Entity) {
    world.write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: Some(a),
        body2: Some(b),
    });
}

fn shot(world: &mut World, from_player: bool) -> Entity {
    world
        .spawn(Projectile {
            source: DamageSource::new(12.0, "laser"),
            from_player,
        })
        .id()
}

#[test]
fn player_shot_hits_enemy_once() {
    let mut world = world();
    let enemy = spawn_enemy(&mut world);
    let other = spawn_enemy(&mut world);
    let bullet = shot(&mut world, true);
    // same shot overlapping two enemies in one step
    contact(&mut world, enemy, bullet);
    contact(&mut world, bullet, other);

    run_system_once(&mut world, classify_contacts);

    let hits = drain_messages::<HitRequest>(&mut world);
    assert_eq!(
        hits,
        vec![HitRequest::Damage {
            target: enemy,
            source: DamageSource::new(12.0, "laser"),
        }]
    );
    assert!(world.get::<PendingDespawn>(bullet).is_some());
    assert_eq!(
        world.get::<CollisionLayers>(bullet).map(|l| l.filters),
        Some(LayerMask::NONE)
    );
}

#[test]
fn hostile_shot_hits_player() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    let bullet = shot(&mut world, false);
    contact(&mut world, player, bullet);

    run_system_once(&mut world, classify_contacts);

    let hits = drain_messages::<HitRequest>(&mut world);
    assert!(matches!(hits.as_slice(), [HitRequest::Damage { target, .. }] if *target == player));
}

#[test]
fn friendly_fire_is_ignored() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    let enemy = spawn_enemy(&mut world);
    let own = shot(&mut world, true);
    let theirs = shot(&mut world, false);
    contact(&mut world, player, own);
    contact(&mut world, enemy, theirs);

    run_system_once(&mut world, classify_contacts);

    assert!(drain_messages::<HitRequest>(&mut world).is_empty());
}

#[test]
fn ramming_enemy_hurts_player_and_destroys_enemy() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    let enemy = spawn_enemy(&mut world);
    contact(&mut world, enemy, player);

    run_system_once(&mut world, classify_contacts);

    let hits = drain_messages::<HitRequest>(&mut world);
    assert_eq!(
        hits,
        vec![
            HitRequest::Damage { target: player, source: DamageSource::new(20.0, "fisico") },
            HitRequest::Destroy { target: enemy },
        ]
    );
}

#[test]
fn ramming_boss_only_hurts_player() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    let boss = spawn_boss(&mut world, None);
    contact(&mut world, player, boss);

    run_system_once(&mut world, classify_contacts);

    let hits = drain_messages::<HitRequest>(&mut world);
    assert_eq!(
        hits,
        vec![HitRequest::Damage { target: player, source: DamageSource::new(30.0, "fisico") }]
    );
}

#[test]
fn touching_a_powerup_collects_it() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    let pickup = world.spawn(PowerUp { key: "shield_cell".into() }).id();
    contact(&mut world, pickup, player);

    run_system_once(&mut world, classify_contacts);

    assert_eq!(
        drain_messages::<PowerUpCollected>(&mut world),
        vec![PowerUpCollected { player, power_up: pickup }]
    );
}

#[test]
fn wrecked_player_rams_nothing() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    world.get_mut::<Health>(player).expect("health").die();
    let enemy = spawn_enemy(&mut world);
    contact(&mut world, player, enemy);

    run_system_once(&mut world, classify_contacts);
    run_system_once(&mut world, resolve_hits);

    assert!(world.get::<Health>(enemy).is_some_and(|h| !h.is_dead()));
    assert!(drain_messages::<HitRequest>(&mut world).is_empty());
    assert!(
        !drain_messages::<CombatSignal>(&mut world)
            .iter()
            .any(|s| matches!(s, CombatSignal::ScoreChange { .. }))
    );
}

#[test]
fn wrecked_player_ignores_shots_and_pickups() {
    let mut world = world();
    let player = spawn_player(&mut world, 0);
    world.get_mut::<Health>(player).expect("health").die();
    let bullet = shot(&mut world, false);
    let pickup = world.spawn(PowerUp { key: "shield_cell".into() }).id();
    contact(&mut world, bullet, player);
    contact(&mut world, player, pickup);

    run_system_once(&mut world, classify_contacts);

    assert!(drain_messages::<HitRequest>(&mut world).is_empty());
    assert!(drain_messages::<PowerUpCollected>(&mut world).is_empty());
    // the shot flies on
    assert!(world.get::<PendingDespawn>(bullet).is_none());
}
