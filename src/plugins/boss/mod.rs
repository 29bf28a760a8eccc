//! Boss plugin: multi-phase bosses driven by a stage machine.
//!
//! A boss is an `Entering -> Active -> Dying -> Defeated` machine over a [`BossBrain`]:
//! - Entering: flies in from offscreen, immune to damage.
//! - Active: runs its movement pattern and fires with the weapon of the current phase.
//! - Dying: stops, announces the explosion, and waits out the death delay.
//! - Defeated: publishes `BossDefeated` + score and hands control back to progression.
//!
//! The stage machine only touches the brain; systems copy physics inputs in and route
//! the brain's outputs (fire requests, signals) out as messages.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::FrameClock;
use crate::common::diagnostics::Diagnostics;
use crate::common::fsm::{StateHandlers, StateMachine};
use crate::common::layers::{Layer, enemy_layers, non_interacting};
use crate::common::messages::{BossResolved, FireRequest, SpawnRequest};
use crate::common::signals::CombatSignal;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::config::{BossBehavior, BossPhase, BossStats};
use crate::plugins::combat::cadence::FireCadence;
use crate::plugins::combat::health::Health;
use crate::plugins::core::{CoreSet, PendingDespawn};
use crate::plugins::player::Player;

pub mod movement;

use movement::boss_velocity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossStage {
    Entering,
    Active,
    Dying,
    Defeated,
}

/// Something the boss wants the world to do.
#[derive(Clone, Debug, PartialEq)]
pub enum BossOutput {
    Fire { weapon_id: String, origin: Vec2 },
    Signal(CombatSignal),
    /// Death sequence finished.
    Resolved,
}

/// Pick the active phase for `hp_fraction`.
///
/// Scans in list order and keeps the last phase whose threshold is satisfied, seeded with the
/// first phase. Thresholds are expected to decrease down the list but that is not enforced:
/// an out-of-order list still resolves deterministically by this rule.
pub fn select_phase(phases: &[BossPhase], hp_fraction: f32) -> Option<&BossPhase> {
    let first = phases.first()?;
    Some(phases.iter().fold(first, |current, phase| {
        if hp_fraction <= phase.hp_threshold {
            phase
        } else {
            current
        }
    }))
}

/// Stage-machine context.
#[derive(Debug)]
pub struct BossBrain {
    name: String,
    behavior: BossBehavior,
    speed: f32,
    phases: Vec<BossPhase>,

    entry_x: f32,
    entry_ms: f64,
    death_delay_ms: f64,
    score: u32,
    muzzle_offset: f32,

    // inputs, refreshed every step
    position: Vec2,
    target: Option<Vec2>,
    hp_fraction: f32,

    // outputs
    velocity: Vec2,
    vulnerable: bool,
    behavior_active: bool,
    outbox: Vec<BossOutput>,

    stage_clock_ms: f64,
    cadence: FireCadence,
}

fn enter_entering(brain: &mut BossBrain, _: Option<BossStage>, _: &()) {
    brain.vulnerable = false;
    brain.behavior_active = false;
    brain.stage_clock_ms = 0.0;
    let secs = (brain.entry_ms / 1000.0).max(f64::EPSILON) as f32;
    brain.velocity = Vec2::new((brain.entry_x - brain.position.x) / secs, 0.0);
}

fn update_entering(brain: &mut BossBrain, _now_ms: f64, delta_ms: f64) -> Option<BossStage> {
    brain.stage_clock_ms += delta_ms;
    (brain.stage_clock_ms >= brain.entry_ms).then_some(BossStage::Active)
}

fn enter_active(brain: &mut BossBrain, _: Option<BossStage>, _: &()) {
    brain.vulnerable = true;
    brain.behavior_active = true;
    brain.velocity = Vec2::ZERO;
}

fn update_active(brain: &mut BossBrain, now_ms: f64, _delta_ms: f64) -> Option<BossStage> {
    brain.velocity = boss_velocity(
        brain.behavior,
        now_ms,
        brain.speed,
        brain.position,
        brain.target,
    );

    if let Some(phase) = select_phase(&brain.phases, brain.hp_fraction)
        && brain.cadence.ready(now_ms)
    {
        brain.outbox.push(BossOutput::Fire {
            weapon_id: phase.weapon_id.clone(),
            origin: brain.position - Vec2::new(brain.muzzle_offset, 0.0),
        });
        brain.cadence.arm(now_ms, phase.fire_rate_ms, 0);
    }
    None
}

fn enter_dying(brain: &mut BossBrain, _: Option<BossStage>, _: &()) {
    brain.vulnerable = false;
    brain.behavior_active = false;
    brain.velocity = Vec2::ZERO;
    brain.stage_clock_ms = 0.0;
    brain.outbox.push(BossOutput::Signal(CombatSignal::EnemyDestroyed {
        x: brain.position.x,
        y: brain.position.y,
        is_boss: true,
    }));
}

fn update_dying(brain: &mut BossBrain, _now_ms: f64, delta_ms: f64) -> Option<BossStage> {
    brain.stage_clock_ms += delta_ms;
    if brain.stage_clock_ms < brain.death_delay_ms {
        return None;
    }
    brain.outbox.push(BossOutput::Signal(CombatSignal::BossDefeated {
        name: brain.name.clone(),
    }));
    brain.outbox.push(BossOutput::Signal(CombatSignal::ScoreChange {
        points: brain.score,
    }));
    Some(BossStage::Defeated)
}

fn enter_defeated(brain: &mut BossBrain, _: Option<BossStage>, _: &()) {
    brain.outbox.push(BossOutput::Resolved);
}

#[derive(Component, Debug)]
pub struct Boss {
    pub id: String,
    brain: BossBrain,
    machine: StateMachine<BossStage, BossBrain>,
}

impl Boss {
    /// Builds the boss at `position` and starts its entry.
    pub fn new(id: impl Into<String>, stats: &BossStats, position: Vec2, tunables: &Tunables) -> Self {
        let mut brain = BossBrain {
            name: stats.name.clone(),
            behavior: stats.behavior,
            speed: stats.speed,
            phases: stats.phases.clone(),
            entry_x: tunables.boss_entry_x,
            entry_ms: tunables.boss_entry_ms,
            death_delay_ms: tunables.boss_death_delay_ms,
            score: tunables.boss_score,
            muzzle_offset: tunables.boss_muzzle_offset,
            position,
            target: None,
            hp_fraction: 1.0,
            velocity: Vec2::ZERO,
            vulnerable: false,
            behavior_active: false,
            outbox: Vec::new(),
            stage_clock_ms: 0.0,
            cadence: FireCadence::default(),
        };

        let machine = StateMachine::new(
            &mut brain,
            Some(BossStage::Entering),
            [
                (
                    BossStage::Entering,
                    StateHandlers::new()
                        .on_enter(enter_entering)
                        .on_update(update_entering),
                ),
                (
                    BossStage::Active,
                    StateHandlers::new()
                        .on_enter(enter_active)
                        .on_update(update_active),
                ),
                (
                    BossStage::Dying,
                    StateHandlers::new()
                        .on_enter(enter_dying)
                        .on_update(update_dying),
                ),
                (
                    BossStage::Defeated,
                    StateHandlers::new().on_enter(enter_defeated),
                ),
            ],
        );

        Self {
            id: id.into(),
            brain,
            machine,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.machine.set_diagnostics(diagnostics);
        self
    }

    pub fn name(&self) -> &str {
        &self.brain.name
    }

    pub fn stage(&self) -> BossStage {
        self.machine.current().unwrap_or(BossStage::Defeated)
    }

    /// Entering or Active.
    pub fn is_alive(&self) -> bool {
        matches!(self.stage(), BossStage::Entering | BossStage::Active)
    }

    pub fn is_vulnerable(&self) -> bool {
        self.brain.vulnerable
    }

    pub fn behavior_active(&self) -> bool {
        self.brain.behavior_active
    }

    pub fn velocity(&self) -> Vec2 {
        self.brain.velocity
    }

    /// One fixed step.
    pub fn step(
        &mut self,
        now_ms: f64,
        delta_ms: f64,
        position: Vec2,
        target: Option<Vec2>,
        hp_fraction: f32,
    ) -> Vec<BossOutput> {
        self.brain.position = position;
        self.brain.target = target;
        self.brain.hp_fraction = hp_fraction;
        self.machine.update(&mut self.brain, now_ms, delta_ms);
        std::mem::take(&mut self.brain.outbox)
    }

    /// Start the death sequence. No-op once already dying.
    pub fn begin_dying(&mut self, position: Vec2) -> Vec<BossOutput> {
        if !self.is_alive() {
            return Vec::new();
        }
        self.brain.position = position;
        self.machine.transition(&mut self.brain, BossStage::Dying);
        std::mem::take(&mut self.brain.outbox)
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, spawn_bosses.in_set(CoreSet::Spawn));
    app.add_systems(FixedUpdate, step_bosses.in_set(CoreSet::Behaviour));
    app.add_systems(FixedUpdate, boss_death_trigger.in_set(CoreSet::Lifecycle));
}

pub(crate) fn spawn_bosses(
    mut commands: Commands,
    mut requests: MessageReader<SpawnRequest>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
) {
    for request in requests.read() {
        let SpawnRequest::Boss { actor_id, stats } = request else {
            continue;
        };
        let position = Vec2::new(
            tunables.screen_width + tunables.boss_spawn_offset_x,
            tunables.screen_height / 2.0,
        );
        let boss = Boss::new(actor_id.clone(), stats, position, &tunables)
            .with_diagnostics(diagnostics.clone());
        let velocity = boss.velocity();
        info!("boss '{}' entering", stats.name);

        commands.spawn((
            Name::new(format!("Boss:{actor_id}")),
            boss,
            Health::new(stats.hp),
            stats.resistances.clone(),
            Transform::from_translation(position.extend(1.0)),
            RigidBody::Kinematic,
            Collider::circle(48.0 * stats.visual_scale),
            CollisionEventsEnabled,
            enemy_layers(),
            LinearVelocity(velocity),
            DespawnOnExit(GameState::Playing),
        ));
    }
}

fn route_outputs(
    entity: Entity,
    boss: &Boss,
    outputs: Vec<BossOutput>,
    commands: &mut Commands,
    fire: &mut MessageWriter<FireRequest>,
    signals: &mut MessageWriter<CombatSignal>,
    resolved: &mut MessageWriter<BossResolved>,
) {
    for output in outputs {
        match output {
            BossOutput::Fire { weapon_id, origin } => {
                fire.write(FireRequest {
                    weapon_id,
                    origin,
                    from_player: false,
                });
            }
            BossOutput::Signal(signal) => {
                signals.write(signal);
            }
            BossOutput::Resolved => {
                info!("boss '{}' defeated", boss.name());
                commands.entity(entity).insert(PendingDespawn);
                resolved.write(BossResolved {
                    boss: entity,
                    name: boss.name().to_string(),
                });
            }
        }
    }
}

/// Advance every boss one step and route what it asks for.
pub(crate) fn step_bosses(
    clock: Res<FrameClock>,
    mut commands: Commands,
    mut bosses: Query<
        (Entity, &mut Boss, &Health, &Transform, &mut LinearVelocity),
        Without<PendingDespawn>,
    >,
    player: Query<(&Transform, &Health), (With<Player>, Without<Boss>)>,
    mut fire: MessageWriter<FireRequest>,
    mut signals: MessageWriter<CombatSignal>,
    mut resolved: MessageWriter<BossResolved>,
) {
    let target = player
        .iter()
        .find(|(_, health)| !health.is_dead())
        .map(|(tf, _)| tf.translation.truncate());

    for (entity, mut boss, health, tf, mut velocity) in &mut bosses {
        let outputs = boss.step(
            clock.now_ms,
            clock.delta_ms,
            tf.translation.truncate(),
            target,
            health.fraction(),
        );
        velocity.0 = boss.velocity();
        route_outputs(
            entity,
            &boss,
            outputs,
            &mut commands,
            &mut fire,
            &mut signals,
            &mut resolved,
        );
    }
}

/// Health ran out: start the death sequence and stop interacting.
pub(crate) fn boss_death_trigger(
    mut commands: Commands,
    mut bosses: Query<
        (
            Entity,
            &mut Boss,
            &Health,
            &Transform,
            &mut CollisionLayers,
            &mut LinearVelocity,
        ),
        Without<PendingDespawn>,
    >,
    mut fire: MessageWriter<FireRequest>,
    mut signals: MessageWriter<CombatSignal>,
    mut resolved: MessageWriter<BossResolved>,
) {
    for (entity, mut boss, health, tf, mut layers, mut velocity) in &mut bosses {
        if !health.is_dead() || !boss.is_alive() {
            continue;
        }
        let outputs = boss.begin_dying(tf.translation.truncate());
        *layers = non_interacting(Layer::Enemy);
        velocity.0 = Vec2::ZERO;
        route_outputs(
            entity,
            &boss,
            outputs,
            &mut commands,
            &mut fire,
            &mut signals,
            &mut resolved,
        );
    }
}
