//! Progression plugin: drives the [`LevelScheduler`] from the fixed step.
//!
//! Pipeline:
//! - OnEnter(Playing): load the configured start level
//! - Reactions: minion spawns and level advances from `TimerFired`
//! - Progression: `BossResolved` resumes the script, then the block clock ticks
//!
//! The scheduler only reads the active-enemy count and writes `SpawnRequest`; actors are
//! materialized by their own plugins on the next step.

use bevy::prelude::*;

use crate::common::clock::FrameClock;
use crate::common::diagnostics::Diagnostics;
use crate::common::messages::{BossResolved, SpawnRequest};
use crate::common::rng::GameRng;
use crate::common::signals::CombatSignal;
use crate::common::state::GameState;
use crate::common::timers::{TimerAction, TimerFired, TimerQueue};
use crate::common::tunables::Tunables;
use crate::config::GameData;
use crate::plugins::boss::Boss;
use crate::plugins::core::CoreSet;
use crate::plugins::enemies::{Enemy, EnemyLifeState, count_active};

pub mod scheduler;

pub use scheduler::{LevelScheduler, ScheduleAction, SchedulerCtx};

pub fn plugin(app: &mut App) {
    app.init_resource::<LevelScheduler>()
        .add_systems(OnEnter(GameState::Playing), start_campaign)
        .add_systems(FixedUpdate, progression_timers.in_set(CoreSet::Reactions))
        .add_systems(
            FixedUpdate,
            (resume_after_boss, tick_scheduler)
                .chain()
                .in_set(CoreSet::Progression),
        );
}

fn route(
    actions: Vec<ScheduleAction>,
    spawns: &mut MessageWriter<SpawnRequest>,
    signals: &mut MessageWriter<CombatSignal>,
) {
    for action in actions {
        match action {
            ScheduleAction::Spawn(request) => {
                spawns.write(request);
            }
            ScheduleAction::LevelFinished { level } => {
                signals.write(CombatSignal::LevelFinished { level });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn start_campaign(
    clock: Res<FrameClock>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut timers: ResMut<TimerQueue>,
    mut scheduler: ResMut<LevelScheduler>,
    mut spawns: MessageWriter<SpawnRequest>,
    mut signals: MessageWriter<CombatSignal>,
) {
    let mut ctx = SchedulerCtx {
        now_ms: clock.now_ms,
        data: &data,
        tunables: &tunables,
        timers: &mut *timers,
        diagnostics: &diagnostics,
    };
    let actions = scheduler.load_level(&data.start_level, &mut ctx);
    route(actions, &mut spawns, &mut signals);
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn progression_timers(
    clock: Res<FrameClock>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut rng: ResMut<GameRng>,
    mut timers: ResMut<TimerQueue>,
    mut scheduler: ResMut<LevelScheduler>,
    mut fired: MessageReader<TimerFired>,
    bosses: Query<&Boss>,
    mut spawns: MessageWriter<SpawnRequest>,
    mut signals: MessageWriter<CombatSignal>,
) {
    for TimerFired { action, .. } in fired.read() {
        match action {
            TimerAction::SpawnBossMinion => {
                if !bosses.iter().any(Boss::is_alive) {
                    continue;
                }
                if let Some(request) = scheduler.minion_spawn(&data, &tunables, &diagnostics, &mut *rng) {
                    spawns.write(request);
                }
            }
            TimerAction::AdvanceLevel { level } => {
                let mut ctx = SchedulerCtx {
                    now_ms: clock.now_ms,
                    data: &data,
                    tunables: &tunables,
                    timers: &mut *timers,
                    diagnostics: &diagnostics,
                };
                let actions = scheduler.load_level(level, &mut ctx);
                route(actions, &mut spawns, &mut signals);
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn resume_after_boss(
    clock: Res<FrameClock>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut timers: ResMut<TimerQueue>,
    mut scheduler: ResMut<LevelScheduler>,
    mut resolved: MessageReader<BossResolved>,
    mut spawns: MessageWriter<SpawnRequest>,
    mut signals: MessageWriter<CombatSignal>,
) {
    for BossResolved { name, .. } in resolved.read() {
        info!("boss '{name}' resolved; resuming level");
        let mut ctx = SchedulerCtx {
            now_ms: clock.now_ms,
            data: &data,
            tunables: &tunables,
            timers: &mut *timers,
            diagnostics: &diagnostics,
        };
        let actions = scheduler.on_boss_defeated(&mut ctx);
        route(actions, &mut spawns, &mut signals);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn tick_scheduler(
    clock: Res<FrameClock>,
    data: Res<GameData>,
    tunables: Res<Tunables>,
    diagnostics: Res<Diagnostics>,
    mut timers: ResMut<TimerQueue>,
    mut scheduler: ResMut<LevelScheduler>,
    enemies: Query<&EnemyLifeState, With<Enemy>>,
    mut spawns: MessageWriter<SpawnRequest>,
    mut signals: MessageWriter<CombatSignal>,
) {
    let active = count_active(&enemies);
    let mut ctx = SchedulerCtx {
        now_ms: clock.now_ms,
        data: &data,
        tunables: &tunables,
        timers: &mut *timers,
        diagnostics: &diagnostics,
    };
    let actions = scheduler.tick(clock.delta_ms, active, &mut ctx);
    route(actions, &mut spawns, &mut signals);
}
