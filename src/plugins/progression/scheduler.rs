//! Level scheduler: timed spawn events, block completion, and boss suspension.
//!
//! A level is a sequence of block keys. Each block is a list of spawn events sorted by time
//! (stable, so equal times keep their authored order). The block clock only runs while the
//! scheduler is running; a boss dispatch stops it until [`LevelScheduler::on_boss_defeated`].

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::common::diagnostics::Diagnostics;
use crate::common::messages::SpawnRequest;
use crate::common::rng::RandomSource;
use crate::common::timers::{TimerAction, TimerId, TimerService};
use crate::common::tunables::Tunables;
use crate::config::{GameData, SpawnEvent};

/// Output of a scheduler step, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleAction {
    Spawn(SpawnRequest),
    LevelFinished { level: String },
}

/// Everything a scheduler step may touch besides its own state.
pub struct SchedulerCtx<'a, T: TimerService> {
    pub now_ms: f64,
    pub data: &'a GameData,
    pub tunables: &'a Tunables,
    pub timers: &'a mut T,
    /// Content misses (unknown level, block, or actor) are noted here as well as logged.
    pub diagnostics: &'a Diagnostics,
}

#[derive(Resource, Debug, Default)]
pub struct LevelScheduler {
    level: Option<String>,
    sequence: Vec<String>,
    index: usize,
    events: VecDeque<SpawnEvent>,
    elapsed_ms: f64,
    running: bool,
    boss_active: bool,
    minion_timer: Option<TimerId>,
}

impl LevelScheduler {
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn block_index(&self) -> usize {
        self.index
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn boss_active(&self) -> bool {
        self.boss_active
    }

    pub fn minion_timer(&self) -> Option<TimerId> {
        self.minion_timer
    }

    /// Remaining events of the current block, earliest first.
    pub fn pending_events(&self) -> impl Iterator<Item = &SpawnEvent> {
        self.events.iter()
    }

    /// Drop all state; cancels the minion spawner if one is pending.
    pub fn reset(&mut self, timers: &mut impl TimerService) {
        if let Some(id) = self.minion_timer.take() {
            timers.cancel(id);
        }
        *self = Self::default();
    }

    /// Start `level_key` at block 0. An unknown level leaves the scheduler stopped.
    pub fn load_level<T: TimerService>(
        &mut self,
        level_key: &str,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Vec<ScheduleAction> {
        self.reset(&mut *ctx.timers);
        let Some(script) = ctx.data.level(level_key) else {
            warn!("level '{level_key}' not found; scheduler idle");
            ctx.diagnostics
                .note("scheduler", &format!("unknown level '{level_key}'"));
            return Vec::new();
        };
        info!("loading level '{level_key}'");
        self.level = Some(level_key.to_string());
        self.sequence = script.sequence.clone();
        self.start_block(0, ctx)
    }

    /// Enter block `index`, skipping missing or empty blocks. Past the end, the level finishes
    /// and, when the script names a next level, an advance timer is scheduled.
    pub fn start_block<T: TimerService>(
        &mut self,
        mut index: usize,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Vec<ScheduleAction> {
        loop {
            let Some(key) = self.sequence.get(index) else {
                return self.finish_level(index, ctx);
            };
            match ctx.data.block(key) {
                Some(block) if !block.is_empty() => {
                    let mut events = block.clone();
                    events.sort_by_key(|e| e.time_ms);
                    debug!("block {index} '{key}': {} events", events.len());

                    self.events = events.into();
                    self.index = index;
                    self.elapsed_ms = 0.0;
                    self.running = true;
                    return Vec::new();
                }
                _ => {
                    warn!("block '{key}' missing or empty; skipping");
                    ctx.diagnostics
                        .note("scheduler", &format!("skipped block '{key}'"));
                    index += 1;
                }
            }
        }
    }

    fn finish_level<T: TimerService>(
        &mut self,
        index: usize,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Vec<ScheduleAction> {
        self.running = false;
        self.index = index;
        self.events.clear();

        let Some(level) = self.level.clone() else {
            return Vec::new();
        };
        info!("level '{level}' finished");

        if let Some(next) = ctx
            .data
            .level(&level)
            .and_then(|script| script.next_level.clone())
        {
            ctx.timers.schedule_once(
                ctx.now_ms,
                ctx.tunables.level_advance_delay_ms,
                TimerAction::AdvanceLevel { level: next },
            );
        }
        vec![ScheduleAction::LevelFinished { level }]
    }

    /// Advance the block clock by `delta_ms` and dispatch every event that came due.
    ///
    /// The completion check only runs on a step that dispatched nothing, so enemies spawned
    /// this step are counted before the block can close.
    pub fn tick<T: TimerService>(
        &mut self,
        delta_ms: f64,
        active_enemies: usize,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Vec<ScheduleAction> {
        if !self.running {
            return Vec::new();
        }
        self.elapsed_ms += delta_ms;

        let mut out = Vec::new();
        while self
            .events
            .front()
            .is_some_and(|e| f64::from(e.time_ms) <= self.elapsed_ms)
        {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            if let Some(action) = self.dispatch(&event, ctx) {
                out.push(action);
            }
            if !self.running {
                // boss took over
                return out;
            }
        }

        if out.is_empty()
            && self.events.is_empty()
            && self.elapsed_ms > ctx.tunables.quiescence_ms
            && active_enemies == 0
        {
            out.extend(self.start_block(self.index + 1, ctx));
        }
        out
    }

    fn dispatch<T: TimerService>(
        &mut self,
        event: &SpawnEvent,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Option<ScheduleAction> {
        if event.is_boss {
            let Some(stats) = ctx.data.boss(&event.actor_id) else {
                warn!("boss '{}' not found; event skipped", event.actor_id);
                ctx.diagnostics
                    .note("scheduler", &format!("unknown boss '{}'", event.actor_id));
                return None;
            };
            self.running = false;
            self.boss_active = true;
            self.minion_timer = Some(ctx.timers.schedule_repeating(
                ctx.now_ms,
                ctx.tunables.minion_period_ms,
                TimerAction::SpawnBossMinion,
            ));
            return Some(ScheduleAction::Spawn(SpawnRequest::Boss {
                actor_id: event.actor_id.clone(),
                stats: stats.clone(),
            }));
        }

        let Some(stats) = ctx.data.enemy(&event.actor_id) else {
            warn!("enemy '{}' not found; event skipped", event.actor_id);
            ctx.diagnostics
                .note("scheduler", &format!("unknown enemy '{}'", event.actor_id));
            return None;
        };
        Some(ScheduleAction::Spawn(SpawnRequest::Enemy {
            actor_id: event.actor_id.clone(),
            y: event.y,
            stats: stats.clone(),
        }))
    }

    /// Boss gone: stop the minion spawner and resume at the next block.
    pub fn on_boss_defeated<T: TimerService>(
        &mut self,
        ctx: &mut SchedulerCtx<'_, T>,
    ) -> Vec<ScheduleAction> {
        if !self.boss_active {
            return Vec::new();
        }
        self.boss_active = false;
        if let Some(id) = self.minion_timer.take() {
            ctx.timers.cancel(id);
        }
        self.start_block(self.index + 1, ctx)
    }

    /// One minion for the running boss fight, at a random height.
    pub fn minion_spawn(
        &self,
        data: &GameData,
        tunables: &Tunables,
        diagnostics: &Diagnostics,
        rng: &mut impl RandomSource,
    ) -> Option<SpawnRequest> {
        if !self.boss_active {
            return None;
        }
        let Some(stats) = data.enemy(&tunables.minion_actor_id) else {
            warn!("minion '{}' not found", tunables.minion_actor_id);
            diagnostics.note(
                "scheduler",
                &format!("unknown minion '{}'", tunables.minion_actor_id),
            );
            return None;
        };
        let y = rng.range_i32(tunables.minion_y_min, tunables.minion_y_max);
        Some(SpawnRequest::Enemy {
            actor_id: tunables.minion_actor_id.clone(),
            y: y as f32,
            stats: stats.clone(),
        })
    }
}
