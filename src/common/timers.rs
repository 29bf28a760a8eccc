//! Cancellable one-shot and repeating timers on the frame clock.
//!
//! Delayed gameplay work (respawns, invulnerability expiry, boss minions, stat-mod expiry,
//! level advance) is scheduled here instead of on ad hoc `Timer` components, so every pending
//! callback has a handle its owner can cancel.

use bevy::prelude::*;

use crate::common::clock::FrameClock;
use crate::config::PlayerStat;

/// Handle returned by the scheduling calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What to do when a timer comes due.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerAction {
    RespawnPlayer,
    ClearInvulnerability,
    SpawnBossMinion,
    RevertStatMod { stat: PlayerStat, value: f32 },
    AdvanceLevel { level: String },
}

/// Scheduling surface used by the pure core functions.
pub trait TimerService {
    fn schedule_once(&mut self, now_ms: f64, delay_ms: f64, action: TimerAction) -> TimerId;
    fn schedule_repeating(&mut self, now_ms: f64, period_ms: f64, action: TimerAction) -> TimerId;
    /// Returns `false` when the id was not pending (already fired or cancelled).
    fn cancel(&mut self, id: TimerId) -> bool;
}

#[derive(Debug, Clone)]
struct PendingTimer {
    id: TimerId,
    due_ms: f64,
    period_ms: Option<f64>,
    action: TimerAction,
}

#[derive(Resource, Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl TimerQueue {
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every occurrence due at `now_ms`, earliest first.
    ///
    /// Ties resolve in scheduling order. Repeating timers are re-armed one period later and
    /// can fire more than once if the clock jumped over several periods.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<(TimerId, TimerAction)> {
        let mut fired = Vec::new();
        while let Some(idx) = self.next_due(now_ms) {
            let timer = &mut self.pending[idx];
            fired.push((timer.id, timer.action.clone()));
            match timer.period_ms {
                Some(period) => timer.due_ms += period,
                None => {
                    self.pending.remove(idx);
                }
            }
        }
        fired
    }

    fn next_due(&self, now_ms: f64) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(idx, _)| idx)
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, action: TimerAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer {
            id,
            due_ms,
            period_ms,
            action,
        });
        id
    }
}

impl TimerService for TimerQueue {
    fn schedule_once(&mut self, now_ms: f64, delay_ms: f64, action: TimerAction) -> TimerId {
        self.push(now_ms + delay_ms.max(0.0), None, action)
    }

    fn schedule_repeating(&mut self, now_ms: f64, period_ms: f64, action: TimerAction) -> TimerId {
        // A zero period would re-fire forever inside a single drain.
        let period = period_ms.max(1.0);
        self.push(now_ms + period, Some(period), action)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }
}

/// A timer came due this step. Each plugin matches the actions it owns.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct TimerFired {
    pub id: TimerId,
    pub action: TimerAction,
}

pub fn dispatch_due_timers(
    clock: Res<FrameClock>,
    mut timers: ResMut<TimerQueue>,
    mut fired: MessageWriter<TimerFired>,
) {
    for (id, action) in timers.drain_due(clock.now_ms) {
        debug!("timer {id:?} fired: {action:?}");
        fired.write(TimerFired { id, action });
    }
}
