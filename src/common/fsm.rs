//! Generic finite-state machine.
//!
//! States are keys of any `Copy + Eq + Hash` type; handlers are plain function pointers that
//! receive the owner's context by `&mut`, so the machine never holds a reference to its owner.
//! `update` handlers return the next state instead of calling back into the machine.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use bevy::prelude::*;

use crate::common::diagnostics::Diagnostics;

pub type EnterFn<K, C, A> = fn(&mut C, Option<K>, &A);
pub type UpdateFn<K, C> = fn(&mut C, f64, f64) -> Option<K>;
pub type ExitFn<C> = fn(&mut C);

pub struct StateHandlers<K, C, A = ()> {
    enter: Option<EnterFn<K, C, A>>,
    update: Option<UpdateFn<K, C>>,
    exit: Option<ExitFn<C>>,
}

impl<K, C, A> Default for StateHandlers<K, C, A> {
    fn default() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }
}

impl<K, C, A> StateHandlers<K, C, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(mut self, f: EnterFn<K, C, A>) -> Self {
        self.enter = Some(f);
        self
    }

    pub fn on_update(mut self, f: UpdateFn<K, C>) -> Self {
        self.update = Some(f);
        self
    }

    pub fn on_exit(mut self, f: ExitFn<C>) -> Self {
        self.exit = Some(f);
        self
    }
}

pub struct StateMachine<K, C, A = ()> {
    states: HashMap<K, StateHandlers<K, C, A>>,
    current: Option<K>,
    state_time_ms: f64,
    diagnostics: Option<Diagnostics>,
}

impl<K, C, A> StateMachine<K, C, A>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Registers `states`, then enters `initial` (with no previous state) if given.
    pub fn new(
        ctx: &mut C,
        initial: Option<K>,
        states: impl IntoIterator<Item = (K, StateHandlers<K, C, A>)>,
    ) -> Self
    where
        A: Default,
    {
        let mut machine = Self {
            states: states.into_iter().collect(),
            current: None,
            state_time_ms: 0.0,
            diagnostics: None,
        };
        if let Some(initial) = initial {
            machine.transition(ctx, initial);
        }
        machine
    }

    /// Rejected transitions are also reported here.
    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = Some(diagnostics);
    }

    #[inline]
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Milliseconds accumulated since the last transition.
    #[inline]
    pub fn state_time_ms(&self) -> f64 {
        self.state_time_ms
    }

    pub fn transition(&mut self, ctx: &mut C, next: K) -> bool
    where
        A: Default,
    {
        self.transition_with(ctx, next, A::default())
    }

    /// Exit current, enter `next` with `args`.
    ///
    /// Returns `false` (and changes nothing) for an unregistered target or a self-transition.
    pub fn transition_with(&mut self, ctx: &mut C, next: K, args: A) -> bool {
        let Some(handlers) = self.states.get(&next) else {
            let detail = format!("'{next:?}' is not registered, staying in {:?}", self.current);
            warn!("state machine: {detail}");
            if let Some(diagnostics) = &self.diagnostics {
                diagnostics.note("state machine", &detail);
            }
            return false;
        };
        if self.current == Some(next) {
            return false;
        }

        let enter = handlers.enter;
        let previous = self.current;
        if let Some(exit) = previous
            .and_then(|key| self.states.get(&key))
            .and_then(|h| h.exit)
        {
            exit(ctx);
        }

        self.current = Some(next);
        self.state_time_ms = 0.0;
        if let Some(enter) = enter {
            enter(ctx, previous, &args);
        }
        true
    }

    /// Runs the current state's update and applies the transition it asks for.
    pub fn update(&mut self, ctx: &mut C, now_ms: f64, delta_ms: f64)
    where
        A: Default,
    {
        let Some(current) = self.current else {
            return;
        };
        self.state_time_ms += delta_ms;

        let update = self.states.get(&current).and_then(|h| h.update);
        if let Some(next) = update.and_then(|f| f(ctx, now_ms, delta_ms)) {
            self.transition(ctx, next);
        }
    }
}

impl<K: fmt::Debug, C, A> fmt::Debug for StateMachine<K, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("state_time_ms", &self.state_time_ms)
            .field("states", &self.states.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::diagnostics::{DiagnosticEntry, RecordingDiagnostics};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Door {
        Closed,
        Open,
        Locked,
    }

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        ticks: u32,
    }

    fn machine(log: &mut Log) -> StateMachine<Door, Log> {
        StateMachine::new(
            log,
            Some(Door::Closed),
            [
                (
                    Door::Closed,
                    StateHandlers::new()
                        .on_enter(|log: &mut Log, prev, _| {
                            log.calls.push(format!("enter closed from {prev:?}"))
                        })
                        .on_exit(|log: &mut Log| log.calls.push("exit closed".into())),
                ),
                (
                    Door::Open,
                    StateHandlers::new()
                        .on_enter(|log: &mut Log, prev, _| {
                            log.calls.push(format!("enter open from {prev:?}"))
                        })
                        .on_update(|log: &mut Log, _, _| {
                            log.ticks += 1;
                            (log.ticks >= 2).then_some(Door::Closed)
                        }),
                ),
            ],
        )
    }

    #[test]
    fn initial_state_is_entered_at_construction() {
        let mut log = Log::default();
        let fsm = machine(&mut log);

        assert_eq!(fsm.current(), Some(Door::Closed));
        assert_eq!(log.calls, vec!["enter closed from None"]);
    }

    #[test]
    fn transition_runs_exit_then_enter() {
        let mut log = Log::default();
        let mut fsm = machine(&mut log);

        assert!(fsm.transition(&mut log, Door::Open));
        assert_eq!(
            log.calls[1..],
            ["exit closed", "enter open from Some(Closed)"]
        );
    }

    #[test]
    fn unregistered_target_is_a_no_op() {
        let mut log = Log::default();
        let mut fsm = machine(&mut log);

        assert!(!fsm.transition(&mut log, Door::Locked));
        assert_eq!(fsm.current(), Some(Door::Closed));
        assert_eq!(log.calls.len(), 1);
    }

    #[test]
    fn unregistered_target_is_reported_to_diagnostics() {
        let recorder = RecordingDiagnostics::default();
        let mut log = Log::default();
        let mut fsm = machine(&mut log);
        fsm.set_diagnostics(Diagnostics::new(recorder.clone()));

        fsm.transition(&mut log, Door::Locked);

        assert_eq!(
            recorder.entries(),
            vec![DiagnosticEntry::Note {
                context: "state machine".into(),
                detail: "'Locked' is not registered, staying in Some(Closed)".into(),
            }]
        );
    }

    #[test]
    fn self_transition_skips_handlers() {
        let mut log = Log::default();
        let mut fsm = machine(&mut log);
        fsm.update(&mut log, 0.0, 40.0);

        assert!(!fsm.transition(&mut log, Door::Closed));
        assert_eq!(log.calls.len(), 1);
        assert_eq!(fsm.state_time_ms(), 40.0);
    }

    #[test]
    fn update_accumulates_time_and_follows_returned_state() {
        let mut log = Log::default();
        let mut fsm = machine(&mut log);
        fsm.transition(&mut log, Door::Open);

        fsm.update(&mut log, 16.0, 16.0);
        assert_eq!(fsm.current(), Some(Door::Open));
        assert_eq!(fsm.state_time_ms(), 16.0);

        fsm.update(&mut log, 32.0, 16.0);
        assert_eq!(fsm.current(), Some(Door::Closed));
        assert_eq!(fsm.state_time_ms(), 0.0);
    }

    #[test]
    fn enter_receives_arguments() {
        #[derive(Default)]
        struct Ctx {
            speed: f32,
        }

        let mut ctx = Ctx::default();
        let mut fsm: StateMachine<Door, Ctx, f32> = StateMachine::new(
            &mut ctx,
            None,
            [(
                Door::Open,
                StateHandlers::new().on_enter(|ctx: &mut Ctx, _, speed: &f32| ctx.speed = *speed),
            )],
        );

        assert_eq!(fsm.current(), None);
        fsm.transition_with(&mut ctx, Door::Open, 2.5);
        assert_eq!(ctx.speed, 2.5);
    }
}
