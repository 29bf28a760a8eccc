//! Player damage, death, respawn, and lives.
//!
//! Everything here is a plain function over the player's components plus a [`LifecycleCtx`];
//! the ECS systems in the parent module only gather those pieces and apply the outcome.
//! Death and respawn run behind [`guarded`]: a failure there must end the run cleanly
//! rather than leave the player half-dead.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bevy::prelude::*;
use thiserror::Error;

use crate::common::diagnostics::Diagnostics;
use crate::common::rng::RandomSource;
use crate::common::signals::{CombatSignal, SignalSink};
use crate::common::timers::{TimerAction, TimerId, TimerService};
use crate::common::tunables::Tunables;
use crate::plugins::combat::damage::{DamageEvent, DamageSource, Resistances};
use crate::plugins::combat::health::{Health, Shield, damage_hull};
use crate::plugins::player::{Player, PlayerLives};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no player entity to {action}")]
    PlayerMissing { action: &'static str },
    #[error("cannot respawn: no lives remaining")]
    NoLivesRemaining,
    #[error("panic during {context}: {message}")]
    Panicked { context: String, message: String },
}

/// Shared services for lifecycle transitions.
pub struct LifecycleCtx<'a, T: TimerService, S: SignalSink> {
    pub now_ms: f64,
    pub lives: &'a mut PlayerLives,
    pub timers: &'a mut T,
    pub signals: &'a mut S,
    pub tunables: &'a Tunables,
}

/// How an accepted hit was split.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDamage {
    pub absorbed: u32,
    pub hull: Option<DamageEvent>,
    /// Hull reached zero; the death handler should run.
    pub lethal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathOutcome {
    /// The player was already dead; nothing changed.
    AlreadyDead,
    Respawning { timer: TimerId, lives: u32 },
    GameOver,
}

/// Shield first, then hull. Ignored while dead or invulnerable.
pub fn take_damage(
    player: &Player,
    health: &mut Health,
    shield: &mut Shield,
    resistances: &Resistances,
    source: Option<&DamageSource>,
    rng: &mut impl RandomSource,
    signals: &mut impl SignalSink,
) -> Option<PlayerDamage> {
    if health.is_dead() || player.invulnerable {
        return None;
    }

    let source = DamageSource::or_default(source);
    let mut absorbed = 0;
    let mut remainder = source.damage.max(0.0);

    if shield.value() > 0 {
        let split = shield.absorb(remainder);
        absorbed = split.absorbed;
        remainder = split.remainder;
        signals.publish(CombatSignal::PlayerShield {
            shield: shield.value(),
            max_shield: shield.max(),
        });
    }

    let mut hull = None;
    if remainder > 0.0 {
        let residual = DamageSource::new(remainder, source.damage_type.clone());
        hull = Some(damage_hull(health, resistances, &residual, rng));
        signals.publish(CombatSignal::PlayerHit {
            hp: health.hp(),
            max_hp: health.max_hp(),
        });
    }

    Some(PlayerDamage {
        absorbed,
        hull,
        lethal: health.is_depleted(),
    })
}

/// Runs once per death: spends a life, then schedules a respawn or ends the run.
///
/// Re-entry while already dead is ignored, so a double trigger only costs one life.
pub fn handle_death<T: TimerService, S: SignalSink>(
    player: &mut Player,
    health: &mut Health,
    ctx: &mut LifecycleCtx<'_, T, S>,
) -> DeathOutcome {
    if !health.die() {
        debug!("player death handler re-entered while dead; ignoring");
        return DeathOutcome::AlreadyDead;
    }
    player.can_act = false;
    ctx.signals.publish(CombatSignal::PlayerHit {
        hp: 0,
        max_hp: health.max_hp(),
    });

    let before = ctx.lives.get_or_init(ctx.tunables.starting_lives);
    if before == 0 {
        return trigger_game_over(player, ctx);
    }
    let remaining = before - 1;
    ctx.lives.set(remaining);
    ctx.signals
        .publish(CombatSignal::LifeChange { lives: remaining });

    if remaining == 0 {
        return trigger_game_over(player, ctx);
    }

    if let Some(stale) = player.respawn_timer.take() {
        ctx.timers.cancel(stale);
    }
    let timer = ctx.timers.schedule_once(
        ctx.now_ms,
        ctx.tunables.respawn_delay_ms,
        TimerAction::RespawnPlayer,
    );
    player.respawn_timer = Some(timer);
    info!("player down, respawning in {}ms ({remaining} lives left)", ctx.tunables.respawn_delay_ms);

    DeathOutcome::Respawning {
        timer,
        lives: remaining,
    }
}

/// Ends the run: drops pending respawn/invulnerability work and announces game over.
pub fn trigger_game_over<T: TimerService, S: SignalSink>(
    player: &mut Player,
    ctx: &mut LifecycleCtx<'_, T, S>,
) -> DeathOutcome {
    player.can_act = false;
    for id in [player.respawn_timer.take(), player.invulnerability_timer.take()]
        .into_iter()
        .flatten()
    {
        ctx.timers.cancel(id);
    }
    info!("game over");
    ctx.signals.publish(CombatSignal::GameOver);
    DeathOutcome::GameOver
}

/// Full hull, back in control, and a grace window of invulnerability.
pub fn respawn<T: TimerService, S: SignalSink>(
    player: &mut Player,
    health: &mut Health,
    shield: &Shield,
    ctx: &mut LifecycleCtx<'_, T, S>,
) -> Result<(), LifecycleError> {
    if ctx.lives.get() == Some(0) {
        return Err(LifecycleError::NoLivesRemaining);
    }
    player.respawn_timer = None;
    if !health.is_dead() {
        debug!("respawn requested for a living player; ignoring");
        return Ok(());
    }

    health.revive();
    player.can_act = true;
    set_invulnerable(
        player,
        ctx.now_ms,
        ctx.tunables.invulnerability_ms,
        &mut *ctx.timers,
    );

    ctx.signals.publish(CombatSignal::PlayerHit {
        hp: health.hp(),
        max_hp: health.max_hp(),
    });
    ctx.signals.publish(CombatSignal::PlayerShield {
        shield: shield.value(),
        max_shield: shield.max(),
    });
    ctx.signals.publish(CombatSignal::PlayerHealed {
        hp: health.hp(),
        max_hp: health.max_hp(),
    });
    Ok(())
}

pub fn set_invulnerable(
    player: &mut Player,
    now_ms: f64,
    duration_ms: f64,
    timers: &mut impl TimerService,
) {
    if let Some(previous) = player.invulnerability_timer.take() {
        timers.cancel(previous);
    }
    player.invulnerable = true;
    player.invulnerability_timer = Some(timers.schedule_once(
        now_ms,
        duration_ms,
        TimerAction::ClearInvulnerability,
    ));
}

/// Only the timer that set the current window may clear it.
pub fn clear_invulnerability(player: &mut Player, fired: TimerId) -> bool {
    if player.invulnerability_timer != Some(fired) {
        return false;
    }
    player.invulnerability_timer = None;
    player.invulnerable = false;
    true
}

/// Adds `amount` lives, initializing the counter first if needed.
pub fn add_life(
    lives: &mut PlayerLives,
    amount: u32,
    tunables: &Tunables,
    signals: &mut impl SignalSink,
) -> u32 {
    let total = lives
        .get_or_init(tunables.starting_lives)
        .saturating_add(amount);
    lives.set(total);
    signals.publish(CombatSignal::LifeChange { lives: total });
    total
}

/// Run a lifecycle transition behind a failure boundary.
///
/// Errors and panics are logged, reported to `diagnostics`, and returned so the caller can
/// force game over.
pub fn guarded<R>(
    context: &str,
    diagnostics: &Diagnostics,
    f: impl FnOnce() -> Result<R, LifecycleError>,
) -> Result<R, LifecycleError> {
    let result = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(LifecycleError::Panicked {
            context: context.to_string(),
            message: panic_message(payload.as_ref()),
        })
    });

    if let Err(err) = &result {
        error!("{context} failed: {err}");
        diagnostics.critical(context, err);
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
