//! Boss movement patterns.
//!
//! Patterns key off absolute game time, not time since spawn, so two bosses with the same
//! behavior move in phase.

use bevy::prelude::*;

use crate::config::BossBehavior;

/// Pursuit stops inside this radius.
pub const PURSUIT_STOP_RADIUS: f32 = 50.0;

/// Velocity for `behavior` at `now_ms`. `target` is the player position while the player is alive.
pub fn boss_velocity(
    behavior: BossBehavior,
    now_ms: f64,
    speed: f32,
    position: Vec2,
    target: Option<Vec2>,
) -> Vec2 {
    let t = now_ms;
    let wave = |k: f64| (t * k).sin() as f32;
    let cosw = |k: f64| (t * k).cos() as f32;

    match behavior {
        BossBehavior::VerticalBounce => Vec2::new(0.0, wave(0.002) * speed),
        BossBehavior::FigureEight => Vec2::new(cosw(0.001) * speed / 2.0, wave(0.002) * speed),
        BossBehavior::HorizontalDrift => {
            Vec2::new(wave(0.001) * speed * 0.6, cosw(0.0015) * speed * 0.8)
        }
        BossBehavior::AggressivePursuit => {
            let Some(target) = target else {
                return Vec2::ZERO;
            };
            let offset = target - position;
            let distance = offset.length();
            if distance > PURSUIT_STOP_RADIUS {
                offset / distance * speed * 0.5
            } else {
                Vec2::ZERO
            }
        }
        BossBehavior::ChaosPattern => match (t / 3000.0).floor() as i64 % 4 {
            0 => Vec2::new(wave(0.003) * speed, cosw(0.002) * speed),
            1 => Vec2::new(cosw(0.004) * speed * 1.2, -wave(0.003) * speed * 0.8),
            2 => Vec2::new(-wave(0.002) * speed * 0.7, wave(0.005) * speed * 1.1),
            _ => Vec2::new(cosw(0.001) * speed * 0.9, cosw(0.004) * speed),
        },
        BossBehavior::Hold => Vec2::ZERO,
    }
}
