//! Standard enemy movement patterns.
//!
//! Horizontal speed is always `-speed` except for the patterns that modulate it;
//! the vertical component depends on time since spawn.

use bevy::prelude::*;

use crate::config::MovementPattern;

/// Vertical amplitude of the sine pattern, px/s.
const SINE_AMPLITUDE: f32 = 150.0;
/// Vertical speed of the zigzag pattern, px/s.
const ZIGZAG_SPEED: f32 = 120.0;
/// Zigzag flips direction every this many ms.
const ZIGZAG_PERIOD_MS: f64 = 1000.0;

pub fn enemy_velocity(
    pattern: MovementPattern,
    elapsed_ms: f64,
    speed: f32,
    position: Vec2,
    target: Option<Vec2>,
) -> Vec2 {
    let vx = -speed;
    match pattern {
        MovementPattern::Linear => Vec2::new(vx, 0.0),
        MovementPattern::SineWave => {
            Vec2::new(vx, (elapsed_ms * 0.005).sin() as f32 * SINE_AMPLITUDE)
        }
        MovementPattern::Zigzag => {
            let leg = (elapsed_ms / ZIGZAG_PERIOD_MS).floor() as i64;
            let dir = if leg % 2 == 0 { 1.0 } else { -1.0 };
            Vec2::new(vx, dir * ZIGZAG_SPEED)
        }
        MovementPattern::Pursuit => {
            // Steer vertically toward the player, never faster than forward speed.
            let vy = target.map_or(0.0, |t| ((t.y - position.y) * 2.0).clamp(-speed, speed));
            Vec2::new(vx, vy)
        }
        MovementPattern::BurstSpeed => {
            let surge = elapsed_ms.rem_euclid(2000.0) < 500.0;
            Vec2::new(if surge { vx * 2.5 } else { vx * 0.6 }, 0.0)
        }
        MovementPattern::Circular => {
            let phase = elapsed_ms * 0.004;
            Vec2::new(
                vx + phase.cos() as f32 * 100.0,
                phase.sin() as f32 * 100.0,
            )
        }
        MovementPattern::WaveComplex => {
            let vy = (elapsed_ms * 0.003).sin() * 100.0 + (elapsed_ms * 0.011).sin() * 40.0;
            Vec2::new(vx, vy as f32)
        }
    }
}
