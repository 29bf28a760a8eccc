//! Millisecond frame clock.

use bevy::prelude::*;

/// Millisecond view of the fixed-step clock.
///
/// Core step functions take `(now_ms, delta_ms)` rather than reading `Time` directly,
/// so a harness can drive them deterministically by writing this resource.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    pub now_ms: f64,
    pub delta_ms: f64,
}

impl FrameClock {
    #[inline]
    pub fn at(now_ms: f64, delta_ms: f64) -> Self {
        Self { now_ms, delta_ms }
    }

    /// Step forward by `delta_ms`.
    #[inline]
    pub fn advance(&mut self, delta_ms: f64) {
        self.now_ms += delta_ms;
        self.delta_ms = delta_ms;
    }
}

/// Refresh the frame clock from the fixed timestep. Runs in `FixedFirst`.
pub fn sync_from_fixed_time(time: Res<Time<Fixed>>, mut clock: ResMut<FrameClock>) {
    clock.now_ms = time.elapsed_secs_f64() * 1000.0;
    clock.delta_ms = time.delta_secs_f64() * 1000.0;
}
