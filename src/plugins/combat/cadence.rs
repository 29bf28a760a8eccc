//! Fire cadence shared by enemies and bosses.

/// Next time an actor may fire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FireCadence {
    next_fire_ms: f64,
}

impl FireCadence {
    #[inline]
    pub fn ready(&self, now_ms: f64) -> bool {
        now_ms > self.next_fire_ms
    }

    pub fn arm(&mut self, now_ms: f64, rate_ms: u32, jitter_ms: i32) {
        self.next_fire_ms = now_ms + rate_ms as f64 + jitter_ms as f64;
    }

    #[inline]
    pub fn next_fire_ms(&self) -> f64 {
        self.next_fire_ms
    }
}
