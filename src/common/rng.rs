//! Injectable random source.
//!
//! Every roll in the core (critical hits, fire jitter, minion placement, powerup drops)
//! goes through [`RandomSource`], so tests can pin outcomes.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform draw in `[0, 100)`.
    fn roll_percent(&mut self) -> f32;

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32;

    /// Uniform index in `0..len`. Returns 0 when `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;

    /// `true` with probability `percent / 100`.
    fn chance(&mut self, percent: f32) -> bool {
        self.roll_percent() < percent
    }
}

/// Seeded production generator.
#[derive(Resource, Debug)]
pub struct GameRng(StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::seeded(0x5EED_CAFE)
    }
}

impl RandomSource for GameRng {
    fn roll_percent(&mut self) -> f32 {
        self.0.random_range(0.0..100.0)
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.0.random_range(lo..=hi)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.0.random_range(0..len)
    }
}

/// Replays a fixed list of percent rolls, then repeats `fallback`.
///
/// Integer ranges resolve to `lo` and picks to index 0 unless queued explicitly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    rolls: VecDeque<f32>,
    ints: VecDeque<i32>,
    fallback: f32,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f32>, fallback: f32) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            ints: VecDeque::new(),
            fallback,
        }
    }

    /// A source whose every percent roll is `value`.
    pub fn constant(value: f32) -> Self {
        Self::new([], value)
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = i32>) -> Self {
        self.ints.extend(ints);
        self
    }
}

impl RandomSource for ScriptedRng {
    fn roll_percent(&mut self) -> f32 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        self.ints
            .pop_front()
            .map_or(lo, |v| v.clamp(lo, hi.max(lo)))
    }

    fn pick_index(&mut self, len: usize) -> usize {
        let Some(v) = self.ints.pop_front() else {
            return 0;
        };
        if len == 0 {
            return 0;
        }
        (v.max(0) as usize).min(len - 1)
    }
}
