//! Common, shared types.

pub mod clock;
pub mod diagnostics;
pub mod fsm;
pub mod layers;
pub mod messages;
pub mod rng;
pub mod signals;
pub mod state;
pub mod timers;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
