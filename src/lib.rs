//! Library entry point.
//!
//! Headless combat and level-progression core for a horizontal shoot-em-up.
//! Integration tests in `tests/` are compiled as separate crates;
//! a `lib.rs` gives them a stable public API surface to import.

pub mod common;
pub mod config;
pub mod game;
pub mod plugins;
