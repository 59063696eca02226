//! A configurable clone of the Atari 2600 game Breakout.
//!
//! The `Breakout` struct is the [`ac_core::Simulation`] and the `State`
//! struct is the [`ac_core::State`] used generically by other crates.

/// This module contains the core logic of the game.
mod breakout;
/// This module contains the core data structures used in the game.
mod types;

pub use crate::types::{Breakout, Brick, State, StateCore};
