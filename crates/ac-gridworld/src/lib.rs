//! A small deterministic maze game, useful as the simplest possible
//! target for agent plumbing.
//!
//! The `GridWorld` struct is the [`ac_core::Simulation`] and the
//! `State` struct is the [`ac_core::State`] used generically by other
//! crates.

mod gridworld;
mod types;

pub use crate::types::{GridTile, GridWorld, State, StateCore};
