//! A configurable clone of the Atari 2600 game Space Invaders.
//!
//! The `SpaceInvaders` struct is the [`ac_core::Simulation`] and the
//! `State` struct is the [`ac_core::State`] used generically by other
//! crates.

mod invaders;
mod types;

pub use crate::types::{Enemy, Laser, Shield, Ship, SpaceInvaders, State, StateCore, Ufo};
