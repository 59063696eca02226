//! A configurable clone of the Atari 2600 game Amidar.
//!
//! The `Amidar` struct is the [`ac_core::Simulation`] and the `State`
//! struct is the [`ac_core::State`] used generically by other crates.

mod amidar;
mod types;

pub use crate::types::{Amidar, Board, Enemy, EnemyAI, GridBox, State, StateCore, Tile, TilePoint};
