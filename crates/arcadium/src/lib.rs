//! arcadium: the game registry and session surface.
//!
//! Construct a game by name with [`get_simulation_by_name`], or hold a
//! whole config-plus-state pair in a [`Session`] when you want the
//! convenience surface (frame-skip, render buffers, save/restore) in
//! one place.

pub use ac_core::graphics;
pub use ac_core::{
    AleAction, Direction, GameError, GameRng, Input, QueryError, Simulation, State,
};

mod session;
pub use session::Session;

/// The set of games that are known. Indexed by UIs; keep the order
/// stable.
pub const GAME_LIST: &[&str] = &[
    #[cfg(feature = "amidar")]
    "amidar",
    #[cfg(feature = "breakout")]
    "breakout",
    #[cfg(feature = "gridworld")]
    "gridworld",
    #[cfg(feature = "space_invaders")]
    "space_invaders",
];

/// Construct the named game's default configuration.
pub fn get_simulation_by_name(name: &str) -> Result<Box<dyn Simulation + Send>, GameError> {
    match name.to_lowercase().as_str() {
        #[cfg(feature = "amidar")]
        "amidar" => Ok(Box::new(ac_amidar::Amidar::default())),
        #[cfg(feature = "breakout")]
        "breakout" => Ok(Box::new(ac_breakout::Breakout::default())),
        #[cfg(feature = "gridworld")]
        "gridworld" => Ok(Box::new(ac_gridworld::GridWorld::default())),
        #[cfg(feature = "space_invaders")]
        "space_invaders" | "spaceinvaders" => Ok(Box::new(ac_invaders::SpaceInvaders::default())),
        _ => Err(GameError::UnknownGame {
            name: name.to_string(),
            known: GAME_LIST,
        }),
    }
}
