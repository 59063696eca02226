//! ac-core: the simulation and frame-state contract shared by all games.
//!
//! This crate contains no game rules and no I/O. It defines the two
//! traits every game implements -- a [`Simulation`] (the configuration,
//! which manufactures states) and a [`State`] (one simulated frame) --
//! plus the input model, the query sublanguage, the error taxonomy, and
//! the software renderer those implementations share.
//!
//! Everything here is synchronous and single-threaded. A
//! `State` is exclusively owned by one logical caller at a time; cloning
//! via [`State::copy`] is the sanctioned way to fan out parallel
//! rollouts from a checkpoint.

pub mod collision;
pub mod features;
pub mod font;
pub mod graphics;
pub mod query;
pub mod vec2d;

mod direction;
mod error;
mod input;

pub use ac_rng::GameRng;
pub use direction::Direction;
pub use error::GameError;
pub use input::{AleAction, Input};
pub use query::QueryError;

/// One simulated frame of a game.
///
/// States are created by [`Simulation::new_game`] or
/// [`Simulation::new_state_from_json`], advanced exclusively through
/// [`State::update_mut`], and read through everything else. Reads are
/// pure: repeated calls on an untouched state return identical results.
pub trait State {
    /// Lives remaining. Negative means the game is over and the state
    /// should be replaced with a fresh `new_game()`.
    fn lives(&self) -> i32;

    /// Points earned so far; never decreases within a playthrough.
    fn score(&self) -> i32;

    /// Current level, 1-based; never decreases within a playthrough.
    fn level(&self) -> i32;

    /// True while the player is between losing a life and pressing FIRE
    /// to respawn. Always false in games without that pause.
    fn is_dead(&self) -> bool;

    /// Derived terminal condition; kept in lockstep with `lives()`.
    fn game_over(&self) -> bool {
        self.lives() < 0
    }

    /// Advance the simulation by exactly one tick. Accepts any input;
    /// after `game_over()` the call is a no-op so polling loops can
    /// keep submitting actions safely.
    fn update_mut(&mut self, buttons: Input);

    /// Describe this frame as a display list for the rasterizer.
    fn draw(&self) -> Vec<graphics::Drawable>;

    /// Serialize the frame core (counters, entities, RNG) to JSON.
    fn to_json(&self) -> String;

    /// Deep copy with no shared mutable substructure. Cheaper than a
    /// JSON round-trip; this is the checkpoint/rollout primitive.
    fn copy(&self) -> Box<dyn State + Send>;

    /// Answer a query (path expression or legacy keyword) about this
    /// frame without serializing the whole state for the caller.
    fn query_json(
        &self,
        query: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, QueryError>;

    /// Small named feature vector for learning code; every value is
    /// within [-1, 1].
    fn handcrafted_features(&self) -> Vec<(String, f32)>;
}

/// A game configuration: tunable parameters plus the seed policy for
/// the states it manufactures.
pub trait Simulation {
    /// Store `seed` for the *next* `new_game()`. Never touches states
    /// that already exist; reproducibility of live states would break
    /// silently otherwise.
    fn reset_seed(&mut self, seed: u32);

    /// Allocate a fresh state with counters at their initial values and
    /// an RNG derived from the stored seed.
    fn new_game(&mut self) -> Box<dyn State + Send>;

    /// Restore a state from a `State::to_json` dump. Fails atomically
    /// with [`GameError::InvalidState`]; nothing is partially built.
    fn new_state_from_json(&self, json: &str) -> Result<Box<dyn State + Send>, GameError>;

    /// Fixed frame dimensions for this game, (width, height) in pixels.
    fn game_size(&self) -> (i32, i32);

    /// Serialize this configuration to JSON.
    fn to_json(&self) -> String;

    /// Build a *new* configuration from JSON. The receiver is never
    /// modified; on validation failure it fails with
    /// [`GameError::InvalidConfig`] and the caller keeps the original.
    fn from_json(&self, json: &str) -> Result<Box<dyn Simulation + Send>, GameError>;

    /// The subset of the 18-code action table this game responds to,
    /// sorted by numeric code.
    fn legal_action_set(&self) -> Vec<AleAction>;

    /// JSON Schema for this game's state documents.
    fn schema_for_state(&self) -> String;

    /// JSON Schema for this game's config documents.
    fn schema_for_config(&self) -> String;
}

/// Render a state through its display list into a fresh RGBA buffer of
/// exactly `width * height * 4` bytes.
pub fn render_color(sim: &dyn Simulation, state: &dyn State) -> Vec<u8> {
    let (w, h) = sim.game_size();
    let mut img = graphics::ImageBuffer::alloc(w, h);
    img.render(&state.draw());
    img.data
}

/// Render a state into a fresh grayscale buffer of exactly
/// `width * height` bytes.
pub fn render_grayscale(sim: &dyn Simulation, state: &dyn State) -> Vec<u8> {
    let (w, h) = sim.game_size();
    let mut img = graphics::GrayscaleBuffer::alloc(w, h);
    img.render(&state.draw());
    img.data
}
