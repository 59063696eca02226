//! A config-plus-state pair behind one handle.
//!
//! The session owns a configuration and the state it produced, and
//! carries the caller-level policies the games themselves refuse to
//! own: frame-skip, buffer-shaped rendering, and atomic config
//! replacement.

use crate::{AleAction, GameError, Input, QueryError, Simulation, State, get_simulation_by_name};

/// One playable game: a configuration and its current state.
pub struct Session {
    game_name: String,
    sim: Box<dyn Simulation + Send>,
    state: Box<dyn State + Send>,
    /// Each submitted action is applied this many times (frame-skip
    /// plus one). Frame-skip is a session policy, not a game rule.
    frames_per_action: u32,
}

impl Session {
    /// Start the named game with its default configuration.
    pub fn new(game_name: &str) -> Result<Session, GameError> {
        let mut sim = get_simulation_by_name(game_name)?;
        let state = sim.new_game();
        Ok(Session {
            game_name: game_name.to_string(),
            sim,
            state,
            frames_per_action: 1,
        })
    }

    /// Start the named game with a fixed seed.
    pub fn with_seed(game_name: &str, seed: u32) -> Result<Session, GameError> {
        let mut session = Session::new(game_name)?;
        session.set_seed(seed);
        session.new_game();
        Ok(session)
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    /// Apply every submitted action `skip + 1` times.
    pub fn set_frameskip(&mut self, skip: u32) {
        self.frames_per_action = skip + 1;
    }

    /// Seed the configuration. Takes effect on the next `new_game()`;
    /// the current state keeps its stream.
    pub fn set_seed(&mut self, seed: u32) {
        self.sim.reset_seed(seed);
    }

    /// Replace the current state with a fresh game.
    pub fn new_game(&mut self) {
        self.state = self.sim.new_game();
    }

    /// Apply a numeric action code. Returns false (and takes no tick)
    /// when the code is outside the action table.
    pub fn apply_ale_action(&mut self, code: i32) -> bool {
        let Some(action) = AleAction::from_int(code) else {
            return false;
        };
        let buttons = action.to_input();
        for _ in 0..self.frames_per_action {
            self.state.update_mut(buttons);
        }
        true
    }

    /// Apply a structured input.
    pub fn apply_action(&mut self, buttons: Input) {
        for _ in 0..self.frames_per_action {
            self.state.update_mut(buttons);
        }
    }

    pub fn lives(&self) -> i32 {
        self.state.lives()
    }

    pub fn score(&self) -> i32 {
        self.state.score()
    }

    pub fn level(&self) -> i32 {
        self.state.level()
    }

    pub fn game_over(&self) -> bool {
        self.state.game_over()
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn frame_size(&self) -> (i32, i32) {
        self.sim.game_size()
    }

    pub fn legal_action_set(&self) -> Vec<AleAction> {
        self.sim.legal_action_set()
    }

    /// Render the current frame; `width * height * 4` bytes RGBA, or
    /// `width * height` bytes grayscale.
    pub fn render_frame(&self, grayscale: bool) -> Vec<u8> {
        if grayscale {
            ac_core::render_grayscale(self.sim.as_ref(), self.state.as_ref())
        } else {
            ac_core::render_color(self.sim.as_ref(), self.state.as_ref())
        }
    }

    pub fn query(
        &self,
        query: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, QueryError> {
        self.state.query_json(query, args)
    }

    pub fn state_to_json(&self) -> String {
        self.state.to_json()
    }

    /// Restore the state from a dump. The current state survives a
    /// rejected payload untouched.
    pub fn write_state_json(&mut self, json: &str) -> Result<(), GameError> {
        let state = self.sim.new_state_from_json(json)?;
        self.state = state;
        Ok(())
    }

    pub fn config_to_json(&self) -> String {
        self.sim.to_json()
    }

    /// Replace the configuration and start a new game under it. The
    /// old config and state survive a rejected payload untouched.
    pub fn write_config_json(&mut self, json: &str) -> Result<(), GameError> {
        let sim = self.sim.from_json(json)?;
        self.sim = sim;
        self.new_game();
        Ok(())
    }

    /// Clone the current state for later restore; the checkpoint
    /// primitive for rollouts.
    pub fn checkpoint(&self) -> Box<dyn State + Send> {
        self.state.copy()
    }

    /// Restore a checkpoint taken from this session.
    pub fn restore(&mut self, checkpoint: &dyn State) {
        self.state = checkpoint.copy();
    }

    /// Borrow the underlying state for direct trait access.
    pub fn state(&self) -> &dyn State {
        self.state.as_ref()
    }

    /// Borrow the underlying simulation for direct trait access.
    pub fn simulation(&self) -> &dyn Simulation {
        self.sim.as_ref()
    }
}
