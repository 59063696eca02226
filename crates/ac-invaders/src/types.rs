use ac_core::graphics::Color;
use ac_rng::GameRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for a Space Invaders game; affects any new games
/// generated from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpaceInvaders {
    /// The random number generator that seeds new games.
    pub rand: GameRng,
    pub bg_color: Color,
    pub ship_color: Color,
    pub enemy_color: Color,
    pub laser_color: Color,
    pub shield_color: Color,
    pub ufo_color: Color,
    /// Points per destroyed enemy in each row, top row first.
    pub row_scores: Vec<i32>,
    /// How many lives do new games start with?
    pub start_lives: i32,
    /// Enemy formation size.
    pub enemy_rows: i32,
    pub enemy_cols: i32,
    /// Shield shape as ASCII art; `X` is a destructible cell.
    pub shield_template: Vec<String>,
    /// Ticks between UFO passes.
    pub ufo_period: i32,
    /// Points for shooting down the UFO.
    pub ufo_points: i32,
}

/// The player's ship; only its x ever changes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Ship {
    pub x: i32,
}

/// One enemy in the marching formation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Enemy {
    /// Formation row, 0 at the top.
    pub row: i32,
    /// Formation column, 0 at the left.
    pub col: i32,
    /// Top-left corner in pixels.
    pub x: i32,
    pub y: i32,
    /// Still alive?
    pub alive: bool,
    /// Points this enemy awards.
    pub points: i32,
}

/// A laser bolt in flight; `dy` is negative for the player's shot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Laser {
    pub x: i32,
    pub y: i32,
    pub dy: i32,
}

/// A destructible shield: a grid of 2x2-pixel cells.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Shield {
    /// Top-left corner in pixels.
    pub x: i32,
    pub y: i32,
    /// Row-major cell mask; lasers knock cells out.
    pub cells: Vec<Vec<bool>>,
}

impl Shield {
    pub fn any_left(&self) -> bool {
        self.cells.iter().flatten().any(|&c| c)
    }
}

/// The bonus saucer crossing the top of the screen.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Ufo {
    pub x: i32,
}

/// The frame-to-frame mutable core of a Space Invaders game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StateCore {
    /// Where are random numbers drawn from?
    pub rand: GameRng,
    /// Lives remaining; negative when the game is over.
    pub lives: i32,
    /// Waiting for FIRE to respawn after being hit?
    pub is_dead: bool,
    /// Points earned so far.
    pub score: i32,
    /// Current level, 1-based.
    pub level: i32,
    pub ship: Ship,
    /// The player's shot; at most one in flight.
    pub ship_laser: Option<Laser>,
    /// Enemy return fire.
    pub enemy_lasers: Vec<Laser>,
    /// The formation, row-major from the top-left.
    pub enemies: Vec<Enemy>,
    /// Horizontal march direction, 1 or -1.
    pub march_dir: i32,
    /// Ticks until the formation moves again.
    pub march_timer: i32,
    /// Ticks until an enemy fires again.
    pub fire_timer: i32,
    pub shields: Vec<Shield>,
    pub ufo: Option<Ufo>,
    /// Ticks until the next UFO pass.
    pub ufo_timer: i32,
}

/// The current game config paired with the current frame state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct State {
    /// The config this game was dealt from.
    pub config: SpaceInvaders,
    /// The state of the immediately current frame.
    pub state: StateCore,
}
