use ac_core::graphics::Color;
use ac_core::vec2d::{Body2D, Vec2D};
use ac_rng::GameRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for a Breakout game; affects any new games generated
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Breakout {
    /// The random number generator that seeds new games.
    pub rand: GameRng,
    /// Background color.
    pub bg_color: Color,
    /// Color of the side and top walls.
    pub frame_color: Color,
    /// Paddle color.
    pub paddle_color: Color,
    /// Ball color.
    pub ball_color: Color,
    /// One color per brick row, top row first.
    pub row_colors: Vec<Color>,
    /// Points awarded per brick in each row, top row first.
    pub row_scores: Vec<i32>,
    /// How many lives do new games start with?
    pub start_lives: i32,
    /// Paddle width in pixels.
    pub paddle_width: f64,
    /// Paddle speed in pixels per tick.
    pub paddle_speed: f64,
    /// Ball speed on level 1, in pixels per tick.
    pub ball_speed_start: f64,
    /// Ball speed gained per completed level.
    pub ball_speed_step: f64,
    /// Ball radius in pixels.
    pub ball_radius: f64,
}

/// One brick in the wall.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Brick {
    /// Row index, 0 at the top of the wall.
    pub row: i32,
    /// Column index, 0 at the left.
    pub col: i32,
    /// Top-left corner in pixels.
    pub position: Vec2D,
    /// Width and height in pixels.
    pub size: Vec2D,
    /// Points this brick awards when destroyed.
    pub points: i32,
    /// Brick color.
    pub color: Color,
    /// Is the brick still standing?
    pub alive: bool,
}

impl Brick {
    pub fn rect(&self) -> ac_core::collision::Rect {
        ac_core::collision::Rect::new(
            self.position.x as i32,
            self.position.y as i32,
            self.size.x as i32,
            self.size.y as i32,
        )
    }
}

/// The frame-to-frame mutable core of a Breakout game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StateCore {
    /// Where are random numbers drawn from?
    pub rand: GameRng,
    /// Lives remaining; negative when the game is over.
    pub lives: i32,
    /// Waiting for FIRE to serve a new ball?
    pub is_dead: bool,
    /// Points earned so far.
    pub score: i32,
    /// Current level, 1-based.
    pub level: i32,
    /// The player's paddle; only its x ever changes.
    pub paddle: Body2D,
    /// Paddle width, copied from config so a state is self-contained.
    pub paddle_width: f64,
    /// Ball radius, likewise.
    pub ball_radius: f64,
    /// Balls in flight; empty while waiting to serve.
    pub balls: Vec<Body2D>,
    /// The brick wall, row-major from the top-left.
    pub bricks: Vec<Brick>,
}

/// The current game config paired with the current frame state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct State {
    /// The config this game was dealt from.
    pub config: Breakout,
    /// The state of the immediately current frame.
    pub state: StateCore,
}
