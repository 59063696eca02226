use ac_core::graphics::Color;
use ac_rng::GameRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One cell of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GridTile {
    Wall,
    Floor,
    /// Collectible; becomes floor once taken.
    Reward,
    /// Advances the level when reached.
    Goal,
    /// Costs a life when stepped on.
    Hazard,
}

impl GridTile {
    pub fn from_char(c: char) -> GridTile {
        match c {
            '1' => GridTile::Wall,
            'R' => GridTile::Reward,
            'G' => GridTile::Goal,
            'X' => GridTile::Hazard,
            // '0', 'A', and anything unrecognized are open floor.
            _ => GridTile::Floor,
        }
    }

    pub fn walkable(self) -> bool {
        !matches!(self, GridTile::Wall)
    }
}

/// Configuration for a GridWorld game; affects any new games generated
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GridWorld {
    /// The random number generator that seeds new games. GridWorld
    /// itself draws nothing from it; the field keeps save files uniform
    /// across games.
    pub rand: GameRng,
    /// The maze as a list of strings: `1` wall, `0` floor, `A` player
    /// start, `R` reward, `G` goal, `X` hazard.
    pub grid: Vec<String>,
    /// Points for collecting one reward.
    pub reward_value: i32,
    /// How many lives do new games start with?
    pub start_lives: i32,
    pub bg_color: Color,
    pub wall_color: Color,
    pub player_color: Color,
    pub reward_color: Color,
    pub goal_color: Color,
    pub hazard_color: Color,
}

/// The frame-to-frame mutable core of a GridWorld game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StateCore {
    /// Carried for save-file uniformity; never consulted.
    pub rand: GameRng,
    /// Points earned so far.
    pub score: i32,
    /// Lives remaining; negative when the game is over.
    pub lives: i32,
    /// Current level, 1-based.
    pub level: i32,
    /// Player tile coordinates.
    pub player_x: i32,
    pub player_y: i32,
    /// Current maze contents, row-major.
    pub tiles: Vec<Vec<GridTile>>,
}

/// The current game config paired with the current frame state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct State {
    /// The config this game was dealt from.
    pub config: GridWorld,
    /// The state of the immediately current frame.
    pub state: StateCore,
}
