use ac_core::Direction;
use ac_core::graphics::Color;
use ac_rng::GameRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Strongly-typed tile coordinate on the board lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TilePoint {
    pub tx: i32,
    pub ty: i32,
}

impl TilePoint {
    pub fn new(tx: i32, ty: i32) -> TilePoint {
        TilePoint { tx, ty }
    }

    pub fn step(&self, dir: Direction) -> TilePoint {
        let (dx, dy) = dir.delta();
        TilePoint::new(self.tx + dx, self.ty + dy)
    }

    pub fn manhattan(&self, other: &TilePoint) -> i32 {
        (self.tx - other.tx).abs() + (self.ty - other.ty).abs()
    }
}

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Tile {
    /// Not part of any path; treated like a wall.
    Empty,
    /// Walkable and not yet painted.
    Unpainted,
    /// Walkable and painted by the player.
    Painted,
}

impl Tile {
    pub fn walkable(self) -> bool {
        !matches!(self, Tile::Empty)
    }
}

/// An interior rectangle of the lattice; filling its whole perimeter
/// pays a bonus, and filling all four corner boxes triggers chase mode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GridBox {
    /// Top-left lattice tile of the box perimeter.
    pub top_left: TilePoint,
    /// Bottom-right lattice tile of the box perimeter.
    pub bottom_right: TilePoint,
    /// Cached: has the whole perimeter been painted?
    pub painted: bool,
    /// Is this one of the four chase-triggering corner boxes?
    pub triggers_chase: bool,
}

/// Movement policy for one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EnemyAI {
    /// Loops clockwise around the outer ring of the board.
    Perimeter,
    /// Continues straight, choosing a random legal direction at
    /// junctions (never reversing unless trapped).
    Random,
}

/// One enemy on the board.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Enemy {
    /// How this enemy decides where to go.
    pub ai: EnemyAI,
    /// Where it respawns after a reset or a catch.
    pub start: TilePoint,
    /// Current tile.
    pub position: TilePoint,
    /// Current heading; only the random policy consults it.
    pub dir: Direction,
}

/// Enemy spawn description in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnemySpawn {
    pub ai: EnemyAI,
    pub start: TilePoint,
    pub dir: Direction,
}

/// The lattice and everything painted onto it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Board {
    /// Tile states, row-major: `tiles[ty][tx]`.
    pub tiles: Vec<Vec<Tile>>,
    pub width: i32,
    pub height: i32,
    /// The interior boxes, derived from the lattice shape.
    pub boxes: Vec<GridBox>,
}

/// Configuration for an Amidar game; affects any new games generated
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Amidar {
    /// The random number generator that seeds new games.
    pub rand: GameRng,
    /// The board as a list of strings; `=` is a walkable tile.
    pub board: Vec<String>,
    /// Where the player starts on a new life.
    pub player_start: TilePoint,
    pub bg_color: Color,
    pub player_color: Color,
    pub unpainted_color: Color,
    pub painted_color: Color,
    pub enemy_color: Color,
    /// Fill color for the interior of completed boxes.
    pub inner_painted_color: Color,
    /// How many lives do new games start with?
    pub start_lives: i32,
    /// How many jumps do new games start with?
    pub start_jumps: i32,
    /// How long chase mode lasts, in ticks.
    pub chase_time: i32,
    /// Points for catching an enemy during chase mode.
    pub chase_score_bonus: i32,
    /// How long a jump's invulnerability lasts, in ticks.
    pub jump_time: i32,
    /// Points for filling in a box.
    pub box_bonus: i32,
    /// Enemy spawns for a new game.
    pub enemies: Vec<EnemySpawn>,
}

/// The frame-to-frame mutable core of an Amidar game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StateCore {
    /// Where are random numbers drawn from?
    pub rand: GameRng,
    /// Points earned so far.
    pub score: i32,
    /// Lives remaining; negative when the game is over.
    pub lives: i32,
    /// Current level, 1-based.
    pub level: i32,
    /// Jumps still available to the player.
    pub jumps: i32,
    /// Counts down while chase mode is active.
    pub chase_timer: i32,
    /// Counts down while jump invulnerability is active.
    pub jump_timer: i32,
    /// The player's tile.
    pub player: TilePoint,
    /// The enemies on the board.
    pub enemies: Vec<Enemy>,
    /// The current board.
    pub board: Board,
}

/// The current game config paired with the current frame state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct State {
    /// The config this game was dealt from.
    pub config: Amidar,
    /// The state of the immediately current frame.
    pub state: StateCore,
}
