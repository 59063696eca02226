use crate::types::*;
use ac_core::features::{boolf, fraction};
use ac_core::graphics::{Color, Drawable};
use ac_core::query::{self, KeywordFn, QueryError};
use ac_core::{AleAction, GameError, GameRng, Input};
use schemars::schema_for;
use serde_json::Value;

const TILE_SIZE: i32 = 16;

const DEFAULT_GRID: [&str; 10] = [
    "1111111111",
    "1A00000001",
    "1011110101",
    "10000R0101",
    "1011010001",
    "1R11011011",
    "1000010001",
    "1011X10110",
    "100001000G",
    "1111111111",
];

impl Default for GridWorld {
    fn default() -> Self {
        GridWorld {
            rand: GameRng::default(),
            grid: DEFAULT_GRID.iter().map(|row| row.to_string()).collect(),
            reward_value: 10,
            start_lives: 0,
            bg_color: Color::black(),
            wall_color: Color::rgb(72, 72, 72),
            player_color: Color::rgb(252, 252, 84),
            reward_color: Color::rgb(84, 252, 84),
            goal_color: Color::rgb(84, 84, 252),
            hazard_color: Color::rgb(252, 84, 84),
        }
    }
}

/// Locate the `A` marker; (1, 1) when the grid does not carry one.
fn find_start(grid: &[String]) -> (i32, i32) {
    for (y, row) in grid.iter().enumerate() {
        if let Some(x) = row.chars().position(|c| c == 'A') {
            return (x as i32, y as i32);
        }
    }
    (1, 1)
}

fn parse_tiles(grid: &[String]) -> Vec<Vec<GridTile>> {
    let width = grid.iter().map(|row| row.len()).max().unwrap_or(0);
    grid.iter()
        .map(|row| {
            let mut tiles: Vec<GridTile> = row.chars().map(GridTile::from_char).collect();
            tiles.resize(width, GridTile::Wall);
            tiles
        })
        .collect()
}

impl StateCore {
    fn from_config(config: &GridWorld, rand: GameRng) -> StateCore {
        let (player_x, player_y) = find_start(&config.grid);
        StateCore {
            rand,
            score: 0,
            lives: config.start_lives,
            level: 1,
            player_x,
            player_y,
            tiles: parse_tiles(&config.grid),
        }
    }

    fn tile(&self, x: i32, y: i32) -> GridTile {
        if y < 0 || x < 0 {
            return GridTile::Wall;
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(GridTile::Wall)
    }

    fn rewards_remaining(&self) -> i32 {
        self.tiles
            .iter()
            .flatten()
            .filter(|t| **t == GridTile::Reward)
            .count() as i32
    }

    /// Restore the maze and player for a new life or level.
    fn reset_board(&mut self, config: &GridWorld) {
        let (x, y) = find_start(&config.grid);
        self.player_x = x;
        self.player_y = y;
        self.tiles = parse_tiles(&config.grid);
    }
}

impl ac_core::Simulation for GridWorld {
    fn reset_seed(&mut self, seed: u32) {
        // GridWorld is fully deterministic, but the seed still flows
        // into the state so saves stay uniform across games.
        self.rand = GameRng::new(seed);
    }

    fn new_game(&mut self) -> Box<dyn ac_core::State + Send> {
        let state_seed = self.rand.next_word();
        Box::new(State {
            config: self.clone(),
            state: StateCore::from_config(self, GameRng::from_u64(state_seed)),
        })
    }

    fn new_state_from_json(&self, json: &str) -> Result<Box<dyn ac_core::State + Send>, GameError> {
        let state: StateCore =
            serde_json::from_str(json).map_err(|e| GameError::bad_state("gridworld", e))?;
        Ok(Box::new(State {
            config: self.clone(),
            state,
        }))
    }

    fn game_size(&self) -> (i32, i32) {
        let height = self.grid.len() as i32;
        let width = self.grid.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        (width * TILE_SIZE, height * TILE_SIZE)
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("config serialization should be flawless")
    }

    fn from_json(&self, json: &str) -> Result<Box<dyn ac_core::Simulation + Send>, GameError> {
        let config: GridWorld =
            serde_json::from_str(json).map_err(|e| GameError::bad_config("gridworld", e))?;
        Ok(Box::new(config))
    }

    fn legal_action_set(&self) -> Vec<AleAction> {
        let mut actions = vec![
            AleAction::Noop,
            AleAction::Up,
            AleAction::Right,
            AleAction::Left,
            AleAction::Down,
        ];
        actions.sort();
        actions
    }

    fn schema_for_state(&self) -> String {
        serde_json::to_string(&schema_for!(StateCore)).expect("schema should be flawless")
    }

    fn schema_for_config(&self) -> String {
        serde_json::to_string(&schema_for!(GridWorld)).expect("schema should be flawless")
    }
}

const QUERY_TABLE: &[(&str, KeywordFn<State>)] = &[
    ("player_position", |s, _| {
        Ok(serde_json::json!({ "x": s.state.player_x, "y": s.state.player_y }))
    }),
    ("rewards_remaining", |s, _| {
        Ok(Value::from(s.state.rewards_remaining()))
    }),
];

impl ac_core::State for State {
    fn lives(&self) -> i32 {
        self.state.lives
    }

    fn score(&self) -> i32 {
        self.state.score
    }

    fn level(&self) -> i32 {
        self.state.level
    }

    fn is_dead(&self) -> bool {
        false
    }

    fn update_mut(&mut self, buttons: Input) {
        if self.state.lives < 0 {
            return;
        }

        // Cardinal movement only; horizontal intent wins when both axes
        // are held.
        let (dx, dy) = buttons.axes();
        let (nx, ny) = if dx != 0 {
            (self.state.player_x + dx, self.state.player_y)
        } else {
            (self.state.player_x, self.state.player_y + dy)
        };
        if !self.state.tile(nx, ny).walkable() {
            return;
        }
        self.state.player_x = nx;
        self.state.player_y = ny;

        match self.state.tile(nx, ny) {
            GridTile::Reward => {
                self.state.score += self.config.reward_value;
                self.state.tiles[ny as usize][nx as usize] = GridTile::Floor;
            }
            GridTile::Goal => {
                self.state.level += 1;
                let config = self.config.clone();
                self.state.reset_board(&config);
            }
            GridTile::Hazard => {
                self.state.lives -= 1;
                if self.state.lives >= 0 {
                    let config = self.config.clone();
                    self.state.reset_board(&config);
                }
            }
            GridTile::Floor | GridTile::Wall => {}
        }
    }

    fn draw(&self) -> Vec<Drawable> {
        let mut output = Vec::new();
        output.push(Drawable::Clear(self.config.bg_color));
        for (y, row) in self.state.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let color = match tile {
                    GridTile::Wall => self.config.wall_color,
                    GridTile::Floor => continue,
                    GridTile::Reward => self.config.reward_color,
                    GridTile::Goal => self.config.goal_color,
                    GridTile::Hazard => self.config.hazard_color,
                };
                output.push(Drawable::rect(
                    color,
                    x as i32 * TILE_SIZE,
                    y as i32 * TILE_SIZE,
                    TILE_SIZE,
                    TILE_SIZE,
                ));
            }
        }
        output.push(Drawable::rect(
            self.config.player_color,
            self.state.player_x * TILE_SIZE + 2,
            self.state.player_y * TILE_SIZE + 2,
            TILE_SIZE - 4,
            TILE_SIZE - 4,
        ));
        output
    }

    fn to_json(&self) -> String {
        serde_json::to_string(&self.state).expect("state serialization should be flawless")
    }

    fn copy(&self) -> Box<dyn ac_core::State + Send> {
        Box::new(self.clone())
    }

    fn query_json(&self, query: &str, args: &Value) -> Result<Value, QueryError> {
        query::run_query(self, QUERY_TABLE, query, args)
    }

    fn handcrafted_features(&self) -> Vec<(String, f32)> {
        let width = self.state.tiles.first().map(|r| r.len()).unwrap_or(1) as f32;
        let height = self.state.tiles.len().max(1) as f32;
        vec![
            (
                "player_x".to_string(),
                fraction(self.state.player_x as f32, width),
            ),
            (
                "player_y".to_string(),
                fraction(self.state.player_y as f32, height),
            ),
            (
                "rewards_left".to_string(),
                fraction(
                    self.state.rewards_remaining() as f32,
                    self.config
                        .grid
                        .iter()
                        .flat_map(|row| row.chars())
                        .filter(|&c| c == 'R')
                        .count()
                        .max(1) as f32,
                ),
            ),
            ("alive".to_string(), boolf(self.state.lives >= 0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::{Simulation, State as _};

    fn fresh() -> Box<dyn ac_core::State + Send> {
        GridWorld::default().new_game()
    }

    #[test]
    fn test_new_game_and_queries() {
        let state = fresh();
        assert_eq!(state.level(), 1);
        assert_eq!(state.score(), 0);
        assert_eq!(
            state.query_json("player_position", &Value::Null).unwrap(),
            serde_json::json!({ "x": 1, "y": 1 })
        );
        assert_eq!(
            state.query_json("rewards_remaining", &Value::Null).unwrap(),
            Value::from(2)
        );
    }

    #[test]
    fn test_walls_block_movement() {
        let mut state = fresh();
        state.update_mut(AleAction::Up.to_input());
        assert_eq!(
            state.query_json("player_position", &Value::Null).unwrap(),
            serde_json::json!({ "x": 1, "y": 1 })
        );
        state.update_mut(AleAction::Right.to_input());
        assert_eq!(
            state.query_json("player_position", &Value::Null).unwrap(),
            serde_json::json!({ "x": 2, "y": 1 })
        );
    }

    #[test]
    fn test_reward_collects_once() {
        let mut config = GridWorld {
            grid: vec!["11111".into(), "1AR01".into(), "11111".into()],
            ..GridWorld::default()
        };
        let mut state = config.new_game();
        state.update_mut(AleAction::Right.to_input());
        assert_eq!(state.score(), 10);
        state.update_mut(AleAction::Right.to_input());
        state.update_mut(AleAction::Left.to_input());
        assert_eq!(state.score(), 10);
        assert_eq!(
            state.query_json("rewards_remaining", &Value::Null).unwrap(),
            Value::from(0)
        );
    }

    #[test]
    fn test_goal_advances_level_and_restores_board() {
        let mut config = GridWorld {
            grid: vec!["11111".into(), "1ARG1".into(), "11111".into()],
            ..GridWorld::default()
        };
        let mut state = config.new_game();
        state.update_mut(AleAction::Right.to_input());
        state.update_mut(AleAction::Right.to_input());
        assert_eq!(state.level(), 2);
        assert_eq!(state.score(), 10);
        // Board restored: reward is back, player at start.
        assert_eq!(
            state.query_json("rewards_remaining", &Value::Null).unwrap(),
            Value::from(1)
        );
        assert_eq!(
            state.query_json("player_position", &Value::Null).unwrap(),
            serde_json::json!({ "x": 1, "y": 1 })
        );
    }

    #[test]
    fn test_hazard_ends_the_game_and_freezes() {
        let mut config = GridWorld {
            grid: vec!["11111".into(), "1AX01".into(), "11111".into()],
            ..GridWorld::default()
        };
        let mut state = config.new_game();
        state.update_mut(AleAction::Right.to_input());
        assert!(state.game_over());
        let score = state.score();
        let level = state.level();
        state.update_mut(AleAction::Right.to_input());
        assert_eq!(state.score(), score);
        assert_eq!(state.level(), level);
        assert_eq!(
            state.query_json("player_position", &Value::Null).unwrap(),
            serde_json::json!({ "x": 2, "y": 1 })
        );
    }

    #[test]
    fn test_game_size_follows_the_grid() {
        let config = GridWorld::default();
        assert_eq!(config.game_size(), (160, 160));
    }
}
