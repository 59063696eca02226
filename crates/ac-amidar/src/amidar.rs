use crate::types::*;
use ac_core::features::{boolf, fraction};
use ac_core::graphics::{Color, Drawable};
use ac_core::query::{self, KeywordFn, QueryError};
use ac_core::{AleAction, Direction, GameError, GameRng, Input};
use schemars::schema_for;
use serde_json::Value;

mod screen {
    pub const GAME_SIZE: (i32, i32) = (160, 250);
    pub const TILE_SIZE: i32 = 5;
    pub const BOARD_OFFSET: (i32, i32) = (2, 30);
    pub const SCORE_XY: (i32, i32) = (100, 8);
    pub const LIVES_XY: (i32, i32) = (140, 8);
    pub const JUMPS_XY: (i32, i32) = (40, 8);
}

/// The default lattice: 6 full-width rails joined by staggered rungs,
/// 356 walkable tiles in all.
const DEFAULT_BOARD: [&str; 31] = [
    "===============================",
    "=   =     =     =     =    =  =",
    "=   =     =     =     =    =  =",
    "=   =     =     =     =    =  =",
    "=   =     =     =     =    =  =",
    "=   =     =     =     =    =  =",
    "===============================",
    "= =     =      =     =      = =",
    "= =     =      =     =      = =",
    "= =     =      =     =      = =",
    "= =     =      =     =      = =",
    "= =     =      =     =      = =",
    "===============================",
    "=   =    =     =     =    =   =",
    "=   =    =     =     =    =   =",
    "=   =    =     =     =    =   =",
    "=   =    =     =     =    =   =",
    "=   =    =     =     =    =   =",
    "===============================",
    "=  =      =     =     =     = =",
    "=  =      =     =     =     = =",
    "=  =      =     =     =     = =",
    "=  =      =     =     =     = =",
    "=  =      =     =     =     = =",
    "===============================",
    "=      =      =     =     =   =",
    "=      =      =     =     =   =",
    "=      =      =     =     =   =",
    "=      =      =     =     =   =",
    "=      =      =     =     =   =",
    "===============================",
];

impl Default for Amidar {
    fn default() -> Self {
        Amidar {
            rand: GameRng::default(),
            board: DEFAULT_BOARD.iter().map(|row| row.to_string()).collect(),
            player_start: TilePoint::new(0, 30),
            bg_color: Color::black(),
            player_color: Color::rgb(254, 254, 254),
            unpainted_color: Color::rgb(120, 120, 176),
            painted_color: Color::rgb(254, 206, 22),
            enemy_color: Color::rgb(252, 84, 84),
            inner_painted_color: Color::rgb(66, 72, 200),
            start_lives: 3,
            start_jumps: 4,
            chase_time: 180,
            chase_score_bonus: 100,
            jump_time: 30,
            box_bonus: 50,
            enemies: vec![
                EnemySpawn {
                    ai: EnemyAI::Perimeter,
                    start: TilePoint::new(30, 0),
                    dir: Direction::Down,
                },
                EnemySpawn {
                    ai: EnemyAI::Random,
                    start: TilePoint::new(0, 12),
                    dir: Direction::Down,
                },
                EnemySpawn {
                    ai: EnemyAI::Random,
                    start: TilePoint::new(30, 18),
                    dir: Direction::Up,
                },
                EnemySpawn {
                    ai: EnemyAI::Random,
                    start: TilePoint::new(15, 30),
                    dir: Direction::Left,
                },
                EnemySpawn {
                    ai: EnemyAI::Random,
                    start: TilePoint::new(10, 0),
                    dir: Direction::Right,
                },
            ],
        }
    }
}

impl Board {
    /// Build a board from its ASCII template; `=` marks walkable tiles.
    pub fn from_ascii(rows: &[String]) -> Board {
        let tiles: Vec<Vec<Tile>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| if c == '=' { Tile::Unpainted } else { Tile::Empty })
                    .collect()
            })
            .collect();
        let height = tiles.len() as i32;
        let width = tiles.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
        let mut board = Board {
            tiles,
            width,
            height,
            boxes: Vec::new(),
        };
        for row in &mut board.tiles {
            row.resize(width as usize, Tile::Empty);
        }
        board.boxes = find_boxes(&board);
        board
    }

    pub fn tile(&self, point: &TilePoint) -> Tile {
        if point.tx < 0 || point.ty < 0 || point.tx >= self.width || point.ty >= self.height {
            return Tile::Empty;
        }
        self.tiles[point.ty as usize][point.tx as usize]
    }

    pub fn walkable(&self, point: &TilePoint) -> bool {
        self.tile(point).walkable()
    }

    pub fn unpainted_count(&self) -> i32 {
        self.tiles
            .iter()
            .flatten()
            .filter(|t| **t == Tile::Unpainted)
            .count() as i32
    }

    fn walkable_neighbors(&self, point: &TilePoint) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.walkable(&point.step(*d)))
            .collect()
    }

    /// All perimeter tiles of `gridbox` are painted.
    fn box_perimeter_painted(&self, gridbox: &GridBox) -> bool {
        let (x1, y1) = (gridbox.top_left.tx, gridbox.top_left.ty);
        let (x2, y2) = (gridbox.bottom_right.tx, gridbox.bottom_right.ty);
        let painted = |tx, ty| self.tile(&TilePoint::new(tx, ty)) == Tile::Painted;
        (x1..=x2).all(|x| painted(x, y1) && painted(x, y2))
            && (y1..=y2).all(|y| painted(x1, y) && painted(x2, y))
    }

    /// Repaint every painted tile for a fresh level.
    fn reset_paint(&mut self) {
        for row in &mut self.tiles {
            for tile in row.iter_mut() {
                if *tile == Tile::Painted {
                    *tile = Tile::Unpainted;
                }
            }
        }
        for gridbox in &mut self.boxes {
            gridbox.painted = false;
        }
    }
}

/// Derive the interior boxes from the lattice: rails are full-width
/// walkable rows, rungs are columns walkable across a whole gap, and
/// each pair of horizontally adjacent rungs closes one box. The first
/// and last box of the first and last gap trigger chase mode.
fn find_boxes(board: &Board) -> Vec<GridBox> {
    let rails: Vec<i32> = (0..board.height)
        .filter(|&y| (0..board.width).all(|x| board.walkable(&TilePoint::new(x, y))))
        .collect();

    let mut boxes = Vec::new();
    let gap_count = rails.len().saturating_sub(1);
    for (gap, pair) in rails.windows(2).enumerate() {
        let (top, bottom) = (pair[0], pair[1]);
        let rungs: Vec<i32> = (0..board.width)
            .filter(|&x| (top..=bottom).all(|y| board.walkable(&TilePoint::new(x, y))))
            .collect();
        let box_count = rungs.len().saturating_sub(1);
        for (i, rung_pair) in rungs.windows(2).enumerate() {
            let corner_gap = gap == 0 || gap == gap_count - 1;
            let corner_box = i == 0 || i == box_count - 1;
            boxes.push(GridBox {
                top_left: TilePoint::new(rung_pair[0], top),
                bottom_right: TilePoint::new(rung_pair[1], bottom),
                painted: false,
                triggers_chase: corner_gap && corner_box,
            });
        }
    }
    boxes
}

impl StateCore {
    fn from_config(config: &Amidar, rand: GameRng) -> StateCore {
        StateCore {
            rand,
            score: 0,
            lives: config.start_lives,
            level: 1,
            jumps: config.start_jumps,
            chase_timer: 0,
            jump_timer: 0,
            player: config.player_start,
            enemies: config
                .enemies
                .iter()
                .map(|spawn| Enemy {
                    ai: spawn.ai,
                    start: spawn.start,
                    position: spawn.start,
                    dir: spawn.dir,
                })
                .collect(),
            board: Board::from_ascii(&config.board),
        }
    }

    fn reset_positions(&mut self, config: &Amidar) {
        self.player = config.player_start;
        for (enemy, spawn) in self.enemies.iter_mut().zip(&config.enemies) {
            enemy.position = spawn.start;
            enemy.dir = spawn.dir;
        }
        self.chase_timer = 0;
        self.jump_timer = 0;
    }

    /// Paint the player's tile; returns points earned. Completing a box
    /// pays the bonus, and completing the last chase box starts a chase.
    fn paint_player_tile(&mut self, config: &Amidar) -> i32 {
        // tile() is bounds-safe; restored states can carry odd positions.
        if self.board.tile(&self.player) != Tile::Unpainted {
            return 0;
        }
        let (tx, ty) = (self.player.tx as usize, self.player.ty as usize);
        self.board.tiles[ty][tx] = Tile::Painted;
        let mut points = 1;

        let mut chase_box_completed = false;
        for i in 0..self.board.boxes.len() {
            if self.board.boxes[i].painted {
                continue;
            }
            if self.board.box_perimeter_painted(&self.board.boxes[i].clone()) {
                self.board.boxes[i].painted = true;
                points += config.box_bonus;
                chase_box_completed |= self.board.boxes[i].triggers_chase;
            }
        }
        if chase_box_completed
            && self
                .board
                .boxes
                .iter()
                .filter(|b| b.triggers_chase)
                .all(|b| b.painted)
        {
            self.chase_timer = config.chase_time;
        }
        points
    }

    /// Player/enemy contact resolution; returns true on player death.
    fn resolve_collisions(&mut self, config: &Amidar) -> bool {
        if self.jump_timer > 0 {
            return false;
        }
        if self.chase_timer > 0 {
            for i in 0..self.enemies.len() {
                if self.enemies[i].position == self.player {
                    self.score += config.chase_score_bonus;
                    self.enemies[i].position = self.enemies[i].start;
                    self.enemies[i].dir = config
                        .enemies
                        .get(i)
                        .map(|s| s.dir)
                        .unwrap_or(self.enemies[i].dir);
                }
            }
            return false;
        }
        if self.enemies.iter().any(|e| e.position == self.player) {
            self.lives -= 1;
            if self.lives >= 0 {
                self.reset_positions(config);
            }
            return true;
        }
        false
    }

    fn step_enemies(&mut self) {
        for i in 0..self.enemies.len() {
            let enemy = self.enemies[i].clone();
            let next = match enemy.ai {
                EnemyAI::Perimeter => {
                    let (w, h) = (self.board.width, self.board.height);
                    let p = enemy.position;
                    let dir = if p.ty == 0 && p.tx < w - 1 {
                        Direction::Right
                    } else if p.tx == w - 1 && p.ty < h - 1 {
                        Direction::Down
                    } else if p.ty == h - 1 && p.tx > 0 {
                        Direction::Left
                    } else {
                        Direction::Up
                    };
                    (p.step(dir), dir)
                }
                EnemyAI::Random => {
                    let forward = enemy.position.step(enemy.dir);
                    let options = self.board.walkable_neighbors(&enemy.position);
                    let at_junction = options.len() >= 3;
                    let dir = if at_junction || !self.board.walkable(&forward) {
                        let candidates: Vec<Direction> = options
                            .iter()
                            .copied()
                            .filter(|d| *d != enemy.dir.opposite())
                            .collect();
                        let pool = if candidates.is_empty() { &options } else { &candidates };
                        self.rand.choose(pool).copied().unwrap_or(enemy.dir)
                    } else {
                        enemy.dir
                    };
                    (enemy.position.step(dir), dir)
                }
            };
            if self.board.walkable(&next.0) {
                self.enemies[i].position = next.0;
            }
            self.enemies[i].dir = next.1;
        }
    }
}

impl ac_core::Simulation for Amidar {
    fn reset_seed(&mut self, seed: u32) {
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
            serde_json::from_str(json).map_err(|e| GameError::bad_state("amidar", e))?;
        Ok(Box::new(State {
            config: self.clone(),
            state,
        }))
    }

    fn game_size(&self) -> (i32, i32) {
        screen::GAME_SIZE
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("config serialization should be flawless")
    }

    fn from_json(&self, json: &str) -> Result<Box<dyn ac_core::Simulation + Send>, GameError> {
        let config: Amidar =
            serde_json::from_str(json).map_err(|e| GameError::bad_config("amidar", e))?;
        Ok(Box::new(config))
    }

    fn legal_action_set(&self) -> Vec<AleAction> {
        let mut actions = vec![
            AleAction::Noop,
            AleAction::Fire,
            AleAction::Up,
            AleAction::Right,
            AleAction::Left,
            AleAction::Down,
            AleAction::UpFire,
            AleAction::RightFire,
            AleAction::LeftFire,
            AleAction::DownFire,
        ];
        actions.sort();
        actions
    }

    fn schema_for_state(&self) -> String {
        serde_json::to_string(&schema_for!(StateCore)).expect("schema should be flawless")
    }

    fn schema_for_config(&self) -> String {
        serde_json::to_string(&schema_for!(Amidar)).expect("schema should be flawless")
    }
}

const QUERY_TABLE: &[(&str, KeywordFn<State>)] = &[
    ("num_tiles_unpainted", |s, _| {
        Ok(Value::from(s.state.board.unpainted_count()))
    }),
    ("jumps_remaining", |s, _| Ok(Value::from(s.state.jumps))),
    ("chase_mode", |s, _| Ok(Value::from(s.state.chase_timer > 0))),
    ("jump_mode", |s, _| Ok(Value::from(s.state.jump_timer > 0))),
    ("player_tile", |s, _| Ok(serde_json::to_value(s.state.player)?)),
    ("enemy_tiles", |s, _| {
        let tiles: Vec<TilePoint> = s.state.enemies.iter().map(|e| e.position).collect();
        Ok(serde_json::to_value(tiles)?)
    }),
    ("enemy_tile", |s, args| {
        let index = query::index_arg(args)?;
        let enemy = s
            .state
            .enemies
            .get(index)
            .ok_or(QueryError::IndexOutOfBounds {
                fragment: "enemy_tile".to_string(),
                index,
                len: s.state.enemies.len(),
            })?;
        Ok(serde_json::to_value(enemy.position)?)
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
        let config = self.config.clone();

        if self.state.chase_timer > 0 {
            self.state.chase_timer -= 1;
        }
        if self.state.jump_timer > 0 {
            self.state.jump_timer -= 1;
        }
        if buttons.button1 && self.state.jumps > 0 && self.state.jump_timer == 0 {
            self.state.jump_timer = config.jump_time;
            self.state.jumps -= 1;
        }

        // Horizontal intent wins over vertical when both are held.
        let (dx, dy) = buttons.axes();
        let horizontal = TilePoint::new(self.state.player.tx + dx, self.state.player.ty);
        let vertical = TilePoint::new(self.state.player.tx, self.state.player.ty + dy);
        if dx != 0 && self.state.board.walkable(&horizontal) {
            self.state.player = horizontal;
        } else if dy != 0 && self.state.board.walkable(&vertical) {
            self.state.player = vertical;
        }

        let points = self.state.paint_player_tile(&config);
        self.state.score += points;

        if self.state.resolve_collisions(&config) {
            return;
        }
        self.state.step_enemies();
        if self.state.resolve_collisions(&config) {
            return;
        }

        if self.state.board.unpainted_count() == 0 {
            self.state.level += 1;
            self.state.board.reset_paint();
            self.state.jumps = config.start_jumps;
            self.state.reset_positions(&config);
        }
    }

    fn draw(&self) -> Vec<Drawable> {
        let mut output = Vec::new();
        output.push(Drawable::Clear(self.config.bg_color));
        let (ox, oy) = screen::BOARD_OFFSET;
        let ts = screen::TILE_SIZE;
        let at = |t: &TilePoint| (ox + t.tx * ts, oy + t.ty * ts);

        // Completed boxes fill their interior first.
        for gridbox in self.state.board.boxes.iter().filter(|b| b.painted) {
            let (x1, y1) = at(&gridbox.top_left);
            let (x2, y2) = at(&gridbox.bottom_right);
            output.push(Drawable::rect(
                self.config.inner_painted_color,
                x1 + ts,
                y1 + ts,
                x2 - x1 - ts,
                y2 - y1 - ts,
            ));
        }

        for ty in 0..self.state.board.height {
            for tx in 0..self.state.board.width {
                let point = TilePoint::new(tx, ty);
                let color = match self.state.board.tile(&point) {
                    Tile::Empty => continue,
                    Tile::Unpainted => self.config.unpainted_color,
                    Tile::Painted => self.config.painted_color,
                };
                let (x, y) = at(&point);
                output.push(Drawable::rect(color, x, y, ts, ts));
            }
        }

        for enemy in &self.state.enemies {
            let (x, y) = at(&enemy.position);
            output.push(Drawable::rect(self.config.enemy_color, x, y, ts, ts));
        }
        let (px, py) = at(&self.state.player);
        output.push(Drawable::rect(self.config.player_color, px, py, ts, ts));

        ac_core::font::draw_number(
            &mut output,
            screen::SCORE_XY.0,
            screen::SCORE_XY.1,
            self.config.painted_color,
            self.state.score,
        );
        ac_core::font::draw_number(
            &mut output,
            screen::LIVES_XY.0,
            screen::LIVES_XY.1,
            self.config.player_color,
            self.state.lives.max(0),
        );
        ac_core::font::draw_number(
            &mut output,
            screen::JUMPS_XY.0,
            screen::JUMPS_XY.1,
            self.config.enemy_color,
            self.state.jumps,
        );

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
        let total = self
            .state
            .board
            .tiles
            .iter()
            .flatten()
            .filter(|t| t.walkable())
            .count() as f32;
        let unpainted = self.state.board.unpainted_count() as f32;
        let reach = (self.state.board.width + self.state.board.height) as f32;
        let nearest = self
            .state
            .enemies
            .iter()
            .map(|e| e.position.manhattan(&self.state.player))
            .min()
            .unwrap_or(0) as f32;
        vec![
            ("painted".to_string(), fraction(total - unpainted, total)),
            (
                "jumps_left".to_string(),
                fraction(self.state.jumps as f32, self.config.start_jumps.max(1) as f32),
            ),
            ("chasing".to_string(), boolf(self.state.chase_timer > 0)),
            ("jumping".to_string(), boolf(self.state.jump_timer > 0)),
            ("enemy_distance".to_string(), fraction(nearest, reach)),
        ]
    }
}
