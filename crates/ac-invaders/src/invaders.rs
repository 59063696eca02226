use crate::types::*;
use ac_core::collision::Rect;
use ac_core::features::{boolf, fraction};
use ac_core::graphics::{BitmapSprite, Color, Drawable};
use ac_core::query::{self, KeywordFn, QueryError};
use ac_core::{AleAction, GameError, GameRng, Input};
use schemars::schema_for;
use serde_json::Value;

mod screen {
    pub const GAME_SIZE: (i32, i32) = (160, 210);
    pub const SHIP_Y: i32 = 190;
    pub const SHIP_SIZE: (i32, i32) = (8, 4);
    pub const SHIP_SPEED: i32 = 2;
    pub const SHIP_BOUNDS: (i32, i32) = (8, 152);
    pub const ENEMY_SIZE: (i32, i32) = (8, 6);
    pub const ENEMY_ORIGIN: (i32, i32) = (20, 40);
    pub const ENEMY_SPACING: (i32, i32) = (16, 12);
    pub const MARCH_STEP: i32 = 2;
    pub const MARCH_BOUNDS: (i32, i32) = (8, 152);
    pub const DESCEND_STEP: i32 = 6;
    pub const SHIELD_Y: i32 = 170;
    pub const SHIELD_XS: [i32; 3] = [28, 74, 120];
    pub const SHIELD_CELL: i32 = 2;
    pub const PLAYER_LASER_SPEED: i32 = 4;
    pub const ENEMY_LASER_SPEED: i32 = 2;
    pub const LASER_SIZE: (i32, i32) = (1, 4);
    pub const UFO_Y: i32 = 24;
    pub const UFO_SIZE: (i32, i32) = (12, 6);
    pub const SCORE_XY: (i32, i32) = (60, 4);
    pub const LIVES_XY: (i32, i32) = (150, 4);
}

impl Default for SpaceInvaders {
    fn default() -> Self {
        SpaceInvaders {
            rand: GameRng::default(),
            bg_color: Color::black(),
            ship_color: Color::rgb(50, 132, 50),
            enemy_color: Color::rgb(236, 236, 236),
            laser_color: Color::rgb(144, 144, 144),
            shield_color: Color::rgb(50, 132, 50),
            ufo_color: Color::rgb(200, 72, 72),
            row_scores: vec![30, 20, 20, 10, 10, 10],
            start_lives: 3,
            enemy_rows: 6,
            enemy_cols: 6,
            shield_template: vec![
                ".XXXXXX.".to_string(),
                "XXXXXXXX".to_string(),
                "XXXXXXXX".to_string(),
                "XX....XX".to_string(),
            ],
            ufo_period: 600,
            ufo_points: 100,
        }
    }
}

fn make_enemies(config: &SpaceInvaders) -> Vec<Enemy> {
    let mut enemies = Vec::with_capacity((config.enemy_rows * config.enemy_cols) as usize);
    for row in 0..config.enemy_rows {
        for col in 0..config.enemy_cols {
            enemies.push(Enemy {
                row,
                col,
                x: screen::ENEMY_ORIGIN.0 + col * screen::ENEMY_SPACING.0,
                y: screen::ENEMY_ORIGIN.1 + row * screen::ENEMY_SPACING.1,
                alive: true,
                points: config.row_scores.get(row as usize).copied().unwrap_or(10),
            });
        }
    }
    enemies
}

fn make_shields(config: &SpaceInvaders) -> Vec<Shield> {
    screen::SHIELD_XS
        .iter()
        .map(|&x| Shield {
            x,
            y: screen::SHIELD_Y,
            cells: config
                .shield_template
                .iter()
                .map(|row| row.chars().map(|c| c == 'X').collect())
                .collect(),
        })
        .collect()
}

fn march_period(alive: usize) -> i32 {
    (alive as i32 / 2).max(4)
}

impl StateCore {
    fn from_config(config: &SpaceInvaders, rand: GameRng) -> StateCore {
        let enemies = make_enemies(config);
        let period = march_period(enemies.len());
        StateCore {
            rand,
            lives: config.start_lives,
            is_dead: false,
            score: 0,
            level: 1,
            ship: Ship { x: 70 },
            ship_laser: None,
            enemy_lasers: Vec::new(),
            enemies,
            march_dir: 1,
            march_timer: period,
            fire_timer: 60,
            shields: make_shields(config),
            ufo: None,
            ufo_timer: config.ufo_period,
        }
    }

    fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    fn shield_count(&self) -> i32 {
        self.shields.iter().filter(|s| s.any_left()).count() as i32
    }

    fn ship_rect(&self) -> Rect {
        Rect::new(
            self.ship.x,
            screen::SHIP_Y,
            screen::SHIP_SIZE.0,
            screen::SHIP_SIZE.1,
        )
    }

    /// Knock out the shield cell under the laser tip, if any.
    fn erode_shield(&mut self, laser: &Laser) -> bool {
        for shield in &mut self.shields {
            let cx = (laser.x - shield.x) / screen::SHIELD_CELL;
            let cy = (laser.y - shield.y) / screen::SHIELD_CELL;
            if cy < 0 || cx < 0 {
                continue;
            }
            let (cx, cy) = (cx as usize, cy as usize);
            if cy < shield.cells.len() && cx < shield.cells[cy].len() && shield.cells[cy][cx] {
                shield.cells[cy][cx] = false;
                return true;
            }
        }
        false
    }

    fn march(&mut self) {
        self.march_timer -= 1;
        if self.march_timer > 0 {
            return;
        }
        self.march_timer = march_period(self.alive_count());
        let step = screen::MARCH_STEP * self.march_dir;
        let blocked = self.enemies.iter().filter(|e| e.alive).any(|e| {
            let x = e.x + step;
            x < screen::MARCH_BOUNDS.0 || x + screen::ENEMY_SIZE.0 > screen::MARCH_BOUNDS.1
        });
        if blocked {
            self.march_dir = -self.march_dir;
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                enemy.y += screen::DESCEND_STEP;
            }
        } else {
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                enemy.x += step;
            }
        }
    }

    /// Return fire from a random bottom-most living enemy.
    fn enemy_fire(&mut self) {
        self.fire_timer -= 1;
        if self.fire_timer > 0 {
            return;
        }
        self.fire_timer = 40 + self.rand.below(40) as i32;
        let mut shooters: Vec<(i32, i32, i32)> = Vec::new();
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            match shooters.iter_mut().find(|(col, _, _)| *col == enemy.col) {
                Some(slot) => {
                    if enemy.y > slot.2 {
                        *slot = (enemy.col, enemy.x, enemy.y);
                    }
                }
                None => shooters.push((enemy.col, enemy.x, enemy.y)),
            }
        }
        if let Some(&(_, x, y)) = self.rand.choose(&shooters) {
            self.enemy_lasers.push(Laser {
                x: x + screen::ENEMY_SIZE.0 / 2,
                y: y + screen::ENEMY_SIZE.1,
                dy: screen::ENEMY_LASER_SPEED,
            });
        }
    }
}

impl ac_core::Simulation for SpaceInvaders {
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
            serde_json::from_str(json).map_err(|e| GameError::bad_state("space_invaders", e))?;
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
        let config: SpaceInvaders =
            serde_json::from_str(json).map_err(|e| GameError::bad_config("space_invaders", e))?;
        Ok(Box::new(config))
    }

    fn legal_action_set(&self) -> Vec<AleAction> {
        let mut actions = vec![
            AleAction::Noop,
            AleAction::Fire,
            AleAction::Right,
            AleAction::Left,
            AleAction::RightFire,
            AleAction::LeftFire,
        ];
        actions.sort();
        actions
    }

    fn schema_for_state(&self) -> String {
        serde_json::to_string(&schema_for!(StateCore)).expect("schema should be flawless")
    }

    fn schema_for_config(&self) -> String {
        serde_json::to_string(&schema_for!(SpaceInvaders)).expect("schema should be flawless")
    }
}

const QUERY_TABLE: &[(&str, KeywordFn<State>)] = &[
    ("shield_count", |s, _| Ok(Value::from(s.state.shield_count()))),
    ("ship_x", |s, _| Ok(Value::from(s.state.ship.x))),
    ("enemy_count", |s, _| {
        Ok(Value::from(s.state.alive_count()))
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
        self.state.is_dead
    }

    fn update_mut(&mut self, buttons: Input) {
        if self.state.lives < 0 {
            return;
        }

        if self.state.is_dead {
            if buttons.button1 {
                self.state.is_dead = false;
                self.state.enemy_lasers.clear();
                self.state.ship_laser = None;
            }
            return;
        }

        // Ship movement and firing.
        let (dx, _) = buttons.axes();
        self.state.ship.x = (self.state.ship.x + dx * screen::SHIP_SPEED).clamp(
            screen::SHIP_BOUNDS.0,
            screen::SHIP_BOUNDS.1 - screen::SHIP_SIZE.0,
        );
        if buttons.button1 && self.state.ship_laser.is_none() {
            self.state.ship_laser = Some(Laser {
                x: self.state.ship.x + screen::SHIP_SIZE.0 / 2,
                y: screen::SHIP_Y,
                dy: -screen::PLAYER_LASER_SPEED,
            });
        }

        self.state.march();
        self.state.enemy_fire();

        // Player laser flight and hits.
        if let Some(mut laser) = self.state.ship_laser.take() {
            laser.y += laser.dy;
            let tip = Rect::new(laser.x, laser.y, screen::LASER_SIZE.0, screen::LASER_SIZE.1);
            let mut spent = laser.y < 0 || self.state.erode_shield(&laser);
            if !spent {
                if let Some(enemy) = self.state.enemies.iter_mut().find(|e| {
                    e.alive
                        && tip.intersects(&Rect::new(
                            e.x,
                            e.y,
                            screen::ENEMY_SIZE.0,
                            screen::ENEMY_SIZE.1,
                        ))
                }) {
                    enemy.alive = false;
                    self.state.score += enemy.points;
                    spent = true;
                }
            }
            if !spent {
                if let Some(ufo) = &self.state.ufo {
                    let ufo_rect = Rect::new(
                        ufo.x,
                        screen::UFO_Y,
                        screen::UFO_SIZE.0,
                        screen::UFO_SIZE.1,
                    );
                    if tip.intersects(&ufo_rect) {
                        self.state.score += self.config.ufo_points;
                        self.state.ufo = None;
                        spent = true;
                    }
                }
            }
            if !spent {
                self.state.ship_laser = Some(laser);
            }
        }

        // Enemy laser flight and hits.
        let ship = self.state.ship_rect();
        let mut hit_ship = false;
        let mut surviving = Vec::with_capacity(self.state.enemy_lasers.len());
        for mut laser in std::mem::take(&mut self.state.enemy_lasers) {
            laser.y += laser.dy;
            if laser.y > screen::GAME_SIZE.1 {
                continue;
            }
            if self.state.erode_shield(&laser) {
                continue;
            }
            let tip = Rect::new(laser.x, laser.y, screen::LASER_SIZE.0, screen::LASER_SIZE.1);
            if tip.intersects(&ship) {
                hit_ship = true;
                continue;
            }
            surviving.push(laser);
        }
        self.state.enemy_lasers = surviving;

        if hit_ship {
            self.state.lives -= 1;
            self.state.is_dead = true;
            return;
        }

        // UFO pass.
        match &mut self.state.ufo {
            Some(ufo) => {
                ufo.x += 1;
                if ufo.x > screen::GAME_SIZE.0 {
                    self.state.ufo = None;
                    self.state.ufo_timer = self.config.ufo_period;
                }
            }
            None => {
                self.state.ufo_timer -= 1;
                if self.state.ufo_timer <= 0 {
                    self.state.ufo = Some(Ufo {
                        x: -screen::UFO_SIZE.0,
                    });
                }
            }
        }

        // The formation reaching the shields ends the game outright.
        if self
            .state
            .enemies
            .iter()
            .filter(|e| e.alive)
            .any(|e| e.y + screen::ENEMY_SIZE.1 >= screen::SHIELD_Y)
        {
            self.state.lives = -1;
            return;
        }

        if self.state.alive_count() == 0 {
            self.state.level += 1;
            let config = self.config.clone();
            self.state.enemies = make_enemies(&config);
            self.state.march_dir = 1;
            self.state.march_timer = march_period(self.state.enemies.len());
            self.state.enemy_lasers.clear();
            self.state.ship_laser = None;
        }
    }

    fn draw(&self) -> Vec<Drawable> {
        let mut output = Vec::new();
        output.push(Drawable::Clear(self.config.bg_color));

        for enemy in self.state.enemies.iter().filter(|e| e.alive) {
            output.push(Drawable::rect(
                self.config.enemy_color,
                enemy.x,
                enemy.y,
                screen::ENEMY_SIZE.0,
                screen::ENEMY_SIZE.1,
            ));
        }

        for shield in &self.state.shields {
            output.push(Drawable::sprite(
                shield.x,
                shield.y,
                self.config.shield_color,
                BitmapSprite {
                    rows: shield.cells.clone(),
                }
                .scaled(screen::SHIELD_CELL as usize),
            ));
        }

        if let Some(ufo) = &self.state.ufo {
            output.push(Drawable::rect(
                self.config.ufo_color,
                ufo.x,
                screen::UFO_Y,
                screen::UFO_SIZE.0,
                screen::UFO_SIZE.1,
            ));
        }

        if !self.state.is_dead {
            let ship = self.state.ship_rect();
            output.push(Drawable::rect(
                self.config.ship_color,
                ship.x,
                ship.y,
                ship.w,
                ship.h,
            ));
        }

        for laser in self
            .state
            .ship_laser
            .iter()
            .chain(self.state.enemy_lasers.iter())
        {
            output.push(Drawable::rect(
                self.config.laser_color,
                laser.x,
                laser.y,
                screen::LASER_SIZE.0,
                screen::LASER_SIZE.1,
            ));
        }

        ac_core::font::draw_number(
            &mut output,
            screen::SCORE_XY.0,
            screen::SCORE_XY.1,
            self.config.enemy_color,
            self.state.score,
        );
        ac_core::font::draw_number(
            &mut output,
            screen::LIVES_XY.0,
            screen::LIVES_XY.1,
            self.config.ship_color,
            self.state.lives.max(0),
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
        let w = screen::GAME_SIZE.0 as f32;
        let total = self.state.enemies.len().max(1) as f32;
        let shield_cells: usize = self
            .state
            .shields
            .iter()
            .flat_map(|s| s.cells.iter())
            .flatten()
            .filter(|&&c| c)
            .count();
        let shield_total: usize = self
            .state
            .shields
            .iter()
            .map(|s| s.cells.iter().map(|r| r.len()).sum::<usize>())
            .sum();
        vec![
            ("ship_x".to_string(), fraction(self.state.ship.x as f32, w)),
            (
                "enemies_left".to_string(),
                fraction(self.state.alive_count() as f32, total),
            ),
            (
                "shields_left".to_string(),
                fraction(shield_cells as f32, shield_total.max(1) as f32),
            ),
            ("shot_in_flight".to_string(), boolf(self.state.ship_laser.is_some())),
            ("respawning".to_string(), boolf(self.state.is_dead)),
        ]
    }
}
