use crate::types::*;
use ac_core::collision::Rect;
use ac_core::features::{boolf, fraction};
use ac_core::graphics::{Color, Drawable};
use ac_core::query::{self, KeywordFn, QueryError};
use ac_core::vec2d::{Body2D, Vec2D};
use ac_core::{AleAction, GameError, GameRng, Input};
use schemars::schema_for;
use serde_json::Value;

mod screen {
    pub const GAME_SIZE: (i32, i32) = (240, 160);
    pub const WALL_THICKNESS: i32 = 12;
    pub const BOARD_LEFT: i32 = WALL_THICKNESS;
    pub const BOARD_RIGHT: i32 = GAME_SIZE.0 - WALL_THICKNESS;
    pub const BOARD_TOP: i32 = WALL_THICKNESS;
    pub const BRICK_COLS: i32 = 18;
    pub const BRICK_ROWS: i32 = 6;
    pub const BRICK_WIDTH: i32 = (BOARD_RIGHT - BOARD_LEFT) / BRICK_COLS;
    pub const BRICK_HEIGHT: i32 = 4;
    pub const BRICKS_TOP: i32 = 28;
    pub const PADDLE_Y: i32 = 150;
    pub const PADDLE_HEIGHT: i32 = 3;
    pub const SERVE_Y: i32 = 80;
    pub const SCORE_XY: (i32, i32) = (60, 3);
    pub const LIVES_XY: (i32, i32) = (228, 3);
}

impl Default for Breakout {
    fn default() -> Self {
        Breakout {
            rand: GameRng::default(),
            bg_color: Color::black(),
            frame_color: Color::rgb(142, 142, 142),
            paddle_color: Color::rgb(200, 72, 72),
            ball_color: Color::white(),
            row_colors: vec![
                Color::rgb(200, 72, 72),
                Color::rgb(198, 108, 58),
                Color::rgb(180, 122, 48),
                Color::rgb(162, 162, 42),
                Color::rgb(72, 160, 72),
                Color::rgb(66, 72, 200),
            ],
            row_scores: vec![7, 7, 4, 4, 1, 1],
            start_lives: 5,
            paddle_width: 24.0,
            paddle_speed: 4.0,
            ball_speed_start: 2.0,
            ball_speed_step: 0.4,
            ball_radius: 2.0,
        }
    }
}

fn make_bricks(config: &Breakout) -> Vec<Brick> {
    let mut bricks = Vec::with_capacity((screen::BRICK_ROWS * screen::BRICK_COLS) as usize);
    for row in 0..screen::BRICK_ROWS {
        for col in 0..screen::BRICK_COLS {
            let idx = row as usize % config.row_scores.len().max(1);
            bricks.push(Brick {
                row,
                col,
                position: Vec2D::new(
                    (screen::BOARD_LEFT + col * screen::BRICK_WIDTH) as f64,
                    (screen::BRICKS_TOP + row * screen::BRICK_HEIGHT) as f64,
                ),
                size: Vec2D::new(screen::BRICK_WIDTH as f64, screen::BRICK_HEIGHT as f64),
                points: config.row_scores.get(idx).copied().unwrap_or(1),
                color: config
                    .row_colors
                    .get(idx)
                    .copied()
                    .unwrap_or_else(Color::white),
                alive: true,
            });
        }
    }
    bricks
}

impl StateCore {
    fn from_config(config: &Breakout, rand: GameRng) -> StateCore {
        StateCore {
            rand,
            lives: config.start_lives,
            is_dead: true,
            score: 0,
            level: 1,
            paddle: Body2D::new_pos(
                (screen::GAME_SIZE.0 / 2) as f64,
                screen::PADDLE_Y as f64,
            ),
            paddle_width: config.paddle_width,
            ball_radius: config.ball_radius,
            balls: Vec::new(),
            bricks: make_bricks(config),
        }
    }

    fn ball_speed(&self, config: &Breakout) -> f64 {
        config.ball_speed_start + config.ball_speed_step * (self.level - 1) as f64
    }

    /// Launch a fresh ball from a seed-dependent position.
    fn serve(&mut self, config: &Breakout) {
        let x = self
            .rand
            .range(screen::BOARD_LEFT + 16, screen::BOARD_RIGHT - 16) as f64;
        let speed = self.ball_speed(config);
        // 15..45 degrees off vertical, either side, heading down.
        let tilt = (15 + self.rand.below(31) as i32) as f64;
        let sign = if self.rand.one_in(2) { 1.0 } else { -1.0 };
        let angle = tilt.to_radians();
        self.balls.push(Body2D::new_detailed(
            x,
            screen::SERVE_Y as f64,
            speed * angle.sin() * sign,
            speed * angle.cos(),
        ));
        self.is_dead = false;
    }

    fn paddle_rect(&self) -> Rect {
        Rect::new(
            (self.paddle.position.x - self.paddle_width / 2.0) as i32,
            screen::PADDLE_Y,
            self.paddle_width as i32,
            screen::PADDLE_HEIGHT,
        )
    }

    fn bricks_remaining(&self) -> i32 {
        self.bricks.iter().filter(|b| b.alive).count() as i32
    }

    /// Column indices where every brick has been cleared.
    fn channels(&self) -> Vec<i32> {
        (0..screen::BRICK_COLS)
            .filter(|&col| self.bricks.iter().filter(|b| b.col == col).all(|b| !b.alive))
            .collect()
    }
}

fn ball_rect(ball: &Body2D, radius: f64) -> Rect {
    Rect::new(
        (ball.position.x - radius) as i32,
        (ball.position.y - radius) as i32,
        (radius * 2.0) as i32,
        (radius * 2.0) as i32,
    )
}

/// Reflect the ball off the paddle; exit angle depends on where along
/// the paddle the ball lands.
fn reflect_off_paddle(ball: &mut Body2D, paddle: &Rect) {
    let half = (paddle.w as f64) / 2.0;
    let offset = (ball.position.x - paddle.center_x() as f64) / half;
    let offset = offset.clamp(-1.0, 1.0);
    let speed = ball.velocity.magnitude();
    let angle = (offset * 60.0).to_radians();
    ball.velocity = Vec2D::new(speed * angle.sin(), -speed * angle.cos());
}

impl ac_core::Simulation for Breakout {
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
            serde_json::from_str(json).map_err(|e| GameError::bad_state("breakout", e))?;
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
        let config: Breakout =
            serde_json::from_str(json).map_err(|e| GameError::bad_config("breakout", e))?;
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
        serde_json::to_string(&schema_for!(Breakout)).expect("schema should be flawless")
    }
}

const QUERY_TABLE: &[(&str, KeywordFn<State>)] = &[
    ("bricks_remaining", |s, _| {
        Ok(Value::from(s.state.bricks_remaining()))
    }),
    ("count_channels", |s, _| {
        Ok(Value::from(s.state.channels().len()))
    }),
    ("channels", |s, _| Ok(Value::from(s.state.channels()))),
    ("brick_live_by_index", |s, args| {
        let index = query::index_arg(args)?;
        let brick = s
            .state
            .bricks
            .get(index)
            .ok_or(QueryError::IndexOutOfBounds {
                fragment: "brick_live_by_index".to_string(),
                index,
                len: s.state.bricks.len(),
            })?;
        Ok(Value::from(brick.alive))
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

        let (dx, _) = buttons.axes();
        let half = self.state.paddle_width / 2.0;
        self.state.paddle.position.x = (self.state.paddle.position.x
            + dx as f64 * self.config.paddle_speed)
            .clamp(screen::BOARD_LEFT as f64 + half, screen::BOARD_RIGHT as f64 - half);

        if self.state.is_dead {
            if buttons.button1 {
                let config = self.config.clone();
                self.state.serve(&config);
            }
            return;
        }

        let radius = self.state.ball_radius;
        let paddle = self.state.paddle_rect();
        let mut scored = 0;
        let mut survivors = Vec::with_capacity(self.state.balls.len());

        for mut ball in std::mem::take(&mut self.state.balls) {
            let prev_y = ball.position.y;
            ball.integrate_mut(1.0);

            // Walls.
            if ball.position.x - radius < screen::BOARD_LEFT as f64 && ball.velocity.x < 0.0 {
                ball.velocity.x = -ball.velocity.x;
            }
            if ball.position.x + radius > screen::BOARD_RIGHT as f64 && ball.velocity.x > 0.0 {
                ball.velocity.x = -ball.velocity.x;
            }
            if ball.position.y - radius < screen::BOARD_TOP as f64 && ball.velocity.y < 0.0 {
                ball.velocity.y = -ball.velocity.y;
            }

            // Paddle.
            if ball.velocity.y > 0.0 && ball_rect(&ball, radius).intersects(&paddle) {
                reflect_off_paddle(&mut ball, &paddle);
            }

            // Bricks: first hit wins this tick.
            let rect = ball_rect(&ball, radius);
            if let Some(brick) = self
                .state
                .bricks
                .iter_mut()
                .find(|b| b.alive && b.rect().intersects(&rect))
            {
                brick.alive = false;
                scored += brick.points;
                let brick_rect = brick.rect();
                let came_from_above = prev_y <= brick_rect.y as f64;
                let came_from_below = prev_y >= brick_rect.y2() as f64;
                if came_from_above || came_from_below {
                    ball.velocity.y = -ball.velocity.y;
                } else {
                    ball.velocity.x = -ball.velocity.x;
                }
            }

            // The floor eats the ball.
            if ball.position.y - radius < screen::GAME_SIZE.1 as f64 {
                survivors.push(ball);
            }
        }

        self.state.balls = survivors;
        self.state.score += scored;

        if self.state.balls.is_empty() && !self.state.is_dead {
            self.state.lives -= 1;
            self.state.is_dead = true;
        }

        if self.state.bricks_remaining() == 0 {
            self.state.level += 1;
            let config = self.config.clone();
            self.state.bricks = make_bricks(&config);
            self.state.balls.clear();
            self.state.is_dead = true;
        }
    }

    fn draw(&self) -> Vec<Drawable> {
        let mut output = Vec::new();
        output.push(Drawable::Clear(self.config.bg_color));

        // Side and top walls.
        output.push(Drawable::rect(
            self.config.frame_color,
            0,
            0,
            screen::GAME_SIZE.0,
            screen::WALL_THICKNESS,
        ));
        output.push(Drawable::rect(
            self.config.frame_color,
            0,
            0,
            screen::WALL_THICKNESS,
            screen::GAME_SIZE.1,
        ));
        output.push(Drawable::rect(
            self.config.frame_color,
            screen::BOARD_RIGHT,
            0,
            screen::WALL_THICKNESS,
            screen::GAME_SIZE.1,
        ));

        for brick in self.state.bricks.iter().filter(|b| b.alive) {
            let r = brick.rect();
            output.push(Drawable::rect(brick.color, r.x, r.y, r.w, r.h));
        }

        let paddle = self.state.paddle_rect();
        output.push(Drawable::rect(
            self.config.paddle_color,
            paddle.x,
            paddle.y,
            paddle.w,
            paddle.h,
        ));

        for ball in &self.state.balls {
            let r = ball_rect(ball, self.state.ball_radius);
            output.push(Drawable::rect(self.config.ball_color, r.x, r.y, r.w, r.h));
        }

        ac_core::font::draw_number(
            &mut output,
            screen::SCORE_XY.0,
            screen::SCORE_XY.1,
            self.config.ball_color,
            self.state.score,
        );
        ac_core::font::draw_number(
            &mut output,
            screen::LIVES_XY.0,
            screen::LIVES_XY.1,
            self.config.paddle_color,
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
        let (w, h) = (screen::GAME_SIZE.0 as f32, screen::GAME_SIZE.1 as f32);
        let ball = self.state.balls.first();
        vec![
            (
                "paddle_x".to_string(),
                fraction(self.state.paddle.position.x as f32, w),
            ),
            (
                "ball_x".to_string(),
                ball.map(|b| fraction(b.position.x as f32, w)).unwrap_or(-1.0),
            ),
            (
                "ball_y".to_string(),
                ball.map(|b| fraction(b.position.y as f32, h)).unwrap_or(-1.0),
            ),
            (
                "bricks_left".to_string(),
                fraction(
                    self.state.bricks_remaining() as f32,
                    self.state.bricks.len() as f32,
                ),
            ),
            ("serving".to_string(), boolf(self.state.is_dead)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::{Simulation, State as _};

    fn fresh(seed: u32) -> (Breakout, Box<dyn ac_core::State + Send>) {
        let mut config = Breakout::default();
        config.reset_seed(seed);
        let state = config.new_game();
        (config, state)
    }

    #[test]
    fn test_new_game_counters() {
        let (_, state) = fresh(42);
        assert_eq!(state.level(), 1);
        assert_eq!(state.score(), 0);
        assert_eq!(state.lives(), 5);
        assert!(state.is_dead());
        assert!(!state.game_over());
    }

    #[test]
    fn test_initial_brick_count_is_108() {
        let (_, state) = fresh(42);
        let count = state
            .query_json("bricks_remaining", &Value::Null)
            .unwrap();
        assert_eq!(count, Value::from(108));
        assert_eq!(
            state.query_json("count_channels", &Value::Null).unwrap(),
            Value::from(0)
        );
    }

    #[test]
    fn test_fire_serves_a_ball() {
        let (_, mut state) = fresh(42);
        let fire = AleAction::Fire.to_input();
        state.update_mut(fire);
        assert!(!state.is_dead());
        let ball_x = state
            .query_json(".state.balls[0].position.x", &Value::Null)
            .unwrap();
        assert!(ball_x.as_f64().is_some());
    }

    #[test]
    fn test_serve_position_depends_on_seed() {
        let fire = AleAction::Fire.to_input();
        let mut positions = Vec::new();
        for seed in 0..10 {
            let (_, mut state) = fresh(seed);
            state.update_mut(fire);
            let x = state
                .query_json(".state.balls[0].position.x", &Value::Null)
                .unwrap();
            positions.push(x.as_f64().unwrap());
        }
        let first = positions[0];
        assert!(positions.iter().any(|&x| (x - first).abs() > f64::EPSILON));
    }

    #[test]
    fn test_paddle_clamps_to_walls() {
        let (_, mut state) = fresh(1);
        let left = AleAction::Left.to_input();
        for _ in 0..200 {
            state.update_mut(left);
        }
        let x = state
            .query_json(".state.paddle.position.x", &Value::Null)
            .unwrap()
            .as_f64()
            .unwrap();
        assert!(x >= screen::BOARD_LEFT as f64);
    }

    #[test]
    fn test_brick_live_by_index_arg_handling() {
        let (_, state) = fresh(1);
        assert_eq!(
            state
                .query_json("brick_live_by_index", &Value::from(0))
                .unwrap(),
            Value::from(true)
        );
        assert!(matches!(
            state.query_json("brick_live_by_index", &Value::from("x")),
            Err(QueryError::BadInputArg(_))
        ));
        assert!(matches!(
            state.query_json("brick_live_by_index", &Value::from(10_000)),
            Err(QueryError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_losing_every_ball_ends_the_game() {
        // Shrink the paddle to nothing so every serve drains.
        let (config, _) = fresh(3);
        let mut doc: Value = serde_json::from_str(&config.to_json()).unwrap();
        doc["paddle_width"] = Value::from(0.0);
        let mut hostile = config.from_json(&doc.to_string()).unwrap();
        hostile.reset_seed(3);
        let mut state = hostile.new_game();

        let fire = AleAction::Fire.to_input();
        let noop = Input::new();
        let mut guard = 0;
        while !state.game_over() {
            state.update_mut(if state.is_dead() { fire } else { noop });
            guard += 1;
            assert!(guard < 100_000, "game never ended");
        }
        assert_eq!(state.lives(), -1);
        let score = state.score();
        let level = state.level();
        for _ in 0..10 {
            state.update_mut(fire);
        }
        assert_eq!(state.score(), score);
        assert_eq!(state.level(), level);
    }

    #[test]
    fn test_features_stay_in_range() {
        let (_, mut state) = fresh(9);
        let fire = AleAction::Fire.to_input();
        for _ in 0..50 {
            state.update_mut(fire);
            for (name, value) in state.handcrafted_features() {
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "feature {} out of range: {}",
                    name,
                    value
                );
            }
        }
    }
}
