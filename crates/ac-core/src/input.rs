//! Player input: the structured button record and the numeric action
//! table, both normalizing to the same effect before game logic runs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// The state of a six-button controller for a single tick.
///
/// This is the fine-grained input surface; every action code decodes to
/// one of these before any game sees it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Input {
    /// Directional command: move left.
    pub left: bool,
    /// Directional command: move right.
    pub right: bool,
    /// Directional command: move up.
    pub up: bool,
    /// Directional command: move down.
    pub down: bool,
    /// FIRE / confirm in most games.
    pub button1: bool,
    /// Secondary action / cancel in most games.
    pub button2: bool,
}

impl Input {
    pub fn new() -> Input {
        Input::default()
    }

    /// Release every button.
    pub fn reset(&mut self) {
        *self = Input::default();
    }

    /// Net movement intent as (dx, dy), each in -1..=1; y grows downward.
    ///
    /// Opposite directions held together cancel to zero on that axis.
    pub fn axes(&self) -> (i32, i32) {
        let dx = (self.right as i32) - (self.left as i32);
        let dy = (self.down as i32) - (self.up as i32);
        (dx, dy)
    }

    /// True when no direction survives cancellation.
    pub fn is_stationary(&self) -> bool {
        self.axes() == (0, 0)
    }
}

/// The numeric action table.
///
/// Exactly these 18 codes exist: NOOP, FIRE, the eight directions, and
/// FIRE combined with the four cardinals and four diagonals. The table
/// is historical and irregular; it is not the 9x3 cross product and must
/// not be "completed" into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum AleAction {
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl AleAction {
    /// Decode a wire integer; `None` outside the 18-entry table.
    pub fn from_int(code: i32) -> Option<AleAction> {
        let action = match code {
            0 => AleAction::Noop,
            1 => AleAction::Fire,
            2 => AleAction::Up,
            3 => AleAction::Right,
            4 => AleAction::Left,
            5 => AleAction::Down,
            6 => AleAction::UpRight,
            7 => AleAction::UpLeft,
            8 => AleAction::DownRight,
            9 => AleAction::DownLeft,
            10 => AleAction::UpFire,
            11 => AleAction::RightFire,
            12 => AleAction::LeftFire,
            13 => AleAction::DownFire,
            14 => AleAction::UpRightFire,
            15 => AleAction::UpLeftFire,
            16 => AleAction::DownRightFire,
            17 => AleAction::DownLeftFire,
            _ => return None,
        };
        Some(action)
    }

    pub fn to_int(self) -> i32 {
        self as i32
    }

    /// Normalize the code into the structured button record.
    pub fn to_input(self) -> Input {
        let mut input = Input::new();
        match self {
            AleAction::Noop => {}
            AleAction::Fire => input.button1 = true,
            AleAction::Up => input.up = true,
            AleAction::Right => input.right = true,
            AleAction::Left => input.left = true,
            AleAction::Down => input.down = true,
            AleAction::UpRight => {
                input.up = true;
                input.right = true;
            }
            AleAction::UpLeft => {
                input.up = true;
                input.left = true;
            }
            AleAction::DownRight => {
                input.down = true;
                input.right = true;
            }
            AleAction::DownLeft => {
                input.down = true;
                input.left = true;
            }
            AleAction::UpFire => {
                input.up = true;
                input.button1 = true;
            }
            AleAction::RightFire => {
                input.right = true;
                input.button1 = true;
            }
            AleAction::LeftFire => {
                input.left = true;
                input.button1 = true;
            }
            AleAction::DownFire => {
                input.down = true;
                input.button1 = true;
            }
            AleAction::UpRightFire => {
                input.up = true;
                input.right = true;
                input.button1 = true;
            }
            AleAction::UpLeftFire => {
                input.up = true;
                input.left = true;
                input.button1 = true;
            }
            AleAction::DownRightFire => {
                input.down = true;
                input.right = true;
                input.button1 = true;
            }
            AleAction::DownLeftFire => {
                input.down = true;
                input.left = true;
                input.button1 = true;
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_table_has_exactly_18_codes() {
        assert_eq!(AleAction::iter().count(), 18);
        for (i, action) in AleAction::iter().enumerate() {
            assert_eq!(action.to_int(), i as i32);
            assert_eq!(AleAction::from_int(i as i32), Some(action));
        }
        assert_eq!(AleAction::from_int(-1), None);
        assert_eq!(AleAction::from_int(18), None);
    }

    #[test]
    fn test_diagonal_fire_codes_exist_but_table_is_irregular() {
        // The table carries fire-combinations for all eight directions
        // plus NOOP and FIRE; it is not the 9x3 cross product (27).
        let with_fire = AleAction::iter()
            .filter(|a| a.to_input().button1)
            .count();
        assert_eq!(with_fire, 9);
    }

    #[test]
    fn test_decode_normalizes_to_buttons() {
        let input = AleAction::DownLeftFire.to_input();
        assert!(input.down && input.left && input.button1);
        assert!(!input.up && !input.right && !input.button2);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let both = Input {
            left: true,
            right: true,
            up: true,
            down: true,
            ..Input::default()
        };
        assert_eq!(both.axes(), (0, 0));
        assert!(both.is_stationary());

        let left = Input {
            left: true,
            ..Input::default()
        };
        assert_eq!(left.axes(), (-1, 0));
    }
}
