//! Axis-aligned rectangle intersection, the only collision primitive
//! the games need.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn x2(&self) -> i32 {
        self.x + self.w
    }

    pub fn y2(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    pub fn contains_xy(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x2() && y >= self.y && y < self.y2()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x2() && other.x < self.x2() && self.y < other.y2() && other.y < self.y2()
    }
}
