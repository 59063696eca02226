//! Continuous 2-D vectors and point-mass bodies for the games that move
//! things by fractions of a pixel per tick.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A 2-D vector in screen space; y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub fn new(x: f64, y: f64) -> Vec2D {
        Vec2D { x, y }
    }

    pub fn origin() -> Vec2D {
        Vec2D::new(0.0, 0.0)
    }

    /// Build from polar form; the angle is measured in math orientation
    /// (callers flip y when they want graphics orientation).
    pub fn from_polar(radius: f64, angle_radians: f64) -> Vec2D {
        Vec2D::new(radius * angle_radians.cos(), radius * angle_radians.sin())
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn translate(&self, other: &Vec2D) -> Vec2D {
        Vec2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(&self, factor: f64) -> Vec2D {
        Vec2D::new(self.x * factor, self.y * factor)
    }
}

/// Position plus velocity; the unit of simple Euler integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Body2D {
    pub position: Vec2D,
    pub velocity: Vec2D,
}

impl Body2D {
    pub fn new_pos(x: f64, y: f64) -> Body2D {
        Body2D {
            position: Vec2D::new(x, y),
            velocity: Vec2D::origin(),
        }
    }

    pub fn new_detailed(x: f64, y: f64, dx: f64, dy: f64) -> Body2D {
        Body2D {
            position: Vec2D::new(x, y),
            velocity: Vec2D::new(dx, dy),
        }
    }

    /// Advance the position by `dt` ticks of the current velocity.
    pub fn integrate_mut(&mut self, dt: f64) {
        self.position = self.position.translate(&self.velocity.scale(dt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_round_trip() {
        let v = Vec2D::from_polar(5.0, 0.0);
        assert!((v.x - 5.0).abs() < 1e-9);
        assert!(v.y.abs() < 1e-9);
        assert!((v.magnitude() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut body = Body2D::new_detailed(1.0, 2.0, 3.0, -1.0);
        body.integrate_mut(2.0);
        assert_eq!(body.position, Vec2D::new(7.0, 0.0));
    }
}
