//! Built-in 3x5 digit font for drawing scores into the frame.

use crate::graphics::{BitmapSprite, Color, Drawable};

const DIGIT_ART: [&str; 10] = [
    "XXX\nX.X\nX.X\nX.X\nXXX",
    ".X.\nXX.\n.X.\n.X.\nXXX",
    "XXX\n..X\nXXX\nX..\nXXX",
    "XXX\n..X\nXXX\n..X\nXXX",
    "X.X\nX.X\nXXX\n..X\n..X",
    "XXX\nX..\nXXX\n..X\nXXX",
    "XXX\nX..\nXXX\nX.X\nXXX",
    "XXX\n..X\n..X\n..X\n..X",
    "XXX\nX.X\nXXX\nX.X\nXXX",
    "XXX\nX.X\nXXX\n..X\nXXX",
];

/// Unscaled glyph width in pixels.
pub const DIGIT_WIDTH: i32 = 3;
/// Unscaled glyph height in pixels.
pub const DIGIT_HEIGHT: i32 = 5;
/// Horizontal advance between adjacent glyphs.
pub const DIGIT_PITCH: i32 = DIGIT_WIDTH + 1;

/// Sprite for a single decimal digit.
pub fn digit_sprite(digit: u8) -> BitmapSprite {
    BitmapSprite::from_ascii(DIGIT_ART[(digit % 10) as usize], 'X')
}

/// Append drawables for `value`, right-aligned so the last digit ends
/// at `x`. Negative values are clamped to zero; scores never go there.
pub fn draw_number(output: &mut Vec<Drawable>, x: i32, y: i32, color: Color, value: i32) {
    let display = format!("{}", value.max(0));
    for (i, ch) in display.chars().rev().enumerate() {
        let digit = ch as u8 - b'0';
        let gx = x - DIGIT_PITCH * (i as i32 + 1);
        output.push(Drawable::sprite(gx, y, color, digit_sprite(digit)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_digit_is_well_formed() {
        for d in 0..10 {
            let sprite = digit_sprite(d);
            assert_eq!(sprite.width(), DIGIT_WIDTH);
            assert_eq!(sprite.height(), DIGIT_HEIGHT);
        }
    }

    #[test]
    fn test_draw_number_emits_one_sprite_per_digit() {
        let mut out = Vec::new();
        draw_number(&mut out, 100, 0, Color::white(), 207);
        assert_eq!(out.len(), 3);
    }
}
