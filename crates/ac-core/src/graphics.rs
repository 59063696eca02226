//! Display lists and software rasterization.
//!
//! Every frame state can describe itself as a `Vec<Drawable>`; the two
//! buffer types turn that list into flat byte buffers -- RGBA at 4
//! bytes per pixel or grayscale at 1. Rendering is a pure function of
//! the display list: same list, same bytes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An RGBA color. Alpha is carried for completeness; the rasterizer
/// treats any nonzero alpha as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    pub const fn black() -> Color {
        Color::rgb(0, 0, 0)
    }

    pub const fn white() -> Color {
        Color::rgb(255, 255, 255)
    }

    /// Fixed Rec.601 luminance reduction. This is deliberately not a
    /// plain channel average: distinct palette entries must stay
    /// distinguishable in the 1-byte rendering.
    pub fn grayscale_byte(&self) -> u8 {
        ((299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32) / 1000) as u8
    }
}

/// A monochrome bitmap sprite: a mask of on/off pixels painted in a
/// single color. Used for score digits, shields, and small entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BitmapSprite {
    /// Row-major mask; all rows have equal length.
    pub rows: Vec<Vec<bool>>,
}

impl BitmapSprite {
    /// Parse ASCII art: `on` marks lit pixels, anything else is off.
    /// Rows are padded to the longest line.
    pub fn from_ascii(art: &str, on: char) -> BitmapSprite {
        let lines: Vec<&str> = art.lines().filter(|l| !l.is_empty()).collect();
        let width = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        let rows = lines
            .iter()
            .map(|line| {
                let mut row: Vec<bool> = line.chars().map(|c| c == on).collect();
                row.resize(width, false);
                row
            })
            .collect();
        BitmapSprite { rows }
    }

    pub fn width(&self) -> i32 {
        self.rows.first().map(|r| r.len()).unwrap_or(0) as i32
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Integer upscale by `factor` in both dimensions.
    pub fn scaled(&self, factor: usize) -> BitmapSprite {
        let rows = self
            .rows
            .iter()
            .flat_map(|row| {
                let wide: Vec<bool> = row
                    .iter()
                    .flat_map(|&px| std::iter::repeat_n(px, factor))
                    .collect();
                std::iter::repeat_n(wide, factor)
            })
            .collect();
        BitmapSprite { rows }
    }

    pub fn flip_x(&self) -> BitmapSprite {
        BitmapSprite {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().rev().copied().collect())
                .collect(),
        }
    }
}

/// One element of a frame's display list.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Fill the whole frame with one color.
    Clear(Color),
    /// A filled rectangle.
    Rectangle {
        color: Color,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    /// A monochrome sprite painted in one color.
    Bitmap {
        x: i32,
        y: i32,
        color: Color,
        data: BitmapSprite,
    },
}

impl Drawable {
    pub fn rect(color: Color, x: i32, y: i32, w: i32, h: i32) -> Drawable {
        Drawable::Rectangle { color, x, y, w, h }
    }

    pub fn sprite(x: i32, y: i32, color: Color, data: BitmapSprite) -> Drawable {
        Drawable::Bitmap { x, y, color, data }
    }
}

/// RGBA frame buffer, 4 bytes per pixel, row-major, top-left origin.
pub struct ImageBuffer {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

impl ImageBuffer {
    pub fn alloc(width: i32, height: i32) -> ImageBuffer {
        ImageBuffer {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        self.data[offset] = color.r;
        self.data[offset + 1] = color.g;
        self.data[offset + 2] = color.b;
        self.data[offset + 3] = 255;
    }

    pub fn render(&mut self, commands: &[Drawable]) {
        for command in commands {
            rasterize(command, self.width, self.height, &mut |x, y, c| {
                self.set_pixel(x, y, c)
            });
        }
    }
}

/// Grayscale frame buffer, 1 byte per pixel, row-major, top-left origin.
pub struct GrayscaleBuffer {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

impl GrayscaleBuffer {
    pub fn alloc(width: i32, height: i32) -> GrayscaleBuffer {
        GrayscaleBuffer {
            width,
            height,
            data: vec![0; (width * height) as usize],
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        self.data[(y * self.width + x) as usize] = color.grayscale_byte();
    }

    pub fn render(&mut self, commands: &[Drawable]) {
        for command in commands {
            rasterize(command, self.width, self.height, &mut |x, y, c| {
                self.set_pixel(x, y, c)
            });
        }
    }
}

/// Walk one drawable's covered pixels, clipped to the frame.
fn rasterize(command: &Drawable, width: i32, height: i32, put: &mut dyn FnMut(i32, i32, Color)) {
    match command {
        Drawable::Clear(color) => {
            for y in 0..height {
                for x in 0..width {
                    put(x, y, *color);
                }
            }
        }
        Drawable::Rectangle { color, x, y, w, h } => {
            for py in *y..y + h {
                for px in *x..x + w {
                    put(px, py, *color);
                }
            }
        }
        Drawable::Bitmap { x, y, color, data } => {
            for (dy, row) in data.rows.iter().enumerate() {
                for (dx, &lit) in row.iter().enumerate() {
                    if lit {
                        put(x + dx as i32, y + dy as i32, *color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sizes_are_exact() {
        let rgba = ImageBuffer::alloc(7, 5);
        assert_eq!(rgba.data.len(), 7 * 5 * 4);
        let gray = GrayscaleBuffer::alloc(7, 5);
        assert_eq!(gray.data.len(), 7 * 5);
    }

    #[test]
    fn test_clear_then_rect_overwrites() {
        let mut img = ImageBuffer::alloc(4, 4);
        img.render(&[
            Drawable::Clear(Color::rgb(10, 20, 30)),
            Drawable::rect(Color::rgb(200, 0, 0), 1, 1, 2, 2),
        ]);
        // corner keeps the clear color
        assert_eq!(&img.data[..4], &[10, 20, 30, 255]);
        // inside the rect
        let offset = ((1 * 4 + 1) * 4) as usize;
        assert_eq!(&img.data[offset..offset + 4], &[200, 0, 0, 255]);
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut img = ImageBuffer::alloc(3, 3);
        img.render(&[Drawable::rect(Color::white(), -5, -5, 100, 100)]);
        assert!(img.data.chunks(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_render_is_deterministic() {
        let cmds = vec![
            Drawable::Clear(Color::black()),
            Drawable::rect(Color::rgb(1, 2, 3), 0, 0, 2, 2),
        ];
        let mut a = GrayscaleBuffer::alloc(8, 8);
        let mut b = GrayscaleBuffer::alloc(8, 8);
        a.render(&cmds);
        b.render(&cmds);
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_grayscale_is_not_channel_average() {
        let green = Color::rgb(0, 255, 0);
        let blue = Color::rgb(0, 0, 255);
        assert_ne!(green.grayscale_byte(), blue.grayscale_byte());
    }

    #[test]
    fn test_sprite_from_ascii_and_scale() {
        let sprite = BitmapSprite::from_ascii("X.\n.X", 'X');
        assert_eq!(sprite.width(), 2);
        assert_eq!(sprite.height(), 2);
        let big = sprite.scaled(3);
        assert_eq!(big.width(), 6);
        assert_eq!(big.height(), 6);
        assert!(big.rows[0][0] && !big.rows[0][3]);
    }
}
