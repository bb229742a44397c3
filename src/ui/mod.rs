//! UI definitions module

use embedded_graphics::{geometry::Point, pixelcolor::Rgb565, prelude::RgbColor};
use libm::{cosf, sinf};

pub(crate) mod pulse;
pub(crate) mod settings_menu;
pub(crate) mod watchface;

/// Screen background
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Center of the 240x240 panel
pub const CENTER: Point = Point::new(120, 120);

/// Point on a circle of `radius` around `center` for a dial position in
/// sixtieths, 0 at 12 o'clock, running clockwise.
pub fn dial_point(center: Point, radius: i32, sixtieths: u32) -> Point {
    let angle = (sixtieths % 60) as f32 / 60.0 * core::f32::consts::TAU;
    Point::new(
        center.x + (sinf(angle) * radius as f32) as i32,
        center.y - (cosf(angle) * radius as f32) as i32,
    )
}
