//! Pulse counting screen
//!
//! A heart glyph that beats once per second while the second hand
//! sweeps the dial. The hand is driven by the elapsed counter of the
//! state machine, not the wall clock, so it crosses 12 o'clock exactly
//! when the counting window opens.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

use super::{dial_point, BACKGROUND, CENTER};

const HAND_R: i32 = 114;
const HAND_WIDTH: u32 = 2;

const HEART_COLOR: Rgb565 = Rgb565::RED;

/// Bounding box of the biggest heart variant, cleared between beats
const HEART_FRAME: Rectangle = Rectangle::new(Point::new(80, 84), Size::new(80, 84));

pub struct PulseScreen {
    drawn_second: Option<u32>,
    drawn_big: Option<bool>,
}

impl PulseScreen {
    pub fn new() -> Self {
        Self {
            drawn_second: None,
            drawn_big: None,
        }
    }

    /// Forget panel contents after the screen was cleared.
    pub fn reset(&mut self) {
        self.drawn_second = None;
        self.drawn_big = None;
    }

    /// Redraw for the current elapsed-seconds counter value.
    pub fn draw<D>(&mut self, target: &mut D, elapsed: u16) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let second = (elapsed % 60) as u32;
        let big = elapsed % 2 == 0;

        if let Some(prev) = self.drawn_second {
            if prev != second {
                draw_hand(target, prev, BACKGROUND)?;
            }
        }

        if self.drawn_big != Some(big) {
            HEART_FRAME
                .into_styled(PrimitiveStyle::with_fill(BACKGROUND))
                .draw(target)?;
            draw_heart(target, big)?;
            self.drawn_big = Some(big);
        }

        draw_hand(target, second, Rgb565::WHITE)?;
        self.drawn_second = Some(second);
        Ok(())
    }
}

fn draw_hand<D>(target: &mut D, second: u32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Line::new(CENTER, dial_point(CENTER, HAND_R, second))
        .into_styled(PrimitiveStyle::with_stroke(color, HAND_WIDTH))
        .draw(target)?;
    Ok(())
}

/// Two lobes and a tip; `big` is the systole frame.
fn draw_heart<D>(target: &mut D, big: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = PrimitiveStyle::with_fill(HEART_COLOR);
    if big {
        Circle::with_center(Point::new(102, 106), 38)
            .into_styled(style)
            .draw(target)?;
        Circle::with_center(Point::new(138, 106), 38)
            .into_styled(style)
            .draw(target)?;
        Triangle::new(
            Point::new(85, 117),
            Point::new(155, 117),
            Point::new(120, 164),
        )
        .into_styled(style)
        .draw(target)?;
    } else {
        Circle::with_center(Point::new(105, 108), 32)
            .into_styled(style)
            .draw(target)?;
        Circle::with_center(Point::new(135, 108), 32)
            .into_styled(style)
            .draw(target)?;
        Triangle::new(
            Point::new(91, 117),
            Point::new(149, 117),
            Point::new(120, 156),
        )
        .into_styled(style)
        .draw(target)?;
    }
    Ok(())
}
