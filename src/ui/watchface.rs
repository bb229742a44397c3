//! Analog watch face
//!
//! Hands are erased and redrawn incrementally each tick; the weekday
//! and day-of-month labels follow the quadrant picked by the placement
//! heuristic and are only touched when that quadrant or the calendar
//! day changes.

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyleBuilder},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Text},
};
use pulsewatch_logic::{hour_hand_sixtieths, DateLayout, Quadrant};

use super::{dial_point, BACKGROUND, CENTER};
use crate::system::time::ClockSample;

const HOUR_HAND_R: i32 = 72;
const MINUTE_HAND_R: i32 = 104;
const SECOND_HAND_R: i32 = 114;
/// How far the hands reach past the center on the far side
const HAND_TAIL: i32 = 18;

const HOUR_HAND_WIDTH: u32 = 8;
const MINUTE_HAND_WIDTH: u32 = 6;
const SECOND_HAND_WIDTH: u32 = 2;

const MARK_INNER_R: i32 = 106;
const MARK_OUTER_R: i32 = 116;

/// Hand positions currently on the panel, in sixtieths.
struct DrawnHands {
    hour: u32,
    minute: u32,
    second: Option<u32>,
}

pub struct Watchface {
    layout: DateLayout,
    drawn: Option<DrawnHands>,
}

impl Watchface {
    pub fn new() -> Self {
        Self {
            layout: DateLayout::new(),
            drawn: None,
        }
    }

    /// Forget panel contents after the screen was cleared.
    pub fn reset(&mut self) {
        self.layout.reset();
        self.drawn = None;
    }

    /// Draw the twelve static dial marks.
    pub fn draw_dial<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let style = PrimitiveStyle::with_stroke(Rgb565::WHITE, 2);
        for position in (0..60).step_by(5) {
            Line::new(
                dial_point(CENTER, MARK_INNER_R, position),
                dial_point(CENTER, MARK_OUTER_R, position),
            )
            .into_styled(style)
            .draw(target)?;
        }
        Ok(())
    }

    /// Per-tick redraw of hands and date labels.
    pub fn draw_tick<D>(
        &mut self,
        target: &mut D,
        sample: &ClockSample,
        seconds_hand: bool,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let hands = DrawnHands {
            hour: hour_hand_sixtieths(sample.hour, sample.minute),
            minute: sample.minute,
            second: seconds_hand.then_some(sample.second),
        };

        // erase whatever moved since the last frame, remembering whether
        // an erase stroke cut through the date labels
        let mut labels_damaged = false;
        if let Some(prev) = &self.drawn {
            if prev.hour != hands.hour {
                draw_hand(target, prev.hour, HOUR_HAND_R, HOUR_HAND_WIDTH, BACKGROUND)?;
                labels_damaged |= self.hand_hits_labels(prev.hour, HOUR_HAND_R);
            }
            if prev.minute != hands.minute {
                draw_hand(target, prev.minute, MINUTE_HAND_R, MINUTE_HAND_WIDTH, BACKGROUND)?;
                labels_damaged |= self.hand_hits_labels(prev.minute, MINUTE_HAND_R);
            }
            if let Some(second) = prev.second {
                if prev.second != hands.second {
                    draw_hand(target, second, SECOND_HAND_R, SECOND_HAND_WIDTH, BACKGROUND)?;
                    labels_damaged |= self.hand_hits_labels(second, SECOND_HAND_R);
                }
            }
        }

        // erasing clips the marks, repaint them before the hands
        self.draw_dial(target)?;
        self.draw_date(target, sample, labels_damaged)?;

        draw_hand(target, hands.hour, HOUR_HAND_R, HOUR_HAND_WIDTH, Rgb565::WHITE)?;
        draw_hand(target, hands.minute, MINUTE_HAND_R, MINUTE_HAND_WIDTH, Rgb565::WHITE)?;
        if let Some(second) = hands.second {
            draw_hand(target, second, SECOND_HAND_R, SECOND_HAND_WIDTH, Rgb565::WHITE)?;
        }

        // center dot over the hand tails
        let dot_style = PrimitiveStyleBuilder::new()
            .fill_color(Rgb565::WHITE)
            .stroke_color(Rgb565::BLACK)
            .stroke_width(1)
            .build();
        Circle::with_center(CENTER, 10)
            .into_styled(dot_style)
            .draw(target)?;

        self.drawn = Some(hands);
        Ok(())
    }

    /// Relocate or re-render the date labels when needed.
    fn draw_date<D>(
        &mut self,
        target: &mut D,
        sample: &ClockSample,
        damaged: bool,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let previous = self.layout.location();
        let update = self.layout.observe(sample.hour, sample.minute, sample.day_of_year);

        let moved = update.relocate.is_some();
        if moved {
            if let Some(old) = previous {
                clear_labels(target, old)?;
            }
        }
        if moved || update.day_changed || damaged {
            if let Some(quadrant) = self.layout.location() {
                draw_labels(target, quadrant, sample)?;
            }
        }
        Ok(())
    }

    /// Whether a hand stroke at this position crosses the label frame.
    ///
    /// The second hand is not considered by the placement heuristic and
    /// sweeps the whole dial, so its erase stroke regularly does.
    fn hand_hits_labels(&self, sixtieths: u32, radius: i32) -> bool {
        let Some(quadrant) = self.layout.location() else {
            return false;
        };
        let stroke = Rectangle::with_corners(
            dial_point(CENTER, -HAND_TAIL, sixtieths),
            dial_point(CENTER, radius, sixtieths),
        )
        .offset(HOUR_HAND_WIDTH as i32);
        !stroke.intersection(&label_frame(quadrant)).is_zero_sized()
    }
}

fn draw_hand<D>(
    target: &mut D,
    sixtieths: u32,
    radius: i32,
    width: u32,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    // hands carry a short tail past the center
    let tail = dial_point(CENTER, -HAND_TAIL, sixtieths);
    let tip = dial_point(CENTER, radius, sixtieths);
    Line::new(tail, tip)
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(target)?;
    Ok(())
}

/// Label anchors per quadrant: weekday, then day-of-month.
///
/// Top and bottom split the pair around the vertical center line, left
/// and right stack it.
fn label_anchors(quadrant: Quadrant) -> [(Point, Alignment); 2] {
    match quadrant {
        Quadrant::Top => [
            (Point::new(112, 46), Alignment::Right),
            (Point::new(128, 46), Alignment::Left),
        ],
        Quadrant::Bottom => [
            (Point::new(112, 206), Alignment::Right),
            (Point::new(128, 206), Alignment::Left),
        ],
        Quadrant::Left => [
            (Point::new(52, 112), Alignment::Center),
            (Point::new(52, 134), Alignment::Center),
        ],
        Quadrant::Right => [
            (Point::new(188, 112), Alignment::Center),
            (Point::new(188, 134), Alignment::Center),
        ],
    }
}

/// Region to blank when the labels leave a quadrant.
fn label_frame(quadrant: Quadrant) -> Rectangle {
    match quadrant {
        Quadrant::Top => Rectangle::new(Point::new(60, 28), Size::new(120, 26)),
        Quadrant::Bottom => Rectangle::new(Point::new(60, 188), Size::new(120, 26)),
        Quadrant::Left => Rectangle::new(Point::new(20, 94), Size::new(64, 48)),
        Quadrant::Right => Rectangle::new(Point::new(156, 94), Size::new(64, 48)),
    }
}

fn clear_labels<D>(target: &mut D, quadrant: Quadrant) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    label_frame(quadrant)
        .into_styled(PrimitiveStyle::with_fill(BACKGROUND))
        .draw(target)
}

fn draw_labels<D>(target: &mut D, quadrant: Quadrant, sample: &ClockSample) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(Rgb565::WHITE)
        .background_color(BACKGROUND)
        .build();
    let [(day_anchor, day_align), (num_anchor, num_align)] = label_anchors(quadrant);

    let mut day_buf = [0u8; 8];
    let day = format_no_std::show(&mut day_buf, format_args!("{}", sample.weekday)).unwrap();
    Text::with_alignment(day, day_anchor, style, day_align).draw(target)?;

    let mut num_buf = [0u8; 4];
    let num =
        format_no_std::show(&mut num_buf, format_args!("{:02}", sample.day_of_month)).unwrap();
    Text::with_alignment(num, num_anchor, style, num_align).draw(target)?;
    Ok(())
}
