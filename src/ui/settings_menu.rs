//! Settings menu screen
//!
//! Four rows with title and live value subtitle. Select moves the
//! highlight, a long select cycles the highlighted value, back
//! dismisses the menu.

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Text},
};
use pulsewatch_logic::{Settings, SettingsItem};

use super::BACKGROUND;

const ROW_TOP: i32 = 40;
const ROW_HEIGHT: i32 = 48;
const HIGHLIGHT_COLOR: Rgb565 = Rgb565::new(4, 8, 12);
const SUBTITLE_COLOR: Rgb565 = Rgb565::new(16, 32, 16);

pub struct SettingsMenu;

impl SettingsMenu {
    pub fn new() -> Self {
        Self
    }

    /// Repaint every row; cheap enough for a four-row menu.
    pub fn draw<D>(
        &self,
        target: &mut D,
        settings: &Settings,
        highlighted: SettingsItem,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let title_style = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
        let subtitle_style = MonoTextStyle::new(&FONT_10X20, SUBTITLE_COLOR);

        Text::with_alignment("SETTINGS", Point::new(120, 24), title_style, Alignment::Center)
            .draw(target)?;

        for (index, item) in SettingsItem::ALL.iter().enumerate() {
            let top = ROW_TOP + index as i32 * ROW_HEIGHT;
            let fill = if *item == highlighted {
                HIGHLIGHT_COLOR
            } else {
                BACKGROUND
            };
            Rectangle::new(Point::new(0, top), Size::new(240, ROW_HEIGHT as u32))
                .into_styled(PrimitiveStyle::with_fill(fill))
                .draw(target)?;

            Text::new(item.title(), Point::new(12, top + 18), title_style).draw(target)?;

            let mut buf = [0u8; 16];
            let subtitle = match item {
                SettingsItem::CountTime => format_no_std::show(
                    &mut buf,
                    format_args!("{} seconds", settings.timeout_secs),
                ),
                SettingsItem::StartDelay => format_no_std::show(
                    &mut buf,
                    format_args!("{} seconds", settings.delay_secs),
                ),
                SettingsItem::Vibration => format_no_std::show(
                    &mut buf,
                    format_args!("{}", if settings.vibrate { "ON" } else { "OFF" }),
                ),
                SettingsItem::SecondsHand => format_no_std::show(
                    &mut buf,
                    format_args!("{}", if settings.seconds_hand { "ON" } else { "OFF" }),
                ),
            }
            .unwrap();
            Text::new(subtitle, Point::new(24, top + 38), subtitle_style).draw(target)?;
        }
        Ok(())
    }
}
