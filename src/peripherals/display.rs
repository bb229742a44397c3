//! Display control module
//!
//! ST7789 LCD behind SPI, with the three-pin resistor-ladder backlight
//! folded in.

use embassy_nrf::{
    gpio::Output,
    peripherals::{P0_14, P0_18, P0_22, P0_23, P0_25, P0_26},
    spim::{self, Spim},
};

use display_interface_spi::SPIInterface;
use embassy_time::Delay;
use embedded_graphics::pixelcolor::Rgb565;
use mipidsi::{models::ST7789, Builder, Orientation};

pub const LCD_W: u16 = 240;
pub const LCD_H: u16 = 240;

/// The LCD panel as a draw target.
pub type Lcd<'a, SPI> = mipidsi::Display<
    SPIInterface<Spim<'a, SPI>, Output<'a, P0_18>, Output<'a, P0_25>>,
    ST7789,
    Output<'a, P0_26>,
>;

/// Backlight brightness level.
///
/// There are three active-low backlight pins, each connected to a FET
/// that toggles backlight power through a resistor. Combinations of the
/// pins give 7 brightness levels plus off.
#[allow(unused)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    LEVEL0 = 0,
    LEVEL1 = 1,
    LEVEL2 = 2,
    LEVEL3 = 3,
    LEVEL4 = 4,
    LEVEL5 = 5,
    LEVEL6 = 6,
    LEVEL7 = 7,
}

pub struct BacklightPins<'a> {
    low: Output<'a, P0_14>,
    mid: Output<'a, P0_22>,
    high: Output<'a, P0_23>,
}

impl BacklightPins<'_> {
    /// Configure backlight pins on boot
    pub fn init(
        low: Output<'static, P0_14>,
        mid: Output<'static, P0_22>,
        high: Output<'static, P0_23>,
    ) -> Self {
        Self { low, mid, high }
    }
}

struct DisplayConfig<'a, SPI>
where
    SPI: spim::Instance,
{
    /// Display instance
    display: Lcd<'a, SPI>,
    /// Backlight pins
    pins_backlight: BacklightPins<'a>,
}

pub struct Display<SPI>
where
    SPI: spim::Instance,
{
    /// Display configuration
    config: DisplayConfig<'static, SPI>,
    /// Backlight brightness
    brightness: Brightness,
}

impl<SPI> Display<SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI>,
        cs_pin: Output<'static, P0_25>,
        dc_pin: Output<'static, P0_18>,
        rst_pin: Output<'static, P0_26>,
        backlight: BacklightPins<'static>,
    ) -> Self {
        let mut display = Self {
            config: DisplayConfig {
                display: Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
                    .with_display_size(LCD_W, LCD_H)
                    .with_orientation(Orientation::Portrait(false))
                    .init(&mut Delay, Some(rst_pin))
                    .unwrap(),
                pins_backlight: backlight,
            },
            brightness: Brightness::LEVEL0,
        };
        display.set_brightness(Brightness::LEVEL0);
        display
    }

    /// Clear the whole panel
    pub fn clear(&mut self, color: Rgb565) {
        self.config.display.clear(color).unwrap();
    }

    /// The panel as an embedded-graphics draw target
    pub fn target(&mut self) -> &mut Lcd<'static, SPI> {
        &mut self.config.display
    }

    /// Brightness of the display backlight
    #[allow(unused)]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Set the backlight brightness
    pub fn set_brightness(&mut self, level: Brightness) {
        let pins = &mut self.config.pins_backlight;
        let bits = level as u8;
        // Pins are active low
        if bits & 0x01 > 0 {
            pins.low.set_low();
        } else {
            pins.low.set_high();
        }
        if bits & 0x02 > 0 {
            pins.mid.set_low();
        } else {
            pins.mid.set_high();
        }
        if bits & 0x04 > 0 {
            pins.high.set_low();
        } else {
            pins.high.set_high();
        }
        self.brightness = level;
    }
}
