//! Button control module
//!
//! Debounced polling for the two push buttons, with short and long
//! press classification.

use debouncr::{debounce_2, Debouncer, Edge, Repeat2};
use embassy_nrf::gpio::{AnyPin, Input, Output};
use embassy_time::{Duration, Instant, Timer};

/// Hold time separating a short press from a long press.
const LONG_PRESS: Duration = Duration::from_millis(500);

/// Classified button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Press {
    Short,
    Long,
}

struct ButtonConfig<'a> {
    /// Button detection pin (high/low)
    pin_button: Input<'a, AnyPin>,
    /// Button enable pin, where the hardware has one
    pin_enable: Option<Output<'a, AnyPin>>,
    /// Debouncer for button
    debouncer: Debouncer<u8, Repeat2>,
}

pub struct Button {
    /// Button configuration
    config: ButtonConfig<'static>,
    /// When the current press started
    pressed_at: Option<Instant>,
    /// A long press was already reported for the current hold
    long_reported: bool,
}

impl Button {
    /// Configure button on boot
    pub fn init(
        button_pin: Input<'static, AnyPin>,
        enable_pin: Option<Output<'static, AnyPin>>,
    ) -> Self {
        Self {
            config: ButtonConfig {
                pin_button: button_pin,
                pin_enable: enable_pin,
                debouncer: debounce_2(false),
            },
            pressed_at: None,
            long_reported: false,
        }
    }

    /// Poll the button once.
    ///
    /// A long press is reported while the button is still held; a short
    /// press on release. Expected to be called every 10ms or so.
    pub async fn poll(&mut self) -> Option<Press> {
        let config = &mut self.config;

        if let Some(enable) = config.pin_enable.as_mut() {
            enable.set_high();
            // The button needs a short time to give stable outputs
            Timer::after(Duration::from_nanos(1)).await;
        }

        let edge = config.debouncer.update(config.pin_button.is_high());

        // The button consumes around 34µA while the enable rail is left
        // high, so drop it between polls.
        if let Some(enable) = config.pin_enable.as_mut() {
            enable.set_low();
        }

        match edge {
            Some(Edge::Rising) => {
                self.pressed_at = Some(Instant::now());
                self.long_reported = false;
                None
            }
            Some(Edge::Falling) => {
                let pressed_at = self.pressed_at.take()?;
                if self.long_reported {
                    // already delivered while held
                    None
                } else if Instant::now() - pressed_at >= LONG_PRESS {
                    Some(Press::Long)
                } else {
                    Some(Press::Short)
                }
            }
            None => match self.pressed_at {
                Some(pressed_at)
                    if !self.long_reported && Instant::now() - pressed_at >= LONG_PRESS =>
                {
                    self.long_reported = true;
                    Some(Press::Long)
                }
                _ => None,
            },
        }
    }
}
