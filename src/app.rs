//! Application event loop
//!
//! One task owns the display and the state machine. Button events, the
//! redraw tick and the single one-shot alarm slot are raced with
//! `select3`, so callbacks are processed strictly one at a time. The
//! alarm slot is only written while executing machine effects, which
//! makes "no stale timer fires after a mode change" structural rather
//! than a bookkeeping promise.

use core::future::pending;

use embassy_futures::select::{select3, Either3};
use embassy_nrf::peripherals::{SPI2, TWISPI1};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel};
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::Vec;

use pulsewatch_logic::{Effect, Effects, Mode, PulseTimer, Settings, TickRate, WatchApp};

use crate::peripherals::{
    display::{Brightness, Display},
    vibrator::{PulseLength, Vibrator},
};
use crate::system::{store::SettingsStore, time::TimeManager};
use crate::ui::{pulse::PulseScreen, settings_menu::SettingsMenu, watchface::Watchface, BACKGROUND};

/// Button events from the input task.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub enum AppEvent {
    SelectShort,
    SelectLong,
    Back,
}

/// Input events, drained one at a time by the app task.
pub static EVENTS: Channel<ThreadModeRawMutex, AppEvent, 4> = Channel::new();

/// Screens that can own the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
enum Screen {
    Face,
    Settings,
}

/// Resting backlight level while the light notification is off.
const LIGHT_OFF_LEVEL: Brightness = Brightness::LEVEL2;
/// Backlight level while the counting window is open.
const LIGHT_ON_LEVEL: Brightness = Brightness::LEVEL7;

pub struct App {
    machine: WatchApp,
    display: Display<SPI2>,
    vibrator: Vibrator,
    store: SettingsStore<TWISPI1>,
    time: TimeManager,
    watchface: Watchface,
    pulse: PulseScreen,
    menu: SettingsMenu,
    screens: Vec<Screen, 2>,
    ticker: Ticker,
    /// The armed one-shot timer, if any
    alarm: Option<(PulseTimer, Instant)>,
}

impl App {
    pub fn new(
        display: Display<SPI2>,
        vibrator: Vibrator,
        store: SettingsStore<TWISPI1>,
        time: TimeManager,
        settings: Settings,
    ) -> Self {
        let mut screens = Vec::new();
        let _ = screens.push(Screen::Face);
        Self {
            machine: WatchApp::new(settings),
            display,
            vibrator,
            store,
            time,
            watchface: Watchface::new(),
            pulse: PulseScreen::new(),
            menu: SettingsMenu::new(),
            screens,
            ticker: Ticker::every(Duration::from_secs(1)),
            alarm: None,
        }
    }

    pub async fn run(mut self) -> ! {
        let fx = self.machine.startup();
        self.apply(fx).await;

        loop {
            let outcome = select3(
                EVENTS.receive(),
                self.ticker.next(),
                alarm_wait(self.alarm),
            )
            .await;

            match outcome {
                Either3::First(event) => {
                    defmt::debug!("button event: {}", event);
                    let fx = match event {
                        AppEvent::SelectShort => self.machine.select_short(),
                        AppEvent::SelectLong => self.machine.select_long(),
                        AppEvent::Back => self.machine.back(),
                    };
                    self.apply(fx).await;
                }
                Either3::Second(()) => self.on_tick(),
                Either3::Third(timer) => {
                    self.alarm = None;
                    let fx = match timer {
                        PulseTimer::Delay => self.machine.delay_elapsed(),
                        PulseTimer::Timeout => self.machine.timeout_elapsed(),
                    };
                    self.apply(fx).await;
                }
            }
        }
    }

    /// Redraw whatever screen the current mode owns.
    fn on_tick(&mut self) {
        self.machine.tick();
        match self.machine.mode() {
            Mode::Watch => {
                let sample = self.time.sample();
                let seconds_hand = self.machine.settings().seconds_hand;
                self.watchface
                    .draw_tick(self.display.target(), &sample, seconds_hand)
                    .unwrap();
            }
            Mode::CountPulses => {
                let elapsed = self.machine.pulse_seconds();
                self.pulse.draw(self.display.target(), elapsed).unwrap();
            }
            // the face is hidden under the menu
            Mode::Settings => {}
        }
    }

    /// Execute machine effects in list order.
    async fn apply(&mut self, fx: Effects) {
        for effect in fx {
            match effect {
                Effect::ShowWatchface => {
                    self.display.clear(BACKGROUND);
                    self.watchface.reset();
                    let sample = self.time.sample();
                    let seconds_hand = self.machine.settings().seconds_hand;
                    self.watchface
                        .draw_tick(self.display.target(), &sample, seconds_hand)
                        .unwrap();
                }
                Effect::ShowPulseScreen => {
                    self.display.clear(BACKGROUND);
                    self.pulse.reset();
                    let elapsed = self.machine.pulse_seconds();
                    self.pulse.draw(self.display.target(), elapsed).unwrap();
                }
                Effect::PushSettingsScreen => {
                    if self.screens.contains(&Screen::Settings) {
                        // the machine already guards this, keep the
                        // stack consistent anyway
                        defmt::warn!("settings screen already on the stack");
                        continue;
                    }
                    let _ = self.screens.push(Screen::Settings);
                    self.display.clear(BACKGROUND);
                    self.menu
                        .draw(
                            self.display.target(),
                            self.machine.settings(),
                            self.machine.menu_row(),
                        )
                        .unwrap();
                }
                Effect::PopSettingsScreen => {
                    if self.screens.last() == Some(&Screen::Settings) {
                        self.screens.pop();
                    }
                }
                Effect::SetTickRate(rate) => {
                    self.ticker = Ticker::every(match rate {
                        TickRate::Second => Duration::from_secs(1),
                        TickRate::Minute => Duration::from_secs(60),
                    });
                }
                Effect::ArmDelay(secs) => {
                    self.alarm = Some((
                        PulseTimer::Delay,
                        Instant::now() + Duration::from_secs(secs as u64),
                    ));
                }
                Effect::ArmTimeout(secs) => {
                    self.alarm = Some((
                        PulseTimer::Timeout,
                        Instant::now() + Duration::from_secs(secs as u64),
                    ));
                }
                Effect::CancelTimers => self.alarm = None,
                Effect::SetLight(on) => {
                    self.display.set_brightness(if on {
                        LIGHT_ON_LEVEL
                    } else {
                        LIGHT_OFF_LEVEL
                    });
                }
                Effect::VibrateDouble => {
                    self.vibrator.pulse(PulseLength::SHORT, Some(2)).await;
                }
                Effect::PersistSetting(item) => {
                    let settings = *self.machine.settings();
                    self.store.persist(item, &settings).await;
                }
                Effect::RedrawMenu => {
                    self.menu
                        .draw(
                            self.display.target(),
                            self.machine.settings(),
                            self.machine.menu_row(),
                        )
                        .unwrap();
                }
                Effect::WarnSettingsOpen => {
                    defmt::warn!("settings screen already active, ignoring request");
                }
                Effect::Exit => {
                    defmt::info!("back press on the face, shutting down");
                    self.screens.clear();
                    self.display.clear(BACKGROUND);
                    self.display.set_brightness(Brightness::LEVEL0);
                    // nothing left to run
                    pending::<()>().await;
                }
            }
        }
    }
}

/// Resolves when the armed one-shot expires; never, when none is armed.
async fn alarm_wait(alarm: Option<(PulseTimer, Instant)>) -> PulseTimer {
    match alarm {
        Some((timer, at)) => {
            Timer::at(at).await;
            timer
        }
        None => pending().await,
    }
}
