//! Display-mode state machine
//!
//! [`WatchApp`] owns the current mode, the settings record and the two
//! one-shot timers of the pulse counting mode. Input methods mutate the
//! state and hand back a bounded list of [`Effect`]s for the firmware to
//! execute in order; nothing in here touches hardware, so the whole
//! transition table runs under host tests.

use heapless::Vec;

use crate::settings::{self, Settings, SettingsItem};

/// Top-level behavior of the app. Exactly one is active at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Analog clock face
    Watch,
    /// Pulse counting: heart glyph plus sweeping second hand
    CountPulses,
    /// Settings menu pushed over the face
    Settings,
}

/// Granularity of the redraw tick subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickRate {
    Second,
    Minute,
}

/// The one-shot timers owned by the pulse counting mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseTimer {
    /// Bridges mode entry to the light/vibration notification
    Delay,
    /// Bounds how long the counting window stays open
    Timeout,
}

/// Side effects for the runtime, executed in list order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Restore the clock face visuals
    ShowWatchface,
    /// Show the pulse counting visuals
    ShowPulseScreen,
    /// Push the settings screen over the face
    PushSettingsScreen,
    /// Remove the settings screen again
    PopSettingsScreen,
    /// Re-subscribe the redraw tick at the given granularity
    SetTickRate(TickRate),
    /// Arm the delay timer for this many seconds
    ArmDelay(u16),
    /// Arm the timeout timer for this many seconds
    ArmTimeout(u16),
    /// Cancel whichever one-shot timer is live
    CancelTimers,
    /// Auxiliary light on or off
    SetLight(bool),
    /// Double vibration pulse
    VibrateDouble,
    /// Write one settings value to the store
    PersistSetting(SettingsItem),
    /// Repaint the settings menu rows
    RedrawMenu,
    /// Settings screen was requested while already on the stack
    WarnSettingsOpen,
    /// Pop the whole screen stack and terminate
    Exit,
}

/// Bounded effect list; no single input produces more than a handful.
pub type Effects = Vec<Effect, 8>;

/// The application state machine.
pub struct WatchApp {
    mode: Mode,
    settings: Settings,
    /// Elapsed-seconds counter driving the pulse screen second hand
    pulse_seconds: u16,
    /// Which one-shot timer is live, if any
    armed: Option<PulseTimer>,
    /// Settings screen pushed and not yet dismissed
    settings_open: bool,
    /// Highlighted settings menu row
    menu_row: SettingsItem,
}

impl WatchApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            mode: Mode::Watch,
            settings,
            pulse_seconds: 0,
            armed: None,
            settings_open: false,
            menu_row: SettingsItem::CountTime,
        }
    }

    /// Effects to bring the runtime in line with the initial state.
    pub fn startup(&self) -> Effects {
        let mut fx = Effects::new();
        let _ = fx.push(Effect::SetTickRate(self.tick_rate()));
        let _ = fx.push(Effect::ShowWatchface);
        fx
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn menu_row(&self) -> SettingsItem {
        self.menu_row
    }

    /// Raw elapsed counter; the pulse screen wraps it onto the dial.
    pub fn pulse_seconds(&self) -> u16 {
        self.pulse_seconds
    }

    /// The one-shot timer currently live, if any.
    pub fn armed_timer(&self) -> Option<PulseTimer> {
        self.armed
    }

    /// Seconds ticks whenever the second hand is visible, minute ticks
    /// otherwise.
    pub fn tick_rate(&self) -> TickRate {
        if self.settings.seconds_hand || self.mode == Mode::CountPulses {
            TickRate::Second
        } else {
            TickRate::Minute
        }
    }

    /// Short press on the select button.
    pub fn select_short(&mut self) -> Effects {
        let mut fx = Effects::new();
        match self.mode {
            Mode::Watch => self.set_mode(Mode::CountPulses, &mut fx),
            Mode::CountPulses => self.set_mode(Mode::Watch, &mut fx),
            Mode::Settings => {
                self.menu_row = self.menu_row.next();
                let _ = fx.push(Effect::RedrawMenu);
            }
        }
        fx
    }

    /// Long press on the select button.
    pub fn select_long(&mut self) -> Effects {
        let mut fx = Effects::new();
        match self.mode {
            Mode::Watch | Mode::CountPulses => self.set_mode(Mode::Settings, &mut fx),
            Mode::Settings => {
                match self.menu_row {
                    SettingsItem::CountTime => {
                        self.set_timeout_inner(settings::next_timeout(self.settings.timeout_secs), &mut fx)
                    }
                    SettingsItem::StartDelay => {
                        self.set_delay_inner(settings::next_delay(self.settings.delay_secs), &mut fx)
                    }
                    SettingsItem::Vibration => {
                        self.set_vibrate_inner(!self.settings.vibrate, &mut fx)
                    }
                    SettingsItem::SecondsHand => {
                        self.set_seconds_hand_inner(!self.settings.seconds_hand, &mut fx)
                    }
                }
                let _ = fx.push(Effect::RedrawMenu);
            }
        }
        fx
    }

    /// Short press on the back button.
    pub fn back(&mut self) -> Effects {
        let mut fx = Effects::new();
        match self.mode {
            Mode::Watch => {
                let _ = fx.push(Effect::Exit);
            }
            Mode::CountPulses => self.set_mode(Mode::Watch, &mut fx),
            Mode::Settings => {
                self.settings_open = false;
                let _ = fx.push(Effect::PopSettingsScreen);
                self.set_mode(Mode::Watch, &mut fx);
            }
        }
        fx
    }

    /// The delay timer fired: notify and open the counting window.
    pub fn delay_elapsed(&mut self) -> Effects {
        let mut fx = Effects::new();
        if self.mode != Mode::CountPulses {
            return fx;
        }
        self.armed = Some(PulseTimer::Timeout);
        if self.settings.vibrate {
            let _ = fx.push(Effect::VibrateDouble);
        }
        let _ = fx.push(Effect::SetLight(true));
        let _ = fx.push(Effect::ArmTimeout(self.settings.timeout_secs));
        fx
    }

    /// The timeout timer fired: notify and fall back to the face.
    pub fn timeout_elapsed(&mut self) -> Effects {
        let mut fx = Effects::new();
        if self.mode != Mode::CountPulses {
            return fx;
        }
        self.armed = None;
        if self.settings.vibrate {
            let _ = fx.push(Effect::VibrateDouble);
        }
        self.set_mode(Mode::Watch, &mut fx);
        fx
    }

    /// One redraw tick elapsed.
    pub fn tick(&mut self) {
        if self.mode == Mode::CountPulses {
            self.pulse_seconds = self.pulse_seconds.wrapping_add(1);
        }
    }

    pub fn set_timeout(&mut self, secs: u16) -> Effects {
        let mut fx = Effects::new();
        self.set_timeout_inner(secs, &mut fx);
        fx
    }

    pub fn set_delay(&mut self, secs: u16) -> Effects {
        let mut fx = Effects::new();
        self.set_delay_inner(secs, &mut fx);
        fx
    }

    pub fn set_vibrate(&mut self, enabled: bool) -> Effects {
        let mut fx = Effects::new();
        self.set_vibrate_inner(enabled, &mut fx);
        fx
    }

    /// Also re-subscribes the tick source so the hand appears or
    /// disappears without waiting for the next transition.
    pub fn set_seconds_hand(&mut self, enabled: bool) -> Effects {
        let mut fx = Effects::new();
        self.set_seconds_hand_inner(enabled, &mut fx);
        fx
    }

    fn set_timeout_inner(&mut self, secs: u16, fx: &mut Effects) {
        self.settings.timeout_secs = secs;
        let _ = fx.push(Effect::PersistSetting(SettingsItem::CountTime));
    }

    fn set_delay_inner(&mut self, secs: u16, fx: &mut Effects) {
        self.settings.delay_secs = secs;
        let _ = fx.push(Effect::PersistSetting(SettingsItem::StartDelay));
    }

    fn set_vibrate_inner(&mut self, enabled: bool, fx: &mut Effects) {
        self.settings.vibrate = enabled;
        let _ = fx.push(Effect::PersistSetting(SettingsItem::Vibration));
    }

    fn set_seconds_hand_inner(&mut self, enabled: bool, fx: &mut Effects) {
        self.settings.seconds_hand = enabled;
        let _ = fx.push(Effect::PersistSetting(SettingsItem::SecondsHand));
        let _ = fx.push(Effect::SetTickRate(self.tick_rate()));
    }

    fn set_mode(&mut self, new: Mode, fx: &mut Effects) {
        // double-invocation guard: never stack a second settings screen
        if new == Mode::Settings && self.settings_open {
            let _ = fx.push(Effect::WarnSettingsOpen);
            return;
        }
        if new == self.mode {
            return;
        }
        let old = self.mode;
        self.mode = new;

        if old == Mode::CountPulses {
            // no timer from the previous counting session may outlive it
            self.armed = None;
            let _ = fx.push(Effect::CancelTimers);
            let _ = fx.push(Effect::SetLight(false));
        }

        let _ = fx.push(Effect::SetTickRate(self.tick_rate()));

        match new {
            Mode::Watch => {
                let _ = fx.push(Effect::ShowWatchface);
            }
            Mode::CountPulses => {
                // start the hand so it reaches the top of the dial the
                // moment the delay expires
                self.pulse_seconds = 60u16.saturating_sub(self.settings.delay_secs);
                self.armed = Some(PulseTimer::Delay);
                let _ = fx.push(Effect::ShowPulseScreen);
                let _ = fx.push(Effect::ArmDelay(self.settings.delay_secs));
            }
            Mode::Settings => {
                self.settings_open = true;
                let _ = fx.push(Effect::PushSettingsScreen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(fx: &Effects, wanted: Effect) -> bool {
        fx.iter().any(|e| *e == wanted)
    }

    #[test]
    fn starts_on_the_watch_face() {
        let app = WatchApp::new(Settings::default());
        assert_eq!(app.mode(), Mode::Watch);
        assert_eq!(app.tick_rate(), TickRate::Second);
        assert_eq!(app.armed_timer(), None);
        let fx = app.startup();
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Second)));
        assert!(contains(&fx, Effect::ShowWatchface));
    }

    #[test]
    fn select_enters_pulse_counting() {
        let mut app = WatchApp::new(Settings::default());
        let fx = app.select_short();
        assert_eq!(app.mode(), Mode::CountPulses);
        assert_eq!(app.pulse_seconds(), 55);
        assert_eq!(app.armed_timer(), Some(PulseTimer::Delay));
        assert!(contains(&fx, Effect::ShowPulseScreen));
        assert!(contains(&fx, Effect::ArmDelay(5)));
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Second)));
    }

    #[test]
    fn counter_accounts_for_a_long_delay() {
        let mut settings = Settings::default();
        settings.delay_secs = 10;
        let mut app = WatchApp::new(settings);
        app.select_short();
        assert_eq!(app.pulse_seconds(), 50);
    }

    #[test]
    fn delay_firing_lights_up_and_arms_the_timeout() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        let fx = app.delay_elapsed();
        assert_eq!(app.armed_timer(), Some(PulseTimer::Timeout));
        assert_eq!(
            fx.as_slice(),
            &[
                Effect::VibrateDouble,
                Effect::SetLight(true),
                Effect::ArmTimeout(30),
            ]
        );
    }

    #[test]
    fn timeout_firing_returns_to_the_face() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        app.delay_elapsed();
        let fx = app.timeout_elapsed();
        assert_eq!(app.mode(), Mode::Watch);
        assert_eq!(app.armed_timer(), None);
        assert!(contains(&fx, Effect::VibrateDouble));
        assert!(contains(&fx, Effect::CancelTimers));
        assert!(contains(&fx, Effect::SetLight(false)));
        assert!(contains(&fx, Effect::ShowWatchface));
    }

    #[test]
    fn back_press_cancels_a_live_timer() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        assert_eq!(app.armed_timer(), Some(PulseTimer::Delay));
        let fx = app.back();
        assert_eq!(app.mode(), Mode::Watch);
        assert_eq!(app.armed_timer(), None);
        assert!(contains(&fx, Effect::CancelTimers));
        assert!(contains(&fx, Effect::SetLight(false)));
    }

    #[test]
    fn select_press_also_leaves_pulse_counting() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        app.select_short();
        assert_eq!(app.mode(), Mode::Watch);
        assert_eq!(app.armed_timer(), None);
    }

    #[test]
    fn stale_timer_callbacks_are_ignored() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        app.back();
        assert!(app.delay_elapsed().is_empty());
        assert!(app.timeout_elapsed().is_empty());
    }

    #[test]
    fn quiet_mode_skips_the_vibration() {
        let mut app = WatchApp::new(Settings::default());
        app.set_vibrate(false);
        app.select_short();
        let fx = app.delay_elapsed();
        assert!(!contains(&fx, Effect::VibrateDouble));
    }

    #[test]
    fn back_on_the_face_exits() {
        let mut app = WatchApp::new(Settings::default());
        assert_eq!(app.back().as_slice(), &[Effect::Exit]);
    }

    #[test]
    fn long_select_opens_settings_once() {
        let mut app = WatchApp::new(Settings::default());
        let fx = app.select_long();
        assert_eq!(app.mode(), Mode::Settings);
        assert!(contains(&fx, Effect::PushSettingsScreen));

        // second request: one diagnostic, no state or screen change
        let fx = app.select_long();
        assert_eq!(fx.as_slice(), &[Effect::WarnSettingsOpen]);
        assert_eq!(app.mode(), Mode::Settings);
    }

    #[test]
    fn settings_can_interrupt_pulse_counting() {
        let mut app = WatchApp::new(Settings::default());
        app.select_short();
        let fx = app.select_long();
        assert_eq!(app.mode(), Mode::Settings);
        assert_eq!(app.armed_timer(), None);
        assert!(contains(&fx, Effect::CancelTimers));
        assert!(contains(&fx, Effect::SetLight(false)));
    }

    #[test]
    fn dismissing_settings_restores_the_face() {
        let mut app = WatchApp::new(Settings::default());
        app.select_long();
        let fx = app.back();
        assert_eq!(app.mode(), Mode::Watch);
        assert!(contains(&fx, Effect::PopSettingsScreen));
        assert!(contains(&fx, Effect::ShowWatchface));

        // the guard is rearmed for the next visit
        let fx = app.select_long();
        assert!(contains(&fx, Effect::PushSettingsScreen));
    }

    #[test]
    fn seconds_hand_toggle_flips_the_tick_rate() {
        let mut app = WatchApp::new(Settings::default());
        let fx = app.set_seconds_hand(false);
        assert_eq!(app.tick_rate(), TickRate::Minute);
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Minute)));
        assert!(contains(&fx, Effect::PersistSetting(SettingsItem::SecondsHand)));

        let fx = app.set_seconds_hand(true);
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Second)));
    }

    #[test]
    fn pulse_counting_forces_second_ticks() {
        let mut app = WatchApp::new(Settings::default());
        app.set_seconds_hand(false);
        let fx = app.select_short();
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Second)));
        let fx = app.back();
        assert!(contains(&fx, Effect::SetTickRate(TickRate::Minute)));
    }

    #[test]
    fn ticks_only_advance_the_counter_while_counting() {
        let mut app = WatchApp::new(Settings::default());
        app.tick();
        assert_eq!(app.pulse_seconds(), 0);
        app.select_short();
        app.tick();
        app.tick();
        assert_eq!(app.pulse_seconds(), 57);
    }

    #[test]
    fn menu_navigation_cycles_values_in_place() {
        let mut app = WatchApp::new(Settings::default());
        app.select_long();
        assert_eq!(app.menu_row(), SettingsItem::CountTime);

        let fx = app.select_long();
        assert_eq!(app.settings().timeout_secs, 60);
        assert!(contains(&fx, Effect::PersistSetting(SettingsItem::CountTime)));
        assert!(contains(&fx, Effect::RedrawMenu));

        let fx = app.select_short();
        assert_eq!(app.menu_row(), SettingsItem::StartDelay);
        assert_eq!(fx.as_slice(), &[Effect::RedrawMenu]);
    }
}
