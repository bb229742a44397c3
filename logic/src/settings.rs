//! Settings record and menu model

/// Pulse counting window length on first run, in seconds.
pub const TIMEOUT_DEFAULT: u16 = 30;
/// Delay before the counting window opens on first run, in seconds.
pub const DELAY_DEFAULT: u16 = 5;
/// Vibration notifications on first run.
pub const VIBRATE_DEFAULT: bool = true;
/// Second hand visibility on first run.
pub const SECONDS_HAND_DEFAULT: bool = true;

/// User preferences, persisted in external flash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// How long the pulse counting window stays open, in seconds
    pub timeout_secs: u16,
    /// Head start before the counting window opens, in seconds
    pub delay_secs: u16,
    /// Vibrate when the counting window opens and closes
    pub vibrate: bool,
    /// Show the second hand on the watch face
    pub seconds_hand: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: TIMEOUT_DEFAULT,
            delay_secs: DELAY_DEFAULT,
            vibrate: VIBRATE_DEFAULT,
            seconds_hand: SECONDS_HAND_DEFAULT,
        }
    }
}

/// Next counting window choice: 15 -> 30 -> 60 -> 15.
///
/// Out-of-range stored values fold back to the shortest choice.
pub fn next_timeout(secs: u16) -> u16 {
    match secs {
        15 => 30,
        30 => 60,
        _ => 15,
    }
}

/// Next start delay choice: 3 -> 5 -> 10 -> 3.
pub fn next_delay(secs: u16) -> u16 {
    match secs {
        3 => 5,
        5 => 10,
        _ => 3,
    }
}

/// The four settings menu rows, keyed by name rather than position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsItem {
    CountTime,
    StartDelay,
    Vibration,
    SecondsHand,
}

impl SettingsItem {
    /// Menu rows in display order.
    pub const ALL: [SettingsItem; 4] = [
        SettingsItem::CountTime,
        SettingsItem::StartDelay,
        SettingsItem::Vibration,
        SettingsItem::SecondsHand,
    ];

    /// Row title shown in the settings menu.
    pub fn title(self) -> &'static str {
        match self {
            SettingsItem::CountTime => "HB Count Time",
            SettingsItem::StartDelay => "Start Delay",
            SettingsItem::Vibration => "Vibration",
            SettingsItem::SecondsHand => "Seconds Hand",
        }
    }

    /// The row below this one, wrapping at the bottom.
    pub fn next(self) -> Self {
        match self {
            SettingsItem::CountTime => SettingsItem::StartDelay,
            SettingsItem::StartDelay => SettingsItem::Vibration,
            SettingsItem::Vibration => SettingsItem::SecondsHand,
            SettingsItem::SecondsHand => SettingsItem::CountTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_defaults() {
        let s = Settings::default();
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.delay_secs, 5);
        assert!(s.vibrate);
        assert!(s.seconds_hand);
    }

    #[test]
    fn timeout_cycles_through_choices() {
        assert_eq!(next_timeout(15), 30);
        assert_eq!(next_timeout(30), 60);
        assert_eq!(next_timeout(60), 15);
        // garbage from a stale store folds back to the shortest choice
        assert_eq!(next_timeout(0), 15);
    }

    #[test]
    fn delay_cycles_through_choices() {
        assert_eq!(next_delay(3), 5);
        assert_eq!(next_delay(5), 10);
        assert_eq!(next_delay(10), 3);
        assert_eq!(next_delay(77), 3);
    }

    #[test]
    fn menu_rows_wrap() {
        let mut row = SettingsItem::CountTime;
        for _ in 0..4 {
            row = row.next();
        }
        assert_eq!(row, SettingsItem::CountTime);
    }
}
