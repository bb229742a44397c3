//! Persistent settings storage
//!
//! Four keyed slots in the last sector of the external SPI NOR flash,
//! one per settings value. Each slot is eight bytes: a presence magic
//! followed by the value as a little-endian u32. NOR flash only clears
//! bits, so a write re-erases the sector and programs every slot back
//! from the in-memory copy.

use embassy_nrf::spim;
use pulsewatch_logic::settings::{
    DELAY_DEFAULT, SECONDS_HAND_DEFAULT, TIMEOUT_DEFAULT, VIBRATE_DEFAULT,
};
use pulsewatch_logic::{Settings, SettingsItem};

use crate::peripherals::spi_flash::Flash;

/// Last 4 KiB sector of the 4 MiB part
const SETTINGS_ADDR: u32 = 0x003F_F000;
/// Marks a slot as written ("PWS1")
const SLOT_MAGIC: u32 = 0x5057_5331;
const SLOT_LEN: usize = 8;
const SLOT_COUNT: usize = 4;

fn slot_index(key: SettingsItem) -> usize {
    match key {
        SettingsItem::CountTime => 0,
        SettingsItem::StartDelay => 1,
        SettingsItem::Vibration => 2,
        SettingsItem::SecondsHand => 3,
    }
}

pub struct SettingsStore<SPI>
where
    SPI: spim::Instance,
{
    flash: Flash<SPI>,
    /// In-memory copy of the sector, `None` = never written
    slots: [Option<u32>; SLOT_COUNT],
}

impl<SPI> SettingsStore<SPI>
where
    SPI: spim::Instance,
{
    /// Read the settings sector on boot
    pub fn load(mut flash: Flash<SPI>) -> Self {
        let mut buf = [0u8; SLOT_LEN * SLOT_COUNT];
        flash.read(SETTINGS_ADDR, &mut buf);

        let mut slots = [None; SLOT_COUNT];
        for (index, slot) in buf.chunks_exact(SLOT_LEN).enumerate() {
            let magic = u32::from_le_bytes(slot[..4].try_into().unwrap());
            if magic == SLOT_MAGIC {
                slots[index] = Some(u32::from_le_bytes(slot[4..].try_into().unwrap()));
            }
        }
        Self { flash, slots }
    }

    /// Whether a value was ever persisted under `key`
    pub fn exists(&self, key: SettingsItem) -> bool {
        self.slots[slot_index(key)].is_some()
    }

    pub fn read_u32(&self, key: SettingsItem) -> Option<u32> {
        self.slots[slot_index(key)]
    }

    pub fn read_bool(&self, key: SettingsItem) -> Option<bool> {
        self.read_u32(key).map(|value| value != 0)
    }

    pub async fn write_u32(&mut self, key: SettingsItem, value: u32) {
        self.slots[slot_index(key)] = Some(value);
        self.flush().await;
    }

    pub async fn write_bool(&mut self, key: SettingsItem, value: bool) {
        self.write_u32(key, value as u32).await;
    }

    /// Persist the current value of one settings field
    pub async fn persist(&mut self, key: SettingsItem, settings: &Settings) {
        let value = match key {
            SettingsItem::CountTime => settings.timeout_secs as u32,
            SettingsItem::StartDelay => settings.delay_secs as u32,
            SettingsItem::Vibration => settings.vibrate as u32,
            SettingsItem::SecondsHand => settings.seconds_hand as u32,
        };
        self.write_u32(key, value).await;
    }

    /// Load the settings record, substituting and writing back the
    /// documented default for every key missing from the store.
    pub async fn load_settings(&mut self) -> Settings {
        let mut settings = Settings::default();

        if !self.exists(SettingsItem::CountTime) {
            self.write_u32(SettingsItem::CountTime, TIMEOUT_DEFAULT as u32).await;
        } else if let Some(value) = self.read_u32(SettingsItem::CountTime) {
            settings.timeout_secs = value as u16;
        }

        if !self.exists(SettingsItem::StartDelay) {
            self.write_u32(SettingsItem::StartDelay, DELAY_DEFAULT as u32).await;
        } else if let Some(value) = self.read_u32(SettingsItem::StartDelay) {
            settings.delay_secs = value as u16;
        }

        if !self.exists(SettingsItem::Vibration) {
            self.write_bool(SettingsItem::Vibration, VIBRATE_DEFAULT).await;
        } else if let Some(value) = self.read_bool(SettingsItem::Vibration) {
            settings.vibrate = value;
        }

        if !self.exists(SettingsItem::SecondsHand) {
            self.write_bool(SettingsItem::SecondsHand, SECONDS_HAND_DEFAULT).await;
        } else if let Some(value) = self.read_bool(SettingsItem::SecondsHand) {
            settings.seconds_hand = value;
        }

        settings
    }

    /// Rewrite the whole sector from the in-memory slots
    async fn flush(&mut self) {
        self.flash.erase_sector(SETTINGS_ADDR).await;

        let mut buf = [0xffu8; SLOT_LEN * SLOT_COUNT];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(value) = slot {
                let offset = index * SLOT_LEN;
                buf[offset..offset + 4].copy_from_slice(&SLOT_MAGIC.to_le_bytes());
                buf[offset + 4..offset + 8].copy_from_slice(&value.to_le_bytes());
            }
        }
        self.flash.program_page(SETTINGS_ADDR, &buf).await;
    }
}
