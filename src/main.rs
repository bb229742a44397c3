#![no_std]
#![no_main]

mod app;
mod peripherals;
mod system;
mod ui;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use core::cell::RefCell;

use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pin, Pull},
    peripherals::{SPI2, TWISPI1},
    spim,
};
use embassy_sync::blocking_mutex::{raw::NoopRawMutex, Mutex};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => spim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use app::{App, AppEvent, EVENTS};
use peripherals::{
    button::{Button, Press},
    display::{BacklightPins, Brightness, Display},
    spi_flash::Flash,
    vibrator::Vibrator,
};
use system::{
    config::SystemConfig,
    store::SettingsStore,
    time::{TimeManager, TimeReference},
};

// Others
use chrono::NaiveDateTime;

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));
const TIMEZONE: i32 = 1 * 3_600;

static FLASH_BUS: StaticCell<Mutex<NoopRawMutex, RefCell<spim::Spim<'static, TWISPI1>>>> =
    StaticCell::new();

/// Polls both buttons every 10ms
#[embassy_executor::task(pool_size = 1)]
async fn poll_buttons(mut select: Button, mut back: Button) {
    loop {
        if let Some(press) = select.poll().await {
            EVENTS
                .send(match press {
                    Press::Short => AppEvent::SelectShort,
                    Press::Long => AppEvent::SelectLong,
                })
                .await;
        }
        // the back button does not distinguish hold lengths
        if back.poll().await.is_some() {
            EVENTS.send(AppEvent::Back).await;
        }

        // Re-schedule the timer interrupt in 10ms
        Timer::after(Duration::from_millis(10)).await;
    }
}

#[embassy_executor::task(pool_size = 1)]
async fn run_app(app: App) {
    app.run().await
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(SystemConfig::new());
    defmt::info!("Initializing");

    // Initialize backlight pins
    let backlight = BacklightPins::init(
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_22, Level::High, OutputDrive::Standard),
        Output::new(p.P0_23, Level::High, OutputDrive::Standard),
    );

    // Initialize SPI for the LCD
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let mut display = Display::init(
        spim,
        Output::new(p.P0_25, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
        backlight,
    );
    display.set_brightness(Brightness::LEVEL2);

    // Initialize SPI for the external flash
    let mut flash_config = spim::Config::default();
    flash_config.frequency = spim::Frequency::M8;
    let flash_spim = spim::Spim::new(p.TWISPI1, Irqs, p.P0_07, p.P0_09, p.P0_06, flash_config);
    let flash_bus = FLASH_BUS.init(Mutex::new(RefCell::new(flash_spim)));
    let mut flash = Flash::init(SpiDevice::new(
        flash_bus,
        Output::new(p.P0_05, Level::High, OutputDrive::Standard),
    ));
    defmt::debug!("flash id: {:x}", flash.read_id());

    // Load persisted settings, writing defaults back on first run
    let mut store = SettingsStore::load(flash);
    let settings = store.load_settings().await;
    defmt::info!("settings: {}", settings);

    // Initialize buttons
    let select = Button::init(
        Input::new(p.P0_13.degrade(), Pull::None),
        Some(Output::new(
            p.P0_15.degrade(),
            Level::Low,
            OutputDrive::Standard,
        )),
    );
    let back = Button::init(Input::new(p.P0_20.degrade(), Pull::Down), None);

    // Initialize vibration motor
    let vibrator = Vibrator::init(Output::new(p.P0_16, Level::High, OutputDrive::Standard));

    // Seed the wall clock from the compile time epoch
    let mut time = TimeManager::init();
    let boot = NaiveDateTime::from_timestamp_opt(UTC_EPOCH + TIMEZONE as i64, 0).unwrap();
    time.set_time(TimeReference::from_datetime(boot));

    defmt::info!("Initialization finished");

    // Schedule tasks
    let app = App::new(display, vibrator, store, time, settings);
    unwrap!(_spawner.spawn(poll_buttons(select, back)));
    unwrap!(_spawner.spawn(run_app(app)));
}
