//! SPI flash module
//!
//! Raw access to the external XT25F32B NOR flash holding the persisted
//! settings. Only the handful of instructions the settings store needs
//! are implemented.

use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice as EmbassySpiDevice;
use embassy_nrf::{
    gpio::Output,
    peripherals::P0_05,
    spim::{self, Spim},
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Timer;
use embedded_hal::spi::{Operation, SpiDevice};

const CMD_PAGE_PROGRAM: u8 = 0x02;
const CMD_READ: u8 = 0x03;
const CMD_READ_STATUS: u8 = 0x05;
const CMD_WRITE_ENABLE: u8 = 0x06;
const CMD_SECTOR_ERASE: u8 = 0x20;
const CMD_POWER_DOWN: u8 = 0xb9;
const CMD_RELEASE_POWER_DOWN: u8 = 0xab;

/// Write-in-progress bit of the status register
const STATUS_WIP: u8 = 0x01;

/// Smallest erasable unit
pub const SECTOR_SIZE: u32 = 4096;
/// Largest programmable unit
pub const PAGE_SIZE: usize = 256;

struct FlashConfig<SPI>
where
    SPI: spim::Instance,
{
    /// Flash SPI interface
    interface: EmbassySpiDevice<'static, NoopRawMutex, Spim<'static, SPI>, Output<'static, P0_05>>,
}

pub struct Flash<SPI>
where
    SPI: spim::Instance,
{
    /// Flash configuration
    config: FlashConfig<SPI>,
}

impl<SPI> Flash<SPI>
where
    SPI: spim::Instance,
{
    /// Configure flash settings on boot
    pub fn init(
        spi: EmbassySpiDevice<'static, NoopRawMutex, Spim<'static, SPI>, Output<'static, P0_05>>,
    ) -> Self {
        Self {
            config: FlashConfig { interface: spi },
        }
    }

    /// Read device ID
    pub fn read_id(&mut self) -> u8 {
        let buf: &mut [u8] = &mut [CMD_RELEASE_POWER_DOWN, 0x00, 0x00, 0x00, 0x00];
        // Shift instruction code `ABH` followed by 3 dummy bytes, then
        // clock the ID out
        self.config.interface.transfer_in_place(buf).unwrap();
        buf[4]
    }

    /// Read `buf.len()` bytes starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) {
        let cmd = [
            CMD_READ,
            (addr >> 16) as u8,
            (addr >> 8) as u8,
            addr as u8,
        ];
        self.config
            .interface
            .transaction(&mut [Operation::Write(&cmd), Operation::Read(buf)])
            .unwrap();
    }

    /// Erase the 4 KiB sector containing `addr`
    pub async fn erase_sector(&mut self, addr: u32) {
        let addr = addr & !(SECTOR_SIZE - 1);
        self.write_enable();
        let cmd = [
            CMD_SECTOR_ERASE,
            (addr >> 16) as u8,
            (addr >> 8) as u8,
            addr as u8,
        ];
        self.config.interface.write(&cmd).unwrap();
        self.wait_idle().await;
    }

    /// Program up to one page starting at `addr`
    ///
    /// The caller keeps the data within a single 256 byte page; the
    /// device wraps around inside the page otherwise.
    pub async fn program_page(&mut self, addr: u32, data: &[u8]) {
        debug_assert!(data.len() <= PAGE_SIZE);
        self.write_enable();
        let cmd = [
            CMD_PAGE_PROGRAM,
            (addr >> 16) as u8,
            (addr >> 8) as u8,
            addr as u8,
        ];
        self.config
            .interface
            .transaction(&mut [Operation::Write(&cmd), Operation::Write(data)])
            .unwrap();
        self.wait_idle().await;
    }

    /// Enable deep power down state
    #[allow(unused)]
    pub async fn power_down(&mut self) {
        self.config.interface.write(&[CMD_POWER_DOWN]).unwrap();
        Timer::after_nanos(100).await;
    }

    /// Wake from deep power down state
    #[allow(unused)]
    pub async fn wake(&mut self) {
        self.config
            .interface
            .write(&[CMD_RELEASE_POWER_DOWN])
            .unwrap();
        Timer::after_micros(20).await;
    }

    fn write_enable(&mut self) {
        self.config.interface.write(&[CMD_WRITE_ENABLE]).unwrap();
    }

    /// Poll the status register until the part goes idle
    async fn wait_idle(&mut self) {
        loop {
            let buf: &mut [u8] = &mut [CMD_READ_STATUS, 0x00];
            self.config.interface.transfer_in_place(buf).unwrap();
            if buf[1] & STATUS_WIP == 0 {
                break;
            }
            Timer::after_millis(1).await;
        }
    }
}
