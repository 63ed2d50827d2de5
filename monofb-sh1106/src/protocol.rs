//! SH1106 command protocol
//!
//! The bring-up script and the page addressing triplet. Command order in
//! the script is load-bearing: the charge pump must be configured before
//! `DISPLAY_ON`, and the addressing mode must be fixed before any page
//! write.

use embedded_hal_async::i2c::I2c;
use monofb_core::HEIGHT;

use crate::bus::{Transport, TransportError};
use crate::driver::Config;

/// SH1106 command bytes
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_ADDRESS_MODE: u8 = 0x20;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
}

/// Number of bytes in the bring-up script
pub const INIT_SCRIPT_LEN: usize = 25;

/// Build the bring-up script for `config`.
pub fn init_script(config: &Config) -> [u8; INIT_SCRIPT_LEN] {
    [
        cmd::DISPLAY_OFF,
        cmd::SET_CLOCK_DIV,
        0x80, // suggested ratio
        cmd::SET_MUX_RATIO,
        (HEIGHT - 1) as u8,
        cmd::SET_DISPLAY_OFFSET,
        0x00,
        cmd::SET_START_LINE | 0x00,
        cmd::SET_CHARGE_PUMP,
        0x14, // enable charge pump
        cmd::SET_ADDRESS_MODE,
        0x00, // horizontal
        cmd::SET_SEG_REMAP,
        cmd::SET_COM_SCAN_DEC,
        cmd::SET_COM_PINS,
        0x12, // alternative COM config
        cmd::SET_CONTRAST,
        config.contrast,
        cmd::SET_PRECHARGE,
        0xF1,
        cmd::SET_VCOM_DETECT,
        0x40,
        cmd::RESUME_FROM_RAM,
        cmd::SET_NORMAL,
        cmd::DISPLAY_ON,
    ]
}

/// Run the bring-up script, best effort.
///
/// A failed command is logged by the transport and skipped: a transient
/// bus glitch during bring-up leaves a degraded display rather than none.
pub async fn run_init_script<BUS: I2c>(bus: &mut Transport<BUS>, config: &Config) {
    for &byte in init_script(config).iter() {
        let _ = bus.send_command(byte).await;
    }
}

/// Address `page` at the configured start column, ahead of its payload.
pub async fn set_page_cursor<BUS: I2c>(
    bus: &mut Transport<BUS>,
    config: &Config,
    page: u8,
) -> Result<(), TransportError<BUS::Error>> {
    bus.send_command(cmd::SET_PAGE_ADDR | page).await?;
    bus.send_command(cmd::SET_LOW_COLUMN | (config.column_start & 0x0F))
        .await?;
    bus.send_command(cmd::SET_HIGH_COLUMN | (config.column_start >> 4))
        .await?;
    Ok(())
}
