//! MCP4725 12-bit I2C DAC driving the analogue heater, plus I2C bring-up.

use embedded_hal_async::i2c::I2c;
use heapless::Vec;

use crate::config::I2cAddresses;
use crate::error::{Error, Result};

/// Write DAC register, EEPROM untouched.
const CMD_WRITE_DAC: u8 = 0x40;
pub const MID_SCALE: u16 = 0x800;
const MAX_CODE: u16 = 0xFFF;

/// 7-bit addresses outside the reserved blocks.
const SCAN_FIRST: u8 = 0x08;
const SCAN_LAST: u8 = 0x77;

pub type ScanResult = Vec<u8, 16>;

/// Frame for a DAC register write of `code`.
pub fn dac_frame(code: u16) -> Result<[u8; 3]> {
    if code > MAX_CODE {
        return Err(Error::ValueOutOfRange {
            value: u32::from(code),
            bits: 12,
        });
    }
    Ok([CMD_WRITE_DAC, (code >> 4) as u8, ((code & 0x0F) << 4) as u8])
}

pub struct Mcp4725<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Mcp4725<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub async fn set_raw(&mut self, code: u16) -> Result<()> {
        let frame = dac_frame(code)?;
        self.i2c.write(self.address, &frame).await.map_err(Error::i2c)
    }

    pub async fn set_mid_scale(&mut self) -> Result<()> {
        self.set_raw(MID_SCALE).await?;
        info!("MCP4725 DAC initialized.");
        Ok(())
    }
}

/// Probe every address with a one byte read; anything that ACKs is present.
pub async fn scan<I2C: I2c>(i2c: &mut I2C) -> ScanResult {
    let mut found = ScanResult::new();
    let mut probe = [0u8; 1];
    for address in SCAN_FIRST..=SCAN_LAST {
        if i2c.read(address, &mut probe).await.is_ok() && found.push(address).is_err() {
            warn!("I2C scan list full, stopping at {:#x}", address);
            break;
        }
    }
    found
}

/// Scan the bus, log what answered, and park the heater DAC at mid-scale if
/// it is fitted.
pub async fn init_i2c<I2C: I2c>(i2c: &mut I2C, addresses: &I2cAddresses) -> Result<ScanResult> {
    let devices = scan(i2c).await;
    if devices.is_empty() {
        info!("No I2C devices found.");
    } else {
        info!("I2C devices found: {:?}", devices.as_slice());
    }

    for (name, address) in [("NavKey", addresses.navkey), ("LCD", addresses.lcd)] {
        if devices.contains(&address) {
            info!("{} found at {:#x}", name, address);
        } else {
            warn!("{} not found at {:#x}", name, address);
        }
    }

    if devices.contains(&addresses.dac) {
        Mcp4725::new(&mut *i2c, addresses.dac).set_mid_scale().await?;
    } else {
        warn!("MCP4725 DAC not found at {:#x}", addresses.dac);
    }
    Ok(devices)
}
