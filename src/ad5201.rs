//! AD5201 digital potentiometer, used as the ADC reference divider.
//!
//! Write-only: one byte per chip-select frame, no readback.

use embedded_hal_async::spi::SpiDevice;

use crate::error::{Error, Result};

/// Saturate `value` into the wiper range.
pub fn clamp(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

pub struct Ad5201<SPI> {
    spi: SPI,
}

impl<SPI> Ad5201<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    /// Move the wiper. Out of range values saturate to 0 or 255; the byte
    /// actually sent is returned.
    pub async fn set_value(&mut self, value: i32) -> Result<u8> {
        let wiper = clamp(value);
        if i32::from(wiper) != value {
            debug!("AD5201 value {} saturated to {}", value, wiper);
        }
        self.spi.write(&[wiper]).await.map_err(Error::spi)?;
        info!("AD5201 value set to {}.", wiper);
        Ok(wiper)
    }
}
