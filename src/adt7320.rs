//! ADT7320 SPI temperature sensor, the thermocouple cold junction.

use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::error::{Error, Result};

const CMD_READ: u8 = 0x40;
const REG_TEMP: u8 = 0x00;
const REG_ID: u8 = 0x03;
const ID_ADT7320: u8 = 0xC3;

/// Degrees Celsius per LSB of the temperature register.
pub const LSB_CELSIUS: f32 = 1.0 / 128.0;

/// Command byte for reading `register`.
pub const fn read_command(register: u8) -> u8 {
    CMD_READ | ((register & 0x07) << 3)
}

/// Convert the big-endian temperature register to Celsius.
pub fn decode(raw: [u8; 2]) -> f32 {
    // two's complement, 1/128 degree per count
    i16::from_be_bytes(raw) as f32 / 128.0
}

pub struct Adt7320<SPI> {
    spi: SPI,
}

impl<SPI> Adt7320<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<()> {
        let command = [read_command(register)];
        self.spi
            .transaction(&mut [Operation::Write(&command), Operation::Read(buf)])
            .await
            .map_err(Error::spi)
    }

    pub async fn read_temperature(&mut self) -> Result<f32> {
        let mut raw = [0u8; 2];
        self.read(REG_TEMP, &mut raw).await?;
        let temperature = decode(raw);
        info!("ADT7320 Temperature: {} C", temperature);
        Ok(temperature)
    }

    pub async fn read_id(&mut self) -> Result<u8> {
        let mut id = [0u8; 1];
        self.read(REG_ID, &mut id).await?;
        Ok(id[0])
    }

    /// An unplugged sensor reads back 0x00 or 0xFF here.
    pub async fn check_id(&mut self) -> Result<()> {
        let found = self.read_id().await?;
        if found != ID_ADT7320 {
            return Err(Error::UnexpectedId {
                expected: ID_ADT7320,
                found,
            });
        }
        Ok(())
    }
}
