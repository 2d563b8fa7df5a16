use embedded_hal::{digital, i2c, spi};

/// Which bus a transaction failed on, with the HAL's error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault {
    Spi(spi::ErrorKind),
    I2c(i2c::ErrorKind),
    Pin(digital::ErrorKind),
}

/// Everything that can go wrong talking to the rig.
///
/// Nothing here is retried. A `BusTransaction` from the main loop is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The underlying SPI/I2C transfer or GPIO write failed.
    #[error("bus transaction failed: {0:?}")]
    BusTransaction(BusFault),
    /// A relay state sequence did not match the number of relay lines.
    #[error("expected {expected} relay states, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    /// An AD7193 configuration word failed bit-field validation.
    #[error("invalid AD7193 configuration word: {0:?}")]
    InvalidConfiguration(ConfigError),
    /// A value does not fit the register it is written to.
    #[error("value {value:#x} does not fit in {bits} bits")]
    ValueOutOfRange { value: u32, bits: u8 },
    /// The ADC never reported data ready within the poll budget.
    #[error("AD7193 conversion not ready after {polls} status polls")]
    NotReady { polls: u16 },
    /// A device answered with the wrong ID, most likely absent or miswired.
    #[error("unexpected device id {found:#x}, expected {expected:#x}")]
    UnexpectedId { expected: u8, found: u8 },
}

/// Reasons a 24-bit AD7193 configuration word is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bits above bit 23 are set.
    TooWide,
    /// One of the must-be-zero bits (22, 21, 19) is set.
    ReservedBits,
    /// No input channel is enabled.
    NoChannel,
    /// Gain code 0b001 or 0b010, both reserved.
    ReservedGain,
}

impl Error {
    pub fn spi<E: spi::Error>(e: E) -> Self {
        Self::BusTransaction(BusFault::Spi(e.kind()))
    }

    pub fn i2c<E: i2c::Error>(e: E) -> Self {
        Self::BusTransaction(BusFault::I2c(e.kind()))
    }

    pub fn pin<E: digital::Error>(e: E) -> Self {
        Self::BusTransaction(BusFault::Pin(e.kind()))
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfiguration(e)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
