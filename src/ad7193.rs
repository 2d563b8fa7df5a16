//! AD7193 4.8 kHz, 24-bit sigma-delta ADC.
//!
//! Every access is one chip-select framed transaction: a command byte naming
//! the register, then the register contents most significant byte first. The
//! driver keeps no shadow of what it has written; after [`Ad7193::init`] the
//! part free-runs conversions on whichever channel was selected last.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{Operation, SpiDevice};

use crate::error::{ConfigError, Error, Result};

/// Continuous conversion mode, default filter word.
pub const MODE_CONTINUOUS: u32 = 0x06_0000;

/// ID register value is `0xX2`.
const ID_MASK: u8 = 0x0F;
const ID_AD7193: u8 = 0x02;

/// On-chip registers, addressed through the communications register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Status,
    Mode,
    Configuration,
    Data,
    Id,
    /// General purpose output control.
    Gpocon,
    Offset,
    FullScale,
}

impl Register {
    pub const fn address(self) -> u8 {
        match self {
            Self::Status => 0x00,
            Self::Mode => 0x01,
            Self::Configuration => 0x02,
            Self::Data => 0x03,
            Self::Id => 0x04,
            Self::Gpocon => 0x05,
            Self::Offset => 0x06,
            Self::FullScale => 0x07,
        }
    }

    /// Register width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::Status | Self::Id | Self::Gpocon => 1,
            Self::Mode | Self::Configuration | Self::Data | Self::Offset | Self::FullScale => 3,
        }
    }
}

/// Command byte that precedes a register write.
pub const fn write_command(address: u8) -> u8 {
    0x10 | ((address & 0x07) << 3)
}

/// Command byte that precedes a register read.
///
/// Bits 5:3 of `0x38` are already set, so every address yields `0x38`: on
/// the wire a status, ID or data read is the same one byte command and the
/// part answers with whatever register it decodes from it.
pub const fn read_command(address: u8) -> u8 {
    0x38 | ((address & 0x07) << 3)
}

/// PGA gain, bits 2:0 of the configuration register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1,
    X8,
    X16,
    X32,
    X64,
    X128,
}

impl Gain {
    const fn code(self) -> u32 {
        match self {
            Self::X1 => 0b000,
            Self::X8 => 0b011,
            Self::X16 => 0b100,
            Self::X32 => 0b101,
            Self::X64 => 0b110,
            Self::X128 => 0b111,
        }
    }

    const fn from_code(code: u32) -> Option<Self> {
        match code {
            0b000 => Some(Self::X1),
            0b011 => Some(Self::X8),
            0b100 => Some(Self::X16),
            0b101 => Some(Self::X32),
            0b110 => Some(Self::X64),
            0b111 => Some(Self::X128),
            _ => None,
        }
    }

    pub const fn factor(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X8 => 8,
            Self::X16 => 16,
            Self::X32 => 32,
            Self::X64 => 64,
            Self::X128 => 128,
        }
    }
}

/// A validated 24-bit configuration register word.
///
/// Layout: bit 23 chop, bits 22/21/19 reserved (zero), bit 20 reference
/// select, bit 18 pseudo-differential, bits 17:8 channel enables CH9..CH0,
/// bit 7 burnout currents, bit 6 reference detect, bit 4 buffer, bit 3
/// unipolar, bits 2:0 gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig(u32);

impl ChannelConfig {
    const RESERVED: u32 = (1 << 22) | (1 << 21) | (1 << 19);
    const CHANNEL_SHIFT: u32 = 8;
    const CHANNEL_MASK: u32 = 0x3FF << Self::CHANNEL_SHIFT;
    const UNIPOLAR: u32 = 1 << 3;
    const GAIN_MASK: u32 = 0b111;
    /// Chop on, buffered, unipolar, bit 5 set as the rig has always run it.
    const THERMOCOUPLE_FLAGS: u32 = 0x80_0038;
    /// CH0..CH3 are the fully differential pairs; CH4 and up are
    /// pseudo-differential, the temperature sensor and the short.
    const LAST_PAIR: u8 = 3;

    /// AIN1-AIN2 at gain 8, thermocouple 1.
    pub const AIN1_AIN2: u32 = 0x80_013B;
    /// AIN3-AIN4 at gain 8, thermocouple 2.
    pub const AIN3_AIN4: u32 = 0x80_023B;
    /// AIN5-AIN6 at gain 8, thermocouple 3.
    pub const AIN5_AIN6: u32 = 0x80_043B;

    pub fn from_bits(bits: u32) -> core::result::Result<Self, ConfigError> {
        if bits > 0xFF_FFFF {
            return Err(ConfigError::TooWide);
        }
        if bits & Self::RESERVED != 0 {
            return Err(ConfigError::ReservedBits);
        }
        if bits & Self::CHANNEL_MASK == 0 {
            return Err(ConfigError::NoChannel);
        }
        if Gain::from_code(bits & Self::GAIN_MASK).is_none() {
            return Err(ConfigError::ReservedGain);
        }
        Ok(Self(bits))
    }

    /// Differential pair `pair` (0 = AIN1-AIN2 .. 3 = AIN7-AIN8) with the
    /// flags used for thermocouple inputs.
    pub fn thermocouple(pair: u8, gain: Gain) -> core::result::Result<Self, ConfigError> {
        if pair > Self::LAST_PAIR {
            return Err(ConfigError::NoChannel);
        }
        Self::from_bits(Self::THERMOCOUPLE_FLAGS | (1 << (Self::CHANNEL_SHIFT + pair as u32)) | gain.code())
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Enabled channels, bit n = CHn.
    pub const fn channels(self) -> u16 {
        ((self.0 & Self::CHANNEL_MASK) >> Self::CHANNEL_SHIFT) as u16
    }

    pub fn gain(self) -> Gain {
        // from_bits guarantees a valid code
        Gain::from_code(self.0 & Self::GAIN_MASK).unwrap_or(Gain::X1)
    }

    pub const fn is_unipolar(self) -> bool {
        self.0 & Self::UNIPOLAR != 0
    }
}

impl TryFrom<u32> for ChannelConfig {
    type Error = ConfigError;

    fn try_from(bits: u32) -> core::result::Result<Self, ConfigError> {
        Self::from_bits(bits)
    }
}

/// A data register code together with the configuration it was read under.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionResult {
    pub config: ChannelConfig,
    pub code: u32,
}

impl ConversionResult {
    /// Input voltage in millivolts for a reference of `vref_mv`.
    pub fn millivolts(&self, vref_mv: f32) -> f32 {
        let gain = self.config.gain().factor() as f32;
        if self.config.is_unipolar() {
            self.code as f32 * vref_mv / (16_777_216.0 * gain)
        } else {
            (self.code as f32 - 8_388_608.0) * vref_mv / (8_388_608.0 * gain)
        }
    }
}

/// Decoded status register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    /// /RDY is low once a fresh conversion sits in the data register.
    pub const fn ready(self) -> bool {
        self.0 & 0x80 == 0
    }

    pub const fn error(self) -> bool {
        self.0 & 0x40 != 0
    }

    pub const fn no_reference(self) -> bool {
        self.0 & 0x20 != 0
    }

    pub const fn parity(self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Channel the last conversion came from.
    pub const fn channel(self) -> u8 {
        self.0 & 0x0F
    }
}

/// How long to wait for /RDY before giving up on a data read.
///
/// Zero attempts turns the poll off and [`Ad7193::read_data`] reads the data
/// register straight away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadyPoll {
    pub attempts: u16,
    pub interval_us: u32,
}

impl ReadyPoll {
    pub const DISABLED: Self = Self {
        attempts: 0,
        interval_us: 0,
    };

    pub const fn is_enabled(self) -> bool {
        self.attempts > 0
    }
}

impl Default for ReadyPoll {
    fn default() -> Self {
        // sinc4 at the default filter word settles in well under 200 ms
        Self {
            attempts: 200,
            interval_us: 1_000,
        }
    }
}

pub struct Ad7193<SPI> {
    spi: SPI,
    poll: ReadyPoll,
}

impl<SPI> Ad7193<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self::with_ready_poll(spi, ReadyPoll::default())
    }

    pub fn with_ready_poll(spi: SPI, poll: ReadyPoll) -> Self {
        Self { spi, poll }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    /// Write `value` to `register`, MSB first, using the register's width.
    pub async fn write_register(&mut self, register: Register, value: u32) -> Result<()> {
        let width = register.width();
        let bits = (width * 8) as u8;
        if value >> bits != 0 {
            return Err(Error::ValueOutOfRange { value, bits });
        }
        let mut frame = [0u8; 4];
        frame[0] = write_command(register.address());
        let be = value.to_be_bytes();
        frame[1..=width].copy_from_slice(&be[4 - width..]);
        self.spi.write(&frame[..=width]).await.map_err(Error::spi)
    }

    /// Read `buf.len()` bytes from `register`.
    pub async fn read_register(&mut self, register: Register, buf: &mut [u8]) -> Result<()> {
        let command = [read_command(register.address())];
        self.spi
            .transaction(&mut [Operation::Write(&command), Operation::Read(buf)])
            .await
            .map_err(Error::spi)
    }

    /// Read a whole register and assemble it big-endian.
    pub async fn read_register_value(&mut self, register: Register) -> Result<u32> {
        let mut buf = [0u8; 3];
        let width = register.width();
        self.read_register(register, &mut buf[..width]).await?;
        Ok(buf[..width].iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }

    /// Put the converter into continuous conversion mode.
    pub async fn init(&mut self) -> Result<()> {
        self.write_register(Register::Mode, MODE_CONTINUOUS).await?;
        info!("AD7193 initialized in Continuous Conversion Mode.");
        Ok(())
    }

    /// Route the modulator to the channel pair and gain in `config`.
    pub async fn select_channel_pair(&mut self, config: ChannelConfig) -> Result<()> {
        self.write_register(Register::Configuration, config.bits()).await?;
        info!("AD7193 channel pair set with config: {:#x}", config.bits());
        Ok(())
    }

    pub async fn status(&mut self) -> Result<Status> {
        let mut buf = [0u8; 1];
        self.read_register(Register::Status, &mut buf).await?;
        Ok(Status(buf[0]))
    }

    pub async fn read_id(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_register(Register::Id, &mut buf).await?;
        Ok(buf[0])
    }

    /// Confirm an AD7193 is on the other end of the chip select.
    pub async fn check_id(&mut self) -> Result<()> {
        let id = self.read_id().await?;
        if id & ID_MASK != ID_AD7193 {
            return Err(Error::UnexpectedId {
                expected: ID_AD7193,
                found: id,
            });
        }
        Ok(())
    }

    /// Poll the status register until /RDY goes low.
    pub async fn wait_ready<D: DelayNs>(&mut self, delay: &mut D) -> Result<Status> {
        for attempt in 0..self.poll.attempts {
            let status = self.status().await?;
            if status.ready() {
                if status.error() {
                    warn!("AD7193 status reports error: {:#x}", status.0);
                }
                return Ok(status);
            }
            trace!("AD7193 not ready, poll {}", attempt);
            delay.delay_us(self.poll.interval_us).await;
        }
        Err(Error::NotReady {
            polls: self.poll.attempts,
        })
    }

    /// Wait for a fresh conversion, then read it. With the poll disabled this
    /// is [`Ad7193::read_data_unchecked`].
    pub async fn read_data<D: DelayNs>(&mut self, delay: &mut D) -> Result<u32> {
        if self.poll.is_enabled() {
            self.wait_ready(delay).await?;
        }
        self.read_data_unchecked().await
    }

    /// Read the data register without checking /RDY; the value may be stale.
    pub async fn read_data_unchecked(&mut self) -> Result<u32> {
        let result = self.read_register_value(Register::Data).await?;
        info!("AD7193 Data: {}", result);
        Ok(result)
    }
}
