//! Rig configuration, built once at start-up and handed to the constructors.
//!
//! Pin assignments (Pico W, wired in `main.rs`). GPIO 25 is the wireless
//! chip select on the W, so the heartbeat LED sits on an external pin.
//!
//! | signal              | GPIO |
//! |---------------------|------|
//! | SPI0 SCK            | 18   |
//! | SPI0 MOSI           | 19   |
//! | SPI0 MISO           | 16   |
//! | CS AD7193 + AD5201  | 12   |
//! | CS ADT7320          | 17   |
//! | I2C0 SDA            | 4    |
//! | I2C0 SCL            | 5    |
//! | Relays              | 7, 8, 9 |
//! | Heartbeat LED       | 15   |
//!
//! The AD5201 shares the AD7193 chip select through the ADC's DOUT line, so
//! the two are only ever addressed one after the other.

use embedded_hal::spi::{Mode, MODE_0};

use crate::ad7193::{ChannelConfig, ReadyPoll};

pub const RELAY_COUNT: usize = 3;
pub const THERMOCOUPLE_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiSettings {
    pub frequency: u32,
    pub mode: Mode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cAddresses {
    /// MCP4725 DAC for the analogue heater.
    pub dac: u8,
    /// NavKey joypad.
    pub navkey: u8,
    /// Character LCD backpack.
    pub lcd: u8,
}

/// Pauses, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// After each thermocouple read.
    pub settle_ms: u32,
    /// After the heartbeat toggle.
    pub heartbeat_ms: u32,
    /// Hold time for each relay pattern.
    pub relay_hold_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub spi: SpiSettings,
    pub i2c_frequency: u32,
    pub i2c: I2cAddresses,
    /// AD5201 wiper position setting the ADC reference.
    pub reference: i32,
    /// AD7193 configuration words, one per thermocouple.
    pub thermocouples: [u32; THERMOCOUPLE_COUNT],
    /// First relay pattern of each cycle; the second is its complement.
    pub relay_pattern: [bool; RELAY_COUNT],
    pub timing: Timing,
    /// Off by default: with the rig's read command every register read is
    /// `0x38`, so a status poll would see the first data byte, not /RDY.
    pub adc_ready: ReadyPoll,
}

impl Config {
    pub fn relay_complement(&self) -> [bool; RELAY_COUNT] {
        self.relay_pattern.map(|on| !on)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi: SpiSettings {
                frequency: 1_000_000,
                mode: MODE_0,
            },
            i2c_frequency: 100_000,
            i2c: I2cAddresses {
                dac: 0x62,
                navkey: 0x10,
                lcd: 0x27,
            },
            reference: 128,
            thermocouples: [
                ChannelConfig::AIN1_AIN2,
                ChannelConfig::AIN3_AIN4,
                ChannelConfig::AIN5_AIN6,
            ],
            relay_pattern: [true, false, true],
            timing: Timing {
                settle_ms: 1_000,
                heartbeat_ms: 500,
                relay_hold_ms: 2_000,
            },
            adc_ready: ReadyPoll::DISABLED,
        }
    }
}
