//! Owns the rig's bus handles and sequences every device access.
//!
//! The AD7193 and AD5201 hang off the same chip select, so the manager keeps
//! one `SpiDevice` for both and lends it to whichever driver is needed. The
//! borrow ends before the other driver can take it, which is exactly the
//! one-at-a-time rule the wiring demands.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

use crate::ad5201::Ad5201;
use crate::ad7193::{Ad7193, ChannelConfig, ConversionResult, Status};
use crate::adt7320::Adt7320;
use crate::config::{Config, RELAY_COUNT, THERMOCOUPLE_COUNT};
use crate::error::Result;
use crate::relay::Relays;

/// Outcome of probing each SPI device, without aborting on failure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub adc: Result<Status>,
    pub thermometer: Result<f32>,
}

impl Health {
    pub fn is_ok(&self) -> bool {
        self.adc.is_ok() && self.thermometer.is_ok()
    }
}

pub struct DeviceManager<CONV, THERMO, RELAY, D> {
    /// Shared by the AD7193 and the AD5201.
    converter: CONV,
    thermometer: Adt7320<THERMO>,
    relays: Relays<RELAY, RELAY_COUNT>,
    delay: D,
    config: Config,
}

impl<CONV, THERMO, RELAY, D> DeviceManager<CONV, THERMO, RELAY, D>
where
    CONV: SpiDevice,
    THERMO: SpiDevice,
    RELAY: OutputPin,
    D: DelayNs,
{
    pub fn new(converter: CONV, thermometer: THERMO, relays: Relays<RELAY, RELAY_COUNT>, delay: D, config: Config) -> Self {
        Self {
            converter,
            thermometer: Adt7320::new(thermometer),
            relays,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relays(&self) -> &Relays<RELAY, RELAY_COUNT> {
        &self.relays
    }

    fn adc(&mut self) -> Ad7193<&mut CONV> {
        Ad7193::with_ready_poll(&mut self.converter, self.config.adc_ready)
    }

    fn potentiometer(&mut self) -> Ad5201<&mut CONV> {
        Ad5201::new(&mut self.converter)
    }

    /// Continuous conversion on the ADC, then the reference wiper.
    pub async fn initialize_devices(&mut self, reference: i32) -> Result<()> {
        self.adc().init().await?;
        self.potentiometer().set_value(reference).await?;
        info!("Devices initialized.");
        Ok(())
    }

    /// Select each thermocouple pair in turn and read one conversion from it,
    /// settling after every read.
    pub async fn read_thermocouples(&mut self) -> Result<[ConversionResult; THERMOCOUPLE_COUNT]> {
        let words = self.config.thermocouples;
        let settle_ms = self.config.timing.settle_ms;
        let poll = self.config.adc_ready;

        // validate every word before touching the bus
        let mut configs = [ChannelConfig::from_bits(words[0])?; THERMOCOUPLE_COUNT];
        for (config, &word) in configs.iter_mut().zip(words.iter()).skip(1) {
            *config = ChannelConfig::from_bits(word)?;
        }

        let mut results = configs.map(|config| ConversionResult { config, code: 0 });
        for result in results.iter_mut() {
            let mut adc = Ad7193::with_ready_poll(&mut self.converter, poll);
            adc.select_channel_pair(result.config).await?;
            result.code = adc.read_data(&mut self.delay).await?;
            info!("Thermocouple Channel Data: {}", result.code);
            self.delay.delay_ms(settle_ms).await;
        }
        Ok(results)
    }

    /// Cold-junction temperature in Celsius.
    pub async fn read_temperature(&mut self) -> Result<f32> {
        self.thermometer.read_temperature().await
    }

    pub fn control_relays(&mut self, states: &[bool]) -> Result<()> {
        self.relays.apply(states)
    }

    /// Check both SPI devices answer with their IDs.
    pub async fn health(&mut self) -> Health {
        let adc = {
            let mut adc = self.adc();
            match adc.check_id().await {
                Ok(()) => adc.status().await,
                Err(e) => Err(e),
            }
        };
        let thermometer = match self.thermometer.check_id().await {
            Ok(()) => self.thermometer.read_temperature().await,
            Err(e) => Err(e),
        };
        if let Err(e) = adc {
            warn!("AD7193 health check failed: {:?}", e);
        }
        if let Err(e) = thermometer {
            warn!("ADT7320 health check failed: {:?}", e);
        }
        Health { adc, thermometer }
    }

    pub async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    pub fn release(self) -> (CONV, THERMO, Relays<RELAY, RELAY_COUNT>, D) {
        (self.converter, self.thermometer.release(), self.relays, self.delay)
    }
}
