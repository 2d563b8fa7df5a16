//! Main control loop: one state, running, until a bus transaction fails.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

use crate::ad7193::ConversionResult;
use crate::config::THERMOCOUPLE_COUNT;
use crate::device_manager::DeviceManager;
use crate::error::Result;
use crate::indicator::Heartbeat;
use crate::network::WifiStub;

/// What one pass of the loop measured.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub thermocouples: [ConversionResult; THERMOCOUPLE_COUNT],
    pub cold_junction: f32,
}

pub struct Controller<CONV, THERMO, RELAY, LED, D> {
    devices: DeviceManager<CONV, THERMO, RELAY, D>,
    heartbeat: Heartbeat<LED>,
    wifi: WifiStub,
}

impl<CONV, THERMO, RELAY, LED, D> Controller<CONV, THERMO, RELAY, LED, D>
where
    CONV: SpiDevice,
    THERMO: SpiDevice,
    RELAY: OutputPin,
    LED: StatefulOutputPin,
    D: DelayNs,
{
    pub fn new(devices: DeviceManager<CONV, THERMO, RELAY, D>, heartbeat: Heartbeat<LED>, wifi: WifiStub) -> Self {
        Self {
            devices,
            heartbeat,
            wifi,
        }
    }

    pub fn devices(&self) -> &DeviceManager<CONV, THERMO, RELAY, D> {
        &self.devices
    }

    pub fn heartbeat(&self) -> &Heartbeat<LED> {
        &self.heartbeat
    }

    pub fn wifi(&self) -> &WifiStub {
        &self.wifi
    }

    /// Bring the devices up and report their health. A failed health check
    /// is logged but does not stop the rig.
    pub async fn start(&mut self) -> Result<()> {
        let reference = self.devices.config().reference;
        self.devices.initialize_devices(reference).await?;
        self.wifi.init();

        let health = self.devices.health().await;
        if !health.is_ok() {
            warn!("Starting with unhealthy devices");
        }
        info!("System setup complete. Entering main loop...");
        Ok(())
    }

    /// One pass: heartbeat, thermocouples, cold junction, relay pattern and
    /// its complement.
    pub async fn cycle(&mut self) -> Result<CycleReport> {
        let timing = self.devices.config().timing;
        let pattern = self.devices.config().relay_pattern;
        let complement = self.devices.config().relay_complement();

        self.heartbeat.toggle()?;
        self.devices.pause(timing.heartbeat_ms).await;

        let thermocouples = self.devices.read_thermocouples().await?;
        let cold_junction = self.devices.read_temperature().await?;

        self.devices.control_relays(&pattern)?;
        self.devices.pause(timing.relay_hold_ms).await;
        self.devices.control_relays(&complement)?;
        self.devices.pause(timing.relay_hold_ms).await;

        Ok(CycleReport {
            thermocouples,
            cold_junction,
        })
    }

    /// Start, then cycle forever. Only returns on a failed transaction.
    pub async fn run(&mut self) -> Result<Infallible> {
        self.start().await?;
        loop {
            let report = self.cycle().await?;
            debug!("Cycle done, cold junction {} C", report.cold_junction);
        }
    }
}
