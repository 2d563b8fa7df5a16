use embedded_hal::digital::StatefulOutputPin;

use crate::error::{Error, Result};

/// Running indicator LED, toggled once per main loop pass.
pub struct Heartbeat<P> {
    pin: P,
    toggles: u32,
}

impl<P> Heartbeat<P>
where
    P: StatefulOutputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin, toggles: 0 }
    }

    pub fn toggle(&mut self) -> Result<()> {
        self.pin.toggle().map_err(Error::pin)?;
        self.toggles = self.toggles.wrapping_add(1);
        Ok(())
    }

    pub fn is_on(&mut self) -> Result<bool> {
        self.pin.is_set_high().map_err(Error::pin)
    }

    /// Number of toggles since start, wraps.
    pub const fn beats(&self) -> u32 {
        self.toggles
    }
}
