//! Heater relays on plain GPIO outputs.

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{Error, Result};

pub struct Relays<P, const N: usize> {
    lines: [P; N],
    states: [bool; N],
}

impl<P, const N: usize> Relays<P, N>
where
    P: OutputPin,
{
    /// Takes ownership of the lines; they are assumed to start off.
    pub fn new(lines: [P; N]) -> Self {
        Self {
            lines,
            states: [false; N],
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Last states successfully applied.
    pub fn states(&self) -> [bool; N] {
        self.states
    }

    /// Drive line `i` to `states[i]`. The whole call is rejected, with no
    /// line touched, unless there is exactly one state per line.
    pub fn apply(&mut self, states: &[bool]) -> Result<()> {
        if states.len() != N {
            return Err(Error::ArityMismatch {
                expected: N,
                actual: states.len(),
            });
        }
        for ((line, applied), &on) in self.lines.iter_mut().zip(self.states.iter_mut()).zip(states) {
            line.set_state(PinState::from(on)).map_err(Error::pin)?;
            *applied = on;
        }
        info!("Relays set to states: {:?}", states);
        Ok(())
    }

    pub fn all_off(&mut self) -> Result<()> {
        self.apply(&[false; N])
    }
}
