//! Fakes for host tests: a recording SPI device, GPIO pins, an I2C bus and a
//! delay that only counts.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin, StatefulOutputPin};
use embedded_hal::i2c::{self, NoAcknowledgeSource};
use embedded_hal::spi;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use embedded_hal_async::spi::{Operation, SpiDevice};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeError;

impl spi::Error for FakeError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for FakeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nack;

impl i2c::Error for Nack {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

// ----------------------------------------------------------------------------
// SPI
// ----------------------------------------------------------------------------

/// One chip-select frame as seen on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub device: &'static str,
    pub written: Vec<u8>,
    pub read: Vec<u8>,
}

/// Frames from every fake sharing the log, in bus order.
pub type BusLog = Rc<RefCell<Vec<Frame>>>;

pub fn bus_log() -> BusLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A chip on one chip select.
///
/// Reads are answered from the scripted queue first. With nothing scripted,
/// a read the same length as the last written payload echoes that payload
/// (a register file that hands back what it was given); any other read
/// returns zeros.
pub struct FakeSpi {
    name: &'static str,
    log: BusLog,
    responses: VecDeque<Vec<u8>>,
    echo: Vec<u8>,
    fail: bool,
}

impl FakeSpi {
    pub fn new(name: &'static str, log: &BusLog) -> Self {
        Self {
            name,
            log: log.clone(),
            responses: VecDeque::new(),
            echo: Vec::new(),
            fail: false,
        }
    }

    pub fn respond(&mut self, bytes: &[u8]) -> &mut Self {
        self.responses.push_back(bytes.to_vec());
        self
    }

    pub fn fail(&mut self) -> &mut Self {
        self.fail = true;
        self
    }

    fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        if let Some(response) = self.responses.pop_front() {
            let n = response.len().min(buf.len());
            buf[..n].copy_from_slice(&response[..n]);
        } else if self.echo.len() == buf.len() {
            buf.copy_from_slice(&self.echo);
        }
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl SpiDevice for FakeSpi {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        let mut written = Vec::new();
        let mut read = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => written.extend_from_slice(bytes),
                Operation::Read(buf) => {
                    self.fill(buf);
                    read.extend_from_slice(buf);
                }
                Operation::Transfer(rx, tx) => {
                    written.extend_from_slice(tx);
                    self.fill(rx);
                    read.extend_from_slice(rx);
                }
                Operation::TransferInPlace(buf) => {
                    written.extend_from_slice(buf);
                    self.fill(buf);
                    read.extend_from_slice(buf);
                }
                Operation::DelayNs(_) => {}
            }
        }
        if read.is_empty() && written.len() > 1 {
            self.echo = written[1..].to_vec();
        }
        self.log.borrow_mut().push(Frame {
            device: self.name,
            written,
            read,
        });
        Ok(())
    }
}

pub fn frames_for(log: &BusLog, device: &str) -> Vec<Frame> {
    log.borrow().iter().filter(|f| f.device == device).cloned().collect()
}

// ----------------------------------------------------------------------------
// GPIO
// ----------------------------------------------------------------------------

/// Every level written to any pin sharing the log, as (pin id, high).
pub type PinLog = Rc<RefCell<Vec<(u8, bool)>>>;

pub fn pin_log() -> PinLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct FakePin {
    id: u8,
    high: bool,
    fail: bool,
    log: PinLog,
}

impl FakePin {
    pub fn new(id: u8, log: &PinLog) -> Self {
        Self {
            id,
            high: false,
            fail: false,
            log: log.clone(),
        }
    }

    pub fn failing(id: u8, log: &PinLog) -> Self {
        Self {
            fail: true,
            ..Self::new(id, log)
        }
    }

    fn drive(&mut self, high: bool) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        self.high = high;
        self.log.borrow_mut().push((self.id, high));
        Ok(())
    }
}

impl digital::ErrorType for FakePin {
    type Error = FakeError;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), FakeError> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), FakeError> {
        self.drive(true)
    }
}

impl StatefulOutputPin for FakePin {
    fn is_set_high(&mut self) -> Result<bool, FakeError> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, FakeError> {
        Ok(!self.high)
    }
}

pub fn relay_pins(log: &PinLog) -> [FakePin; 3] {
    [FakePin::new(7, log), FakePin::new(8, log), FakePin::new(9, log)]
}

// ----------------------------------------------------------------------------
// Delay
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    Ns(u32),
    Us(u32),
    Ms(u32),
}

/// Records each pause instead of sleeping.
#[derive(Clone, Default)]
pub struct FakeDelay {
    pub pauses: Rc<RefCell<Vec<Pause>>>,
}

impl FakeDelay {
    /// Only the millisecond pauses, in order.
    pub fn millis(&self) -> Vec<u32> {
        self.pauses
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Pause::Ms(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.pauses.borrow_mut().push(Pause::Ns(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.pauses.borrow_mut().push(Pause::Us(us));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.pauses.borrow_mut().push(Pause::Ms(ms));
    }
}

// ----------------------------------------------------------------------------
// I2C
// ----------------------------------------------------------------------------

/// Devices at `present` ACK; everything written to them is kept.
#[derive(Default)]
pub struct FakeI2c {
    pub present: BTreeSet<u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl FakeI2c {
    pub fn with_devices(addresses: &[u8]) -> Self {
        Self {
            present: addresses.iter().copied().collect(),
            writes: Vec::new(),
        }
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = Nack;
}

impl I2c for FakeI2c {
    async fn transaction(&mut self, address: u8, operations: &mut [i2c::Operation<'_>]) -> Result<(), Nack> {
        if !self.present.contains(&address) {
            return Err(Nack);
        }
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                i2c::Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}
