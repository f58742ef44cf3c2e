extern crate std;

use core::convert::Infallible;

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::platform::{Clock, Watchdog};

/// A TMF8805 stand-in. Reads always return the fixture registers; writes are
/// only logged so that a fixture cannot be clobbered mid-test.
#[derive(Clone, Debug)]
pub(crate) struct FakeSensor {
    present: Option<u8>,
    absent_error: ErrorKind,
    regs: [u8; 256],
    pointer: u8,
    writes: Vec<(u8, Vec<u8>)>,
}

impl FakeSensor {
    pub(crate) fn new(addr: u8) -> Self {
        Self {
            present: Some(addr),
            absent_error: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            regs: [0; 256],
            pointer: 0,
            writes: Vec::new(),
        }
    }

    /// Nothing acknowledges on this bus.
    pub(crate) fn absent() -> Self {
        Self {
            present: None,
            ..Self::new(0)
        }
    }

    /// Report `error` instead of a NACK for addresses nobody answers, the
    /// way some adapters report `EIO`.
    pub(crate) fn absent_error(mut self, error: ErrorKind) -> Self {
        self.absent_error = error;
        self
    }

    pub(crate) fn with_reg(mut self, reg: u8, value: u8) -> Self {
        self.regs[reg as usize] = value;
        self
    }

    pub(crate) fn with_block(mut self, reg: u8, values: &[u8]) -> Self {
        let start = reg as usize;
        self.regs[start..start + values.len()].copy_from_slice(values);
        self
    }

    /// A sensor that completes every handshake and reports 1250 mm.
    pub(crate) fn ranging(addr: u8) -> Self {
        Self::new(addr)
            .with_reg(0x00, 0xc0)
            .with_reg(0xe0, 0x40)
            .with_reg(0x1e, 0x55)
            .with_reg(0x21, 0x3f)
            .with_reg(0x22, 0xe2)
            .with_reg(0x23, 0x04)
            .with_reg(0xe1, 0x01)
    }

    pub(crate) fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }
}

impl ErrorType for FakeSensor {
    type Error = ErrorKind;
}

impl I2c for FakeSensor {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.present != Some(address) {
            return Err(self.absent_error);
        }

        for op in operations {
            match op {
                Operation::Write(data) => {
                    if let Some((&reg, payload)) = data.split_first() {
                        self.pointer = reg;
                        if !payload.is_empty() {
                            self.writes.push((reg, payload.to_vec()));
                        }
                    }
                }
                Operation::Read(buf) => {
                    for (offset, slot) in buf.iter_mut().enumerate() {
                        *slot = self.regs[self.pointer.wrapping_add(offset as u8) as usize];
                    }
                }
            }
        }

        Ok(())
    }
}

/// Records every level the driver drives.
#[derive(Default, Debug)]
pub(crate) struct FakePin {
    pub(crate) levels: Vec<bool>,
}

impl PinErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

#[derive(Default, Debug)]
pub(crate) struct CountingWatchdog {
    pub(crate) feeds: u32,
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Returns immediately, keeping track of how long it was asked to sleep.
#[derive(Default, Debug)]
pub(crate) struct FakeDelay {
    pub(crate) calls: u32,
    pub(crate) total_ms: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}

/// A clock that moves forward by `step` seconds every time it is read.
#[derive(Debug)]
pub(crate) struct TickingClock {
    pub(crate) now: u64,
    pub(crate) step: u64,
}

impl TickingClock {
    pub(crate) fn new(step: u64) -> Self {
        Self { now: 0, step }
    }
}

impl Clock for TickingClock {
    fn now_secs(&mut self) -> u64 {
        let now = self.now;
        self.now += self.step;
        now
    }
}
