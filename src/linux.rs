//! Run the driver on a Linux `/dev/i2c-N` bus through [`i2cdev`].

use core::fmt;
use std::{io, path::Path, vec::Vec};

use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};
use i2cdev::{
    core::{I2CMessage, I2CTransfer},
    linux::{LinuxI2CBus, LinuxI2CError, LinuxI2CMessage},
};

pub use i2cdev;

/// A whole Linux I<sup>2</sup>C bus, addressed per transaction.
pub struct LinuxBus(LinuxI2CBus);

impl LinuxBus {
    /// Open a bus device such as `/dev/i2c-1`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LinuxBusError> {
        Ok(Self(LinuxI2CBus::new(path)?))
    }
}

/// An I/O error of the Linux I<sup>2</sup>C driver.
#[derive(Debug)]
pub struct LinuxBusError(io::Error);

impl LinuxBusError {
    /// The underlying I/O error.
    pub fn inner(&self) -> &io::Error {
        &self.0
    }
}

impl From<LinuxI2CError> for LinuxBusError {
    fn from(error: LinuxI2CError) -> Self {
        Self(error.into())
    }
}

impl fmt::Display for LinuxBusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for LinuxBusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl i2c::Error for LinuxBusError {
    fn kind(&self) -> ErrorKind {
        match self.0.raw_os_error() {
            Some(libc::ENXIO | libc::EREMOTEIO) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            _ => ErrorKind::Other,
        }
    }
}

impl i2c::ErrorType for LinuxBus {
    type Error = LinuxBusError;
}

impl i2c::I2c for LinuxBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut messages: Vec<_> = operations
            .iter_mut()
            .map(|op| match op {
                Operation::Write(data) => LinuxI2CMessage::write(data),
                Operation::Read(buf) => LinuxI2CMessage::read(buf),
            })
            .map(|msg| msg.with_address(u16::from(address)))
            .collect();

        self.0.transfer(&mut messages)?;
        Ok(())
    }
}
