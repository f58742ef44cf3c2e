//! [I²C](https://en.wikipedia.org/wiki/I%C2%B2C) abstractions.

use embedded_hal::i2c::I2c;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::register::Register;

/// Largest block written in a single transaction (register byte excluded).
const MAX_WRITE_LEN: usize = 16;

/// First and last address probed by [`scan`]; everything outside is reserved.
const SCAN_RANGE: core::ops::RangeInclusive<u8> = 0x08..=0x77;

/// A sensor at a fixed address on an owned bus.
pub struct Device<M: I2c> {
    pub addr: u8,
    pub i2c: M,
}

impl<M: I2c> Device<M> {
    pub fn read_bytes(&mut self, reg: Register, dest: &mut [u8]) -> Result<(), M::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read {} from {:x}", dest.len(), reg.addr());
        #[cfg(feature = "tracing")]
        trace!("read {} from {:#04x}", dest.len(), reg.addr());
        self.i2c.write_read(self.addr, &[reg.addr()], dest)
    }

    /// Write `data` starting at `reg`.
    ///
    /// # Panics
    ///
    /// If `data` is longer than the largest register block of the sensor.
    pub fn write_bytes(&mut self, reg: Register, data: &[u8]) -> Result<(), M::Error> {
        let mut buf = [0; 1 + MAX_WRITE_LEN];
        let msg = &mut buf[..=data.len()];
        msg[0] = reg.addr();
        msg[1..].copy_from_slice(data);
        #[cfg(feature = "defmt")]
        defmt::trace!("write {:x}", msg);
        #[cfg(feature = "tracing")]
        trace!("write {:02x?}", msg);
        self.i2c.write(self.addr, msg)
    }

    /// Write a single `1` into `reg`.
    pub fn set_bit(&mut self, reg: Register) -> Result<(), M::Error> {
        self.write_byte(reg, 0x01)
    }

    /// Whether bit number `bit` of `reg` reads as set.
    pub fn is_bit_set(&mut self, reg: Register, bit: u8) -> Result<bool, M::Error> {
        Ok(self.read_byte(reg)? & (1 << bit) != 0)
    }
}

macro_rules! read_impl {
    ($name:ident, $out:ty) => {
        impl<M: I2c> Device<M> {
            /// Read a
            #[doc = concat!("[`", stringify!($out), "`]")]
            /// from some [`Register`].
            pub fn $name(&mut self, reg: Register) -> Result<$out, M::Error> {
                let mut buf = [0; core::mem::size_of::<$out>()];
                self.read_bytes(reg, &mut buf)?;
                Ok(<$out>::from_be_bytes(buf))
            }
        }
    };
}

read_impl!(read_byte, u8);

macro_rules! write_impl {
    ($name:ident, $in:ty) => {
        impl<M: I2c> Device<M> {
            /// Write a
            #[doc = concat!("[`", stringify!($in), "`]")]
            /// into some [`Register`].
            pub fn $name(&mut self, reg: Register, data: $in) -> Result<(), M::Error> {
                self.write_bytes(reg, &data.to_be_bytes())
            }
        }
    };
}

write_impl!(write_byte, u8);

/// Probe every non-reserved 7-bit address with a one byte read and yield the
/// ones that acknowledge.
///
/// Adapters disagree on how they report an empty address (a NACK, `EIO`,
/// arbitration trouble), so any failed probe counts as "nothing there".
pub fn scan<I: I2c>(i2c: &mut I) -> impl Iterator<Item = u8> + '_ {
    SCAN_RANGE.filter(move |&addr| {
        let mut probe = [0];
        i2c.read(addr, &mut probe).is_ok()
    })
}
