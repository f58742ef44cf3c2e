//! Enable line and CPU reset handshake.

use embedded_hal::{digital::OutputPin, i2c::I2c};

use crate::{
    i2c::{scan, Device},
    platform::Watchdog,
    register::Register,
};

/// The output pin wired to the sensor's `EN` input.
pub(crate) struct EnablePin<PIN> {
    pin: PIN,
    powered: bool,
}

impl<PIN: OutputPin> EnablePin<PIN> {
    pub(crate) const fn new(pin: PIN) -> Self {
        Self {
            pin,
            powered: false,
        }
    }

    /// Drive `EN` high. Feeds the watchdog once the sensor is powered.
    pub(crate) fn power_up<W: Watchdog>(&mut self, wdt: &mut W) -> Result<(), PIN::Error> {
        self.pin.set_high()?;
        self.powered = true;
        wdt.feed();
        Ok(())
    }

    /// Drive `EN` low.
    pub(crate) fn power_down(&mut self) -> Result<(), PIN::Error> {
        self.pin.set_low()?;
        self.powered = false;
        Ok(())
    }

    pub(crate) const fn is_powered(&self) -> bool {
        self.powered
    }

    pub(crate) fn release(self) -> PIN {
        self.pin
    }
}

/// Restart the sensor CPU through the enable register. Unlike toggling `EN`
/// this keeps the sensor powered.
pub(crate) fn reset_cpu<I2C: I2c>(dev: &mut Device<I2C>) -> Result<(), I2C::Error> {
    dev.set_bit(Register::ENABLE_REG)
}

/// Whether the sensor answers a bus scan at its configured address.
pub(crate) fn is_connected<I2C: I2c>(dev: &mut Device<I2C>) -> bool {
    let addr = dev.addr;
    scan(&mut dev.i2c).any(|found| found == addr)
}
