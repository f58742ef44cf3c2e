//! Every handshake with the TMF8805 ends with the driver polling a register
//! until the sensor reports the expected value. This module holds the bounded
//! polling loop shared by those handshakes, and the individual conditions.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::{
    i2c::Device,
    platform::Watchdog,
    register::{Register, APP_MEASUREMENT, CONTENT_RESULT, CPU_READY_BIT},
};

/// How often a condition is checked, and how long to sleep between checks.
///
/// The worst case wait is roughly `iterations * delay_ms` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollBudget {
    /// Maximum number of checks.
    pub iterations: u16,
    /// Sleep after each failed check (milliseconds).
    pub delay_ms: u32,
}

impl PollBudget {
    /// Construct a budget of `iterations` checks, `delay_ms` apart.
    pub const fn new(iterations: u16, delay_ms: u32) -> Self {
        Self {
            iterations,
            delay_ms,
        }
    }
}

/// Check `ready` until it returns `true` or the budget is spent.
///
/// Returns `Ok(false)` on timeout. The watchdog is fed on entry and both
/// before and after every sleep, so a long wait cannot starve it.
pub(crate) fn poll<E, W, D, F>(
    budget: PollBudget,
    wdt: &mut W,
    delay: &mut D,
    mut ready: F,
) -> Result<bool, E>
where
    W: Watchdog,
    D: DelayNs,
    F: FnMut() -> Result<bool, E>,
{
    wdt.feed();

    for _ in 0..budget.iterations {
        if ready()? {
            wdt.feed();
            return Ok(true);
        }

        wdt.feed();
        delay.delay_ms(budget.delay_ms);
        wdt.feed();
    }

    Ok(false)
}

pub(crate) fn cpu_ready<I2C: I2c>(dev: &mut Device<I2C>) -> Result<bool, I2C::Error> {
    dev.is_bit_set(Register::ENABLE_REG, CPU_READY_BIT)
}

pub(crate) fn application_ready<I2C: I2c>(dev: &mut Device<I2C>) -> Result<bool, I2C::Error> {
    Ok(dev.read_byte(Register::APPID)? == APP_MEASUREMENT)
}

pub(crate) fn data_available<I2C: I2c>(dev: &mut Device<I2C>) -> Result<bool, I2C::Error> {
    Ok(dev.read_byte(Register::REGISTER_CONTENTS)? == CONTENT_RESULT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingWatchdog, FakeDelay, FakeSensor};

    #[test]
    fn returns_on_first_success() {
        let mut wdt = CountingWatchdog::default();
        let mut delay = FakeDelay::default();
        let mut checks = 0;

        let ready = poll::<(), _, _, _>(PollBudget::new(10, 100), &mut wdt, &mut delay, || {
            checks += 1;
            Ok(checks == 3)
        })
        .unwrap();

        assert!(ready);
        assert_eq!(checks, 3);
        assert_eq!(delay.total_ms, 200);
        // entry, two feeds per failed check, one on success
        assert_eq!(wdt.feeds, 1 + 2 * 2 + 1);
    }

    #[test]
    fn gives_up_after_budget() {
        let mut wdt = CountingWatchdog::default();
        let mut delay = FakeDelay::default();
        let mut checks = 0;

        let ready = poll::<(), _, _, _>(PollBudget::new(200, 100), &mut wdt, &mut delay, || {
            checks += 1;
            Ok(false)
        })
        .unwrap();

        assert!(!ready);
        assert_eq!(checks, 200);
        assert_eq!(delay.total_ms, 20_000);
    }

    #[test]
    fn bus_errors_abort_the_loop() {
        let mut wdt = CountingWatchdog::default();
        let mut delay = FakeDelay::default();

        let result = poll(PollBudget::new(5, 10), &mut wdt, &mut delay, || Err("nack"));

        assert_eq!(result, Err("nack"));
        assert_eq!(delay.calls, 0);
    }

    #[test]
    fn conditions_read_the_right_registers() {
        let mut dev = Device {
            addr: 0x41,
            i2c: FakeSensor::ranging(0x41),
        };
        assert!(cpu_ready(&mut dev).unwrap());
        assert!(application_ready(&mut dev).unwrap());
        assert!(data_available(&mut dev).unwrap());

        let mut idle = Device {
            addr: 0x41,
            i2c: FakeSensor::new(0x41).with_reg(0xe0, 0x01),
        };
        assert!(!cpu_ready(&mut idle).unwrap());
        assert!(!application_ready(&mut idle).unwrap());
        assert!(!data_available(&mut idle).unwrap());
    }
}
