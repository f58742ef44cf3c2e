//! Collaborators the driver calls into but does not own: the watchdog that
//! has to be kept alive during long polling loops, and a coarse wall clock
//! for the factory calibration deadline.

/// Keep-alive hook, fed before and after every sleep of the driver.
///
/// Implementations must tolerate being fed at a high rate.
pub trait Watchdog {
    /// Notify the watchdog that the system is still alive.
    fn feed(&mut self);
}

impl<W: Watchdog + ?Sized> Watchdog for &mut W {
    #[inline]
    fn feed(&mut self) {
        (**self).feed()
    }
}

/// For systems without a watchdog.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    #[inline]
    fn feed(&mut self) {}
}

/// Monotonic time source with one second resolution.
pub trait Clock {
    /// Seconds elapsed since some fixed, arbitrary point.
    fn now_secs(&mut self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    #[inline]
    fn now_secs(&mut self) -> u64 {
        (**self).now_secs()
    }
}

/// [`Clock`] backed by [`std::time::Instant`], counting from its creation.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock(std::time::Instant);

#[cfg(feature = "std")]
impl StdClock {
    /// Start counting now.
    pub fn new() -> Self {
        Self(std::time::Instant::now())
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_secs(&mut self) -> u64 {
        self.0.elapsed().as_secs()
    }
}

/// [`DelayNs`](embedded_hal::delay::DelayNs) that puts the current thread to sleep.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
