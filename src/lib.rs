//! Blocking driver for the [TMF8805 ToF distance sensor](https://ams-osram.com/products/sensors/direct-time-of-flight-sensors-dtof/ams-tmf8805-time-of-flight-tof-sensor).
//!
//! ```no_run
//! use embedded_hal_mock::eh1::{delay::NoopDelay, digital, i2c};
//! use tmf8805::{NoWatchdog, StdClock, Tmf8805};
//!
//! # let bus = i2c::Mock::new(&[]);
//! # let enable = digital::Mock::new(&[]);
//! let mut tmf = Tmf8805::new(bus, enable, NoopDelay::new(), NoWatchdog, StdClock::new())?;
//!
//! let ready = tmf.initialize()?;
//!
//! loop {
//!     let measurement = tmf.get_measurement(&ready)?;
//!     println!("{} mm", measurement.distance);
//! }
//! # Ok::<(), tmf8805::Error<embedded_hal::i2c::ErrorKind>>(())
//! ```

#![warn(missing_docs)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::{delay::DelayNs, digital::OutputPin, i2c::I2c};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

pub use calibration::{Calibration, InvalidLength};
pub use i2c::scan;
pub use measurement::{distance, Measurement, ResultInfo};
#[cfg(feature = "std")]
pub use platform::{StdClock, StdDelay};
pub use platform::{Clock, NoWatchdog, Watchdog};
pub use register::{CALIBRATION_LEN, CHIP_ID, PERIPHERAL_ADDR};
pub use status::Status;
pub use wait::PollBudget;

use i2c::Device;
use power::EnablePin;
use register::{
    Register, ALGO_STATE, APP_MEASUREMENT, CMD_APPLY_CALIBRATION, CMD_FACTORY_CALIBRATION,
    CMD_MEASURE, CONTENT_CALIBRATION, INTERRUPT_MASK,
};

mod calibration;
mod i2c;
#[cfg(feature = "linux")]
pub mod linux;
mod measurement;
mod platform;
mod power;
mod register;
mod status;
#[cfg(test)]
mod testing;
mod wait;

/// Budget for the CPU to come out of reset (about 20 s).
pub const CPU_READY_BUDGET: PollBudget = PollBudget::new(200, 100);

/// Budget for the measurement application to load (about 50 s).
pub const APPLICATION_READY_BUDGET: PollBudget = PollBudget::new(500, 100);

/// Budget for a result to become available (about 5 s).
pub const DATA_AVAILABLE_BUDGET: PollBudget = PollBudget::new(500, 10);

/// Wall clock bounds of the factory calibration routine.
///
/// The routine runs on the sensor for an undetermined time, so unlike the
/// other handshakes it is bounded by elapsed seconds rather than attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBudget {
    /// Give up after this many seconds.
    pub timeout_secs: u64,
    /// Sleep before each completion check (milliseconds).
    pub poll_delay_ms: u32,
    /// Sleep between the completion signal and reading the result (milliseconds).
    pub settle_ms: u32,
}

impl Default for CalibrationBudget {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_delay_ms: 50,
            settle_ms: 10,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I<sup>2</sup>C address of the sensor.
    pub address: u8,
    /// See [`Tmf8805::is_cpu_ready`].
    pub cpu_ready: PollBudget,
    /// See [`Tmf8805::is_application_ready`].
    pub application_ready: PollBudget,
    /// See [`Tmf8805::is_data_available`].
    pub data_available: PollBudget,
    /// See [`Tmf8805::perform_calibration`].
    pub calibration: CalibrationBudget,
}

impl Config {
    /// Sets the I<sup>2</sup>C address.
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the CPU ready budget.
    #[must_use]
    pub const fn with_cpu_ready(mut self, budget: PollBudget) -> Self {
        self.cpu_ready = budget;
        self
    }

    /// Sets the application ready budget.
    #[must_use]
    pub const fn with_application_ready(mut self, budget: PollBudget) -> Self {
        self.application_ready = budget;
        self
    }

    /// Sets the data available budget.
    #[must_use]
    pub const fn with_data_available(mut self, budget: PollBudget) -> Self {
        self.data_available = budget;
        self
    }

    /// Sets the factory calibration budget.
    #[must_use]
    pub const fn with_calibration(mut self, budget: CalibrationBudget) -> Self {
        self.calibration = budget;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: PERIPHERAL_ADDR,
            cpu_ready: CPU_READY_BUDGET,
            application_ready: APPLICATION_READY_BUDGET,
            data_available: DATA_AVAILABLE_BUDGET,
            calibration: CalibrationBudget::default(),
        }
    }
}

/// A handshake that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// The CPU did not come out of reset.
    CpuReady,
    /// The measurement application did not report as loaded.
    ApplicationReady,
    /// No result was produced.
    DataAvailable,
    /// Factory calibration did not signal completion.
    FactoryCalibration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::CpuReady => "waiting for the CPU to be ready",
            Stage::ApplicationReady => "waiting for the measurement application to be ready",
            Stage::DataAvailable => "waiting for data to be available",
            Stage::FactoryCalibration => "waiting for the factory calibration to finish",
        })
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The I<sup>2</sup>C bus failed.
    I2c(E),
    /// Driving the enable pin failed.
    Gpio,
    /// Nothing answers at the configured address.
    NotConnected,
    /// A handshake with the sensor timed out.
    Timeout(Stage),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "i2c error: {e:?}"),
            Error::Gpio => f.write_str("failed to drive the enable pin"),
            Error::NotConnected => f.write_str("TMF8805 is not connected"),
            Error::Timeout(stage) => write!(f, "timed out {stage}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

/// Version of the application running on the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppRevision {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch version.
    pub patch: u8,
}

impl fmt::Display for AppRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Proof that [`Tmf8805::initialize`] succeeded, required to measure.
///
/// The token only records that an initialization happened. It is not tied to
/// the driver that issued it and is not invalidated by
/// [`power_down`](Tmf8805::power_down): after a power cycle, or when switching
/// to another sensor, call [`initialize`](Tmf8805::initialize) again and use
/// the fresh token.
#[derive(Debug)]
pub struct CpuReady {
    _private: (),
}

/// A TMF8805 ToF range sensor.
///
/// The driver owns the bus and the enable pin. The watchdog is only fed, so
/// pass `&mut` to one that lives elsewhere.
pub struct Tmf8805<I2C: I2c, PIN, DELAY, WDT, CLK> {
    dev: Device<I2C>,
    en: EnablePin<PIN>,
    delay: DELAY,
    wdt: WDT,
    clock: CLK,
    config: Config,
}

impl<I2C, PIN, DELAY, WDT, CLK> Tmf8805<I2C, PIN, DELAY, WDT, CLK>
where
    I2C: I2c,
    PIN: OutputPin,
    DELAY: DelayNs,
    WDT: Watchdog,
    CLK: Clock,
{
    /// Construct a driver with the default [`Config`] and power the sensor
    /// up. No commands are sent until [`Self::initialize`].
    pub fn new(
        i2c: I2C,
        enable: PIN,
        delay: DELAY,
        wdt: WDT,
        clock: CLK,
    ) -> Result<Self, Error<I2C::Error>> {
        Self::with_config(i2c, enable, delay, wdt, clock, Config::default())
    }

    /// Like [`Self::new`], with a custom [`Config`].
    pub fn with_config(
        i2c: I2C,
        enable: PIN,
        delay: DELAY,
        wdt: WDT,
        clock: CLK,
        config: Config,
    ) -> Result<Self, Error<I2C::Error>> {
        let mut tmf = Self {
            dev: Device {
                addr: config.address,
                i2c,
            },
            en: EnablePin::new(enable),
            delay,
            wdt,
            clock,
            config,
        };
        tmf.power_up()?;
        Ok(tmf)
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The I<sup>2</sup>C address the driver talks to.
    pub fn address(&self) -> u8 {
        self.dev.addr
    }

    /// Talk to the sensor at another address from now on. This does not
    /// reprogram the sensor.
    pub fn set_address(&mut self, address: u8) {
        self.config.address = address;
        self.dev.addr = address;
    }

    /// Give back the bus and the enable pin.
    pub fn release(self) -> (I2C, PIN) {
        (self.dev.i2c, self.en.release())
    }

    /// Drive the enable pin high.
    pub fn power_up(&mut self) -> Result<(), Error<I2C::Error>> {
        self.en.power_up(&mut self.wdt).map_err(|_| Error::Gpio)
    }

    /// Drive the enable pin low. Calibration is lost and the sensor has to
    /// be initialized again after the next [`Self::power_up`].
    pub fn power_down(&mut self) -> Result<(), Error<I2C::Error>> {
        self.en.power_down().map_err(|_| Error::Gpio)
    }

    /// Whether the enable pin is currently driven high.
    pub fn is_powered(&self) -> bool {
        self.en.is_powered()
    }

    /// Scan the bus and check whether the sensor answers at its address.
    ///
    /// Bus errors during the scan count as "not there"; they never surface
    /// as [`Error::I2c`].
    pub fn is_connected(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(power::is_connected(&mut self.dev))
    }

    /// Bring the sensor CPU out of reset and wait for it to accept commands.
    ///
    /// Running this again repeats the whole handshake, which is harmless.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the sensor does not show up on a bus scan.
    ///   The CPU is not touched in that case.
    /// - [`Error::Timeout`] if the CPU does not become ready.
    #[cfg_attr(feature = "tracing", instrument(err, skip(self)))]
    pub fn initialize(&mut self) -> Result<CpuReady, Error<I2C::Error>> {
        if !self.is_connected()? {
            #[cfg(feature = "tracing")]
            warn!("TMF8805 is not connected at {:#04x}", self.dev.addr);
            return Err(Error::NotConnected);
        }

        self.reset_cpu()?;

        if !self.is_cpu_ready()? {
            #[cfg(feature = "tracing")]
            warn!("{} timed out", Stage::CpuReady);
            return Err(Error::Timeout(Stage::CpuReady));
        }

        #[cfg(feature = "tracing")]
        debug!("cpu ready");

        Ok(CpuReady { _private: () })
    }

    /// Request a CPU reset through the enable register.
    pub fn reset_cpu(&mut self) -> Result<(), Error<I2C::Error>> {
        Ok(power::reset_cpu(&mut self.dev)?)
    }

    /// Poll until the CPU reports ready, within [`Config::cpu_ready`].
    /// `Ok(false)` means it timed out.
    pub fn is_cpu_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        let Self {
            dev,
            delay,
            wdt,
            config,
            ..
        } = self;
        Ok(wait::poll(config.cpu_ready, wdt, delay, || {
            wait::cpu_ready(dev)
        })?)
    }

    /// Ask the sensor to switch to the measurement application. Nothing is
    /// read back; see [`Self::is_application_ready`].
    pub fn load_measurement_application(&mut self) -> Result<(), Error<I2C::Error>> {
        Ok(self.dev.write_byte(Register::APPREQID, APP_MEASUREMENT)?)
    }

    /// Poll until the measurement application is running, within
    /// [`Config::application_ready`]. `Ok(false)` means it timed out.
    pub fn is_application_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        let Self {
            dev,
            delay,
            wdt,
            config,
            ..
        } = self;
        Ok(wait::poll(config.application_ready, wdt, delay, || {
            wait::application_ready(dev)
        })?)
    }

    /// Issue the measure command.
    pub fn start_measurement_application(&mut self) -> Result<(), Error<I2C::Error>> {
        Ok(self.dev.write_byte(Register::COMMAND, CMD_MEASURE)?)
    }

    /// Enable the result interrupt.
    ///
    /// The current interrupt status is read and written, with the result
    /// bit set, to the interrupt enable register. The two registers share
    /// their bit layout.
    pub fn enable_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        let value = self.dev.read_byte(Register::INT_STATUS)? | INTERRUPT_MASK;
        Ok(self.dev.write_byte(Register::INT_ENAB, value)?)
    }

    /// Clear the result interrupt flag (write one to clear).
    pub fn clear_interrupt_flag(&mut self) -> Result<(), Error<I2C::Error>> {
        let value = self.dev.read_byte(Register::INT_STATUS)? | INTERRUPT_MASK;
        Ok(self.dev.write_byte(Register::INT_STATUS, value)?)
    }

    /// Poll until a result is ready, within [`Config::data_available`].
    /// `Ok(false)` means it timed out.
    pub fn is_data_available(&mut self) -> Result<bool, Error<I2C::Error>> {
        let Self {
            dev,
            delay,
            wdt,
            config,
            ..
        } = self;
        Ok(wait::poll(config.data_available, wdt, delay, || {
            wait::data_available(dev)
        })?)
    }

    /// Read the current result. Wait for [`Self::is_data_available`] first
    /// so the result is complete.
    pub fn read_measurement(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.wdt.feed();
        let info = ResultInfo::from_raw(self.dev.read_byte(Register::RESULT_INFO)?);
        self.wdt.feed();

        let peak_high = self.dev.read_byte(Register::DISTANCE_PEAK_1)?;
        let peak_low = self.dev.read_byte(Register::DISTANCE_PEAK_0)?;
        self.wdt.feed();

        Ok(Measurement::new(info, peak_high, peak_low))
    }

    /// Load the measurement application, trigger a measurement and wait for
    /// its result.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if the application does not load or no result is
    /// produced in time. Nothing is retried.
    #[cfg_attr(feature = "tracing", instrument(err, skip_all))]
    pub fn get_measurement(&mut self, _ready: &CpuReady) -> Result<Measurement, Error<I2C::Error>> {
        self.load_measurement_application()?;

        if !self.is_application_ready()? {
            #[cfg(feature = "tracing")]
            warn!("{} timed out", Stage::ApplicationReady);
            return Err(Error::Timeout(Stage::ApplicationReady));
        }

        self.start_measurement_application()?;
        self.enable_interrupt()?;

        if !self.is_data_available()? {
            #[cfg(feature = "tracing")]
            warn!("{} timed out", Stage::DataAvailable);
            return Err(Error::Timeout(Stage::DataAvailable));
        }

        let measurement = self.read_measurement()?;

        #[cfg(feature = "tracing")]
        debug!(
            "measurement: {}mm (reliability: {}; status: {}; peak1: {}; peak0: {})",
            measurement.distance,
            measurement.reliability,
            measurement.status,
            measurement.peak_high,
            measurement.peak_low
        );

        Ok(measurement)
    }

    /// Read and classify the status register.
    pub fn get_status(&mut self) -> Result<Status, Error<I2C::Error>> {
        Ok(Status::from_raw(self.dev.read_byte(Register::STATUS)?))
    }

    /// Read the chip ID register, [`CHIP_ID`] on a TMF8805.
    pub fn read_chip_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.dev.read_byte(Register::ID)?)
    }

    /// Read the silicon revision register.
    pub fn read_revision_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.dev.read_byte(Register::REVID)?)
    }

    /// Version of the application currently running on the sensor.
    pub fn read_application_revision(&mut self) -> Result<AppRevision, Error<I2C::Error>> {
        Ok(AppRevision {
            major: self.dev.read_byte(Register::APPREV_MAJOR)?,
            minor: self.dev.read_byte(Register::APPREV_MINOR)?,
            patch: self.dev.read_byte(Register::APPREV_PATCH)?,
        })
    }

    /// Read the calibration data currently held by the sensor.
    pub fn get_current_calibration(&mut self) -> Result<Calibration, Error<I2C::Error>> {
        let mut buf = [0; CALIBRATION_LEN];
        self.dev.read_bytes(Register::FACTORY_CALIB_0, &mut buf)?;
        Ok(Calibration::new(buf))
    }

    /// Run the factory calibration routine and read back its result.
    ///
    /// The sensor should face a dark, target free scene for the whole run.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] with [`Stage::FactoryCalibration`] if the sensor
    /// does not report completion within [`Config::calibration`].
    #[cfg_attr(feature = "tracing", instrument(err, skip(self)))]
    pub fn perform_calibration(&mut self) -> Result<Calibration, Error<I2C::Error>> {
        let budget = self.config.calibration;

        self.wdt.feed();
        self.enable_interrupt()?;
        self.dev.write_byte(Register::COMMAND, CMD_FACTORY_CALIBRATION)?;

        let start = self.clock.now_secs();

        while self.clock.now_secs().saturating_sub(start) < budget.timeout_secs {
            self.wdt.feed();
            self.delay.delay_ms(budget.poll_delay_ms);

            let content = self.dev.read_byte(Register::REGISTER_CONTENTS)?;
            #[cfg(feature = "tracing")]
            trace!("register contents: {:#04x}", content);

            if content == CONTENT_CALIBRATION {
                self.wdt.feed();
                self.delay.delay_ms(budget.settle_ms);
                return self.get_current_calibration();
            }
        }

        #[cfg(feature = "tracing")]
        warn!("{} timed out", Stage::FactoryCalibration);

        Err(Error::Timeout(Stage::FactoryCalibration))
    }

    /// Hand calibration data to the sensor, followed by the default
    /// algorithm state.
    ///
    /// The three writes are not atomic: if one fails, the sensor may be left
    /// with partial calibration.
    pub fn set_calibration(&mut self, calibration: &Calibration) -> Result<(), Error<I2C::Error>> {
        self.dev.write_byte(Register::COMMAND, CMD_APPLY_CALIBRATION)?;
        self.dev
            .write_bytes(Register::FACTORY_CALIB_0, calibration.as_bytes())?;
        self.dev.write_bytes(Register::STATE_DATA_WR_0, &ALGO_STATE)?;
        Ok(())
    }
}
