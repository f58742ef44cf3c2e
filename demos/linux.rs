//! Measures forever on a Raspberry Pi with the sensor on `/dev/i2c-1` and
//! its `EN` pin tied high.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use tmf8805::linux::LinuxBus;
use tmf8805::{NoWatchdog, StdClock, StdDelay, Tmf8805};

/// `EN` wired straight to 3.3 V.
struct TiedHigh;

impl ErrorType for TiedHigh {
    type Error = Infallible;
}

impl OutputPin for TiedHigh {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let bus = LinuxBus::open("/dev/i2c-1")?;
    let mut tmf = Tmf8805::new(bus, TiedHigh, StdDelay, NoWatchdog, StdClock::new())?;

    println!("status: {}", tmf.get_status()?);

    loop {
        let ready = match tmf.initialize() {
            Ok(ready) => ready,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match tmf.get_measurement(&ready) {
            Ok(measurement) => println!("Distance: {}mm", measurement.distance),
            Err(e) => println!("{e}"),
        }
    }
}
