//! Test doubles for the bus, pin, watchdog and time collaborators.

pub(crate) mod mock;

pub(crate) use mock::{CountingWatchdog, FakeDelay, FakePin, FakeSensor, TickingClock};
