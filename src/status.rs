//! Classification of the sensor status register.

use core::fmt;

use crate::register::STATUS_MISSING_FACTORY_CALIBRATION;

/// Content of the status register.
///
/// Only the statuses this driver knows how to explain get their own variant,
/// everything else is passed through as [`Status::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// No (or no valid) factory calibration has been loaded.
    MissingFactoryCalibration,
    /// A status without a known meaning.
    Other(u8),
}

impl Status {
    /// Classify a raw status register value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            STATUS_MISSING_FACTORY_CALIBRATION => Self::MissingFactoryCalibration,
            other => Self::Other(other),
        }
    }

    /// Human readable explanation, `"N/A"` for unknown statuses.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::MissingFactoryCalibration => {
                "There is no (or no valid) factory calibration on the device. Using default values instead."
            }
            Self::Other(_) => "N/A",
        }
    }
}

/// Formats the status code: the symbolic name for known statuses, the raw
/// value otherwise.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFactoryCalibration => f.write_str("ErrMissingFactCal"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn missing_factory_calibration() {
        let status = Status::from_raw(39);
        assert_eq!(status, Status::MissingFactoryCalibration);
        assert_eq!(status.to_string(), "ErrMissingFactCal");
        assert_eq!(
            status.description(),
            "There is no (or no valid) factory calibration on the device. Using default values instead."
        );
    }

    #[test]
    fn unknown_status_passes_through() {
        for raw in [0, 1, 38, 40, 255] {
            let status = Status::from_raw(raw);
            assert_eq!(status, Status::Other(raw));
            assert_eq!(status.to_string(), raw.to_string());
            assert_eq!(status.description(), "N/A");
        }
    }
}
