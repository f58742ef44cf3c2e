//! Factory calibration data.

use core::fmt;

use crate::register::CALIBRATION_LEN;

/// The 14 byte factory calibration block of one particular sensor.
///
/// The driver does not interpret the contents. Read it once with
/// [`crate::Tmf8805::perform_calibration`], store it wherever you like, and
/// hand it back with [`crate::Tmf8805::set_calibration`] after every power
/// cycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration([u8; CALIBRATION_LEN]);

impl Calibration {
    /// Wrap raw calibration bytes.
    pub const fn new(bytes: [u8; CALIBRATION_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw calibration bytes.
    pub const fn as_bytes(&self) -> &[u8; CALIBRATION_LEN] {
        &self.0
    }
}

impl From<[u8; CALIBRATION_LEN]> for Calibration {
    fn from(bytes: [u8; CALIBRATION_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Calibration> for [u8; CALIBRATION_LEN] {
    fn from(calibration: Calibration) -> Self {
        calibration.0
    }
}

/// The slice was not exactly [`CALIBRATION_LEN`] bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength(pub usize);

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "calibration data must be {CALIBRATION_LEN} bytes, got {}",
            self.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidLength {}

impl TryFrom<&[u8]> for Calibration {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| InvalidLength(bytes.len()))
    }
}

impl AsRef<[u8]> for Calibration {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Calibration({:02x?})", self.0)
    }
}
