//! TMF8805 register map, command bytes and bit masks.
//!
//! Every register is a single byte wide unless noted otherwise; multi-byte
//! blocks are addressed by their first register.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Register {
    APPID = 0x00,
    APPREV_MAJOR = 0x01,
    APPREQID = 0x02,
    COMMAND = 0x10,
    APPREV_MINOR = 0x12,
    APPREV_PATCH = 0x13,
    STATUS = 0x1d,
    REGISTER_CONTENTS = 0x1e,
    /// 14 bytes, shares its address with the result number register.
    FACTORY_CALIB_0 = 0x20,
    RESULT_INFO = 0x21,
    DISTANCE_PEAK_0 = 0x22,
    DISTANCE_PEAK_1 = 0x23,
    /// 11 bytes of algorithm state, written after the calibration data.
    STATE_DATA_WR_0 = 0x2e,
    ENABLE_REG = 0xe0,
    INT_STATUS = 0xe1,
    INT_ENAB = 0xe2,
    ID = 0xe3,
    REVID = 0xe4,
}

impl Register {
    pub(crate) const fn addr(&self) -> u8 {
        *self as u8
    }
}

/// Default I<sup>2</sup>C address of the TMF8805.
pub const PERIPHERAL_ADDR: u8 = 0x41;

/// Value of the ID register on a genuine TMF8805.
pub const CHIP_ID: u8 = 0x07;

/// Application selector for the measurement application.
pub(crate) const APP_MEASUREMENT: u8 = 0xc0;

pub(crate) const CMD_MEASURE: u8 = 0x02;
pub(crate) const CMD_FACTORY_CALIBRATION: u8 = 0x0a;
pub(crate) const CMD_APPLY_CALIBRATION: u8 = 0x0b;

/// Echoed into [`Register::REGISTER_CONTENTS`] once a result is ready.
pub(crate) const CONTENT_RESULT: u8 = 0x55;
/// Echoed into [`Register::REGISTER_CONTENTS`] once factory calibration finished.
pub(crate) const CONTENT_CALIBRATION: u8 = 0x0a;

pub(crate) const INTERRUPT_MASK: u8 = 0x01;

/// Bit of [`Register::ENABLE_REG`] that the sensor sets once its CPU accepts commands.
pub(crate) const CPU_READY_BIT: u8 = 6;

/// Raw [`Register::STATUS`] value reported when no factory calibration is loaded.
pub(crate) const STATUS_MISSING_FACTORY_CALIBRATION: u8 = 39;

/// Length of the factory calibration block.
pub const CALIBRATION_LEN: usize = 14;

/// Algorithm state written after the calibration data (AN000597, p. 22).
pub(crate) const ALGO_STATE: [u8; 11] = [
    0xb1, 0xa9, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_match_datasheet() {
        assert_eq!(Register::APPID.addr(), 0x00);
        assert_eq!(Register::APPREQID.addr(), 0x02);
        assert_eq!(Register::COMMAND.addr(), 0x10);
        assert_eq!(Register::STATUS.addr(), 0x1d);
        assert_eq!(Register::REGISTER_CONTENTS.addr(), 0x1e);
        assert_eq!(Register::FACTORY_CALIB_0.addr(), 0x20);
        assert_eq!(Register::RESULT_INFO.addr(), 0x21);
        assert_eq!(Register::DISTANCE_PEAK_0.addr(), 0x22);
        assert_eq!(Register::DISTANCE_PEAK_1.addr(), 0x23);
        assert_eq!(Register::STATE_DATA_WR_0.addr(), 0x2e);
        assert_eq!(Register::ENABLE_REG.addr(), 0xe0);
        assert_eq!(Register::INT_STATUS.addr(), 0xe1);
        assert_eq!(Register::INT_ENAB.addr(), 0xe2);
    }
}
