//! Decoding of the raw result registers.

/// Quality fields packed into the result info register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResultInfo {
    /// Reliability of the result, 0 (unreliable) to 63.
    pub reliability: u8,
    /// Two bit measurement status.
    pub status: u8,
}

impl ResultInfo {
    /// Decode a raw result info byte.
    ///
    /// The fields come out of the sensor bit-mirrored: after reversing the
    /// byte, the upper six bits are the reliability and the lower two the
    /// status. This is how the hardware lays the byte out; a plain mask of
    /// the low six bits gives wrong values for anything but palindromes.
    pub const fn from_raw(raw: u8) -> Self {
        let mirrored = raw.reverse_bits();
        Self {
            reliability: mirrored >> 2,
            status: mirrored & 0b11,
        }
    }
}

/// Assemble the distance (millimeters) from the two peak registers.
#[inline]
pub const fn distance(peak_high: u8, peak_low: u8) -> u16 {
    u16::from_be_bytes([peak_high, peak_low])
}

/// A TMF8805 measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Measured distance to the target (millimeters).
    pub distance: u16,
    /// Reliability of the result, 0 to 63.
    pub reliability: u8,
    /// Measurement status bits from the result info register.
    pub status: u8,
    /// Raw high byte of the distance.
    pub peak_high: u8,
    /// Raw low byte of the distance.
    pub peak_low: u8,
}

impl Measurement {
    pub(crate) const fn new(info: ResultInfo, peak_high: u8, peak_low: u8) -> Self {
        Self {
            distance: distance(peak_high, peak_low),
            reliability: info.reliability,
            status: info.status,
            peak_high,
            peak_low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_reliability_fixture() {
        let info = ResultInfo::from_raw(63);
        assert_eq!(info.reliability, 63);
        assert_eq!(info.status, 0);
    }

    #[test]
    fn fields_are_mirrored() {
        // bit 0 is the most significant reliability bit
        assert_eq!(ResultInfo::from_raw(0b0000_0001).reliability, 0b10_0000);
        assert_eq!(ResultInfo::from_raw(0b0010_0000).reliability, 0b00_0001);
        // bit 6 is the high status bit, bit 7 the low one
        assert_eq!(ResultInfo::from_raw(0b0100_0000).status, 0b10);
        assert_eq!(ResultInfo::from_raw(0b1000_0000).status, 0b01);
        assert_eq!(
            ResultInfo::from_raw(0xff),
            ResultInfo {
                reliability: 63,
                status: 3
            }
        );
    }

    #[test]
    fn distance_is_high_byte_first() {
        assert_eq!(distance(0x04, 0xe2), 1250);
        assert_eq!(distance(0x00, 0x00), 0);
        assert_eq!(distance(0xff, 0xff), u16::MAX);
        for (high, low) in [(1, 0), (0, 1), (0x12, 0x34), (0x80, 0x7f)] {
            assert_eq!(distance(high, low), u16::from(high) * 256 + u16::from(low));
        }
    }

    #[test]
    fn measurement_carries_raw_peaks() {
        let m = Measurement::new(ResultInfo::from_raw(0x3f), 0x04, 0xe2);
        assert_eq!(m.distance, 1250);
        assert_eq!(m.reliability, 63);
        assert_eq!((m.peak_high, m.peak_low), (0x04, 0xe2));
    }
}
