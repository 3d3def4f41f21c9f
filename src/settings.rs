use crate::regs;

/// Hardware oversampling setting for pressure measurements.
///
/// Higher settings average more internal samples, which reduces noise but
/// lengthens the conversion time and raises power consumption per cycle.
/// Temperature conversions always take 4.5 ms regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Oversampling {
    /// Single sample, 4.5 ms conversion. Lowest power draw.
    UltraLowPower = 0,
    /// 2 samples, 7.5 ms conversion.
    #[default]
    Standard = 1,
    /// 4 samples, 13.5 ms conversion.
    HighRes = 2,
    /// 8 samples, 25.5 ms conversion. Maximum precision, longest duration.
    UltraHighRes = 3,
}

impl Oversampling {
    /// Creates an instance from a raw value (helpful when parsing registers).
    /// Out-of-range values fall back to [`Oversampling::Standard`].
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Oversampling::UltraLowPower,
            1 => Oversampling::Standard,
            2 => Oversampling::HighRes,
            3 => Oversampling::UltraHighRes,
            _ => Oversampling::Standard,
        }
    }

    /// Worst-case conversion time in milliseconds for a pressure measurement
    /// at this setting. The driver blocks for this long between triggering a
    /// conversion and reading the ADC registers.
    pub fn settling_time_ms(self) -> u32 {
        match self {
            Oversampling::UltraLowPower => 5,
            Oversampling::Standard => 8,
            Oversampling::HighRes => 14,
            Oversampling::UltraHighRes => 26,
        }
    }

    /// Right-shift applied when assembling the up-to-19-bit raw pressure
    /// value from its three data bytes.
    pub fn raw_shift(self) -> u32 {
        8 - self as u32
    }

    /// Control-register command that triggers a pressure conversion at this
    /// setting. The oversampling ratio sits in bits 7..6.
    pub fn pressure_command(self) -> u8 {
        regs::READ_PRESSURE_CMD + ((self as u8) << 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Oversampling; 4] = [
        Oversampling::UltraLowPower,
        Oversampling::Standard,
        Oversampling::HighRes,
        Oversampling::UltraHighRes,
    ];

    #[test]
    fn settling_times_match_datasheet() {
        let expected = [5, 8, 14, 26];
        for (mode, ms) in ALL.iter().zip(expected) {
            assert_eq!(mode.settling_time_ms(), ms);
        }
    }

    #[test]
    fn raw_shift_per_mode() {
        let expected = [8, 7, 6, 5];
        for (mode, shift) in ALL.iter().zip(expected) {
            assert_eq!(mode.raw_shift(), shift);
        }
    }

    #[test]
    fn pressure_command_encodes_mode() {
        let expected = [0x34, 0x74, 0xB4, 0xF4];
        for (mode, cmd) in ALL.iter().zip(expected) {
            assert_eq!(mode.pressure_command(), cmd);
        }
    }

    #[test]
    fn from_u8_round_trips() {
        for mode in ALL {
            assert_eq!(Oversampling::from_u8(mode as u8), mode);
        }
        assert_eq!(Oversampling::from_u8(17), Oversampling::Standard);
    }
}
