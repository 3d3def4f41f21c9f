//! Fixed-point compensation formulas from the Bosch BMP085 datasheet.
//!
//! Everything in this module is a pure function of the factory calibration
//! coefficients and the raw ADC words, so the formulas can be verified on
//! the host against the datasheet's worked example without any bus traffic.

use crate::{Calibration, Oversampling};

impl Calibration {
    /// Temperature intermediate `b5`, shared between the temperature and
    /// pressure compensation chains.
    ///
    /// Returns `None` when `x1 + md` is zero, which only happens with
    /// degenerate coefficients (disconnected sensor, corrupted EEPROM).
    pub(crate) fn b5(&self, ut: u16) -> Option<i64> {
        let x1 = ((ut as i64 - self.ac6 as i64) * self.ac5 as i64) >> 15;
        let divisor = x1 + self.md as i64;
        if divisor == 0 {
            return None;
        }
        // Signed division truncates toward zero, as in the reference code.
        let x2 = ((self.mc as i64) << 11) / divisor;
        Some(x1 + x2)
    }

    /// Compensates a raw temperature word into tenths of a degree Celsius
    /// (e.g. `150` = 15.0 °C).
    pub(crate) fn true_temperature(&self, ut: u16) -> Option<i32> {
        let b5 = self.b5(ut)?;
        Some(((b5 + 8) >> 4) as i32)
    }

    /// Compensates a raw pressure value into Pascals.
    ///
    /// `ut` must come from the same measurement cycle as `up`: the pressure
    /// chain reuses the temperature intermediate `b5`. `mode` must be the
    /// oversampling setting the conversion was triggered with, since it
    /// scales both `b3` and `b7`.
    ///
    /// Intermediates are widened to 64 bits; `(ut - ac6) * ac5` and `b7`
    /// exceed 32 bits for legal extreme inputs. The `b7` branch point is
    /// therefore kept as an explicit threshold test instead of relying on
    /// a sign flip.
    pub(crate) fn true_pressure(&self, ut: u16, up: u32, mode: Oversampling) -> Option<i32> {
        let b5 = self.b5(ut)?;

        let b6 = b5 - 4000;
        let x1 = ((self.b2 as i64) * ((b6 * b6) >> 12)) >> 11;
        let x2 = ((self.ac2 as i64) * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = ((((self.ac1 as i64) * 4 + x3) << (mode as u32)) + 2) / 4;

        let x1 = ((self.ac3 as i64) * b6) >> 13;
        let x2 = ((self.b1 as i64) * ((b6 * b6) >> 12)) >> 16;
        let x3 = (x1 + x2 + 2) >> 2;
        let b4 = ((self.ac4 as i64) * (x3 + 32768)) >> 15;
        if b4 == 0 {
            return None;
        }

        let b7 = (up as i64 - b3) * (50000 >> (mode as u32));
        let p = if b7 < 0x8000_0000 {
            (b7 * 2) / b4
        } else {
            (b7 / b4) * 2
        };

        let x1 = (p >> 8) * (p >> 8);
        let x1 = (x1 * 3038) >> 16;
        let x2 = (-7357 * p) >> 16;
        Some((p + ((x1 + x2 + 3791) >> 4)) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Worked-example coefficients from the BMP085 datasheet.
    fn datasheet_calibration() -> Calibration {
        Calibration {
            ac1: 408,
            ac2: -72,
            ac3: -14383,
            ac4: 32741,
            ac5: 32757,
            ac6: 23153,
            b1: 6190,
            b2: 4,
            mb: -32768,
            mc: -8711,
            md: 2868,
        }
    }

    #[test]
    fn datasheet_temperature_example() {
        let cal = datasheet_calibration();
        assert_eq!(cal.true_temperature(27898), Some(150));
    }

    #[test]
    fn datasheet_pressure_example() {
        // The datasheet's worked pressure example is computed at oss = 0.
        let cal = datasheet_calibration();
        assert_eq!(
            cal.true_pressure(27898, 23843, Oversampling::UltraLowPower),
            Some(69964)
        );
    }

    #[test]
    fn pressure_formula_tracks_oversampling_mode() {
        // Same raw words pushed through the other three modes. This pins the
        // `<< mode` term in b3 and the `50000 >> mode` term in b7.
        let cal = datasheet_calibration();
        let cases = [
            (Oversampling::Standard, 34416),
            (Oversampling::HighRes, 16686),
            (Oversampling::UltraHighRes, 7831),
        ];
        for (mode, expected) in cases {
            assert_eq!(cal.true_pressure(27898, 23843, mode), Some(expected));
        }
    }

    #[test]
    fn negative_intermediates_truncate_toward_zero() {
        // A cold reading drives b5 negative; the result pins the rounding
        // direction of the signed division and arithmetic shifts.
        let cal = datasheet_calibration();
        assert_eq!(cal.true_temperature(23000), Some(-420));
    }

    #[test]
    fn b7_branch_boundary_is_continuous() {
        // With this calibration and ut, b3 = 422 at oss = 0, so
        // up = 43371 gives b7 = 2147450000 (below 2^31) and
        // up = 43372 gives b7 = 2147500000 (above it).
        let cal = datasheet_calibration();
        let below = cal
            .true_pressure(27898, 43371, Oversampling::UltraLowPower)
            .unwrap();
        let above = cal
            .true_pressure(27898, 43372, Oversampling::UltraLowPower)
            .unwrap();
        assert_eq!(below, 128433);
        assert_eq!(above, 128435);
        assert!((above - below).abs() <= 4);
    }

    #[test]
    fn zero_temperature_divisor_is_detected() {
        // All-zero coefficients make x1 + md zero.
        let cal = Calibration::default();
        assert_eq!(cal.true_temperature(0), None);
        assert_eq!(cal.true_pressure(0, 0, Oversampling::Standard), None);
    }

    #[test]
    fn zero_b4_divisor_is_detected() {
        // md = 1 keeps the temperature chain alive while ac4 = 0 forces
        // b4 to zero in the pressure chain.
        let cal = Calibration {
            md: 1,
            ..Calibration::default()
        };
        assert_eq!(cal.true_temperature(0), Some(0));
        assert_eq!(cal.true_pressure(0, 0, Oversampling::Standard), None);
    }
}
