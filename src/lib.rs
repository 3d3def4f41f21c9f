#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

//! # BMP085 Barometric Pressure Sensor Driver
//!
//! A platform-agnostic, `no_std` driver for the Bosch BMP085.
//! This driver uses the typestate pattern to ensure the factory calibration
//! EEPROM has been read before any measurement is taken.
//!
//! ## Features
//! - **Fixed-Point Compensation**: the datasheet's integer algorithm,
//!   verified against its worked example. No FPU required for pressure.
//! - **Typestate Pattern**: prevents measuring before initialization.
//! - **Four Oversampling Modes**: from ultra-low-power to ultra-high-res,
//!   with the matching conversion delays handled internally.
//!
//! ## Units
//! - **Temperature**: degrees Celsius (`f32`, tenths-of-a-degree accurate)
//! - **Pressure**: Pascal (Pa) -> 101325 = 1013.25 hPa
//!
//! ## Example
//! ```
//! use bmp085_driver::{Bmp085, Oversampling, DEFAULT_ADDRESS};
//! use embedded_hal_mock::eh1::delay::NoopDelay;
//! use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
//!
//! // Calibration EEPROM contents followed by one temperature conversion
//! // (values from the datasheet's worked example; use a real bus instead).
//! let mut i2c = I2cMock::new(&[
//!     I2cTransaction::write_read(0x77, vec![0xAA], vec![0x01, 0x98]),
//!     I2cTransaction::write_read(0x77, vec![0xAC], vec![0xFF, 0xB8]),
//!     I2cTransaction::write_read(0x77, vec![0xAE], vec![0xC7, 0xD1]),
//!     I2cTransaction::write_read(0x77, vec![0xB0], vec![0x7F, 0xE5]),
//!     I2cTransaction::write_read(0x77, vec![0xB2], vec![0x7F, 0xF5]),
//!     I2cTransaction::write_read(0x77, vec![0xB4], vec![0x5A, 0x71]),
//!     I2cTransaction::write_read(0x77, vec![0xB6], vec![0x18, 0x2E]),
//!     I2cTransaction::write_read(0x77, vec![0xB8], vec![0x00, 0x04]),
//!     I2cTransaction::write_read(0x77, vec![0xBA], vec![0x80, 0x00]),
//!     I2cTransaction::write_read(0x77, vec![0xBC], vec![0xDD, 0xF9]),
//!     I2cTransaction::write_read(0x77, vec![0xBE], vec![0x0B, 0x34]),
//!     I2cTransaction::write(0x77, vec![0xF4, 0x2E]),
//!     I2cTransaction::write_read(0x77, vec![0xF6], vec![0x6C, 0xFA]),
//! ]);
//!
//! let bmp085 = Bmp085::new(i2c.clone(), DEFAULT_ADDRESS, Oversampling::Standard);
//! let mut bmp085 = bmp085.init().unwrap();
//!
//! let mut delay = NoopDelay::new();
//! let celsius = bmp085.read_temperature(&mut delay).unwrap();
//! assert_eq!(celsius, 15.0);
//! i2c.done();
//! ```

mod calc;
mod settings;

pub use settings::Oversampling;

use core::marker::PhantomData;
use embedded_hal::{delay::DelayNs, i2c};

/// Register map and control commands.
pub(crate) mod regs {
    pub const CAL_AC1: u8 = 0xAA;
    pub const CAL_AC2: u8 = 0xAC;
    pub const CAL_AC3: u8 = 0xAE;
    pub const CAL_AC4: u8 = 0xB0;
    pub const CAL_AC5: u8 = 0xB2;
    pub const CAL_AC6: u8 = 0xB4;
    pub const CAL_B1: u8 = 0xB6;
    pub const CAL_B2: u8 = 0xB8;
    pub const CAL_MB: u8 = 0xBA;
    pub const CAL_MC: u8 = 0xBC;
    pub const CAL_MD: u8 = 0xBE;
    pub const CHIP_ID: u8 = 0xD0;
    pub const CONTROL: u8 = 0xF4;
    pub const DATA: u8 = 0xF6;

    pub const READ_TEMP_CMD: u8 = 0x2E;
    pub const READ_PRESSURE_CMD: u8 = 0x34;
}

/// Default 7-bit I2C address of the sensor.
pub const DEFAULT_ADDRESS: u8 = 0x77;

/// Value the chip-id register (0xD0) reads back on a genuine BMP085.
pub const CHIP_ID: u8 = 0x55;

/// Temperature conversions always take 4.5 ms, independent of the
/// oversampling setting.
const TEMP_SETTLING_MS: u32 = 5;

// --- Typestates ---

/// Driver has been created but the calibration EEPROM has not been read yet.
pub struct Uninitialized;
/// Calibration is loaded; the driver is ready for measurements.
pub struct Ready;

/// Error types for the BMP085 driver.
pub mod error {
    /// Errors that can occur during communication or conversion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Bmp085Error<E> {
        /// I2C bus error during a measurement sequence.
        I2CError(E),
        /// I2C bus error while reading the factory calibration EEPROM.
        /// The driver never becomes ready; no partial calibration is kept.
        CalibrationReadError(E),
        /// A calibration-derived divisor evaluated to zero. Only reachable
        /// with degenerate coefficients (disconnected sensor, corrupted
        /// EEPROM).
        ArithmeticError,
    }

    /// Result type alias for BMP085 operations.
    pub type Result<T, E> = core::result::Result<T, Bmp085Error<E>>;
}

/// Factory calibration coefficients read from the sensor's EEPROM.
/// These are unique to every individual chip and required by the
/// compensation formulas.
///
/// Words are stored big-endian at contiguous even addresses 0xAA..0xBE.
/// Eight of the eleven are two's-complement signed; AC4..AC6 are unsigned.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

/// A compensated temperature/pressure pair from a single measurement cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Pressure in Pascal.
    pub pressure: u32,
}

/// The main BMP085 driver structure.
///
/// Use [`Bmp085::new`] followed by [`Bmp085::init`] to obtain a measuring
/// driver. The `STATE` generic uses the typestate pattern to track
/// initialization status at compile time.
#[derive(Debug, Copy, Clone)]
pub struct Bmp085<I2C, STATE> {
    i2c: I2C,
    address: u8,
    mode: Oversampling,
    calibration: Calibration,
    _state: PhantomData<STATE>,
}

impl<I2C, E> Bmp085<I2C, Uninitialized>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Creates a new driver instance in the `Uninitialized` state.
    ///
    /// This does not communicate with the sensor yet.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus object.
    /// * `address` - The 7-bit I2C address (normally [`DEFAULT_ADDRESS`]).
    /// * `mode` - The oversampling setting, fixed for the driver's lifetime.
    pub fn new(i2c: I2C, address: u8, mode: Oversampling) -> Bmp085<I2C, Uninitialized> {
        Bmp085 {
            i2c,
            address,
            mode,
            calibration: Calibration::default(),
            _state: PhantomData,
        }
    }

    /// Reads the eleven factory calibration words and transitions the
    /// driver from `Uninitialized` to `Ready`.
    ///
    /// # Errors
    /// Any I2C failure during the sequence aborts initialization with
    /// [`error::Bmp085Error::CalibrationReadError`]; the `Ready` driver is
    /// never constructed.
    pub fn init(mut self) -> error::Result<Bmp085<I2C, Ready>, E> {
        let calibration = self.load_calibration()?;

        Ok(Bmp085 {
            i2c: self.i2c,
            address: self.address,
            mode: self.mode,
            calibration,
            _state: PhantomData,
        })
    }

    fn load_calibration(&mut self) -> error::Result<Calibration, E> {
        Ok(Calibration {
            ac1: self.read_cal_signed(regs::CAL_AC1)?,
            ac2: self.read_cal_signed(regs::CAL_AC2)?,
            ac3: self.read_cal_signed(regs::CAL_AC3)?,
            ac4: self.read_cal_word(regs::CAL_AC4)?,
            ac5: self.read_cal_word(regs::CAL_AC5)?,
            ac6: self.read_cal_word(regs::CAL_AC6)?,
            b1: self.read_cal_signed(regs::CAL_B1)?,
            b2: self.read_cal_signed(regs::CAL_B2)?,
            mb: self.read_cal_signed(regs::CAL_MB)?,
            mc: self.read_cal_signed(regs::CAL_MC)?,
            md: self.read_cal_signed(regs::CAL_MD)?,
        })
    }

    /// Reads one unsigned calibration word (AC4..AC6).
    fn read_cal_word(&mut self, reg_address: u8) -> error::Result<u16, E> {
        self.read_be_u16(reg_address)
            .map_err(error::Bmp085Error::CalibrationReadError)
    }

    /// Reads one calibration word and reinterprets it as two's-complement
    /// signed. Applied uniformly to AC1..AC3, B1, B2, MB, MC and MD.
    fn read_cal_signed(&mut self, reg_address: u8) -> error::Result<i16, E> {
        self.read_cal_word(reg_address).map(|raw| raw as i16)
    }
}

impl<I2C, STATE, E> Bmp085<I2C, STATE>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Reads the chip-id register (expected value: [`CHIP_ID`]).
    ///
    /// Useful to verify wiring and addressing before initialization.
    pub fn read_chip_id(&mut self) -> error::Result<u8, E> {
        let mut buffer = [0];
        self.read_into(regs::CHIP_ID, &mut buffer)
            .map_err(error::Bmp085Error::I2CError)?;
        Ok(buffer[0])
    }

    /// The oversampling setting this driver was constructed with.
    pub fn mode(&self) -> Oversampling {
        self.mode
    }

    /// Releases the I2C bus, consuming the driver.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Reads a big-endian 16-bit quantity from a register pair.
    fn read_be_u16(&mut self, reg_address: u8) -> Result<u16, E> {
        let mut buffer = [0u8; 2];
        self.read_into(reg_address, &mut buffer)?;
        Ok(u16::from_be_bytes(buffer))
    }

    /// Reads data from a starting register address into a provided buffer.
    fn read_into(&mut self, reg_address: u8, buffer: &mut [u8]) -> Result<(), E> {
        self.i2c.write_read(self.address, &[reg_address], buffer)
    }

    /// Writes a `[register, value]` pair to the sensor.
    fn write_reg(&mut self, data: &[u8]) -> Result<(), E> {
        self.i2c.write(self.address, data)
    }
}

impl<I2C, E> Bmp085<I2C, Ready>
where
    I2C: i2c::I2c<Error = E>,
{
    /// The calibration coefficients loaded at initialization (diagnostics).
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Triggers a temperature conversion, waits for it to settle and
    /// returns the raw 16-bit ADC word.
    ///
    /// Exposed for diagnostics; most callers want
    /// [`read_temperature`](Self::read_temperature).
    pub fn read_raw_temperature(&mut self, delay: &mut impl DelayNs) -> error::Result<u16, E> {
        self.write_reg(&[regs::CONTROL, regs::READ_TEMP_CMD])
            .map_err(error::Bmp085Error::I2CError)?;

        delay.delay_ms(TEMP_SETTLING_MS);

        self.read_be_u16(regs::DATA)
            .map_err(error::Bmp085Error::I2CError)
    }

    /// Triggers a pressure conversion at the configured oversampling mode,
    /// waits the mode-dependent settling time and returns the raw
    /// up-to-19-bit ADC value.
    pub fn read_raw_pressure(&mut self, delay: &mut impl DelayNs) -> error::Result<u32, E> {
        self.write_reg(&[regs::CONTROL, self.mode.pressure_command()])
            .map_err(error::Bmp085Error::I2CError)?;

        delay.delay_ms(self.mode.settling_time_ms());

        let mut buffer = [0u8; 3];
        self.read_into(regs::DATA, &mut buffer)
            .map_err(error::Bmp085Error::I2CError)?;

        let raw = ((buffer[0] as u32) << 16) | ((buffer[1] as u32) << 8) | (buffer[2] as u32);
        Ok(raw >> self.mode.raw_shift())
    }

    /// Measures and returns the compensated temperature in degrees Celsius.
    pub fn read_temperature(&mut self, delay: &mut impl DelayNs) -> error::Result<f32, E> {
        let ut = self.read_raw_temperature(delay)?;
        let tenths = self
            .calibration
            .true_temperature(ut)
            .ok_or(error::Bmp085Error::ArithmeticError)?;
        Ok(tenths as f32 / 10.0)
    }

    /// Measures and returns the compensated pressure in Pascal.
    ///
    /// Pressure compensation needs a temperature intermediate from the same
    /// cycle, so every call runs a full temperature conversion followed by
    /// a pressure conversion; nothing is cached across calls.
    pub fn read_pressure(&mut self, delay: &mut impl DelayNs) -> error::Result<u32, E> {
        let ut = self.read_raw_temperature(delay)?;
        let up = self.read_raw_pressure(delay)?;
        let pascal = self
            .calibration
            .true_pressure(ut, up, self.mode)
            .ok_or(error::Bmp085Error::ArithmeticError)?;
        Ok(pascal as u32)
    }

    /// Measures temperature and pressure in one acquisition cycle.
    ///
    /// Cheaper than calling [`read_temperature`](Self::read_temperature)
    /// and [`read_pressure`](Self::read_pressure) back to back, which would
    /// trigger the temperature conversion twice.
    pub fn read_measurement(&mut self, delay: &mut impl DelayNs) -> error::Result<Measurement, E> {
        let ut = self.read_raw_temperature(delay)?;
        let up = self.read_raw_pressure(delay)?;

        let tenths = self
            .calibration
            .true_temperature(ut)
            .ok_or(error::Bmp085Error::ArithmeticError)?;
        let pascal = self
            .calibration
            .true_pressure(ut, up, self.mode)
            .ok_or(error::Bmp085Error::ArithmeticError)?;

        Ok(Measurement {
            temperature: tenths as f32 / 10.0,
            pressure: pascal as u32,
        })
    }

    /// Measures pressure and derives the altitude in meters above the given
    /// sea-level reference pressure (Pa), using the international barometric
    /// formula.
    pub fn read_altitude(
        &mut self,
        delay: &mut impl DelayNs,
        sea_level_pa: f32,
    ) -> error::Result<f32, E> {
        let pascal = self.read_pressure(delay)? as f32;
        Ok(44330.0 * (1.0 - libm::powf(pascal / sea_level_pa, 1.0 / 5.255)))
    }
}
