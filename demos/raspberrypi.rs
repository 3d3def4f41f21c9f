//! One-shot barometer readout on a Raspberry Pi (or any Linux host with an
//! I2C character device).
//!
//! Prints tab-separated `name value epoch` lines, suitable for piping into
//! a time-series collector:
//!
//! ```text
//! temperature  21.3     1756450000
//! pressure     1013.25  1756450000
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use bmp085_driver::{Bmp085, Oversampling, DEFAULT_ADDRESS};
use linux_embedded_hal::{Delay, I2cdev};

fn main() {
    let dev = I2cdev::new("/dev/i2c-1").expect("failed to open I2C bus");
    let bmp085 = Bmp085::new(dev, DEFAULT_ADDRESS, Oversampling::Standard);
    let mut bmp085 = bmp085.init().expect("failed to read calibration data");

    let mut delay = Delay;
    let measurement = bmp085
        .read_measurement(&mut delay)
        .expect("failed to read sensor");

    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs();

    println!("temperature\t{}\t{}", measurement.temperature, epoch);
    // Report pressure in hPa.
    println!("pressure\t{}\t{}", measurement.pressure as f32 / 100.0, epoch);
}
