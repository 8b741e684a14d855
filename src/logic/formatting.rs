use heapless::String;
use ufmt::uwrite;

use crate::peripherals::accelerometer::AccelerometerSample;

use super::thermistor::TemperatureReading;

/// Terminator appended to every report line.
pub const LINE_END: &str = "\r\n";

/// Fraction digits supported by [`format_float`].
pub const MAX_DECIMAL_PLACES: u8 = 6;

/// Room for three values of the widest float representation plus the JSON
/// decorations and the line terminator.
pub const LINE_CAPACITY: usize = 96;

pub type Line = String<LINE_CAPACITY>;
pub type Number = String<24>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum VectorFormat {
    /// `{"x":<v>,"y":<v>,"z":<v>}`
    Json,
    /// `<x>,<y>,<z>`
    Csv,
}

fn u64_len(num: u64) -> u8 {
    if num == 0 {
        return 1;
    }
    let mut count = 0;
    let mut num = num;
    while num > 0 {
        num /= 10_u64;
        count += 1;
    }
    count
}

/// Render a float with a fixed number of fraction digits.
///
/// Rounding carries into the integer part (`1.99996` at 4 places is
/// `2.0000`). Non-finite values are rendered as `nan`, `inf` and `-inf`,
/// and so are magnitudes whose scaled form does not fit a `u64`.
pub fn format_float(value: f64, precision: u8) -> Number {
    let mut output = Number::new();

    if value.is_nan() {
        // "nan" always fits
        let _ = output.push_str("nan");
        return output;
    }

    let precision = precision.min(MAX_DECIMAL_PLACES);
    let times = 10_u64.pow(precision as u32);
    let scaled = libm::round(libm::fabs(value) * times as f64);
    // `u64::MAX as f64` is 2^64, the first value that no longer fits
    if value.is_infinite() || scaled >= u64::MAX as f64 {
        let _ = output.push_str(if value < 0. { "-inf" } else { "inf" });
        return output;
    }
    let scaled = scaled as u64;
    let int_part = scaled / times;
    let frac_part = scaled % times;

    // -0.00001 rounds to zero and should not print a sign
    if value.is_sign_negative() && scaled != 0 {
        let _ = output.push('-');
    }
    let _ = uwrite!(output, "{}", int_part);
    if precision > 0 {
        let _ = output.push('.');
        for _ in 0..(precision - u64_len(frac_part)) {
            let _ = output.push('0');
        }
        let _ = uwrite!(output, "{}", frac_part);
    }

    output
}

/// `23.4567\r\n`
pub fn format_temperature_line(reading: &TemperatureReading, precision: u8) -> Line {
    let mut line = Line::new();
    let _ = line.push_str(&format_float(reading.celsius, precision));
    let _ = line.push_str(LINE_END);
    line
}

pub fn format_vector_line(
    sample: &AccelerometerSample,
    format: VectorFormat,
    precision: u8,
) -> Line {
    let x = format_float(sample.x as f64, precision);
    let y = format_float(sample.y as f64, precision);
    let z = format_float(sample.z as f64, precision);

    let mut line = Line::new();
    // The three numbers are bounded by `Number`, so the line always fits.
    match format {
        VectorFormat::Json => {
            let _ = line.push('{');
            let _ = uwrite!(
                line,
                "\"x\":{},\"y\":{},\"z\":{}",
                x.as_str(),
                y.as_str(),
                z.as_str()
            );
            let _ = line.push('}');
        }
        VectorFormat::Csv => {
            let _ = uwrite!(line, "{},{},{}", x.as_str(), y.as_str(), z.as_str());
        }
    }
    let _ = line.push_str(LINE_END);
    line
}
