//! Thermistor resistance to temperature model.
//!
//! The divider is read as `supply -- thermistor -- ADC pin -- series resistor -- GND`
//! and the thermistor resistance is turned into a temperature with a
//! B-parameter model whose B value is corrected by an empirical power law.

/// Full scale of the 10-bit converter the model was fitted against.
pub const ADC_FULL_SCALE: u16 = 1024;

/// Largest raw value an [`AnalogSample`] can hold.
pub const ADC_MAX: u16 = ADC_FULL_SCALE - 1;

/// 25 °C, the temperature the nominal B coefficient is specified at.
pub const REFERENCE_TEMPERATURE_KELVIN: f64 = 298.15;

/// Resistance divisor used in the logarithm term.
pub const DIVISOR_CONSTANT: f64 = 10.;

/// Exponent of the power-law correction applied to the nominal B coefficient.
const B_CORRECTION_EXPONENT: f64 = -0.012329;

const KELVIN_OFFSET: f64 = 273.15;

/// One quantized voltage reading, always in `0..=1023`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct AnalogSample(u16);

impl AnalogSample {
    /// Values above the converter's range saturate at [`ADC_MAX`].
    pub fn new(raw: u16) -> Self {
        AnalogSample(raw.min(ADC_MAX))
    }

    /// Build a sample from a signed converter word. Single-ended SAADC
    /// conversions can dip slightly below zero, those read as 0.
    pub fn from_word(word: i32) -> Self {
        AnalogSample(word.clamp(0, ADC_MAX as i32) as u16)
    }

    pub fn raw(&self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct TemperatureReading {
    pub celsius: f64,
}

/// Electrical and material constants of one sensing channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct ThermistorChannel {
    pub series_resistance: f64,
    pub supply_voltage: f64,
    pub b_coefficient: f64,
    pub reference_temperature_kelvin: f64,
    pub divisor_constant: f64,
}

impl ThermistorChannel {
    pub const fn new(series_resistance: f64, supply_voltage: f64, b_coefficient: f64) -> Self {
        ThermistorChannel {
            series_resistance,
            supply_voltage,
            b_coefficient,
            reference_temperature_kelvin: REFERENCE_TEMPERATURE_KELVIN,
            divisor_constant: DIVISOR_CONSTANT,
        }
    }

    /// Voltage at the ADC pin for the given sample.
    pub fn output_voltage(&self, sample: AnalogSample) -> f64 {
        sample.raw() as f64 * self.supply_voltage / ADC_FULL_SCALE as f64
    }

    /// Thermistor resistance, in the same unit as `series_resistance`.
    ///
    /// A zero sample divides by zero and yields infinity.
    pub fn resistance(&self, sample: AnalogSample) -> f64 {
        let output_voltage = self.output_voltage(sample);
        (self.supply_voltage * self.series_resistance) / output_voltage - self.series_resistance
    }

    /// Convert one sample into a temperature.
    ///
    /// Inputs outside the sensor's working range are not rejected, the
    /// non-finite intermediate values simply propagate into the result.
    pub fn convert(&self, sample: AnalogSample) -> TemperatureReading {
        let resistance = self.resistance(sample);
        let b_effective = self.b_coefficient * libm::pow(resistance, B_CORRECTION_EXPONENT);
        let celsius = b_effective
            / libm::log(
                resistance * libm::exp(b_effective / self.reference_temperature_kelvin)
                    / self.divisor_constant,
            )
            - KELVIN_OFFSET;

        TemperatureReading { celsius }
    }
}

/// Free-standing form of [`ThermistorChannel::convert`].
pub fn convert(sample: AnalogSample, channel: &ThermistorChannel) -> TemperatureReading {
    channel.convert(sample)
}
