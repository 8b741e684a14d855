//! Run configuration.
//!
//! The typed [`Config`] is what the dispatcher works with. Firmware builds
//! fill it from `cfg.toml` (see `cfg.toml.example`) through `toml-cfg`;
//! anything not set there keeps the defaults below.

use crate::logic::formatting::{VectorFormat, MAX_DECIMAL_PLACES};
use crate::logic::thermistor::ThermistorChannel;
use crate::peripherals::analog::ChannelId;

pub const CHANNEL_1: ThermistorChannel = ThermistorChannel::new(4.7, 5.0, 3452.9);
pub const CHANNEL_2: ThermistorChannel = ThermistorChannel::new(4.7, 5.0, 3435.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum OutputMode {
    /// Report only in answer to a command byte.
    CommandGated,
    /// Report the acceleration every cycle, input is not read.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ChannelCount {
    One,
    Two,
}

impl ChannelCount {
    pub fn has(&self, channel: ChannelId) -> bool {
        match (self, channel) {
            (_, ChannelId::One) => true,
            (ChannelCount::Two, ChannelId::Two) => true,
            (ChannelCount::One, ChannelId::Two) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Config {
    pub channel_count: ChannelCount,
    pub output_mode: OutputMode,
    pub vector_format: VectorFormat,
    pub decimal_places: u8,
    /// Cycle period in continuous mode.
    pub report_interval_ms: u32,
    pub channels: [ThermistorChannel; 2],
}

impl Config {
    pub const fn single_channel() -> Self {
        Config {
            channel_count: ChannelCount::One,
            output_mode: OutputMode::CommandGated,
            vector_format: VectorFormat::Csv,
            decimal_places: 4,
            report_interval_ms: 1000,
            channels: [CHANNEL_1, CHANNEL_2],
        }
    }

    pub const fn dual_channel() -> Self {
        Config {
            channel_count: ChannelCount::Two,
            ..Self::single_channel()
        }
    }

    pub const fn continuous() -> Self {
        Config {
            output_mode: OutputMode::Continuous,
            vector_format: VectorFormat::Json,
            ..Self::single_channel()
        }
    }

    pub fn channel(&self, channel: ChannelId) -> &ThermistorChannel {
        &self.channels[channel.index()]
    }

    /// Configuration baked in at build time.
    pub fn from_build() -> Result<Self, ConfigError> {
        build::load()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::dual_channel()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ConfigError {
    UnknownOutputMode,
    UnknownVectorFormat,
    InvalidChannelCount(u8),
    InvalidDecimalPlaces(u8),
    InvalidReportInterval(u32),
}

pub fn parse_output_mode(value: &str) -> Result<OutputMode, ConfigError> {
    match value {
        "command" => Ok(OutputMode::CommandGated),
        "continuous" => Ok(OutputMode::Continuous),
        _ => Err(ConfigError::UnknownOutputMode),
    }
}

/// `"auto"` picks JSON for continuous output and CSV for command replies.
pub fn parse_vector_format(value: &str, mode: OutputMode) -> Result<VectorFormat, ConfigError> {
    match (value, mode) {
        ("json", _) | ("auto", OutputMode::Continuous) => Ok(VectorFormat::Json),
        ("csv", _) | ("auto", OutputMode::CommandGated) => Ok(VectorFormat::Csv),
        _ => Err(ConfigError::UnknownVectorFormat),
    }
}

pub fn parse_channel_count(value: u8) -> Result<ChannelCount, ConfigError> {
    match value {
        1 => Ok(ChannelCount::One),
        2 => Ok(ChannelCount::Two),
        _ => Err(ConfigError::InvalidChannelCount(value)),
    }
}

pub fn parse_decimal_places(value: u8) -> Result<u8, ConfigError> {
    if value > MAX_DECIMAL_PLACES {
        return Err(ConfigError::InvalidDecimalPlaces(value));
    }
    Ok(value)
}

pub fn parse_report_interval(value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidReportInterval(value));
    }
    Ok(value)
}

mod build {
    use super::{
        parse_channel_count, parse_decimal_places, parse_output_mode, parse_report_interval,
        parse_vector_format, ConfigError,
    };
    use crate::logic::thermistor::ThermistorChannel;

    #[toml_cfg::toml_config]
    pub struct Config {
        #[default("command")]
        output_mode: &'static str,

        #[default("auto")]
        vector_format: &'static str,

        #[default(2)]
        channel_count: u8,

        #[default(4)]
        decimal_places: u8,

        #[default(1000)]
        report_interval_ms: u32,

        #[default(5.0)]
        supply_voltage: f64,

        #[default(4.7)]
        channel_1_series_resistance: f64,

        #[default(3452.9)]
        channel_1_b_coefficient: f64,

        #[default(4.7)]
        channel_2_series_resistance: f64,

        #[default(3435.0)]
        channel_2_b_coefficient: f64,
    }

    pub fn load() -> Result<super::Config, ConfigError> {
        assemble(&CONFIG)
    }

    fn assemble(raw: &Config) -> Result<super::Config, ConfigError> {
        let output_mode = parse_output_mode(raw.output_mode)?;

        Ok(super::Config {
            channel_count: parse_channel_count(raw.channel_count)?,
            output_mode,
            vector_format: parse_vector_format(raw.vector_format, output_mode)?,
            decimal_places: parse_decimal_places(raw.decimal_places)?,
            report_interval_ms: parse_report_interval(raw.report_interval_ms)?,
            channels: [
                ThermistorChannel::new(
                    raw.channel_1_series_resistance,
                    raw.supply_voltage,
                    raw.channel_1_b_coefficient,
                ),
                ThermistorChannel::new(
                    raw.channel_2_series_resistance,
                    raw.supply_voltage,
                    raw.channel_2_b_coefficient,
                ),
            ],
        })
    }

    #[cfg(test)]
    pub mod tests {
        use super::{assemble, Config};
        use crate::config::{Config as RunConfig, ConfigError, OutputMode};
        use crate::logic::formatting::VectorFormat;

        /// The `#[default]` values above, independent of any local cfg.toml.
        const DEFAULTS: Config = Config {
            output_mode: "command",
            vector_format: "auto",
            channel_count: 2,
            decimal_places: 4,
            report_interval_ms: 1000,
            supply_voltage: 5.0,
            channel_1_series_resistance: 4.7,
            channel_1_b_coefficient: 3452.9,
            channel_2_series_resistance: 4.7,
            channel_2_b_coefficient: 3435.0,
        };

        #[test]
        pub fn defaults_give_default_config() {
            assert_eq!(assemble(&DEFAULTS), Ok(RunConfig::default()));
        }

        #[test]
        pub fn continuous_mode_alone_streams_json() {
            let raw = Config {
                output_mode: "continuous",
                channel_count: 1,
                ..DEFAULTS
            };
            let config = assemble(&raw).unwrap();
            assert_eq!(config.output_mode, OutputMode::Continuous);
            assert_eq!(config.vector_format, VectorFormat::Json);
            assert_eq!(config, RunConfig::continuous());
        }

        #[test]
        pub fn explicit_format_wins_over_mode() {
            let raw = Config {
                output_mode: "continuous",
                vector_format: "csv",
                ..DEFAULTS
            };
            assert_eq!(assemble(&raw).unwrap().vector_format, VectorFormat::Csv);
        }

        #[test]
        pub fn invalid_values_are_rejected() {
            let raw = Config {
                decimal_places: 9,
                ..DEFAULTS
            };
            assert_eq!(assemble(&raw), Err(ConfigError::InvalidDecimalPlaces(9)));

            let raw = Config {
                vector_format: "xml",
                ..DEFAULTS
            };
            assert_eq!(assemble(&raw), Err(ConfigError::UnknownVectorFormat));
        }

        #[test]
        pub fn channel_constants_come_from_build_values() {
            let raw = Config {
                supply_voltage: 3.3,
                channel_2_b_coefficient: 3380.0,
                ..DEFAULTS
            };
            let config = assemble(&raw).unwrap();
            assert_eq!(config.channels[0].supply_voltage, 3.3);
            assert_eq!(config.channels[1].supply_voltage, 3.3);
            assert_eq!(config.channels[1].b_coefficient, 3380.0);
            assert_eq!(config.channels[0].b_coefficient, 3452.9);
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn presets() {
        let single = Config::single_channel();
        assert_eq!(single.channel_count, ChannelCount::One);
        assert_eq!(single.output_mode, OutputMode::CommandGated);

        let dual = Config::dual_channel();
        assert_eq!(dual.channel_count, ChannelCount::Two);
        assert_eq!(dual.vector_format, VectorFormat::Csv);

        let continuous = Config::continuous();
        assert_eq!(continuous.output_mode, OutputMode::Continuous);
        assert_eq!(continuous.vector_format, VectorFormat::Json);

        assert_eq!(Config::default(), dual);
    }

    #[test]
    pub fn channels_keep_their_own_constants() {
        let config = Config::default();
        assert_eq!(config.channel(ChannelId::One).b_coefficient, 3452.9);
        assert_eq!(config.channel(ChannelId::Two).b_coefficient, 3435.0);
        assert_eq!(config.channel(ChannelId::One).reference_temperature_kelvin, 298.15);
        assert_eq!(config.channel(ChannelId::Two).divisor_constant, 10.);
    }

    #[test]
    pub fn channel_count_gates_second_channel() {
        assert!(ChannelCount::One.has(ChannelId::One));
        assert!(!ChannelCount::One.has(ChannelId::Two));
        assert!(ChannelCount::Two.has(ChannelId::Two));
    }

    #[test]
    pub fn parse_values() {
        assert_eq!(parse_output_mode("command"), Ok(OutputMode::CommandGated));
        assert_eq!(parse_output_mode("continuous"), Ok(OutputMode::Continuous));
        assert_eq!(parse_output_mode("burst"), Err(ConfigError::UnknownOutputMode));
        assert_eq!(
            parse_vector_format("json", OutputMode::CommandGated),
            Ok(VectorFormat::Json)
        );
        assert_eq!(
            parse_vector_format("auto", OutputMode::CommandGated),
            Ok(VectorFormat::Csv)
        );
        assert_eq!(
            parse_vector_format("auto", OutputMode::Continuous),
            Ok(VectorFormat::Json)
        );
        assert_eq!(
            parse_vector_format("JSON", OutputMode::Continuous),
            Err(ConfigError::UnknownVectorFormat)
        );
        assert_eq!(parse_channel_count(3), Err(ConfigError::InvalidChannelCount(3)));
        assert_eq!(parse_channel_count(0), Err(ConfigError::InvalidChannelCount(0)));
        assert_eq!(parse_decimal_places(6), Ok(6));
        assert_eq!(parse_decimal_places(7), Err(ConfigError::InvalidDecimalPlaces(7)));
        assert_eq!(parse_report_interval(0), Err(ConfigError::InvalidReportInterval(0)));
    }
}
