//! Command dispatch loop.
//!
//! One call to [`Dispatcher::step`] is one complete cycle: read at most one
//! command byte without blocking, act on it and emit at most one line. In
//! continuous mode the input is left alone and every cycle reports the
//! acceleration.

use embedded_hal::serial;

use crate::config::{Config, OutputMode};
use crate::logic::formatting::{format_temperature_line, format_vector_line};
use crate::logic::thermistor::TemperatureReading;
use crate::peripherals::accelerometer::{AccelerometerSampler, PollOutcome, VectorSource};
use crate::peripherals::analog::{AnalogInput, ChannelId, ThermistorInputs};

/// Sent once at startup when the accelerometer handshake fails.
pub const INIT_FAILURE_MESSAGE: &str = "accelerometer initialization failed\r\n";

/// Everything the loop mutates.
pub struct SensorState<D, I> {
    pub accelerometer: AccelerometerSampler<D>,
    pub thermistors: ThermistorInputs<I>,
}

impl<D, I> SensorState<D, I>
where
    D: VectorSource,
    I: AnalogInput,
{
    pub fn new(device: D, input: I) -> Self {
        SensorState {
            accelerometer: AccelerometerSampler::new(device),
            thermistors: ThermistorInputs::new(input),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Command {
    Temperature(ChannelId),
    Vector,
}

impl Command {
    pub fn parse(byte: u8) -> Option<Self> {
        match byte {
            b'1' => Some(Command::Temperature(ChannelId::One)),
            b'2' => Some(Command::Temperature(ChannelId::Two)),
            b'5' => Some(Command::Vector),
            _ => None,
        }
    }
}

/// What a cycle put on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Report {
    None,
    Temperature(ChannelId, TemperatureReading),
    Vector(PollOutcome),
}

pub struct Dispatcher {
    config: Config,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Dispatcher { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize the accelerometer, telling the host once if that fails.
    /// The loop runs either way.
    pub fn start<D, I, W>(&self, state: &mut SensorState<D, I>, tx: &mut W) -> Result<bool, W::Error>
    where
        D: VectorSource,
        I: AnalogInput,
        W: serial::Write<u8>,
    {
        let healthy = state.accelerometer.initialize();
        if !healthy {
            write_line(tx, INIT_FAILURE_MESSAGE)?;
        }
        info!("dispatcher running in {} mode", self.config.output_mode);
        Ok(healthy)
    }

    /// Run one cycle.
    pub fn step<D, I, R, W>(
        &self,
        state: &mut SensorState<D, I>,
        rx: &mut R,
        tx: &mut W,
    ) -> Result<Report, W::Error>
    where
        D: VectorSource,
        I: AnalogInput,
        R: serial::Read<u8>,
        W: serial::Write<u8>,
    {
        let command = match self.config.output_mode {
            OutputMode::Continuous => Some(Command::Vector),
            OutputMode::CommandGated => self.poll_command(rx),
        };

        match command {
            Some(command) => self.execute(command, state, tx),
            None => Ok(Report::None),
        }
    }

    /// Non-blocking read of one recognized command byte.
    fn poll_command<R>(&self, rx: &mut R) -> Option<Command>
    where
        R: serial::Read<u8>,
    {
        // Receive errors (overrun, framing) count as no input
        let byte = rx.read().ok()?;
        match Command::parse(byte)? {
            Command::Temperature(channel) if !self.config.channel_count.has(channel) => None,
            command => Some(command),
        }
    }

    pub fn execute<D, I, W>(
        &self,
        command: Command,
        state: &mut SensorState<D, I>,
        tx: &mut W,
    ) -> Result<Report, W::Error>
    where
        D: VectorSource,
        I: AnalogInput,
        W: serial::Write<u8>,
    {
        match command {
            Command::Temperature(channel) => {
                let sample = match state.thermistors.sample(channel) {
                    Some(sample) => sample,
                    None => {
                        warn!("no sample from thermistor channel {} yet", channel);
                        return Ok(Report::None);
                    }
                };
                let reading = self.config.channel(channel).convert(sample);
                let line = format_temperature_line(&reading, self.config.decimal_places);
                write_line(tx, &line)?;
                Ok(Report::Temperature(channel, reading))
            }
            Command::Vector => {
                let outcome = state.accelerometer.poll();
                let line = format_vector_line(
                    &outcome.sample(),
                    self.config.vector_format,
                    self.config.decimal_places,
                );
                write_line(tx, &line)?;
                Ok(Report::Vector(outcome))
            }
        }
    }
}

/// Push one line out and flush it.
pub fn write_line<W>(tx: &mut W, line: &str) -> Result<(), W::Error>
where
    W: serial::Write<u8>,
{
    for byte in line.bytes() {
        nb::block!(tx.write(byte))?;
    }
    nb::block!(tx.flush())
}
