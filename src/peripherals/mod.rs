pub mod accelerometer;
pub mod analog;
pub mod kx224;

pub use accelerometer::{AccelerometerSample, AccelerometerSampler, PollOutcome, VectorSource};
pub use analog::{AdcInput, AnalogInput, ChannelId, ThermistorInputs};
pub use kx224::{Kx224Error, KX224};
