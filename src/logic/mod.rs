pub mod formatting;
pub mod thermistor;
