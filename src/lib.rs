#![cfg_attr(target_os = "none", no_main)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod config;
pub mod dispatcher;
pub mod logic;
pub mod peripherals;

#[cfg(target_os = "none")]
use defmt_rtt as _; // global logger

#[cfg(target_os = "none")]
use nrf52840_hal as _; // memory layout

#[cfg(target_os = "none")]
use panic_probe as _;

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[cfg(target_os = "none")]
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
