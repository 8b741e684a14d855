//! Logging macros used throughout the crate.
//!
//! On the device these forward to `defmt` (which ships the frames over RTT).
//! Host builds have no defmt logger to link against, so there the macros
//! expand to nothing.

#![allow(unused_macros)]

#[cfg(target_os = "none")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::defmt::debug!($($arg)*)
    };
}

#[cfg(target_os = "none")]
macro_rules! info {
    ($($arg:tt)*) => {
        ::defmt::info!($($arg)*)
    };
}

#[cfg(target_os = "none")]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::defmt::warn!($($arg)*)
    };
}

#[cfg(target_os = "none")]
macro_rules! error {
    ($($arg:tt)*) => {
        ::defmt::error!($($arg)*)
    };
}

#[cfg(not(target_os = "none"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(target_os = "none"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(target_os = "none"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(target_os = "none"))]
macro_rules! error {
    ($($arg:tt)*) => {{}};
}
