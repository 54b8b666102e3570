//! Acquisition and three-point calibration for XPT2046-class resistive
//! touch digitizers.
//!
//! One [`touch::TouchController::run_cycle`] call per ~10 ms reads the
//! controller over SPI, smooths the sample, maps it to display space when a
//! calibration is stored and steps the interactive calibration procedure.
//! Everything runs on the caller's thread; concurrent calls from several
//! execution contexts must be serialized by the caller.

#![cfg_attr(not(test), no_std)]

pub mod drivers;
pub mod platform;
pub mod touch;

pub use drivers::xpt2046::{Channel, Command, PowerMode, ReferenceMode, Resolution};
pub use platform::{ChipSelect, IrqOps, SpiOps, TickOps};
pub use touch::{
    calibration::CalibrationPhase,
    canvas::CalibrationCanvas,
    config::TouchConfig,
    mapper::CalibrationCoefficients,
    types::{DisplayPoint, NumericFault, RawSample, TouchError, TouchPoint, TouchReading},
    TouchController,
};
