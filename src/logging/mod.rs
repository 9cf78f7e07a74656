//! Structured logging with discovery context.
//!
//! Provides logging macros and utilities that include the engine, report and
//! asset in every log message for easy correlation.

pub mod structured;

pub use structured::*;
