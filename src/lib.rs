//! Command assembly and process supervision for THC-Hydra runs.
//!
//! The crate builds a safely escaped argument vector from a structured
//! attack configuration, owns the lifecycle of the spawned hydra process,
//! streams and classifies its output without blocking the caller, and
//! terminates it cleanly across platforms.

pub mod classify;
pub mod command;
pub mod config;
pub mod display;
pub mod report;
pub mod stats;
pub mod supervisor;
