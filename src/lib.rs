// THEORY:
// This file is the main entry point for the `scout_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (the bundled CLI, or a robot
// controller embedding the engine).
//
// The primary goal is to export the `VisionPipeline` and its associated data
// structures (`Report`, `DetectionResult`, `TrackingResult`, `Command`) as the
// clean, high-level interface for the entire vision engine, together with the
// `Runner` that drives it from a frame source. The analytical building blocks
// (`core_modules`) stay public for calibration tools and tests, but a typical
// consumer only needs `pipeline`, `runner` and `config`.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod runner;

pub use config::VisionConfig;
pub use error::{Result, VisionError};
pub use pipeline::{Command, Mode, Report, VisionPipeline};
pub use runner::{QuitSignal, RunSummary, Runner, RunnerOptions, StopReason};
