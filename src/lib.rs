//! `tcal` library crate.
//!
//! The binary (`tcal`) is a thin wrapper around this library so that:
//!
//! - scoring and routing are testable without spawning processes or servers
//! - the HTTP layer and the CLI share one implementation of each operation

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod server;
pub mod service;
pub mod telemetry;
