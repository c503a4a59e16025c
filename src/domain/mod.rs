//! Domain types used throughout the service.
//!
//! This module defines:
//!
//! - the assessment `Domain` label
//! - the model configuration document (`ModelConfig`, `RoutingConfig`, ...)
//! - the crosswalk sum type (`Xwalk`) and the loaded `Model`

pub mod types;

pub use types::*;
