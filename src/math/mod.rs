//! Mathematical utilities: hinge basis and clipping.

pub mod hinge;

pub use hinge::*;
