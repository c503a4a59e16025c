//! Crosswalk model implementations.
//!
//! Models are implemented as small, pure functions so the request layer can
//! stay a thin shell around them.

pub mod xwalk;

pub use xwalk::*;
