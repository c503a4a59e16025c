//! Input helpers.
//!
//! - model directory loading (`model_dir`)
//! - load-time semantic checks (`validation`)

pub mod model_dir;
pub mod validation;

pub use model_dir::*;
pub use validation::*;
