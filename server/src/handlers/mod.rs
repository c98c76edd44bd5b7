//! Request handlers for plan operations.

mod cost;
mod plans;

pub use cost::*;
pub use plans::*;
