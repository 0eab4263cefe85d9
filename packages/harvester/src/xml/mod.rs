//! Namespace-agnostic XML navigation helpers.

mod utils;

pub use utils::*;
