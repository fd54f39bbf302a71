//! Shared utilities (angle math)

pub mod angles;

pub use angles::*;
