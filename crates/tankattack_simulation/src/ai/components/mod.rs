//! AI components

pub mod acquisition;
pub mod behavior;


// Re-export all components
pub use acquisition::*;
pub use behavior::*;
