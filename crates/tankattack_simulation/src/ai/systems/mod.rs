//! AI systems (FixedUpdate)

pub mod behavior;
pub mod reactions;
pub mod scan;

// Re-export all systems
pub use behavior::*;
pub use reactions::*;
pub use scan::*;
