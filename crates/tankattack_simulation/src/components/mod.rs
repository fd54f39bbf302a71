//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: агент, destructible capability, class tag
//! - movement: команда движения и параметры actuator
//!
//! AI/combat компоненты живут в своих модулях (`ai`, `combat`).

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
