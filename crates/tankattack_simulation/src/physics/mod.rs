//! Physics simulation module
//!
//! Только reference movement actuator: интеграция MovementCommand в Transform.
//! Коллизии и projectile физика: на стороне хоста.

pub mod movement;

// Re-export основных типов
pub use movement::apply_movement_commands;
