//! Movement компоненты: команда движения + параметры actuator

use bevy::prelude::*;

/// Команда движения для актора (выполняется movement actuator)
///
/// Архитектура:
/// - AI система пишет MovementCommand (high-level intent)
/// - Actuator (`physics::apply_movement_commands` или хост) интегрирует в Transform
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Стоять на месте
    #[default]
    Idle,
    /// Ехать вперёд (вдоль текущего forward) и доворачивать корпус к heading
    Drive {
        /// move-forward input за этот тик (уже умножен на delta и multiplier)
        input: f32,
        /// Желаемый yaw корпуса (градусы)
        heading_degrees: f32,
    },
}

/// Параметры movement actuator
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MovementActuator {
    /// Скорость (м/с при input == delta)
    pub movement_speed: f32,
    /// Smooth time поворота корпуса (секунды)
    pub rotation_smooth_time: f32,
    /// Состояние сглаживания поворота (градусы/сек)
    pub yaw_velocity: f32,
}

impl Default for MovementActuator {
    fn default() -> Self {
        Self {
            movement_speed: 3.0,
            rotation_smooth_time: 0.15,
            yaw_velocity: 0.0,
        }
    }
}
