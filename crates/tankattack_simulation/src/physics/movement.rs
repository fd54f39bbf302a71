//! Movement actuator: MovementCommand → Transform
//!
//! Архитектура:
//! - AI пишет MovementCommand (move-forward input + желаемый heading)
//! - Эта система интегрирует в Transform: сначала едем вдоль текущего forward,
//!   потом доворачиваем корпус (SmoothDampAngle, критически задемпфированная пружина)
//!
//! Хост с собственным контроллером движения может не регистрировать систему
//! и читать MovementCommand сам.

use bevy::prelude::*;

use crate::components::{MovementActuator, MovementCommand};
use crate::shared::{smooth_damp_angle, yaw_of, yaw_rotation};

/// Система применения MovementCommand
///
/// Работает в FixedUpdate.
pub fn apply_movement_commands(
    mut query: Query<(&mut Transform, &MovementCommand, &mut MovementActuator)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, command, mut actuator) in query.iter_mut() {
        let MovementCommand::Drive { input, heading_degrees } = *command else {
            continue;
        };

        let forward = transform.rotation * Vec3::Z;
        transform.translation += forward * input * actuator.movement_speed;

        let smooth_time = actuator.rotation_smooth_time;
        let yaw = smooth_damp_angle(
            yaw_of(transform.rotation),
            heading_degrees,
            &mut actuator.yaw_velocity,
            smooth_time,
            delta,
        );
        transform.rotation = yaw_rotation(yaw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::delta_angle;
    use approx::assert_abs_diff_eq;
    use std::time::Duration;

    fn movement_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)))
            .add_systems(Update, apply_movement_commands);
        app
    }

    #[test]
    fn test_drive_moves_along_forward() {
        let mut app = movement_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::IDENTITY,
                MovementActuator {
                    movement_speed: 2.0,
                    ..default()
                },
                MovementCommand::Drive {
                    input: 0.5,
                    heading_degrees: 0.0,
                },
            ))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(entity).copied().unwrap_or_default();
        assert_abs_diff_eq!(transform.translation.z, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(transform.translation.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_heading_converges_without_overshoot() {
        let mut app = movement_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::IDENTITY,
                MovementActuator::default(),
                MovementCommand::Drive {
                    input: 0.0,
                    heading_degrees: 90.0,
                },
            ))
            .id();

        for _ in 0..200 {
            app.update();
        }

        let transform = app.world().get::<Transform>(entity).copied().unwrap_or_default();
        assert_abs_diff_eq!(delta_angle(yaw_of(transform.rotation), 90.0), 0.0, epsilon = 0.5);
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut app = movement_app();
        let start = Transform::from_xyz(1.0, 0.0, 2.0);
        let entity = app
            .world_mut()
            .spawn((start, MovementActuator::default(), MovementCommand::Idle))
            .id();

        app.update();
        app.update();

        assert_eq!(app.world().get::<Transform>(entity).copied(), Some(start));
    }
}
