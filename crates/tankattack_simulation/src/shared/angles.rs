//! Angle helpers (градусы, yaw вокруг Y)
//!
//! Конвенция: yaw 0° смотрит вдоль +Z, 90°: вдоль +X.
//! `forward = yaw_rotation(yaw) * Vec3::Z = (sin yaw, 0, cos yaw)`.

use bevy::prelude::*;

/// Повторяет `value` в диапазоне [0, length)
pub fn repeat(value: f32, length: f32) -> f32 {
    let wrapped = (value - (value / length).floor() * length).clamp(0.0, length);
    // Крошечный отрицательный value после округления даёт ровно length
    if wrapped >= length {
        0.0
    } else {
        wrapped
    }
}

/// Кратчайшая разница target - current в (-180, 180]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = repeat(target - current, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Линейно повернуть `current` к `target` не более чем на `max_delta` градусов
///
/// Никогда не перескакивает target; результат нормализован в [0, 360).
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let max_delta = max_delta.max(0.0);
    let delta = delta_angle(current, target);

    let next = if delta.abs() <= max_delta {
        current + delta
    } else {
        current + max_delta * delta.signum()
    };

    repeat(next, 360.0)
}

/// Critically damped сглаживание угла (SmoothDampAngle)
///
/// `velocity`: состояние сглаживания (градусы/сек), хранится у вызывающего.
pub fn smooth_damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return current;
    }

    let target = current + delta_angle(current, target);
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;

    let mut output = target + (change + temp) * exp;

    // Не перелетаем target
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    output
}

/// Yaw (градусы) направления на плоскости XZ: atan2(x, z)
pub fn heading_degrees(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z).to_degrees()
}

/// Rotation по yaw (градусы)
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_rotation_y(yaw_degrees.to_radians())
}

/// Yaw (градусы) rotation-а
pub fn yaw_of(rotation: Quat) -> f32 {
    heading_degrees(rotation * Vec3::Z)
}

/// Угол (градусы) между двумя векторами, 0 если один из них нулевой
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < 1e-12 || b.length_squared() < 1e-12 {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}
