//! AttackController: fire-rate gate + rotation hold для одного оружия
//!
//! Два ортогональных автомата:
//! - Ready → OnCooldown → Ready (интервал между выстрелами)
//! - AimFree → AimLocked → AimFree (после выстрела ствол замирает)
//!
//! Оба таймера: `TimerSlot`, тикаются в `tick_attack_controllers`.
//! Yaw оружия хранится в world space (турель крутится независимо от корпуса).
//! Pitch (опционально, `rotate_pitch`): наклон ствола вверх/вниз, + = вверх.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scheduler::TimerSlot;
use crate::shared::{heading_degrees, move_towards_angle, yaw_rotation};

/// Параметры оружия
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct WeaponConfig {
    /// Минимальный интервал между выстрелами (секунды, ≤ 0 = стреляет каждый тик)
    pub attack_interval: f32,
    /// Aim lock после выстрела (секунды, ≤ 0 = без lock)
    pub rotation_hold_duration: f32,
    /// Скорость поворота ствола (градусы/сек, yaw и pitch)
    pub rotation_speed: f32,
    /// Наводить ствол и по вертикали
    pub rotate_pitch: bool,
    /// Предел |pitch| (градусы)
    pub pitch_limit: f32,
    /// Позиция оружия относительно корпуса
    pub mount_offset: Vec3,
    /// Точка вылета снаряда относительно оружия
    pub muzzle_offset: Vec3,
    /// Спавнить projectile при выстреле
    pub spawn_projectile: bool,
    /// Спавнить muzzle FX при выстреле
    pub muzzle_fx: bool,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            attack_interval: 1.0,
            rotation_hold_duration: 0.0,
            rotation_speed: 180.0,
            rotate_pitch: false,
            pitch_limit: 45.0,
            mount_offset: Vec3::new(0.0, 0.5, 0.0),
            muzzle_offset: Vec3::new(0.0, 0.0, 1.0),
            spawn_projectile: true,
            muzzle_fx: true,
        }
    }
}

/// Результат успешного `try_fire`: что отдать weapon-effect коллабораторам
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireOrder {
    /// World pose точки вылета
    pub spawn_pose: Transform,
    pub spawn_projectile: bool,
    pub muzzle_fx: bool,
}

/// Оружие агента (турель)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AttackController {
    pub config: WeaponConfig,
    /// World yaw ствола (градусы)
    yaw_degrees: f32,
    /// Наклон ствола (градусы, + = вверх); 0 если rotate_pitch выключен
    pitch_degrees: f32,
    cooldown: TimerSlot,
    rotation_hold: TimerSlot,
}

impl Default for AttackController {
    fn default() -> Self {
        Self::new(WeaponConfig::default())
    }
}

impl AttackController {
    pub fn new(config: WeaponConfig) -> Self {
        Self {
            config,
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            cooldown: TimerSlot::default(),
            rotation_hold: TimerSlot::default(),
        }
    }

    pub fn with_yaw(mut self, yaw_degrees: f32) -> Self {
        self.yaw_degrees = yaw_degrees;
        self
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown.is_running()
    }

    pub fn is_aim_locked(&self) -> bool {
        self.rotation_hold.is_running()
    }

    /// World pose оружия (позиция от корпуса, rotation: собственный yaw + pitch)
    pub fn weapon_pose(&self, body: &Transform) -> Transform {
        let pitch = Quat::from_rotation_x(-self.pitch_degrees.to_radians());
        Transform::from_translation(body.transform_point(self.config.mount_offset))
            .with_rotation(yaw_rotation(self.yaw_degrees) * pitch)
    }

    /// World pose точки вылета снаряда
    pub fn muzzle_pose(&self, body: &Transform) -> Transform {
        let weapon = self.weapon_pose(body);
        Transform::from_translation(weapon.translation + weapon.rotation * self.config.muzzle_offset)
            .with_rotation(weapon.rotation)
    }

    /// Попытка выстрела. `None` пока OnCooldown (запрос просто отбрасывается).
    pub fn try_fire(&mut self, body: &Transform) -> Option<FireOrder> {
        if self.is_on_cooldown() {
            return None;
        }

        if self.config.attack_interval > 0.0 {
            self.cooldown.start(self.config.attack_interval);
        }

        if self.config.rotation_hold_duration > 0.0 {
            self.rotation_hold.start(self.config.rotation_hold_duration);
        }

        Some(FireOrder {
            spawn_pose: self.muzzle_pose(body),
            spawn_projectile: self.config.spawn_projectile,
            muzzle_fx: self.config.muzzle_fx,
        })
    }

    /// Повернуть ствол к `direction` (каждая ось не более rotation_speed * delta градусов)
    ///
    /// No-op пока AimLocked. Цель ровно сверху/снизу: yaw не меняется.
    pub fn rotate_towards(&mut self, direction: Vec3, delta_secs: f32) {
        if self.is_aim_locked() {
            return;
        }

        let max_step = self.config.rotation_speed * delta_secs.max(0.0);
        let horizontal = Vec2::new(direction.x, direction.z).length();

        if self.config.rotate_pitch && direction.length_squared() > 1e-12 {
            let limit = self.config.pitch_limit.abs();
            let target = direction.y.atan2(horizontal).to_degrees().clamp(-limit, limit);
            self.pitch_degrees += (target - self.pitch_degrees).clamp(-max_step, max_step);
        }

        if horizontal < 1e-6 {
            return;
        }

        self.yaw_degrees = move_towards_angle(self.yaw_degrees, heading_degrees(direction), max_step);
    }

    pub fn tick(&mut self, delta: Duration) {
        self.cooldown.tick(delta);
        self.rotation_hold.tick(delta);
    }

    /// Сбросить все таймеры (смерть / конец уровня)
    pub fn cancel_all(&mut self) {
        self.cooldown.cancel();
        self.rotation_hold.cancel();
    }
}
