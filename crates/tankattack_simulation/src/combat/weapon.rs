//! Weapon effect events (ECS → хост)
//!
//! Architecture:
//! - ECS: AttackController (cooldown, aim) в attack_cooldown.rs
//! - Хост: спавн projectile, muzzle FX, projectile collision
//! - Events: ProjectileSpawnRequested / MuzzleFlashRequested (ECS→хост),
//!   DamageRequest (хост→ECS, см. damage.rs)

use bevy::prelude::*;

// Projectile НЕ хранится в ECS. Хост владеет lifecycle: spawn, physics, collision, cleanup.

/// Event: заспавнить projectile
#[derive(Event, Debug, Clone)]
pub struct ProjectileSpawnRequested {
    /// Кто стреляет
    pub shooter: Entity,

    /// World pose точки вылета (forward = +Z)
    pub pose: Transform,

    /// Коллайдеры, с которыми projectile не должен сталкиваться (сам стрелок)
    pub ignore: Vec<Entity>,
}

/// Event: muzzle flash FX в точке вылета
#[derive(Event, Debug, Clone, Copy)]
pub struct MuzzleFlashRequested {
    pub shooter: Entity,
    pub pose: Transform,
}

/// Event: агент выстрелил (логика уровня, звук, статистика)
#[derive(Event, Debug, Clone, Copy)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub target: Option<Entity>,
}
