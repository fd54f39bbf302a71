//! Combat system module
//!
//! ECS ответственность:
//! - Weapon state: AttackController (cooldown, rotation hold, aim)
//! - Line of sight gate перед выстрелом
//! - Health glue: DamageRequest → Destructible → HealthModified/HealthDepleted
//!
//! Хост ответственность:
//! - Projectile spawn/physics/collision (по ProjectileSpawnRequested)
//! - Muzzle FX (по MuzzleFlashRequested)

use bevy::prelude::*;

pub mod attack_cooldown;
pub mod damage;
pub mod line_of_sight;
pub mod weapon;


// Re-export основных типов
pub use attack_cooldown::{AttackController, FireOrder, WeaponConfig};
pub use damage::{DamageRequest, Dead, DespawnAfter, HealthDepleted, HealthModified};
pub use line_of_sight::{has_line_of_sight, LOS_HALF_EXTENTS};
pub use weapon::{MuzzleFlashRequested, ProjectileSpawnRequested, WeaponFired};

/// Система: тик cooldown + rotation hold таймеров
pub fn tick_attack_controllers(time: Res<Time>, mut weapons: Query<&mut AttackController>) {
    let delta = time.delta();
    for mut weapon in weapons.iter_mut() {
        weapon.tick(delta);
    }
}

/// Combat Plugin
///
/// Регистрирует события. Системы добавляет `SimulationPlugin` единой
/// цепочкой FixedUpdate (порядок тика важен для AI).
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AttackController>()
            .add_event::<DamageRequest>()
            .add_event::<HealthModified>()
            .add_event::<HealthDepleted>()
            .add_event::<ProjectileSpawnRequested>()
            .add_event::<MuzzleFlashRequested>()
            .add_event::<WeaponFired>();
    }
}
