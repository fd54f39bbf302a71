//! Agent archetypes (configuration presets) + spawn helpers
//!
//! Все вражеские агенты: один набор компонентов. Турель, патрульный танк
//! и агрессивный танк отличаются только конфигом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::components::{
    BehaviorConfig, BehaviorStateMachine, DamageReactionConfig, MobilityConfig, ScanSource, SensorConfig,
    TargetAcquisition, TargetFilters,
};
use crate::combat::{AttackController, WeaponConfig};
use crate::components::{Agent, ClassTag, Destructible, MovementActuator};
use crate::spatial::Collider;

/// Полное описание агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentArchetype {
    pub name: String,
    pub class_tag: String,
    pub max_health: u32,
    pub invincibility_duration: f32,
    pub hull_half_extents: Vec3,
    /// None = агент без сенсора (никогда не находит цель)
    pub sensor: Option<SensorConfig>,
    /// None = агент без оружия (никогда не стреляет)
    pub weapon: Option<WeaponConfig>,
    pub behavior: BehaviorConfig,
    pub movement_speed: f32,
    pub rotation_smooth_time: f32,
}

impl Default for AgentArchetype {
    fn default() -> Self {
        Self::patrolling_tank()
    }
}

impl AgentArchetype {
    /// Стационарная турель: не двигается, только наводится и стреляет
    pub fn stationary_turret() -> Self {
        Self {
            name: "stationary_turret".to_string(),
            class_tag: "Enemy".to_string(),
            max_health: 60,
            invincibility_duration: 0.0,
            hull_half_extents: Vec3::new(0.6, 0.5, 0.6),
            sensor: Some(SensorConfig {
                radius: 8.0,
                scan_interval: 0.5,
                lock_on: true,
                scan_source: ScanSource::Weapon,
                ..default()
            }),
            weapon: Some(WeaponConfig {
                attack_interval: 1.5,
                rotation_hold_duration: 0.3,
                rotation_speed: 120.0,
                ..default()
            }),
            behavior: BehaviorConfig {
                mobility: None,
                damage_reaction: Some(DamageReactionConfig {
                    range_multiplier: 2.0,
                    duration: 3.0,
                }),
                ..default()
            },
            movement_speed: 0.0,
            rotation_smooth_time: 0.15,
        }
    }

    /// Патрульный танк: wander, преследование, search reset
    pub fn patrolling_tank() -> Self {
        Self {
            name: "patrolling_tank".to_string(),
            class_tag: "Enemy".to_string(),
            max_health: 80,
            invincibility_duration: 0.1,
            hull_half_extents: Vec3::new(0.5, 0.4, 0.7),
            sensor: Some(SensorConfig {
                radius: 6.0,
                scan_interval: 0.4,
                ..default()
            }),
            weapon: Some(WeaponConfig {
                attack_interval: 2.0,
                rotation_hold_duration: 0.2,
                rotation_speed: 90.0,
                ..default()
            }),
            behavior: BehaviorConfig {
                search_reset_wait: 2.0,
                mobility: Some(MobilityConfig {
                    patrol_max_distance: 6.0,
                    patrol_interval_min: 2.0,
                    patrol_interval_max: 4.0,
                    aggro_go_to_distance: 4.0,
                    aggro_movement_multiplier: 1.0,
                    ..default()
                }),
                damage_reaction: None,
                ..default()
            },
            movement_speed: 3.0,
            rotation_smooth_time: 0.15,
        }
    }

    /// Агрессивный танк: lock-on, стрельба сквозь препятствия, ускорение в погоне
    pub fn aggressive_tank() -> Self {
        Self {
            name: "aggressive_tank".to_string(),
            class_tag: "Enemy".to_string(),
            max_health: 120,
            invincibility_duration: 0.1,
            hull_half_extents: Vec3::new(0.6, 0.45, 0.8),
            sensor: Some(SensorConfig {
                radius: 10.0,
                scan_interval: 0.3,
                lock_on: true,
                filters: TargetFilters {
                    player: true,
                    hostile: false,
                    other: false,
                },
                ..default()
            }),
            weapon: Some(WeaponConfig {
                attack_interval: 1.0,
                rotation_hold_duration: 0.15,
                rotation_speed: 150.0,
                ..default()
            }),
            behavior: BehaviorConfig {
                attack_through: true,
                search_reset_wait: 3.0,
                mobility: Some(MobilityConfig {
                    patrol_max_distance: 8.0,
                    patrol_interval_min: 1.5,
                    patrol_interval_max: 3.0,
                    aggro_go_to_distance: 3.0,
                    aggro_movement_multiplier: 1.5,
                    ..default()
                }),
                damage_reaction: Some(DamageReactionConfig {
                    range_multiplier: 2.0,
                    duration: 3.0,
                }),
                ..default()
            },
            movement_speed: 4.0,
            rotation_smooth_time: 0.1,
        }
    }

    /// Все встроенные пресеты
    pub fn presets() -> Vec<Self> {
        vec![Self::stationary_turret(), Self::patrolling_tank(), Self::aggressive_tank()]
    }
}

/// Spawn helper для агента
///
/// Создает entity с полным набором компонентов:
/// - Transform + Collider (hull)
/// - Agent + ClassTag + Destructible
/// - TargetAcquisition + BehaviorStateMachine
/// - AttackController (если есть оружие), MovementActuator (если мобильный)
pub fn spawn_agent(world: &mut World, archetype: &AgentArchetype, transform: Transform) -> Entity {
    let acquisition = archetype
        .sensor
        .clone()
        .map_or_else(TargetAcquisition::unconfigured, TargetAcquisition::new);

    let hull = archetype.hull_half_extents.abs();
    let mut entity = world.spawn((
        transform,
        Collider::cuboid(hull.x, hull.y, hull.z),
        Agent,
        ClassTag::new(archetype.class_tag.clone()),
        Destructible::new(archetype.max_health).with_invincibility(archetype.invincibility_duration),
        acquisition,
        BehaviorStateMachine::new(archetype.behavior.clone()),
    ));

    if let Some(weapon) = archetype.weapon.clone() {
        let yaw = crate::shared::yaw_of(transform.rotation);
        entity.insert(AttackController::new(weapon).with_yaw(yaw));
    }

    if archetype.behavior.mobility.is_some() {
        entity.insert(MovementActuator {
            movement_speed: archetype.movement_speed,
            rotation_smooth_time: archetype.rotation_smooth_time,
            yaw_velocity: 0.0,
        });
    }

    entity.id()
}

/// Spawn helper для цели игрока (Destructible + тег + коллайдер, без AI)
pub fn spawn_player_dummy(world: &mut World, position: Vec3, max_health: u32, player_tag: &str) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Collider::cuboid(0.5, 0.5, 0.5),
            ClassTag::new(player_tag),
            Destructible::new(max_health),
        ))
        .id()
}
