//! TankAttack Simulation Core
//!
//! ECS-симуляция боевого AI на Bevy 0.16 (headless)
//!
//! Архитектура:
//! - ECS = решения AI: выбор цели, Patrol/Pursue/SearchReset, gate выстрела, наведение
//! - Хост = рендер, projectile физика, оркестрация уровня (через events)
//!
//! Весь тик: одна цепочка систем в FixedUpdate (последовательно, детерминированно).

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::{NoUserData, PhysicsSet, RapierPhysicsPlugin};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod archetypes;
pub mod combat;
pub mod components;
pub mod level;
pub mod logger;
pub mod physics;
pub mod scheduler;
pub mod shared;
pub mod spatial;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, BehaviorConfig, BehaviorState, BehaviorStateMachine, DamageReactionConfig, MobilityConfig, ScanSource,
    SensorConfig, TargetAcquisition, TargetFilters,
};
pub use archetypes::{spawn_agent, spawn_player_dummy, AgentArchetype};
pub use combat::{
    has_line_of_sight, AttackController, CombatPlugin, DamageRequest, Dead, DespawnAfter, HealthDepleted,
    HealthModified, MuzzleFlashRequested, ProjectileSpawnRequested, WeaponConfig, WeaponFired,
};
pub use components::*;
pub use level::{
    AgentAdded, AgentDestroyed, AgentRemoved, LevelEnded, LevelPlugin, LevelSettings, LevelStarted, LevelState,
    PlayerDefeated,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use scheduler::TimerSlot;
pub use spatial::{Collider, ColliderDisabled, PhysicsSpatial, Sensor, SpatialQuery};

/// Частота simulation tick
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Порядок FixedUpdate:
/// 1. Rapier: SyncBackend → StepSimulation → Writeback (spatial index коллайдеров)
/// 2. level flow: регистрация агентов, LevelStarted/Ended/PlayerDefeated
/// 3. damage: invincibility таймеры, DamageRequest → Destructible
/// 4. react_to_damage / handle_agent_death
/// 5. (только при active gameplay) таймеры → scans → drive_agents → movement
/// 6. despawn_after_timeout
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .register_type::<Agent>()
            .register_type::<Destructible>()
            .register_type::<MovementCommand>()
            .register_type::<MovementActuator>()
            // Spatial queries: Rapier в том же fixed tick, до AI
            .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_schedule(FixedUpdate))
            // Подсистемы
            .add_plugins((CombatPlugin, AIPlugin, LevelPlugin));

        app.add_systems(
            FixedUpdate,
            (
                (
                    level::register_new_agents,
                    level::unregister_removed_agents,
                    level::handle_level_flow,
                )
                    .chain(),
                (combat::damage::tick_destructibles, combat::damage::apply_damage).chain(),
                ai::systems::react_to_damage,
                ai::systems::handle_agent_death,
                (
                    ai::systems::tick_agent_timers,
                    combat::tick_attack_controllers,
                    ai::systems::run_target_scans,
                    ai::systems::drive_agents,
                    physics::apply_movement_commands,
                )
                    .chain()
                    .run_if(level::gameplay_active),
                combat::damage::despawn_after_timeout,
            )
                .chain() // Последовательное выполнение для детерминизма
                .after(PhysicsSet::Writeback),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции (MinimalPlugins + TransformPlugin + SimulationPlugin)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin, SimulationPlugin))
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
