//! AI decision-making module
//!
//! Два компонента на агента:
//! - TargetAcquisition: периодический сенсор (scan, фильтры, lock-on, радиус)
//! - BehaviorStateMachine: Patrol / Pursue / SearchReset / Dead, движение,
//!   gate выстрела через LOS + AttackController

use bevy::prelude::*;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{
    BehaviorConfig, BehaviorState, BehaviorStateMachine, DamageReactionConfig, MobilityConfig, ScanSource,
    SensorConfig, TargetAcquisition, TargetFilters,
};

/// AI Plugin
///
/// Регистрирует типы для reflection. Системы добавляются `SimulationPlugin`
/// в общую цепочку FixedUpdate:
/// 1. tick_agent_timers: patrol / search reset / radius revert
/// 2. run_target_scans: scan tic сенсоров
/// 3. drive_agents: LOS, движение, выстрел, наведение
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TargetAcquisition>()
            .register_type::<BehaviorStateMachine>();
    }
}
