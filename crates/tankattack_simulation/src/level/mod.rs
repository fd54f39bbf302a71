//! Level flow glue
//!
//! Оркестрация уровня внешняя: хост шлёт LevelStarted / LevelEnded /
//! PlayerDefeated, ECS реагирует (включает сенсоры, останавливает тик агентов)
//! и рассылает AgentAdded / AgentRemoved / AgentDestroyed для bookkeeping
//! (счётчик врагов, лут, FX).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::components::TargetAcquisition;
use crate::combat::Dead;
use crate::components::Agent;
use crate::DeterministicRng;

/// Настройки уровня
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct LevelSettings {
    pub player_tag: String,
    pub enemy_tag: String,
    /// Cosmetic teardown delay между смертью агента и деспавном (секунды)
    pub teardown_delay: f32,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            player_tag: "Player".to_string(),
            enemy_tag: "Enemy".to_string(),
            teardown_delay: 0.2,
        }
    }
}

/// Runtime состояние уровня
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct LevelState {
    /// Агенты тикают только пока true
    pub active_gameplay: bool,
    /// Живые (зарегистрированные) агенты
    pub enemy_count: u32,
    pub player_defeated: bool,
}

/// Event (хост → ECS): уровень начался
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LevelStarted;

/// Event (хост → ECS): уровень закончился, все агенты уничтожаются
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct LevelEnded;

/// Event (хост → ECS): игрок проиграл, геймплей замирает
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PlayerDefeated;

/// Event: агент появился в симуляции
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentAdded {
    pub entity: Entity,
}

/// Event: агент удалён из симуляции
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentRemoved {
    pub entity: Entity,
}

/// Event: агент уничтожен (смерть или конец уровня): лут, FX, счётчики
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentDestroyed {
    pub entity: Entity,
    pub position: Vec3,
}

/// Run condition: геймплей идёт
pub fn gameplay_active(level: Res<LevelState>) -> bool {
    level.active_gameplay
}

/// Включить сенсор агента на уровень (ignore self + первый scan с jitter)
pub fn activate_acquisition(entity: Entity, acquisition: &mut TargetAcquisition, rng: &mut impl Rng) {
    let max_jitter = acquisition.config().map_or(0.0, |config| config.first_scan_jitter);
    let jitter = if max_jitter > 0.0 {
        rng.gen_range(0.0..=max_jitter)
    } else {
        0.0
    };

    acquisition.activate(vec![entity], jitter);
}

/// System: регистрация новых агентов (subscribe)
///
/// Если геймплей уже идёт: агент сразу получает level start.
pub fn register_new_agents(
    mut agents: Query<(Entity, Option<&mut TargetAcquisition>), Added<Agent>>,
    mut level: ResMut<LevelState>,
    mut rng: ResMut<DeterministicRng>,
    mut added_events: EventWriter<AgentAdded>,
) {
    for (entity, acquisition) in agents.iter_mut() {
        level.enemy_count += 1;
        added_events.write(AgentAdded { entity });

        if level.active_gameplay {
            if let Some(mut acquisition) = acquisition {
                activate_acquisition(entity, &mut acquisition, &mut rng.rng);
            }
        }

        crate::log(&format!("➕ Agent {:?} added (enemies: {})", entity, level.enemy_count));
    }
}

/// System: снятие агентов с учёта (unsubscribe)
pub fn unregister_removed_agents(
    mut removed: RemovedComponents<Agent>,
    mut level: ResMut<LevelState>,
    mut removed_events: EventWriter<AgentRemoved>,
) {
    for entity in removed.read() {
        level.enemy_count = level.enemy_count.saturating_sub(1);
        removed_events.write(AgentRemoved { entity });

        crate::log(&format!("➖ Agent {:?} removed (enemies: {})", entity, level.enemy_count));
    }
}

/// System: LevelStarted / LevelEnded / PlayerDefeated → LevelState
///
/// Уничтожение агентов при LevelEnded делает `handle_agent_death`.
pub fn handle_level_flow(
    mut started: EventReader<LevelStarted>,
    mut ended: EventReader<LevelEnded>,
    mut defeated: EventReader<PlayerDefeated>,
    mut level: ResMut<LevelState>,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<(Entity, &mut TargetAcquisition), (With<Agent>, Without<Dead>)>,
) {
    if started.read().count() > 0 {
        level.active_gameplay = true;
        level.player_defeated = false;

        let mut sorted: Vec<_> = agents.iter_mut().collect();
        sorted.sort_by_key(|(entity, _)| entity.to_bits());

        for (entity, mut acquisition) in sorted {
            activate_acquisition(entity, &mut acquisition, &mut rng.rng);
        }

        crate::log_info(&format!("🏁 Level started ({} enemies)", level.enemy_count));
    }

    if defeated.read().count() > 0 {
        level.active_gameplay = false;
        level.player_defeated = true;
        crate::log_info("☠️ Player defeated → gameplay halted");
    }

    if ended.read().count() > 0 {
        level.active_gameplay = false;
        crate::log_info("🏁 Level ended");
    }
}

/// Level Plugin: ресурсы + события
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelSettings>()
            .init_resource::<LevelState>()
            .register_type::<LevelSettings>()
            .register_type::<LevelState>()
            .add_event::<LevelStarted>()
            .add_event::<LevelEnded>()
            .add_event::<PlayerDefeated>()
            .add_event::<AgentAdded>()
            .add_event::<AgentRemoved>()
            .add_event::<AgentDestroyed>();
    }
}
