//! AgentBehaviorStateMachine: Patrol / Pursue / SearchReset / Dead
//!
//! Один параметризованный автомат на все архетипы (турель, патрульный танк,
//! агрессивный танк): различия только в конфиге.
//!
//! Переходы (раз в simulation tick):
//! - цель есть → Pursue (re-arm search reset каждый тик)
//! - цели нет, search reset ещё тикает → SearchReset (едем к last known goal)
//! - иначе → Patrol (wander точки в диске вокруг себя)

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::time::Duration;

use crate::ai::components::TargetAcquisition;
use crate::combat::LOS_HALF_EXTENTS;
use crate::components::MovementCommand;
use crate::scheduler::TimerSlot;
use crate::shared::{angle_between, heading_degrees};
use crate::spatial::SpatialQuery;

/// Порог "дошли до goal" (метры)
pub const GOAL_THRESHOLD: f32 = 0.1;

/// Состояние автомата
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum BehaviorState {
    /// Нет цели: wander
    #[default]
    Patrol,
    /// Есть цель: едем на stand-off дистанцию, стреляем
    Pursue,
    /// Цель потеряна недавно: доезжаем до последней goal точки
    SearchReset,
    /// Terminal: агент уничтожен
    Dead,
}

/// Параметры движения (None в BehaviorConfig = стационарная турель)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct MobilityConfig {
    pub patrol_enabled: bool,
    /// Радиус диска wander точек
    pub patrol_max_distance: f32,
    /// Диапазон patrol interval (секунды)
    pub patrol_interval_min: f32,
    pub patrol_interval_max: f32,
    /// Длина forward check луча
    pub forward_check_distance: f32,
    /// Origin forward check луча в фрейме корпуса
    pub forward_check_offset: Vec3,
    /// Если goal отклоняется от forward больше чем на это (градусы): едем даже при препятствии
    pub forward_check_angle_tolerance: f32,
    /// Stand-off дистанция при преследовании
    pub aggro_go_to_distance: f32,
    /// Множитель скорости пока armed search reset
    pub aggro_movement_multiplier: f32,
    pub goal_threshold: f32,
}

impl Default for MobilityConfig {
    fn default() -> Self {
        Self {
            patrol_enabled: true,
            patrol_max_distance: 5.0,
            patrol_interval_min: 2.0,
            patrol_interval_max: 4.0,
            forward_check_distance: 1.5,
            forward_check_offset: Vec3::new(0.0, 0.25, 0.6),
            forward_check_angle_tolerance: 90.0,
            aggro_go_to_distance: 4.0,
            aggro_movement_multiplier: 1.0,
            goal_threshold: GOAL_THRESHOLD,
        }
    }
}

/// Реакция на урон: временно расширить aggro радиус
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct DamageReactionConfig {
    pub range_multiplier: f32,
    /// Секунды до возврата базового радиуса
    pub duration: f32,
}

impl Default for DamageReactionConfig {
    fn default() -> Self {
        Self {
            range_multiplier: 2.0,
            duration: 3.0,
        }
    }
}

impl DamageReactionConfig {
    pub fn is_trivial(&self) -> bool {
        self.duration <= 0.0 || self.range_multiplier <= 0.0
    }
}

/// Параметры автомата
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Стрелять даже если цель не первая на линии огня
    pub attack_through: bool,
    pub los_half_extents: Vec3,
    /// Длина search reset окна (секунды)
    pub search_reset_wait: f32,
    pub mobility: Option<MobilityConfig>,
    pub damage_reaction: Option<DamageReactionConfig>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            attack_through: false,
            los_half_extents: LOS_HALF_EXTENTS,
            search_reset_wait: 2.0,
            mobility: Some(MobilityConfig::default()),
            damage_reaction: None,
        }
    }
}

/// Автомат поведения агента
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct BehaviorStateMachine {
    pub config: BehaviorConfig,
    state: BehaviorState,
    /// Текущая goal точка (wander или stand-off)
    goal: Vec3,
    patrol: TimerSlot,
    search_reset: TimerSlot,
    radius_revert: TimerSlot,
}

impl BehaviorStateMachine {
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    pub fn is_dead(&self) -> bool {
        self.state == BehaviorState::Dead
    }

    pub fn is_patrolling(&self) -> bool {
        self.patrol.is_running()
    }

    pub fn patrol_remaining_secs(&self) -> f32 {
        self.patrol.remaining_secs()
    }

    pub fn is_search_reset_armed(&self) -> bool {
        self.search_reset.is_running()
    }

    pub fn is_radius_boosted(&self) -> bool {
        self.radius_revert.is_running()
    }

    /// Тик таймеров; по истечении radius revert возвращает базовый радиус сенсора
    pub fn tick(&mut self, delta: Duration, acquisition: Option<&mut TargetAcquisition>) {
        if self.is_dead() {
            return;
        }

        self.patrol.tick(delta);
        self.search_reset.tick(delta);

        if self.radius_revert.tick(delta) {
            if let Some(acquisition) = acquisition {
                acquisition.restore_base_radius();
            }
        }
    }

    /// Решить движение на этот тик
    ///
    /// `target`: текущая позиция цели (None = цели нет).
    pub fn update(
        &mut self,
        body: &Transform,
        target: Option<Vec3>,
        spatial: &impl SpatialQuery,
        rng: &mut impl Rng,
        delta_secs: f32,
    ) -> MovementCommand {
        if self.is_dead() {
            return MovementCommand::Idle;
        }

        let mobility = self.config.mobility.clone();

        let should_move = match target {
            Some(target_position) => {
                self.state = BehaviorState::Pursue;
                self.patrol.cancel();
                let moving = mobility
                    .as_ref()
                    .is_some_and(|mobility| self.pursue(body, target_position, mobility));
                self.search_reset.start(self.config.search_reset_wait);
                moving
            }
            None if self.search_reset.is_running() => {
                self.state = BehaviorState::SearchReset;
                mobility.as_ref().is_some_and(|mobility| {
                    body.translation.distance(self.goal) > mobility.goal_threshold
                })
            }
            None => {
                self.state = BehaviorState::Patrol;
                mobility
                    .as_ref()
                    .is_some_and(|mobility| self.patrol_step(body, mobility, spatial, rng))
            }
        };

        match mobility {
            Some(mobility) if should_move => self.movement_command(body, &mobility, delta_secs),
            _ => MovementCommand::Idle,
        }
    }

    /// Урон по своему Destructible → расширить радиус + внеочередной scan.
    /// Повторный урон перезапускает revert таймер (не складывается).
    pub fn on_damaged(&mut self, acquisition: &mut TargetAcquisition) -> bool {
        if self.is_dead() {
            return false;
        }

        let Some(reaction) = self.config.damage_reaction.filter(|reaction| !reaction.is_trivial()) else {
            return false;
        };

        acquisition.set_radius(acquisition.base_radius() * reaction.range_multiplier);
        acquisition.request_scan();
        self.radius_revert.start(reaction.duration);
        true
    }

    /// Terminal переход: все таймеры отменяются безусловно
    pub fn kill(&mut self) {
        self.state = BehaviorState::Dead;
        self.cancel_all();
    }

    pub fn cancel_all(&mut self) {
        self.patrol.cancel();
        self.search_reset.cancel();
        self.radius_revert.cancel();
    }

    fn pursue(&mut self, body: &Transform, target_position: Vec3, mobility: &MobilityConfig) -> bool {
        let to_target = target_position - body.translation;
        let stand_off = mobility.aggro_go_to_distance.abs();

        // Не лезем вплотную
        if to_target.length() <= stand_off {
            return false;
        }

        self.goal = body.translation + to_target.normalize_or_zero() * mobility.aggro_go_to_distance;
        true
    }

    fn patrol_step(
        &mut self,
        body: &Transform,
        mobility: &MobilityConfig,
        spatial: &impl SpatialQuery,
        rng: &mut impl Rng,
    ) -> bool {
        if !mobility.patrol_enabled {
            return false;
        }

        if !self.patrol.is_running() {
            self.patrol.start(random_interval(
                rng,
                mobility.patrol_interval_min,
                mobility.patrol_interval_max,
            ));
            self.goal = body.translation + random_in_disk(rng, mobility.patrol_max_distance);
        }

        let mut moving = body.translation.distance(self.goal) > mobility.goal_threshold;

        // Дошли: следующий тик выберет новую точку
        if !moving {
            self.patrol.cancel();
            return false;
        }

        // Forward check: твёрдое препятствие впереди останавливает,
        // если только goal не сзади (тогда едем, чтобы развернуться)
        let forward = body.rotation * Vec3::Z;
        let origin = body.translation + body.rotation * mobility.forward_check_offset;
        if let Some(hit) = spatial.raycast(origin, forward, mobility.forward_check_distance) {
            if !hit.is_trigger {
                moving = angle_between(forward, self.goal - body.translation)
                    > mobility.forward_check_angle_tolerance;
            }
        }

        moving
    }

    fn movement_command(&self, body: &Transform, mobility: &MobilityConfig, delta_secs: f32) -> MovementCommand {
        let direction = (self.goal - body.translation).normalize_or_zero();
        if direction.x == 0.0 && direction.z == 0.0 {
            return MovementCommand::Idle;
        }

        let mut input = direction.x.abs().max(direction.z.abs()) * delta_secs.max(0.0);
        if self.search_reset.is_running() {
            input *= mobility.aggro_movement_multiplier;
        }

        MovementCommand::Drive {
            input,
            heading_degrees: heading_degrees(direction),
        }
    }
}

/// Случайная точка в диске радиуса `radius` (XZ плоскость, равномерно по площади)
pub fn random_in_disk(rng: &mut impl Rng, radius: f32) -> Vec3 {
    let radius = radius.max(0.0);
    if radius == 0.0 {
        return Vec3::ZERO;
    }

    let distance = radius * rng.gen::<f32>().sqrt();
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(distance * angle.cos(), 0.0, distance * angle.sin())
}

/// Случайная длительность в [min, max] (порядок границ не важен, отрицательные → 0)
pub fn random_interval(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    let low = min.min(max).max(0.0);
    let high = min.max(max).max(0.0);

    if high - low <= f32::EPSILON {
        low
    } else {
        rng.gen_range(low..=high)
    }
}
