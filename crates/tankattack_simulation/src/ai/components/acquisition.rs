//! TargetAcquisition: периодический сенсор агента
//!
//! Каждый scan tic: overlap sphere → фильтры → lock-on → ближайший кандидат.
//! Позиция цели снапшотится на момент scan и используется для наведения
//! между сканами.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scheduler::TimerSlot;

/// От какого фрейма считается scan center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum ScanSource {
    /// Корпус агента
    #[default]
    Body,
    /// Оружие (турель)
    Weapon,
}

/// Класс кандидата по его ClassTag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    Player,
    Hostile,
    Other,
}

/// Какие классы агент считает целями
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct TargetFilters {
    pub player: bool,
    pub hostile: bool,
    pub other: bool,
}

impl Default for TargetFilters {
    fn default() -> Self {
        Self {
            player: true,
            hostile: false,
            other: false,
        }
    }
}

impl TargetFilters {
    pub fn any(&self) -> bool {
        self.player || self.hostile || self.other
    }

    pub fn accepts(&self, class: TargetClass) -> bool {
        match class {
            TargetClass::Player => self.player,
            TargetClass::Hostile => self.hostile,
            TargetClass::Other => self.other,
        }
    }
}

/// Конфиг сенсора (неизменный на время жизни агента)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct SensorConfig {
    /// Смещение scan center в фрейме source (x = right, y = up, z = forward)
    pub offset: Vec3,
    /// Базовый радиус (≤ 0 = scanning выключен)
    pub radius: f32,
    /// Период scan tic (секунды)
    pub scan_interval: f32,
    /// Hysteresis: не менять цель пока она валидна
    pub lock_on: bool,
    pub filters: TargetFilters,
    pub player_tag: String,
    pub hostile_tag: String,
    pub scan_source: ScanSource,
    /// Max случайная добавка к первому re-arm (секунды)
    pub first_scan_jitter: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            radius: 10.0,
            scan_interval: 0.5,
            lock_on: false,
            filters: TargetFilters::default(),
            player_tag: "Player".to_string(),
            hostile_tag: "Enemy".to_string(),
            scan_source: ScanSource::Body,
            first_scan_jitter: 0.2,
        }
    }
}

/// Кандидат из spatial query (уже с данными Destructible/ClassTag)
#[derive(Debug, Clone, Copy)]
pub struct ScanCandidate<'a> {
    pub entity: Entity,
    pub is_trigger: bool,
    /// Центр bounding box
    pub position: Vec3,
    pub is_destructible: bool,
    pub class_tag: Option<&'a str>,
}

/// Сенсор агента: текущая цель + расписание сканов
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TargetAcquisition {
    /// None = сенсор не сконфигурирован, цель всегда отсутствует
    config: Option<SensorConfig>,
    radius: f32,
    current_target: Option<Entity>,
    target_position: Vec3,
    ignore: Vec<Entity>,
    active: bool,
    scan_timer: TimerSlot,
    scan_requested: bool,
    pending_jitter: f32,
}

impl Default for TargetAcquisition {
    fn default() -> Self {
        Self::new(SensorConfig::default())
    }
}

impl TargetAcquisition {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            radius: config.radius,
            config: Some(config),
            current_target: None,
            target_position: Vec3::ZERO,
            ignore: Vec::new(),
            active: false,
            scan_timer: TimerSlot::default(),
            scan_requested: false,
            pending_jitter: 0.0,
        }
    }

    /// Сенсор без конфига (агент никогда не находит цель)
    pub fn unconfigured() -> Self {
        Self {
            config: None,
            radius: 0.0,
            ..Self::new(SensorConfig::default())
        }
    }

    pub fn config(&self) -> Option<&SensorConfig> {
        self.config.as_ref()
    }

    pub fn scan_source(&self) -> ScanSource {
        self.config.as_ref().map_or_else(ScanSource::default, |config| config.scan_source)
    }

    pub fn offset(&self) -> Vec3 {
        self.config.as_ref().map_or(Vec3::ZERO, |config| config.offset)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn base_radius(&self) -> f32 {
        self.config.as_ref().map_or(0.0, |config| config.radius)
    }

    pub fn current_target(&self) -> Option<Entity> {
        self.current_target
    }

    /// Позиция цели на момент последнего scan
    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    /// Цель + снапшот позиции
    pub fn target(&self) -> Option<(Entity, Vec3)> {
        self.current_target.map(|entity| (entity, self.target_position))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ignore_list(&self) -> &[Entity] {
        &self.ignore
    }

    pub fn is_scan_scheduled(&self) -> bool {
        self.scan_timer.is_running() || self.scan_requested
    }

    /// Scanning возможен: есть конфиг, радиус > 0, хотя бы один фильтр
    pub fn is_scanning_enabled(&self) -> bool {
        self.radius > 0.0 && self.config.as_ref().is_some_and(|config| config.filters.any())
    }

    pub fn classify(&self, class_tag: Option<&str>) -> TargetClass {
        let Some(config) = self.config.as_ref() else {
            return TargetClass::Other;
        };

        match class_tag {
            Some(tag) if tag == config.player_tag => TargetClass::Player,
            Some(tag) if tag == config.hostile_tag => TargetClass::Hostile,
            _ => TargetClass::Other,
        }
    }

    /// Включить сканирование на уровень: ignore list + немедленный первый scan.
    /// `first_jitter` добавляется к первому re-arm.
    pub fn activate(&mut self, ignore: Vec<Entity>, first_jitter: f32) {
        self.active = true;
        self.ignore = ignore;
        self.pending_jitter = first_jitter.max(0.0);
        self.scan_timer.cancel();
        self.scan_requested = true;
    }

    /// Остановить сканирование (смерть / конец уровня). Цель не трогаем.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.scan_timer.cancel();
        self.scan_requested = false;
        self.pending_jitter = 0.0;
    }

    /// Внеочередной scan в ближайший scan pass
    pub fn request_scan(&mut self) {
        if self.active {
            self.scan_requested = true;
        }
    }

    pub fn set_ignore_list(&mut self, ignore: Vec<Entity>) {
        self.ignore = ignore;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    pub fn restore_base_radius(&mut self) {
        self.radius = self.base_radius();
    }

    /// Сбросить цель если её entity больше нет в мире
    pub fn forget_target_if(&mut self, is_missing: impl Fn(Entity) -> bool) -> bool {
        if !self.active {
            return false;
        }

        match self.current_target {
            Some(target) if is_missing(target) => {
                self.current_target = None;
                true
            }
            _ => false,
        }
    }

    /// Продвинуть расписание. `true` = пора сканировать в этом тике.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.active {
            return false;
        }

        let elapsed = self.scan_timer.tick(delta);
        let requested = std::mem::take(&mut self.scan_requested);
        elapsed || requested
    }

    /// Scan по кандидатам из overlap query вокруг `center`.
    ///
    /// Возвращает `true` если текущая цель изменилась.
    pub fn scan<'a>(&mut self, center: Vec3, candidates: impl IntoIterator<Item = ScanCandidate<'a>>) -> bool {
        if !self.active {
            return false;
        }

        let previous = self.current_target;

        let Some(config) = self.config.as_ref() else {
            self.current_target = None;
            return previous.is_some();
        };
        let lock_on = config.lock_on;

        self.rearm();

        if !self.is_scanning_enabled() {
            self.current_target = None;
            return previous.is_some();
        }

        let survivors: Vec<(Entity, Vec3)> = candidates
            .into_iter()
            .filter(|candidate| self.accepts(candidate))
            .map(|candidate| (candidate.entity, candidate.position))
            .collect();

        // Lock-on: текущая цель всё ещё валидна → оставляем, обновляем снапшот
        if lock_on {
            if let Some(current) = previous {
                if let Some(&(_, position)) = survivors.iter().find(|(entity, _)| *entity == current) {
                    self.target_position = position;
                    return false;
                }
            }
        }

        // Ближайший к scan center; равные дистанции → меньший Entity bits
        let winner = survivors.into_iter().min_by(|(a, a_pos), (b, b_pos)| {
            a_pos
                .distance_squared(center)
                .total_cmp(&b_pos.distance_squared(center))
                .then_with(|| a.to_bits().cmp(&b.to_bits()))
        });

        match winner {
            Some((entity, position)) => {
                self.current_target = Some(entity);
                self.target_position = position;
            }
            None => self.current_target = None,
        }

        self.current_target != previous
    }

    /// Отменить все таймеры сенсора
    pub fn cancel_all(&mut self) {
        self.scan_timer.cancel();
        self.scan_requested = false;
    }

    fn accepts(&self, candidate: &ScanCandidate) -> bool {
        if candidate.is_trigger || !candidate.is_destructible {
            return false;
        }

        if self.ignore.contains(&candidate.entity) {
            return false;
        }

        let class = self.classify(candidate.class_tag);
        self.config.as_ref().is_some_and(|config| config.filters.accepts(class))
    }

    fn rearm(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };

        let interval = config.scan_interval.max(0.0) + std::mem::take(&mut self.pending_jitter);
        self.scan_timer.start(interval);
    }
}
