//! Базовые компоненты акторов: Agent, Destructible, ClassTag

use bevy::prelude::*;
use std::time::Duration;

use crate::scheduler::TimerSlot;

/// Автономный враждебный агент (турель, танк)
///
/// Маркер для level bookkeeping (AgentAdded/AgentRemoved) и AI систем.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(crate::components::MovementCommand)]
pub struct Agent;

/// Класс entity для фильтров targeting ("Player", "Enemy", ...)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ClassTag(pub String);

impl ClassTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Результат применения урона
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincibility window (или уже мёртв): урон проигнорирован
    Ignored,
    /// Health изменился, entity жив
    Damaged,
    /// Health дошёл до 0 (ровно один раз)
    Depleted,
}

/// Destructible capability: здоровье + invincibility после попадания
///
/// Инвариант: 0 ≤ health ≤ max_health, max_health ≥ 1
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Destructible {
    health: u32,
    max_health: u32,
    /// Окно неуязвимости после не-летального урона (секунды, 0 = нет)
    pub invincibility_duration: f32,
    invincibility: TimerSlot,
}

impl Default for Destructible {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Destructible {
    pub fn new(max_health: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            health: max_health,
            max_health,
            invincibility_duration: 0.0,
            invincibility: TimerSlot::default(),
        }
    }

    pub fn with_invincibility(mut self, seconds: f32) -> Self {
        self.invincibility_duration = seconds.max(0.0);
        self
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_running()
    }

    pub fn apply_damage(&mut self, amount: u32, insta_kill: bool) -> DamageOutcome {
        if !self.is_alive() || (!insta_kill && self.is_invincible()) {
            return DamageOutcome::Ignored;
        }

        self.health = if insta_kill {
            0
        } else {
            self.health.saturating_sub(amount)
        };

        if self.health > 0 {
            if self.invincibility_duration > 0.0 {
                self.invincibility.start(self.invincibility_duration);
            }
            DamageOutcome::Damaged
        } else {
            self.invincibility.cancel();
            DamageOutcome::Depleted
        }
    }

    pub fn tick(&mut self, delta: Duration) {
        self.invincibility.tick(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructible_damage_and_depletion() {
        let mut destructible = Destructible::new(100);
        assert_eq!(destructible.apply_damage(30, false), DamageOutcome::Damaged);
        assert_eq!(destructible.health(), 70);

        assert_eq!(destructible.apply_damage(500, false), DamageOutcome::Depleted);
        assert_eq!(destructible.health(), 0);
        assert!(!destructible.is_alive());

        // Depleted репортится один раз
        assert_eq!(destructible.apply_damage(10, false), DamageOutcome::Ignored);
    }

    #[test]
    fn test_invincibility_window() {
        let mut destructible = Destructible::new(100).with_invincibility(0.5);
        assert_eq!(destructible.apply_damage(10, false), DamageOutcome::Damaged);
        assert!(destructible.is_invincible());
        assert_eq!(destructible.apply_damage(10, false), DamageOutcome::Ignored);
        assert_eq!(destructible.health(), 90);

        destructible.tick(Duration::from_millis(600));
        assert!(!destructible.is_invincible());
        assert_eq!(destructible.apply_damage(10, false), DamageOutcome::Damaged);
        assert_eq!(destructible.health(), 80);
    }

    #[test]
    fn test_insta_kill_ignores_invincibility() {
        let mut destructible = Destructible::new(100).with_invincibility(5.0);
        destructible.apply_damage(1, false);
        assert_eq!(destructible.apply_damage(0, true), DamageOutcome::Depleted);
    }

    #[test]
    fn test_max_health_clamped() {
        let destructible = Destructible::new(0);
        assert_eq!(destructible.max_health(), 1);
        assert!(destructible.is_alive());
    }
}
