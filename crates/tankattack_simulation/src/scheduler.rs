//! Named timers (one slot per concern)
//!
//! Каждый компонент держит свои слоты: scan tic, cooldown, rotation hold,
//! patrol interval, search reset, radius reversion. В слоте максимум один
//! отложенный countdown: `start` всегда заменяет предыдущий, `cancel` сбрасывает.
//! Тикаются один раз за FixedUpdate тем же delta что и остальная симуляция.

use bevy::prelude::*;
use std::time::Duration;

/// Слот для одного отложенного события
#[derive(Debug, Clone, Default, Reflect)]
pub struct TimerSlot {
    timer: Option<Timer>,
}

impl TimerSlot {
    /// Запустить countdown (заменяет текущий). Отрицательное время → 0.
    pub fn start(&mut self, seconds: f32) {
        self.timer = Some(Timer::from_seconds(seconds.max(0.0), TimerMode::Once));
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn remaining_secs(&self) -> f32 {
        self.timer.as_ref().map_or(0.0, Timer::remaining_secs)
    }

    /// Продвинуть таймер. `true` ровно один раз: в тик истечения, слот освобождается.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };

        if timer.tick(delta).finished() {
            self.timer = None;
            true
        } else {
            false
        }
    }
}
