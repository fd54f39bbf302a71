//! Damage glue: DamageRequest → Destructible → HealthModified / HealthDepleted
//!
//! Projectile физика внешняя: хост пишет `DamageRequest` при попадании,
//! ECS применяет его к `Destructible` и рассылает уведомления.
//! Деспавн мёртвых через `DespawnAfter` (cosmetic teardown delay).

use bevy::prelude::*;

use crate::components::{DamageOutcome, Destructible};

/// Event: нанести урон (хост / projectile collision → ECS)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: u32,
    /// Игнорирует invincibility и обнуляет health
    pub insta_kill: bool,
}

/// Event: health entity изменился (UI, damage reaction AI)
#[derive(Event, Debug, Clone, Copy)]
pub struct HealthModified {
    pub entity: Entity,
    pub amount: u32,
    pub health: u32,
    pub max_health: u32,
}

/// Event: health дошёл до 0 (ровно один раз на entity)
#[derive(Event, Debug, Clone, Copy)]
pub struct HealthDepleted {
    pub entity: Entity,
}

/// Компонент-маркер: агент уничтожен (terminal)
///
/// Ставится `handle_agent_death`. AI системы пропускают такие entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
///
/// Используется для уборки мёртвых агентов. Система `despawn_after_timeout`
/// сравнивает с elapsed временем симуляции.
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Система: применить DamageRequest к Destructible
///
/// Запросы к entity без Destructible (или уже удалённым) отбрасываются.
pub fn apply_damage(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<&mut Destructible>,
    mut modified_events: EventWriter<HealthModified>,
    mut depleted_events: EventWriter<HealthDepleted>,
) {
    for request in requests.read() {
        let Ok(mut destructible) = targets.get_mut(request.target) else {
            crate::log_warning(&format!(
                "DamageRequest: target {:?} has no Destructible, ignored",
                request.target
            ));
            continue;
        };

        let before = destructible.health();
        let outcome = destructible.apply_damage(request.amount, request.insta_kill);

        if outcome == DamageOutcome::Ignored {
            continue;
        }

        modified_events.write(HealthModified {
            entity: request.target,
            amount: before - destructible.health(),
            health: destructible.health(),
            max_health: destructible.max_health(),
        });

        if outcome == DamageOutcome::Depleted {
            depleted_events.write(HealthDepleted { entity: request.target });
            crate::log_info(&format!("💀 {:?} health depleted", request.target));
        } else {
            crate::log(&format!(
                "💥 {:?} damaged: HP {} → {}",
                request.target,
                before,
                destructible.health()
            ));
        }
    }
}

/// Система: тик invincibility окон
pub fn tick_destructibles(time: Res<Time>, mut destructibles: Query<&mut Destructible>) {
    let delta = time.delta();
    for mut destructible in destructibles.iter_mut() {
        destructible.tick(delta);
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
