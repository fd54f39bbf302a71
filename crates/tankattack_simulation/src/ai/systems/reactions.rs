//! AI reaction systems (damage, death, level end, timers).

use bevy::prelude::*;

use crate::ai::components::{BehaviorStateMachine, TargetAcquisition};
use crate::combat::{AttackController, Dead, DespawnAfter, HealthDepleted, HealthModified};
use crate::components::{Agent, MovementCommand};
use crate::level::{AgentDestroyed, LevelEnded, LevelSettings};
use crate::spatial::{Collider, ColliderDisabled};

/// System: тик таймеров автомата (patrol, search reset, radius revert)
pub fn tick_agent_timers(
    time: Res<Time>,
    mut agents: Query<(&mut BehaviorStateMachine, Option<&mut TargetAcquisition>), (With<Agent>, Without<Dead>)>,
) {
    let delta = time.delta();

    for (mut behavior, mut acquisition) in agents.iter_mut() {
        behavior.tick(delta, acquisition.as_deref_mut());
    }
}

/// System: AI реакция на урон по своему Destructible
///
/// Расширяет aggro радиус и форсирует scan. Повторный урон перезапускает
/// revert таймер, радиус не умножается повторно.
pub fn react_to_damage(
    mut damage_events: EventReader<HealthModified>,
    mut agents: Query<(&mut BehaviorStateMachine, &mut TargetAcquisition), (With<Agent>, Without<Dead>)>,
) {
    for event in damage_events.read() {
        // Летальный урон обрабатывает handle_agent_death
        if event.health == 0 {
            continue;
        }

        let Ok((mut behavior, mut acquisition)) = agents.get_mut(event.entity) else {
            continue;
        };

        if behavior.on_damaged(&mut acquisition) {
            crate::log(&format!(
                "🔥 {:?} damaged → aggro radius {:.1}",
                event.entity,
                acquisition.radius()
            ));
        }
    }
}

/// System: смерть агента (HealthDepleted) и конец уровня (LevelEnded)
///
/// Terminal переход: Dead, все таймеры отменены, сенсор выключен,
/// коллайдер выключен (ColliderDisabled), AgentDestroyed, деспавн через teardown delay.
pub fn handle_agent_death(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<LevelSettings>,
    mut depleted_events: EventReader<HealthDepleted>,
    mut level_ended: EventReader<LevelEnded>,
    mut agents: Query<
        (
            Entity,
            &Transform,
            Option<&mut BehaviorStateMachine>,
            Option<&mut TargetAcquisition>,
            Option<&mut AttackController>,
            Has<Collider>,
            &mut MovementCommand,
        ),
        (With<Agent>, Without<Dead>),
    >,
    mut destroyed_events: EventWriter<AgentDestroyed>,
) {
    let mut doomed: Vec<Entity> = depleted_events.read().map(|event| event.entity).collect();

    if level_ended.read().count() > 0 {
        doomed.extend(agents.iter().map(|(entity, ..)| entity));
    }

    doomed.sort_by_key(|entity| entity.to_bits());
    doomed.dedup();

    let despawn_time = time.elapsed_secs() + settings.teardown_delay.max(0.0);

    for entity in doomed {
        let Ok((entity, transform, behavior, acquisition, weapon, has_collider, mut movement)) = agents.get_mut(entity)
        else {
            continue;
        };

        if let Some(mut behavior) = behavior {
            behavior.kill();
        }
        if let Some(mut acquisition) = acquisition {
            acquisition.deactivate();
        }
        if let Some(mut weapon) = weapon {
            weapon.cancel_all();
        }
        if has_collider {
            commands.entity(entity).insert(ColliderDisabled);
        }
        *movement = MovementCommand::Idle;

        commands.entity(entity).insert((Dead, DespawnAfter { despawn_time }));

        destroyed_events.write(AgentDestroyed {
            entity,
            position: transform.translation,
        });

        crate::log_info(&format!("💀 Agent {:?} destroyed at {:?}", entity, transform.translation));
    }
}
