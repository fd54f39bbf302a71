//! Agent behavior system: LOS → движение → выстрел → наведение турели.

use bevy::prelude::*;

use crate::ai::components::{BehaviorStateMachine, TargetAcquisition};
use crate::combat::{
    has_line_of_sight, AttackController, Dead, MuzzleFlashRequested, ProjectileSpawnRequested, WeaponFired,
};
use crate::components::{Agent, MovementCommand};
use crate::spatial::PhysicsSpatial;
use crate::DeterministicRng;

/// System: один simulation tick всех живых агентов
///
/// Порядок на агента:
/// 1. LOS от оружия к цели (live позиция цели)
/// 2. BehaviorStateMachine → MovementCommand (stand-off от live позиции)
/// 3. Выстрел если цель в LOS и оружие не на cooldown
/// 4. Наведение турели (снапшот последнего scan − позиция оружия)
///
/// Агент без оружия никогда не стреляет, без сенсора: всегда Patrol.
pub fn drive_agents(
    time: Res<Time>,
    spatial: PhysicsSpatial,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<
        (
            Entity,
            &Transform,
            &mut BehaviorStateMachine,
            Option<&TargetAcquisition>,
            Option<&mut AttackController>,
            &mut MovementCommand,
        ),
        (With<Agent>, Without<Dead>),
    >,
    poses: Query<&Transform>,
    mut projectile_events: EventWriter<ProjectileSpawnRequested>,
    mut muzzle_events: EventWriter<MuzzleFlashRequested>,
    mut fired_events: EventWriter<WeaponFired>,
) {
    let Some(spatial) = spatial.view() else {
        return;
    };
    let delta = time.delta_secs();

    let mut sorted: Vec<_> = agents.iter_mut().collect();
    sorted.sort_by_key(|(entity, ..)| entity.to_bits());

    for (entity, transform, mut behavior, acquisition, mut weapon, mut movement) in sorted {
        let snapshot = acquisition.and_then(TargetAcquisition::target);
        let target = snapshot.and_then(|(target, _)| {
            poses
                .get(target)
                .ok()
                .map(|pose| (target, pose.translation))
        });

        // 1. LOS
        let in_sight = weapon.as_deref().is_some_and(|weapon| {
            has_line_of_sight(
                &spatial,
                &weapon.weapon_pose(transform),
                target,
                behavior.config.los_half_extents,
                behavior.config.attack_through,
            )
        });

        // 2. Движение
        let previous_state = behavior.state();
        let command = behavior.update(
            transform,
            target.map(|(_, position)| position),
            &spatial,
            &mut rng.rng,
            delta,
        );
        *movement = command;

        if behavior.state() != previous_state {
            crate::log(&format!(
                "🧠 {:?} {:?} → {:?}",
                entity,
                previous_state,
                behavior.state()
            ));
        }

        let Some(weapon) = weapon.as_deref_mut() else {
            continue;
        };

        // 3. Выстрел
        if in_sight && !weapon.is_on_cooldown() {
            if let Some(order) = weapon.try_fire(transform) {
                if order.spawn_projectile {
                    projectile_events.write(ProjectileSpawnRequested {
                        shooter: entity,
                        pose: order.spawn_pose,
                        ignore: vec![entity],
                    });
                }

                if order.muzzle_fx {
                    muzzle_events.write(MuzzleFlashRequested {
                        shooter: entity,
                        pose: order.spawn_pose,
                    });
                }

                fired_events.write(WeaponFired {
                    shooter: entity,
                    target: target.map(|(target, _)| target),
                });

                crate::log(&format!("🔫 {:?} fired at {:?}", entity, target.map(|(target, _)| target)));
            }
        }

        // 4. Наведение: по снапшоту, ствол догоняет цель только на scan tic
        if let Some((_, aim_position)) = snapshot {
            let weapon_position = weapon.weapon_pose(transform).translation;
            weapon.rotate_towards(aim_position - weapon_position, delta);
        }
    }
}
