//! Target scan system (TargetAcquisition → SpatialQuery).

use bevy::prelude::*;

use crate::ai::components::{ScanCandidate, ScanSource, TargetAcquisition};
use crate::combat::{AttackController, Dead};
use crate::components::{Agent, ClassTag, Destructible};
use crate::spatial::{PhysicsSpatial, SpatialQuery};

/// Scan center: source frame + offset (x = right, y = up, z = forward)
pub fn scan_center(body: &Transform, weapon: Option<&AttackController>, acquisition: &TargetAcquisition) -> Vec3 {
    let frame = match (acquisition.scan_source(), weapon) {
        (ScanSource::Weapon, Some(weapon)) => weapon.weapon_pose(body),
        _ => *body,
    };

    frame.translation + frame.rotation * acquisition.offset()
}

/// System: scan tic для всех активных сенсоров
///
/// 1. Цель, чья entity исчезла, сбрасывается сразу (каждый тик)
/// 2. Если scan tic наступил (или запрошен): overlap sphere + выбор цели
pub fn run_target_scans(
    time: Res<Time>,
    spatial: PhysicsSpatial,
    mut agents: Query<
        (Entity, &Transform, &mut TargetAcquisition, Option<&AttackController>),
        (With<Agent>, Without<Dead>),
    >,
    destructibles: Query<(&Destructible, Option<&ClassTag>)>,
) {
    let Some(spatial) = spatial.view() else {
        return;
    };
    let delta = time.delta();

    for (entity, transform, mut acquisition, weapon) in agents.iter_mut() {
        if acquisition.forget_target_if(|target| !destructibles.contains(target)) {
            crate::log(&format!("🎯 {:?} target despawned → cleared", entity));
        }

        if !acquisition.tick(delta) {
            continue;
        }

        let center = scan_center(transform, weapon, &acquisition);
        let hits = spatial.overlap_sphere(center, acquisition.radius());

        let candidates = hits.iter().map(|hit| {
            let found = destructibles.get(hit.entity).ok();
            ScanCandidate {
                entity: hit.entity,
                is_trigger: hit.is_trigger,
                position: hit.bounds_center,
                is_destructible: found.is_some_and(|(destructible, _)| destructible.is_alive()),
                class_tag: found.and_then(|(_, tag)| tag.map(ClassTag::as_str)),
            }
        });

        if acquisition.scan(center, candidates) {
            match acquisition.current_target() {
                Some(target) => crate::log(&format!("🎯 {:?} acquired target {:?}", entity, target)),
                None => crate::log(&format!("🎯 {:?} lost target", entity)),
            }
        }
    }
}
