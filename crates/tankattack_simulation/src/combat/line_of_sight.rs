//! Line-of-Sight (LOS): box cast вперёд от источника
//!
//! Box cast идёт вдоль forward источника (ствол турели), длина = дистанция
//! source → target. Т.е. вопрос не "видна ли цель вообще", а "смотрит ли
//! ствол на цель и не перекрыт ли выстрел".
//!
//! - `through_obstacles = true`: цель где-то на линии (собираем ВСЕ hits)
//! - `through_obstacles = false`: цель: ПЕРВОЕ что на линии
//!
//! Trigger volumes (пикапы, зоны) LOS не перекрывают.

use bevy::prelude::*;

use crate::spatial::SpatialQuery;

/// Half extents LOS box по умолчанию (куб 0.5м)
pub const LOS_HALF_EXTENTS: Vec3 = Vec3::splat(0.25);

/// Проверка LOS от `source` (forward = +Z rotation) к entity `target`
///
/// `target`: entity + её текущая (live) позиция, а не снапшот последнего scan.
pub fn has_line_of_sight(
    spatial: &impl SpatialQuery,
    source: &Transform,
    target: Option<(Entity, Vec3)>,
    half_extents: Vec3,
    through_obstacles: bool,
) -> bool {
    let Some((target_entity, target_position)) = target else {
        return false;
    };

    let distance = source.translation.distance(target_position);
    let forward = source.rotation * Vec3::Z;

    let mut solid_hits = spatial
        .cast_box(source.translation, half_extents, source.rotation, forward, distance)
        .into_iter()
        .filter(|hit| !hit.is_trigger);

    if through_obstacles {
        solid_hits.any(|hit| hit.entity == target_entity)
    } else {
        solid_hits.next().is_some_and(|hit| hit.entity == target_entity)
    }
}
