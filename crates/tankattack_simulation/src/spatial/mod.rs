//! Spatial queries (overlap sphere, box cast, raycast)
//!
//! Core логика видит мир только через trait `SpatialQuery`.
//! Реализация: Rapier query pipeline (`PhysicsSpatial` SystemParam → `RapierSpatial`).
//! Коллайдеры: rapier `Collider`; trigger volumes: `Sensor`;
//! выключенные (мёртвые агенты): `ColliderDisabled`.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, RapierContext, ReadRapierContext, ShapeCastOptions};

pub use bevy_rapier3d::prelude::{Collider, ColliderDisabled, Sensor};

/// Минимальный half extent cast box (вырожденный box → почти луч)
const MIN_CAST_EXTENT: f32 = 1e-3;

/// Результат overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapHit {
    pub entity: Entity,
    pub is_trigger: bool,
    /// Центр коллайдера в world space
    pub bounds_center: Vec3,
}

/// Результат cast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub entity: Entity,
    pub is_trigger: bool,
    /// Дистанция вдоль направления cast до первого касания
    pub distance: f32,
}

/// Capability: spatial index мира (read-only, `&self`)
pub trait SpatialQuery {
    /// Все коллайдеры пересекающие сферу, по Entity
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<OverlapHit>;

    /// Oriented box cast вдоль `direction` на `max_distance`; hits отсортированы по distance.
    /// Коллайдеры, которые box уже задевает в точке старта, не репортятся.
    fn cast_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<CastHit>;

    /// Первый hit луча (triggers включены)
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<CastHit> {
        self.cast_box(origin, Vec3::ZERO, Quat::IDENTITY, direction, max_distance)
            .into_iter()
            .next()
    }
}

type ColliderData = (&'static GlobalTransform, Has<Sensor>);
type ColliderFilter = (With<Collider>, Without<ColliderDisabled>);

/// SystemParam: Rapier контекст + данные коллайдеров
#[derive(SystemParam)]
pub struct PhysicsSpatial<'w, 's> {
    rapier: ReadRapierContext<'w, 's>,
    colliders: Query<'w, 's, ColliderData, ColliderFilter>,
}

impl<'w, 's> PhysicsSpatial<'w, 's> {
    /// `None` пока Rapier контекст не создан (до первого Startup)
    pub fn view(&self) -> Option<RapierSpatial<'_, 'w, 's>> {
        let context = self.rapier.single().ok()?;
        Some(RapierSpatial {
            context,
            colliders: &self.colliders,
        })
    }
}

/// `SpatialQuery` поверх Rapier query pipeline на текущий тик
pub struct RapierSpatial<'a, 'w, 's> {
    context: RapierContext<'a>,
    colliders: &'a Query<'w, 's, ColliderData, ColliderFilter>,
}

impl RapierSpatial<'_, '_, '_> {
    /// Sensor флаг коллайдера; None для entity без активного коллайдера
    fn is_trigger(&self, entity: Entity) -> Option<bool> {
        self.colliders.get(entity).ok().map(|(_, sensor)| sensor)
    }

    /// Коллайдеры, содержащие точку (корпус самого стрелка)
    fn containing(&self, point: Vec3) -> Vec<Entity> {
        let mut inside = Vec::new();
        self.context
            .intersect_point(point, QueryFilter::default(), |entity| {
                inside.push(entity);
                true
            });
        inside
    }

    /// Коллайдеры, которые shape задевает в позе старта
    fn overlapping(&self, position: Vec3, rotation: Quat, shape: &Collider) -> Vec<Entity> {
        let mut touched = Vec::new();
        self.context
            .intersect_shape(position, rotation, &*shape.raw, QueryFilter::default(), |entity| {
                touched.push(entity);
                true
            });
        touched
    }

    /// Повторяет `cast` исключая уже найденные entity → все hits вдоль cast
    fn collect_hits(
        &self,
        mut skipped: Vec<Entity>,
        cast: impl Fn(QueryFilter) -> Option<(Entity, f32)>,
    ) -> Vec<CastHit> {
        let mut hits = Vec::new();

        loop {
            let predicate = |entity: Entity| !skipped.contains(&entity);
            let Some((entity, distance)) = cast(QueryFilter::default().predicate(&predicate)) else {
                break;
            };

            skipped.push(entity);
            if let Some(is_trigger) = self.is_trigger(entity) {
                hits.push(CastHit {
                    entity,
                    is_trigger,
                    distance,
                });
            }
        }

        // Равные дистанции: по Entity, чтобы порядок не зависел от broad phase
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.entity.to_bits().cmp(&b.entity.to_bits()))
        });
        hits
    }
}

impl SpatialQuery for RapierSpatial<'_, '_, '_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<OverlapHit> {
        if radius <= 0.0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        self.context.intersect_shape(
            center,
            Quat::IDENTITY,
            &*Collider::ball(radius).raw,
            QueryFilter::default(),
            |entity| {
                if let Ok((transform, sensor)) = self.colliders.get(entity) {
                    hits.push(OverlapHit {
                        entity,
                        is_trigger: sensor,
                        bounds_center: transform.translation(),
                    });
                }
                true
            },
        );

        hits.sort_by_key(|hit| hit.entity.to_bits());
        hits
    }

    fn cast_box(
        &self,
        origin: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        direction: Vec3,
        max_distance: f32,
    ) -> Vec<CastHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };
        if max_distance < 0.0 {
            return Vec::new();
        }

        let half_extents = half_extents.abs().max(Vec3::splat(MIN_CAST_EXTENT));
        let shape = Collider::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let options = ShapeCastOptions::with_max_time_of_impact(max_distance);

        let skipped = self.overlapping(origin, rotation, &shape);
        self.collect_hits(skipped, |filter| {
            self.context
                .cast_shape(origin, rotation, direction, &*shape.raw, options, filter)
                .map(|(entity, hit)| (entity, hit.time_of_impact))
        })
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<CastHit> {
        let direction = direction.try_normalize()?;
        if max_distance < 0.0 {
            return None;
        }

        let inside = self.containing(origin);
        let predicate = |entity: Entity| !inside.contains(&entity);
        let (entity, distance) = self.context.cast_ray(
            origin,
            direction,
            max_distance,
            true,
            QueryFilter::default().predicate(&predicate),
        )?;

        Some(CastHit {
            entity,
            is_trigger: self.is_trigger(entity)?,
            distance,
        })
    }
}

/// Headless App с Rapier для unit тестов spatial запросов
#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;
    use bevy::transform::TransformPlugin;
    use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};

    use super::{PhysicsSpatial, RapierSpatial};

    pub fn physics_app() -> App {
        let step = Duration::from_secs_f64(1.0 / 60.0);
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            RapierPhysicsPlugin::<NoUserData>::default().in_schedule(FixedUpdate),
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(Time::<Fixed>::from_duration(step));
        app
    }

    /// Пара тиков: Rapier подхватывает новые коллайдеры
    pub fn settle(app: &mut App) {
        for _ in 0..3 {
            app.update();
        }
    }

    /// Выполнить запрос к миру App через `PhysicsSpatial`
    pub fn query<T: Send + 'static>(
        app: &mut App,
        run: impl Fn(&RapierSpatial<'_, '_, '_>) -> T + Send + Sync + 'static,
    ) -> T {
        let result = app
            .world_mut()
            .run_system_once(move |spatial: PhysicsSpatial| spatial.view().map(|view| run(&view)));

        match result {
            Ok(Some(value)) => value,
            _ => panic!("rapier context unavailable"),
        }
    }
}
