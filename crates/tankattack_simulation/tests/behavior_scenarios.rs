//! Agent behavior integration tests
//!
//! Pursue → SearchReset → Patrol, damage reaction, firing cadence, LOS gate,
//! цель, сдвинувшаяся между scan tic.

use std::time::Duration;

use approx::assert_abs_diff_eq;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use tankattack_simulation::*;

fn step() -> Duration {
    Duration::from_secs_f64(1.0 / SIMULATION_HZ)
}

/// Собирает ProjectileSpawnRequested для проверок
#[derive(Resource, Default)]
struct Shots(Vec<ProjectileSpawnRequested>);

fn collect_shots(mut events: EventReader<ProjectileSpawnRequested>, mut shots: ResMut<Shots>) {
    shots.0.extend(events.read().cloned());
}

fn create_test_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step()))
        .insert_resource(Time::<Fixed>::from_duration(step()))
        .init_resource::<Shots>()
        .add_systems(FixedPostUpdate, collect_shots);
    app
}

fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

fn start_level(app: &mut App) {
    run(app, 2);
    app.world_mut().send_event(LevelStarted);
    app.update();
}

fn shots(app: &App) -> usize {
    app.world().resource::<Shots>().0.len()
}

fn state(app: &App, agent: Entity) -> Option<BehaviorState> {
    app.world().get::<BehaviorStateMachine>(agent).map(BehaviorStateMachine::state)
}

fn position(app: &App, agent: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(agent)
        .map_or(Vec3::NAN, |transform| transform.translation)
}

fn move_to(app: &mut App, entity: Entity, translation: Vec3) {
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(entity) {
        transform.translation = translation;
    }
}

fn turret_yaw(app: &App, turret: Entity) -> f32 {
    app.world()
        .get::<AttackController>(turret)
        .map_or(f32::NAN, AttackController::yaw_degrees)
}

fn scanned_position(app: &App, agent: Entity) -> Option<Vec3> {
    app.world()
        .get::<TargetAcquisition>(agent)
        .and_then(TargetAcquisition::target)
        .map(|(_, position)| position)
}

/// Турель, которая сканирует раз в 10с и стреляет каждый тик
fn slow_scan_turret() -> AgentArchetype {
    AgentArchetype {
        sensor: Some(SensorConfig {
            radius: 12.0,
            scan_interval: 10.0,
            first_scan_jitter: 0.0,
            ..default()
        }),
        weapon: Some(WeaponConfig {
            attack_interval: 0.0,
            rotation_hold_duration: 0.0,
            ..default()
        }),
        ..AgentArchetype::stationary_turret()
    }
}

fn chasing_tank() -> AgentArchetype {
    AgentArchetype {
        sensor: Some(SensorConfig {
            radius: 6.0,
            scan_interval: 0.1,
            first_scan_jitter: 0.0,
            ..default()
        }),
        behavior: BehaviorConfig {
            search_reset_wait: 1.0,
            mobility: Some(MobilityConfig {
                aggro_go_to_distance: 4.0,
                aggro_movement_multiplier: 2.0,
                ..default()
            }),
            ..default()
        },
        movement_speed: 3.0,
        ..AgentArchetype::patrolling_tank()
    }
}

/// Scenario C: цель потеряна → SearchReset с множителем скорости → Patrol
#[test]
fn test_lost_target_search_reset_then_patrol() {
    let mut app = create_test_app(5);
    let tank = spawn_agent(app.world_mut(), &chasing_tank(), Transform::IDENTITY);
    let player = spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.0), 1000, "Player");

    start_level(&mut app);
    assert_eq!(state(&app, tank), Some(BehaviorState::Pursue));

    // Цель уходит из радиуса
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
        transform.translation = Vec3::new(100.0, 0.0, 0.0);
    }
    run(&mut app, 12);
    assert_eq!(state(&app, tank), Some(BehaviorState::SearchReset));

    // Едем к last known goal с множителем: speed 3 × multiplier 2 / 60Hz
    let before = position(&app, tank);
    app.update();
    let after = position(&app, tank);
    assert_abs_diff_eq!(before.distance(after), 3.0 * 2.0 / 60.0, epsilon = 1e-3);
    assert_eq!(state(&app, tank), Some(BehaviorState::SearchReset));

    // Окно истекло → Patrol
    run(&mut app, 60);
    assert_eq!(state(&app, tank), Some(BehaviorState::Patrol));
    assert_eq!(
        app.world().get::<TargetAcquisition>(tank).and_then(TargetAcquisition::current_target),
        None
    );
}

#[test]
fn test_pursuit_stops_at_stand_off_distance() {
    let mut app = create_test_app(6);
    let tank = spawn_agent(app.world_mut(), &chasing_tank(), Transform::IDENTITY);
    spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.5), 1000, "Player");

    start_level(&mut app);
    run(&mut app, 120);

    assert_eq!(state(&app, tank), Some(BehaviorState::Pursue));
    let distance = position(&app, tank).distance(Vec3::new(0.0, 0.0, 5.5));
    assert!(distance <= 4.0 + 1e-3, "distance = {}", distance);
    assert!(distance > 3.8, "tank crowded the target: distance = {}", distance);
}

/// Scenario D: урон → радиус ×2 сразу, возврат ровно один раз через 3с после последнего урона
#[test]
fn test_damage_widens_radius_and_reverts_once() {
    let mut app = create_test_app(7);
    let archetype = AgentArchetype {
        max_health: 1000,
        invincibility_duration: 0.0,
        sensor: Some(SensorConfig {
            radius: 5.0,
            ..default()
        }),
        ..AgentArchetype::stationary_turret()
    };
    let turret = spawn_agent(app.world_mut(), &archetype, Transform::IDENTITY);
    start_level(&mut app);

    let radius = |app: &App| {
        app.world()
            .get::<TargetAcquisition>(turret)
            .map_or(f32::NAN, TargetAcquisition::radius)
    };
    assert_eq!(radius(&app), 5.0);

    let hit = DamageRequest {
        target: turret,
        amount: 1,
        insta_kill: false,
    };

    app.world_mut().send_event(hit);
    app.update();
    assert_eq!(radius(&app), 10.0);

    // Повторный урон через 1с и 2с
    run(&mut app, 59);
    app.world_mut().send_event(hit);
    app.update();
    run(&mut app, 59);
    app.world_mut().send_event(hit);
    app.update();
    assert_eq!(radius(&app), 10.0);

    let mut reverts = 0;
    let mut previous = radius(&app);
    for tick in 1..=240 {
        app.update();
        let current = radius(&app);
        if previous == 10.0 && current == 5.0 {
            reverts += 1;
            // ~3с (180 тиков) после последнего урона
            assert!((178..=182).contains(&tick), "reverted at tick {}", tick);
        }
        previous = current;
    }

    assert_eq!(reverts, 1);
    assert_eq!(radius(&app), 5.0);
}

/// TryFire под cooldown: много тиков с целью в LOS → ровно один выстрел за интервал
#[test]
fn test_turret_fires_once_per_cooldown() {
    let mut app = create_test_app(8);
    let archetype = AgentArchetype {
        weapon: Some(WeaponConfig {
            attack_interval: 1.5,
            rotation_hold_duration: 0.3,
            ..default()
        }),
        ..AgentArchetype::stationary_turret()
    };
    let turret = spawn_agent(app.world_mut(), &archetype, Transform::IDENTITY);
    spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.0), 1000, "Player");

    start_level(&mut app);
    assert_eq!(shots(&app), 1);

    run(&mut app, 60);
    assert_eq!(shots(&app), 1);

    run(&mut app, 60);
    assert_eq!(shots(&app), 2);

    let shot = &app.world().resource::<Shots>().0[0];
    assert_eq!(shot.shooter, turret);
    assert_eq!(shot.ignore, vec![turret]);
    // Точка вылета: перед стволом (mount + muzzle offset)
    assert!(shot.pose.translation.z > 0.5);
}

#[test]
fn test_wall_blocks_fire_unless_attack_through() {
    for attack_through in [false, true] {
        let mut app = create_test_app(9);
        let archetype = AgentArchetype {
            behavior: BehaviorConfig {
                attack_through,
                mobility: None,
                ..default()
            },
            ..AgentArchetype::stationary_turret()
        };
        spawn_agent(app.world_mut(), &archetype, Transform::IDENTITY);
        spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 6.0), 1000, "Player");

        // Стена между турелью и игроком (без Destructible: не цель)
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.5, 3.0),
            Collider::cuboid(2.0, 1.0, 0.2),
        ));

        start_level(&mut app);
        run(&mut app, 30);

        assert_eq!(shots(&app) > 0, attack_through, "attack_through = {}", attack_through);
    }
}

/// Цель отъехала дальше по линии ствола между scan tic: LOS меряется до live позиции
#[test]
fn test_target_moved_along_barrel_between_scans_stays_in_sight() {
    let mut app = create_test_app(12);
    let turret = spawn_agent(app.world_mut(), &slow_scan_turret(), Transform::IDENTITY);
    let player = spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.0), 100_000, "Player");

    start_level(&mut app);
    run(&mut app, 1);
    assert_eq!(shots(&app), 2);

    move_to(&mut app, player, Vec3::new(0.0, 0.0, 8.0));
    run(&mut app, 2);
    let before = shots(&app);
    run(&mut app, 30);

    // Scan ещё не было: снапшот старый, но выстрел каждый тик
    assert_eq!(scanned_position(&app, turret), Some(Vec3::new(0.0, 0.0, 5.0)));
    assert_eq!(shots(&app) - before, 30);
}

/// Stand-off считается от live позиции цели, а не от снапшота scan
#[test]
fn test_pursuit_follows_target_moved_between_scans() {
    let mut app = create_test_app(13);
    let archetype = AgentArchetype {
        sensor: Some(SensorConfig {
            radius: 6.0,
            scan_interval: 10.0,
            first_scan_jitter: 0.0,
            ..default()
        }),
        ..chasing_tank()
    };
    let tank = spawn_agent(app.world_mut(), &archetype, Transform::IDENTITY);
    let player = spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.5), 1000, "Player");

    start_level(&mut app);
    assert_eq!(state(&app, tank), Some(BehaviorState::Pursue));

    let moved = Vec3::new(0.0, 0.0, 9.5);
    move_to(&mut app, player, moved);
    run(&mut app, 150);

    assert_eq!(scanned_position(&app, tank), Some(Vec3::new(0.0, 0.0, 5.5)));
    assert_eq!(state(&app, tank), Some(BehaviorState::Pursue));
    let distance = position(&app, tank).distance(moved);
    assert!(distance <= 4.0 + 1e-3, "distance = {}", distance);
    assert!(distance > 3.8, "tank crowded the target: distance = {}", distance);
}

/// Наведение идёт по снапшоту: цель ушла вбок между scan tic → ствол не крутится и не стреляет
#[test]
fn test_turret_aims_at_scanned_position_until_next_scan() {
    let mut app = create_test_app(14);
    let turret = spawn_agent(app.world_mut(), &slow_scan_turret(), Transform::IDENTITY);
    let player = spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 5.0), 100_000, "Player");

    start_level(&mut app);
    assert!(shots(&app) >= 1);

    move_to(&mut app, player, Vec3::new(5.0, 0.0, 0.0));
    run(&mut app, 2);
    let before = shots(&app);
    run(&mut app, 60);

    assert_abs_diff_eq!(shared::delta_angle(turret_yaw(&app, turret), 0.0), 0.0, epsilon = 1e-3);
    assert_eq!(shots(&app), before);
}

#[test]
fn test_turret_rotates_towards_target_and_never_moves() {
    let mut app = create_test_app(10);
    let turret = spawn_agent(app.world_mut(), &AgentArchetype::stationary_turret(), Transform::IDENTITY);
    spawn_player_dummy(app.world_mut(), Vec3::new(5.0, 0.0, 0.0), 1000, "Player");

    start_level(&mut app);
    run(&mut app, 120);

    assert_abs_diff_eq!(shared::delta_angle(turret_yaw(&app, turret), 90.0), 0.0, epsilon = 0.5);
    assert_eq!(position(&app, turret), Vec3::ZERO);
    assert!(shots(&app) >= 1, "turret never fired after aiming");
}

#[test]
fn test_patrolling_tank_wanders_without_target() {
    let mut app = create_test_app(11);
    let tank = spawn_agent(app.world_mut(), &AgentArchetype::patrolling_tank(), Transform::IDENTITY);

    start_level(&mut app);
    assert_eq!(state(&app, tank), Some(BehaviorState::Patrol));

    run(&mut app, 60);
    assert!(position(&app, tank).length() > 0.1);
    assert_eq!(state(&app, tank), Some(BehaviorState::Patrol));
}
