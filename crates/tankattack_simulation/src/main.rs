//! Headless симуляция TankAttack
//!
//! Запускает Bevy App без рендера: игрок-манекен + по агенту каждого архетипа.

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;
use tankattack_simulation::{
    create_headless_app, log_info, spawn_agent, spawn_player_dummy, AgentArchetype, BehaviorStateMachine,
    LevelSettings, LevelStarted, LevelState, TargetAcquisition, SIMULATION_HZ,
};

use bevy::prelude::*;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    log_info(&format!("Starting TankAttack headless simulation (seed: {})", seed));

    // Ровно один fixed tick на update
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / SIMULATION_HZ,
    )));

    let player_tag = app.world().resource::<LevelSettings>().player_tag.clone();
    spawn_player_dummy(app.world_mut(), Vec3::new(0.0, 0.0, 0.0), 500, &player_tag);

    let positions = [
        Vec3::new(6.0, 0.0, 0.0),
        Vec3::new(-5.0, 0.0, 4.0),
        Vec3::new(0.0, 0.0, -9.0),
    ];
    for (archetype, position) in AgentArchetype::presets().iter().zip(positions) {
        spawn_agent(app.world_mut(), archetype, Transform::from_translation(position));
    }

    app.update();
    app.world_mut().send_event(LevelStarted);

    // 10 секунд симуляции
    for tick in 0..600 {
        app.update();

        if tick % 60 == 0 {
            let enemies = app.world().resource::<LevelState>().enemy_count;
            log_info(&format!("Tick {}: {} enemies", tick, enemies));

            let mut agents = app
                .world_mut()
                .query::<(Entity, &Transform, &BehaviorStateMachine, &TargetAcquisition)>();
            for (entity, transform, behavior, acquisition) in agents.iter(app.world()) {
                log_info(&format!(
                    "  {:?} {:?} at ({:.1}, {:.1}) target={:?}",
                    entity,
                    behavior.state(),
                    transform.translation.x,
                    transform.translation.z,
                    acquisition.current_target()
                ));
            }
        }
    }

    log_info("Simulation complete!");
}
