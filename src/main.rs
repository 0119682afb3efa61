//! Tilerun - headless platformer simulation
//!
//! Loads the configured level and entity catalog, spawns the player at the
//! map's spawn point and drives it with a scripted run-and-jump input,
//! logging where it ends up.

use std::error::Error;

use log::{info, warn};
use tilerun::config::AppConfig;
use tilerun::systems::{FixedTimestep, SimulationSystem};
use tilerun_core::{EntityCatalog, EntityKey, LevelMap, World};
use tilerun_input::{Buttons, InputBuffer, RawInput};
use tilerun_math::Vec2;

/// Frames of scripted input
const DEMO_FRAMES: u32 = 600;
/// Wall-clock seconds per demo frame (60 Hz display)
const FRAME_TIME: f32 = 1.0 / 60.0;

fn load_level(config: &AppConfig) -> LevelMap {
    let tile_width = config.physics.tile_width;
    LevelMap::load(&config.level.map_path, tile_width).unwrap_or_else(|e| {
        warn!(
            "Failed to load map '{}': {}. Using an empty room.",
            config.level.map_path, e
        );
        let mut map = LevelMap::bordered(10, 6, tile_width);
        map.set_spawn_cell(1, 4);
        map
    })
}

fn load_catalog(config: &AppConfig) -> EntityCatalog {
    EntityCatalog::load(&config.level.entities_path).unwrap_or_else(|e| {
        warn!(
            "Failed to load entities '{}': {}. Using an empty catalog.",
            config.level.entities_path, e
        );
        EntityCatalog::new()
    })
}

fn spawn_player(
    world: &mut World,
    map: &LevelMap,
    catalog: &EntityCatalog,
    template: &str,
) -> Result<EntityKey, Box<dyn Error>> {
    let height = catalog
        .get(template)
        .and_then(|t| t.physics.as_ref())
        .map(|p| p.height)
        .unwrap_or(1);
    let top_left = map
        .spawn_position(height)
        .ok_or("level has no spawn point")?;
    let feet = Vec2::new(
        top_left.x,
        top_left.y + height as f32 * world.grid().tile_width(),
    );
    Ok(catalog.spawn(world, template, feet)?)
}

/// Run right, pressing jump for a few frames every second
fn scripted_input(frame: u32) -> RawInput {
    let held = if frame % 60 < 3 {
        Buttons::JUMP
    } else {
        Buttons::empty()
    };
    RawInput::new(Vec2::new(1.0, 0.0), held)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    info!("Starting Tilerun");

    let map = load_level(&config);
    let catalog = load_catalog(&config);

    let mut world = World::new(map.grid().clone(), config.physics.clone())
        .with_time_step(config.simulation.time_step)
        .with_diagnostics(config.debug.collect_diagnostics);
    let player = spawn_player(&mut world, &map, &catalog, &config.level.player_template)?;

    let mut sim = SimulationSystem::new(
        FixedTimestep::new(config.simulation.time_step, config.simulation.max_frame_time),
        InputBuffer::new(config.input.history_length, config.input.deadzone),
    );

    let mut jumps = 0;
    for frame in 0..DEMO_FRAMES {
        let result = sim.update(&mut world, scripted_input(frame), FRAME_TIME);
        jumps += result.jumped.iter().filter(|k| **k == player).count();
    }

    let position = world.position(player).unwrap_or(Vec2::ZERO);
    let grounded = world.body(player).is_some_and(|b| b.is_grounded());
    info!(
        "Ran {} ticks: player at ({:.1}, {:.1}), grounded={}, jumps={}",
        world.ticks(),
        position.x,
        position.y,
        grounded,
        jumps
    );
    if config.debug.collect_diagnostics {
        info!(
            "{} tile diagnostics on the last tick",
            world.physics().diagnostics().len()
        );
    }

    Ok(())
}
