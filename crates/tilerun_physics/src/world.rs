//! Physics world and simulation

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::body::{BodyKey, PhysicsBody, PositionKey};
use crate::collision::{self, ResolveOptions, TileDiagnostic};
use crate::grid::TileGrid;
use tilerun_math::Vec2;

/// Tuning constants for the simulation
///
/// Every knob the integrator, resolver and locomotion read lives here so that
/// it can be overridden from configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World-space size of one tile
    pub tile_width: f32,
    /// Downward acceleration (y grows down, so positive falls)
    pub gravity: f32,
    /// Quadratic drag coefficient on the x axis
    pub friction_horizontal: f32,
    /// Quadratic drag coefficient on the y axis
    pub friction_vertical: f32,
    /// Upward force applied for the single tick a jump fires
    pub jump_force: f32,
    /// Seconds after a jump before jumps can replenish
    pub jump_cooldown: f32,
    /// Ticks a body may spend airborne after leaving ground and still jump
    pub coyote_frames: u32,
    /// Horizontal speeds below this snap to zero before integration
    pub velocity_clamp_epsilon: f32,
    /// Width multiplier of the ledge-corner probe
    pub fat_rect_multiplier: f32,
    /// Jumps available after landing (2 for a double jump)
    pub max_jumps: u32,
    /// Horizontal force from a full movement input
    pub move_force: f32,
    /// Largest per-axis displacement per tick, as a fraction of a tile
    pub max_step_fraction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tile_width: 16.0,
            gravity: 800.0,
            friction_horizontal: 0.05,
            friction_vertical: 0.002,
            jump_force: 30000.0,
            jump_cooldown: 0.1,
            coyote_frames: 8,
            velocity_clamp_epsilon: 1.0,
            fat_rect_multiplier: 1.05,
            max_jumps: 1,
            move_force: 5000.0,
            max_step_fraction: 0.5,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Largest speed per axis that keeps a tick's displacement within
    /// `max_step_fraction` of a tile
    pub fn max_speed(&self, tile_width: f32, dt: f32) -> f32 {
        self.max_step_fraction * tile_width / dt
    }
}

/// The physics world containing all bodies
///
/// Positions are not stored here. [`PhysicsWorld::step`] borrows the shared
/// position store and the level's tile grid for the duration of a tick.
pub struct PhysicsWorld {
    /// All bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, PhysicsBody>,
    /// Physics configuration
    pub config: PhysicsConfig,
    collect_diagnostics: bool,
    /// Tiles that influenced the last tick, per body
    diagnostics: Vec<(BodyKey, TileDiagnostic)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            config,
            collect_diagnostics: false,
            diagnostics: Vec::new(),
        }
    }

    /// Keep per-tile resolution diagnostics from each tick
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.collect_diagnostics = enabled;
        self
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: PhysicsBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<PhysicsBody> {
        self.bodies.remove(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&PhysicsBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(key)
    }

    /// Queue a force on a body. Returns `false` for a stale key.
    pub fn add_force(&mut self, key: BodyKey, force: Vec2) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.add_force(force);
                true
            }
            None => false,
        }
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Diagnostics from the last tick; empty unless enabled
    pub fn diagnostics(&self) -> &[(BodyKey, TileDiagnostic)] {
        &self.diagnostics
    }

    /// Diagnostics from the last tick for one body
    pub fn diagnostics_for(&self, key: BodyKey) -> impl Iterator<Item = &TileDiagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(move |(body, _)| *body == key)
            .map(|(_, diagnostic)| diagnostic)
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// For every body, in slot order:
    /// 1. Gravity is queued as a force if the body is affected by it
    /// 2. Queued forces are summed and turned into acceleration
    /// 3. Near-zero horizontal velocity snaps to zero
    /// 4. Velocity integrates (symplectic Euler) and is clamped per axis
    /// 5. Forces and counters are cleared
    /// 6. The swept move is resolved against the grid and committed
    ///
    /// Bodies never interact with each other, so the order is not significant.
    ///
    /// # Panics
    /// Panics if `dt` is not positive.
    pub fn step(
        &mut self,
        positions: &mut SlotMap<PositionKey, Vec2>,
        grid: &TileGrid,
        dt: f32,
    ) {
        assert!(dt > 0.0, "time step must be positive, got {}", dt);
        self.diagnostics.clear();

        let tile_width = grid.tile_width();
        let max_speed = self.config.max_speed(tile_width, dt);
        let options = ResolveOptions {
            fat_rect_multiplier: self.config.fat_rect_multiplier,
            collect_diagnostics: self.collect_diagnostics,
        };

        for (key, body) in self.bodies.iter_mut() {
            let Some(position) = positions.get_mut(body.position) else {
                warn!("Body {:?} refers to a removed position, skipping", key);
                body.clear_forces();
                body.counters.clear();
                continue;
            };

            if body.affected_by_gravity {
                body.add_force(Vec2::new(0.0, self.config.gravity * body.mass()));
            }
            let acceleration = body.net_force() / body.mass();

            if body.velocity.x.abs() < self.config.velocity_clamp_epsilon {
                body.velocity.x = 0.0;
            }
            body.velocity += acceleration * dt;

            let clamped = body
                .velocity
                .clamp_components(Vec2::splat(-max_speed), Vec2::splat(max_speed));
            if clamped != body.velocity {
                debug!(
                    "Body {:?} velocity ({}, {}) clamped to max step speed {}",
                    key, body.velocity.x, body.velocity.y, max_speed
                );
                body.velocity = clamped;
            }

            body.clear_forces();
            body.counters.clear();

            let current = body.rect(*position, tile_width);
            let resolution = collision::resolve(grid, current, body.velocity, dt, &options);

            *position = resolution.rect.origin();
            body.velocity = resolution.velocity;
            body.counters = resolution.counters;
            body.last_contact = resolution.kind;

            if self.collect_diagnostics {
                self.diagnostics
                    .extend(resolution.diagnostics.into_iter().map(|d| (key, d)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ContactKind;

    const DT: f32 = 0.01;

    struct Fixture {
        world: PhysicsWorld,
        positions: SlotMap<PositionKey, Vec2>,
        grid: TileGrid,
    }

    impl Fixture {
        fn new(config: PhysicsConfig, grid: TileGrid) -> Self {
            Self {
                world: PhysicsWorld::with_config(config),
                positions: SlotMap::with_key(),
                grid,
            }
        }

        fn spawn(&mut self, at: Vec2, body: impl FnOnce(PositionKey) -> PhysicsBody) -> BodyKey {
            let position = self.positions.insert(at);
            self.world.add_body(body(position))
        }

        fn step(&mut self) {
            self.world.step(&mut self.positions, &self.grid, DT);
        }

        fn position(&self, key: BodyKey) -> Vec2 {
            let body = self.world.get_body(key).unwrap();
            self.positions[body.position]
        }
    }

    #[test]
    fn test_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.config.gravity, 800.0);
        assert_eq!(world.config.tile_width, 16.0);
    }

    #[test]
    fn test_config_new_keeps_defaults() {
        let config = PhysicsConfig::new(80.0);
        assert_eq!(config.gravity, 80.0);
        assert_eq!(config.coyote_frames, 8);
        assert_eq!(config.fat_rect_multiplier, 1.05);
    }

    #[test]
    fn test_max_speed() {
        let config = PhysicsConfig::default();
        assert!((config.max_speed(16.0, DT) - 800.0).abs() < 0.01);
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut f = Fixture::new(PhysicsConfig::default(), TileGrid::new(4, 4, 16.0));
        let key = f.spawn(Vec2::ZERO, |p| PhysicsBody::new(p, 1, 1));
        assert_eq!(f.world.body_count(), 1);
        assert!(f.world.get_body(key).is_some());

        assert!(f.world.remove_body(key).is_some());
        assert!(f.world.get_body(key).is_none());
        assert!(!f.world.add_force(key, Vec2::X));
    }

    #[test]
    fn test_gravity_integrates_symplectic() {
        let mut f = Fixture::new(PhysicsConfig::new(100.0), TileGrid::new(16, 16, 16.0));
        let key = f.spawn(Vec2::new(64.0, 64.0), |p| PhysicsBody::new(p, 1, 1));

        f.step();
        let body = f.world.get_body(key).unwrap();
        // v = g*dt = 1.0, position advances by the new velocity
        assert!((body.velocity.y - 1.0).abs() < 0.0001);
        assert!((f.position(key).y - 64.01).abs() < 0.0001);
        assert_eq!(body.last_contact, ContactKind::None);
        assert!(body.forces().is_empty());
    }

    #[test]
    fn test_no_gravity_body_stays_put() {
        let mut f = Fixture::new(PhysicsConfig::default(), TileGrid::new(8, 8, 16.0));
        let key = f.spawn(Vec2::new(32.0, 32.0), |p| PhysicsBody::new(p, 1, 1).with_gravity(false));
        for _ in 0..10 {
            f.step();
        }
        assert_eq!(f.position(key), Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_small_horizontal_velocity_snaps_to_zero() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        let mut f = Fixture::new(config, TileGrid::new(8, 8, 16.0));
        let key = f.spawn(Vec2::new(32.0, 32.0), |p| {
            PhysicsBody::new(p, 1, 1).with_velocity(Vec2::new(0.5, 0.0))
        });
        f.step();
        assert_eq!(f.world.get_body(key).unwrap().velocity.x, 0.0);
        assert_eq!(f.position(key), Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_force_idempotence() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        let mut f = Fixture::new(config, TileGrid::new(16, 16, 16.0));
        let split = f.spawn(Vec2::new(64.0, 64.0), |p| PhysicsBody::new(p, 1, 1).with_mass(2.0));
        let single = f.spawn(Vec2::new(64.0, 128.0), |p| PhysicsBody::new(p, 1, 1).with_mass(2.0));

        for force in [
            Vec2::new(100.0, 50.0),
            Vec2::new(-25.0, 25.0),
            Vec2::new(125.0, -75.0),
            Vec2::new(200.0, 0.0),
        ] {
            f.world.add_force(split, force);
        }
        f.world.add_force(single, Vec2::new(400.0, 0.0));
        f.step();

        let a = f.world.get_body(split).unwrap().velocity;
        let b = f.world.get_body(single).unwrap().velocity;
        assert_eq!(a, b);
        assert_eq!(a, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_velocity_clamped_to_half_tile_per_tick() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        let mut f = Fixture::new(config, TileGrid::new(32, 32, 16.0));
        let key = f.spawn(Vec2::new(160.0, 160.0), |p| {
            PhysicsBody::new(p, 1, 1).with_velocity(Vec2::new(5000.0, -5000.0))
        });
        f.step();
        let v = f.world.get_body(key).unwrap().velocity;
        assert!((v.x - 800.0).abs() < 0.01);
        assert!((v.y + 800.0).abs() < 0.01);
        let p = f.position(key);
        assert!((p.x - 168.0).abs() < 0.01);
        assert!((p.y - 152.0).abs() < 0.01);
    }

    #[test]
    fn test_resting_on_floor() {
        // 4x4 grid with a solid border, body at tile (1, 1)
        let mut f = Fixture::new(PhysicsConfig::new(80.0), TileGrid::bordered(4, 4, 16.0));
        let key = f.spawn(Vec2::new(16.0, 16.0), |p| PhysicsBody::new(p, 1, 1));

        for _ in 0..200 {
            f.step();
        }
        for _ in 0..50 {
            f.step();
            let body = f.world.get_body(key).unwrap();
            assert_eq!(f.position(key), Vec2::new(16.0, 32.0));
            assert_eq!(body.velocity.y, 0.0);
            assert!(body.counters.down() > 0);
            assert_eq!(body.last_contact, ContactKind::FloorOrCeiling);
        }
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        let mut grid = TileGrid::new(8, 8, 16.0);
        for ty in 0..8 {
            grid.set_solid(4, ty, true);
        }
        let mut f = Fixture::new(config, grid);
        let key = f.spawn(Vec2::new(32.0, 32.0), |p| {
            PhysicsBody::new(p, 1, 1).with_velocity(Vec2::new(300.0, 0.0))
        });

        let mut stopped = false;
        for _ in 0..20 {
            f.step();
            let body = f.world.get_body(key).unwrap();
            assert!(f.position(key).x + 16.0 < 64.0);
            if body.counters.right() > 0 {
                assert_eq!(body.velocity.x, 0.0);
                stopped = true;
                break;
            }
        }
        assert!(stopped);
    }

    #[test]
    fn test_stale_position_is_skipped() {
        let mut f = Fixture::new(PhysicsConfig::default(), TileGrid::new(4, 4, 16.0));
        let key = f.spawn(Vec2::new(16.0, 16.0), |p| PhysicsBody::new(p, 1, 1));
        let position = f.world.get_body(key).unwrap().position;
        f.positions.remove(position);

        f.world.add_force(key, Vec2::X);
        f.step();
        let body = f.world.get_body(key).unwrap();
        assert!(body.forces().is_empty());
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_diagnostics_collected_when_enabled() {
        let mut f = Fixture::new(PhysicsConfig::new(80.0), TileGrid::bordered(4, 4, 16.0));
        f.world = PhysicsWorld::with_config(PhysicsConfig::new(80.0)).with_diagnostics(true);
        let key = f.spawn(Vec2::new(16.0, 32.0), |p| PhysicsBody::new(p, 1, 1));

        f.step();
        assert!(!f.world.diagnostics().is_empty());
        assert!(f.world.diagnostics_for(key).count() > 0);
    }

    #[test]
    fn test_diagnostics_off_by_default() {
        let mut f = Fixture::new(PhysicsConfig::new(80.0), TileGrid::bordered(4, 4, 16.0));
        f.spawn(Vec2::new(16.0, 32.0), |p| PhysicsBody::new(p, 1, 1));
        f.step();
        assert!(f.world.diagnostics().is_empty());
    }
}
