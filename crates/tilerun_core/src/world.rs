//! World container for entities
//!
//! The World owns the level's tile grid, the shared position store, all
//! entities and the physics world, and advances them one fixed tick at a time.

use log::{info, warn};
use slotmap::{new_key_type, SlotMap};

use crate::entity::{Entity, EntityTemplate};
use tilerun_input::{InputFrame, MoveDirection};
use tilerun_math::{Rect, Vec2};
use tilerun_physics::{
    BodyKey, Locomotion, LocomotionInput, PhysicsBody, PhysicsConfig, PhysicsWorld, PositionKey,
    TileGrid,
};

/// Default fixed tick length in seconds
pub const DEFAULT_TIME_STEP: f32 = 0.01;

// Define generational key type for entities
new_key_type! {
    /// Key to an entity in the world
    ///
    /// Uses generational indexing to prevent the ABA problem where a handle
    /// could point to a reused slot. If an entity is removed and its slot
    /// reused, old keys will return None instead of pointing to the wrong entity.
    pub struct EntityKey;
}

/// Player controls for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInput {
    pub direction: MoveDirection,
    /// Jump went down this tick
    pub jump: bool,
}

impl ControlInput {
    pub fn new(direction: MoveDirection, jump: bool) -> Self {
        Self { direction, jump }
    }

    /// Controls from a processed input frame
    pub fn from_frame(frame: &InputFrame) -> Self {
        Self::new(frame.direction, frame.jump_pressed())
    }
}

/// The level world containing all entities
pub struct World {
    /// All entities in the world (using generational keys)
    entities: SlotMap<EntityKey, Entity>,
    /// Top-left positions shared by entities and their bodies
    positions: SlotMap<PositionKey, Vec2>,
    physics: PhysicsWorld,
    grid: TileGrid,
    time_step: f32,
    ticks: u64,
}

impl World {
    /// Create an empty world over a tile grid
    pub fn new(grid: TileGrid, config: PhysicsConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            positions: SlotMap::with_key(),
            physics: PhysicsWorld::with_config(config),
            grid,
            time_step: DEFAULT_TIME_STEP,
            ticks: 0,
        }
    }

    /// Set the fixed tick length
    ///
    /// # Panics
    /// Panics if `time_step` is not positive.
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        assert!(time_step > 0.0, "time step must be positive, got {}", time_step);
        self.time_step = time_step;
        self
    }

    /// Keep per-tile resolution diagnostics from each tick
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.physics = self.physics.with_diagnostics(enabled);
        self
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable grid access for editors; never called during a tick
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Spawn a bare entity with its top-left corner at `position`
    pub fn spawn(&mut self, position: Vec2) -> EntityKey {
        let slot = self.positions.insert(position);
        self.entities.insert(Entity::new(slot))
    }

    /// Give an entity a physics body of `width` x `height` tiles
    ///
    /// Replaces any body it already had. Returns `None` for a stale key.
    pub fn attach_body(
        &mut self,
        key: EntityKey,
        width: u32,
        height: u32,
        mass: f32,
        gravity: bool,
    ) -> Option<BodyKey> {
        let entity = self.entities.get_mut(key)?;
        if let Some(old) = entity.physics_body.take() {
            self.physics.remove_body(old);
        }
        let body = PhysicsBody::new(entity.position, width, height)
            .with_mass(mass)
            .with_gravity(gravity);
        let body_key = self.physics.add_body(body);
        entity.physics_body = Some(body_key);
        Some(body_key)
    }

    /// Make an entity player-controlled. Returns `false` for a stale key.
    pub fn attach_locomotion(&mut self, key: EntityKey) -> bool {
        let locomotion = Locomotion::from_config(&self.physics.config);
        match self.entities.get_mut(key) {
            Some(entity) => {
                entity.locomotion = Some(locomotion);
                true
            }
            None => false,
        }
    }

    /// Instantiate a template with its feet at `feet`
    ///
    /// Entities with physics are raised by their height so they stand on the
    /// given point; entities without physics are placed at it directly.
    pub fn spawn_template(&mut self, template: &EntityTemplate, feet: Vec2) -> EntityKey {
        let tile_width = self.grid.tile_width();
        let position = match &template.physics {
            Some(physics) => Vec2::new(feet.x, feet.y - physics.height as f32 * tile_width),
            None => feet,
        };

        let key = self.spawn(position);
        if let Some(physics) = &template.physics {
            self.attach_body(key, physics.width, physics.height, physics.mass, physics.gravity);
        }
        if template.player {
            self.attach_locomotion(key);
        }
        if let Some(entity) = self.entities.get_mut(key) {
            entity.name = Some(template.name.clone());
            entity.tags.extend(template.tags.iter().cloned());
        }

        info!(
            "Spawned {:?} at ({}, {})",
            template.name, position.x, position.y
        );
        key
    }

    /// Remove an entity together with its position and body
    pub fn remove_entity(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        self.positions.remove(entity.position);
        if let Some(body) = entity.physics_body {
            self.physics.remove_body(body);
        }
        Some(entity)
    }

    /// Get a reference to an entity by key
    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key
    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Find the first entity with a given name
    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        self.entities
            .iter()
            .find(|(_, e)| e.name.as_deref() == Some(name))
    }

    /// Get the number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over keys and entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Keys of player-controlled entities
    pub fn players(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entities
            .iter()
            .filter(|(_, e)| e.is_player())
            .map(|(key, _)| key)
    }

    /// Top-left position of an entity
    pub fn position(&self, key: EntityKey) -> Option<Vec2> {
        let entity = self.entities.get(key)?;
        self.positions.get(entity.position).copied()
    }

    /// Teleport an entity. Returns `false` for a stale key.
    pub fn set_position(&mut self, key: EntityKey, position: Vec2) -> bool {
        let Some(entity) = self.entities.get(key) else {
            return false;
        };
        match self.positions.get_mut(entity.position) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    /// Physics body of an entity
    pub fn body(&self, key: EntityKey) -> Option<&PhysicsBody> {
        let body = self.entities.get(key)?.physics_body?;
        self.physics.get_body(body)
    }

    /// World-space rect of an entity's body
    pub fn body_rect(&self, key: EntityKey) -> Option<Rect> {
        let body = self.body(key)?;
        let position = self.position(key)?;
        Some(body.rect(position, self.grid.tile_width()))
    }

    /// Advance the world by one fixed tick
    ///
    /// 1. Locomotion reads last tick's contacts and the controls, and queues
    ///    forces on player bodies
    /// 2. Physics integrates and resolves every body against the grid
    /// 3. Facing follows horizontal velocity
    ///
    /// Returns the entities whose jump fired this tick.
    pub fn tick(&mut self, input: &ControlInput) -> Vec<EntityKey> {
        let dt = self.time_step;
        let config = self.physics.config.clone();
        let movement = Vec2::new(input.direction.horizontal() * config.move_force, 0.0);
        let controls = LocomotionInput::new(movement, input.jump);

        let mut jumped = Vec::new();
        for (key, entity) in self.entities.iter_mut() {
            let (Some(locomotion), Some(body_key)) =
                (entity.locomotion.as_mut(), entity.physics_body)
            else {
                continue;
            };
            let Some(body) = self.physics.get_body_mut(body_key) else {
                warn!("Entity {:?} refers to a removed body", key);
                continue;
            };
            if locomotion.update(body, controls, &config, dt) {
                jumped.push(key);
            }
        }

        self.physics.step(&mut self.positions, &self.grid, dt);

        for (_, entity) in self.entities.iter_mut() {
            if let Some(body) = entity.physics_body.and_then(|b| self.physics.get_body(b)) {
                entity.facing = entity.facing.from_velocity(body.velocity.x);
            }
        }

        self.ticks += 1;
        jumped
    }
}
