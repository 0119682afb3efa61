//! Physics bodies for tile-grid simulation

use crate::collision::{CollisionCounters, ContactKind};
use slotmap::new_key_type;
use tilerun_math::{Rect, Vec2};

// Define generational key types for bodies and the positions they refer to
new_key_type! {
    /// Key to a physics body in the physics world
    ///
    /// Uses generational indexing to prevent the ABA problem where a handle
    /// could point to a reused slot. If a body is removed and its slot reused,
    /// old keys will return None instead of pointing to the wrong body.
    pub struct BodyKey;

    /// Key to an entity position in the shared position store
    ///
    /// Bodies do not own their position. The owning entity, the body and any
    /// renderer all read the same slot, so removing the entity invalidates the
    /// key for everyone at once.
    pub struct PositionKey;
}

/// A box-shaped body measured in whole tiles
///
/// Mass is positive and both dimensions are at least one tile; the
/// constructors assert this, because the resolver silently tunnels bodies that
/// break either rule.
#[derive(Clone, Debug)]
pub struct PhysicsBody {
    /// Handle to this body's top-left world position
    pub position: PositionKey,
    /// Velocity in world units per second
    pub velocity: Vec2,
    /// Whether the integrator adds gravity each tick
    pub affected_by_gravity: bool,
    /// Contacts recorded by the last resolution
    pub counters: CollisionCounters,
    /// Classification of the last resolution
    pub last_contact: ContactKind,
    width_tiles: u32,
    height_tiles: u32,
    mass: f32,
    /// Forces pushed since the last integration
    forces: Vec<Vec2>,
}

impl PhysicsBody {
    /// Create a body of `width_tiles` x `height_tiles` tiles at a position slot
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(position: PositionKey, width_tiles: u32, height_tiles: u32) -> Self {
        assert!(
            width_tiles >= 1 && height_tiles >= 1,
            "body must be at least one tile in each dimension, got {}x{}",
            width_tiles,
            height_tiles
        );
        Self {
            position,
            velocity: Vec2::ZERO,
            affected_by_gravity: true,
            counters: CollisionCounters::default(),
            last_contact: ContactKind::None,
            width_tiles,
            height_tiles,
            mass: 1.0,
            forces: Vec::new(),
        }
    }

    /// Set the mass of this body
    ///
    /// # Panics
    /// Panics if `mass` is not positive.
    pub fn with_mass(mut self, mass: f32) -> Self {
        assert!(mass > 0.0, "body mass must be positive, got {}", mass);
        self.mass = mass;
        self
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set whether this body is affected by gravity
    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Size in tiles
    pub fn tiles(&self) -> (u32, u32) {
        (self.width_tiles, self.height_tiles)
    }

    /// Size in world units
    pub fn dimensions(&self, tile_width: f32) -> Vec2 {
        Vec2::new(
            self.width_tiles as f32 * tile_width,
            self.height_tiles as f32 * tile_width,
        )
    }

    /// World-space rect for a given top-left position
    pub fn rect(&self, position: Vec2, tile_width: f32) -> Rect {
        Rect::from_origin_dimensions(position, self.dimensions(tile_width))
    }

    /// Queue a force for the next integration
    pub fn add_force(&mut self, force: Vec2) {
        self.forces.push(force);
    }

    /// Forces queued since the last integration
    pub fn forces(&self) -> &[Vec2] {
        &self.forces
    }

    /// Sum of the queued forces
    pub fn net_force(&self) -> Vec2 {
        Vec2::sum(self.forces.iter().copied())
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    /// Whether the last resolution found ground below
    pub fn is_grounded(&self) -> bool {
        self.counters.is_grounded()
    }
}
