//! Entity and template types
//!
//! An Entity is anything placed in a level. Its position lives in the world's
//! shared position store; an entity with physics also owns a body key, and a
//! player-controlled entity carries a [`Locomotion`] state machine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tilerun_physics::{BodyKey, Locomotion, PositionKey};

/// Horizontal facing, for sprite flipping and similar collaborators
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, 1 for right
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing for a horizontal velocity; zero keeps `self`
    pub fn from_velocity(self, velocity_x: f32) -> Self {
        if velocity_x > 0.0 {
            Facing::Right
        } else if velocity_x < 0.0 {
            Facing::Left
        } else {
            self
        }
    }
}

/// An object placed in the world
///
/// Each entity has:
/// - An optional name (for lookup by name)
/// - Tags (for categorization and filtering)
/// - A key into the shared position store
/// - An optional physics body key (links to PhysicsWorld)
/// - Optional player locomotion
#[derive(Clone, Debug)]
pub struct Entity {
    /// Optional name for this entity (for lookup)
    pub name: Option<String>,
    /// Tags for categorization (e.g., "player", "prop")
    pub tags: HashSet<String>,
    /// Key of this entity's top-left position in the world's position store
    pub position: PositionKey,
    /// Optional physics body key (links to PhysicsWorld)
    pub physics_body: Option<BodyKey>,
    /// Jump and coyote-time state for player-controlled entities
    pub locomotion: Option<Locomotion>,
    pub facing: Facing,
}

impl Entity {
    /// Create a new entity at a position slot
    pub fn new(position: PositionKey) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            position,
            physics_body: None,
            locomotion: None,
            facing: Facing::default(),
        }
    }

    /// Set the name of this entity (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Check if this entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Attach a physics body to this entity
    pub fn with_physics_body(mut self, key: BodyKey) -> Self {
        self.physics_body = Some(key);
        self
    }

    /// Make this entity player-controlled
    pub fn with_locomotion(mut self, locomotion: Locomotion) -> Self {
        self.locomotion = Some(locomotion);
        self
    }

    /// Whether input drives this entity
    pub fn is_player(&self) -> bool {
        self.locomotion.is_some()
    }
}

fn default_mass() -> f32 {
    1.0
}

fn default_gravity() -> bool {
    true
}

/// Serializable physics block of an [`EntityTemplate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsTemplate {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Whether gravity applies
    #[serde(default = "default_gravity")]
    pub gravity: bool,
}

impl PhysicsTemplate {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mass: default_mass(),
            gravity: default_gravity(),
        }
    }
}

/// A serializable entity template
///
/// Templates are stored in an entity catalog file and instantiated at a
/// world position by [`crate::World::spawn_template`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Template name, also given to spawned entities
    pub name: String,
    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Physics body, if the entity moves and collides
    #[serde(default)]
    pub physics: Option<PhysicsTemplate>,
    /// Attach player locomotion
    #[serde(default)]
    pub player: bool,
}

impl EntityTemplate {
    /// Create a new entity template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            physics: None,
            player: false,
        }
    }

    /// Add a tag to this template
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Give this template a physics body
    pub fn with_physics(mut self, physics: PhysicsTemplate) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Mark this template as player-controlled
    pub fn with_player(mut self, player: bool) -> Self {
        self.player = player;
        self
    }
}
