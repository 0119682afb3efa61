//! Player locomotion: drag, movement, jumping and coyote time
//!
//! [`Locomotion`] is a small state machine driven by the down-collision counter
//! from the previous tick and by elapsed time. It never moves a body directly;
//! it only queues forces (and zeroes vertical velocity when a jump fires) so
//! the integrator stays the single place where motion happens.

use log::debug;

use crate::body::PhysicsBody;
use crate::world::PhysicsConfig;
use tilerun_math::{sign, Vec2};

/// Per-tick request from the input layer
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionInput {
    /// Movement force to queue this tick
    pub movement_force: Vec2,
    /// A fresh jump press (edge, not held)
    pub jump: bool,
}

impl LocomotionInput {
    pub fn new(movement_force: Vec2, jump: bool) -> Self {
        Self {
            movement_force,
            jump,
        }
    }
}

/// Coarse locomotion state for animation and camera collaborators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    /// Standing on ground
    Grounded,
    /// Airborne with a full set of jumps: the coyote window is open
    AirborneCoyote,
    /// Airborne with some jumps left (double jump)
    AirborneExtraJumps,
    /// Airborne with no jumps left
    AirborneNoJumps,
}

/// Jump bookkeeping for a player-controlled body
#[derive(Clone, Debug, PartialEq)]
pub struct Locomotion {
    /// Jumps that can still be taken before landing again
    pub jumps_remaining: u32,
    /// Jumps restored on landing
    pub max_jumps: u32,
    /// Seconds since the last jump
    pub jump_cooldown_timer: f32,
    /// Ticks spent airborne while still holding every jump
    pub fall_timer: u32,
}

impl Locomotion {
    /// Create locomotion with a full set of jumps
    pub fn new(max_jumps: u32) -> Self {
        Self {
            jumps_remaining: max_jumps,
            max_jumps,
            jump_cooldown_timer: 0.0,
            fall_timer: 0,
        }
    }

    /// Create locomotion using `max_jumps` from the config
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.max_jumps)
    }

    /// Current coarse state given the body's last contacts
    pub fn state(&self, body: &PhysicsBody) -> LocomotionState {
        if body.is_grounded() {
            LocomotionState::Grounded
        } else if self.jumps_remaining >= self.max_jumps && self.max_jumps > 0 {
            LocomotionState::AirborneCoyote
        } else if self.jumps_remaining > 0 {
            LocomotionState::AirborneExtraJumps
        } else {
            LocomotionState::AirborneNoJumps
        }
    }

    /// Run one tick of locomotion and queue its forces on `body`
    ///
    /// Must run before the integrator for this tick, reading the counters the
    /// resolver left on the previous tick. Returns `true` when a jump fired.
    pub fn update(
        &mut self,
        body: &mut PhysicsBody,
        input: LocomotionInput,
        config: &PhysicsConfig,
        dt: f32,
    ) -> bool {
        let grounded = body.is_grounded();

        // Quadratic drag opposing motion on each axis
        let v = body.velocity;
        body.add_force(Vec2::new(
            -sign(v.x) * v.x * v.x * config.friction_horizontal,
            -sign(v.y) * v.y * v.y * config.friction_vertical,
        ));
        body.add_force(input.movement_force);

        if self.jumps_remaining < self.max_jumps {
            if self.jump_cooldown_timer >= config.jump_cooldown && grounded {
                debug!("Jumps replenished to {}", self.max_jumps);
                self.jumps_remaining = self.max_jumps;
                self.fall_timer = 0;
            } else {
                self.jump_cooldown_timer += dt;
            }
        }

        if self.jumps_remaining >= self.max_jumps && self.max_jumps > 0 {
            if grounded {
                self.fall_timer = 0;
            } else {
                self.fall_timer += 1;
                if self.fall_timer > config.coyote_frames {
                    debug!("Coyote window expired after {} ticks", self.fall_timer);
                    self.jumps_remaining -= 1;
                }
            }
        }

        if input.jump && self.jumps_remaining > 0 {
            body.velocity.y = 0.0;
            body.add_force(Vec2::new(0.0, -config.jump_force));
            self.jumps_remaining -= 1;
            self.jump_cooldown_timer = 0.0;
            self.fall_timer = 0;
            debug!("Jump fired, {} remaining", self.jumps_remaining);
            return true;
        }
        false
    }
}
