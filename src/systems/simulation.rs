//! Game simulation system
//!
//! Turns variable wall-clock frames into fixed physics ticks:
//! - Frame time accumulation with a cap
//! - Raw input → input buffer → per-tick controls
//! - World ticking

use std::time::Instant;

use log::debug;
use tilerun_core::{ControlInput, EntityKey, World};
use tilerun_input::{InputBuffer, RawInput};

/// Fixed-step accumulator
///
/// Frame time is added (capped at `max_frame_time`) and whole ticks of
/// `time_step` are taken out; the remainder carries over to the next frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedTimestep {
    time_step: f32,
    max_frame_time: f32,
    accumulator: f32,
}

impl FixedTimestep {
    /// # Panics
    /// Panics if `time_step` is not positive.
    pub fn new(time_step: f32, max_frame_time: f32) -> Self {
        assert!(time_step > 0.0, "time step must be positive, got {}", time_step);
        Self {
            time_step,
            max_frame_time,
            accumulator: 0.0,
        }
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Unconsumed time
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Add a frame's elapsed seconds and return how many ticks are due
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        // Cap to prevent spiral of death after a stall
        self.accumulator += elapsed.clamp(0.0, self.max_frame_time);
        let mut ticks = 0;
        while self.accumulator >= self.time_step {
            self.accumulator -= self.time_step;
            ticks += 1;
        }
        ticks
    }
}

/// Result of a simulation update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationResult {
    /// Fixed ticks run this frame
    pub ticks: u32,
    /// Entities whose jump fired during the frame
    pub jumped: Vec<EntityKey>,
}

/// Manages the game simulation loop
///
/// Handles:
/// - Delta time calculation
/// - Input buffering and jump edges
/// - Fixed-step world ticking
pub struct SimulationSystem {
    timestep: FixedTimestep,
    input: InputBuffer,
    /// Jump pressed on a frame that has not yet reached a tick
    pending_jump: bool,
    last_frame: Instant,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new(timestep: FixedTimestep, input: InputBuffer) -> Self {
        Self {
            timestep,
            input,
            pending_jump: false,
            last_frame: Instant::now(),
        }
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Run one frame using wall-clock time since the previous frame
    pub fn frame(&mut self, world: &mut World, raw: RawInput) -> SimulationResult {
        let now = Instant::now();
        let elapsed = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.update(world, raw, elapsed)
    }

    /// Run the ticks due after `elapsed` seconds
    ///
    /// The frame's input is pushed into the buffer once. A jump press is
    /// held until a tick runs and is delivered to that tick only, so a short
    /// frame with no tick due cannot drop it and a long frame cannot turn one
    /// press into several jumps.
    pub fn update(&mut self, world: &mut World, raw: RawInput, elapsed: f32) -> SimulationResult {
        let frame = self.input.push(raw);
        self.pending_jump |= frame.jump_pressed();
        let mut controls = ControlInput::new(frame.direction, false);

        let ticks = self.timestep.advance(elapsed);
        let mut result = SimulationResult {
            ticks,
            jumped: Vec::new(),
        };
        for _ in 0..ticks {
            controls.jump = std::mem::take(&mut self.pending_jump);
            result.jumped.extend(world.tick(&controls));
        }

        if ticks > 1 {
            debug!("Caught up {} ticks in one frame", ticks);
        }
        result
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(
            FixedTimestep::new(tilerun_core::DEFAULT_TIME_STEP, 0.25),
            InputBuffer::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerun_core::{EntityTemplate, PhysicsConfig, PhysicsTemplate, TileGrid, Vec2};
    use tilerun_input::Buttons;

    fn world_with_player() -> (World, EntityKey) {
        let mut world = World::new(TileGrid::bordered(8, 8, 16.0), PhysicsConfig::default());
        let template = EntityTemplate::new("player")
            .with_physics(PhysicsTemplate::new(1, 1))
            .with_player(true);
        let key = world.spawn_template(&template, Vec2::new(48.0, 112.0));
        (world, key)
    }

    #[test]
    fn test_fixed_timestep_carries_remainder() {
        let mut step = FixedTimestep::new(0.01, 0.25);
        assert_eq!(step.advance(0.025), 2);
        assert!((step.accumulator() - 0.005).abs() < 1e-5);
        assert_eq!(step.advance(0.006), 1);
        assert_eq!(step.advance(0.0), 0);
    }

    #[test]
    fn test_fixed_timestep_caps_frame() {
        let mut step = FixedTimestep::new(0.01, 0.05);
        let ticks = step.advance(10.0);
        assert!((4..=5).contains(&ticks), "got {}", ticks);
        assert!(step.accumulator() < 0.01);
    }

    #[test]
    fn test_fixed_timestep_ignores_negative() {
        let mut step = FixedTimestep::new(0.01, 0.25);
        assert_eq!(step.advance(-1.0), 0);
        assert_eq!(step.accumulator(), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_zero_time_step_panics() {
        let _ = FixedTimestep::new(0.0, 0.25);
    }

    #[test]
    fn test_update_runs_due_ticks() {
        let (mut world, _) = world_with_player();
        let mut sim = SimulationSystem::default();
        let result = sim.update(&mut world, RawInput::default(), 0.035);
        assert_eq!(result.ticks, 3);
        assert_eq!(world.ticks(), 3);
        assert_eq!(sim.input().len(), 1);
    }

    #[test]
    fn test_jump_edge_reaches_first_tick_only() {
        let (mut world, key) = world_with_player();
        let mut sim = SimulationSystem::default();
        sim.update(&mut world, RawInput::default(), 0.01);
        assert!(world.body(key).unwrap().is_grounded());

        let jump = RawInput::new(Vec2::ZERO, Buttons::JUMP);
        let result = sim.update(&mut world, jump, 0.05);
        assert_eq!(result.jumped, vec![key]);

        // Still held: no new edge
        let result = sim.update(&mut world, jump, 0.01);
        assert!(result.jumped.is_empty());
    }

    #[test]
    fn test_jump_pressed_on_frame_without_tick_is_kept() {
        let (mut world, key) = world_with_player();
        let mut sim = SimulationSystem::default();
        sim.update(&mut world, RawInput::default(), 0.01);
        assert!(world.body(key).unwrap().is_grounded());

        // 144 Hz frames: the press lands on a frame with no tick due
        let jump = RawInput::new(Vec2::ZERO, Buttons::JUMP);
        let result = sim.update(&mut world, jump, 0.0069);
        assert_eq!(result.ticks, 0);
        assert!(result.jumped.is_empty());

        // Held on the next frame, whose tick takes the earlier press
        let result = sim.update(&mut world, jump, 0.0069);
        assert_eq!(result.ticks, 1);
        assert_eq!(result.jumped, vec![key]);
        assert!(world.body(key).unwrap().velocity.y < 0.0);

        // Consumed once
        let result = sim.update(&mut world, jump, 0.0069);
        assert!(result.jumped.is_empty());
    }
}
