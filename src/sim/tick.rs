//! Per-frame simulation step
//!
//! One call per rendered frame: input, flight integration, collisions, score.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::resolve_collisions;
use super::integrator::{Motion, integrate};
use super::launch::{AimSource, apply_input};
use super::score::aggregate_score;
use super::state::{KillCause, World};

/// Pointer button transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Button pressed (starts a drag if on the resting projectile)
    Begin,
    /// Button released (launches if aiming)
    Release,
    /// Abort the current aim or flight
    Cancel,
}

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    /// Pointer position in world coordinates, if it moved or is known
    pub pointer: Option<Vec2>,
    pub gesture: Option<Gesture>,
    /// Keyboard aim keys (held)
    pub aim_up: bool,
    pub aim_down: bool,
    /// Keyboard launch
    pub fire: bool,
    /// Rebuild the scene
    pub reset: bool,
}

/// Something that happened during a frame, in resolution order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    AimStarted { source: AimSource },
    Launched { velocity: Vec2 },
    Cancelled,
    /// Flight ended; the projectile is back at the anchor
    Settled,
    FloorBounce,
    SupportToppled { obstacle: usize },
    LogDisplaced { obstacle: usize },
    TargetKilled { target: usize, cause: KillCause },
    Reset,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &FrameInput) -> Vec<SimEvent> {
    let mut events = Vec::new();

    if input.reset {
        world.reset();
        log::info!("Scene reset");
        events.push(SimEvent::Reset);
        return events;
    }

    world.frame += 1;
    apply_input(world, input, &mut events);

    match integrate(&mut world.projectile, world.floor_line, &world.tuning) {
        Motion::Settled | Motion::TimedOut => {
            log::debug!(
                "Projectile stopped at {:?} after {} frames",
                world.projectile.pos,
                world.projectile.flight_frames
            );
            world.launch.settle(&mut world.projectile, world.anchor);
            events.push(SimEvent::Settled);
        }
        Motion::Bounced => events.push(SimEvent::FloorBounce),
        Motion::Moving | Motion::Idle => {}
    }

    resolve_collisions(world, &mut events);

    let score = aggregate_score(&world.targets, world.tuning.score_per_target);
    if score != world.score {
        log::info!("Score {} -> {}", world.score, score);
        world.score = score;
        if world.all_dead() {
            log::info!("All targets down at frame {}", world.frame);
        }
    }

    events
}
