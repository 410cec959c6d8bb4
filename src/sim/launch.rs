//! Slingshot aiming and release
//!
//! A gesture starts either from the pointer (pressed inside the resting
//! projectile) or from the keyboard (aim keys, origin at the anchor). While
//! aiming the projectile follows the aim point; release turns the drag vector
//! into a launch velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::clamp_to_radius;
use super::state::{FlightState, Projectile, World};
use super::tick::{FrameInput, Gesture, SimEvent};
use crate::tuning::Tuning;

/// What is driving the aim point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimSource {
    Pointer,
    Keyboard,
}

/// An in-progress drag
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaunchGesture {
    /// Fixed point the drag is measured from
    pub origin: Vec2,
    /// Raw pointer or keyboard aim point
    pub pointer: Vec2,
    pub source: AimSource,
}

impl LaunchGesture {
    /// Aim point limited to `max_drag` from the origin
    pub fn aim_point(&self, max_drag: f32) -> Vec2 {
        clamp_to_radius(self.origin, self.pointer, max_drag)
    }

    /// Drag length, in [0, max_drag]
    pub fn power(&self, max_drag: f32) -> f32 {
        (self.aim_point(max_drag) - self.origin).length().min(max_drag)
    }

    /// Launch velocity if released now: opposite the drag, clamped then scaled
    pub fn release_velocity(&self, tuning: &Tuning) -> Vec2 {
        let aim = self.aim_point(tuning.max_drag_power);
        let aim = clamp_to_radius(self.origin, aim, tuning.launch_clamp_radius);
        (self.origin - aim) * tuning.launch_strength
    }
}

/// Owns the aim gesture and the power meter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchController {
    pub gesture: Option<LaunchGesture>,
    /// Drag length of the current aim or shot (0 at rest)
    pub power: f32,
    /// Last pointer position reported by the host
    pub last_pointer: Option<Vec2>,
}

impl LaunchController {
    /// Power meter as a fraction of full scale
    pub fn normalized_power(&self, max_drag: f32) -> f32 {
        if max_drag > 0.0 {
            (self.power / max_drag).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Start a pointer drag if the pointer is on the resting projectile
    pub fn begin_pointer(&mut self, projectile: &mut Projectile, pointer: Vec2) -> bool {
        if projectile.state != FlightState::Resting || !projectile.contains(pointer) {
            return false;
        }
        self.gesture = Some(LaunchGesture {
            origin: projectile.pos,
            pointer,
            source: AimSource::Pointer,
        });
        projectile.state = FlightState::Aiming;
        true
    }

    /// Start a keyboard aim from the anchor
    pub fn begin_keyboard(&mut self, projectile: &mut Projectile, anchor: Vec2) -> bool {
        if projectile.state != FlightState::Resting {
            return false;
        }
        self.gesture = Some(LaunchGesture {
            origin: anchor,
            pointer: anchor,
            source: AimSource::Keyboard,
        });
        projectile.state = FlightState::Aiming;
        true
    }

    pub fn track_pointer(&mut self, pointer: Vec2) {
        self.last_pointer = Some(pointer);
        if let Some(gesture) = &mut self.gesture
            && gesture.source == AimSource::Pointer
        {
            gesture.pointer = pointer;
        }
    }

    /// Move the keyboard aim point one step.
    ///
    /// Up raises the point and draws it toward the anchor column; down lowers
    /// it and pushes it away. The point stays within the drag circle.
    pub fn step_keyboard(&mut self, up: bool, down: bool, anchor: Vec2, tuning: &Tuning) {
        let Some(gesture) = &mut self.gesture else {
            return;
        };
        if gesture.source != AimSource::Keyboard {
            return;
        }
        let step = tuning.keyboard_aim_step;
        let mut p = gesture.pointer;
        if up {
            p.y -= step;
            if p.x < anchor.x {
                p.x += step;
            } else if p.x > anchor.x {
                p.x -= step;
            }
        }
        if down {
            p.y += step;
            if p.x < anchor.x {
                p.x -= step;
            } else if p.x > anchor.x {
                p.x += step;
            }
        }
        gesture.pointer = clamp_to_radius(gesture.origin, p, tuning.max_drag_power);
    }

    /// Refresh the power meter and move the projectile to the aim point
    pub fn update_aim(&mut self, projectile: &mut Projectile, floor_line: f32, tuning: &Tuning) {
        let Some(gesture) = &self.gesture else {
            return;
        };
        self.power = gesture.power(tuning.max_drag_power);
        let mut shown = gesture.aim_point(tuning.max_drag_power);
        shown.y = shown.y.min(floor_line - projectile.radius);
        projectile.prev_pos = projectile.pos;
        projectile.pos = shown;
        projectile.vel = Vec2::ZERO;
    }

    /// Launch from the gesture origin. Returns the launch velocity.
    pub fn release(&mut self, projectile: &mut Projectile, tuning: &Tuning) -> Option<Vec2> {
        if projectile.state != FlightState::Aiming {
            return None;
        }
        let gesture = self.gesture.take()?;
        let velocity = gesture.release_velocity(tuning);
        // The meter keeps showing this shot until the projectile stops
        self.power = gesture.power(tuning.max_drag_power);
        projectile.pos = gesture.origin;
        projectile.prev_pos = gesture.origin;
        projectile.vel = velocity;
        projectile.state = FlightState::Flying;
        projectile.flight_frames = 0;
        log::info!("Launched from {:?} with velocity {:?}", gesture.origin, velocity);
        Some(velocity)
    }

    /// Abort an aim or a flight
    pub fn cancel(&mut self, projectile: &mut Projectile, anchor: Vec2) -> bool {
        if projectile.state == FlightState::Resting {
            return false;
        }
        self.settle(projectile, anchor);
        true
    }

    /// Return everything to rest at the anchor
    pub fn settle(&mut self, projectile: &mut Projectile, anchor: Vec2) {
        self.gesture = None;
        self.power = 0.0;
        projectile.park(anchor);
    }
}

/// Apply one frame of host input to the launch state
pub fn apply_input(world: &mut World, input: &FrameInput, events: &mut Vec<SimEvent>) {
    let World {
        projectile,
        launch,
        anchor,
        floor_line,
        tuning,
        ..
    } = world;

    if let Some(pointer) = input.pointer {
        launch.track_pointer(pointer);
    }

    match input.gesture {
        Some(Gesture::Begin) => {
            if let Some(pointer) = launch.last_pointer
                && launch.begin_pointer(projectile, pointer)
            {
                events.push(SimEvent::AimStarted {
                    source: AimSource::Pointer,
                });
            }
        }
        Some(Gesture::Release) => {
            if let Some(velocity) = launch.release(projectile, tuning) {
                events.push(SimEvent::Launched { velocity });
            }
        }
        Some(Gesture::Cancel) => {
            if launch.cancel(projectile, *anchor) {
                log::debug!("Launch cancelled");
                events.push(SimEvent::Cancelled);
            }
        }
        None => {}
    }

    if input.fire
        && let Some(velocity) = launch.release(projectile, tuning)
    {
        events.push(SimEvent::Launched { velocity });
    }

    if input.aim_up || input.aim_down {
        if launch.begin_keyboard(projectile, *anchor) {
            events.push(SimEvent::AimStarted {
                source: AimSource::Keyboard,
            });
        }
        if projectile.state == FlightState::Aiming {
            launch.step_keyboard(input.aim_up, input.aim_down, *anchor, tuning);
        }
    }

    if projectile.state == FlightState::Aiming {
        launch.update_aim(projectile, *floor_line, tuning);
    }
}
