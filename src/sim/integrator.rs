//! Projectile flight integration
//!
//! One semi-implicit Euler step per frame: gravity into velocity, velocity
//! into position, then the floor clamp. The projectile settles once it is
//! still on a support surface: the floor, or an obstacle top it landed on
//! during the previous frame.

use super::state::{FlightState, Projectile};
use crate::tuning::Tuning;

/// Outcome of one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Not flying; nothing integrated
    Idle,
    /// Still in flight
    Moving,
    /// Hit the floor this step and rebounded
    Bounced,
    /// Came to rest on a support surface; the caller returns it to the anchor
    Settled,
    /// Flight frame limit reached
    TimedOut,
}

/// Advance a flying projectile by one frame
pub fn integrate(projectile: &mut Projectile, floor_line: f32, tuning: &Tuning) -> Motion {
    if projectile.state != FlightState::Flying {
        return Motion::Idle;
    }

    let landed = std::mem::take(&mut projectile.top_contact);
    projectile.prev_pos = projectile.pos;
    projectile.vel.y += tuning.gravity * projectile.gravity_scale;
    projectile.pos += projectile.vel;
    projectile.flight_frames = projectile.flight_frames.saturating_add(1);

    let contact = floor_line - projectile.radius;
    let mut bounced = false;
    if projectile.pos.y >= contact {
        projectile.pos.y = contact;
        projectile.vel.y *= -tuning.floor_bounce;
        projectile.vel.x *= tuning.floor_damping;
        if projectile.vel.y.abs() < tuning.floor_rest_speed {
            projectile.vel.y = 0.0;
        }
        bounced = true;
    }

    let eps = tuning.stillness_epsilon;
    let still = projectile.vel.x.abs() <= eps && projectile.vel.y.abs() <= eps;
    let on_floor = projectile.pos.y >= contact - tuning.floor_contact_tolerance;
    if still && (on_floor || landed) {
        return Motion::Settled;
    }

    if let Some(limit) = tuning.max_flight_frames
        && projectile.flight_frames >= limit
    {
        log::warn!("Flight stopped after {} frames at {:?}", limit, projectile.pos);
        return Motion::TimedOut;
    }

    if bounced { Motion::Bounced } else { Motion::Moving }
}
