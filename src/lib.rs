//! Slingshot - projectile and collision core of a 2D launch game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (launch, integration, collisions, score)
//! - `tuning`: Data-driven physics constants
//! - `replay`: Recorded input sequences for deterministic playback
//!
//! World space uses screen orientation: +y points down, so the floor sits at
//! a larger y than the launch anchor and gravity is positive.

pub mod replay;
pub mod sim;
pub mod tuning;

pub use replay::{FrameDigest, ReplayScript};
pub use tuning::Tuning;

/// Fixed scene constants shared by the level layout and the frame driver
pub mod consts {
    /// Launch anchor (projectile rest position)
    pub const ANCHOR_X: f32 = -380.0;
    pub const ANCHOR_Y: f32 = 130.0;

    /// Projectile (cannonball) collision radius
    pub const PROJECTILE_RADIUS: f32 = 18.0;

    /// Floor line (top edge of the ground)
    pub const FLOOR_LINE: f32 = 200.0;
    /// Ground slab half extents (spans the whole visible world)
    pub const FLOOR_HALF_WIDTH: f32 = 600.0;
    pub const FLOOR_HALF_DEPTH: f32 = 50.0;
}
