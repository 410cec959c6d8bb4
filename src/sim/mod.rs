//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per rendered frame, no wall-clock time
//! - No randomness
//! - Stable iteration order (by obstacle/target index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod integrator;
pub mod launch;
pub mod level;
pub mod score;
pub mod state;
pub mod tick;
pub mod view;

pub use collision::resolve_collisions;
pub use geometry::{Aabb, circles_overlap, clamp_to_radius, heading};
pub use integrator::{Motion, integrate};
pub use launch::{AimSource, LaunchController, LaunchGesture};
pub use level::{LevelLayout, LogSpec, SupportSpec, TargetSpec};
pub use score::aggregate_score;
pub use state::{
    FlightState, KillCause, LogLinks, Nudge, Obstacle, ObstacleKind, Projectile, Target, Topple,
    ToppleDirection, World,
};
pub use tick::{FrameInput, Gesture, SimEvent, tick};
pub use view::{FrameView, ObstacleShape, ObstacleView, ProjectileView, TargetView};
