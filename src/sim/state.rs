//! World state and core simulation types
//!
//! Everything the frame driver mutates lives in one `World` aggregate. The
//! entity sets are fixed at construction; nothing is spawned or removed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, heading};
use super::launch::LaunchController;
use super::level::LevelLayout;
use crate::tuning::Tuning;

/// Projectile lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightState {
    /// Parked at the launch anchor
    Resting,
    /// Being dragged/aimed; follows the aim point
    Aiming,
    /// Released and integrating under gravity
    Flying,
}

/// The single player-controlled projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: FlightState,
    /// Per-episode gravity multiplier, back to 1.0 on every stop
    pub gravity_scale: f32,
    /// Position before the last integration step (for heading)
    pub prev_pos: Vec2,
    /// Frames spent flying this episode
    pub flight_frames: u32,
    /// Landed on an obstacle top this frame; consumed by the next integration step
    pub top_contact: bool,
}

impl Projectile {
    pub fn new(anchor: Vec2, radius: f32) -> Self {
        Self {
            pos: anchor,
            vel: Vec2::ZERO,
            radius,
            state: FlightState::Resting,
            gravity_scale: 1.0,
            prev_pos: anchor,
            flight_frames: 0,
            top_contact: false,
        }
    }

    /// Return to the anchor at rest
    pub fn park(&mut self, anchor: Vec2) {
        self.pos = anchor;
        self.prev_pos = anchor;
        self.vel = Vec2::ZERO;
        self.state = FlightState::Resting;
        self.gravity_scale = 1.0;
        self.flight_frames = 0;
        self.top_contact = false;
    }

    /// Whether a point lies strictly inside the projectile circle
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }

    /// Direction of travel over the last step (0 when not moving)
    pub fn motion_heading(&self) -> f32 {
        let delta = self.pos - self.prev_pos;
        if delta == Vec2::ZERO { 0.0 } else { heading(delta) }
    }
}

/// Which way a support falls (away from the side it was struck on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToppleDirection {
    #[default]
    None,
    Left,
    Right,
}

impl ToppleDirection {
    /// Sign applied to tilt increments (+ is clockwise on screen, falling right)
    pub fn sign(self) -> f32 {
        match self {
            ToppleDirection::None => 0.0,
            ToppleDirection::Left => -1.0,
            ToppleDirection::Right => 1.0,
        }
    }
}

/// Rotation state of a toppling support
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topple {
    /// Rotation pivot (bottom corner on the falling side once triggered)
    pub pivot: Vec2,
    /// Tilt in degrees, signed by direction
    pub tilt: f32,
    /// Angular speed magnitude along `direction` (deg/frame)
    pub angular_vel: f32,
    pub direction: ToppleDirection,
    /// Target killed once the tilt passes the kill threshold
    pub carries: Option<usize>,
}

impl Topple {
    pub fn new(bounds: &Aabb, carries: Option<usize>) -> Self {
        Self {
            pivot: Vec2::new(bounds.center.x, bounds.bottom()),
            tilt: 0.0,
            angular_vel: 0.0,
            direction: ToppleDirection::None,
            carries,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.direction != ToppleDirection::None
    }

    pub fn tilt_radians(&self) -> f32 {
        self.tilt.to_radians()
    }

    /// Start falling away from the struck side.
    ///
    /// `strike_x` is the projectile velocity's x component at impact.
    pub fn trigger(&mut self, bounds: &Aabb, direction: ToppleDirection, strike_x: f32, tuning: &Tuning) {
        self.direction = direction;
        let sign = direction.sign();
        self.tilt = sign * tuning.topple_initial_tilt;
        self.angular_vel = sign * strike_x * tuning.topple_spin;
        self.pivot = match direction {
            ToppleDirection::Left => Vec2::new(bounds.left(), bounds.bottom()),
            _ => Vec2::new(bounds.right(), bounds.bottom()),
        };
    }

    /// Advance one frame; returns the tilt magnitude afterwards
    pub fn advance(&mut self, tuning: &Tuning) -> f32 {
        if !self.is_triggered() {
            return 0.0;
        }
        let max = tuning.topple_max_tilt;
        if self.tilt.abs() < max {
            self.tilt += self.direction.sign() * self.angular_vel;
            self.angular_vel += tuning.topple_angular_accel;
            self.tilt = self.tilt.clamp(-max, max);
        } else {
            // Lying flat
            self.angular_vel = 0.0;
        }
        self.tilt.abs()
    }
}

/// Knock-on from one log to an adjacent one
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Nudge {
    /// Obstacle index of the adjacent log
    pub obstacle: usize,
    /// Fraction of the struck log's new velocity handed on
    pub factor: f32,
}

/// Chain-reaction wiring for a displaceable log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogLinks {
    /// Fraction of the projectile's x velocity imparted on a side hit
    pub nudge: f32,
    pub neighbour: Option<Nudge>,
    /// Target index pushed by this log's leading (right) edge
    pub pushes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObstacleKind {
    ToppleSupport(Topple),
    DisplaceableLog(LogLinks),
    Floor,
}

/// Static scenery piece. Never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub bounds: Aabb,
    /// Spawn x, for reporting displacement
    pub rest_x: f32,
    /// Horizontal displacement velocity (logs only)
    pub vel_x: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, bounds: Aabb) -> Self {
        Self {
            kind,
            rest_x: bounds.center.x,
            bounds,
            vel_x: 0.0,
        }
    }

    /// Horizontal offset from the spawn position
    pub fn displacement(&self) -> f32 {
        self.bounds.center.x - self.rest_x
    }

    pub fn topple(&self) -> Option<&Topple> {
        match &self.kind {
            ObstacleKind::ToppleSupport(t) => Some(t),
            _ => None,
        }
    }

    pub fn links(&self) -> Option<&LogLinks> {
        match &self.kind {
            ObstacleKind::DisplaceableLog(l) => Some(l),
            _ => None,
        }
    }
}

/// Why a target died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    /// Hit directly by the projectile
    Projectile,
    /// The support it stood beside toppled over
    Topple { support: usize },
    /// Fell past its catch line or the floor
    Fall,
    /// Rolled into its linked neighbour
    Collision { other: usize },
}

/// A destructible target (pig)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub pos: Vec2,
    pub radius: f32,
    /// x: drift from being pushed, y: settle velocity when unsupported
    pub vel: Vec2,
    pub alive: bool,
    /// Frames of death effect left; counted down by the renderer
    pub death_timer: u32,
    /// Center at the moment of death
    pub death_pos: Option<Vec2>,
    /// Obstacle index of the log it sits on
    pub rests_on: Option<usize>,
    /// Obstacle whose top edge kills it while falling (floor when None)
    pub catch_line: Option<usize>,
    /// Spawn x, for rolling rotation
    pub spawn_x: f32,
}

impl Target {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            vel: Vec2::ZERO,
            alive: true,
            death_timer: 0,
            death_pos: None,
            rests_on: None,
            catch_line: None,
            spawn_x: pos.x,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.radius
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    /// Rolling rotation (radians) from distance travelled
    pub fn roll(&self) -> f32 {
        (self.pos.x - self.spawn_x) / self.radius
    }
}

/// Complete simulation state (deterministic)
#[derive(Debug, Clone)]
pub struct World {
    pub projectile: Projectile,
    /// Obstacles in authoritative index order
    pub obstacles: Vec<Obstacle>,
    pub targets: Vec<Target>,
    pub launch: LaunchController,
    pub anchor: Vec2,
    pub floor_line: f32,
    pub score: u32,
    /// Frames simulated since construction/reset
    pub frame: u64,
    pub tuning: Tuning,
    layout: LevelLayout,
}

impl World {
    /// The classic scene
    pub fn new(tuning: Tuning) -> Self {
        Self::from_layout(LevelLayout::classic(), tuning)
    }

    pub fn from_layout(layout: LevelLayout, tuning: Tuning) -> Self {
        let mut obstacles = Vec::with_capacity(layout.floor_index() + 1);

        if let Some(support) = &layout.support {
            let bounds = Aabb::new(support.center, support.half);
            let topple = Topple::new(&bounds, support.carries);
            obstacles.push(Obstacle::new(ObstacleKind::ToppleSupport(topple), bounds));
        }

        for log in &layout.logs {
            let links = LogLinks {
                nudge: log.nudge,
                neighbour: log.neighbour.map(|(obstacle, factor)| Nudge { obstacle, factor }),
                pushes: log.pushes,
            };
            obstacles.push(Obstacle::new(
                ObstacleKind::DisplaceableLog(links),
                Aabb::new(log.center, log.half),
            ));
        }

        let floor_half = Vec2::new(crate::consts::FLOOR_HALF_WIDTH, crate::consts::FLOOR_HALF_DEPTH);
        obstacles.push(Obstacle::new(
            ObstacleKind::Floor,
            Aabb::new(Vec2::new(0.0, layout.floor_line + floor_half.y), floor_half),
        ));

        let targets = layout
            .targets
            .iter()
            .map(|spec| Target {
                rests_on: spec.rests_on,
                catch_line: spec.catch_line,
                ..Target::new(spec.center, spec.radius)
            })
            .collect::<Vec<_>>();

        log::info!(
            "World built: {} obstacles, {} targets, floor at {}",
            obstacles.len(),
            targets.len(),
            layout.floor_line
        );

        Self {
            projectile: Projectile::new(layout.anchor, layout.projectile_radius),
            obstacles,
            targets,
            launch: LaunchController::default(),
            anchor: layout.anchor,
            floor_line: layout.floor_line,
            score: 0,
            frame: 0,
            tuning,
            layout,
        }
    }

    /// Rebuild the initial scene, keeping the tuning
    pub fn reset(&mut self) {
        let layout = self.layout.clone();
        let tuning = self.tuning.clone();
        *self = Self::from_layout(layout, tuning);
    }

    /// Mark a target dead. Returns false if it was already dead (no-op).
    pub fn kill_target(&mut self, index: usize, cause: KillCause) -> bool {
        let timer = self.tuning.death_timer_frames;
        let Some(target) = self.targets.get_mut(index) else {
            return false;
        };
        if !target.alive {
            return false;
        }
        target.alive = false;
        target.death_pos = Some(target.pos);
        target.death_timer = timer;
        log::debug!("Target {} killed at {:?} ({:?})", index, target.pos, cause);
        true
    }

    /// Count down death effects by one frame (called by the renderer)
    pub fn decay_death_timers(&mut self) {
        for target in &mut self.targets {
            target.death_timer = target.death_timer.saturating_sub(1);
        }
    }

    /// Target sharing a log with `index`: the one pushed by the log it sits on
    pub fn linked_target(&self, index: usize) -> Option<usize> {
        let log = self.targets.get(index)?.rests_on?;
        let pushed = self.obstacles.get(log)?.links()?.pushes?;
        (pushed != index).then_some(pushed)
    }

    pub fn dead_count(&self) -> usize {
        self.targets.iter().filter(|t| !t.alive).count()
    }

    pub fn all_dead(&self) -> bool {
        self.targets.iter().all(|t| !t.alive)
    }
}
