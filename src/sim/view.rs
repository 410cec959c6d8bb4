//! Read-only per-frame snapshot for presentation layers
//!
//! The renderer never touches `World` directly; it draws a `FrameView`.

use glam::Vec2;
use serde::Serialize;

use super::geometry::heading;
use super::state::{FlightState, ObstacleKind, World};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
    /// Facing angle in radians: travel direction in flight, launch direction while aiming
    pub heading: f32,
    pub state: FlightState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObstacleShape {
    Support,
    Log,
    Floor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub shape: ObstacleShape,
    pub center: Vec2,
    pub half: Vec2,
    /// Rotation in radians about `pivot` (supports only)
    pub tilt: f32,
    pub pivot: Option<Vec2>,
    /// Horizontal offset from spawn
    pub displacement: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub pos: Vec2,
    pub radius: f32,
    /// Rolling rotation in radians
    pub roll: f32,
    pub alive: bool,
    pub death_timer: u32,
    pub death_pos: Option<Vec2>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub frame: u64,
    pub projectile: ProjectileView,
    pub obstacles: Vec<ObstacleView>,
    pub targets: Vec<TargetView>,
    pub score: u32,
    /// Power meter fill in [0, 1]
    pub power: f32,
    /// Current aim point while aiming
    pub aim: Option<Vec2>,
}

impl FrameView {
    pub fn capture(world: &World) -> Self {
        let p = &world.projectile;
        let max_drag = world.tuning.max_drag_power;
        let gesture = world.launch.gesture.filter(|_| p.state == FlightState::Aiming);

        let projectile_heading = match (p.state, gesture) {
            (FlightState::Flying, _) => p.motion_heading(),
            (FlightState::Aiming, Some(g)) => {
                let pull = g.origin - g.aim_point(max_drag);
                if pull == Vec2::ZERO { 0.0 } else { heading(pull) }
            }
            _ => 0.0,
        };

        let obstacles = world
            .obstacles
            .iter()
            .map(|o| {
                let (shape, tilt, pivot) = match &o.kind {
                    ObstacleKind::ToppleSupport(t) => {
                        (ObstacleShape::Support, t.tilt_radians(), Some(t.pivot))
                    }
                    ObstacleKind::DisplaceableLog(_) => (ObstacleShape::Log, 0.0, None),
                    ObstacleKind::Floor => (ObstacleShape::Floor, 0.0, None),
                };
                ObstacleView {
                    shape,
                    center: o.bounds.center,
                    half: o.bounds.half,
                    tilt,
                    pivot,
                    displacement: o.displacement(),
                }
            })
            .collect();

        let targets = world
            .targets
            .iter()
            .map(|t| TargetView {
                pos: t.pos,
                radius: t.radius,
                roll: t.roll(),
                alive: t.alive,
                death_timer: t.death_timer,
                death_pos: t.death_pos,
            })
            .collect();

        Self {
            frame: world.frame,
            projectile: ProjectileView {
                pos: p.pos,
                radius: p.radius,
                heading: projectile_heading,
                state: p.state,
            },
            obstacles,
            targets,
            score: world.score,
            power: world.launch.normalized_power(max_drag),
            aim: gesture.map(|g| g.aim_point(max_drag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::KillCause;
    use crate::tuning::Tuning;

    #[test]
    fn test_capture_resting_world() {
        let world = World::new(Tuning::default());
        let view = FrameView::capture(&world);
        assert_eq!(view.obstacles.len(), 7);
        assert_eq!(view.obstacles[0].shape, ObstacleShape::Support);
        assert_eq!(view.obstacles[6].shape, ObstacleShape::Floor);
        assert_eq!(view.targets.len(), 6);
        assert_eq!(view.projectile.heading, 0.0);
        assert_eq!(view.power, 0.0);
        assert!(view.aim.is_none());
    }

    #[test]
    fn test_heading_while_aiming_points_at_launch() {
        let mut world = World::new(Tuning::default());
        let anchor = world.anchor;
        world.launch.begin_pointer(&mut world.projectile, anchor);
        // Pull straight back (left): launch goes right
        world.launch.track_pointer(anchor + Vec2::new(-20.0, 0.0));
        world.launch.update_aim(&mut world.projectile, world.floor_line, &world.tuning);

        let view = FrameView::capture(&world);
        assert!(view.projectile.heading.abs() < 1e-5);
        assert!((view.power - 20.0 / 70.0).abs() < 1e-5);
        assert_eq!(view.aim, Some(anchor + Vec2::new(-20.0, 0.0)));
    }

    #[test]
    fn test_dead_target_view() {
        let mut world = World::new(Tuning::default());
        world.kill_target(5, KillCause::Projectile);
        let view = FrameView::capture(&world);
        assert!(!view.targets[5].alive);
        assert_eq!(view.targets[5].death_timer, 5);
        assert_eq!(view.targets[5].death_pos, Some(world.targets[5].pos));
    }

    #[test]
    fn test_view_serializes() {
        let world = World::new(Tuning::default());
        let json = serde_json::to_string(&FrameView::capture(&world)).expect("serialize view");
        assert!(json.contains("\"score\":0"));
    }
}
