//! Collision resolution and chain reactions
//!
//! Runs once per frame after integration, in a fixed order:
//! 1. projectile vs targets
//! 2. projectile vs the topple support (first contact only)
//! 3. projectile vs logs (first hit wins)
//! 4. topple advance
//! 5. target drift
//! 6. log displacement, each log pushing its target
//! 7. fall and kill checks for targets sitting on logs
//!
//! Dead targets are frozen and take no further part.

use glam::Vec2;

use super::geometry::{Aabb, circles_overlap};
use super::state::{FlightState, KillCause, ObstacleKind, ToppleDirection, World};
use super::tick::SimEvent;

/// Resolve all contacts for the current frame
pub fn resolve_collisions(world: &mut World, events: &mut Vec<SimEvent>) {
    if world.projectile.state == FlightState::Flying {
        projectile_vs_targets(world, events);
        projectile_vs_support(world, events);
        projectile_vs_logs(world, events);
    }
    advance_supports(world, events);
    drift_targets(world);
    displace_logs(world);
    settle_targets(world, events);
}

fn kill(world: &mut World, index: usize, cause: KillCause, events: &mut Vec<SimEvent>) {
    if world.kill_target(index, cause) {
        events.push(SimEvent::TargetKilled {
            target: index,
            cause,
        });
    }
}

/// Whether a circle center at `pos` is landing on top of `bounds`
fn is_top_hit(pos: Vec2, r: f32, bounds: &Aabb) -> bool {
    pos.y < bounds.top() && pos.x > bounds.left() - r * 0.5 && pos.x < bounds.right() + r * 0.5
}

fn projectile_vs_targets(world: &mut World, events: &mut Vec<SimEvent>) {
    for i in 0..world.targets.len() {
        let target = &world.targets[i];
        if !target.alive {
            continue;
        }
        let p = &world.projectile;
        if circles_overlap(p.pos, p.radius, target.pos, target.radius) {
            kill(world, i, KillCause::Projectile, events);
            world.projectile.vel *= world.tuning.target_hit_damping;
        }
    }
}

fn projectile_vs_support(world: &mut World, events: &mut Vec<SimEvent>) {
    let World {
        projectile,
        obstacles,
        tuning,
        ..
    } = world;
    let r = projectile.radius;

    for (idx, obstacle) in obstacles.iter_mut().enumerate() {
        let bounds = obstacle.bounds;
        let ObstacleKind::ToppleSupport(topple) = &mut obstacle.kind else {
            continue;
        };
        if topple.is_triggered() || !bounds.contact_zone(r).contains(projectile.pos) {
            continue;
        }

        // Anything not clear of the right edge knocks it over to the right
        let direction = if projectile.pos.x <= bounds.right() {
            ToppleDirection::Right
        } else {
            ToppleDirection::Left
        };
        topple.trigger(&bounds, direction, projectile.vel.x, tuning);

        if is_top_hit(projectile.pos, r, &bounds) {
            projectile.vel.y *= -tuning.support_restitution;
            projectile.vel.x *= tuning.support_top_damping;
            projectile.pos.y = bounds.top() - r - 1.0;
            projectile.top_contact = true;
        } else {
            projectile.vel.x *= -tuning.support_restitution;
            projectile.vel.y *= tuning.support_side_damping;
            projectile.pos.x = if projectile.pos.x <= bounds.center.x {
                bounds.left() - r - 1.0
            } else {
                bounds.right() + r + 1.0
            };
        }

        log::debug!("Support {} toppling {:?}", idx, direction);
        events.push(SimEvent::SupportToppled { obstacle: idx });
    }
}

fn projectile_vs_logs(world: &mut World, events: &mut Vec<SimEvent>) {
    let r = world.projectile.radius;
    let pos = world.projectile.pos;

    let hit = world.obstacles.iter().enumerate().find_map(|(idx, obstacle)| {
        let links = obstacle.links()?;
        obstacle
            .bounds
            .contact_zone(r)
            .contains(pos)
            .then(|| (idx, obstacle.bounds, links.clone()))
    });
    let Some((idx, bounds, links)) = hit else {
        return;
    };

    let tuning = &world.tuning;
    let projectile = &mut world.projectile;
    if is_top_hit(pos, r, &bounds) {
        projectile.vel.y *= -tuning.log_restitution;
        projectile.vel.x *= tuning.log_tangent_damping;
        projectile.pos.y = bounds.top() - r - 1.0;
        projectile.top_contact = true;
        return;
    }

    if links.nudge != 0.0 {
        let kick = projectile.vel.x * links.nudge;
        world.obstacles[idx].vel_x = kick;
        if let Some(neighbour) = links.neighbour
            && let Some(other) = world.obstacles.get_mut(neighbour.obstacle)
        {
            other.vel_x = kick * neighbour.factor;
        }
        log::debug!("Log {} displaced with velocity {}", idx, kick);
        events.push(SimEvent::LogDisplaced { obstacle: idx });
    }

    projectile.vel.x *= -tuning.log_restitution;
    projectile.vel.y *= tuning.log_tangent_damping;
    projectile.pos.x = if pos.x < bounds.center.x {
        bounds.left() - r - 1.0
    } else {
        bounds.right() + r + 1.0
    };
}

fn advance_supports(world: &mut World, events: &mut Vec<SimEvent>) {
    let kill_tilt = world.tuning.topple_kill_tilt;
    let mut crushed = Vec::new();

    for (idx, obstacle) in world.obstacles.iter_mut().enumerate() {
        let ObstacleKind::ToppleSupport(topple) = &mut obstacle.kind else {
            continue;
        };
        if topple.advance(&world.tuning) >= kill_tilt
            && let Some(target) = topple.carries
        {
            crushed.push((target, idx));
        }
    }

    for (target, support) in crushed {
        kill(world, target, KillCause::Topple { support }, events);
    }
}

fn drift_targets(world: &mut World) {
    let decay = world.tuning.target_drift_decay;
    for target in world.targets.iter_mut().filter(|t| t.alive) {
        target.pos += target.vel;
        target.vel.x /= decay;
    }
}

fn displace_logs(world: &mut World) {
    let World {
        obstacles,
        targets,
        tuning,
        ..
    } = world;

    for obstacle in obstacles.iter_mut() {
        let Some(pushes) = obstacle.links().map(|l| l.pushes) else {
            continue;
        };
        obstacle.bounds.center.x += obstacle.vel_x;
        obstacle.vel_x /= tuning.log_decay;

        let Some(target) = pushes.and_then(|i| targets.get_mut(i)) else {
            continue;
        };
        if target.alive && obstacle.bounds.right() > target.left() {
            target.vel.x = obstacle.vel_x * tuning.push_transfer;
            obstacle.vel_x *= tuning.push_drag;
            target.pos.x = obstacle.bounds.right() + target.radius;
            log::trace!("Log pushed target to x={:.2}", target.pos.x);
        }
    }
}

fn settle_targets(world: &mut World, events: &mut Vec<SimEvent>) {
    let fall = world.tuning.gravity * world.projectile.gravity_scale * world.tuning.settle_gravity_factor;

    for i in 0..world.targets.len() {
        let target = &world.targets[i];
        if !target.alive {
            continue;
        }
        let Some(base) = target.rests_on.and_then(|j| world.obstacles.get(j)) else {
            continue;
        };

        if !base.bounds.spans_x(target.pos.x, target.radius) {
            world.targets[i].vel.y += fall;
        }

        if let Some(other) = world.linked_target(i) {
            let a = &world.targets[i];
            if let Some(b) = world.targets.get(other)
                && b.alive
                && circles_overlap(a.pos, a.radius, b.pos, b.radius)
            {
                kill(world, i, KillCause::Collision { other }, events);
                kill(world, other, KillCause::Collision { other: i }, events);
                continue;
            }
        }

        let target = &world.targets[i];
        let catch_line = target
            .catch_line
            .and_then(|j| world.obstacles.get(j))
            .map_or(world.floor_line, |o| o.bounds.top());
        if target.bottom() > catch_line || target.bottom() > world.floor_line {
            kill(world, i, KillCause::Fall, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelLayout, LogSpec, SupportSpec, TargetSpec};
    use crate::sim::state::Topple;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn fly(world: &mut World, pos: Vec2, vel: Vec2) {
        world.projectile.state = FlightState::Flying;
        world.projectile.pos = pos;
        world.projectile.vel = vel;
    }

    fn resolve(world: &mut World) -> Vec<SimEvent> {
        let mut events = Vec::new();
        resolve_collisions(world, &mut events);
        events
    }

    fn topple(world: &World) -> &Topple {
        world.obstacles[0].topple().expect("support at index 0")
    }

    #[test]
    fn test_target_hit_kills_and_damps() {
        let mut world = World::new(Tuning::default());
        let target = world.targets[2].pos;
        // Approach from the right, clear of the plank
        fly(&mut world, target + Vec2::new(30.0, 0.0), Vec2::new(-8.0, 2.0));

        let events = resolve(&mut world);
        assert!(!world.targets[2].alive);
        assert_eq!(world.targets[2].death_pos, Some(target));
        assert_eq!(world.targets[2].death_timer, 5);
        assert!((world.projectile.vel - Vec2::new(-0.8, 0.2)).length() < 1e-5);
        assert!(events.contains(&SimEvent::TargetKilled {
            target: 2,
            cause: KillCause::Projectile
        }));
    }

    #[test]
    fn test_dead_target_not_hit_again() {
        let mut world = World::new(Tuning::default());
        world.kill_target(2, KillCause::Fall);
        let target = world.targets[2].pos;
        fly(&mut world, target, Vec2::new(8.0, 2.0));
        resolve(&mut world);
        assert_eq!(world.projectile.vel, Vec2::new(8.0, 2.0));
    }

    #[test]
    fn test_support_side_hit_topples_right() {
        let mut world = World::new(Tuning::default());
        fly(&mut world, Vec2::new(-25.0, 170.0), Vec2::new(6.0, 1.0));

        let events = resolve(&mut world);
        let t = topple(&world);
        assert_eq!(t.direction, ToppleDirection::Right);
        assert_eq!(t.pivot, Vec2::new(10.0, 200.0));
        assert!(t.tilt > 0.0);
        assert!((world.projectile.vel.x - -3.0).abs() < 1e-5);
        assert!((world.projectile.vel.y - 0.25).abs() < 1e-5);
        assert_eq!(world.projectile.pos.x, -29.0);
        assert!(events.contains(&SimEvent::SupportToppled { obstacle: 0 }));
    }

    #[test]
    fn test_support_top_hit() {
        let mut world = World::new(Tuning::default());
        fly(&mut world, Vec2::new(2.0, 125.0), Vec2::new(2.0, 4.0));
        resolve(&mut world);
        assert_eq!(world.projectile.pos.y, 140.0 - 18.0 - 1.0);
        assert!((world.projectile.vel.y - -2.0).abs() < 1e-5);
        assert!((world.projectile.vel.x - 1.4).abs() < 1e-5);
        assert!(topple(&world).is_triggered());
    }

    #[test]
    fn test_support_triggers_once() {
        let mut world = World::new(Tuning::default());
        fly(&mut world, Vec2::new(-25.0, 170.0), Vec2::new(6.0, 1.0));
        resolve(&mut world);
        let pivot = topple(&world).pivot;

        // A second contact from the other side changes nothing
        fly(&mut world, Vec2::new(20.0, 130.0), Vec2::new(-6.0, 1.0));
        let events = resolve(&mut world);
        assert_eq!(topple(&world).pivot, pivot);
        assert_eq!(world.projectile.vel, Vec2::new(-6.0, 1.0));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::SupportToppled { .. })));
    }

    #[test]
    fn test_topple_kills_carried_target_once() {
        let mut world = World::new(Tuning::default());
        fly(&mut world, Vec2::new(-25.0, 170.0), Vec2::new(6.0, 1.0));

        let mut kills = 0;
        let mut events = resolve(&mut world);
        world.projectile.state = FlightState::Resting;
        for _ in 0..120 {
            events.extend(resolve(&mut world));
        }
        for e in &events {
            if let SimEvent::TargetKilled { target: 0, cause } = e {
                assert_eq!(*cause, KillCause::Topple { support: 0 });
                kills += 1;
            }
        }
        assert_eq!(kills, 1);
        assert!(!world.targets[0].alive);
        assert_eq!(topple(&world).tilt, 90.0);
    }

    #[test]
    fn test_log_side_hit_displaces_pair() {
        let mut world = World::new(Tuning::default());
        // Left face of log 1 (x 245..315, y 110..150)
        fly(&mut world, Vec2::new(230.0, 130.0), Vec2::new(10.0, 0.0));

        let mut events = Vec::new();
        projectile_vs_logs(&mut world, &mut events);
        assert!((world.obstacles[1].vel_x - 1.0).abs() < 1e-5);
        assert!((world.obstacles[2].vel_x - 0.1).abs() < 1e-5);
        assert!((world.projectile.vel.x - -2.5).abs() < 1e-5);
        assert_eq!(world.projectile.pos.x, 245.0 - 18.0 - 1.0);
        assert_eq!(events, vec![SimEvent::LogDisplaced { obstacle: 1 }]);
    }

    #[test]
    fn test_log_top_hit_bounces() {
        let mut world = World::new(Tuning::default());
        // Above the pole (x 140..160, top -300)
        fly(&mut world, Vec2::new(150.0, -305.0), Vec2::new(1.0, 8.0));
        let mut events = Vec::new();
        projectile_vs_logs(&mut world, &mut events);
        assert_eq!(world.projectile.pos.y, -300.0 - 18.0 - 1.0);
        assert!((world.projectile.vel.y - -2.0).abs() < 1e-5);
        assert!((world.projectile.vel.x - 0.25).abs() < 1e-5);
        assert!(events.is_empty());
        assert!(world.projectile.top_contact);
    }

    #[test]
    fn test_only_first_log_resolved() {
        let layout = LevelLayout {
            logs: vec![
                LogSpec {
                    center: Vec2::new(0.0, 100.0),
                    half: Vec2::new(20.0, 20.0),
                    nudge: 0.5,
                    neighbour: None,
                    pushes: None,
                },
                LogSpec {
                    center: Vec2::new(10.0, 100.0),
                    half: Vec2::new(20.0, 20.0),
                    nudge: 0.5,
                    neighbour: None,
                    pushes: None,
                },
            ],
            ..LevelLayout::empty()
        };
        let mut world = World::from_layout(layout, Tuning::default());
        fly(&mut world, Vec2::new(-25.0, 100.0), Vec2::new(4.0, 0.0));
        resolve(&mut world);
        assert!(world.obstacles[0].vel_x != 0.0);
        assert_eq!(world.obstacles[1].vel_x, 0.0);
    }

    #[test]
    fn test_log_pushes_target() {
        let mut world = World::new(Tuning::default());
        world.obstacles[2].vel_x = 10.0;
        resolve(&mut world);
        // Plank right edge moves from 385 to 395, past target 2's left edge (390)
        let plank = &world.obstacles[2];
        let target = &world.targets[2];
        assert!(target.vel.x > 0.0);
        assert_eq!(target.pos.x, plank.bounds.right() + target.radius);
    }

    #[test]
    fn test_log_velocity_decays() {
        let mut world = World::new(Tuning::default());
        world.obstacles[4].vel_x = 1.02;
        resolve(&mut world);
        assert!((world.obstacles[4].displacement() - 1.02).abs() < 1e-5);
        assert!((world.obstacles[4].vel_x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_target_falls_off_log_and_dies_on_floor() {
        let mut world = World::new(Tuning::default());
        // Slide target 1 beyond the plank's right end (385)
        world.targets[1].pos.x = 420.0;
        // Keep target 2 out of the way
        world.kill_target(2, KillCause::Fall);

        let mut died = false;
        for _ in 0..200 {
            let events = resolve(&mut world);
            if events.contains(&SimEvent::TargetKilled {
                target: 1,
                cause: KillCause::Fall,
            }) {
                died = true;
                break;
            }
        }
        assert!(died);
        assert!(world.targets[1].death_pos.is_some_and(|p| p.y + 28.0 > 200.0));
    }

    #[test]
    fn test_target_falls_to_catch_line() {
        let mut world = World::new(Tuning::default());
        // Slide target 3 clear of log 1's left edge (245); it drops toward the plank
        world.targets[3].pos.x = 200.0;

        let mut died = false;
        for _ in 0..200 {
            let events = resolve(&mut world);
            if events.contains(&SimEvent::TargetKilled {
                target: 3,
                cause: KillCause::Fall,
            }) {
                died = true;
                break;
            }
        }
        assert!(died);
        let death = world.targets[3].death_pos.expect("death recorded");
        // Caught by the plank top (150), well above the floor
        assert!(death.y + 30.0 > 150.0, "{death:?}");
        assert!(death.y + 30.0 < 200.0, "{death:?}");
    }

    #[test]
    fn test_mutual_kill() {
        let mut world = World::new(Tuning::default());
        // Target 1 drifts into target 2
        world.targets[1].pos = Vec2::new(380.0, 160.0);
        let events = resolve(&mut world);
        assert!(!world.targets[1].alive);
        assert!(!world.targets[2].alive);
        assert!(events.contains(&SimEvent::TargetKilled {
            target: 1,
            cause: KillCause::Collision { other: 2 },
        }));
    }

    #[test]
    fn test_mutual_kill_needs_both_alive() {
        let mut world = World::new(Tuning::default());
        world.kill_target(2, KillCause::Projectile);
        world.targets[1].pos = Vec2::new(380.0, 127.0);
        resolve(&mut world);
        assert!(world.targets[1].alive);
    }

    proptest! {
        #[test]
        fn prop_projectile_impacts_lose_speed(
            x in -40.0f32..440.0,
            y in 60.0f32..182.0,
            vx in -12.0f32..12.0,
            vy in -12.0f32..12.0,
        ) {
            prop_assume!(vx.abs() > 0.01 || vy.abs() > 0.01);
            let mut world = World::new(Tuning::default());
            fly(&mut world, Vec2::new(x, y), Vec2::new(vx, vy));
            let mut events = Vec::new();
            let mut speed = world.projectile.vel.length();

            projectile_vs_targets(&mut world, &mut events);
            let after = world.projectile.vel.length();
            prop_assert!(after <= speed);
            speed = after;

            projectile_vs_support(&mut world, &mut events);
            let after = world.projectile.vel.length();
            prop_assert!(after <= speed);
            speed = after;

            let before = world.projectile.vel;
            projectile_vs_logs(&mut world, &mut events);
            if world.projectile.vel != before {
                prop_assert!(world.projectile.vel.length() < speed);
            }
        }
    }

    #[test]
    fn test_empty_scene_no_contacts() {
        let layout = LevelLayout {
            support: Some(SupportSpec {
                center: Vec2::new(0.0, 170.0),
                half: Vec2::new(10.0, 30.0),
                carries: None,
            }),
            targets: vec![TargetSpec {
                center: Vec2::new(-200.0, 150.0),
                radius: 20.0,
                rests_on: None,
                catch_line: None,
            }],
            ..LevelLayout::empty()
        };
        let mut world = World::from_layout(layout, Tuning::default());
        fly(&mut world, Vec2::new(-380.0, 0.0), Vec2::new(1.0, 1.0));
        let events = resolve(&mut world);
        assert!(events.is_empty());
        assert_eq!(world.projectile.vel, Vec2::new(1.0, 1.0));
    }
}
