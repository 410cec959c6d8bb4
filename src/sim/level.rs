//! Fixed level layout
//!
//! The scene is fixed for a session. `LevelLayout::classic` is the standard
//! wood-and-pigs arrangement; tests build smaller layouts directly.

use glam::Vec2;

use crate::consts::*;

/// The pivoting support and the target it carries
#[derive(Debug, Clone)]
pub struct SupportSpec {
    pub center: Vec2,
    pub half: Vec2,
    /// Target index killed once the support tilts far enough
    pub carries: Option<usize>,
}

/// A displaceable log
#[derive(Debug, Clone)]
pub struct LogSpec {
    pub center: Vec2,
    pub half: Vec2,
    /// Fraction of the projectile's x velocity imparted on a side hit
    pub nudge: f32,
    /// (obstacle index, fraction of this log's new velocity) for the log it knocks
    pub neighbour: Option<(usize, f32)>,
    /// Target index this log's leading edge pushes
    pub pushes: Option<usize>,
}

/// A target (pig)
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub center: Vec2,
    pub radius: f32,
    /// Obstacle index of the log this target sits on
    pub rests_on: Option<usize>,
    /// Obstacle whose top edge kills the target while it falls (floor otherwise)
    pub catch_line: Option<usize>,
}

/// Complete static description of a scene.
///
/// Obstacle indices: the support (if any) is 0, logs follow in order, the
/// floor is last.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub anchor: Vec2,
    pub projectile_radius: f32,
    pub floor_line: f32,
    pub support: Option<SupportSpec>,
    pub logs: Vec<LogSpec>,
    pub targets: Vec<TargetSpec>,
}

impl LevelLayout {
    /// An empty scene: just the anchor and the floor
    pub fn empty() -> Self {
        Self {
            anchor: Vec2::new(ANCHOR_X, ANCHOR_Y),
            projectile_radius: PROJECTILE_RADIUS,
            floor_line: FLOOR_LINE,
            support: None,
            logs: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// The classic scene: one toppling support, five logs, six targets
    pub fn classic() -> Self {
        let support = SupportSpec {
            center: Vec2::new(0.0, 170.0),
            half: Vec2::new(10.0, 30.0),
            carries: Some(0),
        };

        let logs = vec![
            // 1: small block holding target 3, nudges the long plank
            LogSpec {
                center: Vec2::new(280.0, 130.0),
                half: Vec2::new(35.0, 20.0),
                nudge: 0.1,
                neighbour: Some((2, 0.1)),
                pushes: Some(1),
            },
            // 2: long plank holding target 1
            LogSpec {
                center: Vec2::new(310.0, 175.0),
                half: Vec2::new(75.0, 25.0),
                nudge: 0.05,
                neighbour: Some((1, 0.5)),
                pushes: Some(2),
            },
            // 3: tall pole
            LogSpec {
                center: Vec2::new(150.0, -200.0),
                half: Vec2::new(10.0, 100.0),
                nudge: 0.0,
                neighbour: None,
                pushes: None,
            },
            // 4, 5: floating shelves
            LogSpec {
                center: Vec2::new(90.0, -110.0),
                half: Vec2::new(50.0, 10.0),
                nudge: 0.0,
                neighbour: None,
                pushes: None,
            },
            LogSpec {
                center: Vec2::new(90.0, -210.0),
                half: Vec2::new(50.0, 10.0),
                nudge: 0.0,
                neighbour: None,
                pushes: None,
            },
        ];

        let target = |x: f32, y: f32, radius: f32| TargetSpec {
            center: Vec2::new(x, y),
            radius,
            rests_on: None,
            catch_line: None,
        };

        let targets = vec![
            // 0: beside the support
            target(50.0, 182.0, 23.0),
            // 1: on the long plank, falls to the floor
            TargetSpec {
                rests_on: Some(2),
                ..target(345.0, 127.0, 28.0)
            },
            // 2: on the floor at the plank's end
            target(415.0, 180.0, 25.0),
            // 3: on the small block, dies on reaching the plank
            TargetSpec {
                rests_on: Some(1),
                catch_line: Some(2),
                ..target(280.0, 85.0, 30.0)
            },
            // 4, 5: on the shelves
            target(70.0, -140.0, 25.0),
            target(100.0, -248.0, 25.0),
        ];

        Self {
            support: Some(support),
            logs,
            targets,
            ..Self::empty()
        }
    }

    /// Obstacle index of the first log
    pub fn first_log_index(&self) -> usize {
        usize::from(self.support.is_some())
    }

    /// Obstacle index of the floor slab
    pub fn floor_index(&self) -> usize {
        self.first_log_index() + self.logs.len()
    }
}
