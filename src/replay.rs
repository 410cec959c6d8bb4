//! Scripted input replay
//!
//! A `ReplayScript` is a list of per-frame inputs. Running it against a fresh
//! world yields one digest per frame; identical scripts give bit-identical
//! digests.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{FlightState, FrameInput, Gesture, World, tick};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub frames: Vec<FrameInput>,
}

/// Compact per-frame state summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameDigest {
    pub frame: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: FlightState,
    pub alive: Vec<bool>,
    pub score: u32,
}

impl FrameDigest {
    pub fn capture(world: &World) -> Self {
        Self {
            frame: world.frame,
            pos: world.projectile.pos,
            vel: world.projectile.vel,
            state: world.projectile.state,
            alive: world.targets.iter().map(|t| t.alive).collect(),
            score: world.score,
        }
    }

    /// Raw float bits, for exact comparisons
    pub fn bits(&self) -> [u32; 4] {
        [
            self.pos.x.to_bits(),
            self.pos.y.to_bits(),
            self.vel.x.to_bits(),
            self.vel.y.to_bits(),
        ]
    }
}

impl ReplayScript {
    /// Press on the projectile at `anchor`, drag by `drag`, release, then idle
    pub fn shot(anchor: Vec2, drag: Vec2, idle_frames: usize) -> Self {
        let aim = anchor + drag;
        let mut frames = vec![
            FrameInput {
                pointer: Some(anchor),
                gesture: Some(Gesture::Begin),
                ..Default::default()
            },
            FrameInput {
                pointer: Some(aim),
                ..Default::default()
            },
            FrameInput {
                pointer: Some(aim),
                gesture: Some(Gesture::Release),
                ..Default::default()
            },
        ];
        frames.resize(frames.len() + idle_frames, FrameInput::default());
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("parse replay JSON: {e}"))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let data =
            fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        Self::from_json(&data)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Feed every frame to `world`, collecting a digest after each
    pub fn run(&self, world: &mut World) -> Vec<FrameDigest> {
        let mut digests = Vec::with_capacity(self.frames.len());
        for input in &self.frames {
            let events = tick(world, input);
            for event in &events {
                log::debug!("frame {}: {:?}", world.frame, event);
            }
            digests.push(FrameDigest::capture(world));
        }
        digests
    }
}
