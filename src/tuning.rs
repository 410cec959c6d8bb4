//! Physics tuning constants
//!
//! Every number here is per frame: one physics step runs per rendered frame.
//! Loaded from JSON; missing fields fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Launch ===
    /// Gravity acceleration (units/frame², +y is down)
    pub gravity: f32,
    /// Launch velocity per unit of drag
    pub launch_strength: f32,
    /// Maximum aim drag distance (also the power meter's full scale)
    pub max_drag_power: f32,
    /// Drag distance the release vector is clamped to
    pub launch_clamp_radius: f32,
    /// Keyboard aim point movement per frame
    pub keyboard_aim_step: f32,

    // === Integrator ===
    /// Vertical restitution on a floor bounce
    pub floor_bounce: f32,
    /// Horizontal damping on a floor bounce
    pub floor_damping: f32,
    /// Both velocity components at or under this are "still"
    pub stillness_epsilon: f32,
    /// Distance above the floor contact line still counted as on the floor
    pub floor_contact_tolerance: f32,
    /// Floor rebounds slower than this are zeroed (resting contact)
    pub floor_rest_speed: f32,
    /// Force a stop after this many flight frames (None = fly until still)
    pub max_flight_frames: Option<u32>,

    // === Projectile impacts ===
    /// Velocity scale after hitting a target
    pub target_hit_damping: f32,
    /// Restitution of the reflected axis when hitting the topple support
    pub support_restitution: f32,
    /// Horizontal scale when landing on top of the support
    pub support_top_damping: f32,
    /// Vertical scale when striking the side of the support
    pub support_side_damping: f32,
    /// Restitution of the reflected axis when hitting a log
    pub log_restitution: f32,
    /// Scale of the non-reflected axis when hitting a log
    pub log_tangent_damping: f32,

    // === Topple support ===
    /// Initial angular velocity per unit of projectile x velocity (deg/frame)
    pub topple_spin: f32,
    /// Tilt applied on the triggering frame (degrees)
    pub topple_initial_tilt: f32,
    /// Angular acceleration while toppling (deg/frame²)
    pub topple_angular_accel: f32,
    /// Tilt clamp (degrees)
    pub topple_max_tilt: f32,
    /// Tilt at which the carried target dies (degrees)
    pub topple_kill_tilt: f32,

    // === Logs and targets ===
    /// Per-frame divisor for log displacement velocity
    pub log_decay: f32,
    /// Fraction of log velocity handed to a pushed target
    pub push_transfer: f32,
    /// Log velocity kept after pushing a target
    pub push_drag: f32,
    /// Per-frame divisor for target horizontal drift
    pub target_drift_decay: f32,
    /// Fraction of gravity applied to an unsupported target
    pub settle_gravity_factor: f32,

    // === Scoring / effects ===
    /// Frames the death effect stays visible
    pub death_timer_frames: u32,
    /// Points per eliminated target
    pub score_per_target: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.2,
            launch_strength: 0.5,
            max_drag_power: 70.0,
            launch_clamp_radius: 30.0,
            keyboard_aim_step: 2.0,

            floor_bounce: 0.8,
            floor_damping: 0.7,
            stillness_epsilon: 0.05,
            floor_contact_tolerance: 1.0,
            floor_rest_speed: 0.2,
            max_flight_frames: None,

            target_hit_damping: 0.1,
            support_restitution: 0.5,
            support_top_damping: 0.7,
            support_side_damping: 0.25,
            log_restitution: 0.25,
            log_tangent_damping: 0.25,

            topple_spin: 0.2,
            topple_initial_tilt: 0.1,
            topple_angular_accel: 0.3,
            topple_max_tilt: 90.0,
            topple_kill_tilt: 45.0,

            log_decay: 1.02,
            push_transfer: 0.95,
            push_drag: 0.9,
            target_drift_decay: 1.02,
            settle_gravity_factor: 1.0 / 3.0,

            death_timer_frames: 5,
            score_per_target: 100,
        }
    }
}

impl Tuning {
    /// Parse tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("parse tuning JSON: {e}"))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let data =
            fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        Self::from_json(&data)
    }

    /// Load tuning, falling back to defaults on any error (returned for logging)
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(path) {
            Ok(tuning) => (tuning, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Human-readable warnings for values that break gameplay invariants.
    ///
    /// Not hard errors: call at startup and log each with `warn!`.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.gravity <= 0.0 {
            w.push(format!("gravity {} must be positive (+y is down)", self.gravity));
        }
        if self.launch_strength <= 0.0 {
            w.push(format!("launch_strength {} must be positive", self.launch_strength));
        }
        if self.max_drag_power <= 0.0 {
            w.push(format!("max_drag_power {} must be positive", self.max_drag_power));
        }
        if self.launch_clamp_radius > self.max_drag_power {
            w.push(format!(
                "launch_clamp_radius {} exceeds max_drag_power {}; the clamp never applies",
                self.launch_clamp_radius, self.max_drag_power
            ));
        }
        for (name, value) in [
            ("floor_bounce", self.floor_bounce),
            ("floor_damping", self.floor_damping),
            ("target_hit_damping", self.target_hit_damping),
            ("support_restitution", self.support_restitution),
            ("support_top_damping", self.support_top_damping),
            ("support_side_damping", self.support_side_damping),
            ("log_restitution", self.log_restitution),
            ("log_tangent_damping", self.log_tangent_damping),
            ("push_transfer", self.push_transfer),
            ("push_drag", self.push_drag),
        ] {
            if !(0.0..1.0).contains(&value) {
                w.push(format!("{name} {value} outside [0, 1); impacts would gain energy"));
            }
        }
        if self.log_decay <= 1.0 {
            w.push(format!("log_decay {} must exceed 1.0 or logs never stop", self.log_decay));
        }
        if self.target_drift_decay <= 1.0 {
            w.push(format!(
                "target_drift_decay {} must exceed 1.0 or targets never stop",
                self.target_drift_decay
            ));
        }
        if self.stillness_epsilon <= 0.0 {
            w.push("stillness_epsilon must be positive; the projectile would never settle".into());
        }
        if self.floor_rest_speed < 0.0 {
            w.push(format!("floor_rest_speed {} must not be negative", self.floor_rest_speed));
        }
        if self.topple_kill_tilt > self.topple_max_tilt {
            w.push(format!(
                "topple_kill_tilt {} above topple_max_tilt {}; toppling can never kill",
                self.topple_kill_tilt, self.topple_max_tilt
            ));
        }
        if self.max_flight_frames == Some(0) {
            w.push("max_flight_frames 0 stops every launch immediately".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate_clean() {
        let warnings = Tuning::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.3, "max_flight_frames": 900 }"#)
            .expect("parse tuning");
        assert_eq!(tuning.gravity, 0.3);
        assert_eq!(tuning.max_flight_frames, Some(900));
        assert_eq!(tuning.launch_strength, Tuning::default().launch_strength);
        assert_eq!(tuning.death_timer_frames, 5);
    }

    #[test]
    fn test_validate_flags_energy_gain() {
        let tuning = Tuning {
            floor_bounce: 1.2,
            log_decay: 0.9,
            topple_kill_tilt: 120.0,
            ..Default::default()
        };
        let joined = tuning.validate().join(" | ");
        assert!(joined.contains("floor_bounce"), "{joined}");
        assert!(joined.contains("log_decay"), "{joined}");
        assert!(joined.contains("topple_kill_tilt"), "{joined}");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let (tuning, err) = Tuning::load_or_default("this/file/does/not/exist.json");
        assert!(err.is_some());
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let custom = Tuning {
            gravity: 0.25,
            score_per_target: 250,
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(custom.to_json().as_bytes()).unwrap();
        let loaded = Tuning::load_from_file(file.path()).expect("load tuning");
        assert_eq!(loaded, custom);
    }

    #[test]
    fn test_bad_json_reports_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ gravity: ").unwrap();
        let err = Tuning::load_from_file(file.path()).unwrap_err();
        assert!(err.contains("parse tuning JSON"), "{err}");
    }
}
