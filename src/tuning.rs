//! Physics tuning
//!
//! Every constant the collision pass reads lives here so that feel changes
//! (substep count, sampling density, restitution) are data, not code.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Data-driven physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (pixels/frame²)
    pub gravity: f32,
    /// Sub-steps checked between the current and the next position
    pub check_steps: u32,
    /// Points sampled around the ball's circumference
    pub sample_count: u32,
    /// Speed of a freshly shot ball (pixels/frame)
    pub launch_power: f32,

    // === Ball shape ===
    /// Radius of a ball with no containing shells
    pub core_radius: f32,
    /// Radius added per containing shell
    pub shell_width: f32,

    // === Restitution ===
    /// Horizontal velocity kept after a bounce
    pub x_bounce_decay: f32,
    /// Vertical velocity kept after a bounce
    pub y_bounce_decay: f32,
    /// Restitution of a drifting float shell (both axes)
    pub float_bounce_decay: f32,
    /// Per-frame velocity multiplier of a drifting float shell
    pub float_decay: f32,
    /// Vertical speed under which a ball counts as grounded
    pub grounded_threshold: f32,
    /// Spin = tangential speed / (spin_divisor * radius)
    pub spin_divisor: f32,

    // === Bounds ===
    /// Distance past the playfield edge before a ball is discarded
    pub out_of_bounds_margin: f32,

    // === Bullet time ===
    /// Slowmo factor when aiming starts
    pub slowmo_max: f32,
    /// How much slowmo wears off per held frame
    pub slowmo_recovery: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            check_steps: 4,
            sample_count: 16,
            launch_power: 12.0,

            core_radius: 4.0,
            shell_width: 3.0,

            x_bounce_decay: 0.95,
            y_bounce_decay: 0.6,
            float_bounce_decay: 0.9,
            float_decay: 0.98,
            grounded_threshold: 1.0,
            spin_divisor: 1.0,

            out_of_bounds_margin: 100.0,

            slowmo_max: 8.0,
            slowmo_recovery: 0.05,
        }
    }
}

impl PhysicsTuning {
    /// Parse tuning from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded physics tuning ({} substeps, {} samples)",
            tuning.check_steps,
            tuning.sample_count
        );
        Ok(tuning)
    }

    /// Serialize tuning to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the collision pass cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let check = |name: &'static str, value: f32, ok: bool| {
            if ok {
                Ok(())
            } else {
                log::warn!("Rejected tuning: {name} = {value}");
                Err(TuningError::OutOfRange { name, value })
            }
        };

        check("check_steps", self.check_steps as f32, self.check_steps > 0)?;
        check("sample_count", self.sample_count as f32, self.sample_count > 0)?;
        check("gravity", self.gravity, self.gravity.is_finite())?;
        check("launch_power", self.launch_power, self.launch_power > 0.0)?;
        check("core_radius", self.core_radius, self.core_radius > 0.0)?;
        check("shell_width", self.shell_width, self.shell_width > 0.0)?;
        for (name, value) in [
            ("x_bounce_decay", self.x_bounce_decay),
            ("y_bounce_decay", self.y_bounce_decay),
            ("float_bounce_decay", self.float_bounce_decay),
            ("float_decay", self.float_decay),
        ] {
            check(name, value, value > 0.0 && value <= 1.0)?;
        }
        check(
            "grounded_threshold",
            self.grounded_threshold,
            self.grounded_threshold >= 0.0,
        )?;
        check("spin_divisor", self.spin_divisor, self.spin_divisor > 0.0)?;
        check(
            "out_of_bounds_margin",
            self.out_of_bounds_margin,
            self.out_of_bounds_margin >= 0.0,
        )?;
        check("slowmo_max", self.slowmo_max, self.slowmo_max >= 1.0)?;
        check(
            "slowmo_recovery",
            self.slowmo_recovery,
            self.slowmo_recovery >= 0.0,
        )?;
        Ok(())
    }

    /// Radius of a player ball holding `shells` containing shells
    pub fn radius_for(&self, shells: usize) -> f32 {
        self.core_radius + self.shell_width * shells as f32
    }

    /// Per-frame damping of a drifting float shell under slowmo.
    ///
    /// Closer to 1.0 the slower time runs, so a float covers the same
    /// distance to rest in game time.
    pub fn float_decay_at(&self, slowmo_factor: f32) -> f32 {
        1.0 - (1.0 - self.float_decay) / slowmo_factor.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PhysicsTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = PhysicsTuning::from_json(r#"{ "check_steps": 8 }"#).unwrap();
        assert_eq!(tuning.check_steps, 8);
        assert_eq!(tuning.sample_count, 16);
        assert_eq!(tuning.gravity, 0.5);
    }

    #[test]
    fn test_zero_substeps_rejected() {
        let err = PhysicsTuning::from_json(r#"{ "check_steps": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "check_steps",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_decay_rejected() {
        let tuning = PhysicsTuning {
            y_bounce_decay: 1.5,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = PhysicsTuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, TuningError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let tuning = PhysicsTuning {
            sample_count: 8,
            ..Default::default()
        };
        let json = tuning.to_json().unwrap();
        assert_eq!(PhysicsTuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_radius_for() {
        let tuning = PhysicsTuning::default();
        assert_eq!(tuning.radius_for(0), 4.0);
        assert_eq!(tuning.radius_for(2), 10.0);
    }

    #[test]
    fn test_float_decay_rises_with_slowmo() {
        let tuning = PhysicsTuning::default();
        let normal = tuning.float_decay_at(1.0);
        let slow = tuning.float_decay_at(8.0);
        assert!((normal - 0.98).abs() < 1e-6);
        assert!(slow > normal && slow < 1.0);
    }
}
