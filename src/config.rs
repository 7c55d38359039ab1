// src/config.rs

use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file falls back to defaults.
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Reject inconsistent values before any frame touches them.
    ///
    /// Per-frame code assumes a pre-validated config; hosts that mutate
    /// fields between frames must call this again before the next frame.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;

        if !(0.0..=179.0).contains(&d.hue_min) || !(0.0..=179.0).contains(&d.hue_max) {
            bail!("hue bounds must be within 0-179 (OpenCV scale)");
        }
        if d.hue_min > d.hue_max {
            bail!("hue_min ({}) > hue_max ({})", d.hue_min, d.hue_max);
        }
        if !(0.0..=255.0).contains(&d.sat_min) || !(0.0..=255.0).contains(&d.val_min) {
            bail!("sat_min/val_min must be within 0-255");
        }
        if d.min_circularity <= 0.0 || d.min_circularity > 1.0 {
            bail!("min_circularity must be in (0, 1], got {}", d.min_circularity);
        }
        if d.min_area <= 0.0 {
            bail!("min_area must be positive, got {}", d.min_area);
        }
        if d.min_radius <= 0.0 || d.max_radius <= d.min_radius {
            bail!(
                "radius range invalid: min={} max={}",
                d.min_radius,
                d.max_radius
            );
        }

        let t = &self.tracking;
        if t.max_positions < 2 {
            bail!("max_positions must be at least 2, got {}", t.max_positions);
        }
        if t.pixels_per_meter <= 0.0 {
            bail!("pixels_per_meter must be positive, got {}", t.pixels_per_meter);
        }

        let a = &self.action;
        if a.pass_min_speed <= 0.0 || a.shoot_min_speed <= a.pass_min_speed {
            bail!(
                "speed bands invalid: pass_min={} shoot_min={}",
                a.pass_min_speed,
                a.shoot_min_speed
            );
        }
        if !(0.0..=180.0).contains(&a.arm_extended_min_deg) {
            bail!("arm_extended_min_deg must be within 0-180");
        }
        if !(0.0..=1.0).contains(&a.min_confidence) {
            bail!("min_confidence must be within 0-1, got {}", a.min_confidence);
        }
        if a.dribble_max_distance <= 0.0 {
            bail!("dribble_max_distance must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Config;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_hue_range() {
        let mut config = Config::default();
        config.detection.hue_min = 40.0;
        config.detection.hue_max = 20.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_radius_range() {
        let mut config = Config::default();
        config.detection.min_radius = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_speed_bands() {
        let mut config = Config::default();
        config.action.shoot_min_speed = 10.0; // below pass_min_speed
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tiny_track_capacity() {
        let mut config = Config::default();
        config.tracking.max_positions = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = "detection:\n  hue_min: 5.0\n  hue_max: 25.0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detection.hue_min, 5.0);
        assert_eq!(config.tracking.max_positions, 30);
        assert!(config.validate().is_ok());
    }
}
