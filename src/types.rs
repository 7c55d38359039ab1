use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub action: ActionConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

/// HSV color gate plus shape filters for the ball detector.
/// Hue uses the OpenCV 0-179 scale; saturation and value are 0-255
/// with the upper bounds fixed at 255.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub hue_min: f64,
    pub hue_max: f64,
    pub sat_min: f64,
    pub val_min: f64,
    pub min_circularity: f64,
    pub min_area: f64,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            hue_min: 20.0,
            hue_max: 35.0,
            sat_min: 80.0,
            val_min: 100.0,
            min_circularity: 0.7,
            min_area: 50.0,
            min_radius: 5.0,
            max_radius: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Ring capacity of the position history.
    pub max_positions: usize,
    /// Linear pixel-to-meter calibration for speed conversion.
    pub pixels_per_meter: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_positions: 30,
            pixels_per_meter: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Ball-to-player distance ceiling for the dribble rule (pixels).
    pub dribble_max_distance: f32,
    /// Lower bound of the pass speed band, km/h.
    pub pass_min_speed: f32,
    /// Above this speed a shot becomes possible, km/h.
    pub shoot_min_speed: f32,
    /// Elbow angle above which the arm counts as extended, degrees.
    pub arm_extended_min_deg: f32,
    /// Results below this confidence are reported as NONE.
    pub min_confidence: f32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            dribble_max_distance: 150.0,
            pass_min_speed: 20.0,
            shoot_min_speed: 50.0,
            arm_extended_min_deg: 140.0,
            min_confidence: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub save_annotated: bool,
    pub save_report: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "videos".to_string(),
            output_dir: "output".to_string(),
            save_annotated: true,
            save_report: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Single per-frame ball detection, pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl Detection {
    pub fn center(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionLabel {
    None,
    Shot,
    Pass,
    Dribble,
}

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLabel::None => "NONE",
            ActionLabel::Shot => "SHOT",
            ActionLabel::Pass => "PASS",
            ActionLabel::Dribble => "DRIBBLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionState {
    pub label: ActionLabel,
    pub confidence: f32,
}

impl ActionState {
    pub fn none() -> Self {
        Self {
            label: ActionLabel::None,
            confidence: 0.0,
        }
    }
}

/// How many times each gated action started, for reporting.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ActionCounts {
    pub shot: usize,
    pub pass: usize,
    pub dribble: usize,
}

impl ActionCounts {
    pub fn total(&self) -> usize {
        self.shot + self.pass + self.dribble
    }
}
