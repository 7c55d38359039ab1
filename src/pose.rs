// src/pose.rs
//
// Body-landmark input contract. Pose estimation itself lives outside
// this system; the classifier only ever sees the two values below.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Per-frame player observation supplied by the pose collaborator:
/// the player reference point (torso center, pixel space) and the
/// elbow extension angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlayerObservation {
    pub center: (f32, f32),
    pub arm_angle_deg: f32,
}

/// Frame-indexed pose observations for one video, loaded from a JSON
/// sidecar: an array with one nullable entry per frame, e.g.
///
/// ```json
/// [{"center": [312.0, 240.0], "arm_angle_deg": 152.0}, null, ...]
/// ```
pub struct PoseTrace {
    samples: Vec<Option<PlayerObservation>>,
}

impl PoseTrace {
    /// A trace with no observations; every frame reads as "no player".
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read pose trace {}", path.display()))?;
        let samples: Vec<Option<PlayerObservation>> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse pose trace {}", path.display()))?;
        Ok(Self { samples })
    }

    /// Look for `<video_stem>.pose.json` next to the video. A missing
    /// sidecar is normal (ball tracking still runs, classification stays
    /// NONE); a malformed one is an error.
    pub fn for_video(video_path: &Path) -> Result<Self> {
        let sidecar = video_path.with_extension("pose.json");
        if sidecar.exists() {
            let trace = Self::load(&sidecar)?;
            info!(
                "Loaded pose trace: {} ({} frames)",
                sidecar.display(),
                trace.samples.len()
            );
            Ok(trace)
        } else {
            info!("No pose trace next to {}", video_path.display());
            Ok(Self::empty())
        }
    }

    /// Observation for a frame index, `None` past the end of the trace
    /// or where the collaborator reported no player.
    pub fn get(&self, frame_index: usize) -> Option<PlayerObservation> {
        self.samples.get(frame_index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nullable_entries() {
        let json = r#"[{"center": [312.0, 240.0], "arm_angle_deg": 152.0}, null]"#;
        let samples: Vec<Option<PlayerObservation>> = serde_json::from_str(json).unwrap();
        let trace = PoseTrace { samples };

        let obs = trace.get(0).unwrap();
        assert_eq!(obs.center, (312.0, 240.0));
        assert_eq!(obs.arm_angle_deg, 152.0);
        assert!(trace.get(1).is_none());
    }

    #[test]
    fn out_of_range_frame_reads_as_no_player() {
        let trace = PoseTrace::empty();
        assert!(trace.get(0).is_none());
        assert!(trace.get(1000).is_none());
    }
}
