// src/report.rs
//
// End-of-video summary: detection rate, speed aggregates, action counts.

use crate::types::ActionCounts;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct VideoReport {
    pub video: String,
    pub total_frames: u64,
    pub frames_with_detection: u64,
    pub detection_rate: f64,
    pub max_speed_kmh: f32,
    pub mean_speed_kmh: f32,
    pub actions: ActionCounts,
    pub action_time_s: f64,
    pub processing_fps: f64,
}

impl VideoReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        video: &Path,
        total_frames: u64,
        frames_with_detection: u64,
        speeds: impl Iterator<Item = f32>,
        actions: ActionCounts,
        action_time_s: f64,
        processing_fps: f64,
    ) -> Self {
        let speeds: Vec<f32> = speeds.collect();
        let max_speed_kmh = speeds.iter().copied().fold(0.0f32, f32::max);
        let mean_speed_kmh = if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f32>() / speeds.len() as f32
        };

        Self {
            video: video.display().to_string(),
            total_frames,
            frames_with_detection,
            detection_rate: frames_with_detection as f64 / total_frames.max(1) as f64,
            max_speed_kmh,
            mean_speed_kmh,
            actions,
            action_time_s,
            processing_fps,
        }
    }

    pub fn log(&self) {
        info!("✓ Video processed: {}", self.video);
        info!("  Total frames: {}", self.total_frames);
        info!(
            "  Ball detected: {} frames ({:.1}%)",
            self.frames_with_detection,
            self.detection_rate * 100.0
        );
        info!(
            "  Ball speed: max {:.1} km/h, mean {:.1} km/h",
            self.max_speed_kmh, self.mean_speed_kmh
        );
        info!(
            "  Actions: {} shots, {} passes, {} dribbles ({} total, {:.1}s in action)",
            self.actions.shot,
            self.actions.pass,
            self.actions.dribble,
            self.actions.total(),
            self.action_time_s
        );
        info!("  Processing speed: {:.1} FPS", self.processing_fps);
    }

    /// Write the report as JSON next to the annotated video.
    pub fn save(&self, output_dir: &Path, video_path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;

        let stem = video_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        let path = output_dir.join(format!("{}_report.json", stem));

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn aggregates_speed_history() {
        let report = VideoReport::new(
            &PathBuf::from("clip.mp4"),
            100,
            60,
            [10.0, 30.0, 20.0].into_iter(),
            ActionCounts::default(),
            0.0,
            25.0,
        );
        assert_eq!(report.max_speed_kmh, 30.0);
        assert!((report.mean_speed_kmh - 20.0).abs() < 1e-6);
        assert!((report.detection_rate - 0.6).abs() < 1e-9);
    }

    #[test]
    fn empty_speed_history_reports_zero() {
        let report = VideoReport::new(
            &PathBuf::from("clip.mp4"),
            0,
            0,
            std::iter::empty(),
            ActionCounts::default(),
            0.0,
            0.0,
        );
        assert_eq!(report.max_speed_kmh, 0.0);
        assert_eq!(report.mean_speed_kmh, 0.0);
        assert_eq!(report.detection_rate, 0.0);
    }
}
