// src/ball_tracker.rs
//
// Per-frame orchestration of the ball pipeline:
// segment -> extract -> score -> track append -> speed.

use crate::candidates;
use crate::segmentation::ColorSegmenter;
use crate::track::{smoothed_speed_kmh, BallTrack};
use crate::types::{Config, Detection};
use anyhow::Result;
use opencv::{core::Mat, prelude::*};
use std::collections::VecDeque;
use tracing::debug;

/// Nonzero speed samples kept for end-of-video statistics.
const SPEED_HISTORY_LEN: usize = 10;

/// What one frame produced. The mask is returned for debug display;
/// `speed_kmh` is the most recent estimate and persists across frames
/// with no detection.
pub struct FrameResult {
    pub detection: Option<Detection>,
    pub speed_kmh: f32,
    pub candidate_count: usize,
    pub mask: Mat,
}

pub struct BallTracker {
    segmenter: ColorSegmenter,
    track: BallTrack,
    speed_kmh: f32,
    speed_history: VecDeque<f32>,
}

impl BallTracker {
    pub fn new(track_capacity: usize) -> Result<Self> {
        Ok(Self {
            segmenter: ColorSegmenter::new()?,
            track: BallTrack::new(track_capacity),
            speed_kmh: 0.0,
            speed_history: VecDeque::with_capacity(SPEED_HISTORY_LEN),
        })
    }

    /// Process one BGR frame. The config is taken by reference on every
    /// call so between-frame tuning by the host is picked up here and
    /// nowhere else. A frame with no surviving candidate leaves the
    /// track untouched.
    pub fn update(&mut self, frame: &Mat, timestamp_s: f64, cfg: &Config) -> Result<FrameResult> {
        let segmented = self.segmenter.segment(frame, &cfg.detection)?;
        let found = candidates::extract(&segmented.mask, &segmented.hsv, &cfg.detection)?;
        let candidate_count = found.len();

        let best = candidates::select_best(found, frame.rows(), &cfg.detection);

        let detection = match best {
            Some(candidate) => {
                let detection = Detection {
                    x: candidate.center.0 as i32,
                    y: candidate.center.1 as i32,
                    radius: candidate.radius as i32,
                };

                self.track
                    .append((detection.x as f32, detection.y as f32), timestamp_s);
                self.speed_kmh = smoothed_speed_kmh(&self.track, cfg.tracking.pixels_per_meter);
                if self.speed_kmh > 0.0 {
                    self.speed_history.push_back(self.speed_kmh);
                    if self.speed_history.len() > SPEED_HISTORY_LEN {
                        self.speed_history.pop_front();
                    }
                }

                debug!(
                    "Ball at ({}, {}) r={} score={:.1} ({} candidates, {:.1} km/h)",
                    detection.x,
                    detection.y,
                    detection.radius,
                    candidate.score,
                    candidate_count,
                    self.speed_kmh
                );

                Some(detection)
            }
            None => {
                debug!("No ball this frame ({} raw candidates)", candidate_count);
                None
            }
        };

        Ok(FrameResult {
            detection,
            speed_kmh: self.speed_kmh,
            candidate_count,
            mask: segmented.mask,
        })
    }

    pub fn track(&self) -> &BallTrack {
        &self.track
    }

    pub fn speed_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.speed_history.iter().copied()
    }

    /// Clear all temporal state (between videos).
    pub fn reset(&mut self) {
        self.track.reset();
        self.speed_kmh = 0.0;
        self.speed_history.clear();
    }
}
