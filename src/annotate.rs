// src/annotate.rs
//
// Overlay rendering for the annotated output video. Pure drawing; every
// decision was already made upstream.

use crate::pose::PlayerObservation;
use crate::track::BallTrack;
use crate::types::{ActionLabel, ActionState, Detection};
use anyhow::Result;
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    imgproc,
};

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

fn action_color(label: ActionLabel) -> Scalar {
    match label {
        ActionLabel::Shot => Scalar::new(0.0, 0.0, 255.0, 0.0),
        ActionLabel::Pass => Scalar::new(0.0, 165.0, 255.0, 0.0),
        ActionLabel::Dribble => Scalar::new(0.0, 255.0, 0.0, 0.0),
        ActionLabel::None => Scalar::new(128.0, 128.0, 128.0, 0.0),
    }
}

/// Trajectory polyline, thicker for more recent segments.
pub fn draw_trajectory(frame: &mut Mat, track: &BallTrack) -> Result<()> {
    let positions: Vec<(f32, f32)> = track.positions().collect();
    let len = positions.len();

    for (i, window) in positions.windows(2).enumerate() {
        let thickness = ((len as f32 / (i + 2) as f32).sqrt() * 2.0).max(1.0) as i32;
        let pt1 = Point::new(window[0].0 as i32, window[0].1 as i32);
        let pt2 = Point::new(window[1].0 as i32, window[1].1 as i32);
        imgproc::line(
            frame,
            pt1,
            pt2,
            Scalar::new(0.0, 255.0, 255.0, 0.0),
            thickness,
            imgproc::LINE_AA,
            0,
        )?;
    }

    Ok(())
}

/// Circle around the detected ball, center dot, speed readout above it.
pub fn draw_detection(frame: &mut Mat, detection: &Detection, speed_kmh: f32) -> Result<()> {
    let center = Point::new(detection.x, detection.y);

    imgproc::circle(
        frame,
        center,
        detection.radius,
        green(),
        2,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::circle(
        frame,
        center,
        5,
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;

    imgproc::put_text(
        frame,
        &format!("{:.1} km/h", speed_kmh),
        Point::new(detection.x - 50, detection.y - detection.radius - 20),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        green(),
        2,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        frame,
        &format!("Pos: ({}, {})", detection.x, detection.y),
        Point::new(detection.x - 50, detection.y - detection.radius - 40),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        white(),
        1,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

pub fn draw_player(frame: &mut Mat, observation: &PlayerObservation) -> Result<()> {
    let center = Point::new(observation.center.0 as i32, observation.center.1 as i32);

    imgproc::circle(
        frame,
        center,
        10,
        Scalar::new(255.0, 0.0, 0.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        frame,
        "Player",
        Point::new(center.x - 30, center.y - 20),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        Scalar::new(255.0, 0.0, 0.0, 0.0),
        2,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

/// Top-left status banner: action label + confidence, tracking status.
pub fn draw_status(
    frame: &mut Mat,
    action: &ActionState,
    tracking: bool,
    candidate_count: usize,
) -> Result<()> {
    imgproc::rectangle(
        frame,
        Rect::new(5, 5, 360, 95),
        Scalar::new(40.0, 40.0, 40.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;

    let color = action_color(action.label);
    imgproc::put_text(
        frame,
        &format!("Action: {}", action.label.as_str()),
        Point::new(15, 35),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.9,
        color,
        2,
        imgproc::LINE_AA,
        false,
    )?;

    if action.label != ActionLabel::None {
        imgproc::put_text(
            frame,
            &format!("Confidence: {:.0}%", action.confidence * 100.0),
            Point::new(15, 65),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            color,
            2,
            imgproc::LINE_AA,
            false,
        )?;
    }

    let (status, status_color) = if tracking {
        ("BALL TRACKED", green())
    } else {
        ("SEARCHING...", Scalar::new(0.0, 0.0, 255.0, 0.0))
    };
    imgproc::put_text(
        frame,
        &format!("{} ({} blobs)", status, candidate_count),
        Point::new(15, 90),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        status_color,
        1,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}
