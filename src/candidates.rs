// src/candidates.rs
//
// Contour-based ball candidate extraction and multi-criteria scoring.
//
// A single hard filter ("most circular contour wins") is fragile when
// several color-matching blobs survive segmentation. Each candidate is
// scored on vertical position, circularity, saturation and size, and the
// best total wins the frame.

use crate::types::DetectionConfig;
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Point2f, Scalar},
    imgproc,
    prelude::*,
};
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct Candidate {
    pub center: (f32, f32),
    pub radius: f32,
    /// 4*pi*area/perimeter^2, 1.0 for a perfect circle.
    pub circularity: f64,
    /// Mean S channel value inside the enclosing circle, 0-255.
    pub mean_saturation: f64,
    pub score: f64,
}

/// Find external contours in `mask` and keep those that pass the area,
/// circularity and radius filters. Never fails on an empty mask.
pub fn extract(mask: &Mat, hsv: &Mat, cfg: &DetectionConfig) -> Result<Vec<Candidate>> {
    let mut contours: core::Vector<core::Vector<Point>> = core::Vector::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;

    let mut candidates = Vec::new();

    for contour in contours.iter() {
        let area = imgproc::contour_area(&contour, false)?;
        if area < cfg.min_area {
            continue;
        }

        let perimeter = imgproc::arc_length(&contour, true)?;
        if perimeter <= 0.0 {
            continue;
        }

        // Elongated reflections score well on color but poorly here
        let circularity = 4.0 * PI * area / (perimeter * perimeter);
        if circularity <= cfg.min_circularity {
            continue;
        }

        let mut center = Point2f::new(0.0, 0.0);
        let mut radius = 0.0f32;
        imgproc::min_enclosing_circle(&contour, &mut center, &mut radius)?;
        if radius < cfg.min_radius || radius > cfg.max_radius {
            continue;
        }

        let mean_saturation = mean_saturation_in_circle(hsv, center, radius)?;

        candidates.push(Candidate {
            center: (center.x, center.y),
            radius,
            circularity,
            mean_saturation,
            score: 0.0,
        });
    }

    Ok(candidates)
}

fn mean_saturation_in_circle(hsv: &Mat, center: Point2f, radius: f32) -> Result<f64> {
    let mut sat = Mat::default();
    core::extract_channel(hsv, &mut sat, 1)?;

    let mut region = Mat::zeros(hsv.rows(), hsv.cols(), core::CV_8UC1)?.to_mat()?;
    imgproc::circle(
        &mut region,
        Point::new(center.x as i32, center.y as i32),
        radius as i32,
        Scalar::all(255.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;

    let mean = core::mean(&sat, &region)?;
    Ok(mean[0])
}

/// Score every candidate and return the best, or `None` when the frame
/// produced no survivors. Sorting is stable, so equal scores keep their
/// extraction (encounter) order.
pub fn select_best(
    mut candidates: Vec<Candidate>,
    frame_height: i32,
    cfg: &DetectionConfig,
) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }

    for candidate in candidates.iter_mut() {
        candidate.score = score(candidate, frame_height, cfg.max_radius);
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates.into_iter().next()
}

/// Weighted additive score, each term independently bounded so no single
/// feature dominates:
///   vertical position 0-100 (balls sit on the playing surface, wall
///   reflections sit high), circularity 0-50, saturation 0-50, size 0-30.
fn score(candidate: &Candidate, frame_height: i32, max_radius: f32) -> f64 {
    let y_ratio = candidate.center.1 as f64 / frame_height as f64;
    y_ratio * 100.0
        + candidate.circularity * 50.0
        + (candidate.mean_saturation / 255.0) * 50.0
        + (candidate.radius as f64 / max_radius as f64) * 30.0
}
