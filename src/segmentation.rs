// src/segmentation.rs
//
// HSV color segmentation for the ball detector. Produces a cleaned
// binary mask of pixels inside the configured hue/sat/val range.

use crate::types::DetectionConfig;
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar, Size},
    imgproc,
    prelude::*,
};

/// Mask plus the HSV image it was derived from, so downstream feature
/// sampling (mean saturation) does not reconvert the frame.
pub struct SegmentedFrame {
    pub mask: Mat,
    pub hsv: Mat,
}

pub struct ColorSegmenter {
    kernel: Mat,
}

impl ColorSegmenter {
    pub fn new() -> Result<Self> {
        // 5x5 keeps small distant balls alive while still killing speckle
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(5, 5),
            Point::new(-1, -1),
        )?;
        Ok(Self { kernel })
    }

    /// Threshold `frame` (BGR) against the configured HSV range, then
    /// open -> close -> blur. Always returns a mask of the input size;
    /// all-zero when nothing matches.
    pub fn segment(&self, frame: &Mat, cfg: &DetectionConfig) -> Result<SegmentedFrame> {
        let mut hsv = Mat::default();
        imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;

        let lower = Scalar::new(cfg.hue_min, cfg.sat_min, cfg.val_min, 0.0);
        let upper = Scalar::new(cfg.hue_max, 255.0, 255.0, 0.0);
        let mut mask = Mat::default();
        core::in_range(&hsv, &lower, &upper, &mut mask)?;

        // Opening removes isolated specular reflections, closing fills
        // small holes inside the ball blob.
        let border = imgproc::morphology_default_border_value()?;
        let mut opened = Mat::default();
        imgproc::morphology_ex(
            &mask,
            &mut opened,
            imgproc::MORPH_OPEN,
            &self.kernel,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            border,
        )?;
        let mut closed = Mat::default();
        imgproc::morphology_ex(
            &opened,
            &mut closed,
            imgproc::MORPH_CLOSE,
            &self.kernel,
            Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            border,
        )?;

        // Light blur softens the mask edge before contour extraction
        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            &closed,
            &mut blurred,
            Size::new(5, 5),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;

        Ok(SegmentedFrame {
            mask: blurred,
            hsv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_bgr(rows: i32, cols: i32, b: f64, g: f64, r: f64) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, core::CV_8UC3, Scalar::new(b, g, r, 0.0))
            .unwrap()
    }

    #[test]
    fn matching_color_fills_mask() {
        // Saturated yellow-orange: hue ~23 on the OpenCV scale
        let frame = solid_bgr(64, 64, 0.0, 200.0, 255.0);
        let segmenter = ColorSegmenter::new().unwrap();
        let seg = segmenter.segment(&frame, &DetectionConfig::default()).unwrap();

        assert_eq!(seg.mask.rows(), 64);
        assert_eq!(seg.mask.cols(), 64);
        assert!(core::count_non_zero(&seg.mask).unwrap() > 0);
    }

    #[test]
    fn non_matching_color_yields_empty_mask() {
        let frame = solid_bgr(64, 64, 255.0, 0.0, 0.0); // blue
        let segmenter = ColorSegmenter::new().unwrap();
        let seg = segmenter.segment(&frame, &DetectionConfig::default()).unwrap();

        assert_eq!(core::count_non_zero(&seg.mask).unwrap(), 0);
    }
}
