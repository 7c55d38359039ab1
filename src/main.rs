// src/main.rs

mod annotate;
mod ball_tracker;
mod candidates;
mod classifier;
mod config;
mod pose;
mod report;
mod segmentation;
mod track;
mod types;
mod video_processor;

use anyhow::Result;
use ball_tracker::BallTracker;
use classifier::ActionDetector;
use opencv::videoio::VideoWriterTrait;
use pose::PoseTrace;
use report::VideoReport;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use types::Config;
use video_processor::VideoProcessor;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load_or_default(Path::new(&config_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("action_detection={}", config.logging.level))
        .init();

    info!("🏒 Ball Tracking & Action Detection Starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Detection range: hue {}-{}, sat {}+, val {}+ | speeds: pass {}+, shoot {}+ km/h",
        config.detection.hue_min,
        config.detection.hue_max,
        config.detection.sat_min,
        config.detection.val_min,
        config.action.pass_min_speed,
        config.action.shoot_min_speed
    );

    let video_processor = VideoProcessor::new(config.clone());
    let video_files = video_processor.find_video_files()?;

    if video_files.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    info!("Found {} video file(s) to process", video_files.len());

    for (idx, video_path) in video_files.iter().enumerate() {
        info!("========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            video_files.len(),
            video_path.display()
        );
        info!("========================================");

        match process_video(video_path, &video_processor, &config) {
            Ok(report) => {
                report.log();
                if config.video.save_report {
                    if let Err(e) =
                        report.save(Path::new(&config.video.output_dir), video_path)
                    {
                        error!("Failed to save report: {}", e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to process video: {}", e);
            }
        }
    }

    Ok(())
}

fn process_video(
    video_path: &PathBuf,
    video_processor: &VideoProcessor,
    config: &Config,
) -> Result<VideoReport> {
    use std::time::Instant;

    let start_time = Instant::now();

    let mut reader = video_processor.open_video(video_path)?;
    let mut writer =
        video_processor.create_writer(video_path, reader.width, reader.height, reader.fps)?;
    let pose_trace = PoseTrace::for_video(video_path)?;

    let mut tracker = BallTracker::new(config.tracking.max_positions)?;
    let mut detector = ActionDetector::new();

    let mut total_frames: u64 = 0;
    let mut frames_with_detection: u64 = 0;
    let mut last_timestamp_s = 0.0;

    while let Some(frame) = reader.read_frame()? {
        total_frames += 1;
        last_timestamp_s = frame.timestamp_s;

        // One full cycle per frame: segment -> score -> track -> speed
        let result = tracker.update(&frame.mat, frame.timestamp_s, config)?;
        if result.detection.is_some() {
            frames_with_detection += 1;
        }

        let player = pose_trace.get(frame.index as usize);

        let raw = classifier::classify(
            result.detection.map(|d| d.center()),
            player.as_ref(),
            result.speed_kmh,
            tracker.track(),
            &config.action,
        );
        let action = detector.observe(raw, frame.timestamp_s, config.action.min_confidence);

        if let Some(w) = writer.as_mut() {
            let mut annotated = frame.mat;
            annotate::draw_trajectory(&mut annotated, tracker.track())?;
            if let Some(detection) = &result.detection {
                annotate::draw_detection(&mut annotated, detection, result.speed_kmh)?;
            }
            if let Some(observation) = &player {
                annotate::draw_player(&mut annotated, observation)?;
            }
            annotate::draw_status(
                &mut annotated,
                &action,
                result.detection.is_some(),
                result.candidate_count,
            )?;
            w.write(&annotated)?;
        }

        if total_frames % 300 == 0 {
            debug!(
                "Progress: {:.1}% ({} frames, {} with ball)",
                reader.progress(),
                total_frames,
                frames_with_detection
            );
        }
    }

    detector.finish(last_timestamp_s);

    let elapsed = start_time.elapsed().as_secs_f64();
    let processing_fps = if elapsed > 0.0 {
        total_frames as f64 / elapsed
    } else {
        0.0
    };

    Ok(VideoReport::new(
        video_path,
        total_frames,
        frames_with_detection,
        tracker.speed_history(),
        detector.counts(),
        detector.action_time_s(),
        processing_fps,
    ))
}
