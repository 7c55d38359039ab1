// src/classifier.rs
//
// Rule-based action classification: SHOT, PASS, DRIBBLE or NONE with a
// confidence score, followed by a minimum-confidence gate.
//
// The rules form a priority-ordered list evaluated in fixed order; the
// first rule to fire wins. Keeping the order explicit in RULE_ORDER
// protects against silent reordering if the rules ever move to a
// config-driven table.

use crate::pose::PlayerObservation;
use crate::track::BallTrack;
use crate::types::{ActionConfig, ActionCounts, ActionLabel, ActionState};
use tracing::info;

/// Minimum ball movement for a dribble, km/h.
const DRIBBLE_MIN_SPEED_KMH: f32 = 5.0;
/// Speed at which shot confidence saturates to 1.0, km/h.
const SHOT_FULL_CONFIDENCE_KMH: f32 = 80.0;
/// Speed at which pass confidence saturates to 1.0, km/h.
const PASS_FULL_CONFIDENCE_KMH: f32 = 40.0;
/// Window of tracked positions the dribble rule averages over.
const DRIBBLE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Rule {
    Shot,
    Pass,
    Dribble,
}

const RULE_ORDER: [Rule; 3] = [Rule::Shot, Rule::Pass, Rule::Dribble];

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Classify the current frame. Pure: reads only its arguments, mutates
/// nothing. Absent ball or player short-circuits to NONE; this is a
/// normal outcome, not an error.
pub fn classify(
    ball_pos: Option<(f32, f32)>,
    player: Option<&PlayerObservation>,
    speed_kmh: f32,
    track: &BallTrack,
    cfg: &ActionConfig,
) -> ActionState {
    let (ball_pos, player) = match (ball_pos, player) {
        (Some(b), Some(p)) => (b, p),
        _ => return ActionState::none(),
    };

    let dist = distance(ball_pos, player.center);

    for rule in RULE_ORDER {
        let fired = match rule {
            Rule::Shot => shot_rule(dist, player, speed_kmh, track, cfg),
            Rule::Pass => pass_rule(player, speed_kmh, cfg),
            Rule::Dribble => dribble_rule(dist, player, speed_kmh, track, cfg),
        };
        if let Some(state) = fired {
            return state;
        }
    }

    ActionState::none()
}

/// SHOT: fast ball moving away from the player.
///
/// "Moving away" compares against the distance at the track's
/// second-most-recent position only. A single frame of jitter can flip
/// the comparison; the one-sample test is kept as-is for output
/// compatibility rather than smoothed.
fn shot_rule(
    dist: f32,
    player: &PlayerObservation,
    speed_kmh: f32,
    track: &BallTrack,
    cfg: &ActionConfig,
) -> Option<ActionState> {
    if speed_kmh <= cfg.shoot_min_speed {
        return None;
    }

    let previous = track.second_last()?;
    if dist > distance(previous, player.center) {
        Some(ActionState {
            label: ActionLabel::Shot,
            confidence: (speed_kmh / SHOT_FULL_CONFIDENCE_KMH).min(1.0),
        })
    } else {
        None
    }
}

/// PASS: medium speed with the arm extended.
fn pass_rule(player: &PlayerObservation, speed_kmh: f32, cfg: &ActionConfig) -> Option<ActionState> {
    if speed_kmh > cfg.pass_min_speed
        && speed_kmh < cfg.shoot_min_speed
        && player.arm_angle_deg > cfg.arm_extended_min_deg
    {
        Some(ActionState {
            label: ActionLabel::Pass,
            confidence: (speed_kmh / PASS_FULL_CONFIDENCE_KMH).min(1.0),
        })
    } else {
        None
    }
}

/// DRIBBLE: ball staying close to the player while moving. Requires a
/// full window of tracked positions whose mean distance to the player
/// also stays under the ceiling, so one stray frame near the player
/// does not read as a dribble.
fn dribble_rule(
    dist: f32,
    player: &PlayerObservation,
    speed_kmh: f32,
    track: &BallTrack,
    cfg: &ActionConfig,
) -> Option<ActionState> {
    if dist >= cfg.dribble_max_distance || speed_kmh <= DRIBBLE_MIN_SPEED_KMH {
        return None;
    }
    if track.len() < DRIBBLE_WINDOW {
        return None;
    }

    let mut sum = 0.0f32;
    for position in track.recent(DRIBBLE_WINDOW) {
        sum += distance(position, player.center);
    }
    let mean_distance = sum / DRIBBLE_WINDOW as f32;

    if mean_distance < cfg.dribble_max_distance {
        Some(ActionState {
            label: ActionLabel::Dribble,
            confidence: (1.0 - mean_distance / cfg.dribble_max_distance).max(0.5),
        })
    } else {
        None
    }
}

/// Force results under the gate to (NONE, 0.0). Idempotent; the gate
/// threshold is tunable without touching the rules above.
pub fn apply_confidence_gate(state: ActionState, min_confidence: f32) -> ActionState {
    if state.confidence < min_confidence {
        ActionState::none()
    } else {
        state
    }
}

// ============================================================================
// EXTERNALLY VISIBLE ACTION STATE
// ============================================================================

/// Gate bookkeeping for display and reporting: the current action only
/// changes when the gated label differs from the previous gated label.
/// Classification itself stays a pure per-frame function.
pub struct ActionDetector {
    current: ActionState,
    action_started_at: Option<f64>,
    counts: ActionCounts,
    action_time_s: f64,
}

impl ActionDetector {
    pub fn new() -> Self {
        Self {
            current: ActionState::none(),
            action_started_at: None,
            counts: ActionCounts::default(),
            action_time_s: 0.0,
        }
    }

    /// Apply the gate and update the visible action state.
    pub fn observe(
        &mut self,
        raw: ActionState,
        timestamp_s: f64,
        min_confidence: f32,
    ) -> ActionState {
        let gated = apply_confidence_gate(raw, min_confidence);

        if gated.label != self.current.label {
            if let Some(started) = self.action_started_at.take() {
                self.action_time_s += timestamp_s - started;
            }

            if gated.label != ActionLabel::None {
                match gated.label {
                    ActionLabel::Shot => self.counts.shot += 1,
                    ActionLabel::Pass => self.counts.pass += 1,
                    ActionLabel::Dribble => self.counts.dribble += 1,
                    ActionLabel::None => {}
                }
                self.action_started_at = Some(timestamp_s);
                info!(
                    "🏒 Action: {} ({:.0}% confidence) at {:.2}s",
                    gated.label.as_str(),
                    gated.confidence * 100.0,
                    timestamp_s
                );
            }
        }

        self.current = gated;
        gated
    }

    /// Close out a still-open action at end of stream.
    pub fn finish(&mut self, timestamp_s: f64) {
        if let Some(started) = self.action_started_at.take() {
            self.action_time_s += timestamp_s - started;
        }
        self.current = ActionState::none();
    }

    pub fn current(&self) -> ActionState {
        self.current
    }

    pub fn counts(&self) -> ActionCounts {
        self.counts
    }

    pub fn action_time_s(&self) -> f64 {
        self.action_time_s
    }

    pub fn reset(&mut self) {
        self.current = ActionState::none();
        self.action_started_at = None;
        self.counts = ActionCounts::default();
        self.action_time_s = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ActionConfig {
        ActionConfig::default()
    }

    fn player(center: (f32, f32), arm_angle_deg: f32) -> PlayerObservation {
        PlayerObservation {
            center,
            arm_angle_deg,
        }
    }

    fn track_of(positions: &[(f32, f32)]) -> BallTrack {
        let mut track = BallTrack::new(30);
        for (i, p) in positions.iter().enumerate() {
            track.append(*p, i as f64 * 0.033);
        }
        track
    }

    #[test]
    fn euclidean_distance_is_exact() {
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    }

    #[test]
    fn absent_inputs_classify_as_none() {
        let track = track_of(&[]);
        let p = player((100.0, 100.0), 160.0);

        let state = classify(None, Some(&p), 60.0, &track, &cfg());
        assert_eq!(state, ActionState::none());

        let state = classify(Some((10.0, 10.0)), None, 60.0, &track, &cfg());
        assert_eq!(state, ActionState::none());
    }

    #[test]
    fn fast_ball_moving_away_is_a_shot() {
        let track = track_of(&[(320.0, 230.0), (320.0, 200.0)]);
        let p = player((320.0, 240.0), 160.0);

        let state = classify(Some((320.0, 150.0)), Some(&p), 60.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::Shot);
        assert!((state.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn fast_ball_moving_toward_player_is_not_a_shot() {
        // Previous tracked position farther from the player than now
        let track = track_of(&[(320.0, 700.0), (320.0, 650.0)]);
        let p = player((320.0, 240.0), 90.0);

        let state = classify(Some((320.0, 300.0)), Some(&p), 60.0, &track, &cfg());
        // 60 km/h is outside the pass band and too fast for anything else
        assert_eq!(state.label, ActionLabel::None);
    }

    #[test]
    fn shot_needs_two_tracked_positions() {
        let track = track_of(&[(320.0, 200.0)]);
        let p = player((320.0, 240.0), 160.0);

        let state = classify(Some((320.0, 150.0)), Some(&p), 60.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::None);
    }

    #[test]
    fn medium_speed_with_extended_arm_is_a_pass() {
        let track = track_of(&[]);
        let p = player((100.0, 100.0), 150.0);

        let state = classify(Some((400.0, 300.0)), Some(&p), 30.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::Pass);
        assert!((state.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn bent_arm_suppresses_the_pass() {
        let track = track_of(&[]);
        let p = player((100.0, 100.0), 90.0);

        let state = classify(Some((400.0, 300.0)), Some(&p), 30.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::None);
    }

    #[test]
    fn ball_oscillating_near_player_is_a_dribble() {
        let positions = [
            (325.0, 285.0),
            (335.0, 295.0),
            (328.0, 288.0),
            (332.0, 292.0),
            (330.0, 290.0),
        ];
        let track = track_of(&positions);
        let p = player((320.0, 240.0), 90.0);

        let state = classify(Some((330.0, 290.0)), Some(&p), 15.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::Dribble);
        assert!(state.confidence >= 0.5);
        assert!(state.confidence <= 1.0);
    }

    #[test]
    fn dribble_needs_a_full_history_window() {
        let track = track_of(&[(330.0, 290.0), (331.0, 291.0)]);
        let p = player((320.0, 240.0), 90.0);

        let state = classify(Some((330.0, 290.0)), Some(&p), 15.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::None);
    }

    #[test]
    fn confidence_saturates_at_one() {
        let track = track_of(&[(320.0, 230.0), (320.0, 200.0)]);
        let p = player((320.0, 240.0), 160.0);

        let state = classify(Some((320.0, 150.0)), Some(&p), 500.0, &track, &cfg());
        assert_eq!(state.label, ActionLabel::Shot);
        assert_eq!(state.confidence, 1.0);
    }

    #[test]
    fn gate_suppresses_low_confidence() {
        let state = ActionState {
            label: ActionLabel::Dribble,
            confidence: 0.3,
        };
        assert_eq!(apply_confidence_gate(state, 0.4), ActionState::none());
    }

    #[test]
    fn gate_is_idempotent() {
        for confidence in [0.0, 0.3, 0.4, 0.9] {
            let state = ActionState {
                label: ActionLabel::Pass,
                confidence,
            };
            let once = apply_confidence_gate(state, 0.4);
            let twice = apply_confidence_gate(once, 0.4);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn detector_counts_transitions_not_frames() {
        let mut detector = ActionDetector::new();
        let dribble = ActionState {
            label: ActionLabel::Dribble,
            confidence: 0.8,
        };

        // Three consecutive dribble frames count once
        detector.observe(dribble, 0.0, 0.4);
        detector.observe(dribble, 0.033, 0.4);
        detector.observe(dribble, 0.066, 0.4);
        assert_eq!(detector.counts().dribble, 1);

        // Drop below the gate, then dribble again: second occurrence
        detector.observe(
            ActionState {
                label: ActionLabel::Dribble,
                confidence: 0.2,
            },
            0.1,
            0.4,
        );
        assert_eq!(detector.current().label, ActionLabel::None);
        detector.observe(dribble, 0.133, 0.4);
        assert_eq!(detector.counts().dribble, 2);
    }

    #[test]
    fn detector_accumulates_action_time() {
        let mut detector = ActionDetector::new();
        let shot = ActionState {
            label: ActionLabel::Shot,
            confidence: 0.9,
        };

        detector.observe(shot, 1.0, 0.4);
        detector.observe(shot, 1.5, 0.4);
        detector.observe(ActionState::none(), 2.0, 0.4);
        assert!((detector.action_time_s() - 1.0).abs() < 1e-9);

        detector.observe(shot, 3.0, 0.4);
        detector.finish(3.5);
        assert!((detector.action_time_s() - 1.5).abs() < 1e-9);
    }
}
