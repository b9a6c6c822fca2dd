//! Real-time pose quality: landmark visibility combined with how well the
//! subject is framed.

use crate::{abs, round, LandmarkSet, LANDMARK_COUNT};

/// Landmarks at or below this visibility do not count as seen.
pub const VISIBILITY_CUTOFF: f64 = 0.5;

/// Shoulder span in pixels that scores full marks (subject ~1.5 m away).
/// Both bounds are exclusive.
pub const IDEAL_SHOULDER_PX: (f64, f64) = (120.0, 180.0);

/// Centre of the falloff applied outside the ideal band.
pub const IDEAL_SHOULDER_CENTER_PX: f64 = 150.0;

/// Score lost per pixel of distance from the ideal centre.
pub const DISTANCE_FALLOFF: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QualityReading {
    /// 0..=100
    pub quality: u8,
    /// 0..=33
    pub visible_count: u8,
}

/// Framing score for a given shoulder span in pixels.
pub fn distance_score(shoulder_px: f64) -> f64 {
    let (low, high) = IDEAL_SHOULDER_PX;
    if shoulder_px > low && shoulder_px < high {
        100.0
    } else {
        (100.0 - DISTANCE_FALLOFF * abs(shoulder_px - IDEAL_SHOULDER_CENTER_PX)).max(0.0)
    }
}

/// Score a pose on a frame `frame_width_px` pixels wide.
pub fn score_pose(landmarks: &LandmarkSet, frame_width_px: f64) -> QualityReading {
    let visible_count = landmarks
        .iter()
        .filter(|l| l.visibility > VISIBILITY_CUTOFF)
        .count();
    let visibility_score = visible_count as f64 / LANDMARK_COUNT as f64 * 100.0;

    let shoulder_px =
        abs(landmarks.left_shoulder().x - landmarks.right_shoulder().x) * frame_width_px;

    let quality = round((visibility_score + distance_score(shoulder_px)) / 2.0);

    QualityReading {
        quality: quality.clamp(0.0, 100.0) as u8,
        visible_count: visible_count as u8,
    }
}
