//! Body-shape ratios derived from a single pose.
//!
//! The analysis service estimates body composition from these four numbers
//! alone, so the constants below are part of its contract and must not be
//! tuned.

use crate::{abs, LandmarkSet, EPSILON};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pose landmarks carry no waist point; the waist is taken as 15% wider than
/// the hip span.
pub const WAIST_FROM_HIP: f64 = 1.15;

/// Dimensionless body-shape ratios for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureSet {
    pub waist_hip_ratio: f64,
    pub shoulder_waist_ratio: f64,
    pub torso_leg_ratio: f64,
    pub body_aspect_ratio: f64,
}

impl FeatureSet {
    pub fn is_finite(&self) -> bool {
        self.waist_hip_ratio.is_finite()
            && self.shoulder_waist_ratio.is_finite()
            && self.torso_leg_ratio.is_finite()
            && self.body_aspect_ratio.is_finite()
    }
}

/// Compute the four ratios from a full pose.
pub fn extract_features(landmarks: &LandmarkSet) -> FeatureSet {
    let nose = landmarks.nose();
    let (ls, rs) = (landmarks.left_shoulder(), landmarks.right_shoulder());
    let (lh, rh) = (landmarks.left_hip(), landmarks.right_hip());
    let (la, ra) = (landmarks.left_ankle(), landmarks.right_ankle());

    let shoulder_width = abs(ls.x - rs.x);
    let hip_width = abs(lh.x - rh.x).max(EPSILON);
    let waist_width = hip_width * WAIST_FROM_HIP;
    let body_height = abs(nose.y - (la.y + ra.y) / 2.0).max(EPSILON);
    let torso_length = abs(nose.y - (lh.y + rh.y) / 2.0);

    FeatureSet {
        waist_hip_ratio: waist_width / hip_width,
        shoulder_waist_ratio: (shoulder_width / waist_width).max(EPSILON),
        torso_leg_ratio: torso_length / body_height,
        body_aspect_ratio: body_height / shoulder_width.max(EPSILON),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::*;
    use crate::Landmark;

    fn standing_pose() -> LandmarkSet {
        let mut set = LandmarkSet::new([Landmark::new(0.5, 0.5, 0.0, 0.9); LANDMARK_COUNT]);
        set[LEFT_SHOULDER] = Landmark::new(0.40, 0.30, 0.0, 0.9);
        set[RIGHT_SHOULDER] = Landmark::new(0.60, 0.30, 0.0, 0.9);
        set[LEFT_HIP] = Landmark::new(0.42, 0.55, 0.0, 0.9);
        set[RIGHT_HIP] = Landmark::new(0.58, 0.55, 0.0, 0.9);
        set[NOSE] = Landmark::new(0.50, 0.10, 0.0, 0.9);
        set[LEFT_ANKLE] = Landmark::new(0.45, 0.95, 0.0, 0.9);
        set[RIGHT_ANKLE] = Landmark::new(0.55, 0.95, 0.0, 0.9);
        set
    }

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_standing_pose_ratios() {
        let features = extract_features(&standing_pose());

        assert!(close(features.waist_hip_ratio, 1.15, 1e-9));
        // 0.20 / 0.184
        assert!(close(features.shoulder_waist_ratio, 1.0870, 1e-4));
        // torso 0.45 over a nose-to-ankle height of 0.85
        assert!(close(features.torso_leg_ratio, 0.45 / 0.85, 1e-9));
        assert!(close(features.body_aspect_ratio, 4.25, 1e-9));
    }

    #[test]
    fn test_degenerate_pose_stays_finite() {
        let set = LandmarkSet::new([Landmark::new(0.5, 0.5, 0.0, 1.0); LANDMARK_COUNT]);
        let features = extract_features(&set);

        assert!(features.is_finite());
        assert_eq!(features.shoulder_waist_ratio, EPSILON);
        assert_eq!(features.torso_leg_ratio, 0.0);
        assert!(close(features.body_aspect_ratio, 1.0, 1e-9));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let pose = standing_pose();
        assert_eq!(extract_features(&pose), extract_features(&pose));
    }
}
