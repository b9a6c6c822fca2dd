//! Per-frame entry point: score the pose, advance the session, and extract
//! features on the frame that captures.

use crate::{
    extract_features, score_pose, CapturePolicy, FeatureSet, LandmarkSet, QualityReading,
    ScanSession, Stage, Transition,
};

/// What gets handed to the capture coordinator when the streak completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSample {
    pub features: FeatureSet,
    pub quality: u8,
}

/// Per-frame output for the overlay and the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub stage: Stage,
    /// `None` when no person was detected.
    pub reading: Option<QualityReading>,
    pub countdown: Option<u32>,
    /// Set on the single frame that triggers capture.
    pub capture: Option<CaptureSample>,
}

/// Landmarks in, stage decisions out: scoring, the session and feature
/// extraction behind one "process one frame" entry point.
#[derive(Debug, Clone, Default)]
pub struct ScanPipeline {
    policy: CapturePolicy,
    session: ScanSession,
}

impl ScanPipeline {
    pub fn new(policy: CapturePolicy) -> Self {
        Self {
            policy,
            session: ScanSession::new(),
        }
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.policy
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Process one frame in arrival order. Returns `None` once the session
    /// has captured; such frames must not be scored or drawn as live.
    pub fn process(
        &mut self,
        landmarks: Option<&LandmarkSet>,
        frame_width_px: f64,
    ) -> Option<FrameReport> {
        let reading = landmarks.map(|l| score_pose(l, frame_width_px));

        let capture = match self.session.advance(reading.map(|r| r.quality), &self.policy) {
            Transition::Ignored => return None,
            Transition::Stage(_) => None,
            Transition::Capture => {
                let (landmarks, reading) = landmarks.zip(reading)?;
                Some(CaptureSample {
                    features: extract_features(landmarks),
                    quality: reading.quality,
                })
            }
        };

        Some(FrameReport {
            stage: self.session.stage(),
            reading,
            countdown: self.session.countdown(&self.policy),
            capture,
        })
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}
