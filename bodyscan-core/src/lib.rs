#![cfg_attr(not(feature = "std"), no_std)]

//! Live body-scan pipeline: landmark features, pose quality scoring and the
//! stabilise-then-capture-once state machine.
//!
//! Everything in this crate is synchronous and free of I/O so it can run in a
//! browser (via `bodyscan-wasm`), on a desktop client, or inside a test
//! harness feeding synthetic frames.

pub mod features;
pub mod landmarks;
pub mod overlay;
pub mod pipeline;
pub mod quality;
pub mod session;

pub use features::{extract_features, FeatureSet};
pub use landmarks::{Landmark, LandmarkSet, LANDMARK_COUNT};
pub use overlay::{FrameView, QualityBand, Renderer, StageBadge};
pub use pipeline::{CaptureSample, FrameReport, ScanPipeline};
pub use quality::{score_pose, QualityReading};
pub use session::{CapturePolicy, ScanSession, Stage, Transition};

/// Floor applied to every divisor so coincident landmarks never yield NaN or
/// infinity.
pub const EPSILON: f64 = 1e-6;

pub(crate) fn abs(v: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        v.abs()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::fabs(v)
    }
}

/// Round half away from zero, matching `Math.round` for the non-negative
/// values produced by the scorer.
pub(crate) fn round(v: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        v.round()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::round(v)
    }
}
