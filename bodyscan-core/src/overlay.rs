//! Presentation seam. The state machine never draws; a [`Renderer`] reads
//! the per-frame view and puts it on whatever surface it owns (a canvas, a
//! terminal, nothing at all in tests).

use core::fmt;

use crate::{CapturePolicy, LandmarkSet, Stage};

pub const NO_PERSON_TITLE: &str = "No person detected";
pub const NO_PERSON_HINT: &str = "Step into frame · full body visible";

const GREEN: &str = "#22C55E";
const AMBER: &str = "#F59E0B";
const RED: &str = "#EF4444";

/// Read-only snapshot of one processed frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub stage: Stage,
    pub quality: u8,
    pub visible_count: u8,
    pub countdown: Option<u32>,
    /// `None` when the pose engine found nobody.
    pub landmarks: Option<&'a LandmarkSet>,
}

pub trait Renderer {
    type Error;

    fn render(&mut self, view: &FrameView<'_>) -> Result<(), Self::Error>;
}

/// Coarse quality bucket that drives colours and guidance text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBand {
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn from_quality(quality: u8, policy: &CapturePolicy) -> Self {
        match policy.stage_for(quality) {
            Stage::Ready | Stage::Capturing => QualityBand::Good,
            Stage::Adjusting => QualityBand::Fair,
            Stage::Positioning => QualityBand::Poor,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            QualityBand::Good => GREEN,
            QualityBand::Fair => AMBER,
            QualityBand::Poor => RED,
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            QualityBand::Good => "✓ Hold still — auto-capturing…",
            QualityBand::Fair => "Adjust position slightly",
            QualityBand::Poor => "Stand back · show full body · face forward",
        }
    }
}

pub fn stage_color(stage: Stage) -> &'static str {
    match stage {
        Stage::Ready | Stage::Capturing => GREEN,
        Stage::Adjusting => AMBER,
        Stage::Positioning => RED,
    }
}

/// Status badge text, e.g. `✓ Ready — 2s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBadge {
    pub stage: Stage,
    pub countdown: Option<u32>,
}

impl fmt::Display for StageBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stage, self.countdown) {
            (Stage::Capturing, _) => f.write_str("🔍 Analyzing…"),
            (Stage::Ready, Some(secs)) if secs > 0 => write!(f, "✓ Ready — {}s", secs),
            (Stage::Ready, _) => f.write_str("✓ Capturing!"),
            (stage, _) => f.write_str(stage.label()),
        }
    }
}
