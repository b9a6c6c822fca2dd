//! Debounced capture state machine.
//!
//! A [`ScanSession`] lives for one camera-on period. Every frame is fed
//! through [`ScanSession::advance`]; once enough consecutive frames score as
//! ready, the session latches `captured` and reports [`Transition::Capture`]
//! exactly once. Frames arriving after the latch are ignored.

/// Capture thresholds. The defaults are policy constants shared with the
/// analysis service's expectations and the on-screen guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePolicy {
    /// Minimum quality for a frame to count towards the ready streak.
    pub ready_quality: u8,
    /// Minimum quality for the "adjusting" stage; below it is "positioning".
    pub adjust_quality: u8,
    /// Consecutive ready frames required before capturing (~3 s).
    pub ready_frames: u32,
    /// Frame rate assumed when turning the remaining streak into seconds.
    pub fps_estimate: u32,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            ready_quality: 19,
            adjust_quality: 10,
            ready_frames: 45,
            fps_estimate: 15,
        }
    }
}

impl CapturePolicy {
    /// Stage a frame of the given quality maps to, ignoring the streak.
    pub fn stage_for(&self, quality: u8) -> Stage {
        if quality >= self.ready_quality {
            Stage::Ready
        } else if quality >= self.adjust_quality {
            Stage::Adjusting
        } else {
            Stage::Positioning
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Positioning,
    Adjusting,
    Ready,
    Capturing,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Positioning => "Positioning",
            Stage::Adjusting => "Adjusting",
            Stage::Ready => "Ready",
            Stage::Capturing => "Capturing",
        }
    }
}

/// Result of feeding one frame to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session already captured; the frame had no effect.
    Ignored,
    /// The frame moved (or kept) the session in this stage.
    Stage(Stage),
    /// The streak completed on this frame. The latch is already set.
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSession {
    stage: Stage,
    consecutive_ready_frames: u32,
    captured: bool,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn consecutive_ready_frames(&self) -> u32 {
        self.consecutive_ready_frames
    }

    pub fn captured(&self) -> bool {
        self.captured
    }

    /// Feed one frame. `quality` is `None` when no person was detected.
    pub fn advance(&mut self, quality: Option<u8>, policy: &CapturePolicy) -> Transition {
        if self.captured {
            return Transition::Ignored;
        }

        let Some(quality) = quality else {
            self.consecutive_ready_frames = 0;
            self.stage = Stage::Positioning;
            return Transition::Stage(self.stage);
        };

        self.stage = policy.stage_for(quality);
        if self.stage == Stage::Ready {
            self.consecutive_ready_frames += 1;
        } else {
            self.consecutive_ready_frames = 0;
        }

        // Only a ready frame can complete the streak, whatever the policy.
        if self.stage == Stage::Ready && self.consecutive_ready_frames >= policy.ready_frames {
            self.stage = Stage::Capturing;
            self.captured = true;
            return Transition::Capture;
        }

        Transition::Stage(self.stage)
    }

    /// Whole seconds left before auto-capture, shown only while ready.
    pub fn countdown(&self, policy: &CapturePolicy) -> Option<u32> {
        if self.stage != Stage::Ready {
            return None;
        }
        let remaining = policy
            .ready_frames
            .saturating_sub(self.consecutive_ready_frames);
        Some(remaining.div_ceil(policy.fps_estimate.max(1)))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
