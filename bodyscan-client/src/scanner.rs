//! Scan session lifecycle.
//!
//! [`ScanController`] owns the landmark source for one camera-on period and
//! feeds its frames through the core pipeline. When the pipeline triggers,
//! the controller releases the source before returning a [`PendingCapture`],
//! so no further frames can reach the session while the request is in
//! flight.

use std::fmt;

use bodyscan_core::{CapturePolicy, CaptureSample, FrameView, Renderer, ScanPipeline, ScanSession};
use bodyscan_shared::CameraAnalysis;

use crate::api::ApiError;
use crate::source::{LandmarkSource, PoseFrame, PoseOptions, SourceError};

/// What the UI shows around the camera view.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    Idle,
    Scanning,
    /// Capture sent, waiting for the analysis service.
    Saving,
    Done(CameraAnalysis),
    /// Terminal for the session; the user has to start a new scan.
    Failed(String),
}

/// A capture decided on a frame, tagged with the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCapture {
    pub generation: u64,
    pub sample: CaptureSample,
}

/// How a finished capture request was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Saved(CameraAnalysis),
    Failed(String),
    /// A newer session started while the request was in flight.
    Stale,
}

impl CaptureOutcome {
    /// The service persisted something the history view has not seen yet.
    pub fn refreshes_history(&self) -> bool {
        matches!(self, CaptureOutcome::Saved(_) | CaptureOutcome::Stale)
    }
}

pub struct ScanController<S: LandmarkSource, R: Renderer> {
    pipeline: ScanPipeline,
    options: PoseOptions,
    source: Option<S>,
    renderer: R,
    generation: u64,
    status: CaptureStatus,
}

impl<S: LandmarkSource, R: Renderer> ScanController<S, R> {
    pub fn new(policy: CapturePolicy, options: PoseOptions, renderer: R) -> Self {
        Self {
            pipeline: ScanPipeline::new(policy),
            options,
            source: None,
            renderer,
            generation: 0,
            status: CaptureStatus::Idle,
        }
    }

    pub fn status(&self) -> &CaptureStatus {
        &self.status
    }

    pub fn session(&self) -> &ScanSession {
        self.pipeline.session()
    }

    pub fn policy(&self) -> &CapturePolicy {
        self.pipeline.policy()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_scanning(&self) -> bool {
        self.source.is_some()
    }

    /// Begin a fresh session on `source`, tearing down any running one.
    pub fn start(&mut self, mut source: S) -> Result<(), SourceError> {
        self.stop();

        source.start(&self.options)?;
        self.generation += 1;
        self.source = Some(source);
        self.status = CaptureStatus::Scanning;

        log::info!("Scan session {} started", self.generation);
        Ok(())
    }

    /// Release the source and reset the session. Safe to call at any time,
    /// including repeatedly, before any start, and while a capture request
    /// is in flight (the request is left to finish).
    pub fn stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            source.close();
            log::info!("Scan session {} stopped", self.generation);
        }

        self.pipeline.reset();
        if self.status == CaptureStatus::Scanning {
            self.status = CaptureStatus::Idle;
        }
    }

    /// Wait for the next frame from the source and process it. The session
    /// stops on its own when the stream ends.
    ///
    /// Dropping the returned future before it resolves loses no frame when
    /// the source waits on a channel.
    pub async fn poll(&mut self) -> Result<Option<PendingCapture>, SourceError>
    where
        R::Error: fmt::Display,
    {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        match source.next_frame().await {
            Ok(Some(frame)) => Ok(self.handle_frame(&frame)),
            Ok(None) => {
                log::info!("Landmark stream ended");
                self.stop();
                Ok(None)
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// Process one pose result. Frames arriving without an active source,
    /// or after the session captured, are dropped.
    pub fn handle_frame(&mut self, frame: &PoseFrame) -> Option<PendingCapture>
    where
        R::Error: fmt::Display,
    {
        if self.source.is_none() {
            return None;
        }

        let report = self
            .pipeline
            .process(frame.landmarks.as_ref(), frame.width as f64)?;

        let reading = report.reading.unwrap_or_default();
        let view = FrameView {
            stage: report.stage,
            quality: reading.quality,
            visible_count: reading.visible_count,
            countdown: report.countdown,
            landmarks: frame.landmarks.as_ref(),
        };
        if let Err(e) = self.renderer.render(&view) {
            log::warn!("Overlay render failed: {}", e);
        }

        let sample = report.capture?;
        log::info!(
            "Pose held for {} frames, capturing (quality {}%)",
            self.policy().ready_frames,
            sample.quality
        );

        self.stop();
        self.status = CaptureStatus::Saving;

        Some(PendingCapture {
            generation: self.generation,
            sample,
        })
    }

    /// Apply the service's answer to a capture from session `generation`.
    pub fn complete_capture(
        &mut self,
        generation: u64,
        result: Result<CameraAnalysis, ApiError>,
    ) -> CaptureOutcome {
        if generation != self.generation {
            match &result {
                Ok(analysis) => log::info!(
                    "Discarding result {} from replaced session {}",
                    analysis.scan_id,
                    generation
                ),
                Err(e) => log::warn!("Discarding error from replaced session {}: {}", generation, e),
            }
            return CaptureOutcome::Stale;
        }

        match result {
            Ok(analysis) => {
                log::info!("Scan {} saved", analysis.scan_id);
                self.status = CaptureStatus::Done(analysis.clone());
                CaptureOutcome::Saved(analysis)
            }
            Err(e) => {
                log::error!("Capture failed: {}", e);
                let message = e.user_message();
                self.status = CaptureStatus::Failed(message.clone());
                CaptureOutcome::Failed(message)
            }
        }
    }

    /// "Scan again": clear a shown result or error.
    pub fn dismiss(&mut self) {
        if matches!(self.status, CaptureStatus::Done(_) | CaptureStatus::Failed(_)) {
            self.status = CaptureStatus::Idle;
        }
    }
}

impl<S: LandmarkSource, R: Renderer> Drop for ScanController<S, R> {
    fn drop(&mut self) {
        self.stop();
    }
}
