use bodyscan_core::{CaptureSample, Renderer};
use bodyscan_shared::{CameraAnalysis, CaptureProfile, CaptureRequest};

use crate::api::{AnalysisClient, ApiError};
use crate::history::{HistoryLoader, HistoryTimeline};
use crate::scanner::{CaptureOutcome, PendingCapture, ScanController};
use crate::source::LandmarkSource;

/// Turns a captured sample into a persisted scan.
pub struct CaptureCoordinator {
    client: AnalysisClient,
    profile: CaptureProfile,
    history: HistoryLoader,
}

impl CaptureCoordinator {
    pub fn new(client: AnalysisClient, profile: CaptureProfile, history: HistoryLoader) -> Self {
        Self {
            client,
            profile,
            history,
        }
    }

    pub fn profile(&self) -> &CaptureProfile {
        &self.profile
    }

    pub fn build_request(&self, sample: &CaptureSample) -> CaptureRequest {
        CaptureRequest::new(&self.profile, sample)
    }

    /// Send the capture once. Failures are returned, never retried: a retry
    /// could persist the same scan twice.
    pub async fn submit(&self, sample: &CaptureSample) -> Result<CameraAnalysis, ApiError> {
        let request = self.build_request(sample);
        log::info!(
            "Submitting capture for {} (pose quality {}%)",
            request.user_id,
            request.pose_quality
        );
        self.client.camera_analyze(&request).await
    }

    /// Submit `pending`, apply the answer to `controller`, and refresh
    /// `timeline` when the service stored a new scan.
    ///
    /// The controller has already released its source by the time a
    /// [`PendingCapture`] exists.
    pub async fn capture<S, R>(
        &self,
        controller: &mut ScanController<S, R>,
        timeline: &mut HistoryTimeline,
        pending: PendingCapture,
    ) -> CaptureOutcome
    where
        S: LandmarkSource,
        R: Renderer,
    {
        let result = self.submit(&pending.sample).await;
        let outcome = controller.complete_capture(pending.generation, result);

        if outcome.refreshes_history() {
            self.history.refresh(timeline).await;
        }
        outcome
    }
}
