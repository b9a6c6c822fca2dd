//! Native driver for the live body-scan pipeline: landmark sources, the scan
//! controller, and the analysis-service client that persists captures.

pub mod api;
pub mod cli;
pub mod coordinator;
pub mod history;
pub mod render;
pub mod scanner;
pub mod source;

pub use api::{AnalysisClient, ApiError};
pub use coordinator::CaptureCoordinator;
pub use history::{HistoryLoader, HistoryTimeline};
pub use render::LogRenderer;
pub use scanner::{CaptureOutcome, CaptureStatus, PendingCapture, ScanController};
pub use source::{LandmarkSource, PoseFrame, PoseOptions, ReplaySource, SourceError};
