use std::collections::VecDeque;
use std::fs::File;
use std::future::Future;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;

use bodyscan_core::{Landmark, LandmarkSet, LANDMARK_COUNT};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Options handed to the pose engine when a source starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseOptions {
    pub model_complexity: u8,
    pub smooth_landmarks: bool,
    pub enable_segmentation: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for PoseOptions {
    fn default() -> Self {
        Self {
            model_complexity: 1,
            smooth_landmarks: true,
            enable_segmentation: false,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// One pose-engine result.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    pub width: u32,
    pub height: u32,
    /// `None` when nobody was detected.
    pub landmarks: Option<LandmarkSet>,
}

impl PoseFrame {
    pub fn new(width: u32, height: u32, landmarks: Option<LandmarkSet>) -> Self {
        Self {
            width,
            height,
            landmarks,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read landmark stream: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: expected {expected} landmarks, got {count}", expected = LANDMARK_COUNT)]
    LandmarkCount { line: usize, count: usize },

    #[error("landmark source is not running")]
    NotRunning,
}

/// A camera driver paired with a pose engine.
///
/// The controller owns the source for one scan session and is the only
/// caller of these methods.
pub trait LandmarkSource {
    /// Open the camera and load the pose engine.
    fn start(&mut self, options: &PoseOptions) -> Result<(), SourceError>;

    /// Next pose result in arrival order, waiting for it if the engine has
    /// not produced one yet. `Ok(None)` once the stream ends.
    fn next_frame(&mut self) -> impl Future<Output = Result<Option<PoseFrame>, SourceError>>;

    /// Release the camera. Called once per session.
    fn stop(&mut self);

    /// Release the pose engine. Called once per session, after `stop`.
    fn close(&mut self);
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

const STDIN_BACKLOG: usize = 64;

enum Feed {
    Frames(VecDeque<PoseFrame>),
    Lines(Box<dyn Iterator<Item = io::Result<String>> + Send>),
    /// Lines forwarded by a reader thread, so a slow producer never blocks
    /// the runtime.
    Channel(mpsc::Receiver<io::Result<String>>),
}

/// Replays pose results, one JSON object per line:
///
/// ```text
/// {"width":640,"height":480,"landmarks":[{"x":0.5,"y":0.1,"z":0.0,"visibility":0.98}, ...]}
/// {"width":640,"height":480,"landmarks":null}
/// ```
///
/// Lines are read one per frame, so a live producer piping into stdin is
/// processed as it writes.
pub struct ReplaySource {
    feed: Option<Feed>,
    line: usize,
    running: bool,
}

impl ReplaySource {
    fn with_feed(feed: Feed) -> Self {
        Self {
            feed: Some(feed),
            line: 0,
            running: false,
        }
    }

    pub fn from_frames(frames: impl IntoIterator<Item = PoseFrame>) -> Self {
        Self::with_feed(Feed::Frames(frames.into_iter().collect()))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self::with_feed(Feed::Lines(Box::new(reader.lines())))
    }

    /// Open a recording; `-` follows standard input.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if path.as_os_str() == "-" {
            return Ok(Self::with_feed(Feed::Channel(spawn_stdin_reader()?)));
        }
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }

    /// Lines consumed so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<io::Result<String>>> {
    let (tx, rx) = mpsc::channel(STDIN_BACKLOG);

    thread::Builder::new()
        .name("landmark-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                // The receiver is gone once the source closes.
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
            log::debug!("Standard input reader finished");
        })?;

    Ok(rx)
}

fn parse_frame(line: usize, text: &str) -> Result<PoseFrame, SourceError> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|source| SourceError::Parse { line, source })?;

    let landmarks = match raw.landmarks {
        None => None,
        Some(points) if points.is_empty() => None,
        Some(points) => Some(LandmarkSet::from_slice(&points).ok_or(
            SourceError::LandmarkCount {
                line,
                count: points.len(),
            },
        )?),
    };

    Ok(PoseFrame {
        width: raw.width.unwrap_or(DEFAULT_FRAME_WIDTH),
        height: raw.height.unwrap_or(DEFAULT_FRAME_HEIGHT),
        landmarks,
    })
}

impl LandmarkSource for ReplaySource {
    fn start(&mut self, options: &PoseOptions) -> Result<(), SourceError> {
        log::debug!("Replay source started with {:?}", options);
        self.running = true;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<PoseFrame>, SourceError> {
        if !self.running {
            return Err(SourceError::NotRunning);
        }

        loop {
            let next = match self.feed.as_mut() {
                None => return Ok(None),
                Some(Feed::Frames(frames)) => return Ok(frames.pop_front()),
                Some(Feed::Lines(lines)) => lines.next(),
                Some(Feed::Channel(rx)) => rx.recv().await,
            };

            let Some(text) = next else {
                return Ok(None);
            };
            self.line += 1;

            let text = text?;
            if text.trim().is_empty() {
                continue;
            }
            return parse_frame(self.line, &text).map(Some);
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn close(&mut self) {
        if self.feed.take().is_some() {
            log::debug!("Replay source closed after {} lines", self.line);
        }
    }
}
