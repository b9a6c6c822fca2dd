mod common;

use std::io::{self, BufReader, Cursor, Read};

use bodyscan_client::{CaptureStatus, PoseOptions, ReplaySource, ScanController};
use bodyscan_core::{CapturePolicy, ScanSession, Stage};
use common::*;

type Controller = ScanController<ScriptedSource, RecordingRenderer>;

fn controller() -> Controller {
    ScanController::new(
        CapturePolicy::default(),
        PoseOptions::default(),
        RecordingRenderer::default(),
    )
}

#[test]
fn test_fifty_ready_frames_capture_once() {
    let mut controller = controller();
    let (source, log) = ScriptedSource::new(Vec::new());
    controller.start(source).unwrap();

    let captures: Vec<_> = (0..50)
        .filter_map(|_| controller.handle_frame(&good_frame()))
        .collect();

    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].generation, 1);
    assert_eq!(captures[0].sample.quality, 100);
    assert!(captures[0].sample.features.is_finite());

    // The source is released on the capturing frame, before any request.
    assert!(!controller.is_scanning());
    assert_eq!(log.borrow().stops, 1);
    assert_eq!(log.borrow().closes, 1);
    assert_eq!(controller.status(), &CaptureStatus::Saving);

    // Frames 46..50 were not drawn.
    let rendered = &controller.renderer().frames;
    assert_eq!(rendered.len(), 45);
    assert_eq!(rendered[44].stage, Stage::Capturing);
    assert_eq!(rendered[43].countdown, Some(1));
}

#[tokio::test]
async fn test_poll_drives_source_until_capture() {
    let mut controller = controller();
    let frames = std::iter::repeat_with(good_frame).take(60);
    let (source, _log) = ScriptedSource::new(frames);
    controller.start(source).unwrap();

    let mut captures = 0;
    let mut polls = 0;
    while controller.is_scanning() {
        polls += 1;
        if controller.poll().await.unwrap().is_some() {
            captures += 1;
        }
    }

    assert_eq!(captures, 1);
    assert_eq!(polls, 45);
    assert!(controller.poll().await.unwrap().is_none());
}

/// Live producer that has written some frames and is still running.
struct OpenPipe;

impl Read for OpenPipe {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::WouldBlock, "producer still running"))
    }
}

#[tokio::test]
async fn test_streamed_frames_capture_before_producer_finishes() {
    let lines = format!("{}\n", frame_line(&standing_pose())).repeat(45);
    let reader = BufReader::new(Cursor::new(lines).chain(OpenPipe));

    let mut controller = ScanController::new(
        CapturePolicy::default(),
        PoseOptions::default(),
        RecordingRenderer::default(),
    );
    controller.start(ReplaySource::from_reader(reader)).unwrap();

    let mut pending = None;
    for _ in 0..45 {
        assert!(pending.is_none());
        pending = controller.poll().await.unwrap();
    }

    let pending = pending.expect("captured on the 45th streamed frame");
    assert_eq!(pending.sample.quality, 100);
    assert_eq!(controller.status(), &CaptureStatus::Saving);
    assert!(!controller.is_scanning());
    assert_eq!(controller.renderer().frames.len(), 45);
}

#[test]
fn test_degraded_frame_resets_streak() {
    let mut controller = controller();
    let (source, _log) = ScriptedSource::new(Vec::new());
    controller.start(source).unwrap();

    for _ in 0..3 {
        controller.handle_frame(&good_frame());
    }
    assert_eq!(controller.session().consecutive_ready_frames(), 3);

    controller.handle_frame(&hidden_frame());
    assert_eq!(controller.session().consecutive_ready_frames(), 0);
    assert_eq!(controller.session().stage(), Stage::Positioning);
}

#[test]
fn test_no_person_resets_streak() {
    let mut controller = controller();
    let (source, _log) = ScriptedSource::new(Vec::new());
    controller.start(source).unwrap();

    for _ in 0..44 {
        assert!(controller.handle_frame(&good_frame()).is_none());
    }
    assert!(controller.handle_frame(&empty_frame()).is_none());
    assert_eq!(controller.session().consecutive_ready_frames(), 0);
    assert_eq!(controller.session().stage(), Stage::Positioning);

    let last = controller.renderer().frames.last().unwrap();
    assert!(!last.person);
    assert_eq!(last.countdown, None);

    // The streak starts over from zero.
    for _ in 0..44 {
        assert!(controller.handle_frame(&good_frame()).is_none());
    }
    assert!(controller.handle_frame(&good_frame()).is_some());
}

#[test]
fn test_stop_is_idempotent() {
    let mut controller = controller();
    controller.stop();
    controller.stop();
    assert_eq!(controller.session(), &ScanSession::new());
    assert_eq!(controller.status(), &CaptureStatus::Idle);

    let (source, log) = ScriptedSource::new(Vec::new());
    controller.start(source).unwrap();
    for _ in 0..10 {
        controller.handle_frame(&good_frame());
    }

    controller.stop();
    controller.stop();

    assert_eq!(log.borrow().stops, 1);
    assert_eq!(log.borrow().closes, 1);
    assert_eq!(controller.session(), &ScanSession::new());
    assert_eq!(controller.status(), &CaptureStatus::Idle);
}

#[test]
fn test_frames_after_stop_are_ignored() {
    let mut controller = controller();
    let (source, _log) = ScriptedSource::new(Vec::new());
    controller.start(source).unwrap();
    controller.stop();

    for _ in 0..50 {
        assert!(controller.handle_frame(&good_frame()).is_none());
    }
    assert!(controller.renderer().frames.is_empty());
    assert_eq!(controller.session(), &ScanSession::new());
}

#[test]
fn test_restart_releases_previous_source() {
    let mut controller = controller();
    let (first, first_log) = ScriptedSource::new(Vec::new());
    let (second, second_log) = ScriptedSource::new(Vec::new());

    controller.start(first).unwrap();
    for _ in 0..20 {
        controller.handle_frame(&good_frame());
    }
    controller.start(second).unwrap();

    assert_eq!(first_log.borrow().stops, 1);
    assert_eq!(first_log.borrow().closes, 1);
    assert_eq!(second_log.borrow().starts, 1);
    assert_eq!(second_log.borrow().options, Some(PoseOptions::default()));
    assert_eq!(controller.generation(), 2);
    assert_eq!(controller.session().consecutive_ready_frames(), 0);
}

#[test]
fn test_drop_releases_source() {
    let (source, log) = ScriptedSource::new(Vec::new());
    {
        let mut controller = controller();
        controller.start(source).unwrap();
        controller.handle_frame(&good_frame());
    }

    assert_eq!(log.borrow().stops, 1);
    assert_eq!(log.borrow().closes, 1);
}

#[tokio::test]
async fn test_end_of_stream_stops_session() {
    let mut controller = controller();
    let frames = std::iter::repeat_with(good_frame).take(10);
    let (source, log) = ScriptedSource::new(frames);
    controller.start(source).unwrap();

    while controller.is_scanning() {
        assert!(controller.poll().await.unwrap().is_none());
    }

    assert_eq!(log.borrow().closes, 1);
    assert_eq!(controller.status(), &CaptureStatus::Idle);
    assert_eq!(controller.renderer().frames.len(), 10);
}
