#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use bodyscan_client::{LandmarkSource, PoseFrame, PoseOptions, SourceError};
use bodyscan_core::landmarks::{
    LEFT_ANKLE, LEFT_HIP, LEFT_SHOULDER, NOSE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_SHOULDER,
};
use bodyscan_core::{FrameView, Landmark, LandmarkSet, Renderer, Stage, LANDMARK_COUNT};
use bodyscan_shared::{CaptureProfile, Gender, UserProfile};
use serde_json::{json, Value};

/// A standing subject, fully visible, shoulders 160 px apart on a 640 px
/// frame. Scores 100.
pub fn standing_pose() -> LandmarkSet {
    let mut set = LandmarkSet::new([Landmark::new(0.5, 0.5, 0.0, 0.95); LANDMARK_COUNT]);
    set[NOSE] = Landmark::new(0.50, 0.10, 0.0, 0.99);
    set[LEFT_SHOULDER] = Landmark::new(0.375, 0.30, 0.0, 0.99);
    set[RIGHT_SHOULDER] = Landmark::new(0.625, 0.30, 0.0, 0.99);
    set[LEFT_HIP] = Landmark::new(0.42, 0.55, 0.0, 0.97);
    set[RIGHT_HIP] = Landmark::new(0.58, 0.55, 0.0, 0.97);
    set[LEFT_ANKLE] = Landmark::new(0.45, 0.95, 0.0, 0.9);
    set[RIGHT_ANKLE] = Landmark::new(0.55, 0.95, 0.0, 0.9);
    set
}

/// Same subject with most of the body hidden and too close to the camera.
pub fn hidden_pose() -> LandmarkSet {
    let mut set = standing_pose();
    for point in 0..LANDMARK_COUNT {
        set[point].visibility = 0.1;
    }
    set[LEFT_SHOULDER].x = 0.1;
    set[RIGHT_SHOULDER].x = 0.9;
    set
}

pub fn good_frame() -> PoseFrame {
    PoseFrame::new(640, 480, Some(standing_pose()))
}

pub fn hidden_frame() -> PoseFrame {
    PoseFrame::new(640, 480, Some(hidden_pose()))
}

pub fn empty_frame() -> PoseFrame {
    PoseFrame::new(640, 480, None)
}

/// One recorded pose result, as a line of a landmark stream.
pub fn frame_line(pose: &LandmarkSet) -> String {
    json!({ "width": 640, "height": 480, "landmarks": pose.points().as_slice() }).to_string()
}

pub fn capture_profile() -> CaptureProfile {
    let profile = UserProfile {
        id: "u1".to_string(),
        age: Some(34),
        gender: Some(Gender::Male),
        height: Some(178.0),
        weight: Some(82.0),
        ..UserProfile::default()
    };
    CaptureProfile::from_profile("u1", &profile, None).expect("complete profile")
}

pub fn analysis_body(scan_id: &str) -> Value {
    json!({
        "bmi": 25.9,
        "category": "overweight",
        "confidence": 88,
        "nutrition_plan": {
            "body_metrics": {
                "weight_kg": 82.0, "height_cm": 178.0, "bmi": 25.9,
                "category": "overweight", "age": 34, "gender": "male"
            },
            "energy_expenditure": { "bmr": 1790, "tdee": 2775, "activity_level": "moderate" },
            "daily_targets": {
                "calories": 2275, "protein_g": 164, "carbs_g": 228,
                "fats_g": 76, "fiber_g": 32, "water_ml": 2870
            },
            "macronutrient_distribution": { "protein_pct": 29, "carbs_pct": 40, "fats_pct": 30 },
            "recommendations": ["Aim for a 500 kcal daily deficit"]
        },
        "scan_id": scan_id,
        "scanned_at": "2026-10-19T09:30:00Z"
    })
}

pub fn history_body() -> Value {
    json!({
        "scans": [
            {
                "scan_id": "older", "scanned_at": "2026-09-01T08:00:00Z",
                "bmi": 26.4, "category": "overweight", "confidence": 80,
                "inputs": { "height_cm": 178.0, "weight_kg": 83.5, "age": 34,
                            "gender": "male", "activity_level": "moderate" }
            },
            {
                "scan_id": "newest", "scanned_at": "2026-10-19T09:30:00Z",
                "bmi": 25.9, "category": "overweight", "confidence": 88, "pose_quality": 100,
                "nutrition_plan": { "daily_targets": {
                    "calories": 2275, "protein_g": 164, "carbs_g": 228,
                    "fats_g": 76, "fiber_g": 32, "water_ml": 2870
                } }
            }
        ],
        "count": 2
    })
}

/// What happened to a [`ScriptedSource`], shared with the test body.
#[derive(Debug, Default)]
pub struct SourceLog {
    pub starts: usize,
    pub stops: usize,
    pub closes: usize,
    pub options: Option<PoseOptions>,
}

/// In-memory landmark source that records its lifecycle calls.
pub struct ScriptedSource {
    frames: VecDeque<PoseFrame>,
    log: Rc<RefCell<SourceLog>>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = PoseFrame>) -> (Self, Rc<RefCell<SourceLog>>) {
        let log = Rc::new(RefCell::new(SourceLog::default()));
        let source = Self {
            frames: frames.into_iter().collect(),
            log: Rc::clone(&log),
        };
        (source, log)
    }
}

impl LandmarkSource for ScriptedSource {
    fn start(&mut self, options: &PoseOptions) -> Result<(), SourceError> {
        let mut log = self.log.borrow_mut();
        log.starts += 1;
        log.options = Some(*options);
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<PoseFrame>, SourceError> {
        Ok(self.frames.pop_front())
    }

    fn stop(&mut self) {
        self.log.borrow_mut().stops += 1;
    }

    fn close(&mut self) {
        self.log.borrow_mut().closes += 1;
    }
}

/// One entry per rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub stage: Stage,
    pub quality: u8,
    pub visible_count: u8,
    pub countdown: Option<u32>,
    pub person: bool,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Rendered>,
}

impl Renderer for RecordingRenderer {
    type Error = Infallible;

    fn render(&mut self, view: &FrameView<'_>) -> Result<(), Infallible> {
        self.frames.push(Rendered {
            stage: view.stage,
            quality: view.quality,
            visible_count: view.visible_count,
            countdown: view.countdown,
            person: view.landmarks.is_some(),
        });
        Ok(())
    }
}
