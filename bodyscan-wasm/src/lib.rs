mod canvas;

pub use canvas::CanvasOverlay;

use bodyscan_core::{CapturePolicy, CaptureSample, FrameView, LandmarkSet, Renderer, ScanPipeline};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;

/// Browser side of a live body scan.
///
/// JavaScript runs the pose engine and hands each result to
/// [`BodyScanner::process_frame`] as a flat `[x, y, z, visibility] × 33`
/// array (empty when nobody is in view). The scanner draws the mirrored
/// video with its overlay and, exactly once per session, returns the
/// capture sample to submit.
#[wasm_bindgen]
pub struct BodyScanner {
    pipeline: ScanPipeline,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    overlay: CanvasOverlay,
    quality: u8,
    visible_count: u8,
    countdown: Option<u32>,
}

#[wasm_bindgen]
impl BodyScanner {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<BodyScanner, JsValue> {
        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let policy = CapturePolicy::default();
        console_log!(
            "Body scanner ready: capture after {} frames at quality {}%",
            policy.ready_frames,
            policy.ready_quality
        );

        Ok(BodyScanner {
            pipeline: ScanPipeline::new(policy),
            overlay: CanvasOverlay::new(context.clone(), policy),
            canvas,
            context,
            quality: 0,
            visible_count: 0,
            countdown: None,
        })
    }

    /// Process one pose result. Returns `null`, or the capture sample on
    /// the frame that completes the hold. Frames after a capture only show
    /// the video until [`BodyScanner::reset`].
    pub fn process_frame(&mut self, data: &[f64], video: &HtmlVideoElement) -> Result<JsValue, JsValue> {
        let (width, height) = frame_size(video.video_width(), video.video_height());
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let (width, height) = (width as f64, height as f64);
        self.overlay.resize(width, height);

        self.draw_video(video, width, height)?;

        let landmarks = if data.is_empty() {
            None
        } else {
            Some(LandmarkSet::from_flat(data).ok_or("expected 33 landmarks of [x, y, z, visibility]")?)
        };

        let Some(report) = self.pipeline.process(landmarks.as_ref(), width) else {
            return Ok(JsValue::NULL);
        };

        let reading = report.reading.unwrap_or_default();
        self.quality = reading.quality;
        self.visible_count = reading.visible_count;
        self.countdown = report.countdown;

        self.overlay.render(&FrameView {
            stage: report.stage,
            quality: reading.quality,
            visible_count: reading.visible_count,
            countdown: report.countdown,
            landmarks: landmarks.as_ref(),
        })?;

        match report.capture {
            Some(sample) => {
                console_log!("Pose held, capturing (quality {}%)", sample.quality);
                sample_to_js(&sample)
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Camera off. Clears the streak and any capture latch.
    pub fn stop(&mut self) {
        self.reset();
        console_log!("Body scan stopped");
    }

    /// Start a fresh session; the next completed hold captures again.
    pub fn reset(&mut self) {
        self.pipeline.reset();
        self.quality = 0;
        self.visible_count = 0;
        self.countdown = None;
    }

    pub fn stage(&self) -> String {
        self.pipeline.session().stage().label().to_string()
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn visible_count(&self) -> u8 {
        self.visible_count
    }

    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn captured(&self) -> bool {
        self.pipeline.session().captured()
    }
}

impl BodyScanner {
    fn draw_video(&self, video: &HtmlVideoElement, width: f64, height: f64) -> Result<(), JsValue> {
        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, width, height);
        ctx.save();
        let drawn = ctx
            .scale(-1.0, 1.0)
            .and_then(|_| ctx.translate(-width, 0.0))
            .and_then(|_| ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, width, height));
        ctx.restore();
        drawn
    }
}

fn frame_size(video_width: u32, video_height: u32) -> (u32, u32) {
    match (video_width, video_height) {
        (0, _) | (_, 0) => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        size => size,
    }
}

/// Keys match the capture request body so JS can merge it with the profile.
fn sample_to_js(sample: &CaptureSample) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let features = &sample.features;
    for (key, value) in [
        ("waist_hip_ratio", features.waist_hip_ratio),
        ("shoulder_waist_ratio", features.shoulder_waist_ratio),
        ("torso_leg_ratio", features.torso_leg_ratio),
        ("body_aspect_ratio", features.body_aspect_ratio),
        ("pose_quality", sample.quality as f64),
    ] {
        js_sys::Reflect::set(&obj, &key.into(), &value.into())?;
    }
    Ok(obj.into())
}
