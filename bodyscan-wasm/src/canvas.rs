use std::f64::consts::PI;

use bodyscan_core::landmarks::POSE_CONNECTIONS;
use bodyscan_core::overlay::{NO_PERSON_HINT, NO_PERSON_TITLE};
use bodyscan_core::{CapturePolicy, FrameView, LandmarkSet, QualityBand, Renderer, LANDMARK_COUNT};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const FONT: &str = "DM Sans,sans-serif";
const BONE_COLOR: &str = "rgba(232,115,74,.85)";
const JOINT_FILL: &str = "rgba(232,115,74,.9)";
const JOINT_RADIUS: f64 = 4.0;
const PANEL: Rect = Rect {
    x: 10.0,
    y: 10.0,
    w: 200.0,
    h: 70.0,
};
const PANEL_RADIUS: f64 = 10.0;
const GUIDANCE_BAR_HEIGHT: f64 = 46.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Landmark position on a selfie-mirrored canvas.
pub fn mirrored_point(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    ((1.0 - x) * width, y * height)
}

/// Skeleton bones in canvas pixels, mirrored to match the video.
pub fn skeleton_segments(
    landmarks: &LandmarkSet,
    width: f64,
    height: f64,
) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    POSE_CONNECTIONS.iter().map(move |&(a, b)| {
        let (a, b) = (&landmarks[a], &landmarks[b]);
        (
            mirrored_point(a.x, a.y, width, height),
            mirrored_point(b.x, b.y, width, height),
        )
    })
}

pub fn points_label(visible_count: u8) -> String {
    format!("{}/{} pts", visible_count, LANDMARK_COUNT)
}

pub fn guidance_bar(width: f64, height: f64) -> Rect {
    Rect {
        x: 0.0,
        y: height - GUIDANCE_BAR_HEIGHT,
        w: width,
        h: GUIDANCE_BAR_HEIGHT,
    }
}

/// Draws the live overlay on top of the video frame already on the canvas.
pub struct CanvasOverlay {
    context: CanvasRenderingContext2d,
    policy: CapturePolicy,
    width: f64,
    height: f64,
}

impl CanvasOverlay {
    pub fn new(context: CanvasRenderingContext2d, policy: CapturePolicy) -> Self {
        Self {
            context,
            policy,
            width: 640.0,
            height: 480.0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn draw_skeleton(&self, landmarks: &LandmarkSet) -> Result<(), JsValue> {
        let ctx = &self.context;

        ctx.set_stroke_style_str(BONE_COLOR);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        for ((x1, y1), (x2, y2)) in skeleton_segments(landmarks, self.width, self.height) {
            ctx.move_to(x1, y1);
            ctx.line_to(x2, y2);
        }
        ctx.stroke();

        ctx.set_fill_style_str(JOINT_FILL);
        ctx.set_stroke_style_str("#fff");
        ctx.set_line_width(1.0);
        for point in landmarks.iter() {
            let (x, y) = mirrored_point(point.x, point.y, self.width, self.height);
            ctx.begin_path();
            ctx.arc(x, y, JOINT_RADIUS, 0.0, 2.0 * PI)?;
            ctx.fill();
            ctx.stroke();
        }
        Ok(())
    }

    fn rounded_rect(&self, rect: Rect, r: f64) {
        let ctx = &self.context;
        let Rect { x, y, w, h } = rect;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        ctx.line_to(x + w - r, y);
        ctx.quadratic_curve_to(x + w, y, x + w, y + r);
        ctx.line_to(x + w, y + h - r);
        ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        ctx.line_to(x + r, y + h);
        ctx.quadratic_curve_to(x, y + h, x, y + h - r);
        ctx.line_to(x, y + r);
        ctx.quadratic_curve_to(x, y, x + r, y);
        ctx.close_path();
    }

    fn draw_status(&self, view: &FrameView<'_>) -> Result<(), JsValue> {
        let ctx = &self.context;
        let band = QualityBand::from_quality(view.quality, &self.policy);

        ctx.set_fill_style_str("rgba(20,20,40,.72)");
        self.rounded_rect(PANEL, PANEL_RADIUS);
        ctx.fill();

        ctx.set_text_align("left");
        ctx.set_fill_style_str("rgba(255,255,255,.55)");
        ctx.set_font(&format!("10px {}", FONT));
        ctx.fill_text("POSE QUALITY", PANEL.x + 8.0, PANEL.y + 17.0)?;

        ctx.set_fill_style_str(band.color());
        ctx.set_font(&format!("bold 30px {}", FONT));
        ctx.fill_text(&format!("{}%", view.quality), PANEL.x + 8.0, PANEL.y + 48.0)?;

        ctx.set_fill_style_str("rgba(255,255,255,.45)");
        ctx.set_font(&format!("10px {}", FONT));
        ctx.fill_text(&points_label(view.visible_count), PANEL.x + 80.0, PANEL.y + 54.0)?;

        let bar = guidance_bar(self.width, self.height);
        ctx.set_fill_style_str("rgba(0,0,0,.52)");
        ctx.fill_rect(bar.x, bar.y, bar.w, bar.h);

        ctx.set_fill_style_str(band.color());
        ctx.set_font(&format!("bold 13px {}", FONT));
        ctx.set_text_align("center");
        ctx.fill_text(band.guidance(), self.width / 2.0, self.height - 18.0)?;
        Ok(())
    }

    fn draw_no_person(&self) -> Result<(), JsValue> {
        let ctx = &self.context;
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);

        ctx.set_fill_style_str("rgba(0,0,0,.4)");
        ctx.fill_rect(0.0, 0.0, self.width, self.height);

        ctx.set_text_align("center");
        ctx.set_fill_style_str("#fff");
        ctx.set_font(&format!("bold 20px {}", FONT));
        ctx.fill_text(NO_PERSON_TITLE, cx, cy - 12.0)?;

        ctx.set_fill_style_str("rgba(255,255,255,.7)");
        ctx.set_font(&format!("14px {}", FONT));
        ctx.fill_text(NO_PERSON_HINT, cx, cy + 16.0)?;
        Ok(())
    }
}

impl Renderer for CanvasOverlay {
    type Error = JsValue;

    fn render(&mut self, view: &FrameView<'_>) -> Result<(), JsValue> {
        match view.landmarks {
            Some(landmarks) => {
                self.draw_skeleton(landmarks)?;
                self.draw_status(view)
            }
            None => self.draw_no_person(),
        }
    }
}
