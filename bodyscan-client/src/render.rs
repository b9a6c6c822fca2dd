use std::convert::Infallible;

use bodyscan_core::overlay::{NO_PERSON_HINT, NO_PERSON_TITLE};
use bodyscan_core::{CapturePolicy, FrameView, QualityBand, Renderer, Stage, StageBadge};

/// Terminal stand-in for the canvas overlay. Logs whenever what the user
/// would see changes; every frame goes to the debug log.
#[derive(Debug, Default)]
pub struct LogRenderer {
    policy: CapturePolicy,
    last: Option<(bool, Stage, Option<u32>)>,
    frames: u64,
}

impl LogRenderer {
    pub fn new(policy: CapturePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    type Error = Infallible;

    fn render(&mut self, view: &FrameView<'_>) -> Result<(), Infallible> {
        self.frames += 1;

        let person = view.landmarks.is_some();
        let key = (person, view.stage, view.countdown);
        let changed = self.last != Some(key);
        self.last = Some(key);

        if !person {
            if changed {
                log::info!("{} · {}", NO_PERSON_TITLE, NO_PERSON_HINT);
            }
            return Ok(());
        }

        let badge = StageBadge {
            stage: view.stage,
            countdown: view.countdown,
        };
        let guidance = QualityBand::from_quality(view.quality, &self.policy).guidance();

        if changed {
            log::info!(
                "[{}] quality {}% · {}/33 pts · {}",
                badge,
                view.quality,
                view.visible_count,
                guidance
            );
        } else {
            log::debug!("quality {}% · {}/33 pts", view.quality, view.visible_count);
        }

        Ok(())
    }
}
