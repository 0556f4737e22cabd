use std::sync::Arc;
use std::time::Instant;
use crate::common::{Detection, GuideConfig};
use crate::data::FrameReport;
use crate::speech::{GuidanceController, RelevancePolicy, SpeechOutput};

/// The consumer context. Owns all speech policy state and the last detection
/// list the renderer shows; every report from the worker goes through here.
#[derive(Debug)]
pub struct Announcer {
    speech: Arc<dyn SpeechOutput>,
    policy: RelevancePolicy,
    guidance: GuidanceController,
    last_detections: Vec<Detection>,
    auto_enabled: bool,
    hide_unknown: bool,
    detector_available: bool,
}

impl Announcer {
    pub fn new(config: &GuideConfig, speech: Arc<dyn SpeechOutput>, detector_available: bool) -> Self {
        Self {
            policy: RelevancePolicy::new(config),
            guidance: GuidanceController::new(config, Arc::clone(&speech)),
            speech,
            last_detections: Vec::new(),
            auto_enabled: false,
            hide_unknown: config.hide_unknown,
            detector_available,
        }
    }

    pub fn on_report(&mut self, report: &FrameReport) {
        self.on_detections_at(&report.detections, Instant::now())
    }

    pub fn on_detections_at(&mut self, detections: &[Detection], now: Instant) {
        let filtered: Vec<Detection> = detections
            .iter()
            .filter(|d| !self.hide_unknown || d.has_label)
            .cloned()
            .collect();

        // guidance has priority over ambient description, including on the
        // frame where it arrives and goes idle
        let guiding = self.guidance.is_active();
        self.guidance.on_detections_at(&filtered, now);

        if self.auto_enabled && !guiding {
            let picked = self.policy.pick_for_auto_speech_at(&filtered, now);
            if !picked.is_empty() {
                self.speech.speak(&RelevancePolicy::format_for_speech(&picked, true));
            }
        }
        self.last_detections = filtered;
    }

    /// Describes what is currently in view, on request.
    pub fn speak_now(&self) {
        let picked = self.policy.pick_for_manual_speech(&self.last_detections);
        log::info!("manual_speak dets={}", self.last_detections.len());
        if picked.is_empty() {
            self.speech.speak(if self.detector_available {
                "Nothing certain in view right now."
            } else {
                "Detection is not available."
            });
        } else {
            self.speech.speak(&RelevancePolicy::format_for_speech(&picked, true));
        }
    }

    /// Flips continuous mode and returns the new state.
    pub fn toggle_auto(&mut self) -> bool {
        self.auto_enabled = !self.auto_enabled;
        self.speech.speak(if self.auto_enabled {
            "Continuous announcements on."
        } else {
            "Continuous announcements off."
        });
        self.policy.reset_auto_state();
        log::info!("auto_toggle enabled={}", self.auto_enabled);
        self.auto_enabled
    }

    /// A second press ends a running search; otherwise starts one for `label`.
    pub fn toggle_find(&mut self, label: &str) {
        if self.guidance.is_active() {
            self.guidance.stop();
            return;
        }
        if label.trim().is_empty() {
            self.speech.speak("I did not catch that. Please try again.");
            return;
        }
        self.guidance.start(label);
    }

    pub fn set_hide_unknown(&mut self, hide_unknown: bool) {
        self.hide_unknown = hide_unknown;
        log::info!("hide_unknown={hide_unknown}");
    }

    pub fn set_detector_available(&mut self, available: bool) {
        self.detector_available = available;
    }

    /// The list the renderer should draw.
    pub fn last_detections(&self) -> &[Detection] {
        &self.last_detections
    }

    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    pub fn guidance(&self) -> &GuidanceController {
        &self.guidance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::common::GuideBox;
    use crate::speech::RecordingSpeech;

    fn setup(available: bool) -> (Arc<RecordingSpeech>, Announcer) {
        let speech = Arc::new(RecordingSpeech::new());
        let announcer = Announcer::new(&GuideConfig::default(), speech.clone(), available);
        (speech, announcer)
    }

    fn person() -> Detection {
        Detection::new("person", 0.9, GuideBox::new(0.4, 0.2, 0.6, 0.8), 1.5)
    }

    fn unknown() -> Detection {
        Detection::new("object", 0.7, GuideBox::new(0.0, 0.2, 0.2, 0.8), 2.0).with_has_label(false)
    }

    #[test]
    fn speak_now_without_detector() {
        let (speech, announcer) = setup(false);
        announcer.speak_now();
        assert_eq!(speech.last().unwrap(), "Detection is not available.");
    }

    #[test]
    fn speak_now_with_empty_view() {
        let (speech, announcer) = setup(true);
        announcer.speak_now();
        assert_eq!(speech.last().unwrap(), "Nothing certain in view right now.");
    }

    #[test]
    fn speak_now_describes_cached_view() {
        let (speech, mut announcer) = setup(true);
        announcer.on_detections_at(&[person()], Instant::now());
        assert!(speech.is_empty());
        announcer.speak_now();
        assert_eq!(speech.last().unwrap(), "person ahead, about 1.5 meters");
    }

    #[test]
    fn hide_unknown_filters_cache() {
        let (_, mut announcer) = setup(true);
        announcer.set_hide_unknown(true);
        announcer.on_detections_at(&[person(), unknown()], Instant::now());
        assert_eq!(announcer.last_detections().len(), 1);
        announcer.set_hide_unknown(false);
        announcer.on_detections_at(&[person(), unknown()], Instant::now());
        assert_eq!(announcer.last_detections().len(), 2);
    }

    #[test]
    fn auto_mode_announces_once() {
        let (speech, mut announcer) = setup(true);
        assert!(announcer.toggle_auto());
        let t0 = Instant::now();
        for i in 0..20u64 {
            announcer.on_detections_at(&[person()], t0 + Duration::from_millis(i * 250));
        }
        let described = speech.spoken().iter().filter(|s| s.starts_with("person")).count();
        assert_eq!(described, 1);
        assert!(!announcer.toggle_auto());
        assert_eq!(speech.last().unwrap(), "Continuous announcements off.");
    }

    #[test]
    fn guidance_silences_auto_mode() {
        let (speech, mut announcer) = setup(true);
        announcer.toggle_auto();
        announcer.toggle_find("cup");
        speech.clear();
        announcer.on_detections_at(&[person()], Instant::now());
        // only the not-found prompt, no ambient description
        assert_eq!(speech.spoken(), vec!["I don't see cup yet. Turn the phone slowly from side to side."]);
        announcer.toggle_find("");
        assert_eq!(speech.last().unwrap(), "Navigation cancelled.");
        assert!(!announcer.guidance().is_active());
    }

    #[test]
    fn arrival_is_the_last_word_in_auto_mode() {
        let (speech, mut announcer) = setup(true);
        announcer.toggle_auto();
        announcer.toggle_find("cup");
        let t0 = Instant::now();
        let cup = Detection::new("cup", 0.9, GuideBox::new(0.4, 0.4, 0.6, 0.6), 0.1);
        announcer.on_detections_at(&[cup.clone()], t0);
        assert_eq!(speech.last().unwrap(), "You found the cup.");
        assert!(!announcer.guidance().is_active());

        // ambient description resumes on the next frame
        announcer.on_detections_at(&[cup], t0 + Duration::from_millis(100));
        assert!(speech.last().unwrap().starts_with("cup ahead"));
    }
}
