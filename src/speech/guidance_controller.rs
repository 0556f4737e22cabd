use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::common::{Detection, GuideConfig};
use crate::speech::SpeechOutput;

// steering band, tighter than the descriptive position zones
const STEER_LEFT_X2: f32 = 0.45;
const STEER_RIGHT_X1: f32 = 0.55;
const PROXIMITY_FLOOR_M: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steering {
    Left,
    Right,
    Centered,
}

impl Steering {
    pub fn classify(d: &Detection) -> Self {
        if d.bbox.x2 < STEER_LEFT_X2 {
            Steering::Left
        } else if d.bbox.x1 > STEER_RIGHT_X1 {
            Steering::Right
        } else {
            Steering::Centered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Steering::Left => "is on the left",
            Steering::Right => "is on the right",
            Steering::Centered => "is straight ahead",
        }
    }
}

#[derive(Debug, Default, Clone)]
struct GuidanceState {
    target: Option<String>,
    last_prompt: Option<Instant>,
    last_update: Option<Instant>,
    last_spoken: String,
}

/// Single-target seeking state machine: Idle until [`start`](Self::start),
/// Seeking until [`stop`](Self::stop) or arrival.
#[derive(Debug)]
pub struct GuidanceController {
    speech: Arc<dyn SpeechOutput>,
    update_interval: Duration,
    prompt_interval: Duration,
    arrival_distance_m: f32,
    near_distance_m: f32,
    state: GuidanceState,
}

impl GuidanceController {
    pub fn new(config: &GuideConfig, speech: Arc<dyn SpeechOutput>) -> Self {
        Self {
            speech,
            update_interval: config.guidance_update_interval(),
            prompt_interval: config.not_found_prompt_interval(),
            arrival_distance_m: config.arrival_distance_m,
            near_distance_m: config.near_distance_m,
            state: GuidanceState::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.target.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.state.target.as_deref()
    }

    pub fn start(&mut self, label: &str) {
        let label = label.trim();
        self.state = GuidanceState {
            target: Some(label.to_string()),
            ..Default::default()
        };
        log::info!("guidance_start target={label}");
        self.speech
            .speak(&format!("Looking for {label}. Move the phone slowly until it comes into view."));
    }

    /// Announces cancellation only when a search was running.
    pub fn stop(&mut self) {
        if self.is_active() {
            self.speech.speak("Navigation cancelled.");
            log::info!("guidance_stop");
        }
        self.state = GuidanceState::default();
    }

    fn relevance(d: &Detection) -> f32 {
        let proximity = 1. / d.distance_m.max(PROXIMITY_FLOOR_M);
        d.confidence * 0.6 + d.centering() * 0.2 + proximity * 0.2
    }

    pub fn on_detections(&mut self, dets: &[Detection]) {
        self.on_detections_at(dets, Instant::now())
    }

    pub fn on_detections_at(&mut self, dets: &[Detection], now: Instant) {
        let Some(target) = self.state.target.clone() else {
            return;
        };
        if let Some(last) = self.state.last_update {
            if now.saturating_duration_since(last) < self.update_interval {
                return;
            }
        }
        self.state.last_update = Some(now);

        let wanted = target.to_lowercase();
        // first of equally relevant matches wins
        let best = dets
            .iter()
            .filter(|d| d.label.to_lowercase() == wanted)
            .fold(None::<&Detection>, |best, d| match best {
                Some(b) if Self::relevance(d) <= Self::relevance(b) => Some(b),
                _ => Some(d),
            });

        let Some(d) = best else {
            let due = self
                .state
                .last_prompt
                .map_or(true, |last| now.saturating_duration_since(last) > self.prompt_interval);
            if due {
                self.state.last_prompt = Some(now);
                self.speech
                    .speak(&format!("I don't see {target} yet. Turn the phone slowly from side to side."));
            }
            return;
        };

        let steering = Steering::classify(d);
        let action = match steering {
            Steering::Left => "Turn a little to the left.",
            Steering::Right => "Turn a little to the right.",
            Steering::Centered if d.distance_m > self.near_distance_m => "Move closer.",
            Steering::Centered => "You are there.",
        };
        let centimeters = ((d.distance_m * 100.) as i64).max(1);
        let sentence = format!("{} {}, about {} centimeters. {}", target, steering.as_str(), centimeters, action);

        if sentence != self.state.last_spoken {
            self.speech.speak(&sentence);
            self.state.last_spoken = sentence;
        }

        if d.distance_m < self.arrival_distance_m && d.bbox.straddles(STEER_LEFT_X2, STEER_RIGHT_X1) {
            log::info!("guidance_arrived target={target}");
            self.speech.speak(&format!("You found the {target}."));
            self.state = GuidanceState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GuideBox;
    use crate::speech::RecordingSpeech;

    fn setup() -> (Arc<RecordingSpeech>, GuidanceController) {
        let speech = Arc::new(RecordingSpeech::new());
        let controller = GuidanceController::new(&GuideConfig::default(), speech.clone());
        (speech, controller)
    }

    fn cup(x1: f32, x2: f32, distance_m: f32) -> Detection {
        Detection::new("cup", 0.8, GuideBox::new(x1, 0.4, x2, 0.6), distance_m)
    }

    #[test]
    fn idle_ignores_detections() {
        let (speech, mut g) = setup();
        g.on_detections_at(&[cup(0.4, 0.6, 0.1)], Instant::now());
        assert!(speech.is_empty());
        assert!(!g.is_active());
    }

    #[test]
    fn steers_toward_target() {
        let (speech, mut g) = setup();
        let t0 = Instant::now();
        g.start("Cup");
        g.on_detections_at(&[cup(0.1, 0.3, 1.234)], t0);
        assert_eq!(
            speech.last().unwrap(),
            "Cup is on the left, about 123 centimeters. Turn a little to the left."
        );
        g.on_detections_at(&[cup(0.6, 0.8, 1.0)], t0 + Duration::from_millis(900));
        assert_eq!(
            speech.last().unwrap(),
            "Cup is on the right, about 100 centimeters. Turn a little to the right."
        );
        g.on_detections_at(&[cup(0.4, 0.6, 1.0)], t0 + Duration::from_millis(1_800));
        assert_eq!(
            speech.last().unwrap(),
            "Cup is straight ahead, about 100 centimeters. Move closer."
        );
    }

    #[test]
    fn updates_are_throttled() {
        let (speech, mut g) = setup();
        let t0 = Instant::now();
        g.start("cup");
        let before = speech.len();
        for i in 0..9u64 {
            let x1 = 0.05 + i as f32 * 0.01;
            g.on_detections_at(&[cup(x1, x1 + 0.1, 2.0)], t0 + Duration::from_millis(i * 100));
        }
        assert_eq!(speech.len(), before + 1);
    }

    #[test]
    fn unchanged_sentence_is_not_repeated() {
        let (speech, mut g) = setup();
        let t0 = Instant::now();
        g.start("cup");
        for i in 0..5u64 {
            g.on_detections_at(&[cup(0.1, 0.3, 1.5)], t0 + Duration::from_secs(i));
        }
        assert_eq!(speech.len(), 2);
    }

    #[test]
    fn not_found_prompt_is_rate_limited() {
        let (speech, mut g) = setup();
        let t0 = Instant::now();
        g.start("cup");
        for i in 0..6u64 {
            g.on_detections_at(&[], t0 + Duration::from_millis(i * 1_000));
        }
        let prompts = speech.spoken().iter().filter(|s| s.starts_with("I don't see cup")).count();
        // t=0, t=3s (2.5 s must be exceeded)
        assert_eq!(prompts, 2);
    }

    #[test]
    fn arrival_completes_once() {
        let (speech, mut g) = setup();
        let t0 = Instant::now();
        g.start("cup");
        let path = [(0.1, 0.3, 1.5), (0.3, 0.5, 0.9), (0.4, 0.6, 0.5), (0.42, 0.58, 0.2), (0.42, 0.58, 0.1)];
        for (i, &(x1, x2, d)) in path.iter().enumerate() {
            g.on_detections_at(&[cup(x1, x2, d)], t0 + Duration::from_secs(i as u64));
        }
        let done = speech.spoken().iter().filter(|s| s.as_str() == "You found the cup.").count();
        assert_eq!(done, 1);
        assert!(!g.is_active());
        assert!(!speech.spoken().iter().any(|s| s == "Navigation cancelled."));
    }

    #[test]
    fn stop_is_silent_when_idle() {
        let (speech, mut g) = setup();
        g.stop();
        assert!(speech.is_empty());
        g.start("cup");
        g.stop();
        assert_eq!(speech.last().unwrap(), "Navigation cancelled.");
        assert!(g.target().is_none());
    }

    #[test]
    fn prefers_the_closer_match() {
        let (speech, mut g) = setup();
        g.start("cup");
        g.on_detections_at(&[cup(0.1, 0.2, 3.0), cup(0.7, 0.9, 0.5)], Instant::now());
        assert!(speech.last().unwrap().contains("is on the right"));
    }
}
