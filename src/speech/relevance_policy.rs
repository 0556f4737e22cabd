use std::collections::HashMap;
use std::time::{Duration, Instant};
use crate::common::{Detection, GuideConfig};

const SCORE_WEIGHT: f32 = 0.65;
const CENTER_WEIGHT: f32 = 0.15;
const PROXIMITY_WEIGHT: f32 = 0.20;
const PROXIMITY_FLOOR_M: f32 = 0.3;

/// Decides which detections are worth mentioning, on demand and in
/// continuous mode.
///
/// Continuous mode is rate limited three ways: a global minimum interval
/// between announcements, a signature of the last announcement so an
/// unchanged scene is not repeated, and a per-label cooldown.
#[derive(Debug, Clone)]
pub struct RelevancePolicy {
    global_interval: Duration,
    label_cooldown: Duration,
    manual_pick_count: usize,
    auto_pick_count: usize,
    last_global_spoken: Option<Instant>,
    last_spoken_per_label: HashMap<String, Instant>,
    last_signature: String,
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self::new(&GuideConfig::default())
    }
}

impl RelevancePolicy {
    pub fn new(config: &GuideConfig) -> Self {
        Self {
            global_interval: config.global_speech_interval(),
            label_cooldown: config.label_cooldown(),
            manual_pick_count: config.manual_pick_count,
            auto_pick_count: config.auto_pick_count,
            last_global_spoken: None,
            last_spoken_per_label: HashMap::new(),
            last_signature: String::new(),
        }
    }

    /// Clears cooldowns and the last signature. Call whenever continuous mode
    /// is switched.
    pub fn reset_auto_state(&mut self) {
        self.last_global_spoken = None;
        self.last_spoken_per_label.clear();
        self.last_signature.clear();
    }

    pub fn relevance(d: &Detection) -> f32 {
        let proximity = 1. / d.distance_m.max(PROXIMITY_FLOOR_M);
        d.confidence * SCORE_WEIGHT + d.centering() * CENTER_WEIGHT + proximity * PROXIMITY_WEIGHT
    }

    /// Most relevant first; equal scores keep their input order.
    fn ranked<'a>(&self, dets: &'a [Detection], n: usize) -> Vec<&'a Detection> {
        let mut scored: Vec<(f32, &Detection)> = dets.iter().map(|d| (Self::relevance(d), d)).collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(n).map(|(_, d)| d).collect()
    }

    /// Up to four detections for an explicit "what is around me" request.
    /// No cooldown applies.
    pub fn pick_for_manual_speech(&self, dets: &[Detection]) -> Vec<Detection> {
        self.ranked(dets, self.manual_pick_count).into_iter().cloned().collect()
    }

    pub fn pick_for_auto_speech(&mut self, dets: &[Detection]) -> Vec<Detection> {
        self.pick_for_auto_speech_at(dets, Instant::now())
    }

    pub fn pick_for_auto_speech_at(&mut self, dets: &[Detection], now: Instant) -> Vec<Detection> {
        if let Some(last) = self.last_global_spoken {
            if now.saturating_duration_since(last) < self.global_interval {
                return Vec::new();
            }
        }

        let top = self.ranked(dets, self.auto_pick_count);
        let signature = Self::signature(&top);
        if signature == self.last_signature {
            return Vec::new();
        }

        let cooldown = self.label_cooldown;
        let filtered: Vec<Detection> = top
            .into_iter()
            .filter(|d| match self.last_spoken_per_label.get(&d.label) {
                Some(last) => now.saturating_duration_since(*last) >= cooldown,
                None => true,
            })
            .cloned()
            .collect();
        if filtered.is_empty() {
            return Vec::new();
        }

        self.last_signature = signature;
        self.last_global_spoken = Some(now);
        for d in &filtered {
            self.last_spoken_per_label.insert(d.label.clone(), now);
        }
        log::debug!("auto_speech picked={} signature={}", filtered.len(), self.last_signature);
        filtered
    }

    /// `label:position:bucket` of each detection, joined by `|`.
    fn signature(top: &[&Detection]) -> String {
        top.iter()
            .map(|d| format!("{}:{}:{}", d.label, d.position.as_str(), d.distance_bucket()))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// One sentence per detection, e.g. `chair on the left, about 1.4 meters`.
    pub fn format_for_speech(dets: &[Detection], with_positions: bool) -> String {
        dets.iter()
            .map(|d| {
                let distance = if d.distance_m < 2.0 {
                    format!("about {:.1} meters", d.distance_m)
                } else {
                    format!("about {:.0} meters", d.distance_m)
                };
                if with_positions {
                    format!("{} {}, {}", d.label, d.position.spoken(), distance)
                } else {
                    format!("{}, {}", d.label, distance)
                }
            })
            .collect::<Vec<_>>()
            .join(". ")
    }
}
