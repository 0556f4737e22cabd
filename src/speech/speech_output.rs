use parking_lot::Mutex;

/// Sink for finished sentences. Each call replaces whatever was being spoken;
/// there is no completion acknowledgement.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

impl std::fmt::Debug for dyn SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn SpeechOutput")
    }
}

/// Writes every sentence to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeech;

impl SpeechOutput for LogSpeech {
    fn speak(&self, text: &str) {
        log::info!("speak: {text}");
    }
}

/// Keeps every sentence in order. Used by the replay tool and by tests.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.spoken.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.spoken.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spoken.lock().is_empty()
    }

    pub fn clear(&self) {
        self.spoken.lock().clear();
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str) {
        log::debug!("speak: {text}");
        self.spoken.lock().push(text.to_string());
    }
}
