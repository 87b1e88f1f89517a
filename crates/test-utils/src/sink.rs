use std::sync::{Arc, Mutex};

use rmq_portable::output::{OutputEvent, OutputSink, StreamKind};

/// Sink that keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<OutputEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Text of the events on one stream, in arrival order.
    pub fn lines(&self, stream: StreamKind) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.stream == stream)
            .map(|e| e.text.clone())
            .collect()
    }

    pub fn contains(&self, stream: StreamKind, text: &str) -> bool {
        self.lines(stream).iter().any(|l| l == text)
    }

    /// Poll until `pred` holds, giving up after ~5 seconds.
    pub async fn wait_for<F>(&self, pred: F) -> bool
    where
        F: Fn(&[OutputEvent]) -> bool,
    {
        for _ in 0..250 {
            if pred(&self.events.lock().unwrap()) {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        false
    }
}

impl OutputSink for RecordingSink {
    fn on_line(&self, event: OutputEvent) {
        self.events.lock().unwrap().push(event);
    }
}
