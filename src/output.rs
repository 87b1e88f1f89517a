// src/output.rs

//! Output sink interface.
//!
//! The supervisor pushes every line the broker writes, plus its own start /
//! stop notices, into an [`OutputSink`]. Sinks are called from the stream
//! reader tasks, so implementations must be cheap and thread-safe; any
//! thread affinity a presentation layer needs is its own business.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

/// Which of the child's streams a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// One line of output, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub stream: StreamKind,
    pub text: String,
}

impl OutputEvent {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stderr,
            text: text.into(),
        }
    }
}

pub trait OutputSink: Send + Sync {
    fn on_line(&self, event: OutputEvent);
}

/// Forwards events into an unbounded tokio channel. Events sent after the
/// receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutputEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<OutputEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl OutputSink for ChannelSink {
    fn on_line(&self, event: OutputEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes broker stdout to our stdout and broker stderr to our stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn on_line(&self, event: OutputEvent) {
        // A closed terminal is not worth failing the reader task over.
        let _ = match event.stream {
            StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{}", event.text),
            StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{}", event.text),
        };
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn on_line(&self, _event: OutputEvent) {}
}

/// Swappable sink shared between the supervisor and its reader tasks.
///
/// Lines emitted while no sink is attached are dropped, never buffered.
#[derive(Clone, Default)]
pub struct SinkSlot {
    inner: Arc<RwLock<Option<Arc<dyn OutputSink>>>>,
}

impl SinkSlot {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(sink))),
        }
    }

    pub fn attach(&self, sink: Arc<dyn OutputSink>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(sink);
        }
    }

    pub fn detach(&self) -> Option<Arc<dyn OutputSink>> {
        self.inner.write().ok().and_then(|mut guard| guard.take())
    }

    pub fn is_attached(&self) -> bool {
        self.inner.read().map(|g| g.is_some()).unwrap_or(false)
    }

    pub fn emit(&self, event: OutputEvent) {
        // Clone the Arc out so the sink runs without holding the lock.
        let sink = self.inner.read().ok().and_then(|g| g.clone());
        if let Some(sink) = sink {
            sink.on_line(event);
        }
    }
}

impl fmt::Debug for SinkSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}
