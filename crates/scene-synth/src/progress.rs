//! Per-item progress reporting.
//!
//! The generator reports exactly one [`ProgressEvent`] per attempted item
//! to a caller-supplied [`ProgressSink`]. Presentation is the sink's
//! business: log it, print it, forward it to a UI, or collect it.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use crate::FailureKind;

/// Outcome of one generation attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    Generated {
        index: usize,
        image: PathBuf,
        annotation: PathBuf,
    },
    Failed {
        index: usize,
        kind: FailureKind,
        message: String,
    },
}

impl ProgressEvent {
    pub fn index(&self) -> usize {
        match self {
            Self::Generated { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated { index, image, .. } => {
                let name = image
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_else(|| image.to_string_lossy());
                write!(f, "[{index}] generated {name}")
            }
            Self::Failed {
                index,
                kind,
                message,
            } => write!(f, "[{index}] {kind:?} failure: {message}"),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    fn report(&mut self, event: &ProgressEvent);
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(&mut self, event: &ProgressEvent) {
        (**self).report(event)
    }
}

/// Forwards events to the `log` facade: successes at `info`, failures at
/// `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&mut self, event: &ProgressEvent) {
        if event.is_success() {
            log::info!("{event}");
        } else {
            log::warn!("{event}");
        }
    }
}

/// Writes one line per event to any writer (stdout, a file, a buffer).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ProgressSink for WriterSink<W> {
    fn report(&mut self, event: &ProgressEvent) {
        if let Err(err) = writeln!(self.writer, "{event}") {
            log::warn!("progress sink write failed: {err}");
        }
    }
}

/// Calls a closure with the human-readable status line of each event.
pub struct CallbackSink<F: FnMut(&str)>(pub F);

impl<F: FnMut(&str)> ProgressSink for CallbackSink<F> {
    fn report(&mut self, event: &ProgressEvent) {
        (self.0)(&event.to_string())
    }
}

/// Keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct CollectSink {
    pub events: Vec<ProgressEvent>,
}

impl CollectSink {
    pub fn failures(&self) -> impl Iterator<Item = &ProgressEvent> {
        self.events.iter().filter(|e| !e.is_success())
    }
}

impl ProgressSink for CollectSink {
    fn report(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}
