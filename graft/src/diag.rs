//! Diagnostics for the best-effort copy operations.
//!
//! The copy operations never fail on a single bad property; they hand the
//! failure to a [`CopyDiagnostics`] sink and move on. The default sink logs
//! at debug level with a message naming the property path.

use std::sync::Mutex;

use graft_core::BeansError;

/// Receives per-property failures from the best-effort copy operations.
pub trait CopyDiagnostics: Send + Sync {
    /// A property was skipped. `property` is the full path of the property
    /// as addressed by the operation.
    fn property_skipped(&self, property: &str, error: &BeansError);
}

pub(crate) fn skip_message(property: &str) -> String {
    format!("An error occurred while copying the property :{property}")
}

/// The default sink: logs each skip at debug level, with the underlying
/// error at trace level.
pub struct LogDiagnostics;

impl CopyDiagnostics for LogDiagnostics {
    fn property_skipped(&self, property: &str, error: &BeansError) {
        log::debug!("{}", skip_message(property));
        log::trace!("{error}");
    }
}

/// A sink that records skips for inspection. Test support.
#[derive(Default)]
pub struct RecordingDiagnostics {
    skipped: Mutex<Vec<(String, String)>>,
}

impl RecordingDiagnostics {
    /// An empty recorder.
    pub fn new() -> Self {
        RecordingDiagnostics::default()
    }

    /// The property paths skipped so far, in order.
    pub fn skipped(&self) -> Vec<String> {
        self.entries().into_iter().map(|(p, _)| p).collect()
    }

    /// The messages the default sink would have logged.
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, m)| m).collect()
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.skipped
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CopyDiagnostics for RecordingDiagnostics {
    fn property_skipped(&self, property: &str, _error: &BeansError) {
        self.skipped
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((property.to_owned(), skip_message(property)));
    }
}
