//! Pipeline messages and the observers that receive them
//!
//! Filters and the dispatcher never print. They build a [`PipelineMessage`]
//! and hand it to an [`Observer`], which decides where it goes: a
//! [`MessageCollector`] keeps it for inspection, a [`TracingObserver`]
//! forwards it to `tracing`.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::SimplResult;

/// Kind of a pipeline message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Error,
    Warning,
    Status,
    Progress,
}

/// One message emitted by a filter, the dispatcher or the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMessage {
    pub kind: MessageKind,
    /// Who sent it, usually the filter's human label
    pub prefix: String,
    pub text: String,
    /// Negative for errors and warnings, 0 otherwise
    pub code: i32,
    /// Percent complete for progress messages
    pub progress: Option<u8>,
}

impl PipelineMessage {
    pub fn error(prefix: impl Into<String>, text: impl Into<String>, code: i32) -> Self {
        Self {
            kind: MessageKind::Error,
            prefix: prefix.into(),
            text: text.into(),
            code,
            progress: None,
        }
    }

    pub fn warning(prefix: impl Into<String>, text: impl Into<String>, code: i32) -> Self {
        Self {
            kind: MessageKind::Warning,
            prefix: prefix.into(),
            text: text.into(),
            code,
            progress: None,
        }
    }

    pub fn status(prefix: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Status,
            prefix: prefix.into(),
            text: text.into(),
            code: 0,
            progress: None,
        }
    }

    /// Progress message, `percent` is clamped to 100
    pub fn progress(prefix: impl Into<String>, text: impl Into<String>, percent: u8) -> Self {
        Self {
            kind: MessageKind::Progress,
            prefix: prefix.into(),
            text: text.into(),
            code: 0,
            progress: Some(percent.min(100)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

impl fmt::Display for PipelineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageKind::Error | MessageKind::Warning => {
                write!(f, "{}: {} ({})", self.prefix, self.text, self.code)
            }
            MessageKind::Status => write!(f, "{}: {}", self.prefix, self.text),
            MessageKind::Progress => write!(
                f,
                "{}: {} [{}%]",
                self.prefix,
                self.text,
                self.progress.unwrap_or(0)
            ),
        }
    }
}

/// Receiver of pipeline messages
pub trait Observer: Send + Sync {
    fn notify(&self, message: &PipelineMessage);
}

/// Report an error through `observer`. Exactly one message is sent.
pub fn notify_error(observer: &dyn Observer, prefix: &str, text: &str, code: i32) {
    observer.notify(&PipelineMessage::error(prefix, text, code));
}

/// Report a warning through `observer`
pub fn notify_warning(observer: &dyn Observer, prefix: &str, text: &str, code: i32) {
    observer.notify(&PipelineMessage::warning(prefix, text, code));
}

/// Report a status message through `observer`
pub fn notify_status(observer: &dyn Observer, prefix: &str, text: &str) {
    observer.notify(&PipelineMessage::status(prefix, text));
}

/// An observer paired with the label messages are sent under
#[derive(Clone, Copy)]
pub struct Reporter<'o> {
    observer: &'o dyn Observer,
    prefix: &'o str,
}

impl<'o> Reporter<'o> {
    pub fn new(observer: &'o dyn Observer, prefix: &'o str) -> Self {
        Self { observer, prefix }
    }

    pub fn observer(&self) -> &'o dyn Observer {
        self.observer
    }

    pub fn prefix(&self) -> &'o str {
        self.prefix
    }

    /// Pass `result` through, notifying once if it is an error
    pub fn report<R>(&self, result: SimplResult<R>) -> SimplResult<R> {
        if let Err(err) = &result {
            self.error(&err.to_string(), err.code());
        }
        result
    }

    pub fn error(&self, text: &str, code: i32) {
        notify_error(self.observer, self.prefix, text, code);
    }

    pub fn warning(&self, text: &str, code: i32) {
        notify_warning(self.observer, self.prefix, text, code);
    }

    pub fn status(&self, text: &str) {
        notify_status(self.observer, self.prefix, text);
    }

    pub fn progress(&self, text: &str, percent: u8) {
        self.observer
            .notify(&PipelineMessage::progress(self.prefix, text, percent));
    }
}

impl fmt::Debug for Reporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").field("prefix", &self.prefix).finish()
    }
}

/// Observer that records every message it receives
#[derive(Debug, Default)]
pub struct MessageCollector {
    messages: Mutex<Vec<PipelineMessage>>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages received so far
    pub fn messages(&self) -> Vec<PipelineMessage> {
        self.lock().clone()
    }

    /// Error messages only
    pub fn errors(&self) -> Vec<PipelineMessage> {
        self.lock().iter().filter(|m| m.is_error()).cloned().collect()
    }

    /// Number of error messages received
    pub fn error_count(&self) -> usize {
        self.lock().iter().filter(|m| m.is_error()).count()
    }

    /// Number of messages received
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PipelineMessage>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Observer for MessageCollector {
    fn notify(&self, message: &PipelineMessage) {
        self.lock().push(message.clone());
    }
}

/// Observer that forwards messages to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, message: &PipelineMessage) {
        match message.kind {
            MessageKind::Error => tracing::error!(
                prefix = %message.prefix,
                code = message.code,
                "{}",
                message.text
            ),
            MessageKind::Warning => tracing::warn!(
                prefix = %message.prefix,
                code = message.code,
                "{}",
                message.text
            ),
            MessageKind::Status => tracing::info!(prefix = %message.prefix, "{}", message.text),
            MessageKind::Progress => tracing::debug!(
                prefix = %message.prefix,
                progress = message.progress.unwrap_or(0),
                "{}",
                message.text
            ),
        }
    }
}

/// Observer that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn notify(&self, _message: &PipelineMessage) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_in_order() {
        let collector = MessageCollector::new();
        notify_status(&collector, "Pipeline", "starting");
        notify_error(&collector, "Replace Value", "bad value", -100);
        assert_eq!(collector.len(), 2);
        assert_eq!(collector.error_count(), 1);
        let errors = collector.errors();
        assert_eq!(errors[0].code, -100);
        assert_eq!(errors[0].prefix, "Replace Value");
    }

    #[test]
    fn test_reporter_reports_errors_once() {
        let collector = MessageCollector::new();
        let reporter = Reporter::new(&collector, "Filter");
        let ok: SimplResult<u8> = Ok(1);
        assert!(reporter.report(ok).is_ok());
        let err: SimplResult<u8> = Err(crate::SimplError::EmptyPath);
        assert!(reporter.report(err).is_err());
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.errors()[0].code, -80000);
    }

    #[test]
    fn test_progress_is_clamped() {
        let message = PipelineMessage::progress("Pipeline", "1/1", 150);
        assert_eq!(message.progress, Some(100));
        assert_eq!(message.to_string(), "Pipeline: 1/1 [100%]");
    }

    #[test]
    fn test_error_display_includes_code() {
        let message = PipelineMessage::error("Filter", "boom", -401);
        assert_eq!(message.to_string(), "Filter: boom (-401)");
    }
}
