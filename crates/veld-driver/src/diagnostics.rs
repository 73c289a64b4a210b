//! User-facing diagnostic channel
//!
//! Configuration-level problems are reported here and the session moves
//! on without output; internal consistency violations never pass through
//! this channel, they abort as errors.

use serde::{Deserialize, Serialize};

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single reported message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Severity level
    pub severity: Severity,
    /// Message text
    pub text: String,
}

impl Message {
    /// Serialize the message for tooling output
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sink for user-facing messages
pub trait MessageCollector {
    /// Report one message
    fn report(&mut self, severity: Severity, text: &str);

    /// Whether any error-severity message has been reported
    fn has_errors(&self) -> bool;
}

/// Vec-backed collector used by the pipeline and by tests
#[derive(Debug, Default)]
pub struct CollectingMessageSink {
    messages: Vec<Message>,
}

impl CollectingMessageSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages reported so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl MessageCollector for CollectingMessageSink {
    fn report(&mut self, severity: Severity, text: &str) {
        self.messages.push(Message {
            severity,
            text: text.to_string(),
        });
    }

    fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity == Severity::Error)
    }
}
