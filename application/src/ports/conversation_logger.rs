//! Port for structured trace logging.
//!
//! Defines the [`ConversationLogger`] trait for recording orchestration events
//! (member generations, ballots, judge verdicts, completed requests) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! trace in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured trace event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. Adapters add the timestamp.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (e.g., "member_generated", "ballot_cast").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging trace events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible: a failed write never fails a request.
pub trait ConversationLogger: Send + Sync {
    /// Record a trace event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when trace logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
