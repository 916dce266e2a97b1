//! Port for structured agent event logging.
//!
//! Defines the [`AgentEventLogger`] trait for recording execution events
//! (plan generated, step started/completed/failed, status changes) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! execution transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured agent event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The adapter adds the timestamp.
pub struct AgentEvent {
    /// Event type identifier (e.g., "plan_generated", "step_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AgentEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging agent events to a structured log.
///
/// `log` is synchronous and non-fallible; write failures are swallowed by
/// the adapter so execution never depends on the log.
pub trait AgentEventLogger: Send + Sync {
    fn log(&self, event: AgentEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoAgentEventLogger;

impl AgentEventLogger for NoAgentEventLogger {
    fn log(&self, _event: AgentEvent) {}
}
