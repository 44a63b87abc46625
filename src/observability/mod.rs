//! Observability
//!
//! Structured JSON line logging of typed lifecycle events. The validator and
//! checker are pure and never log; the layers that orchestrate them do.
//!
//! ```ignore
//! use samplecat::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::InsertComplete, &[("inserted", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
