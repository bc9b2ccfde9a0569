//! Broadcasting of job events for real-time streaming.
//!
//! The broadcaster is transport-agnostic; the HTTP server bridges it onto
//! WebSocket connections.

pub mod job_events;

pub use job_events::{JobEvent, JobEventBroadcaster, DEFAULT_CAPACITY};
