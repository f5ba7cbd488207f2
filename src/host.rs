//! Boundary with the host proxy runtime.
//!
//! The host owns the network stack and the flow lifecycle; it calls into a
//! [`FlowHook`] once per flow event and treats an `Err` as fatal for that
//! invocation. `event_stream` adapts a newline-delimited JSON feed of flow
//! events into those calls.

pub mod event_stream;

pub use event_stream::{pump_events, FlowEvent, StreamSummary};

use crate::error_handling::types::CaptureError;
use crate::network::Flow;

/// Callbacks registered with the host runtime.
pub trait FlowHook: Send + Sync {
    /// Called when a request has been observed.
    fn request(&self, flow: &Flow) -> Result<(), CaptureError>;

    /// Called when the response for `flow` has arrived.
    fn response(&self, flow: &Flow) -> Result<(), CaptureError>;
}
