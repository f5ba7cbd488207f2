//! Host-facing flow model and the capture filter applied to it.

pub mod flow;
pub mod flow_filter;

pub use flow::{Flow, FlowRequest, FlowResponse};
pub use flow_filter::FlowFilter;
