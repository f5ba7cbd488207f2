use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::FlowHook;
use crate::error_handling::types::HostError;
use crate::network::Flow;

/// One line of the host's event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum FlowEvent {
    Request { flow: Flow },
    Response { flow: Flow },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Events dispatched to the hook.
    pub events: usize,
    /// Lines that could not be parsed as an event.
    pub skipped: usize,
}

/// Reads flow events line by line and dispatches each to `hook`.
///
/// Blank lines are ignored and malformed lines are logged and skipped. The
/// first hook error stops the stream and is returned with its line number.
pub async fn pump_events<R>(reader: R, hook: &dyn FlowHook) -> Result<StreamSummary, HostError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut summary = StreamSummary::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: FlowEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event on line {}: {}", line_no, e);
                summary.skipped += 1;
                continue;
            }
        };

        let result = match event {
            FlowEvent::Request { ref flow } => hook.request(flow),
            FlowEvent::Response { ref flow } => hook.response(flow),
        };
        result.map_err(|source| HostError::HookFailed {
            line: line_no,
            source,
        })?;
        summary.events += 1;
    }

    debug!("Event stream ended after {} line(s)", line_no);
    info!(
        "Processed {} event(s), skipped {} malformed line(s)",
        summary.events, summary.skipped
    );
    Ok(summary)
}
