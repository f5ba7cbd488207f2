//! Capture session: the request/response hooks and the state they share.
//!
//! `CaptureSession` owns everything that lives longer than one flow event:
//! the sequence counter, the table pairing in-flight flow ids with the
//! sequence number their request got, the filter, the storage backend and the
//! console. The host runtime calls [`FlowHook::request`] and
//! [`FlowHook::response`] once per observed flow event, from any thread.
//!
//! Minimal usage
//! ```no_run
//! use std::sync::Arc;
//! use flowtap::data_capture::CaptureSession;
//! use flowtap::host::FlowHook;
//! use flowtap::network::{Flow, FlowFilter, FlowRequest};
//! use flowtap::storage::FileStorage;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("/tmp/captures")?);
//! let session = CaptureSession::new(FlowFilter::default(), storage);
//!
//! let flow = Flow::new(FlowRequest {
//!     method: "POST".into(),
//!     host: "generativelanguage.googleapis.com".into(),
//!     path: "/v1beta/models/gemini:generateContent".into(),
//!     content: br#"{"model":"gemini"}"#.to_vec(),
//!     ..Default::default()
//! })
//! .with_id("flow-1");
//! session.request(&flow)?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::error_handling::types::CaptureError;
use crate::host::FlowHook;
use crate::network::{Flow, FlowFilter};
use crate::storage::CaptureStorage;

use super::body_decoder::{decode_body, RawPolicy};
use super::console::ConsoleReporter;
use super::types::{collect_headers, CapturedRequest, CapturedResponse};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const DEFAULT_PENDING_LIMIT: usize = 4096;

pub struct CaptureSession {
    /// Correlates log lines of one process run.
    session_id: Uuid,
    filter: FlowFilter,
    storage: Arc<dyn CaptureStorage>,
    console: ConsoleReporter,
    /// Last sequence number handed out; 0 before the first qualifying request.
    counter: AtomicU64,
    /// Flow id to the sequence number its request was captured under, oldest first.
    pending: Mutex<IndexMap<String, u64>>,
    /// Oldest entries are evicted past this size.
    pending_limit: usize,
    response_policy: RawPolicy,
}

impl CaptureSession {
    pub fn new(filter: FlowFilter, storage: Arc<dyn CaptureStorage>) -> Self {
        let session_id = Uuid::new_v4();
        debug!(
            "[{}] CaptureSession created (host~{}, path~{})",
            session_id,
            filter.host_pattern(),
            filter.path_pattern()
        );
        Self {
            session_id,
            filter,
            storage,
            console: ConsoleReporter::stdout(),
            counter: AtomicU64::new(0),
            pending: Mutex::new(IndexMap::new()),
            pending_limit: DEFAULT_PENDING_LIMIT,
            response_policy: RawPolicy::response_default(),
        }
    }

    pub fn with_console(mut self, console: ConsoleReporter) -> Self {
        self.console = console;
        self
    }

    /// Caps how many leading bytes of a non-JSON response body are kept.
    pub fn with_response_preview(mut self, limit: usize) -> Self {
        self.response_policy = RawPolicy::TextPreview { limit };
        self
    }

    /// Caps how many requests may wait for their response at once.
    pub fn with_pending_limit(mut self, limit: usize) -> Self {
        self.pending_limit = limit.max(1);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn filter(&self) -> &FlowFilter {
        &self.filter
    }

    pub fn console(&self) -> &ConsoleReporter {
        &self.console
    }

    /// Sequence number of the most recent qualifying request.
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Number of captured requests still waiting for their response.
    pub fn pending_responses(&self) -> usize {
        self.pending_table().len()
    }

    /// A panic in another hook must not cost every later flow its pairing.
    fn pending_table(&self) -> MutexGuard<'_, IndexMap<String, u64>> {
        self.pending.lock().unwrap_or_else(|poisoned| {
            warn!("[{}] Pairing table lock was poisoned, recovering", self.session_id);
            poisoned.into_inner()
        })
    }

    fn remember_pending(&self, id: &str, counter: u64) {
        let mut pending = self.pending_table();
        while !pending.contains_key(id) && pending.len() >= self.pending_limit {
            if let Some((evicted, evicted_counter)) = pending.shift_remove_index(0) {
                debug!(
                    "[{}] Pairing table full, dropping flow {} (request #{})",
                    self.session_id, evicted, evicted_counter
                );
            }
        }
        pending.insert(id.to_string(), counter);
    }

    pub fn on_request(&self, flow: &Flow) -> Result<(), CaptureError> {
        if !self.filter.matches(flow) {
            return Ok(());
        }

        let counter = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(ref id) = flow.id {
            self.remember_pending(id, counter);
        }

        let request = &flow.request;
        let record = CapturedRequest {
            timestamp: now_timestamp(),
            counter,
            flow_id: flow.id.clone(),
            method: request.method.clone(),
            url: request.pretty_url(),
            host: request.host.clone(),
            path: request.path.clone(),
            headers: collect_headers(&request.headers),
            body: decode_body(&request.content, RawPolicy::Base64),
        };

        let saved_to = self.storage.save_request(&record).map_err(|e| {
            error!("[{}] Failed to save request #{}: {}", self.session_id, counter, e);
            CaptureError::StorageError(e)
        })?;
        info!(
            "[{}] Captured request #{} {} {} ({} byte body)",
            self.session_id,
            counter,
            record.method,
            record.path,
            request.content.len()
        );

        self.console
            .request_captured(&record, &saved_to)
            .map_err(CaptureError::ConsoleError)
    }

    pub fn on_response(&self, flow: &Flow) -> Result<(), CaptureError> {
        if !self.filter.matches(flow) {
            return Ok(());
        }
        let response = match flow.response {
            Some(ref response) => response,
            None => {
                debug!(
                    "[{}] Response hook called without a response for {}",
                    self.session_id, flow.request.path
                );
                return Ok(());
            }
        };

        let counter = self.resolve_counter(flow);
        let record = CapturedResponse {
            timestamp: now_timestamp(),
            counter,
            flow_id: flow.id.clone(),
            status_code: response.status_code,
            headers: collect_headers(&response.headers),
            body: decode_body(&response.content, self.response_policy),
        };

        let saved_to = self.storage.save_response(&record).map_err(|e| {
            error!("[{}] Failed to save response #{}: {}", self.session_id, counter, e);
            CaptureError::StorageError(e)
        })?;
        info!(
            "[{}] Captured response #{} status={} ({} byte body)",
            self.session_id,
            counter,
            record.status_code,
            response.content.len()
        );

        self.console
            .response_captured(&record, &saved_to)
            .map_err(CaptureError::ConsoleError)
    }

    /// The sequence number the flow's request was captured under, or the
    /// current counter when the flow cannot be paired.
    fn resolve_counter(&self, flow: &Flow) -> u64 {
        let paired = flow
            .id
            .as_ref()
            .and_then(|id| self.pending_table().shift_remove(id));
        match paired {
            Some(counter) => counter,
            None => {
                let current = self.counter();
                debug!(
                    "[{}] No paired request for flow {:?}, using counter {}",
                    self.session_id, flow.id, current
                );
                current
            }
        }
    }
}

impl FlowHook for CaptureSession {
    fn request(&self, flow: &Flow) -> Result<(), CaptureError> {
        self.on_request(flow)
    }

    fn response(&self, flow: &Flow) -> Result<(), CaptureError> {
        self.on_response(flow)
    }
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
