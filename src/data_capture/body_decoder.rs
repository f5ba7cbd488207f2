//! Best-effort body decoding.
//!
//! Bytes are read as UTF-8 with invalid sequences replaced, then parsed as a
//! JSON document. Anything that does not parse falls back to a raw rendering
//! chosen by the [`RawPolicy`]: requests keep the full payload as base64,
//! responses keep a readable prefix so large SSE streams stay small on disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use super::types::CapturedBody;

pub const RESPONSE_PREVIEW_BYTES: usize = 1000;

/// How bytes that are not JSON get stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPolicy {
    /// Base64 of the whole payload.
    Base64,
    /// Lossy UTF-8 text of at most `limit` leading bytes.
    TextPreview { limit: usize },
}

impl RawPolicy {
    pub fn response_default() -> Self {
        RawPolicy::TextPreview {
            limit: RESPONSE_PREVIEW_BYTES,
        }
    }

    fn render(&self, bytes: &[u8]) -> String {
        match *self {
            RawPolicy::Base64 => STANDARD.encode(bytes),
            RawPolicy::TextPreview { limit } => {
                let end = bytes.len().min(limit);
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            }
        }
    }
}

/// Returns `None` for an empty body, otherwise exactly one body form.
pub fn decode_body(bytes: &[u8], policy: RawPolicy) -> Option<CapturedBody> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str(&text) {
        Ok(value) => Some(CapturedBody::Json(value)),
        Err(e) => {
            debug!("Body of {} byte(s) is not JSON ({}), keeping raw", bytes.len(), e);
            Some(CapturedBody::Raw(policy.render(bytes)))
        }
    }
}
