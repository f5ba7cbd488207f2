//! Records persisted by the capture hooks.

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Header name to value, first-seen order kept, duplicates last-write-wins.
pub type Headers = IndexMap<String, String>;

/// A captured message body: either the decoded JSON document or the raw
/// fallback rendering of the bytes. Serialized as the `body` / `body_raw` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedBody {
    Json(Value),
    Raw(String),
}

impl CapturedBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CapturedBody::Json(v) => Some(v),
            CapturedBody::Raw(_) => None,
        }
    }

    /// Top-level field of a decoded JSON object body.
    pub fn json_field(&self, name: &str) -> Option<&Value> {
        self.as_json().and_then(|v| v.as_object()).and_then(|o| o.get(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    /// Local capture time, `%Y%m%d_%H%M%S`.
    pub timestamp: String,
    pub counter: u64,
    pub flow_id: Option<String>,
    pub method: String,
    pub url: String,
    pub host: String,
    pub path: String,
    pub headers: Headers,
    pub body: Option<CapturedBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub timestamp: String,
    pub counter: u64,
    pub flow_id: Option<String>,
    pub status_code: u16,
    pub headers: Headers,
    pub body: Option<CapturedBody>,
}

/// Collapse host-supplied header pairs into [`Headers`].
pub fn collect_headers(pairs: &[(String, String)]) -> Headers {
    let mut headers = Headers::with_capacity(pairs.len());
    for (name, value) in pairs {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

/// Case-insensitive header lookup.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn body_fields(body: &Option<CapturedBody>) -> (Option<&Value>, Option<&str>) {
    match body {
        Some(CapturedBody::Json(v)) => (Some(v), None),
        Some(CapturedBody::Raw(s)) => (None, Some(s.as_str())),
        None => (None, None),
    }
}

// Both body keys are always written; the unused one is null.
impl Serialize for CapturedRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (body, body_raw) = body_fields(&self.body);
        let mut state = serializer.serialize_struct("CapturedRequest", 10)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("counter", &self.counter)?;
        if let Some(ref id) = self.flow_id {
            state.serialize_field("flow_id", id)?;
        } else {
            state.skip_field("flow_id")?;
        }
        state.serialize_field("method", &self.method)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("host", &self.host)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("headers", &self.headers)?;
        state.serialize_field("body", &body)?;
        state.serialize_field("body_raw", &body_raw)?;
        state.end()
    }
}

impl Serialize for CapturedResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (body, body_raw) = body_fields(&self.body);
        let mut state = serializer.serialize_struct("CapturedResponse", 7)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("counter", &self.counter)?;
        if let Some(ref id) = self.flow_id {
            state.serialize_field("flow_id", id)?;
        } else {
            state.skip_field("flow_id")?;
        }
        state.serialize_field("status_code", &self.status_code)?;
        state.serialize_field("headers", &self.headers)?;
        state.serialize_field("body", &body)?;
        state.serialize_field("body_raw", &body_raw)?;
        state.end()
    }
}
