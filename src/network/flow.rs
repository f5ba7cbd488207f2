//! Flow model handed to the capture hooks by the host proxy runtime.
//!
//! A [`Flow`] is one intercepted exchange. The host owns parsing, TLS and the
//! connection lifecycle; it only hands us the already parsed request (and, at
//! response time, the response). Bodies travel base64 encoded in the serialized
//! form so arbitrary bytes survive the event stream.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One intercepted request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Host-assigned flow identifier, used to pair a response with its request.
    #[serde(default)]
    pub id: Option<String>,
    pub request: FlowRequest,
    #[serde(default)]
    pub response: Option<FlowResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRequest {
    pub method: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub path: String,
    /// Full URL as reported by the host; derived from the other parts when absent.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, with = "base64_bytes")]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, with = "base64_bytes")]
    pub content: Vec<u8>,
}

fn default_scheme() -> String {
    "https".to_string()
}

impl Default for FlowRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            scheme: default_scheme(),
            host: String::new(),
            port: None,
            path: "/".to_string(),
            url: None,
            headers: Vec::new(),
            content: Vec::new(),
        }
    }
}

impl FlowRequest {
    /// The URL the host reported, or `scheme://host[:port]path` with the
    /// scheme's default port left out.
    pub fn pretty_url(&self) -> String {
        if let Some(ref url) = self.url {
            return url.clone();
        }
        let default_port = match self.scheme.as_str() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        };
        match self.port {
            Some(port) if Some(port) != default_port => {
                format!("{}://{}:{}{}", self.scheme, self.host, port, self.path)
            }
            _ => format!("{}://{}{}", self.scheme, self.host, self.path),
        }
    }
}

impl Flow {
    pub fn new(request: FlowRequest) -> Self {
        Self {
            id: None,
            request,
            response: None,
        }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_response(mut self, response: FlowResponse) -> Self {
        self.response = Some(response);
        self
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(scheme: &str, port: Option<u16>) -> FlowRequest {
        FlowRequest {
            method: "POST".into(),
            scheme: scheme.into(),
            host: "api.example.com".into(),
            port,
            path: "/v1/items?x=1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pretty_url_omits_default_port() {
        assert_eq!(
            request("https", Some(443)).pretty_url(),
            "https://api.example.com/v1/items?x=1"
        );
        assert_eq!(
            request("http", Some(80)).pretty_url(),
            "http://api.example.com/v1/items?x=1"
        );
    }

    #[test]
    fn test_pretty_url_keeps_custom_port() {
        assert_eq!(
            request("https", Some(8443)).pretty_url(),
            "https://api.example.com:8443/v1/items?x=1"
        );
    }

    #[test]
    fn test_pretty_url_prefers_host_reported_url() {
        let mut req = request("https", None);
        req.url = Some("https://reported.example/x".into());
        assert_eq!(req.pretty_url(), "https://reported.example/x");
    }

    #[test]
    fn test_flow_deserializes_with_defaults() {
        let raw = r#"{
            "request": {
                "method": "POST",
                "host": "a.googleapis.com",
                "path": "/v1:generateContent",
                "headers": [["Content-Type", "application/json"]],
                "content": "eyJhIjoxfQ=="
            }
        }"#;
        let flow: Flow = serde_json::from_str(raw).unwrap();
        assert_eq!(flow.id, None);
        assert_eq!(flow.request.scheme, "https");
        assert_eq!(flow.request.content, br#"{"a":1}"#.to_vec());
        assert_eq!(flow.request.headers[0].0, "Content-Type");
        assert!(flow.response.is_none());
    }

    #[test]
    fn test_flow_rejects_invalid_base64_content() {
        let raw = r#"{"request": {"method": "GET", "host": "h", "path": "/", "content": "***"}}"#;
        assert!(serde_json::from_str::<Flow>(raw).is_err());
    }
}
