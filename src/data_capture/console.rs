//! Human-readable status lines for captured flows.
//!
//! These go to stdout (or an injected writer), not through the `log` facade:
//! they are meant to be watched live while the proxy runs and are not intended
//! for machine parsing.

use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::Value;

use super::types::{header_value, CapturedRequest, CapturedResponse};

pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Box::new(io::sink()))
    }

    pub fn banner(&self, output_dir: &str, host_pattern: &str) -> io::Result<()> {
        let rule = "=".repeat(60);
        let lines = vec![
            rule.clone(),
            "🔍 Traffic Capture Started".to_string(),
            rule.clone(),
            format!("Output directory: {}", output_dir),
            format!("Waiting for requests to {}...", host_pattern),
            rule,
        ];
        self.emit(&lines)
    }

    pub fn request_captured(&self, record: &CapturedRequest, saved_to: &str) -> io::Result<()> {
        let mut lines = vec![
            format!(
                "✓ Captured request #{}: {} {}",
                record.counter, record.method, record.path
            ),
            format!("  Saved to: {}", saved_to),
        ];
        if let Some(ua) = header_value(&record.headers, "user-agent") {
            lines.push(format!("  User-Agent: {}", ua));
        }
        if let Some(body) = record.body.as_ref() {
            if let Some(model) = body.json_field("model") {
                lines.push(format!("  Model: {}", display_value(model)));
            }
            if let Some(request_type) = body.json_field("requestType") {
                lines.push(format!("  Request Type: {}", display_value(request_type)));
            }
        }
        self.emit(&lines)
    }

    pub fn response_captured(&self, record: &CapturedResponse, saved_to: &str) -> io::Result<()> {
        let marker = if record.status_code == 200 { "✅" } else { "❌" };
        let mut lines = vec![
            format!("{} Response #{}: {}", marker, record.counter, record.status_code),
            format!("  Saved to: {}", saved_to),
        ];
        if record.status_code == 429 {
            lines.push("  ⚠️  429 ERROR - Rate Limited!".to_string());
            if let Some(error) = record.body.as_ref().and_then(|b| b.json_field("error")) {
                lines.push(format!("  Error: {}", display_value(error)));
            }
        }
        self.emit(&lines)
    }

    fn emit(&self, lines: &[String]) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "console writer poisoned"))?;
        for line in lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}

/// Strings print bare, everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data_capture::types::{collect_headers, CapturedBody, Headers};
    use serde_json::json;
    use std::sync::Arc;

    /// Writer handle that tests can read back after the reporter wrote to it.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn response(status_code: u16, body: Option<CapturedBody>) -> CapturedResponse {
        CapturedResponse {
            timestamp: "20261019_101500".into(),
            counter: 2,
            flow_id: None,
            status_code,
            headers: Headers::new(),
            body,
        }
    }

    #[test]
    fn test_request_lines_include_ua_model_and_type() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        let record = CapturedRequest {
            timestamp: "20261019_101500".into(),
            counter: 1,
            flow_id: None,
            method: "POST".into(),
            url: "https://x.googleapis.com/v1:generateContent".into(),
            host: "x.googleapis.com".into(),
            path: "/v1:generateContent".into(),
            headers: collect_headers(&[("User-Agent".into(), "client/2.1".into())]),
            body: Some(CapturedBody::Json(
                json!({"model": "foo", "requestType": "agent"}),
            )),
        };
        console.request_captured(&record, "/tmp/request_x_001.json").unwrap();

        let out = buf.contents();
        assert!(out.contains("✓ Captured request #1: POST /v1:generateContent"));
        assert!(out.contains("  Saved to: /tmp/request_x_001.json"));
        assert!(out.contains("  User-Agent: client/2.1"));
        assert!(out.contains("  Model: foo\n"));
        assert!(out.contains("  Request Type: agent"));
    }

    #[test]
    fn test_request_lines_skip_absent_fields() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        let record = CapturedRequest {
            timestamp: "t".into(),
            counter: 4,
            flow_id: None,
            method: "GET".into(),
            url: String::new(),
            host: String::new(),
            path: "/p".into(),
            headers: Headers::new(),
            body: Some(CapturedBody::Raw("AAEC".into())),
        };
        console.request_captured(&record, "f").unwrap();
        let out = buf.contents();
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("Model"));
    }

    #[test]
    fn test_response_markers() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        console.response_captured(&response(200, None), "ok.json").unwrap();
        console.response_captured(&response(500, None), "bad.json").unwrap();
        let out = buf.contents();
        assert!(out.contains("✅ Response #2: 200"));
        assert!(out.contains("❌ Response #2: 500"));
        assert!(!out.contains("429"));
    }

    #[test]
    fn test_rate_limited_response_prints_error_detail() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        let body = CapturedBody::Json(json!({"error": "rate limited"}));
        console.response_captured(&response(429, Some(body)), "r.json").unwrap();
        let out = buf.contents();
        assert!(out.contains("❌ Response #2: 429"));
        assert!(out.contains("⚠️  429 ERROR - Rate Limited!"));
        assert!(out.contains("  Error: rate limited"));
    }

    #[test]
    fn test_rate_limited_structured_error_prints_as_json() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        let body = CapturedBody::Json(json!({"error": {"code": 429}}));
        console.response_captured(&response(429, Some(body)), "r.json").unwrap();
        assert!(buf.contents().contains(r#"  Error: {"code":429}"#));
    }

    #[test]
    fn test_disabled_console_writes_nothing() {
        let console = ConsoleReporter::disabled();
        console.response_captured(&response(200, None), "x").unwrap();
        console.banner("/tmp", "googleapis.com").unwrap();
    }

    #[test]
    fn test_banner_names_directory_and_host() {
        let buf = SharedBuf::default();
        let console = ConsoleReporter::new(Box::new(buf.clone()));
        console.banner("/tmp/captures", "googleapis.com").unwrap();
        let out = buf.contents();
        assert!(out.contains("Output directory: /tmp/captures"));
        assert!(out.contains("Waiting for requests to googleapis.com..."));
    }
}
