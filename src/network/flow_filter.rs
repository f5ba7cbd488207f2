use log::trace;

use super::flow::Flow;

pub const DEFAULT_HOST_PATTERN: &str = "googleapis.com";
pub const DEFAULT_PATH_PATTERN: &str = "generateContent";

/// Decides which flows are worth capturing.
///
/// Both checks are plain, case-sensitive substring containment on the request's
/// host and path, so versioned paths match. The default path pattern does not
/// match the `streamGenerateContent` variant (capital `G`). Responses are
/// matched through their request since they carry no path of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFilter {
    host_pattern: String,
    path_pattern: String,
}

impl Default for FlowFilter {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_PATTERN, DEFAULT_PATH_PATTERN)
    }
}

impl FlowFilter {
    pub fn new<H: Into<String>, P: Into<String>>(host_pattern: H, path_pattern: P) -> Self {
        Self {
            host_pattern: host_pattern.into(),
            path_pattern: path_pattern.into(),
        }
    }

    pub fn host_pattern(&self) -> &str {
        &self.host_pattern
    }

    pub fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    pub fn matches(&self, flow: &Flow) -> bool {
        let request = &flow.request;
        if !request.host.contains(&self.host_pattern) {
            trace!("Skipping flow to host {}", request.host);
            return false;
        }
        if !request.path.contains(&self.path_pattern) {
            trace!("Skipping flow to path {}", request.path);
            return false;
        }
        true
    }
}
