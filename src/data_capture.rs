pub mod body_decoder;
pub mod console;
pub mod recorder;
pub mod types;

pub use body_decoder::{decode_body, RawPolicy};
pub use console::ConsoleReporter;
pub use recorder::CaptureSession;
pub use types::{CapturedBody, CapturedRequest, CapturedResponse, Headers};
