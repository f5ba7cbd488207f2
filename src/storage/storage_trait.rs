//! Storage Trait
//!
//! This module defines the `CaptureStorage` trait, the persistence seam between
//! the capture hooks and wherever records end up.
//!
//! Implementors are responsible for:
//! - Persisting request records
//! - Persisting response records
//!
//! Both methods return the location the record was written to, which the hooks
//! echo on the console.

use crate::data_capture::types::{CapturedRequest, CapturedResponse};
use crate::error_handling::types::StorageError;

/// Persistence backend for captured records.
pub trait CaptureStorage: Send + Sync {
    /// Saves a request record and returns where it was written.
    fn save_request(&self, record: &CapturedRequest) -> Result<String, StorageError>;

    /// Saves a response record and returns where it was written.
    fn save_response(&self, record: &CapturedResponse) -> Result<String, StorageError>;
}
