//! Storage subsystem
//!
//! This module provides the abstraction and implementation for persisting
//! captured request and response records.
//!
//! Components:
//! - `storage_trait`: the `CaptureStorage` trait defining a uniform API.
//! - `file_storage`: filesystem-backed implementation, one JSON file per record.

pub mod file_storage;
pub mod storage_trait;

pub use file_storage::FileStorage;
pub use storage_trait::CaptureStorage;
