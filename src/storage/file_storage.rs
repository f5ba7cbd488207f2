use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::Serialize;

use crate::data_capture::types::{CapturedRequest, CapturedResponse};
use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::CaptureStorage;

/// Writes every record as its own pretty-printed JSON document.
///
/// File names embed the capture timestamp and the zero-padded sequence
/// number: `request_<ts>_<seq>.json` / `response_<ts>_<seq>.json`. Existing
/// files with the same name are overwritten.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            error!("Failed to create capture dir {}: {}", base_path.display(), e);
            StorageError::DirectoryFailed(e)
        })?;
        info!("FileStorage initialized at {}", base_path.display());
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn request_file_path(&self, record: &CapturedRequest) -> PathBuf {
        self.base_path
            .join(format!("request_{}_{:03}.json", record.timestamp, record.counter))
    }

    pub fn response_file_path(&self, record: &CapturedResponse) -> PathBuf {
        self.base_path
            .join(format!("response_{}_{:03}.json", record.timestamp, record.counter))
    }

    fn write_json<T: Serialize>(&self, path: &Path, record: &T) -> Result<(), StorageError> {
        let file = File::create(path).map_err(|e| {
            error!("Failed to create capture file {}: {}", path.display(), e);
            StorageError::WriteFailed(e)
        })?;
        let mut writer = BufWriter::new(file);
        // serde_json leaves non-ASCII characters unescaped
        serde_json::to_writer_pretty(&mut writer, record).map_err(|e| {
            error!("Failed to serialize record to {}: {}", path.display(), e);
            StorageError::SerializeFailed(e)
        })?;
        writer.flush().map_err(|e| {
            error!("Failed to write capture file {}: {}", path.display(), e);
            StorageError::WriteFailed(e)
        })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl CaptureStorage for FileStorage {
    fn save_request(&self, record: &CapturedRequest) -> Result<String, StorageError> {
        let path = self.request_file_path(record);
        self.write_json(&path, record)?;
        Ok(path.display().to_string())
    }

    fn save_response(&self, record: &CapturedResponse) -> Result<String, StorageError> {
        let path = self.response_file_path(record);
        self.write_json(&path, record)?;
        Ok(path.display().to_string())
    }
}
