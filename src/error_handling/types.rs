use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    EmptyPattern(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::EmptyPattern(e) => write!(f, "Filter pattern error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum StorageError {
    DirectoryFailed(std::io::Error),
    WriteFailed(std::io::Error),
    SerializeFailed(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DirectoryFailed(e) => write!(f, "Storage directory error: {}", e),
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
            StorageError::SerializeFailed(e) => write!(f, "Record serialization failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum CaptureError {
    StorageError(StorageError),
    ConsoleError(std::io::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::StorageError(e) => write!(f, "Capture storage error: {}", e),
            CaptureError::ConsoleError(e) => write!(f, "Console output error: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<StorageError> for CaptureError {
    fn from(err: StorageError) -> Self {
        CaptureError::StorageError(err)
    }
}

#[derive(Debug)]
pub enum HostError {
    InputError(std::io::Error),
    HookFailed { line: usize, source: CaptureError },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::InputError(e) => write!(f, "Event stream read error: {}", e),
            HostError::HookFailed { line, source } => {
                write!(f, "Hook failed on event line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for HostError {}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        HostError::InputError(err)
    }
}
