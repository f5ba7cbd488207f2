use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info};
use serde::Deserialize;

use crate::data_capture::body_decoder::RESPONSE_PREVIEW_BYTES;
use crate::error_handling::types::ConfigError;
use crate::network::flow_filter::{DEFAULT_HOST_PATTERN, DEFAULT_PATH_PATTERN};

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "FLOWTAP_OUTPUT_DIR";
const MAX_RESPONSE_PREVIEW_BYTES: usize = 1024 * 1024;

/// Command-line arguments.
///
/// Every option overrides the matching key of the configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "flowtap")]
#[command(version)]
#[command(about = "Capture filtered HTTP flows from a proxy host as JSON files")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory receiving the request/response files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Substring the request host must contain
    #[arg(long)]
    pub host_pattern: Option<String>,

    /// Substring the request path must contain
    #[arg(long)]
    pub path_pattern: Option<String>,

    /// Flow event file; stdin when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Suppress the console status lines
    #[arg(long, short, action = clap::ArgAction::SetTrue)]
    pub quiet: bool,
}

/// Runtime configuration.
///
/// Resolution order, lowest to highest: built-in defaults, the TOML file,
/// the `FLOWTAP_OUTPUT_DIR` environment variable, command-line arguments.
///
/// ```toml
/// output_dir = ".debug/captures"
/// host_pattern = "googleapis.com"
/// path_pattern = "generateContent"
/// response_preview_bytes = 1000
/// console = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_dir: PathBuf,
    pub host_pattern: String,
    pub path_pattern: String,
    /// Leading bytes kept from a response body that is not JSON.
    pub response_preview_bytes: usize,
    /// Print a status line per captured flow.
    pub console: bool,
    /// Flow event source; stdin when `None`.
    pub input: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(".debug/captures"),
            host_pattern: DEFAULT_HOST_PATTERN.to_string(),
            path_pattern: DEFAULT_PATH_PATTERN.to_string(),
            response_preview_bytes: RESPONSE_PREVIEW_BYTES,
            console: true,
            input: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Builds the effective configuration for the given arguments.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.is_empty() {
                debug!("Using output directory from {}: {}", OUTPUT_DIR_ENV, dir);
                self.output_dir = PathBuf::from(dir);
            }
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(ref dir) = args.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(ref host) = args.host_pattern {
            self.host_pattern = host.clone();
        }
        if let Some(ref path) = args.path_pattern {
            self.path_pattern = path.clone();
        }
        if let Some(ref input) = args.input {
            self.input = Some(input.clone());
        }
        if args.quiet {
            self.console = false;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host_pattern.is_empty() {
            return Err(ConfigError::EmptyPattern("host_pattern must not be empty".into()));
        }
        if self.path_pattern.is_empty() {
            return Err(ConfigError::EmptyPattern("path_pattern must not be empty".into()));
        }
        if self.response_preview_bytes == 0
            || self.response_preview_bytes > MAX_RESPONSE_PREVIEW_BYTES
        {
            return Err(ConfigError::NotInRange(format!(
                "response_preview_bytes must be within 1..={}, got {}",
                MAX_RESPONSE_PREVIEW_BYTES, self.response_preview_bytes
            )));
        }
        Ok(())
    }
}
