//! Server configuration

use std::path::PathBuf;

/// Default URL prefix all note routes live under.
pub const DEFAULT_BASE_PATH: &str = "/notes";

/// Default directory notes are saved to, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "_tmp";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base path must start with '/': {0:?}")]
    RelativeBasePath(String),

    #[error("base path must name a sub-path, got {0:?}")]
    EmptyBasePath(String),

    #[error("base path may not contain route syntax ('{{', '}}', '*'): {0:?}")]
    RouteSyntax(String),
}

/// Characters the router treats as parameter or wildcard syntax.
const ROUTE_SYNTAX: &[char] = &['{', '}', '*'];

/// Runtime configuration for the note service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL prefix, e.g. `/notes`. Never ends with a slash.
    pub base_path: String,

    /// Directory holding note content and metadata files
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(base_path: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        if !base_path.starts_with('/') {
            return Err(ConfigError::RelativeBasePath(base_path.to_string()));
        }

        let trimmed = base_path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBasePath(base_path.to_string()));
        }

        if trimmed.contains(ROUTE_SYNTAX) {
            return Err(ConfigError::RouteSyntax(base_path.to_string()));
        }

        Ok(Self {
            base_path: trimmed.to_string(),
            data_dir: data_dir.into(),
        })
    }

    /// URL of a single note.
    pub fn note_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_path, id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}
