use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems. Always fatal, raised before any file is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file requires {}", format_keys(.0))]
    MissingKeys(Vec<String>),
    #[error("Invalid value for \"{key}\": {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} is not configured")]
    SectionMissing(&'static str),
}

fn format_keys(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("\"{k}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// No candidate encoding could decode the input.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Could not decode {len} bytes with any candidate encoding")]
    Undecodable { len: usize },
    #[error("Candidate {strict} is strict but listed after permissive candidate {permissive}")]
    Misordered {
        strict: &'static str,
        permissive: &'static str,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Archive-level failure. The unit owning the archive is skipped.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to open archive {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid or corrupt ZIP {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Crate-level error returned by the toolkit facade.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Similarity engine failed: {0}")]
    Similarity(String),
}

impl ToolError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
