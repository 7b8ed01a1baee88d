//! Error types for registry lookups, downloads and extraction

use std::path::PathBuf;
use thiserror::Error;

use crate::install::InstallError;

/// Errors raised while resolving, downloading or installing a single mod
#[derive(Error, Debug)]
pub enum ModError {
    /// HTTP-related errors with context
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Network timeout, always worth another attempt
    #[error("Request to '{url}' timed out")]
    NetworkTimeout { url: String },

    /// Registry answered with something other than 200 OK
    #[error("Registry returned HTTP {status} for '{url}'")]
    UnexpectedStatus { url: String, status: u16 },

    /// Registry body could not be decoded into a package listing
    #[error("Malformed registry response from '{url}'")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transient failures kept happening until the attempt cap was reached
    #[error("Gave up on '{url}' after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: usize,
        last_error: String,
    },

    /// URL parsing errors
    #[error("Invalid URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// File system I/O errors with file context
    #[error("File operation failed on '{path}' while {operation}")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// The installed manifest.json exists but is not usable
    #[error("Local manifest '{path}' is malformed")]
    MalformedManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Zip archive could not be opened or unpacked
    #[error("Failed to extract archive '{path}'")]
    Extraction {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Mod list file could not be parsed
    #[error("Failed to parse mod list '{path}'")]
    ModList {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Mod has no download URL because the registry lookup never succeeded
    #[error("{name} has not been resolved against the registry")]
    Unresolved { name: String },

    /// HTTP client could not be constructed
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Blocking worker panicked or was cancelled
    #[error("Background task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    Delete,
    Move,
    Copy,
    CreateDir,
    ListDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Create => write!(f, "creating"),
            FileOperation::Delete => write!(f, "deleting"),
            FileOperation::Move => write!(f, "moving"),
            FileOperation::Copy => write!(f, "copying"),
            FileOperation::CreateDir => write!(f, "creating directory"),
            FileOperation::ListDir => write!(f, "listing directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModError>;

impl ModError {
    /// Check if error is transient (registry lookup should retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ModError::HttpRequest { source, .. } => {
                source.is_connect() || source.is_timeout() || source.is_request() || source.is_body()
            }
            ModError::NetworkTimeout { .. } => true,
            ModError::UnexpectedStatus { .. } => true,
            ModError::MalformedResponse { .. } => false,
            ModError::RetriesExhausted { .. } => false,
            ModError::InvalidUrl { .. } => false,
            ModError::FileSystem { .. } => false,
            ModError::MalformedManifest { .. } => false,
            ModError::Extraction { .. } => false,
            ModError::ModList { .. } => false,
            ModError::Unresolved { .. } => false,
            ModError::Configuration { .. } => false,
            ModError::Task(_) => false,
            ModError::Install(_) => false,
        }
    }

    /// Short category name used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            ModError::HttpRequest { .. } => "http_request",
            ModError::NetworkTimeout { .. } => "network_timeout",
            ModError::UnexpectedStatus { .. } => "unexpected_status",
            ModError::MalformedResponse { .. } => "malformed_response",
            ModError::RetriesExhausted { .. } => "retries_exhausted",
            ModError::InvalidUrl { .. } => "invalid_url",
            ModError::FileSystem { .. } => "file_system",
            ModError::MalformedManifest { .. } => "malformed_manifest",
            ModError::Extraction { .. } => "extraction",
            ModError::ModList { .. } => "mod_list",
            ModError::Unresolved { .. } => "unresolved",
            ModError::Configuration { .. } => "configuration",
            ModError::Task(_) => "task",
            ModError::Install(_) => "install",
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, operation: FileOperation, source: std::io::Error) -> Self {
        ModError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }
}

impl From<reqwest::Error> for ModError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string()).unwrap_or_else(|| "<unknown>".to_string());

        if error.is_timeout() {
            ModError::NetworkTimeout { url }
        } else {
            ModError::HttpRequest { url, source: error }
        }
    }
}

/// Render an error with its whole source chain on one line
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
