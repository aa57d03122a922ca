use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Cannot read fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in fixture {}: {source}", path.display())]
    FixtureJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Fixture {} must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Cannot prepare log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}, see {}", log.display())]
    ChildFailed {
        program: String,
        status: ExitStatus,
        log: PathBuf,
    },

    #[error("Malformed response: {0}")]
    Envelope(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InvokeError {
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope(message.into())
    }
}

pub type Result<T> = std::result::Result<T, InvokeError>;
