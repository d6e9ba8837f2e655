use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RxError {
    #[error("argument is missing\nUsage: rxlook <CONFIG.json> <RESULT_DIR>")]
    MissingArguments,
    #[error("launch site not found: {0}")]
    UnknownSite(String),
    #[error("log file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("malformed log {}: {reason}", .path.display())]
    MalformedLog { path: PathBuf, reason: String },
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config {} has no \"Launch Pad\".\"Site\" entry", .0.display())]
    MissingSiteField(PathBuf),
    #[error("invalid station file {}: {source}", .path.display())]
    Station {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render {file}: {reason}")]
    Plot { file: String, reason: String },
}

impl RxError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RxError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RxError::MalformedLog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
