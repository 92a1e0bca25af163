use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while loading or composing tenant configuration and
/// while minting identifiers. None of them are retried internally.
#[derive(Debug, Error)]
pub enum DataModelError {
    #[error("Config file not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema error in {}: {reason}", .path.display())]
    Schema { path: PathBuf, reason: String },

    #[error("No default role defined in {}", .path.display())]
    MissingDefaultRole { path: PathBuf },

    #[error("{} config for role {role} exists, but no such {} was found in datamodel", target(.record, .field), kind(.field))]
    DanglingFieldRef {
        role: String,
        record: String,
        field: Option<String>,
    },

    #[error("Invalid tenant name '{0}'")]
    InvalidTenant(String),

    #[error("No record type '{record}' in datamodel of subject {subject}")]
    UnknownRecord { subject: String, record: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Malformed identifier '{id}': {reason}")]
    MalformedId { id: String, reason: String },

    #[error("Entropy source unavailable: {0}")]
    Entropy(#[source] rand::Error),
}

fn kind(field: &Option<String>) -> &'static str {
    if field.is_some() { "field" } else { "record" }
}

fn target(record: &str, field: &Option<String>) -> String {
    match field {
        Some(field) => format!("Field {}.{}", record, field),
        None => format!("Record {}", record),
    }
}

impl DataModelError {
    /// Classify a failed file read as missing or otherwise unreadable
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DataModelError::NotFound { path, source }
        } else {
            DataModelError::Io { path, source }
        }
    }
}
