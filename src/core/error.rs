//! Error types for the logging facade

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level change requested for a package that never created a logger
    #[error("the package '{package}' is not in the registry")]
    NotRegistered { package: String },

    /// A sink rejected an encoded entry
    #[error("write to sink '{sink}' failed: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// A field could not encode itself
    #[error("failed to encode field '{key}': {message}")]
    FieldEncoding { key: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Remote command rejected by the server
    #[error("remote command failed: {0}")]
    Remote(String),

    /// Several cores failed while handling the same entry
    #[error("{} cores failed: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<LoggerError>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create a not-registered error for a package
    pub fn not_registered(package: impl Into<String>) -> Self {
        LoggerError::NotRegistered {
            package: package.into(),
        }
    }

    /// Create a sink write error with the sink's name
    pub fn sink_write(sink: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            source,
        }
    }

    /// Create a field encoding error
    pub fn field_encoding(key: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FieldEncoding {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a remote command error
    pub fn remote<S: Into<String>>(msg: S) -> Self {
        LoggerError::Remote(msg.into())
    }

    /// Collapse a list of errors: none, the single error, or `Multiple`
    pub fn combine(mut errors: Vec<LoggerError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(LoggerError::Multiple(errors)),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
