use std::fmt;

#[derive(Debug)]
pub enum BiochatError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    StorageError(String),
    NetworkError(reqwest::Error),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for BiochatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BiochatError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            BiochatError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BiochatError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            BiochatError::NetworkError(e) => write!(f, "Network error: {}", e),
            BiochatError::IoError(e) => write!(f, "IO error: {}", e),
            BiochatError::JsonError(e) => write!(f, "JSON error: {}", e),
            BiochatError::YamlError(e) => write!(f, "YAML error: {}", e),
            BiochatError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BiochatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BiochatError::NetworkError(e) => Some(e),
            BiochatError::IoError(e) => Some(e),
            BiochatError::JsonError(e) => Some(e),
            BiochatError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BiochatError {
    fn from(err: reqwest::Error) -> Self {
        BiochatError::NetworkError(err)
    }
}

impl From<std::io::Error> for BiochatError {
    fn from(err: std::io::Error) -> Self {
        BiochatError::IoError(err)
    }
}

impl From<serde_json::Error> for BiochatError {
    fn from(err: serde_json::Error) -> Self {
        BiochatError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for BiochatError {
    fn from(err: serde_yaml::Error) -> Self {
        BiochatError::YamlError(err)
    }
}

impl From<anyhow::Error> for BiochatError {
    fn from(err: anyhow::Error) -> Self {
        BiochatError::Other(err.to_string())
    }
}

impl From<String> for BiochatError {
    fn from(msg: String) -> Self {
        BiochatError::Other(msg)
    }
}

impl From<&str> for BiochatError {
    fn from(msg: &str) -> Self {
        BiochatError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BiochatError>;
