use std::fmt;

/// Failure of the asynchronous fetch-and-decode request.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Network { path: String, message: String },
    Http { path: String, status: u16 },
    Decode { path: String, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network { path, message } => {
                write!(f, "failed to fetch {path}: {message}")
            }
            LoadError::Http { path, status } => {
                write!(f, "failed to fetch {path}: HTTP status {status}")
            }
            LoadError::Decode { path, message } => {
                write!(f, "failed to decode {path}: {message}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Error reported by a host collaborator (DOM, renderer, fullscreen API).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateViewer(String),
    UnknownViewer(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateViewer(name) => {
                write!(f, "a viewer named '{name}' is already registered")
            }
            RegistryError::UnknownViewer(name) => write!(f, "no viewer named '{name}'"),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidViewerName(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid page config: {e}"),
            ConfigError::InvalidViewerName(name) => {
                write!(f, "invalid viewer name {name:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::InvalidViewerName(_) => None,
        }
    }
}
