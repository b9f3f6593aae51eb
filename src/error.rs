use std::path::PathBuf;

/// Result type alias for the extraction pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the extraction pipeline.
///
/// Only file-system, grammar and delegation failures are represented here. Malformed doc
/// tags and odd decorator shapes are absorbed per route site and never surface as errors.
#[derive(Debug)]
pub enum Error {
    /// The input root or a scanned file does not exist
    NotFound(PathBuf),
    /// No dynamic-path grammar or backend is known for this framework name
    UnsupportedFramework(String),
    /// The delegated parser process failed or printed something that is not a route list
    ExternalParser { command: String, message: String },
    Io { path: PathBuf, source: std::io::Error },
    Parse { file: PathBuf, message: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "path not found: {}", path.display()),
            Error::UnsupportedFramework(name) => write!(f, "unsupported framework: {}", name),
            Error::ExternalParser { command, message } => {
                write!(f, "external parser `{}` failed: {}", command, message)
            }
            Error::Io { path, source } => write!(f, "IO error on {}: {}", path.display(), source),
            Error::Parse { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    /// Wraps an IO failure on `path`, mapping a missing file to [`Error::NotFound`].
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path)
        } else {
            Error::Io { path, source: err }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
