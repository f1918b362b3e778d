use thiserror::Error;

/// Failure of an asynchronous provider call (query, hit test, navigation).
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("request aborted")]
    Aborted,
    #[error("provider error: {0}")]
    Provider(String),
    #[error("no feature matched {field} = {value}")]
    NotFound { field: String, value: String },
}

impl QueryError {
    pub fn is_abort(&self) -> bool {
        matches!(self, QueryError::Aborted)
    }
}

/// Startup failures. The session has no fallback UI, so these are fatal.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("layer '{0}' not found in map")]
    MissingLayer(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON in {path}: {message}")]
    GeoJson { path: String, message: String },
}
