//! Error types for the test runner.
//!
//! Failures of an individual test case are not errors: they are recorded in
//! the case result. These variants cover building requests, talking to the
//! network and the collaborators around a run.

/// Crate-level errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The base URL could not be parsed as an absolute URL
    #[error("malformed base URL `{url}`: {reason}")]
    MalformedBaseUrl { url: String, reason: String },

    /// A header name or value from the test spec is not valid HTTP
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Network failure, timeout or a request that could not be constructed
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The spec generator, config store or identity service misbehaved
    #[error("remote service error: {0}")]
    Remote(String),

    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    #[error("received empty test spec from server")]
    EmptySpec,

    #[error("history store error: {0}")]
    History(#[from] rusqlite::Error),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {err}"))
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl Error {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
