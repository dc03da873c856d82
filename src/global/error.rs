#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures of the anime data client. Every operation returns this
/// uniformly; callers choose between failing fast and degrading to empty.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("upstream request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("unexpected upstream response shape: {0}")]
    InvalidShape(&'static str),

    #[error("upstream request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode upstream response: {0}")]
    Deserialization(String),
}

/// Rejections of the passthrough relay, mapped to HTTP status codes at the
/// route layer.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("missing url parameter")]
    MissingUrl,

    #[error("url parameter is not a valid absolute URL")]
    InvalidUrl,

    #[error("only http and https targets are allowed")]
    SchemeNotAllowed,

    #[error("target host is not allowed: {0}")]
    HostNotAllowed(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] reqwest::Error),
}
