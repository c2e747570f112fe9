use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum UqloadError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("missing metadata for {url}: {header}")]
    MissingMetadata { url: String, header: &'static str },

    #[error("video not found: {reason}")]
    VideoNotFound { reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl UqloadError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>, operation: &str) -> Self {
        Self::Network {
            url: url.into(),
            reason: format!("HTTP {status} during {operation}"),
        }
    }

    pub fn missing_metadata(url: impl Into<String>, header: &'static str) -> Self {
        Self::MissingMetadata {
            url: url.into(),
            header,
        }
    }

    pub fn video_not_found(reason: impl Into<String>) -> Self {
        Self::VideoNotFound {
            reason: reason.into(),
        }
    }

    /// Informational only, nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidArgument(_)
            | Self::MissingMetadata { .. }
            | Self::VideoNotFound { .. } => false,
            Self::Network { .. } | Self::Io { .. } => true,
        }
    }
}

impl From<reqwest::Error> for UqloadError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::network(url, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UqloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_renders_operation() {
        let err = UqloadError::http_status(StatusCode::NOT_FOUND, "https://a/b", "metadata probe");
        assert_eq!(
            err.to_string(),
            "network error for https://a/b: HTTP 404 Not Found during metadata probe"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_domain_errors_are_not_retryable() {
        assert!(!UqloadError::video_not_found("deleted").is_retryable());
        assert!(!UqloadError::invalid_argument("bad").is_retryable());
        assert!(!UqloadError::missing_metadata("u", "content-length").is_retryable());
    }
}
