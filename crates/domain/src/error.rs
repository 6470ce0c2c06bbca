use serde::{Deserialize, Serialize};

/// Shared error type used across all tripweaver crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("canceled")]
    Canceled,

    #[error("upstream {provider}: {message}")]
    Upstream { provider: String, message: String },

    #[error("transport: {0}")]
    Transport(String),

    #[error("parse: {0}")]
    Parse(String),

    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Project onto the closed [`ErrorKind`] set carried inside
    /// [`crate::result::ServiceResult`] entries.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Canceled => ErrorKind::Canceled,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Closed error classification for per-spec results.
///
/// `RateLimited` never reaches a caller — the rate limiter waits or reports
/// `Canceled` instead — but the variant keeps the taxonomy closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    RateLimited,
    Timeout,
    Canceled,
    Upstream,
    Transport,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Canceled => "canceled",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Transport => "transport",
            ErrorKind::Parse => "parse",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_projection_is_total() {
        let cases: Vec<(Error, ErrorKind)> = vec![
            (Error::InvalidInput("x".into()), ErrorKind::InvalidInput),
            (Error::Timeout("t".into()), ErrorKind::Timeout),
            (Error::Canceled, ErrorKind::Canceled),
            (
                Error::Upstream {
                    provider: "amap".into(),
                    message: "boom".into(),
                },
                ErrorKind::Upstream,
            ),
            (Error::Transport("conn reset".into()), ErrorKind::Transport),
            (Error::Parse("bad json".into()), ErrorKind::Parse),
            (Error::Internal("assert".into()), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
        }
    }
}
