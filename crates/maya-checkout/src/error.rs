use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by gateway and store operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("response parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Network failure, non-success status, or a remote/database rejection.
    Transport,
    /// The response body could not be parsed.
    Parse,
    /// Local configuration was missing or invalid.
    Config,
}

impl CheckoutError {
    pub fn kind(&self) -> FaultKind {
        match self {
            CheckoutError::Http(_)
            | CheckoutError::Status { .. }
            | CheckoutError::Database(_)
            | CheckoutError::NotFound(_) => FaultKind::Transport,
            CheckoutError::Parse(_) => FaultKind::Parse,
            CheckoutError::Config(_) => FaultKind::Config,
        }
    }

    /// HTTP status of a rejected gateway call, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            CheckoutError::Status { status, .. } => Some(*status),
            CheckoutError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let status = CheckoutError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(status.kind(), FaultKind::Transport);
        assert_eq!(status.status(), Some(401));

        let parse = CheckoutError::from(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(parse.kind(), FaultKind::Parse);
        assert_eq!(parse.status(), None);

        let db = CheckoutError::Database("locked".to_string());
        assert_eq!(db.kind(), FaultKind::Transport);
    }

    #[test]
    fn test_display_includes_body() {
        let err = CheckoutError::Status {
            status: 400,
            body: "{\"code\":\"2553\"}".to_string(),
        };
        assert_eq!(err.to_string(), "gateway returned 400: {\"code\":\"2553\"}");
    }
}
