// MIT License - Copyright (c) 2026 Peter Wright
// Error kinds for the panel web client

use std::path::PathBuf;

/// All errors that can occur in the nx-web-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum NxError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The panel answered with a status that is neither 200 nor 403.
    #[error("Could not connect to card: {path} returned HTTP {status}")]
    Connectivity { path: String, status: u16 },

    /// Every attempt was rejected as unauthenticated, re-login included.
    #[error("Authentication expired and retry budget exhausted: {path} ({attempts} attempts)")]
    AuthExhausted { path: String, attempts: u32 },

    /// The login request itself was answered with 403 or the login form.
    #[error("Login rejected by panel")]
    LoginRejected,

    #[error("Malformed response from {path}: {details}")]
    Decode { path: String, details: String },

    #[error("Invalid system trigger: {value}")]
    InvalidTrigger { value: String },

    /// The persisted session could not be read or written.
    #[error("Session storage failure at {}: {source}", path.display())]
    SessionStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {details}")]
    Config { details: String },
}

impl NxError {
    pub(crate) fn decode(path: &str, details: impl Into<String>) -> Self {
        NxError::Decode {
            path: path.to_string(),
            details: details.into(),
        }
    }

    /// Whether the panel refused our credentials or session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, NxError::AuthExhausted { .. } | NxError::LoginRejected)
    }

    /// Whether the error is transient and the whole operation may be retried
    /// later by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            NxError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NxError::Io(_) | NxError::Connectivity { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(NxError::LoginRejected.is_auth_failure());
        assert!(NxError::AuthExhausted {
            path: "user/status.xml".to_string(),
            attempts: 2
        }
        .is_auth_failure());
        assert!(!NxError::Connectivity {
            path: "user/seq.xml".to_string(),
            status: 500
        }
        .is_auth_failure());
    }

    #[test]
    fn test_retryable() {
        assert!(NxError::Connectivity {
            path: "user/status.xml".to_string(),
            status: 502
        }
        .is_retryable());
        assert!(!NxError::LoginRejected.is_retryable());
        assert!(!NxError::InvalidTrigger {
            value: "9".to_string()
        }
        .is_retryable());
        assert!(!NxError::decode("user/zstate.xml", "bad zdat").is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = NxError::Connectivity {
            path: "user/status.xml".to_string(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "Could not connect to card: user/status.xml returned HTTP 500"
        );

        let err = NxError::SessionStorage {
            path: PathBuf::from("/tmp/session"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/session"));
    }
}
