use thiserror::Error;

const MIB: f64 = 1024.0 * 1024.0;

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / MIB
}

/// Rejection reasons produced before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "File size ({:.1}MB) exceeds the {}MB limit.",
        megabytes(.size_bytes),
        megabytes(.limit_bytes)
    )]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Only PDF and CSV files are supported.")]
    UnsupportedType,
}

/// Failures talking to the analysis service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server responded with {status}: {status_text}")]
    Server { status: u16, status_text: String },

    #[error("Malformed response body: {0}")]
    Parse(String),
}

impl ServiceError {
    /// Message shown to the user for a failed upload
    ///
    /// Transport failures get a generic retry hint; parse failures are
    /// presented like a server error since the request did reach the server.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport(_) => "Network error occurred. Please try again.".to_string(),
            ServiceError::Server { .. } => self.to_string(),
            ServiceError::Parse(_) => "Server responded with an unreadable summary.".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to copy to clipboard: {0}")]
pub struct ClipboardError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message_uses_one_decimal() {
        let err = ValidationError::TooLarge {
            size_bytes: 20 * 1024 * 1024,
            limit_bytes: 15 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File size (20.0MB) exceeds the 15MB limit.");
    }

    #[test]
    fn test_server_error_message_includes_status() {
        let err = ServiceError::Server {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Server responded with 500: Internal Server Error"
        );
    }

    #[test]
    fn test_transport_error_is_generic_for_users() {
        let err = ServiceError::Transport("connection refused".to_string());
        assert_eq!(
            err.user_message(),
            "Network error occurred. Please try again."
        );
        assert!(err.to_string().contains("connection refused"));
    }
}
