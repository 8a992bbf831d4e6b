//! Error taxonomy for the client core. Local checks surface as
//! `ValidationError` and never reach the network. `AppError::Unauthorized` is
//! only returned after the session has already been torn down by the
//! transport, so callers must not try to recover the session from it.

/// Reasons a form is refused before anything is dispatched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please provide more details (at least {min} characters)")]
    TooShort { min: usize },
    #[error("Message too long (max {max} characters)")]
    TooLong { max: usize },
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("User is not authorized")]
    Unauthorized,
    #[error("Rate limited: {}", .message.as_deref().unwrap_or("retry later"))]
    RateLimited { message: Option<String> },
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Http { status: u16, message: Option<String> },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Sign-in failed: {0}")]
    Callback(String),
}

impl AppError {
    /// HTTP status that produced this error, if it came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message provided by the server body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::RateLimited { message } | Self::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::TooShort { min: 10 }.to_string(),
            "Please provide more details (at least 10 characters)"
        );
        assert_eq!(
            ValidationError::TooLong { max: 2000 }.to_string(),
            "Message too long (max 2000 characters)"
        );
    }

    #[test]
    fn status_is_reported_for_response_errors() {
        assert_eq!(AppError::Unauthorized.status(), Some(401));
        assert_eq!(AppError::RateLimited { message: None }.status(), Some(429));
        assert_eq!(
            AppError::Http {
                status: 503,
                message: None
            }
            .status(),
            Some(503)
        );
        assert_eq!(AppError::Network("down".to_string()).status(), None);
    }

    #[test]
    fn http_display_falls_back_without_message() {
        let err = AppError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed (500): no details");
        assert_eq!(err.server_message(), None);

        let err = AppError::Http {
            status: 400,
            message: Some("Invalid email format".to_string()),
        };
        assert_eq!(err.server_message(), Some("Invalid email format"));
    }
}
