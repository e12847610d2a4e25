//! Errors reported by the todo gateway

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// Client-correctable input problem. The message is shown to the user as is.
    #[error("{0}")]
    Validation(String),

    /// The referenced todo no longer exists on the server.
    #[error("Todo not found: {0}")]
    NotFound(String),

    /// Network, transport or server fault.
    #[error("Gateway error: {0}")]
    Gateway(String),
}

impl TodoError {
    /// Message to show the user, falling back to `fallback` unless the server
    /// explained what was wrong with the input.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            TodoError::Validation(msg) if !msg.is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for TodoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TodoError::Gateway(format!("request timed out: {}", err))
        } else if err.is_decode() {
            TodoError::Gateway(format!("unexpected response body: {}", err))
        } else {
            TodoError::Gateway(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_surfaced() {
        let err = TodoError::Validation("Title is required".into());
        assert_eq!(err.user_message("Failed to create todo"), "Title is required");
    }

    #[test]
    fn other_errors_use_fallback() {
        let err = TodoError::Gateway("connection refused".into());
        assert_eq!(err.user_message("Failed to create todo"), "Failed to create todo");
        let err = TodoError::NotFound("42".into());
        assert_eq!(err.user_message("Failed to delete todo"), "Failed to delete todo");
    }
}
