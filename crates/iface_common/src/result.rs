//! Errors that indicate a toolchain bug rather than a bad input.

/// Something went wrong that no interface file or configuration could have
/// caused, such as failing to start the rebuild thread.
///
/// User-facing problems are diagnostics, not `InternalError`s.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Wraps `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed() {
        let err = InternalError::new("cannot start rebuild thread");
        assert_eq!(
            err.to_string(),
            "internal compiler error: cannot start rebuild thread"
        );
    }

    #[test]
    fn from_owned_message() {
        let err = InternalError::from(format!("lost {} bytes", 3));
        assert_eq!(err.message, "lost 3 bytes");
    }
}
