//! Common result and error types for the qplace workspace.

/// The standard result type for fallible internal operations.
///
/// `Ok` contains the result value (which may be partial after a skipped
/// sub-problem). `Err` indicates an unrecoverable internal error (a bug in
/// the placer), not a problem with the input design. Design problems are
/// reported through the diagnostic sink and the operation still returns `Ok`.
pub type PlaceResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the placer, not a design problem.
#[derive(Debug, thiserror::Error)]
#[error("internal placer error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("matrix dimension mismatch");
        assert_eq!(
            format!("{err}"),
            "internal placer error: matrix dimension mismatch"
        );
    }

    #[test]
    fn err_path() {
        let r: PlaceResult<i32> = Err(InternalError::new("test error"));
        let err = r.err().unwrap();
        assert_eq!(err.message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
