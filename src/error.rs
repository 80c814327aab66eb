/// Errors reported by the Azure Resource Manager API.
///
/// These travel inside `anyhow::Error`; use [`is_not_found`] or
/// `downcast_ref::<ArmError>()` to recover them.
#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    #[error("resource not found: {message}")]
    NotFound { message: String },

    #[error("Azure API request failed with status {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation reached a terminal state other than success.
    #[error("long-running operation finished with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("operation cancelled")]
    Cancelled,
}

/// Check whether an error (or anything it wraps) is a not-found response.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ArmError>(),
        Some(ArmError::NotFound { .. })
    )
}

/// Check whether an error was caused by cancellation of the operation context.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ArmError>(), Some(ArmError::Cancelled))
}
