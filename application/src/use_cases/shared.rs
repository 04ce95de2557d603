//! Shared utilities for use cases.

use crate::use_cases::reasoning_loop::ReasoningError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(ReasoningError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), ReasoningError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(ReasoningError::Cancelled);
    }
    Ok(())
}
