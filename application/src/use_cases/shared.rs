//! Shared utilities for use cases.

use crate::use_cases::continuation::DriveError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(DriveError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), DriveError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(DriveError::Cancelled);
    }
    Ok(())
}
