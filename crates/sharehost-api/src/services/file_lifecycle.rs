//! File and account deletion.
//!
//! Bytes go first, then records. A file whose bytes are already gone is
//! reported as not found and its record is left untouched.

use sharehost_core::{AppError, Notification};

use crate::error::storage_error;
use crate::state::AppState;

#[tracing::instrument(skip(state))]
pub async fn delete_file(state: &AppState, owner: &str, stored_name: &str) -> Result<(), AppError> {
    state
        .storage
        .delete(owner, stored_name)
        .await
        .map_err(storage_error)?;

    match state.records.delete(owner, Some(stored_name)).await {
        Ok(removed) => {
            tracing::info!(owner, file = stored_name, removed, "File deleted");
            state.notifier.notify(Notification::success(
                "File deleted",
                format!("**User:** {}\n**File:** {}", owner, stored_name),
            ));
            Ok(())
        }
        Err(e) => {
            state.notifier.notify(Notification::error(
                "File deletion failed",
                format!("Record for {}/{} could not be removed: {}", owner, stored_name, e),
            ));
            Err(e)
        }
    }
}

/// Remove an account, its upload directory and all of its records.
///
/// Returns [`AppError::NotFound`] when the account does not exist.
#[tracing::instrument(skip(state))]
pub async fn delete_user(state: &AppState, username: &str) -> Result<(), AppError> {
    let result = remove_account(state, username).await;

    match &result {
        Ok(()) => {
            tracing::info!(username, "User deleted");
            state.notifier.notify(Notification::success(
                "User deleted",
                format!("The user {} was deleted.", username),
            ));
        }
        Err(AppError::NotFound(_)) => {}
        Err(e) => {
            state.notifier.notify(Notification::error(
                "User deletion failed",
                format!("{}: {}", username, e),
            ));
        }
    }

    result
}

async fn remove_account(state: &AppState, username: &str) -> Result<(), AppError> {
    if !state.users.delete(username).await? {
        return Err(AppError::NotFound(format!("User not found: {}", username)));
    }

    state
        .storage
        .remove_owner(username)
        .await
        .map_err(storage_error)?;

    let removed = state.records.delete(username, None).await?;
    tracing::debug!(username, removed, "Removed upload records");

    Ok(())
}
