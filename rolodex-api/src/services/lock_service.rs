//! Edit Lock Service
//!
//! Advisory, single-owner, time-bounded locks on contacts. Expiry is checked
//! lazily when someone tries to acquire; an expired lock is simply ignored.
//! The ownership check and the write are one store operation, so concurrent
//! callers cannot both win.

use chrono::Utc;
use rolodex_core::{Contact, ContactId, EditLock, Timestamp};
use rolodex_storage::{ContactStore, LockAttempt};

use crate::constants::EDIT_LOCK_TTL;
use crate::error::{ApiError, ApiResult};

/// Acquire (or extend) the edit lock on a contact for `owner`.
///
/// # Errors
/// - `ContactNotFound` if the contact does not exist
/// - `LockConflict` if another owner holds a live lock
pub async fn acquire_edit_lock(
    store: &dyn ContactStore,
    id: ContactId,
    owner: &str,
) -> ApiResult<Contact> {
    acquire_edit_lock_at(store, id, owner, Utc::now()).await
}

/// [`acquire_edit_lock`] evaluated at a fixed instant.
pub async fn acquire_edit_lock_at(
    store: &dyn ContactStore,
    id: ContactId,
    owner: &str,
    now: Timestamp,
) -> ApiResult<Contact> {
    let ttl = chrono::Duration::from_std(EDIT_LOCK_TTL)
        .map_err(|e| ApiError::internal_error(format!("Invalid lock TTL: {}", e)))?;
    let lock = EditLock::new(owner, now + ttl);

    match store.try_lock(id, lock, now).await? {
        Some(LockAttempt::Acquired(contact)) => {
            tracing::debug!(%id, owner, "Edit lock acquired");
            Ok(contact)
        }
        Some(LockAttempt::Held(contact)) => {
            tracing::debug!(%id, owner, holder = ?contact.editing_by, "Edit lock conflict");
            Err(ApiError::lock_conflict())
        }
        None => Err(ApiError::contact_not_found(id)),
    }
}

/// Release the edit lock if `owner` holds it.
///
/// Releasing a lock held by someone else, or an unlocked contact, is a
/// no-op that returns the contact unchanged.
pub async fn release_edit_lock(
    store: &dyn ContactStore,
    id: ContactId,
    owner: &str,
) -> ApiResult<Contact> {
    let contact = store
        .release_lock(id, owner)
        .await?
        .ok_or_else(|| ApiError::contact_not_found(id))?;
    if contact.editing_by.is_none() {
        tracing::debug!(%id, owner, "Edit lock released");
    }
    Ok(contact)
}

// =============================================================================
// TESTS
// =============================================================================
