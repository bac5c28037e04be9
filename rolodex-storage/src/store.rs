//! Async contact store trait.
//!
//! Every mutation is a single-record atomic operation. Uniqueness of email
//! and phone is enforced by the store itself, so callers never check for
//! duplicates before writing.

use ::async_trait::async_trait;
use rolodex_core::{
    Contact, ContactId, ContactPatch, ContactSelector, EditLock, NewContact, SortOrder,
    StoreResult, Timestamp,
};
use std::sync::Arc;

/// Shared handle to the process-wide store.
pub type SharedStore = Arc<dyn ContactStore>;

/// Outcome of a conditional lock write.
#[derive(Debug, Clone, PartialEq)]
pub enum LockAttempt {
    /// The lock was taken or extended.
    Acquired(Contact),
    /// Another owner holds a live lock. The record is unchanged.
    Held(Contact),
}

/// Async storage trait for contact records.
///
/// Lookups and single-record mutations return `Ok(None)` when the record
/// does not exist.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a new contact.
    ///
    /// The payload is normalized and checked against the required-field
    /// contract before anything is written.
    async fn insert(&self, new: NewContact) -> StoreResult<Contact>;

    /// Get a contact by ID.
    async fn get(&self, id: ContactId) -> StoreResult<Option<Contact>>;

    /// Apply a partial update. Uniqueness is re-checked against every other
    /// record.
    async fn update(&self, id: ContactId, patch: ContactPatch) -> StoreResult<Option<Contact>>;

    /// Take or extend `lock` unless another owner holds a live lock at
    /// `now`. The check and the write happen as one atomic step.
    async fn try_lock(
        &self,
        id: ContactId,
        lock: EditLock,
        now: Timestamp,
    ) -> StoreResult<Option<LockAttempt>>;

    /// Clear the lock fields if `owner` holds the lock, atomically. Any other
    /// state is left untouched and the record is returned as stored.
    async fn release_lock(&self, id: ContactId, owner: &str) -> StoreResult<Option<Contact>>;

    /// Delete a contact, returning the removed record.
    async fn delete(&self, id: ContactId) -> StoreResult<Option<Contact>>;

    /// Delete every listed contact that exists. Returns the number removed.
    async fn delete_many(&self, ids: &[ContactId]) -> StoreResult<u64>;

    /// Page through the contacts matching `selector` in `sort` order.
    async fn find(
        &self,
        selector: &ContactSelector,
        sort: SortOrder,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Contact>>;

    /// Count the contacts matching `selector`.
    async fn count(&self, selector: &ContactSelector) -> StoreResult<u64>;

    /// Clear lock fields on every contact whose lock expired before `now`.
    async fn clear_expired_locks(&self, now: Timestamp) -> StoreResult<u64>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backing resources. Called once at shutdown.
    async fn close(&self) {}
}
